//! Store port for descriptor persistence.

use crate::system::domain::SystemDescriptor;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for descriptor store operations.
pub type DescriptorStoreResult<T> = Result<T, DescriptorStoreError>;

/// Durable storage contract for the full descriptor set.
///
/// The registry keeps the in-memory map as the source of truth and writes
/// whole-set snapshots; a failed write is logged by the caller and the next
/// successful write reconciles.
#[async_trait]
pub trait DescriptorStore: Send + Sync {
    /// Loads every persisted descriptor.
    async fn load_all(&self) -> DescriptorStoreResult<Vec<SystemDescriptor>>;

    /// Replaces the persisted descriptor set with the given snapshot.
    async fn save_all(&self, descriptors: &[SystemDescriptor]) -> DescriptorStoreResult<()>;
}

/// Errors returned by descriptor store implementations.
#[derive(Debug, Clone, Error)]
pub enum DescriptorStoreError {
    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DescriptorStoreError {
    /// Wraps a data-quality or deserialization error from persisted records.
    #[must_use]
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
