//! In-memory descriptor store for tests.

use crate::system::domain::SystemDescriptor;
use crate::system::ports::{DescriptorStore, DescriptorStoreError, DescriptorStoreResult};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory descriptor store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDescriptorStore {
    descriptors: Arc<RwLock<Vec<SystemDescriptor>>>,
}

impl InMemoryDescriptorStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with descriptors.
    #[must_use]
    pub fn seeded(descriptors: Vec<SystemDescriptor>) -> Self {
        Self {
            descriptors: Arc::new(RwLock::new(descriptors)),
        }
    }

    /// Returns the number of persisted descriptors.
    ///
    /// Test helper for asserting persistence happened.
    #[must_use]
    pub fn persisted_count(&self) -> usize {
        self.descriptors.read().map(|set| set.len()).unwrap_or(0)
    }
}

#[async_trait]
impl DescriptorStore for InMemoryDescriptorStore {
    async fn load_all(&self) -> DescriptorStoreResult<Vec<SystemDescriptor>> {
        let descriptors = self
            .descriptors
            .read()
            .map_err(|err| DescriptorStoreError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(descriptors.clone())
    }

    async fn save_all(&self, descriptors: &[SystemDescriptor]) -> DescriptorStoreResult<()> {
        let mut stored = self
            .descriptors
            .write()
            .map_err(|err| DescriptorStoreError::persistence(std::io::Error::other(err.to_string())))?;
        *stored = descriptors.to_vec();
        Ok(())
    }
}
