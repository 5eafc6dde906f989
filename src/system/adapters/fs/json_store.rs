//! JSON document store for system descriptors.

use crate::system::domain::SystemDescriptor;
use crate::system::ports::{DescriptorStore, DescriptorStoreError, DescriptorStoreResult};
use async_trait::async_trait;
use camino::Utf8PathBuf;

/// Descriptor store persisting the whole set as one pretty-printed JSON
/// document.
///
/// Writes go to a sibling temp file first and replace the document with a
/// rename, so readers never observe a torn write. A missing document loads
/// as an empty set.
#[derive(Debug, Clone)]
pub struct JsonFileDescriptorStore {
    path: Utf8PathBuf,
}

impl JsonFileDescriptorStore {
    /// Creates a store writing to the given document path.
    #[must_use]
    pub const fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }

    /// Returns the document path.
    #[must_use]
    pub fn path(&self) -> &Utf8PathBuf {
        &self.path
    }

    fn temp_path(&self) -> Utf8PathBuf {
        let mut file_name = self.path.file_name().unwrap_or("descriptors").to_owned();
        file_name.push_str(".tmp");
        self.path.with_file_name(file_name)
    }
}

#[async_trait]
impl DescriptorStore for JsonFileDescriptorStore {
    async fn load_all(&self) -> DescriptorStoreResult<Vec<SystemDescriptor>> {
        let bytes = match tokio::fs::read(self.path.as_std_path()).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(DescriptorStoreError::persistence(err)),
        };

        serde_json::from_slice(&bytes).map_err(DescriptorStoreError::invalid_persisted_data)
    }

    async fn save_all(&self, descriptors: &[SystemDescriptor]) -> DescriptorStoreResult<()> {
        let document = serde_json::to_vec_pretty(descriptors)
            .map_err(DescriptorStoreError::invalid_persisted_data)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent.as_std_path())
                .await
                .map_err(DescriptorStoreError::persistence)?;
        }

        let temp = self.temp_path();
        tokio::fs::write(temp.as_std_path(), document)
            .await
            .map_err(DescriptorStoreError::persistence)?;
        tokio::fs::rename(temp.as_std_path(), self.path.as_std_path())
            .await
            .map_err(DescriptorStoreError::persistence)
    }
}
