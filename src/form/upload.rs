use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Result, TicketDeskError};

/// A call report chosen locally but not yet in the image store.
///
/// The bytes are shared so that snapshots of the form are cheap; they are
/// released once the last clone is dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub name: String,
    pub content: Arc<[u8]>,
    pub content_type: String,
}

impl PendingUpload {
    /// Content type is guessed from the file name.
    pub fn new(name: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let content_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            name,
            content: content.into(),
            content_type,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                TicketDeskError::Other(format!("'{}' is not a file path", path.display()))
            })?;
        let content = tokio::fs::read(path).await.map_err(|e| {
            TicketDeskError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read {}: {}", path.display(), e),
            ))
        })?;
        Ok(Self::new(name, content))
    }

    /// Object key used for this file in a submission stamped `stamp_ms`.
    pub fn storage_key(&self, stamp_ms: i64) -> String {
        format!("{}-{}", stamp_ms, self.name)
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

impl fmt::Debug for PendingUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingUpload")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.content.len())
            .finish()
    }
}
