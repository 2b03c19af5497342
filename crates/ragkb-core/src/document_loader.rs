//! Document loader trait

use async_trait::async_trait;
use std::path::Path;

use crate::{Document, Result};

/// Trait for loaders that turn a directory into documents
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load every supported, non-empty document under `path`
    ///
    /// Fails with `Error::NotFound` when the directory does not exist.
    async fn load_directory(&self, path: &Path) -> Result<Vec<Document>>;
}
