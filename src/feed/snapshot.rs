//! Saved odds snapshots.

use std::path::Path;

use tracing::debug;

use crate::error::FeedError;

/// Read a saved odds document from disk.
pub async fn load_snapshot(path: impl AsRef<Path>) -> Result<String, FeedError> {
    let path = path.as_ref();
    let body = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FeedError::Snapshot {
            path: path.display().to_string(),
            source,
        })?;

    debug!(path = %path.display(), bytes = body.len(), "Loaded odds snapshot");
    Ok(body)
}
