//! Errors for loading and storing namespace snapshots

/// Snapshot serialization failure
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// JSON could not be read or written
    #[error("invalid namespace snapshot: {0}")]
    Json(#[from] serde_json::Error),
}
