use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to extract features from {path:?}: {reason}")]
    Extraction { path: PathBuf, reason: String },
    #[error("worker pool shut down before the job completed")]
    PoolShutDown,
    #[error("no trailing number in filename: {0}")]
    UnnumberedFile(String),
    #[error("cannot align {num_slides} slides against {num_frames} frames")]
    InfeasiblePath {
        num_slides: usize,
        num_frames: usize,
    },
    #[error("{timestamps} timestamps for {frames} frames")]
    TimestampMismatch { timestamps: usize, frames: usize },
    #[error("empty input: {0}")]
    EmptyInput(&'static str),
}

impl SyncError {
    pub fn extraction(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SyncError::Extraction {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
