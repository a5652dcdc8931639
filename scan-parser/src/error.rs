use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed point cloud file {path}: {detail}")]
    Malformed { path: PathBuf, detail: String },

    #[error("unsupported input extension: {path}")]
    UnsupportedExtension { path: PathBuf },
}

impl LoadError {
    pub fn malformed(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        LoadError::Malformed {
            path: path.into(),
            detail: detail.into(),
        }
    }
}
