use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use scan_transformer::TransformStep;

use crate::error::PipelineError;

/// The scan table: which file defines the reference frame, which scans get
/// merged into it, and the pose steps that map each scan into that frame.
/// Loaded once before the pipeline runs; nothing in here is derived from the
/// point data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Voxel edge length applied uniformly to every cloud.
    pub voxel_size: f64,
    /// Merged output file name, resolved against the output directory.
    pub output: PathBuf,
    pub reference: ReferenceEntry,
    /// Merge order is this list's order, after the reference.
    pub scans: Vec<ScanEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub id: String,
    pub input: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEntry {
    pub id: String,
    pub input: PathBuf,
    /// Steps in matrix-product order; the last step acts on the points first.
    pub steps: Vec<TransformStep>,
}

impl MergeConfig {
    pub fn from_path(path: &Path) -> Result<Self, PipelineError> {
        let raw = fs::read_to_string(path).map_err(|source| PipelineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| PipelineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}
