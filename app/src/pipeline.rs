use std::fs;
use std::path::{Path, PathBuf};

use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};

use scan_core::pointcloud::decimation::decimator::{PointCloudDecimator as _, VoxelGridDecimator};
use scan_core::pointcloud::filtering::remove_non_finite;
use scan_core::pointcloud::merge::merge_all;
use scan_core::pointcloud::point::PointCloud;
use scan_exporter::ply::{write_ply, PlyEncoding};
use scan_parser::parsers::parser_for;
use scan_transformer::{
    CloudTransformer, RigidTransformBuilder, TransformBuilder as _, Transformer as _,
};

use crate::config::{MergeConfig, ScanEntry};
use crate::error::PipelineError;

#[derive(Debug)]
pub struct MergeSummary {
    pub reference_points: usize,
    pub scan_points: Vec<(String, usize)>,
    pub merged_points: usize,
    pub merged_path: PathBuf,
}

fn load_clean(path: &Path) -> Result<PointCloud, PipelineError> {
    let cloud = parser_for(path)?.parse()?;
    Ok(remove_non_finite(&cloud))
}

fn process_scan(
    entry: &ScanEntry,
    decimator: &VoxelGridDecimator,
) -> Result<PointCloud, PipelineError> {
    let start = std::time::Instant::now();
    let cloud = load_clean(&entry.input)?;

    let transform = RigidTransformBuilder::new(entry.steps.clone()).build();
    let transformed = CloudTransformer::new(transform).execute(&cloud);
    let decimated = PointCloud::new(decimator.decimate(&transformed.points));

    log::info!(
        "scan {}: {} -> {} points in {:?}",
        entry.id,
        cloud.len(),
        decimated.len(),
        start.elapsed()
    );
    Ok(decimated)
}

/// Runs the whole merge: reference and scans are processed on the rayon
/// pool (each pipeline owns its cloud; the first failure aborts the run),
/// then merged on this thread in the configured order, reference first.
/// The merged file is written after all intermediates.
pub fn run(
    config: &MergeConfig,
    output_dir: &Path,
    write_intermediates: bool,
) -> Result<MergeSummary, PipelineError> {
    let decimator = VoxelGridDecimator::new(config.voxel_size)?;

    log::info!("start loading and transforming {} scans...", config.scans.len() + 1);
    let start = std::time::Instant::now();

    let reference = {
        let cloud = load_clean(&config.reference.input)?;
        let decimated = PointCloud::new(decimator.decimate(&cloud.points));
        log::info!(
            "reference {}: {} -> {} points",
            config.reference.id,
            cloud.len(),
            decimated.len()
        );
        decimated
    };

    let scan_clouds: Vec<PointCloud> = config
        .scans
        .par_iter()
        .map(|entry| process_scan(entry, &decimator))
        .collect::<Result<_, _>>()?;
    log::info!("finish per-scan pipelines in {:?}", start.elapsed());

    let reference_points = reference.len();
    let scan_points: Vec<(String, usize)> = config
        .scans
        .iter()
        .zip(&scan_clouds)
        .map(|(entry, cloud)| (entry.id.clone(), cloud.len()))
        .collect();

    log::info!("start merging...");
    let start = std::time::Instant::now();
    let merged = merge_all(reference.clone(), &scan_clouds);
    log::info!("finish merging in {:?}", start.elapsed());

    fs::create_dir_all(output_dir)
        .map_err(|e| scan_exporter::SaveError::io(output_dir, e))?;

    // Intermediates go first: the merged file only appears once every other
    // write has succeeded, so a failed run never leaves one behind.
    if write_intermediates {
        let reference_path = output_dir.join(format!("{}.ply", config.reference.id));
        write_ply(&reference_path, &reference, PlyEncoding::Ascii)?;

        for (entry, cloud) in config.scans.iter().zip(&scan_clouds) {
            let path = output_dir.join(format!("{}.ply", entry.id));
            write_ply(&path, cloud, PlyEncoding::Ascii)?;
        }
    }

    let merged_path = output_dir.join(&config.output);
    write_ply(&merged_path, &merged, PlyEncoding::Ascii)?;
    log::info!("wrote {:?} ({} points)", merged_path, merged.len());

    Ok(MergeSummary {
        reference_points,
        scan_points,
        merged_points: merged.len(),
        merged_path,
    })
}
