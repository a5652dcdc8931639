use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

mod config;
mod error;
mod pipeline;

use config::MergeConfig;

#[derive(Parser, Debug)]
#[command(
    name = "Scan Merger",
    about = "Merges independently captured scans into one point cloud",
    version = "0.1.0"
)]
struct Cli {
    /// Scan table: per-scan transform parameters, voxel size, output name
    #[arg(short, long, required = true, value_name = "FILE")]
    config: PathBuf,

    #[arg(short, long, required = true, value_name = "DIR")]
    output_dir: PathBuf,

    /// Overrides the voxel cell size from the scan table
    #[arg(long, value_name = "UNITS")]
    voxel_size: Option<f64>,

    /// Also write each per-scan decimated cloud next to the merged output
    #[arg(long, default_value_t = false)]
    intermediates: bool,
}

fn main() -> ExitCode {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .init();

    let args = Cli::parse();

    log::info!("scan table: {:?}", args.config);
    log::info!("output folder: {:?}", args.output_dir);

    let start = std::time::Instant::now();

    let mut config = match MergeConfig::from_path(&args.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(voxel_size) = args.voxel_size {
        config.voxel_size = voxel_size;
    }
    log::info!(
        "reference {} + {} scans, voxel size {}",
        config.reference.id,
        config.scans.len(),
        config.voxel_size
    );

    match pipeline::run(&config, &args.output_dir, args.intermediates) {
        Ok(summary) => {
            log::info!(
                "merged {} points into {:?}",
                summary.merged_points,
                summary.merged_path
            );
            log::info!("Elapsed: {:?}", start.elapsed());
            log::info!("Finish processing");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
