use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use scan_core::pointcloud::point::PointCloud;

use crate::error::SaveError;

/// Writes the cloud as an ASCII PCD (v0.7, unorganized, xyz only).
pub fn write_pcd(path: &Path, cloud: &PointCloud) -> Result<(), SaveError> {
    let file = File::create(path).map_err(|e| SaveError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    write_pcd_to(&mut writer, cloud).map_err(|e| SaveError::io(path, e))?;
    writer.flush().map_err(|e| SaveError::io(path, e))
}

fn write_pcd_to<W: Write>(writer: &mut W, cloud: &PointCloud) -> std::io::Result<()> {
    writeln!(writer, "# .PCD v0.7 - Point Cloud Data file format")?;
    writeln!(writer, "VERSION 0.7")?;
    writeln!(writer, "FIELDS x y z")?;
    writeln!(writer, "SIZE 4 4 4")?;
    writeln!(writer, "TYPE F F F")?;
    writeln!(writer, "COUNT 1 1 1")?;
    writeln!(writer, "WIDTH {}", cloud.len())?;
    writeln!(writer, "HEIGHT 1")?;
    writeln!(writer, "VIEWPOINT 0 0 0 1 0 0 0")?;
    writeln!(writer, "POINTS {}", cloud.len())?;
    writeln!(writer, "DATA ascii")?;

    for p in cloud.iter() {
        writeln!(writer, "{} {} {}", p.x as f32, p.y as f32, p.z as f32)?;
    }

    Ok(())
}
