use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt as _};

use scan_core::pointcloud::point::PointCloud;

use crate::error::SaveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlyEncoding {
    #[default]
    Ascii,
    BinaryLittleEndian,
}

/// Writes the cloud as a PLY vertex list with float32 coordinates.
pub fn write_ply(path: &Path, cloud: &PointCloud, encoding: PlyEncoding) -> Result<(), SaveError> {
    let file = File::create(path).map_err(|e| SaveError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    write_ply_to(&mut writer, cloud, encoding).map_err(|e| SaveError::io(path, e))?;
    writer.flush().map_err(|e| SaveError::io(path, e))
}

fn write_ply_to<W: Write>(
    writer: &mut W,
    cloud: &PointCloud,
    encoding: PlyEncoding,
) -> std::io::Result<()> {
    let format = match encoding {
        PlyEncoding::Ascii => "ascii",
        PlyEncoding::BinaryLittleEndian => "binary_little_endian",
    };

    writeln!(writer, "ply")?;
    writeln!(writer, "format {} 1.0", format)?;
    writeln!(writer, "element vertex {}", cloud.len())?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    writeln!(writer, "end_header")?;

    match encoding {
        PlyEncoding::Ascii => {
            for p in cloud.iter() {
                writeln!(writer, "{} {} {}", p.x as f32, p.y as f32, p.z as f32)?;
            }
        }
        PlyEncoding::BinaryLittleEndian => {
            for p in cloud.iter() {
                writer.write_f32::<LittleEndian>(p.x as f32)?;
                writer.write_f32::<LittleEndian>(p.y as f32)?;
                writer.write_f32::<LittleEndian>(p.z as f32)?;
            }
        }
    }

    Ok(())
}
