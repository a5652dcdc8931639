use std::fs;
use std::path::{Path, PathBuf};

use scan_core::pointcloud::point::{Point, PointCloud};

use super::{Parser, ParserProvider};
use crate::error::LoadError;

pub struct PcdParserProvider {
    pub path: PathBuf,
}

impl ParserProvider for PcdParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(PcdParser {
            path: self.path.clone(),
        })
    }
}

pub struct PcdParser {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
struct FieldSpec {
    name: String,
    size: usize,
    type_code: char,
    count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataFormat {
    Ascii,
    Binary,
}

struct PcdHeader {
    fields: Vec<FieldSpec>,
    point_count: usize,
    format: DataFormat,
    // byte offset of the first payload byte, just past the DATA line
    payload_offset: usize,
}

impl PcdHeader {
    fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    // token index of a field in an ASCII record (COUNT-aware)
    fn token_offset(&self, index: usize) -> usize {
        self.fields[..index].iter().map(|f| f.count).sum()
    }

    // byte offset of a field in a binary record
    fn byte_offset(&self, index: usize) -> usize {
        self.fields[..index].iter().map(|f| f.size * f.count).sum()
    }

    fn record_size(&self) -> usize {
        self.fields.iter().map(|f| f.size * f.count).sum()
    }
}

fn parse_header(path: &Path, raw: &[u8]) -> Result<PcdHeader, LoadError> {
    let mut fields: Vec<FieldSpec> = Vec::new();
    let mut sizes: Vec<usize> = Vec::new();
    let mut types: Vec<char> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    let mut point_count: Option<usize> = None;

    let mut offset = 0usize;
    while offset < raw.len() {
        let line_end = raw[offset..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|p| offset + p)
            .ok_or_else(|| LoadError::malformed(path, "missing DATA line in PCD header"))?;
        let line = std::str::from_utf8(&raw[offset..line_end])
            .map_err(|_| LoadError::malformed(path, "PCD header is not valid UTF-8"))?
            .trim_end_matches('\r');
        offset = line_end + 1;

        let mut tokens = line.split_whitespace();
        let keyword = match tokens.next() {
            Some(k) => k,
            None => continue,
        };
        if keyword.starts_with('#') {
            continue;
        }

        match keyword {
            "FIELDS" => {
                fields = tokens
                    .map(|name| FieldSpec {
                        name: name.to_string(),
                        size: 4,
                        type_code: 'F',
                        count: 1,
                    })
                    .collect();
            }
            "SIZE" => {
                sizes = tokens
                    .map(|t| t.parse())
                    .collect::<Result<_, _>>()
                    .map_err(|_| LoadError::malformed(path, "invalid SIZE entry"))?;
            }
            "TYPE" => {
                types = tokens
                    .map(|t| t.chars().next().unwrap_or('?'))
                    .collect();
            }
            "COUNT" => {
                counts = tokens
                    .map(|t| t.parse())
                    .collect::<Result<_, _>>()
                    .map_err(|_| LoadError::malformed(path, "invalid COUNT entry"))?;
            }
            "POINTS" => {
                point_count = Some(
                    tokens
                        .next()
                        .and_then(|t| t.parse().ok())
                        .ok_or_else(|| LoadError::malformed(path, "invalid POINTS entry"))?,
                );
            }
            "DATA" => {
                let format = match tokens.next() {
                    Some("ascii") => DataFormat::Ascii,
                    Some("binary") => DataFormat::Binary,
                    other => {
                        return Err(LoadError::malformed(
                            path,
                            format!("unsupported DATA format {:?}", other),
                        ))
                    }
                };

                if fields.is_empty() {
                    return Err(LoadError::malformed(path, "PCD header has no FIELDS"));
                }
                for (i, field) in fields.iter_mut().enumerate() {
                    if let Some(&size) = sizes.get(i) {
                        field.size = size;
                    }
                    if let Some(&type_code) = types.get(i) {
                        field.type_code = type_code;
                    }
                    if let Some(&count) = counts.get(i) {
                        field.count = count;
                    }
                }

                return Ok(PcdHeader {
                    fields,
                    point_count: point_count
                        .ok_or_else(|| LoadError::malformed(path, "PCD header has no POINTS"))?,
                    format,
                    payload_offset: offset,
                });
            }
            // VERSION, WIDTH, HEIGHT, VIEWPOINT carry nothing we need
            _ => {}
        }
    }

    Err(LoadError::malformed(path, "missing DATA line in PCD header"))
}

fn xyz_indices(path: &Path, header: &PcdHeader) -> Result<[usize; 3], LoadError> {
    let indices = ["x", "y", "z"].map(|name| header.field_index(name));
    match indices {
        [Some(x), Some(y), Some(z)] => Ok([x, y, z]),
        _ => Err(LoadError::malformed(path, "PCD is missing x/y/z fields")),
    }
}

fn parse_ascii(path: &Path, header: &PcdHeader, payload: &[u8]) -> Result<Vec<Point>, LoadError> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| LoadError::malformed(path, "ASCII PCD payload is not valid UTF-8"))?;
    let [xi, yi, zi] = xyz_indices(path, header)?;
    let offsets = [
        header.token_offset(xi),
        header.token_offset(yi),
        header.token_offset(zi),
    ];

    let mut points = Vec::with_capacity(header.point_count);
    for (line_no, line) in text.lines().enumerate() {
        if points.len() == header.point_count {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let mut coords = [0.0f64; 3];
        for (c, &offset) in coords.iter_mut().zip(offsets.iter()) {
            let token = tokens.get(offset).ok_or_else(|| {
                LoadError::malformed(path, format!("truncated record on data line {}", line_no + 1))
            })?;
            *c = token.parse().map_err(|_| {
                LoadError::malformed(
                    path,
                    format!("invalid coordinate {:?} on data line {}", token, line_no + 1),
                )
            })?;
        }
        points.push(Point::new(coords[0], coords[1], coords[2]));
    }

    if points.len() != header.point_count {
        return Err(LoadError::malformed(
            path,
            format!(
                "expected {} points, found {}",
                header.point_count,
                points.len()
            ),
        ));
    }

    Ok(points)
}

fn read_float(path: &Path, bytes: &[u8], size: usize) -> Result<f64, LoadError> {
    match size {
        4 => Ok(f32::from_le_bytes(bytes[..4].try_into().unwrap()) as f64),
        8 => Ok(f64::from_le_bytes(bytes[..8].try_into().unwrap())),
        _ => Err(LoadError::malformed(
            path,
            format!("unsupported coordinate size {}", size),
        )),
    }
}

fn parse_binary(path: &Path, header: &PcdHeader, payload: &[u8]) -> Result<Vec<Point>, LoadError> {
    let [xi, yi, zi] = xyz_indices(path, header)?;
    for &i in &[xi, yi, zi] {
        if header.fields[i].type_code != 'F' {
            return Err(LoadError::malformed(path, "x/y/z fields must be TYPE F"));
        }
    }

    let record_size = header.record_size();
    let needed = record_size * header.point_count;
    if payload.len() < needed {
        return Err(LoadError::malformed(
            path,
            format!(
                "binary payload too short: {} bytes, expected {}",
                payload.len(),
                needed
            ),
        ));
    }

    let offsets = [xi, yi, zi].map(|i| (header.byte_offset(i), header.fields[i].size));

    let mut points = Vec::with_capacity(header.point_count);
    for record in payload[..needed].chunks_exact(record_size) {
        let x = read_float(path, &record[offsets[0].0..], offsets[0].1)?;
        let y = read_float(path, &record[offsets[1].0..], offsets[1].1)?;
        let z = read_float(path, &record[offsets[2].0..], offsets[2].1)?;
        points.push(Point::new(x, y, z));
    }

    Ok(points)
}

impl Parser for PcdParser {
    fn parse(&self) -> Result<PointCloud, LoadError> {
        let raw = fs::read(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;

        let header = parse_header(&self.path, &raw)?;
        let payload = &raw[header.payload_offset..];

        let points = match header.format {
            DataFormat::Ascii => parse_ascii(&self.path, &header, payload)?,
            DataFormat::Binary => parse_binary(&self.path, &header, payload)?,
        };

        Ok(PointCloud::new(points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_temp(contents: &[u8], ext: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(ext).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    const ASCII_PCD: &str = "\
# .PCD v0.7 - Point Cloud Data file format
VERSION 0.7
FIELDS x y z
SIZE 4 4 4
TYPE F F F
COUNT 1 1 1
WIDTH 3
HEIGHT 1
VIEWPOINT 0 0 0 1 0 0 0
POINTS 3
DATA ascii
1.0 2.0 3.0
-4.5 0.25 9.0
0 0 0
";

    #[test]
    fn parses_ascii_pcd() {
        let file = write_temp(ASCII_PCD.as_bytes(), ".pcd");
        let parser = PcdParser {
            path: file.path().to_path_buf(),
        };
        let cloud = parser.parse().unwrap();

        assert_eq!(cloud.len(), 3);
        assert_eq!(cloud.points[0], Point::new(1.0, 2.0, 3.0));
        assert_eq!(cloud.points[1], Point::new(-4.5, 0.25, 9.0));
    }

    #[test]
    fn parses_binary_pcd_with_extra_field() {
        let mut data = Vec::new();
        let header = "VERSION 0.7\nFIELDS x y z intensity\nSIZE 4 4 4 4\nTYPE F F F F\nCOUNT 1 1 1 1\nWIDTH 2\nHEIGHT 1\nPOINTS 2\nDATA binary\n";
        data.extend_from_slice(header.as_bytes());
        for (x, y, z, i) in [(1.0f32, 2.0f32, 3.0f32, 0.5f32), (4.0, 5.0, 6.0, 0.7)] {
            data.extend_from_slice(&x.to_le_bytes());
            data.extend_from_slice(&y.to_le_bytes());
            data.extend_from_slice(&z.to_le_bytes());
            data.extend_from_slice(&i.to_le_bytes());
        }

        let file = write_temp(&data, ".pcd");
        let parser = PcdParser {
            path: file.path().to_path_buf(),
        };
        let cloud = parser.parse().unwrap();

        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.points[1], Point::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn truncated_ascii_payload_is_malformed() {
        let pcd = "\
FIELDS x y z
SIZE 4 4 4
TYPE F F F
COUNT 1 1 1
POINTS 5
DATA ascii
1.0 2.0 3.0
4.0 5.0 6.0
";
        let file = write_temp(pcd.as_bytes(), ".pcd");
        let parser = PcdParser {
            path: file.path().to_path_buf(),
        };
        assert!(matches!(parser.parse(), Err(LoadError::Malformed { .. })));
    }

    #[test]
    fn ascii_records_beyond_declared_points_are_ignored() {
        let pcd = "\
FIELDS x y z
SIZE 4 4 4
TYPE F F F
COUNT 1 1 1
POINTS 1
DATA ascii
1.0 2.0 3.0
4.0 5.0 6.0
";
        let file = write_temp(pcd.as_bytes(), ".pcd");
        let parser = PcdParser {
            path: file.path().to_path_buf(),
        };
        let cloud = parser.parse().unwrap();
        assert_eq!(cloud.len(), 1);
        assert_eq!(cloud.points[0], Point::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn truncated_binary_payload_is_malformed() {
        let mut data = Vec::new();
        data.extend_from_slice(
            b"FIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nCOUNT 1 1 1\nPOINTS 2\nDATA binary\n",
        );
        data.extend_from_slice(&1.0f32.to_le_bytes());

        let file = write_temp(&data, ".pcd");
        let parser = PcdParser {
            path: file.path().to_path_buf(),
        };
        assert!(matches!(
            parser.parse(),
            Err(LoadError::Malformed { .. })
        ));
    }

    #[test]
    fn header_without_data_line_is_malformed() {
        let file = write_temp(b"VERSION 0.7\nFIELDS x y z\n", ".pcd");
        let parser = PcdParser {
            path: file.path().to_path_buf(),
        };
        assert!(matches!(parser.parse(), Err(LoadError::Malformed { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let parser = PcdParser {
            path: PathBuf::from("/nonexistent/cloud.pcd"),
        };
        assert!(matches!(parser.parse(), Err(LoadError::Io { .. })));
    }
}
