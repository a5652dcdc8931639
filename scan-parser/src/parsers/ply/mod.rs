use std::fs;
use std::path::{Path, PathBuf};

use scan_core::pointcloud::point::{Point, PointCloud};

use super::{Parser, ParserProvider};
use crate::error::LoadError;

pub struct PlyParserProvider {
    pub path: PathBuf,
}

impl ParserProvider for PlyParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(PlyParser {
            path: self.path.clone(),
        })
    }
}

pub struct PlyParser {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
}

#[derive(Debug, Clone)]
struct Property {
    name: String,
    size: usize,
    is_float: bool,
}

struct PlyHeader {
    format: PlyFormat,
    vertex_count: usize,
    properties: Vec<Property>,
    payload_offset: usize,
}

fn property_size(path: &Path, type_name: &str) -> Result<(usize, bool), LoadError> {
    match type_name {
        "float" | "float32" => Ok((4, true)),
        "double" | "float64" => Ok((8, true)),
        "char" | "int8" | "uchar" | "uint8" => Ok((1, false)),
        "short" | "int16" | "ushort" | "uint16" => Ok((2, false)),
        "int" | "int32" | "uint" | "uint32" => Ok((4, false)),
        other => Err(LoadError::malformed(
            path,
            format!("unsupported PLY property type {:?}", other),
        )),
    }
}

fn find_line_end(raw: &[u8], start: usize) -> Option<usize> {
    raw[start..].iter().position(|&b| b == b'\n').map(|p| start + p)
}

fn parse_header(path: &Path, raw: &[u8]) -> Result<PlyHeader, LoadError> {
    let mut format = None;
    let mut vertex_count = None;
    let mut properties = Vec::new();
    let mut in_vertex_element = false;
    let mut seen_vertex_element = false;

    let mut offset = 0usize;
    let mut first_line = true;
    while offset < raw.len() {
        let line_end = find_line_end(raw, offset)
            .ok_or_else(|| LoadError::malformed(path, "missing end_header in PLY file"))?;
        let line = std::str::from_utf8(&raw[offset..line_end])
            .map_err(|_| LoadError::malformed(path, "PLY header is not valid UTF-8"))?
            .trim_end_matches('\r');
        offset = line_end + 1;

        if first_line {
            if line.trim() != "ply" {
                return Err(LoadError::malformed(path, "missing ply magic line"));
            }
            first_line = false;
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["format", "ascii", _] => format = Some(PlyFormat::Ascii),
            ["format", "binary_little_endian", _] => format = Some(PlyFormat::BinaryLittleEndian),
            ["format", other, _] => {
                return Err(LoadError::malformed(
                    path,
                    format!("unsupported PLY format {:?}", other),
                ));
            }
            ["comment", ..] | ["obj_info", ..] => {}
            ["element", "vertex", count] => {
                if seen_vertex_element {
                    return Err(LoadError::malformed(path, "duplicate vertex element"));
                }
                // Vertex data must come first in the payload for the offsets
                // below to hold; PCL and every writer we consume put it first.
                in_vertex_element = true;
                seen_vertex_element = true;
                vertex_count = Some(count.parse().map_err(|_| {
                    LoadError::malformed(path, "invalid vertex count in PLY header")
                })?);
            }
            ["element", ..] => {
                if !seen_vertex_element {
                    return Err(LoadError::malformed(
                        path,
                        "vertex element must be declared first",
                    ));
                }
                in_vertex_element = false;
            }
            ["property", "list", ..] => {
                if in_vertex_element {
                    return Err(LoadError::malformed(
                        path,
                        "list properties on vertex element are not supported",
                    ));
                }
            }
            ["property", type_name, name] => {
                if in_vertex_element {
                    let (size, is_float) = property_size(path, type_name)?;
                    properties.push(Property {
                        name: name.to_string(),
                        size,
                        is_float,
                    });
                }
            }
            ["end_header"] => {
                return Ok(PlyHeader {
                    format: format
                        .ok_or_else(|| LoadError::malformed(path, "PLY header has no format"))?,
                    vertex_count: vertex_count.ok_or_else(|| {
                        LoadError::malformed(path, "PLY header has no vertex element")
                    })?,
                    properties,
                    payload_offset: offset,
                });
            }
            [] => {}
            _ => {
                return Err(LoadError::malformed(
                    path,
                    format!("unrecognized PLY header line {:?}", line),
                ));
            }
        }
    }

    Err(LoadError::malformed(path, "missing end_header in PLY file"))
}

fn xyz_properties(path: &Path, header: &PlyHeader) -> Result<[usize; 3], LoadError> {
    let find = |name: &str| header.properties.iter().position(|p| p.name == name);
    match (find("x"), find("y"), find("z")) {
        (Some(x), Some(y), Some(z)) => {
            for &i in &[x, y, z] {
                if !header.properties[i].is_float {
                    return Err(LoadError::malformed(
                        path,
                        "vertex x/y/z must be float or double",
                    ));
                }
            }
            Ok([x, y, z])
        }
        _ => Err(LoadError::malformed(path, "PLY is missing x/y/z properties")),
    }
}

fn parse_ascii(path: &Path, header: &PlyHeader, payload: &[u8]) -> Result<Vec<Point>, LoadError> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| LoadError::malformed(path, "ASCII PLY payload is not valid UTF-8"))?;
    let [xi, yi, zi] = xyz_properties(path, header)?;

    let mut points = Vec::with_capacity(header.vertex_count);
    for line in text.lines() {
        if points.len() == header.vertex_count {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let mut coords = [0.0f64; 3];
        for (c, &index) in coords.iter_mut().zip([xi, yi, zi].iter()) {
            let token = tokens.get(index).ok_or_else(|| {
                LoadError::malformed(path, format!("truncated vertex record {:?}", line))
            })?;
            *c = token.parse().map_err(|_| {
                LoadError::malformed(path, format!("invalid vertex coordinate {:?}", token))
            })?;
        }
        points.push(Point::new(coords[0], coords[1], coords[2]));
    }

    if points.len() != header.vertex_count {
        return Err(LoadError::malformed(
            path,
            format!(
                "expected {} vertices, found {}",
                header.vertex_count,
                points.len()
            ),
        ));
    }

    Ok(points)
}

fn parse_binary(path: &Path, header: &PlyHeader, payload: &[u8]) -> Result<Vec<Point>, LoadError> {
    let [xi, yi, zi] = xyz_properties(path, header)?;

    let stride: usize = header.properties.iter().map(|p| p.size).sum();
    let needed = stride * header.vertex_count;
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

    let offset_of = |index: usize| -> usize {
        header.properties[..index].iter().map(|p| p.size).sum()
    };
    let coords = [xi, yi, zi].map(|i| (offset_of(i), header.properties[i].size));

    let mut points = Vec::with_capacity(header.vertex_count);
    for record in payload[..needed].chunks_exact(stride) {
        let mut values = [0.0f64; 3];
        for (v, &(offset, size)) in values.iter_mut().zip(coords.iter()) {
            *v = match size {
                4 => f32::from_le_bytes(record[offset..offset + 4].try_into().unwrap()) as f64,
                _ => f64::from_le_bytes(record[offset..offset + 8].try_into().unwrap()),
            };
        }
        points.push(Point::new(values[0], values[1], values[2]));
    }

    Ok(points)
}

impl Parser for PlyParser {
    fn parse(&self) -> Result<PointCloud, LoadError> {
        let raw = fs::read(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;

        let header = parse_header(&self.path, &raw)?;
        let payload = &raw[header.payload_offset..];

        let points = match header.format {
            PlyFormat::Ascii => parse_ascii(&self.path, &header, payload)?,
            PlyFormat::BinaryLittleEndian => parse_binary(&self.path, &header, payload)?,
        };

        Ok(PointCloud::new(points))
    }
}
