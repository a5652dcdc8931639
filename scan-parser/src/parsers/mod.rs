use std::path::Path;

use scan_core::pointcloud::point::PointCloud;

use crate::error::LoadError;

pub mod pcd;
pub mod ply;

pub trait ParserProvider {
    fn get_parser(&self) -> Box<dyn Parser>;
}

pub trait Parser {
    fn parse(&self) -> Result<PointCloud, LoadError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Pcd,
    Ply,
}

pub fn get_extension(path: &Path) -> Result<Extension, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("pcd") => Ok(Extension::Pcd),
        Some("ply") => Ok(Extension::Ply),
        _ => Err(LoadError::UnsupportedExtension {
            path: path.to_path_buf(),
        }),
    }
}

/// Picks the parser matching the file's extension.
pub fn parser_for(path: &Path) -> Result<Box<dyn Parser>, LoadError> {
    let provider: Box<dyn ParserProvider> = match get_extension(path)? {
        Extension::Pcd => Box::new(pcd::PcdParserProvider {
            path: path.to_path_buf(),
        }),
        Extension::Ply => Box::new(ply::PlyParserProvider {
            path: path.to_path_buf(),
        }),
    };
    Ok(provider.get_parser())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn extension_dispatch_is_case_insensitive() {
        assert_eq!(
            get_extension(Path::new("scan.PCD")).unwrap(),
            Extension::Pcd
        );
        assert_eq!(
            get_extension(Path::new("merged.ply")).unwrap(),
            Extension::Ply
        );
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = get_extension(Path::new("scan.las")).unwrap_err();
        match err {
            LoadError::UnsupportedExtension { path } => {
                assert_eq!(path, PathBuf::from("scan.las"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
