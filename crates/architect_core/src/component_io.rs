//! Save and load component state.
//!
//! Any serde component (for example [`CubeVolume`](crate::CubeVolume) or
//! [`ObjectRotator`](crate::ObjectRotator)) can be written in one of two
//! formats, picked by extension:
//! - `.plantcomp` - Binary format with a magic header (compact)
//! - `.json` - JSON format (human readable)
//!
//! # Example
//!
//! ```ignore
//! use architect_core::{save_component, load_component, CubeVolume};
//!
//! save_component(&volume, "volumes/field.json")?;
//! let volume: CubeVolume = load_component("volumes/field.json")?;
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Magic bytes for binary component files
const MAGIC: &[u8; 8] = b"PLNTCOMP";

/// Current file format version
const VERSION: u32 = 1;

/// Errors that can occur during component I/O.
#[derive(Debug)]
pub enum ComponentIoError {
    /// File system error
    Io(std::io::Error),
    /// Binary serialization error
    Bincode(bincode::Error),
    /// JSON serialization error
    Json(String),
    /// Invalid file format
    InvalidFormat(String),
    /// Unsupported version
    UnsupportedVersion(u32),
}

impl std::fmt::Display for ComponentIoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentIoError::Io(e) => write!(f, "IO error: {}", e),
            ComponentIoError::Bincode(e) => write!(f, "Bincode error: {}", e),
            ComponentIoError::Json(e) => write!(f, "JSON error: {}", e),
            ComponentIoError::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            ComponentIoError::UnsupportedVersion(v) => write!(f, "Unsupported version: {}", v),
        }
    }
}

impl std::error::Error for ComponentIoError {}

impl From<std::io::Error> for ComponentIoError {
    fn from(e: std::io::Error) -> Self {
        ComponentIoError::Io(e)
    }
}

impl From<bincode::Error> for ComponentIoError {
    fn from(e: bincode::Error) -> Self {
        ComponentIoError::Bincode(e)
    }
}

/// Result type for component I/O.
pub type ComponentIoResult<T> = Result<T, ComponentIoError>;

/// On-disk component format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentFormat {
    Binary,
    Json,
}

impl ComponentFormat {
    /// `.json` selects JSON, anything else binary.
    pub fn from_path(path: &Path) -> Self {
        if path.to_string_lossy().to_lowercase().ends_with(".json") {
            ComponentFormat::Json
        } else {
            ComponentFormat::Binary
        }
    }
}

/// Save a component, choosing the format from the extension.
pub fn save_component<T: Serialize, P: AsRef<Path>>(
    component: &T,
    path: P,
) -> ComponentIoResult<()> {
    let path = path.as_ref();
    match ComponentFormat::from_path(path) {
        ComponentFormat::Json => save_component_json(component, path),
        ComponentFormat::Binary => save_component_binary(component, path),
    }
}

/// Load a component, choosing the format from the extension.
pub fn load_component<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> ComponentIoResult<T> {
    let path = path.as_ref();
    match ComponentFormat::from_path(path) {
        ComponentFormat::Json => load_component_json(path),
        ComponentFormat::Binary => load_component_binary(path),
    }
}

pub fn save_component_binary<T: Serialize, P: AsRef<Path>>(
    component: &T,
    path: P,
) -> ComponentIoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;

    let data = bincode::serialize(component)?;
    writer.write_all(&(data.len() as u64).to_le_bytes())?;
    writer.write_all(&data)?;

    writer.flush()?;
    Ok(())
}

pub fn load_component_binary<T: DeserializeOwned, P: AsRef<Path>>(
    path: P,
) -> ComponentIoResult<T> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    read_header(&mut reader)?;

    let mut size_bytes = [0u8; 8];
    reader.read_exact(&mut size_bytes)?;
    let size = u64::from_le_bytes(size_bytes);

    // Untrusted length: read at most `size` bytes instead of preallocating.
    let mut data = Vec::new();
    reader.take(size).read_to_end(&mut data)?;
    if data.len() as u64 != size {
        return Err(ComponentIoError::InvalidFormat(format!(
            "Payload truncated: header says {} bytes, found {}",
            size,
            data.len()
        )));
    }

    Ok(bincode::deserialize(&data)?)
}

pub fn save_component_json<T: Serialize, P: AsRef<Path>>(
    component: &T,
    path: P,
) -> ComponentIoResult<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, component)
        .map_err(|e| ComponentIoError::Json(e.to_string()))
}

pub fn load_component_json<T: DeserializeOwned, P: AsRef<Path>>(
    path: P,
) -> ComponentIoResult<T> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|e| ComponentIoError::Json(e.to_string()))
}

/// Header information of a component file.
#[derive(Debug, Clone)]
pub struct ComponentFileInfo {
    pub format: ComponentFormat,
    /// Only present for binary files
    pub version: Option<u32>,
    pub file_size: u64,
}

/// Inspect a component file without decoding its payload.
pub fn component_file_info<P: AsRef<Path>>(path: P) -> ComponentIoResult<ComponentFileInfo> {
    let path = path.as_ref();
    let file_size = std::fs::metadata(path)?.len();

    let format = ComponentFormat::from_path(path);
    let version = match format {
        ComponentFormat::Json => None,
        ComponentFormat::Binary => {
            let mut reader = BufReader::new(File::open(path)?);
            Some(read_header(&mut reader)?)
        }
    };

    Ok(ComponentFileInfo {
        format,
        version,
        file_size,
    })
}

fn read_header<R: Read>(reader: &mut R) -> ComponentIoResult<u32> {
    let mut magic = [0u8; 8];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(ComponentIoError::InvalidFormat(
            "Invalid magic bytes - not a component file".to_string(),
        ));
    }

    let mut version_bytes = [0u8; 4];
    reader.read_exact(&mut version_bytes)?;
    let version = u32::from_le_bytes(version_bytes);
    if version > VERSION {
        return Err(ComponentIoError::UnsupportedVersion(version));
    }
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube_volume::{Bound, CubeVolume};
    use crate::illumination::TriangleIlluminationEstimator;
    use crate::object_rotator::ObjectRotator;
    use bevy::math::Vec3;
    use tempfile::NamedTempFile;

    fn test_volume() -> CubeVolume {
        CubeVolume {
            min_max_bound: Bound::new(Vec3::new(-1.0, 0.0, -2.0), Vec3::new(1.0, 4.0, 2.0)),
            as_obstacle: true,
            display_bounds: true,
            display_points: false,
        }
    }

    #[test]
    fn test_save_load_binary() {
        let volume = test_volume();
        let temp_file = NamedTempFile::with_suffix(".plantcomp").unwrap();

        save_component_binary(&volume, temp_file.path()).unwrap();
        let loaded: CubeVolume = load_component_binary(temp_file.path()).unwrap();

        assert_eq!(loaded.min_max_bound, volume.min_max_bound);
        assert!(loaded.as_obstacle);
        assert!(loaded.display_bounds);
    }

    #[test]
    fn test_auto_format_detection() {
        let rotator = ObjectRotator::new(Vec3::new(0.0, 45.0, 0.0), 2.0);

        let temp_binary = NamedTempFile::with_suffix(".plantcomp").unwrap();
        save_component(&rotator, temp_binary.path()).unwrap();
        assert_eq!(load_component::<ObjectRotator, _>(temp_binary.path()).unwrap(), rotator);

        let temp_json = NamedTempFile::with_suffix(".json").unwrap();
        save_component(&rotator, temp_json.path()).unwrap();
        assert_eq!(load_component::<ObjectRotator, _>(temp_json.path()).unwrap(), rotator);
    }

    #[test]
    fn test_estimator_report_is_not_persisted() {
        let estimator = TriangleIlluminationEstimator {
            display_probes: true,
            last_report: None,
        };
        let temp_json = NamedTempFile::with_suffix(".json").unwrap();
        save_component(&estimator, temp_json.path()).unwrap();

        let text = std::fs::read_to_string(temp_json.path()).unwrap();
        assert!(!text.contains("last_report"));
        let loaded: TriangleIlluminationEstimator = load_component(temp_json.path()).unwrap();
        assert!(loaded.display_probes);
        assert!(loaded.last_report.is_none());
    }

    #[test]
    fn test_invalid_magic() {
        let temp_file = NamedTempFile::with_suffix(".plantcomp").unwrap();
        let mut file = File::create(temp_file.path()).unwrap();
        file.write_all(b"INVALID!").unwrap();

        let result = load_component_binary::<CubeVolume, _>(temp_file.path());
        assert!(matches!(result, Err(ComponentIoError::InvalidFormat(_))));
    }

    #[test]
    fn test_future_version_rejected() {
        let temp_file = NamedTempFile::with_suffix(".plantcomp").unwrap();
        let mut file = File::create(temp_file.path()).unwrap();
        file.write_all(MAGIC).unwrap();
        file.write_all(&(VERSION + 1).to_le_bytes()).unwrap();

        let result = load_component_binary::<CubeVolume, _>(temp_file.path());
        assert!(matches!(result, Err(ComponentIoError::UnsupportedVersion(_))));
    }

    #[test]
    fn test_oversized_length_rejected() {
        let temp_file = NamedTempFile::with_suffix(".plantcomp").unwrap();
        let mut file = File::create(temp_file.path()).unwrap();
        file.write_all(MAGIC).unwrap();
        file.write_all(&VERSION.to_le_bytes()).unwrap();
        file.write_all(&u64::MAX.to_le_bytes()).unwrap();
        file.write_all(&[1, 2, 3]).unwrap();
        drop(file);

        let result = load_component_binary::<CubeVolume, _>(temp_file.path());
        assert!(matches!(result, Err(ComponentIoError::InvalidFormat(_))));
    }

    #[test]
    fn test_component_file_info() {
        let temp_file = NamedTempFile::with_suffix(".plantcomp").unwrap();
        save_component_binary(&test_volume(), temp_file.path()).unwrap();

        let info = component_file_info(temp_file.path()).unwrap();
        assert_eq!(info.format, ComponentFormat::Binary);
        assert_eq!(info.version, Some(VERSION));
        assert!(info.file_size > 0);
    }
}
