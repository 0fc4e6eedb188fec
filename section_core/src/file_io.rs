//! # File I/O Module
//!
//! Reading request and settings files, and writing output artifacts:
//! - **Version validation**: request files carry a schema version that must
//!   be compatible with [`SCHEMA_VERSION`]
//! - **Atomic writes**: write to `.tmp`, sync, rename, so an interrupted run
//!   never leaves a truncated SVG, PDF or JSON behind
//!
//! ## Example
//!
//! ```rust,no_run
//! use section_core::file_io::{load_request, write_artifact};
//! use section_core::material_tables::MaterialLibrary;
//! use section_core::render::{render_section_svg, RenderStyle};
//! use std::path::Path;
//!
//! let request = load_request(Path::new("girder.json"))?;
//! let library = MaterialLibrary::builtin(request.standard)?;
//! let model = request.build(&library)?;
//!
//! let svg = render_section_svg(&model, &RenderStyle::default());
//! write_artifact(Path::new("girder.svg"), svg.as_bytes())?;
//! # Ok::<(), section_core::errors::CalcError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::errors::{CalcError, CalcResult};
use crate::request::{SectionRequest, SCHEMA_VERSION};
use crate::settings::AppSettings;

/// Write bytes to a file with atomic semantics.
///
/// The write process:
/// 1. Write to a temporary file next to the target (`<name>.<ext>.tmp`)
/// 2. Sync to disk (fsync)
/// 3. Rename over the target
pub fn write_artifact(path: &Path, bytes: &[u8]) -> CalcResult<()> {
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(bytes).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote artifact");
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let extension = path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    path.with_extension(extension)
}

fn read_to_string(path: &Path) -> CalcResult<String> {
    let mut file = File::open(path).map_err(|e| {
        CalcError::file_error("open", path.display().to_string(), e.to_string())
    })?;

    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|e| {
        CalcError::file_error("read", path.display().to_string(), e.to_string())
    })?;
    Ok(contents)
}

/// Save a request as pretty-printed JSON.
pub fn save_request(request: &SectionRequest, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(request).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;
    write_artifact(path, json.as_bytes())
}

/// Load a request from a JSON file.
///
/// # Returns
///
/// * `Ok(SectionRequest)` - Parsed request (not yet validated)
/// * `Err(CalcError::VersionMismatch)` - File version is incompatible
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_request(path: &Path) -> CalcResult<SectionRequest> {
    let contents = read_to_string(path)?;

    let request: SectionRequest =
        serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&request.version)?;

    tracing::debug!(path = %path.display(), label = %request.label, "loaded request");
    Ok(request)
}

/// Load settings from a JSON file; missing fields take their defaults.
pub fn load_settings(path: &Path) -> CalcResult<AppSettings> {
    let contents = read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid settings in {}: {}", path.display(), e),
    })
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // For 0.x versions a newer minor may carry breaking changes
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(mismatch());
    }

    Ok(())
}
