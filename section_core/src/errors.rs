//! # Error Types
//!
//! Structured error types for section_core. Each variant carries enough
//! context to tell which input field or table caused the failure, and every
//! error serializes to JSON so front ends can report it verbatim.
//!
//! ## Example
//!
//! ```rust
//! use section_core::errors::{CalcError, CalcResult};
//!
//! fn validate_cover(cover_mm: f64) -> CalcResult<()> {
//!     if cover_mm < 0.0 {
//!         return Err(CalcError::InvalidInput {
//!             field: "cover_mm".to_string(),
//!             value: cover_mm.to_string(),
//!             reason: "Cover cannot be negative".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for section_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for section operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, wrong sign, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// The profile table has too few stations to close a polygon
    #[error("Profile needs at least {required} stations to form a polygon, got {found}")]
    InsufficientStations { found: usize, required: usize },

    /// Material grade not found in the lookup table
    #[error("Material not found: '{material_name}' in sheet '{sheet}'")]
    MaterialNotFound { material_name: String, sheet: String },

    /// A lookup table is malformed (missing key column, unparsable number)
    #[error("Malformed table '{sheet}': {reason}")]
    TableFormat { sheet: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_name: impl Into<String>, sheet: impl Into<String>) -> Self {
        CalcError::MaterialNotFound {
            material_name: material_name.into(),
            sheet: sheet.into(),
        }
    }

    /// Create a TableFormat error
    pub fn table_format(sheet: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::TableFormat {
            sheet: sheet.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::InsufficientStations { .. } => "INSUFFICIENT_STATIONS",
            CalcError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            CalcError::TableFormat { .. } => "TABLE_FORMAT",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("gamma_c", "0", "Safety factor must be positive");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("test").error_code(), "MISSING_FIELD");
        assert_eq!(
            CalcError::material_not_found("C99/115", "concrete").error_code(),
            "MATERIAL_NOT_FOUND"
        );
        assert_eq!(
            CalcError::InsufficientStations { found: 1, required: 2 }.error_code(),
            "INSUFFICIENT_STATIONS"
        );
    }

    #[test]
    fn test_insufficient_stations_message() {
        let err = CalcError::InsufficientStations { found: 1, required: 2 };
        assert_eq!(
            err.to_string(),
            "Profile needs at least 2 stations to form a polygon, got 1"
        );
    }
}
