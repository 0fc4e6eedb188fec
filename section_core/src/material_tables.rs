//! # Material Lookup Tables
//!
//! Each design standard has one material workbook with three sheets:
//!
//! | Sheet | Key column | Property columns |
//! |---|---|---|
//! | `concrete` | `concrete` | `fck`, `fck_cube` |
//! | `rebar` | `rebar` | `fyk`, `ftk`, `euk` |
//! | `strand` | `strand` | `fp01k`, `fpk`, `euk`, `diameter`, `area` |
//!
//! The built-in workbooks are compiled into the library. An external
//! workbook is a directory holding one `<sheet>.csv` per sheet, laid out as
//! `<root>/<standard slug>/<sheet>.csv`.
//!
//! Loaded sheets are cached for the lifetime of the process, keyed by
//! `(source, standard, sheet)`. The tables are small and static, so entries
//! are never evicted.
//!
//! ## Example
//!
//! ```rust
//! use section_core::material_tables::{MaterialLibrary, TableSource};
//! use section_core::materials::DesignStandard;
//!
//! let library = MaterialLibrary::load(DesignStandard::Ec2_2010, &TableSource::BuiltIn).unwrap();
//! assert!(library.concrete_names().contains(&"C30/37"));
//!
//! let c30 = library.concrete("C30/37").unwrap();
//! assert_eq!(c30.fck_mpa, 30.0);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::materials::{ConcreteGrade, DesignStandard, ReinforcementGrade, StrandGrade};

// ============================================================================
// Sheets
// ============================================================================

/// The three sheets of a material workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SheetKind {
    Concrete,
    Rebar,
    Strand,
}

impl SheetKind {
    pub const ALL: [SheetKind; 3] = [SheetKind::Concrete, SheetKind::Rebar, SheetKind::Strand];

    /// Sheet name, also the CSV file stem
    pub fn sheet_name(&self) -> &'static str {
        match self {
            SheetKind::Concrete => "concrete",
            SheetKind::Rebar => "rebar",
            SheetKind::Strand => "strand",
        }
    }

    /// Column holding the unique material name
    pub fn key_column(&self) -> &'static str {
        self.sheet_name()
    }

    /// Numeric columns every row must provide
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            SheetKind::Concrete => &["fck"],
            SheetKind::Rebar => &["fyk", "ftk", "euk"],
            SheetKind::Strand => &["fp01k", "fpk", "euk", "diameter", "area"],
        }
    }

    fn builtin_csv(&self, standard: DesignStandard) -> &'static str {
        match (standard, self) {
            (DesignStandard::Ec2_2010, SheetKind::Concrete) => include_str!("../assets/materials/ec2/concrete.csv"),
            (DesignStandard::Ec2_2010, SheetKind::Rebar) => include_str!("../assets/materials/ec2/rebar.csv"),
            (DesignStandard::Ec2_2010, SheetKind::Strand) => include_str!("../assets/materials/ec2/strand.csv"),
            (DesignStandard::Msz15022, SheetKind::Concrete) => include_str!("../assets/materials/msz/concrete.csv"),
            (DesignStandard::Msz15022, SheetKind::Rebar) => include_str!("../assets/materials/msz/rebar.csv"),
            (DesignStandard::Msz15022, SheetKind::Strand) => include_str!("../assets/materials/msz/strand.csv"),
        }
    }
}

/// One row of a sheet: the material name and its numeric properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRow {
    pub name: String,
    pub values: HashMap<String, f64>,
}

impl MaterialRow {
    /// Value of a column (case-insensitive)
    pub fn get(&self, column: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(column))
            .map(|(_, v)| *v)
    }

    fn require(&self, column: &str, sheet: &str) -> CalcResult<f64> {
        self.get(column).ok_or_else(|| {
            CalcError::table_format(sheet, format!("row '{}' has no value for '{}'", self.name, column))
        })
    }
}

/// A parsed material sheet. Row order follows the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSheet {
    pub kind: SheetKind,
    rows: Vec<MaterialRow>,
}

impl MaterialSheet {
    /// Parse CSV text.
    ///
    /// The header must contain the sheet's key column and every required
    /// column. Blank lines and lines starting with `#` are skipped. Material
    /// names must be unique within the sheet.
    pub fn parse_csv(kind: SheetKind, text: &str) -> CalcResult<Self> {
        let sheet = kind.sheet_name();
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'));

        let header_line = lines
            .next()
            .ok_or_else(|| CalcError::table_format(sheet, "table is empty"))?;
        let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();
        let col_index = |name: &str| -> Option<usize> {
            headers.iter().position(|h| h.eq_ignore_ascii_case(name))
        };

        let key_idx = col_index(kind.key_column()).ok_or_else(|| {
            CalcError::table_format(sheet, format!("missing key column '{}'", kind.key_column()))
        })?;
        for column in kind.required_columns() {
            if col_index(*column).is_none() {
                return Err(CalcError::table_format(sheet, format!("missing column '{}'", column)));
            }
        }

        let mut rows: Vec<MaterialRow> = Vec::new();
        for line in lines {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let name = fields.get(key_idx).copied().unwrap_or("");
            if name.is_empty() {
                continue;
            }
            if rows.iter().any(|r| r.name == name) {
                return Err(CalcError::table_format(sheet, format!("duplicate material '{}'", name)));
            }

            let mut values = HashMap::new();
            for (i, header) in headers.iter().enumerate() {
                if i == key_idx {
                    continue;
                }
                let raw = fields.get(i).copied().unwrap_or("");
                if raw.is_empty() {
                    continue;
                }
                let value: f64 = raw.parse().map_err(|_| {
                    CalcError::table_format(
                        sheet,
                        format!("'{}' is not a number (row '{}', column '{}')", raw, name, header),
                    )
                })?;
                values.insert(header.to_string(), value);
            }

            rows.push(MaterialRow {
                name: name.to_string(),
                values,
            });
        }

        Ok(MaterialSheet { kind, rows })
    }

    /// Material names in table order (selection list contents)
    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[MaterialRow] {
        &self.rows
    }

    /// Exact-name lookup
    pub fn row(&self, name: &str) -> CalcResult<&MaterialRow> {
        self.rows
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| CalcError::material_not_found(name, self.kind.sheet_name()))
    }
}

// ============================================================================
// Sources and Cache
// ============================================================================

/// Where material workbooks come from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TableSource {
    /// Tables compiled into the library
    #[default]
    BuiltIn,
    /// Directory of CSV workbooks, one subdirectory per standard
    Directory(PathBuf),
}

impl TableSource {
    /// Path of a sheet file, `None` for built-in tables
    pub fn sheet_path(&self, standard: DesignStandard, kind: SheetKind) -> Option<PathBuf> {
        match self {
            TableSource::BuiltIn => None,
            TableSource::Directory(root) => Some(
                root.join(standard.slug())
                    .join(format!("{}.csv", kind.sheet_name())),
            ),
        }
    }
}

type SheetKey = (TableSource, DesignStandard, SheetKind);

static SHEET_CACHE: Lazy<Mutex<HashMap<SheetKey, Arc<MaterialSheet>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Load a sheet, memoised on its arguments for the process lifetime.
pub fn load_sheet(source: &TableSource, standard: DesignStandard, kind: SheetKind) -> CalcResult<Arc<MaterialSheet>> {
    let key: SheetKey = (source.clone(), standard, kind);

    if let Some(sheet) = lock_cache()?.get(&key) {
        return Ok(Arc::clone(sheet));
    }

    let sheet = Arc::new(read_sheet(source, standard, kind)?);
    tracing::info!(
        standard = %standard,
        sheet = kind.sheet_name(),
        rows = sheet.rows().len(),
        "loaded material sheet"
    );

    // Another caller may have filled the slot meanwhile; keep the first entry.
    let mut cache = lock_cache()?;
    let cached = Arc::clone(cache.entry(key).or_insert(sheet));
    tracing::debug!(cached_sheets = cache.len(), "material sheet cache updated");
    Ok(cached)
}

fn lock_cache() -> CalcResult<std::sync::MutexGuard<'static, HashMap<SheetKey, Arc<MaterialSheet>>>> {
    SHEET_CACHE.lock().map_err(|_| CalcError::Internal {
        message: "material sheet cache lock poisoned".to_string(),
    })
}

fn read_sheet(source: &TableSource, standard: DesignStandard, kind: SheetKind) -> CalcResult<MaterialSheet> {
    match source.sheet_path(standard, kind) {
        None => MaterialSheet::parse_csv(kind, kind.builtin_csv(standard)),
        Some(path) => {
            let text = read_to_string(&path)?;
            MaterialSheet::parse_csv(kind, &text)
        }
    }
}

fn read_to_string(path: &Path) -> CalcResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))
}

// ============================================================================
// Material Library
// ============================================================================

/// All three sheets of one standard's workbook, ready for grade lookups.
#[derive(Debug, Clone)]
pub struct MaterialLibrary {
    pub standard: DesignStandard,
    concrete: Arc<MaterialSheet>,
    rebar: Arc<MaterialSheet>,
    strand: Arc<MaterialSheet>,
}

impl MaterialLibrary {
    pub fn load(standard: DesignStandard, source: &TableSource) -> CalcResult<Self> {
        Ok(MaterialLibrary {
            standard,
            concrete: load_sheet(source, standard, SheetKind::Concrete)?,
            rebar: load_sheet(source, standard, SheetKind::Rebar)?,
            strand: load_sheet(source, standard, SheetKind::Strand)?,
        })
    }

    /// Built-in tables for a standard
    pub fn builtin(standard: DesignStandard) -> CalcResult<Self> {
        MaterialLibrary::load(standard, &TableSource::BuiltIn)
    }

    pub fn sheet(&self, kind: SheetKind) -> &MaterialSheet {
        match kind {
            SheetKind::Concrete => &self.concrete,
            SheetKind::Rebar => &self.rebar,
            SheetKind::Strand => &self.strand,
        }
    }

    pub fn concrete_names(&self) -> Vec<&str> {
        self.concrete.names()
    }

    pub fn rebar_names(&self) -> Vec<&str> {
        self.rebar.names()
    }

    pub fn strand_names(&self) -> Vec<&str> {
        self.strand.names()
    }

    pub fn concrete(&self, name: &str) -> CalcResult<ConcreteGrade> {
        let sheet = SheetKind::Concrete.sheet_name();
        let row = self.concrete.row(name)?;
        Ok(ConcreteGrade {
            name: row.name.clone(),
            fck_mpa: row.require("fck", sheet)?,
            fck_cube_mpa: row.get("fck_cube"),
        })
    }

    pub fn rebar(&self, name: &str) -> CalcResult<ReinforcementGrade> {
        let sheet = SheetKind::Rebar.sheet_name();
        let row = self.rebar.row(name)?;
        Ok(ReinforcementGrade {
            name: row.name.clone(),
            fyk_mpa: row.require("fyk", sheet)?,
            ftk_mpa: row.require("ftk", sheet)?,
            euk_percent: row.require("euk", sheet)?,
        })
    }

    pub fn strand(&self, name: &str) -> CalcResult<StrandGrade> {
        let sheet = SheetKind::Strand.sheet_name();
        let row = self.strand.row(name)?;
        Ok(StrandGrade {
            name: row.name.clone(),
            fp01k_mpa: row.require("fp01k", sheet)?,
            fpk_mpa: row.require("fpk", sheet)?,
            euk_percent: row.require("euk", sheet)?,
            diameter_mm: row.require("diameter", sheet)?,
            area_mm2: row.require("area", sheet)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use std::fs;

    #[test]
    fn test_builtin_tables_parse() {
        for standard in DesignStandard::ALL {
            let library = MaterialLibrary::builtin(standard).unwrap();
            for kind in SheetKind::ALL {
                assert!(!library.sheet(kind).rows().is_empty(), "{} {:?} is empty", standard, kind);
            }
        }
    }

    #[test]
    fn test_ec2_lookups() {
        let library = MaterialLibrary::builtin(DesignStandard::Ec2_2010).unwrap();

        let c30 = library.concrete("C30/37").unwrap();
        assert_eq!(c30.fck_mpa, 30.0);
        assert_eq!(c30.fck_cube_mpa, Some(37.0));

        let b500b = library.rebar("B500B").unwrap();
        assert_eq!(b500b.fyk_mpa, 500.0);
        assert_eq!(b500b.ftk_mpa, 540.0);
        assert_eq!(b500b.euk_percent, 5.0);

        let strand = library.strand("Y1860S7-15.2").unwrap();
        assert_eq!(strand.fpk_mpa, 1860.0);
        assert_eq!(strand.area_mm2, 139.0);
    }

    #[test]
    fn test_names_keep_table_order() {
        let library = MaterialLibrary::builtin(DesignStandard::Ec2_2010).unwrap();
        let names = library.concrete_names();
        assert_eq!(names.first(), Some(&"C12/15"));
        assert_eq!(names.last(), Some(&"C90/105"));
        assert_eq!(library.rebar_names(), vec!["B500A", "B500B", "B500C"]);
    }

    #[test]
    fn test_material_not_found() {
        let library = MaterialLibrary::builtin(DesignStandard::Msz15022).unwrap();
        let err = library.concrete("C30/37").unwrap_err();
        assert_eq!(err, CalcError::material_not_found("C30/37", "concrete"));
    }

    #[test]
    fn test_parse_rejects_missing_key_column() {
        let err = MaterialSheet::parse_csv(SheetKind::Concrete, "grade,fck\nC20,20\n").unwrap_err();
        assert_eq!(err.error_code(), "TABLE_FORMAT");
    }

    #[test]
    fn test_parse_rejects_duplicates_and_bad_numbers() {
        let dup = MaterialSheet::parse_csv(SheetKind::Concrete, "concrete,fck\nC20,20\nC20,21\n");
        assert!(matches!(dup, Err(CalcError::TableFormat { .. })));

        let bad = MaterialSheet::parse_csv(SheetKind::Concrete, "concrete,fck\nC20,twenty\n");
        assert!(matches!(bad, Err(CalcError::TableFormat { .. })));
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let text = "# custom table\nconcrete, fck\n\nC20, 20\n# retired\nC25, 25\n";
        let sheet = MaterialSheet::parse_csv(SheetKind::Concrete, text).unwrap();
        assert_eq!(sheet.names(), vec!["C20", "C25"]);
        assert_eq!(sheet.row("C25").unwrap().get("FCK"), Some(25.0));
    }

    #[test]
    fn test_directory_source_and_cache() {
        let root = temp_dir().join(format!("rcsection_tables_{}", std::process::id()));
        let dir = root.join("ec2");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("concrete.csv"), "concrete,fck\nC-custom,33\n").unwrap();

        let source = TableSource::Directory(root.clone());
        let first = load_sheet(&source, DesignStandard::Ec2_2010, SheetKind::Concrete).unwrap();
        assert_eq!(first.names(), vec!["C-custom"]);

        // Changing the file does not invalidate the cached sheet
        fs::write(dir.join("concrete.csv"), "concrete,fck\nC-other,40\n").unwrap();
        let second = load_sheet(&source, DesignStandard::Ec2_2010, SheetKind::Concrete).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // Missing sheet surfaces as a file error
        let missing = load_sheet(&source, DesignStandard::Ec2_2010, SheetKind::Rebar);
        assert!(matches!(missing, Err(CalcError::FileError { .. })));

        let _ = fs::remove_dir_all(&root);
    }
}
