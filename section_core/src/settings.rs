//! Application settings: default design standard, location of external
//! material workbooks and the default render style.
//!
//! Every field has a default, so an empty JSON object (or no settings file
//! at all) is valid:
//!
//! ```json
//! {
//!   "standard": "MSZ 15022",
//!   "material_dir": "/srv/tables",
//!   "render": { "fill_color": "wheat", "opacity": 0.7 }
//! }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::material_tables::TableSource;
use crate::materials::DesignStandard;
use crate::render::RenderStyle;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Standard used when nothing else selects one (demo section, listings)
    pub standard: DesignStandard,
    /// Root of external CSV workbooks, laid out as `<root>/<slug>/<sheet>.csv`
    pub material_dir: Option<PathBuf>,
    pub render: RenderStyle,
}

impl AppSettings {
    /// Where material sheets are read from
    pub fn table_source(&self) -> TableSource {
        match &self.material_dir {
            Some(dir) => TableSource::Directory(dir.clone()),
            None => TableSource::BuiltIn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings: AppSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.table_source(), TableSource::BuiltIn);
        assert_eq!(settings.render.fill_color, "lightgray");
    }

    #[test]
    fn test_partial_settings() {
        let json = r#"{ "standard": "MSZ 15022", "material_dir": "/srv/tables", "render": { "opacity": 0.7 } }"#;
        let settings: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.standard, DesignStandard::Msz15022);
        assert_eq!(settings.table_source(), TableSource::Directory(PathBuf::from("/srv/tables")));
        assert_eq!(settings.render.opacity, 0.7);
        assert_eq!(settings.render.edge_color, "black");
    }
}
