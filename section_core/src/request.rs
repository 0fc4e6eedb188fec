//! # Section Request
//!
//! The complete set of user inputs for one cross-section: design standard,
//! material selections, safety factors, outline, topping slab and
//! reinforcement. A request is validated once and then built into a
//! [`SectionModel`] against a [`MaterialLibrary`]; nothing downstream reads
//! raw form values.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "version": "0.1.0",
//!   "label": "G-1 Main girder",
//!   "standard": "EC2:2010",
//!   "materials": { "concrete": "C30/37", "rebar": "B500B" },
//!   "profile": [
//!     { "height_mm": 0.0,   "width_mm": 300.0 },
//!     { "height_mm": 600.0, "width_mm": 300.0 }
//!   ],
//!   "topping": { "thickness_mm": 120.0, "width_mm": 1200.0 },
//!   "bars": [
//!     { "diameter_mm": 25.0, "count": 4, "height_mm": 55.0 }
//!   ],
//!   "stirrups": [
//!     { "diameter_mm": 8.0, "spacing_mm": 150.0, "legs": 2 }
//!   ]
//! }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use section_core::material_tables::MaterialLibrary;
//! use section_core::materials::DesignStandard;
//! use section_core::profile::Profile;
//! use section_core::reinforcement::BarGroup;
//! use section_core::request::SectionRequest;
//!
//! let request = SectionRequest::new("B-1", DesignStandard::Ec2_2010, "C25/30", "B500B", Profile::rectangle(250.0, 500.0))
//!     .with_bar_group(BarGroup::new(20.0, 3, 50.0));
//!
//! let library = MaterialLibrary::builtin(DesignStandard::Ec2_2010).unwrap();
//! let model = request.build(&library).unwrap();
//! let summary = model.summarize();
//!
//! assert!((summary.properties.area_mm2 - 125_000.0).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::geometry::{SectionGeometry, ToppingSlab};
use crate::material_tables::MaterialLibrary;
use crate::materials::{DesignStandard, SafetyFactors};
use crate::profile::{Profile, MIN_STATIONS};
use crate::reinforcement::{BarGroup, Prestress, PrestressInput, StirrupGroup};
use crate::section::SectionModel;

/// Current schema version for request files
pub const SCHEMA_VERSION: &str = "0.1.0";

fn schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

/// Material grade names picked from the standard's tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSelection {
    /// Concrete grade of the beam (key of the concrete sheet)
    pub concrete: String,
    /// Reinforcing steel grade (key of the rebar sheet)
    pub rebar: String,
}

/// Topping slab as entered; concrete defaults to the beam's grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToppingInput {
    pub thickness_mm: f64,
    pub width_mm: f64,
    #[serde(default)]
    pub concrete: Option<String>,
}

impl ToppingInput {
    pub fn slab(&self) -> ToppingSlab {
        ToppingSlab {
            thickness_mm: self.thickness_mm,
            width_mm: self.width_mm,
        }
    }
}

/// Everything entered for one cross-section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRequest {
    /// Schema version of the serialized request
    #[serde(default = "schema_version")]
    pub version: String,

    /// User label (e.g., "G-1", "Edge beam at axis 3")
    pub label: String,

    /// Design standard; selects the material workbook
    #[serde(default)]
    pub standard: DesignStandard,

    pub materials: MaterialSelection,

    /// Partial factors; the standard's defaults when omitted
    #[serde(default)]
    pub factors: Option<SafetyFactors>,

    /// Outline stations (height, width)
    pub profile: Profile,

    #[serde(default)]
    pub topping: Option<ToppingInput>,

    #[serde(default)]
    pub bars: Vec<BarGroup>,

    #[serde(default)]
    pub stirrups: Vec<StirrupGroup>,

    #[serde(default)]
    pub prestress: Option<PrestressInput>,
}

impl SectionRequest {
    pub fn new(
        label: impl Into<String>,
        standard: DesignStandard,
        concrete: impl Into<String>,
        rebar: impl Into<String>,
        profile: Profile,
    ) -> Self {
        SectionRequest {
            version: schema_version(),
            label: label.into(),
            standard,
            materials: MaterialSelection {
                concrete: concrete.into(),
                rebar: rebar.into(),
            },
            factors: None,
            profile,
            topping: None,
            bars: Vec::new(),
            stirrups: Vec::new(),
            prestress: None,
        }
    }

    /// Inverted-T precast beam with a cast-in-place topping, used by the
    /// CLI when no request file is given.
    pub fn example() -> Self {
        let profile = Profile::from_pairs(&[
            (0.0, 500.0),
            (150.0, 500.0),
            (150.0, 250.0),
            (650.0, 250.0),
        ]);
        SectionRequest::new("Demo inverted-T beam", DesignStandard::Ec2_2010, "C40/50", "B500B", profile)
            .with_topping(ToppingInput {
                thickness_mm: 100.0,
                width_mm: 1000.0,
                concrete: Some("C25/30".to_string()),
            })
            .with_bar_group(BarGroup::new(20.0, 4, 50.0))
            .with_bar_group(BarGroup::new(12.0, 2, 610.0))
            .with_stirrups(StirrupGroup::new(8.0, 100.0, 2).with_zone_length(1200.0))
            .with_stirrups(StirrupGroup::new(8.0, 200.0, 2).with_zone_length(3600.0))
            .with_prestress(PrestressInput {
                strand: "Y1860S7-12.5".to_string(),
                count: 4,
                height_mm: 100.0,
                initial_stress_percent: 75.0,
                loss_percent: 18.0,
            })
    }

    pub fn with_factors(mut self, factors: SafetyFactors) -> Self {
        self.factors = Some(factors);
        self
    }

    pub fn with_topping(mut self, topping: ToppingInput) -> Self {
        self.topping = Some(topping);
        self
    }

    pub fn with_bar_group(mut self, bars: BarGroup) -> Self {
        self.bars.push(bars);
        self
    }

    pub fn with_stirrups(mut self, stirrups: StirrupGroup) -> Self {
        self.stirrups.push(stirrups);
        self
    }

    pub fn with_prestress(mut self, prestress: PrestressInput) -> Self {
        self.prestress = Some(prestress);
        self
    }

    /// Factors in effect: explicit values or the standard's defaults
    pub fn effective_factors(&self) -> SafetyFactors {
        self.factors.unwrap_or_else(|| self.standard.default_factors())
    }

    /// Validate input parameters.
    ///
    /// Station heights and widths are only checked for being finite numbers.
    /// Repeated heights and negative widths pass and are reported by the
    /// polygon constructor.
    pub fn validate(&self) -> CalcResult<()> {
        if self.materials.concrete.trim().is_empty() {
            return Err(CalcError::missing_field("materials.concrete"));
        }
        if self.materials.rebar.trim().is_empty() {
            return Err(CalcError::missing_field("materials.rebar"));
        }

        let factors = self.effective_factors();
        for (name, value) in [
            ("factors.gamma_c", factors.gamma_c),
            ("factors.gamma_s", factors.gamma_s),
            ("factors.gamma_p", factors.gamma_p),
            ("factors.alpha_cc", factors.alpha_cc),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(CalcError::invalid_input(name, value.to_string(), "Factor must be a positive number"));
            }
        }

        if self.profile.len() < MIN_STATIONS {
            return Err(CalcError::InsufficientStations {
                found: self.profile.len(),
                required: MIN_STATIONS,
            });
        }
        for (i, s) in self.profile.stations().iter().enumerate() {
            if !s.height_mm.is_finite() || !s.width_mm.is_finite() {
                return Err(CalcError::invalid_input(
                    format!("profile[{}]", i),
                    format!("({}, {})", s.height_mm, s.width_mm),
                    "Station height and width must be finite numbers",
                ));
            }
        }

        if let Some(topping) = &self.topping {
            for (name, value) in [
                ("topping.thickness_mm", topping.thickness_mm),
                ("topping.width_mm", topping.width_mm),
            ] {
                if !(value > 0.0) || !value.is_finite() {
                    return Err(CalcError::invalid_input(name, value.to_string(), "Topping dimension must be positive"));
                }
            }
        }

        for (i, bars) in self.bars.iter().enumerate() {
            bars.validate(i)?;
        }
        for (i, stirrups) in self.stirrups.iter().enumerate() {
            stirrups.validate(i)?;
        }
        if let Some(prestress) = &self.prestress {
            prestress.validate()?;
        }

        Ok(())
    }

    /// Validate, resolve materials and construct the section model.
    ///
    /// # Errors
    ///
    /// - any error from [`SectionRequest::validate`]
    /// - `InvalidInput` when `library` belongs to another standard
    /// - `MaterialNotFound` for grade names missing from the tables
    pub fn build(&self, library: &MaterialLibrary) -> CalcResult<SectionModel> {
        self.validate()?;

        if library.standard != self.standard {
            return Err(CalcError::invalid_input(
                "standard",
                self.standard.display_name(),
                format!("Material tables are for {}", library.standard),
            ));
        }

        let concrete = library.concrete(&self.materials.concrete)?;
        let rebar = library.rebar(&self.materials.rebar)?;

        let polygon = self.profile.to_polygon()?;
        let mut geometry = SectionGeometry::new(polygon);
        let mut topping_concrete = None;
        if let Some(topping) = &self.topping {
            geometry = geometry.with_topping(topping.slab());
            topping_concrete = match &topping.concrete {
                Some(name) => Some(library.concrete(name)?),
                None => Some(concrete.clone()),
            };
        }

        let prestress = match &self.prestress {
            Some(input) => Some(Prestress::new(input, library.strand(&input.strand)?)),
            None => None,
        };

        tracing::debug!(
            label = %self.label,
            standard = %self.standard,
            bar_groups = self.bars.len(),
            stirrup_groups = self.stirrups.len(),
            topping = self.topping.is_some(),
            "built section model"
        );

        Ok(SectionModel {
            label: self.label.clone(),
            standard: self.standard,
            factors: self.effective_factors(),
            profile: self.profile.clone(),
            geometry,
            concrete,
            topping_concrete,
            rebar,
            bars: self.bars.clone(),
            stirrups: self.stirrups.clone(),
            prestress,
        })
    }
}
