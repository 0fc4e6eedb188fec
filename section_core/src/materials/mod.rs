//! # Materials
//!
//! Material grades for reinforced and prestressed concrete sections, the
//! design standard they belong to, and the partial safety factors that turn
//! characteristic values into design values.
//!
//! Grade data itself lives in lookup tables (see
//! [`crate::material_tables`]); this module only holds the resolved property
//! sets.
//!
//! ## Example
//!
//! ```rust
//! use section_core::materials::{ConcreteGrade, SafetyFactors};
//!
//! let concrete = ConcreteGrade::new("C30/37", 30.0);
//! let factors = SafetyFactors::default();
//!
//! // fcd = 1.0 × 30 / 1.5
//! assert!((concrete.fcd_mpa(&factors) - 20.0).abs() < 1e-9);
//! ```

pub mod concrete;
pub mod steel;

pub use concrete::ConcreteGrade;
pub use steel::{ReinforcementGrade, StrandGrade, EP_STRAND_MPA, ES_MPA};

use serde::{Deserialize, Serialize};

/// Design standard selecting the material tables and default factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DesignStandard {
    /// EN 1992-1-1 (Eurocode 2), 2010 edition
    #[default]
    #[serde(rename = "EC2:2010")]
    Ec2_2010,
    /// Hungarian standard MSZ 15022
    #[serde(rename = "MSZ 15022")]
    Msz15022,
}

impl DesignStandard {
    pub const ALL: [DesignStandard; 2] = [DesignStandard::Ec2_2010, DesignStandard::Msz15022];

    pub fn display_name(&self) -> &'static str {
        match self {
            DesignStandard::Ec2_2010 => "EC2:2010",
            DesignStandard::Msz15022 => "MSZ 15022",
        }
    }

    /// Directory name of this standard's material workbook
    pub fn slug(&self) -> &'static str {
        match self {
            DesignStandard::Ec2_2010 => "ec2",
            DesignStandard::Msz15022 => "msz",
        }
    }

    /// Parse from a display name or slug (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        DesignStandard::ALL.into_iter().find(|candidate| {
            s.eq_ignore_ascii_case(candidate.display_name()) || s.eq_ignore_ascii_case(candidate.slug())
        })
    }

    /// Default partial factors for persistent and transient design situations
    pub fn default_factors(&self) -> SafetyFactors {
        match self {
            DesignStandard::Ec2_2010 => SafetyFactors::default(),
            DesignStandard::Msz15022 => SafetyFactors {
                gamma_c: 1.5,
                gamma_s: 1.15,
                gamma_p: 1.15,
                alpha_cc: 0.85,
            },
        }
    }
}

impl std::fmt::Display for DesignStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Partial safety factors and the long-term strength coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyFactors {
    /// Partial factor for concrete γc
    pub gamma_c: f64,
    /// Partial factor for reinforcing steel γs
    pub gamma_s: f64,
    /// Partial factor for prestressing steel γp
    pub gamma_p: f64,
    /// Long-term effects coefficient αcc
    pub alpha_cc: f64,
}

impl Default for SafetyFactors {
    fn default() -> Self {
        SafetyFactors {
            gamma_c: 1.5,
            gamma_s: 1.15,
            gamma_p: 1.15,
            alpha_cc: 1.0,
        }
    }
}
