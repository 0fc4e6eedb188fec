//! Concrete Strength Classes
//!
//! Characteristic compressive strength and the derived mean properties per
//! EN 1992-1-1 Table 3.1. The grade name and `fck` come from the lookup
//! table of the selected standard; everything else is computed.

use serde::{Deserialize, Serialize};

use super::SafetyFactors;

/// A concrete strength class resolved from a lookup table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteGrade {
    /// Grade name as listed in the table (e.g., "C30/37")
    pub name: String,
    /// Characteristic cylinder strength fck (MPa)
    pub fck_mpa: f64,
    /// Characteristic cube strength fck,cube (MPa), when tabulated
    #[serde(default)]
    pub fck_cube_mpa: Option<f64>,
}

impl ConcreteGrade {
    pub fn new(name: impl Into<String>, fck_mpa: f64) -> Self {
        ConcreteGrade {
            name: name.into(),
            fck_mpa,
            fck_cube_mpa: None,
        }
    }

    /// Mean compressive strength fcm = fck + 8 (MPa)
    pub fn fcm_mpa(&self) -> f64 {
        self.fck_mpa + 8.0
    }

    /// Mean axial tensile strength fctm (MPa)
    ///
    /// - fck ≤ 50: 0.30·fck^(2/3)
    /// - fck > 50: 2.12·ln(1 + fcm/10)
    pub fn fctm_mpa(&self) -> f64 {
        if self.fck_mpa <= 50.0 {
            0.30 * self.fck_mpa.max(0.0).powf(2.0 / 3.0)
        } else {
            2.12 * (1.0 + self.fcm_mpa() / 10.0).ln()
        }
    }

    /// Secant modulus of elasticity Ecm = 22·(fcm/10)^0.3 GPa, returned in MPa
    pub fn ecm_mpa(&self) -> f64 {
        22_000.0 * (self.fcm_mpa() / 10.0).powf(0.3)
    }

    /// Design compressive strength fcd = αcc·fck/γc (MPa)
    pub fn fcd_mpa(&self, factors: &SafetyFactors) -> f64 {
        factors.alpha_cc * self.fck_mpa / factors.gamma_c
    }
}

impl std::fmt::Display for ConcreteGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
