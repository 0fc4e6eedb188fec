//! Reinforcing and Prestressing Steel Grades
//!
//! Property sets for reinforcing bars and prestressing strands as read from
//! the lookup tables of the selected standard.
//!
//! ## Notation
//!
//! - `fyk` = characteristic yield strength of reinforcement
//! - `ftk` = characteristic tensile strength of reinforcement
//! - `fp0.1k` = characteristic 0.1% proof stress of prestressing steel
//! - `fpk` = characteristic tensile strength of prestressing steel
//! - `εuk` = characteristic strain at maximum force

use serde::{Deserialize, Serialize};

use super::SafetyFactors;

/// Elastic modulus of reinforcing steel Es (MPa)
pub const ES_MPA: f64 = 200_000.0;

/// Elastic modulus of prestressing strand Ep (MPa)
pub const EP_STRAND_MPA: f64 = 195_000.0;

/// Reinforcing bar grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReinforcementGrade {
    /// Grade name (e.g., "B500B")
    pub name: String,
    /// Characteristic yield strength fyk (MPa)
    pub fyk_mpa: f64,
    /// Characteristic tensile strength ftk (MPa)
    pub ftk_mpa: f64,
    /// Characteristic strain at maximum force εuk (%)
    pub euk_percent: f64,
}

impl ReinforcementGrade {
    /// Design yield strength fyd = fyk/γs (MPa)
    pub fn fyd_mpa(&self, factors: &SafetyFactors) -> f64 {
        self.fyk_mpa / factors.gamma_s
    }

    /// Ductility ratio k = ftk/fyk
    pub fn ductility_k(&self) -> f64 {
        if self.fyk_mpa > 0.0 {
            self.ftk_mpa / self.fyk_mpa
        } else {
            0.0
        }
    }

    /// Design yield strain εyd = fyd/Es
    pub fn eps_yd(&self, factors: &SafetyFactors) -> f64 {
        self.fyd_mpa(factors) / ES_MPA
    }
}

/// Prestressing strand grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrandGrade {
    /// Grade name (e.g., "Y1860S7-15.2")
    pub name: String,
    /// Characteristic 0.1% proof stress fp0.1k (MPa)
    pub fp01k_mpa: f64,
    /// Characteristic tensile strength fpk (MPa)
    pub fpk_mpa: f64,
    /// Characteristic strain at maximum force εuk (%)
    pub euk_percent: f64,
    /// Nominal strand diameter (mm)
    pub diameter_mm: f64,
    /// Nominal cross-sectional area of one strand (mm²)
    pub area_mm2: f64,
}

impl StrandGrade {
    /// Design strength fpd = fp0.1k/γp (MPa)
    pub fn fpd_mpa(&self, factors: &SafetyFactors) -> f64 {
        self.fp01k_mpa / factors.gamma_p
    }

    /// Upper limit of the jacking stress: min(0.8·fpk, 0.9·fp0.1k) (MPa)
    pub fn max_jacking_stress_mpa(&self) -> f64 {
        (0.8 * self.fpk_mpa).min(0.9 * self.fp01k_mpa)
    }
}
