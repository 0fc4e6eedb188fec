//! # Reinforcement Layout
//!
//! Longitudinal bar groups, stirrup groups and the prestressing definition
//! entered alongside the section outline.
//!
//! ## Bar Placement
//!
//! A bar group is a horizontal line of equal bars at one height. The bars
//! are spread evenly between the section edges at that height, less the
//! side cover and half a bar diameter:
//!
//! ```text
//!   │← cover →●─────●─────●─────●← cover →│   height_mm
//!   x = -(w/2 - c - ø/2)            x = +(w/2 - c - ø/2)
//! ```
//!
//! A single bar sits on the centreline.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::geometry::Vertex;
use crate::materials::{SafetyFactors, StrandGrade, EP_STRAND_MPA};
use crate::profile::Profile;

/// Upper bound on bars in one group and on strands in one prestress row
pub const MAX_BARS_PER_ROW: u32 = 200;

/// Area of one round bar of diameter `d` (mm²)
pub fn bar_area_mm2(diameter_mm: f64) -> f64 {
    PI * diameter_mm * diameter_mm / 4.0
}

// ============================================================================
// Longitudinal Bars
// ============================================================================

/// A horizontal line of identical longitudinal bars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarGroup {
    /// Bar diameter ø (mm)
    pub diameter_mm: f64,
    /// Number of bars in the line
    pub count: u32,
    /// Height of the bar centres above the section bottom (mm)
    pub height_mm: f64,
    /// Clear side cover to the outermost bars (mm)
    #[serde(default = "default_side_cover")]
    pub side_cover_mm: f64,
}

fn default_side_cover() -> f64 {
    30.0
}

impl BarGroup {
    pub fn new(diameter_mm: f64, count: u32, height_mm: f64) -> Self {
        BarGroup {
            diameter_mm,
            count,
            height_mm,
            side_cover_mm: default_side_cover(),
        }
    }

    pub fn with_side_cover(mut self, cover_mm: f64) -> Self {
        self.side_cover_mm = cover_mm;
        self
    }

    /// Total steel area of the group (mm²)
    pub fn area_mm2(&self) -> f64 {
        self.count as f64 * bar_area_mm2(self.diameter_mm)
    }

    pub fn validate(&self, index: usize) -> CalcResult<()> {
        let field = |name: &str| format!("bars[{}].{}", index, name);
        if !(self.diameter_mm > 0.0) || !self.diameter_mm.is_finite() {
            return Err(CalcError::invalid_input(
                field("diameter_mm"),
                self.diameter_mm.to_string(),
                "Bar diameter must be positive",
            ));
        }
        if self.count == 0 {
            return Err(CalcError::invalid_input(field("count"), "0", "A bar group needs at least one bar"));
        }
        if self.count > MAX_BARS_PER_ROW {
            return Err(CalcError::invalid_input(
                field("count"),
                self.count.to_string(),
                format!("A bar group holds at most {} bars", MAX_BARS_PER_ROW),
            ));
        }
        if !self.height_mm.is_finite() {
            return Err(CalcError::invalid_input(
                field("height_mm"),
                self.height_mm.to_string(),
                "Bar height must be a finite number",
            ));
        }
        if !(self.side_cover_mm >= 0.0) || !self.side_cover_mm.is_finite() {
            return Err(CalcError::invalid_input(
                field("side_cover_mm"),
                self.side_cover_mm.to_string(),
                "Side cover cannot be negative",
            ));
        }
        Ok(())
    }

    /// Bar centre positions within `profile`.
    ///
    /// If the group lies outside the profile's height range, or the bars do
    /// not fit between the covers, the bars collapse onto the centreline and
    /// a warning is logged.
    pub fn bar_positions(&self, profile: &Profile) -> Vec<Vertex> {
        let n = self.count as usize;
        if n == 0 {
            return Vec::new();
        }
        if n == 1 {
            return vec![Vertex::new(0.0, self.height_mm)];
        }

        let half_span = profile
            .width_at(self.height_mm)
            .map(|w| w / 2.0 - self.side_cover_mm - self.diameter_mm / 2.0)
            .unwrap_or(0.0);
        if half_span <= 0.0 {
            tracing::warn!(
                height_mm = self.height_mm,
                count = self.count,
                "bar group does not fit inside the section at its height"
            );
            return vec![Vertex::new(0.0, self.height_mm); n];
        }

        let step = 2.0 * half_span / (n - 1) as f64;
        (0..n)
            .map(|i| Vertex::new(-half_span + step * i as f64, self.height_mm))
            .collect()
    }

    /// Clear spacing between adjacent bars (mm), `None` for a single bar
    pub fn clear_spacing_mm(&self, profile: &Profile) -> Option<f64> {
        let positions = self.bar_positions(profile);
        if positions.len() < 2 {
            return None;
        }
        Some(positions[1].x - positions[0].x - self.diameter_mm)
    }
}

// ============================================================================
// Stirrups
// ============================================================================

/// A zone of equally spaced stirrups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StirrupGroup {
    /// Stirrup bar diameter (mm)
    pub diameter_mm: f64,
    /// Centre-to-centre spacing along the beam (mm)
    pub spacing_mm: f64,
    /// Number of vertical legs crossing the section
    #[serde(default = "default_legs")]
    pub legs: u32,
    /// Length of the beam zone covered by this group (mm)
    #[serde(default)]
    pub zone_length_mm: Option<f64>,
}

fn default_legs() -> u32 {
    2
}

impl StirrupGroup {
    pub fn new(diameter_mm: f64, spacing_mm: f64, legs: u32) -> Self {
        StirrupGroup {
            diameter_mm,
            spacing_mm,
            legs,
            zone_length_mm: None,
        }
    }

    pub fn with_zone_length(mut self, length_mm: f64) -> Self {
        self.zone_length_mm = Some(length_mm);
        self
    }

    /// Shear reinforcement area of one stirrup Asw (mm²)
    pub fn asw_mm2(&self) -> f64 {
        self.legs as f64 * bar_area_mm2(self.diameter_mm)
    }

    /// Shear reinforcement per unit length Asw/s (mm²/mm)
    pub fn asw_per_s(&self) -> f64 {
        self.asw_mm2() / self.spacing_mm
    }

    /// Stirrups needed to cover the zone, counting both ends.
    ///
    /// `None` when no zone is given or the count does not fit in a `u32`.
    pub fn stirrup_count(&self) -> Option<u32> {
        let intervals = (self.zone_length_mm? / self.spacing_mm).floor().max(0.0);
        if intervals < u32::MAX as f64 {
            Some(intervals as u32 + 1)
        } else {
            None
        }
    }

    /// Shear reinforcement ratio ρw = Asw / (s · bw)
    pub fn ratio(&self, web_width_mm: f64) -> f64 {
        if web_width_mm > 0.0 {
            self.asw_per_s() / web_width_mm
        } else {
            0.0
        }
    }

    pub fn validate(&self, index: usize) -> CalcResult<()> {
        let field = |name: &str| format!("stirrups[{}].{}", index, name);
        if !(self.diameter_mm > 0.0) || !self.diameter_mm.is_finite() {
            return Err(CalcError::invalid_input(
                field("diameter_mm"),
                self.diameter_mm.to_string(),
                "Stirrup diameter must be positive",
            ));
        }
        if !(self.spacing_mm > 0.0) || !self.spacing_mm.is_finite() {
            return Err(CalcError::invalid_input(
                field("spacing_mm"),
                self.spacing_mm.to_string(),
                "Stirrup spacing must be positive",
            ));
        }
        if self.legs == 0 {
            return Err(CalcError::invalid_input(field("legs"), "0", "A stirrup needs at least one leg"));
        }
        if let Some(len) = self.zone_length_mm {
            if !(len >= 0.0) || !len.is_finite() {
                return Err(CalcError::invalid_input(
                    field("zone_length_mm"),
                    len.to_string(),
                    "Zone length cannot be negative",
                ));
            }
            if self.stirrup_count().is_none() {
                return Err(CalcError::invalid_input(
                    field("zone_length_mm"),
                    len.to_string(),
                    "Zone is too long for the stirrup spacing",
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Prestressing
// ============================================================================

/// Prestressing strands as entered on the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrestressInput {
    /// Strand grade name from the strand table
    pub strand: String,
    /// Number of strands
    pub count: u32,
    /// Height of the strand centroid above the section bottom (mm)
    pub height_mm: f64,
    /// Initial stress σp0 as a percentage of fpk
    pub initial_stress_percent: f64,
    /// Total prestress losses as a percentage of σp0
    pub loss_percent: f64,
}

impl PrestressInput {
    pub fn validate(&self) -> CalcResult<()> {
        if self.strand.trim().is_empty() {
            return Err(CalcError::missing_field("prestress.strand"));
        }
        if self.count == 0 {
            return Err(CalcError::invalid_input("prestress.count", "0", "At least one strand is required"));
        }
        if self.count > MAX_BARS_PER_ROW {
            return Err(CalcError::invalid_input(
                "prestress.count",
                self.count.to_string(),
                format!("At most {} strands are allowed", MAX_BARS_PER_ROW),
            ));
        }
        if !self.height_mm.is_finite() {
            return Err(CalcError::invalid_input(
                "prestress.height_mm",
                self.height_mm.to_string(),
                "Strand height must be a finite number",
            ));
        }
        for (name, value) in [
            ("prestress.initial_stress_percent", self.initial_stress_percent),
            ("prestress.loss_percent", self.loss_percent),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(CalcError::invalid_input(name, value.to_string(), "Percentage must be between 0 and 100"));
            }
        }
        Ok(())
    }
}

/// Prestressing with its strand grade resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prestress {
    pub strand: StrandGrade,
    pub count: u32,
    pub height_mm: f64,
    pub initial_stress_percent: f64,
    pub loss_percent: f64,
}

impl Prestress {
    pub fn new(input: &PrestressInput, strand: StrandGrade) -> Self {
        Prestress {
            strand,
            count: input.count,
            height_mm: input.height_mm,
            initial_stress_percent: input.initial_stress_percent,
            loss_percent: input.loss_percent,
        }
    }

    /// Total strand area Ap (mm²)
    pub fn area_mm2(&self) -> f64 {
        self.count as f64 * self.strand.area_mm2
    }

    /// Initial stress σp0 (MPa)
    pub fn initial_stress_mpa(&self) -> f64 {
        self.initial_stress_percent / 100.0 * self.strand.fpk_mpa
    }

    /// Effective stress after losses σpm∞ (MPa)
    pub fn effective_stress_mpa(&self) -> f64 {
        self.initial_stress_mpa() * (1.0 - self.loss_percent / 100.0)
    }

    /// Strand strain at the initial stress εp0 = σp0/Ep
    pub fn initial_strain(&self) -> f64 {
        self.initial_stress_mpa() / EP_STRAND_MPA
    }

    /// Initial force P0 (kN)
    pub fn initial_force_kn(&self) -> f64 {
        self.area_mm2() * self.initial_stress_mpa() / 1000.0
    }

    /// Effective force after losses P∞ (kN)
    pub fn effective_force_kn(&self) -> f64 {
        self.area_mm2() * self.effective_stress_mpa() / 1000.0
    }

    /// Whether σp0 is within the jacking stress limit
    pub fn initial_stress_within_limit(&self) -> bool {
        self.initial_stress_mpa() <= self.strand.max_jacking_stress_mpa()
    }

    /// Design force capacity of the strands Ap·fpd (kN)
    pub fn design_capacity_kn(&self, factors: &SafetyFactors) -> f64 {
        self.area_mm2() * self.strand.fpd_mpa(factors) / 1000.0
    }

    /// Strand positions: one row on the centreline spaced by 3ø
    pub fn strand_positions(&self) -> Vec<Vertex> {
        let n = self.count as usize;
        let step = 3.0 * self.strand.diameter_mm;
        let start = -step * (n.saturating_sub(1)) as f64 / 2.0;
        (0..n)
            .map(|i| Vertex::new(start + step * i as f64, self.height_mm))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn strand() -> StrandGrade {
        StrandGrade {
            name: "Y1860S7-15.2".to_string(),
            fp01k_mpa: 1640.0,
            fpk_mpa: 1860.0,
            euk_percent: 3.5,
            diameter_mm: 15.2,
            area_mm2: 139.0,
        }
    }

    #[test]
    fn test_bar_group_area() {
        // 4ø20 = 4 × 314.16
        let bars = BarGroup::new(20.0, 4, 50.0);
        assert_relative_eq!(bars.area_mm2(), 1256.637, epsilon = 1e-3);
    }

    #[test]
    fn test_bar_positions_evenly_spaced() {
        let profile = Profile::rectangle(300.0, 500.0);
        let bars = BarGroup::new(20.0, 3, 50.0).with_side_cover(30.0);
        let pos = bars.bar_positions(&profile);

        // half span = 150 - 30 - 10 = 110
        assert_eq!(pos.len(), 3);
        assert_relative_eq!(pos[0].x, -110.0);
        assert_relative_eq!(pos[1].x, 0.0);
        assert_relative_eq!(pos[2].x, 110.0);
        assert!(pos.iter().all(|p| p.y == 50.0));

        // 110 - 20
        assert_relative_eq!(bars.clear_spacing_mm(&profile).unwrap(), 90.0);
    }

    #[test]
    fn test_bar_positions_follow_profile_width() {
        // Tapered: 400 wide at the bottom, 200 wide at the top
        let profile = Profile::from_pairs(&[(0.0, 400.0), (400.0, 200.0)]);
        let bars = BarGroup::new(10.0, 2, 200.0).with_side_cover(20.0);
        let pos = bars.bar_positions(&profile);
        // width at 200 = 300 → half span = 150 - 20 - 5
        assert_relative_eq!(pos[1].x, 125.0);
    }

    #[test]
    fn test_single_bar_and_misfit() {
        let profile = Profile::rectangle(100.0, 300.0);
        let single = BarGroup::new(16.0, 1, 40.0).bar_positions(&profile);
        assert_eq!(single, vec![Vertex::new(0.0, 40.0)]);

        // Above the profile's top the bars collapse onto the centreline
        let outside = BarGroup::new(16.0, 2, 400.0).bar_positions(&profile);
        assert!(outside.iter().all(|p| p.x == 0.0));
    }

    #[test]
    fn test_bar_group_validation() {
        assert!(BarGroup::new(20.0, 4, 50.0).validate(0).is_ok());

        let err = BarGroup::new(0.0, 4, 50.0).validate(2).unwrap_err();
        assert_eq!(
            err,
            CalcError::invalid_input("bars[2].diameter_mm", "0", "Bar diameter must be positive")
        );
        assert!(BarGroup::new(20.0, 0, 50.0).validate(0).is_err());
        assert!(BarGroup::new(20.0, 2, f64::NAN).validate(0).is_err());
    }

    #[test]
    fn test_bar_group_rejects_infinite_values() {
        let err = BarGroup::new(f64::INFINITY, 2, 50.0).validate(0).unwrap_err();
        assert_eq!(
            err,
            CalcError::invalid_input("bars[0].diameter_mm", "inf", "Bar diameter must be positive")
        );
        assert!(BarGroup::new(20.0, 2, 50.0)
            .with_side_cover(f64::INFINITY)
            .validate(0)
            .is_err());
    }

    #[test]
    fn test_bar_group_count_limit() {
        assert!(BarGroup::new(12.0, MAX_BARS_PER_ROW, 50.0).validate(0).is_ok());

        let err = BarGroup::new(12.0, 4_000_000_000, 50.0).validate(1).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(err.to_string().contains("bars[1].count"));
    }

    #[test]
    fn test_stirrups() {
        let stirrups = StirrupGroup::new(8.0, 150.0, 2).with_zone_length(1500.0);
        // 2 × 50.27
        assert_relative_eq!(stirrups.asw_mm2(), 100.531, epsilon = 1e-3);
        assert_relative_eq!(stirrups.asw_per_s(), 100.531 / 150.0, epsilon = 1e-5);
        assert_eq!(stirrups.stirrup_count(), Some(11));
        assert_relative_eq!(stirrups.ratio(300.0), stirrups.asw_per_s() / 300.0);

        assert!(StirrupGroup::new(8.0, 0.0, 2).validate(0).is_err());
        assert!(StirrupGroup::new(8.0, 150.0, 0).validate(0).is_err());
        assert_eq!(StirrupGroup::new(8.0, 150.0, 2).stirrup_count(), None);
    }

    #[test]
    fn test_stirrups_reject_infinite_values() {
        assert!(StirrupGroup::new(f64::INFINITY, 150.0, 2).validate(0).is_err());
        assert!(StirrupGroup::new(8.0, f64::INFINITY, 2).validate(0).is_err());
        assert!(StirrupGroup::new(8.0, 150.0, 2)
            .with_zone_length(f64::INFINITY)
            .validate(0)
            .is_err());
    }

    #[test]
    fn test_stirrup_count_beyond_u32() {
        let stirrups = StirrupGroup::new(8.0, 1.0, 2).with_zone_length(1e10);
        assert_eq!(stirrups.stirrup_count(), None);

        let err = stirrups.validate(3).unwrap_err();
        assert_eq!(
            err,
            CalcError::invalid_input("stirrups[3].zone_length_mm", "10000000000", "Zone is too long for the stirrup spacing")
        );

        // Largest zone that still counts
        let edge = StirrupGroup::new(8.0, 1.0, 2).with_zone_length(u32::MAX as f64 - 1.0);
        assert_eq!(edge.stirrup_count(), Some(u32::MAX));
        assert!(edge.validate(0).is_ok());
    }

    #[test]
    fn test_prestress_forces() {
        let input = PrestressInput {
            strand: "Y1860S7-15.2".to_string(),
            count: 4,
            height_mm: 80.0,
            initial_stress_percent: 75.0,
            loss_percent: 20.0,
        };
        assert!(input.validate().is_ok());

        let p = Prestress::new(&input, strand());
        assert_relative_eq!(p.area_mm2(), 556.0);
        assert_relative_eq!(p.initial_stress_mpa(), 1395.0);
        assert_relative_eq!(p.effective_stress_mpa(), 1116.0, max_relative = 1e-12);
        assert_relative_eq!(p.initial_force_kn(), 775.62, max_relative = 1e-12);
        assert_relative_eq!(p.effective_force_kn(), 620.496, max_relative = 1e-12);
        assert!(p.initial_stress_within_limit());
        // 1395 / 195 000
        assert_relative_eq!(p.initial_strain(), 0.0071538, epsilon = 1e-7);

        let pos = p.strand_positions();
        assert_eq!(pos.len(), 4);
        assert_relative_eq!(pos[0].x, -pos[3].x, max_relative = 1e-12);
    }

    #[test]
    fn test_prestress_percent_bounds() {
        let input = PrestressInput {
            strand: "Y1860S7-15.2".to_string(),
            count: 2,
            height_mm: 60.0,
            initial_stress_percent: 120.0,
            loss_percent: 15.0,
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_prestress_count_limit() {
        let input = PrestressInput {
            strand: "Y1860S7-15.2".to_string(),
            count: 4_000_000_000,
            height_mm: 60.0,
            initial_stress_percent: 75.0,
            loss_percent: 15.0,
        };
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("prestress.count"));
    }
}
