//! # Section Model and Summary
//!
//! A [`SectionModel`] is a fully resolved cross-section: geometry, material
//! grades, factors and reinforcement. [`SectionModel::summarize`] derives
//! every reported value into a [`SectionSummary`], which is what the CLI,
//! the SVG renderer and the PDF report consume.
//!
//! The summary carries no capacity verification. It reports gross section
//! properties, design strengths, reinforcement quantities and prestress
//! forces.

use serde::{Deserialize, Serialize};

use crate::geometry::{PartRole, SectionGeometry, SectionProperties, Vertex, TOLERANCE};
use crate::materials::{ConcreteGrade, DesignStandard, ReinforcementGrade, SafetyFactors};
use crate::profile::Profile;
use crate::reinforcement::{BarGroup, Prestress, StirrupGroup};

/// A validated, material-resolved cross-section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionModel {
    pub label: String,
    pub standard: DesignStandard,
    pub factors: SafetyFactors,
    pub profile: Profile,
    pub geometry: SectionGeometry,
    pub concrete: ConcreteGrade,
    /// Topping slab concrete, present exactly when the geometry has a topping
    pub topping_concrete: Option<ConcreteGrade>,
    pub rebar: ReinforcementGrade,
    pub bars: Vec<BarGroup>,
    pub stirrups: Vec<StirrupGroup>,
    pub prestress: Option<Prestress>,
}

impl SectionModel {
    /// Centre positions of every longitudinal bar, paired with its diameter
    pub fn bar_layout(&self) -> Vec<(Vertex, f64)> {
        self.bars
            .iter()
            .flat_map(|group| {
                group
                    .bar_positions(&self.profile)
                    .into_iter()
                    .map(move |p| (p, group.diameter_mm))
            })
            .collect()
    }

    /// Centre positions of the prestressing strands, paired with their diameter
    pub fn strand_layout(&self) -> Vec<(Vertex, f64)> {
        self.prestress
            .as_ref()
            .map(|p| {
                p.strand_positions()
                    .into_iter()
                    .map(|v| (v, p.strand.diameter_mm))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Narrowest positive width of the beam profile, used as bw
    pub fn web_width_mm(&self) -> f64 {
        self.profile
            .stations()
            .iter()
            .map(|s| s.width_mm)
            .filter(|w| *w > 0.0)
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    fn within_profile_height(&self, height_mm: f64) -> bool {
        self.profile
            .height_range()
            .is_some_and(|(lo, hi)| height_mm >= lo - TOLERANCE && height_mm <= hi + TOLERANCE)
    }

    /// Compute the summary of this section.
    pub fn summarize(&self) -> SectionSummary {
        let properties = self.geometry.properties();
        let beam_properties = self
            .geometry
            .part(PartRole::Beam)
            .map(|p| SectionProperties::of_polygon(&p.polygon))
            .unwrap_or(properties);

        let mut warnings = Vec::new();
        if beam_properties.area_mm2 <= TOLERANCE {
            warnings.push("Beam profile encloses no area".to_string());
        }

        let materials = MaterialSummary {
            concrete: ConcreteSummary::new(&self.concrete, &self.factors),
            topping_concrete: self
                .topping_concrete
                .as_ref()
                .map(|c| ConcreteSummary::new(c, &self.factors)),
            rebar: RebarSummary {
                name: self.rebar.name.clone(),
                fyk_mpa: self.rebar.fyk_mpa,
                fyd_mpa: self.rebar.fyd_mpa(&self.factors),
                ftk_mpa: self.rebar.ftk_mpa,
                euk_percent: self.rebar.euk_percent,
                ductility_k: self.rebar.ductility_k(),
                eps_yd: self.rebar.eps_yd(&self.factors),
            },
            strand: self.prestress.as_ref().map(|p| StrandSummary {
                name: p.strand.name.clone(),
                fp01k_mpa: p.strand.fp01k_mpa,
                fpk_mpa: p.strand.fpk_mpa,
                fpd_mpa: p.strand.fpd_mpa(&self.factors),
            }),
        };

        let longitudinal = self.longitudinal_summary(&properties, beam_properties.area_mm2, &mut warnings);

        let web_width = self.web_width_mm();
        let shear = self
            .stirrups
            .iter()
            .map(|s| StirrupSummary {
                label: format!("ø{}/{}", fmt_mm(s.diameter_mm), fmt_mm(s.spacing_mm)),
                legs: s.legs,
                asw_per_s_mm2_per_mm: s.asw_per_s(),
                count: s.stirrup_count(),
                ratio: s.ratio(web_width),
            })
            .collect();

        let prestress = self.prestress.as_ref().map(|p| {
            if !self.within_profile_height(p.height_mm) {
                warnings.push(format!(
                    "Strands at {} mm lie outside the beam profile",
                    fmt_mm(p.height_mm)
                ));
            }
            if !p.initial_stress_within_limit() {
                warnings.push(format!(
                    "Initial strand stress {:.0} MPa exceeds the jacking limit {:.0} MPa",
                    p.initial_stress_mpa(),
                    p.strand.max_jacking_stress_mpa()
                ));
            }
            PrestressSummary {
                strand: p.strand.name.clone(),
                count: p.count,
                area_mm2: p.area_mm2(),
                height_mm: p.height_mm,
                eccentricity_mm: properties.centroid_y_mm - p.height_mm,
                initial_stress_mpa: p.initial_stress_mpa(),
                initial_strain: p.initial_strain(),
                effective_stress_mpa: p.effective_stress_mpa(),
                initial_force_kn: p.initial_force_kn(),
                effective_force_kn: p.effective_force_kn(),
                design_capacity_kn: p.design_capacity_kn(&self.factors),
            }
        });

        for w in &warnings {
            tracing::warn!(label = %self.label, "{}", w);
        }
        tracing::debug!(
            label = %self.label,
            area_mm2 = properties.area_mm2,
            centroid_y_mm = properties.centroid_y_mm,
            "summarized section"
        );

        SectionSummary {
            label: self.label.clone(),
            standard: self.standard,
            factors: self.factors,
            properties,
            beam_properties,
            materials,
            longitudinal,
            shear,
            prestress,
            warnings,
        }
    }

    fn longitudinal_summary(
        &self,
        properties: &SectionProperties,
        beam_area_mm2: f64,
        warnings: &mut Vec<String>,
    ) -> LongitudinalSummary {
        let groups: Vec<BarGroupSummary> = self
            .bars
            .iter()
            .map(|g| {
                if !self.within_profile_height(g.height_mm) {
                    warnings.push(format!(
                        "Bar group {}ø{} at {} mm lies outside the beam profile",
                        g.count,
                        fmt_mm(g.diameter_mm),
                        fmt_mm(g.height_mm)
                    ));
                }
                let clear_spacing = g.clear_spacing_mm(&self.profile);
                if let Some(s) = clear_spacing {
                    if s < g.diameter_mm {
                        warnings.push(format!(
                            "Clear spacing of {}ø{} at {} mm is {:.0} mm, less than the bar diameter",
                            g.count,
                            fmt_mm(g.diameter_mm),
                            fmt_mm(g.height_mm),
                            s
                        ));
                    }
                }
                BarGroupSummary {
                    label: format!("{}ø{}", g.count, fmt_mm(g.diameter_mm)),
                    area_mm2: g.area_mm2(),
                    height_mm: g.height_mm,
                    clear_spacing_mm: clear_spacing,
                }
            })
            .collect();

        let total_area: f64 = groups.iter().map(|g| g.area_mm2).sum();

        // Tension steel: groups below the gross centroid
        let (tension_area, tension_moment) = self
            .bars
            .iter()
            .filter(|g| g.height_mm < properties.centroid_y_mm)
            .fold((0.0, 0.0), |(a, m), g| (a + g.area_mm2(), m + g.area_mm2() * g.height_mm));

        let effective_depth = if tension_area > 0.0 {
            Some(properties.top_y_mm - tension_moment / tension_area)
        } else {
            None
        };

        LongitudinalSummary {
            groups,
            total_area_mm2: total_area,
            tension_area_mm2: tension_area,
            effective_depth_mm: effective_depth,
            ratio: if beam_area_mm2 > TOLERANCE {
                total_area / beam_area_mm2
            } else {
                0.0
            },
        }
    }
}

/// Format a millimetre value without a trailing ".0"
fn fmt_mm(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

// ============================================================================
// Summary Types
// ============================================================================

/// Everything derived from a [`SectionModel`], ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub label: String,
    pub standard: DesignStandard,
    pub factors: SafetyFactors,
    /// Gross properties of the composite section (beam plus topping)
    pub properties: SectionProperties,
    /// Gross properties of the beam alone
    pub beam_properties: SectionProperties,
    pub materials: MaterialSummary,
    pub longitudinal: LongitudinalSummary,
    pub shear: Vec<StirrupSummary>,
    pub prestress: Option<PrestressSummary>,
    /// Non-fatal observations about the input
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSummary {
    pub concrete: ConcreteSummary,
    pub topping_concrete: Option<ConcreteSummary>,
    pub rebar: RebarSummary,
    pub strand: Option<StrandSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteSummary {
    pub name: String,
    pub fck_mpa: f64,
    pub fcd_mpa: f64,
    pub fctm_mpa: f64,
    pub ecm_mpa: f64,
}

impl ConcreteSummary {
    fn new(grade: &ConcreteGrade, factors: &SafetyFactors) -> Self {
        ConcreteSummary {
            name: grade.name.clone(),
            fck_mpa: grade.fck_mpa,
            fcd_mpa: grade.fcd_mpa(factors),
            fctm_mpa: grade.fctm_mpa(),
            ecm_mpa: grade.ecm_mpa(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebarSummary {
    pub name: String,
    pub fyk_mpa: f64,
    pub fyd_mpa: f64,
    pub ftk_mpa: f64,
    pub euk_percent: f64,
    /// k = ftk / fyk
    pub ductility_k: f64,
    /// εyd = fyd / Es
    pub eps_yd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrandSummary {
    pub name: String,
    pub fp01k_mpa: f64,
    pub fpk_mpa: f64,
    pub fpd_mpa: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarGroupSummary {
    /// e.g. "4ø20"
    pub label: String,
    pub area_mm2: f64,
    pub height_mm: f64,
    pub clear_spacing_mm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongitudinalSummary {
    pub groups: Vec<BarGroupSummary>,
    /// Total longitudinal steel As (mm²)
    pub total_area_mm2: f64,
    /// Steel below the gross centroid (mm²)
    pub tension_area_mm2: f64,
    /// Depth from the top fibre to the tension steel centroid (mm)
    pub effective_depth_mm: Option<f64>,
    /// As / Ac of the beam
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StirrupSummary {
    /// e.g. "ø8/150"
    pub label: String,
    pub legs: u32,
    pub asw_per_s_mm2_per_mm: f64,
    pub count: Option<u32>,
    /// ρw = Asw / (s·bw)
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrestressSummary {
    pub strand: String,
    pub count: u32,
    pub area_mm2: f64,
    pub height_mm: f64,
    /// Distance from the composite centroid down to the strands (mm)
    pub eccentricity_mm: f64,
    pub initial_stress_mpa: f64,
    /// εp0 = σp0 / Ep
    pub initial_strain: f64,
    pub effective_stress_mpa: f64,
    pub initial_force_kn: f64,
    pub effective_force_kn: f64,
    pub design_capacity_kn: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material_tables::MaterialLibrary;
    use crate::reinforcement::PrestressInput;
    use crate::request::{SectionRequest, ToppingInput};
    use approx::assert_relative_eq;

    fn build(request: &SectionRequest) -> SectionModel {
        let library = MaterialLibrary::builtin(request.standard).unwrap();
        request.build(&library).unwrap()
    }

    fn rectangular() -> SectionRequest {
        SectionRequest::new("R-1", DesignStandard::Ec2_2010, "C30/37", "B500B", Profile::rectangle(300.0, 500.0))
            .with_bar_group(BarGroup::new(20.0, 4, 50.0))
            .with_bar_group(BarGroup::new(12.0, 2, 450.0))
    }

    #[test]
    fn test_rectangular_summary() {
        let summary = build(&rectangular()).summarize();

        assert_relative_eq!(summary.properties.area_mm2, 150_000.0, max_relative = 1e-12);
        assert_relative_eq!(summary.properties.centroid_y_mm, 250.0, max_relative = 1e-12);
        assert_relative_eq!(summary.properties.i_mm4, 300.0 * 500f64.powi(3) / 12.0, max_relative = 1e-9);

        assert_relative_eq!(summary.materials.concrete.fcd_mpa, 20.0, max_relative = 1e-12);
        assert_relative_eq!(summary.materials.rebar.fyd_mpa, 500.0 / 1.15, max_relative = 1e-12);
        assert!(summary.materials.strand.is_none());
        assert!(summary.materials.topping_concrete.is_none());

        let area_20 = 4.0 * std::f64::consts::PI * 100.0;
        let area_12 = 2.0 * std::f64::consts::PI * 36.0;
        assert_relative_eq!(summary.longitudinal.total_area_mm2, area_20 + area_12, max_relative = 1e-12);
        assert_relative_eq!(summary.longitudinal.tension_area_mm2, area_20, max_relative = 1e-12);
        assert_relative_eq!(summary.longitudinal.effective_depth_mm.unwrap(), 450.0, max_relative = 1e-12);
        assert_eq!(summary.longitudinal.groups[0].label, "4ø20");
        assert!(summary.warnings.is_empty());
    }

    #[test]
    fn test_topping_raises_centroid() {
        let plain = build(&rectangular()).summarize();
        let composite = build(&rectangular().with_topping(ToppingInput {
            thickness_mm: 100.0,
            width_mm: 1000.0,
            concrete: None,
        }))
        .summarize();

        // 150 000 mm² at 250 plus 100 000 mm² at 550
        assert_relative_eq!(composite.properties.area_mm2, 250_000.0, max_relative = 1e-12);
        assert_relative_eq!(composite.properties.centroid_y_mm, 370.0, max_relative = 1e-12);
        assert_relative_eq!(composite.properties.top_y_mm, 600.0);
        assert_eq!(composite.beam_properties, plain.properties);
        // Effective depth measured from the top of the slab
        assert_relative_eq!(composite.longitudinal.effective_depth_mm.unwrap(), 550.0, max_relative = 1e-12);
        assert!(composite.materials.topping_concrete.is_some());
    }

    #[test]
    fn test_shear_summary() {
        let request = rectangular().with_stirrups(StirrupGroup::new(8.0, 150.0, 2).with_zone_length(1500.0));
        let summary = build(&request).summarize();
        let shear = &summary.shear[0];

        let asw = 2.0 * std::f64::consts::PI * 16.0;
        assert_eq!(shear.label, "ø8/150");
        assert_relative_eq!(shear.asw_per_s_mm2_per_mm, asw / 150.0, max_relative = 1e-12);
        assert_eq!(shear.count, Some(11));
        assert_relative_eq!(shear.ratio, asw / 150.0 / 300.0, max_relative = 1e-12);
    }

    #[test]
    fn test_prestress_summary() {
        let request = rectangular().with_prestress(PrestressInput {
            strand: "Y1860S7-15.2".to_string(),
            count: 2,
            height_mm: 100.0,
            initial_stress_percent: 75.0,
            loss_percent: 20.0,
        });
        let summary = build(&request).summarize();
        let ps = summary.prestress.unwrap();

        assert_relative_eq!(ps.area_mm2, 278.0);
        assert_relative_eq!(ps.initial_stress_mpa, 1395.0, max_relative = 1e-12);
        assert_relative_eq!(ps.effective_stress_mpa, 1116.0, max_relative = 1e-12);
        assert_relative_eq!(ps.initial_force_kn, 278.0 * 1395.0 / 1000.0, max_relative = 1e-12);
        assert_relative_eq!(ps.eccentricity_mm, 150.0, max_relative = 1e-12);
        assert_eq!(summary.materials.strand.unwrap().name, "Y1860S7-15.2");
    }

    #[test]
    fn test_crowded_bars_warn() {
        let request = SectionRequest::new("N-1", DesignStandard::Ec2_2010, "C30/37", "B500B", Profile::rectangle(200.0, 400.0))
            .with_bar_group(BarGroup::new(25.0, 5, 50.0));
        let summary = build(&request).summarize();
        assert_eq!(summary.warnings.len(), 1);
        assert!(summary.warnings[0].contains("5ø25"));
    }

    #[test]
    fn test_reinforcement_outside_profile_warns() {
        let request = SectionRequest::new("O-1", DesignStandard::Ec2_2010, "C30/37", "B500B", Profile::rectangle(300.0, 500.0))
            .with_bar_group(BarGroup::new(16.0, 2, 650.0))
            .with_prestress(PrestressInput {
                strand: "Y1860S7-15.2".to_string(),
                count: 2,
                height_mm: -20.0,
                initial_stress_percent: 70.0,
                loss_percent: 20.0,
            });
        let summary = build(&request).summarize();

        assert!(summary
            .warnings
            .contains(&"Bar group 2ø16 at 650 mm lies outside the beam profile".to_string()));
        assert!(summary
            .warnings
            .contains(&"Strands at -20 mm lie outside the beam profile".to_string()));

        // Bars inside the outline raise no such warning
        let inside = build(&rectangular()).summarize();
        assert!(inside.warnings.iter().all(|w| !w.contains("outside")));
    }

    #[test]
    fn test_steel_strains_in_summary() {
        let summary = build(&SectionRequest::example()).summarize();
        let rebar = &summary.materials.rebar;
        assert_relative_eq!(rebar.ductility_k, rebar.ftk_mpa / rebar.fyk_mpa, max_relative = 1e-12);
        assert_relative_eq!(rebar.eps_yd, rebar.fyd_mpa / 200_000.0, max_relative = 1e-12);

        let ps = summary.prestress.unwrap();
        assert_relative_eq!(ps.initial_strain, ps.initial_stress_mpa / 195_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_layouts() {
        let model = build(&SectionRequest::example());
        assert_eq!(model.bar_layout().len(), 6);
        assert_eq!(model.strand_layout().len(), 4);
        assert_relative_eq!(model.web_width_mm(), 250.0);
    }

    #[test]
    fn test_summary_serializes() {
        let summary = build(&SectionRequest::example()).summarize();
        let json = serde_json::to_string(&summary).unwrap();
        let back: SectionSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.label, summary.label);
        assert_eq!(back.longitudinal.groups.len(), 2);
    }
}
