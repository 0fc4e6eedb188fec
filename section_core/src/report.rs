//! # PDF Report
//!
//! Generates a one-document PDF report for a cross-section using Typst: the
//! input summary, material and geometric properties, reinforcement tables
//! and the rendered section drawing.
//!
//! ## Architecture
//!
//! - The Typst template is embedded as a string constant
//! - Data is injected via string replacement before compilation
//! - The section drawing is served to Typst as a virtual `section.svg` file
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use section_core::material_tables::MaterialLibrary;
//! use section_core::materials::DesignStandard;
//! use section_core::render::RenderStyle;
//! use section_core::report::render_section_pdf;
//! use section_core::request::SectionRequest;
//!
//! let library = MaterialLibrary::builtin(DesignStandard::Ec2_2010).unwrap();
//! let model = SectionRequest::example().build(&library).unwrap();
//! let summary = model.summarize();
//!
//! let pdf = render_section_pdf(&model, &summary, &RenderStyle::default()).unwrap();
//! std::fs::write("section_report.pdf", pdf).unwrap();
//! ```

use std::path::Path;

use chrono::Utc;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::errors::{CalcError, CalcResult};
use crate::geometry::PartRole;
use crate::render::{render_section_svg, RenderStyle};
use crate::section::{ConcreteSummary, SectionModel, SectionSummary};

/// Virtual file name of the embedded section drawing
const SECTION_SVG: &str = "section.svg";

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world: one main source plus the section drawing.
struct ReportWorld {
    main: Source,
    svg: Bytes,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl ReportWorld {
    fn new(source: String, svg: String) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        ReportWorld {
            main: Source::detached(source),
            svg: Bytes::new(svg.into_bytes()),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }

    fn load_fonts() -> Vec<Font> {
        let mut fonts = Vec::new();
        for font_bytes in typst_assets::fonts() {
            let buffer = Bytes::new(font_bytes.to_vec());
            for font in Font::iter(buffer) {
                fonts.push(font);
            }
        }
        fonts
    }
}

impl World for ReportWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        let path = id.vpath().as_rootless_path();
        if path == Path::new(SECTION_SVG) {
            Ok(self.svg.clone())
        } else {
            Err(FileError::NotFound(path.into()))
        }
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

// ============================================================================
// PDF Template
// ============================================================================

const SECTION_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 2cm, bottom: 2cm, left: 2cm, right: 2cm),
  header: align(right)[
    #text(size: 8pt, fill: gray)[RC Cross-Section Report]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 8pt)[{{STANDARD}}]],
      align(center)[#text(size: 8pt)[Page #counter(page).display()]],
      align(right)[#text(size: 8pt)[{{DATE}}]],
    )
  ]
)

#set text(font: "DejaVu Sans Mono", size: 9pt)

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 16pt, weight: "bold")[Cross-Section Properties]
    #v(4pt)
    #text(size: 12pt)[{{LABEL}}]
  ]
]

#v(8pt)

#grid(
  columns: (1fr, 1fr),
  gutter: 16pt,
  [
    #align(center)[#image("section.svg", width: 90%)]
  ],
  [
    *Outline stations*
    #v(4pt)
    #table(
      columns: (1fr, 1fr),
      inset: 5pt,
      stroke: 0.5pt,
      align: (right, right),
      table.header([*Height [mm]*], [*Width [mm]*]),
{{STATION_ROWS}}
    )
{{TOPPING}}
  ]
)

== Materials

#table(
  columns: (1fr, auto, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, right, right, right),
  table.header([*Concrete*], [*f#sub[ck] [MPa]*], [*f#sub[cd] [MPa]*], [*f#sub[ctm] [MPa]*], [*E#sub[cm] [MPa]*]),
{{CONCRETE_ROWS}}
)

#table(
  columns: (1fr, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, right, right),
  table.header([*Steel*], [*Characteristic [MPa]*], [*Design [MPa]*], [*Ultimate [MPa]*]),
{{STEEL_ROWS}}
)

Partial factors: γ#sub[c] = {{GAMMA_C}}, γ#sub[s] = {{GAMMA_S}}, γ#sub[p] = {{GAMMA_P}}, α#sub[cc] = {{ALPHA_CC}}

== Gross Section Properties

#table(
  columns: (1fr, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, right, left),
  table.header([*Property*], [*Beam*], [*Composite*], [*Unit*]),
{{PROPERTY_ROWS}}
)

== Reinforcement

#table(
  columns: (1fr, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, right, right),
  table.header([*Bars*], [*A#sub[s] [mm#super[2]]*], [*Height [mm]*], [*Clear spacing [mm]*]),
{{BAR_ROWS}}
)

A#sub[s,tot] = {{AS_TOTAL}} mm#super[2], ρ#sub[l] = {{RHO_L}} %, d = {{EFFECTIVE_DEPTH}}

{{SHEAR}}

{{PRESTRESS}}

{{WARNINGS}}

#v(12pt)
#line(length: 100%, stroke: 0.5pt)
#text(size: 8pt, fill: gray)[
  Gross concrete properties; no capacity verification is included. \
  Results should be verified by a qualified engineer.
]
"##;

// ============================================================================
// PDF Rendering
// ============================================================================

/// Render a section report to PDF.
///
/// # Arguments
///
/// * `model` - The resolved section (drawn with `style`)
/// * `summary` - Values computed by [`SectionModel::summarize`]
/// * `style` - Styling of the embedded drawing
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(CalcError)` - If Typst compilation or PDF export fails
pub fn render_section_pdf(model: &SectionModel, summary: &SectionSummary, style: &RenderStyle) -> CalcResult<Vec<u8>> {
    let svg = render_section_svg(model, style);

    let effective_depth = summary
        .longitudinal
        .effective_depth_mm
        .map(|d| format!("{:.0} mm", d))
        .unwrap_or_else(|| "n/a".to_string());

    let source = fill_template(
        SECTION_TEMPLATE,
        &[
            ("LABEL", escape_typst(&summary.label)),
            ("STANDARD", escape_typst(summary.standard.display_name())),
            ("DATE", Utc::now().format("%Y-%m-%d").to_string()),
            ("STATION_ROWS", station_rows(model)),
            ("TOPPING", topping_block(model)),
            ("CONCRETE_ROWS", concrete_rows(summary)),
            ("STEEL_ROWS", steel_rows(summary)),
            ("GAMMA_C", format!("{:.2}", summary.factors.gamma_c)),
            ("GAMMA_S", format!("{:.2}", summary.factors.gamma_s)),
            ("GAMMA_P", format!("{:.2}", summary.factors.gamma_p)),
            ("ALPHA_CC", format!("{:.2}", summary.factors.alpha_cc)),
            ("PROPERTY_ROWS", property_rows(summary)),
            ("BAR_ROWS", bar_rows(summary)),
            ("AS_TOTAL", format!("{:.0}", summary.longitudinal.total_area_mm2)),
            ("RHO_L", format!("{:.2}", summary.longitudinal.ratio * 100.0)),
            ("EFFECTIVE_DEPTH", effective_depth),
            ("SHEAR", shear_block(summary)),
            ("PRESTRESS", prestress_block(summary)),
            ("WARNINGS", warnings_block(summary)),
        ],
    );

    let world = ReportWorld::new(source, svg);
    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::Internal {
            message: format!("Typst compilation failed: {}", error_msgs.join("; ")),
        }
    })?;

    let pdf_bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::Internal {
            message: format!("PDF rendering failed: {}", error_msgs.join("; ")),
        }
    })?;

    tracing::info!(label = %summary.label, bytes = pdf_bytes.len(), "rendered section report");
    Ok(pdf_bytes)
}

/// Replace each `{{KEY}}` in `template` with its value in one pass.
///
/// Inserted values are not scanned again, so user text containing `{{KEY}}`
/// stays literal. Unknown keys are left as written.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = &after[..close];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..open + 2 + close + 2]),
        }
        rest = &after[close + 2..];
    }

    out.push_str(rest);
    out
}

/// Escape special Typst characters in user-provided text
fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' => "\\*".to_string(),
            '_' => "\\_".to_string(),
            '#' => "\\#".to_string(),
            '$' => "\\$".to_string(),
            '@' => "\\@".to_string(),
            '<' => "\\<".to_string(),
            '>' => "\\>".to_string(),
            '[' => "\\[".to_string(),
            ']' => "\\]".to_string(),
            '\\' => "\\\\".to_string(),
            '`' => "\\`".to_string(),
            '/' => "\\/".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

fn station_rows(model: &SectionModel) -> String {
    model
        .profile
        .sorted_stations()
        .iter()
        .map(|s| format!("      [{:.1}], [{:.1}],", s.height_mm, s.width_mm))
        .collect::<Vec<_>>()
        .join("\n")
}

fn topping_block(model: &SectionModel) -> String {
    let Some(b) = model
        .geometry
        .part(PartRole::Topping)
        .and_then(|p| p.polygon.bounds())
    else {
        return String::new();
    };
    format!(
        "    #v(6pt)\n    *Topping slab:* {:.0} × {:.0} mm",
        b.width(),
        b.height()
    )
}

fn concrete_row(role: &str, c: &ConcreteSummary) -> String {
    format!(
        "  [{} {}], [{:.1}], [{:.2}], [{:.2}], [{:.0}],",
        role,
        escape_typst(&c.name),
        c.fck_mpa,
        c.fcd_mpa,
        c.fctm_mpa,
        c.ecm_mpa
    )
}

fn concrete_rows(summary: &SectionSummary) -> String {
    let mut rows = vec![concrete_row("Beam", &summary.materials.concrete)];
    if let Some(topping) = &summary.materials.topping_concrete {
        rows.push(concrete_row("Topping", topping));
    }
    rows.join("\n")
}

fn steel_rows(summary: &SectionSummary) -> String {
    let r = &summary.materials.rebar;
    let mut rows = vec![format!(
        "  [Rebar {} (f#sub[yk], f#sub[yd], f#sub[tk])], [{:.0}], [{:.1}], [{:.0}],",
        escape_typst(&r.name),
        r.fyk_mpa,
        r.fyd_mpa,
        r.ftk_mpa
    )];
    if let Some(s) = &summary.materials.strand {
        rows.push(format!(
            "  [Strand {} (f#sub[p0.1k], f#sub[pd], f#sub[pk])], [{:.0}], [{:.1}], [{:.0}],",
            escape_typst(&s.name),
            s.fp01k_mpa,
            s.fpd_mpa,
            s.fpk_mpa
        ));
    }
    rows.join("\n")
}

fn property_rows(summary: &SectionSummary) -> String {
    let beam = &summary.beam_properties;
    let all = &summary.properties;
    [
        ("Area A", beam.area_mm2, all.area_mm2, "mm#super[2]", 0usize),
        ("Centroid height y#sub[c]", beam.centroid_y_mm, all.centroid_y_mm, "mm", 1),
        ("Second moment I", beam.i_mm4 / 1e6, all.i_mm4 / 1e6, "10#super[6] mm#super[4]", 1),
        ("Modulus W#sub[top]", beam.w_top_mm3 / 1e3, all.w_top_mm3 / 1e3, "10#super[3] mm#super[3]", 1),
        ("Modulus W#sub[bot]", beam.w_bottom_mm3 / 1e3, all.w_bottom_mm3 / 1e3, "10#super[3] mm#super[3]", 1),
        ("Height h", beam.height_mm, all.height_mm, "mm", 0),
        ("Max width b", beam.max_width_mm, all.max_width_mm, "mm", 0),
        (
            "Radius of gyration i",
            beam.radius_of_gyration_mm(),
            all.radius_of_gyration_mm(),
            "mm",
            1,
        ),
    ]
    .into_iter()
    .map(|(name, b, c, unit, prec)| format!("  [{}], [{:.*}], [{:.*}], [{}],", name, prec, b, prec, c, unit))
    .collect::<Vec<_>>()
    .join("\n")
}

fn bar_rows(summary: &SectionSummary) -> String {
    if summary.longitudinal.groups.is_empty() {
        return "  [none], [], [], [],".to_string();
    }
    summary
        .longitudinal
        .groups
        .iter()
        .map(|g| {
            format!(
                "  [{}], [{:.0}], [{:.0}], [{}],",
                escape_typst(&g.label),
                g.area_mm2,
                g.height_mm,
                g.clear_spacing_mm.map(|s| format!("{:.0}", s)).unwrap_or_else(|| "n/a".to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn shear_block(summary: &SectionSummary) -> String {
    if summary.shear.is_empty() {
        return String::new();
    }
    let rows: Vec<String> = summary
        .shear
        .iter()
        .map(|s| {
            format!(
                "  [{}], [{}], [{:.3}], [{:.3}], [{}],",
                escape_typst(&s.label),
                s.legs,
                s.asw_per_s_mm2_per_mm,
                s.ratio * 100.0,
                s.count.map(|c| c.to_string()).unwrap_or_else(|| "n/a".to_string())
            )
        })
        .collect();
    format!(
        "#table(\n  columns: (1fr, auto, auto, auto, auto),\n  inset: 6pt,\n  stroke: 0.5pt,\n  align: (left, right, right, right, right),\n  table.header([*Stirrups*], [*Legs*], [*A#sub[sw]/s [mm#super[2]/mm]*], [*ρ#sub[w] [%]*], [*Count*]),\n{}\n)",
        rows.join("\n")
    )
}

fn prestress_block(summary: &SectionSummary) -> String {
    let Some(p) = &summary.prestress else {
        return String::new();
    };
    format!(
        "=== Prestress\n\n#table(\n  columns: (1fr, auto, auto),\n  inset: 6pt,\n  stroke: 0.5pt,\n  align: (left, right, left),\n  table.header([*Quantity*], [*Value*], [*Unit*]),\n  [Strands], [{} × {}], [],\n  [A#sub[p]], [{:.0}], [mm#super[2]],\n  [Eccentricity e#sub[p]], [{:.1}], [mm],\n  [σ#sub[p0]], [{:.0}], [MPa],\n  [ε#sub[p0]], [{:.2}], [‰],\n  [σ#sub[pm∞]], [{:.0}], [MPa],\n  [P#sub[0]], [{:.1}], [kN],\n  [P#sub[∞]], [{:.1}], [kN],\n  [A#sub[p] f#sub[pd]], [{:.1}], [kN],\n)",
        p.count,
        escape_typst(&p.strand),
        p.area_mm2,
        p.eccentricity_mm,
        p.initial_stress_mpa,
        p.initial_strain * 1000.0,
        p.effective_stress_mpa,
        p.initial_force_kn,
        p.effective_force_kn,
        p.design_capacity_kn
    )
}

fn warnings_block(summary: &SectionSummary) -> String {
    if summary.warnings.is_empty() {
        return String::new();
    }
    let items: Vec<String> = summary
        .warnings
        .iter()
        .map(|w| format!("- {}", escape_typst(w)))
        .collect();
    format!("== Notes\n\n{}", items.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material_tables::MaterialLibrary;
    use crate::materials::DesignStandard;
    use crate::profile::Profile;
    use crate::request::SectionRequest;

    #[test]
    fn test_pdf_generation() {
        let library = MaterialLibrary::builtin(DesignStandard::Ec2_2010).unwrap();
        let model = SectionRequest::example().build(&library).unwrap();
        let summary = model.summarize();

        let pdf = render_section_pdf(&model, &summary, &RenderStyle::default());
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());

        let pdf_bytes = pdf.unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(pdf_bytes.len() > 1000, "PDF seems too small");
    }

    #[test]
    fn test_pdf_plain_section_with_markup_label() {
        let library = MaterialLibrary::builtin(DesignStandard::Msz15022).unwrap();
        let model = SectionRequest::new("Beam #3 [edge] *temp*", DesignStandard::Msz15022, "C30", "B.60.50", Profile::rectangle(300.0, 600.0))
            .build(&library)
            .unwrap();
        let summary = model.summarize();

        let pdf = render_section_pdf(&model, &summary, &RenderStyle::default()).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn test_pdf_label_with_template_keys() {
        let library = MaterialLibrary::builtin(DesignStandard::Ec2_2010).unwrap();
        let model = SectionRequest::new("{{STATION_ROWS}} {{WARNINGS}}", DesignStandard::Ec2_2010, "C30/37", "B500B", Profile::rectangle(300.0, 600.0))
            .build(&library)
            .unwrap();
        let summary = model.summarize();

        let pdf = render_section_pdf(&model, &summary, &RenderStyle::default());
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());
    }

    #[test]
    fn test_fill_template_single_pass() {
        let filled = fill_template(
            "= {{LABEL}}\n{{ROWS}} {{OTHER}}",
            &[("LABEL", "{{ROWS}}".to_string()), ("ROWS", "[1], [2],".to_string())],
        );
        assert_eq!(filled, "= {{ROWS}}\n[1], [2], {{OTHER}}");

        assert_eq!(fill_template("open {{LABEL", &[("LABEL", "x".to_string())]), "open {{LABEL");
    }

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("G-1 #2"), "G-1 \\#2");
        assert_eq!(escape_typst("[a]_b"), "\\[a\\]\\_b");
    }
}
