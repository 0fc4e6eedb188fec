//! # Section CLI
//!
//! Command-line front end for `section_core`: reads a section request (or
//! uses a built-in demo section), prints the derived properties and writes
//! the optional SVG drawing and PDF report.
//!
//! ```text
//! section_cli [REQUEST.json] [--config SETTINGS.json] [--svg OUT.svg]
//!             [--pdf OUT.pdf] [--save-request OUT.json] [--json]
//!             [--list-materials] [--standard NAME]
//! ```
//!
//! `--standard` takes a display name or slug (`ec2`, `msz`) and overrides the
//! settings' standard, which selects the tables for `--list-materials`.
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `warn`).

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use section_core::errors::CalcResult;
use section_core::file_io::{load_request, load_settings, save_request, write_artifact};
use section_core::material_tables::MaterialLibrary;
use section_core::materials::DesignStandard;
use section_core::render::render_section_svg;
use section_core::report::render_section_pdf;
use section_core::request::SectionRequest;
use section_core::section::SectionSummary;
use section_core::settings::AppSettings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: section_cli [REQUEST.json] [--config SETTINGS.json] [--svg OUT.svg] \
[--pdf OUT.pdf] [--save-request OUT.json] [--json] [--list-materials] [--standard NAME]";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    request: Option<PathBuf>,
    config: Option<PathBuf>,
    svg: Option<PathBuf>,
    pdf: Option<PathBuf>,
    save_request: Option<PathBuf>,
    standard: Option<DesignStandard>,
    json: bool,
    list_materials: bool,
    help: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| format!("{} requires a value", flag));
        match arg.as_str() {
            "--config" => parsed.config = Some(value("--config")?.into()),
            "--svg" => parsed.svg = Some(value("--svg")?.into()),
            "--pdf" => parsed.pdf = Some(value("--pdf")?.into()),
            "--save-request" => parsed.save_request = Some(value("--save-request")?.into()),
            "--standard" => {
                let name = value("--standard")?;
                let standard =
                    DesignStandard::parse(&name).ok_or_else(|| format!("Unknown standard '{}'", name))?;
                parsed.standard = Some(standard);
            }
            "--json" => parsed.json = true,
            "--list-materials" => parsed.list_materials = true,
            "-h" | "--help" => parsed.help = true,
            flag if flag.starts_with("--") => return Err(format!("Unknown option '{}'", flag)),
            path => {
                if parsed.request.is_some() {
                    return Err(format!("Unexpected argument '{}'", path));
                }
                parsed.request = Some(PathBuf::from(path));
            }
        }
    }

    Ok(parsed)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    if args.help {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> CalcResult<()> {
    let mut settings = match &args.config {
        Some(path) => load_settings(path)?,
        None => AppSettings::default(),
    };
    if let Some(standard) = args.standard {
        settings.standard = standard;
    }

    if args.list_materials {
        let library = MaterialLibrary::load(settings.standard, &settings.table_source())?;
        print_materials(&library);
        if args.request.is_none() {
            return Ok(());
        }
    }

    let request = match &args.request {
        Some(path) => load_request(path)?,
        None => {
            tracing::info!("no request file given, using the demo section");
            SectionRequest::example()
        }
    };

    let library = MaterialLibrary::load(request.standard, &settings.table_source())?;
    let model = request.build(&library)?;
    let summary = model.summarize();

    print_summary(&summary);

    if args.json {
        println!();
        println!("JSON Output:");
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    if let Some(path) = &args.svg {
        let svg = render_section_svg(&model, &settings.render);
        write_artifact(path, svg.as_bytes())?;
        report_written("SVG", path);
    }

    if let Some(path) = &args.pdf {
        let pdf = render_section_pdf(&model, &summary, &settings.render)?;
        write_artifact(path, &pdf)?;
        report_written("PDF", path);
    }

    if let Some(path) = &args.save_request {
        save_request(&request, path)?;
        report_written("Request", path);
    }

    Ok(())
}

fn report_written(kind: &str, path: &Path) {
    println!("{} written to {}", kind, path.display());
}

fn print_materials(library: &MaterialLibrary) {
    println!("═══════════════════════════════════════");
    println!("  MATERIALS ({})", library.standard);
    println!("═══════════════════════════════════════");
    println!("  Concrete: {}", library.concrete_names().join(", "));
    println!("  Rebar:    {}", library.rebar_names().join(", "));
    println!("  Strand:   {}", library.strand_names().join(", "));
    println!();
}

fn print_summary(summary: &SectionSummary) {
    let p = &summary.properties;
    let m = &summary.materials;

    println!("═══════════════════════════════════════");
    println!("  SECTION: {}", summary.label);
    println!("═══════════════════════════════════════");
    println!();
    println!("Standard: {}", summary.standard);
    println!(
        "Factors:  γc={:.2} γs={:.2} γp={:.2} αcc={:.2}",
        summary.factors.gamma_c, summary.factors.gamma_s, summary.factors.gamma_p, summary.factors.alpha_cc
    );
    println!();
    println!("Materials:");
    println!(
        "  Concrete {:<10} fck={:.1} fcd={:.2} fctm={:.2} Ecm={:.0} MPa",
        m.concrete.name, m.concrete.fck_mpa, m.concrete.fcd_mpa, m.concrete.fctm_mpa, m.concrete.ecm_mpa
    );
    if let Some(t) = &m.topping_concrete {
        println!(
            "  Topping  {:<10} fck={:.1} fcd={:.2} fctm={:.2} Ecm={:.0} MPa",
            t.name, t.fck_mpa, t.fcd_mpa, t.fctm_mpa, t.ecm_mpa
        );
    }
    println!(
        "  Rebar    {:<10} fyk={:.0} fyd={:.1} MPa, k={:.2}, εyd={:.2}‰",
        m.rebar.name,
        m.rebar.fyk_mpa,
        m.rebar.fyd_mpa,
        m.rebar.ductility_k,
        m.rebar.eps_yd * 1000.0
    );
    if let Some(s) = &m.strand {
        println!(
            "  Strand   {:<10} fpk={:.0} fpd={:.1} MPa",
            s.name, s.fpk_mpa, s.fpd_mpa
        );
    }
    println!();
    println!("Gross section:");
    println!("  A    = {:.0} mm²", p.area_mm2);
    println!("  yc   = {:.1} mm", p.centroid_y_mm);
    println!("  I    = {:.4e} mm⁴", p.i_mm4);
    println!("  Wtop = {:.4e} mm³", p.w_top_mm3);
    println!("  Wbot = {:.4e} mm³", p.w_bottom_mm3);
    println!("  i    = {:.1} mm", p.radius_of_gyration_mm());
    println!("  h    = {:.0} mm, bmax = {:.0} mm", p.height_mm, p.max_width_mm);
    println!();
    println!("Longitudinal reinforcement:");
    for g in &summary.longitudinal.groups {
        println!("  {:<8} As={:.0} mm² at {:.0} mm", g.label, g.area_mm2, g.height_mm);
    }
    println!(
        "  Total As={:.0} mm², ρl={:.2}%, d={}",
        summary.longitudinal.total_area_mm2,
        summary.longitudinal.ratio * 100.0,
        summary
            .longitudinal
            .effective_depth_mm
            .map(|d| format!("{:.0} mm", d))
            .unwrap_or_else(|| "n/a".to_string())
    );
    if !summary.shear.is_empty() {
        println!();
        println!("Stirrups:");
        for s in &summary.shear {
            println!(
                "  {:<8} {} legs, Asw/s={:.3} mm²/mm, ρw={:.3}%{}",
                s.label,
                s.legs,
                s.asw_per_s_mm2_per_mm,
                s.ratio * 100.0,
                s.count.map(|c| format!(", {} pcs", c)).unwrap_or_default()
            );
        }
    }
    if let Some(ps) = &summary.prestress {
        println!();
        println!("Prestress:");
        println!("  {} × {} at {:.0} mm (e={:.0} mm)", ps.count, ps.strand, ps.height_mm, ps.eccentricity_mm);
        println!(
            "  σp0={:.0} MPa, εp0={:.2}‰, P0={:.1} kN",
            ps.initial_stress_mpa,
            ps.initial_strain * 1000.0,
            ps.initial_force_kn
        );
        println!("  σpm∞={:.0} MPa, P∞={:.1} kN", ps.effective_stress_mpa, ps.effective_force_kn);
    }
    if !summary.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for w in &summary.warnings {
            println!("  [WARN] {}", w);
        }
    }
    println!();
    println!("═══════════════════════════════════════");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<CliArgs, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_no_arguments() {
        assert_eq!(args(&[]).unwrap(), CliArgs::default());
    }

    #[test]
    fn test_parse_full_command_line() {
        let parsed = args(&["beam.json", "--svg", "out.svg", "--pdf", "out.pdf", "--json", "--config", "s.json"]).unwrap();
        assert_eq!(parsed.request, Some(PathBuf::from("beam.json")));
        assert_eq!(parsed.svg, Some(PathBuf::from("out.svg")));
        assert_eq!(parsed.pdf, Some(PathBuf::from("out.pdf")));
        assert_eq!(parsed.config, Some(PathBuf::from("s.json")));
        assert!(parsed.json);
        assert!(!parsed.list_materials);
    }

    #[test]
    fn test_parse_errors() {
        assert!(args(&["--svg"]).is_err());
        assert!(args(&["--frobnicate"]).is_err());
        assert!(args(&["a.json", "b.json"]).is_err());
    }

    #[test]
    fn test_parse_standard() {
        assert_eq!(args(&["--standard", "msz"]).unwrap().standard, Some(DesignStandard::Msz15022));
        assert_eq!(args(&["--standard", "EC2:2010"]).unwrap().standard, Some(DesignStandard::Ec2_2010));
        assert_eq!(args(&["--standard", "aci"]).unwrap_err(), "Unknown standard 'aci'");
        assert!(args(&["--standard"]).is_err());
    }

    #[test]
    fn test_run_lists_materials_for_standard() {
        let cli = CliArgs {
            list_materials: true,
            standard: Some(DesignStandard::Msz15022),
            ..CliArgs::default()
        };
        assert!(run(&cli).is_ok());
    }

    #[test]
    fn test_run_demo_writes_svg() {
        let path = std::env::temp_dir().join(format!("section_cli_demo_{}.svg", std::process::id()));
        let cli = CliArgs {
            svg: Some(path.clone()),
            ..CliArgs::default()
        };
        run(&cli).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<polygon"));
        let _ = std::fs::remove_file(&path);
    }
}
