//! End-to-end checks: request file → model → summary → SVG/PDF.

use std::fs;
use std::path::PathBuf;

use approx::assert_relative_eq;
use section_core::file_io::{load_request, save_request, write_artifact};
use section_core::geometry::TOLERANCE;
use section_core::material_tables::{MaterialLibrary, TableSource};
use section_core::materials::DesignStandard;
use section_core::profile::{profile_polygon, Profile, ProfileStation};
use section_core::reinforcement::BarGroup;
use section_core::render::{render_polygon_svg, render_section_svg, RenderStyle};
use section_core::report::render_section_pdf;
use section_core::request::SectionRequest;
use section_core::CalcError;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("section_core_it_{}_{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_request_file_to_artifacts() {
    let dir = scratch_dir("artifacts");
    let request_path = dir.join("demo.json");

    save_request(&SectionRequest::example(), &request_path).unwrap();
    let request = load_request(&request_path).unwrap();

    let library = MaterialLibrary::builtin(request.standard).unwrap();
    let model = request.build(&library).unwrap();
    let summary = model.summarize();

    // Inverted T: 500×150 flange + 250×500 web, plus 1000×100 topping
    let beam_area = 500.0 * 150.0 + 250.0 * 500.0;
    assert_relative_eq!(summary.beam_properties.area_mm2, beam_area, max_relative = 1e-12);
    assert_relative_eq!(summary.properties.area_mm2, beam_area + 100_000.0, max_relative = 1e-12);
    assert_relative_eq!(summary.properties.top_y_mm, 750.0);

    let svg = render_section_svg(&model, &RenderStyle::default());
    let svg_path = dir.join("demo.svg");
    write_artifact(&svg_path, svg.as_bytes()).unwrap();
    assert!(fs::read_to_string(&svg_path).unwrap().contains("<circle"));

    let pdf = render_section_pdf(&model, &summary, &RenderStyle::default()).unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_external_workbook() {
    let root = scratch_dir("workbook");
    let sheets = root.join("msz");
    fs::create_dir_all(&sheets).unwrap();
    fs::write(sheets.join("concrete.csv"), "concrete,fck\nC-Special,42\n").unwrap();
    fs::write(sheets.join("rebar.csv"), "rebar,fyk,ftk,euk\nB-Special,550,600,7.5\n").unwrap();
    fs::write(sheets.join("strand.csv"), "strand,fp01k,fpk,euk,diameter,area\n").unwrap();

    let library = MaterialLibrary::load(DesignStandard::Msz15022, &TableSource::Directory(root.clone())).unwrap();
    assert_eq!(library.concrete_names(), vec!["C-Special"]);
    assert!(library.strand_names().is_empty());

    let request = SectionRequest::new("X-1", DesignStandard::Msz15022, "C-Special", "B-Special", Profile::rectangle(300.0, 500.0))
        .with_bar_group(BarGroup::new(16.0, 3, 45.0));
    let summary = request.build(&library).unwrap().summarize();

    // MSZ defaults: αcc = 0.85, γc = 1.5
    assert_relative_eq!(summary.materials.concrete.fcd_mpa, 0.85 * 42.0 / 1.5, max_relative = 1e-12);
    assert_relative_eq!(summary.materials.rebar.fyd_mpa, 550.0 / 1.15, max_relative = 1e-12);

    let missing = SectionRequest::new("X-2", DesignStandard::Msz15022, "C30", "B-Special", Profile::rectangle(300.0, 500.0))
        .build(&library)
        .unwrap_err();
    assert_eq!(missing, CalcError::material_not_found("C30", "concrete"));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn test_polygon_constructor_properties() {
    let stations = vec![
        ProfileStation::new(40.0, 10.0),
        ProfileStation::new(0.0, 30.0),
        ProfileStation::new(20.0, 30.0),
        ProfileStation::new(20.0, 10.0),
    ];
    let polygon = profile_polygon(&stations).unwrap();

    assert_eq!(polygon.vertex_count(), 2 * stations.len());
    assert!(polygon.is_symmetric(TOLERANCE));
    assert_relative_eq!(polygon.area(), 800.0, max_relative = 1e-12);

    let svg = render_polygon_svg(&polygon, &RenderStyle::default());
    assert!(svg.contains("<polygon"));

    let err = profile_polygon(&stations[..1]).unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_STATIONS");
}
