//! # section_core - Reinforced Concrete Cross-Section Engine
//!
//! `section_core` turns a beam outline given as `(height, width)` stations
//! into a closed, symmetric polygon, resolves concrete, reinforcing steel and
//! prestressing strand grades from per-standard lookup tables, and derives
//! the gross section properties and reinforcement quantities of the section.
//! Results can be drawn as SVG or exported as a PDF report.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: every run rebuilds from a fresh request; only material
//!   sheets are cached
//! - **JSON-First**: requests, settings and summaries are serde types
//! - **Rich Errors**: structured [`CalcError`] values, not strings
//! - **Explicit flow**: request → validate → build → summarize → render
//!
//! ## Quick Start
//!
//! ```rust
//! use section_core::material_tables::MaterialLibrary;
//! use section_core::materials::DesignStandard;
//! use section_core::profile::Profile;
//! use section_core::render::{render_section_svg, RenderStyle};
//! use section_core::request::SectionRequest;
//!
//! // Tapered beam: 300 mm wide at the bottom, 200 mm at the top
//! let profile = Profile::from_pairs(&[(0.0, 300.0), (600.0, 200.0)]);
//! let request = SectionRequest::new("T-1", DesignStandard::Ec2_2010, "C30/37", "B500B", profile);
//!
//! let library = MaterialLibrary::builtin(request.standard).unwrap();
//! let model = request.build(&library).unwrap();
//! let summary = model.summarize();
//!
//! assert!((summary.properties.area_mm2 - 150_000.0).abs() < 1e-6);
//! let svg = render_section_svg(&model, &RenderStyle::default());
//! assert!(svg.contains("<polygon"));
//! ```
//!
//! ## Modules
//!
//! - [`profile`] - Outline stations and the profile-to-polygon constructor
//! - [`geometry`] - Polygons, composite geometry and section properties
//! - [`materials`] - Design standards, safety factors and material grades
//! - [`material_tables`] - Per-standard lookup tables with a load cache
//! - [`reinforcement`] - Bar groups, stirrups and prestress
//! - [`request`] - User input, validation and model construction
//! - [`section`] - Resolved section model and its summary
//! - [`render`] - SVG rendering
//! - [`report`] - PDF report via Typst
//! - [`settings`] - Application settings
//! - [`file_io`] - Request/settings loading and atomic artifact writes
//! - [`errors`] - Structured error types

pub mod errors;
pub mod file_io;
pub mod geometry;
pub mod material_tables;
pub mod materials;
pub mod profile;
pub mod reinforcement;
pub mod render;
pub mod report;
pub mod request;
pub mod section;
pub mod settings;

// Re-export commonly used types at crate root for convenience
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_request, load_settings, save_request, write_artifact};
pub use geometry::{CrossSectionPolygon, SectionGeometry, SectionProperties, Vertex};
pub use material_tables::{MaterialLibrary, TableSource};
pub use materials::{DesignStandard, SafetyFactors};
pub use profile::{profile_polygon, Profile, ProfileStation};
pub use render::{render_polygon_svg, render_section_svg, RenderStyle};
pub use report::render_section_pdf;
pub use request::{SectionRequest, SCHEMA_VERSION};
pub use section::{SectionModel, SectionSummary};
pub use settings::AppSettings;
