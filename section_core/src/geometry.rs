//! # Section Geometry
//!
//! Closed cross-section polygons and the composite geometry of a beam with an
//! optional topping slab, together with the gross geometric properties used
//! downstream (area, centroid, second moment of area, section moduli).
//!
//! ## Coordinate System
//!
//! ```text
//!          y (height, mm)
//!          ▲
//!     ┌────┼────┐   ← topping slab (optional)
//!     └─┐  │  ┌─┘
//!       │  │  │     ← beam profile, symmetric about x = 0
//!       │  │  │
//!       └──┼──┘ ──► x (mm)
//! ```
//!
//! Heights are measured upward from the bottom of the beam. Area and
//! centroid come from `geo`; second moments use the polygon form of the
//! shoelace integrals.

use geo::{Area, BoundingRect, Centroid, Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

/// Tolerance for coordinate comparisons (mm)
pub const TOLERANCE: f64 = 1e-9;

/// A polygon vertex in section coordinates (mm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Vertex { x, y }
    }

    /// Mirror image about the vertical centreline
    pub fn mirrored(&self) -> Self {
        Vertex::new(-self.x, self.y)
    }

    fn approx_eq(&self, other: &Vertex, tol: f64) -> bool {
        (self.x - other.x).abs() <= tol && (self.y - other.y).abs() <= tol
    }
}

impl From<Vertex> for Coord<f64> {
    fn from(v: Vertex) -> Self {
        Coord { x: v.x, y: v.y }
    }
}

/// Axis-aligned extent of a polygon or section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Smallest bounds containing both
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

// ============================================================================
// Cross-Section Polygon
// ============================================================================

/// A closed planar ring describing one concrete part of the section.
///
/// The last vertex connects implicitly back to the first; the closing vertex
/// is not repeated. Built once per request and never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSectionPolygon {
    vertices: Vec<Vertex>,
}

impl CrossSectionPolygon {
    /// Create a polygon from an ordered vertex ring.
    pub fn from_vertices(vertices: Vec<Vertex>) -> Self {
        CrossSectionPolygon { vertices }
    }

    /// Rectangle centred on x = 0 spanning `base_y..base_y + height`.
    ///
    /// Vertex order follows the profile convention: up the left side,
    /// then down the right side.
    pub fn centred_rectangle(width: f64, height: f64, base_y: f64) -> Self {
        let half = width / 2.0;
        CrossSectionPolygon::from_vertices(vec![
            Vertex::new(-half, base_y),
            Vertex::new(-half, base_y + height),
            Vertex::new(half, base_y + height),
            Vertex::new(half, base_y),
        ])
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Convert to a `geo` polygon (exterior ring closed, no holes)
    pub fn to_geo(&self) -> Polygon<f64> {
        let ring: Vec<Coord<f64>> = self.vertices.iter().map(|&v| v.into()).collect();
        Polygon::new(LineString::from(ring), vec![])
    }

    /// Signed area (positive for counter-clockwise rings)
    pub fn signed_area(&self) -> f64 {
        self.to_geo().signed_area()
    }

    /// Enclosed area, regardless of ring orientation
    pub fn area(&self) -> f64 {
        self.to_geo().unsigned_area()
    }

    /// Area centroid, `None` for an empty ring
    pub fn centroid(&self) -> Option<Vertex> {
        self.to_geo().centroid().map(|p| Vertex::new(p.x(), p.y()))
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.to_geo().bounding_rect().map(|r| Bounds {
            min_x: r.min().x,
            min_y: r.min().y,
            max_x: r.max().x,
            max_y: r.max().y,
        })
    }

    /// Check mirror symmetry about x = 0: every vertex has a mirrored partner.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        self.vertices.iter().all(|v| {
            let m = v.mirrored();
            self.vertices.iter().any(|w| w.approx_eq(&m, tol))
        })
    }

    /// First moment of area about the x-axis (y = 0), orientation-independent
    pub fn first_moment_x(&self) -> f64 {
        let (signed_a, qx, _) = self.ring_integrals();
        if signed_a < 0.0 { -qx } else { qx }
    }

    /// Second moment of area about the horizontal axis `y = axis_y`.
    ///
    /// ```text
    /// I = I₀ − 2·c·Qx + c²·A
    /// ```
    pub fn second_moment_about(&self, axis_y: f64) -> f64 {
        let (signed_a, qx, ixx) = self.ring_integrals();
        let i = ixx - 2.0 * axis_y * qx + axis_y * axis_y * signed_a;
        if signed_a < 0.0 { -i } else { i }
    }

    /// Signed (A, Qx, Ixx) about the origin from the shoelace integrals.
    fn ring_integrals(&self) -> (f64, f64, f64) {
        let n = self.vertices.len();
        if n < 3 {
            return (0.0, 0.0, 0.0);
        }
        let mut a = 0.0;
        let mut qx = 0.0;
        let mut ixx = 0.0;
        for i in 0..n {
            let p = self.vertices[i];
            let q = self.vertices[(i + 1) % n];
            let cross = p.x * q.y - q.x * p.y;
            a += cross;
            qx += cross * (p.y + q.y);
            ixx += cross * (p.y * p.y + p.y * q.y + q.y * q.y);
        }
        (a / 2.0, qx / 6.0, ixx / 12.0)
    }
}

// ============================================================================
// Composite Geometry
// ============================================================================

/// Role of a polygon within the section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartRole {
    /// Main beam outline built from the profile table
    Beam,
    /// Topping slab resting on the beam
    Topping,
}

impl PartRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            PartRole::Beam => "Beam",
            PartRole::Topping => "Topping slab",
        }
    }
}

/// One concrete part of the section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionPart {
    pub role: PartRole,
    pub polygon: CrossSectionPolygon,
}

/// Optional topping slab dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToppingSlab {
    /// Slab thickness (mm)
    pub thickness_mm: f64,
    /// Effective slab width (mm)
    pub width_mm: f64,
}

/// Beam polygon plus an optional topping slab placed on its top edge.
///
/// Properties are gross concrete values; parts are assumed not to overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionGeometry {
    parts: Vec<SectionPart>,
}

impl SectionGeometry {
    pub fn new(beam: CrossSectionPolygon) -> Self {
        SectionGeometry {
            parts: vec![SectionPart {
                role: PartRole::Beam,
                polygon: beam,
            }],
        }
    }

    /// Add a topping slab centred on the beam, bottom at the beam's top.
    pub fn with_topping(mut self, slab: ToppingSlab) -> Self {
        let top = self
            .part(PartRole::Beam)
            .and_then(|p| p.polygon.bounds())
            .map(|b| b.max_y)
            .unwrap_or(0.0);
        self.parts.push(SectionPart {
            role: PartRole::Topping,
            polygon: CrossSectionPolygon::centred_rectangle(slab.width_mm, slab.thickness_mm, top),
        });
        self
    }

    pub fn parts(&self) -> &[SectionPart] {
        &self.parts
    }

    pub fn part(&self, role: PartRole) -> Option<&SectionPart> {
        self.parts.iter().find(|p| p.role == role)
    }

    pub fn has_topping(&self) -> bool {
        self.part(PartRole::Topping).is_some()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.parts
            .iter()
            .filter_map(|p| p.polygon.bounds())
            .reduce(|a, b| a.union(&b))
    }

    /// Gross properties of the composite section
    pub fn properties(&self) -> SectionProperties {
        let area: f64 = self.parts.iter().map(|p| p.polygon.area()).sum();
        let qx: f64 = self.parts.iter().map(|p| p.polygon.first_moment_x()).sum();
        let bounds = self.bounds();

        let centroid_y = if area > TOLERANCE {
            qx / area
        } else {
            bounds.map(|b| (b.min_y + b.max_y) / 2.0).unwrap_or(0.0)
        };

        let i = self
            .parts
            .iter()
            .map(|p| p.polygon.second_moment_about(centroid_y))
            .sum();

        SectionProperties::from_parts(area, centroid_y, i, bounds)
    }
}

/// Gross geometric properties of a cross-section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    /// Cross-sectional area (mm²)
    pub area_mm2: f64,
    /// Centroid height above the section bottom (mm)
    pub centroid_y_mm: f64,
    /// Second moment of area about the horizontal centroidal axis (mm⁴)
    pub i_mm4: f64,
    /// Elastic section modulus to the top fibre (mm³)
    pub w_top_mm3: f64,
    /// Elastic section modulus to the bottom fibre (mm³)
    pub w_bottom_mm3: f64,
    /// Total height (mm)
    pub height_mm: f64,
    /// Widest extent (mm)
    pub max_width_mm: f64,
    /// Bottom fibre height (mm)
    pub bottom_y_mm: f64,
    /// Top fibre height (mm)
    pub top_y_mm: f64,
}

impl SectionProperties {
    fn from_parts(area: f64, centroid_y: f64, i: f64, bounds: Option<Bounds>) -> Self {
        let (bottom, top, width) = bounds
            .map(|b| (b.min_y, b.max_y, b.width()))
            .unwrap_or((0.0, 0.0, 0.0));

        let modulus = |dist: f64| if dist > TOLERANCE { i / dist } else { 0.0 };

        SectionProperties {
            area_mm2: area,
            centroid_y_mm: centroid_y,
            i_mm4: i,
            w_top_mm3: modulus(top - centroid_y),
            w_bottom_mm3: modulus(centroid_y - bottom),
            height_mm: top - bottom,
            max_width_mm: width,
            bottom_y_mm: bottom,
            top_y_mm: top,
        }
    }

    /// Properties of a single polygon
    pub fn of_polygon(polygon: &CrossSectionPolygon) -> Self {
        SectionGeometry::new(polygon.clone()).properties()
    }

    /// Radius of gyration √(I/A) (mm)
    pub fn radius_of_gyration_mm(&self) -> f64 {
        if self.area_mm2 > TOLERANCE {
            (self.i_mm4 / self.area_mm2).sqrt()
        } else {
            0.0
        }
    }
}
