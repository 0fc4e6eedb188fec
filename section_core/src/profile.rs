//! # Beam Profile
//!
//! A beam outline is entered as a table of stations, each giving the full
//! width of the section at one height. The outline is symmetric about the
//! vertical centreline, so one width per height is enough to close it.
//!
//! ## Polygon Construction
//!
//! ```text
//!   (-w₃/2, h₃) ●────────● (w₃/2, h₃)
//!               │        │
//!   (-w₂/2, h₂) ●─┐    ┌─● (w₂/2, h₂)
//!                 │    │
//!   (-w₁/2, h₁)   ●────●   (w₁/2, h₁)
//!
//!   ring = left side bottom → top, then right side top → bottom
//! ```
//!
//! ## Example
//!
//! ```rust
//! use section_core::profile::Profile;
//!
//! // Inverted-T: 30 wide flange under a 10 wide web
//! let profile = Profile::from_pairs(&[(0.0, 30.0), (20.0, 30.0), (20.0, 10.0), (40.0, 10.0)]);
//! let polygon = profile.to_polygon().unwrap();
//!
//! assert_eq!(polygon.vertex_count(), 8);
//! assert!((polygon.area() - 800.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::geometry::{CrossSectionPolygon, Vertex, TOLERANCE};

/// Fewest stations that can close a polygon
pub const MIN_STATIONS: usize = 2;

/// One row of the profile table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileStation {
    /// Height above the beam bottom (mm)
    pub height_mm: f64,
    /// Full section width at this height (mm)
    pub width_mm: f64,
}

impl ProfileStation {
    pub fn new(height_mm: f64, width_mm: f64) -> Self {
        ProfileStation { height_mm, width_mm }
    }
}

/// Ordered collection of profile stations as entered by the user.
///
/// Input order carries no meaning; every consumer works on the
/// height-sorted view from [`Profile::sorted_stations`].
///
/// ## JSON Example
///
/// ```json
/// [
///   { "height_mm": 0.0,   "width_mm": 300.0 },
///   { "height_mm": 500.0, "width_mm": 300.0 }
/// ]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile {
    stations: Vec<ProfileStation>,
}

impl Profile {
    pub fn new(stations: Vec<ProfileStation>) -> Self {
        Profile { stations }
    }

    /// Build from `(height, width)` pairs
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Profile::new(pairs.iter().map(|&(h, w)| ProfileStation::new(h, w)).collect())
    }

    /// Rectangular profile `width × height` standing on y = 0
    pub fn rectangle(width_mm: f64, height_mm: f64) -> Self {
        Profile::from_pairs(&[(0.0, width_mm), (height_mm, width_mm)])
    }

    /// Append a station (builder style)
    pub fn with_station(mut self, height_mm: f64, width_mm: f64) -> Self {
        self.stations.push(ProfileStation::new(height_mm, width_mm));
        self
    }

    pub fn stations(&self) -> &[ProfileStation] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Stations in ascending height; ties keep their input order.
    pub fn sorted_stations(&self) -> Vec<ProfileStation> {
        let mut sorted = self.stations.clone();
        sorted.sort_by(|a, b| a.height_mm.total_cmp(&b.height_mm));
        sorted
    }

    /// Lowest and highest station heights
    pub fn height_range(&self) -> Option<(f64, f64)> {
        let sorted = self.sorted_stations();
        match (sorted.first(), sorted.last()) {
            (Some(lo), Some(hi)) => Some((lo.height_mm, hi.height_mm)),
            _ => None,
        }
    }

    /// Full width at `height_mm`, interpolated linearly between stations.
    ///
    /// At a step (two stations sharing a height) the narrower width is
    /// returned. `None` outside the profile's height range.
    pub fn width_at(&self, height_mm: f64) -> Option<f64> {
        let sorted = self.sorted_stations();
        let mut best: Option<f64> = None;
        let mut consider = |w: f64| {
            best = Some(best.map_or(w, |b: f64| b.min(w)));
        };

        for s in &sorted {
            if (s.height_mm - height_mm).abs() <= TOLERANCE {
                consider(s.width_mm);
            }
        }
        for pair in sorted.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let dh = b.height_mm - a.height_mm;
            if dh > TOLERANCE && height_mm > a.height_mm && height_mm < b.height_mm {
                let t = (height_mm - a.height_mm) / dh;
                consider(a.width_mm + t * (b.width_mm - a.width_mm));
            }
        }
        best
    }

    /// Build the closed section polygon. See [`profile_polygon`].
    pub fn to_polygon(&self) -> CalcResult<CrossSectionPolygon> {
        profile_polygon(&self.stations)
    }
}

impl From<Vec<ProfileStation>> for Profile {
    fn from(stations: Vec<ProfileStation>) -> Self {
        Profile::new(stations)
    }
}

/// Convert profile stations into a closed polygon symmetric about x = 0.
///
/// Stations are sorted by ascending height. The left boundary runs through
/// `(-w/2, h)` bottom to top, the right boundary through `(w/2, h)` top to
/// bottom; the ring closes from the last right vertex back to the first
/// left vertex. The result always has `2 × stations` vertices.
///
/// Stations sharing a height keep their input order, which decides how a
/// step is drawn: list the width continuing from below first, then the width
/// continuing above.
///
/// Duplicate heights and negative widths are accepted as given. They produce
/// degenerate or self-intersecting rings, which are logged but not rejected.
///
/// # Errors
///
/// `CalcError::InsufficientStations` when fewer than two stations are given.
pub fn profile_polygon(stations: &[ProfileStation]) -> CalcResult<CrossSectionPolygon> {
    if stations.len() < MIN_STATIONS {
        return Err(CalcError::InsufficientStations {
            found: stations.len(),
            required: MIN_STATIONS,
        });
    }

    let mut sorted = stations.to_vec();
    sorted.sort_by(|a, b| a.height_mm.total_cmp(&b.height_mm));

    let repeated = sorted
        .windows(2)
        .filter(|p| (p[1].height_mm - p[0].height_mm).abs() <= TOLERANCE)
        .count();
    if repeated > 0 {
        tracing::warn!(repeated, "profile has stations sharing a height; ring has zero-height edges");
    }
    let negative = sorted.iter().filter(|s| s.width_mm < 0.0).count();
    if negative > 0 {
        tracing::warn!(negative, "profile has negative widths; ring self-intersects");
    }

    let left = sorted.iter().map(|s| Vertex::new(-s.width_mm / 2.0, s.height_mm));
    let right = sorted.iter().rev().map(|s| Vertex::new(s.width_mm / 2.0, s.height_mm));
    let vertices: Vec<Vertex> = left.chain(right).collect();

    tracing::debug!(stations = sorted.len(), vertices = vertices.len(), "built profile polygon");
    Ok(CrossSectionPolygon::from_vertices(vertices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tapered() -> Profile {
        Profile::from_pairs(&[(0.0, 30.0), (20.0, 30.0), (20.0, 10.0), (40.0, 10.0)])
    }

    #[test]
    fn test_rectangle_corners() {
        let polygon = Profile::from_pairs(&[(0.0, 25.0), (50.0, 25.0)]).to_polygon().unwrap();
        assert_eq!(
            polygon.vertices(),
            &[
                Vertex::new(-12.5, 0.0),
                Vertex::new(-12.5, 50.0),
                Vertex::new(12.5, 50.0),
                Vertex::new(12.5, 0.0),
            ]
        );
        assert_relative_eq!(polygon.area(), 1250.0, max_relative = 1e-12);
    }

    #[test]
    fn test_tapered_profile_area() {
        let polygon = tapered().to_polygon().unwrap();
        assert_eq!(polygon.vertex_count(), 8);
        // 30×20 + 10×20
        assert_relative_eq!(polygon.area(), 800.0, max_relative = 1e-12);
    }

    #[test]
    fn test_order_independence() {
        let shuffled = Profile::from_pairs(&[(40.0, 10.0), (0.0, 30.0), (20.0, 30.0), (20.0, 10.0)]);
        assert_eq!(shuffled.to_polygon().unwrap(), tapered().to_polygon().unwrap());

        let reversed = Profile::from_pairs(&[(50.0, 25.0), (0.0, 25.0)]);
        let sorted = Profile::from_pairs(&[(0.0, 25.0), (50.0, 25.0)]);
        assert_eq!(reversed.to_polygon().unwrap(), sorted.to_polygon().unwrap());
    }

    #[test]
    fn test_step_follows_input_order_of_tied_stations() {
        // Step at h = 20: 30 wide below, 10 wide above
        let step = Profile::from_pairs(&[(0.0, 30.0), (20.0, 30.0), (20.0, 10.0), (40.0, 10.0)]);
        assert_eq!(
            step.to_polygon().unwrap().vertices(),
            &[
                Vertex::new(-15.0, 0.0),
                Vertex::new(-15.0, 20.0),
                Vertex::new(-5.0, 20.0),
                Vertex::new(-5.0, 40.0),
                Vertex::new(5.0, 40.0),
                Vertex::new(5.0, 20.0),
                Vertex::new(15.0, 20.0),
                Vertex::new(15.0, 0.0),
            ]
        );

        // Same stations, tie swapped: the edges at h = 20 cross over
        let swapped = Profile::from_pairs(&[(0.0, 30.0), (20.0, 10.0), (20.0, 30.0), (40.0, 10.0)]);
        assert_eq!(
            swapped.to_polygon().unwrap().vertices(),
            &[
                Vertex::new(-15.0, 0.0),
                Vertex::new(-5.0, 20.0),
                Vertex::new(-15.0, 20.0),
                Vertex::new(-5.0, 40.0),
                Vertex::new(5.0, 40.0),
                Vertex::new(15.0, 20.0),
                Vertex::new(5.0, 20.0),
                Vertex::new(15.0, 0.0),
            ]
        );

        // Tied stations keep their relative order when others move around
        let shuffled = Profile::from_pairs(&[(20.0, 10.0), (40.0, 10.0), (0.0, 30.0), (20.0, 30.0)]);
        assert_eq!(shuffled.sorted_stations()[1], ProfileStation::new(20.0, 10.0));
    }

    #[test]
    fn test_symmetric_with_double_vertex_count() {
        let profiles = [
            Profile::rectangle(300.0, 600.0),
            tapered(),
            Profile::from_pairs(&[(0.0, 200.0), (100.0, 400.0), (350.0, 120.0), (700.0, 120.0), (800.0, 600.0)]),
        ];
        for profile in &profiles {
            let polygon = profile.to_polygon().unwrap();
            assert_eq!(polygon.vertex_count(), 2 * profile.len());
            assert!(polygon.is_symmetric(TOLERANCE));
            assert!(polygon.area() > 0.0);
        }
    }

    #[test]
    fn test_mirrored_vertex_pairs() {
        let polygon = tapered().to_polygon().unwrap();
        let v = polygon.vertices();
        let n = v.len();
        for i in 0..n / 2 {
            assert_eq!(v[i].mirrored(), v[n - 1 - i]);
        }
    }

    #[test]
    fn test_insufficient_stations() {
        let empty = Profile::default().to_polygon();
        assert_eq!(
            empty.unwrap_err(),
            CalcError::InsufficientStations { found: 0, required: 2 }
        );

        let single = Profile::from_pairs(&[(0.0, 300.0)]).to_polygon();
        assert_eq!(single.unwrap_err().error_code(), "INSUFFICIENT_STATIONS");
    }

    #[test]
    fn test_degenerate_input_tolerated() {
        // Same height twice: zero-height ring, accepted
        let flat = Profile::from_pairs(&[(10.0, 30.0), (10.0, 30.0)]).to_polygon().unwrap();
        assert_eq!(flat.vertex_count(), 4);
        assert_relative_eq!(flat.area(), 0.0);

        // Negative width: self-intersecting ring, accepted
        let crossed = Profile::from_pairs(&[(0.0, 20.0), (10.0, -20.0)]).to_polygon().unwrap();
        assert_eq!(crossed.vertex_count(), 4);
    }

    #[test]
    fn test_width_at() {
        let profile = Profile::from_pairs(&[(0.0, 200.0), (100.0, 400.0)]);
        assert_relative_eq!(profile.width_at(50.0).unwrap(), 300.0);
        assert_relative_eq!(profile.width_at(0.0).unwrap(), 200.0);
        assert!(profile.width_at(-1.0).is_none());
        assert!(profile.width_at(101.0).is_none());

        // Narrower side of a step
        assert_relative_eq!(tapered().width_at(20.0).unwrap(), 10.0);
        assert_relative_eq!(tapered().width_at(30.0).unwrap(), 10.0);
    }

    #[test]
    fn test_height_range_and_json() {
        let profile = tapered();
        assert_eq!(profile.height_range(), Some((0.0, 40.0)));

        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.starts_with('['));
        let parsed: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, profile);
    }
}
