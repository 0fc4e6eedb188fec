//! # Section Rendering
//!
//! Draws a cross-section as a standalone SVG document for visual
//! confirmation. Section coordinates (mm, y up) are scaled uniformly to fit
//! the image and flipped to SVG's y-down convention.
//!
//! A bare [`CrossSectionPolygon`] renders as a filled outline. A full
//! [`SectionModel`] additionally shows the topping slab, longitudinal bars
//! and prestressing strands as filled circles, plus overall dimensions when
//! [`RenderStyle::show_labels`] is set.
//!
//! ## Example
//!
//! ```rust
//! use section_core::profile::Profile;
//! use section_core::render::{render_polygon_svg, RenderStyle};
//!
//! let polygon = Profile::rectangle(25.0, 50.0).to_polygon().unwrap();
//! let style = RenderStyle::default().with_fill_color("steelblue").with_opacity(0.8);
//! let svg = render_polygon_svg(&polygon, &style);
//!
//! assert!(svg.starts_with("<svg"));
//! assert!(svg.contains("fill=\"steelblue\""));
//! ```

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, CrossSectionPolygon, PartRole, Vertex, TOLERANCE};
use crate::section::SectionModel;

/// Styling for rendered sections; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// Fill color of the beam (any SVG color)
    pub fill_color: String,
    /// Fill color of the topping slab
    pub topping_fill_color: String,
    /// Outline color
    pub edge_color: String,
    /// Fill opacity, 0 to 1
    pub opacity: f64,
    /// Image width (px)
    pub width_px: f64,
    /// Image height (px)
    pub height_px: f64,
    /// Margin around the drawing (px)
    pub padding_px: f64,
    /// Font size of dimension labels (px)
    pub label_font_size: f64,
    /// Fill color of bars and strands
    pub bar_color: String,
    /// Draw overall dimensions
    pub show_labels: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        RenderStyle {
            fill_color: "lightgray".to_string(),
            topping_fill_color: "silver".to_string(),
            edge_color: "black".to_string(),
            opacity: 0.5,
            width_px: 480.0,
            height_px: 480.0,
            padding_px: 40.0,
            label_font_size: 10.0,
            bar_color: "#333333".to_string(),
            show_labels: true,
        }
    }
}

impl RenderStyle {
    pub fn with_fill_color(mut self, color: impl Into<String>) -> Self {
        self.fill_color = color.into();
        self
    }

    pub fn with_edge_color(mut self, color: impl Into<String>) -> Self {
        self.edge_color = color.into();
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_size(mut self, width_px: f64, height_px: f64) -> Self {
        self.width_px = width_px;
        self.height_px = height_px;
        self
    }

    pub fn with_label_font_size(mut self, size: f64) -> Self {
        self.label_font_size = size;
        self
    }

    pub fn with_bar_color(mut self, color: impl Into<String>) -> Self {
        self.bar_color = color.into();
        self
    }

    pub fn with_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }
}

// ============================================================================
// Canvas
// ============================================================================

/// Maps section coordinates to image pixels.
struct Canvas<'a> {
    style: &'a RenderStyle,
    bounds: Bounds,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl<'a> Canvas<'a> {
    fn new(bounds: Bounds, style: &'a RenderStyle) -> Self {
        let avail_w = (style.width_px - 2.0 * style.padding_px).max(1.0);
        let avail_h = (style.height_px - 2.0 * style.padding_px).max(1.0);

        let scale = match (bounds.width() > TOLERANCE, bounds.height() > TOLERANCE) {
            (true, true) => (avail_w / bounds.width()).min(avail_h / bounds.height()),
            (true, false) => avail_w / bounds.width(),
            (false, true) => avail_h / bounds.height(),
            (false, false) => 1.0,
        };

        // Centre the drawing in the available area
        let offset_x = style.padding_px + (avail_w - bounds.width() * scale) / 2.0;
        let offset_y = style.padding_px + (avail_h - bounds.height() * scale) / 2.0;

        Canvas {
            style,
            bounds,
            scale,
            offset_x,
            offset_y,
        }
    }

    fn px(&self, v: Vertex) -> (f64, f64) {
        (
            self.offset_x + (v.x - self.bounds.min_x) * self.scale,
            self.style.height_px - self.offset_y - (v.y - self.bounds.min_y) * self.scale,
        )
    }

    /// `<polygon>` element, with a `<title>` child when `title` is given
    fn polygon(&self, polygon: &CrossSectionPolygon, fill: &str, title: Option<&str>) -> String {
        let points: Vec<String> = polygon
            .vertices()
            .iter()
            .map(|v| {
                let (x, y) = self.px(*v);
                format!("{:.2},{:.2}", x, y)
            })
            .collect();
        let body = match title {
            Some(t) => format!("><title>{}</title></polygon>", escape_xml(t)),
            None => "/>".to_string(),
        };
        format!(
            "  <polygon points=\"{}\" fill=\"{}\" fill-opacity=\"{}\" stroke=\"{}\" stroke-width=\"1.5\" stroke-linejoin=\"round\"{}\n",
            points.join(" "),
            escape_xml(fill),
            self.style.opacity,
            escape_xml(&self.style.edge_color),
            body
        )
    }

    fn circle(&self, centre: Vertex, diameter_mm: f64) -> String {
        let (cx, cy) = self.px(centre);
        let r = (diameter_mm / 2.0 * self.scale).max(1.0);
        format!(
            "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"/>\n",
            cx,
            cy,
            r,
            escape_xml(&self.style.bar_color)
        )
    }

    /// Overall width below and overall height to the right of the drawing
    fn dimensions(&self) -> String {
        let b = self.bounds;
        let font = self.style.label_font_size;
        let edge = escape_xml(&self.style.edge_color);
        let gap = font;

        let (left, bottom) = self.px(Vertex::new(b.min_x, b.min_y));
        let (right, top) = self.px(Vertex::new(b.max_x, b.max_y));

        let mut svg = String::new();

        let y = bottom + gap;
        svg.push_str(&format!(
            "  <line x1=\"{left:.2}\" y1=\"{y:.2}\" x2=\"{right:.2}\" y2=\"{y:.2}\" stroke=\"{edge}\" stroke-width=\"0.75\"/>\n"
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.2}\" y=\"{:.2}\" font-family=\"sans-serif\" font-size=\"{font}\" fill=\"{edge}\" text-anchor=\"middle\">{}</text>\n",
            (left + right) / 2.0,
            y + font + 2.0,
            format_dimension(b.width())
        ));

        let x = right + gap;
        svg.push_str(&format!(
            "  <line x1=\"{x:.2}\" y1=\"{top:.2}\" x2=\"{x:.2}\" y2=\"{bottom:.2}\" stroke=\"{edge}\" stroke-width=\"0.75\"/>\n"
        ));
        let (tx, ty) = (x + 4.0, (top + bottom) / 2.0);
        svg.push_str(&format!(
            "  <text x=\"{tx:.2}\" y=\"{ty:.2}\" font-family=\"sans-serif\" font-size=\"{font}\" fill=\"{edge}\" text-anchor=\"middle\" transform=\"rotate(90 {tx:.2} {ty:.2})\">{}</text>\n",
            format_dimension(b.height())
        ));

        svg
    }

    fn open(&self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
            w = self.style.width_px,
            h = self.style.height_px
        )
    }
}

fn format_dimension(mm: f64) -> String {
    format!("{:.0}", mm)
}

/// Escape text for XML attribute and element content
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn empty_svg(style: &RenderStyle) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n</svg>\n",
        w = style.width_px,
        h = style.height_px
    )
}

// ============================================================================
// Public API
// ============================================================================

/// Render a single polygon as an SVG document.
///
/// Polygons with zero area or zero extent still render; a polygon without
/// vertices gives an empty image.
pub fn render_polygon_svg(polygon: &CrossSectionPolygon, style: &RenderStyle) -> String {
    let Some(bounds) = polygon.bounds() else {
        tracing::debug!("rendering empty polygon");
        return empty_svg(style);
    };

    let canvas = Canvas::new(bounds, style);
    let mut svg = canvas.open();
    svg.push_str(&canvas.polygon(polygon, &style.fill_color, None));
    if style.show_labels {
        svg.push_str(&canvas.dimensions());
    }
    svg.push_str("</svg>\n");
    svg
}

/// Render a full section: beam, topping slab, bars and strands.
pub fn render_section_svg(model: &SectionModel, style: &RenderStyle) -> String {
    let Some(bounds) = model.geometry.bounds() else {
        return empty_svg(style);
    };

    let canvas = Canvas::new(bounds, style);
    let mut svg = canvas.open();

    for part in model.geometry.parts() {
        let fill = match part.role {
            PartRole::Beam => &style.fill_color,
            PartRole::Topping => &style.topping_fill_color,
        };
        svg.push_str(&canvas.polygon(&part.polygon, fill, Some(part.role.display_name())));
    }

    let bars = model.bar_layout();
    let strands = model.strand_layout();
    for (centre, diameter) in bars.iter().chain(strands.iter()) {
        svg.push_str(&canvas.circle(*centre, *diameter));
    }

    if style.show_labels {
        svg.push_str(&canvas.dimensions());
    }
    svg.push_str("</svg>\n");

    tracing::debug!(
        label = %model.label,
        bars = bars.len(),
        strands = strands.len(),
        bytes = svg.len(),
        "rendered section svg"
    );
    svg
}
