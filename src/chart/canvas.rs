//! Drawing surface with fixed margins. Plot-local coordinates put (0,0) at the
//! top-left interior corner of the plot.

use plotters::chart::ChartBuilder;
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Circle, PathElement, Text};
use plotters::prelude::{DrawingBackend, SVGBackend};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{Color, FontStyle, IntoFont, RGBColor, TextStyle, WHITE};

use super::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

pub const MARGINS: Margins = Margins { top: 50, right: 50, bottom: 120, left: 120 };

const LOGICAL_WIDTH: i32 = 800;
const LOGICAL_HEIGHT: i32 = 600;
/// Extra room to the right of the plot for the secondary axis description.
pub const RIGHT_GUTTER: i32 = 40;

pub const PLOT_WIDTH: f64 = (LOGICAL_WIDTH - MARGINS.left - MARGINS.right) as f64;
pub const PLOT_HEIGHT: f64 = (LOGICAL_HEIGHT - MARGINS.top - MARGINS.bottom) as f64;

/// Last pixel column/row of the plot. Plotters maps an axis domain onto
/// `[0, size - 1]`, so series scales use these to land on its ticks.
pub const X_SPAN: f64 = PLOT_WIDTH - 1.0;
pub const Y_SPAN: f64 = PLOT_HEIGHT - 1.0;

pub const FONT_FAMILY: &str = "sans-serif";

pub fn surface_size() -> (u32, u32) {
    (
        (PLOT_WIDTH as i32 + MARGINS.left + MARGINS.right + RIGHT_GUTTER) as u32,
        (PLOT_HEIGHT as i32 + MARGINS.top + MARGINS.bottom) as u32,
    )
}

pub fn text_style(size: f64, color: RGBColor, h: HPos, v: VPos, bold: bool) -> TextStyle<'static> {
    let font = (FONT_FAMILY, size).into_font();
    let font = if bold { font.style(FontStyle::Bold) } else { font };
    font.color(&color).pos(Pos::new(h, v))
}

/// Chart builder whose plotting area lines up with the margins above.
pub fn plot_builder<'a, 'b, DB: DrawingBackend>(
    root: &'a DrawingArea<DB, Shift>,
) -> ChartBuilder<'a, 'b, DB> {
    let mut builder = ChartBuilder::on(root);
    builder
        .margin_top(MARGINS.top)
        .x_label_area_size(MARGINS.bottom)
        .y_label_area_size(MARGINS.left)
        .right_y_label_area_size(MARGINS.right + RIGHT_GUTTER);
    builder
}

/// Split a polyline wherever a coordinate is not finite.
pub fn finite_runs(points: &[(f64, f64)]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for &(x, y) in points {
        if x.is_finite() && y.is_finite() {
            current.push((x, y));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

// ── Canvas ────────────────────────────────────────────────────────────────────

pub struct Canvas<'a> {
    root: DrawingArea<SVGBackend<'a>, Shift>,
}

impl<'a> Canvas<'a> {
    /// A blank white surface rendering into `buf`.
    pub fn new(buf: &'a mut String) -> Result<Self, RenderError> {
        let root = SVGBackend::with_string(buf, surface_size()).into_drawing_area();
        root.fill(&WHITE).map_err(RenderError::draw)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &DrawingArea<SVGBackend<'a>, Shift> {
        &self.root
    }

    pub fn to_surface(&self, (x, y): (f64, f64)) -> (i32, i32) {
        to_surface((x, y))
    }

    pub fn polyline(&self, points: &[(f64, f64)], color: RGBColor, stroke: u32) -> Result<(), RenderError> {
        for run in finite_runs(points) {
            if run.len() < 2 {
                continue;
            }
            let pixels: Vec<(i32, i32)> = run.into_iter().map(to_surface).collect();
            self.root
                .draw(&PathElement::new(pixels, color.stroke_width(stroke)))
                .map_err(RenderError::draw)?;
        }
        Ok(())
    }

    pub fn dot(&self, center: (f64, f64), radius: i32, color: RGBColor) -> Result<(), RenderError> {
        if !(center.0.is_finite() && center.1.is_finite()) {
            return Ok(());
        }
        self.root
            .draw(&Circle::new(to_surface(center), radius, color.filled()))
            .map_err(RenderError::draw)
    }

    pub fn text(&self, content: &str, at: (f64, f64), style: TextStyle<'static>) -> Result<(), RenderError> {
        self.root
            .draw(&Text::new(content, to_surface(at), style))
            .map_err(RenderError::draw)
    }

    /// Title centred over the plot, `lift` units above its top edge.
    pub fn title(&self, content: &str, lift: f64) -> Result<(), RenderError> {
        let style = text_style(24.0, super::BLACK, HPos::Center, VPos::Center, false);
        self.text(content, (PLOT_WIDTH / 2.0, -lift), style)
    }

    pub fn present(self) -> Result<(), RenderError> {
        self.root.present().map_err(RenderError::draw)
    }
}

fn to_surface((x, y): (f64, f64)) -> (i32, i32) {
    (MARGINS.left + x.round() as i32, MARGINS.top + y.round() as i32)
}

// ── Container ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Description(String),
    Svg(String),
}

/// The "visualization" element each scene clears and repopulates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    children: Vec<Node>,
}

impl Container {
    pub const ID: &'static str = "visualization";

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_dimensions() {
        assert_eq!(PLOT_WIDTH, 630.0);
        assert_eq!(PLOT_HEIGHT, 430.0);
        assert_eq!(surface_size(), (840, 600));
    }

    #[test]
    fn test_plot_origin_is_translated_by_margins() {
        assert_eq!(to_surface((0.0, 0.0)), (120, 50));
        assert_eq!(to_surface((PLOT_WIDTH, PLOT_HEIGHT)), (750, 480));
    }

    #[test]
    fn test_scale_corners_match_plotters_axes() {
        use super::super::scale::LinearScale;

        let mut buf = String::new();
        let canvas = Canvas::new(&mut buf).unwrap();
        let chart = plot_builder(canvas.root())
            .build_cartesian_2d(0f64..1.0, 0f64..1.0)
            .unwrap();
        let x = LinearScale::new((0.0, 1.0), (0.0, X_SPAN));
        let y = LinearScale::zero_based(1.0, Y_SPAN);

        for corner in [(0.0, 0.0), (1.0, 1.0), (0.0, 1.0), (1.0, 0.0)] {
            assert_eq!(
                chart.backend_coord(&corner),
                to_surface((x.map(corner.0), y.map(corner.1))),
                "corner {:?}",
                corner
            );
        }
        assert_eq!(chart.backend_coord(&(0.0, 0.0)), (120, 479));
        assert_eq!(chart.backend_coord(&(1.0, 1.0)), (749, 50));
    }

    #[test]
    fn test_finite_runs_break_on_nan() {
        let pts = [(0.0, 1.0), (1.0, f64::NAN), (2.0, 3.0), (3.0, 4.0)];
        let runs = finite_runs(&pts);
        assert_eq!(runs, vec![vec![(0.0, 1.0)], vec![(2.0, 3.0), (3.0, 4.0)]]);
    }

    #[test]
    fn test_container_clear() {
        let mut c = Container::default();
        c.push(Node::Svg("<svg/>".into()));
        c.clear();
        assert!(c.children().is_empty());
    }

    #[test]
    fn test_canvas_renders_svg() {
        let mut buf = String::new();
        {
            let canvas = Canvas::new(&mut buf).unwrap();
            canvas.polyline(&[(0.0, 0.0), (10.0, 10.0)], super::super::RED, 2).unwrap();
            canvas.title("Hello", 20.0).unwrap();
            canvas.present().unwrap();
        }
        assert!(buf.contains("<svg"));
        assert!(buf.contains("Hello"));
    }
}
