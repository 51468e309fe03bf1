//! Chart assembly: scales, canvas, the dual-axis and overview renderers, the
//! hover layer and annotation callouts. Plotters provides SVG primitives and
//! axis ticks; every position is computed by our own scales.

pub mod annotation;
pub mod canvas;
pub mod dual_axis;
pub mod hover;
pub mod overview;
pub mod scale;

use plotters::style::RGBColor;
use thiserror::Error;

use self::hover::HoverTarget;

pub const RED: RGBColor = RGBColor(255, 0, 0);
pub const GREEN: RGBColor = RGBColor(0, 128, 0);
pub const BLUE: RGBColor = RGBColor(0, 0, 255);
pub const LIGHT_GREY: RGBColor = RGBColor(211, 211, 211);
pub const ORANGE: RGBColor = RGBColor(255, 165, 0);
pub const BLACK: RGBColor = RGBColor(0, 0, 0);

pub const SERIES_STROKE: u32 = 2;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Draw(String),
}

impl RenderError {
    pub fn draw(e: impl std::fmt::Display) -> Self {
        RenderError::Draw(e.to_string())
    }
}

/// What a renderer hands back to the page: the finished SVG and the
/// interactive targets layered over it.
#[derive(Debug, Clone, Default)]
pub struct ChartOutput {
    pub svg: String,
    pub hover_targets: Vec<HoverTarget>,
}
