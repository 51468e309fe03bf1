//! Scene callouts. Every anchor and every line of prose is a literal in
//! the table below; placement only projects the anchor through the active
//! scales.

use chrono::NaiveDate;
use plotters::style::text_anchor::{HPos, VPos};

use super::canvas::{Canvas, PLOT_WIDTH, X_SPAN, text_style};
use super::scale::{LinearScale, TimeScale};
use super::{ORANGE, RenderError};
use crate::models::ymd;
use crate::scene::Scene;

pub const NOTE_PADDING: f64 = 15.0;
const NOTE_FONT: f64 = 12.0;
const LINE_HEIGHT: f64 = 14.0;
/// Wrap width used when a note does not set its own.
const DEFAULT_WRAP: f64 = 120.0;
/// Rough advance of one glyph, as a share of the font size.
const GLYPH_WIDTH: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalloutKind {
    /// Connector with a single bend running out to the note.
    Elbow,
    /// Dashed rule across the plot at the anchor's value.
    Threshold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationSpec {
    pub date: NaiveDate,
    pub value: f64,
    pub title: &'static str,
    pub label: &'static str,
    pub dx: f64,
    pub dy: f64,
    pub align: Align,
    pub kind: CalloutKind,
    pub wrap: Option<f64>,
}

const THIRD_OF_PLOT: f64 = PLOT_WIDTH / 3.0;

const AI_BOOM_OVERVIEW: AnnotationSpec = AnnotationSpec {
    date: ymd(2021, 10, 1),
    value: 260.0,
    title: "AI boom",
    label: "Soar in stock price",
    dx: -45.0,
    dy: -35.0,
    align: Align::Left,
    kind: CalloutKind::Elbow,
    wrap: None,
};

const OVERVIEW: &[AnnotationSpec] = &[
    AnnotationSpec {
        date: ymd(2019, 1, 1),
        value: 50.0,
        title: "Crypto crash and datahouse crisis",
        label: "Plateau in stock price",
        dx: 25.0,
        dy: -40.0,
        align: Align::Left,
        kind: CalloutKind::Elbow,
        wrap: None,
    },
    AI_BOOM_OVERVIEW,
];

const SCENE1: &[AnnotationSpec] = &[AnnotationSpec {
    date: ymd(2018, 12, 1),
    value: 60.0,
    title: "The market fell 40% over one year and two months.",
    label: "Plateau in closing price",
    dx: 0.0,
    dy: 0.0,
    align: Align::Left,
    kind: CalloutKind::Threshold,
    wrap: Some(THIRD_OF_PLOT),
}];

const SCENE2: &[AnnotationSpec] = &[
    AnnotationSpec {
        date: ymd(2020, 8, 1),
        value: 190.0,
        title: "Improvement in data center",
        label: "Steady rise",
        dx: 0.0,
        dy: 0.0,
        align: Align::Middle,
        kind: CalloutKind::Threshold,
        wrap: Some(THIRD_OF_PLOT),
    },
    AnnotationSpec { date: ymd(2021, 11, 1), ..AI_BOOM_OVERVIEW },
];

/// Callouts overlaid on each scene. Scene 3 reuses the scene 2 notes.
pub fn annotations_for(scene: Scene) -> &'static [AnnotationSpec] {
    match scene {
        Scene::Overview => OVERVIEW,
        Scene::Scene1 => SCENE1,
        Scene::Scene2 | Scene::Scene3 => SCENE2,
    }
}

// ── Placement ─────────────────────────────────────────────────────────────────

pub fn project(spec: &AnnotationSpec, x: &TimeScale, y: &LinearScale) -> (f64, f64) {
    (x.map(spec.date), y.map(spec.value))
}

/// Greedy word wrap against an estimated glyph width.
pub fn wrap_words(text: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let max_chars = ((max_width / (font_size * GLYPH_WIDTH)).floor() as usize).max(1);
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Elbow bend point between the anchor and the note.
pub fn elbow_point((ax, ay): (f64, f64), dx: f64, dy: f64) -> (f64, f64) {
    if dx.abs() > dy.abs() {
        (ax + dx.signum() * dy.abs(), ay + dy)
    } else {
        (ax + dx, ay + dy.signum() * dx.abs())
    }
}

pub fn draw_annotations(
    canvas: &Canvas<'_>,
    specs: &[AnnotationSpec],
    x: &TimeScale,
    y: &LinearScale,
) -> Result<(), RenderError> {
    for spec in specs {
        let anchor = project(spec, x, y);
        draw_callout(canvas, spec, anchor)?;
    }
    Ok(())
}

fn draw_callout(canvas: &Canvas<'_>, spec: &AnnotationSpec, anchor: (f64, f64)) -> Result<(), RenderError> {
    let (ax, ay) = anchor;
    let note = (ax + spec.dx, ay + spec.dy);
    let wrap = spec.wrap.unwrap_or(DEFAULT_WRAP);

    match spec.kind {
        CalloutKind::Elbow => {
            canvas.polyline(&[anchor, elbow_point(anchor, spec.dx, spec.dy), note], ORANGE, 1)?;
        }
        CalloutKind::Threshold => {
            draw_dashed_rule(canvas, ay)?;
        }
    }

    let title = wrap_words(spec.title, wrap, NOTE_FONT);
    let label = wrap_words(spec.label, wrap, NOTE_FONT);
    let lines = title.len() + label.len();

    // Underline under (or over) the text block, running away from the anchor.
    let (x0, x1, h) = match (spec.align, spec.dx < 0.0) {
        (Align::Middle, _) => (note.0 - wrap / 2.0, note.0 + wrap / 2.0, HPos::Center),
        (Align::Left, true) => (note.0 - wrap, note.0, HPos::Right),
        (Align::Left, false) => (note.0, note.0 + wrap, HPos::Left),
    };
    canvas.polyline(&[(x0, note.1), (x1, note.1)], ORANGE, 1)?;

    let text_x = match h {
        HPos::Center => note.0,
        HPos::Right => x1,
        _ => x0,
    };
    let above = spec.dy <= 0.0;
    let mut line_y = if above {
        note.1 - NOTE_PADDING / 3.0 - (lines as f64 - 1.0) * LINE_HEIGHT
    } else {
        note.1 + NOTE_PADDING
    };

    for (i, text) in title.iter().chain(label.iter()).enumerate() {
        let bold = i < title.len();
        canvas.text(text, (text_x, line_y), text_style(NOTE_FONT, ORANGE, h, VPos::Bottom, bold))?;
        line_y += LINE_HEIGHT;
    }
    Ok(())
}

fn draw_dashed_rule(canvas: &Canvas<'_>, y: f64) -> Result<(), RenderError> {
    const DASH: f64 = 6.0;
    let mut x = 0.0;
    while x < X_SPAN {
        canvas.polyline(&[(x, y), ((x + DASH).min(X_SPAN), y)], ORANGE, 1)?;
        x += DASH * 2.0;
    }
    Ok(())
}
