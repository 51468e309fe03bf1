//! Point-hover tooltips and the permanent highest/lowest markers.
//!
//! Each interactive element runs the same two-state machine:
//!
//! ```text
//! Idle --Enter--> Shown --Leave--> Idle
//! ```
//!
//! Transitions return the visual effects to apply, so the behaviour is
//! testable without a document. `HoverPayload` records each target's enter
//! and leave effects for the page driver, which only applies them.

use plotters::style::text_anchor::{HPos, VPos};
use serde::Serialize;
use tracing::trace;

use super::canvas::{Canvas, text_style};
use super::scale::{LinearScale, TimeScale};
use super::{BLACK, RenderError};
use crate::models::{Accessor, PriceRecord};

pub const POINT_FADE_MS: u32 = 100;
pub const TOOLTIP_FADE_IN_MS: u32 = 200;
pub const TOOLTIP_FADE_OUT_MS: u32 = 500;
pub const TOOLTIP_OPACITY: f64 = 0.9;
/// Tooltip offset from the pointer's page position.
pub const TOOLTIP_OFFSET: (f64, f64) = (5.0, -28.0);

pub const POINT_RADIUS: f64 = 4.0;
pub const MARKER_RADIUS: f64 = 5.0;

// ── Targets ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// Invisible until hovered; fades itself in and out.
    Point,
    /// Always visible; only the tooltip reacts.
    Marker,
}

/// An element with a tooltip, in plot-local pixels. `id` is its index in the
/// chart's target list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverTarget {
    pub id: usize,
    pub kind: TargetKind,
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub tooltip: String,
}

pub fn point_tooltip(left: f64, right: f64) -> String {
    format!("Close: {}<br>Volume: {:.2}M", left, right)
}

/// One invisible target per record, placed on the left series.
pub fn point_targets(
    records: &[PriceRecord],
    x: &TimeScale,
    y: &LinearScale,
    left: Accessor,
    right: Accessor,
) -> Vec<HoverTarget> {
    records
        .iter()
        .enumerate()
        .map(|(id, r)| HoverTarget {
            id,
            kind: TargetKind::Point,
            cx: x.map(r.date),
            cy: y.map(left.value(r)),
            radius: POINT_RADIUS,
            tooltip: point_tooltip(left.value(r), right.value(r)),
        })
        .collect()
}

// ── Extremes ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extremes {
    pub max: usize,
    pub min: usize,
}

/// Indices of the highest and lowest finite values. Ties go to the earliest
/// record.
pub fn extreme_points(records: &[PriceRecord], accessor: Accessor) -> Option<Extremes> {
    let mut found: Option<(Extremes, f64, f64)> = None;

    for (i, r) in records.iter().enumerate() {
        let v = accessor.value(r);
        if !v.is_finite() {
            continue;
        }
        found = Some(match found {
            None => (Extremes { max: i, min: i }, v, v),
            Some((mut ext, mut hi, mut lo)) => {
                if v > hi {
                    ext.max = i;
                    hi = v;
                }
                if v < lo {
                    ext.min = i;
                    lo = v;
                }
                (ext, hi, lo)
            }
        });
    }

    found.map(|(ext, _, _)| ext)
}

/// Draw the highest/lowest markers with their static labels and return their
/// hover targets, numbered from `first_id`.
pub fn draw_extreme_markers(
    canvas: &Canvas<'_>,
    records: &[PriceRecord],
    x: &TimeScale,
    y: &LinearScale,
    accessor: Accessor,
    first_id: usize,
) -> Result<Vec<HoverTarget>, RenderError> {
    let Some(ext) = extreme_points(records, accessor) else {
        return Ok(Vec::new());
    };

    let mut targets = Vec::with_capacity(2);
    for (label, index) in [("Highest", ext.max), ("Lowest", ext.min)] {
        let record = &records[index];
        let value = accessor.value(record);
        let (cx, cy) = (x.map(record.date), y.map(value));

        canvas.dot((cx, cy), MARKER_RADIUS as i32, BLACK)?;
        canvas.text(
            &format!("{}: {:.2}", label, value),
            (cx + 10.0, cy + 5.0),
            text_style(12.0, BLACK, HPos::Left, VPos::Bottom, false),
        )?;

        targets.push(HoverTarget {
            id: first_id + targets.len(),
            kind: TargetKind::Marker,
            cx,
            cy,
            radius: MARKER_RADIUS,
            tooltip: format!("{}: {}", label, value),
        });
    }

    Ok(targets)
}

// ── State machine ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverState {
    Idle,
    Shown { target: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoverEvent {
    Enter { target: usize, page_x: f64, page_y: f64 },
    Leave { target: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Target(usize),
    Tooltip,
}

/// `ShowTooltip` placement is in page pixels relative to the pointer
/// position the machine was given.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Effect {
    Fade { element: Element, opacity: f64, duration_ms: u32 },
    ShowTooltip { html: String, left: f64, top: f64 },
}

/// Drives the single shared tooltip over a chart's targets.
#[derive(Debug)]
pub struct HoverMachine<'a> {
    targets: &'a [HoverTarget],
    state: HoverState,
}

impl<'a> HoverMachine<'a> {
    pub fn new(targets: &'a [HoverTarget]) -> Self {
        Self { targets, state: HoverState::Idle }
    }

    pub fn state(&self) -> HoverState {
        self.state
    }

    pub fn handle(&mut self, event: HoverEvent) -> Vec<Effect> {
        match event {
            HoverEvent::Enter { target, page_x, page_y } => self.enter(target, page_x, page_y),
            HoverEvent::Leave { target } => self.leave(target),
        }
    }

    fn enter(&mut self, id: usize, page_x: f64, page_y: f64) -> Vec<Effect> {
        let Some(target) = self.targets.get(id) else {
            trace!("Enter on unknown hover target {}", id);
            return Vec::new();
        };

        let mut effects = Vec::with_capacity(3);
        if target.kind == TargetKind::Point {
            effects.push(Effect::Fade {
                element: Element::Target(id),
                opacity: 1.0,
                duration_ms: POINT_FADE_MS,
            });
        }
        effects.push(Effect::Fade {
            element: Element::Tooltip,
            opacity: TOOLTIP_OPACITY,
            duration_ms: TOOLTIP_FADE_IN_MS,
        });
        effects.push(Effect::ShowTooltip {
            html: target.tooltip.clone(),
            left: page_x + TOOLTIP_OFFSET.0,
            top: page_y + TOOLTIP_OFFSET.1,
        });

        self.state = HoverState::Shown { target: id };
        effects
    }

    fn leave(&mut self, id: usize) -> Vec<Effect> {
        let Some(target) = self.targets.get(id) else {
            trace!("Leave on unknown hover target {}", id);
            return Vec::new();
        };

        let mut effects = Vec::with_capacity(2);
        if target.kind == TargetKind::Point {
            effects.push(Effect::Fade {
                element: Element::Target(id),
                opacity: 0.0,
                duration_ms: POINT_FADE_MS,
            });
        }
        effects.push(Effect::Fade {
            element: Element::Tooltip,
            opacity: 0.0,
            duration_ms: TOOLTIP_FADE_OUT_MS,
        });

        self.state = HoverState::Idle;
        effects
    }
}

/// What one target does on enter and leave.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetEffects {
    pub id: usize,
    pub enter: Vec<Effect>,
    pub leave: Vec<Effect>,
}

/// Effect lists embedded in the page for the browser driver, indexed by
/// target id. Enter effects are recorded with the pointer at the page origin,
/// so `ShowTooltip` carries the offset and the driver adds the live pointer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverPayload {
    pub targets: Vec<TargetEffects>,
}

impl HoverPayload {
    pub fn new(targets: &[HoverTarget]) -> Self {
        let mut machine = HoverMachine::new(targets);
        let targets = targets
            .iter()
            .map(|t| TargetEffects {
                id: t.id,
                enter: machine.handle(HoverEvent::Enter { target: t.id, page_x: 0.0, page_y: 0.0 }),
                leave: machine.handle(HoverEvent::Leave { target: t.id }),
            })
            .collect();
        Self { targets }
    }
}
