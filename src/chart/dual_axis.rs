use chrono::NaiveDate;
use plotters::style::RGBColor;
use tracing::{debug, warn};

use super::annotation::{AnnotationSpec, draw_annotations};
use super::canvas::{Canvas, FONT_FAMILY, X_SPAN, Y_SPAN, plot_builder};
use super::hover::{draw_extreme_markers, point_targets};
use super::scale::{LinearScale, TimeScale, max_value};
use super::{ChartOutput, RenderError, SERIES_STROKE};
use crate::models::{Accessor, PriceRecord};

/// One plotted series: what to read, how to label its axis, what colour.
#[derive(Debug, Clone, Copy)]
pub struct Series {
    pub accessor: Accessor,
    pub label: &'static str,
    pub color: RGBColor,
}

#[derive(Debug, Clone, Copy)]
pub struct DualAxisSpec {
    pub title: &'static str,
    pub left: Series,
    pub right: Series,
    pub hover: bool,
    pub annotations: &'static [AnnotationSpec],
}

/// A vertical axis: its scale and its rotated description.
#[derive(Debug, Clone, Copy)]
pub struct Axis<'a> {
    pub scale: &'a LinearScale,
    pub label: &'a str,
}

pub fn series_points(
    records: &[PriceRecord],
    x: &TimeScale,
    y: &LinearScale,
    accessor: Accessor,
) -> Vec<(f64, f64)> {
    records
        .iter()
        .map(|r| (x.map(r.date), y.map(accessor.value(r))))
        .collect()
}

/// Price and volume over one shared time axis, each with its own linear
/// scale. The right series is drawn first so the left one stays on top.
pub fn render_dual_axis(records: &[PriceRecord], spec: &DualAxisSpec) -> Result<ChartOutput, RenderError> {
    if records.is_empty() {
        warn!("{:?}: no records in range, drawing an empty chart", spec.title);
    }

    let x = TimeScale::over(records, X_SPAN);
    let y_left = LinearScale::zero_based(max_value(records, spec.left.accessor), Y_SPAN);
    let y_right = LinearScale::zero_based(max_value(records, spec.right.accessor), Y_SPAN);
    debug!(
        "{:?}: x {:?}, left max {:.2}, right max {:.2}",
        spec.title,
        x.domain(),
        y_left.domain().1,
        y_right.domain().1
    );

    let mut svg = String::new();
    let mut hover_targets = Vec::new();
    {
        let canvas = Canvas::new(&mut svg)?;

        draw_axes(
            &canvas,
            &x,
            Axis { scale: &y_left, label: spec.left.label },
            Some(Axis { scale: &y_right, label: spec.right.label }),
        )?;

        let right = series_points(records, &x, &y_right, spec.right.accessor);
        let left = series_points(records, &x, &y_left, spec.left.accessor);
        canvas.polyline(&right, spec.right.color, SERIES_STROKE)?;
        canvas.polyline(&left, spec.left.color, SERIES_STROKE)?;

        canvas.title(spec.title, 40.0)?;

        if spec.hover {
            hover_targets = point_targets(records, &x, &y_left, spec.left.accessor, spec.right.accessor);
        }
        let markers = draw_extreme_markers(&canvas, records, &x, &y_left, spec.left.accessor, hover_targets.len())?;
        hover_targets.extend(markers);

        draw_annotations(&canvas, spec.annotations, &x, &y_left)?;
        canvas.present()?;
    }

    Ok(ChartOutput { svg, hover_targets })
}

// ── Axes ──────────────────────────────────────────────────────────────────────

/// Bottom `%b-%Y` time axis, left axis, and optionally a right axis. Plotters
/// lays out ticks over the same domains our scales use.
pub fn draw_axes(
    canvas: &Canvas<'_>,
    x: &TimeScale,
    left: Axis<'_>,
    right: Option<Axis<'_>>,
) -> Result<(), RenderError> {
    let (start, end) = axis_dates(x);

    let mut chart = plot_builder(canvas.root())
        .build_cartesian_2d(start..end, 0f64..axis_max(left.scale))
        .map_err(RenderError::draw)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_label_formatter(&|d: &NaiveDate| d.format("%b-%Y").to_string())
        .y_labels(10)
        .y_desc(left.label)
        .label_style((FONT_FAMILY, 12.0))
        .axis_desc_style((FONT_FAMILY, 18.0))
        .draw()
        .map_err(RenderError::draw)?;

    if let Some(right) = right {
        let mut chart = chart.set_secondary_coord(start..end, 0f64..axis_max(right.scale));
        chart
            .configure_secondary_axes()
            .y_desc(right.label)
            .label_style((FONT_FAMILY, 12.0))
            .axis_desc_style((FONT_FAMILY, 18.0))
            .draw()
            .map_err(RenderError::draw)?;
    }

    Ok(())
}

/// Plotters needs a non-empty date span.
fn axis_dates(x: &TimeScale) -> (NaiveDate, NaiveDate) {
    let (start, end) = x.domain();
    if start < end { (start, end) } else { (start, start.succ_opt().unwrap_or(start)) }
}

fn axis_max(scale: &LinearScale) -> f64 {
    let (_, max) = scale.domain();
    if max.is_finite() && max > 0.0 { max } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{LIGHT_GREY, RED};
    use crate::chart::hover::TargetKind;
    use crate::models::ymd;

    fn spec(hover: bool) -> DualAxisSpec {
        DualAxisSpec {
            title: "Test Chart",
            left: Series { accessor: Accessor::Close, label: "Closing Price (USD)", color: RED },
            right: Series { accessor: Accessor::VolumeMillions, label: "Volume (Millions)", color: LIGHT_GREY },
            hover,
            annotations: &[],
        }
    }

    fn records() -> Vec<PriceRecord> {
        vec![
            PriceRecord::new(ymd(2019, 1, 1), 10.0, 3e6),
            PriceRecord::new(ymd(2019, 6, 1), 50.0, 1e6),
            PriceRecord::new(ymd(2019, 11, 1), 30.0, 2e6),
        ]
    }

    #[test]
    fn test_series_points_use_their_own_scale() {
        let recs = records();
        let x = TimeScale::over(&recs, X_SPAN);
        let y = LinearScale::zero_based(3.0, Y_SPAN);
        let pts = series_points(&recs, &x, &y, Accessor::VolumeMillions);
        assert_eq!(pts[0], (0.0, 0.0));
        assert_eq!(pts[2].0, X_SPAN);
    }

    #[test]
    fn test_hover_targets_then_markers() {
        let out = render_dual_axis(&records(), &spec(true)).unwrap();
        assert_eq!(out.hover_targets.len(), 5);
        assert!(out.hover_targets[..3].iter().all(|t| t.kind == TargetKind::Point));
        assert_eq!(out.hover_targets[3].tooltip, "Highest: 50");
        assert_eq!(out.hover_targets[4].tooltip, "Lowest: 10");
        assert!(out.hover_targets.iter().enumerate().all(|(i, t)| t.id == i));
    }

    #[test]
    fn test_markers_without_hover() {
        let out = render_dual_axis(&records(), &spec(false)).unwrap();
        assert_eq!(out.hover_targets.len(), 2);
        assert!(out.svg.contains("Highest: 50.00"));
        assert!(out.svg.contains("Lowest: 10.00"));
        assert!(out.svg.contains("Test Chart"));
    }

    #[test]
    fn test_right_series_drawn_under_left() {
        let out = render_dual_axis(&records(), &spec(true)).unwrap();
        let grey = out.svg.find(r##"stroke="#D3D3D3""##).expect("volume stroke");
        let red = out.svg.find(r##"stroke="#FF0000""##).expect("price stroke");
        assert!(grey < red, "volume at {} should precede price at {}", grey, red);
    }

    #[test]
    fn test_empty_subset_still_renders() {
        let out = render_dual_axis(&[], &spec(true)).unwrap();
        assert!(out.hover_targets.is_empty());
        assert!(out.svg.contains("<svg"));
    }

    #[test]
    fn test_axis_dates_widen_single_day() {
        let x = TimeScale::new(ymd(2020, 1, 1), ymd(2020, 1, 1), (0.0, 1.0));
        assert_eq!(axis_dates(&x), (ymd(2020, 1, 1), ymd(2020, 1, 2)));
    }
}
