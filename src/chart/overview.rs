//! Full-history chart: one Close line, coloured by the three scene ranges.

use plotters::style::RGBColor;
use tracing::debug;

use super::annotation::{AnnotationSpec, draw_annotations};
use super::canvas::{Canvas, X_SPAN, Y_SPAN};
use super::dual_axis::{Axis, draw_axes, series_points};
use super::hover::draw_extreme_markers;
use super::scale::{LinearScale, TimeScale, max_value};
use super::{BLUE, ChartOutput, GREEN, RED, RenderError, SERIES_STROKE};
use crate::models::{Accessor, Dataset, DateRange, PriceRecord};
use crate::scene::Scene;

pub const TITLE: &str = "NVIDIA Stock Overview";
pub const PRICE_LABEL: &str = "Closing Price (USD)";

pub const DESCRIPTION: &str = "NVIDIA's stock performance from early 2018 to mid-2022 \
encapsulates the volatility and dynamism inherent in the technology sector. This period can be \
divided into three significant phases marked by distinct trends and driving factors. Initially, \
from early 2018 to mid-2019, NVIDIA faced a sharp decline in stock price largely due to external \
market forces. The collapse of the cryptocurrency market led to an oversupply of GPUs, which, \
coupled with the impact of the US-China trade war, significantly hindered NVIDIA's growth. The \
inventory overhang and increased costs due to tariffs added to the pressure, causing the stock to \
plunge (Nasdaq) (InvestorPlace). The subsequent period from mid-2019 to early 2021 marked a \
significant recovery for NVIDIA, driven by the burgeoning data center business and the rise of AI \
and machine learning applications. During this phase, NVIDIA capitalized on the growing demand \
for its GPUs, which became essential in various high-performance computing applications. The \
COVID-19 pandemic further accelerated this demand as more businesses and individuals turned to \
digital solutions, boosting NVIDIA's gaming and data center segments. This robust growth led to \
a steady increase in stock price, showcasing the company's resilience and strategic positioning \
in the tech industry (InvestorPlace) (Nasdaq). The final phase from early 2021 to mid-2022 saw \
NVIDIA's stock reaching its peak before experiencing increased volatility and a general decline. \
This period was marked by significant market corrections within the tech sector, coupled with \
NVIDIA facing supply chain issues and regulatory scrutiny over its proposed acquisition of ARM. \
Despite these challenges, the company's long-term growth prospects remained strong, driven by \
the continued expansion in AI and data center markets. However, the immediate market reactions \
to these challenges led to a pullback in stock price, reflecting the broader uncertainties in \
the tech industry (Nasdaq) (InvestorPlace).";

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub range: DateRange,
    pub color: RGBColor,
    pub records: Vec<PriceRecord>,
}

/// The dataset split at the scene boundaries, one colour per scene.
pub fn segments(dataset: &Dataset) -> Vec<Segment> {
    [(Scene::Scene1, RED), (Scene::Scene2, GREEN), (Scene::Scene3, BLUE)]
        .into_iter()
        .map(|(scene, color)| {
            let range = scene.date_range();
            Segment { range, color, records: dataset.filter(&range) }
        })
        .collect()
}

pub fn render_overview(dataset: &Dataset, annotations: &[AnnotationSpec]) -> Result<ChartOutput, RenderError> {
    let records = dataset.records();
    let x = TimeScale::over(records, X_SPAN);
    let y = LinearScale::zero_based(max_value(records, Accessor::Close), Y_SPAN);

    let mut svg = String::new();
    let hover_targets;
    {
        let canvas = Canvas::new(&mut svg)?;
        draw_axes(&canvas, &x, Axis { scale: &y, label: PRICE_LABEL }, None)?;

        for segment in segments(dataset) {
            debug!("Overview segment {:?}: {} records", segment.range, segment.records.len());
            let points = series_points(&segment.records, &x, &y, Accessor::Close);
            canvas.polyline(&points, segment.color, SERIES_STROKE)?;
        }

        canvas.title(TITLE, 20.0)?;
        hover_targets = draw_extreme_markers(&canvas, records, &x, &y, Accessor::Close, 0)?;
        draw_annotations(&canvas, annotations, &x, &y)?;
        canvas.present()?;
    }

    Ok(ChartOutput { svg, hover_targets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::hover::{Extremes, TargetKind, extreme_points};
    use crate::models::ymd;

    fn three_rows() -> Dataset {
        Dataset::new(vec![
            PriceRecord::new(ymd(2019, 1, 1), 10.0, 1e6),
            PriceRecord::new(ymd(2019, 6, 1), 50.0, 1e6),
            PriceRecord::new(ymd(2019, 11, 1), 30.0, 1e6),
        ])
    }

    #[test]
    fn test_early_rows_fall_in_red_segment_only() {
        let segs = segments(&three_rows());
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[0].color, RED);
        assert_eq!(segs[0].records.len(), 3);
        assert!(segs[1].records.is_empty());
        assert!(segs[2].records.is_empty());
    }

    #[test]
    fn test_markers_on_max_and_min() {
        let ds = three_rows();
        let ext = extreme_points(ds.records(), Accessor::Close).unwrap();
        assert_eq!(ext, Extremes { max: 1, min: 0 });

        let out = render_overview(&ds, &[]).unwrap();
        assert_eq!(out.hover_targets.len(), 2);
        assert!(out.hover_targets.iter().all(|t| t.kind == TargetKind::Marker));
        assert!(out.svg.contains("Highest: 50.00"));
        assert!(out.svg.contains("Lowest: 10.00"));
        assert!(out.svg.contains(TITLE));
    }

    #[test]
    fn test_three_row_csv_draws_one_red_path() {
        let csv = "Date,Close,Volume\n2019-01-01,10,1000000\n2019-06-01,50,1000000\n2019-11-01,30,1000000\n";
        let ds = crate::loader::parse_csv(csv.as_bytes()).unwrap();
        let out = render_overview(&ds, &[]).unwrap();

        let strokes = |hex: &str| out.svg.matches(&format!("stroke=\"{}\"", hex)).count();
        assert_eq!(strokes("#FF0000"), 1);
        assert_eq!(strokes("#008000"), 0);
        assert_eq!(strokes("#0000FF"), 0);

        let tips: Vec<&str> = out.hover_targets.iter().map(|t| t.tooltip.as_str()).collect();
        assert_eq!(tips, ["Highest: 50", "Lowest: 10"]);
    }

    #[test]
    fn test_boundary_day_switches_colour() {
        let ds = Dataset::new(vec![
            PriceRecord::new(ymd(2019, 11, 30), 1.0, 1.0),
            PriceRecord::new(ymd(2019, 12, 1), 2.0, 1.0),
            PriceRecord::new(ymd(2022, 12, 10), 3.0, 1.0),
        ]);
        let segs = segments(&ds);
        assert_eq!(segs[0].records.len(), 1);
        assert_eq!(segs[1].records[0].date, ymd(2019, 12, 1));
        assert_eq!(segs[2].records[0].date, ymd(2022, 12, 10));
    }
}
