//! Scene selection and per-scene chart assembly.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

use crate::chart::annotation::annotations_for;
use crate::chart::canvas::{Container, Node};
use crate::chart::dual_axis::{DualAxisSpec, Series, render_dual_axis};
use crate::chart::hover::HoverTarget;
use crate::chart::overview::{DESCRIPTION, PRICE_LABEL, render_overview};
use crate::chart::{BLUE, GREEN, LIGHT_GREY, RED, RenderError};
use crate::config::RenderConfig;
use crate::models::{Accessor, Dataset, DateRange, ymd};
use crate::page;

/// First day of scene 2.
pub const SCENE2_START: NaiveDate = ymd(2019, 12, 1);
/// First day of scene 3.
pub const SCENE3_START: NaiveDate = ymd(2022, 12, 10);

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Unknown scene `{0}` (expected overview, scene1, scene2 or scene3)")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scene {
    Overview,
    Scene1,
    Scene2,
    Scene3,
}

impl Scene {
    pub const ALL: [Scene; 4] = [Scene::Overview, Scene::Scene1, Scene::Scene2, Scene::Scene3];

    pub fn name(self) -> &'static str {
        match self {
            Scene::Overview => "overview",
            Scene::Scene1 => "scene1",
            Scene::Scene2 => "scene2",
            Scene::Scene3 => "scene3",
        }
    }

    /// Output file for the scene, e.g. `scene2.html`.
    pub fn page_name(self) -> String {
        format!("{}.html", self.name())
    }

    /// Resolve a page path by its suffix. Anything else maps to no scene.
    pub fn from_page_path(path: &str) -> Option<Scene> {
        Scene::ALL.into_iter().find(|s| path.ends_with(&s.page_name()))
    }

    pub fn date_range(self) -> DateRange {
        match self {
            Scene::Overview => DateRange::unbounded(),
            Scene::Scene1 => DateRange::before(SCENE2_START),
            Scene::Scene2 => DateRange::between(SCENE2_START, SCENE3_START),
            Scene::Scene3 => DateRange::from(SCENE3_START),
        }
    }

    fn chart_spec(self, hover: bool) -> Option<DualAxisSpec> {
        let (title, color) = match self {
            Scene::Overview => return None,
            Scene::Scene1 => (
                "NVIDIA Stock Closing Prices and Trading Volume (Beginning to Dec 2019)",
                RED,
            ),
            Scene::Scene2 => (
                "NVIDIA Stock Closing Prices and Trading Volume (Dec 2019 to 10 Dec 2022)",
                GREEN,
            ),
            Scene::Scene3 => (
                "NVIDIA Stock Closing Prices and Trading Volume (10 Dec 2022 to End)",
                BLUE,
            ),
        };

        Some(DualAxisSpec {
            title,
            left: Series { accessor: Accessor::Close, label: PRICE_LABEL, color },
            right: Series { accessor: Accessor::VolumeMillions, label: "Volume (Millions)", color: LIGHT_GREY },
            hover,
            annotations: annotations_for(self),
        })
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scene {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        let wanted = wanted.strip_suffix(".html").unwrap_or(&wanted);
        Scene::ALL
            .into_iter()
            .find(|scene| scene.name() == wanted)
            .ok_or_else(|| SceneError::Unknown(s.to_string()))
    }
}

// ── Application context ───────────────────────────────────────────────────────

/// Everything a renderer reads: the loaded dataset and render settings.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub dataset: Dataset,
    pub render: RenderConfig,
}

impl AppContext {
    pub fn new(dataset: Dataset, render: RenderConfig) -> Self {
        Self { dataset, render }
    }
}

/// Clear `container` and draw `scene` into it. Returns the page's hover targets.
pub fn render_into(
    ctx: &AppContext,
    scene: Scene,
    container: &mut Container,
) -> Result<Vec<HoverTarget>, RenderError> {
    container.clear();

    let output = match scene.chart_spec(ctx.render.hover_effects) {
        None => {
            container.push(Node::Description(DESCRIPTION.to_string()));
            render_overview(&ctx.dataset, annotations_for(scene))?
        }
        Some(spec) => {
            let records = ctx.dataset.filter(&scene.date_range());
            debug!("{}: {} of {} records in range", scene, records.len(), ctx.dataset.len());
            render_dual_axis(&records, &spec)?
        }
    };

    container.push(Node::Svg(page::inject_overlay(&output.svg, &output.hover_targets)));
    info!("{}: rendered ({} hover targets)", scene, output.hover_targets.len());
    Ok(output.hover_targets)
}

/// Render `scene` into a fresh page.
pub fn render_scene(ctx: &AppContext, scene: Scene) -> Result<page::Page, RenderError> {
    let mut container = Container::default();
    let hover_targets = render_into(ctx, scene, &mut container)?;
    Ok(page::Page { scene, container, hover_targets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceRecord;

    fn ctx(records: Vec<PriceRecord>) -> AppContext {
        AppContext::new(Dataset::new(records), RenderConfig::default())
    }

    fn spanning() -> Vec<PriceRecord> {
        vec![
            PriceRecord::new(ymd(2018, 1, 2), 49.0, 30e6),
            PriceRecord::new(ymd(2019, 11, 30), 52.0, 25e6),
            PriceRecord::new(ymd(2019, 12, 1), 53.0, 20e6),
            PriceRecord::new(ymd(2021, 11, 1), 260.0, 60e6),
            PriceRecord::new(ymd(2022, 12, 9), 170.0, 40e6),
            PriceRecord::new(ymd(2022, 12, 10), 171.0, 41e6),
            PriceRecord::new(ymd(2024, 6, 1), 1200.0, 50e6),
        ]
    }

    #[test]
    fn test_from_page_path() {
        assert_eq!(Scene::from_page_path("/site/overview.html"), Some(Scene::Overview));
        assert_eq!(Scene::from_page_path("scene1.html"), Some(Scene::Scene1));
        assert_eq!(Scene::from_page_path("/a/b/scene3.html"), Some(Scene::Scene3));
        assert_eq!(Scene::from_page_path("/index.html"), None);
        assert_eq!(Scene::from_page_path("/scene4.html"), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("scene2".parse::<Scene>().unwrap(), Scene::Scene2);
        assert_eq!("Overview".parse::<Scene>().unwrap(), Scene::Overview);
        assert_eq!("scene1.html".parse::<Scene>().unwrap(), Scene::Scene1);
        assert!(matches!("scene9".parse::<Scene>(), Err(SceneError::Unknown(_))));
    }

    #[test]
    fn test_scene_ranges_partition_dataset() {
        let ds = Dataset::new(spanning());
        let dated = [Scene::Scene1, Scene::Scene2, Scene::Scene3];
        for r in ds.records() {
            let hits = dated.iter().filter(|s| s.date_range().contains(r.date)).count();
            assert_eq!(hits, 1, "{} is in {} scenes", r.date, hits);
        }
        let total: usize = dated.iter().map(|s| ds.filter(&s.date_range()).len()).sum();
        assert_eq!(total, ds.len());
    }

    #[test]
    fn test_boundary_date_belongs_to_later_scene() {
        let ds = Dataset::new(spanning());
        let s1 = ds.filter(&Scene::Scene1.date_range());
        let s2 = ds.filter(&Scene::Scene2.date_range());
        assert!(s1.iter().all(|r| r.date != SCENE2_START));
        assert_eq!(s2.first().map(|r| r.date), Some(SCENE2_START));
        assert_eq!(ds.filter(&Scene::Scene3.date_range())[0].date, SCENE3_START);
    }

    #[test]
    fn test_render_into_is_idempotent() {
        let ctx = ctx(spanning());
        for scene in Scene::ALL {
            let mut once = Container::default();
            render_into(&ctx, scene, &mut once).unwrap();

            let mut twice = Container::default();
            render_into(&ctx, scene, &mut twice).unwrap();
            render_into(&ctx, scene, &mut twice).unwrap();

            assert_eq!(once, twice, "{} accumulated content", scene);
        }
    }

    #[test]
    fn test_overview_has_description_then_svg() {
        let page = render_scene(&ctx(spanning()), Scene::Overview).unwrap();
        let children = page.container.children();
        assert_eq!(children.len(), 2);
        assert!(matches!(children[0], Node::Description(_)));
        assert!(matches!(children[1], Node::Svg(_)));
    }

    #[test]
    fn test_scene_hover_can_be_disabled() {
        let mut ctx = ctx(spanning());
        let page = render_scene(&ctx, Scene::Scene2).unwrap();
        assert_eq!(page.hover_targets.len(), 3 + 2);

        ctx.render.hover_effects = false;
        let page = render_scene(&ctx, Scene::Scene2).unwrap();
        assert_eq!(page.hover_targets.len(), 2);
    }
}
