//! HTML page assembly: the visualization container, the shared tooltip, and
//! the hover driver that applies the recorded `HoverMachine` effects in the
//! browser.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::chart::canvas::{Container, MARGINS, Node};
use crate::chart::hover::{HoverPayload, HoverTarget, TargetKind};
use crate::scene::Scene;
use crate::utils::escape_html;

const STYLE: &str = "\
body { font-family: sans-serif; margin: 20px; }
.description { max-width: 840px; margin-bottom: 16px; line-height: 1.4; }
div.tooltip { position: absolute; text-align: center; padding: 6px; font: 12px sans-serif;
  background: lightsteelblue; border: 0; border-radius: 8px; pointer-events: none; }
";

/// Applies each target's recorded enter/leave effects. `show_tooltip`
/// placement is added to the pointer's page position.
const DRIVER: &str = r#"(function () {
  var cfg = JSON.parse(document.getElementById('hover-data').textContent);
  var tip = document.querySelector('body > div.tooltip');
  function node(element) {
    if (element === 'tooltip') return tip;
    return document.querySelector('[data-target="' + element.target + '"]');
  }
  function apply(effects, ev) {
    effects.forEach(function (fx) {
      if (fx.op === 'fade') {
        var el = node(fx.element);
        if (!el) return;
        el.style.transition = 'opacity ' + fx.duration_ms + 'ms';
        el.style.opacity = fx.opacity;
      } else if (fx.op === 'show_tooltip') {
        tip.innerHTML = fx.html;
        tip.style.left = (ev.pageX + fx.left) + 'px';
        tip.style.top = (ev.pageY + fx.top) + 'px';
      }
    });
  }
  document.querySelectorAll('[data-target]').forEach(function (el) {
    var target = cfg.targets[+el.getAttribute('data-target')];
    if (!target) return;
    el.addEventListener('mouseover', function (ev) { apply(target.enter, ev); });
    el.addEventListener('mouseout', function (ev) { apply(target.leave, ev); });
  });
})();"#;

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub scene: Scene,
    pub container: Container,
    pub hover_targets: Vec<HoverTarget>,
}

impl Page {
    pub fn to_html(&self) -> Result<String> {
        let payload = serde_json::to_string(&HoverPayload::new(&self.hover_targets))
            .context("Failed to serialise hover payload")?
            .replace("</", "<\\/");

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        writeln!(html, "<title>{}</title>", self.scene)?;
        writeln!(html, "<style>\n{}</style>\n</head>\n<body>", STYLE)?;

        writeln!(html, "<div id=\"{}\">", Container::ID)?;
        for node in self.container.children() {
            match node {
                Node::Description(text) => {
                    writeln!(html, "<div class=\"description\">{}</div>", escape_html(text))?
                }
                Node::Svg(svg) => writeln!(html, "{}", svg)?,
            }
        }
        html.push_str("</div>\n");

        html.push_str("<div class=\"tooltip\" style=\"opacity: 0\"></div>\n");
        writeln!(html, "<script type=\"application/json\" id=\"hover-data\">{}</script>", payload)?;
        writeln!(html, "<script>\n{}\n</script>", DRIVER)?;
        html.push_str("</body>\n</html>\n");
        Ok(html)
    }
}

/// Hover circles for `targets`, in a group translated to the plot origin.
pub fn overlay(targets: &[HoverTarget]) -> String {
    let mut out = format!(
        "<g class=\"hover-layer\" transform=\"translate({},{})\">",
        MARGINS.left, MARGINS.top
    );
    for t in targets.iter().filter(|t| t.cx.is_finite() && t.cy.is_finite()) {
        let (class, fill, opacity) = match t.kind {
            TargetKind::Point => ("hover-point", "yellow", 0.0),
            TargetKind::Marker => ("hover-marker", "transparent", 1.0),
        };
        let _ = write!(
            out,
            "<circle class=\"{}\" data-target=\"{}\" cx=\"{:.2}\" cy=\"{:.2}\" r=\"{}\" fill=\"{}\" \
             pointer-events=\"all\" style=\"opacity: {}\"/>",
            class, t.id, t.cx, t.cy, t.radius, fill, opacity
        );
    }
    out.push_str("</g>");
    out
}

/// Place the hover overlay last inside the SVG so it sits above every series.
pub fn inject_overlay(svg: &str, targets: &[HoverTarget]) -> String {
    if targets.is_empty() {
        return svg.to_string();
    }
    match svg.rfind("</svg>") {
        Some(pos) => format!("{}{}{}", &svg[..pos], overlay(targets), &svg[pos..]),
        None => svg.to_string(),
    }
}

pub async fn write_page(page: &Page, dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Could not create dir {:?}", dir))?;

    let path = dir.join(page.scene.page_name());
    tokio::fs::write(&path, page.to_html()?)
        .await
        .with_context(|| format!("Failed to write {:?}", path))?;

    info!("{}: wrote {:?}", page.scene, path);
    Ok(path)
}
