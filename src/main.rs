use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stock_scenes::config::AppConfig;
use stock_scenes::loader::load_dataset;
use stock_scenes::page::write_page;
use stock_scenes::scene::{render_scene, AppContext, Scene};
use stock_scenes::utils;

#[derive(Parser)]
#[command(name = "stock-scenes", about = "Multi-scene stock price/volume charts", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Price history CSV (Date, Close, Volume columns)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Directory for rendered pages
    #[arg(short, long, global = true)]
    out: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Render one scene (overview, scene1, scene2, scene3)
    Render {
        #[arg(short, long)]
        scene: Scene,
    },

    /// Render whichever scene a page path names (e.g. /site/scene2.html); other paths render nothing
    Page { path: String },

    /// Render all four scenes
    All,

    /// Show dataset statistics
    Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "stock_scenes=info,warn",
        1 => "stock_scenes=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let data_path = cli.data.unwrap_or(config.data.csv_path);
    let out_dir = cli.out.unwrap_or(config.output.dir);

    let dataset = load_dataset(&data_path).await?;
    let report = dataset.validate();
    if !report.is_clean() {
        warn!("{} invalid Close/Volume values in {:?}", report.invalid.len(), data_path);
        for field in &report.invalid {
            debug!("  row {} ({}): {} = {}", field.index + 1, field.date, field.field, field.value);
        }
    }

    let ctx = AppContext::new(dataset, config.render);

    match cli.command {
        Command::Render { scene } => {
            let page = render_scene(&ctx, scene)?;
            write_page(&page, &out_dir).await?;
        }

        Command::Page { path } => match Scene::from_page_path(&path) {
            Some(scene) => {
                let page = render_scene(&ctx, scene)?;
                write_page(&page, &out_dir).await?;
            }
            None => debug!("{:?} names no scene, nothing rendered", path),
        },

        Command::All => {
            let _t = utils::Timer::start("Render all scenes");
            for scene in Scene::ALL {
                let page = render_scene(&ctx, scene)?;
                write_page(&page, &out_dir).await?;
            }
            info!("Done: {} pages in {:?}", Scene::ALL.len(), out_dir);
        }

        Command::Summary => {
            let s = ctx.dataset.summary();
            let price = |v: Option<f64>| v.map(|p| format!("{:.2}", p)).unwrap_or("—".into());
            println!("─────────────────────────────────");
            println!("  Price history — {}", data_path.display());
            println!("─────────────────────────────────");
            println!("  Records  : {}", utils::fmt_number(s.records));
            println!("  From     : {}", s.first.map(|d| d.to_string()).unwrap_or("—".into()));
            println!("  To       : {}", s.last.map(|d| d.to_string()).unwrap_or("—".into()));
            println!("  Low      : {}", price(s.min_close));
            println!("  High     : {}", price(s.max_close));
            println!("  Invalid  : {}", utils::fmt_number(s.invalid_rows));
            for scene in Scene::ALL {
                let n = ctx.dataset.filter(&scene.date_range()).len();
                println!("  {:<9}: {}", scene.name(), utils::fmt_number(n));
            }
            println!("─────────────────────────────────");
        }
    }

    Ok(())
}
