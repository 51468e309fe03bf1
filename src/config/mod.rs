use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Input dataset
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
}

/// Where rendered pages go
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

/// Rendering switches
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderConfig {
    /// Per-point hover targets on the dated scenes.
    #[serde(default = "default_true")]
    pub hover_effects: bool,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_csv_path() -> PathBuf {
    PathBuf::from("NVDA.csv")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("site")
}
fn default_true() -> bool {
    true
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { csv_path: default_csv_path() }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: default_output_dir() }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { hover_effects: default_true() }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("STOCK_SCENES").separator("__"))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }
}
