use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::db::DEFAULT_DB_PATH;
use crate::parser::series::{DEFAULT_SERIES, MIN_COLUMNS};

pub const CONFIG_FILE: &str = "liquiscrape";
pub const ENV_PREFIX: &str = "LIQUISCRAPE";

/// Runtime settings: built-in defaults, then `liquiscrape.toml` if present, then
/// `LIQUISCRAPE_*` environment variables. CLI flags are applied on top by `main`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db_path: String,
    pub dump_dir: String,
    pub series: String,
    pub min_columns: usize,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(Environment::with_prefix(ENV_PREFIX)),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        builder
            .set_default("db_path", DEFAULT_DB_PATH)?
            .set_default("dump_dir", "data/dump")?
            .set_default("series", DEFAULT_SERIES)?
            .set_default("min_columns", MIN_COLUMNS as u64)?
            .build()
            .context("loading settings")?
            .try_deserialize()
            .context("invalid settings")
    }
}

// ── Tests ──
