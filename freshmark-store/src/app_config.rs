use serde::Deserialize;
use std::env;

use freshmark_engine::pipeline::PipelineMode;
use freshmark_engine::trigger::LiveStrategy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub results: ResultsConfig,
    pub pricing: PricingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub inventory_csv: String,
    pub sales_csv: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Path to the fitted model artifact (weights plus optional scaler).
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResultsConfig {
    /// Materialized view of the last run, fully rewritten each time.
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    #[serde(default = "default_strategy")]
    pub live_strategy: LiveStrategy,
    #[serde(default = "default_mode")]
    pub mode: PipelineMode,
}

fn default_strategy() -> LiveStrategy {
    LiveStrategy::Strict
}

fn default_mode() -> PipelineMode {
    PipelineMode::Live
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Layer the environment-specific file on top; optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `FRESHMARK__PRICING__MODE=backfill` overrides pricing.mode
            .add_source(config::Environment::with_prefix("FRESHMARK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
