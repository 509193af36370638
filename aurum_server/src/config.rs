//! Layered configuration for the prediction service.
//!
//! Configuration is loaded in layers with increasing priority:
//! 1. Compiled-in defaults (artifact paths relative to the working directory)
//! 2. TOML configuration file (if provided)
//! 3. Environment variable overrides (prefix `AURUM_`, nested with `__`)

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use aurum_forecast::builder::ImputationPolicy;
use aurum_forecast::corrector::{self, ExtrapolationSettings};
use aurum_forecast::data::DatasetLayout;
use aurum_forecast::pipeline::{ArtifactPaths, LoadOptions};

/// Default listen host.
const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port.
const DEFAULT_PORT: i64 = 5000;

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Locations and layout of the persisted artifacts.
    pub artifacts: ArtifactsConfig,
    /// Trend, cycle and clamp parameters.
    pub extrapolation: ExtrapolationSettings,
    /// How non-request features are filled.
    pub imputation: ImputationConfig,
    /// Log output format.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Artifact locations and dataset column roles.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Serialized model.
    pub model: PathBuf,
    /// Ordered feature-name list.
    pub feature_list: PathBuf,
    /// Historical dataset CSV.
    pub dataset: PathBuf,
    pub date_column: String,
    pub target_column: String,
    /// CPI column used to derive `inflation_rate`; empty disables it.
    #[serde(default)]
    pub cpi_column: String,
}

/// Imputation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ImputationConfig {
    /// `medians` or `first_row`.
    pub policy: ImputationPolicy,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of pretty output.
    pub json: bool,
}

impl ServerConfig {
    /// Parse host and port into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

impl AppConfig {
    /// Load configuration using layered sources.
    ///
    /// 1. Compiled-in defaults.
    /// 2. TOML file at `config_path` (if `Some`).
    /// 3. Environment variable overrides with prefix `AURUM_` and `__` as
    ///    the nesting separator (e.g., `AURUM_SERVER__PORT=8080`).
    ///
    /// The extrapolation settings are validated after loading.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let paths = ArtifactPaths::default();
        let layout = DatasetLayout::default();

        let mut builder = Config::builder()
            // Server
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", DEFAULT_PORT)?
            // Artifacts
            .set_default("artifacts.model", paths.model.to_string_lossy().into_owned())?
            .set_default(
                "artifacts.feature_list",
                paths.feature_list.to_string_lossy().into_owned(),
            )?
            .set_default("artifacts.dataset", paths.dataset.to_string_lossy().into_owned())?
            .set_default("artifacts.date_column", layout.date_column)?
            .set_default("artifacts.target_column", layout.target_column)?
            .set_default("artifacts.cpi_column", layout.cpi_column.unwrap_or_default())?
            // Extrapolation
            .set_default(
                "extrapolation.training_center_year",
                corrector::TRAINING_CENTER_YEAR as i64,
            )?
            .set_default("extrapolation.trend_rate", corrector::TREND_RATE_PER_YEAR)?
            .set_default("extrapolation.cycle_amplitude", corrector::CYCLE_AMPLITUDE)?
            .set_default("extrapolation.cycle_period", corrector::CYCLE_PERIOD_YEARS)?
            .set_default("extrapolation.lower_bound_ratio", corrector::LOWER_BOUND_RATIO)?
            .set_default("extrapolation.upper_bound_ratio", corrector::UPPER_BOUND_RATIO)?
            // Imputation and logging
            .set_default("imputation.policy", "medians")?
            .set_default("logging.json", false)?;

        if let Some(path) = config_path {
            let path_str = path.to_str().context("config path is not valid UTF-8")?;
            builder = builder.add_source(File::with_name(path_str).required(true));
        }

        // The prefix separator must be `_` explicitly, otherwise the config
        // crate reuses `__` and `AURUM_SERVER__PORT` would not match.
        builder = builder.add_source(
            Environment::with_prefix("AURUM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let cfg: AppConfig = builder
            .build()
            .context("failed to build configuration")?
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        cfg.extrapolation
            .validate()
            .context("invalid extrapolation settings")?;

        Ok(cfg)
    }

    /// Artifact locations for the prediction context.
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.artifacts.model.clone(),
            feature_list: self.artifacts.feature_list.clone(),
            dataset: self.artifacts.dataset.clone(),
        }
    }

    /// Dataset layout, imputation and extrapolation options.
    pub fn load_options(&self) -> LoadOptions {
        let cpi_column = Some(self.artifacts.cpi_column.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        LoadOptions {
            layout: DatasetLayout {
                date_column: self.artifacts.date_column.clone(),
                target_column: self.artifacts.target_column.clone(),
                cpi_column,
            },
            imputation: self.imputation.policy,
            extrapolation: self.extrapolation,
        }
    }
}
