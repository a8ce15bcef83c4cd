use std::{path::PathBuf, time::Duration};

use downline_model::{CommissionRates, EngineConfig, TraversalStrategy, DEFAULT_MAX_DEPTH};
use eyre::OptionExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Output format and table rendering.
pub mod output;

pub use output::OutputFormat;

const DEFAULT_QUERY_TIMEOUT: &str = "5s";

const DEFAULT_RATES: [Decimal; 10] = [
    dec!(0.05),
    dec!(0.03),
    dec!(0.02),
    dec!(0.01),
    dec!(0.01),
    dec!(0.005),
    dec!(0.005),
    dec!(0.005),
    dec!(0.005),
    dec!(0.005),
];

/// Configuration.
///
/// Every field is optional so that values from the config file and the
/// environment are only overridden by flags that are actually given.
#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone, Default)]
pub struct Config {
    /// Path to the dataset snapshot (`.json` or `.toml`).
    #[arg(long, short)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dataset: Option<String>,
    /// Commission rates, level 1 first, separated by commas.
    #[arg(long, value_delimiter = ',')]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rates: Option<Vec<Decimal>>,
    /// Number of levels to compute.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_depth: Option<usize>,
    /// Timeout of each store query, e.g. `5s` or `500ms`.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    query_timeout: Option<String>,
    /// Traversal strategy.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    strategy: Option<TraversalStrategy>,
    /// Output format.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<OutputFormat>,
}

impl Config {
    /// The config written by `init-config`.
    pub fn template() -> Self {
        Self {
            dataset: None,
            rates: Some(DEFAULT_RATES.to_vec()),
            max_depth: Some(DEFAULT_MAX_DEPTH),
            query_timeout: Some(DEFAULT_QUERY_TIMEOUT.to_string()),
            strategy: Some(TraversalStrategy::default()),
            format: Some(OutputFormat::default()),
        }
    }

    /// Returns the dataset path with `~` expanded.
    pub fn dataset_path(&self) -> eyre::Result<PathBuf> {
        let path = self
            .dataset
            .as_deref()
            .ok_or_eyre("dataset is not set, use `--dataset` or the config file")?;
        Ok(PathBuf::from(shellexpand::tilde(path).into_owned()))
    }

    /// Returns the validated commission rates.
    pub fn rates(&self) -> eyre::Result<CommissionRates> {
        let rates = self
            .rates
            .clone()
            .unwrap_or_else(|| DEFAULT_RATES.to_vec());
        let rates = CommissionRates::try_new(rates)?;
        if !rates.is_non_increasing() {
            tracing::warn!("commission rates increase with depth");
        }
        Ok(rates)
    }

    /// Returns the query timeout.
    pub fn query_timeout(&self) -> eyre::Result<Duration> {
        let timeout = self
            .query_timeout
            .as_deref()
            .unwrap_or(DEFAULT_QUERY_TIMEOUT);
        Ok(humantime::parse_duration(timeout)?)
    }

    /// Creates the engine config.
    pub fn engine_config(&self) -> eyre::Result<EngineConfig> {
        let max_depth = self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
        if max_depth == 0 {
            eyre::bail!("`max_depth` must be positive");
        }
        Ok(EngineConfig::builder()
            .max_depth(max_depth)
            .query_timeout(self.query_timeout()?)
            .strategy(self.strategy.unwrap_or_default())
            .build())
    }

    /// Returns the output format.
    pub fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_round_trip() -> eyre::Result<()> {
        let content = toml::to_string_pretty(&Config::template())?;
        let config: Config = toml::from_str(&content)?;
        assert_eq!(config.rates()?.len(), 10);
        assert_eq!(config.rates()?.rate(1), dec!(0.05));
        assert_eq!(config.query_timeout()?, Duration::from_secs(5));
        assert_eq!(config.engine_config()?.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.dataset_path().is_err());
        Ok(())
    }

    #[test]
    fn defaults_when_unset() -> eyre::Result<()> {
        let config = Config::default();
        assert_eq!(config.rates()?.len(), DEFAULT_RATES.len());
        let engine = config.engine_config()?;
        assert_eq!(engine.query_timeout, Some(Duration::from_secs(5)));
        assert_eq!(engine.strategy, TraversalStrategy::Auto);
        assert!(matches!(config.format(), OutputFormat::Table));
        Ok(())
    }

    #[test]
    fn reject_invalid_values() {
        let config = Config {
            rates: Some(vec![dec!(0.1), dec!(2)]),
            ..Default::default()
        };
        assert!(config.rates().is_err());

        let config = Config {
            query_timeout: Some("soon".to_string()),
            ..Default::default()
        };
        assert!(config.engine_config().is_err());

        let config = Config {
            max_depth: Some(0),
            ..Default::default()
        };
        assert!(config.engine_config().is_err());
    }

    #[test]
    fn parse_rates_from_toml() -> eyre::Result<()> {
        let config: Config = toml::from_str(
            r#"
            dataset = "network.json"
            rates = ["0.1", "0.05"]
            strategy = "level-by-level"
            format = "json"
            "#,
        )?;
        let rates = config.rates()?;
        assert_eq!(rates.rate(2), dec!(0.05));
        assert_eq!(rates.rate(3), Decimal::ZERO);
        assert_eq!(
            config.engine_config()?.strategy,
            TraversalStrategy::LevelByLevel
        );
        assert!(matches!(config.format(), OutputFormat::Json));
        assert_eq!(config.dataset_path()?, PathBuf::from("network.json"));
        Ok(())
    }
}
