use std::fs;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{KeeperError, KeeperResult};

/// Environment prefix for overrides, e.g. `REBALANCER_KEEPER__POLL_INTERVAL_SECS`
pub const ENV_PREFIX: &str = "REBALANCER_KEEPER";

/// Keeper configuration loaded from a TOML file
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct KeeperConfig {
    /// Seconds between polling passes
    pub poll_interval_secs: u64,

    /// Retry configuration
    pub retry: RetryConfig,

    /// Strategies to drive, matched to targets by name
    #[serde(default)]
    pub strategies: Vec<StrategySchedule>,
}

/// Harvest and tend schedule for one strategy
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StrategySchedule {
    /// Strategy name, as reported by the target
    pub name: String,

    pub enabled: bool,

    /// Never harvest sooner than this after the last report (seconds)
    pub min_report_delay: u64,

    /// Always harvest once this long has passed since the last report (seconds)
    pub max_report_delay: u64,

    /// Outstanding debt or unrealised loss (want units) that forces a harvest
    pub debt_threshold: u64,

    /// Profit plus credit must exceed this multiple of the call cost
    pub profit_factor: u64,

    /// Cost of a harvest call, in want units
    pub harvest_call_cost: u64,

    /// Tend between harvests when the position leaves its band
    pub tend_enabled: bool,
}

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Retries before a failing job is abandoned
    pub max_retries: u32,

    /// Base delay between retries in milliseconds
    pub base_delay_ms: u64,

    /// Maximum delay between retries in milliseconds
    pub max_delay_ms: u64,

    /// Exponential backoff multiplier
    pub backoff_multiplier: f64,
}

impl KeeperConfig {
    /// Load configuration from a TOML file, applying environment overrides
    pub fn load(path: &str) -> KeeperResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::new(path, config::FileFormat::Toml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: KeeperConfig = settings.try_deserialize()?;
        config.validate()?;
        log::debug!("Loaded keeper config from {} ({} strategies)", path, config.strategies.len());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> KeeperResult<Self> {
        let config: KeeperConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &str) -> KeeperResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .map_err(|e| KeeperError::Io(format!("Failed to write config file {}: {}", path, e)))?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> KeeperResult<()> {
        if self.strategies.is_empty() {
            return Err(KeeperError::invalid_config("strategies", "[]", "at least one strategy"));
        }

        if self.poll_interval_secs == 0 {
            return Err(KeeperError::invalid_config("poll_interval_secs", 0, "greater than 0"));
        }

        for (i, schedule) in self.strategies.iter().enumerate() {
            schedule.validate()?;
            if self.strategies[..i].iter().any(|other| other.name == schedule.name) {
                return Err(KeeperError::invalid_config("strategies.name", &schedule.name, "unique names"));
            }
        }

        self.retry.validate()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn schedule_for(&self, name: &str) -> Option<&StrategySchedule> {
        self.strategies.iter().find(|s| s.name == name)
    }

    pub fn enabled_strategies(&self) -> Vec<&StrategySchedule> {
        self.strategies.iter().filter(|s| s.enabled).collect()
    }
}

impl StrategySchedule {
    fn validate(&self) -> KeeperResult<()> {
        if self.name.is_empty() {
            return Err(KeeperError::invalid_config("strategy name", "\"\"", "non-empty string"));
        }

        if self.max_report_delay <= self.min_report_delay {
            return Err(KeeperError::invalid_config(
                "max_report_delay",
                self.max_report_delay,
                &format!("greater than min_report_delay ({})", self.min_report_delay),
            ));
        }

        if self.profit_factor == 0 {
            return Err(KeeperError::invalid_config("profit_factor", 0, "greater than 0"));
        }

        Ok(())
    }
}

impl RetryConfig {
    fn validate(&self) -> KeeperResult<()> {
        if self.max_retries == 0 {
            return Err(KeeperError::invalid_config("max_retries", 0, "greater than 0"));
        }

        if self.base_delay_ms == 0 {
            return Err(KeeperError::invalid_config("base_delay_ms", 0, "greater than 0"));
        }

        if self.max_delay_ms < self.base_delay_ms {
            return Err(KeeperError::invalid_config(
                "max_delay_ms",
                self.max_delay_ms,
                &format!("at least base_delay_ms ({})", self.base_delay_ms),
            ));
        }

        if self.backoff_multiplier <= 1.0 {
            return Err(KeeperError::invalid_config("backoff_multiplier", self.backoff_multiplier, "greater than 1.0"));
        }

        Ok(())
    }

    /// Backoff before retry number `attempt` (zero based), capped at `max_delay_ms`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis((delay as u64).min(self.max_delay_ms))
    }
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            retry: RetryConfig::default(),
            strategies: vec![],
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl Default for StrategySchedule {
    fn default() -> Self {
        Self {
            name: "StrategyMIMyvWETH".to_string(),
            enabled: true,
            min_report_delay: 0,
            max_report_delay: 86_400,
            debt_threshold: 0,
            profit_factor: 100,
            harvest_call_cost: 0,
            tend_enabled: true,
        }
    }
}

/// Write an example configuration file
pub fn create_example_config(path: &str) -> KeeperResult<()> {
    let example = KeeperConfig {
        poll_interval_secs: 30,
        retry: RetryConfig::default(),
        strategies: vec![
            StrategySchedule::default(),
            StrategySchedule {
                name: "StrategyDAIyvYFI".to_string(),
                min_report_delay: 3_600,
                max_report_delay: 7 * 86_400,
                debt_threshold: 1_000_000_000_000_000,
                tend_enabled: false,
                ..Default::default()
            },
        ],
    };

    example.save(path)
}
