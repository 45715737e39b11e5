//! Ledger configuration: defaults, overridable from the environment.

use thiserror::Error;

use chaintrack_alerts::{AlertConfig, Temperature};
use chaintrack_batches::RebatchPolicy;
use chaintrack_products::QrCodeTemplate;

pub const ENV_MIN_TEMPERATURE: &str = "CHAINTRACK_MIN_TEMPERATURE";
pub const ENV_MAX_TEMPERATURE: &str = "CHAINTRACK_MAX_TEMPERATURE";
pub const ENV_QR_TEMPLATE: &str = "CHAINTRACK_QR_TEMPLATE";
pub const ENV_REBATCH_POLICY: &str = "CHAINTRACK_REBATCH_POLICY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: '{value}' is not an integer temperature in hundredths of a degree")]
    InvalidTemperature { key: &'static str, value: String },

    #[error("{key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Settings fixed for the lifetime of a ledger.
///
/// `alerts` only seeds the thresholds recorded at initialization; later changes go through
/// `set_temperature_thresholds` and live in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LedgerConfig {
    pub alerts: AlertConfig,
    pub qr_template: QrCodeTemplate,
    pub rebatch_policy: RebatchPolicy,
}

impl LedgerConfig {
    /// Read overrides from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = AlertConfig::default();

        let min = match read(ENV_MIN_TEMPERATURE) {
            Some(raw) => parse_temperature(ENV_MIN_TEMPERATURE, &raw)?,
            None => defaults.min_temperature,
        };
        let max = match read(ENV_MAX_TEMPERATURE) {
            Some(raw) => parse_temperature(ENV_MAX_TEMPERATURE, &raw)?,
            None => defaults.max_temperature,
        };
        let alerts = AlertConfig::new(min, max).map_err(|e| ConfigError::Invalid {
            key: ENV_MIN_TEMPERATURE,
            reason: e.to_string(),
        })?;

        let qr_template = match read(ENV_QR_TEMPLATE) {
            Some(raw) => QrCodeTemplate::new(raw).map_err(|e| ConfigError::Invalid {
                key: ENV_QR_TEMPLATE,
                reason: e.to_string(),
            })?,
            None => QrCodeTemplate::default(),
        };

        let rebatch_policy = match read(ENV_REBATCH_POLICY) {
            Some(raw) => raw.parse::<RebatchPolicy>().map_err(|e| ConfigError::Invalid {
                key: ENV_REBATCH_POLICY,
                reason: e.to_string(),
            })?,
            None => RebatchPolicy::default(),
        };

        Ok(Self {
            alerts,
            qr_template,
            rebatch_policy,
        })
    }

    pub fn with_rebatch_policy(mut self, policy: RebatchPolicy) -> Self {
        self.rebatch_policy = policy;
        self
    }

    pub fn with_alerts(mut self, alerts: AlertConfig) -> Self {
        self.alerts = alerts;
        self
    }
}

fn parse_temperature(key: &'static str, raw: &str) -> Result<Temperature, ConfigError> {
    raw.trim()
        .parse::<i64>()
        .map(Temperature::from_centi)
        .map_err(|_| ConfigError::InvalidTemperature {
            key,
            value: raw.to_string(),
        })
}
