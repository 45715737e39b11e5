use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chaintrack_auth::{Role, RoleRegistry};
use chaintrack_core::{Aggregate, DomainError, DomainResult, Identity, ProductId};
use chaintrack_events::Event;

use crate::Temperature;

/// Global alert bounds. A reading equal to either bound is in range.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertConfig {
    pub min_temperature: Temperature,
    pub max_temperature: Temperature,
}

impl AlertConfig {
    pub const DEFAULT_MIN: Temperature = Temperature::from_centi(1500);
    pub const DEFAULT_MAX: Temperature = Temperature::from_centi(2500);

    /// Validated constructor: `min` must not exceed `max`.
    pub fn new(min_temperature: Temperature, max_temperature: Temperature) -> DomainResult<Self> {
        if min_temperature > max_temperature {
            return Err(DomainError::invalid_input(format!(
                "min temperature {min_temperature} exceeds max temperature {max_temperature}"
            )));
        }
        Ok(Self {
            min_temperature,
            max_temperature,
        })
    }

    /// Pure evaluation of one reading.
    pub fn evaluate(&self, temperature: Temperature) -> AlertDecision {
        if temperature < self.min_temperature {
            AlertDecision::Breached(Breach::BelowMinimum)
        } else if temperature > self.max_temperature {
            AlertDecision::Breached(Breach::AboveMaximum)
        } else {
            AlertDecision::WithinRange
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            min_temperature: Self::DEFAULT_MIN,
            max_temperature: Self::DEFAULT_MAX,
        }
    }
}

/// Which bound a reading crossed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Breach {
    BelowMinimum,
    AboveMaximum,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AlertDecision {
    WithinRange,
    Breached(Breach),
}

impl AlertDecision {
    pub fn is_alert(&self) -> bool {
        matches!(self, AlertDecision::Breached(_))
    }
}

/// Event: thresholds replaced (both bounds at once).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdsChanged {
    pub min_temperature: Temperature,
    pub max_temperature: Temperature,
    pub changed_by: Identity,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a recorded reading fell outside the thresholds in effect at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureAlert {
    pub product_id: ProductId,
    pub temperature: Temperature,
    pub breach: Breach,
    pub min_temperature: Temperature,
    pub max_temperature: Temperature,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertEvent {
    ThresholdsChanged(ThresholdsChanged),
    TemperatureAlert(TemperatureAlert),
}

impl Event for AlertEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AlertEvent::ThresholdsChanged(_) => "alerts.thresholds.changed",
            AlertEvent::TemperatureAlert(_) => "alerts.temperature.alert",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AlertEvent::ThresholdsChanged(e) => e.occurred_at,
            AlertEvent::TemperatureAlert(e) => e.occurred_at,
        }
    }
}

/// Aggregate: the thresholds in effect plus a count of raised alerts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertPolicy {
    config: AlertConfig,
    alerts_raised: u64,
    version: u64,
}

impl AlertPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> AlertConfig {
        self.config
    }

    pub fn alerts_raised(&self) -> u64 {
        self.alerts_raised
    }

    /// Thresholds recorded at ledger initialization. Authorization is implied: the admin
    /// is being created in the same operation. `config` is re-checked since its fields are
    /// public and may not have gone through [`AlertConfig::new`].
    pub fn establish(
        &self,
        config: AlertConfig,
        admin: &Identity,
        at: DateTime<Utc>,
    ) -> DomainResult<Vec<AlertEvent>> {
        let config = AlertConfig::new(config.min_temperature, config.max_temperature)?;
        Ok(vec![AlertEvent::ThresholdsChanged(ThresholdsChanged {
            min_temperature: config.min_temperature,
            max_temperature: config.max_temperature,
            changed_by: admin.clone(),
            occurred_at: at,
        })])
    }

    pub fn set_thresholds(
        &self,
        roles: &RoleRegistry,
        min_temperature: Temperature,
        max_temperature: Temperature,
        caller: &Identity,
        at: DateTime<Utc>,
    ) -> DomainResult<Vec<AlertEvent>> {
        roles.require(Role::Admin, caller)?;
        self.establish(AlertConfig { min_temperature, max_temperature }, caller, at)
    }

    /// Alert for a reading on `product_id`, if it is out of range.
    pub fn evaluate(
        &self,
        product_id: ProductId,
        temperature: Temperature,
        at: DateTime<Utc>,
    ) -> Option<TemperatureAlert> {
        match self.config.evaluate(temperature) {
            AlertDecision::WithinRange => None,
            AlertDecision::Breached(breach) => Some(TemperatureAlert {
                product_id,
                temperature,
                breach,
                min_temperature: self.config.min_temperature,
                max_temperature: self.config.max_temperature,
                occurred_at: at,
            }),
        }
    }
}

impl Aggregate for AlertPolicy {
    type Event = AlertEvent;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AlertEvent::ThresholdsChanged(e) => {
                self.config = AlertConfig {
                    min_temperature: e.min_temperature,
                    max_temperature: e.max_temperature,
                };
            }
            AlertEvent::TemperatureAlert(_) => {
                self.alerts_raised += 1;
            }
        }

        self.version += 1;
    }

    fn version(&self) -> u64 {
        self.version
    }
}
