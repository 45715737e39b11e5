//! Ledger wiring for the HTTP layer.

use chaintrack_core::Identity;
use chaintrack_infra::{InMemoryLedger, LedgerConfig, LedgerResult};

/// Shared state behind every handler.
pub struct AppServices {
    pub ledger: InMemoryLedger,
}

impl AppServices {
    pub fn new(ledger: InMemoryLedger) -> Self {
        Self { ledger }
    }
}

/// Build an in-memory ledger and initialize it with `admin`.
pub fn build_services(config: LedgerConfig, admin: &Identity) -> LedgerResult<AppServices> {
    tracing::info!(
        min_temperature = %config.alerts.min_temperature,
        max_temperature = %config.alerts.max_temperature,
        rebatch_policy = %config.rebatch_policy,
        "building ledger"
    );

    let ledger = InMemoryLedger::in_memory(config);
    ledger.initialize(admin)?;
    Ok(AppServices::new(ledger))
}
