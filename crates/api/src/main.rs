use std::sync::Arc;

use anyhow::Context;

use chaintrack_core::Identity;
use chaintrack_infra::LedgerConfig;

const ENV_ADMIN: &str = "CHAINTRACK_ADMIN";
const ENV_BIND: &str = "CHAINTRACK_BIND";
const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chaintrack_observability::init();

    let config = LedgerConfig::from_env().context("invalid ledger configuration")?;

    let admin = std::env::var(ENV_ADMIN)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .with_context(|| format!("{ENV_ADMIN} must name the initial admin identity"))?;
    let admin = Identity::new(admin);

    let bind = std::env::var(ENV_BIND).unwrap_or_else(|_| DEFAULT_BIND.to_string());

    let services = chaintrack_api::app::services::build_services(config, &admin)
        .context("failed to initialize ledger")?;
    let app = chaintrack_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    tracing::info!(addr = %listener.local_addr()?, admin = %admin, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
