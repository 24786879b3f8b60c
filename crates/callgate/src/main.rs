use anyhow::Result;
use callgate::{GateConfig, GateService};
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = GateConfig::from_env()?;
    if config.acl == "{}" {
        warn!("ACL is empty; every call will be denied");
    }

    let handle = GateService::new(config)?.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    handle.stop().await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
