use anyhow::{Context, Result};
use news_radar::{config, logging, retention, shutdown};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cfg = config::load_retention().context("load config")?;

    let mut shutdown = shutdown::watch_signals()?;

    let Some(client) = retention::connect_with_backoff(&cfg, &mut shutdown).await? else {
        return Ok(());
    };

    tracing::info!("connected to elasticsearch");
    tracing::info!(
        "retention job running (interval {:?}, max age {:?})",
        cfg.interval,
        cfg.max_age
    );

    retention::run(&cfg, &client, shutdown).await;
    Ok(())
}
