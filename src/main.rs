use anyhow::Context;
use reqdata::app::{router, AppConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("无法监听 {}", config.addr))?;

    info!(addr = %config.addr, "reqdata-echo 已启动");
    axum::serve(listener, router(config.parse)).await?;
    Ok(())
}
