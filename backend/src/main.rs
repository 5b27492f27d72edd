use std::time::Duration;

use eyre::Result;
use log::info;

use backend::{app, Api, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // setup log
    env_logger::init();
    info!("server starts with logging");

    let config = Config::load()?;
    info!("data directory: {}", config.storage.data_dir.display());

    let api = Api::from_config(&config).await;
    api.auth_service
        .spawn_session_sweeper(Duration::from_secs(config.auth.sweep_interval_secs));

    let router = app(api, config.server.static_dir.clone());
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
