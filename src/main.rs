mod ai;
mod app;
mod cache;
mod captcha;
mod config;
mod db;
mod detection;
mod domain;
mod infrastructure;
mod liveness;
mod tasks;
mod web;

use anyhow::Result;
use infrastructure::{directories, logging, shutdown};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config.logging, &paths)?;

    let shutdown = shutdown::Shutdown::new();
    shutdown::install_signal_handlers(shutdown.clone());

    let app = app::PhishShieldApp::initialize(config, paths, shutdown).await?;
    app.run().await
}
