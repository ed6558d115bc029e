use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use eyre::{Result, WrapErr};
use log::{LevelFilter, error, info, warn};

use tubescript::config::{Config, ExecutionMode, Settings, config_path};
use tubescript::manager::VideoManager;
use tubescript::server;

mod cli;

use cli::Cli;

fn setup_logging(log_file: Option<&Path>, verbose: bool) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_module("tubescript", LevelFilter::Debug);
    }

    if let Some(log_file) = log_file {
        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(log_file)?);
        builder.target(env_logger::Target::Pipe(target));
    }

    builder.init();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining in-flight requests");
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env values must be visible before clap reads the environment
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    setup_logging(cli.log_file.as_deref(), cli.verbose)?;

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let config_path = cli.config.clone().unwrap_or_else(config_path);
    let config = Config::load(&config_path).unwrap_or_else(|e| {
        warn!("Ignoring config file {}: {e}", config_path.display());
        Config::default()
    });

    let settings = match Settings::resolve(cli.overrides(), config) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Error: {e}");
            if cli.log_file.is_some() {
                eprintln!("Error: {e}");
            }
            std::process::exit(1);
        }
    };

    info!(
        "Starting in {} mode (default lang: {})",
        settings.mode,
        settings.effective_default_lang()
    );

    if settings.mode == ExecutionMode::Hosted {
        info!("Hosted mode: configuration validated, no listener bound; hosts embed tubescript::server::router");
        return Ok(());
    }

    let client = reqwest::Client::new();
    let videos = Arc::new(VideoManager::youtube(
        client,
        settings.api_key.clone(),
        settings.default_lang.clone(),
        &settings.metadata_base_url,
    ));
    let app = server::router(videos);

    let addr = settings.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("could not bind {addr}"))?;
    info!("YouTube transcript API server running on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
