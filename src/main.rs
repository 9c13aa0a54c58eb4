//! gphotos-sync: mirror a Google Photos album into a local directory.
//!
//! `SyncImage` downloads album items missing from the output directory and
//! deletes local images whose remote item is gone. `ListAlbum` prints every
//! album's identifier and title. Everything runs sequentially on a
//! single-threaded runtime.

#![warn(clippy::all)]

mod auth;
mod cli;
mod config;
mod download;
mod photos;
pub mod retry;
mod sync;
mod types;

use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use reqwest::Client;
use tracing_subscriber::EnvFilter;

use config::Config;
use photos::PhotosClient;
use types::Command;

/// Build the one HTTP client shared by the API client and the downloader.
fn build_http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("gphotos-sync/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Run the SyncImage command.
async fn run_sync(photos: &PhotosClient, client: Client, config: &Config) -> anyhow::Result<()> {
    let started = Instant::now();
    let downloader = download::Downloader::new(client, config.retry);
    let reconciler = sync::Reconciler::new(
        photos,
        &downloader,
        &config.album_id,
        &config.output_path,
        config.page_size,
        config.retry,
    );

    let summary = reconciler.run().await?;
    summary.log(started.elapsed());
    Ok(())
}

/// Run the ListAlbum command.
async fn run_list_albums(photos: &PhotosClient, config: &Config) -> anyhow::Result<()> {
    let albums = photos::list_all_albums(photos, &config.retry)
        .await
        .context("Failed to list albums")?;

    for album in &albums {
        println!("{} {}", album.id, album.title);
    }
    tracing::info!(count = albums.len(), "Listed albums");
    Ok(())
}

async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    tracing::debug!(?config, ?command, "Loaded configuration");
    if command == Command::SyncImage {
        config.validate_for_sync()?;
    }

    let client = build_http_client(config.timeout()).context("Failed to build HTTP client")?;
    let access_token = auth::access_token(&client, &config.credentials, &config.token_url)
        .await
        .context("Failed to obtain an access token")?;
    let photos = PhotosClient::new(client.clone(), &config.api_base_url, access_token);

    match command {
        Command::SyncImage => run_sync(&photos, client, &config).await,
        Command::ListAlbum => run_list_albums(&photos, &config).await,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = cli::Cli::parse();
    let config = Config::load(&cli.config);

    let filter = config
        .as_ref()
        .map(|c| c.log_level)
        .unwrap_or_default()
        .as_str()
        .to_string();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    tracing::info!("Starting gphotos-sync");

    let result = match config {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => tracing::info!("Good bye..."),
        Err(e) => {
            tracing::error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
