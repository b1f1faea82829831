//! overcast proxy entry point.
//!
//! Installs and activates the configured cache generation, then serves
//! line-oriented requests from stdin: one URL per line, with an optional
//! trailing `navigate` flag for document loads. Logging goes to stderr so
//! stdout stays a clean response stream.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::AsyncBufReadExt;
use tokio::sync::{mpsc, oneshot};
use tracing_subscriber::EnvFilter;

mod policy;
mod proxy;
mod seeder;
mod serve;
mod strategy;
mod sweeper;
mod writeback;

#[cfg(test)]
mod testutil;

use overcast_client::{FetchConfig, HttpFetcher, ResourceRequest};
use overcast_core::{AppConfig, SqliteStore};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!("starting overcast proxy for {}", config.origin);

    let store = SqliteStore::open(&config.db_path).await?;
    let fetcher = HttpFetcher::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
        ..Default::default()
    })?;

    let proxy = Arc::new(proxy::CacheProxy::new(Arc::new(store), Arc::new(fetcher), config)?);
    proxy.install().await?;
    proxy.activate().await?;

    let (tx, rx) = mpsc::channel(64);
    let server = tokio::spawn(serve::run(Arc::clone(&proxy), rx));

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (target, navigate) = match line.strip_suffix(" navigate") {
            Some(rest) => (rest.trim(), true),
            None => (line, false),
        };

        let request = if navigate { ResourceRequest::navigation(target) } else { ResourceRequest::get(target) };
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                println!("error {e}");
                continue;
            }
        };

        let (respond_to, response) = oneshot::channel();
        if tx.send(serve::Intercept { request, respond_to }).await.is_err() {
            break;
        }

        match response.await {
            Ok(Ok(served)) => {
                println!("{} {} {}B {}", served.status, served.served_from, served.body.len(), served.url)
            }
            Ok(Err(e)) => println!("error {e}"),
            Err(_) => println!("error response dropped"),
        }
    }

    drop(tx);
    proxy.write_queue().flush().await;
    server.await?;

    Ok(())
}
