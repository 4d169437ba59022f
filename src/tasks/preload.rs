//! Opportunistic resource preloader.
//!
//! Fetches image resources ahead of need and marks each one loaded exactly
//! once per render pass. Eager requests (the slides around the cursor) are
//! served before background sweep requests. A resource counts as loaded
//! only if its bytes decode as an image; a failed fetch or decode leaves no
//! marker, so the URL stays eligible for later sweeps within the pass.

use std::collections::{HashSet, VecDeque};
use std::future::Future;

use anyhow::{Context, Result};
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::events::{PreloadCommand, Priority, ResourceLoaded};

/// Fetches the raw bytes of one displayable resource. Implemented over
/// HTTP for production and by in-memory fakes in tests.
pub trait FetchResource: Clone + Send + 'static {
    fn fetch(&self, url: String) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchResource for HttpFetcher {
    fn fetch(&self, url: String) -> impl Future<Output = Result<Vec<u8>>> + Send {
        let client = self.client.clone();
        async move {
            let bytes = client
                .get(&url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .with_context(|| format!("fetching {url}"))?
                .bytes()
                .await
                .with_context(|| format!("reading {url}"))?;
            Ok(bytes.to_vec())
        }
    }
}

pub async fn run<F: FetchResource>(
    mut commands: Receiver<PreloadCommand>,
    loaded_tx: Sender<ResourceLoaded>,
    fetcher: F,
    cancel: CancellationToken,
    max_in_flight: usize,
) -> Result<()> {
    let mut loaded: HashSet<String> = HashSet::new();
    let mut in_flight: HashSet<String> = HashSet::new();
    let mut eager: VecDeque<String> = VecDeque::new();
    let mut background: VecDeque<String> = VecDeque::new();
    // Render-pass counter. In-flight loads are never cancelled on reset;
    // results from an older pass just no longer set a marker.
    let mut pass: u64 = 0;
    let mut tasks: JoinSet<(String, u64, bool)> = JoinSet::new();

    loop {
        while in_flight.len() < max_in_flight {
            let Some(url) = eager.pop_front().or_else(|| background.pop_front()) else {
                break;
            };
            if loaded.contains(&url) || !in_flight.insert(url.clone()) {
                continue;
            }
            let fetcher = fetcher.clone();
            let spawned_pass = pass;
            tasks.spawn(async move {
                let ok = match fetcher.fetch(url.clone()).await {
                    Ok(bytes) => {
                        let decoded = tokio::task::spawn_blocking(move || {
                            image::load_from_memory(&bytes).is_ok()
                        })
                        .await
                        .unwrap_or(false);
                        if !decoded {
                            debug!(%url, "resource is not a decodable image");
                        }
                        decoded
                    }
                    Err(err) => {
                        debug!(%url, error = %err, "resource fetch failed");
                        false
                    }
                };
                (url, spawned_pass, ok)
            });
        }

        select! {
            _ = cancel.cancelled() => break,

            maybe_command = commands.recv() => match maybe_command {
                Some(PreloadCommand::Reset) => {
                    debug!(loaded = loaded.len(), "render pass ended; markers dropped");
                    loaded.clear();
                    eager.clear();
                    background.clear();
                    pass += 1;
                }
                Some(PreloadCommand::Fetch { urls, priority }) => {
                    for url in urls {
                        if loaded.contains(&url) || in_flight.contains(&url) {
                            continue;
                        }
                        match priority {
                            Priority::Eager => eager.push_back(url),
                            Priority::Background => background.push_back(url),
                        }
                    }
                }
                None => break,
            },

            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                if let Ok((url, spawned_pass, ok)) = joined {
                    in_flight.remove(&url);
                    if spawned_pass != pass {
                        debug!(%url, "stale load from a previous pass; marker ignored");
                    } else if ok && loaded.insert(url.clone()) {
                        debug!(%url, "resource loaded");
                        let _ = loaded_tx.send(ResourceLoaded(url)).await;
                    }
                }
            }
        }
    }
    Ok(())
}
