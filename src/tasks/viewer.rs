//! Render-command sink for the reference binary: logs what a DOM renderer
//! would do with each command.

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::events::{RenderCommand, ResourceLoaded};

pub async fn run(
    mut commands: Receiver<RenderCommand>,
    mut loaded: Receiver<ResourceLoaded>,
    cancel: CancellationToken,
) -> Result<()> {
    loop {
        select! {
            _ = cancel.cancelled() => break,
            Some(command) = commands.recv() => match command {
                RenderCommand::Build { slides, looping } => {
                    info!(slides = slides.len(), looping, "build slide track");
                }
                RenderCommand::Clear => info!("clear slide track"),
                RenderCommand::Translate { offset_percent, animate } => {
                    info!(offset_percent, animate, "translate track");
                }
                RenderCommand::Navigate { url } => info!(%url, "navigate"),
            },
            Some(ResourceLoaded(url)) = loaded.recv() => info!(%url, "resource ready"),
            else => break,
        }
    }
    Ok(())
}
