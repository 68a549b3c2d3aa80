//! wavi — terminal waveform visualizer.

mod app;
mod capture;
mod commands;
mod config;
mod logging;
mod tui;
mod waveform;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    app::run().await
}
