//! Render the waveform of an audio file.
//!
//! Opens a WAV file, runs the downsampling session on a background worker,
//! and hands the published snapshot to the static terminal view. A decode
//! failure discards the session before anything reaches the screen.

use crate::config::WaviConfig;
use crate::tui::ViewTui;
use crate::waveform::{WavSource, WaveformPipeline};
use std::path::PathBuf;

/// Handles the `view` command.
///
/// `density` overrides the configured pixels-per-second when given.
///
/// # Errors
/// - If the file cannot be opened or its header parsed (source unavailable)
/// - If decoding fails mid-stream (the session is discarded whole)
/// - If the terminal UI fails
pub async fn handle_view(file: PathBuf, density: Option<u32>) -> Result<(), anyhow::Error> {
    tracing::info!("=== wavi view: {} ===", file.display());

    let config = WaviConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {e}");
        anyhow::anyhow!("Configuration error: {e}. Check ~/.config/wavi/wavi.toml.")
    })?;
    let density = density.unwrap_or(config.waveform.samples_per_sec);

    let source = WavSource::open(&file)?;
    let pipeline = WaveformPipeline::new(source.format(), density);

    // Decode and downsample off the UI thread; the one atomic publish is the
    // value handed back here. On error nothing is rendered.
    let snapshot = tokio::task::spawn_blocking(move || pipeline.run(source.chunks())).await??;
    tracing::info!(
        "Decoded {}: {} pixels, {:.2}s",
        file.display(),
        snapshot.amplitudes.len(),
        snapshot.duration_secs
    );

    let title = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let mut tui = ViewTui::new(title, &snapshot)?;
    let result = tui.run();
    tui.cleanup()?;
    result
}
