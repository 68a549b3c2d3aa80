//! Live capture with a scrolling waveform.
//!
//! Arms a capture session, renders the snapshots it publishes, and on keep
//! writes the captured audio out as WAV. Canceling (or any failure) drops the
//! session without surfacing its partial waveform. SIGUSR1 acts as an
//! external keep trigger.

use crate::capture::LiveCapture;
use crate::config::WaviConfig;
use crate::tui::{LiveCommand, LiveTui};
use crate::waveform::{wav, WaveformSnapshot};
use std::path::PathBuf;
use std::sync::Arc;

/// Handles the `record` command.
///
/// `output` is the WAV path for a kept recording; without it the recording is
/// saved next to the working directory as `wavi-recording.wav`. `device`
/// overrides the configured input device.
///
/// # Errors
/// - If configuration cannot be loaded
/// - If the capture device cannot be opened
/// - If the terminal UI fails
/// - If the kept recording cannot be written
pub async fn handle_record(
    output: Option<String>,
    device: Option<String>,
) -> Result<(), anyhow::Error> {
    tracing::info!("=== wavi record started ===");

    let config = WaviConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {e}");
        anyhow::anyhow!("Configuration error: {e}. Check ~/.config/wavi/wavi.toml.")
    })?;
    let device_spec = device.unwrap_or_else(|| config.audio.device.clone());

    let capture = LiveCapture::start(
        &device_spec,
        config.waveform.samples_per_sec,
        config.waveform.live_ceiling,
    )
    .map_err(|e| {
        tracing::error!("Failed to start capture: {e}");
        e
    })?;

    let mut tui = LiveTui::new().map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;

    let keep_signal = Arc::new(std::sync::atomic::AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, Arc::clone(&keep_signal))
        .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;

    // Baseline before the first callback publishes.
    let mut latest = WaveformSnapshot {
        amplitudes: Arc::from(Vec::new()),
        peak: config.waveform.live_ceiling,
        duration_secs: 0.0,
    };

    tracing::debug!("Entering capture loop. 'Enter' keeps, 'Escape'/'q' cancels.");
    let keep = loop {
        if keep_signal.load(std::sync::atomic::Ordering::Relaxed) {
            tracing::info!("Received SIGUSR1: keeping recording via external trigger");
            break true;
        }

        match tui.handle_input() {
            Ok(LiveCommand::Continue) => {
                if let Some(snapshot) = capture.latest_snapshot() {
                    latest = snapshot;
                }
                if let Err(e) = tui.render(&latest) {
                    tui.cleanup().ok();
                    return Err(anyhow::anyhow!("Render failed: {e}"));
                }
            }
            Ok(LiveCommand::Keep) => break true,
            Ok(LiveCommand::Cancel) => break false,
            Ok(LiveCommand::TogglePause) => {
                capture.toggle_pause();
                tui.is_paused = capture.is_paused();
            }
            Err(e) => {
                tracing::error!("Input handling error: {}", e);
                tui.cleanup().ok();
                return Err(anyhow::anyhow!("Input handling error: {e}"));
            }
        }
    };

    tui.cleanup()
        .map_err(|e| anyhow::anyhow!("Cleanup failed: {e}"))?;

    if !keep {
        // Dropping the capture discards the session's partial state.
        tracing::info!("Capture canceled, session discarded");
        return Ok(());
    }

    let result = capture.stop()?;
    if result.samples.is_empty() {
        tracing::warn!("Recording stopped with no samples captured");
        println!("Nothing captured.");
        return Ok(());
    }

    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("wavi-recording.wav"));
    wav::write_wav(&path, &result.samples, result.sample_rate)?;

    println!(
        "Saved {} ({}, {} waveform px, peak {:.0})",
        path.display(),
        crate::tui::format_duration(result.snapshot.duration_secs),
        result.snapshot.amplitudes.len(),
        result.snapshot.peak
    );
    tracing::info!("=== wavi record exited successfully ===");
    Ok(())
}
