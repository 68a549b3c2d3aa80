//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to the appropriate
//! command handlers.

use crate::commands;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;

/// A terminal waveform visualizer for audio files and live capture
#[derive(Parser)]
#[command(name = "wavi")]
#[command(version)]
#[command(about = "Terminal waveform visualizer")]
#[command(long_about = "Terminal waveform visualizer for audio files and live capture.\n\n\
DEFAULT COMMAND:\n    \
With a FILE argument, 'view' is used; with no arguments, 'record'.\n\n\
EXAMPLES:\n    \
# View the waveform of a WAV file\n    \
$ wavi track.wav\n    \
$ wavi view track.wav --density 120\n    \n    \
# Record from the default input device with a live waveform\n    \
$ wavi\n    \
$ wavi record -o take1.wav\n    \n    \
# List audio input devices\n    \
$ wavi list-devices\n    \n    \
# Edit configuration file\n    \
$ wavi config")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/wavi/wavi.toml\n    Logs:               ~/.local/state/wavi/wavi.log.*"
)]
struct Cli {
    /// Audio file to view (shorthand for 'wavi view FILE')
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the waveform of an audio file
    ///
    /// Decodes a WAV file and shows its full amplitude envelope.
    /// Scroll with arrow keys when the waveform is wider than the terminal.
    #[command(visible_alias = "v")]
    View {
        /// Path to the audio file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Waveform pixels per second of audio (overrides config)
        #[arg(short, long, value_name = "N")]
        density: Option<u32>,
    },

    /// Record audio with a live scrolling waveform (default)
    ///
    /// Press Enter to stop and keep, Space to pause/resume, Escape/q to
    /// cancel and discard.
    #[command(visible_alias = "r")]
    Record {
        /// Write the kept recording to this WAV file
        #[arg(short, long, value_name = "FILE")]
        output: Option<String>,

        /// Input device name or index (overrides config)
        #[arg(short, long, value_name = "DEVICE")]
        device: Option<String>,
    },

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in wavi.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Open configuration file in your preferred editor
    ///
    /// Edit audio device, pixel density, and live normalization settings.
    /// Uses $EDITOR environment variable or falls back to nano/vim.
    #[command(visible_alias = "c")]
    Config,

    /// Generate shell completion script
    ///
    /// Generate a completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails (decoding, capture, rendering)
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "wavi", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    match cli.command {
        Some(Commands::View { file, density }) => {
            commands::handle_view(file, density).await?;
        }
        Some(Commands::Record { output, device }) => {
            commands::handle_record(output, device).await?;
        }
        None => match cli.file {
            // Bare file argument is a view; no arguments at all records.
            Some(file) => commands::handle_view(file, None).await?,
            None => commands::handle_record(None, None).await?,
        },
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
