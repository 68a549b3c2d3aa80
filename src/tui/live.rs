//! Live capture view.
//!
//! Scrolling waveform of the capture in progress, fed by the snapshots the
//! pipeline publishes per captured buffer. Amplitudes are normalized against
//! the configured fixed ceiling, so bars keep their height as the recording
//! gets louder.

use super::{draw_waveform, format_duration, AMPLITUDE_SCALE};
use crate::waveform::WaveformSnapshot;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::{stdout, Stdout};

/// User input command during live capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveCommand {
    /// Keep capturing (no key pressed)
    Continue,
    /// Stop and keep the recording (Enter key)
    Keep,
    /// Exit and discard (Escape or 'q')
    Cancel,
    /// Pause/resume capture (Space key)
    TogglePause,
}

/// Terminal UI for live capture.
pub struct LiveTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Whether capture is currently paused (mirrored from the capture).
    pub is_paused: bool,
}

impl LiveTui {
    /// Creates the live view and enters alternate screen mode.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    /// - If raw mode cannot be enabled
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(LiveTui {
            terminal,
            is_paused: false,
        })
    }

    /// Renders the newest published snapshot.
    ///
    /// Shows the most recent terminal-width's worth of pixels. Values above
    /// the configured ceiling are clipped to full height.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(&mut self, snapshot: &WaveformSnapshot) -> Result<()> {
        let width = self.terminal.size()?.width as usize;

        let normalized = snapshot.normalized(AMPLITUDE_SCALE);
        let start = normalized.len().saturating_sub(width);
        let visible: Vec<u64> = normalized[start..]
            .iter()
            .map(|&v| v.min(AMPLITUDE_SCALE))
            .collect();

        let indicator = if self.is_paused {
            Span::styled("⏸ ", Style::default().fg(Color::Yellow))
        } else {
            Span::styled("● ", Style::default().fg(Color::Red))
        };
        let footer = ratatui::text::Line::from(vec![
            indicator,
            Span::raw(format_duration(snapshot.duration_secs)),
            Span::raw(format!(" / {} px", snapshot.amplitudes.len())),
            Span::raw("  [Enter] keep  [Space] pause  [Esc/q] cancel"),
        ]);

        self.terminal.draw(|frame| {
            draw_waveform(frame, &visible, footer);
        })?;

        Ok(())
    }

    /// Processes user input and returns the appropriate capture command.
    ///
    /// # Returns
    /// - `Continue` if no key or an unrecognized key was pressed
    /// - `Keep` on Enter
    /// - `Cancel` on Escape, 'q', or Ctrl+C
    /// - `TogglePause` on Space
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> Result<LiveCommand> {
        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Enter => {
                        tracing::debug!("Enter pressed: keeping recording");
                        LiveCommand::Keep
                    }
                    KeyCode::Char('q') | KeyCode::Esc => {
                        tracing::debug!("Escape or 'q' pressed: canceling capture");
                        LiveCommand::Cancel
                    }
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        tracing::debug!("Ctrl+C pressed: canceling capture");
                        LiveCommand::Cancel
                    }
                    KeyCode::Char(' ') => {
                        tracing::debug!("Space pressed: toggling pause");
                        LiveCommand::TogglePause
                    }
                    _ => LiveCommand::Continue,
                });
            }
        }
        Ok(LiveCommand::Continue)
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If raw mode cannot be disabled
    /// - If the cursor cannot be shown
    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
