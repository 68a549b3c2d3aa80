//! Static waveform view for decoded files.
//!
//! Renders one published snapshot full screen, with horizontal scrolling when
//! the waveform holds more pixels than the terminal is wide. The snapshot is
//! normalized once against its own peak; redraws only reslice.

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

/// Terminal UI showing a completed waveform session.
pub struct ViewTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    title: String,
    normalized: Vec<u64>,
    duration_secs: f64,
    scroll: usize,
}

impl ViewTui {
    /// Creates the view for a published snapshot and enters alternate screen
    /// mode.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    /// - If raw mode cannot be enabled
    pub fn new(title: String, snapshot: &WaveformSnapshot) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(ViewTui {
            terminal,
            title,
            normalized: snapshot.normalized(AMPLITUDE_SCALE),
            duration_secs: snapshot.duration_secs,
            scroll: 0,
        })
    }

    /// Runs the view loop until the user exits.
    ///
    /// Left/Right scroll by one pixel, PageUp/PageDown by a screen, Home/End
    /// jump to the edges, Escape/'q' exits.
    ///
    /// # Errors
    /// - If terminal rendering or event polling fails
    pub fn run(&mut self) -> Result<()> {
        loop {
            let width = self.terminal.size()?.width as usize;
            let max_scroll = self.normalized.len().saturating_sub(width);
            self.scroll = self.scroll.min(max_scroll);
            self.draw(width, max_scroll)?;

            if !event::poll(std::time::Duration::from_millis(100))? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Left | KeyCode::Char('h') => {
                        self.scroll = self.scroll.saturating_sub(1);
                    }
                    KeyCode::Right | KeyCode::Char('l') => {
                        self.scroll = (self.scroll + 1).min(max_scroll);
                    }
                    KeyCode::PageUp => {
                        self.scroll = self.scroll.saturating_sub(width);
                    }
                    KeyCode::PageDown => {
                        self.scroll = (self.scroll + width).min(max_scroll);
                    }
                    KeyCode::Home => self.scroll = 0,
                    KeyCode::End => self.scroll = max_scroll,
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn draw(&mut self, width: usize, max_scroll: usize) -> Result<()> {
        let end = (self.scroll + width).min(self.normalized.len());
        let visible = &self.normalized[self.scroll..end];

        let position = if max_scroll == 0 {
            String::new()
        } else {
            format!("  {}-{}/{}", self.scroll, end, self.normalized.len())
        };
        let footer = ratatui::text::Line::from(vec![
            Span::styled(self.title.clone(), Style::default().fg(Color::White)),
            Span::raw(format!("  {}", format_duration(self.duration_secs))),
            Span::raw(format!(" / {} px", self.normalized.len())),
            Span::raw(position),
            Span::raw("  [←/→] scroll  [Esc/q] quit"),
        ]);

        let visible = visible.to_vec();
        self.terminal.draw(|frame| {
            draw_waveform(frame, &visible, footer);
        })?;
        Ok(())
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
