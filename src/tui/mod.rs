//! Terminal rendering for wavi.
//!
//! Two full-screen views share the same mirrored-sparkline look: a static
//! scrollable view for decoded files and a scrolling live view for capture.
//! Both render from immutable [`WaveformSnapshot`](crate::waveform::WaveformSnapshot)s;
//! neither reaches into pipeline-owned state.

pub mod live;
pub mod view;

pub use live::{LiveCommand, LiveTui};
pub use view::ViewTui;

use ratatui::prelude::*;
use ratatui::widgets::Sparkline;

/// Vertical scale for normalized amplitudes.
pub(crate) const AMPLITUDE_SCALE: u64 = 100;

/// Renders a mirrored waveform (bars growing from the vertical center) into
/// `area`, with the given footer line below it.
pub(crate) fn draw_waveform(frame: &mut Frame, data: &[u64], footer: ratatui::text::Line) {
    let area = frame.area();

    let footer_height = 1;
    let content_area = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: area.height.saturating_sub(footer_height),
    };

    let top_height = content_area.height / 2;
    let top_area = Rect {
        x: content_area.x,
        y: content_area.y,
        width: content_area.width,
        height: top_height,
    };
    let bottom_area = Rect {
        x: content_area.x,
        y: content_area.y + top_height,
        width: content_area.width,
        height: content_area.height.saturating_sub(top_height),
    };

    // Upper half grows downward-to-up; the lower half is the same data
    // inverted so the bars meet in the middle.
    let top = Sparkline::default()
        .data(data)
        .max(AMPLITUDE_SCALE)
        .style(
            Style::default()
                .bg(Color::Rgb(0, 0, 0))
                .fg(Color::Rgb(206, 224, 220)),
        );
    frame.render_widget(top, top_area);

    let inverted: Vec<u64> = data
        .iter()
        .map(|&v| AMPLITUDE_SCALE.saturating_sub(v))
        .collect();
    let bottom = Sparkline::default()
        .data(&inverted)
        .max(AMPLITUDE_SCALE)
        .style(
            Style::default()
                .bg(Color::Rgb(206, 224, 220))
                .fg(Color::Rgb(0, 0, 0)),
        );
    frame.render_widget(bottom, bottom_area);

    let footer_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(footer_height),
        width: area.width,
        height: footer_height,
    };
    let footer_widget = ratatui::widgets::Paragraph::new(footer).style(
        Style::default()
            .fg(Color::Rgb(185, 207, 212))
            .bg(Color::Rgb(0, 0, 0)),
    );
    frame.render_widget(footer_widget, footer_area);
}

/// Formats seconds as m:ss.
pub(crate) fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(7.9), "0:07");
        assert_eq!(format_duration(61.0), "1:01");
        assert_eq!(format_duration(3601.5), "60:01");
    }
}
