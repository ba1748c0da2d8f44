use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::utils::logging::{get_log_buffer, LogEntry};
use crate::widgets::centered_rect;

/// Overlay with the most recent log lines
pub struct LogWidget;

impl LogWidget {
    fn style_for(entry: &LogEntry) -> Style {
        match entry.level.as_str() {
            "ERROR" => Style::default().fg(Color::Red),
            "WARN" => Style::default().fg(Color::Yellow),
            "DEBUG" | "TRACE" => Style::default().fg(Color::DarkGray),
            _ => Style::default(),
        }
    }

    pub fn render(f: &mut Frame, area: Rect) {
        let popup = centered_rect(90, 80, area);
        let capacity = popup.height.saturating_sub(2) as usize;

        let lines: Vec<Line> = match get_log_buffer() {
            Some(buffer) if !buffer.is_empty() => buffer
                .get_recent(capacity)
                .iter()
                .map(|entry| Line::styled(entry.format_for_display(), Self::style_for(entry)))
                .collect(),
            _ => vec![Line::from("No log entries")],
        };

        let logs = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Logs (F5 to close) ")
                .border_style(Style::default().fg(Color::Cyan)),
        );
        f.render_widget(Clear, popup);
        f.render_widget(logs, popup);
    }
}
