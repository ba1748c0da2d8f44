use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::widgets::centered_rect;

const BINDINGS: &[(&str, &str)] = &[
    ("c", "Choose clinic"),
    ("1-5", "Sort by ID / Clinic ID / First name / Last name / Date of birth"),
    ("Left/Right", "Move the focused field"),
    ("Enter/Space", "Sort by the focused field"),
    ("Up/Down j/k", "Move between cards"),
    ("PgUp/PgDn", "Scroll a page of cards"),
    ("x", "Export the displayed patients to CSV"),
    ("F1 or ?", "Toggle this help"),
    ("F5", "Toggle the log view"),
    ("Esc", "Close overlay, or quit"),
    ("q", "Quit"),
];

/// Key binding reference overlay
pub struct HelpWidget;

impl HelpWidget {
    pub fn lines() -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(
                "Each click on a field flips the sort direction, then sorts by that field.",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                "Mouse: click a field on any card, or the clinic line.",
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
        ];

        lines.extend(BINDINGS.iter().map(|(key, action)| {
            Line::from(vec![
                Span::styled(
                    format!("{:>14}  ", key),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(*action),
            ])
        }));
        lines
    }

    pub fn render(f: &mut Frame, area: Rect) {
        let popup = centered_rect(70, 70, area);
        let help = Paragraph::new(Self::lines())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help ")
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(Clear, popup);
        f.render_widget(help, popup);
    }
}
