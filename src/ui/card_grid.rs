use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::data::records::{PatientField, PatientRecord};
use crate::view::controller::SortDirection;

/// Five field lines plus the border
pub const CARD_HEIGHT: u16 = 7;

/// Where cards go inside the grid area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub area: Rect,
    pub per_row: usize,
    /// First card row shown (scroll offset in rows)
    pub first_row: usize,
}

impl GridLayout {
    pub fn new(area: Rect, per_row: usize, first_row: usize) -> Self {
        Self {
            area,
            per_row: per_row.max(1),
            first_row,
        }
    }

    /// Number of card rows that fit
    pub fn visible_rows(&self) -> usize {
        (self.area.height / CARD_HEIGHT) as usize
    }

    pub fn card_width(&self) -> u16 {
        let per_row = u16::try_from(self.per_row).unwrap_or(u16::MAX);
        self.area.width / per_row
    }

    /// Total rows needed for `count` cards
    pub fn total_rows(&self, count: usize) -> usize {
        count.div_ceil(self.per_row)
    }

    /// Largest scroll offset that still fills the view
    pub fn max_first_row(&self, count: usize) -> usize {
        self.total_rows(count).saturating_sub(self.visible_rows().max(1))
    }

    /// Rectangles of the visible cards as (card index, rect)
    pub fn card_rects(&self, count: usize) -> Vec<(usize, Rect)> {
        let width = self.card_width();
        if width < 3 {
            return Vec::new();
        }

        let start = self.first_row * self.per_row;
        let end = ((self.first_row + self.visible_rows()) * self.per_row).min(count);

        (start..end)
            .map(|index| {
                let row = (index / self.per_row - self.first_row) as u16;
                let col = (index % self.per_row) as u16;
                let rect = Rect {
                    x: self.area.x + col * width,
                    y: self.area.y + row * CARD_HEIGHT,
                    width,
                    height: CARD_HEIGHT,
                };
                (index, rect)
            })
            .collect()
    }

    /// Which card and field sit at a screen position
    pub fn hit_test(&self, count: usize, column: u16, row: u16) -> Option<(usize, PatientField)> {
        self.card_rects(count).into_iter().find_map(|(index, card)| {
            PatientField::ALL.into_iter().find_map(|field| {
                let line = field_rect(card, field);
                let inside = column >= line.x
                    && column < line.x + line.width
                    && row == line.y;
                inside.then_some((index, field))
            })
        })
    }
}

/// The line inside a card that shows `field`
pub fn field_rect(card: Rect, field: PatientField) -> Rect {
    Rect {
        x: card.x + 1,
        y: card.y + 1 + field.index() as u16,
        width: card.width.saturating_sub(2),
        height: 1,
    }
}

/// Renders the displayed patients as a grid of cards
pub struct CardGrid<'a> {
    records: &'a [&'a PatientRecord],
    layout: GridLayout,
    focus: Option<(usize, PatientField)>,
    sorted_by: Option<(PatientField, SortDirection)>,
    use_glyphs: bool,
    border_color: Color,
    focus_color: Color,
}

impl<'a> CardGrid<'a> {
    pub fn new(records: &'a [&'a PatientRecord], layout: GridLayout) -> Self {
        Self {
            records,
            layout,
            focus: None,
            sorted_by: None,
            use_glyphs: true,
            border_color: Color::Gray,
            focus_color: Color::Yellow,
        }
    }

    pub fn with_focus(mut self, card: usize, field: PatientField) -> Self {
        self.focus = Some((card, field));
        self
    }

    /// Mark the sorted field on every card
    pub fn with_sort(mut self, sorted_by: Option<PatientField>, direction: SortDirection) -> Self {
        self.sorted_by = sorted_by.map(|f| (f, direction));
        self
    }

    pub fn with_glyphs(mut self, use_glyphs: bool) -> Self {
        self.use_glyphs = use_glyphs;
        self
    }

    pub fn with_colors(mut self, border: Color, focus: Color) -> Self {
        self.border_color = border;
        self.focus_color = focus;
        self
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        if self.records.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No patients to show",
                Style::default().fg(Color::DarkGray),
            )));
            f.render_widget(empty, area);
            return;
        }

        let cards = self.layout.card_rects(self.records.len());
        if cards.is_empty() {
            let cramped = Paragraph::new(Line::from(Span::styled(
                "Window too small for the patient cards",
                Style::default().fg(Color::DarkGray),
            )));
            f.render_widget(cramped, area);
            return;
        }

        for (index, rect) in cards {
            let record = self.records[index];
            let focused_card = matches!(self.focus, Some((card, _)) if card == index);

            let lines: Vec<Line> = PatientField::ALL
                .into_iter()
                .map(|field| self.field_line(record, field, focused_card))
                .collect();

            let border_style = if focused_card {
                Style::default().fg(self.focus_color)
            } else {
                Style::default().fg(self.border_color)
            };

            let card = Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style),
            );
            f.render_widget(card, rect);
        }
    }

    fn field_line(&self, record: &PatientRecord, field: PatientField, focused_card: bool) -> Line<'static> {
        let mut label_style = Style::default().fg(Color::DarkGray);
        let mut value_style = Style::default();

        if focused_card && matches!(self.focus, Some((_, f)) if f == field) {
            label_style = label_style.fg(self.focus_color);
            value_style = value_style
                .fg(self.focus_color)
                .add_modifier(Modifier::BOLD);
        }

        let mut spans = vec![
            Span::styled(format!("{}: ", field.label()), label_style),
            Span::styled(record.field(field).to_string(), value_style),
        ];

        if let Some((sorted, direction)) = self.sorted_by {
            if sorted == field {
                spans.push(Span::styled(
                    format!(" {}", direction.arrow(self.use_glyphs)),
                    Style::default().fg(Color::Cyan),
                ));
            }
        }

        Line::from(spans)
    }
}
