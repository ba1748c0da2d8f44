use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
    Frame,
};

use crate::data::records::Clinic;

/// Dropdown listing the clinics; value is the clinic id, label its name
pub struct ClinicSelector {
    clinics: Vec<Clinic>,
    state: ListState,
    /// Where the list was last drawn, for mouse hits
    list_area: Option<Rect>,
}

impl ClinicSelector {
    pub fn new(clinics: Vec<Clinic>) -> Self {
        Self {
            clinics,
            state: ListState::default(),
            list_area: None,
        }
    }

    /// Open with the cursor on the currently selected clinic
    pub fn open(&mut self, current: usize) {
        if self.clinics.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(current.min(self.clinics.len() - 1)));
        }
    }

    pub fn close(&mut self) {
        self.list_area = None;
    }

    pub fn next(&mut self) {
        if self.clinics.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.clinics.len() => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.clinics.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.clinics.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Index under the cursor
    pub fn highlighted(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn clinic(&self, index: usize) -> Option<&Clinic> {
        self.clinics.get(index)
    }

    pub fn clinics(&self) -> &[Clinic] {
        &self.clinics
    }

    /// Index of the entry drawn at a screen position
    pub fn item_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.list_area?;
        let inner_top = area.y + 1;
        let inside = column > area.x
            && column < area.x + area.width.saturating_sub(1)
            && row >= inner_top
            && row < area.y + area.height.saturating_sub(1);
        if !inside {
            return None;
        }
        let index = (row - inner_top) as usize + self.state.offset();
        (index < self.clinics.len()).then_some(index)
    }

    /// Draw the list just below `anchor` (the selector line)
    pub fn render(&mut self, f: &mut Frame, anchor: Rect, bounds: Rect) {
        let height = (self.clinics.len() as u16 + 2).min(bounds.height.saturating_sub(anchor.y + 1));
        let width = self
            .clinics
            .iter()
            .map(|c| c.name.chars().count() as u16 + 6)
            .max()
            .unwrap_or(20)
            .max(20)
            .min(bounds.width);
        let area = Rect {
            x: anchor.x,
            y: anchor.y + 1,
            width,
            height,
        };

        let items: Vec<ListItem> = self
            .clinics
            .iter()
            .map(|c| ListItem::new(Line::from(c.name.clone())))
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Clinic ")
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        f.render_widget(Clear, area);
        f.render_stateful_widget(list, area, &mut self.state);
        self.list_area = Some(area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> ClinicSelector {
        ClinicSelector::new(vec![
            Clinic::new("1", "Salve Fertility"),
            Clinic::new("2", "London IVF"),
            Clinic::new("3", "Harley Street"),
        ])
    }

    #[test]
    fn test_navigation_wraps() {
        let mut s = selector();
        s.open(0);
        s.previous();
        assert_eq!(s.highlighted(), Some(2));
        s.next();
        assert_eq!(s.highlighted(), Some(0));
        s.next();
        assert_eq!(s.clinic(s.highlighted().unwrap()).unwrap().id, "2");
    }

    #[test]
    fn test_open_clamps() {
        let mut s = selector();
        s.open(10);
        assert_eq!(s.highlighted(), Some(2));

        let mut empty = ClinicSelector::new(Vec::new());
        empty.open(0);
        empty.next();
        assert_eq!(empty.highlighted(), None);
    }

    #[test]
    fn test_item_at_needs_render() {
        let s = selector();
        assert_eq!(s.item_at(2, 3), None);
    }
}
