use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::cli::CliOptions;
use crate::config::config::{parse_color, Config};
use crate::data::data_exporter::DataExporter;
use crate::data::datasets::Datasets;
use crate::data::records::PatientField;
use crate::ui::card_grid::{CardGrid, GridLayout};
use crate::view::controller::ViewController;
use crate::view::dispatcher::CommandDispatcher;
use crate::view::events::{ViewChange, ViewCommand};
use crate::widgets::clinic_selector::ClinicSelector;
use crate::widgets::help_widget::HelpWidget;
use crate::widgets::log_widget::LogWidget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Cards,
    SelectClinic,
    Help,
    Logs,
}

/// The patient viewer screen
pub struct SalveApp {
    dispatcher: CommandDispatcher,
    config: Config,
    mode: AppMode,
    selector: ClinicSelector,
    /// Index of the clinic shown on the selector line
    selected_clinic: usize,
    focused_card: usize,
    focused_field: PatientField,
    first_row: usize,
    status_message: String,
    /// Where `x` writes its CSV
    export_dir: PathBuf,
    /// Areas from the last draw, for mouse handling
    grid_area: Rect,
    selector_line: Rect,
}

impl SalveApp {
    pub fn new(datasets: Arc<Datasets>, config: Config) -> Self {
        let selector = ClinicSelector::new(datasets.clinics().to_vec());
        let view = ViewController::new(datasets)
            .with_sort_on_switch(config.behavior.keep_sort_on_switch);

        let mut app = Self {
            dispatcher: CommandDispatcher::new(view),
            config,
            mode: AppMode::Cards,
            selector,
            selected_clinic: 0,
            focused_card: 0,
            focused_field: PatientField::Id,
            first_row: 0,
            status_message: String::new(),
            export_dir: PathBuf::from("."),
            grid_area: Rect::default(),
            selector_line: Rect::default(),
        };

        let change = app.dispatcher.dispatch(ViewCommand::Initialize);
        app.status_message = format!("{} - press ? for help", change.describe());
        app
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    /// Apply startup commands the way the user would: clinic choices go
    /// through the selector so it shows the chosen clinic.
    pub fn replay(&mut self, commands: Vec<ViewCommand>) {
        for command in commands {
            match command {
                ViewCommand::Initialize => {}
                ViewCommand::SelectDataset(id) => {
                    let index = self.selector.clinics().iter().position(|c| c.id == id);
                    match index {
                        Some(index) => self.choose_clinic(index),
                        None => {
                            warn!(target: "ui", "Clinic '{}' is not in the list", id);
                            let change = self.dispatcher.dispatch(ViewCommand::SelectDataset(id));
                            self.status_message = change.describe();
                        }
                    }
                }
                ViewCommand::ColumnClick(field) => {
                    self.focused_field = field;
                    self.click_column(field);
                }
            }
        }
    }

    pub fn view(&self) -> &ViewController {
        self.dispatcher.view()
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn focus(&self) -> (usize, PatientField) {
        (self.focused_card, self.focused_field)
    }

    pub fn selected_clinic(&self) -> usize {
        self.selected_clinic
    }

    pub fn run(mut self) -> Result<()> {
        // Setup terminal with error handling
        if let Err(e) = enable_raw_mode() {
            return Err(anyhow::anyhow!(
                "Failed to enable raw mode: {}. Try --print instead.",
                e
            ));
        }

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(anyhow::anyhow!("Failed to setup terminal: {}", e));
        }

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = match Terminal::new(backend) {
            Ok(t) => t,
            Err(e) => {
                let _ = disable_raw_mode();
                return Err(anyhow::anyhow!("Failed to create terminal: {}", e));
            }
        };

        let res = self.run_app(&mut terminal);

        // Always restore terminal, even on error
        let _ = disable_raw_mode();
        let _ = execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = terminal.show_cursor();

        res.map_err(|e| anyhow::anyhow!("TUI error: {}", e))
    }

    fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.ui(f))?;

            let should_exit = match event::read()? {
                Event::Key(key) => {
                    // Ignore release events so toggles fire once
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    self.handle_key(key)?
                }
                Event::Mouse(mouse) => {
                    self.handle_mouse(mouse);
                    false
                }
                _ => false,
            };

            if should_exit {
                info!(target: "ui", "Exiting");
                return Ok(());
            }
        }
    }

    /// Handle a key press. Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        debug!(target: "ui", "Key {:?} in {:?}", key.code, self.mode);

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        match self.mode {
            AppMode::Cards => Ok(self.handle_cards_key(key)),
            AppMode::SelectClinic => {
                self.handle_selector_key(key);
                Ok(false)
            }
            AppMode::Help | AppMode::Logs => {
                match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => self.mode = AppMode::Cards,
                    KeyCode::F(1) | KeyCode::Char('?') if self.mode == AppMode::Help => {
                        self.mode = AppMode::Cards
                    }
                    KeyCode::F(5) if self.mode == AppMode::Logs => self.mode = AppMode::Cards,
                    _ => {}
                }
                Ok(false)
            }
        }
    }

    fn handle_cards_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') => self.open_selector(),
            KeyCode::Char(ch @ '1'..='5') => {
                let index = ch as usize - '1' as usize;
                if let Some(field) = PatientField::from_index(index) {
                    self.focused_field = field;
                    self.click_column(field);
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.click_column(self.focused_field),
            KeyCode::Left | KeyCode::Char('h') => self.focused_field = self.focused_field.prev(),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
                self.focused_field = self.focused_field.next()
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_focus(self.per_row() as isize),
            KeyCode::Up | KeyCode::Char('k') => self.move_focus(-(self.per_row() as isize)),
            KeyCode::PageDown => {
                let page = self.layout().visible_rows().max(1) * self.per_row();
                self.move_focus(page as isize);
            }
            KeyCode::PageUp => {
                let page = self.layout().visible_rows().max(1) * self.per_row();
                self.move_focus(-(page as isize));
            }
            KeyCode::Home => self.move_focus(-(self.focused_card as isize)),
            KeyCode::End => self.move_focus(self.view().len() as isize),
            KeyCode::Char('x') => self.export(),
            KeyCode::F(1) | KeyCode::Char('?') => self.mode = AppMode::Help,
            KeyCode::F(5) => self.mode = AppMode::Logs,
            _ => {}
        }
        false
    }

    fn handle_selector_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.close_selector(),
            KeyCode::Down | KeyCode::Char('j') => self.selector.next(),
            KeyCode::Up | KeyCode::Char('k') => self.selector.previous(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(index) = self.selector.highlighted() {
                    self.choose_clinic(index);
                }
            }
            _ => {}
        }
    }

    /// Handle a mouse event against the last drawn layout
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollDown if self.mode == AppMode::Cards => {
                self.move_focus(self.per_row() as isize)
            }
            MouseEventKind::ScrollUp if self.mode == AppMode::Cards => {
                self.move_focus(-(self.per_row() as isize))
            }
            MouseEventKind::Down(MouseButton::Left) => self.handle_click(mouse.column, mouse.row),
            _ => {}
        }
    }

    fn handle_click(&mut self, column: u16, row: u16) {
        match self.mode {
            AppMode::SelectClinic => match self.selector.item_at(column, row) {
                Some(index) => self.choose_clinic(index),
                None => self.close_selector(),
            },
            AppMode::Cards => {
                if row == self.selector_line.y
                    && column >= self.selector_line.x
                    && column < self.selector_line.x + self.selector_line.width
                {
                    self.open_selector();
                } else if let Some((card, field)) =
                    self.layout().hit_test(self.view().len(), column, row)
                {
                    self.focused_card = card;
                    self.focused_field = field;
                    self.click_column(field);
                }
            }
            AppMode::Help | AppMode::Logs => self.mode = AppMode::Cards,
        }
    }

    fn click_column(&mut self, field: PatientField) {
        let change = self.dispatcher.dispatch(ViewCommand::ColumnClick(field));
        self.status_message = change.describe();
    }

    fn open_selector(&mut self) {
        if self.selector.clinics().is_empty() {
            self.status_message = "No clinics to choose from".to_string();
            return;
        }
        self.selector.open(self.selected_clinic);
        self.mode = AppMode::SelectClinic;
    }

    fn close_selector(&mut self) {
        self.selector.close();
        self.mode = AppMode::Cards;
    }

    /// Pick a clinic. Choosing the one already shown is not a change.
    fn choose_clinic(&mut self, index: usize) {
        self.close_selector();
        if index == self.selected_clinic {
            return;
        }

        let Some(clinic) = self.selector.clinic(index) else {
            warn!(target: "ui", "No clinic at index {}", index);
            return;
        };
        let command = ViewCommand::select(clinic.id.clone());

        self.selected_clinic = index;
        let change = self.dispatcher.dispatch(command);
        if let ViewChange::DatasetSelected { .. } = change {
            self.focused_card = 0;
            self.first_row = 0;
        }
        self.status_message = change.describe();
    }

    fn export(&mut self) {
        let records = self.view().displayed_records();
        let result = DataExporter::export_timestamped_csv(&records, &self.export_dir);
        self.status_message = match result {
            Ok(message) => {
                info!(target: "ui", "{}", message);
                message
            }
            Err(e) => {
                warn!(target: "ui", "Export failed: {}", e);
                format!("Export failed: {}", e)
            }
        };
    }

    fn per_row(&self) -> usize {
        self.config.display.columns()
    }

    fn layout(&self) -> GridLayout {
        GridLayout::new(self.grid_area, self.per_row(), self.first_row)
    }

    /// Move the focused card by `delta` and scroll so it stays visible
    fn move_focus(&mut self, delta: isize) {
        let count = self.view().len();
        if count == 0 {
            return;
        }
        let target = (self.focused_card as isize + delta).clamp(0, count as isize - 1);
        self.focused_card = target as usize;
        self.scroll_to_focus();
    }

    fn scroll_to_focus(&mut self) {
        let per_row = self.per_row();
        let visible = self.layout().visible_rows().max(1);
        let row = self.focused_card / per_row;
        if row < self.first_row {
            self.first_row = row;
        } else if row >= self.first_row + visible {
            self.first_row = row + 1 - visible;
        }
    }

    fn ui(&mut self, f: &mut Frame) {
        let area = f.area();

        let status_height = if self.config.display.show_status_bar { 1 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(status_height),
            ])
            .split(area);

        let theme = &self.config.theme;
        let title_color = parse_color(&theme.title, Color::Cyan);
        let border_color = parse_color(&theme.card_border, Color::Gray);
        let focus_color = parse_color(&theme.focused_field, Color::Yellow);

        let title = Paragraph::new(Line::from(Span::styled(
            "Welcome to Salve",
            Style::default()
                .fg(title_color)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(ratatui::layout::Alignment::Center);
        f.render_widget(title, chunks[0]);

        self.selector_line = chunks[1];
        f.render_widget(Paragraph::new(self.selector_text()), chunks[1]);

        // Keep the focused card on screen after a resize
        self.grid_area = chunks[3];
        self.first_row = self
            .first_row
            .min(self.layout().max_first_row(self.view().len()));
        self.scroll_to_focus();

        let records = self.view().displayed_records();
        let grid = CardGrid::new(&records, self.layout())
            .with_focus(self.focused_card, self.focused_field)
            .with_sort(self.view().sorted_by(), self.view().direction())
            .with_glyphs(self.config.display.use_glyphs)
            .with_colors(border_color, focus_color);
        grid.render(f, chunks[3]);

        if self.config.display.show_status_bar {
            f.render_widget(Paragraph::new(self.status_line()), chunks[4]);
        }

        match self.mode {
            AppMode::SelectClinic => self.selector.render(f, chunks[1], area),
            AppMode::Help => HelpWidget::render(f, area),
            AppMode::Logs => LogWidget::render(f, area),
            AppMode::Cards => {}
        }
    }

    fn selector_text(&self) -> Line<'static> {
        let name = self
            .selector
            .clinic(self.selected_clinic)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "(no clinics)".to_string());
        let marker = if self.config.display.use_glyphs { "▾" } else { "v" };
        Line::from(vec![
            Span::styled("Clinic: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("[ {} {} ]", name, marker),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled("  (c to change)", Style::default().fg(Color::DarkGray)),
        ])
    }

    fn status_line(&self) -> Line<'static> {
        let view = self.view();
        let sort = match view.sorted_by() {
            Some(field) => format!("sorted by {}", field.label()),
            None => "source order".to_string(),
        };
        Line::from(vec![
            Span::styled(
                format!(" Dataset {} ", view.active_dataset()),
                Style::default().fg(Color::Black).bg(Color::Cyan),
            ),
            Span::raw(format!(
                " {} patients | {} {} | {} | ",
                view.len(),
                view.direction(),
                view.direction().arrow(self.config.display.use_glyphs),
                sort
            )),
            Span::styled(self.status_message.clone(), Style::default().fg(Color::Yellow)),
        ])
    }
}

/// Start the TUI over the given datasets, replaying any `--clinic`/`--sort` first
pub fn run_salve_tui(datasets: Arc<Datasets>, config: Config, options: &CliOptions) -> Result<()> {
    let mut app = SalveApp::new(datasets, config);
    app.replay(options.view_commands());
    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::records::{Clinic, PatientRecord};
    use crate::view::controller::SortDirection;
    use ratatui::backend::TestBackend;

    fn datasets() -> Arc<Datasets> {
        Arc::new(Datasets::new(
            vec![Clinic::new("1", "Salve Fertility"), Clinic::new("2", "London IVF")],
            vec![
                PatientRecord::new("2", "1", "Hillary", "Raynes", "1993-09-01"),
                PatientRecord::new("1", "1", "Linnell", "Rentilll", "1978-05-21"),
            ],
            vec![PatientRecord::new("9", "2", "Orsola", "Mulcahy", "1984-02-17")],
        ))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn ids(app: &SalveApp) -> Vec<String> {
        app.view()
            .displayed_records()
            .into_iter()
            .map(|r| r.id.clone())
            .collect()
    }

    fn draw(app: &mut SalveApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| app.ui(f)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_starts_with_primary_dataset() {
        let app = SalveApp::new(datasets(), Config::default());
        assert_eq!(ids(&app), vec!["2", "1"]);
        assert_eq!(app.mode(), AppMode::Cards);
    }

    #[test]
    fn test_number_keys_click_columns() {
        let mut app = SalveApp::new(datasets(), Config::default());
        app.handle_key(key(KeyCode::Char('1'))).unwrap();
        assert_eq!(app.view().direction(), SortDirection::Descending);
        assert_eq!(ids(&app), vec!["2", "1"]);

        app.handle_key(key(KeyCode::Char('1'))).unwrap();
        assert_eq!(ids(&app), vec!["1", "2"]);
        assert!(app.status_message().contains("ascending"));
    }

    #[test]
    fn test_selector_switches_dataset() {
        let mut app = SalveApp::new(datasets(), Config::default());
        app.handle_key(key(KeyCode::Char('c'))).unwrap();
        assert_eq!(app.mode(), AppMode::SelectClinic);
        app.handle_key(key(KeyCode::Down)).unwrap();
        app.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(app.mode(), AppMode::Cards);
        assert_eq!(app.selected_clinic(), 1);
        assert_eq!(ids(&app), vec!["9"]);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = SalveApp::new(datasets(), Config::default());
        app.handle_key(key(KeyCode::F(1))).unwrap();
        assert_eq!(app.mode(), AppMode::Help);
        assert!(!app.handle_key(key(KeyCode::Esc)).unwrap());
        assert_eq!(app.mode(), AppMode::Cards);
        assert!(app.handle_key(key(KeyCode::Char('q'))).unwrap());
    }

    #[test]
    fn test_render_and_click_field() {
        let mut app = SalveApp::new(datasets(), Config::default());
        let screen = draw(&mut app);
        assert!(screen.contains("Welcome to Salve"));
        assert!(screen.contains("Salve Fertility"));
        assert!(screen.contains("First name: Hillary"));

        // grid starts on row 3; first card's last name line is row 3 + 1 + 3
        app.handle_mouse(click(2, 7));
        assert_eq!(app.focus(), (0, PatientField::LastName));
        assert_eq!(app.view().sorted_by(), Some(PatientField::LastName));
        // descending by last name: Rentilll before Raynes
        assert_eq!(ids(&app), vec!["1", "2"]);
    }

    #[test]
    fn test_click_selector_line_opens_dropdown() {
        let mut app = SalveApp::new(datasets(), Config::default());
        draw(&mut app);
        app.handle_mouse(click(3, 1));
        assert_eq!(app.mode(), AppMode::SelectClinic);

        draw(&mut app);
        // list is drawn under the selector line; second entry sits at row 1 + 1 + 1 + 1
        app.handle_mouse(click(3, 4));
        assert_eq!(app.mode(), AppMode::Cards);
        assert_eq!(ids(&app), vec!["9"]);
    }

    #[test]
    fn test_replay_startup_commands() {
        let mut app = SalveApp::new(datasets(), Config::default());
        let options = CliOptions {
            clinic: Some("2".to_string()),
            sorts: vec![PatientField::FirstName],
            ..CliOptions::default()
        };
        app.replay(options.view_commands());
        assert_eq!(app.selected_clinic(), 1);
        assert_eq!(app.view().sorted_by(), Some(PatientField::FirstName));
        assert_eq!(app.focus().1, PatientField::FirstName);
        assert_eq!(ids(&app), vec!["9"]);

        let screen = draw(&mut app);
        assert!(screen.contains("London IVF"));
    }

    #[test]
    fn test_replay_matches_batch_view() {
        let options = CliOptions {
            clinic: Some("1".to_string()),
            sorts: vec![PatientField::LastName, PatientField::LastName],
            ..CliOptions::default()
        };
        let mut app = SalveApp::new(datasets(), Config::default());
        app.replay(options.view_commands());

        let batch = crate::services::batch_runner::build_view(
            datasets(),
            &Config::default(),
            &options,
        );
        let batch_ids: Vec<String> = batch
            .displayed_records()
            .into_iter()
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(ids(&app), batch_ids);
        assert_eq!(app.view().direction(), batch.direction());
    }

    #[test]
    fn test_replay_unknown_clinic_shows_second_dataset() {
        let mut app = SalveApp::new(datasets(), Config::default());
        app.replay(vec![ViewCommand::select("77")]);
        assert_eq!(app.selected_clinic(), 0);
        assert_eq!(ids(&app), vec!["9"]);
    }

    #[test]
    fn test_export_key_writes_displayed_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = SalveApp::new(datasets(), Config::default()).with_export_dir(dir.path());
        app.handle_key(key(KeyCode::Char('1'))).unwrap();
        app.handle_key(key(KeyCode::Char('1'))).unwrap();

        assert!(!app.handle_key(key(KeyCode::Char('x'))).unwrap());
        assert!(app.status_message().starts_with("Exported 2 records"));

        let files: Vec<PathBuf> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("patients_") && name.ends_with(".csv"));

        let text = std::fs::read_to_string(&files[0]).unwrap();
        let first_ids: Vec<&str> = text
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(first_ids, vec!["1", "2"]);
    }

    #[test]
    fn test_export_key_with_nothing_shown() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = SalveApp::new(Arc::new(Datasets::default()), Config::default())
            .with_export_dir(dir.path());
        app.handle_key(key(KeyCode::Char('x'))).unwrap();
        assert_eq!(app.status_message(), "Export failed: No records to export");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_huge_cards_per_row_renders() {
        let config: Config = toml::from_str("[display]\ncards_per_row = 65536\n").unwrap();
        let mut app = SalveApp::new(datasets(), config);
        let screen = draw(&mut app);
        assert!(screen.contains("Welcome to Salve"));
        app.handle_key(key(KeyCode::Down)).unwrap();
        app.handle_mouse(click(2, 7));
    }

    #[test]
    fn test_empty_datasets() {
        let mut app = SalveApp::new(Arc::new(Datasets::default()), Config::default());
        app.handle_key(key(KeyCode::Char('3'))).unwrap();
        app.handle_key(key(KeyCode::Down)).unwrap();
        app.handle_key(key(KeyCode::Char('c'))).unwrap();
        assert_eq!(app.mode(), AppMode::Cards);
        let screen = draw(&mut app);
        assert!(screen.contains("No patients to show"));
    }
}
