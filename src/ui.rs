use crate::calendar::CalendarDate;
use crate::forms::{AgeForm, Outcome, TimeZoneForm};
use crate::settings::Settings;
use crate::timezone::{TimeZoneConverter, TzDatabase};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use tracing::debug;

const AGE_FIELDS: [&str; 2] = ["Date of birth (YYYY-MM-DD)", "Reference date (empty = today)"];
const TZ_FIELDS: [&str; 4] = ["Date (YYYY-MM-DD)", "Time (HH:MM)", "From zone", "To zone"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    AgeCalculator,
    TimeZoneConverter,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::AgeCalculator => Page::TimeZoneConverter,
            Page::TimeZoneConverter => Page::AgeCalculator,
        }
    }

    pub fn previous(&self) -> Self {
        // two pages: previous == next
        self.next()
    }

    pub fn title(&self) -> &str {
        match self {
            Page::AgeCalculator => "Age Calculator",
            Page::TimeZoneConverter => "Time Zone Converter",
        }
    }

    fn labels(&self) -> &'static [&'static str] {
        match self {
            Page::AgeCalculator => &AGE_FIELDS,
            Page::TimeZoneConverter => &TZ_FIELDS,
        }
    }
}

pub struct App {
    pub current_page: Page,
    pub age_form: AgeForm,
    pub tz_form: TimeZoneForm,
    pub age_outcome: Outcome,
    pub tz_outcome: Outcome,
    pub selected_field: usize,
    pub today: CalendarDate,
    pub settings: Settings,
    converter: TimeZoneConverter<TzDatabase>,
}

impl App {
    pub fn new(settings: Settings, today: CalendarDate) -> Self {
        let converter = TimeZoneConverter::new(TzDatabase).with_policy(settings.local_time_policy);
        Self {
            current_page: Page::AgeCalculator,
            age_form: AgeForm::default(),
            tz_form: TimeZoneForm::with_defaults(&settings, today),
            age_outcome: Outcome::Pending,
            tz_outcome: Outcome::Pending,
            selected_field: 0,
            today,
            settings,
            converter,
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
        self.selected_field = 0;
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
        self.selected_field = 0;
    }

    pub fn next_field(&mut self) {
        let count = self.current_page.labels().len();
        self.selected_field = (self.selected_field + 1) % count;
    }

    pub fn previous_field(&mut self) {
        let count = self.current_page.labels().len();
        self.selected_field = (self.selected_field + count - 1) % count;
    }

    fn field_mut(&mut self) -> &mut String {
        match (self.current_page, self.selected_field) {
            (Page::AgeCalculator, 0) => &mut self.age_form.birth,
            (Page::AgeCalculator, _) => &mut self.age_form.reference,
            (Page::TimeZoneConverter, 0) => &mut self.tz_form.date,
            (Page::TimeZoneConverter, 1) => &mut self.tz_form.time,
            (Page::TimeZoneConverter, 2) => &mut self.tz_form.from_zone,
            (Page::TimeZoneConverter, _) => &mut self.tz_form.to_zone,
        }
    }

    fn field_values(&self) -> Vec<&str> {
        match self.current_page {
            Page::AgeCalculator => vec![self.age_form.birth.as_str(), self.age_form.reference.as_str()],
            Page::TimeZoneConverter => vec![
                self.tz_form.date.as_str(),
                self.tz_form.time.as_str(),
                self.tz_form.from_zone.as_str(),
                self.tz_form.to_zone.as_str(),
            ],
        }
    }

    fn outcome(&self) -> &Outcome {
        match self.current_page {
            Page::AgeCalculator => &self.age_outcome,
            Page::TimeZoneConverter => &self.tz_outcome,
        }
    }

    fn on_zone_field(&self) -> bool {
        self.current_page == Page::TimeZoneConverter && self.selected_field >= 2
    }

    pub fn push_char(&mut self, c: char) {
        self.field_mut().push(c);
    }

    pub fn pop_char(&mut self) {
        self.field_mut().pop();
    }

    /// Steps the selected zone field through the configured zone list
    pub fn cycle_zone(&mut self, forward: bool) {
        if !self.on_zone_field() || self.settings.common_zones.is_empty() {
            return;
        }
        let zones = self.settings.common_zones.clone();
        let field = self.field_mut();
        let len = zones.len();
        let next = match zones.iter().position(|z| z == field) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        *field = zones[next].clone();
    }

    pub fn submit(&mut self) {
        match self.current_page {
            Page::AgeCalculator => {
                self.age_outcome = Outcome::from_result(self.age_form.submit(self.today));
                debug!(outcome = ?self.age_outcome, "age form submitted");
            }
            Page::TimeZoneConverter => {
                self.tz_outcome = Outcome::from_result(self.tz_form.submit(&self.converter));
                debug!(outcome = ?self.tz_outcome, "time zone form submitted");
            }
        }
    }

    pub fn clear_page(&mut self) {
        match self.current_page {
            Page::AgeCalculator => {
                self.age_form = AgeForm::default();
                self.age_outcome = Outcome::Pending;
            }
            Page::TimeZoneConverter => {
                self.tz_form = TimeZoneForm::with_defaults(&self.settings, self.today);
                self.tz_outcome = Outcome::Pending;
            }
        }
        self.selected_field = 0;
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => app.clear_page(),
                KeyCode::Tab => app.next_page(),
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Down => app.next_field(),
                KeyCode::Up => app.previous_field(),
                KeyCode::Right => app.cycle_zone(true),
                KeyCode::Left => app.cycle_zone(false),
                KeyCode::Enter => app.submit(),
                KeyCode::Backspace => app.pop_char(),
                KeyCode::Char(c) => app.push_char(c),
                _ => {}
            }
        }
    }
}

/// Draws the current view-state; reads `app`, never mutates it
fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Page tabs
            Constraint::Min(0),    // Form + result
            Constraint::Length(3), // Key help
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_form(f, chunks[1], app);
    render_status_bar(f, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::AgeCalculator, Page::TimeZoneConverter];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Today: {}", app.today),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![Line::from("")];

    for (i, (label, value)) in app
        .current_page
        .labels()
        .iter()
        .zip(app.field_values())
        .enumerate()
    {
        let selected = i == app.selected_field;
        let marker = if selected {
            Span::styled("→ ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            Span::raw("  ")
        };
        let value_style = if selected {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        lines.push(Line::from(vec![
            Span::raw("  "),
            marker,
            Span::styled(format!("{:<32}", label), Style::default().fg(Color::Yellow)),
            Span::styled(format!("{}{}", value, if selected { "▏" } else { "" }), value_style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(match app.outcome() {
        Outcome::Pending => Line::from(Span::styled(
            "  Press Enter to calculate",
            Style::default().fg(Color::DarkGray),
        )),
        Outcome::Success(text) => Line::from(vec![
            Span::styled("  ✓ ", Style::default().fg(Color::Green)),
            Span::styled(text.clone(), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        ]),
        Outcome::Failure(text) => Line::from(vec![
            Span::styled("  ✗ ", Style::default().fg(Color::Red)),
            Span::styled(text.clone(), Style::default().fg(Color::Red)),
        ]),
    });

    if app.current_page == Page::TimeZoneConverter {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  DST gaps/overlaps: {}", app.settings.local_time_policy),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let form = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(app.current_page.title())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White)),
        );

    f.render_widget(form, area);
}

fn render_status_bar(f: &mut Frame, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let status_spans = vec![
        Span::raw(" "),
        key("Enter"),
        Span::raw(" Calculate | "),
        key("Tab"),
        Span::raw(" Page | "),
        key("↑/↓"),
        Span::raw(" Field | "),
        key("←/→"),
        Span::raw(" Zone | "),
        key("Ctrl-L"),
        Span::raw(" Clear | "),
        Span::styled("Esc", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}
