//! Terminal form for building a privacy manifest using ratatui
//!
//! Every key press maps to a store action; the preview is re-projected from
//! the store on every draw.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;

use crate::catalog;
use crate::manifest::{Manifest, ManifestOptions};
use crate::models::{DataTypeUpdate, PrivacyDataType};
use crate::store::PrivacyStore;

const TAB_TITLES: [&str; 5] =
    ["API Categories", "Usage Reasons", "Tracking", "Data Types", "Preview"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    ApiCategories,
    UsageReasons,
    Tracking,
    DataTypes,
    Preview,
}

impl Tab {
    const ALL: [Tab; 5] = [
        Tab::ApiCategories,
        Tab::UsageReasons,
        Tab::Tracking,
        Tab::DataTypes,
        Tab::Preview,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// What the input popup is collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    Domain,
    DataTypeName,
}

/// Interactive form state
pub struct FormApp {
    store: PrivacyStore,
    options: ManifestOptions,
    output: PathBuf,
    tab: Tab,
    cursors: [usize; 5],
    input: Option<InputTarget>,
    input_buffer: String,
    status_message: Option<String>,
    should_quit: bool,
}

impl FormApp {
    pub fn new(store: PrivacyStore, options: ManifestOptions, output: PathBuf) -> Self {
        Self {
            store,
            options,
            output,
            tab: Tab::ApiCategories,
            cursors: [0; 5],
            input: None,
            input_buffer: String::new(),
            status_message: None,
            should_quit: false,
        }
    }

    pub fn store(&self) -> &PrivacyStore {
        &self.store
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn cursor(&self) -> usize {
        self.cursors[self.tab.index()]
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn preview(&self) -> String {
        Manifest::project(&self.store, &self.options).to_xml()
    }

    /// Run the form until the user quits
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_app(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|f| self.ui(f))?;

            if event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply one key press
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.input.is_some() {
            self.handle_input_key(key);
            return Ok(());
        }

        self.status_message = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::BackTab => self.tab = self.tab.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_current()?,
            KeyCode::Char('t') if self.tab == Tab::Tracking => {
                let include = !self.store.include_privacy_tracking();
                self.store.set_include_privacy_tracking(include);
            }
            KeyCode::Char('a') if self.tab == Tab::Tracking => self.open_input(InputTarget::Domain),
            KeyCode::Char('a') if self.tab == Tab::DataTypes => {
                self.open_input(InputTarget::DataTypeName)
            }
            KeyCode::Char('x') => self.remove_current()?,
            KeyCode::Char('l') if self.tab == Tab::DataTypes => {
                self.update_current(|d| DataTypeUpdate {
                    linked_to_identity: Some(!d.linked_to_identity),
                    ..DataTypeUpdate::default()
                })?;
            }
            KeyCode::Char('f') if self.tab == Tab::DataTypes => {
                self.update_current(|d| DataTypeUpdate {
                    collected_for_tracking: Some(!d.collected_for_tracking),
                    ..DataTypeUpdate::default()
                })?;
            }
            KeyCode::Char(c @ '1'..='9') if self.tab == Tab::DataTypes => {
                let slot = c as usize - '1' as usize;
                if let Some(purpose) = self.store.tracking_purposes().get(slot) {
                    let purpose = purpose.id.clone();
                    self.update_current(|d| {
                        let mut purposes = d.purposes.clone();
                        match purposes.iter().position(|p| *p == purpose) {
                            Some(i) => {
                                purposes.remove(i);
                            }
                            None => purposes.push(purpose.clone()),
                        }
                        DataTypeUpdate {
                            purposes: Some(purposes),
                            ..DataTypeUpdate::default()
                        }
                    })?;
                }
            }
            KeyCode::Char('w') => self.write_output()?,
            _ => {}
        }

        Ok(())
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input = None;
                self.input_buffer.clear();
            }
            KeyCode::Enter => self.submit_input(),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            _ => {}
        }
    }

    fn open_input(&mut self, target: InputTarget) {
        self.input = Some(target);
        self.input_buffer.clear();
    }

    fn submit_input(&mut self) {
        let Some(target) = self.input.take() else {
            return;
        };
        let value = std::mem::take(&mut self.input_buffer);
        let value = value.trim();

        match target {
            InputTarget::Domain => {
                if self.store.add_tracking_domain(value) {
                    self.cursors[Tab::Tracking.index()] = self.store.tracking_domains().len() - 1;
                } else {
                    self.status_message =
                        Some(format!("Ignored empty or duplicate domain '{}'", value));
                }
            }
            InputTarget::DataTypeName => {
                if value.is_empty() {
                    self.status_message = Some("Data type name is empty".to_string());
                    return;
                }
                let mut data_type = PrivacyDataType::new(value, catalog::category_for(value));
                data_type.selected = true;
                let index = self.store.add_data_type(data_type);
                self.cursors[Tab::DataTypes.index()] = index;
            }
        }
    }

    fn row_count(&self) -> usize {
        match self.tab {
            Tab::ApiCategories => self.store.api_categories().len(),
            Tab::UsageReasons => self.store.api_usage_reasons().len(),
            Tab::Tracking => self.store.tracking_domains().len(),
            Tab::DataTypes => self.store.collected_data_types().len(),
            Tab::Preview => self.preview().lines().count(),
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.row_count();
        let cursor = &mut self.cursors[self.tab.index()];
        if len == 0 {
            *cursor = 0;
            return;
        }
        *cursor = (*cursor as isize + delta).rem_euclid(len as isize) as usize;
    }

    fn clamp_cursor(&mut self) {
        let len = self.row_count();
        let cursor = &mut self.cursors[self.tab.index()];
        if *cursor >= len {
            *cursor = len.saturating_sub(1);
        }
    }

    fn toggle_current(&mut self) -> Result<()> {
        let cursor = self.cursor();
        match self.tab {
            Tab::ApiCategories => {
                if let Some(id) = self.store.api_categories().get(cursor).map(|c| c.id.clone()) {
                    self.store.toggle_api_category(&id);
                }
            }
            Tab::UsageReasons => {
                if let Some(id) = self.store.api_usage_reasons().get(cursor).map(|r| r.id.clone()) {
                    self.store.toggle_api_usage_reason(&id);
                }
            }
            Tab::DataTypes if cursor < self.store.collected_data_types().len() => {
                self.store.toggle_data_type(cursor)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn remove_current(&mut self) -> Result<()> {
        let cursor = self.cursor();
        match self.tab {
            Tab::Tracking if cursor < self.store.tracking_domains().len() => {
                let domain = self.store.remove_tracking_domain(cursor)?;
                self.status_message = Some(format!("Removed {}", domain));
            }
            Tab::DataTypes if cursor < self.store.collected_data_types().len() => {
                let removed = self.store.remove_data_type(cursor)?;
                self.status_message = Some(format!("Removed {}", removed.name));
            }
            _ => return Ok(()),
        }
        self.clamp_cursor();
        Ok(())
    }

    fn update_current<F>(&mut self, build: F) -> Result<()>
    where
        F: FnOnce(&PrivacyDataType) -> DataTypeUpdate,
    {
        let cursor = self.cursor();
        if cursor >= self.store.collected_data_types().len() {
            return Ok(());
        }
        let update = build(self.store.data_type(cursor)?);
        self.store.update_data_type(cursor, update)?;
        Ok(())
    }

    fn write_output(&mut self) -> Result<()> {
        let xml = self.preview();
        match crate::commands::write_manifest(&self.output, &xml) {
            Ok(()) => self.status_message = Some(format!("Wrote {}", self.output.display())),
            Err(e) => self.status_message = Some(format!("Write failed: {:#}", e)),
        }
        Ok(())
    }

    /// Draw the UI
    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Tabs
                Constraint::Min(0),    // Content
                Constraint::Length(3), // Footer
            ])
            .split(f.area());

        let tabs = Tabs::new(TAB_TITLES.to_vec())
            .block(Block::default().borders(Borders::ALL).title("Privacy Manifest"))
            .select(self.tab.index())
            .style(Style::default().fg(Color::White))
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, chunks[0]);

        match self.tab {
            Tab::ApiCategories => {
                let items = self
                    .store
                    .api_categories()
                    .iter()
                    .map(|c| format!("{} {} ({})", checkbox(c.selected), c.name, c.id))
                    .collect();
                self.render_list(f, chunks[1], "API Categories", items);
            }
            Tab::UsageReasons => self.render_reasons(f, chunks[1]),
            Tab::Tracking => self.render_tracking(f, chunks[1]),
            Tab::DataTypes => self.render_data_types(f, chunks[1]),
            Tab::Preview => {
                let preview = Paragraph::new(self.preview())
                    .block(Block::default().borders(Borders::ALL).title("Preview"))
                    .scroll((self.cursor() as u16, 0));
                f.render_widget(preview, chunks[1]);
            }
        }

        self.render_footer(f, chunks[2]);

        if let Some(target) = self.input {
            self.render_input_popup(f, target);
        }
    }

    fn render_list(&self, f: &mut Frame, area: Rect, title: &str, items: Vec<String>) {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(self.cursor()));
        }
        let list = List::new(items.into_iter().map(ListItem::new).collect::<Vec<_>>())
            .block(Block::default().borders(Borders::ALL).title(title.to_string()))
            .highlight_style(Style::default().bg(Color::Blue).add_modifier(Modifier::BOLD))
            .highlight_symbol(">> ");
        f.render_stateful_widget(list, area, &mut state);
    }

    fn render_reasons(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(6)])
            .split(area);

        let items = self
            .store
            .api_usage_reasons()
            .iter()
            .map(|r| {
                let marker = if r.third_party_only { " [third-party only]" } else { "" };
                format!("{} {}{}", checkbox(r.selected), r.code, marker)
            })
            .collect();
        self.render_list(f, chunks[0], "Usage Reasons", items);

        let description = self
            .store
            .api_usage_reasons()
            .get(self.cursor())
            .map(|r| r.description.clone())
            .unwrap_or_default();
        let paragraph = Paragraph::new(description)
            .block(Block::default().borders(Borders::ALL).title("Description"))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, chunks[1]);
    }

    fn render_tracking(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let flag = Paragraph::new(format!(
            "{} NSPrivacyTracking",
            checkbox(self.store.include_privacy_tracking())
        ))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(flag, chunks[0]);

        let items = self.store.tracking_domains().to_vec();
        self.render_list(f, chunks[1], "Tracking Domains", items);
    }

    fn render_data_types(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(area);

        let items = self
            .store
            .collected_data_types()
            .iter()
            .map(|d| {
                let mut flags = Vec::new();
                if d.linked_to_identity {
                    flags.push("linked");
                }
                if d.collected_for_tracking {
                    flags.push("tracking");
                }
                format!(
                    "{} {} ({}) {} [{}]",
                    checkbox(d.selected),
                    d.name,
                    d.category,
                    flags.join(" "),
                    d.purposes.join(", ")
                )
            })
            .collect();
        self.render_list(f, chunks[0], "Data Types", items);

        let current = self.store.collected_data_types().get(self.cursor());
        let legend: String = self
            .store
            .tracking_purposes()
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let on = current.is_some_and(|d| d.purposes.contains(&p.id));
                format!("{} {} {}\n", i + 1, checkbox(on), p.name)
            })
            .collect();
        let paragraph = Paragraph::new(legend)
            .block(Block::default().borders(Borders::ALL).title("Purposes"));
        f.render_widget(paragraph, chunks[1]);
    }

    fn render_footer(&self, f: &mut Frame, area: Rect) {
        let footer_text = match &self.status_message {
            Some(msg) => format!("  {}", msg),
            None => match self.tab {
                Tab::Tracking => {
                    "  t: Tracking  a: Add  x: Remove  w: Write  Tab: Next  q: Quit".to_string()
                }
                Tab::DataTypes => concat!(
                    "  Space: Select  a: Add  x: Remove  l: Linked  f: Tracking",
                    "  1-6: Purpose  w: Write  q: Quit"
                )
                .to_string(),
                Tab::Preview => format!(
                    "  ↑/↓: Scroll  w: Write {}  Tab: Next  q: Quit",
                    self.output.display()
                ),
                _ => {
                    "  ↑/↓: Navigate  Space: Toggle  Tab: Next  w: Write  q/Esc: Quit".to_string()
                }
            },
        };
        let footer = Paragraph::new(footer_text)
            .style(Style::default().fg(Color::White).bg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(footer, area);
    }

    fn render_input_popup(&self, f: &mut Frame, target: InputTarget) {
        let title = match target {
            InputTarget::Domain => "Tracking domain",
            InputTarget::DataTypeName => "Data type name",
        };
        let area = centered_rect(60, 3, f.area());
        let input = Paragraph::new(self.input_buffer.as_str())
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(Style::default().fg(Color::Yellow));
        f.render_widget(Clear, area);
        f.render_widget(input, area);
    }
}

fn checkbox(on: bool) -> &'static str {
    if on {
        "[x]"
    } else {
        "[ ]"
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
