use crate::diary_entry::{DiaryDraft, DiaryEntry, TagInput, TextInput};
use crate::diary_state::DiaryState;
use crate::insights::{self, TagField};
use crate::moods::{self, MOOD_OPTIONS};
use crate::routes::{Route, NAV_ROUTES};
use crate::settings_state::SettingsState;
use crate::storage::KeyValueStore;
use crate::tags::split_tags;
use chrono::Local;
use color_eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::io::{stdout, Stdout};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub enum Action {
    SaveEntry { id: Option<String>, draft: DiaryDraft },
    DeleteEntry(String),
    SaveApiKey(String),
    ClearApiKey,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextField {
    Fact,
    Emotions,
    Psychological,
    Physiological,
    Thoughts,
    Behaviors,
    Consequences,
}

impl TextField {
    const ALL: [TextField; 7] = [
        TextField::Fact,
        TextField::Emotions,
        TextField::Psychological,
        TextField::Physiological,
        TextField::Thoughts,
        TextField::Behaviors,
        TextField::Consequences,
    ];

    fn label(self) -> &'static str {
        match self {
            TextField::Fact => "Fact (what happened)",
            TextField::Emotions => "Emotions",
            TextField::Psychological => "Psychological reactions (tags)",
            TextField::Physiological => "Physiological reactions (tags)",
            TextField::Thoughts => "Thoughts",
            TextField::Behaviors => "Behaviors",
            TextField::Consequences => "Consequences",
        }
    }
}

fn default_mood_index() -> usize {
    MOOD_OPTIONS
        .iter()
        .position(|m| m.value == moods::DEFAULT_MOOD)
        .unwrap_or(0)
}

/// Form state for the create and edit views.
struct EntryForm {
    id: Option<String>,
    /// `None` keeps a stored mood the catalog does not know.
    mood: Option<usize>,
    texts: [String; 7],
    /// Field text as the form was opened; untouched tag fields are not sent.
    initial: [String; 7],
    /// 0 is the mood selector, 1.. are the text fields.
    focus: usize,
}

impl EntryForm {
    fn blank() -> Self {
        EntryForm {
            id: None,
            mood: Some(default_mood_index()),
            texts: Default::default(),
            initial: Default::default(),
            focus: 0,
        }
    }

    fn from_entry(entry: &DiaryEntry) -> Self {
        let texts = [
                entry.fact.clone(),
                entry.emotions.clone(),
                entry.psychological.join(", "),
                entry.physiological.join(", "),
                entry.thoughts.clone(),
                entry.behaviors.clone(),
                entry.consequences.clone(),
        ];
        EntryForm {
            id: Some(entry.id.clone()),
            mood: MOOD_OPTIONS.iter().position(|m| m.value == entry.mood),
            initial: texts.clone(),
            texts,
            focus: 0,
        }
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        self.focus.checked_sub(1).map(|i| &mut self.texts[i])
    }

    fn cycle_mood(&mut self, forward: bool) {
        let last = MOOD_OPTIONS.len() - 1;
        self.mood = Some(match (self.mood, forward) {
            (None, _) => default_mood_index(),
            (Some(i), true) => (i + 1).min(last),
            (Some(i), false) => i.saturating_sub(1),
        });
    }

    fn to_draft(&self) -> DiaryDraft {
        let index = |field: TextField| TextField::ALL.iter().position(|f| *f == field).unwrap_or(0);
        let text = |field: TextField| Some(Some(TextInput::from(self.texts[index(field)].clone())));
        // Stored tags are kept as-is unless their field was edited.
        let tags = |field: TextField| {
            let i = index(field);
            (self.texts[i] != self.initial[i])
                .then(|| Some(TagInput::from(split_tags(Some(&self.texts[i])))))
        };

        DiaryDraft {
            mood: self.mood.map(|i| Some(MOOD_OPTIONS[i].value.into())),
            fact: text(TextField::Fact),
            emotions: text(TextField::Emotions),
            psychological: tags(TextField::Psychological),
            physiological: tags(TextField::Physiological),
            thoughts: text(TextField::Thoughts),
            behaviors: text(TextField::Behaviors),
            consequences: text(TextField::Consequences),
            ..DiaryDraft::default()
        }
    }
}

/// Everything the views render from, apart from the stores.
struct ViewState {
    route: Route,
    selected: usize,
    form: Option<EntryForm>,
    api_key_input: String,
    confirm_delete: bool,
    status: Option<String>,
}

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    view: ViewState,
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI {
            terminal,
            view: ViewState {
                route: Route::Home,
                selected: 0,
                form: None,
                api_key_input: String::new(),
                confirm_delete: false,
                status: None,
            },
        })
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.view.status = Some(message.into());
    }

    pub fn navigate<S: KeyValueStore>(&mut self, route: Route, diary_state: &DiaryState<S>) {
        let view = &mut self.view;
        // Transient state belongs to the route being left.
        if !view.route.meta().keep_alive {
            match view.route {
                Route::Home => view.selected = 0,
                Route::DiaryDetail { .. } => view.confirm_delete = false,
                Route::Settings => view.api_key_input.clear(),
                _ => {}
            }
        }

        view.form = match &route {
            Route::NewDiary => Some(EntryForm::blank()),
            Route::EditDiary { id } => diary_state.get_by_id(id).map(EntryForm::from_entry),
            _ => None,
        };
        view.selected = view.selected.min(diary_state.len().saturating_sub(1));
        view.route = route;
    }

    pub fn display<S: KeyValueStore, T: KeyValueStore>(
        &mut self,
        diary_state: &DiaryState<S>,
        settings_state: &SettingsState<T>,
    ) -> Result<()> {
        let view = &self.view;
        self.terminal.draw(|f| {
            let show_nav = !view.route.meta().hide_nav;
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints(
                    [
                        Constraint::Length(3),
                        Constraint::Min(5),
                        Constraint::Length(if show_nav { 3 } else { 0 }),
                        Constraint::Length(3),
                    ]
                    .as_ref(),
                )
                .split(f.area());

            let title = Paragraph::new(view.route.meta().title)
                .style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
                .alignment(Alignment::Center);
            f.render_widget(title, chunks[0]);

            match &view.route {
                Route::Home => render_home(f, chunks[1], view, diary_state),
                Route::NewDiary | Route::EditDiary { .. } => match &view.form {
                    Some(form) => render_form(f, chunks[1], form),
                    None => render_missing(f, chunks[1]),
                },
                Route::DiaryDetail { id } => match diary_state.get_by_id(id) {
                    Some(entry) => render_detail(f, chunks[1], entry),
                    None => render_missing(f, chunks[1]),
                },
                Route::Insights => render_insights(f, chunks[1], diary_state),
                Route::Settings => render_settings(f, chunks[1], view, settings_state),
            }

            if show_nav {
                render_tabs(f, chunks[2], &view.route);
            }

            let footer = match &view.status {
                Some(status) => Line::from(Span::styled(
                    status.clone(),
                    Style::default().fg(Color::Green),
                )),
                None => controls(view),
            };
            let footer = Paragraph::new(footer)
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center);
            f.render_widget(footer, chunks[3]);
        })?;

        Ok(())
    }

    pub fn handle_input<S: KeyValueStore, T: KeyValueStore>(
        &mut self,
        diary_state: &DiaryState<S>,
        settings_state: &SettingsState<T>,
    ) -> Result<Option<Action>> {
        let Event::Key(key) = event::read()? else {
            return Ok(None);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(None);
        }
        self.view.status = None;

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        let action = match self.view.route.clone() {
            Route::Home => self.handle_home(key, diary_state),
            Route::NewDiary | Route::EditDiary { .. } => self.handle_form(key, diary_state),
            Route::DiaryDetail { id } => self.handle_detail(key, &id, diary_state),
            Route::Insights => self.handle_nav_keys(key, diary_state),
            Route::Settings => self.handle_settings(key, diary_state, settings_state),
        };
        Ok(action)
    }

    /// Tab cycling and quitting, shared by every view with a tab bar.
    fn handle_nav_keys<S: KeyValueStore>(
        &mut self,
        key: KeyEvent,
        diary_state: &DiaryState<S>,
    ) -> Option<Action> {
        let current = NAV_ROUTES
            .iter()
            .position(|route| *route == self.view.route)
            .unwrap_or(0);
        match key.code {
            KeyCode::Tab => {
                let next = NAV_ROUTES[(current + 1) % NAV_ROUTES.len()].clone();
                self.navigate(next, diary_state);
                None
            }
            KeyCode::BackTab => {
                let previous =
                    NAV_ROUTES[(current + NAV_ROUTES.len() - 1) % NAV_ROUTES.len()].clone();
                self.navigate(previous, diary_state);
                None
            }
            KeyCode::Esc if self.view.route != Route::Home => {
                self.navigate(Route::Home, diary_state);
                None
            }
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        }
    }

    fn handle_home<S: KeyValueStore>(
        &mut self,
        key: KeyEvent,
        diary_state: &DiaryState<S>,
    ) -> Option<Action> {
        let entries = diary_state.list();
        match key.code {
            KeyCode::Up => {
                self.view.selected = self.view.selected.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                if self.view.selected + 1 < entries.len() {
                    self.view.selected += 1;
                }
                None
            }
            KeyCode::Enter => {
                if let Some(entry) = entries.get(self.view.selected) {
                    let id = entry.id.clone();
                    self.navigate(Route::DiaryDetail { id }, diary_state);
                }
                None
            }
            KeyCode::Char('n') => {
                self.navigate(Route::NewDiary, diary_state);
                None
            }
            _ => self.handle_nav_keys(key, diary_state),
        }
    }

    fn handle_detail<S: KeyValueStore>(
        &mut self,
        key: KeyEvent,
        id: &str,
        diary_state: &DiaryState<S>,
    ) -> Option<Action> {
        if self.view.confirm_delete {
            self.view.confirm_delete = false;
            return match key.code {
                KeyCode::Char('y') => Some(Action::DeleteEntry(id.to_string())),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char('e') if diary_state.get_by_id(id).is_some() => {
                let id = id.to_string();
                self.navigate(Route::EditDiary { id }, diary_state);
                None
            }
            KeyCode::Char('d') if diary_state.get_by_id(id).is_some() => {
                self.view.confirm_delete = true;
                None
            }
            KeyCode::Esc | KeyCode::Backspace => {
                self.navigate(Route::Home, diary_state);
                None
            }
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        }
    }

    fn handle_form<S: KeyValueStore>(
        &mut self,
        key: KeyEvent,
        diary_state: &DiaryState<S>,
    ) -> Option<Action> {
        let Some(form) = self.view.form.as_mut() else {
            if key.code == KeyCode::Esc {
                self.navigate(Route::Home, diary_state);
            }
            return None;
        };

        let field_count = TextField::ALL.len() + 1;
        match key.code {
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Some(Action::SaveEntry {
                    id: form.id.clone(),
                    draft: form.to_draft(),
                });
            }
            KeyCode::Esc => {
                let back = match &form.id {
                    Some(id) => Route::DiaryDetail { id: id.clone() },
                    None => Route::Home,
                };
                self.navigate(back, diary_state);
            }
            KeyCode::Tab | KeyCode::Down => form.focus = (form.focus + 1) % field_count,
            KeyCode::BackTab | KeyCode::Up => {
                form.focus = (form.focus + field_count - 1) % field_count
            }
            KeyCode::Left if form.focus == 0 => form.cycle_mood(false),
            KeyCode::Right if form.focus == 0 => form.cycle_mood(true),
            KeyCode::Enter => {
                if let Some(text) = form.focused_text() {
                    text.push('\n');
                }
            }
            KeyCode::Backspace => {
                if let Some(text) = form.focused_text() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = form.focused_text() {
                    text.push(c);
                }
            }
            _ => {}
        }
        None
    }

    fn handle_settings<S: KeyValueStore, T: KeyValueStore>(
        &mut self,
        key: KeyEvent,
        diary_state: &DiaryState<S>,
        settings_state: &SettingsState<T>,
    ) -> Option<Action> {
        match key.code {
            KeyCode::Enter => {
                let value = std::mem::take(&mut self.view.api_key_input);
                Some(Action::SaveApiKey(value))
            }
            KeyCode::Delete if settings_state.has_api_key() => Some(Action::ClearApiKey),
            KeyCode::Backspace => {
                self.view.api_key_input.pop();
                None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.view.api_key_input.push(c);
                None
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Esc => {
                self.handle_nav_keys(key, diary_state)
            }
            _ => None,
        }
    }
}

impl Drop for UI {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

fn format_created_at(entry: &DiaryEntry) -> String {
    match entry.timestamp() {
        Some(at) => at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => entry.created_at.clone(),
    }
}

/// Cuts `text` to at most `width` terminal columns, marking the cut with `…`.
fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn entry_headline(entry: &DiaryEntry) -> &str {
    [&entry.fact, &entry.emotions, &entry.thoughts]
        .into_iter()
        .find_map(|text| text.lines().find(|line| !line.trim().is_empty()))
        .unwrap_or("(empty entry)")
}

fn render_home<S: KeyValueStore>(
    f: &mut Frame,
    area: Rect,
    view: &ViewState,
    diary_state: &DiaryState<S>,
) {
    let entries = diary_state.list();
    if entries.is_empty() {
        let empty = Paragraph::new("No entries yet. Press n to write your first one.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Entries"));
        f.render_widget(empty, area);
        return;
    }

    let text_width = usize::from(area.width).saturating_sub(8);
    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let mood = entry.mood_meta();
            let mut tags = entry.psychological.clone();
            tags.extend(entry.physiological.iter().cloned());
            ListItem::new(vec![
                Line::from(vec![
                    Span::raw(format!("[{}] ", format_created_at(entry))),
                    Span::styled(
                        format!("{} {}", mood.icon, mood.label),
                        Style::default().fg(mood.accent()),
                    ),
                ]),
                Line::from(Span::raw(truncate_to_width(
                    entry_headline(entry),
                    text_width,
                ))),
                Line::from(Span::styled(
                    truncate_to_width(&format!("Tags: {}", tags.join(", ")), text_width),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Entries"))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    f.render_stateful_widget(
        list,
        area,
        &mut ListState::default().with_selected(Some(view.selected)),
    );
}

fn section<'a>(label: &'a str, body: &'a str) -> Vec<Line<'a>> {
    let mut lines = vec![Line::from(Span::styled(
        label,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))];
    if body.trim().is_empty() {
        lines.push(Line::from(Span::styled(
            "—",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.extend(body.lines().map(Line::from));
    }
    lines.push(Line::from(""));
    lines
}

fn render_detail(f: &mut Frame, area: Rect, entry: &DiaryEntry) {
    let mood = entry.mood_meta();
    let psychological = entry.psychological.join(", ");
    let physiological = entry.physiological.join(", ");

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} {} ", mood.icon, mood.label),
                Style::default()
                    .fg(mood.accent())
                    .bg(mood.background_color())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  {}", format_created_at(entry))),
        ]),
        Line::from(""),
    ];
    lines.extend(section("Fact", &entry.fact));
    lines.extend(section("Emotions", &entry.emotions));
    lines.extend(section("Psychological reactions", &psychological));
    lines.extend(section("Physiological reactions", &physiological));
    lines.extend(section("Thoughts", &entry.thoughts));
    lines.extend(section("Behaviors", &entry.behaviors));
    lines.extend(section("Consequences", &entry.consequences));

    let detail = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(detail, area);
}

fn render_form(f: &mut Frame, area: Rect, form: &EntryForm) {
    let mut constraints = vec![Constraint::Length(3)];
    constraints.extend(TextField::ALL.iter().map(|_| Constraint::Min(3)));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let focused = Style::default().fg(Color::Yellow);
    let mood_spans: Vec<Span> = MOOD_OPTIONS
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let style = if form.mood == Some(i) {
                Style::default()
                    .fg(option.accent())
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(option.accent())
            };
            Span::styled(format!(" {} {} ", option.icon, option.label), style)
        })
        .collect();
    let mut mood_block = Block::default().borders(Borders::ALL).title("Mood (←/→)");
    if form.focus == 0 {
        mood_block = mood_block.border_style(focused);
    }
    f.render_widget(Paragraph::new(Line::from(mood_spans)).block(mood_block), chunks[0]);

    for (i, field) in TextField::ALL.iter().enumerate() {
        let is_focused = form.focus == i + 1;
        let mut text = form.texts[i].clone();
        if is_focused {
            text.push('|');
        }
        let mut block = Block::default().borders(Borders::ALL).title(field.label());
        if is_focused {
            block = block.border_style(focused);
        }
        let input = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
        f.render_widget(input, chunks[i + 1]);
    }
}

fn render_insights<S: KeyValueStore>(f: &mut Frame, area: Rect, diary_state: &DiaryState<S>) {
    let entries = diary_state.list();
    let distribution = insights::mood_distribution(&entries);
    let total = distribution.total().max(1);
    let bar_width = usize::from(area.width).saturating_sub(30).max(1);

    let mut lines = vec![Line::from(Span::styled(
        format!("{} entries", entries.len()),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if let Some(latest) = insights::latest_entry_at(&entries) {
        lines.push(Line::from(format!(
            "Last written {}",
            latest.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        )));
    }
    if let Some(average) = insights::average_mood(&entries) {
        let nearest = MOOD_OPTIONS[(average.round() as usize).clamp(1, 5) - 1].label;
        lines.push(Line::from(format!("Average mood {average:.1} / 5 ({nearest})")));
    }
    lines.push(Line::from(""));

    for count in &distribution.counts {
        let filled = count.count * bar_width / total;
        lines.push(Line::from(vec![
            Span::raw(format!("{} {:<8}", count.mood.icon, count.mood.label)),
            Span::styled("█".repeat(filled), Style::default().fg(count.mood.accent())),
            Span::raw(format!(" {}", count.count)),
        ]));
    }
    if distribution.unrecognized > 0 {
        lines.push(Line::from(format!(
            "   Other    {}",
            distribution.unrecognized
        )));
    }
    lines.push(Line::from(""));

    for (label, field) in [
        ("Frequent psychological reactions", TagField::Psychological),
        ("Frequent physiological reactions", TagField::Physiological),
    ] {
        let top = insights::top_tags(&entries, field, 5);
        let summary = if top.is_empty() {
            "—".to_string()
        } else {
            top.iter()
                .map(|(tag, n)| format!("{tag} ×{n}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(Color::Cyan),
        )));
        lines.push(Line::from(summary));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn render_settings<T: KeyValueStore>(
    f: &mut Frame,
    area: Rect,
    view: &ViewState,
    settings_state: &SettingsState<T>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let current = if settings_state.has_api_key() {
        settings_state.masked_api_key()
    } else {
        "(not set)".to_string()
    };
    let current = Paragraph::new(current)
        .block(Block::default().borders(Borders::ALL).title("Current API key"));
    f.render_widget(current, chunks[0]);

    let typed: String = "•".repeat(view.api_key_input.chars().count()) + "|";
    let input = Paragraph::new(typed).block(
        Block::default()
            .borders(Borders::ALL)
            .title("New API key")
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(input, chunks[1]);

    let note = Paragraph::new("The key is stored unencrypted in the local data directory.")
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });
    f.render_widget(note, chunks[2]);
}

fn render_missing(f: &mut Frame, area: Rect) {
    let missing = Paragraph::new("This entry no longer exists. Press Esc to go back.")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(missing, area);
}

fn render_tabs(f: &mut Frame, area: Rect, route: &Route) {
    let titles: Vec<&str> = NAV_ROUTES.iter().map(|r| r.meta().title).collect();
    let selected = NAV_ROUTES.iter().position(|r| r == route);
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .select(selected.unwrap_or(usize::MAX))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}

fn key_hint(key: &'static str, text: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(key, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(text),
    ]
}

fn controls(view: &ViewState) -> Line<'static> {
    let hints: Vec<[Span<'static>; 2]> = match &view.route {
        Route::Home => vec![
            key_hint("n", " new  "),
            key_hint("Enter", " open  "),
            key_hint("Tab", " switch view  "),
            key_hint("q", " quit"),
        ],
        Route::NewDiary | Route::EditDiary { .. } => vec![
            key_hint("Tab", " next field  "),
            key_hint("Ctrl+S", " save  "),
            key_hint("Esc", " cancel"),
        ],
        Route::DiaryDetail { .. } if view.confirm_delete => vec![
            key_hint("y", " delete this entry  "),
            key_hint("any other key", " keep it"),
        ],
        Route::DiaryDetail { .. } => vec![
            key_hint("e", " edit  "),
            key_hint("d", " delete  "),
            key_hint("Esc", " back"),
        ],
        Route::Insights => vec![key_hint("Tab", " switch view  "), key_hint("q", " quit")],
        Route::Settings => vec![
            key_hint("Enter", " save key  "),
            key_hint("Del", " clear key  "),
            key_hint("Tab", " switch view  "),
            key_hint("Esc", " back  "),
            key_hint("Ctrl+C", " quit"),
        ],
    };
    Line::from(hints.into_iter().flatten().collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary_entry::normalize;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn view_at(route: Route) -> ViewState {
        ViewState {
            route,
            selected: 0,
            form: None,
            api_key_input: String::new(),
            confirm_delete: false,
            status: None,
        }
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn truncation_respects_wide_characters() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_to_width("今天很累今天很累", 7), "今天很…");
    }

    #[test]
    fn form_draft_splits_tag_text() {
        let mut form = EntryForm::blank();
        form.texts[0] = "Argument at work".to_string();
        form.texts[2] = "anger，shame".to_string();

        let draft = form.to_draft();

        assert_eq!(draft.fact, Some(Some("Argument at work".into())));
        assert_eq!(
            draft.psychological,
            Some(Some(TagInput::from(vec![
                "anger".to_string(),
                "shame".to_string()
            ])))
        );
        assert_eq!(draft.physiological, None);
        assert_eq!(draft.mood, Some(Some("neutral".into())));
    }

    #[test]
    fn editing_other_fields_keeps_stored_tags() {
        let mut state = DiaryState::load(MemoryStore::with_value(
            crate::storage::DIARY_KEY,
            &json!([{ "id": "a", "psychological": ["short of breath", " y "] }]).to_string(),
        ));
        let mut form = EntryForm::from_entry(state.get_by_id("a").unwrap());
        form.texts[0] = "Crowded train".to_string();

        let updated = state.update("a", form.to_draft()).unwrap().unwrap();

        assert_eq!(updated.fact, "Crowded train");
        assert_eq!(updated.psychological, vec!["short of breath", " y "]);
    }

    #[test]
    fn edited_tag_field_is_split_again() {
        let entry = normalize(DiaryDraft::from_value(json!({ "physiological": ["tense"] })));
        let mut form = EntryForm::from_entry(&entry);
        form.texts[3].push_str(", sweaty");

        let updated = normalize(DiaryDraft::from(&entry).merge(form.to_draft()));

        assert_eq!(updated.physiological, vec!["tense", "sweaty"]);
    }

    #[test]
    fn editing_keeps_an_unknown_mood_until_changed() {
        let entry = normalize(DiaryDraft::from_value(json!({ "mood": "sleepy" })));
        let mut form = EntryForm::from_entry(&entry);
        assert_eq!(form.to_draft().mood, None);

        form.cycle_mood(true);
        assert_eq!(form.to_draft().mood, Some(Some("neutral".into())));
        form.cycle_mood(true);
        assert_eq!(form.to_draft().mood, Some(Some("good".into())));
    }

    #[test]
    fn headline_skips_blank_fields() {
        let entry = normalize(DiaryDraft::from_value(json!({
            "fact": "\n",
            "emotions": "uneasy",
        })));

        assert_eq!(entry_headline(&entry), "uneasy");
    }

    #[test]
    fn settings_hints_show_how_to_leave() {
        let hints = line_text(&controls(&view_at(Route::Settings)));

        assert!(hints.contains("Esc back"));
        assert!(hints.contains("Ctrl+C quit"));
    }
}
