// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use loandesk_app::{
    AppCommand, AppEvent, AppState, Application, ApplicationId, Route, StorageStatus,
    StorageTier, detail_fields, is_session_expired,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(120);
const STATUS_TTL: Duration = Duration::from_secs(4);
const TABLE_COLUMNS: [&str; 5] = ["name", "phone", "loan type", "submitted", "id"];

/// Why a background load did not produce data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    SessionExpired,
    Failed(String),
}

impl LoadFailure {
    pub fn from_error(error: &anyhow::Error) -> Self {
        if is_session_expired(error) {
            Self::SessionExpired
        } else {
            Self::Failed(format!("{error:#}"))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    ApplicationsLoaded {
        generation: u64,
        result: Result<Vec<Application>, LoadFailure>,
    },
    StorageLoaded {
        generation: u64,
        result: Result<StorageStatus, LoadFailure>,
    },
}

pub trait AppRuntime {
    fn has_session(&mut self) -> bool;
    fn sign_in(&mut self, token: &str) -> Result<()>;
    fn sign_out(&mut self) -> Result<()>;
    fn load_applications(&mut self) -> Result<Vec<Application>>;
    fn load_storage_status(&mut self) -> Result<StorageStatus>;
    fn delete_application(&mut self, id: &ApplicationId) -> Result<()>;
    fn download_pdf(&mut self, application: &Application) -> Result<PathBuf>;
    fn settings_summary(&mut self) -> Vec<(String, String)>;

    /// Issues the list and storage loads and reports both on `tx`, tagged
    /// with `generation`. The default runs them in order on the caller's
    /// thread; network runtimes should spawn them so the two requests complete
    /// independently.
    fn spawn_initial_load(&mut self, tx: Sender<InternalEvent>, generation: u64) -> Result<()> {
        let result = self
            .load_applications()
            .map_err(|error| LoadFailure::from_error(&error));
        tx.send(InternalEvent::ApplicationsLoaded { generation, result })
            .map_err(|_| anyhow!("load event channel closed"))?;

        let result = self
            .load_storage_status()
            .map_err(|error| LoadFailure::from_error(&error));
        tx.send(InternalEvent::StorageLoaded { generation, result })
            .map_err(|_| anyhow!("load event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    selected_row: usize,
    search_editing: bool,
    login_input: String,
    help_visible: bool,
    settings: Vec<(String, String)>,
    status_token: u64,
    load_generation: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    boot(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(POLL_INTERVAL).context("poll event")?;
        if has_event && let Event::Key(key) = event::read().context("read event")? {
            state.now = OffsetDateTime::now_utc();
            if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn boot<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let has_token = runtime.has_session();
    dispatch(
        state,
        runtime,
        view_data,
        internal_tx,
        AppCommand::Boot { has_token },
    );
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            // Results from an earlier fetch or an earlier session.
            InternalEvent::ApplicationsLoaded { generation, .. }
            | InternalEvent::StorageLoaded { generation, .. }
                if generation != view_data.load_generation =>
            {
                debug!(
                    generation,
                    current = view_data.load_generation,
                    "dropping stale load result"
                );
            }
            InternalEvent::ApplicationsLoaded {
                result: Ok(applications),
                ..
            } => {
                dispatch(
                    state,
                    runtime,
                    view_data,
                    tx,
                    AppCommand::ApplicationsLoaded(applications),
                );
            }
            InternalEvent::ApplicationsLoaded {
                result: Err(LoadFailure::Failed(message)),
                ..
            } => {
                dispatch(
                    state,
                    runtime,
                    view_data,
                    tx,
                    AppCommand::ApplicationsFailed(message),
                );
            }
            InternalEvent::StorageLoaded {
                result: Ok(storage),
                ..
            } => {
                dispatch(
                    state,
                    runtime,
                    view_data,
                    tx,
                    AppCommand::StorageLoaded(storage),
                );
            }
            InternalEvent::StorageLoaded {
                result: Err(LoadFailure::Failed(message)),
                ..
            } => {
                warn!(error = %message, "storage status unavailable");
            }
            InternalEvent::ApplicationsLoaded {
                result: Err(LoadFailure::SessionExpired),
                ..
            }
            | InternalEvent::StorageLoaded {
                result: Err(LoadFailure::SessionExpired),
                ..
            } => {
                expire_session(state, runtime, view_data, tx);
            }
        }
    }
}

fn dispatch<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    for event in &events {
        match event {
            AppEvent::FetchRequested => {
                view_data.load_generation = view_data.load_generation.wrapping_add(1);
                match runtime.spawn_initial_load(internal_tx.clone(), view_data.load_generation) {
                    Ok(()) => {}
                    Err(error) if is_session_expired(&error) => {
                        expire_session(state, runtime, view_data, internal_tx);
                        return;
                    }
                    Err(error) => {
                        state.dispatch(AppCommand::ApplicationsFailed(format!("{error:#}")));
                        bump_status_token(view_data, internal_tx);
                    }
                }
            }
            AppEvent::RouteChanged(Route::Settings) => {
                view_data.settings = runtime.settings_summary();
            }
            AppEvent::RouteChanged(_) => {}
            AppEvent::FilterChanged | AppEvent::PageChanged(_) => {
                view_data.selected_row = 0;
            }
            AppEvent::ApplicationsReplaced(_) | AppEvent::ApplicationRemoved(_) => {
                clamp_selected_row(state, view_data);
            }
            AppEvent::SessionCleared => {
                *view_data = ViewData {
                    status_token: view_data.status_token,
                    load_generation: view_data.load_generation.wrapping_add(1),
                    ..ViewData::default()
                };
            }
            _ => {}
        }
    }

    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        bump_status_token(view_data, internal_tx);
    }
}

fn bump_status_token(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_TTL);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    dispatch(
        state,
        runtime,
        view_data,
        internal_tx,
        AppCommand::SetStatus(message.into()),
    );
}

fn expire_session<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if let Err(error) = runtime.sign_out() {
        warn!(error = %format!("{error:#}"), "clear stored session token");
    }
    dispatch(
        state,
        runtime,
        view_data,
        internal_tx,
        AppCommand::SessionExpired,
    );
}

fn logout<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let cleared = runtime.sign_out();
    dispatch(state, runtime, view_data, internal_tx, AppCommand::Logout);
    if let Err(error) = cleared {
        emit_status(
            state,
            runtime,
            view_data,
            internal_tx,
            format!("signed out, but the stored token could not be removed: {error:#}"),
        );
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    match state.route {
        Route::Login => handle_login_key(state, runtime, view_data, internal_tx, key),
        Route::Settings => handle_settings_key(state, runtime, view_data, internal_tx, key),
        Route::Dashboard => handle_dashboard_key(state, runtime, view_data, internal_tx, key),
    }
    false
}

fn handle_login_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Enter => {
            if view_data.login_input.trim().is_empty() {
                emit_status(state, runtime, view_data, internal_tx, "paste a session token first");
                return;
            }
            let input = std::mem::take(&mut view_data.login_input);
            match runtime.sign_in(&input) {
                Ok(()) => dispatch(state, runtime, view_data, internal_tx, AppCommand::SignedIn),
                Err(error) => emit_status(
                    state,
                    runtime,
                    view_data,
                    internal_tx,
                    format!("sign in failed: {error:#}"),
                ),
            }
        }
        KeyCode::Esc => view_data.login_input.clear(),
        KeyCode::Backspace => {
            view_data.login_input.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.login_input.clear();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.login_input.push(ch);
        }
        _ => {}
    }
}

fn handle_settings_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('s') => dispatch(
            state,
            runtime,
            view_data,
            internal_tx,
            AppCommand::Navigate(Route::Dashboard),
        ),
        KeyCode::Char('L') => logout(state, runtime, view_data, internal_tx),
        KeyCode::Char('?') => view_data.help_visible = true,
        _ => {}
    }
}

fn handle_dashboard_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    if state.pending_delete.is_some() {
        handle_confirm_key(state, runtime, view_data, internal_tx, key);
        return;
    }

    if view_data.search_editing {
        handle_search_key(state, runtime, view_data, internal_tx, key);
        return;
    }

    if let Some(id) = state.selected.clone() {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                dispatch(state, runtime, view_data, internal_tx, AppCommand::CloseDetail);
            }
            KeyCode::Char('d') => dispatch(
                state,
                runtime,
                view_data,
                internal_tx,
                AppCommand::RequestDelete(id),
            ),
            KeyCode::Char('p') => download_pdf(state, runtime, view_data, internal_tx, &id),
            _ => {}
        }
        return;
    }

    let command = match (key.code, key.modifiers) {
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => {
            move_row(state, view_data, 1);
            None
        }
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => {
            move_row(state, view_data, -1);
            None
        }
        (KeyCode::Char('g'), _) | (KeyCode::Home, _) => {
            view_data.selected_row = 0;
            None
        }
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
            view_data.selected_row = state.visible_page().len().saturating_sub(1);
            None
        }
        (KeyCode::Char(']'), _) | (KeyCode::Right, _) | (KeyCode::PageDown, _) => {
            Some(AppCommand::NextPage)
        }
        (KeyCode::Char('['), _) | (KeyCode::Left, _) | (KeyCode::PageUp, _) => {
            Some(AppCommand::PrevPage)
        }
        (KeyCode::Char('/'), _) => {
            view_data.search_editing = true;
            None
        }
        (KeyCode::Char('c'), KeyModifiers::NONE) => Some(AppCommand::CycleCategory(1)),
        (KeyCode::Char('C'), _) => Some(AppCommand::CycleCategory(-1)),
        (KeyCode::Char('r'), KeyModifiers::NONE) => Some(AppCommand::ToggleRecent),
        (KeyCode::Char('x'), KeyModifiers::NONE) => Some(AppCommand::ClearFilters),
        (KeyCode::Enter, _) => selected_row_id(state, view_data).map(AppCommand::OpenDetail),
        (KeyCode::Char('d'), KeyModifiers::NONE) => {
            selected_row_id(state, view_data).map(AppCommand::RequestDelete)
        }
        (KeyCode::Char('p'), KeyModifiers::NONE) => {
            if let Some(id) = selected_row_id(state, view_data) {
                download_pdf(state, runtime, view_data, internal_tx, &id);
            }
            None
        }
        (KeyCode::Char('s'), KeyModifiers::NONE) => Some(AppCommand::Navigate(Route::Settings)),
        (KeyCode::Char('L'), _) => {
            logout(state, runtime, view_data, internal_tx);
            None
        }
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
            None
        }
        _ => None,
    };

    if let Some(command) = command {
        dispatch(state, runtime, view_data, internal_tx, command);
    }
}

fn handle_search_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let mut search = state.filter.search.clone();
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            view_data.search_editing = false;
            return;
        }
        KeyCode::Backspace => {
            search.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => search.clear(),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => search.push(ch),
        _ => return,
    }
    dispatch(
        state,
        runtime,
        view_data,
        internal_tx,
        AppCommand::SetSearch(search),
    );
}

fn handle_confirm_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            confirm_delete(state, runtime, view_data, internal_tx);
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            dispatch(state, runtime, view_data, internal_tx, AppCommand::CancelDelete);
        }
        _ => {}
    }
}

fn confirm_delete<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(id) = state.pending_delete.clone() else {
        return;
    };

    match runtime.delete_application(&id) {
        Ok(()) => dispatch(
            state,
            runtime,
            view_data,
            internal_tx,
            AppCommand::ApplicationDeleted(id),
        ),
        Err(error) if is_session_expired(&error) => {
            expire_session(state, runtime, view_data, internal_tx);
        }
        Err(error) => {
            state.dispatch(AppCommand::CancelDelete);
            emit_status(
                state,
                runtime,
                view_data,
                internal_tx,
                format!("delete failed: {error:#}"),
            );
        }
    }
}

fn download_pdf<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    id: &ApplicationId,
) {
    let Some(application) = state.find(id).cloned() else {
        return;
    };

    match runtime.download_pdf(&application) {
        Ok(path) => emit_status(
            state,
            runtime,
            view_data,
            internal_tx,
            format!("saved {}", path.display()),
        ),
        Err(error) if is_session_expired(&error) => {
            expire_session(state, runtime, view_data, internal_tx);
        }
        Err(error) => emit_status(
            state,
            runtime,
            view_data,
            internal_tx,
            format!("pdf download failed: {error:#}"),
        ),
    }
}

fn selected_row_id(state: &AppState, view_data: &ViewData) -> Option<ApplicationId> {
    state
        .visible_page()
        .get(view_data.selected_row)
        .map(|application| application.id.clone())
}

fn move_row(state: &AppState, view_data: &mut ViewData, delta: isize) {
    let row_count = state.visible_page().len();
    if row_count == 0 {
        view_data.selected_row = 0;
        return;
    }

    let current = view_data.selected_row;
    let next = if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize)
    };
    view_data.selected_row = next.min(row_count.saturating_sub(1));
}

fn clamp_selected_row(state: &AppState, view_data: &mut ViewData) {
    let row_count = state.visible_page().len();
    view_data.selected_row = view_data.selected_row.min(row_count.saturating_sub(1));
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let area = frame.area();
    match state.route {
        Route::Login => render_login(frame, area, state, view_data),
        Route::Settings => render_settings(frame, area, state, view_data),
        Route::Dashboard => render_dashboard(frame, area, state, view_data),
    }

    if view_data.help_visible {
        let area = centered_rect(72, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_login(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    let prompt = Paragraph::new(render_login_text(view_data)).block(
        Block::default()
            .title(format!("loandesk {}", Route::Login.path()))
            .borders(Borders::ALL),
    );
    frame.render_widget(prompt, centered_rect(60, 40, layout[0]));
    render_status(frame, layout[1], state, view_data);
}

fn render_settings(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    let body = Paragraph::new(render_settings_text(state, view_data)).block(
        Block::default()
            .title(format!("loandesk {}", Route::Settings.path()))
            .borders(Borders::ALL),
    );
    frame.render_widget(body, layout[0]);
    render_status(frame, layout[1], state, view_data);
}

fn render_dashboard(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area);

    render_storage(frame, layout[0], state.storage.as_ref());

    let filter_bar = Paragraph::new(render_filter_bar_text(state, view_data))
        .block(Block::default().title("filters").borders(Borders::ALL));
    frame.render_widget(filter_bar, layout[1]);

    render_table(frame, layout[2], state, view_data);
    let pager = Paragraph::new(pager_text(state)).style(Style::default().fg(Color::Cyan));
    frame.render_widget(pager, layout[3]);
    render_status(frame, layout[4], state, view_data);

    if let Some(application) = state.selected_application() {
        let area = centered_rect(64, 70, frame.area());
        frame.render_widget(Clear, area);
        let detail = Paragraph::new(render_detail_text(application)).block(
            Block::default()
                .title(format!("application {}", application.id))
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(detail, area);
    }

    if let Some(application) = state.pending_delete_application() {
        let area = centered_rect(50, 24, frame.area());
        frame.render_widget(Clear, area);
        let confirm = Paragraph::new(render_confirm_text(application)).block(
            Block::default()
                .title("confirm delete")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Red)),
        );
        frame.render_widget(confirm, area);
    }
}

fn render_storage(frame: &mut ratatui::Frame<'_>, area: Rect, storage: Option<&StorageStatus>) {
    let block = Block::default().title("storage").borders(Borders::ALL);
    let Some(storage) = storage else {
        let placeholder = Paragraph::new("storage status unavailable")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(storage_color(storage.status)))
        .ratio(storage.ratio())
        .label(storage.summary());
    frame.render_widget(gauge, area);
}

fn storage_color(tier: StorageTier) -> Color {
    match tier {
        StorageTier::Normal => Color::Green,
        StorageTier::Warning => Color::Yellow,
        StorageTier::Critical => Color::Red,
        StorageTier::Unknown => Color::Gray,
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let header = Row::new(TABLE_COLUMNS.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let widths = [
        Constraint::Percentage(26),
        Constraint::Percentage(16),
        Constraint::Percentage(22),
        Constraint::Percentage(20),
        Constraint::Percentage(16),
    ];

    let visible = state.visible_page();
    let rows = if let Some(message) = empty_state_message(state) {
        vec![Row::new(vec![
            Cell::from(message).style(Style::default().fg(Color::DarkGray)),
        ])]
    } else {
        visible
            .iter()
            .enumerate()
            .map(|(index, application)| {
                let style = if index == view_data.selected_row {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Row::new(table_cells(application)).style(style)
            })
            .collect()
    };

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(format!(
                    "applications ({} of {})",
                    state.filtered_count(),
                    state.applications.len()
                ))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn table_cells(application: &Application) -> Vec<String> {
    vec![
        application.display_name().to_owned(),
        loandesk_app::or_placeholder(application.phone_number.as_deref()),
        application
            .display_loan_type()
            .unwrap_or_else(|| loandesk_app::MISSING_VALUE.to_owned()),
        application.display_submitted(),
        application.id.to_string(),
    ]
}

fn render_status(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, area);
}

fn empty_state_message(state: &AppState) -> Option<&'static str> {
    if !state.visible_page().is_empty() {
        return None;
    }
    if state.loading {
        Some("loading applications...")
    } else {
        Some("no applications found")
    }
}

fn render_login_text(view_data: &ViewData) -> String {
    let masked = "*".repeat(view_data.login_input.chars().count());
    [
        "admin session required".to_owned(),
        String::new(),
        "paste the session token issued by the backend and press enter".to_owned(),
        String::new(),
        format!("token: {masked}_"),
        String::new(),
        "esc clear | ctrl+q quit".to_owned(),
    ]
    .join("\n")
}

fn render_settings_text(state: &AppState, view_data: &ViewData) -> String {
    let mut lines = view_data
        .settings
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>();
    lines.push(format!(
        "storage: {}",
        state
            .storage
            .as_ref()
            .map(StorageStatus::summary)
            .unwrap_or_else(|| "unavailable".to_owned())
    ));
    lines.push(format!("applications loaded: {}", state.applications.len()));
    lines.push(String::new());
    lines.push("esc back | L sign out".to_owned());
    lines.join("\n")
}

fn render_filter_bar_text(state: &AppState, view_data: &ViewData) -> String {
    let cursor = if view_data.search_editing { "_" } else { "" };
    let category = state.filter.category.as_deref().unwrap_or("all");
    let window = if state.filter.recent_only {
        "last 7 days"
    } else {
        "all dates"
    };
    format!(
        "search: {}{cursor} | category: {category} | submitted: {window}",
        state.filter.search
    )
}

fn pager_controls(state: &AppState) -> (bool, bool) {
    let total = state.filtered_count();
    (state.pager.has_prev(), state.pager.has_next(total))
}

fn pager_text(state: &AppState) -> String {
    let (has_prev, has_next) = pager_controls(state);
    let prev = if has_prev { "[ prev" } else { "  ----" };
    let next = if has_next { "next ]" } else { "----  " };
    format!(
        "{prev} | {} | {next}",
        state.pager.label(state.filtered_count())
    )
}

fn render_detail_text(application: &Application) -> String {
    let mut lines = detail_fields(application)
        .into_iter()
        .map(|field| format!("{:<18} {}", format!("{}:", field.label), field.value))
        .collect::<Vec<_>>();
    lines.push(String::new());
    lines.push("d delete | p download pdf | esc close".to_owned());
    lines.join("\n")
}

fn render_confirm_text(application: &Application) -> String {
    format!(
        "Delete the application from {} (id {})?\nThis cannot be undone.\n\ny delete | n cancel",
        application.display_name(),
        application.id
    )
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let (mode, hints) = match state.route {
        Route::Login => ("LOGIN", "enter sign in | ctrl+q quit"),
        Route::Settings => ("SETTINGS", "esc back | L sign out | ctrl+q quit"),
        Route::Dashboard if state.pending_delete.is_some() => ("CONFIRM", "y delete | n cancel"),
        Route::Dashboard if view_data.search_editing => {
            ("SEARCH", "type to filter | enter/esc done | ctrl+u clear")
        }
        Route::Dashboard if state.selected.is_some() => {
            ("DETAIL", "d delete | p pdf | esc close")
        }
        Route::Dashboard => (
            "APPS",
            "j/k row | [/] page | / search | c/C category | r 7 days | x clear | enter view | d del | p pdf | s settings | ? help",
        ),
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
table: j/k or up/down row | g/G first/last row | [/] or left/right page\n\
filters: / search name | c/C next/prev category | r last 7 days | x clear all\n\
actions: enter details | d delete (asks first) | p download pdf\n\
screens: s settings | L sign out\n\
details: d delete | p pdf | esc close\n\
confirm: y delete | n or esc cancel\n\
login: paste token | enter sign in | esc clear"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
