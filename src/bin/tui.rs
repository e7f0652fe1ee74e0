use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Frame, Terminal, widgets::{Block, Borders, List, ListItem, Paragraph, ListState}, layout::{Layout, Constraint, Direction}, style::{Style, Modifier, Color}};

use todolist::{application::list_controller::{ControllerError, ListController}, config::ClientConfig, infrastructure::http_store::HttpTodoStore, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ClientConfig::from_env()?;
    telemetry::init_file_logging(&config.log_file)?;
    tracing::info!(api_url = %config.api_url, "starting");

    let mut app = App::new(ListController::new(HttpTodoStore::new(&config.api_url)));
    let loaded = app.controller.initialize().await;
    app.report(loaded);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode { View, Create, Edit(usize) }

struct App {
    controller: ListController<HttpTodoStore>,
    /// Row in the filtered list, not an index into the controller's items.
    selected: usize,
    last_tick: Instant,
    mode: Mode,
    list_state: ListState,
    status: String,
}

impl App {
    fn new(controller: ListController<HttpTodoStore>) -> Self {
        Self { controller, selected: 0, last_tick: Instant::now(), mode: Mode::View, list_state: ListState::default(), status: String::new() }
    }

    fn selected_index(&self) -> Option<usize> {
        self.controller.state().filtered_indices().get(self.selected).copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.controller.state().filtered_indices().len();
        if len == 0 { self.selected = 0; self.list_state.select(None); }
        else { if self.selected >= len { self.selected = len - 1; } self.list_state.select(Some(self.selected)); }
    }

    /// Shows the error of a failed intent in the status line; returns whether it succeeded.
    fn report(&mut self, result: Result<(), ControllerError>) -> bool {
        match result {
            Ok(()) => { self.status.clear(); true }
            Err(err) => { self.status = err.to_string(); false }
        }
    }
}

async fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, mut app: App) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    app.clamp_selection();

    loop {
        terminal.draw(|f| draw(f, &mut app))?;

        let timeout = tick_rate.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only act on key presses; ignore repeats and releases to prevent duplicate input
                if key.kind != KeyEventKind::Press { continue; }
                match app.mode {
                    Mode::View => match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Up => { if app.selected > 0 { app.selected -= 1; } }
                        KeyCode::Down => { let len = app.controller.state().filtered_indices().len(); if app.selected + 1 < len { app.selected += 1; } }
                        KeyCode::Enter => {
                            if let Some(idx) = app.selected_index() {
                                let res = app.controller.toggle_complete(idx).await;
                                app.report(res);
                            }
                        }
                        KeyCode::Char('n') => {
                            app.mode = Mode::Create;
                            app.controller.set_input("");
                        }
                        KeyCode::Char('e') => {
                            if let Some(idx) = app.selected_index() {
                                let text = app.controller.items()[idx].text.clone();
                                let res = app.controller.begin_edit(idx, text);
                                if app.report(res) { app.mode = Mode::Edit(idx); }
                            }
                        }
                        KeyCode::Char('d') => {
                            if let Some(idx) = app.selected_index() {
                                let res = app.controller.remove(idx).await;
                                if app.report(res) && app.selected > 0 { app.selected -= 1; }
                            }
                        }
                        KeyCode::Char('f') => {
                            let next = app.controller.filter().next();
                            app.controller.set_filter(next);
                        }
                        _ => {}
                    },
                    Mode::Create => match key.code {
                        KeyCode::Esc => { app.mode = Mode::View; app.controller.set_input(""); app.status.clear(); }
                        KeyCode::Enter => {
                            let res = app.controller.submit_input().await;
                            if app.report(res) { app.mode = Mode::View; }
                        }
                        KeyCode::Backspace => { let mut text = app.controller.input().to_string(); text.pop(); app.controller.set_input(text); }
                        KeyCode::Char(c) => { let mut text = app.controller.input().to_string(); text.push(c); app.controller.set_input(text); }
                        _ => {}
                    },
                    Mode::Edit(idx) => match key.code {
                        KeyCode::Esc => {
                            let res = app.controller.end_edit(idx);
                            app.report(res);
                            app.mode = Mode::View;
                        }
                        KeyCode::Enter => {
                            let res = app.controller.commit_edit(idx).await;
                            if app.report(res) { app.mode = Mode::View; }
                        }
                        KeyCode::Backspace => {
                            let mut text = app.controller.draft(idx).unwrap_or_default().to_string();
                            text.pop();
                            let res = app.controller.set_draft(idx, text);
                            app.report(res);
                        }
                        KeyCode::Char(c) => {
                            let mut text = app.controller.draft(idx).unwrap_or_default().to_string();
                            text.push(c);
                            let res = app.controller.set_draft(idx, text);
                            app.report(res);
                        }
                        _ => {}
                    },
                }
                app.clamp_selection();
            }
        }
        if app.last_tick.elapsed() >= tick_rate {
            app.last_tick = Instant::now();
        }
    }
    Ok(())
}

fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3), Constraint::Length(3)])
        .split(f.size());

    let header = Paragraph::new("Todos (Enter: toggle, n: new, e: edit, d: delete, f: filter, q: quit)  |  New/Edit: type text, Enter to save, Esc to cancel")
        .block(Block::default().borders(Borders::ALL).title("todolist"));
    f.render_widget(header, chunks[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    let state = app.controller.state();
    let rows = state.filtered_indices();
    let list_items: Vec<ListItem> = rows.iter().map(|&idx| {
        let todo = &state.items[idx];
        let mark = if todo.completed { "[x]" } else { "[ ]" };
        let editing = if state.is_editing(idx) { " (editing)" } else { "" };
        ListItem::new(format!("{} {}{}", mark, todo.text, editing))
    }).collect();
    let list = List::new(list_items)
        .block(Block::default().borders(Borders::ALL).title(format!("items [{}]  completed: {}", state.filter, state.completed_count)))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, middle[0], &mut app.list_state);

    let detail = match rows.get(app.selected).and_then(|&idx| state.items.get(idx)) {
        Some(todo) => format!("Text:\n{}\n\nStatus: {}\n\nId:\n{}", todo.text, if todo.completed { "Completed" } else { "Incomplete" }, todo.id),
        None => String::new(),
    };
    f.render_widget(Paragraph::new(detail).block(Block::default().borders(Borders::ALL).title("details")), middle[1]);

    let footer_text = match app.mode {
        Mode::View => format!("Filter=[{}]  |  {} todos", state.filter, state.items.len()),
        Mode::Create => format!("New: {}_", state.input),
        Mode::Edit(idx) => format!("Edit: {}_", state.draft(idx).unwrap_or_default()),
    };
    let footer = Paragraph::new(footer_text)
        .block(Block::default().borders(Borders::ALL).title(match app.mode { Mode::View => "info", Mode::Create => "create", Mode::Edit(_) => "edit" }));
    f.render_widget(footer, chunks[2]);

    let status = Paragraph::new(app.status.as_str())
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL).title("status"));
    f.render_widget(status, chunks[3]);
}
