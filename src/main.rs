mod app;
mod cli;
mod components;
mod config;
mod event;
mod logging;
mod planner;
mod theme;
mod tui;

use std::time::{Duration, Instant};

use app::{App, ViewMode};
use clap::Parser;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use planner::modal::FormField;
use planner::{Modal, ModalFocus, TaskStore};
use ratatui::layout::{Constraint, Layout, Rect};
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = cli::Args::parse();
    let (config, config_error) = match config::Config::load(args.config.as_deref()) {
        Ok(config) => (config, None),
        Err(err) => (config::Config::default(), Some(err)),
    };

    let data_dir = config.resolve_data_dir(args.data_dir.as_deref());
    match logging::init_or_skip(&data_dir, &config.log_level) {
        Some(log_path) => {
            info!(data_dir = %data_dir.display(), log = %log_path.display(), "starting study-planner");
        }
        None => eprintln!(
            "study-planner: logging disabled, no log file in {}",
            data_dir.display()
        ),
    }
    if let Some(ref err) = config_error {
        warn!(error = %format!("{err:#}"), "config ignored, using defaults");
    }

    let active_theme = config.theme.clone().into_theme();
    info!(theme = %active_theme.name, "theme loaded");
    theme::install(active_theme);

    let store = TaskStore::load(config::task_file(&data_dir));
    info!(tasks = %store.path().display(), days = store.len(), "task store ready");
    let mut app = App::new(store, config.palette(), config.bell);
    if let Some(handoff) = args.timer_handoff() {
        app.open_timer(handoff);
    }
    if config_error.is_some() {
        app.status_message = Some(app::StatusMessage {
            text: "Config file invalid, using defaults (see log)".to_string(),
            is_error: true,
        });
    }

    tui::install_panic_hook();

    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app);
    tui::restore()?;
    info!("exiting");
    result
}

fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    while app.running {
        app.refresh_today();

        terminal.draw(|frame| {
            let area = frame.area();

            // Main layout: content + status bar
            let layout = Layout::vertical([
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

            match app.view_mode {
                ViewMode::Calendar => {
                    let cells = app.cells();
                    components::MonthView::render(
                        frame,
                        layout[0],
                        app.cursor(),
                        app.selected_date,
                        &cells,
                    );
                    if let Modal::Open(ref open) = app.modal {
                        components::TaskModal::render(
                            frame,
                            layout[0],
                            open,
                            app.modal_tasks(),
                            app.store().total_hours(open.day),
                            &app.palette,
                        );
                    }
                }
                ViewMode::Timer => components::TimerView::render(frame, layout[0], &app.timer),
            }

            if app.show_help {
                render_help(frame, area);
            }

            components::StatusBar::render(frame, layout[1], app);
        })?;

        let timeout = app
            .until_next_tick(Instant::now())
            .map_or(POLL_INTERVAL, |d| d.min(POLL_INTERVAL));

        if let Some(key) = event::next_key_press(timeout)? {
            // Clear status message on any key
            app.status_message = None;

            if app.show_help {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                    app.show_help = false;
                }
            } else if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                app.running = false;
            } else {
                match app.view_mode {
                    ViewMode::Timer => handle_timer_input(app, key.code),
                    ViewMode::Calendar if app.modal.is_open() => {
                        handle_modal_input(app, key.code)
                    }
                    ViewMode::Calendar => handle_calendar_input(app, key.code),
                }
            }
        }

        if app.on_tick(Instant::now()) && app.bell {
            tui::ring_bell();
        }
    }

    Ok(())
}

fn handle_calendar_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('t') => app.go_to_today(),
        KeyCode::Char('T') => app.show_timer(),
        KeyCode::Enter => app.open_modal(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_day(),
        KeyCode::Right | KeyCode::Char('l') => app.next_day(),
        KeyCode::Up | KeyCode::Char('k') => app.prev_week(),
        KeyCode::Down | KeyCode::Char('j') => app.next_week(),
        KeyCode::Char('[') => app.prev_month(),
        KeyCode::Char(']') => app.next_month(),
        KeyCode::Char('?') => app.show_help = true,
        _ => {}
    }
}

fn handle_modal_input(app: &mut App, code: KeyCode) {
    let focus = match app.modal {
        Modal::Open(ref open) => open.focus,
        Modal::Closed => return,
    };

    match (focus, code) {
        (_, KeyCode::Esc) => app.close_modal(),
        (_, KeyCode::Tab) => app.modal_tab(),
        (_, KeyCode::BackTab) => app.modal_backtab(),
        (ModalFocus::Form, KeyCode::Enter) => app.submit_task(),
        (ModalFocus::Form, KeyCode::Backspace) => app.form_backspace(),
        (ModalFocus::Form, KeyCode::Char(c)) => app.form_input_char(c),
        (ModalFocus::List, KeyCode::Up | KeyCode::Char('k')) => app.modal_select_prev(),
        (ModalFocus::List, KeyCode::Down | KeyCode::Char('j')) => app.modal_select_next(),
        (ModalFocus::List, KeyCode::Char('d') | KeyCode::Delete) => app.delete_selected_task(),
        (ModalFocus::List, KeyCode::Char('t') | KeyCode::Enter) => app.start_timer_for_selected(),
        (ModalFocus::List, KeyCode::Char('n')) => {
            if let Some(open) = app.modal.as_open_mut() {
                open.focus = ModalFocus::Form;
                open.form.active_field = FormField::Name;
            }
        }
        _ => {}
    }
}

fn handle_timer_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Char('c') => app.show_calendar(),
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('s') | KeyCode::Char(' ') => app.timer_start(),
        KeyCode::Char('p') => app.timer_pause(),
        KeyCode::Char('r') => app.timer_reset(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.timer_adjust(60),
        KeyCode::Char('-') => app.timer_adjust(-60),
        KeyCode::Char('>') => app.timer_adjust(10),
        KeyCode::Char('<') => app.timer_adjust(-10),
        KeyCode::Char('?') => app.show_help = true,
        _ => {}
    }
}

fn render_help(frame: &mut ratatui::Frame, area: Rect) {
    use ratatui::style::{Color, Modifier, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

    let popup_w = area.width.min(52).max(30);
    let popup_h = area.height.min(24).max(12);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h).intersection(area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Keybindings ")
        .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let section_style = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let entry = |keys: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", keys), key_style),
            Span::raw(desc),
        ])
    };

    let lines = vec![
        Line::from(Span::styled("Calendar", section_style)),
        entry("h/l", "Previous/next day"),
        entry("j/k", "Next/previous week"),
        entry("[/]", "Previous/next month"),
        entry("t", "Jump to today"),
        entry("Enter", "Tasks for the selected day"),
        entry("T", "Open the timer"),
        Line::from(""),
        Line::from(Span::styled("Tasks", section_style)),
        entry("Tab", "Next field / task list"),
        entry("Space", "Change subject"),
        entry("Enter", "Add task / start its timer"),
        entry("d", "Delete highlighted task"),
        entry("t", "Start timer for task"),
        Line::from(""),
        Line::from(Span::styled("Timer", section_style)),
        entry("s/p/r", "Start / pause / reset"),
        entry("+/-", "One minute more/less"),
        entry("</>", "Ten seconds less/more"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  q", key_style),
            Span::styled(" / ", theme::DIM_STYLE),
            Span::styled("Esc     ", key_style),
            Span::styled("Quit / close popup", Style::default()),
        ]),
    ];

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
