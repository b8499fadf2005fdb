use std::time::Instant;

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::planner::grid::shift_months;
use crate::planner::modal::{FormField, SubmitError};
use crate::planner::{
    month_grid, Countdown, Cursor, DayCell, DayKey, Modal, ModalFocus, SubjectPalette, Task,
    TaskStore, Tick, Ticker, TimerHandoff,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewMode {
    Calendar,
    Timer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Session state: what is shown and selected. Nothing here is persisted
/// except through `store`.
pub struct App {
    pub running: bool,
    pub view_mode: ViewMode,
    pub selected_date: NaiveDate,
    pub today: NaiveDate,
    pub modal: Modal,
    pub timer: Countdown,
    pub show_help: bool,
    pub status_message: Option<StatusMessage>,
    pub palette: SubjectPalette,
    pub bell: bool,
    ticker: Ticker,
    store: TaskStore,
}

impl App {
    pub fn new(store: TaskStore, palette: SubjectPalette, bell: bool) -> Self {
        Self::with_today(store, palette, bell, Local::now().date_naive())
    }

    pub fn with_today(
        store: TaskStore,
        palette: SubjectPalette,
        bell: bool,
        today: NaiveDate,
    ) -> Self {
        Self {
            running: true,
            view_mode: ViewMode::Calendar,
            selected_date: today,
            today,
            modal: Modal::Closed,
            timer: Countdown::new(),
            show_help: false,
            status_message: None,
            palette,
            bell,
            ticker: Ticker::new(Instant::now()),
            store,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn cursor(&self) -> Cursor {
        Cursor::containing(self.selected_date)
    }

    pub fn cells(&self) -> Vec<DayCell<'_>> {
        month_grid(self.cursor(), self.today, &self.store)
    }

    pub fn modal_tasks(&self) -> &[Task] {
        self.modal
            .day()
            .map(|day| self.store.tasks(day))
            .unwrap_or(&[])
    }

    // ── Grid navigation ──

    pub fn next_day(&mut self) {
        self.selected_date = self
            .selected_date
            .succ_opt()
            .unwrap_or(self.selected_date);
    }

    pub fn prev_day(&mut self) {
        self.selected_date = self
            .selected_date
            .pred_opt()
            .unwrap_or(self.selected_date);
    }

    pub fn next_week(&mut self) {
        self.selected_date = self
            .selected_date
            .checked_add_days(chrono::Days::new(7))
            .unwrap_or(self.selected_date);
    }

    pub fn prev_week(&mut self) {
        self.selected_date = self
            .selected_date
            .checked_sub_days(chrono::Days::new(7))
            .unwrap_or(self.selected_date);
    }

    pub fn next_month(&mut self) {
        self.selected_date = shift_months(self.selected_date, 1);
    }

    pub fn prev_month(&mut self) {
        self.selected_date = shift_months(self.selected_date, -1);
    }

    pub fn go_to_today(&mut self) {
        self.today = Local::now().date_naive();
        self.selected_date = self.today;
    }

    /// Picks up a date change while the app stays open overnight.
    pub fn refresh_today(&mut self) {
        let now = Local::now().date_naive();
        if now != self.today {
            info!(today = %now, "date changed");
            self.today = now;
        }
    }

    // ── Task modal ──

    pub fn open_modal(&mut self) {
        self.modal.open(DayKey::new(self.selected_date));
    }

    pub fn close_modal(&mut self) {
        self.modal.close();
    }

    pub fn submit_task(&mut self) {
        match self.modal.submit(&mut self.store, &self.palette) {
            Ok(task) => {
                self.status_message = Some(StatusMessage::info(format!("Added \"{}\"", task.name)));
            }
            Err(SubmitError::Form(err)) => {
                self.status_message = Some(StatusMessage::error(err.to_string()));
            }
            Err(err @ SubmitError::Store(_)) => {
                warn!(error = %err, "task not saved");
                self.status_message = Some(StatusMessage::error(err.to_string()));
            }
        }
    }

    pub fn delete_selected_task(&mut self) {
        match self.modal.delete_selected(&mut self.store) {
            Ok(Some(task)) => {
                self.status_message = Some(StatusMessage::info(format!("Deleted \"{}\"", task.name)));
            }
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "delete not saved");
                self.status_message = Some(StatusMessage::error(format!("{err:#}")));
            }
        }
    }

    pub fn modal_select_next(&mut self) {
        let len = self.modal_tasks().len();
        if let Some(open) = self.modal.as_open_mut() {
            open.select_next(len);
        }
    }

    pub fn modal_select_prev(&mut self) {
        if let Some(open) = self.modal.as_open_mut() {
            open.select_prev();
        }
    }

    /// Tab walks the form fields and then the task list.
    pub fn modal_tab(&mut self) {
        if let Some(open) = self.modal.as_open_mut() {
            match open.focus {
                ModalFocus::List => {
                    open.focus = ModalFocus::Form;
                    open.form.active_field = FormField::Name;
                }
                ModalFocus::Form if open.form.active_field == FormField::Duration => {
                    open.focus = ModalFocus::List;
                }
                ModalFocus::Form => open.form.active_field = open.form.active_field.next(),
            }
        }
    }

    pub fn modal_backtab(&mut self) {
        if let Some(open) = self.modal.as_open_mut() {
            match open.focus {
                ModalFocus::List => {
                    open.focus = ModalFocus::Form;
                    open.form.active_field = FormField::Duration;
                }
                ModalFocus::Form if open.form.active_field == FormField::Name => {
                    open.focus = ModalFocus::List;
                }
                ModalFocus::Form => open.form.active_field = open.form.active_field.prev(),
            }
        }
    }

    pub fn form_input_char(&mut self, c: char) {
        let subjects = self.palette.len();
        if let Some(open) = self.modal.as_open_mut() {
            if open.focus != ModalFocus::Form {
                return;
            }
            if c == ' ' && open.form.active_field == FormField::Subject {
                open.form.next_subject(subjects);
            } else {
                open.form.input_char(c);
            }
        }
    }

    pub fn form_backspace(&mut self) {
        if let Some(open) = self.modal.as_open_mut() {
            if open.focus == ModalFocus::Form {
                open.form.backspace();
            }
        }
    }

    // ── Timer ──

    /// Hands the highlighted task to the timer and switches to it.
    pub fn start_timer_for_selected(&mut self) {
        if let Some(handoff) = self.modal.selected_handoff(&self.store) {
            self.open_timer(handoff);
        }
    }

    pub fn open_timer(&mut self, handoff: TimerHandoff) {
        info!(seconds = handoff.seconds, label = %handoff.label, "timer handoff");
        self.timer = Countdown::from_handoff(handoff);
        self.ticker.restart(Instant::now());
        self.view_mode = ViewMode::Timer;
    }

    pub fn show_timer(&mut self) {
        self.view_mode = ViewMode::Timer;
    }

    pub fn show_calendar(&mut self) {
        self.view_mode = ViewMode::Calendar;
    }

    pub fn timer_start(&mut self) {
        if self.timer.start() {
            self.ticker.restart(Instant::now());
        }
    }

    pub fn timer_pause(&mut self) {
        self.timer.pause();
    }

    pub fn timer_reset(&mut self) {
        self.timer.reset();
    }

    pub fn timer_adjust(&mut self, delta_secs: i64) {
        if !self.timer.adjust(delta_secs) {
            self.status_message = Some(StatusMessage::info("Pause or reset the timer to change it"));
        }
    }

    /// Advances the countdown by the whole seconds elapsed at `now`.
    /// Returns true on the tick that finished it.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        if !self.timer.is_running() {
            return false;
        }
        for _ in 0..self.ticker.due(now) {
            if self.timer.tick() == Tick::Expired {
                info!(label = %self.timer.label(), "countdown finished");
                self.status_message = Some(StatusMessage::info("Time is up!"));
                return true;
            }
        }
        false
    }

    pub fn until_next_tick(&self, now: Instant) -> Option<std::time::Duration> {
        self.timer
            .is_running()
            .then(|| self.ticker.until_next(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::modal::{list_items, EMPTY_DAY_MESSAGE};
    use crate::planner::TimerState;
    use std::time::Duration;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    fn app_in(dir: &std::path::Path, today: NaiveDate) -> App {
        let store = TaskStore::load(dir.join("tasks.json"));
        App::with_today(store, SubjectPalette::default(), false, today)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.form_input_char(c);
        }
    }

    #[test]
    fn essay_round_trip_through_the_ui() {
        let temp = tempdir().expect("tempdir");
        let mut app = app_in(temp.path(), date(2024, 3, 1));
        let day = DayKey::new(date(2024, 3, 15));

        app.selected_date = date(2024, 3, 15);
        app.open_modal();
        type_text(&mut app, "Essay");
        app.modal_tab();
        // Subject: cycle Mathematics -> Science -> English
        app.form_input_char(' ');
        app.form_input_char(' ');
        app.modal_tab();
        app.modal_tab();
        app.modal_tab();
        type_text(&mut app, "2");
        app.submit_task();

        let cells = app.cells();
        let cell = cells.iter().find(|c| c.key == day).expect("cell");
        assert_eq!(cell.tasks.len(), 1);
        assert_eq!(cell.tasks[0].subject.as_deref(), Some("English"));
        assert_eq!(cell.tasks[0].color, "#a283f8");

        app.close_modal();
        app.open_modal();
        let items = list_items(app.modal_tasks());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Essay");

        app.delete_selected_task();
        assert!(app.modal_tasks().is_empty());
        assert!(list_items(app.modal_tasks()).is_empty());
        assert_eq!(EMPTY_DAY_MESSAGE, "No tasks yet. Add one below!");
        assert!(app.store().is_empty());

        let reloaded = app_in(temp.path(), date(2024, 3, 1));
        assert!(reloaded.store().tasks(day).is_empty());
    }

    #[test]
    fn invalid_duration_leaves_an_error_and_no_task() {
        let temp = tempdir().expect("tempdir");
        let mut app = app_in(temp.path(), date(2024, 3, 1));
        app.open_modal();
        type_text(&mut app, "Lab");
        app.modal_backtab();
        app.modal_backtab();
        type_text(&mut app, "x");
        app.submit_task();

        assert!(app.store().is_empty());
        let status = app.status_message.clone().expect("status");
        assert!(status.is_error);
    }

    #[test]
    fn month_navigation_clamps_and_moves_cursor() {
        let temp = tempdir().expect("tempdir");
        let mut app = app_in(temp.path(), date(2024, 1, 31));
        app.next_month();
        assert_eq!(app.selected_date, date(2024, 2, 29));
        assert_eq!(app.cursor(), Cursor::new(2024, 2));
        app.prev_month();
        assert_eq!(app.selected_date, date(2024, 1, 29));
        app.prev_week();
        assert_eq!(app.cursor(), Cursor::new(2024, 1));
        app.next_week();
        app.next_week();
        assert_eq!(app.selected_date, date(2024, 2, 5));
    }

    #[test]
    fn timer_handoff_runs_and_expires_once() {
        let temp = tempdir().expect("tempdir");
        let mut app = app_in(temp.path(), date(2024, 3, 15));
        app.open_timer(TimerHandoff::new(2, "Essay"));
        assert_eq!(app.view_mode, ViewMode::Timer);
        assert_eq!(app.timer.state(), TimerState::Running);

        let start = Instant::now();
        let mut finished = 0;
        for secs in 1..=5 {
            if app.on_tick(start + Duration::from_secs(secs)) {
                finished += 1;
            }
        }
        assert_eq!(finished, 1);
        assert_eq!(app.timer.state(), TimerState::Expired);
        assert_eq!(app.timer.display(), "00:00");
    }

    #[test]
    fn start_timer_uses_highlighted_task() {
        let temp = tempdir().expect("tempdir");
        let mut app = app_in(temp.path(), date(2024, 3, 15));
        app.open_modal();
        type_text(&mut app, "Reading");
        app.modal_backtab();
        app.modal_backtab();
        type_text(&mut app, "0.5");
        app.submit_task();

        app.start_timer_for_selected();
        assert_eq!(app.timer.total(), 1800);
        assert_eq!(app.timer.label(), "Reading");
        assert!(app.timer.is_running());
    }
}
