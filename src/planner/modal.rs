use thiserror::Error;
use tracing::info;

use super::day_key::DayKey;
use super::grid::month_name;
use super::store::TaskStore;
use super::task::{SubjectPalette, Task};
use super::timer::TimerHandoff;
use crate::theme;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Task name is required")]
    MissingName,

    #[error("Duration must be a number of hours, got '{0}'")]
    InvalidDuration(String),

    #[error("Duration can't be negative")]
    NegativeDuration,

    #[error("Unknown color '{0}' (use #rrggbb or a color name)")]
    InvalidColor(String),

    #[error("No day is open")]
    NotOpen,
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error("Could not save task: {0:#}")]
    Store(color_eyre::Report),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Name,
    Subject,
    Color,
    Description,
    Duration,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Name => FormField::Subject,
            FormField::Subject => FormField::Color,
            FormField::Color => FormField::Description,
            FormField::Description => FormField::Duration,
            FormField::Duration => FormField::Name,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Name => FormField::Duration,
            FormField::Subject => FormField::Name,
            FormField::Color => FormField::Subject,
            FormField::Description => FormField::Color,
            FormField::Duration => FormField::Description,
        }
    }
}

/// Raw text of the task-entry form.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub name: String,
    pub subject_index: usize,
    /// Direct color choice; overrides the subject's color when set.
    pub color: String,
    pub description: String,
    pub duration: String,
    pub active_field: FormField,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            subject_index: 0,
            color: String::new(),
            description: String::new(),
            duration: String::new(),
            active_field: FormField::Name,
        }
    }
}

impl TaskForm {
    pub fn input_char(&mut self, c: char) {
        match self.active_field {
            FormField::Name => self.name.push(c),
            FormField::Color => self.color.push(c),
            FormField::Description => self.description.push(c),
            FormField::Duration => self.duration.push(c),
            FormField::Subject => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.active_field {
            FormField::Name => {
                self.name.pop();
            }
            FormField::Color => {
                self.color.pop();
            }
            FormField::Description => {
                self.description.pop();
            }
            FormField::Duration => {
                self.duration.pop();
            }
            FormField::Subject => {}
        }
    }

    pub fn next_subject(&mut self, total: usize) {
        if total > 0 {
            self.subject_index = (self.subject_index + 1) % total;
        }
    }

    /// Empties the text fields; subject choice and focus stay put.
    pub fn clear(&mut self) {
        self.name.clear();
        self.color.clear();
        self.description.clear();
        self.duration.clear();
    }

    /// Turns the form into a task. Unparsable durations are rejected rather
    /// than coerced to zero.
    pub fn validate(&self, palette: &SubjectPalette) -> Result<Task, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }

        let raw = self.duration.trim();
        let duration: f64 = raw
            .parse()
            .ok()
            .filter(|d: &f64| d.is_finite())
            .ok_or_else(|| FormError::InvalidDuration(raw.to_string()))?;
        if duration < 0.0 {
            return Err(FormError::NegativeDuration);
        }

        let subject = palette.get(self.subject_index);
        let color = match self.color.trim() {
            "" => subject.map(|s| s.color.clone()).unwrap_or_default(),
            custom => {
                if theme::parse_color(custom).is_none() {
                    return Err(FormError::InvalidColor(custom.to_string()));
                }
                custom.to_string()
            }
        };

        Ok(Task {
            name: name.to_string(),
            subject: subject.map(|s| s.name.clone()),
            color,
            description: self.description.trim().to_string(),
            // -0.0 stays out of storage
            duration: duration.abs(),
        })
    }
}

/// Which half of the open modal takes keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModalFocus {
    List,
    Form,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenModal {
    pub day: DayKey,
    pub form: TaskForm,
    /// Highlighted row in the day's task list.
    pub selected: usize,
    pub focus: ModalFocus,
}

/// Per-day task editor: closed, or open on exactly one day.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Modal {
    #[default]
    Closed,
    Open(OpenModal),
}

impl Modal {
    /// Opens (or re-opens) the editor on `day` with a fresh form.
    pub fn open(&mut self, day: DayKey) {
        *self = Modal::Open(OpenModal {
            day,
            form: TaskForm::default(),
            selected: 0,
            focus: ModalFocus::Form,
        });
    }

    pub fn close(&mut self) {
        *self = Modal::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Modal::Open(_))
    }

    pub fn day(&self) -> Option<DayKey> {
        match self {
            Modal::Open(open) => Some(open.day),
            Modal::Closed => None,
        }
    }

    pub fn as_open_mut(&mut self) -> Option<&mut OpenModal> {
        match self {
            Modal::Open(open) => Some(open),
            Modal::Closed => None,
        }
    }

    /// Validates the form and appends the task to the open day. The form is
    /// cleared only after the task is stored.
    pub fn submit(
        &mut self,
        store: &mut TaskStore,
        palette: &SubjectPalette,
    ) -> Result<Task, SubmitError> {
        let open = self.as_open_mut().ok_or(FormError::NotOpen)?;
        let task = open.form.validate(palette)?;
        store
            .add_task(open.day, task.clone())
            .map_err(SubmitError::Store)?;
        info!(day = %open.day, name = %task.name, "task added");
        open.form.clear();
        open.selected = store.tasks(open.day).len().saturating_sub(1);
        Ok(task)
    }

    /// Deletes the highlighted task and keeps the highlight in range.
    pub fn delete_selected(&mut self, store: &mut TaskStore) -> color_eyre::Result<Option<Task>> {
        let Some(open) = self.as_open_mut() else {
            return Ok(None);
        };
        let removed = store.delete_task(open.day, open.selected)?;
        if let Some(ref task) = removed {
            info!(day = %open.day, name = %task.name, "task deleted");
        }
        let len = store.tasks(open.day).len();
        open.selected = open.selected.min(len.saturating_sub(1));
        Ok(removed)
    }

    /// Timer parameters for the highlighted task.
    pub fn selected_handoff(&self, store: &TaskStore) -> Option<TimerHandoff> {
        let Modal::Open(open) = self else {
            return None;
        };
        store.tasks(open.day).get(open.selected).map(handoff_for)
    }
}

impl OpenModal {
    pub fn select_next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

/// `"Tasks for March 15, 2024"`
pub fn heading(day: DayKey) -> String {
    use chrono::Datelike;
    let date = day.date();
    format!(
        "Tasks for {} {}, {}",
        month_name(date.month()),
        date.day(),
        date.year()
    )
}

pub const EMPTY_DAY_MESSAGE: &str = "No tasks yet. Add one below!";

/// One row of the day's task list, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskListItem {
    pub index: usize,
    pub name: String,
    pub badge: String,
    pub color: String,
    pub description: Option<String>,
    pub duration: String,
    pub handoff: TimerHandoff,
}

pub fn list_items(tasks: &[Task]) -> Vec<TaskListItem> {
    tasks
        .iter()
        .enumerate()
        .map(|(index, task)| TaskListItem {
            index,
            name: task.name.clone(),
            badge: task.subject.clone().unwrap_or_else(|| "Custom".to_string()),
            color: task.color.clone(),
            description: task.description().map(str::to_string),
            duration: task.duration_display(),
            handoff: handoff_for(task),
        })
        .collect()
}

fn handoff_for(task: &Task) -> TimerHandoff {
    let label = if task.name.trim().is_empty() {
        "Task"
    } else {
        task.name.as_str()
    };
    TimerHandoff::new(task.duration_secs(), label)
}
