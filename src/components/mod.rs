pub mod month_view;
pub mod status_bar;
pub mod task_modal;
pub mod timer_view;

pub use month_view::MonthView;
pub use status_bar::StatusBar;
pub use task_modal::TaskModal;
pub use timer_view::TimerView;
