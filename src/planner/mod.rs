pub mod day_key;
pub mod grid;
pub mod modal;
pub mod store;
pub mod task;
pub mod timer;

pub use day_key::DayKey;
pub use grid::{month_grid, Cursor, DayCell};
pub use modal::{Modal, ModalFocus};
pub use store::TaskStore;
pub use task::{Subject, SubjectPalette, Task};
pub use timer::{Countdown, Tick, Ticker, TimerHandoff, TimerState};
