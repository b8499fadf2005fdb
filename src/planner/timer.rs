use std::time::{Duration, Instant};

use tracing::debug;

/// Longest countdown accepted from manual adjustment: 99:59:59.
const MAX_SECS: u64 = 99 * 3600 + 59 * 60 + 59;

/// What a task hands to the timer view: whole seconds plus a display label.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimerHandoff {
    pub seconds: u64,
    pub label: String,
}

impl TimerHandoff {
    pub fn new(seconds: u64, label: impl Into<String>) -> Self {
        Self {
            seconds,
            label: label.into(),
        }
    }

    /// Builds a handoff from loosely typed launch parameters: a duration in
    /// whole seconds and a percent-encoded name.
    ///
    /// A missing, zero or unparsable duration means "start at zero". A name
    /// that fails to decode is used as given.
    pub fn from_params(duration: Option<&str>, name: Option<&str>) -> Self {
        let seconds = duration
            .and_then(|d| d.trim().parse::<u64>().ok())
            .unwrap_or(0);
        let label = name
            .map(|raw| match urlencoding::decode(raw) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => raw.to_string(),
            })
            .unwrap_or_default();
        Self { seconds, label }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Expired,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Not running; nothing changed.
    Idle,
    Counted,
    /// Hit zero on this tick. Reported once per run.
    Expired,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    state: TimerState,
    total: u64,
    remaining: u64,
    label: String,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            total: 0,
            remaining: 0,
            label: String::new(),
        }
    }

    /// A non-zero duration starts counting immediately.
    pub fn from_handoff(handoff: TimerHandoff) -> Self {
        let mut timer = Self {
            state: TimerState::Idle,
            total: handoff.seconds,
            remaining: handoff.seconds,
            label: handoff.label,
        };
        timer.start();
        timer
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn start(&mut self) -> bool {
        match self.state {
            TimerState::Idle | TimerState::Paused if self.remaining > 0 => {
                self.state = TimerState::Running;
                debug!(remaining = self.remaining, "timer started");
                true
            }
            _ => false,
        }
    }

    pub fn pause(&mut self) -> bool {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
            debug!(remaining = self.remaining, "timer paused");
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.remaining = self.total;
    }

    pub fn tick(&mut self) -> Tick {
        if self.state != TimerState::Running {
            return Tick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = TimerState::Expired;
            debug!(label = %self.label, "timer expired");
            Tick::Expired
        } else {
            Tick::Counted
        }
    }

    /// Changes the total while stopped. Ignored while running or paused.
    pub fn adjust(&mut self, delta_secs: i64) -> bool {
        if !matches!(self.state, TimerState::Idle | TimerState::Expired) {
            return false;
        }
        let total = i128::from(self.total) + i128::from(delta_secs);
        self.total = total.clamp(0, i128::from(MAX_SECS)) as u64;
        self.remaining = self.total;
        self.state = TimerState::Idle;
        true
    }

    /// `MM:SS`, minutes unbounded.
    pub fn display(&self) -> String {
        format_mm_ss(self.remaining)
    }
}

pub fn format_mm_ss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Converts wall-clock time into whole-second ticks for the event loop.
#[derive(Debug, Clone)]
pub struct Ticker {
    last: Instant,
    period: Duration,
}

impl Ticker {
    pub fn new(now: Instant) -> Self {
        Self {
            last: now,
            period: Duration::from_secs(1),
        }
    }

    /// Restarts the period; call when the countdown (re)starts so a resume
    /// never counts time spent paused.
    pub fn restart(&mut self, now: Instant) {
        self.last = now;
    }

    /// Number of whole periods elapsed since the last call that returned one.
    pub fn due(&mut self, now: Instant) -> u32 {
        let mut n = 0;
        while now.saturating_duration_since(self.last) >= self.period {
            self.last += self.period;
            n += 1;
        }
        n
    }

    /// Time left until the next period boundary.
    pub fn until_next(&self, now: Instant) -> Duration {
        self.period
            .saturating_sub(now.saturating_duration_since(self.last))
    }
}
