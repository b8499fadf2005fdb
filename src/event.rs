use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// Waits up to `timeout` for a key press. Releases, repeats and non-key
/// events already queued are drained without restarting the wait.
pub fn next_key_press(timeout: Duration) -> color_eyre::Result<Option<KeyEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(Some(key));
            }
        }
        if !event::poll(Duration::ZERO)? {
            return Ok(None);
        }
    }
}
