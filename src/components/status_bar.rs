use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, ViewMode};
use crate::theme;

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let w = area.width as usize;

        let mode_str = match app.view_mode {
            ViewMode::Calendar if app.modal.is_open() => "Calendar [Tasks]".to_string(),
            ViewMode::Calendar => "Calendar".to_string(),
            ViewMode::Timer => format!("Timer {}", app.timer.display()),
        };

        let (right_text, style) = match app.status_message {
            Some(ref msg) if msg.is_error => (format!(" {} ", msg.text), theme::current().error),
            Some(ref msg) => (format!(" {} ", msg.text), theme::current().status),
            None => (hints(app, w).to_string(), theme::current().status),
        };

        let left = format!(" {} ", mode_str);
        let padding = " ".repeat(w.saturating_sub(left.chars().count() + right_text.chars().count()));

        let line = Line::from(vec![
            Span::styled(left, theme::current().status),
            Span::styled(padding, theme::current().status),
            Span::styled(right_text, style),
        ]);

        let bar = Paragraph::new(line).style(theme::current().status);
        frame.render_widget(bar, area);
    }
}

fn hints(app: &App, w: usize) -> &'static str {
    match app.view_mode {
        ViewMode::Calendar if app.modal.is_open() => " Tab:Next Enter:Add Esc:Close",
        ViewMode::Calendar if w >= 80 => {
            " hjkl:Nav [/]:Month t:Today Enter:Tasks T:Timer ?:Help q:Quit"
        }
        ViewMode::Calendar if w >= 50 => " hjkl:Nav Enter:Tasks T:Timer q:Quit",
        ViewMode::Timer if w >= 70 => " s:Start p:Pause r:Reset +/-:Min </>:Sec Esc:Back",
        ViewMode::Timer if w >= 40 => " s/p/r Esc:Back",
        _ => " ?:Help q:Quit",
    }
}
