use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::planner::{Countdown, TimerState};
use crate::theme;

pub struct TimerView;

impl TimerView {
    pub fn render(frame: &mut Frame, area: Rect, timer: &Countdown) {
        let title = if timer.label().is_empty() {
            " Timer ".to_string()
        } else {
            format!(" Timer: {} ", timer.label())
        };

        let block = Block::default()
            .title(title)
            .title_style(theme::current().header)
            .borders(Borders::ALL)
            .border_style(theme::current().border);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1), // time
            Constraint::Length(1), // state
            Constraint::Length(1), // spacer
            Constraint::Length(1), // progress
            Constraint::Fill(1),
        ])
        .split(inner);

        let time_style = match timer.state() {
            TimerState::Expired => theme::current().expired,
            TimerState::Paused => theme::current().dim.add_modifier(Modifier::BOLD),
            _ => Style::default().add_modifier(Modifier::BOLD),
        };
        frame.render_widget(
            Paragraph::new(Span::styled(timer.display(), time_style)).centered(),
            rows[1],
        );

        let state = match timer.state() {
            TimerState::Idle => "Idle",
            TimerState::Running => "Running",
            TimerState::Paused => "Paused",
            TimerState::Expired => "Time is up!",
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(state, theme::current().dim))).centered(),
            rows[2],
        );

        let ratio = if timer.total() == 0 {
            0.0
        } else {
            1.0 - timer.remaining() as f64 / timer.total() as f64
        };
        let bar_w = inner.width.min(40);
        let [bar] = Layout::horizontal([Constraint::Length(bar_w)])
            .flex(ratatui::layout::Flex::Center)
            .areas(rows[4]);
        frame.render_widget(
            Gauge::default()
                .gauge_style(theme::current().selected)
                .ratio(ratio.clamp(0.0, 1.0))
                .label(""),
            bar,
        );
    }
}
