use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::planner::grid::DAY_NAMES;
use crate::planner::{Cursor, DayCell};
use crate::theme;

pub struct MonthView;

impl MonthView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        cursor: Cursor,
        selected_date: NaiveDate,
        cells: &[DayCell],
    ) {
        let block = Block::default()
            .title(format!(" {} ", cursor.title()))
            .title_style(theme::current().header)
            .borders(Borders::ALL)
            .border_style(theme::current().border);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let weeks: Vec<&[DayCell]> = cells.chunks(7).collect();

        let mut constraints = vec![Constraint::Length(1)];
        constraints.extend(weeks.iter().map(|_| Constraint::Fill(1)));
        let rows = Layout::vertical(constraints).split(inner);

        let columns = Layout::horizontal([Constraint::Ratio(1, 7); 7]);

        for (col, name) in columns.split(rows[0]).iter().zip(DAY_NAMES) {
            frame.render_widget(
                Paragraph::new(Span::styled(name, theme::current().header)).centered(),
                *col,
            );
        }

        for (week, row) in weeks.iter().zip(rows.iter().skip(1)) {
            for (cell, col) in week.iter().zip(columns.split(*row).iter()) {
                render_cell(frame, *col, cell, cell.date == selected_date);
            }
        }
    }
}

fn render_cell(frame: &mut Frame, area: Rect, cell: &DayCell, selected: bool) {
    let number_style = if cell.is_today && selected {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else if selected {
        theme::current().selected
    } else if cell.is_today {
        theme::current().today
    } else if cell.is_other_month {
        theme::current().dim
    } else {
        Style::default()
    };

    let border_style = if selected {
        theme::current().selected.bg(Color::Reset)
    } else {
        theme::current().border
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let height = inner.height as usize;
    if width == 0 || height == 0 {
        return;
    }

    let mut lines = vec![Line::from(Span::styled(
        format!("{:>2}", cell.date.day()),
        number_style,
    ))];

    let room = height.saturating_sub(1);
    let shown = if cell.tasks.len() > room {
        room.saturating_sub(1)
    } else {
        cell.tasks.len()
    };

    for task in &cell.tasks[..shown] {
        let mut style = Style::default()
            .fg(Color::Black)
            .bg(theme::task_color(&task.color));
        if cell.is_other_month {
            style = style.add_modifier(Modifier::DIM);
        }
        lines.push(Line::from(Span::styled(truncate(&task.name, width), style)));
    }
    if shown < cell.tasks.len() && room > 0 {
        lines.push(Line::from(Span::styled(
            truncate(&format!("+{} more", cell.tasks.len() - shown), width),
            theme::current().dim,
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        s.to_string()
    } else if max > 1 {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('\u{2026}');
        out
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("Essay", 10), "Essay");
        assert_eq!(truncate("Mathematics", 5), "Math\u{2026}");
        assert_eq!(truncate("étude", 1), "é");
    }
}
