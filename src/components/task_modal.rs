use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::planner::modal::{self, FormField, ModalFocus, OpenModal, TaskListItem, EMPTY_DAY_MESSAGE};
use crate::planner::{SubjectPalette, Task};
use crate::theme;

pub struct TaskModal;

impl TaskModal {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        open: &OpenModal,
        tasks: &[Task],
        total_hours: f64,
        palette: &SubjectPalette,
    ) {
        let popup_w = area.width.min(64).max(30);
        let popup_h = area.height.min(26).max(14);
        let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
        let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
        let popup_area = Rect::new(x, y, popup_w, popup_h).intersection(area);

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!(" {} ", modal::heading(open.day)))
            .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let rows = Layout::vertical([
            Constraint::Min(3),    // task list
            Constraint::Length(1), // spacer
            Constraint::Length(1), // name
            Constraint::Length(1), // subject
            Constraint::Length(1), // color
            Constraint::Length(1), // description
            Constraint::Length(1), // duration
            Constraint::Length(1), // spacer
            Constraint::Length(1), // help
        ])
        .split(inner);

        render_task_list(frame, rows[0], open, tasks, total_hours);

        let form = &open.form;
        let active = |field: FormField| open.focus == ModalFocus::Form && form.active_field == field;

        let subject = palette.get(form.subject_index);
        let subject_name = subject.map(|s| s.name.as_str()).unwrap_or("None");
        let color_hint = if form.color.is_empty() && !active(FormField::Color) {
            subject.map(|s| s.color.as_str()).unwrap_or("")
        } else {
            form.color.as_str()
        };

        render_field(frame, rows[2], "Name:", &form.name, active(FormField::Name));
        render_subject(frame, rows[3], subject_name, subject.map(|s| s.color.as_str()), active(FormField::Subject));
        render_field(frame, rows[4], "Color:", color_hint, active(FormField::Color));
        render_field(frame, rows[5], "Notes:", &form.description, active(FormField::Description));
        render_field(frame, rows[6], "Hours:", &form.duration, active(FormField::Duration));

        let key = Style::default().add_modifier(Modifier::BOLD);
        let dim = theme::current().dim;
        let help = match open.focus {
            ModalFocus::Form => Line::from(vec![
                Span::styled("Tab", key),
                Span::styled(":Next ", dim),
                Span::styled("Sp", key),
                Span::styled(":Subject ", dim),
                Span::styled("Enter", key),
                Span::styled(":Add ", dim),
                Span::styled("Esc", key),
                Span::styled(":Close", dim),
            ]),
            ModalFocus::List => Line::from(vec![
                Span::styled("jk", key),
                Span::styled(":Move ", dim),
                Span::styled("d", key),
                Span::styled(":Delete ", dim),
                Span::styled("t", key),
                Span::styled(":Timer ", dim),
                Span::styled("Tab", key),
                Span::styled(":Form ", dim),
                Span::styled("Esc", key),
                Span::styled(":Close", dim),
            ]),
        };
        frame.render_widget(Paragraph::new(help), rows[8]);
    }
}

fn render_task_list(frame: &mut Frame, area: Rect, open: &OpenModal, tasks: &[Task], hours: f64) {
    let focused = open.focus == ModalFocus::List;
    let block = Block::default()
        .title(list_title(tasks.len(), hours))
        .title_style(theme::current().header)
        .borders(Borders::TOP)
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            theme::current().border
        });

    if tasks.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(EMPTY_DAY_MESSAGE).style(theme::current().dim).centered(),
            inner,
        );
        return;
    }

    let width = area.width as usize;
    let items: Vec<ListItem> = modal::list_items(tasks)
        .iter()
        .map(|item| format_item(item, width))
        .collect();

    let mut state = ListState::default();
    if focused {
        state.select(Some(open.selected));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(theme::current().highlight)
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut state);
}

fn list_title(count: usize, hours: f64) -> String {
    if count == 0 {
        " Tasks ".to_string()
    } else {
        format!(" Tasks ({}, {} h) ", count, hours)
    }
}

fn format_item(item: &TaskListItem, max_width: usize) -> ListItem<'static> {
    let color = theme::task_color(&item.color);

    let mut lines = vec![Line::from(vec![
        Span::styled("\u{258c}", Style::default().fg(color)),
        Span::styled(item.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(
            format!(" {} ", item.badge),
            Style::default().fg(Color::Black).bg(color),
        ),
        Span::styled(format!(" \u{23f1} {}", item.duration), theme::current().dim),
    ])];

    if let Some(ref desc) = item.description {
        lines.push(Line::from(vec![
            Span::styled("\u{258c}", Style::default().fg(color)),
            Span::styled(
                super::month_view::truncate(desc, max_width.saturating_sub(4)),
                theme::current().dim,
            ),
        ]));
    }

    ListItem::new(lines)
}

fn render_subject(frame: &mut Frame, area: Rect, name: &str, color: Option<&str>, active: bool) {
    let mut spans = vec![Span::styled(format!("{:<7}", "Subj:"), theme::current().dim)];
    let swatch = color.map(theme::task_color).unwrap_or(Color::White);
    spans.push(Span::styled("  ", Style::default().bg(swatch)));
    let style = if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    spans.push(Span::styled(format!(" {}", name), style));
    if active {
        spans.push(Span::styled(" (space to change)", theme::current().dim));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let cursor = if active { "_" } else { "" };

    let style = if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let spans = vec![
        Span::styled(format!("{:<7}", label), theme::current().dim),
        Span::styled(format!("{}{}", value, cursor), style),
    ];

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
