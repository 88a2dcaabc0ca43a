use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};
use chrono::{Local, Utc};
use crate::commands::{format_timestamp, time_left};
use crate::form::{FormField, TodoForm};
use super::app::{App, InputMode};

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Streak
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Help
        ].as_ref())
        .split(f.area());

    let today = Local::now().date_naive();
    let streak = &app.streak;
    let summary = Line::from(vec![
        Span::styled(
            format!("Streak: {} day(s)", streak.active_streak(today)),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "   Best: {}   Total: {}   Today: {}",
            streak.max_streak,
            streak.total_completed,
            streak.completions_on(today)
        )),
    ]);
    f.render_widget(
        Paragraph::new(summary).block(Block::default().borders(Borders::ALL).title("Progress")),
        chunks[0],
    );

    let now = Utc::now();
    let rows: Vec<Row> = app
        .todos
        .iter()
        .map(|t| {
            let style = if t.completed {
                Style::default().fg(Color::DarkGray)
            } else if t.is_overdue_at(now) {
                Style::default().fg(Color::Red)
            } else if t.deadline.is_some() && t.days_until_deadline_at(now) == 0 {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(t.short_id().to_string()),
                Cell::from(t.title.clone()),
                Cell::from(t.deadline.map(format_timestamp).unwrap_or_default()),
                Cell::from(time_left(t, now)),
                Cell::from(if t.completed { "Done" } else { "Pending" }),
            ]).style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(9),
        Constraint::Min(20),
        Constraint::Length(17),
        Constraint::Length(10),
        Constraint::Length(8),
    ];

    let title = if app.show_completed { "Todos (all)" } else { "Todos" };
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["ID", "Title", "Deadline", "Time Left", "Status"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[1], &mut app.state);

    let help_text = match app.input_mode {
        InputMode::Normal => "q: Quit | a: Add | Space: Toggle Done | d: Del | c: Show/Hide Done | j/k: Move",
        InputMode::Adding => "Tab/↓: Next field | Shift+Tab/↑: Previous field | Enter: Next/Submit | Esc: Cancel",
    };
    let help_line = match &app.status {
        Some(status) if app.input_mode == InputMode::Normal => format!("{}  ·  {}", status, help_text),
        _ => help_text.to_string(),
    };

    let help = Paragraph::new(help_line)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[2]);

    if app.input_mode == InputMode::Adding {
        render_form(f, &app.form);
    }
}

fn render_form(f: &mut Frame, form: &TodoForm) {
    let area = centered_rect(60, 13, f.area());
    f.render_widget(Clear, area);
    f.render_widget(Block::default().borders(Borders::ALL).title("Create New Todo"), area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ].as_ref())
        .split(area);

    let fields = [
        (FormField::Title, "Title *"),
        (FormField::Description, "Description *"),
        (FormField::Deadline, "Deadline (e.g. 2025-11-16 14:30, 2d, 1h 30m)"),
    ];
    for (i, (field, label)) in fields.into_iter().enumerate() {
        let value = form.value(field);
        let active = form.current_field() == field;
        let content = if active { with_cursor(value, form.cursor()) } else { value.to_string() };
        let border = if active { Color::Magenta } else { Color::DarkGray };
        let title = if field == FormField::Deadline {
            label.to_string()
        } else {
            format!("{} ({}/{})", label, value.chars().count(), field.limit())
        };
        let input = Paragraph::new(content)
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(border)).title(title));
        f.render_widget(input, inner[i]);
    }

    if let Some(err) = form.error() {
        let error = Paragraph::new(format!("Error: {}", err)).style(Style::default().fg(Color::Red));
        f.render_widget(error, inner[3]);
    }
}

fn with_cursor(text: &str, cursor: usize) -> String {
    let mut out: String = text.chars().take(cursor).collect();
    out.push('█');
    out.extend(text.chars().skip(cursor));
    out
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
