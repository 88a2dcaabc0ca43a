use std::io::{self, Write};
use std::path::Path;
use chrono::{DateTime, Duration, Local, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use log::{debug, info};
use crate::deadline::parse_deadline;
use crate::error::{Error, Result};
use crate::form::{create_todo, validate};
use crate::models::Todo;
use crate::ordering::{top_upcoming, without_deadline};
use crate::storage::{delete_database, Storage};

/// Adds a new todo.
pub fn cmd_add(storage: &dyn Storage, title: &str, description: &str, deadline: Option<&str>) -> Result<Todo> {
    let todo = create_todo(storage, title, description, deadline.unwrap_or(""))?;
    println!("Todo added (id = {})", todo.short_id());
    Ok(todo)
}

/// Finds the todo whose id is `id` or starts with it.
///
/// A prefix matching more than one todo is rejected.
pub fn resolve_todo(storage: &dyn Storage, id: &str) -> Result<Todo> {
    match storage.get_todo(id) {
        Err(Error::NotFound(_)) => {}
        found => return found,
    }
    let mut matches: Vec<Todo> = storage
        .get_all_todos()?
        .into_iter()
        .filter(|t| t.id.starts_with(id))
        .collect();
    match matches.len() {
        0 => Err(Error::NotFound(id.to_string())),
        1 => Ok(matches.remove(0)),
        n => Err(Error::Validation(format!("id prefix '{}' matches {} todos", id, n))),
    }
}

/// Marks a todo as complete, advancing the streak if it was open.
pub fn cmd_complete(storage: &dyn Storage, id: &str) -> Result<()> {
    let mut todo = resolve_todo(storage, id)?;
    if todo.completed {
        println!("Todo {} is already complete.", todo.short_id());
        return Ok(());
    }
    todo.mark_complete();
    storage.update_todo(&mut todo)?;
    info!("completed todo {}", todo.id);

    let streak = storage.get_streak()?;
    println!(
        "Todo {} marked as complete. Streak: {} day(s).",
        todo.short_id(),
        streak.current_streak
    );
    Ok(())
}

/// Reopens a completed todo. The streak keeps its history.
pub fn cmd_uncomplete(storage: &dyn Storage, id: &str) -> Result<()> {
    let mut todo = resolve_todo(storage, id)?;
    if !todo.completed {
        println!("Todo {} is not complete.", todo.short_id());
        return Ok(());
    }
    todo.mark_incomplete();
    storage.update_todo(&mut todo)?;
    println!("Todo {} reopened.", todo.short_id());
    Ok(())
}

/// Removes a todo from the database by id.
pub fn cmd_remove(storage: &dyn Storage, id: &str) -> Result<()> {
    let todo = resolve_todo(storage, id)?;
    storage.delete_todo(&todo.id)?;
    println!("Todo {} removed.", todo.short_id());
    Ok(())
}

/// Edits an existing todo's details.
pub fn cmd_edit(
    storage: &dyn Storage,
    id: &str,
    title: Option<String>,
    description: Option<String>,
    deadline: Option<String>,
    clear_deadline: bool,
) -> Result<()> {
    let mut todo = resolve_todo(storage, id)?;
    if let Some(t) = title { todo.title = t.trim().to_string(); }
    if let Some(d) = description { todo.description = d.trim().to_string(); }
    if clear_deadline {
        todo.deadline = None;
    } else if let Some(d) = deadline {
        todo.deadline = parse_deadline(&d)?;
    }
    validate(&todo.title, &todo.description)?;
    storage.update_todo(&mut todo)?;
    println!("Todo {} updated.", todo.short_id());
    Ok(())
}

/// Lists todos in canonical order.
///
/// By default, hides completed todos unless `all` is true.
pub fn cmd_list(storage: &dyn Storage, all: bool) -> Result<()> {
    let mut todos = storage.get_all_todos()?;
    if !all {
        todos.retain(|t| !t.completed);
    }
    if todos.is_empty() {
        println!("No todos found.");
        return Ok(());
    }
    let refs: Vec<&Todo> = todos.iter().collect();
    println!("{}", todo_table(&refs, Utc::now()));
    Ok(())
}

/// Shows the `limit` most pressing deadlines, then open todos without one.
pub fn cmd_upcoming(storage: &dyn Storage, limit: usize) -> Result<()> {
    let todos = storage.get_all_todos()?;
    let upcoming = top_upcoming(&todos, limit);
    let open_ended = without_deadline(&todos);
    debug!("{} upcoming, {} without deadline", upcoming.len(), open_ended.len());

    if upcoming.is_empty() {
        println!("No upcoming deadlines.");
    } else {
        println!("Upcoming deadlines");
        println!("{}", todo_table(&upcoming, Utc::now()));
    }
    if !open_ended.is_empty() {
        println!("No deadline");
        println!("{}", todo_table(&open_ended, Utc::now()));
    }
    Ok(())
}

/// Prints the streak aggregate and the last week of completions.
pub fn cmd_streak(storage: &dyn Storage) -> Result<()> {
    let streak = storage.get_streak()?;
    let today = Local::now().date_naive();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec![
            Cell::new("Current").add_attribute(Attribute::Bold),
            Cell::new("Best").add_attribute(Attribute::Bold),
            Cell::new("Total").add_attribute(Attribute::Bold),
            Cell::new("Last Completion").add_attribute(Attribute::Bold),
        ]);
    let active = streak.active_streak(today);
    table.add_row(vec![
        Cell::new(format!("{} day(s)", active)).fg(if active > 0 { Color::Green } else { Color::Reset }),
        Cell::new(format!("{} day(s)", streak.max_streak)),
        Cell::new(streak.total_completed),
        Cell::new(
            streak
                .last_completed_at
                .map(format_timestamp)
                .unwrap_or_else(|| "never".into()),
        ),
    ]);
    println!("{table}");

    let mut week = Table::new();
    week.load_preset(UTF8_FULL)
        .set_header(vec!["Day", "Completed"]);
    for offset in (0..7).rev() {
        let day = today - Duration::days(offset);
        week.add_row(vec![day.format("%a %Y-%m-%d").to_string(), streak.completions_on(day).to_string()]);
    }
    println!("{week}");
    Ok(())
}

/// Resets the database by deleting the database file.
pub fn cmd_reset(path: &Path, force: bool) -> Result<()> {
    if !force {
        print!("Are you sure you want to delete all todos and streak history? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }
    delete_database(path)?;
    println!("Database reset successfully.");
    Ok(())
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Human readable time until a todo's deadline.
pub fn time_left(todo: &Todo, now: DateTime<Utc>) -> String {
    if todo.deadline.is_none() || todo.completed {
        return "-".into();
    }
    if todo.is_overdue_at(now) {
        return "Overdue".into();
    }
    match todo.days_until_deadline_at(now) {
        0 => "Today".into(),
        1 => "1 day".into(),
        d => format!("{} days", d),
    }
}

fn todo_table(todos: &[&Todo], now: DateTime<Utc>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Description").add_attribute(Attribute::Bold),
            Cell::new("Deadline").add_attribute(Attribute::Bold),
            Cell::new("Time Left").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for t in todos {
        let overdue = t.is_overdue_at(now);
        let status = if t.completed { "Done" } else { "Pending" };
        let status_color = if t.completed { Color::Green } else { Color::Yellow };

        table.add_row(vec![
            Cell::new(t.short_id()),
            Cell::new(&t.title),
            Cell::new(&t.description),
            Cell::new(t.deadline.map(format_timestamp).unwrap_or_default()),
            Cell::new(time_left(t, now)).fg(if overdue { Color::Red } else { Color::Reset }),
            Cell::new(status).fg(status_color),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_left_labels() {
        let now = Utc::now();
        let mut todo = Todo::new("t", "d", None);
        assert_eq!(time_left(&todo, now), "-");

        todo.deadline = Some(now + Duration::hours(3));
        assert_eq!(time_left(&todo, now), "Today");

        todo.deadline = Some(now + Duration::hours(30));
        assert_eq!(time_left(&todo, now), "1 day");

        todo.deadline = Some(now + Duration::days(4));
        assert_eq!(time_left(&todo, now), "4 days");

        todo.deadline = Some(now - Duration::hours(1));
        assert_eq!(time_left(&todo, now), "Overdue");
    }
}
