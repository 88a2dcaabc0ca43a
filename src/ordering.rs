use std::cmp::Ordering;
use crate::models::Todo;

/// Compares two todos for the canonical listing order.
///
/// - Open todos come before completed ones.
/// - Open todos with a deadline come before those without, earliest deadline first.
/// - Remaining ties go to the most recently created todo, then to the id so the
///   order never depends on how the store iterated.
pub fn canonical_cmp(a: &Todo, b: &Todo) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| {
            if a.completed {
                return Ordering::Equal;
            }
            match (a.deadline, b.deadline) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        })
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sorts todos in place into the canonical listing order.
pub fn sort_todos(todos: &mut [Todo]) {
    todos.sort_by(canonical_cmp);
}

/// Open todos with a deadline, soonest first, at most `limit` of them.
pub fn top_upcoming(todos: &[Todo], limit: usize) -> Vec<&Todo> {
    if limit == 0 {
        return Vec::new();
    }
    let mut upcoming: Vec<&Todo> = todos
        .iter()
        .filter(|t| !t.completed && t.deadline.is_some())
        .collect();
    upcoming.sort_by_key(|t| t.deadline);
    upcoming.truncate(limit);
    upcoming
}

/// Open todos without a deadline, in input order.
pub fn without_deadline(todos: &[Todo]) -> Vec<&Todo> {
    todos
        .iter()
        .filter(|t| !t.completed && t.deadline.is_none())
        .collect()
}
