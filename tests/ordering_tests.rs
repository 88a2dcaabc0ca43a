use chrono::{Duration, Utc};
use todostreak::models::Todo;
use todostreak::ordering::{sort_todos, top_upcoming, without_deadline};

/// A, B: open with deadlines one and two hours out.
/// C: open without deadline, created after A and B.
/// D: completed.
fn fixture() -> Vec<Todo> {
    let now = Utc::now();
    let make = |id: &str, created: Duration| {
        let mut t = Todo::new(format!("Todo {}", id), "details", None);
        t.id = id.to_string();
        t.created_at = now - created;
        t.updated_at = t.created_at;
        t
    };

    let mut a = make("A", Duration::hours(4));
    a.deadline = Some(now + Duration::hours(1));
    let mut b = make("B", Duration::hours(3));
    b.deadline = Some(now + Duration::hours(2));
    let c = make("C", Duration::hours(1));
    let mut d = make("D", Duration::hours(2));
    d.mark_complete();

    vec![a, b, c, d]
}

fn ids(todos: &[Todo]) -> Vec<&str> {
    todos.iter().map(|t| t.id.as_str()).collect()
}

#[test]
fn test_canonical_order() {
    let mut todos = fixture();
    todos.reverse();
    sort_todos(&mut todos);
    assert_eq!(ids(&todos), ["A", "B", "C", "D"]);
}

#[test]
fn test_canonical_order_ignores_input_order() {
    let expected = {
        let mut todos = fixture();
        sort_todos(&mut todos);
        let owned: Vec<String> = ids(&todos).iter().map(|s| s.to_string()).collect();
        owned
    };
    let mut todos = fixture();
    todos.swap(0, 3);
    todos.swap(1, 2);
    sort_todos(&mut todos);
    assert_eq!(ids(&todos), expected);
}

#[test]
fn test_open_without_deadline_newest_first() {
    let now = Utc::now();
    let mut older = Todo::new("older", "d", None);
    older.created_at = now - Duration::days(2);
    let mut newer = Todo::new("newer", "d", None);
    newer.created_at = now - Duration::days(1);

    let mut todos = vec![older, newer];
    sort_todos(&mut todos);
    assert_eq!(todos[0].title, "newer");
}

#[test]
fn test_top_upcoming_bound() {
    let todos = fixture();
    let top = top_upcoming(&todos, 1);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].id, "A");

    let all: Vec<&str> = top_upcoming(&todos, 10).iter().map(|t| t.id.as_str()).collect();
    assert_eq!(all, ["A", "B"]);
}

#[test]
fn test_top_upcoming_sorts_by_deadline() {
    let mut todos = fixture();
    todos.reverse();
    let top: Vec<&str> = top_upcoming(&todos, 2).iter().map(|t| t.id.as_str()).collect();
    assert_eq!(top, ["A", "B"]);
}

#[test]
fn test_top_upcoming_skips_completed() {
    let mut todos = fixture();
    todos[0].mark_complete();
    let top = top_upcoming(&todos, 5);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].id, "B");
}

#[test]
fn test_without_deadline_keeps_input_order() {
    let mut todos = fixture();
    let mut e = Todo::new("E", "d", None);
    e.id = "E".into();
    todos.insert(0, e);

    let open: Vec<&str> = without_deadline(&todos).iter().map(|t| t.id.as_str()).collect();
    assert_eq!(open, ["E", "C"]);
}
