use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use log::debug;

use super::{is_completion, Storage};
use crate::error::{Error, Result};
use crate::models::{Streak, Todo};
use crate::ordering::sort_todos;

#[derive(Default)]
struct State {
    todos: HashMap<String, Todo>,
    streak: Option<Streak>,
}

/// Non-durable store holding both partitions behind one lock.
///
/// Follows the same rules as [`super::SqliteStorage`], including streak
/// advancement on completion, so it can stand in for it in tests.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }
}

impl Storage for MemoryStorage {
    fn save_todo(&self, todo: &mut Todo) -> Result<()> {
        let mut state = self.state.lock()?;
        let now = Utc::now();
        todo.created_at = now;
        todo.updated_at = now;
        state.todos.insert(todo.id.clone(), todo.clone());
        Ok(())
    }

    fn get_todo(&self, id: &str) -> Result<Todo> {
        let state = self.state.lock()?;
        state.todos.get(id).cloned().ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn get_all_todos(&self) -> Result<Vec<Todo>> {
        let mut todos: Vec<Todo> = self.state.lock()?.todos.values().cloned().collect();
        sort_todos(&mut todos);
        Ok(todos)
    }

    fn update_todo(&self, todo: &mut Todo) -> Result<()> {
        let mut state = self.state.lock()?;
        let now = Utc::now();
        let stored = Todo { updated_at: now, ..todo.clone() };
        if is_completion(state.todos.get(&stored.id), &stored) {
            state.streak.get_or_insert_with(Streak::default).record_completion(now);
        }
        state.todos.insert(stored.id.clone(), stored);
        todo.updated_at = now;
        Ok(())
    }

    fn delete_todo(&self, id: &str) -> Result<()> {
        if self.state.lock()?.todos.remove(id).is_none() {
            debug!("delete of unknown todo {} ignored", id);
        }
        Ok(())
    }

    fn get_streak(&self) -> Result<Streak> {
        Ok(self.state.lock()?.streak.clone().unwrap_or_default())
    }

    fn update_streak(&self, streak: &Streak) -> Result<()> {
        self.state.lock()?.streak = Some(streak.clone());
        Ok(())
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}
