//! Persistence for todos and the completion streak.
//!
//! [`Storage`] is the contract every store implements. [`SqliteStorage`] keeps
//! both partitions in an embedded database file; [`MemoryStorage`] keeps them in
//! process memory and is what tests use when durability does not matter.

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use std::fs;
use std::path::{Path, PathBuf};
use crate::error::Result;
use crate::models::{Streak, Todo};

/// Key of the streak singleton in the streak partition.
pub const STREAK_KEY: &str = "current";

/// Operations a todo store must provide.
///
/// Writes are atomic: either every change an operation makes is durable, or
/// none is. `update_todo` advances the streak in the same unit of work as the
/// todo write whenever it observes an incomplete-to-complete transition.
pub trait Storage {
    /// Stores a new todo, stamping `created_at` and `updated_at` with the current time.
    fn save_todo(&self, todo: &mut Todo) -> Result<()>;

    /// Fetches a todo, failing with `Error::NotFound` if it is absent.
    fn get_todo(&self, id: &str) -> Result<Todo>;

    /// Every stored todo in canonical order (see [`crate::ordering::canonical_cmp`]).
    fn get_all_todos(&self) -> Result<Vec<Todo>>;

    /// Overwrites a todo, refreshing `updated_at`.
    ///
    /// A missing record is treated as a previously incomplete todo, so the
    /// update also works as an insert.
    fn update_todo(&self, todo: &mut Todo) -> Result<()>;

    /// Removes a todo. Deleting an unknown id is not an error.
    fn delete_todo(&self, id: &str) -> Result<()>;

    /// The streak aggregate, zeroed if nothing has been recorded yet.
    fn get_streak(&self) -> Result<Streak>;

    /// Replaces the stored streak aggregate.
    fn update_streak(&self, streak: &Streak) -> Result<()>;

    /// Releases the store, reporting any error from the final flush.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// True when writing `incoming` over `previous` completes the todo.
pub(crate) fn is_completion(previous: Option<&Todo>, incoming: &Todo) -> bool {
    incoming.completed && !previous.is_some_and(|p| p.completed)
}

/// Returns the path to the todo database file.
///
/// The path is determined in the following order:
/// 1. `TODO_DB` environment variable.
/// 2. `~/.local/share/todostreak/todos.db` (on Linux).
/// 3. `./todos.db` (fallback).
pub fn db_path() -> PathBuf {
    std::env::var("TODO_DB").map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("todostreak");
        p.push("todos.db");
        p
    })
}

/// Deletes the database file and any rollback journal next to it.
pub fn delete_database(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    let mut journal = path.as_os_str().to_owned();
    journal.push("-journal");
    let journal = PathBuf::from(journal);
    if journal.exists() {
        fs::remove_file(journal)?;
    }
    Ok(())
}
