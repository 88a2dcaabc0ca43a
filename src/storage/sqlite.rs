use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{is_completion, Storage, STREAK_KEY};
use crate::error::{Error, Result};
use crate::models::{Streak, Todo};
use crate::ordering::sort_todos;

const TODOS: &str = "todos";
const STREAKS: &str = "streaks";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS todos (key TEXT PRIMARY KEY, value TEXT NOT NULL);
CREATE TABLE IF NOT EXISTS streaks (key TEXT PRIMARY KEY, value TEXT NOT NULL);
";

/// Todo store backed by an embedded SQLite database.
///
/// Each table is a key/value partition holding JSON documents. Writes run in
/// `IMMEDIATE` transactions so a single writer holds the lock from the first
/// read of a read-modify-write until commit.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path`, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<SqliteStorage> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        debug!("opening todo database at {}", path.display());
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        SqliteStorage::init(conn)
    }

    /// Opens a throwaway database that lives only as long as the handle.
    pub fn open_in_memory() -> Result<SqliteStorage> {
        SqliteStorage::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<SqliteStorage> {
        if let Err(e) = conn.execute_batch(SCHEMA) {
            let _ = conn.close();
            return Err(e.into());
        }
        Ok(SqliteStorage { conn: Mutex::new(conn) })
    }

    fn write<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let mut conn = self.conn.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        // dropping tx on error rolls back
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    fn read<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let mut conn = self.conn.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}

fn get_value<T: DeserializeOwned>(conn: &Connection, table: &str, key: &str) -> Result<Option<T>> {
    let raw: Option<String> = conn
        .prepare_cached(&format!("SELECT value FROM {table} WHERE key = ?1"))?
        .query_row(params![key], |row| row.get(0))
        .optional()?;
    match raw {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

fn put_value<T: Serialize>(conn: &Connection, table: &str, key: &str, value: &T) -> Result<()> {
    let data = serde_json::to_string(value)?;
    conn.prepare_cached(&format!(
        "INSERT INTO {table} (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value"
    ))?
    .execute(params![key, data])?;
    Ok(())
}

impl Storage for SqliteStorage {
    fn save_todo(&self, todo: &mut Todo) -> Result<()> {
        debug!("saving todo {}", todo.id);
        let now = Utc::now();
        let stored = Todo { created_at: now, updated_at: now, ..todo.clone() };
        self.write(|tx| put_value(tx, TODOS, &stored.id, &stored))?;
        todo.created_at = now;
        todo.updated_at = now;
        Ok(())
    }

    fn get_todo(&self, id: &str) -> Result<Todo> {
        self.read(|tx| get_value::<Todo>(tx, TODOS, id))?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn get_all_todos(&self) -> Result<Vec<Todo>> {
        let mut todos = self.read(|tx| {
            let mut stmt = tx.prepare_cached(&format!("SELECT value FROM {TODOS}"))?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            let mut todos = Vec::new();
            for row in rows {
                todos.push(serde_json::from_str::<Todo>(&row?)?);
            }
            Ok(todos)
        })?;
        sort_todos(&mut todos);
        debug!("loaded {} todos", todos.len());
        Ok(todos)
    }

    fn update_todo(&self, todo: &mut Todo) -> Result<()> {
        debug!("updating todo {}", todo.id);
        let now = Utc::now();
        let stored = Todo { updated_at: now, ..todo.clone() };
        self.write(|tx| {
            let previous = get_value::<Todo>(tx, TODOS, &stored.id)?;
            put_value(tx, TODOS, &stored.id, &stored)?;

            if is_completion(previous.as_ref(), &stored) {
                let mut streak: Streak = get_value(tx, STREAKS, STREAK_KEY)?.unwrap_or_default();
                streak.record_completion(now);
                put_value(tx, STREAKS, STREAK_KEY, &streak)?;
            }
            Ok(())
        })?;
        todo.updated_at = now;
        Ok(())
    }

    fn delete_todo(&self, id: &str) -> Result<()> {
        debug!("deleting todo {}", id);
        self.write(|tx| {
            tx.execute(&format!("DELETE FROM {TODOS} WHERE key = ?1"), params![id])?;
            Ok(())
        })
    }

    fn get_streak(&self) -> Result<Streak> {
        Ok(self.read(|tx| get_value::<Streak>(tx, STREAKS, STREAK_KEY))?.unwrap_or_default())
    }

    fn update_streak(&self, streak: &Streak) -> Result<()> {
        debug!("overwriting streak aggregate");
        self.write(|tx| put_value(tx, STREAKS, STREAK_KEY, streak))
    }

    fn close(self) -> Result<()> {
        debug!("closing todo database");
        let conn = self.conn.into_inner()?;
        conn.close().map_err(|(_, e)| e.into())
    }
}
