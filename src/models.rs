use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a single todo item.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Todo {
    /// Opaque unique identifier, assigned once at creation.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Optional point in time the todo should be done by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// Whether the todo has been completed.
    #[serde(default)]
    pub completed: bool,
    /// Set iff `completed` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Creates an incomplete todo with a fresh id.
    pub fn new(title: impl Into<String>, description: impl Into<String>, deadline: Option<DateTime<Utc>>) -> Todo {
        let now = Utc::now();
        Todo {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            deadline,
            completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True iff a deadline exists, the todo is open and the deadline has passed.
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Utc::now())
    }

    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if !self.completed => deadline < now,
            _ => false,
        }
    }

    /// Whole days until the deadline, rounded down.
    ///
    /// Returns `-1` when no deadline is set. A passed deadline yields a negative
    /// count, so callers must check `deadline` to tell the two apart.
    pub fn days_until_deadline(&self) -> i64 {
        self.days_until_deadline_at(Utc::now())
    }

    pub fn days_until_deadline_at(&self, now: DateTime<Utc>) -> i64 {
        match self.deadline {
            None => -1,
            Some(deadline) => {
                let delta = deadline - now;
                // num_days truncates toward zero
                let days = delta.num_days();
                if delta < Duration::days(days) {
                    days - 1
                } else {
                    days
                }
            }
        }
    }

    /// Marks the todo done in memory. Persisting it is up to the caller.
    pub fn mark_complete(&mut self) {
        let now = Utc::now();
        self.completed = true;
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    pub fn mark_incomplete(&mut self) {
        self.completed = false;
        self.completed_at = None;
        self.updated_at = Utc::now();
    }

    /// Flips the completion state.
    pub fn toggle(&mut self) {
        if self.completed {
            self.mark_incomplete();
        } else {
            self.mark_complete();
        }
    }

    /// First eight characters of the id, used in listings.
    pub fn short_id(&self) -> &str {
        let end = self.id.char_indices().nth(8).map(|(i, _)| i).unwrap_or(self.id.len());
        &self.id[..end]
    }
}

/// Rolling completion statistics, stored as a singleton.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Streak {
    /// Consecutive days with at least one completion, ending at the latest one.
    pub current_streak: u32,
    /// Highest `current_streak` ever reached.
    pub max_streak: u32,
    /// Time of the completion that last advanced the streak. `None` until the first one.
    #[serde(default)]
    pub last_completed_at: Option<DateTime<Utc>>,
    /// Number of incomplete-to-complete transitions ever recorded.
    pub total_completed: u64,
    /// Completions per day, keyed `YYYY-MM-DD`.
    #[serde(default)]
    pub daily_completions: BTreeMap<String, u32>,
}
