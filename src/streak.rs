use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use log::{debug, info};
use crate::models::Streak;

/// Format of the keys in `Streak::daily_completions`.
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Calendar day that `ts` falls on in `tz`.
pub fn day_bucket<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    ts.with_timezone(tz).date_naive()
}

pub fn day_key(day: NaiveDate) -> String {
    day.format(DAY_KEY_FORMAT).to_string()
}

impl Streak {
    /// Records one incomplete-to-complete transition at `now`, bucketing days
    /// in the local timezone.
    pub fn record_completion(&mut self, now: DateTime<Utc>) {
        self.record_completion_in(now, &Local);
    }

    /// Records one completion with day buckets taken in `tz`.
    ///
    /// Continuity is measured in calendar days between the bucket of the
    /// previous completion and today's bucket, not in elapsed hours: 23:59 and
    /// 00:01 the next day are one day apart.
    ///
    /// A same-day completion leaves the streak as it is, except that a zero
    /// streak becomes 1: a day with a completion always counts toward the run.
    pub fn record_completion_in<Tz: TimeZone>(&mut self, now: DateTime<Utc>, tz: &Tz) {
        let today = day_bucket(now, tz);
        *self.daily_completions.entry(day_key(today)).or_insert(0) += 1;
        self.total_completed += 1;

        match self.last_completed_at {
            None => self.current_streak = 1,
            Some(last) => {
                let elapsed = (today - day_bucket(last, tz)).num_days();
                match elapsed {
                    // same day, or the clock went backwards
                    i64::MIN..=0 => {
                        if self.current_streak == 0 {
                            self.current_streak = 1;
                        }
                    }
                    1 => self.current_streak += 1,
                    _ => {
                        debug!("streak broken after {} days without completions", elapsed);
                        self.current_streak = 1;
                    }
                }
            }
        }
        self.max_streak = self.max_streak.max(self.current_streak);
        self.last_completed_at = Some(now);

        info!(
            "streak advanced: current={} max={} total={}",
            self.current_streak, self.max_streak, self.total_completed
        );
    }

    /// The streak as it stands on `today`: zero once a full day has passed
    /// without a completion, `current_streak` otherwise.
    pub fn active_streak(&self, today: NaiveDate) -> u32 {
        self.active_streak_in(today, &Local)
    }

    pub fn active_streak_in<Tz: TimeZone>(&self, today: NaiveDate, tz: &Tz) -> u32 {
        match self.last_completed_at {
            Some(last) if (today - day_bucket(last, tz)).num_days() <= 1 => self.current_streak,
            _ => 0,
        }
    }

    /// Completions recorded on `day`.
    pub fn completions_on(&self, day: NaiveDate) -> u32 {
        self.daily_completions.get(&day_key(day)).copied().unwrap_or(0)
    }
}
