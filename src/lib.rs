//! # todostreak
//!
//! A personal todo tracker with deadlines and a daily completion streak.
//!
//! Todos and the streak aggregate live in an embedded SQLite database. Marking a
//! todo done advances the streak in the same transaction as the todo write, so
//! the two can never disagree.
//!
//! The crate is split into:
//! *   [`models`]: the `Todo` entity and the `Streak` aggregate.
//! *   [`streak`]: how a completion advances the streak.
//! *   [`ordering`]: listing order and the upcoming/no-deadline views.
//! *   [`storage`]: the `Storage` trait with SQLite and in-memory implementations.
//! *   [`deadline`] and [`form`]: turning user input into a new todo.
//! *   [`commands`] and [`tui`]: the command line and the interactive dashboard.

pub mod commands;
pub mod deadline;
pub mod error;
pub mod form;
pub mod logging;
pub mod models;
pub mod ordering;
pub mod storage;
pub mod streak;
pub mod tui;

pub use error::{Error, Result};
