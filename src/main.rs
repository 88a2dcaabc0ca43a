//! # todostreak
//!
//! A terminal todo tracker with deadlines and a daily completion streak.
//!
//! ## Usage
//!
//! Run without arguments to open the interactive dashboard:
//!
//! ```bash
//! todostreak
//! # or explicitly
//! todostreak ui
//! ```
//!
//! **Dashboard keys**
//! *   `a`: Add a todo (title, description, optional deadline)
//! *   `Space`: Toggle done on the selected todo
//! *   `d`: Delete the selected todo
//! *   `c`: Show/hide completed todos
//! *   `q`: Quit
//!
//! **Command line**
//! ```bash
//! todostreak add "Write report" "Q3 numbers for the team" --deadline 2d
//! todostreak list --all
//! todostreak upcoming --limit 3
//! todostreak done 3f2a        # any unique id prefix
//! todostreak streak
//! ```
//!
//! Deadlines accept `YYYY-MM-DD HH:MM`, `YYYY-MM-DD`, RFC 3339, or offsets
//! like `2d`, `1h 30m`, `1w 2d`.
//!
//! ## Data Storage
//!
//! Todos are kept in an SQLite file in your local data directory
//! (`~/.local/share/todostreak/todos.db` on Linux). Override it with the
//! `TODO_DB` environment variable or `--db`. Set `RUST_LOG` or pass
//! `--verbose` for diagnostics on stderr.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use log::debug;
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process;
use todostreak::commands::*;
use todostreak::logging;
use todostreak::storage::{db_path, SqliteStorage, Storage};
use todostreak::tui::run_tui;

#[derive(Parser)]
#[command(name = "todostreak")]
#[command(about = "Terminal todo tracker with completion streaks", long_about = None)]
struct Cli {
    /// Database file (defaults to $TODO_DB, then the local data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new todo
    Add {
        /// Todo title (quoted if it has spaces)
        title: String,
        /// What needs doing
        description: String,
        /// Deadline, e.g. "2025-11-16 14:30", "2d" or "1h 30m"
        #[arg(short, long)]
        deadline: Option<String>,
    },
    /// List todos, open ones first
    List {
        /// Show completed todos
        #[arg(short, long)]
        all: bool,
    },
    /// Show the nearest deadlines and open todos without one
    Upcoming {
        /// Number of deadlines to show
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
    /// Mark a todo as done
    Done {
        id: String,
    },
    /// Reopen a completed todo
    Undo {
        id: String,
    },
    /// Edit a todo
    Edit {
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// New deadline
        #[arg(short, long, conflicts_with = "clear_deadline")]
        deadline: Option<String>,
        /// Remove the deadline
        #[arg(long)]
        clear_deadline: bool,
    },
    /// Delete a todo
    Delete {
        id: String,
    },
    /// Show the completion streak
    Streak,
    /// Reset the database (delete all todos and streak history)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

fn run(storage: &SqliteStorage, command: Option<Commands>) -> Result<(), Box<dyn Error>> {
    match command {
        Some(Commands::Add { title, description, deadline }) => {
            cmd_add(storage, &title, &description, deadline.as_deref())?;
        }
        Some(Commands::List { all }) => cmd_list(storage, all)?,
        Some(Commands::Upcoming { limit }) => cmd_upcoming(storage, limit)?,
        Some(Commands::Done { id }) => cmd_complete(storage, &id)?,
        Some(Commands::Undo { id }) => cmd_uncomplete(storage, &id)?,
        Some(Commands::Edit { id, title, description, deadline, clear_deadline }) => {
            cmd_edit(storage, &id, title, description, deadline, clear_deadline)?
        }
        Some(Commands::Delete { id }) => cmd_remove(storage, &id)?,
        Some(Commands::Streak) => cmd_streak(storage)?,
        Some(Commands::Ui) | None => run_tui(storage)?,
        Some(Commands::Reset { .. }) | Some(Commands::Completions { .. }) => {}
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let path = cli.db.clone().unwrap_or_else(db_path);
    debug!("using database {}", path.display());

    match cli.command {
        Some(Commands::Reset { force }) => {
            if let Err(e) = cmd_reset(&path, force) {
                eprintln!("Failed to reset database: {}", e);
                process::exit(1);
            }
            return;
        }
        Some(Commands::Completions { ref shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    process::exit(2);
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "todostreak", &mut io::stdout());
            return;
        }
        _ => {}
    }

    let storage = match SqliteStorage::open(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open database {}: {}", path.display(), e);
            process::exit(1);
        }
    };

    let result = run(&storage, cli.command);
    let closed = storage.close();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
    if let Err(e) = closed {
        eprintln!("Failed to close database: {}", e);
        process::exit(1);
    }
}
