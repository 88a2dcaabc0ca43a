use crossterm::event::KeyEvent;
use log::warn;
use ratatui::widgets::TableState;
use crate::form::{FormOutcome, TodoForm};
use crate::models::{Streak, Todo};
use crate::storage::Storage;

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Adding,
}

pub struct App<'a> {
    storage: &'a dyn Storage,
    pub todos: Vec<Todo>,
    pub streak: Streak,
    pub state: TableState,
    pub input_mode: InputMode,
    pub form: TodoForm,
    pub show_completed: bool,
    /// Last message for the status line, usually a storage error.
    pub status: Option<String>,
}

impl<'a> App<'a> {
    /// Creates a new App instance and loads initial data.
    pub fn new(storage: &'a dyn Storage) -> App<'a> {
        let mut app = App {
            storage,
            todos: Vec::new(),
            streak: Streak::default(),
            state: TableState::default(),
            input_mode: InputMode::Normal,
            form: TodoForm::new(),
            show_completed: false,
            status: None,
        };
        app.reload();
        app
    }

    /// Selects the next todo, wrapping around.
    pub fn next(&mut self) {
        if self.todos.is_empty() { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.todos.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous todo, wrapping around.
    pub fn previous(&mut self) {
        if self.todos.is_empty() { return; }
        let i = match self.state.selected() {
            Some(0) | None => self.todos.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn selected(&self) -> Option<&Todo> {
        self.state.selected().and_then(|i| self.todos.get(i))
    }

    /// Flips the completion state of the selected todo and saves it.
    pub fn toggle_selected(&mut self) {
        let Some(mut todo) = self.selected().cloned() else { return };
        todo.toggle();
        match self.storage.update_todo(&mut todo) {
            Ok(()) => {
                self.status = Some(if todo.completed {
                    format!("Completed '{}'", todo.title)
                } else {
                    format!("Reopened '{}'", todo.title)
                });
            }
            Err(e) => self.report(e),
        }
        self.reload();
    }

    /// Deletes the currently selected todo.
    pub fn delete_selected(&mut self) {
        let Some(todo) = self.selected().cloned() else { return };
        match self.storage.delete_todo(&todo.id) {
            Ok(()) => self.status = Some(format!("Deleted '{}'", todo.title)),
            Err(e) => self.report(e),
        }
        self.reload();
    }

    /// Reloads todos and the streak from storage and keeps the selection in range.
    pub fn reload(&mut self) {
        match self.storage.get_all_todos() {
            Ok(mut todos) => {
                if !self.show_completed {
                    todos.retain(|t| !t.completed);
                }
                self.todos = todos;
            }
            Err(e) => self.report(e),
        }
        match self.storage.get_streak() {
            Ok(streak) => self.streak = streak,
            Err(e) => self.report(e),
        }

        if self.todos.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.todos.len() {
                self.state.select(Some(self.todos.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    /// Toggles the visibility of completed todos.
    pub fn toggle_completed(&mut self) {
        self.show_completed = !self.show_completed;
        self.reload();
    }

    /// Opens an empty creation form.
    pub fn start_add(&mut self) {
        self.form = TodoForm::new();
        self.input_mode = InputMode::Adding;
    }

    /// Routes a key press to the creation form.
    pub fn handle_form_key(&mut self, key: KeyEvent) {
        match self.form.handle_key(key, self.storage) {
            FormOutcome::Editing => {}
            FormOutcome::Cancelled => self.input_mode = InputMode::Normal,
            FormOutcome::Submitted(todo) => {
                self.status = Some(format!("Created '{}'", todo.title));
                self.input_mode = InputMode::Normal;
                self.reload();
            }
        }
    }

    fn report(&mut self, e: crate::error::Error) {
        warn!("storage error in dashboard: {}", e);
        self.status = Some(format!("Error: {}", e));
    }
}
