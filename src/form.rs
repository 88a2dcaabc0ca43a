//! The todo creation boundary: input validation plus the three-field form the
//! dashboard shows when adding a todo.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::debug;
use crate::deadline::parse_deadline;
use crate::error::{Error, Result};
use crate::models::Todo;
use crate::storage::Storage;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_DEADLINE_LEN: usize = 64;

/// Checks user-supplied text before it becomes a todo.
pub fn validate(title: &str, description: &str) -> Result<()> {
    let title = title.trim();
    let description = description.trim();
    if title.is_empty() {
        return Err(Error::Validation("title is required".into()));
    }
    if description.is_empty() {
        return Err(Error::Validation("description is required".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(Error::Validation(format!(
            "title exceeds maximum length of {} characters",
            MAX_TITLE_LEN
        )));
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(Error::Validation(format!(
            "description exceeds maximum length of {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }
    Ok(())
}

/// Validates the input, resolves the deadline text and saves a new todo.
pub fn create_todo(storage: &dyn Storage, title: &str, description: &str, deadline: &str) -> Result<Todo> {
    validate(title, description)?;
    let deadline = parse_deadline(deadline)?;
    let mut todo = Todo::new(title.trim(), description.trim(), deadline);
    storage.save_todo(&mut todo)?;
    debug!("created todo {}", todo.id);
    Ok(todo)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormField {
    #[default]
    Title,
    Description,
    Deadline,
}

impl FormField {
    fn index(self) -> usize {
        match self {
            FormField::Title => 0,
            FormField::Description => 1,
            FormField::Deadline => 2,
        }
    }

    fn next(self) -> Option<FormField> {
        match self {
            FormField::Title => Some(FormField::Description),
            FormField::Description => Some(FormField::Deadline),
            FormField::Deadline => None,
        }
    }

    fn previous(self) -> Option<FormField> {
        match self {
            FormField::Title => None,
            FormField::Description => Some(FormField::Title),
            FormField::Deadline => Some(FormField::Description),
        }
    }

    /// Maximum number of characters the field accepts.
    pub fn limit(self) -> usize {
        match self {
            FormField::Title => MAX_TITLE_LEN,
            FormField::Description => MAX_DESCRIPTION_LEN,
            FormField::Deadline => MAX_DEADLINE_LEN,
        }
    }
}

/// What the caller should do after a key press.
#[derive(Debug, PartialEq)]
pub enum FormOutcome {
    Editing,
    Cancelled,
    Submitted(Todo),
}

/// State of the "new todo" form.
///
/// The cursor counts characters, not bytes.
#[derive(Debug, Default)]
pub struct TodoForm {
    fields: [String; 3],
    current: FormField,
    cursor: usize,
    error: Option<String>,
}

impl TodoForm {
    pub fn new() -> TodoForm {
        TodoForm::default()
    }

    pub fn current_field(&self) -> FormField {
        self.current
    }

    pub fn value(&self, field: FormField) -> &str {
        &self.fields[field.index()]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Message from the last failed submit, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Applies one key press. `Enter` on the last field submits to `storage`.
    pub fn handle_key(&mut self, key: KeyEvent, storage: &dyn Storage) -> FormOutcome {
        match key.code {
            KeyCode::Esc => return FormOutcome::Cancelled,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return FormOutcome::Cancelled
            }
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_previous(),
            KeyCode::Enter => {
                if self.current_field().next().is_some() {
                    self.focus_next();
                } else {
                    match self.submit(storage) {
                        Ok(todo) => return FormOutcome::Submitted(todo),
                        Err(e) => self.error = Some(e.to_string()),
                    }
                }
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.current_len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.current_len(),
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.insert(c)
            }
            _ => {}
        }
        FormOutcome::Editing
    }

    /// Validates the fields and saves the todo.
    pub fn submit(&mut self, storage: &dyn Storage) -> Result<Todo> {
        let [title, description, deadline] = &self.fields;
        let todo = create_todo(storage, title, description, deadline)?;
        self.error = None;
        Ok(todo)
    }

    fn current_len(&self) -> usize {
        self.value(self.current_field()).chars().count()
    }

    fn focus_next(&mut self) {
        if let Some(next) = self.current_field().next() {
            self.current = next;
            self.cursor = self.current_len();
        }
    }

    fn focus_previous(&mut self) {
        if let Some(previous) = self.current_field().previous() {
            self.current = previous;
            self.cursor = self.current_len();
        }
    }

    fn insert(&mut self, c: char) {
        let field = self.current_field();
        if self.current_len() >= field.limit() {
            return;
        }
        let text = &mut self.fields[field.index()];
        let at = byte_offset(text, self.cursor);
        text.insert(at, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let field = self.current_field();
        let text = &mut self.fields[field.index()];
        let at = byte_offset(text, self.cursor - 1);
        text.remove(at);
        self.cursor -= 1;
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(form: &mut TodoForm, storage: &MemoryStorage, text: &str) {
        for c in text.chars() {
            assert_eq!(form.handle_key(key(KeyCode::Char(c)), storage), FormOutcome::Editing);
        }
    }

    #[test]
    fn validation_rejects_blank_and_oversized_fields() {
        assert!(validate("title", "desc").is_ok());
        assert!(validate("   ", "desc").unwrap_err().is_validation());
        assert!(validate("title", "").unwrap_err().is_validation());
        assert!(validate(&"x".repeat(MAX_TITLE_LEN + 1), "desc").is_err());
        assert!(validate(&"x".repeat(MAX_TITLE_LEN), "desc").is_ok());
        assert!(validate("title", &"y".repeat(MAX_DESCRIPTION_LEN + 1)).is_err());
    }

    #[test]
    fn title_stops_accepting_input_at_limit() {
        let storage = MemoryStorage::new();
        let mut form = TodoForm::new();
        type_text(&mut form, &storage, &"a".repeat(MAX_TITLE_LEN + 5));
        assert_eq!(form.value(FormField::Title).len(), MAX_TITLE_LEN);
    }

    #[test]
    fn cursor_editing_handles_multibyte_text() {
        let storage = MemoryStorage::new();
        let mut form = TodoForm::new();
        type_text(&mut form, &storage, "héllo");
        form.handle_key(key(KeyCode::Home), &storage);
        form.handle_key(key(KeyCode::Right), &storage);
        form.handle_key(key(KeyCode::Right), &storage);
        form.handle_key(key(KeyCode::Backspace), &storage);
        assert_eq!(form.value(FormField::Title), "hllo");
        assert_eq!(form.cursor(), 1);

        type_text(&mut form, &storage, "é");
        form.handle_key(key(KeyCode::End), &storage);
        type_text(&mut form, &storage, "!");
        assert_eq!(form.value(FormField::Title), "héllo!");
    }

    #[test]
    fn navigation_moves_between_fields() {
        let storage = MemoryStorage::new();
        let mut form = TodoForm::new();
        form.handle_key(key(KeyCode::Up), &storage);
        assert_eq!(form.current_field(), FormField::Title);

        form.handle_key(key(KeyCode::Tab), &storage);
        form.handle_key(key(KeyCode::Down), &storage);
        form.handle_key(key(KeyCode::Down), &storage);
        assert_eq!(form.current_field(), FormField::Deadline);

        form.handle_key(key(KeyCode::BackTab), &storage);
        assert_eq!(form.current_field(), FormField::Description);
    }

    #[test]
    fn submit_with_missing_description_keeps_form_open() {
        let storage = MemoryStorage::new();
        let mut form = TodoForm::new();
        type_text(&mut form, &storage, "Buy milk");
        form.handle_key(key(KeyCode::Enter), &storage);
        form.handle_key(key(KeyCode::Enter), &storage);
        let outcome = form.handle_key(key(KeyCode::Enter), &storage);

        assert_eq!(outcome, FormOutcome::Editing);
        assert_eq!(form.error(), Some("description is required"));
        assert!(storage.get_all_todos().unwrap().is_empty());
    }

    #[test]
    fn bad_deadline_is_reported() {
        let storage = MemoryStorage::new();
        let mut form = TodoForm::new();
        type_text(&mut form, &storage, "Buy milk");
        form.handle_key(key(KeyCode::Enter), &storage);
        type_text(&mut form, &storage, "2 litres");
        form.handle_key(key(KeyCode::Enter), &storage);
        type_text(&mut form, &storage, "tomorrowish");

        assert_eq!(form.handle_key(key(KeyCode::Enter), &storage), FormOutcome::Editing);
        assert!(form.error().is_some_and(|e| e.contains("invalid deadline")));
    }

    #[test]
    fn successful_submit_saves_trimmed_todo() {
        let storage = MemoryStorage::new();
        let mut form = TodoForm::new();
        type_text(&mut form, &storage, "  Buy milk ");
        form.handle_key(key(KeyCode::Enter), &storage);
        type_text(&mut form, &storage, "2 litres");
        form.handle_key(key(KeyCode::Enter), &storage);
        type_text(&mut form, &storage, "1h 30m");

        let todo = match form.handle_key(key(KeyCode::Enter), &storage) {
            FormOutcome::Submitted(todo) => todo,
            other => panic!("expected submit, got {:?}", other),
        };
        assert_eq!(todo.title, "Buy milk");
        assert!(todo.deadline.is_some());
        assert_eq!(storage.get_todo(&todo.id).unwrap(), todo);
    }

    #[test]
    fn escape_and_ctrl_c_cancel() {
        let storage = MemoryStorage::new();
        let mut form = TodoForm::new();
        assert_eq!(form.handle_key(key(KeyCode::Esc), &storage), FormOutcome::Cancelled);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(form.handle_key(ctrl_c, &storage), FormOutcome::Cancelled);
    }

    #[test]
    fn control_and_alt_chords_do_not_type() {
        let storage = MemoryStorage::new();
        let mut form = TodoForm::new();
        type_text(&mut form, &storage, "Hi");

        let ctrl_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        let alt_x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT);
        assert_eq!(form.handle_key(ctrl_a, &storage), FormOutcome::Editing);
        assert_eq!(form.handle_key(alt_x, &storage), FormOutcome::Editing);
        assert_eq!(form.value(FormField::Title), "Hi");

        let shift_j = KeyEvent::new(KeyCode::Char('J'), KeyModifiers::SHIFT);
        form.handle_key(shift_j, &storage);
        assert_eq!(form.value(FormField::Title), "HiJ");
    }
}
