//! Board state and key handling
//!
//! Each relocation key press is one move request to the store; the store
//! decides whether anything changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

use super::event::{Event, EventHandler};
use super::ui::Terminal;
use super::view;
use crate::domain::{BookRecord, MoveOutcome, RemoveOutcome, ShelfKey};
use crate::storage::LibraryStore;

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Waiting for y/n before removing the book with this id
    ConfirmRemove(String),
}

/// Board state
pub struct App {
    store: LibraryStore,

    /// Column with focus
    column: ShelfKey,

    /// Selected row per column, indexed by [`ShelfKey::index`]
    selected: [usize; 3],

    input_mode: InputMode,

    status_message: Option<String>,

    should_quit: bool,
}

impl App {
    pub fn new(store: LibraryStore) -> Self {
        Self {
            store,
            column: ShelfKey::ToRead,
            selected: [0; 3],
            input_mode: InputMode::Normal,
            status_message: None,
            should_quit: false,
        }
    }

    /// Run the main loop until the user quits
    pub fn run(&mut self, terminal: &mut Terminal, events: EventHandler) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;

            match events.next()? {
                Event::Key(key) => self.handle_key(key),
                Event::Resize | Event::Tick => {}
            }
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        view::draw(frame, self);
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.input_mode.clone() {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::ConfirmRemove(id) => self.handle_confirm_key(key, &id),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        self.status_message = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,

            KeyCode::Char('j') | KeyCode::Down => self.select_offset(1),
            KeyCode::Char('k') | KeyCode::Up => self.select_offset(-1),

            KeyCode::Char('h') | KeyCode::Left => {
                if let Some(prev) = self.column.prev() {
                    self.column = prev;
                }
            }
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => {
                if let Some(next) = self.column.next() {
                    self.column = next;
                } else if key.code == KeyCode::Tab {
                    self.column = ShelfKey::ToRead;
                }
            }

            KeyCode::Char('H') | KeyCode::Char('<') => {
                if let Some(target) = self.column.prev() {
                    self.move_selected(target);
                }
            }
            KeyCode::Char('L') | KeyCode::Char('>') => {
                if let Some(target) = self.column.next() {
                    self.move_selected(target);
                }
            }
            KeyCode::Char('1') => self.move_selected(ShelfKey::ToRead),
            KeyCode::Char('2') => self.move_selected(ShelfKey::Reading),
            KeyCode::Char('3') => self.move_selected(ShelfKey::Completed),

            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(book) = self.selected_book().cloned() {
                    self.status_message = Some(format!("Remove '{}'? [y/n]", book.title));
                    self.input_mode = InputMode::ConfirmRemove(book.id.clone());
                }
            }

            KeyCode::Char('r') => self.reload(),

            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, id: &str) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                self.remove(id);
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.status_message = Some("Cancelled".to_string());
            }
            _ => {}
        }
    }

    fn select_offset(&mut self, delta: isize) {
        let len = self.store.count(self.column);
        if len == 0 {
            return;
        }
        let slot = &mut self.selected[self.column.index()];
        *slot = slot.saturating_add_signed(delta).min(len - 1);
    }

    fn clamp_selection(&mut self) {
        for shelf in ShelfKey::ALL {
            let len = self.store.count(shelf);
            let slot = &mut self.selected[shelf.index()];
            *slot = (*slot).min(len.saturating_sub(1));
        }
    }

    fn move_selected(&mut self, target: ShelfKey) {
        let Some(book) = self.selected_book().cloned() else {
            return;
        };

        match self.store.move_book(&book.id, target) {
            MoveOutcome::Moved { to, .. } => {
                self.status_message = Some(format!("Moved '{}' to {}", book.title, to.label()));
            }
            MoveOutcome::AlreadyThere => {
                self.status_message = Some(format!("'{}' is already on {}", book.title, target.label()));
            }
            MoveOutcome::NotFound => {
                self.status_message = Some(format!("'{}' is no longer shelved", book.title));
            }
        }

        self.clamp_selection();
        self.surface_warning();
    }

    fn remove(&mut self, id: &str) {
        let title = self
            .store
            .find(id)
            .map(|b| b.title.clone())
            .unwrap_or_else(|| id.to_string());

        self.status_message = match self.store.remove_book(id, self.column) {
            RemoveOutcome::Removed => Some(format!("Removed '{}'", title)),
            RemoveOutcome::NotFound => Some(format!("'{}' is not on {}", title, self.column.label())),
        };

        self.clamp_selection();
        self.surface_warning();
    }

    fn reload(&mut self) {
        self.status_message = Some(match self.store.reload() {
            Ok(()) => "Reloaded".to_string(),
            Err(e) => format!("Reload failed: {:#}", e),
        });
        self.clamp_selection();
    }

    fn surface_warning(&mut self) {
        if let Some(warning) = self.store.take_warning() {
            self.status_message = Some(format!("Warning: {}", warning));
        }
    }

    pub fn store(&self) -> &LibraryStore {
        &self.store
    }

    pub fn column(&self) -> ShelfKey {
        self.column
    }

    /// Selected row in `shelf`
    pub fn selected_index(&self, shelf: ShelfKey) -> usize {
        self.selected[shelf.index()]
    }

    pub fn selected_book(&self) -> Option<&BookRecord> {
        self.store
            .snapshot(self.column)
            .get(self.selected_index(self.column))
    }

    pub fn input_mode(&self) -> &InputMode {
        &self.input_mode
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(ids: &[(&str, ShelfKey)]) -> App {
        let mut store = LibraryStore::in_memory();
        for (id, shelf) in ids {
            store
                .add_book(BookRecord::new(*id, format!("Book {}", id), "Author", "U"), *shelf)
                .unwrap();
        }
        App::new(store)
    }

    fn ids(app: &App, shelf: ShelfKey) -> Vec<String> {
        app.store().snapshot(shelf).iter().map(|b| b.id.clone()).collect()
    }

    #[test]
    fn quits_on_q_and_ctrl_c() {
        let mut app = app_with(&[]);
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit());

        let mut app = app_with(&[]);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }

    #[test]
    fn column_focus_moves_and_stops_at_edges() {
        let mut app = app_with(&[]);

        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.column(), ShelfKey::ToRead);

        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Char('l')));
        app.handle_key(key(KeyCode::Char('l')));
        assert_eq!(app.column(), ShelfKey::Completed);

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.column(), ShelfKey::ToRead);
    }

    #[test]
    fn selection_is_bounded() {
        let mut app = app_with(&[("a", ShelfKey::ToRead), ("b", ShelfKey::ToRead)]);

        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.selected_index(ShelfKey::ToRead), 0);

        for _ in 0..5 {
            app.handle_key(key(KeyCode::Char('j')));
        }
        assert_eq!(app.selected_index(ShelfKey::ToRead), 1);
        assert_eq!(app.selected_book().unwrap().id, "b");
    }

    #[test]
    fn relocation_keys_move_selected_book() {
        let mut app = app_with(&[("a", ShelfKey::ToRead), ("b", ShelfKey::ToRead)]);

        app.handle_key(key(KeyCode::Char('L')));

        assert_eq!(ids(&app, ShelfKey::ToRead), vec!["b"]);
        assert_eq!(ids(&app, ShelfKey::Reading), vec!["a"]);
        assert_eq!(app.status_message(), Some("Moved 'Book a' to Reading"));
    }

    #[test]
    fn move_left_from_first_column_is_ignored() {
        let mut app = app_with(&[("a", ShelfKey::ToRead)]);

        app.handle_key(key(KeyCode::Char('H')));

        assert_eq!(ids(&app, ShelfKey::ToRead), vec!["a"]);
    }

    #[test]
    fn number_keys_move_directly() {
        let mut app = app_with(&[("a", ShelfKey::ToRead)]);

        app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(ids(&app, ShelfKey::Completed), vec!["a"]);

        // Nothing selected in the now-empty column
        app.handle_key(key(KeyCode::Char('2')));
        assert!(app.store().snapshot(ShelfKey::Reading).is_empty());
    }

    #[test]
    fn redundant_move_reports_already_there() {
        let mut app = app_with(&[("a", ShelfKey::ToRead), ("b", ShelfKey::ToRead)]);

        app.handle_key(key(KeyCode::Char('1')));

        assert_eq!(ids(&app, ShelfKey::ToRead), vec!["a", "b"]);
        assert_eq!(app.status_message(), Some("'Book a' is already on To Read"));
    }

    #[test]
    fn selection_clamps_after_move() {
        let mut app = app_with(&[("a", ShelfKey::ToRead), ("b", ShelfKey::ToRead)]);
        app.handle_key(key(KeyCode::Down));

        app.handle_key(key(KeyCode::Char('>')));

        assert_eq!(app.selected_index(ShelfKey::ToRead), 0);
        assert_eq!(app.selected_book().unwrap().id, "a");
    }

    #[test]
    fn remove_requires_confirmation() {
        let mut app = app_with(&[("a", ShelfKey::ToRead)]);

        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(app.input_mode(), &InputMode::ConfirmRemove("a".to_string()));

        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.input_mode(), &InputMode::Normal);
        assert_eq!(ids(&app, ShelfKey::ToRead), vec!["a"]);

        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Char('y')));
        assert!(app.store().library().is_empty());
        assert_eq!(app.status_message(), Some("Removed 'Book a'"));
    }

    #[test]
    fn remove_on_empty_column_does_nothing() {
        let mut app = app_with(&[("a", ShelfKey::Reading)]);

        app.handle_key(key(KeyCode::Char('x')));

        assert_eq!(app.input_mode(), &InputMode::Normal);
    }

    #[test]
    fn input_mode_default_is_normal() {
        assert_eq!(InputMode::default(), InputMode::Normal);
    }
}
