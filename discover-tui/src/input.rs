//! Debounced text entry for the search boxes.

use std::time::Duration;
use std::time::Instant;

/// Default delay between the last keystroke and the value being applied.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// A single-line text box whose value is released only after typing pauses.
///
/// Edits restart the timer. [`DebouncedInput::poll`] hands out the value once
/// the delay has elapsed and it differs from the last value handed out.
#[derive(Debug, Clone)]
pub struct DebouncedInput {
    value: String,
    /// Byte offset of the cursor in `value`.
    cursor: usize,
    committed: String,
    deadline: Option<Instant>,
    delay: Duration,
}

impl DebouncedInput {
    pub fn new(delay: Duration) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            committed: String::new(),
            deadline: None,
            delay,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replaces the value without scheduling a release.
    ///
    /// Used to mirror external state changes (for example clearing filters).
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
        self.committed = self.value.clone();
        self.deadline = None;
    }

    /// Insert a character at the cursor.
    pub fn insert_char(&mut self, c: char, now: Instant) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        self.touch(now);
    }

    /// Delete the character before the cursor (backspace).
    pub fn delete_char_before(&mut self, now: Instant) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.value[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.value.remove(prev);
        self.cursor = prev;
        self.touch(now);
    }

    /// Delete the character at the cursor (delete key).
    pub fn delete_char_at(&mut self, now: Instant) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
            self.touch(now);
        }
    }

    /// Remove all text.
    pub fn clear(&mut self, now: Instant) {
        if self.value.is_empty() {
            return;
        }
        self.value.clear();
        self.cursor = 0;
        self.touch(now);
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.value[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
    }

    pub fn cursor_right(&mut self) {
        if let Some(c) = self.value[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.value.len();
    }

    /// When the pending value becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the value if the delay has elapsed and it changed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.flush(),
            _ => None,
        }
    }

    /// Releases the pending value immediately.
    pub fn flush(&mut self) -> Option<String> {
        self.deadline = None;
        if self.value == self.committed {
            return None;
        }
        self.committed = self.value.clone();
        Some(self.value.clone())
    }

    fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }
}

impl Default for DebouncedInput {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
