//! Application state and input handling.
//!
//! Everything here is synchronous: handlers return the fetches to start and
//! the event loop in `main.rs` runs them.

use std::time::Duration;
use std::time::Instant;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use discover_lib::DataView;
use discover_lib::FetchRequest;
use discover_lib::api::query::Page;
use discover_lib::cache::FetchTicket;
use discover_lib::cache::ViewConfig;
use discover_lib::error::FetchError;
use discover_lib::loader::ScrollMetrics;
use discover_lib::model::ColumnId;
use discover_lib::view::Pin;
use discover_lib::view::Projection;
use discover_lib::view::ViewAction;
use log::debug;
use log::info;

use crate::input::DebouncedInput;
use crate::theme::ThemeMode;

/// Rows scrolled per mouse wheel notch.
const WHEEL_STEP: usize = 3;

/// Maximum filter suggestions shown for a column.
pub const MAX_SUGGESTIONS: usize = 5;

/// Which element receives typed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Table,
    Search,
    ColumnFilter(ColumnId),
}

pub struct App {
    view: DataView,
    projection: Projection,
    mode: ThemeMode,
    focus: Focus,
    search: DebouncedInput,
    column_input: DebouncedInput,
    selected: ColumnId,
    scroll: usize,
    viewport_rows: usize,
    should_quit: bool,
}

impl App {
    pub fn new(config: ViewConfig, debounce: Duration, mode: ThemeMode) -> Self {
        let view = DataView::new(config);
        let projection = view.projection();
        let selected = projection
            .columns
            .first()
            .map(|column| column.id)
            .unwrap_or(ColumnId::Id);
        Self {
            view,
            projection,
            mode,
            focus: Focus::Table,
            search: DebouncedInput::new(debounce),
            column_input: DebouncedInput::new(debounce),
            selected,
            scroll: 0,
            viewport_rows: 1,
            should_quit: false,
        }
    }

    pub fn view(&self) -> &DataView {
        &self.view
    }

    /// Render plan for the current state, refreshed after every change.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn search(&self) -> &DebouncedInput {
        &self.search
    }

    pub fn column_input(&self) -> &DebouncedInput {
        &self.column_input
    }

    pub fn selected(&self) -> ColumnId {
        self.selected
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn viewport_rows(&self) -> usize {
        self.viewport_rows
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Filter suggestions for the column being edited.
    pub fn suggestions(&self) -> Vec<String> {
        let Focus::ColumnFilter(column) = self.focus else {
            return Vec::new();
        };
        self.view
            .facets(column)
            .suggestions(self.column_input.value(), MAX_SUGGESTIONS)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Starts loading.
    pub fn mount(&mut self) -> Vec<FetchRequest> {
        info!("Mounting view");
        self.view.mount().into_iter().collect()
    }

    /// Records the number of table rows that fit on screen.
    pub fn resize(&mut self, viewport_rows: usize) -> Vec<FetchRequest> {
        self.viewport_rows = viewport_rows.max(1);
        self.clamp_scroll();
        self.view.on_data_update(self.metrics()).into_iter().collect()
    }

    /// Applies debounced input whose delay has elapsed.
    pub fn tick(&mut self, now: Instant) -> Vec<FetchRequest> {
        let mut fetches = Vec::new();
        if let Some(value) = self.search.poll(now) {
            fetches.extend(self.apply(ViewAction::SetGlobalFilter(value)));
        }
        if let Focus::ColumnFilter(column) = self.focus
            && let Some(value) = self.column_input.poll(now)
        {
            fetches.extend(self.apply(ViewAction::SetColumnFilter(column, value)));
        }
        fetches
    }

    /// Earliest pending debounce deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        let column = match self.focus {
            Focus::ColumnFilter(_) => self.column_input.deadline(),
            _ => None,
        };
        match (self.search.deadline(), column) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Feeds a finished fetch back and re-evaluates the loader.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page, FetchError>,
    ) -> Vec<FetchRequest> {
        match self.view.complete(ticket, result) {
            Ok(completion) => debug!("Fetch completed: {:?}", completion),
            Err(e) => debug!("Fetch error surfaced: {}", e),
        }
        self.refresh();
        self.view.on_data_update(self.metrics()).into_iter().collect()
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Vec<FetchRequest> {
        match mouse.kind {
            MouseEventKind::ScrollDown => self.scroll_by(WHEEL_STEP as isize),
            MouseEventKind::ScrollUp => self.scroll_by(-(WHEEL_STEP as isize)),
            _ => Vec::new(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Vec<FetchRequest> {
        if key.kind == KeyEventKind::Release {
            return Vec::new();
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => {
                self.should_quit = true;
                return Vec::new();
            }
            KeyCode::Char('t') if ctrl => {
                self.mode = self.mode.toggle();
                info!("Theme switched to {:?}", self.mode);
                return Vec::new();
            }
            KeyCode::Char('l') if ctrl => return self.clear_filters(),
            _ => {}
        }

        match self.focus {
            Focus::Table => self.handle_table_key(key),
            Focus::Search | Focus::ColumnFilter(_) => self.handle_text_key(key, now),
        }
    }

    fn handle_table_key(&mut self, key: KeyEvent) -> Vec<FetchRequest> {
        let page = self.viewport_rows as isize;
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Vec::new()
            }
            KeyCode::Char('/') => {
                self.focus = Focus::Search;
                Vec::new()
            }
            KeyCode::Char('f') => {
                self.focus_column_filter();
                Vec::new()
            }
            KeyCode::Left => {
                self.select_relative(-1);
                Vec::new()
            }
            KeyCode::Right => {
                self.select_relative(1);
                Vec::new()
            }
            KeyCode::Char('s') => self.toggle_sort(),
            KeyCode::Char('[') => self.pin(Pin::Left),
            KeyCode::Char(']') => self.pin(Pin::Right),
            KeyCode::Char('u') => self.pin(Pin::Unpinned),
            KeyCode::Char('<') => self.move_selected(-1),
            KeyCode::Char('>') => self.move_selected(1),
            KeyCode::Char('r') => self.retry(),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-page),
            KeyCode::PageDown => self.scroll_by(page),
            KeyCode::Home => self.scroll_by(-(self.scroll as isize)),
            KeyCode::End => self.scroll_by(self.projection.rows.len() as isize),
            _ => Vec::new(),
        }
    }

    fn handle_text_key(&mut self, key: KeyEvent, now: Instant) -> Vec<FetchRequest> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let focus = self.focus;
        let input = match focus {
            Focus::Search => &mut self.search,
            _ => &mut self.column_input,
        };

        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                let flushed = input.flush();
                self.focus = Focus::Table;
                return match flushed {
                    Some(value) => self.commit(focus, value),
                    None => Vec::new(),
                };
            }
            KeyCode::Tab => {
                if let Some(first) = self.suggestions().into_iter().next() {
                    self.column_input.set_value(first.clone());
                    return self.commit(focus, first);
                }
            }
            KeyCode::Char('u') if ctrl => input.clear(now),
            KeyCode::Char(c) if !ctrl => input.insert_char(c, now),
            KeyCode::Backspace => input.delete_char_before(now),
            KeyCode::Delete => input.delete_char_at(now),
            KeyCode::Left => input.cursor_left(),
            KeyCode::Right => input.cursor_right(),
            KeyCode::Home => input.cursor_home(),
            KeyCode::End => input.cursor_end(),
            _ => {}
        }
        Vec::new()
    }

    fn commit(&mut self, focus: Focus, value: String) -> Vec<FetchRequest> {
        match focus {
            Focus::Search => self.apply(ViewAction::SetGlobalFilter(value)),
            Focus::ColumnFilter(column) => self.apply(ViewAction::SetColumnFilter(column, value)),
            Focus::Table => Vec::new(),
        }
    }

    fn focus_column_filter(&mut self) {
        let Some(def) = self.view.columns().leaf(self.selected) else {
            return;
        };
        if !def.filterable {
            return;
        }
        let current = self.view.state().filter_of(self.selected).unwrap_or("");
        self.column_input.set_value(current.to_string());
        self.focus = Focus::ColumnFilter(self.selected);
    }

    fn clear_filters(&mut self) -> Vec<FetchRequest> {
        self.search.set_value("");
        self.column_input.set_value("");
        self.focus = Focus::Table;
        self.apply(ViewAction::ClearFilters)
    }

    fn toggle_sort(&mut self) -> Vec<FetchRequest> {
        let sortable = self.view.columns().leaf(self.selected).is_some_and(|def| def.sortable);
        if !sortable {
            return Vec::new();
        }
        self.apply(ViewAction::ToggleSort(self.selected))
    }

    fn pin(&mut self, pin: Pin) -> Vec<FetchRequest> {
        let pinnable = self.view.columns().leaf(self.selected).is_some_and(|def| def.pinnable);
        if !pinnable {
            return Vec::new();
        }
        self.apply(ViewAction::SetPin(self.selected, pin))
    }

    fn retry(&mut self) -> Vec<FetchRequest> {
        let fetch = self.view.retry();
        if fetch.is_some() {
            info!("Retrying failed fetch");
        }
        self.refresh();
        fetch.into_iter().collect()
    }

    fn select_relative(&mut self, delta: isize) {
        let columns = &self.projection.columns;
        let Some(current) = self.projection.column_index(self.selected) else {
            return;
        };
        let next = (current as isize + delta).clamp(0, columns.len() as isize - 1);
        self.selected = columns[next as usize].id;
    }

    /// Swaps the selected column with its neighbour in display order.
    fn move_selected(&mut self, delta: isize) -> Vec<FetchRequest> {
        let mut order: Vec<ColumnId> = self.projection.columns.iter().map(|c| c.id).collect();
        let Some(current) = order.iter().position(|id| *id == self.selected) else {
            return Vec::new();
        };
        let target = current as isize + delta;
        if target < 0 || target >= order.len() as isize {
            return Vec::new();
        }
        order.swap(current, target as usize);
        self.apply(ViewAction::SetColumnOrder(order))
    }

    fn apply(&mut self, action: ViewAction) -> Vec<FetchRequest> {
        debug!("Applying {:?}", action);
        let outcome = self.view.apply(action);
        if !outcome.changed {
            return Vec::new();
        }
        if outcome.fetch.is_some() {
            self.scroll = 0;
        }
        self.refresh();
        outcome.fetch.into_iter().collect()
    }

    fn scroll_by(&mut self, delta: isize) -> Vec<FetchRequest> {
        let target = (self.scroll as isize + delta).max(0) as usize;
        self.scroll = target;
        self.clamp_scroll();
        self.view.on_scroll(self.metrics()).into_iter().collect()
    }

    fn refresh(&mut self) {
        self.projection = self.view.projection();
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let max = self.projection.rows.len().saturating_sub(self.viewport_rows);
        self.scroll = self.scroll.min(max);
    }

    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(
            self.scroll as f64,
            self.viewport_rows as f64,
            self.projection.rows.len() as f64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use discover_lib::model::Row;
    use discover_lib::model::RowId;

    fn app() -> App {
        App::new(
            ViewConfig::default().with_bottom_threshold(3.0),
            Duration::from_millis(500),
            ThemeMode::Light,
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn page(start: usize, n: usize, count: usize) -> Page {
        let rows = (start..start + n)
            .map(|i| Row {
                id: RowId::new(i.to_string()),
                firstname: format!("Name{i}"),
                lastname: format!("Last{i}"),
                address: String::new(),
                state: if i % 2 == 0 { "Ohio" } else { "Texas" }.to_string(),
                phone: String::new(),
            })
            .collect();
        Page::new(rows, count)
    }

    fn loaded(viewport: usize) -> App {
        let mut app = app();
        let fetch = app.mount().pop().unwrap();
        app.resize(viewport);
        app.complete(fetch.ticket, Ok(page(0, 10, 35)));
        app
    }

    #[test]
    fn test_short_page_fetches_eagerly() {
        let mut app = app();
        let fetch = app.mount().pop().unwrap();
        app.resize(30);
        let next = app.complete(fetch.ticket, Ok(page(0, 10, 35)));
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].request.page, 1);
    }

    #[test]
    fn test_scroll_to_bottom_fetches() {
        let mut app = loaded(5);
        assert!(app.handle_key(key(KeyCode::Down), Instant::now()).is_empty());
        let fetches = app.handle_key(key(KeyCode::End), Instant::now());
        assert_eq!(fetches.len(), 1);
        assert_eq!(app.scroll(), 5);
    }

    #[test]
    fn test_search_is_debounced() {
        let mut app = loaded(5);
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('/')), now);
        assert_eq!(app.focus(), Focus::Search);
        for c in "ann".chars() {
            assert!(app.handle_key(key(KeyCode::Char(c)), now).is_empty());
        }
        assert!(app.tick(now + Duration::from_millis(100)).is_empty());

        let fetches = app.tick(now + Duration::from_millis(500));
        assert_eq!(fetches.len(), 1);
        assert_eq!(fetches[0].request.search.as_deref(), Some("ann"));
        assert_eq!(app.view().state().global_filter, "ann");
    }

    #[test]
    fn test_escape_applies_pending_text() {
        let mut app = loaded(5);
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('f')), now);
        assert_eq!(app.focus(), Focus::ColumnFilter(ColumnId::Id));
        app.handle_key(key(KeyCode::Char('7')), now);
        let fetches = app.handle_key(key(KeyCode::Esc), now);
        assert_eq!(fetches.len(), 1);
        assert_eq!(app.view().state().filter_of(ColumnId::Id), Some("7"));
        assert_eq!(app.focus(), Focus::Table);
    }

    #[test]
    fn test_tab_accepts_suggestion() {
        let mut app = loaded(5);
        let now = Instant::now();
        for _ in 0..4 {
            app.handle_key(key(KeyCode::Right), now);
        }
        assert_eq!(app.selected(), ColumnId::State);
        app.handle_key(key(KeyCode::Char('f')), now);
        app.handle_key(key(KeyCode::Char('t')), now);
        assert_eq!(app.suggestions(), vec!["Texas".to_string()]);

        let fetches = app.handle_key(key(KeyCode::Tab), now);
        assert_eq!(fetches.len(), 1);
        assert_eq!(app.view().state().filter_of(ColumnId::State), Some("Texas"));
    }

    #[test]
    fn test_sort_and_pin_selected_column() {
        let mut app = loaded(5);
        let now = Instant::now();
        app.handle_key(key(KeyCode::Right), now);
        let fetches = app.handle_key(key(KeyCode::Char('s')), now);
        assert_eq!(fetches.len(), 1);
        assert_eq!(
            fetches[0].request.sort.map(|s| s.column),
            Some(ColumnId::FirstName)
        );

        assert!(app.handle_key(key(KeyCode::Char(']')), now).is_empty());
        let last = app.projection().columns.last().unwrap();
        assert_eq!(last.id, ColumnId::FirstName);
        assert_eq!(last.pin, Pin::Right);
    }

    #[test]
    fn test_move_column() {
        let mut app = loaded(5);
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('>')), now);
        let ids: Vec<ColumnId> = app.projection().columns.iter().map(|c| c.id).collect();
        assert_eq!(&ids[..2], &[ColumnId::FirstName, ColumnId::Id]);
        assert_eq!(app.selected(), ColumnId::Id);
    }

    #[test]
    fn test_clear_filters_resets_inputs() {
        let mut app = loaded(5);
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('/')), now);
        app.handle_key(key(KeyCode::Char('x')), now);
        app.handle_key(key(KeyCode::Enter), now);
        assert_eq!(app.view().state().global_filter, "x");

        let fetches = app.handle_key(ctrl('l'), now);
        assert_eq!(fetches.len(), 1);
        assert_eq!(app.search().value(), "");
        assert!(app.view().state().global_filter.is_empty());
    }

    #[test]
    fn test_theme_toggle_and_quit() {
        let mut app = loaded(5);
        let now = Instant::now();
        app.handle_key(ctrl('t'), now);
        assert_eq!(app.mode(), ThemeMode::Dark);
        app.handle_key(key(KeyCode::Char('q')), now);
        assert!(app.should_quit());
    }

    #[test]
    fn test_retry_after_failure() {
        let mut app = app();
        let fetch = app.mount().pop().unwrap();
        app.resize(5);
        let next = app.complete(fetch.ticket, Err(FetchError::http(500, "down")));
        assert!(next.is_empty());
        assert!(app.view().failure().is_some());

        let fetches = app.handle_key(key(KeyCode::Char('r')), Instant::now());
        assert_eq!(fetches.len(), 1);
        assert_eq!(fetches[0].request.page, 0);
    }
}
