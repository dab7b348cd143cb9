//! Turns application state into a frame of styled lines.
//!
//! Rendering is pure so layout can be tested without a terminal; the
//! terminal module only paints the result.

use crossterm::style::Color;
use discover_lib::view::Pin;
use discover_lib::view::ProjectedColumn;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::app::Focus;
use crate::theme::Palette;

/// Rows taken by the bars above and below the table body.
pub const CHROME_ROWS: u16 = 8;

const TITLE: &str = "DiscoverWeb";
const SEARCH_LABEL: &str = " Search: ";
const FILTER_PROMPT: &str = "> ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
}

impl Span {
    fn new(text: impl Into<String>, fg: Color, bg: Color) -> Self {
        Self {
            text: text.into(),
            fg,
            bg,
            bold: false,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// One screen row. The remainder of the row is painted with `fill`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
    pub fill: Color,
}

impl Line {
    fn new(fill: Color) -> Self {
        Self {
            spans: Vec::new(),
            fill,
        }
    }

    fn push(&mut self, span: Span) {
        self.spans.push(span);
    }

    fn width(&self) -> usize {
        self.spans.iter().map(|span| span.text.width()).sum()
    }

    /// Plain text of the line.
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub lines: Vec<Line>,
    /// Text cursor position, shown only while an input has focus.
    pub cursor: Option<(u16, u16)>,
}

/// Number of table rows that fit in a terminal of `height` rows.
pub fn viewport_rows(height: u16) -> usize {
    usize::from(height.saturating_sub(CHROME_ROWS)).max(1)
}

pub fn render(app: &App, width: u16, height: u16) -> Frame {
    let palette = app.mode().palette();
    let width = usize::from(width);
    let projection = app.projection();
    let selected = projection.column_index(app.selected()).unwrap_or(0);
    let visible = visible_columns(&projection.columns, width, selected);

    let mut cursor = None;
    let mut lines = Vec::with_capacity(usize::from(height));

    lines.push(app_bar(app, &palette, width));

    let (search, search_cursor) = search_line(app, &palette);
    if app.focus() == Focus::Search {
        cursor = Some((search_cursor as u16, lines.len() as u16));
    }
    lines.push(search);

    lines.push(hint_line(app, &palette));
    lines.push(group_line(&projection.columns, &visible, &palette));
    lines.push(header_line(app, &visible, &palette));

    let (filters, filter_cursor) = filter_line(app, &visible, &palette);
    if let Some(x) = filter_cursor {
        cursor = Some((x as u16, lines.len() as u16));
    }
    lines.push(filters);

    let body_rows = viewport_rows(height);
    let rows = projection.rows.iter().skip(app.scroll()).take(body_rows);
    let mut drawn = 0;
    for row in rows {
        let mut line = Line::new(palette.surface);
        for &index in &visible {
            let column = &projection.columns[index];
            let bg = cell_background(column, &palette);
            line.push(Span::new(
                fit(&row.cells[index], usize::from(column.width)),
                palette.text,
                bg,
            ));
            line.push(Span::new(" ", palette.text, bg));
        }
        lines.push(line);
        drawn += 1;
    }
    if drawn == 0 && !app.view().is_fetching() {
        let mut line = Line::new(palette.surface);
        line.push(Span::new(" No rows.", palette.muted, palette.surface));
        lines.push(line);
        drawn += 1;
    }
    for _ in drawn..body_rows {
        lines.push(Line::new(palette.surface));
    }

    lines.push(status_line(app, &palette));
    lines.push(footer_line(app, &palette));

    lines.truncate(usize::from(height));
    Frame { lines, cursor }
}

/// Chooses which columns fit in `width`, in display order.
///
/// Pinned columns are always kept at their edge. Unpinned columns scroll
/// horizontally so that the selected one stays visible.
pub fn visible_columns(columns: &[ProjectedColumn], width: usize, selected: usize) -> Vec<usize> {
    let span = |index: usize| usize::from(columns[index].width) + 1;

    let left: Vec<usize> = (0..columns.len())
        .filter(|&i| columns[i].pin == Pin::Left)
        .collect();
    let right: Vec<usize> = (0..columns.len())
        .filter(|&i| columns[i].pin == Pin::Right)
        .collect();
    let center: Vec<usize> = (0..columns.len())
        .filter(|&i| columns[i].pin == Pin::Unpinned)
        .collect();

    let fixed: usize = left.iter().chain(&right).map(|&i| span(i)).sum();
    let available = width.saturating_sub(fixed);

    let mut start = 0;
    if let Some(position) = center.iter().position(|&i| i == selected) {
        let mut used = 0;
        start = position;
        for k in (0..=position).rev() {
            used += span(center[k]);
            if used > available {
                break;
            }
            start = k;
        }
    }

    let mut chosen = Vec::new();
    let mut used = 0;
    for &index in &center[start.min(center.len())..] {
        if used + span(index) > available {
            break;
        }
        used += span(index);
        chosen.push(index);
    }

    left.into_iter().chain(chosen).chain(right).collect()
}

/// Truncates or pads `text` to exactly `width` columns.
pub fn fit(text: &str, width: usize) -> String {
    let current = text.width();
    if current <= width {
        return format!("{}{}", text, " ".repeat(width - current));
    }
    if width == 0 {
        return String::new();
    }

    let mut result = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        result.push(ch);
        used += w;
    }
    result.push('…');
    used += 1;
    result.push_str(&" ".repeat(width - used));
    result
}

fn cell_background(column: &ProjectedColumn, palette: &Palette) -> Color {
    if column.pin == Pin::Unpinned {
        palette.surface
    } else {
        palette.pinned
    }
}

fn app_bar(app: &App, palette: &Palette, width: usize) -> Line {
    let mut line = Line::new(palette.primary);
    line.push(Span::new(format!(" {}", TITLE), palette.on_primary, palette.primary).bold());

    let actions = format!(
        "^T {}  ^L Clear filters  q Quit ",
        app.mode().toggle_label()
    );
    let gap = width.saturating_sub(line.width() + actions.width());
    line.push(Span::new(" ".repeat(gap), palette.on_primary, palette.primary));
    line.push(Span::new(actions, palette.on_primary, palette.primary));
    line
}

fn search_line(app: &App, palette: &Palette) -> (Line, usize) {
    let mut line = Line::new(palette.background);
    line.push(Span::new(SEARCH_LABEL, palette.muted, palette.background));

    let input = app.search();
    let focused = app.focus() == Focus::Search;
    if input.value().is_empty() && !focused {
        line.push(Span::new(
            "Search all columns... (/)",
            palette.muted,
            palette.background,
        ));
    } else {
        line.push(Span::new(input.value(), palette.text, palette.background));
    }

    let cursor = SEARCH_LABEL.width() + input.value()[..input.cursor()].width();
    (line, cursor)
}

fn hint_line(app: &App, palette: &Palette) -> Line {
    let mut line = Line::new(palette.background);
    let text = match app.focus() {
        Focus::ColumnFilter(_) => {
            let suggestions = app.suggestions();
            if suggestions.is_empty() {
                " Enter/Esc done  ^U clear".to_string()
            } else {
                format!(" Tab: {}   Enter/Esc done  ^U clear", suggestions.join(", "))
            }
        }
        Focus::Search => " Enter/Esc done  ^U clear".to_string(),
        Focus::Table => {
            " ←/→ column  s sort  f filter  [ ] pin  u unpin  < > move  ↑/↓ scroll  r retry"
                .to_string()
        }
    };
    line.push(Span::new(text, palette.muted, palette.background));
    line
}

fn group_line(columns: &[ProjectedColumn], visible: &[usize], palette: &Palette) -> Line {
    let mut line = Line::new(palette.header);
    let mut groups: Vec<(&str, usize)> = Vec::new();
    for &index in visible {
        let column = &columns[index];
        let span = usize::from(column.width) + 1;
        match groups.last_mut() {
            Some((label, width)) if *label == column.group => *width += span,
            _ => groups.push((column.group.as_str(), span)),
        }
    }
    for (label, width) in groups {
        line.push(Span::new(
            fit(label, width.saturating_sub(1)),
            palette.muted,
            palette.header,
        ));
        line.push(Span::new("│", palette.muted, palette.header));
    }
    line
}

fn header_line(app: &App, visible: &[usize], palette: &Palette) -> Line {
    let columns = &app.projection().columns;
    let mut line = Line::new(palette.header);
    for &index in visible {
        let column = &columns[index];
        let mut label = column.header.clone();
        match column.sort {
            Some(sort) if sort.desc => label.push_str(" ▼"),
            Some(_) => label.push_str(" ▲"),
            None => {}
        }
        match column.pin {
            Pin::Left => label.insert_str(0, "⇤ "),
            Pin::Right => label.push_str(" ⇥"),
            Pin::Unpinned => {}
        }

        let bg = if column.id == app.selected() {
            palette.selected
        } else {
            palette.header
        };
        line.push(Span::new(fit(&label, usize::from(column.width)), palette.text, bg).bold());
        line.push(Span::new(" ", palette.text, palette.header));
    }
    line
}

fn filter_line(app: &App, visible: &[usize], palette: &Palette) -> (Line, Option<usize>) {
    let columns = &app.projection().columns;
    let mut line = Line::new(palette.background);
    let mut cursor = None;

    for &index in visible {
        let column = &columns[index];
        let width = usize::from(column.width);

        if app.focus() == Focus::ColumnFilter(column.id) {
            let input = app.column_input();
            let x = line.width() + FILTER_PROMPT.width() + input.value()[..input.cursor()].width();
            cursor = Some(x.min(line.width() + width.saturating_sub(1)));
            let text = format!("{}{}", FILTER_PROMPT, input.value());
            line.push(Span::new(fit(&text, width), palette.text, palette.selected));
        } else if !column.filterable {
            line.push(Span::new(" ".repeat(width), palette.muted, palette.background));
        } else if let Some(value) = &column.filter {
            line.push(Span::new(fit(value, width), palette.primary, palette.background).bold());
        } else {
            line.push(Span::new(fit("filter…", width), palette.muted, palette.background));
        }
        line.push(Span::new(" ", palette.text, palette.background));
    }
    (line, cursor)
}

fn status_line(app: &App, palette: &Palette) -> Line {
    let mut line = Line::new(palette.background);
    let view = app.view();
    if view.is_loading() {
        line.push(Span::new(" Loading...", palette.primary, palette.background));
    } else if view.is_fetching() {
        line.push(Span::new(
            " Fetching more rows...",
            palette.primary,
            palette.background,
        ));
    } else if let Some(failure) = view.failure() {
        line.push(Span::new(
            format!(
                " Failed to load page {}: {}. Press r to retry.",
                failure.page_index + 1,
                failure.message
            ),
            palette.error,
            palette.background,
        ));
    }
    line
}

fn footer_line(app: &App, palette: &Palette) -> Line {
    let totals = app.view().totals();
    let mut line = Line::new(palette.header);
    line.push(Span::new(
        format!(
            " Fetched {} out of {} rows.",
            totals.fetched,
            totals.known.unwrap_or(0)
        ),
        palette.text,
        palette.header,
    ));
    line
}
