//! Scroll-triggered loading
//!
//! Decides when the host should ask for the next page. Distances are in host
//! units: pixels for a browser, rows for the terminal shell.

/// Distance from the bottom under which the next page is requested.
pub const DEFAULT_BOTTOM_THRESHOLD: f64 = 50.0;

/// Scroll geometry of the results pane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top.
    pub scroll_offset: f64,
    /// Height of the visible area.
    pub viewport_height: f64,
    /// Height of all rendered content.
    pub content_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_offset: f64, viewport_height: f64, content_height: f64) -> Self {
        Self {
            scroll_offset,
            viewport_height,
            content_height,
        }
    }

    /// Remaining distance between the bottom of the viewport and the end of
    /// the content. Negative when the content does not fill the viewport.
    pub fn distance_to_bottom(&self) -> f64 {
        self.content_height - self.scroll_offset - self.viewport_height
    }

    /// Returns `true` when the bottom is closer than `threshold`.
    pub fn near_bottom(&self, threshold: f64) -> bool {
        self.distance_to_bottom() < threshold
    }
}

/// What prompted a loader evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTrigger {
    /// A scroll event from the user.
    Scroll,
    /// Evaluation after a data update, without any scrolling.
    Eager,
}

/// Inputs the loader needs from the pagination cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoaderInput {
    pub is_fetching: bool,
    pub has_more: bool,
    /// Page 0 of the current query has not resolved yet.
    pub awaiting_first_page: bool,
    /// The last fetch under the current query failed.
    pub failed: bool,
}

/// Returns `true` if the next page should be requested now.
pub fn should_load_more(
    metrics: &ScrollMetrics,
    threshold: f64,
    input: LoaderInput,
    trigger: LoadTrigger,
) -> bool {
    if input.is_fetching || input.awaiting_first_page || !input.has_more {
        return false;
    }
    if input.failed && trigger == LoadTrigger::Eager {
        return false;
    }
    metrics.near_bottom(threshold)
}
