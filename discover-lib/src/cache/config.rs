//! View configuration

use crate::loader::DEFAULT_BOTTOM_THRESHOLD;

/// Default number of rows requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Configuration for a [`DataView`](crate::DataView).
///
/// # Example
///
/// ```
/// use discover_lib::cache::ViewConfig;
///
/// let config = ViewConfig::default()
///     .with_page_size(25)
///     .with_bottom_threshold(3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    /// Rows requested per page.
    ///
    /// Default: 10
    pub page_size: usize,

    /// Distance from the bottom of the content, in host units, under which a
    /// scroll triggers the next page.
    ///
    /// Default: 50.0
    pub bottom_threshold: f64,

    /// Show the previous query's rows while page 0 of a new query loads.
    ///
    /// Default: true
    pub keep_previous: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            bottom_threshold: DEFAULT_BOTTOM_THRESHOLD,
            keep_previous: true,
        }
    }
}

impl ViewConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size. Zero is raised to one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sets the bottom threshold.
    pub fn with_bottom_threshold(mut self, threshold: f64) -> Self {
        self.bottom_threshold = threshold;
        self
    }

    /// Enables or disables the previous-rows placeholder.
    pub fn with_keep_previous(mut self, keep_previous: bool) -> Self {
        self.keep_previous = keep_previous;
        self
    }
}
