//! Request and response shapes for the paginated endpoint.
//!
//! - [`PageRequest`] - the query string sent for one page
//! - [`Page`] - one decoded response page

mod page;
mod params;

pub use page::Page;
pub use params::PageRequest;
