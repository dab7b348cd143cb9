//! Pagination cache
//!
//! Accumulates the pages fetched under one [`QueryKey`](crate::view::QueryKey)
//! and guards the one-fetch-at-a-time and drop-stale-results rules.

mod config;
mod pages;

pub use config::*;
pub use pages::*;
