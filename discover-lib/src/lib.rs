//! DiscoverWeb data-browsing core
//!
//! Incremental loading and view-state control for a paginated, sortable,
//! filterable table fed by a remote JSON endpoint. The crate owns the state
//! machines and pure projections; a host (terminal, GUI) owns rendering and
//! drives I/O through [`DataView`].

pub mod api;
pub mod cache;
pub mod error;
pub mod loader;
pub mod model;
pub mod view;

mod client;
mod controller;

pub use client::*;
pub use controller::*;
