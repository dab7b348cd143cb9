//! Remote data source access

pub mod query;
mod source;

pub use source::*;
