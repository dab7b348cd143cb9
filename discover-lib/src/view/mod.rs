//! View state and the row/column projection derived from it.

mod facets;
mod fuzzy;
mod projection;
mod sort;
mod state;

pub use facets::*;
pub use fuzzy::*;
pub use projection::*;
pub use sort::*;
pub use state::*;
