//! Command implementations.

mod search;

pub use search::search;
