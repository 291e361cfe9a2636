//! Virtualized log viewer model.
//!
//! Rows have variable heights that are only known once rendered. The
//! viewport keeps an explicit [`RowHeightCache`] of measured heights, falls
//! back to an estimate for the rest, and works out which rows need to be on
//! screen for the current scroll position. Replacing the data set drops the
//! whole cache; appending keeps it.

pub mod cache;
pub mod log_viewport;

pub use cache::RowHeightCache;
pub use log_viewport::LogViewport;
