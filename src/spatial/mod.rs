//! Cell grid and compact cell-set encoding

pub mod grid;
pub mod ranges;

pub use grid::{Cell, GridDims};
pub use ranges::{compress, expand, merge, Range, RangeSet};
