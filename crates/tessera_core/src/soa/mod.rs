//! # Columnar Storage
//!
//! The store itself, its pluggable column containers, and the views it hands
//! out over a single row.

pub mod column;
pub mod store;
pub mod view;

pub use column::{Column, ColumnKind, VecKind};
pub use store::RecursiveArrays;
pub use view::{FlatCells, FlatRow, FromFlatRefs};
