//! # Schema Reflection
//!
//! Everything derived from a record's static shape, computed once per record
//! type and never per access.
//!
//! ## Pipeline
//!
//! ```text
//!   #[derive(Record)]          Flatten::walk
//!   struct Entity { .. }  ───────────────────────┐
//!                                                ▼
//!              ┌──────────────┬──────────────────┬───────────────┐
//!              │ flatten      │ offset_map       │ column factory│
//!              │ FlatSchema   │ OffsetIndexMap   │ (soa::column) │
//!              └──────┬───────┴────────┬─────────┴───────────────┘
//!                     └── SchemaLayout ┘ ── registry (once per type)
//! ```

pub mod flatten;
mod layout;
mod leaf;
pub mod offset_map;
mod reflect;
pub mod registry;

pub use flatten::{flatten, FlatSchema, LeafDescriptor};
pub use layout::SchemaLayout;
pub use leaf::Leaf;
pub use offset_map::{OffsetIndexMap, OffsetMode};
pub use reflect::{walk_root, Flatten, LeafSink, Record, SchemaVisitor};
pub use registry::layout_of;
