//! # Tessera Core
//!
//! Nested records stored as synchronized columns: a Recursive
//! Structure-of-Arrays.
//!
//! A record such as
//!
//! ```text
//! Entity { physics: { position: Vec3, speed: Vec3 }, render: { color: Rgb } }
//! ```
//!
//! is flattened into its leaves (`physics.position.x`, `physics.position.y`,
//! ...) and every leaf gets its own contiguous column. Any field, leaf or
//! nested, is addressed by its byte offset inside the record, so a whole
//! column can be borrowed without copying.
//!
//! ## Architecture Rules
//!
//! 1. **Schema work happens once** - flattening and offset maps are built at
//!    registration, never per access
//! 2. **Columns move in lock-step** - every structural operation touches every
//!    column
//! 3. **Views borrow, never copy** - slices and row views write straight into
//!    the columns
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera::{access, Record, RecursiveArrays};
//!
//! let mut store = RecursiveArrays::<Entity>::new()?;
//! store.add_entity(Entity::default())?;
//! let speed_y = store.components::<f32>(access!(Entity, physics.speed.y))?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod access;
pub mod config;
pub mod error;
pub mod schema;
pub mod soa;

pub use access::{Field, MemberOffset};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use schema::{
    flatten, layout_of, walk_root, FlatSchema, Flatten, Leaf, LeafDescriptor, LeafSink,
    OffsetIndexMap, OffsetMode, Record, SchemaLayout, SchemaVisitor,
};
pub use soa::{Column, ColumnKind, FlatCells, FlatRow, FromFlatRefs, RecursiveArrays, VecKind};
