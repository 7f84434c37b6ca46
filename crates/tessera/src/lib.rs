//! # Tessera
//!
//! Recursive Structure-of-Arrays storage for nested records.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  #[derive(Record)]      tessera_derive                           │
//! │        │  Flatten::walk / Flatten::scatter                       │
//! │        ▼                                                         │
//! │  ┌──────────────┐   ┌────────────────┐   ┌───────────────────┐   │
//! │  │ FlatSchema   │   │ OffsetIndexMap │   │ Columns (K)       │   │
//! │  │ leaf order   │   │ offset → index │   │ one per leaf      │   │
//! │  └──────┬───────┘   └───────┬────────┘   └─────────┬─────────┘   │
//! │         └────────── SchemaLayout ──────────────────┘             │
//! │                          │                                       │
//! │                   RecursiveArrays<S, K>  ──▶  FlatRow / S::Row   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera::prelude::*;
//!
//! #[derive(Record, Default)]
//! #[repr(C)]
//! struct Vec3 {
//!     x: f32,
//!     y: f32,
//!     z: f32,
//! }
//!
//! #[derive(Record, Default)]
//! #[repr(C)]
//! struct Body {
//!     position: Vec3,
//!     speed: Vec3,
//! }
//!
//! let mut bodies = RecursiveArrays::<Body>::new()?;
//! bodies.add_entity(Body::default())?;
//!
//! for y in bodies.components::<f32>(access!(Body, speed.y))? {
//!     *y -= 9.81;
//! }
//! ```

// Lets derive output inside this crate resolve `::tessera` paths.
extern crate self as tessera;

pub use tessera_core::*;
pub use tessera_derive::{Record, RowView};

/// Everything needed to declare records and work with a store.
pub mod prelude {
    pub use crate::{access, field, leaf};
    pub use crate::{
        Field, FlatRow, FromFlatRefs, MemberOffset, Record, RecursiveArrays, RowView,
        StoreConfig, StoreError, StoreResult,
    };
}
