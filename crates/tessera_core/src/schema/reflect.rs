//! # Structural Reflection
//!
//! The static shape of a record, expressed as traits that `#[derive(Record)]`
//! implements. A schema walk visits fields depth-first in declaration order;
//! every consumer (flattener, offset map, column factory) is a visitor over
//! that one walk, so they can never disagree about leaf order.

use super::leaf::Leaf;
use crate::soa::view::FromFlatRefs;

/// Receives the fields of a record during a schema walk.
pub trait SchemaVisitor {
    /// Called before the fields of an aggregate are walked.
    ///
    /// The root record is reported as an aggregate named `""` at offset 0.
    fn enter_aggregate(&mut self, name: &'static str, offset: usize, type_name: &'static str);

    /// Called after the last field of the current aggregate.
    fn leave_aggregate(&mut self);

    /// Called once per leaf field.
    ///
    /// `offset` is the field's byte offset from the start of the root record.
    fn leaf<T: Leaf>(&mut self, name: &'static str, offset: usize);
}

/// Receives leaf values, in flat order, when a record is taken apart.
pub trait LeafSink {
    /// Accepts the next leaf value.
    fn push<T: Leaf>(&mut self, value: T);
}

/// Static shape of a field type: either a single leaf or a nested aggregate.
///
/// Leaves get this through [`leaf!`](crate::leaf); aggregates through
/// `#[derive(Record)]`.
pub trait Flatten: Sized + 'static {
    /// Number of leaves reachable from this type.
    const LEAF_COUNT: usize;

    /// Reports this type to `visitor` as a field called `name` located at
    /// `offset` bytes from the root record.
    fn walk<V: SchemaVisitor>(visitor: &mut V, name: &'static str, offset: usize);

    /// Moves every leaf value into `sink`, in the same order `walk` reports them.
    fn scatter<S: LeafSink>(self, sink: &mut S);
}

/// A record type that can be stored as columns.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Record, Default)]
/// #[repr(C)]
/// struct Vec3 {
///     x: f32,
///     y: f32,
///     z: f32,
/// }
/// ```
pub trait Record: Flatten {
    /// What [`RecursiveArrays::row`](crate::RecursiveArrays::row) hands out:
    /// [`FlatRow`](crate::FlatRow) unless the record opts into a structured view.
    type Row<'a>: FromFlatRefs<'a>;
}

/// Walks the full schema of `R` starting at the root.
pub fn walk_root<R: Flatten, V: SchemaVisitor>(visitor: &mut V) {
    R::walk(visitor, "", 0);
}
