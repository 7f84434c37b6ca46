//! # Type Flattener
//!
//! Turns a nested record type into its Flat Schema: the ordered list of leaf
//! types obtained by inlining every aggregate field, depth-first, in
//! declaration order.
//!
//! ```text
//! struct Foo { x: i32, y: f32, z: Bar }      Flat Schema
//! struct Bar { inner: Inner }           =>   [0] x        i32
//! struct Inner { c: u8 }                     [1] y        f32
//!                                            [2] z.inner.c u8
//! ```

use std::any::TypeId;
use std::collections::HashMap;

use super::leaf::Leaf;
use super::reflect::{walk_root, Flatten, SchemaVisitor};

/// One leaf of a flattened record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafDescriptor {
    /// Dotted path from the root record, e.g. `physics.speed.y`.
    pub path: String,
    /// Byte offset of the field from the start of the root record.
    pub offset: usize,
    /// Identity of the leaf type.
    pub type_id: TypeId,
    /// Name of the leaf type, for diagnostics.
    pub type_name: &'static str,
    /// `size_of` the leaf type.
    pub size: usize,
}

/// The ordered leaf types of a record, plus a table from field path to flat
/// position.
///
/// Aggregate paths resolve to the position of their first leaf.
#[derive(Clone, Debug, Default)]
pub struct FlatSchema {
    leaves: Vec<LeafDescriptor>,
    paths: HashMap<String, usize>,
}

impl FlatSchema {
    /// Number of leaves (and therefore columns).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Returns `true` for a record without leaves.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Descriptor of the leaf at flat position `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LeafDescriptor> {
        self.leaves.get(index)
    }

    /// Iterates leaves in flat order.
    pub fn iter(&self) -> impl Iterator<Item = &LeafDescriptor> {
        self.leaves.iter()
    }

    /// Leaf type identities in flat order.
    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.leaves.iter().map(|leaf| leaf.type_id)
    }

    /// Flat position of a dotted field path.
    #[must_use]
    pub fn position_of_path(&self, path: &str) -> Option<usize> {
        self.paths.get(path).copied()
    }
}

/// Computes the Flat Schema of `R`.
#[must_use]
pub fn flatten<R: Flatten>() -> FlatSchema {
    let mut visitor = Flattener::default();
    walk_root::<R, _>(&mut visitor);
    debug_assert_eq!(visitor.schema.len(), R::LEAF_COUNT);
    visitor.schema
}

#[derive(Default)]
struct Flattener {
    schema: FlatSchema,
    stack: Vec<&'static str>,
}

impl Flattener {
    fn path_to(&self, name: &'static str) -> String {
        self.stack
            .iter()
            .copied()
            .chain(std::iter::once(name))
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl SchemaVisitor for Flattener {
    fn enter_aggregate(&mut self, name: &'static str, _offset: usize, _type_name: &'static str) {
        let path = self.path_to(name);
        if !path.is_empty() {
            self.schema.paths.insert(path, self.schema.leaves.len());
        }
        self.stack.push(name);
    }

    fn leave_aggregate(&mut self) {
        self.stack.pop();
    }

    fn leaf<T: Leaf>(&mut self, name: &'static str, offset: usize) {
        let path = self.path_to(name);
        self.schema.paths.insert(path.clone(), self.schema.leaves.len());
        self.schema.leaves.push(LeafDescriptor {
            path,
            offset,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            size: std::mem::size_of::<T>(),
        });
    }
}
