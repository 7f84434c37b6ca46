//! # Offset Index Map
//!
//! Maps the byte offset of any field (leaf or aggregate) to its position in
//! the Flat Schema, so an address-of expression against the record can be
//! turned into a column index in O(1).
//!
//! ```text
//! struct Foo { x: i32, y: f32, z: Bar }     offset : index
//! struct Bar { inner: Inner }                    0 : 0   (root, x)
//! struct Inner { c: u8 }                         4 : 1   (y)
//!                                                8 : 2   (z, z.inner, z.inner.c)
//! ```
//!
//! ## Construction
//!
//! One depth-first walk with two cursors, byte offset and flat index, both
//! starting at zero. Every field records `map[offset] = index`. A leaf then
//! advances both cursors; an aggregate recurses at the same cursor values, so
//! it shares its entry with its first leaf.

use super::leaf::Leaf;
use super::reflect::{walk_root, Flatten, SchemaVisitor};
use crate::error::{StoreError, StoreResult};

/// How the byte cursor moves between fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OffsetMode {
    /// Use each field's real offset, as reported by `offset_of!`.
    ///
    /// Correct for any `#[repr(C)]` record, padded or not.
    Declared,
    /// Advance by `size_of` the previous leaf.
    ///
    /// Only matches the real layout when the record has no padding.
    Packed,
}

/// Lookup from field byte offset to flat position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffsetIndexMap {
    /// Dense table indexed by byte offset. `None` for interior and padding bytes.
    slots: Vec<Option<u32>>,
    leaf_count: usize,
    mode: OffsetMode,
}

impl OffsetIndexMap {
    /// Builds the map for `R`.
    ///
    /// Fails with [`StoreError::SchemaViolation`] if two different flat
    /// positions land on the same byte offset (zero-sized leaves).
    pub fn build<R: Flatten>(mode: OffsetMode) -> StoreResult<Self> {
        let mut builder = OffsetMapBuilder {
            mode,
            slots: vec![None; std::mem::size_of::<R>()],
            cursor_offset: 0,
            cursor_index: 0,
            conflict: None,
        };
        walk_root::<R, _>(&mut builder);

        let schema = std::any::type_name::<R>();
        if let Some(conflict) = builder.conflict {
            return Err(StoreError::SchemaViolation {
                schema,
                reason: conflict.to_string(),
            });
        }

        Ok(Self {
            slots: builder.slots,
            leaf_count: builder.cursor_index,
            mode,
        })
    }

    /// Resolves a byte offset to a flat position.
    ///
    /// Fails with [`StoreError::UnknownMember`] if the offset is not the start
    /// of a field.
    #[inline]
    pub fn index_of(&self, offset: usize) -> StoreResult<usize> {
        match self.slots.get(offset).copied().flatten() {
            Some(index) if (index as usize) < self.leaf_count => Ok(index as usize),
            _ => Err(StoreError::UnknownMember { offset }),
        }
    }

    /// Number of leaves the map resolves to.
    #[inline]
    #[must_use]
    pub const fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// The cursor strategy this map was built with.
    #[inline]
    #[must_use]
    pub const fn mode(&self) -> OffsetMode {
        self.mode
    }

    /// Iterates `(offset, index)` for every recorded key, by ascending offset.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(offset, slot)| slot.map(|index| (offset, index as usize)))
    }
}

#[derive(Debug)]
struct OffsetConflict {
    offset: usize,
    existing: u32,
    incoming: usize,
}

impl std::fmt::Display for OffsetConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "byte offset {} is claimed by flat positions {} and {}",
            self.offset, self.existing, self.incoming
        )
    }
}

struct OffsetMapBuilder {
    mode: OffsetMode,
    slots: Vec<Option<u32>>,
    cursor_offset: usize,
    cursor_index: usize,
    conflict: Option<OffsetConflict>,
}

impl OffsetMapBuilder {
    fn record(&mut self) {
        let offset = self.cursor_offset;
        if offset >= self.slots.len() {
            self.slots.resize(offset + 1, None);
        }

        // Positions past u32::MAX cannot be stored; treat as a collision on the slot.
        let Ok(index) = u32::try_from(self.cursor_index) else {
            self.conflict.get_or_insert(OffsetConflict {
                offset,
                existing: u32::MAX,
                incoming: self.cursor_index,
            });
            return;
        };

        match self.slots[offset] {
            Some(existing) if existing != index => {
                self.conflict.get_or_insert(OffsetConflict {
                    offset,
                    existing,
                    incoming: self.cursor_index,
                });
            }
            _ => self.slots[offset] = Some(index),
        }
    }
}

impl SchemaVisitor for OffsetMapBuilder {
    fn enter_aggregate(&mut self, _name: &'static str, offset: usize, _type_name: &'static str) {
        if self.mode == OffsetMode::Declared {
            self.cursor_offset = offset;
        }
        self.record();
    }

    fn leave_aggregate(&mut self) {}

    fn leaf<T: Leaf>(&mut self, _name: &'static str, offset: usize) {
        if self.mode == OffsetMode::Declared {
            self.cursor_offset = offset;
        }
        self.record();
        self.cursor_index += 1;
        if self.mode == OffsetMode::Packed {
            self.cursor_offset += std::mem::size_of::<T>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::flatten::tests::Foo;
    use crate::schema::LeafSink;

    /// `{ a: u8, b: f32 }` has three padding bytes after `a`.
    #[derive(Default)]
    #[repr(C)]
    struct Padded {
        a: u8,
        b: f32,
    }

    impl Flatten for Padded {
        const LEAF_COUNT: usize = 2;

        fn walk<V: SchemaVisitor>(visitor: &mut V, name: &'static str, offset: usize) {
            visitor.enter_aggregate(name, offset, std::any::type_name::<Self>());
            u8::walk(visitor, "a", offset + std::mem::offset_of!(Self, a));
            f32::walk(visitor, "b", offset + std::mem::offset_of!(Self, b));
            visitor.leave_aggregate();
        }

        fn scatter<S: LeafSink>(self, sink: &mut S) {
            self.a.scatter(sink);
            self.b.scatter(sink);
        }
    }

    #[derive(Default)]
    struct Nothing;

    crate::leaf!(Nothing);

    #[test]
    fn test_declared_map_foo() {
        let map = OffsetIndexMap::build::<Foo>(OffsetMode::Declared).unwrap();
        assert_eq!(map.leaf_count(), 3);
        assert_eq!(map.index_of(0).unwrap(), 0);
        assert_eq!(map.index_of(4).unwrap(), 1);
        assert_eq!(map.index_of(8).unwrap(), 2);
        assert_eq!(map.entries().collect::<Vec<_>>(), vec![(0, 0), (4, 1), (8, 2)]);
    }

    #[test]
    fn test_interior_bytes_are_unknown() {
        let map = OffsetIndexMap::build::<Foo>(OffsetMode::Declared).unwrap();
        for offset in [1, 2, 3, 5, 9, 11, 12, 4096] {
            assert_eq!(
                map.index_of(offset),
                Err(StoreError::UnknownMember { offset })
            );
        }
    }

    #[test]
    fn test_packed_and_declared_agree_without_padding() {
        let packed = OffsetIndexMap::build::<Foo>(OffsetMode::Packed).unwrap();
        let declared = OffsetIndexMap::build::<Foo>(OffsetMode::Declared).unwrap();
        assert_eq!(
            packed.entries().collect::<Vec<_>>(),
            declared.entries().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_packed_diverges_on_padding() {
        let packed = OffsetIndexMap::build::<Padded>(OffsetMode::Packed).unwrap();
        let declared = OffsetIndexMap::build::<Padded>(OffsetMode::Declared).unwrap();

        let b = std::mem::offset_of!(Padded, b);
        assert_eq!(b, 4);
        assert_eq!(declared.index_of(b).unwrap(), 1);
        // The packed cursor puts `b` right after the one-byte `a`.
        assert_eq!(packed.index_of(1).unwrap(), 1);
        assert!(packed.index_of(b).is_err());
    }

    #[test]
    fn test_zero_sized_leaf_is_a_schema_violation() {
        struct Zst {
            marker: Nothing,
            value: u32,
        }

        impl Flatten for Zst {
            const LEAF_COUNT: usize = 2;

            fn walk<V: SchemaVisitor>(visitor: &mut V, name: &'static str, offset: usize) {
                visitor.enter_aggregate(name, offset, "Zst");
                Nothing::walk(visitor, "marker", offset);
                u32::walk(visitor, "value", offset);
                visitor.leave_aggregate();
            }

            fn scatter<S: LeafSink>(self, sink: &mut S) {
                self.marker.scatter(sink);
                self.value.scatter(sink);
            }
        }

        for mode in [OffsetMode::Declared, OffsetMode::Packed] {
            let err = OffsetIndexMap::build::<Zst>(mode).unwrap_err();
            assert!(matches!(err, StoreError::SchemaViolation { .. }), "{err}");
        }
    }

    /// The other construction order: every field bumps the index cursor right
    /// after recording itself, and the next field visited backs it off again
    /// if the bump came from an aggregate.
    struct IncrementThenBackOff {
        slots: Vec<Option<usize>>,
        offset: usize,
        index: usize,
        backoff: usize,
    }

    impl IncrementThenBackOff {
        fn record(&mut self) {
            self.index -= std::mem::take(&mut self.backoff);
            if self.offset >= self.slots.len() {
                self.slots.resize(self.offset + 1, None);
            }
            self.slots[self.offset] = Some(self.index);
            self.index += 1;
        }
    }

    impl SchemaVisitor for IncrementThenBackOff {
        fn enter_aggregate(&mut self, _: &'static str, _: usize, _: &'static str) {
            self.record();
            self.backoff = 1;
        }

        fn leave_aggregate(&mut self) {}

        fn leaf<T: Leaf>(&mut self, _: &'static str, _: usize) {
            self.record();
            self.offset += std::mem::size_of::<T>();
        }
    }

    #[test]
    fn test_increment_then_back_off_agrees() {
        let mut alt = IncrementThenBackOff {
            slots: Vec::new(),
            offset: 0,
            index: 0,
            backoff: 0,
        };
        walk_root::<Foo, _>(&mut alt);
        let alt: Vec<_> = alt
            .slots
            .iter()
            .enumerate()
            .filter_map(|(offset, slot)| slot.map(|index| (offset, index)))
            .collect();

        let canonical = OffsetIndexMap::build::<Foo>(OffsetMode::Packed).unwrap();
        assert_eq!(canonical.entries().collect::<Vec<_>>(), alt);
    }
}
