//! # Schema Layout
//!
//! Everything the store needs to know about one record type, computed once:
//! the Flat Schema, the offset index map and the field-path table. Building
//! the layout is also where schema violations are caught.

use std::any::TypeId;

use super::flatten::{flatten, FlatSchema};
use super::offset_map::{OffsetIndexMap, OffsetMode};
use super::reflect::Record;
use crate::error::{StoreError, StoreResult};
use crate::soa::view::FromFlatRefs;

/// The registered shape of a record type.
#[derive(Clone, Debug)]
pub struct SchemaLayout {
    name: &'static str,
    size: usize,
    flat: FlatSchema,
    offsets: OffsetIndexMap,
    structured_view: bool,
}

impl SchemaLayout {
    /// Builds and validates the layout of `R`.
    ///
    /// # Errors
    ///
    /// [`StoreError::SchemaViolation`] if the offset map is ambiguous or if
    /// `R`'s structured row view does not consume exactly the flat schema's
    /// leaf types in order.
    pub fn build<R: Record>() -> StoreResult<Self> {
        let name = std::any::type_name::<R>();
        let flat = flatten::<R>();
        let offsets = OffsetIndexMap::build::<R>(OffsetMode::Declared)?;

        if flat.len() != R::LEAF_COUNT || offsets.leaf_count() != R::LEAF_COUNT {
            return Err(StoreError::SchemaViolation {
                schema: name,
                reason: format!(
                    "declares {} leaves but its walk reports {}",
                    R::LEAF_COUNT,
                    flat.len()
                ),
            });
        }

        let structured_view = <R::Row<'static> as FromFlatRefs<'static>>::STRUCTURED;
        if structured_view {
            let mut signature = Vec::with_capacity(flat.len());
            <R::Row<'static> as FromFlatRefs<'static>>::describe(&mut signature);
            check_view_signature(name, &flat, &signature)?;
        }

        Ok(Self {
            name,
            size: std::mem::size_of::<R>(),
            flat,
            offsets,
            structured_view,
        })
    }

    /// Type name of the record.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// `size_of` the record.
    #[inline]
    #[must_use]
    pub const fn record_size(&self) -> usize {
        self.size
    }

    /// Number of leaves, which is also the number of columns.
    #[inline]
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.flat.len()
    }

    /// The ordered leaf types.
    #[inline]
    #[must_use]
    pub const fn flat_schema(&self) -> &FlatSchema {
        &self.flat
    }

    /// The byte offset to flat position lookup.
    #[inline]
    #[must_use]
    pub const fn offset_map(&self) -> &OffsetIndexMap {
        &self.offsets
    }

    /// Whether rows are handed out as a structured view rather than a flat row.
    #[inline]
    #[must_use]
    pub const fn has_structured_view(&self) -> bool {
        self.structured_view
    }

    /// Resolves a byte offset to a flat position.
    #[inline]
    pub fn resolve_offset(&self, offset: usize) -> StoreResult<usize> {
        self.offsets.index_of(offset)
    }

    /// Resolves a dotted field path to a flat position.
    pub fn resolve_path(&self, path: &str) -> StoreResult<usize> {
        self.flat
            .position_of_path(path)
            .filter(|&index| index < self.flat.len())
            .ok_or_else(|| StoreError::UnknownPath {
                path: path.to_owned(),
            })
    }
}

fn check_view_signature(
    schema: &'static str,
    flat: &FlatSchema,
    signature: &[TypeId],
) -> StoreResult<()> {
    if signature.len() != flat.len() {
        return Err(StoreError::SchemaViolation {
            schema,
            reason: format!(
                "row view takes {} leaves, record has {}",
                signature.len(),
                flat.len()
            ),
        });
    }

    for (position, (leaf, &view_type)) in flat.iter().zip(signature).enumerate() {
        if leaf.type_id != view_type {
            return Err(StoreError::SchemaViolation {
                schema,
                reason: format!(
                    "row view position {position} does not reference `{}` ({})",
                    leaf.type_name, leaf.path
                ),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::flatten::tests::Foo;
    use crate::schema::{Flatten, LeafSink, SchemaVisitor};
    use crate::schema::registry::is_registered;
    use crate::soa::view::FlatCells;
    use crate::soa::RecursiveArrays;

    #[derive(Default)]
    #[repr(C)]
    struct Pair {
        a: i32,
        b: f32,
    }

    impl Flatten for Pair {
        const LEAF_COUNT: usize = 2;

        fn walk<V: SchemaVisitor>(visitor: &mut V, name: &'static str, offset: usize) {
            visitor.enter_aggregate(name, offset, "Pair");
            i32::walk(visitor, "a", offset + std::mem::offset_of!(Self, a));
            f32::walk(visitor, "b", offset + std::mem::offset_of!(Self, b));
            visitor.leave_aggregate();
        }

        fn scatter<S: LeafSink>(self, sink: &mut S) {
            self.a.scatter(sink);
            self.b.scatter(sink);
        }
    }

    /// Claims both leaves are `i32`.
    #[allow(dead_code)]
    struct WrongView<'a> {
        a: &'a mut i32,
        b: &'a mut i32,
    }

    impl<'a> FromFlatRefs<'a> for WrongView<'a> {
        fn describe(out: &mut Vec<TypeId>) {
            <&'a mut i32>::describe(out);
            <&'a mut i32>::describe(out);
        }

        fn from_flat(cells: &mut FlatCells<'a>) -> StoreResult<Self> {
            Ok(Self {
                a: FromFlatRefs::from_flat(cells)?,
                b: FromFlatRefs::from_flat(cells)?,
            })
        }
    }

    impl Record for Pair {
        type Row<'a> = WrongView<'a>;
    }

    #[test]
    fn test_layout_of_flat_record() {
        let layout = SchemaLayout::build::<Foo>().unwrap();
        assert_eq!(layout.leaf_count(), 3);
        assert_eq!(layout.record_size(), std::mem::size_of::<Foo>());
        assert!(!layout.has_structured_view());
        assert!(layout.name().ends_with("Foo"));

        assert_eq!(layout.resolve_offset(8).unwrap(), 2);
        assert_eq!(layout.resolve_path("y").unwrap(), 1);
        assert_eq!(
            layout.resolve_path("z.inner.d").unwrap_err(),
            StoreError::UnknownPath {
                path: "z.inner.d".to_owned()
            }
        );
        assert_eq!(layout.offset_map().mode(), OffsetMode::Declared);
        assert_eq!(layout.flat_schema().len(), 3);
    }

    #[test]
    fn test_mismatched_view_blocks_layout() {
        let err = SchemaLayout::build::<Pair>().unwrap_err();
        match err {
            StoreError::SchemaViolation { schema, reason } => {
                assert!(schema.ends_with("Pair"), "{schema}");
                assert!(reason.contains("position 1"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mismatched_view_blocks_store_construction() {
        let err = RecursiveArrays::<Pair>::new().err().unwrap();
        assert!(matches!(err, StoreError::SchemaViolation { .. }), "{err}");
        assert!(!is_registered::<Pair>());

        // Still rejected on the next attempt, not served from the registry.
        assert!(RecursiveArrays::<Pair>::new().is_err());
        assert!(!is_registered::<Pair>());
    }
}
