//! # Column Storage
//!
//! One growable container per leaf of a record.
//!
//! The container kind is pluggable through [`ColumnKind`], whose generic
//! associated type names the container for any leaf type:
//!
//! ```text
//! RecursiveArrays<Entity, VecKind>
//!   column 0: Vec<f32>   physics.position.x
//!   column 1: Vec<f32>   physics.position.y
//!   ...
//! ```
//!
//! Inside the store columns are type-erased behind [`ErasedColumn`] and
//! recovered by downcasting to [`TypedColumn`].

use std::any::Any;
use std::marker::PhantomData;

use super::view::LeafCell;
use crate::schema::{Leaf, SchemaVisitor};

/// A growable, contiguous container for one leaf type.
///
/// Only what the store needs: lock-step growth and shrinkage, dense removal,
/// and slice access.
pub trait Column<T>: Default + Send + Sync + 'static {
    /// Number of stored values.
    fn len(&self) -> usize;

    /// Returns `true` if no values are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of values the container can hold without reallocating.
    fn capacity(&self) -> usize;

    /// Ensures room for at least `capacity` values in total.
    fn reserve_total(&mut self, capacity: usize);

    /// Grows or shrinks to exactly `len` values, filling with `T::default()`.
    fn resize_default(&mut self, len: usize);

    /// Appends a value.
    fn push(&mut self, value: T);

    /// Removes the value at `index`, shifting later values down by one.
    fn remove(&mut self, index: usize) -> T;

    /// Drops values past `len`.
    fn truncate(&mut self, len: usize);

    /// All values as a slice.
    fn as_slice(&self) -> &[T];

    /// All values as a mutable slice.
    fn as_mut_slice(&mut self) -> &mut [T];
}

impl<T: Default + Send + Sync + 'static> Column<T> for Vec<T> {
    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        Vec::capacity(self)
    }

    fn reserve_total(&mut self, capacity: usize) {
        self.reserve(capacity.saturating_sub(Vec::len(self)));
    }

    fn resize_default(&mut self, len: usize) {
        self.resize_with(len, T::default);
    }

    #[inline]
    fn push(&mut self, value: T) {
        Vec::push(self, value);
    }

    #[inline]
    fn remove(&mut self, index: usize) -> T {
        Vec::remove(self, index)
    }

    #[inline]
    fn truncate(&mut self, len: usize) {
        Vec::truncate(self, len);
    }

    #[inline]
    fn as_slice(&self) -> &[T] {
        self
    }

    #[inline]
    fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }
}

/// Chooses the container used for every column of a store.
///
/// # Example
///
/// ```rust,ignore
/// struct BoxedVecKind;
///
/// impl ColumnKind for BoxedVecKind {
///     type Column<T: Leaf> = MyVec<T>;
/// }
/// ```
pub trait ColumnKind: 'static {
    /// The container holding a column of `T`.
    type Column<T: Leaf>: Column<T>;
}

/// Columns backed by `Vec<T>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct VecKind;

impl ColumnKind for VecKind {
    type Column<T: Leaf> = Vec<T>;
}

/// Type-erased view of one column, so a store can hold columns of different
/// leaf types side by side.
pub(crate) trait ErasedColumn: Any + Send + Sync {
    fn len(&self) -> usize;
    fn capacity(&self) -> usize;
    fn reserve_total(&mut self, capacity: usize);
    fn resize_default(&mut self, len: usize);
    fn push_default(&mut self);
    fn remove(&mut self, index: usize);
    fn truncate(&mut self, len: usize);
    fn cell_mut(&mut self, row: usize) -> Option<LeafCell<'_>>;
    fn leaf_type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A column of `T` stored in `K`'s container.
pub(crate) struct TypedColumn<K: ColumnKind, T: Leaf> {
    pub(crate) data: K::Column<T>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ColumnKind, T: Leaf> TypedColumn<K, T> {
    pub(crate) fn new() -> Self {
        Self {
            data: K::Column::<T>::default(),
            _kind: PhantomData,
        }
    }
}

impl<K: ColumnKind, T: Leaf> ErasedColumn for TypedColumn<K, T> {
    #[inline]
    fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.data.capacity()
    }

    fn reserve_total(&mut self, capacity: usize) {
        self.data.reserve_total(capacity);
    }

    fn resize_default(&mut self, len: usize) {
        self.data.resize_default(len);
    }

    fn push_default(&mut self) {
        self.data.push(T::default());
    }

    fn remove(&mut self, index: usize) {
        self.data.remove(index);
    }

    fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    fn cell_mut(&mut self, row: usize) -> Option<LeafCell<'_>> {
        let value: &mut dyn Any = self.data.as_mut_slice().get_mut(row)?;
        Some(LeafCell {
            value,
            type_name: std::any::type_name::<T>(),
        })
    }

    fn leaf_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Builds one empty column per leaf of a record, in flat order.
pub(crate) struct ColumnFactory<K: ColumnKind> {
    pub(crate) columns: Vec<Box<dyn ErasedColumn>>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ColumnKind> ColumnFactory<K> {
    pub(crate) fn new(leaf_count: usize) -> Self {
        Self {
            columns: Vec::with_capacity(leaf_count),
            _kind: PhantomData,
        }
    }
}

impl<K: ColumnKind> SchemaVisitor for ColumnFactory<K> {
    fn enter_aggregate(&mut self, _name: &'static str, _offset: usize, _type_name: &'static str) {}

    fn leave_aggregate(&mut self) {}

    fn leaf<T: Leaf>(&mut self, _name: &'static str, _offset: usize) {
        self.columns.push(Box::new(TypedColumn::<K, T>::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_column_resize_and_remove() {
        let mut column: Vec<u32> = Vec::new();
        Column::resize_default(&mut column, 3);
        assert_eq!(Column::as_slice(&column), &[0, 0, 0]);

        Column::as_mut_slice(&mut column).copy_from_slice(&[1, 2, 3]);
        assert_eq!(Column::remove(&mut column, 1), 2);
        assert_eq!(Column::as_slice(&column), &[1, 3]);

        Column::truncate(&mut column, 1);
        assert_eq!(Column::<u32>::len(&column), 1);
    }

    #[test]
    fn test_vec_column_reserve_total() {
        let mut column: Vec<f32> = vec![1.0; 4];
        column.reserve_total(100);
        assert!(Column::<f32>::capacity(&column) >= 100);
        assert_eq!(Column::<f32>::len(&column), 4);

        // Already large enough: no-op.
        column.reserve_total(2);
        assert_eq!(Column::<f32>::len(&column), 4);
    }

    #[test]
    fn test_typed_column_erasure() {
        let mut column: Box<dyn ErasedColumn> = Box::new(TypedColumn::<VecKind, i64>::new());
        column.push_default();
        column.push_default();
        assert_eq!(column.len(), 2);
        assert_eq!(column.leaf_type_name(), "i64");

        let typed = column
            .as_any_mut()
            .downcast_mut::<TypedColumn<VecKind, i64>>()
            .unwrap();
        typed.data[1] = 42;

        let cell = column.cell_mut(1).unwrap();
        assert_eq!(cell.value.downcast_ref::<i64>(), Some(&42));
        assert!(column.cell_mut(2).is_none());

        assert!(column
            .as_any()
            .downcast_ref::<TypedColumn<VecKind, u64>>()
            .is_none());
    }
}
