//! # Row Views
//!
//! A row view borrows one row's value out of every column at once. It never
//! copies: writing through the view writes the columns.
//!
//! Two shapes exist, chosen once per record through [`Record::Row`]:
//!
//! - [`FlatRow`]: one cell per flat position, addressed by index.
//! - a structured view: a user type mirroring the record's nesting,
//!   built from the flat cells through [`FromFlatRefs`] (usually derived with
//!   `#[derive(RowView)]`).
//!
//! [`Record::Row`]: crate::schema::Record::Row

use std::any::{Any, TypeId};

use crate::error::{StoreError, StoreResult};
use crate::schema::Leaf;

/// A mutable reference to one value in one column, with its type name.
pub(crate) struct LeafCell<'a> {
    pub(crate) value: &'a mut dyn Any,
    pub(crate) type_name: &'static str,
}

/// The cells of one row, consumed front to back while a view is assembled.
pub struct FlatCells<'a> {
    cells: std::vec::IntoIter<LeafCell<'a>>,
    position: usize,
}

impl<'a> FlatCells<'a> {
    pub(crate) fn new(cells: Vec<LeafCell<'a>>) -> Self {
        Self {
            cells: cells.into_iter(),
            position: 0,
        }
    }

    /// Takes the next cell as a `T`.
    ///
    /// Fails with [`StoreError::TypeMismatch`] if the column at this position
    /// does not hold `T`, or [`StoreError::UnknownColumn`] if the row is
    /// exhausted.
    pub fn next_leaf<T: Leaf>(&mut self) -> StoreResult<&'a mut T> {
        let column = self.position;
        self.position += 1;

        let LeafCell { value, type_name } = self
            .cells
            .next()
            .ok_or(StoreError::UnknownColumn { index: column })?;

        value
            .downcast_mut::<T>()
            .ok_or_else(|| StoreError::TypeMismatch {
                column,
                expected: std::any::type_name::<T>(),
                found: type_name,
            })
    }

    /// Number of cells not yet taken.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cells.len()
    }

    fn take_rest(&mut self) -> Vec<LeafCell<'a>> {
        self.position += self.cells.len();
        self.cells.by_ref().collect()
    }
}

/// A type that can be assembled from a row's flat cells.
///
/// Implemented for `&'a mut T` (one leaf), for [`FlatRow`] (all leaves), and
/// by `#[derive(RowView)]` for nested views.
pub trait FromFlatRefs<'a>: Sized {
    /// `false` for views that accept a row of any shape.
    ///
    /// Structured views are checked against the flat schema when the record
    /// is registered.
    const STRUCTURED: bool = true;

    /// Appends the leaf types this view consumes, in order.
    fn describe(out: &mut Vec<TypeId>);

    /// Builds the view from the next cells of `cells`.
    fn from_flat(cells: &mut FlatCells<'a>) -> StoreResult<Self>;
}

impl<'a, T: Leaf> FromFlatRefs<'a> for &'a mut T {
    fn describe(out: &mut Vec<TypeId>) {
        out.push(TypeId::of::<T>());
    }

    #[inline]
    fn from_flat(cells: &mut FlatCells<'a>) -> StoreResult<Self> {
        cells.next_leaf::<T>()
    }
}

/// Every leaf of one row, in flat order.
///
/// The default row of a record without `#[record(view = ...)]`. Cells are
/// type-erased, so each `get`/`get_mut`/`set` checks the leaf type at run time
/// and reports [`StoreError::TypeMismatch`] on a wrong guess. Records that want
/// compile-time typed cells declare a structured view instead.
///
/// # Example
///
/// ```rust,ignore
/// let mut row = store.row(0)?;
/// *row.get_mut::<f32>(4)? += 1.0;
/// ```
pub struct FlatRow<'a> {
    cells: Vec<LeafCell<'a>>,
}

impl FlatRow<'_> {
    /// Number of cells (the record's leaf count).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` for a record without leaves.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reads the cell at flat position `index`.
    pub fn get<T: Leaf>(&self, index: usize) -> StoreResult<&T> {
        let cell = self
            .cells
            .get(index)
            .ok_or(StoreError::UnknownColumn { index })?;
        let found = cell.type_name;
        (*cell.value)
            .downcast_ref::<T>()
            .ok_or_else(|| mismatch::<T>(index, found))
    }

    /// Mutably borrows the cell at flat position `index`.
    pub fn get_mut<T: Leaf>(&mut self, index: usize) -> StoreResult<&mut T> {
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(StoreError::UnknownColumn { index })?;
        let found = cell.type_name;
        cell.value
            .downcast_mut::<T>()
            .ok_or_else(|| mismatch::<T>(index, found))
    }

    /// Overwrites the cell at flat position `index`.
    pub fn set<T: Leaf>(&mut self, index: usize, value: T) -> StoreResult<()> {
        *self.get_mut::<T>(index)? = value;
        Ok(())
    }

    /// Type name of the cell at flat position `index`.
    #[must_use]
    pub fn type_name(&self, index: usize) -> Option<&'static str> {
        self.cells.get(index).map(|cell| cell.type_name)
    }
}

impl<'a> FromFlatRefs<'a> for FlatRow<'a> {
    const STRUCTURED: bool = false;

    fn describe(_out: &mut Vec<TypeId>) {}

    fn from_flat(cells: &mut FlatCells<'a>) -> StoreResult<Self> {
        Ok(Self {
            cells: cells.take_rest(),
        })
    }
}

impl std::fmt::Debug for FlatRow<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.cells.iter().map(|cell| cell.type_name))
            .finish()
    }
}

fn mismatch<T>(column: usize, found: &'static str) -> StoreError {
    StoreError::TypeMismatch {
        column,
        expected: std::any::type_name::<T>(),
        found,
    }
}
