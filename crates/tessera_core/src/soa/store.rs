//! # Recursive Arrays
//!
//! The columnar store. A record type is flattened once into its leaves and
//! every leaf gets its own column; row `i` of the store is the `i`-th value of
//! every column.
//!
//! ```text
//! RecursiveArrays<Foo>          row 0   row 1   row 2
//!   column 0  x: i32            [ 10  ,  20  ,  30  ]
//!   column 1  y: f32            [ 0.5 ,  1.5 ,  2.5 ]
//!   column 2  z.inner.c: u8     [  1  ,   2  ,   3  ]
//! ```
//!
//! ## Invariants
//!
//! - Every column holds exactly `len()` values after every public operation.
//! - Column `i` stores the leaf type at flat position `i`.
//! - Slices and row views borrow the store, so nothing can resize it while
//!   they are alive.

use std::marker::PhantomData;

use super::column::{Column, ColumnFactory, ColumnKind, ErasedColumn, TypedColumn, VecKind};
use super::view::{FlatCells, FromFlatRefs};
use crate::access::{Field, MemberOffset};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::schema::{layout_of, walk_root, Leaf, LeafSink, Record, SchemaLayout};

/// A growable sequence of `S` records stored as one column per leaf.
///
/// `K` picks the container used for the columns; [`VecKind`] by default.
///
/// # Example
///
/// ```rust,ignore
/// let mut store = RecursiveArrays::<Entity>::new()?;
/// store.add_entity(Entity::default())?;
///
/// for y in store.components::<f32>(access!(Entity, physics.speed.y))? {
///     *y += 1.0;
/// }
/// ```
pub struct RecursiveArrays<S: Record, K: ColumnKind = VecKind> {
    columns: Vec<Box<dyn ErasedColumn>>,
    layout: &'static SchemaLayout,
    len: usize,
    config: StoreConfig,
    _schema: PhantomData<fn() -> (S, K)>,
}

impl<S: Record, K: ColumnKind> RecursiveArrays<S, K> {
    /// Creates an empty store with the default configuration.
    ///
    /// # Errors
    ///
    /// [`StoreError::SchemaViolation`] if `S` cannot be laid out as columns.
    pub fn new() -> StoreResult<Self> {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an empty store, pre-allocating `config.initial_capacity` rows.
    ///
    /// # Errors
    ///
    /// [`StoreError::SchemaViolation`] if `S` cannot be laid out as columns.
    pub fn with_config(config: StoreConfig) -> StoreResult<Self> {
        let layout = layout_of::<S>()?;

        let mut factory = ColumnFactory::<K>::new(layout.leaf_count());
        walk_root::<S, _>(&mut factory);

        let mut store = Self {
            columns: factory.columns,
            layout,
            len: 0,
            config,
            _schema: PhantomData,
        };
        if store.config.initial_capacity > 0 {
            store.reserve(store.config.initial_capacity);
        }

        tracing::debug!(
            schema = layout.name(),
            columns = store.columns.len(),
            capacity = store.config.initial_capacity,
            "created columnar store"
        );
        Ok(store)
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the store holds no rows.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of columns, one per leaf of `S`.
    #[inline]
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Rows every column can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.columns
            .iter()
            .map(|column| column.capacity())
            .min()
            .unwrap_or(usize::MAX)
    }

    /// The registered layout of `S`.
    #[inline]
    #[must_use]
    pub const fn schema(&self) -> &'static SchemaLayout {
        self.layout
    }

    /// The configuration this store was created with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    // =========================================================================
    // Structural operations
    // =========================================================================

    /// Makes room for at least `capacity` rows in every column.
    ///
    /// Never changes the row count or any stored value.
    pub fn reserve(&mut self, capacity: usize) {
        for column in &mut self.columns {
            column.reserve_total(capacity);
        }
        if self.config.trace_structural_ops {
            tracing::trace!(schema = self.layout.name(), capacity, "reserve");
        }
    }

    /// Grows or shrinks every column to exactly `len` rows.
    ///
    /// New rows hold the default value of each leaf type.
    pub fn resize(&mut self, len: usize) {
        for column in &mut self.columns {
            column.resize_default(len);
        }
        if self.config.trace_structural_ops {
            tracing::trace!(schema = self.layout.name(), from = self.len, to = len, "resize");
        }
        self.len = len;
    }

    /// Removes every row, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.resize(0);
    }

    /// Appends a default-initialized row and returns its index.
    pub fn create(&mut self) -> usize {
        for column in &mut self.columns {
            column.push_default();
        }
        let row = self.len;
        self.len += 1;
        if self.config.trace_structural_ops {
            tracing::trace!(schema = self.layout.name(), row, "create");
        }
        row
    }

    /// Takes `value` apart into its leaves and appends them as a new row.
    ///
    /// Returns the index of the new row. On failure no column is changed.
    ///
    /// # Errors
    ///
    /// [`StoreError::TypeMismatch`] or [`StoreError::SchemaViolation`] if the
    /// record's `scatter` disagrees with its `walk`.
    pub fn add_entity(&mut self, value: S) -> StoreResult<usize> {
        let mut sink = ScatterSink::<K> {
            columns: &mut self.columns,
            next: 0,
            error: None,
            _kind: PhantomData,
        };
        value.scatter(&mut sink);
        let (placed, error) = (sink.next, sink.error);

        let failure = match error {
            Some(err) => Some(err),
            None if placed != self.columns.len() => Some(StoreError::SchemaViolation {
                schema: self.layout.name(),
                reason: format!(
                    "scatter produced {placed} leaves, expected {}",
                    self.columns.len()
                ),
            }),
            None => None,
        };

        if let Some(err) = failure {
            for column in &mut self.columns {
                column.truncate(self.len);
            }
            tracing::warn!(schema = self.layout.name(), %err, "rolled back add_entity");
            return Err(err);
        }

        let row = self.len;
        self.len += 1;
        if self.config.trace_structural_ops {
            tracing::trace!(schema = self.layout.name(), row, "add_entity");
        }
        Ok(row)
    }

    /// Removes row `row`, shifting every later row down by one.
    ///
    /// # Errors
    ///
    /// [`StoreError::IndexOutOfRange`] if `row >= len()`.
    pub fn erase(&mut self, row: usize) -> StoreResult<()> {
        self.check_row(row)?;
        for column in &mut self.columns {
            column.remove(row);
        }
        self.len -= 1;
        if self.config.trace_structural_ops {
            tracing::trace!(schema = self.layout.name(), row, "erase");
        }
        Ok(())
    }

    // =========================================================================
    // Column access
    // =========================================================================

    /// The whole column of the field at `offset`, mutably.
    ///
    /// `offset` is usually written as `access!(S, path.to.field)`. An aggregate
    /// offset resolves to the column of its first leaf.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownMember`] if no field starts at `offset`,
    /// [`StoreError::TypeMismatch`] if the column does not hold `T`.
    pub fn components<T: Leaf>(&mut self, offset: impl Into<MemberOffset>) -> StoreResult<&mut [T]> {
        let index = self.layout.resolve_offset(offset.into().get())?;
        self.components_at(index)
    }

    /// The whole column of the field at `offset`.
    ///
    /// # Errors
    ///
    /// Same as [`components`](Self::components).
    pub fn components_ref<T: Leaf>(&self, offset: impl Into<MemberOffset>) -> StoreResult<&[T]> {
        let index = self.layout.resolve_offset(offset.into().get())?;
        self.components_at_ref(index)
    }

    /// The column at flat position `index`, mutably.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownColumn`] if `index` is not below the leaf count,
    /// [`StoreError::TypeMismatch`] if the column does not hold `T`.
    pub fn components_at<T: Leaf>(&mut self, index: usize) -> StoreResult<&mut [T]> {
        let column = self
            .columns
            .get_mut(index)
            .ok_or(StoreError::UnknownColumn { index })?;
        let found = column.leaf_type_name();
        column
            .as_any_mut()
            .downcast_mut::<TypedColumn<K, T>>()
            .map(|typed| typed.data.as_mut_slice())
            .ok_or_else(|| type_mismatch::<T>(index, found))
    }

    /// The column at flat position `index`.
    ///
    /// # Errors
    ///
    /// Same as [`components_at`](Self::components_at).
    pub fn components_at_ref<T: Leaf>(&self, index: usize) -> StoreResult<&[T]> {
        let column = self
            .columns
            .get(index)
            .ok_or(StoreError::UnknownColumn { index })?;
        column
            .as_any()
            .downcast_ref::<TypedColumn<K, T>>()
            .map(|typed| typed.data.as_slice())
            .ok_or_else(|| type_mismatch::<T>(index, column.leaf_type_name()))
    }

    /// The column of the field named by a dotted path such as `"physics.speed.y"`.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownPath`] if the path names no field,
    /// [`StoreError::TypeMismatch`] if the column does not hold `T`.
    pub fn components_by_path<T: Leaf>(&mut self, path: &str) -> StoreResult<&mut [T]> {
        let index = self.layout.resolve_path(path)?;
        self.components_at(index)
    }

    /// Several distinct columns of the same leaf type, all mutably.
    ///
    /// ```rust,ignore
    /// let [x, vx] = store.components_disjoint::<f32, 2>([
    ///     access!(Entity, position.x),
    ///     access!(Entity, velocity.x),
    /// ])?;
    /// for (x, vx) in x.iter_mut().zip(vx.iter()) {
    ///     *x += *vx;
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// [`StoreError::AliasedColumns`] if two offsets resolve to the same
    /// column, plus the errors of [`components`](Self::components).
    pub fn components_disjoint<T: Leaf, const N: usize>(
        &mut self,
        offsets: [MemberOffset; N],
    ) -> StoreResult<[&mut [T]; N]> {
        let mut indices = [0_usize; N];
        for (slot, offset) in offsets.iter().enumerate() {
            let index = self.layout.resolve_offset(offset.get())?;
            if indices[..slot].contains(&index) {
                return Err(StoreError::AliasedColumns { column: index });
            }
            // Type-check everything before handing out any mutable borrow.
            self.components_at_ref::<T>(index)?;
            indices[slot] = index;
        }

        let mut picked: [Option<&mut [T]>; N] = std::array::from_fn(|_| None);
        for (index, column) in self.columns.iter_mut().enumerate() {
            let Some(slot) = indices.iter().position(|&wanted| wanted == index) else {
                continue;
            };
            let found = column.leaf_type_name();
            let typed = column
                .as_any_mut()
                .downcast_mut::<TypedColumn<K, T>>()
                .ok_or_else(|| type_mismatch::<T>(index, found))?;
            picked[slot] = Some(typed.data.as_mut_slice());
        }

        Ok(picked.map(Option::unwrap_or_default))
    }

    /// The column of the field at `offset` as raw bytes.
    ///
    /// # Errors
    ///
    /// Same as [`components`](Self::components).
    pub fn components_bytes<T: Leaf + bytemuck::Pod>(
        &self,
        offset: impl Into<MemberOffset>,
    ) -> StoreResult<&[u8]> {
        self.components_ref::<T>(offset).map(bytemuck::cast_slice)
    }

    /// The column of a typed field, mutably.
    ///
    /// Fields built with `field!` always resolve; the `Result` mirrors
    /// [`components`](Self::components).
    ///
    /// # Errors
    ///
    /// Same as [`components`](Self::components).
    pub fn column<T: Leaf>(&mut self, field: Field<S, T>) -> StoreResult<&mut [T]> {
        self.components(field)
    }

    /// The column of a typed field.
    ///
    /// # Errors
    ///
    /// Same as [`column`](Self::column).
    pub fn column_ref<T: Leaf>(&self, field: Field<S, T>) -> StoreResult<&[T]> {
        self.components_ref(field)
    }

    // =========================================================================
    // Row access
    // =========================================================================

    /// One value of the field at `offset`, mutably.
    ///
    /// # Errors
    ///
    /// [`StoreError::IndexOutOfRange`] if `row >= len()`, plus the errors of
    /// [`components`](Self::components).
    pub fn get<T: Leaf>(&mut self, offset: impl Into<MemberOffset>, row: usize) -> StoreResult<&mut T> {
        self.check_row(row)?;
        let len = self.len;
        self.components::<T>(offset)?
            .get_mut(row)
            .ok_or(StoreError::IndexOutOfRange { index: row, len })
    }

    /// One value of the field at `offset`.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_ref<T: Leaf>(&self, offset: impl Into<MemberOffset>, row: usize) -> StoreResult<&T> {
        self.check_row(row)?;
        self.components_ref::<T>(offset)?
            .get(row)
            .ok_or(StoreError::IndexOutOfRange {
                index: row,
                len: self.len,
            })
    }

    /// A view of every leaf of row `row`.
    ///
    /// The view is [`FlatRow`](super::view::FlatRow) unless `S` declares a
    /// structured view. Writes through the view go straight to the columns.
    ///
    /// # Errors
    ///
    /// [`StoreError::IndexOutOfRange`] if `row >= len()`.
    pub fn row(&mut self, row: usize) -> StoreResult<S::Row<'_>> {
        self.check_row(row)?;
        let len = self.len;
        let cells = self
            .columns
            .iter_mut()
            .map(|column| column.cell_mut(row))
            .collect::<Option<Vec<_>>>()
            .ok_or(StoreError::IndexOutOfRange { index: row, len })?;

        let mut cells = FlatCells::new(cells);
        FromFlatRefs::from_flat(&mut cells)
    }

    fn check_row(&self, row: usize) -> StoreResult<()> {
        if row < self.len {
            Ok(())
        } else {
            Err(StoreError::IndexOutOfRange {
                index: row,
                len: self.len,
            })
        }
    }
}

impl<S: Record, K: ColumnKind> std::fmt::Debug for RecursiveArrays<S, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecursiveArrays")
            .field("schema", &self.layout.name())
            .field("len", &self.len)
            .field(
                "columns",
                &self
                    .columns
                    .iter()
                    .map(|column| column.leaf_type_name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Appends scattered leaf values to the columns in flat order.
///
/// Stops at the first value that cannot be placed and keeps that error.
struct ScatterSink<'a, K: ColumnKind> {
    columns: &'a mut [Box<dyn ErasedColumn>],
    next: usize,
    error: Option<StoreError>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ColumnKind> LeafSink for ScatterSink<'_, K> {
    fn push<T: Leaf>(&mut self, value: T) {
        if self.error.is_some() {
            return;
        }
        let index = self.next;
        self.next += 1;

        let Some(column) = self.columns.get_mut(index) else {
            self.error = Some(StoreError::UnknownColumn { index });
            return;
        };
        let found = column.leaf_type_name();
        match column.as_any_mut().downcast_mut::<TypedColumn<K, T>>() {
            Some(typed) => typed.data.push(value),
            None => self.error = Some(type_mismatch::<T>(index, found)),
        }
    }
}

fn type_mismatch<T>(column: usize, found: &'static str) -> StoreError {
    StoreError::TypeMismatch {
        column,
        expected: std::any::type_name::<T>(),
        found,
    }
}
