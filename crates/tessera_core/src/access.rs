//! # Field Addressing
//!
//! Fields are named by path expressions against the record type and turned
//! into byte offsets at compile time:
//!
//! ```rust,ignore
//! let speed_y = access!(Entity, physics.speed.y);   // MemberOffset
//! let typed = field!(Entity, physics.speed.y);      // Field<Entity, f32>
//! ```

use std::fmt;
use std::marker::PhantomData;

/// Byte offset of a field from the start of its root record.
///
/// This is the key type of the offset index map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct MemberOffset(usize);

impl MemberOffset {
    /// Wraps a raw byte offset.
    #[inline]
    #[must_use]
    pub const fn new(offset: usize) -> Self {
        Self(offset)
    }

    /// The raw byte offset.
    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for MemberOffset {
    fn from(offset: usize) -> Self {
        Self(offset)
    }
}

impl fmt::Display for MemberOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}", self.0)
    }
}

/// A field of record `S` whose leaf type `T` is known at compile time.
///
/// Built with [`field!`](crate::field). Column access through a `Field` can
/// never hit a type mismatch.
pub struct Field<S, T> {
    offset: MemberOffset,
    _types: PhantomData<fn(&S) -> &T>,
}

impl<S, T> Field<S, T> {
    /// Pairs an offset with the type of the field it points at.
    ///
    /// `projection` is never called; it only lets the compiler infer `T`
    /// from a path expression.
    #[inline]
    #[must_use]
    pub fn from_projection<F>(offset: usize, projection: F) -> Self
    where
        F: Fn(&S) -> &T,
    {
        let _ = projection;
        Self {
            offset: MemberOffset(offset),
            _types: PhantomData,
        }
    }

    /// The field's byte offset.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> MemberOffset {
        self.offset
    }
}

impl<S, T> Clone for Field<S, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, T> Copy for Field<S, T> {}

impl<S, T> fmt::Debug for Field<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("record", &std::any::type_name::<S>())
            .field("leaf", &std::any::type_name::<T>())
            .field("offset", &self.offset.0)
            .finish()
    }
}

impl<S, T> From<Field<S, T>> for MemberOffset {
    fn from(field: Field<S, T>) -> Self {
        field.offset
    }
}

/// Byte offset of a (possibly nested) field, as a [`MemberOffset`].
///
/// ```rust,ignore
/// let offset = access!(Entity, physics.speed.y);
/// let column = store.components::<f32>(offset)?;
/// ```
#[macro_export]
macro_rules! access {
    ($root:ty, $($path:tt)+) => {
        $crate::MemberOffset::new(::core::mem::offset_of!($root, $($path)+))
    };
}

/// A typed [`Field`] for a (possibly nested) field path.
///
/// ```rust,ignore
/// let speed_y: Field<Entity, f32> = field!(Entity, physics.speed.y);
/// ```
#[macro_export]
macro_rules! field {
    ($root:ty, $($path:tt)+) => {
        $crate::Field::<$root, _>::from_projection(
            ::core::mem::offset_of!($root, $($path)+),
            |root: &$root| &root.$($path)+,
        )
    };
}
