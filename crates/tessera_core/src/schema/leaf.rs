//! # Leaf Types
//!
//! Leaves are the units of columnar storage: every leaf field of a record
//! gets its own column. Anything that is not itself a record is a leaf.

/// Marker trait for values stored in a single column.
///
/// Leaves must be:
/// - `Default`: new rows are default-initialized per column
/// - `Send + Sync`: a store may be shared read-only across threads
/// - `'static`: columns are type-erased and recovered by `TypeId`
///
/// Primitive scalars, `bool`, `char` and `String` are leaves out of the box.
/// Register your own types with [`leaf!`](crate::leaf).
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Debug, Default, PartialEq)]
/// enum Team {
///     #[default]
///     Red,
///     Blue,
/// }
///
/// tessera_core::leaf!(Team);
/// ```
pub trait Leaf: Default + Send + Sync + 'static {}

/// Implements [`Leaf`] and [`Flatten`](crate::schema::Flatten) for one or
/// more types so they can be used as record fields.
#[macro_export]
macro_rules! leaf {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::schema::Leaf for $ty {}

            impl $crate::schema::Flatten for $ty {
                const LEAF_COUNT: usize = 1;

                #[inline]
                fn walk<V: $crate::schema::SchemaVisitor>(
                    visitor: &mut V,
                    name: &'static str,
                    offset: usize,
                ) {
                    visitor.leaf::<Self>(name, offset);
                }

                #[inline]
                fn scatter<S: $crate::schema::LeafSink>(self, sink: &mut S) {
                    sink.push(self);
                }
            }
        )+
    };
}

leaf!(u8, u16, u32, u64, u128, usize);
leaf!(i8, i16, i32, i64, i128, isize);
leaf!(f32, f64, bool, char, String);
