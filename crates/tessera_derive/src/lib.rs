//! # Tessera Derive
//!
//! Derive macros that give record types their static shape at compile time.
//! Generated code refers to the `tessera` facade crate.

use proc_macro::TokenStream;

mod record;
mod row_view;
mod util;

/// Implements `Flatten` and `Record` for a `#[repr(C)]` struct with named
/// fields.
///
/// Every field type must itself implement `Flatten`: a leaf type or another
/// record. Add `#[record(view = MyView)]` to hand out `MyView<'a>` from
/// `RecursiveArrays::row` instead of a `FlatRow`.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input.into()).into()
}

/// Implements `FromFlatRefs` for a struct with one lifetime parameter whose
/// fields are `&'a mut Leaf` references or nested row views.
#[proc_macro_derive(RowView)]
pub fn derive_row_view(input: TokenStream) -> TokenStream {
    row_view::derive_row_view(input.into()).into()
}
