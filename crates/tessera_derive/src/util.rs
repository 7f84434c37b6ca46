use syn::punctuated::Punctuated;
use syn::{Data, DeriveInput, Error, Field, Fields, Meta, Token};

/// Named fields of a struct, or a spanned error naming the derive.
pub fn named_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> syn::Result<&'a Punctuated<Field, Token![,]>> {
    let message = format!("{derive} can only be derived for structs with named fields");

    let Data::Struct(data) = &input.data else {
        return Err(Error::new_spanned(&input.ident, message));
    };
    match &data.fields {
        Fields::Named(named) => Ok(&named.named),
        other => Err(Error::new_spanned(other, message)),
    }
}

/// Whether the item carries `#[repr(C)]`, possibly alongside other hints.
pub fn has_repr_c(input: &DeriveInput) -> syn::Result<bool> {
    for attr in &input.attrs {
        if !attr.path().is_ident("repr") {
            continue;
        }
        let hints = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        if hints
            .iter()
            .any(|hint| matches!(hint, Meta::Path(path) if path.is_ident("C")))
        {
            return Ok(true);
        }
    }

    Ok(false)
}
