use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Error};

use crate::util::named_fields;

// derive_row_view
pub fn derive_row_view(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    expand(&input).unwrap_or_else(Error::into_compile_error)
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let ident = &input.ident;
    let fields = named_fields(input, "RowView")?;

    let mut lifetimes = input.generics.lifetimes();
    let (Some(lifetime), None) = (lifetimes.next(), lifetimes.next()) else {
        return Err(Error::new_spanned(
            &input.generics,
            "RowView needs exactly one lifetime parameter, e.g. `struct View<'a>`",
        ));
    };
    if input.generics.params.len() != 1 {
        return Err(Error::new_spanned(
            &input.generics,
            "RowView cannot have type or const parameters",
        ));
    }
    let lt = &lifetime.lifetime;

    let idents: Vec<_> = fields.iter().filter_map(|field| field.ident.as_ref()).collect();
    let types: Vec<_> = fields.iter().map(|field| &field.ty).collect();

    Ok(quote! {
        impl<#lt> ::tessera::FromFlatRefs<#lt> for #ident<#lt> {
            fn describe(out: &mut ::std::vec::Vec<::core::any::TypeId>) {
                #(
                    <#types as ::tessera::FromFlatRefs<#lt>>::describe(out);
                )*
            }

            fn from_flat(
                cells: &mut ::tessera::FlatCells<#lt>,
            ) -> ::tessera::StoreResult<Self> {
                ::core::result::Result::Ok(Self {
                    #(
                        #idents: <#types as ::tessera::FromFlatRefs<#lt>>::from_flat(cells)?,
                    )*
                })
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(source: &str) -> String {
        derive_row_view(source.parse().unwrap()).to_string()
    }

    #[test]
    fn test_expands_fields_in_order() {
        let out = expand_str("struct V<'r> { a: &'r mut f32, b: Inner<'r> }");
        assert!(out.contains("for V <"), "{out}");
        assert!(!out.contains("compile_error"), "{out}");
        assert!(out.find("a : <").unwrap() < out.find("b : <").unwrap(), "{out}");
    }

    #[test]
    fn test_requires_one_lifetime() {
        assert!(expand_str("struct V { a: u32 }").contains("compile_error"));
        assert!(expand_str("struct V<'a, 'b> { a: &'a mut u32, b: &'b mut u32 }")
            .contains("compile_error"));
        assert!(expand_str("struct V<'a, T> { a: &'a mut T }").contains("compile_error"));
    }
}
