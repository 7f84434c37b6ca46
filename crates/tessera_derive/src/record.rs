use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{DeriveInput, Error, Path};

use crate::util::{has_repr_c, named_fields};

// derive_record
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    expand(&input).unwrap_or_else(Error::into_compile_error)
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let ident = &input.ident;
    let fields = named_fields(input, "Record")?;

    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        ));
    }
    if !has_repr_c(input)? {
        return Err(Error::new_spanned(
            ident,
            "Record requires #[repr(C)] so field offsets follow declaration order",
        ));
    }

    let view = view_attribute(input)?;

    let idents: Vec<_> = fields.iter().filter_map(|field| field.ident.as_ref()).collect();
    let names: Vec<_> = idents.iter().map(|ident| ident.unraw().to_string()).collect();
    let types: Vec<_> = fields.iter().map(|field| &field.ty).collect();

    let row = match view {
        Some(path) => quote!(#path<'a>),
        None => quote!(::tessera::FlatRow<'a>),
    };

    Ok(quote! {
        impl ::tessera::schema::Flatten for #ident {
            const LEAF_COUNT: usize =
                0 #(+ <#types as ::tessera::schema::Flatten>::LEAF_COUNT)*;

            fn walk<__V: ::tessera::schema::SchemaVisitor>(
                visitor: &mut __V,
                name: &'static str,
                offset: usize,
            ) {
                visitor.enter_aggregate(name, offset, ::core::any::type_name::<Self>());
                #(
                    <#types as ::tessera::schema::Flatten>::walk(
                        visitor,
                        #names,
                        offset + ::core::mem::offset_of!(Self, #idents),
                    );
                )*
                visitor.leave_aggregate();
            }

            #[allow(unused_variables)]
            fn scatter<__S: ::tessera::schema::LeafSink>(self, sink: &mut __S) {
                #(
                    <#types as ::tessera::schema::Flatten>::scatter(self.#idents, sink);
                )*
            }
        }

        impl ::tessera::schema::Record for #ident {
            type Row<'a> = #row;
        }
    })
}

/// Parses `#[record(view = Path)]`.
fn view_attribute(input: &DeriveInput) -> syn::Result<Option<Path>> {
    let mut view = None;

    for attr in &input.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("view") {
                if view.is_some() {
                    return Err(meta.error("duplicate `view`"));
                }
                view = Some(meta.value()?.parse::<Path>()?);
                Ok(())
            } else {
                Err(meta.error("unknown record attribute, expected `view`"))
            }
        })?;
    }

    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(source: &str) -> String {
        derive_record(source.parse().unwrap()).to_string()
    }

    #[test]
    fn test_expands_walk_in_declaration_order() {
        let out = expand_str("#[repr(C)] struct Vec3 { x: f32, y: f32, z: f32 }");
        let x = out.find("\"x\"").unwrap();
        let y = out.find("\"y\"").unwrap();
        let z = out.find("\"z\"").unwrap();
        assert!(x < y && y < z, "{out}");
        assert!(out.contains("FlatRow"), "{out}");
    }

    #[test]
    fn test_raw_identifier_path_is_unprefixed() {
        let out = expand_str("#[repr(C)] struct Tagged { id: u32, r#type: u32 }");
        assert!(out.contains("\"type\""), "{out}");
        assert!(!out.contains("\"r#type\""), "{out}");
        assert!(out.contains("r#type"), "{out}");
    }

    #[test]
    fn test_view_attribute() {
        let out = expand_str(
            "#[repr(C)] #[record(view = EntityView)] struct Entity { id: u64 }",
        );
        assert!(out.contains("type Row"), "{out}");
        assert!(out.contains("EntityView"), "{out}");
        assert!(!out.contains("FlatRow"), "{out}");
    }

    #[test]
    fn test_repr_with_alignment() {
        let out = expand_str("#[repr(C, align(16))] struct Aligned { a: u32 }");
        assert!(!out.contains("compile_error"), "{out}");
    }

    #[test]
    fn test_rejects_missing_repr_c() {
        let out = expand_str("struct Loose { a: u32 }");
        assert!(out.contains("compile_error"), "{out}");
        assert!(out.contains("repr(C)"), "{out}");
    }

    #[test]
    fn test_rejects_tuple_and_generic_structs() {
        assert!(expand_str("#[repr(C)] struct Pair(u32, u32);").contains("compile_error"));
        assert!(expand_str("#[repr(C)] struct Wrap<T> { t: T }").contains("compile_error"));
        assert!(expand_str("#[repr(C)] enum E { A }").contains("compile_error"));
    }

    #[test]
    fn test_rejects_unknown_attribute() {
        let out = expand_str("#[repr(C)] #[record(columns = 3)] struct R { a: u32 }");
        assert!(out.contains("unknown record attribute"), "{out}");
    }
}
