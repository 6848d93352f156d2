//! Implementation of the `#[derive(Record)]` macro.
//!
//! Generates `Record`, `Element` and `FieldType` impls that expose each
//! named field through `::aip_query` paths.

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{ext::IdentExt, spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::{is_segment, parse_container_attrs, parse_field_attrs};

/// Main implementation of the Record derive macro.
pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Record cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let container = parse_container_attrs(&input.attrs)?;
    let schema_name = container.name.unwrap_or_else(|| struct_name.to_string());

    let mut seen = HashSet::new();
    let mut descriptors = Vec::new();
    let mut field_arms = Vec::new();
    let mut field_mut_arms = Vec::new();

    for field in fields.iter() {
        let field_ident = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let query_name = attrs
            .rename
            .unwrap_or_else(|| field_ident.unraw().to_string());
        if !is_segment(&query_name) {
            return Err(Error::new(
                field_ident.span(),
                format!("field name {query_name:?} cannot be used in a field path"),
            ));
        }
        if !seen.insert(query_name.clone()) {
            return Err(Error::new(
                field_ident.span(),
                format!("duplicate record field name {query_name:?}"),
            ));
        }

        let ty = &field.ty;
        descriptors.push(quote! {
            ::aip_query::FieldDescriptor::of::<#ty>(#query_name),
        });
        field_arms.push(quote! {
            #query_name => ::std::option::Option::Some(&self.#field_ident),
        });
        field_mut_arms.push(quote! {
            #query_name => ::std::option::Option::Some(&mut self.#field_ident),
        });
    }

    let expanded = quote! {
        impl ::aip_query::Record for #struct_name {
            fn schema() -> &'static ::aip_query::Schema {
                static SCHEMA: ::std::sync::OnceLock<::aip_query::Schema> =
                    ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    ::aip_query::Schema::new(#schema_name, ::std::vec![#(#descriptors)*])
                })
            }

            fn descriptor(&self) -> &'static ::aip_query::Schema {
                <Self as ::aip_query::Record>::schema()
            }

            fn field(&self, name: &str) -> ::std::option::Option<&dyn ::aip_query::FieldType> {
                match name {
                    #(#field_arms)*
                    _ => ::std::option::Option::None,
                }
            }

            fn field_mut(
                &mut self,
                name: &str,
            ) -> ::std::option::Option<&mut dyn ::aip_query::FieldType> {
                match name {
                    #(#field_mut_arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl ::aip_query::Element for #struct_name {
            fn element_kind() -> ::aip_query::Kind {
                ::aip_query::Kind::Record(<Self as ::aip_query::Record>::schema)
            }

            fn element_value(&self) -> ::aip_query::Value<'_> {
                ::aip_query::Value::Record(self)
            }
        }

        impl ::aip_query::FieldType for #struct_name {
            fn kind() -> ::aip_query::Kind {
                ::aip_query::Kind::Record(<Self as ::aip_query::Record>::schema)
            }

            fn value(&self) -> ::aip_query::Value<'_> {
                ::aip_query::Value::Record(self)
            }

            fn is_set(&self) -> bool {
                true
            }

            fn assign(&mut self, value: &::aip_query::Value<'_>) -> ::aip_query::Result<()> {
                match value {
                    ::aip_query::Value::Null => {
                        let schema = <Self as ::aip_query::Record>::schema();
                        for desc in schema.fields() {
                            if let ::std::option::Option::Some(field) =
                                <Self as ::aip_query::Record>::field_mut(&mut *self, desc.name)
                            {
                                ::aip_query::FieldType::assign(field, &::aip_query::Value::Null)?;
                            }
                        }
                        ::std::result::Result::Ok(())
                    }
                    other => ::std::result::Result::Err(::aip_query::Error::TypeMismatch {
                        expected: "record",
                        actual: other.type_name(),
                    }),
                }
            }

            fn record_mut(&mut self) -> ::std::option::Option<&mut dyn ::aip_query::Record> {
                ::std::option::Option::Some(self)
            }
        }
    };

    Ok(expanded)
}
