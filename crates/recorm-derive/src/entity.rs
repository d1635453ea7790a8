//! Entity derive macro implementation

use crate::attrs::{parse_entity_attrs, parse_field_attrs};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

struct MappedField {
    ident: syn::Ident,
    name: String,
    column: String,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let ident = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Entity cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity can only be derived for structs",
            ));
        }
    };

    let entity_attrs = parse_entity_attrs(&input.attrs)?;

    let mut mapped = Vec::new();
    let mut marked_id = None;
    for field in fields {
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let Some(field_ident) = field.ident.clone() else {
            continue;
        };
        let name = field_ident.to_string();
        if attrs.is_id {
            if marked_id.is_some() {
                return Err(syn::Error::new_spanned(field, "only one field can be marked #[orm(id)]"));
            }
            marked_id = Some(name.clone());
        }
        mapped.push(MappedField {
            column: attrs.column.unwrap_or_else(|| name.clone()),
            ident: field_ident,
            name,
        });
    }

    let id_field = match marked_id {
        Some(id) => id,
        None if mapped.iter().any(|f| f.name == "id") => "id".to_string(),
        None => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity requires a field named `id` or a field marked #[orm(id)]",
            ));
        }
    };

    let type_name = ident.to_string();
    let table = match &entity_attrs.table {
        Some(table) => quote! { ::core::option::Option::Some(#table) },
        None => quote! { ::core::option::Option::None },
    };
    let connection = entity_attrs
        .connection
        .clone()
        .unwrap_or_else(|| "default".to_string());

    let field_count = mapped.len();
    let field_defs = mapped.iter().map(|f| {
        let (name, column) = (&f.name, &f.column);
        quote! { recorm::FieldDef::new(#name, #column) }
    });

    let read_arms = mapped.iter().map(|f| {
        let (name, field_ident) = (&f.name, &f.ident);
        quote! {
            #name => ::core::option::Option::Some(recorm::ToValue::to_value(&self.#field_ident)),
        }
    });

    let write_arms = mapped.iter().map(|f| {
        let (name, field_ident) = (&f.name, &f.ident);
        quote! {
            #name => {
                self.#field_ident = recorm::FromValue::from_value(value)?;
                ::core::result::Result::Ok(())
            }
        }
    });

    let register_hooks = entity_attrs.hooks.as_ref().map(|path| {
        quote! {
            fn register_hooks(hooks: &mut recorm::HookRegistry<Self>) {
                #path(hooks)
            }
        }
    });

    Ok(quote! {
        impl recorm::Entity for #ident {
            fn schema() -> &'static recorm::EntitySchema {
                static FIELDS: [recorm::FieldDef; #field_count] = [#(#field_defs),*];
                static SCHEMA: recorm::EntitySchema =
                    recorm::EntitySchema::new(#type_name, #table, #connection, #id_field, &FIELDS);
                &SCHEMA
            }

            fn read_field(&self, name: &str) -> ::core::option::Option<recorm::Value> {
                match name {
                    #(#read_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn write_field(&mut self, name: &str, value: recorm::Value) -> recorm::OrmResult<()> {
                match name {
                    #(#write_arms)*
                    _ => ::core::result::Result::Err(recorm::OrmError::validation(
                        ::std::format!("{} has no field '{}'", #type_name, name),
                    )),
                }
            }

            #register_hooks
        }
    })
}
