//! Parsing of struct-level and field-level `#[orm(...)]` attributes.

use syn::{Attribute, Path, Result};

/// Struct-level options.
#[derive(Default)]
pub(crate) struct EntityAttrs {
    pub table: Option<String>,
    pub connection: Option<String>,
    pub hooks: Option<Path>,
}

/// Field-level options.
#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub column: Option<String>,
    pub is_id: bool,
    pub skip: bool,
}

pub(crate) fn parse_entity_attrs(attrs: &[Attribute]) -> Result<EntityAttrs> {
    let mut out = EntityAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("orm")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                out.table = Some(meta.value()?.parse::<syn::LitStr>()?.value());
            } else if meta.path.is_ident("connection") {
                out.connection = Some(meta.value()?.parse::<syn::LitStr>()?.value());
            } else if meta.path.is_ident("hooks") {
                out.hooks = Some(meta.value()?.parse::<Path>()?);
            } else {
                return Err(meta.error("unknown orm attribute; expected `table`, `connection` or `hooks`"));
            }
            Ok(())
        })?;
    }
    Ok(out)
}

pub(crate) fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("orm")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                out.column = Some(meta.value()?.parse::<syn::LitStr>()?.value());
            } else if meta.path.is_ident("id") {
                out.is_id = true;
            } else if meta.path.is_ident("skip") {
                out.skip = true;
            } else {
                return Err(meta.error("unknown orm field attribute; expected `column`, `id` or `skip`"));
            }
            Ok(())
        })?;
    }
    Ok(out)
}
