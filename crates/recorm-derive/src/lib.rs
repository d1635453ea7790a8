//! Derive macros for recorm
//!
//! Provides `#[derive(Entity)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod entity;

/// Derive `Entity` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use recorm::prelude::*;
///
/// #[derive(Debug, Default, Entity)]
/// #[orm(table = "users", hooks = user_hooks)]
/// struct User {
///     id: Option<i64>,
///     name: String,
///     #[orm(column = "email_address")]
///     email: Option<String>,
///     #[orm(skip)]
///     dirty: bool,
/// }
///
/// fn user_hooks(hooks: &mut HookRegistry<User>) {
///     hooks.mutator("name", |user, value| {
///         user.name = value.to_string().trim().to_string();
///         Ok(())
///     });
/// }
/// ```
///
/// # Generated
///
/// - `fn schema() -> &'static EntitySchema` - type name, table, connection, id field, fields
/// - `fn read_field` / `fn write_field` - by-name access through `ToValue` / `FromValue`
/// - `fn register_hooks` - forwards to the `hooks` function when given
///
/// # Attributes
///
/// - `#[orm(table = "name")]` - Table name (default: lowercased type name)
/// - `#[orm(connection = "name")]` - Logical connection name (default: `"default"`)
/// - `#[orm(hooks = path)]` - `fn(&mut HookRegistry<Self>)` registering accessors/mutators
/// - `#[orm(id)]` - Mark the identifier field (default: the field named `id`)
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(skip)]` - Leave the field out of the mapping
#[proc_macro_derive(Entity, attributes(orm))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
