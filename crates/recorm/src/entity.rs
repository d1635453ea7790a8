//! Entity types: compile-time field lists and the static entry points.
//!
//! An entity is a plain struct describing one row of one table. `#[derive(Entity)]`
//! generates the [`Entity`] impl; hand-written impls are possible for unusual layouts.
//!
//! ```ignore
//! use recorm::prelude::*;
//!
//! #[derive(Debug, Default, Entity)]
//! #[orm(table = "users")]
//! struct User {
//!     id: Option<i64>,
//!     name: String,
//!     #[orm(column = "email_address")]
//!     email: Option<String>,
//! }
//!
//! let ann = User::where_([("name", "Ann")])?.first()?;
//! ```

use crate::collection::Collection;
use crate::error::OrmResult;
use crate::hooks::HookRegistry;
use crate::model::Model;
use crate::predicate::Predicate;
use crate::value::Value;
use std::sync::OnceLock;

/// A declared entity field and the column it is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub column: &'static str,
}

impl FieldDef {
    pub const fn new(name: &'static str, column: &'static str) -> Self {
        Self { name, column }
    }
}

/// Static metadata of an entity type.
///
/// Lives in a `static` per type; the derived table name is computed on first use and
/// never changes afterwards.
#[derive(Debug)]
pub struct EntitySchema {
    type_name: &'static str,
    table: Option<&'static str>,
    connection: &'static str,
    id_field: &'static str,
    fields: &'static [FieldDef],
    derived_table: OnceLock<String>,
}

impl EntitySchema {
    pub const fn new(
        type_name: &'static str,
        table: Option<&'static str>,
        connection: &'static str,
        id_field: &'static str,
        fields: &'static [FieldDef],
    ) -> Self {
        Self {
            type_name,
            table,
            connection,
            id_field,
            fields,
            derived_table: OnceLock::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Configured table name, or the lowercased type name.
    pub fn table(&self) -> &str {
        match self.table {
            Some(table) => table,
            None => self
                .derived_table
                .get_or_init(|| self.type_name.to_lowercase()),
        }
    }

    /// Logical connection name resolved through [`Db`](crate::Db).
    pub fn connection(&self) -> &'static str {
        self.connection
    }

    pub fn id_field(&self) -> &'static str {
        self.id_field
    }

    /// Column storing the identifier.
    pub fn id_column(&self) -> &'static str {
        self.field(self.id_field)
            .map_or(self.id_field, |field| field.column)
    }

    pub fn fields(&self) -> &'static [FieldDef] {
        self.fields
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_for_column(&self, column: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.column == column)
    }
}

/// A type mapped onto one table.
///
/// Hydration starts from `Default` and writes each column into its field, so custom
/// construction logic is never run for loaded rows.
pub trait Entity: Default + Send + Sized + 'static {
    fn schema() -> &'static EntitySchema;

    /// Raw value of a declared field, `None` if `name` is not declared.
    fn read_field(&self, name: &str) -> Option<Value>;

    /// Store a value into a declared field.
    ///
    /// Fails with a decode error when the value does not convert into the field type,
    /// and with a validation error when `name` is not declared.
    fn write_field(&mut self, name: &str, value: Value) -> OrmResult<()>;

    /// Register per-field accessors and mutators. Called once per type.
    fn register_hooks(_hooks: &mut HookRegistry<Self>) {}

    /// Select every row of the table.
    fn all() -> OrmResult<Option<Collection<Self>>> {
        Model::<Self>::all()
    }

    /// A model with a pending select filtered by `predicate`.
    fn where_(predicate: impl Into<Predicate>) -> OrmResult<Model<Self>> {
        Model::<Self>::where_(predicate)
    }

    fn where_with(predicate: impl Into<Predicate>, combination: &str) -> OrmResult<Model<Self>> {
        Model::<Self>::where_with(predicate, combination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static FIELDS: [FieldDef; 2] = [FieldDef::new("key", "user_id"), FieldDef::new("name", "name")];

    #[test]
    fn derived_table_is_lowercased_type_name() {
        static SCHEMA: EntitySchema = EntitySchema::new("BlogPost", None, "default", "key", &FIELDS);
        assert_eq!(SCHEMA.table(), "blogpost");
        assert!(std::ptr::eq(SCHEMA.table(), SCHEMA.table()));
    }

    #[test]
    fn explicit_table_wins() {
        static SCHEMA: EntitySchema =
            EntitySchema::new("User", Some("accounts"), "default", "key", &FIELDS);
        assert_eq!(SCHEMA.table(), "accounts");
    }

    #[test]
    fn field_lookups() {
        static SCHEMA: EntitySchema = EntitySchema::new("User", None, "default", "key", &FIELDS);
        assert_eq!(SCHEMA.id_column(), "user_id");
        assert_eq!(SCHEMA.field_for_column("user_id").map(|f| f.name), Some("key"));
        assert!(SCHEMA.field("missing").is_none());
    }
}
