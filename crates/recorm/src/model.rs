//! Active-record persistence: one entity value bound to its table and connection.

use crate::collection::Collection;
use crate::connection::{CoercionPolicy, Connection, Db};
use crate::entity::Entity;
use crate::error::{OrmError, OrmResult};
use crate::handle::{Execution, WriteOutcome};
use crate::hooks::HookRegistry;
use crate::predicate::Predicate;
use crate::query_builder::QueryBuilder;
use crate::row::Row;
use crate::statement::Task;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Column-aligned values of a model, in table column order.
pub type ColumnData = Vec<(String, Value)>;

/// An entity plus the query builder that loads and persists it.
///
/// Attribute access by name goes through the entity type's [`HookRegistry`]; names the
/// entity does not declare live in a dynamic attribute bag on the model.
pub struct Model<E: Entity> {
    query: QueryBuilder<E>,
    entity: E,
    attributes: BTreeMap<String, Value>,
    generated_id: Option<Value>,
}

impl<E: Entity> Model<E> {
    /// A default entity on the connection named by `E`'s schema.
    pub fn new() -> OrmResult<Self> {
        Self::from_entity(E::default())
    }

    pub fn from_entity(entity: E) -> OrmResult<Self> {
        Ok(Self::on(Db::get(E::schema().connection())?, entity))
    }

    pub fn on(conn: Arc<Connection>, entity: E) -> Self {
        Self::from_query(QueryBuilder::on(conn), entity)
    }

    fn from_query(query: QueryBuilder<E>, entity: E) -> Self {
        Self {
            query,
            entity,
            attributes: BTreeMap::new(),
            generated_id: None,
        }
    }

    /// Build a model from a result row by plain field injection.
    ///
    /// Columns without a declared field land in the attribute bag.
    pub(crate) fn hydrate(conn: Arc<Connection>, row: Row) -> OrmResult<Self> {
        let schema = E::schema();
        let mut model = Self::on(conn, E::default());
        for (column, value) in row {
            match schema.field_for_column(&column) {
                Some(field) => model
                    .entity
                    .write_field(field.name, value)
                    .map_err(|e| e.with_column(&column))?,
                None => {
                    model.attributes.insert(column, value);
                }
            }
        }
        Ok(model)
    }

    pub fn all() -> OrmResult<Option<Collection<E>>> {
        QueryBuilder::<E>::all()
    }

    /// A model with a pending select filtered by `predicate`, joined with AND.
    pub fn where_(predicate: impl Into<Predicate>) -> OrmResult<Self> {
        Ok(Self::from_query(QueryBuilder::where_(predicate)?, E::default()))
    }

    pub fn where_with(predicate: impl Into<Predicate>, combination: &str) -> OrmResult<Self> {
        Ok(Self::from_query(
            QueryBuilder::where_with(predicate, combination)?,
            E::default(),
        ))
    }

    pub fn query(&self) -> &QueryBuilder<E> {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut QueryBuilder<E> {
        &mut self.query
    }

    pub fn table(&self) -> &str {
        self.query.table()
    }

    /// Execute the pending task; see [`QueryBuilder::get`].
    pub fn fetch(&self) -> OrmResult<Option<Collection<E>>> {
        self.query.get()
    }

    pub fn first(&self) -> OrmResult<Option<Model<E>>> {
        self.query.first()
    }

    /// See [`QueryBuilder::last`]; walks the whole result.
    pub fn last(&self) -> OrmResult<Option<Model<E>>> {
        self.query.last()
    }

    /// Read an attribute, through its accessor if one is registered.
    ///
    /// Undeclared names read from the attribute bag and default to `Value::Null`.
    pub fn get(&self, name: &str) -> Value {
        let raw = self.raw(name);
        match HookRegistry::<E>::for_type().get_accessor(name) {
            Some(accessor) => accessor(&self.entity, raw),
            None => raw,
        }
    }

    /// Write an attribute.
    ///
    /// A registered mutator owns the store entirely. Otherwise declared fields are
    /// overwritten and undeclared names go to the attribute bag.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> OrmResult<()> {
        let value = value.into();
        if let Some(mutator) = HookRegistry::<E>::for_type().get_mutator(name) {
            return mutator(&mut self.entity, value);
        }

        match E::schema().field(name) {
            Some(field) => self
                .entity
                .write_field(name, value)
                .map_err(|e| e.with_column(field.column)),
            None => {
                self.attributes.insert(name.to_string(), value);
                Ok(())
            }
        }
    }

    fn raw(&self, name: &str) -> Value {
        self.entity
            .read_field(name)
            .or_else(|| self.attributes.get(name).cloned())
            .unwrap_or_default()
    }

    /// Raw identifier value, bypassing any accessor.
    pub fn id(&self) -> Value {
        self.raw(E::schema().id_field())
    }

    /// Values set on names the entity does not declare.
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Identifier reported by the database for the last successful insert.
    ///
    /// Never copied onto the entity's id field.
    pub fn generated_id(&self) -> Option<&Value> {
        self.generated_id.as_ref()
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }

    pub fn into_entity(self) -> E {
        self.entity
    }

    /// Insert when the identifier is unset, update otherwise.
    pub fn save(&mut self) -> OrmResult<bool> {
        let data = self.columns_data()?;
        if self.id().is_truthy() {
            tracing::trace!(target: "recorm.model", table = self.table(), "save dispatches to update");
            self.update(data)
        } else {
            tracing::trace!(target: "recorm.model", table = self.table(), "save dispatches to insert");
            self.insert(data)
        }
    }

    /// Insert `data` as a new row.
    ///
    /// An unset identifier column is left out so the database default applies. Returns
    /// `true` iff the database reported a generated identifier.
    pub fn insert(&mut self, data: ColumnData) -> OrmResult<bool> {
        let id_column = E::schema().id_column();
        let data = data
            .into_iter()
            .filter(|(column, value)| column != id_column || value.is_truthy());

        let task = self
            .query
            .statement_builder()
            .insert()
            .values(data)
            .generated_key(id_column);

        let outcome = self.run_write(task.into())?;
        self.generated_id = outcome.generated_id;
        Ok(self.generated_id.is_some())
    }

    /// Update the row keyed by the current identifier. Returns `true` iff a row changed.
    pub fn update(&mut self, data: ColumnData) -> OrmResult<bool> {
        let task = self
            .query
            .statement_builder()
            .update()
            .set_all(data)
            .eq(E::schema().id_column(), self.id());

        Ok(self.run_write(task.into())?.affected_rows > 0)
    }

    /// Delete the row keyed by the current identifier.
    ///
    /// Without an identifier nothing is executed and `true` is returned.
    pub fn delete(&mut self) -> OrmResult<bool> {
        let id = self.id();
        if !id.is_truthy() {
            return Ok(true);
        }

        let task = self
            .query
            .statement_builder()
            .delete()
            .eq(E::schema().id_column(), id);

        Ok(self.run_write(task.into())?.affected_rows > 0)
    }

    /// Current values of every described column of the table, in column order.
    ///
    /// Columns without a declared field read from the attribute bag, then `Null`.
    /// Declared types are applied only under [`CoercionPolicy::Coerce`].
    pub fn columns_data(&self) -> OrmResult<ColumnData> {
        let conn = self.query.connection();
        let columns = conn.describe_table(self.table())?;
        let schema = E::schema();
        let coerce = conn.config().coercion == CoercionPolicy::Coerce;

        columns
            .iter()
            .map(|column| -> OrmResult<(String, Value)> {
                let value = match schema.field_for_column(&column.name) {
                    Some(field) => self.entity.read_field(field.name).unwrap_or_default(),
                    None => self.attributes.get(&column.name).cloned().unwrap_or_default(),
                };
                let value = if coerce {
                    value.coerce_to(&column.name, column.column_type())?
                } else {
                    value
                };
                Ok((column.name.clone(), value))
            })
            .collect()
    }

    /// Make `task` the pending task and execute it as a write.
    fn run_write(&mut self, task: Task) -> OrmResult<WriteOutcome> {
        self.query.set_task(task);
        let Some(task) = self.query.task() else {
            return Err(OrmError::validation("no pending statement"));
        };

        match self.query.connection().execute(task)? {
            Execution::Write(outcome) => Ok(outcome),
            Execution::Rows(_) => Err(OrmError::execution(format!(
                "{:?} on {} produced a result set",
                task.kind(),
                task.table()
            ))),
        }
    }
}

impl<E: Entity> Deref for Model<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.entity
    }
}

impl<E: Entity> DerefMut for Model<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.entity
    }
}

impl<E: Entity + fmt::Debug> fmt::Debug for Model<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("table", &self.table())
            .field("entity", &self.entity)
            .field("attributes", &self.attributes)
            .field("generated_id", &self.generated_id)
            .finish()
    }
}
