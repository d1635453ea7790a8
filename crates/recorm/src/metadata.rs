//! Table metadata: the describe-table capability and a per-table column cache.

use crate::error::{OrmError, OrmResult};
use crate::handle::{Execution, Handle};
use crate::statement::{Expr, Task};
use crate::value::{ColumnType, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// One described column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    /// Storage class of the declared type.
    pub fn column_type(&self) -> ColumnType {
        ColumnType::from_sql_name(&self.data_type)
    }
}

/// Describes tables: ordered column names and declared types.
pub trait MetadataProvider: Send + Sync {
    fn describe_table(&self, handle: &dyn Handle, table: &str) -> OrmResult<Vec<ColumnInfo>>;
}

/// Describes tables through `information_schema.columns`, queried via the handle itself.
///
/// `table` may be schema-qualified (`audit.events`); otherwise the schema expression
/// (`current_schema()` by default) scopes the lookup.
#[derive(Debug, Clone)]
pub struct InformationSchema {
    schema_expr: String,
}

impl Default for InformationSchema {
    fn default() -> Self {
        Self {
            schema_expr: "current_schema()".to_string(),
        }
    }
}

impl InformationSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the SQL expression naming the default schema (e.g. `DATABASE()` on MySQL).
    pub fn schema_expr(mut self, expr: &str) -> Self {
        self.schema_expr = expr.to_string();
        self
    }

    fn describe_task(&self, handle: &dyn Handle, table: &str) -> Task {
        let select = handle
            .statement_builder("information_schema.columns")
            .select()
            .columns(&["column_name AS column_name", "data_type AS data_type"]);

        let select = match table.split_once('.') {
            Some((schema, name)) => select.eq("table_schema", schema).eq("table_name", name),
            None => select
                .and_expr(Expr::raw(format!("table_schema = {}", self.schema_expr)))
                .eq("table_name", table),
        };

        Task::Select(select.order_by("ordinal_position"))
    }
}

impl MetadataProvider for InformationSchema {
    fn describe_table(&self, handle: &dyn Handle, table: &str) -> OrmResult<Vec<ColumnInfo>> {
        let task = self.describe_task(handle, table);
        let rows = match handle.execute(&task)? {
            Execution::Rows(rows) => rows,
            Execution::Write(_) => {
                return Err(OrmError::metadata(table, "describe query returned no result set"));
            }
        };

        let mut columns = Vec::new();
        for row in rows {
            let row = row?;
            let text = |name: &str| match row.get(name) {
                Some(Value::Text(s)) => Ok(s.clone()),
                other => Err(OrmError::metadata(
                    table,
                    format!("unexpected {name} value: {other:?}"),
                )),
            };
            columns.push(ColumnInfo::new(text("column_name")?, text("data_type")?));
        }

        if columns.is_empty() {
            return Err(OrmError::metadata(table, "table not found"));
        }
        Ok(columns)
    }
}

/// Process-lifetime cache of described columns, keyed by table name.
#[derive(Debug, Default)]
pub struct SchemaCache {
    tables: RwLock<HashMap<String, Arc<[ColumnInfo]>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached columns of `table`, calling `describe` on a miss.
    ///
    /// Failed descriptions are not cached.
    pub fn get_or_describe<F>(&self, table: &str, describe: F) -> OrmResult<Arc<[ColumnInfo]>>
    where
        F: FnOnce() -> OrmResult<Vec<ColumnInfo>>,
    {
        if let Some(hit) = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(table)
        {
            return Ok(Arc::clone(hit));
        }

        tracing::debug!(target: "recorm.schema", table, "describing table");
        let columns: Arc<[ColumnInfo]> = describe()?.into();

        // Another thread may have described the table meanwhile; keep the first entry.
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(
            tables.entry(table.to_string()).or_insert(columns),
        ))
    }

    pub fn get(&self, table: &str) -> Option<Arc<[ColumnInfo]>> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(table)
            .cloned()
    }

    /// Forget one table; the next lookup describes it again.
    pub fn invalidate(&self, table: &str) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(table);
    }

    pub fn clear(&self) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
