//! INSERT statement task.

use crate::statement::param::{ParamList, Placeholder};
use crate::statement::BuiltQuery;
use crate::value::Value;

/// A pending INSERT of one row.
#[derive(Clone, Debug)]
pub struct InsertTask {
    table: String,
    columns: Vec<String>,
    values: Vec<Value>,
    generated_key: Option<String>,
}

impl InsertTask {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            values: Vec::new(),
            generated_key: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Set one column value.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.columns.push(column.to_string());
        self.values.push(value.into());
        self
    }

    /// Set every `(column, value)` pair, in order.
    pub fn values<I, K, V>(mut self, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (column, value) in data {
            self.columns.push(column.into());
            self.values.push(value.into());
        }
        self
    }

    /// Ask the database to report the value generated for `column`.
    ///
    /// Rendered as `RETURNING <column>` for `$n` dialects; `?` dialects rely on the
    /// driver's last-insert-id instead.
    pub fn generated_key(mut self, column: &str) -> Self {
        self.generated_key = Some(column.to_string());
        self
    }

    pub fn generated_key_column(&self) -> Option<&str> {
        self.generated_key.as_deref()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub(crate) fn build(&self, style: Placeholder) -> BuiltQuery {
        let mut params = ParamList::new(style);

        let mut sql = if self.columns.is_empty() {
            match style {
                Placeholder::Dollar => format!("INSERT INTO {} DEFAULT VALUES", self.table),
                Placeholder::Question => format!("INSERT INTO {} () VALUES ()", self.table),
            }
        } else {
            let markers: Vec<String> = self.values.iter().map(|v| params.push(v.clone())).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.table,
                self.columns.join(", "),
                markers.join(", ")
            )
        };

        if let (Some(key), Placeholder::Dollar) = (&self.generated_key, style) {
            sql.push_str(" RETURNING ");
            sql.push_str(key);
        }

        BuiltQuery::new(sql, params.into_values())
    }
}
