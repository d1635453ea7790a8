//! UPDATE statement task.

use crate::error::{OrmError, OrmResult};
use crate::statement::expr::{Expr, ExprGroup};
use crate::statement::param::{ParamList, Placeholder};
use crate::statement::BuiltQuery;
use crate::value::Value;

/// A pending UPDATE.
#[derive(Clone, Debug)]
pub struct UpdateTask {
    table: String,
    set_clauses: Vec<(String, Value)>,
    where_group: ExprGroup,
}

impl UpdateTask {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            set_clauses: Vec::new(),
            where_group: ExprGroup::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// SET column = value
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.set_clauses.push((column.to_string(), value.into()));
        self
    }

    /// SET every `(column, value)` pair, in order.
    pub fn set_all<I, K, V>(mut self, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.set_clauses
            .extend(data.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add WHERE: column = value
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.where_group.eq(column, value);
        self
    }

    /// Add a custom expression.
    pub fn and_expr(mut self, expr: Expr) -> Self {
        self.where_group.push(expr);
        self
    }

    pub(crate) fn build(&self, style: Placeholder) -> OrmResult<BuiltQuery> {
        if self.set_clauses.is_empty() {
            return Err(OrmError::validation(format!(
                "UPDATE {} requires at least one SET column",
                self.table
            )));
        }

        let mut params = ParamList::new(style);
        let sets: Vec<String> = self
            .set_clauses
            .iter()
            .map(|(column, value)| format!("{} = {}", column, params.push(value.clone())))
            .collect();

        let mut sql = format!("UPDATE {} SET {}", self.table, sets.join(", "));

        let where_sql = self.where_group.build(&mut params);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        Ok(BuiltQuery::new(sql, params.into_values()))
    }
}
