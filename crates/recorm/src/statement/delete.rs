//! DELETE statement task.

use crate::statement::expr::{Expr, ExprGroup};
use crate::statement::param::{ParamList, Placeholder};
use crate::statement::BuiltQuery;
use crate::value::Value;

/// A pending DELETE.
#[derive(Clone, Debug)]
pub struct DeleteTask {
    table: String,
    where_group: ExprGroup,
    allow_delete_all: bool,
}

impl DeleteTask {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            where_group: ExprGroup::new(),
            allow_delete_all: false,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Allow DELETE without WHERE conditions.
    ///
    /// By default, DELETE without WHERE renders `WHERE 1=0` (no-op).
    pub fn allow_delete_all(mut self, allow: bool) -> Self {
        self.allow_delete_all = allow;
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

    pub(crate) fn build(&self, style: Placeholder) -> BuiltQuery {
        let mut params = ParamList::new(style);

        if self.where_group.is_empty() && !self.allow_delete_all {
            return BuiltQuery::new(format!("DELETE FROM {} WHERE 1=0", self.table), Vec::new());
        }

        let mut sql = format!("DELETE FROM {}", self.table);
        let where_sql = self.where_group.build(&mut params);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        BuiltQuery::new(sql, params.into_values())
    }
}
