//! SELECT statement task.

use crate::statement::expr::{Expr, ExprGroup};
use crate::statement::param::{ParamList, Placeholder};
use crate::statement::BuiltQuery;
use crate::value::Value;

/// A pending SELECT against one table.
#[derive(Clone, Debug)]
pub struct SelectTask {
    table: String,
    columns: Vec<String>,
    where_group: ExprGroup,
    order_clauses: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SelectTask {
    /// Create a `SELECT *` task for a table.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: vec!["*".to_string()],
            where_group: ExprGroup::new(),
            order_clauses: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Set SELECT columns.
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add WHERE: column = value
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.where_group.eq(column, value);
        self
    }

    /// Add a raw WHERE condition.
    pub fn raw(mut self, sql: &str) -> Self {
        self.where_group.raw(sql);
        self
    }

    /// Add a custom expression.
    pub fn and_expr(mut self, expr: Expr) -> Self {
        self.where_group.push(expr);
        self
    }

    pub fn where_group(&self) -> &ExprGroup {
        &self.where_group
    }

    pub fn where_group_mut(&mut self) -> &mut ExprGroup {
        &mut self.where_group
    }

    /// Add ORDER BY clause.
    pub fn order_by(mut self, clause: &str) -> Self {
        self.order_clauses.push(clause.to_string());
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }

    pub(crate) fn build(&self, style: Placeholder) -> BuiltQuery {
        let mut params = ParamList::new(style);
        let mut sql = format!("SELECT {} FROM {}", self.columns.join(", "), self.table);

        let where_sql = self.where_group.build(&mut params);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        if !self.order_clauses.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_clauses.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        BuiltQuery::new(sql, params.into_values())
    }
}
