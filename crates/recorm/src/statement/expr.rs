//! Expression layer for WHERE conditions.
//!
//! `Expr` supports:
//! - AND/OR/NOT grouping
//! - comparison operators (eq, ne, gt, lt, like, ...)
//! - template expressions with `?` placeholders
//! - raw SQL fragments
//!
//! `Expr::build()` renders placeholders through a [`ParamList`], so numbering is
//! computed at build time and never patched into the SQL afterwards.

use crate::error::{OrmError, OrmResult};
use crate::statement::param::ParamList;
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// How the conditions of a WHERE group are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combination {
    #[default]
    And,
    Or,
}

impl Combination {
    pub fn as_sql(self) -> &'static str {
        match self {
            Combination::And => "AND",
            Combination::Or => "OR",
        }
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Combination {
    type Err = OrmError;

    /// Accepts `AND` / `OR` in any letter case.
    fn from_str(s: &str) -> OrmResult<Self> {
        let upper = s.to_uppercase();
        match upper.as_str() {
            "AND" => Ok(Combination::And),
            "OR" => Ok(Combination::Or),
            _ => Err(OrmError::invalid_argument(format!(
                "Invalid combination provided, must be one of \"AND\" or \"OR\", \"{upper}\" given"
            ))),
        }
    }
}

/// Expression node for building WHERE clauses.
#[derive(Clone, Debug)]
pub enum Expr {
    /// AND group: all conditions must be true.
    And(Vec<Expr>),

    /// OR group: at least one condition must be true.
    Or(Vec<Expr>),

    /// NOT: negate the inner expression.
    Not(Box<Expr>),

    /// Simple comparison: column op $n
    Compare {
        column: String,
        op: &'static str,
        value: Value,
    },

    /// NULL check: column IS NULL or column IS NOT NULL
    NullCheck { column: String, is_null: bool },

    /// IN list: column IN ($1, $2, ...) or column NOT IN (...)
    InList {
        column: String,
        values: Vec<Value>,
        negated: bool,
    },

    /// BETWEEN: column BETWEEN $n AND $m
    Between {
        column: String,
        from: Value,
        to: Value,
    },

    /// Template with `?` placeholders, e.g. `a = ? OR b = ?`.
    Template { sql: String, params: Vec<Value> },

    /// Raw SQL fragment without parameters.
    Raw(String),

    /// Always true (used for empty NOT IN lists).
    True,

    /// Always false (used for empty IN lists).
    False,
}

impl Expr {
    pub fn and(exprs: Vec<Expr>) -> Self {
        Expr::And(exprs)
    }

    pub fn or(exprs: Vec<Expr>) -> Self {
        Expr::Or(exprs)
    }

    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    fn compare(column: impl Into<String>, op: &'static str, value: impl Into<Value>) -> Self {
        Expr::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Equality that renders `IS NULL` for a null operand.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Null => Expr::is_null(column),
            value => Expr::compare(column, "=", value),
        }
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Expr::compare(column, "!=", value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Expr::compare(column, ">", value)
    }

    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Expr::compare(column, ">=", value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Expr::compare(column, "<", value)
    }

    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Expr::compare(column, "<=", value)
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Expr::compare(column, "LIKE", pattern)
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Expr::NullCheck {
            column: column.into(),
            is_null: true,
        }
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Expr::NullCheck {
            column: column.into(),
            is_null: false,
        }
    }

    pub fn in_list<V: Into<Value>>(column: impl Into<String>, values: Vec<V>) -> Self {
        if values.is_empty() {
            return Expr::False;
        }
        Expr::InList {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    pub fn not_in<V: Into<Value>>(column: impl Into<String>, values: Vec<V>) -> Self {
        if values.is_empty() {
            return Expr::True;
        }
        Expr::InList {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: true,
        }
    }

    pub fn between(
        column: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        Expr::Between {
            column: column.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Template expression with `?` placeholders.
    ///
    /// # Example
    /// ```ignore
    /// Expr::template("a = ? OR b = ?", vec![1, 2])
    /// ```
    pub fn template<V: Into<Value>>(sql: impl Into<String>, values: Vec<V>) -> Self {
        Expr::Template {
            sql: sql.into(),
            params: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Raw SQL fragment.
    pub fn raw(sql: impl Into<String>) -> Self {
        Expr::Raw(sql.into())
    }

    /// Check if this expression contains no conditions.
    pub fn is_empty(&self) -> bool {
        match self {
            Expr::And(exprs) | Expr::Or(exprs) => exprs.iter().all(Expr::is_empty),
            Expr::Not(inner) => inner.is_empty(),
            Expr::Raw(sql) => sql.trim().is_empty(),
            _ => false,
        }
    }

    fn build_group(exprs: &[Expr], joiner: &str, params: &mut ParamList) -> String {
        let parts: Vec<String> = exprs
            .iter()
            .filter(|e| !e.is_empty())
            .map(|e| {
                let sql = e.build(params);
                // Nested groups keep their own precedence
                if matches!(e, Expr::And(_) | Expr::Or(_)) && !sql.is_empty() {
                    format!("({})", sql)
                } else {
                    sql
                }
            })
            .filter(|s| !s.is_empty())
            .collect();
        parts.join(joiner)
    }

    /// Render the SQL fragment, collecting parameters into `params`.
    pub fn build(&self, params: &mut ParamList) -> String {
        match self {
            Expr::And(exprs) => Self::build_group(exprs, " AND ", params),
            Expr::Or(exprs) => Self::build_group(exprs, " OR ", params),
            Expr::Not(inner) => {
                let sql = inner.build(params);
                if sql.is_empty() {
                    String::new()
                } else {
                    format!("NOT ({})", sql)
                }
            }
            Expr::Compare { column, op, value } => {
                let marker = params.push(value.clone());
                format!("{} {} {}", column, op, marker)
            }
            Expr::NullCheck { column, is_null } => {
                if *is_null {
                    format!("{} IS NULL", column)
                } else {
                    format!("{} IS NOT NULL", column)
                }
            }
            Expr::InList {
                column,
                values,
                negated,
            } => {
                if values.is_empty() {
                    return if *negated { "1=1".to_string() } else { "1=0".to_string() };
                }
                let markers: Vec<String> = values.iter().map(|v| params.push(v.clone())).collect();
                let op = if *negated { "NOT IN" } else { "IN" };
                format!("{} {} ({})", column, op, markers.join(", "))
            }
            Expr::Between { column, from, to } => {
                let m1 = params.push(from.clone());
                let m2 = params.push(to.clone());
                format!("{} BETWEEN {} AND {}", column, m1, m2)
            }
            Expr::Template {
                sql,
                params: template_params,
            } => {
                let mut result = String::with_capacity(sql.len());
                let mut values = template_params.iter().peekable();
                for ch in sql.chars() {
                    match values.next_if(|_| ch == '?') {
                        Some(v) => result.push_str(&params.push(v.clone())),
                        None => result.push(ch),
                    }
                }
                result
            }
            Expr::Raw(sql) => sql.clone(),
            Expr::True => "1=1".to_string(),
            Expr::False => "1=0".to_string(),
        }
    }
}

/// Incrementally built WHERE clause.
///
/// Conditions are joined with the group's [`Combination`] (AND unless changed).
#[derive(Clone, Debug, Default)]
pub struct ExprGroup {
    exprs: Vec<Expr>,
    combination: Combination,
}

impl ExprGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_combination(combination: Combination) -> Self {
        Self {
            exprs: Vec::new(),
            combination,
        }
    }

    pub fn combination(&self) -> Combination {
        self.combination
    }

    pub fn set_combination(&mut self, combination: Combination) {
        self.combination = combination;
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.iter().all(Expr::is_empty)
    }

    /// Add an expression.
    pub fn push(&mut self, expr: Expr) -> &mut Self {
        self.exprs.push(expr);
        self
    }

    pub fn eq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.push(Expr::eq(column, value))
    }

    pub fn ne(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.push(Expr::ne(column, value))
    }

    pub fn gt(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.push(Expr::gt(column, value))
    }

    pub fn gte(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.push(Expr::gte(column, value))
    }

    pub fn lt(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.push(Expr::lt(column, value))
    }

    pub fn lte(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.push(Expr::lte(column, value))
    }

    pub fn like(&mut self, column: &str, pattern: impl Into<Value>) -> &mut Self {
        self.push(Expr::like(column, pattern))
    }

    pub fn is_null(&mut self, column: &str) -> &mut Self {
        self.push(Expr::is_null(column))
    }

    pub fn is_not_null(&mut self, column: &str) -> &mut Self {
        self.push(Expr::is_not_null(column))
    }

    pub fn in_list<V: Into<Value>>(&mut self, column: &str, values: Vec<V>) -> &mut Self {
        self.push(Expr::in_list(column, values))
    }

    pub fn not_in<V: Into<Value>>(&mut self, column: &str, values: Vec<V>) -> &mut Self {
        self.push(Expr::not_in(column, values))
    }

    pub fn between(
        &mut self,
        column: &str,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> &mut Self {
        self.push(Expr::between(column, from, to))
    }

    pub fn raw(&mut self, sql: &str) -> &mut Self {
        self.push(Expr::raw(sql))
    }

    pub fn template<V: Into<Value>>(&mut self, sql: &str, values: Vec<V>) -> &mut Self {
        self.push(Expr::template(sql, values))
    }

    /// Render the clause body (without the `WHERE` keyword).
    pub fn build(&self, params: &mut ParamList) -> String {
        let root = match self.combination {
            Combination::And => Expr::And(self.exprs.clone()),
            Combination::Or => Expr::Or(self.exprs.clone()),
        };
        root.build(params)
    }

    pub fn exprs(&self) -> &[Expr] {
        &self.exprs
    }
}
