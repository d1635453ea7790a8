//! Filters accepted by `where_`.

use crate::statement::{Expr, ExprGroup};
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A WHERE filter in one of the accepted forms.
pub enum Predicate {
    /// Column equality per pair; a `Null` value becomes `IS NULL`.
    Fields(Vec<(String, Value)>),
    /// A raw SQL condition.
    Raw(String),
    /// A prebuilt expression.
    Expr(Expr),
    /// A callback populating the WHERE group when the statement is built.
    Deferred(Box<dyn FnOnce(&mut ExprGroup) + Send>),
}

impl Predicate {
    pub fn fields<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Predicate::Fields(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Predicate::Raw(sql.into())
    }

    pub fn deferred<F>(f: F) -> Self
    where
        F: FnOnce(&mut ExprGroup) + Send + 'static,
    {
        Predicate::Deferred(Box::new(f))
    }

    /// Add this predicate's conditions to `group`.
    pub(crate) fn apply(self, group: &mut ExprGroup) {
        match self {
            Predicate::Fields(pairs) => {
                for (column, value) in pairs {
                    group.push(Expr::eq(column, value));
                }
            }
            Predicate::Raw(sql) => {
                group.raw(&sql);
            }
            Predicate::Expr(expr) => {
                group.push(expr);
            }
            Predicate::Deferred(f) => f(group),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Fields(pairs) => f.debug_tuple("Fields").field(pairs).finish(),
            Predicate::Raw(sql) => f.debug_tuple("Raw").field(sql).finish(),
            Predicate::Expr(expr) => f.debug_tuple("Expr").field(expr).finish(),
            Predicate::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<&str> for Predicate {
    fn from(sql: &str) -> Self {
        Predicate::Raw(sql.to_string())
    }
}

impl From<String> for Predicate {
    fn from(sql: String) -> Self {
        Predicate::Raw(sql)
    }
}

impl From<Expr> for Predicate {
    fn from(expr: Expr) -> Self {
        Predicate::Expr(expr)
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Predicate {
    fn from(pairs: [(K, V); N]) -> Self {
        Predicate::fields(pairs)
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for Predicate {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Predicate::fields(pairs)
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Predicate {
    fn from(map: BTreeMap<K, V>) -> Self {
        Predicate::fields(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::{Combination, ParamList, Placeholder};

    fn render(predicate: impl Into<Predicate>, combination: Combination) -> (String, Vec<Value>) {
        let mut group = ExprGroup::with_combination(combination);
        predicate.into().apply(&mut group);
        let mut params = ParamList::new(Placeholder::Dollar);
        let sql = group.build(&mut params);
        (sql, params.into_values())
    }

    #[test]
    fn field_pairs_are_equalities() {
        let (sql, params) = render([("name", "Ann"), ("role", "admin")], Combination::And);
        assert_eq!(sql, "name = $1 AND role = $2");
        assert_eq!(params, vec![Value::from("Ann"), Value::from("admin")]);
    }

    #[test]
    fn null_field_is_null_check() {
        let (sql, params) = render(vec![("deleted_at", Value::Null)], Combination::And);
        assert_eq!(sql, "deleted_at IS NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn or_combination_joins_pairs() {
        let mut map = BTreeMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        let (sql, _) = render(map, Combination::Or);
        assert_eq!(sql, "a = $1 OR b = $2");
    }

    #[test]
    fn raw_and_deferred() {
        let (sql, _) = render("age > 18", Combination::And);
        assert_eq!(sql, "age > 18");

        let (sql, params) = render(
            Predicate::deferred(|g| {
                g.gte("age", 18).like("name", "A%");
            }),
            Combination::And,
        );
        assert_eq!(sql, "age >= $1 AND name LIKE $2");
        assert_eq!(params.len(), 2);
    }
}
