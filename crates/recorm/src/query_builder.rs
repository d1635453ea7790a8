//! Fluent construction and execution of read statements for one entity type.

use crate::collection::Collection;
use crate::connection::{Connection, Db};
use crate::entity::Entity;
use crate::error::{OrmError, OrmResult};
use crate::handle::Execution;
use crate::model::Model;
use crate::predicate::Predicate;
use crate::statement::{Combination, Expr, ExprGroup, SelectTask, StatementBuilder, Task};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Binds an entity type to its table and connection and holds at most one pending task.
///
/// ```ignore
/// let adults = QueryBuilder::<User>::where_("age >= 18")?
///     .order_by("name")
///     .get()?;
/// ```
pub struct QueryBuilder<E: Entity> {
    conn: Arc<Connection>,
    task: Option<Task>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> QueryBuilder<E> {
    /// A builder on the connection named by `E`'s schema.
    pub fn new() -> OrmResult<Self> {
        Ok(Self::on(Db::get(E::schema().connection())?))
    }

    /// A builder on an explicit connection.
    pub fn on(conn: Arc<Connection>) -> Self {
        Self {
            conn,
            task: None,
            _entity: PhantomData,
        }
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.conn
    }

    /// Table of `E`.
    pub fn table(&self) -> &str {
        E::schema().table()
    }

    /// A statement builder bound to this builder's table.
    pub fn statement_builder(&self) -> StatementBuilder {
        self.conn.statement_builder(self.table())
    }

    /// Select every row on a fresh builder.
    ///
    /// `Ok(None)` means the execution produced no result set at all; an empty table
    /// yields an empty collection.
    pub fn all() -> OrmResult<Option<Collection<E>>> {
        Self::new()?.select_all().get()
    }

    /// A fresh builder with a pending select filtered by `predicate`, joined with AND.
    pub fn where_(predicate: impl Into<Predicate>) -> OrmResult<Self> {
        Ok(Self::new()?.filter(predicate, Combination::And))
    }

    /// Like [`where_`](Self::where_) with an explicit `"AND"` / `"OR"` combination.
    ///
    /// The combination is validated before any connection is resolved.
    pub fn where_with(predicate: impl Into<Predicate>, combination: &str) -> OrmResult<Self> {
        let combination: Combination = combination.parse()?;
        Ok(Self::new()?.filter(predicate, combination))
    }

    /// Replace the pending task with a plain `SELECT *`.
    pub fn select_all(mut self) -> Self {
        self.task = Some(Task::Select(self.statement_builder().select()));
        self
    }

    /// Add `predicate` to the pending select, starting one if none is pending.
    ///
    /// Conditions of one predicate are joined by `combination`; a predicate added to an
    /// already filtered select is ANDed with it as a parenthesized group.
    pub fn filter(mut self, predicate: impl Into<Predicate>, combination: Combination) -> Self {
        let mut select = match self.task.take() {
            Some(Task::Select(select)) => select,
            _ => self.statement_builder().select(),
        };

        let predicate = predicate.into();
        if select.where_group().is_empty() {
            let group = select.where_group_mut();
            group.set_combination(combination);
            predicate.apply(group);
        } else {
            let mut group = ExprGroup::with_combination(combination);
            predicate.apply(&mut group);
            let exprs = group.exprs().to_vec();
            select.where_group_mut().push(match combination {
                Combination::And => Expr::And(exprs),
                Combination::Or => Expr::Or(exprs),
            });
        }

        self.task = Some(Task::Select(select));
        self
    }

    pub fn order_by(self, clause: &str) -> Self {
        self.map_select(|s| s.order_by(clause))
    }

    pub fn limit(self, n: i64) -> Self {
        self.map_select(|s| s.limit(n))
    }

    pub fn offset(self, n: i64) -> Self {
        self.map_select(|s| s.offset(n))
    }

    /// Apply `f` to the pending select; other pending tasks are left untouched.
    fn map_select(mut self, f: impl FnOnce(SelectTask) -> SelectTask) -> Self {
        self.task = match self.task.take() {
            Some(Task::Select(select)) => Some(Task::Select(f(select))),
            other => other,
        };
        self
    }

    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    pub fn set_task(&mut self, task: impl Into<Task>) {
        self.task = Some(task.into());
    }

    pub fn take_task(&mut self) -> Option<Task> {
        self.task.take()
    }

    /// Execute the pending task.
    ///
    /// Returns `Ok(None)` when the execution produced no result set (a write).
    pub fn get(&self) -> OrmResult<Option<Collection<E>>> {
        let task = self
            .task
            .as_ref()
            .ok_or_else(|| OrmError::validation("no pending statement"))?;

        match self.conn.execute(task)? {
            Execution::Rows(rows) => Ok(Some(Collection::new(Arc::clone(&self.conn), rows))),
            Execution::Write(_) => Ok(None),
        }
    }

    /// First row of the pending task's result.
    pub fn first(&self) -> OrmResult<Option<Model<E>>> {
        match self.get()? {
            Some(mut rows) => rows.next().transpose(),
            None => Ok(None),
        }
    }

    /// Last row of the pending task's result.
    ///
    /// Walks the whole cursor: O(n) in the result size.
    pub fn last(&self) -> OrmResult<Option<Model<E>>> {
        let Some(rows) = self.get()? else {
            return Ok(None);
        };
        let mut last = None;
        for model in rows {
            last = Some(model?);
        }
        Ok(last)
    }
}

impl<E: Entity> Clone for QueryBuilder<E> {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            task: self.task.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for QueryBuilder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("entity", &E::schema().type_name())
            .field("connection", &self.conn.name())
            .field("task", &self.task)
            .finish()
    }
}
