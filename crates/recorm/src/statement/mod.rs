//! Statement construction.
//!
//! A [`StatementBuilder`] is bound to one table and produces [`Task`]s: the pending
//! select/insert/update/delete a query builder or model is about to run. Tasks are plain
//! data; a [`Handle`](crate::Handle) renders them with [`Task::build`] in its own
//! placeholder style and executes them.
//!
//! ```ignore
//! use recorm::statement::{StatementBuilder, Task};
//!
//! let sql = StatementBuilder::new("user");
//! let task = Task::from(sql.select().eq("name", "Ann"));
//! assert_eq!(task.build_sql(), "SELECT * FROM user WHERE name = $1");
//! ```

mod delete;
mod expr;
mod insert;
mod param;
mod select;
mod update;

pub use delete::DeleteTask;
pub use expr::{Combination, Expr, ExprGroup};
pub use insert::InsertTask;
pub use param::{ParamList, Placeholder};
pub use select::SelectTask;
pub use update::UpdateTask;

use crate::error::OrmResult;
use crate::value::Value;

/// Dialect-aware statement factory bound to one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementBuilder {
    table: String,
    placeholder: Placeholder,
}

impl StatementBuilder {
    /// Create a builder using `$n` placeholders.
    pub fn new(table: &str) -> Self {
        Self::with_placeholder(table, Placeholder::Dollar)
    }

    pub fn with_placeholder(table: &str, placeholder: Placeholder) -> Self {
        Self {
            table: table.to_string(),
            placeholder,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn placeholder(&self) -> Placeholder {
        self.placeholder
    }

    pub fn select(&self) -> SelectTask {
        SelectTask::new(&self.table)
    }

    pub fn insert(&self) -> InsertTask {
        InsertTask::new(&self.table)
    }

    pub fn update(&self) -> UpdateTask {
        UpdateTask::new(&self.table)
    }

    pub fn delete(&self) -> DeleteTask {
        DeleteTask::new(&self.table)
    }
}

/// Kind of a pending database operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// The pending database operation of a query builder or model.
#[derive(Debug, Clone)]
pub enum Task {
    Select(SelectTask),
    Insert(InsertTask),
    Update(UpdateTask),
    Delete(DeleteTask),
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Select(_) => TaskKind::Select,
            Task::Insert(_) => TaskKind::Insert,
            Task::Update(_) => TaskKind::Update,
            Task::Delete(_) => TaskKind::Delete,
        }
    }

    pub fn table(&self) -> &str {
        match self {
            Task::Select(t) => t.table(),
            Task::Insert(t) => t.table(),
            Task::Update(t) => t.table(),
            Task::Delete(t) => t.table(),
        }
    }

    /// Render SQL and parameters in the given placeholder style.
    pub fn build(&self, style: Placeholder) -> OrmResult<BuiltQuery> {
        match self {
            Task::Select(t) => Ok(t.build(style)),
            Task::Insert(t) => Ok(t.build(style)),
            Task::Update(t) => t.build(style),
            Task::Delete(t) => Ok(t.build(style)),
        }
    }

    /// Debug helper: SQL in `$n` style, or the build error message.
    pub fn build_sql(&self) -> String {
        match self.build(Placeholder::Dollar) {
            Ok(built) => built.sql,
            Err(e) => e.to_string(),
        }
    }
}

impl From<SelectTask> for Task {
    fn from(t: SelectTask) -> Self {
        Task::Select(t)
    }
}

impl From<InsertTask> for Task {
    fn from(t: InsertTask) -> Self {
        Task::Insert(t)
    }
}

impl From<UpdateTask> for Task {
    fn from(t: UpdateTask) -> Self {
        Task::Update(t)
    }
}

impl From<DeleteTask> for Task {
    fn from(t: DeleteTask) -> Self {
        Task::Delete(t)
    }
}

/// The result of rendering a task.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl BuiltQuery {
    pub fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }
}

#[cfg(test)]
mod tests;
