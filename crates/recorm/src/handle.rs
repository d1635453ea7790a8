//! The database handle capability consumed by the core.
//!
//! A [`Handle`] executes [`Task`]s and reports either a row cursor or a write outcome.
//! Drivers, pools and dialect quirks live behind it; the core only ever sees this trait.

use crate::error::OrmResult;
use crate::row::Row;
use crate::statement::{Placeholder, StatementBuilder, Task};
use crate::value::Value;
use std::fmt;

/// Executes statements against one database.
///
/// Implementations must be shareable across threads; the core never mutates a handle.
pub trait Handle: Send + Sync {
    /// Placeholder style this handle's dialect expects.
    fn placeholder(&self) -> Placeholder {
        Placeholder::Dollar
    }

    /// A statement builder bound to `table`, rendering in this handle's dialect.
    fn statement_builder(&self, table: &str) -> StatementBuilder {
        StatementBuilder::with_placeholder(table, self.placeholder())
    }

    /// Execute a task.
    ///
    /// Selects return [`Execution::Rows`]; inserts, updates and deletes return
    /// [`Execution::Write`].
    fn execute(&self, task: &Task) -> OrmResult<Execution>;
}

/// Outcome of a write statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteOutcome {
    /// Number of rows the statement affected.
    pub affected_rows: u64,
    /// Identifier generated by the database for an inserted row, if any.
    pub generated_id: Option<Value>,
}

impl WriteOutcome {
    pub fn affected(rows: u64) -> Self {
        Self {
            affected_rows: rows,
            generated_id: None,
        }
    }

    pub fn inserted(id: impl Into<Value>) -> Self {
        let id = id.into();
        Self {
            affected_rows: 1,
            generated_id: (!id.is_null()).then_some(id),
        }
    }
}

/// Result of executing a task.
pub enum Execution {
    /// A query result: a forward-only cursor over the rows.
    Rows(RowCursor),
    /// A write result.
    Write(WriteOutcome),
}

impl fmt::Debug for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Execution::Rows(_) => f.debug_tuple("Rows").field(&"<cursor>").finish(),
            Execution::Write(outcome) => f.debug_tuple("Write").field(outcome).finish(),
        }
    }
}

/// A forward-only, single-pass cursor over result rows.
///
/// Backed by any iterator so drivers can fetch rows lazily.
pub struct RowCursor {
    rows: Box<dyn Iterator<Item = OrmResult<Row>> + Send>,
}

impl RowCursor {
    pub fn new<I>(rows: I) -> Self
    where
        I: Iterator<Item = OrmResult<Row>> + Send + 'static,
    {
        Self {
            rows: Box::new(rows),
        }
    }

    /// A cursor over rows that are already in memory.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self::new(rows.into_iter().map(Ok))
    }

    pub fn empty() -> Self {
        Self::from_rows(Vec::new())
    }
}

impl Iterator for RowCursor {
    type Item = OrmResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

impl fmt::Debug for RowCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowCursor").finish_non_exhaustive()
    }
}
