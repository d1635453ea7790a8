//! Scripted collaborators shared by the integration tests.

#![allow(dead_code)]

use recorm::{
    ColumnInfo, Connection, ConnectionConfig, Execution, Handle, MetadataProvider, OrmError,
    OrmResult, Placeholder, Row, RowCursor, Task, TaskKind, WriteOutcome,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A scripted response for the next executed task.
pub enum Scripted {
    Rows(Vec<Row>),
    Write(WriteOutcome),
    Error(String),
}

#[derive(Default)]
struct FakeState {
    executed: Vec<Task>,
    script: VecDeque<Scripted>,
}

/// A handle that records every task and answers from a script.
///
/// Without a scripted answer, selects return no rows, inserts report generated id 1 and
/// updates/deletes report one affected row.
#[derive(Clone, Default)]
pub struct FakeHandle {
    state: Arc<Mutex<FakeState>>,
    placeholder: Placeholder,
}

impl FakeHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(placeholder: Placeholder) -> Self {
        Self {
            placeholder,
            ..Self::default()
        }
    }

    pub fn push_rows(&self, rows: Vec<Row>) -> &Self {
        self.state.lock().unwrap().script.push_back(Scripted::Rows(rows));
        self
    }

    pub fn push_write(&self, outcome: WriteOutcome) -> &Self {
        self.state.lock().unwrap().script.push_back(Scripted::Write(outcome));
        self
    }

    pub fn push_error(&self, message: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .script
            .push_back(Scripted::Error(message.to_string()));
        self
    }

    pub fn executed(&self) -> Vec<Task> {
        self.state.lock().unwrap().executed.clone()
    }

    pub fn kinds(&self) -> Vec<TaskKind> {
        self.executed().iter().map(Task::kind).collect()
    }

    /// SQL of every executed task, in this handle's placeholder style.
    pub fn sql(&self) -> Vec<String> {
        self.executed()
            .iter()
            .map(|t| t.build(self.placeholder).unwrap().sql)
            .collect()
    }

    pub fn last_task(&self) -> Option<Task> {
        self.executed().pop()
    }
}

impl Handle for FakeHandle {
    fn placeholder(&self) -> Placeholder {
        self.placeholder
    }

    fn execute(&self, task: &Task) -> OrmResult<Execution> {
        let mut state = self.state.lock().unwrap();
        state.executed.push(task.clone());
        match state.script.pop_front() {
            Some(Scripted::Rows(rows)) => Ok(Execution::Rows(RowCursor::from_rows(rows))),
            Some(Scripted::Write(outcome)) => Ok(Execution::Write(outcome)),
            Some(Scripted::Error(message)) => Err(OrmError::execution(message)),
            None => Ok(match task.kind() {
                TaskKind::Select => Execution::Rows(RowCursor::empty()),
                TaskKind::Insert => Execution::Write(WriteOutcome::inserted(1i64)),
                TaskKind::Update | TaskKind::Delete => Execution::Write(WriteOutcome::affected(1)),
            }),
        }
    }
}

/// A metadata provider answering from a fixed table list and counting calls.
#[derive(Clone, Default)]
pub struct FakeMetadata {
    tables: HashMap<String, Vec<ColumnInfo>>,
    calls: Arc<AtomicUsize>,
}

impl FakeMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, name: &str, columns: &[(&str, &str)]) -> Self {
        self.tables.insert(
            name.to_string(),
            columns
                .iter()
                .map(|(column, ty)| ColumnInfo::new(*column, *ty))
                .collect(),
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MetadataProvider for FakeMetadata {
    fn describe_table(&self, _handle: &dyn Handle, table: &str) -> OrmResult<Vec<ColumnInfo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| OrmError::metadata(table, "table not found"))
    }
}

/// `user(id bigint, name text)`
pub fn user_metadata() -> FakeMetadata {
    FakeMetadata::new().table("user", &[("id", "bigint"), ("name", "text")])
}

pub fn connection(handle: &FakeHandle, metadata: FakeMetadata) -> Arc<Connection> {
    Arc::new(Connection::new(handle.clone()).with_metadata(metadata))
}

pub fn connection_with(
    handle: &FakeHandle,
    metadata: FakeMetadata,
    config: ConnectionConfig,
) -> Arc<Connection> {
    Arc::new(
        Connection::new(handle.clone())
            .with_metadata(metadata)
            .with_config(config),
    )
}

pub fn id_rows(ids: &[i64]) -> Vec<Row> {
    ids.iter().map(|id| Row::new().with("id", *id)).collect()
}
