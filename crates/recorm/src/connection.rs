//! Named connections and the process-wide connection registry.
//!
//! A [`Connection`] bundles a [`Handle`], a [`MetadataProvider`], the per-table column
//! cache and a [`ConnectionConfig`]. Query builders and models hold it as
//! `Arc<Connection>`; [`Db`] resolves it by logical name.

use crate::error::{OrmError, OrmResult};
use crate::handle::{Execution, Handle};
use crate::metadata::{ColumnInfo, InformationSchema, MetadataProvider, SchemaCache};
use crate::statement::{StatementBuilder, Task};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::Level;

/// Name used when an entity does not configure one.
pub const DEFAULT_CONNECTION: &str = "default";

/// How column data is treated against the declared column types on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoercionPolicy {
    /// Pass values through untouched.
    #[default]
    Preserve,
    /// Convert values to the storage class of the declared column type, failing with a
    /// validation error when that is impossible.
    Coerce,
}

/// Per-connection behavior.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Type handling for `Model::columns_data`.
    pub coercion: CoercionPolicy,
    /// Cache described columns per table for the life of the connection.
    pub cache_columns: bool,
    /// Tracing level of the per-statement event.
    pub log_level: Level,
    /// Truncate logged SQL (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            coercion: CoercionPolicy::Preserve,
            cache_columns: true,
            log_level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coercion(mut self, policy: CoercionPolicy) -> Self {
        self.coercion = policy;
        self
    }

    pub fn cache_columns(mut self, enabled: bool) -> Self {
        self.cache_columns = enabled;
        self
    }

    /// Override the tracing event level.
    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => {
                let mut end = max;
                while end > 0 && !sql.is_char_boundary(end) {
                    end -= 1;
                }
                format!("{}...", &sql[..end])
            }
            _ => sql.to_string(),
        }
    }
}

/// A database handle plus everything the core needs to use it.
pub struct Connection {
    name: String,
    handle: Box<dyn Handle>,
    metadata: Box<dyn MetadataProvider>,
    columns: SchemaCache,
    config: ConnectionConfig,
}

impl Connection {
    /// Wrap a handle, describing tables through `information_schema`.
    pub fn new(handle: impl Handle + 'static) -> Self {
        Self {
            name: DEFAULT_CONNECTION.to_string(),
            handle: Box::new(handle),
            metadata: Box::new(InformationSchema::new()),
            columns: SchemaCache::new(),
            config: ConnectionConfig::default(),
        }
    }

    /// Connect to Postgres and wrap the resulting handle.
    #[cfg(feature = "postgres")]
    pub fn postgres(name: &str, url: &str) -> OrmResult<Self> {
        Ok(Self::new(crate::pg::PgHandle::connect(url)?).named(name))
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_metadata(mut self, provider: impl MetadataProvider + 'static) -> Self {
        self.metadata = Box::new(provider);
        self
    }

    pub fn with_config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &dyn Handle {
        self.handle.as_ref()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn schema_cache(&self) -> &SchemaCache {
        &self.columns
    }

    /// A statement builder bound to `table` in this connection's dialect.
    pub fn statement_builder(&self, table: &str) -> StatementBuilder {
        self.handle.statement_builder(table)
    }

    /// Execute a task through the handle, emitting one `recorm.sql` event.
    ///
    /// The task is rendered first, so an unbuildable task fails here without reaching
    /// the handle.
    pub fn execute(&self, task: &Task) -> OrmResult<Execution> {
        let built = task.build(self.handle.placeholder())?;
        self.log_statement(task, &built.sql, built.params.len());
        self.handle.execute(task)
    }

    /// Ordered columns of `table`, from the cache when enabled.
    pub fn describe_table(&self, table: &str) -> OrmResult<Arc<[ColumnInfo]>> {
        let describe = || self.metadata.describe_table(self.handle.as_ref(), table);
        if self.config.cache_columns {
            self.columns.get_or_describe(table, describe)
        } else {
            describe().map(Into::into)
        }
    }

    fn log_statement(&self, task: &Task, sql: &str, param_count: usize) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.config.truncate_sql(sql);
        emit_at_level!(
            self.config.log_level,
            target: "recorm.sql",
            connection = %self.name,
            kind = ?task.kind(),
            table = task.table(),
            param_count,
            sql = %sql,
        );
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("cached_tables", &self.columns.len())
            .finish_non_exhaustive()
    }
}

fn registry() -> &'static RwLock<HashMap<String, Arc<Connection>>> {
    static CONNECTIONS: OnceLock<RwLock<HashMap<String, Arc<Connection>>>> = OnceLock::new();
    CONNECTIONS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Process-wide registry of named connections.
///
/// ```ignore
/// Db::register("default", Connection::postgres("default", &url)?);
/// let users = User::all()?;
/// ```
pub struct Db;

impl Db {
    /// Register `connection` under `name`, replacing any previous one.
    pub fn register(name: &str, connection: Connection) -> Arc<Connection> {
        let connection = Arc::new(connection.named(name));
        registry()
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Arc::clone(&connection));
        tracing::debug!(target: "recorm.db", connection = name, "registered connection");
        connection
    }

    /// Resolve a connection by logical name.
    pub fn get(name: &str) -> OrmResult<Arc<Connection>> {
        registry()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| OrmError::Connection(format!("no connection named '{name}' is registered")))
    }

    pub fn remove(name: &str) -> Option<Arc<Connection>> {
        registry()
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn contains(name: &str) -> bool {
        registry()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }
}
