//! # recorm
//!
//! A small active-record core: typed entities loaded, mutated and saved against a
//! relational table without hand-written SQL for the common cases.
//!
//! - **QueryBuilder**: binds an entity type to its table and connection; builds and runs
//!   reads (`all`, `where_`, `get`, `first`, `last`).
//! - **Model**: an entity plus its builder; attribute access with accessor/mutator hooks,
//!   and `save`/`insert`/`update`/`delete`.
//! - **Collection**: lazily hydrated, single-pass results.
//!
//! Databases are reached through the [`Handle`] and [`MetadataProvider`] traits. A
//! blocking Postgres handle ships behind the `postgres` feature.
//!
//! ```ignore
//! use recorm::prelude::*;
//!
//! #[derive(Debug, Default, Entity)]
//! #[orm(table = "users")]
//! struct User {
//!     id: Option<i64>,
//!     name: String,
//! }
//!
//! Db::register("default", Connection::postgres("default", &url)?);
//!
//! let mut user = Model::from_entity(User { name: "Ann".into(), ..Default::default() })?;
//! user.save()?;
//!
//! if let Some(ann) = User::where_([("name", "Ann")])?.first()? {
//!     println!("{:?}", ann.id());
//! }
//! ```

pub mod collection;
pub mod connection;
pub mod entity;
pub mod error;
pub mod handle;
pub mod hooks;
pub mod metadata;
pub mod model;
pub mod predicate;
pub mod prelude;
pub mod query_builder;
pub mod row;
pub mod statement;
pub mod value;

#[cfg(feature = "postgres")]
pub mod pg;

pub use collection::{Collection, CursorState};
pub use connection::{CoercionPolicy, Connection, ConnectionConfig, DEFAULT_CONNECTION, Db};
pub use entity::{Entity, EntitySchema, FieldDef};
pub use error::{OrmError, OrmResult};
pub use handle::{Execution, Handle, RowCursor, WriteOutcome};
pub use hooks::{Accessor, HookRegistry, Mutator};
pub use metadata::{ColumnInfo, InformationSchema, MetadataProvider, SchemaCache};
pub use model::{ColumnData, Model};
pub use predicate::Predicate;
pub use query_builder::QueryBuilder;
pub use row::Row;
pub use statement::{Combination, Expr, ExprGroup, Placeholder, StatementBuilder, Task, TaskKind};
pub use value::{ColumnType, FromValue, ToValue, Value};

#[cfg(feature = "postgres")]
pub use pg::PgHandle;

#[cfg(feature = "derive")]
pub use recorm_derive::Entity;
