//! Convenient imports for typical `recorm` usage.
//!
//! ```ignore
//! use recorm::prelude::*;
//! ```

pub use crate::{
    Collection, Connection, ConnectionConfig, Db, Entity, Expr, ExprGroup, HookRegistry, Model,
    OrmError, OrmResult, Predicate, QueryBuilder, Value,
};

#[cfg(feature = "postgres")]
pub use crate::PgHandle;
