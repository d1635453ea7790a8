//! Blocking Postgres handle over `tokio-postgres`.
//!
//! The handle owns a current-thread runtime and blocks on it for every call, so the
//! core stays synchronous. A select's rows are received in full before `execute`
//! returns and decoded one at a time as the cursor advances. Other statements may run
//! on the same handle while a collection is being walked.

use crate::error::{OrmError, OrmResult};
use crate::handle::{Execution, Handle, RowCursor, WriteOutcome};
use crate::row::Row;
use crate::statement::{Placeholder, Task};
use crate::value::Value;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::error::Error;
use std::fmt;
use tokio::runtime::Runtime;
use tokio_postgres::types::{FromSql, IsNull, Kind, ToSql, Type};
use tokio_postgres::{Client, NoTls};

type BoxError = Box<dyn Error + Sync + Send>;

/// A Postgres [`Handle`] with its own runtime and a single connection.
pub struct PgHandle {
    runtime: Runtime,
    client: Client,
}

impl PgHandle {
    /// Connect with `NoTls` and drive the connection on the handle's runtime.
    pub fn connect(url: &str) -> OrmResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| OrmError::Connection(format!("failed to build runtime: {e}")))?;

        let (client, connection) = runtime
            .block_on(tokio_postgres::connect(url, NoTls))
            .map_err(|e| OrmError::Connection(e.to_string()))?;

        runtime.spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(target: "recorm.pg", error = %e, "postgres connection error");
            }
        });

        Ok(Self {
            runtime,
            client,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Run one or more semicolon-separated statements without parameters.
    pub fn batch_execute(&self, sql: &str) -> OrmResult<()> {
        Ok(self.runtime.block_on(self.client.batch_execute(sql))?)
    }
}

impl fmt::Debug for PgHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgHandle")
            .field("closed", &self.client.is_closed())
            .finish_non_exhaustive()
    }
}

impl Handle for PgHandle {
    fn execute(&self, task: &Task) -> OrmResult<Execution> {
        let built = task.build(Placeholder::Dollar)?;
        let params: Vec<&(dyn ToSql + Sync)> =
            built.params.iter().map(|v| v as &(dyn ToSql + Sync)).collect();

        match task {
            Task::Select(_) => {
                let rows = self
                    .runtime
                    .block_on(self.client.query(built.sql.as_str(), &params))?;
                Ok(Execution::Rows(RowCursor::new(
                    rows.into_iter().map(|row| decode_row(&row)),
                )))
            }
            Task::Insert(insert) if insert.generated_key_column().is_some() => {
                let row = self
                    .runtime
                    .block_on(self.client.query_opt(built.sql.as_str(), &params))?;
                let generated_id = match row {
                    Some(row) => row.try_get::<_, Value>(0)?,
                    None => Value::Null,
                };
                Ok(Execution::Write(WriteOutcome {
                    affected_rows: u64::from(!generated_id.is_null()),
                    generated_id: (!generated_id.is_null()).then_some(generated_id),
                }))
            }
            _ => {
                let affected = self
                    .runtime
                    .block_on(self.client.execute(built.sql.as_str(), &params))?;
                Ok(Execution::Write(WriteOutcome::affected(affected)))
            }
        }
    }
}

fn decode_row(row: &tokio_postgres::Row) -> OrmResult<Row> {
    let mut out = Row::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value: Value = row
            .try_get(idx)
            .map_err(|e| OrmError::decode(column.name(), e.to_string()))?;
        out.push(column.name(), value);
    }
    Ok(out)
}

/// Encode with `T`'s `ToSql` when it accepts the parameter type.
fn encode<T: ToSql>(value: &T, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if !T::accepts(ty) {
        return Err(format!("cannot encode {} as {}", std::any::type_name::<T>(), ty).into());
    }
    value.to_sql(ty, out)
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        if let Kind::Domain(base) = ty.kind() {
            return self.to_sql(base, out);
        }
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => encode(b, ty, out),
            Value::Int(i) => match *ty {
                Type::INT2 => encode(&i16::try_from(*i)?, ty, out),
                Type::INT4 => encode(&i32::try_from(*i)?, ty, out),
                Type::OID => encode(&u32::try_from(*i)?, ty, out),
                Type::FLOAT8 => encode(&(*i as f64), ty, out),
                Type::NUMERIC => encode(&Decimal::from(*i), ty, out),
                _ => encode(i, ty, out),
            },
            Value::Float(f) => match *ty {
                Type::FLOAT4 => encode(&(*f as f32), ty, out),
                Type::NUMERIC => encode(&Decimal::try_from(*f)?, ty, out),
                _ => encode(f, ty, out),
            },
            Value::Decimal(d) => match *ty {
                Type::FLOAT4 | Type::FLOAT8 => match d.to_f64() {
                    Some(f) => Value::Float(f).to_sql(ty, out),
                    None => Err(format!("cannot encode {d} as {ty}").into()),
                },
                _ => encode(d, ty, out),
            },
            Value::Text(s) => encode(s, ty, out),
            Value::Timestamp(t) => match *ty {
                Type::TIMESTAMPTZ => encode(&t.and_utc(), ty, out),
                Type::DATE => encode(&t.date(), ty, out),
                _ => encode(t, ty, out),
            },
            Value::Json(j) => encode(j, ty, out),
            Value::Uuid(u) => encode(u, ty, out),
        }
    }

    fn accepts(_: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

impl<'a> FromSql<'a> for Value {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        if let Kind::Domain(base) = ty.kind() {
            return Self::from_sql(base, raw);
        }
        Ok(match *ty {
            Type::BOOL => Value::Bool(bool::from_sql(ty, raw)?),
            Type::INT2 => Value::Int(i16::from_sql(ty, raw)?.into()),
            Type::INT4 => Value::Int(i32::from_sql(ty, raw)?.into()),
            Type::INT8 => Value::Int(i64::from_sql(ty, raw)?),
            Type::OID => Value::Int(u32::from_sql(ty, raw)?.into()),
            Type::FLOAT4 => Value::Float(f32::from_sql(ty, raw)?.into()),
            Type::FLOAT8 => Value::Float(f64::from_sql(ty, raw)?),
            Type::NUMERIC => Value::Decimal(Decimal::from_sql(ty, raw)?),
            Type::TIMESTAMP => Value::Timestamp(NaiveDateTime::from_sql(ty, raw)?),
            Type::TIMESTAMPTZ => Value::Timestamp(DateTime::<Utc>::from_sql(ty, raw)?.naive_utc()),
            Type::DATE => Value::Timestamp(NaiveDate::from_sql(ty, raw)?.and_time(NaiveTime::MIN)),
            Type::JSON | Type::JSONB => Value::Json(serde_json::Value::from_sql(ty, raw)?),
            Type::UUID => Value::Uuid(uuid::Uuid::from_sql(ty, raw)?),
            _ if <String as FromSql>::accepts(ty) => Value::Text(String::from_sql(ty, raw)?),
            _ => return Err(format!("unsupported column type {ty}").into()),
        })
    }

    fn from_sql_null(_: &Type) -> Result<Self, BoxError> {
        Ok(Value::Null)
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}
