//! Dynamically typed cell values and conversions to and from entity fields.

use crate::error::{OrmError, OrmResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single dynamically typed value.
///
/// Used for attribute access on models, predicate operands, statement parameters and
/// hydrated row cells. [`Value::Null`] doubles as the "absent" sentinel returned when an
/// attribute is not declared.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Timestamp(NaiveDateTime),
    Json(serde_json::Value),
    Uuid(uuid::Uuid),
}

impl Value {
    /// Whether this value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truthiness used to decide whether an identifier is set.
    ///
    /// `Null`, `false`, zero numbers, `""` and `"0"` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Decimal(d) => !d.is_zero(),
            Value::Text(s) => !(s.is_empty() || s == "0"),
            Value::Timestamp(_) | Value::Json(_) | Value::Uuid(_) => true,
        }
    }

    /// Short name of the variant, used in decode errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
            Value::Json(_) => "json",
            Value::Uuid(_) => "uuid",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert this value to the storage class of a declared column type.
    ///
    /// Values already in the right class (and `Null`) are returned unchanged. Unknown
    /// column types pass values through.
    pub fn coerce_to(self, column: &str, ty: ColumnType) -> OrmResult<Value> {
        let fail = |v: &Value| {
            OrmError::validation(format!(
                "cannot coerce {} value for column '{}' to {:?}",
                v.type_name(),
                column,
                ty
            ))
        };
        match (ty, self) {
            (_, Value::Null) => Ok(Value::Null),
            (ColumnType::Integer, Value::Int(i)) => Ok(Value::Int(i)),
            (ColumnType::Integer, Value::Bool(b)) => Ok(Value::Int(i64::from(b))),
            (ColumnType::Integer, Value::Float(f))
                if f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&f) =>
            {
                Ok(Value::Int(f as i64))
            }
            (ColumnType::Integer, Value::Decimal(d)) if d.fract().is_zero() => {
                d.to_i64().map(Value::Int).ok_or_else(|| fail(&Value::Decimal(d)))
            }
            (ColumnType::Integer, Value::Text(s)) => {
                s.trim().parse().map(Value::Int).map_err(|_| fail(&Value::Text(s)))
            }
            (ColumnType::Float, Value::Float(f)) => Ok(Value::Float(f)),
            (ColumnType::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
            (ColumnType::Float, Value::Decimal(d)) => {
                d.to_f64().map(Value::Float).ok_or_else(|| fail(&Value::Decimal(d)))
            }
            (ColumnType::Float, Value::Text(s)) => {
                s.trim().parse().map(Value::Float).map_err(|_| fail(&Value::Text(s)))
            }
            (ColumnType::Decimal, Value::Decimal(d)) => Ok(Value::Decimal(d)),
            (ColumnType::Decimal, Value::Int(i)) => Ok(Value::Decimal(Decimal::from(i))),
            (ColumnType::Decimal, Value::Float(f)) => Decimal::try_from(f)
                .map(Value::Decimal)
                .map_err(|_| fail(&Value::Float(f))),
            (ColumnType::Decimal, Value::Text(s)) => {
                s.trim().parse().map(Value::Decimal).map_err(|_| fail(&Value::Text(s)))
            }
            (ColumnType::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
            (ColumnType::Bool, Value::Int(i)) => Ok(Value::Bool(i != 0)),
            (ColumnType::Bool, Value::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "t" | "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
                "f" | "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
                _ => Err(fail(&Value::Text(s))),
            },
            (ColumnType::Text, Value::Text(s)) => Ok(Value::Text(s)),
            (ColumnType::Text, Value::Json(j)) => Ok(Value::Text(j.to_string())),
            (ColumnType::Text, Value::Uuid(u)) => Ok(Value::Text(u.to_string())),
            (
                ColumnType::Text,
                v @ (Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Decimal(_)),
            ) => {
                Ok(Value::Text(v.to_string()))
            }
            (ColumnType::Timestamp, Value::Timestamp(t)) => Ok(Value::Timestamp(t)),
            (ColumnType::Timestamp, Value::Text(s)) => parse_timestamp(&s)
                .map(Value::Timestamp)
                .ok_or_else(|| fail(&Value::Text(s))),
            (ColumnType::Json, Value::Json(j)) => Ok(Value::Json(j)),
            (ColumnType::Json, Value::Text(s)) => serde_json::from_str(&s)
                .map(Value::Json)
                .map_err(|_| fail(&Value::Text(s))),
            (ColumnType::Uuid, Value::Uuid(u)) => Ok(Value::Uuid(u)),
            (ColumnType::Uuid, Value::Text(s)) => uuid::Uuid::parse_str(s.trim())
                .map(Value::Uuid)
                .map_err(|_| fail(&Value::Text(s))),
            (ColumnType::Other, v) => Ok(v),
            (_, v) => Err(fail(&v)),
        }
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(t);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Text(s) => f.write_str(s),
            Value::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S%.f")),
            Value::Json(j) => write!(f, "{j}"),
            Value::Uuid(u) => write!(f, "{u}"),
        }
    }
}

/// Storage class of a declared column type, as reported by a metadata provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    /// Exact numeric (`numeric` / `decimal`).
    Decimal,
    Bool,
    Text,
    Timestamp,
    Json,
    Uuid,
    Other,
}

impl ColumnType {
    /// Classify a SQL type name (`integer`, `character varying`, `timestamp with time zone`, ...).
    pub fn from_sql_name(name: &str) -> Self {
        let name = name.trim().to_ascii_lowercase();
        let base = name.split('(').next().unwrap_or_default().trim();
        match base {
            "smallint" | "integer" | "int" | "int2" | "int4" | "int8" | "bigint" | "serial"
            | "bigserial" | "smallserial" | "tinyint" | "mediumint" => ColumnType::Integer,
            "real" | "float4" | "float8" | "double precision" | "double" | "float" => {
                ColumnType::Float
            }
            "numeric" | "decimal" => ColumnType::Decimal,
            "boolean" | "bool" => ColumnType::Bool,
            "text" | "character varying" | "varchar" | "character" | "char" | "bpchar"
            | "citext" | "name" => ColumnType::Text,
            "json" | "jsonb" => ColumnType::Json,
            "uuid" => ColumnType::Uuid,
            b if b.starts_with("timestamp") || b == "date" || b == "datetime" => {
                ColumnType::Timestamp
            }
            _ => ColumnType::Other,
        }
    }
}

/// Conversion from a field type into a [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Conversion from a [`Value`] into a field type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> OrmResult<Self>;
}

fn mismatch(expected: &str, got: &Value) -> OrmError {
    OrmError::decode("", format!("expected {expected}, got {}", got.type_name()))
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> OrmResult<Self> {
        Ok(value)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Int(i) => Ok(i != 0),
            other => Err(mismatch("bool", &other)),
        }
    }
}

macro_rules! int_value {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }
            }

            impl FromValue for $t {
                fn from_value(value: Value) -> OrmResult<Self> {
                    match value {
                        Value::Int(i) => <$t>::try_from(i).map_err(|_| {
                            OrmError::decode("", format!("{} out of range for {}", i, stringify!($t)))
                        }),
                        other => Err(mismatch("integer", &other)),
                    }
                }
            }
        )*
    };
}

int_value!(i16, i32, i64, u32);

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            Value::Decimal(d) => d
                .to_f64()
                .ok_or_else(|| OrmError::decode("", format!("{d} out of range for f64"))),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> OrmResult<Self> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl ToValue for Decimal {
    fn to_value(&self) -> Value {
        Value::Decimal(*self)
    }
}

impl FromValue for Decimal {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Decimal(d) => Ok(d),
            Value::Int(i) => Ok(Decimal::from(i)),
            Value::Float(f) => {
                Decimal::try_from(f).map_err(|e| OrmError::decode("", e.to_string()))
            }
            Value::Text(s) => s.parse().map_err(|_| OrmError::decode("", format!("invalid decimal '{s}'"))),
            other => Err(mismatch("decimal", &other)),
        }
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Timestamp(t) => Ok(t),
            Value::Text(s) => parse_timestamp(&s)
                .ok_or_else(|| OrmError::decode("", format!("invalid timestamp '{s}'"))),
            other => Err(mismatch("timestamp", &other)),
        }
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::Timestamp(self.naive_utc())
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> OrmResult<Self> {
        NaiveDateTime::from_value(value).map(|t| t.and_utc())
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value {
        Value::Json(self.clone())
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Json(j) => Ok(j),
            Value::Text(s) => serde_json::from_str(&s).map_err(|e| OrmError::decode("", e.to_string())),
            other => Err(mismatch("json", &other)),
        }
    }
}

impl ToValue for uuid::Uuid {
    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }
}

impl FromValue for uuid::Uuid {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Uuid(u) => Ok(u),
            Value::Text(s) => uuid::Uuid::parse_str(&s).map_err(|e| OrmError::decode("", e.to_string())),
            other => Err(mismatch("uuid", &other)),
        }
    }
}

// Option<T> maps None <-> Null
impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Null => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v.naive_utc())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
