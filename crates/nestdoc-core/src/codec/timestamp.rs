use super::ScalarCodec;
use crate::{
    stmt::{Type, Value},
    Error, Result,
};
use chrono::{DateTime, FixedOffset, Utc};

/// Codec for [`Type::DateTime`] fields.
///
/// In memory a timestamp is a date-time with a fixed offset. The store only
/// knows UTC timestamps, so `dump` normalizes to UTC and `typecast` turns a
/// stored timestamp back into a date-time at offset zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timestamp;

impl ScalarCodec for Timestamp {
    fn typecast(&self, value: Value) -> Option<Value> {
        match value {
            Value::Timestamp(value) => Some(Value::DateTime(DateTime::<FixedOffset>::from(value))),
            value @ (Value::DateTime(_) | Value::Null | Value::Range(_)) => Some(value),
            _ => None,
        }
    }

    fn dump(&self, value: &Value) -> Result<Value> {
        match value {
            Value::Timestamp(_) | Value::Null => Ok(value.clone()),
            Value::DateTime(value) => Ok(Value::Timestamp(value.with_timezone(&Utc))),
            _ => Err(Error::type_conversion(value.clone(), Type::DateTime)),
        }
    }
}
