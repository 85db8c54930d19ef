use super::Value;

/// The scalar type of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    I32,
    I64,
    F64,
    String,

    /// A store-assigned identifier
    Id,

    /// A point in time, exposed in memory as a date-time with offset and
    /// stored as the store's native UTC timestamp.
    DateTime,
}

impl Type {
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String)
    }

    pub fn is_id(&self) -> bool {
        matches!(self, Self::Id)
    }

    pub fn is_date_time(&self) -> bool {
        matches!(self, Self::DateTime)
    }

    /// Returns true if `value` is already an in-memory value of this type.
    /// `Null` belongs to every type.
    pub fn contains(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (Self::Bool, Value::Bool(_))
                | (Self::I32, Value::I32(_))
                | (Self::I64, Value::I64(_))
                | (Self::F64, Value::F64(_))
                | (Self::String, Value::String(_))
                | (Self::Id, Value::Id(_))
                | (Self::DateTime, Value::DateTime(_))
        )
    }
}
