use super::Value;

/// A bounded range of values, as used by range conditions in queries.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRange {
    pub start: Box<Value>,
    pub end: Box<Value>,

    /// When true, `end` is part of the range.
    pub inclusive: bool,
}

impl ValueRange {
    pub fn new(start: impl Into<Value>, end: impl Into<Value>, inclusive: bool) -> ValueRange {
        ValueRange {
            start: Box::new(start.into()),
            end: Box::new(end.into()),
            inclusive,
        }
    }

    /// Applies `f` to both bounds, keeping inclusivity.
    pub fn try_map<E>(self, mut f: impl FnMut(Value) -> Result<Value, E>) -> Result<Self, E> {
        Ok(ValueRange {
            start: Box::new(f(*self.start)?),
            end: Box::new(f(*self.end)?),
            inclusive: self.inclusive,
        })
    }
}

impl From<ValueRange> for Value {
    fn from(value: ValueRange) -> Self {
        Self::Range(value)
    }
}

impl<T: Into<Value>> From<std::ops::Range<T>> for Value {
    fn from(value: std::ops::Range<T>) -> Self {
        Self::Range(ValueRange::new(value.start, value.end, false))
    }
}

impl<T: Into<Value>> From<std::ops::RangeInclusive<T>> for Value {
    fn from(value: std::ops::RangeInclusive<T>) -> Self {
        let (start, end) = value.into_inner();
        Self::Range(ValueRange::new(start, end, true))
    }
}
