use super::Value;
use std::fmt;

/// A store-assigned document identifier.
///
/// The adapter never generates identifiers; it only carries what the driver
/// returns from an insert. The representation is the driver's canonical
/// string form (a hex object id for MongoDB).
#[derive(Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct Id(String);

impl Id {
    pub fn new(repr: impl Into<String>) -> Id {
        Id(repr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Value {
    pub const fn is_id(&self) -> bool {
        matches!(self, Self::Id(_))
    }

    pub fn as_id(&self) -> Option<&Id> {
        match self {
            Self::Id(id) => Some(id),
            _ => None,
        }
    }
}

impl From<Id> for Value {
    fn from(value: Id) -> Self {
        Self::Id(value)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "Id({})", self.0)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}
