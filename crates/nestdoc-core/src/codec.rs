mod primitive;
pub use primitive::Primitive;

mod timestamp;
pub use timestamp::Timestamp;

use crate::{stmt::{Type, Value}, Result};
use std::{fmt::Debug, sync::Arc};

/// Converts one scalar value between its in-memory and storable forms.
///
/// `typecast` returns `None` for inputs it does not recognize; what to do
/// about that is up to the caller.
pub trait ScalarCodec: Debug + Send + Sync + 'static {
    /// Coerces a raw value into the in-memory representation.
    fn typecast(&self, value: Value) -> Option<Value>;

    /// Converts a value read from storage into the in-memory representation.
    fn load(&self, value: Value) -> Option<Value> {
        self.typecast(value)
    }

    /// Converts an in-memory value into the storable representation.
    fn dump(&self, value: &Value) -> Result<Value>;
}

/// Returns the default codec for fields of type `ty`.
pub fn for_type(ty: Type) -> Arc<dyn ScalarCodec> {
    match ty {
        Type::DateTime => Arc::new(Timestamp),
        ty => Arc::new(Primitive::new(ty)),
    }
}
