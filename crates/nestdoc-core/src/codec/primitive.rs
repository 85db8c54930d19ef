use super::ScalarCodec;
use crate::{
    stmt::{Id, Type, Value},
    Error, Result,
};

/// Codec for types the store represents natively.
///
/// Values already of the field type pass through. A few lossless widenings
/// are accepted on typecast: integers to wider integers or floats, and
/// strings to ids (and back).
#[derive(Debug, Clone, Copy)]
pub struct Primitive {
    ty: Type,
}

impl Primitive {
    pub const fn new(ty: Type) -> Primitive {
        Primitive { ty }
    }

    pub fn ty(&self) -> Type {
        self.ty
    }
}

impl ScalarCodec for Primitive {
    fn typecast(&self, value: Value) -> Option<Value> {
        if self.ty.contains(&value) {
            return Some(value);
        }

        Some(match (value, self.ty) {
            (Value::I32(v), Type::I64) => Value::I64(i64::from(v)),
            (Value::I64(v), Type::I32) => Value::I32(i32::try_from(v).ok()?),
            (Value::I32(v), Type::F64) => Value::F64(f64::from(v)),
            (Value::String(v), Type::Id) => Value::Id(Id::new(v)),
            (Value::Id(v), Type::String) => Value::String(v.as_str().to_string()),
            // Ranges are condition operands, not stored values
            (value @ Value::Range(_), _) => value,
            _ => return None,
        })
    }

    fn dump(&self, value: &Value) -> Result<Value> {
        if self.ty.contains(value) {
            return Ok(value.clone());
        }

        self.typecast(value.clone())
            .ok_or_else(|| Error::type_conversion(value.clone(), self.ty))
    }
}
