use chrono::{TimeZone, Utc};
use mongodb::bson::{self, oid::ObjectId, Bson};
use nestdoc_core::{
    stmt::{self, Id, Value},
    Result,
};

pub fn to_bson(value: &Value) -> Result<Bson> {
    Ok(match value {
        Value::Null => Bson::Null,
        Value::Bool(v) => Bson::Boolean(*v),
        Value::I32(v) => Bson::Int32(*v),
        Value::I64(v) => Bson::Int64(*v),
        Value::F64(v) => Bson::Double(*v),
        Value::String(v) => Bson::String(v.clone()),
        Value::Id(v) => match ObjectId::parse_str(v.as_str()) {
            Ok(oid) => Bson::ObjectId(oid),
            Err(_) => Bson::String(v.to_string()),
        },
        Value::Timestamp(v) => Bson::DateTime(bson::DateTime::from_millis(v.timestamp_millis())),
        Value::DateTime(v) => Bson::DateTime(bson::DateTime::from_millis(v.timestamp_millis())),
        Value::List(items) => Bson::Array(items.iter().map(to_bson).collect::<Result<_>>()?),
        Value::Document(document) => Bson::Document(to_document(document)?),
        Value::Range(_) => nestdoc_core::bail!("ranges cannot be stored; translate them into operators"),
    })
}

pub fn to_document(document: &stmt::Document) -> Result<bson::Document> {
    document
        .iter()
        .map(|(key, value)| Ok((key.clone(), to_bson(value)?)))
        .collect()
}

pub fn from_bson(bson: Bson) -> Result<Value> {
    Ok(match bson {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(v) => Value::Bool(v),
        Bson::Int32(v) => Value::I32(v),
        Bson::Int64(v) => Value::I64(v),
        Bson::Double(v) => Value::F64(v),
        Bson::String(v) => Value::String(v),
        Bson::ObjectId(oid) => Value::Id(Id::new(oid.to_hex())),
        Bson::DateTime(v) => match Utc.timestamp_millis_opt(v.timestamp_millis()).single() {
            Some(v) => Value::Timestamp(v),
            None => nestdoc_core::bail!("BSON datetime out of range: {v}"),
        },
        Bson::Array(items) => {
            Value::List(items.into_iter().map(from_bson).collect::<Result<_>>()?)
        }
        Bson::Document(document) => Value::Document(from_document(document)?),
        other => nestdoc_core::bail!("unsupported BSON type: {:?}", other.element_type()),
    })
}

pub fn from_document(document: bson::Document) -> Result<stmt::Document> {
    document
        .into_iter()
        .map(|(key, value)| Ok((key, from_bson(value)?)))
        .collect()
}
