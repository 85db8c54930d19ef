//! Conversion of resources into storable documents.

use crate::{resource::EmbedmentState, Resource};
use nestdoc_core::{
    schema::{Model, IDENTITY_FIELD},
    stmt::{Document, Value},
    Error, Result,
};

/// Flattens a resource graph into a document keyed by storage field names.
///
/// Public fields are dumped through their codec; private fields are
/// skipped. Loaded embedments are flattened recursively, while embedments
/// that were never materialized are left out so the stored data is not
/// touched. The store-assigned `_id` is never part of the result.
pub fn flatten(resource: &Resource) -> Result<Document> {
    let mut document = flatten_fields(resource)?;
    document.shift_remove(IDENTITY_FIELD);
    Ok(document)
}

fn flatten_fields(resource: &Resource) -> Result<Document> {
    let model = resource.model();
    let mut document = Document::new();

    for field in model.fields.iter().filter(|field| field.is_public()) {
        let value = resource.get(field.app_name()).unwrap_or(&Value::Null);
        document.insert(field.storage_name().to_string(), field.codec.dump(value)?);
    }

    for embedment in &model.embedments {
        let value = match resource.embedments.get(&embedment.name) {
            Some(EmbedmentState::One(Some(target))) => Value::Document(flatten(target)?),
            Some(EmbedmentState::One(None)) => Value::Null,
            Some(EmbedmentState::Many(targets)) => Value::List(
                targets
                    .iter()
                    .map(|target| flatten(target).map(Value::Document))
                    .collect::<Result<_>>()?,
            ),
            Some(EmbedmentState::Raw(_)) | None => continue,
        };

        document.insert(embedment.name.clone(), value);
    }

    Ok(document)
}

/// Flattens a partial attribute map given by property name.
///
/// Field values are dumped through their codec under the storage name.
/// Embedment values are passed through as given.
pub fn flatten_attributes(model: &Model, attributes: &Document) -> Result<Document> {
    let mut document = Document::new();

    for (name, value) in attributes {
        if let Some(field) = model.field(name) {
            document.insert(field.storage_name().to_string(), field.codec.dump(value)?);
        } else if model.embedment(name).is_some() {
            document.insert(name.clone(), value.clone());
        } else {
            return Err(Error::unknown_property(model.name.to_string(), name.as_str()));
        }
    }

    Ok(document)
}
