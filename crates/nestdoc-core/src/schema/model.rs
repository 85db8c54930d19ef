use super::{Embedment, Field, ModelBuilder, Name};
use indexmap::IndexMap;

/// Describes a model: its ordered fields, key and embedments.
///
/// Models are built once with [`ModelBuilder`] and shared as `Arc<Model>`.
#[derive(Debug, Clone)]
pub struct Model {
    /// Name of the model
    pub name: Name,

    /// Fields contained by the model, in declaration order
    pub fields: Vec<Field>,

    /// Indices into `fields` forming the key, in key order
    pub key: Vec<usize>,

    /// Embedment declarations, in declaration order
    pub embedments: Vec<Embedment>,

    /// Collection names overridden per repository
    pub(super) storage_names: IndexMap<String, String>,
}

impl Model {
    pub fn builder(name: &str) -> ModelBuilder {
        ModelBuilder::new(name)
    }

    /// Name of the collection holding this model's documents in the given
    /// repository.
    pub fn storage_name(&self, repository: &str) -> String {
        match self.storage_names.get(repository) {
            Some(name) => name.clone(),
            None => self.name.plural_snake_case(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.app_name() == name)
    }

    pub fn field_by_storage_name(&self, storage_name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|field| field.storage_name() == storage_name)
    }

    pub fn embedment(&self, name: &str) -> Option<&Embedment> {
        self.embedments
            .iter()
            .find(|embedment| embedment.name == name)
    }

    /// Iterate over the fields used for the model's key.
    pub fn key_fields(&self) -> impl ExactSizeIterator<Item = &'_ Field> {
        self.key.iter().map(|index| &self.fields[*index])
    }

    /// Models without a key can only be stored embedded in a parent.
    pub fn is_embeddable_only(&self) -> bool {
        self.key.is_empty()
    }

    /// Returns true if `other` describes the same model: the same name,
    /// fields, key and embedments, recursively. Models sharing only a name
    /// are different models.
    pub fn is(&self, other: &Model) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }

        let same_field = |a: &Field, b: &Field| {
            a.name == b.name
                && a.ty == b.ty
                && a.visibility == b.visibility
                && a.nullable == b.nullable
                && a.key == b.key
        };

        let same_embedment = |a: &Embedment, b: &Embedment| {
            a.name == b.name
                && a.kind == b.kind
                && a.storage_name == b.storage_name
                && a.target.is(&b.target)
        };

        self.name == other.name
            && self.key == other.key
            && self.storage_names == other.storage_names
            && self.fields.len() == other.fields.len()
            && self.embedments.len() == other.embedments.len()
            && self.fields.iter().zip(&other.fields).all(|(a, b)| same_field(a, b))
            && self
                .embedments
                .iter()
                .zip(&other.embedments)
                .all(|(a, b)| same_embedment(a, b))
    }
}
