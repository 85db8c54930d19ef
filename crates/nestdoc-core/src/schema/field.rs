use crate::{codec::ScalarCodec, stmt::Type};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Field {
    /// The field name
    pub name: FieldName,

    /// Scalar type of the in-memory value
    pub ty: Type,

    /// Converts between the in-memory and the storable representation
    pub codec: Arc<dyn ScalarCodec>,

    /// Whether the field has a public accessor. Only public fields are
    /// written to storage.
    pub visibility: Visibility,

    /// True if the field can hold `Null`.
    pub nullable: bool,

    /// True if the field is part of the model's key
    pub key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldName {
    pub app_name: String,
    pub storage_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl FieldName {
    pub fn storage_name(&self) -> &str {
        self.storage_name.as_ref().unwrap_or(&self.app_name)
    }
}

impl Field {
    /// The in-memory (property) name.
    pub fn app_name(&self) -> &str {
        &self.name.app_name
    }

    /// The name the field is stored under.
    pub fn storage_name(&self) -> &str {
        self.name.storage_name()
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// True if the store assigns this field's value.
    pub fn is_identity(&self) -> bool {
        self.storage_name() == super::IDENTITY_FIELD
    }
}
