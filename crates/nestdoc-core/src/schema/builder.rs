use super::{
    Embedment, EmbedmentKind, Field, FieldName, Model, Name, Visibility, IDENTITY_FIELD,
};
use crate::{codec, stmt::Type, Result, ScalarCodec};
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;

#[derive(Debug)]
pub struct ModelBuilder {
    name: Name,
    fields: Vec<FieldBuilder>,
    embedments: Vec<Embedment>,
    storage_names: IndexMap<String, String>,
}

#[derive(Debug)]
pub struct FieldBuilder {
    name: FieldName,
    ty: Type,
    codec: Option<Arc<dyn ScalarCodec>>,
    visibility: Visibility,
    nullable: bool,
    key: bool,
}

impl ModelBuilder {
    pub fn new(name: &str) -> ModelBuilder {
        ModelBuilder {
            name: Name::new(name),
            fields: vec![],
            embedments: vec![],
            storage_names: IndexMap::new(),
        }
    }

    /// Adds the conventional identity key: field `id`, stored as `_id`, and
    /// assigned by the store on insert.
    pub fn id(self) -> Self {
        self.field_with("id", Type::Id, |field| {
            field.key().storage_name(IDENTITY_FIELD)
        })
    }

    pub fn key(self, name: &str, ty: Type) -> Self {
        self.field_with(name, ty, FieldBuilder::key)
    }

    pub fn field(self, name: &str, ty: Type) -> Self {
        self.field_with(name, ty, |field| field)
    }

    pub fn field_with(
        mut self,
        name: &str,
        ty: Type,
        f: impl FnOnce(FieldBuilder) -> FieldBuilder,
    ) -> Self {
        self.fields.push(f(FieldBuilder::new(name, ty)));
        self
    }

    pub fn embeds_one(self, name: &str, target: &Arc<Model>) -> Self {
        self.embeds(name, EmbedmentKind::OneToOne, target, None)
    }

    pub fn embeds_many(self, name: &str, target: &Arc<Model>) -> Self {
        self.embeds(name, EmbedmentKind::OneToMany, target, None)
    }

    pub fn embeds(
        mut self,
        name: &str,
        kind: EmbedmentKind,
        target: &Arc<Model>,
        storage_name: Option<&str>,
    ) -> Self {
        self.embedments.push(Embedment {
            name: name.to_string(),
            kind,
            target: target.clone(),
            storage_name: storage_name.map(String::from),
        });
        self
    }

    /// Overrides the collection name used in `repository`.
    pub fn storage_name(mut self, repository: &str, name: &str) -> Self {
        self.storage_names
            .insert(repository.to_string(), name.to_string());
        self
    }

    pub fn build(self) -> Result<Arc<Model>> {
        let mut names = IndexSet::new();
        let mut storage_names = IndexSet::new();

        for field in &self.fields {
            if !names.insert(field.name.app_name.as_str()) {
                crate::bail!("model `{}` declares `{}` twice", self.name, field.name.app_name);
            }
            if !storage_names.insert(field.name.storage_name()) {
                crate::bail!(
                    "model `{}` stores two fields under `{}`",
                    self.name,
                    field.name.storage_name()
                );
            }
        }

        for embedment in &self.embedments {
            if !names.insert(embedment.name.as_str())
                || !storage_names.insert(embedment.name.as_str())
            {
                crate::bail!("model `{}` declares `{}` twice", self.name, embedment.name);
            }
        }

        let key = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| field.key)
            .map(|(index, _)| index)
            .collect();

        Ok(Arc::new(Model {
            name: self.name,
            fields: self.fields.into_iter().map(FieldBuilder::build).collect(),
            key,
            embedments: self.embedments,
            storage_names: self.storage_names,
        }))
    }
}

impl FieldBuilder {
    fn new(name: &str, ty: Type) -> FieldBuilder {
        FieldBuilder {
            name: FieldName {
                app_name: name.to_string(),
                storage_name: None,
            },
            ty,
            codec: None,
            visibility: Visibility::Public,
            nullable: true,
            key: false,
        }
    }

    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    pub fn storage_name(mut self, storage_name: &str) -> Self {
        self.name.storage_name = Some(storage_name.to_string());
        self
    }

    /// Replaces the codec derived from the field type.
    pub fn codec(mut self, codec: impl ScalarCodec) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    fn build(self) -> Field {
        Field {
            codec: self.codec.unwrap_or_else(|| codec::for_type(self.ty)),
            name: self.name,
            ty: self.ty,
            visibility: self.visibility,
            nullable: self.nullable,
            key: self.key,
        }
    }
}
