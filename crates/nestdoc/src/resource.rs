use crate::embedment::{Relationship, Target};
use indexmap::{IndexMap, IndexSet};
use nestdoc_core::{
    schema::{Model, Name},
    stmt::{Document, Value},
    Error, Result,
};
use std::sync::Arc;

/// An instance of a model.
///
/// Attributes are held by property (in-memory) name. Changes made since the
/// resource was loaded or last saved are tracked in an original-value
/// snapshot, which is what makes a resource dirty.
#[derive(Debug, Clone)]
pub struct Resource {
    model: Arc<Model>,

    /// Current in-memory values by property name
    attributes: Document,

    /// Value each changed property had before its first unsaved change
    original: Document,

    /// Embedments present on this resource, loaded or not
    pub(crate) embedments: IndexMap<String, EmbedmentState>,

    /// Embedments assigned since the last save
    pub(crate) replaced: IndexSet<String>,

    parent: Option<Parent>,

    saved: bool,
}

/// State of one embedment on a resource.
#[derive(Debug, Clone)]
pub(crate) enum EmbedmentState {
    /// Read from storage, not materialized yet
    Raw(Value),

    One(Option<Box<Resource>>),

    Many(Vec<Resource>),
}

/// Navigational link from an embedded resource to the resource it is stored
/// in. The link does not own or keep the parent alive.
#[derive(Debug, Clone, PartialEq)]
pub struct Parent {
    pub model: Name,

    /// Parent key at the time the link was made
    pub key: Vec<Value>,
}

impl Resource {
    /// Creates a new, unsaved resource with no attributes set.
    pub fn new(model: &Arc<Model>) -> Resource {
        Resource {
            model: model.clone(),
            attributes: Document::new(),
            original: Document::new(),
            embedments: IndexMap::new(),
            replaced: IndexSet::new(),
            parent: None,
            saved: false,
        }
    }

    /// Reconstructs a saved, clean resource from a stored document.
    ///
    /// Each field is loaded through its codec. Embedment sub-documents are
    /// kept as they are and only materialized on first access. Stored fields
    /// the model does not declare are ignored.
    pub fn load(model: &Arc<Model>, document: Document) -> Result<Resource> {
        let mut resource = Resource::new(model);
        resource.saved = true;

        for (storage_name, value) in document {
            if let Some(field) = model.field_by_storage_name(&storage_name) {
                let loaded = field
                    .codec
                    .load(value.clone())
                    .ok_or_else(|| Error::type_conversion(value, field.ty))?;
                resource
                    .attributes
                    .insert(field.app_name().to_string(), loaded);
            } else if model.embedment(&storage_name).is_some() {
                resource
                    .embedments
                    .insert(storage_name, EmbedmentState::Raw(value));
            }
        }

        Ok(resource)
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Returns the value of a property, if it has been set.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &Document {
        &self.attributes
    }

    /// Sets a property, typecasting the value through the field's codec.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let field = self
            .model
            .field(name)
            .ok_or_else(|| Error::unknown_property(self.model.name.to_string(), name))?;

        let value = value.into();
        let value = field
            .codec
            .typecast(value.clone())
            .ok_or_else(|| Error::type_conversion(value, field.ty))?;

        let previous = self.attributes.get(name).cloned().unwrap_or_default();

        match self.original.get(name).map(|original| *original == value) {
            // Changed back to the saved value
            Some(true) => {
                self.original.shift_remove(name);
            }
            Some(false) => {}
            None if previous != value => {
                self.original.insert(name.to_string(), previous);
            }
            None => {}
        }

        self.attributes.insert(name.to_string(), value);
        Ok(())
    }

    /// Mass assignment.
    ///
    /// Runs in two fixed phases: keys naming an embedment are assigned first,
    /// then the remaining keys are set as properties. Every key is checked
    /// against the model, and every property value against its field's
    /// codec, before anything is assigned. An embedment value rejected by
    /// its relationship stops the assignment, leaving the embedments before
    /// it assigned.
    pub fn assign(&mut self, attributes: Document) -> Result<()> {
        let model = self.model.clone();

        for (name, value) in &attributes {
            if model.embedment(name).is_some() {
                continue;
            }

            let field = model
                .field(name)
                .ok_or_else(|| Error::unknown_property(model.name.to_string(), name.as_str()))?;
            if field.codec.typecast(value.clone()).is_none() {
                return Err(Error::type_conversion(value.clone(), field.ty));
            }
        }

        let (embedded, scalars): (Vec<_>, Vec<_>) = attributes
            .into_iter()
            .partition(|(name, _)| model.embedment(name).is_some());

        for (name, value) in embedded {
            if let Some(embedment) = model.embedment(&name) {
                Relationship::new(embedment).set(self, Target::Value(value), false)?;
            }
        }

        for (name, value) in scalars {
            self.set(&name, value)?;
        }

        Ok(())
    }

    /// Key values in key order. Unset components are `Null`.
    pub fn key(&self) -> Vec<Value> {
        self.model
            .key_fields()
            .map(|field| self.get(field.app_name()).cloned().unwrap_or_default())
            .collect()
    }

    /// Writes store-assigned key values. These are not user changes, so the
    /// original-value snapshot is left alone.
    pub(crate) fn set_key(&mut self, values: Vec<Value>) -> Result<()> {
        let model = self.model.clone();

        for (field, value) in model.key_fields().zip(values) {
            let value = field
                .codec
                .load(value.clone())
                .ok_or_else(|| Error::type_conversion(value, field.ty))?;
            self.attributes.insert(field.app_name().to_string(), value);
        }

        Ok(())
    }

    /// True until the resource has been written to, or read from, storage.
    pub fn is_new(&self) -> bool {
        !self.saved
    }

    pub fn parent(&self) -> Option<&Parent> {
        self.parent.as_ref()
    }

    pub(crate) fn link_parent(&mut self, parent: &Resource) {
        self.parent = Some(Parent {
            model: parent.model.name.clone(),
            key: parent.key(),
        });
    }

    pub fn original_attributes(&self) -> &Document {
        &self.original
    }

    /// Treats every set attribute as previously absent, so the resource
    /// reports dirty until it is saved.
    pub(crate) fn snapshot_as_new(&mut self) {
        for (name, value) in &self.attributes {
            if !value.is_null() && !self.original.contains_key(name) {
                self.original.insert(name.clone(), Value::Null);
            }
        }
    }

    /// True if this resource's own attributes changed or an embedment was
    /// reassigned. Embedded targets are not considered.
    pub fn is_dirty_self(&self) -> bool {
        !self.original.is_empty() || !self.replaced.is_empty()
    }

    /// True if the resource or any loaded embedment has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.is_dirty_self() || self.dirty_embedments()
    }

    fn dirty_embedments(&self) -> bool {
        self.model
            .embedments
            .iter()
            .any(|embedment| Relationship::new(embedment).is_dirty(self))
    }

    /// Attributes with unsaved changes, including the changed attributes of
    /// embedded resources.
    pub fn dirty_attributes(&self) -> Document {
        let mut dirty: Document = self
            .original
            .keys()
            .map(|name| (name.clone(), self.get(name).cloned().unwrap_or_default()))
            .collect();

        for (name, state) in &self.embedments {
            match state {
                EmbedmentState::One(Some(target)) if target.is_dirty() => {
                    dirty.insert(name.clone(), target.dirty_attributes().into());
                }
                EmbedmentState::One(None) if self.replaced.contains(name) => {
                    dirty.insert(name.clone(), Value::Null);
                }
                EmbedmentState::Many(targets) => {
                    let changed: Vec<Value> = targets
                        .iter()
                        .filter(|target| target.is_dirty())
                        .map(|target| target.dirty_attributes().into())
                        .collect();

                    if !changed.is_empty() {
                        dirty.insert(name.clone(), Value::List(changed));
                    }
                }
                _ => {}
            }
        }

        dirty
    }

    /// Marks the resource as persisted and clean, cascading into every
    /// loaded embedment.
    pub fn mark_saved(&mut self) {
        self.original.clear();
        self.replaced.clear();
        self.saved = true;

        let model = self.model.clone();
        for embedment in &model.embedments {
            Relationship::new(embedment).save_cascade(self);
        }
    }

    /// Returns the loaded one-to-one target, materializing it if needed.
    pub fn embedded_one(&mut self, name: &str) -> Result<Option<&mut Resource>> {
        let model = self.model.clone();
        match Resource::relationship(&model, name)? {
            Relationship::OneToOne(one_to_one) => one_to_one.get(self),
            Relationship::OneToMany(_) => Err(Error::type_mismatch(
                name,
                "a one-to-one embedment",
                "a one-to-many embedment",
            )),
        }
    }

    /// Returns the loaded one-to-many targets, materializing them if needed.
    pub fn embedded_many(&mut self, name: &str) -> Result<&mut Vec<Resource>> {
        let model = self.model.clone();
        match Resource::relationship(&model, name)? {
            Relationship::OneToMany(one_to_many) => one_to_many.get(self),
            Relationship::OneToOne(_) => Err(Error::type_mismatch(
                name,
                "a one-to-many embedment",
                "a one-to-one embedment",
            )),
        }
    }

    /// Assigns an embedment.
    pub fn embed(&mut self, name: &str, target: impl Into<Target>) -> Result<()> {
        let model = self.model.clone();
        Resource::relationship(&model, name)?.set(self, target.into(), false)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        matches!(
            self.embedments.get(name),
            Some(EmbedmentState::One(_) | EmbedmentState::Many(_))
        )
    }

    fn relationship<'a>(model: &'a Model, name: &str) -> Result<Relationship<'a>> {
        model
            .embedment(name)
            .map(Relationship::new)
            .ok_or_else(|| Error::unknown_property(model.name.to_string(), name))
    }
}
