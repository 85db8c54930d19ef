//! Embedment relationships: resources stored inline in their parent's
//! document.
//!
//! Per (relationship, source) the state moves from unloaded, to loaded once
//! materialized, to dirty once a target changes, and back to clean after the
//! parent is saved and [`Relationship::save_cascade`] runs.

mod one_to_many;
pub use one_to_many::OneToMany;

mod one_to_one;
pub use one_to_one::OneToOne;

use crate::Resource;
use nestdoc_core::{
    schema::{Embedment, EmbedmentKind, Model},
    stmt::{Document, Value},
    Error, Result,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub enum Relationship<'a> {
    OneToOne(OneToOne<'a>),
    OneToMany(OneToMany<'a>),
}

/// A value assigned to an embedment.
#[derive(Debug, Clone)]
pub enum Target {
    /// A resource of the target model
    Resource(Resource),

    /// Resources of the target model
    Resources(Vec<Resource>),

    /// An attribute document, a list of attribute documents, or `Null`
    Value(Value),
}

/// A materialized embedment.
#[derive(Debug)]
pub enum Loaded<'a> {
    One(Option<&'a mut Resource>),
    Many(&'a mut Vec<Resource>),
}

impl<'a> Relationship<'a> {
    pub fn new(embedment: &'a Embedment) -> Relationship<'a> {
        match embedment.kind {
            EmbedmentKind::OneToOne => Relationship::OneToOne(OneToOne { embedment }),
            EmbedmentKind::OneToMany => Relationship::OneToMany(OneToMany { embedment }),
        }
    }

    pub fn embedment(&self) -> &'a Embedment {
        match self {
            Relationship::OneToOne(rel) => rel.embedment,
            Relationship::OneToMany(rel) => rel.embedment,
        }
    }

    pub fn name(&self) -> &'a str {
        &self.embedment().name
    }

    pub fn storage_name(&self) -> String {
        self.embedment().storage_name()
    }

    pub fn is_loaded(&self, source: &Resource) -> bool {
        source.is_loaded(self.name())
    }

    /// Returns the materialized targets, loading stored data on first
    /// access.
    pub fn get<'s>(&self, source: &'s mut Resource) -> Result<Loaded<'s>> {
        match self {
            Relationship::OneToOne(rel) => rel.get(source).map(Loaded::One),
            Relationship::OneToMany(rel) => rel.get(source).map(Loaded::Many),
        }
    }

    /// Assigns the embedment.
    ///
    /// With `loading`, the targets are treated as coming from storage and
    /// stay clean. Otherwise each target records an original-value snapshot
    /// and reports dirty until the parent is saved.
    pub fn set(&self, source: &mut Resource, target: Target, loading: bool) -> Result<()> {
        self.check_source(source)?;

        match self {
            Relationship::OneToOne(rel) => rel.set(source, target, loading),
            Relationship::OneToMany(rel) => rel.set(source, target, loading),
        }
    }

    pub fn is_dirty(&self, source: &Resource) -> bool {
        match self {
            Relationship::OneToOne(rel) => rel.is_dirty(source),
            Relationship::OneToMany(rel) => rel.is_dirty(source),
        }
    }

    /// Clears the snapshots of every loaded target, recursively. Runs after
    /// the parent has been persisted.
    pub fn save_cascade(&self, source: &mut Resource) {
        match self {
            Relationship::OneToOne(rel) => rel.save_cascade(source),
            Relationship::OneToMany(rel) => rel.save_cascade(source),
        }
    }

    fn check_source(&self, source: &Resource) -> Result<()> {
        let declared = source
            .model()
            .embedment(self.name())
            .is_some_and(|embedment| std::ptr::eq(embedment, self.embedment()));

        if declared {
            Ok(())
        } else {
            Err(Error::type_mismatch(
                self.name(),
                "a source declaring this embedment",
                source.model().name.to_string(),
            ))
        }
    }
}

/// Checks that `target` is a resource of the embedment's target model.
fn check_target(embedment: &Embedment, target: &Resource) -> Result<()> {
    if target.model().is(&embedment.target) {
        Ok(())
    } else {
        Err(Error::type_mismatch(
            embedment.name.as_str(),
            embedment.target.name.to_string(),
            target.model().name.to_string(),
        ))
    }
}

/// Builds a target resource from an attribute document.
///
/// Loading reads the document as stored fields; otherwise it is mass
/// assigned by property name, which recurses into nested embedments.
fn build_target(model: &Arc<Model>, attributes: Document, loading: bool) -> Result<Resource> {
    if loading {
        Resource::load(model, attributes)
    } else {
        let mut target = Resource::new(model);
        target.assign(attributes)?;
        Ok(target)
    }
}

fn mismatch(embedment: &Embedment, expected: &str, actual: &Target) -> Error {
    let actual = match actual {
        Target::Resource(resource) => resource.model().name.to_string(),
        Target::Resources(_) => "a list of resources".to_string(),
        Target::Value(value) => value.kind_name().to_string(),
    };
    Error::type_mismatch(embedment.name.as_str(), expected, actual)
}

impl From<Resource> for Target {
    fn from(value: Resource) -> Self {
        Target::Resource(value)
    }
}

impl From<Option<Resource>> for Target {
    fn from(value: Option<Resource>) -> Self {
        match value {
            Some(value) => Target::Resource(value),
            None => Target::Value(Value::Null),
        }
    }
}

impl From<Vec<Resource>> for Target {
    fn from(value: Vec<Resource>) -> Self {
        Target::Resources(value)
    }
}

impl From<Value> for Target {
    fn from(value: Value) -> Self {
        Target::Value(value)
    }
}

impl From<Document> for Target {
    fn from(value: Document) -> Self {
        Target::Value(Value::Document(value))
    }
}
