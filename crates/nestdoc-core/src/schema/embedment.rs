use super::{Model, DEFAULT_REPOSITORY};
use std::sync::Arc;
use std_util::str;

/// A "contains" edge from a parent model to a target model stored inline in
/// the parent's document.
#[derive(Debug, Clone)]
pub struct Embedment {
    /// Name of the embedment on the parent; also the key of the nested
    /// value in the parent's document.
    pub name: String,

    pub kind: EmbedmentKind,

    /// Model of the embedded resources
    pub target: Arc<Model>,

    /// Explicit storage name, when the default is not wanted.
    pub storage_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedmentKind {
    /// The parent holds at most one embedded target
    OneToOne,

    /// The parent holds an ordered sequence of embedded targets
    OneToMany,
}

impl Embedment {
    pub fn is_one_to_one(&self) -> bool {
        self.kind == EmbedmentKind::OneToOne
    }

    pub fn is_one_to_many(&self) -> bool {
        self.kind == EmbedmentKind::OneToMany
    }

    /// Standalone name of the embedment.
    ///
    /// Defaults to the singularized collection name of the target model for
    /// one-to-one embedments and the collection name itself for one-to-many.
    /// Nested documents are keyed by [`Embedment::name`]; this is only used
    /// when an embedment is looked up on its own.
    pub fn storage_name(&self) -> String {
        if let Some(storage_name) = &self.storage_name {
            return storage_name.clone();
        }

        let collection = self.target.storage_name(DEFAULT_REPOSITORY);
        match self.kind {
            EmbedmentKind::OneToOne => str::singularize(&collection),
            EmbedmentKind::OneToMany => collection,
        }
    }
}
