use super::{build_target, check_target, mismatch, Target};
use crate::{resource::EmbedmentState, Resource};
use nestdoc_core::{schema::Embedment, stmt::Value, Result};

/// A parent holding an ordered sequence of embedded targets.
#[derive(Debug, Clone, Copy)]
pub struct OneToMany<'a> {
    pub(super) embedment: &'a Embedment,
}

impl<'a> OneToMany<'a> {
    /// Returns the targets, loading them from stored data on first access.
    /// An unset embedment loads as an empty list.
    pub fn get<'s>(&self, source: &'s mut Resource) -> Result<&'s mut Vec<Resource>> {
        let name = &self.embedment.name;

        let pending = match source.embedments.get(name) {
            Some(EmbedmentState::Many(_)) => None,
            Some(EmbedmentState::Raw(raw)) => Some(raw.clone()),
            Some(EmbedmentState::One(_)) | None => Some(Value::Null),
        };

        if let Some(raw) = pending {
            self.set(source, Target::Value(raw), true)?;
        }

        match source.embedments.get_mut(name) {
            Some(EmbedmentState::Many(targets)) => Ok(targets),
            _ => Err(nestdoc_core::err!("embedment `{name}` failed to load")),
        }
    }

    pub fn set(&self, source: &mut Resource, target: Target, loading: bool) -> Result<()> {
        let mut targets = match target {
            Target::Resources(resources) => {
                for resource in &resources {
                    check_target(self.embedment, resource)?;
                }
                resources
            }
            Target::Value(Value::Null) => vec![],
            Target::Value(Value::List(items)) => {
                // Every item must be a document before anything is built
                if let Some(item) = items.iter().find(|item| !item.is_document()) {
                    return Err(mismatch(
                        self.embedment,
                        &format!("a list of {} attribute documents", self.embedment.target.name),
                        &Target::Value(item.clone()),
                    ));
                }

                items
                    .into_iter()
                    .filter_map(Value::into_document)
                    .map(|attributes| build_target(&self.embedment.target, attributes, loading))
                    .collect::<Result<Vec<_>>>()?
            }
            other => {
                return Err(mismatch(
                    self.embedment,
                    &format!("{} resources or a list of attribute documents", self.embedment.target.name),
                    &other,
                ))
            }
        };

        for target in &mut targets {
            target.link_parent(source);

            if !loading {
                target.snapshot_as_new();
            }
        }

        let name = self.embedment.name.clone();
        if !loading {
            source.replaced.insert(name.clone());
        }
        source
            .embedments
            .insert(name, EmbedmentState::Many(targets));

        Ok(())
    }

    pub fn is_dirty(&self, source: &Resource) -> bool {
        match source.embedments.get(&self.embedment.name) {
            Some(EmbedmentState::Many(targets)) => targets.iter().any(Resource::is_dirty),
            _ => false,
        }
    }

    pub fn save_cascade(&self, source: &mut Resource) {
        if let Some(EmbedmentState::Many(targets)) =
            source.embedments.get_mut(&self.embedment.name)
        {
            for target in targets {
                target.mark_saved();
            }
        }
    }
}
