use super::{build_target, check_target, mismatch, Target};
use crate::{resource::EmbedmentState, Resource};
use nestdoc_core::{schema::Embedment, stmt::Value, Result};

/// A parent holding at most one embedded target.
#[derive(Debug, Clone, Copy)]
pub struct OneToOne<'a> {
    pub(super) embedment: &'a Embedment,
}

impl<'a> OneToOne<'a> {
    /// Returns the target, loading it from stored data on first access.
    ///
    /// An unset target is `None`; the embedment is still marked loaded.
    pub fn get<'s>(&self, source: &'s mut Resource) -> Result<Option<&'s mut Resource>> {
        let name = &self.embedment.name;

        let pending = match source.embedments.get(name) {
            Some(EmbedmentState::One(_)) => None,
            Some(EmbedmentState::Raw(raw)) => Some(raw.clone()),
            Some(EmbedmentState::Many(_)) | None => Some(Value::Null),
        };

        if let Some(raw) = pending {
            self.set(source, Target::Value(raw), true)?;
        }

        match source.embedments.get_mut(name) {
            Some(EmbedmentState::One(target)) => Ok(target.as_deref_mut()),
            _ => Ok(None),
        }
    }

    pub fn set(&self, source: &mut Resource, target: Target, loading: bool) -> Result<()> {
        let mut target = match target {
            Target::Resource(resource) => {
                check_target(self.embedment, &resource)?;
                Some(resource)
            }
            Target::Value(Value::Null) => None,
            Target::Value(Value::Document(attributes)) => Some(build_target(
                &self.embedment.target,
                attributes,
                loading,
            )?),
            other => {
                return Err(mismatch(
                    self.embedment,
                    &format!("{}, an attribute document or Null", self.embedment.target.name),
                    &other,
                ))
            }
        };

        if let Some(target) = &mut target {
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
            .insert(name, EmbedmentState::One(target.map(Box::new)));

        Ok(())
    }

    pub fn is_dirty(&self, source: &Resource) -> bool {
        match source.embedments.get(&self.embedment.name) {
            Some(EmbedmentState::One(Some(target))) => target.is_dirty(),
            _ => false,
        }
    }

    pub fn save_cascade(&self, source: &mut Resource) {
        if let Some(EmbedmentState::One(Some(target))) =
            source.embedments.get_mut(&self.embedment.name)
        {
            target.mark_saved();
        }
    }
}
