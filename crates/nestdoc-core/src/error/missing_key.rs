use super::Error;

/// A resource cannot address its stored document because a key component is
/// unset.
#[derive(Debug)]
pub(super) struct MissingKeyError {
    model: Box<str>,
    field: Box<str>,
}

impl std::error::Error for MissingKeyError {}

impl core::fmt::Display for MissingKeyError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "resource of model `{}` has no value for key field `{}`",
            self.model, self.field
        )
    }
}

impl Error {
    pub fn missing_key(model: impl Into<Box<str>>, field: impl Into<Box<str>>) -> Error {
        Error::from(super::ErrorKind::MissingKey(MissingKeyError {
            model: model.into(),
            field: field.into(),
        }))
    }

    pub fn is_missing_key(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::MissingKey(_)))
    }
}
