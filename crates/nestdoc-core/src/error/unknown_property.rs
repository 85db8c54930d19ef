use super::Error;

/// An attribute name that is neither a field nor an embedment of the model.
#[derive(Debug)]
pub(super) struct UnknownPropertyError {
    model: Box<str>,
    name: Box<str>,
}

impl std::error::Error for UnknownPropertyError {}

impl core::fmt::Display for UnknownPropertyError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "model `{}` has no property `{}`", self.model, self.name)
    }
}

impl Error {
    pub fn unknown_property(model: impl Into<Box<str>>, name: impl Into<Box<str>>) -> Error {
        Error::from(super::ErrorKind::UnknownProperty(UnknownPropertyError {
            model: model.into(),
            name: name.into(),
        }))
    }

    pub fn is_unknown_property(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::UnknownProperty(_)))
    }
}
