use super::Error;

/// An embedment was assigned a target it cannot hold.
#[derive(Debug)]
pub(super) struct TypeMismatchError {
    embedment: Box<str>,
    expected: Box<str>,
    actual: Box<str>,
}

impl std::error::Error for TypeMismatchError {}

impl core::fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "embedment `{}` expects {}; got {}",
            self.embedment, self.expected, self.actual
        )
    }
}

impl Error {
    pub fn type_mismatch(
        embedment: impl Into<Box<str>>,
        expected: impl Into<Box<str>>,
        actual: impl Into<Box<str>>,
    ) -> Error {
        Error::from(super::ErrorKind::TypeMismatch(TypeMismatchError {
            embedment: embedment.into(),
            expected: expected.into(),
            actual: actual.into(),
        }))
    }

    pub fn is_type_mismatch(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::TypeMismatch(_)))
    }
}
