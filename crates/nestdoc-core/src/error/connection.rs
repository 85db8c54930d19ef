use super::Error;

/// Error opening or closing a physical database connection.
#[derive(Debug)]
pub(super) struct ConnectionError {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for ConnectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.inner, f)?;
        let mut source = self.inner.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

impl Error {
    /// Creates an error for a failed connection open or close.
    pub fn connection(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::Connection(ConnectionError {
            inner: Box::new(err),
        }))
    }

    /// Returns `true` if this error is a connection error.
    pub fn is_connection(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::Connection(_)))
    }
}
