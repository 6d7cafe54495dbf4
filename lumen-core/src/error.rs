use std::fmt;

/// Typed failure kinds surfaced through `anyhow::Result`. Sampling
/// routines never produce these; a degenerate sample is an empty
/// `Option`, not an error.
#[derive(Debug)]
pub enum Error {
    /// The scene is missing an element required by the operation
    /// (camera, primitives, acceleration structure, light).
    Unsupported(String),
    /// Asset load failure.
    Io(String),
    /// Invalid configuration value.
    InvalidArgument(String),
    /// Named asset lookup failure.
    NotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unsupported(what) => write!(f, "unsupported: {}", what),
            Error::Io(what) => write!(f, "i/o error: {}", what),
            Error::InvalidArgument(what) => write!(f, "invalid argument: {}", what),
            Error::NotFound(what) => write!(f, "not found: {}", what),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = Error::InvalidArgument("mode".into()).into();
        match err.downcast_ref::<Error>() {
            Some(Error::InvalidArgument(what)) => assert_eq!(what, "mode"),
            _ => panic!("lost the typed error"),
        }
    }
}
