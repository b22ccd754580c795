use panicguard_core::Sentinel;
use thiserror::Error;

/// Errors returned by [`FileStorage`](crate::FileStorage) backends.
///
/// Every storage failure names the [`Sentinel`] it refines so callers can
/// classify it before wrapping it into a fault.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A sentinel condition with no further detail.
    #[error("{0}")]
    Sentinel(#[from] Sentinel),

    /// A sentinel condition with backend detail.
    #[error("{sentinel}: {detail}")]
    Detailed {
        /// The condition this error refines.
        #[source]
        sentinel: Sentinel,
        /// Backend-specific detail.
        detail: String,
    },

    /// A listing query clause was given an empty value.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl StorageError {
    pub fn detailed(sentinel: Sentinel, detail: impl Into<String>) -> Self {
        Self::Detailed {
            sentinel,
            detail: detail.into(),
        }
    }

    /// The sentinel this error refines, if any.
    pub fn sentinel(&self) -> Option<Sentinel> {
        match self {
            Self::Sentinel(s) | Self::Detailed { sentinel: s, .. } => Some(*s),
            Self::InvalidQuery(_) => None,
        }
    }

    /// Returns `true` if this error refines `target`.
    pub fn is(&self, target: Sentinel) -> bool {
        self.sentinel().is_some_and(|s| s.is(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            StorageError::from(Sentinel::FileNotExist).to_string(),
            "file not exist"
        );
        assert_eq!(
            StorageError::detailed(Sentinel::FileRemove, "invalid path").to_string(),
            "fail to remove file: invalid path"
        );
        assert_eq!(
            StorageError::InvalidQuery("delimiter".into()).to_string(),
            "invalid query: delimiter"
        );
    }

    #[test]
    fn sentinel_is_exposed() {
        let err = StorageError::detailed(Sentinel::FailGenerateUuid, "clock");
        assert_eq!(err.sentinel(), Some(Sentinel::FailGenerateUuid));
        assert!(err.is(Sentinel::FileUpload));
        assert!(StorageError::InvalidQuery("prefix".into()).sentinel().is_none());
    }
}
