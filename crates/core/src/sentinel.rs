use thiserror::Error;

/// Plain, identity-comparable causes raised inside collaborators.
///
/// Sentinels have no transport mapping of their own. A collaborator wraps
/// one into a [`Fault`](crate::Fault) before it reaches a recovery boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Sentinel {
    #[error("no rows in result set")]
    NoRows,

    #[error("no rows effected")]
    UpdateNoEffect,

    #[error("fail to close connection")]
    FailCloseSession,

    #[error("file drive not exist")]
    DriveNotExist,

    #[error("file not exist")]
    FileNotExist,

    #[error("fail to upload file")]
    FileUpload,

    /// Refinement of [`Sentinel::FileUpload`].
    #[error("fail to upload file: fail to generate uuid")]
    FailGenerateUuid,

    #[error("fail to update file")]
    FileUpdate,

    #[error("fail to remove file")]
    FileRemove,

    #[error("fail to get file")]
    GetFile,

    #[error("fail to initial file client")]
    InitialFileClient,
}

impl Sentinel {
    /// The sentinel this one refines, if any.
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::FailGenerateUuid => Some(Self::FileUpload),
            _ => None,
        }
    }

    /// Returns `true` if `self` is `target` or a refinement of it.
    pub fn is(self, target: Self) -> bool {
        self == target || self.parent().is_some_and(|p| p.is(target))
    }
}
