use thiserror::Error;

use crate::transport::ApiFailure;

/// Failure taxonomy for coordinator operations.
///
/// `Validation` is raised before any remote call; `Remote` carries the
/// server's rejection verbatim; `Transport` and `Decode` degrade to a stale
/// view until the next successful refresh.
#[derive(Error, Debug)]
pub enum CoordError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("not signed in")]
    NoSession,
}

impl CoordError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NoSession)
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// True for failures where the local view may simply be stale and the
    /// next refresh cycle will reconcile.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Decode(_))
    }
}

impl From<ApiFailure> for CoordError {
    fn from(failure: ApiFailure) -> Self {
        if failure.status == 0 {
            Self::Transport(failure.message)
        } else {
            Self::Remote {
                status: failure.status,
                message: failure.message,
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CoordError>;
