use thiserror::Error;

use crate::protocol_plugin::{CreateResultCode, EntryResponse, SessionId};

/// Failure raised by a lobby directory while dispatching a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("directory unreachable")]
    Offline,

    #[error("room {0} not found")]
    UnknownSession(SessionId),

    #[error("not allowed to modify room {0}")]
    NotOwner(SessionId),

    #[error("directory request failed: {0}")]
    Request(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("transport already running as {0}")]
    AlreadyRunning(crate::protocol_plugin::SessionRole),

    #[error("transport failed to start: {0}")]
    StartFailed(String),
}

/// Every way a create or join can fail. The display text is the reason shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("invalid id format")]
    InvalidInput,

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("{0}")]
    CreateRejected(CreateResultCode),

    #[error("{0}")]
    EntryRejected(EntryResponse),

    #[error("host data not found")]
    MetadataMissing,

    #[error("connection timed out")]
    Timeout,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("join already in progress")]
    JoinInProgress,

    #[error("create already in progress")]
    CreateInProgress,
}
