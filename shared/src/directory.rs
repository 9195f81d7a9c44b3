//! Seams to the external services the controller depends on.
//!
//! Both collaborators are driven from the same thread as the frame tick: requests
//! return as soon as they are dispatched and the directory hands its answers back
//! through [`LobbyDirectory::poll_callback`] the next time it is pumped.

use crate::error::{DirectoryError, TransportError};
use crate::protocol_plugin::{CreateResult, JoinResult, LobbyVisibility, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryCallback {
    Created(CreateResult),
    Entered(JoinResult),
}

/// Lobby directory service (create, join, metadata).
pub trait LobbyDirectory: Send + Sync + 'static {
    /// Dispatches a create request. The answer arrives as [`DirectoryCallback::Created`].
    fn create_session(&mut self, visibility: LobbyVisibility, capacity: u32) -> Result<(), DirectoryError>;

    /// Dispatches a join request. The answer arrives as [`DirectoryCallback::Entered`].
    fn join_session(&mut self, session: SessionId) -> Result<(), DirectoryError>;

    fn leave_session(&mut self, session: SessionId);

    fn set_metadata(&mut self, session: SessionId, key: &str, value: &str) -> Result<(), DirectoryError>;

    /// Returns `None` when the key was never written.
    fn metadata(&self, session: SessionId, key: &str) -> Option<String>;

    /// Identity of the local participant, published to joiners as the host address.
    fn local_identity(&self) -> String;

    fn poll_callback(&mut self) -> Option<DirectoryCallback>;
}

/// Network transport that establishes the actual connection once roles are decided.
pub trait NetworkTransport: Send + Sync + 'static {
    fn start_host(&mut self) -> Result<(), TransportError>;

    fn start_client(&mut self) -> Result<(), TransportError>;

    fn shutdown(&mut self);
}
