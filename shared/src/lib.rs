//! Session establishment for Room Link: host a room or join one by id through a
//! lobby directory, then start the network transport in the matching role.

pub mod config;
pub mod controller;
pub mod directory;
pub mod error;
pub mod loopback;
pub mod protocol_plugin;
pub mod shared_plugin;

pub use protocol_plugin::*;
pub use shared_plugin::{Directory, SessionPlugin, SessionSet, Transport};

pub mod prelude {
    pub use crate::config::SessionConfig;
    pub use crate::controller::{JoinAttempt, JoinOutcome, JoinState, SessionController};
    pub use crate::directory::{DirectoryCallback, LobbyDirectory, NetworkTransport};
    pub use crate::error::{DirectoryError, SessionError, TransportError};
    pub use crate::loopback::{LoopbackDirectory, LoopbackHandle, LoopbackTransport};
    pub use crate::protocol_plugin::*;
    pub use crate::shared_plugin::{Directory, SessionPlugin, SessionSet, Transport};
}
