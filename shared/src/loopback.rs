//! In-process lobby directory and transport.
//!
//! Every local participant gets its own [`LoopbackHandle`] onto a shared
//! [`LoopbackDirectory`]. Answers are queued on the handle that sent the request and
//! only come out when that handle is polled, the same way a real directory delivers
//! callbacks when the frame loop pumps it.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::directory::{DirectoryCallback, LobbyDirectory, NetworkTransport};
use crate::error::{DirectoryError, TransportError};
use crate::protocol_plugin::{
    CreateResult, CreateResultCode, EntryResponse, JoinResult, LobbyVisibility, SessionId, SessionMetadata, SessionRole,
};

#[derive(Debug, Clone)]
struct LobbyEntry {
    owner: String,
    visibility: LobbyVisibility,
    capacity: u32,
    members: Vec<String>,
    metadata: SessionMetadata,
}

// In-memory room storage
type Lobbies = Arc<RwLock<HashMap<SessionId, LobbyEntry>>>;

#[derive(Debug, Clone, Default)]
pub struct LoopbackDirectory {
    lobbies: Lobbies,
}

impl LoopbackDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, identity: impl Into<String>) -> LoopbackHandle {
        LoopbackHandle {
            registry: self.clone(),
            identity: identity.into(),
            queue: VecDeque::new(),
            held: false,
            offline: false,
            fail_next_create: None,
            requests_sent: 0,
        }
    }

    /// Handle with a freshly generated identity.
    pub fn connect_anonymous(&self) -> LoopbackHandle {
        self.connect(Uuid::new_v4().to_string())
    }

    pub fn session_count(&self) -> usize {
        self.lobbies.read().len()
    }

    pub fn members(&self, session: SessionId) -> Option<usize> {
        self.lobbies.read().get(&session).map(|lobby| lobby.members.len())
    }

    pub fn capacity(&self, session: SessionId) -> Option<u32> {
        self.lobbies.read().get(&session).map(|lobby| lobby.capacity)
    }

    pub fn visibility(&self, session: SessionId) -> Option<LobbyVisibility> {
        self.lobbies.read().get(&session).map(|lobby| lobby.visibility)
    }

    pub fn owner(&self, session: SessionId) -> Option<String> {
        self.lobbies.read().get(&session).map(|lobby| lobby.owner.clone())
    }

    pub fn metadata(&self, session: SessionId, key: &str) -> Option<String> {
        self.lobbies
            .read()
            .get(&session)
            .and_then(|lobby| lobby.metadata.get(key).cloned())
    }

    fn open_lobby(&self, owner: &str, visibility: LobbyVisibility, capacity: u32) -> SessionId {
        let mut lobbies = self.lobbies.write();
        let session = loop {
            if let Some(session) = SessionId::new(rand::random::<u64>()) {
                if !lobbies.contains_key(&session) {
                    break session;
                }
            }
        };
        lobbies.insert(
            session,
            LobbyEntry {
                owner: owner.to_string(),
                visibility,
                capacity,
                members: vec![owner.to_string()], // Host is the first member
                metadata: SessionMetadata::new(),
            },
        );
        info!("🏠 Created room {} owned by '{}' ({} slots)", session, owner, capacity);
        session
    }

    fn enter_lobby(&self, session: SessionId, member: &str) -> EntryResponse {
        let mut lobbies = self.lobbies.write();
        let Some(lobby) = lobbies.get_mut(&session) else {
            return EntryResponse::DoesntExist;
        };
        if lobby.members.iter().any(|m| m == member) {
            return EntryResponse::Success;
        }
        if lobby.members.len() >= lobby.capacity as usize {
            return EntryResponse::Full;
        }
        lobby.members.push(member.to_string());
        info!("🎮 '{}' entered room {} ({}/{})", member, session, lobby.members.len(), lobby.capacity);
        EntryResponse::Success
    }

    fn leave_lobby(&self, session: SessionId, member: &str) {
        let mut lobbies = self.lobbies.write();
        let Some(lobby) = lobbies.get_mut(&session) else {
            return;
        };
        lobby.members.retain(|m| m != member);
        info!("👋 '{}' left room {}, {} members remaining", member, session, lobby.members.len());

        if lobby.members.is_empty() {
            lobbies.remove(&session);
            info!("🗑️ Removed empty room {}", session);
        } else if lobby.owner == member {
            lobby.owner = lobby.members[0].clone();
            debug!("room {} now owned by '{}'", session, lobby.owner);
        }
    }

    fn write_metadata(&self, session: SessionId, writer: &str, key: &str, value: &str) -> Result<(), DirectoryError> {
        let mut lobbies = self.lobbies.write();
        let lobby = lobbies
            .get_mut(&session)
            .ok_or(DirectoryError::UnknownSession(session))?;
        if lobby.owner != writer {
            return Err(DirectoryError::NotOwner(session));
        }
        lobby.metadata.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One participant's view of a [`LoopbackDirectory`].
#[derive(Debug)]
pub struct LoopbackHandle {
    registry: LoopbackDirectory,
    identity: String,
    queue: VecDeque<DirectoryCallback>,
    held: bool,
    offline: bool,
    fail_next_create: Option<CreateResultCode>,
    requests_sent: usize,
}

impl LoopbackHandle {
    /// Withholds queued callbacks until released, simulating a directory that never answers.
    pub fn hold_callbacks(&mut self, held: bool) {
        self.held = held;
    }

    /// While offline every request fails to dispatch.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Makes the next create request report `code` instead of creating a room.
    pub fn fail_next_create(&mut self, code: CreateResultCode) {
        self.fail_next_create = Some(code);
    }

    /// Number of create and join requests dispatched so far.
    pub fn requests_sent(&self) -> usize {
        self.requests_sent
    }

    fn dispatch(&mut self) -> Result<(), DirectoryError> {
        if self.offline {
            return Err(DirectoryError::Offline);
        }
        self.requests_sent += 1;
        Ok(())
    }
}

impl LobbyDirectory for LoopbackHandle {
    fn create_session(&mut self, visibility: LobbyVisibility, capacity: u32) -> Result<(), DirectoryError> {
        self.dispatch()?;
        let result = match self.fail_next_create.take() {
            Some(code) => CreateResult { code, session: None },
            None => CreateResult {
                code: CreateResultCode::Ok,
                session: Some(self.registry.open_lobby(&self.identity, visibility, capacity)),
            },
        };
        self.queue.push_back(DirectoryCallback::Created(result));
        Ok(())
    }

    fn join_session(&mut self, session: SessionId) -> Result<(), DirectoryError> {
        self.dispatch()?;
        let response = self.registry.enter_lobby(session, &self.identity);
        self.queue
            .push_back(DirectoryCallback::Entered(JoinResult { response, session }));
        Ok(())
    }

    fn leave_session(&mut self, session: SessionId) {
        self.registry.leave_lobby(session, &self.identity);
    }

    fn set_metadata(&mut self, session: SessionId, key: &str, value: &str) -> Result<(), DirectoryError> {
        if self.offline {
            return Err(DirectoryError::Offline);
        }
        self.registry.write_metadata(session, &self.identity, key, value)
    }

    fn metadata(&self, session: SessionId, key: &str) -> Option<String> {
        self.registry.metadata(session, key)
    }

    fn local_identity(&self) -> String {
        self.identity.clone()
    }

    fn poll_callback(&mut self) -> Option<DirectoryCallback> {
        if self.held {
            return None;
        }
        self.queue.pop_front()
    }
}

/// Transport stand-in that only records which role it was started in.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    role: Option<SessionRole>,
}

impl LoopbackTransport {
    pub fn role(&self) -> Option<SessionRole> {
        self.role
    }

    fn start(&mut self, role: SessionRole) -> Result<(), TransportError> {
        if let Some(running) = self.role {
            return Err(TransportError::AlreadyRunning(running));
        }
        info!("🚀 Transport started as {}", role);
        self.role = Some(role);
        Ok(())
    }
}

impl NetworkTransport for LoopbackTransport {
    fn start_host(&mut self) -> Result<(), TransportError> {
        self.start(SessionRole::Host)
    }

    fn start_client(&mut self) -> Result<(), TransportError> {
        self.start(SessionRole::Client)
    }

    fn shutdown(&mut self) {
        if let Some(role) = self.role.take() {
            info!("🛑 Transport stopped ({})", role);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(handle: &mut LoopbackHandle) -> SessionId {
        handle.create_session(LobbyVisibility::Private, 2).unwrap();
        match handle.poll_callback() {
            Some(DirectoryCallback::Created(CreateResult {
                code: CreateResultCode::Ok,
                session: Some(session),
            })) => session,
            other => panic!("unexpected callback {other:?}"),
        }
    }

    fn entry(handle: &mut LoopbackHandle, session: SessionId) -> EntryResponse {
        handle.join_session(session).unwrap();
        match handle.poll_callback() {
            Some(DirectoryCallback::Entered(result)) => result.response,
            other => panic!("unexpected callback {other:?}"),
        }
    }

    #[test]
    fn full_room_rejects_entry() {
        let registry = LoopbackDirectory::new();
        let mut host = registry.connect("host");
        let mut a = registry.connect("a");
        let mut b = registry.connect("b");
        let session = created(&mut host);

        assert_eq!(entry(&mut a, session), EntryResponse::Success);
        assert_eq!(entry(&mut b, session), EntryResponse::Full);
        assert_eq!(registry.members(session), Some(2));
    }

    #[test]
    fn unknown_room_does_not_exist() {
        let registry = LoopbackDirectory::new();
        let mut a = registry.connect_anonymous();
        assert_eq!(
            entry(&mut a, SessionId::new(42).unwrap()),
            EntryResponse::DoesntExist
        );
    }

    #[test]
    fn only_owner_writes_metadata() {
        let registry = LoopbackDirectory::new();
        let mut host = registry.connect("host");
        let mut guest = registry.connect("guest");
        let session = created(&mut host);
        entry(&mut guest, session);

        assert_eq!(
            guest.set_metadata(session, "HostAddress", "guest"),
            Err(DirectoryError::NotOwner(session))
        );
        host.set_metadata(session, "HostAddress", "host").unwrap();
        assert_eq!(guest.metadata(session, "HostAddress").as_deref(), Some("host"));
    }

    #[test]
    fn ownership_moves_on_and_empty_rooms_vanish() {
        let registry = LoopbackDirectory::new();
        let mut host = registry.connect("host");
        let mut guest = registry.connect("guest");
        let session = created(&mut host);
        entry(&mut guest, session);

        host.leave_session(session);
        assert_eq!(registry.owner(session).as_deref(), Some("guest"));

        guest.leave_session(session);
        assert_eq!(registry.session_count(), 0);
    }

    #[test]
    fn held_callbacks_stay_queued() {
        let registry = LoopbackDirectory::new();
        let mut host = registry.connect("host");
        host.hold_callbacks(true);
        host.create_session(LobbyVisibility::Public, 4).unwrap();
        assert_eq!(host.poll_callback(), None);

        host.hold_callbacks(false);
        assert!(matches!(host.poll_callback(), Some(DirectoryCallback::Created(_))));
    }

    #[test]
    fn transport_refuses_second_start() {
        let mut transport = LoopbackTransport::default();
        transport.start_client().unwrap();
        assert_eq!(
            transport.start_host(),
            Err(TransportError::AlreadyRunning(SessionRole::Client))
        );
        transport.shutdown();
        transport.start_host().unwrap();
        assert_eq!(transport.role(), Some(SessionRole::Host));
    }
}
