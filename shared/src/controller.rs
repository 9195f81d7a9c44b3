use std::collections::VecDeque;
use std::time::Duration;

use bevy::prelude::*;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::directory::{DirectoryCallback, LobbyDirectory, NetworkTransport};
use crate::error::SessionError;
use crate::protocol_plugin::{CreateResult, CreateResultCode, EntryResponse, JoinResult, SessionId, SessionResult, SessionRole};

/// In-flight join request. Lives only between `join_session` and its resolution.
#[derive(Debug, Clone)]
pub struct JoinAttempt {
    target: String,
    session: SessionId,
    deadline: Timer,
}

impl JoinAttempt {
    fn new(target: &str, session: SessionId, timeout: Duration) -> Self {
        Self {
            target: target.to_string(),
            session,
            deadline: Timer::new(timeout, TimerMode::Once),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn elapsed(&self) -> Duration {
        self.deadline.elapsed()
    }

    pub fn timeout(&self) -> Duration {
        self.deadline.duration()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Success,
    Failure,
    Timeout,
}

#[derive(Debug, Clone, Default)]
pub enum JoinState {
    #[default]
    Idle,
    Pending(JoinAttempt),
    Resolved(JoinOutcome),
}

/// Drives hosting and joining against a lobby directory and a network transport.
///
/// All entry points are called from one thread. Results are queued and handed out
/// through [`SessionController::drain_results`].
#[derive(Resource, Debug, Default)]
pub struct SessionController {
    config: SessionConfig,
    join: JoinState,
    create_pending: bool,
    // Create requests dropped by `reset` whose callbacks are still due.
    abandoned_creates: u32,
    session: Option<SessionId>,
    role: Option<SessionRole>,
    results: VecDeque<SessionResult>,
}

impl SessionController {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Applies to the next request; an attempt already pending keeps its deadline.
    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    pub fn current_session(&self) -> Option<SessionId> {
        self.session
    }

    pub fn role(&self) -> Option<SessionRole> {
        self.role
    }

    pub fn join_state(&self) -> &JoinState {
        &self.join
    }

    pub fn pending_join(&self) -> Option<&JoinAttempt> {
        match &self.join {
            JoinState::Pending(attempt) => Some(attempt),
            _ => None,
        }
    }

    pub fn is_create_pending(&self) -> bool {
        self.create_pending
    }

    pub fn drain_results(&mut self) -> impl Iterator<Item = SessionResult> + '_ {
        self.results.drain(..)
    }

    fn emit(&mut self, result: SessionResult) {
        debug!("session result: {:?}", result);
        self.results.push_back(result);
    }

    // ==== HOSTING ====

    pub fn host_session(&mut self, directory: &mut dyn LobbyDirectory) {
        if self.create_pending {
            warn!("🏠 Ignoring host request, a room is already being created");
            self.emit(SessionResult::CreateFailed(SessionError::CreateInProgress));
            return;
        }

        info!(
            "🏠 Creating {:?} room for {} players",
            self.config.visibility, self.config.capacity
        );
        match directory.create_session(self.config.visibility, self.config.capacity) {
            Ok(()) => self.create_pending = true,
            Err(err) => {
                warn!("❌ Create request failed: {}", err);
                self.emit(SessionResult::CreateFailed(err.into()));
            }
        }
    }

    pub fn on_session_created(
        &mut self,
        result: CreateResult,
        directory: &mut dyn LobbyDirectory,
        transport: &mut dyn NetworkTransport,
    ) {
        if self.abandoned_creates > 0 {
            self.abandoned_creates -= 1;
            debug!("Create callback for an abandoned request: {:?}", result);
            if let (CreateResultCode::Ok, Some(session)) = (result.code, result.session) {
                directory.leave_session(session);
            }
            return;
        }
        if !std::mem::take(&mut self.create_pending) {
            warn!("Create callback without an outstanding request: {:?}", result);
            if let (CreateResultCode::Ok, Some(session)) = (result.code, result.session) {
                directory.leave_session(session);
            }
            return;
        }

        let session = match (result.code, result.session) {
            (CreateResultCode::Ok, Some(session)) => session,
            (CreateResultCode::Ok, None) => {
                warn!("❌ Room creation reported success without an id");
                self.emit(SessionResult::CreateFailed(SessionError::CreateRejected(CreateResultCode::Fail)));
                return;
            }
            (code, _) => {
                warn!("❌ Room creation failed with result: {}", code);
                self.emit(SessionResult::CreateFailed(SessionError::CreateRejected(code)));
                return;
            }
        };
        info!("🏠 Room created with id {}", session);

        let identity = directory.local_identity();
        if let Err(err) = directory.set_metadata(session, &self.config.host_address_key, &identity) {
            warn!("❌ Could not publish host address for room {}: {}", session, err);
            directory.leave_session(session);
            self.emit(SessionResult::CreateFailed(err.into()));
            return;
        }

        if let Err(err) = transport.start_host() {
            warn!("❌ Transport refused to host room {}: {}", session, err);
            directory.leave_session(session);
            self.emit(SessionResult::CreateFailed(err.into()));
            return;
        }

        self.session = Some(session);
        self.role = Some(SessionRole::Host);
        self.emit(SessionResult::Created(session));
    }

    // ==== JOINING ====

    pub fn join_session(&mut self, text: &str, directory: &mut dyn LobbyDirectory) {
        let session = match SessionId::parse(text) {
            Ok(session) => session,
            Err(err) => {
                warn!("❌ Invalid room id provided: {:?}", text);
                self.emit(SessionResult::JoinFailed(err));
                return;
            }
        };

        if let Some(pending) = self.pending_join() {
            warn!(
                "🔌 Ignoring join of room {}, still waiting on room {}",
                session,
                pending.session()
            );
            self.emit(SessionResult::JoinFailed(SessionError::JoinInProgress));
            return;
        }

        info!("🔌 Joining room {}", session);
        self.join = JoinState::Pending(JoinAttempt::new(text, session, self.config.join_timeout));
        if let Err(err) = directory.join_session(session) {
            warn!("❌ Join request for room {} failed: {}", session, err);
            self.join = JoinState::Resolved(JoinOutcome::Failure);
            self.emit(SessionResult::JoinFailed(err.into()));
        }
    }

    pub fn on_session_entered(
        &mut self,
        result: JoinResult,
        directory: &mut dyn LobbyDirectory,
        transport: &mut dyn NetworkTransport,
    ) {
        // The creator is placed in its own room too; that entry is not a join.
        if self.role == Some(SessionRole::Host) && self.session == Some(result.session) {
            return;
        }

        // Only an entry into the room being joined may resolve the attempt.
        let answers_pending = self
            .pending_join()
            .is_some_and(|attempt| attempt.session() == result.session);
        if !answers_pending || self.take_pending().is_none() {
            warn!("Entry into room {} arrived after its join was resolved", result.session);
            if result.response == EntryResponse::Success {
                directory.leave_session(result.session);
            }
            return;
        }

        if result.response != EntryResponse::Success {
            warn!("❌ Joining room {} failed: {}", result.session, result.response);
            self.join = JoinState::Resolved(JoinOutcome::Failure);
            self.emit(SessionResult::JoinFailed(SessionError::EntryRejected(result.response)));
            return;
        }

        let session = result.session;
        let host = directory
            .metadata(session, &self.config.host_address_key)
            .filter(|host| !host.is_empty());
        let Some(host) = host else {
            warn!("❌ Room {} has no host address", session);
            directory.leave_session(session);
            self.join = JoinState::Resolved(JoinOutcome::Failure);
            self.emit(SessionResult::JoinFailed(SessionError::MetadataMissing));
            return;
        };
        info!("🔌 Entered room {} hosted by {}", session, host);

        if let Err(err) = transport.start_client() {
            warn!("❌ Transport refused to connect to room {}: {}", session, err);
            directory.leave_session(session);
            self.join = JoinState::Resolved(JoinOutcome::Failure);
            self.emit(SessionResult::JoinFailed(err.into()));
            return;
        }

        self.session = Some(session);
        self.role = Some(SessionRole::Client);
        self.join = JoinState::Resolved(JoinOutcome::Success);
        self.emit(SessionResult::JoinSucceeded(session));
    }

    /// Advances the pending join's deadline and fails it once the timeout is reached.
    pub fn tick(&mut self, delta: Duration) {
        let JoinState::Pending(attempt) = &mut self.join else {
            return;
        };
        if !attempt.deadline.tick(delta).finished() {
            return;
        }

        if let Some(attempt) = self.take_pending() {
            warn!(
                "⏰ Join of room {} timed out after {:?}",
                attempt.target(),
                attempt.elapsed()
            );
            self.join = JoinState::Resolved(JoinOutcome::Timeout);
            self.emit(SessionResult::JoinFailed(SessionError::Timeout));
        }
    }

    /// Takes the pending attempt out of its slot. Only the first observer gets it.
    fn take_pending(&mut self) -> Option<JoinAttempt> {
        match std::mem::replace(&mut self.join, JoinState::Resolved(JoinOutcome::Failure)) {
            JoinState::Pending(attempt) => Some(attempt),
            other => {
                self.join = other;
                None
            }
        }
    }

    // ==== CALLBACKS & LIFECYCLE ====

    pub fn on_callback(
        &mut self,
        callback: DirectoryCallback,
        directory: &mut dyn LobbyDirectory,
        transport: &mut dyn NetworkTransport,
    ) {
        match callback {
            DirectoryCallback::Created(result) => self.on_session_created(result, directory, transport),
            DirectoryCallback::Entered(result) => self.on_session_entered(result, directory, transport),
        }
    }

    /// Pumps every callback the directory has queued.
    pub fn pump(&mut self, directory: &mut dyn LobbyDirectory, transport: &mut dyn NetworkTransport) {
        while let Some(callback) = directory.poll_callback() {
            self.on_callback(callback, directory, transport);
        }
    }

    /// Leaves the current room, stops the transport and forgets any pending request.
    pub fn reset(&mut self, directory: &mut dyn LobbyDirectory, transport: &mut dyn NetworkTransport) {
        if let Some(session) = self.session.take() {
            info!("👋 Leaving room {}", session);
            directory.leave_session(session);
        }
        if self.role.take().is_some() {
            transport.shutdown();
        }
        self.join = JoinState::Idle;
        if std::mem::take(&mut self.create_pending) {
            self.abandoned_creates += 1;
        }
    }
}
