use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Metadata key the host writes its identity under.
pub const HOST_ADDRESS_KEY: &str = "HostAddress";

// Opaque lobby identifier handed out by the directory. Zero is never a valid id.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(NonZeroU64);

impl SessionId {
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// Parses user supplied text. Surrounding whitespace is tolerated, signs and zero are not.
    pub fn parse(text: &str) -> Result<Self, SessionError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SessionError::InvalidInput);
        }
        trimmed
            .parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or(SessionError::InvalidInput)
    }
}

impl FromStr for SessionId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Which side of the transport the local process starts
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionRole {
    Host,
    Client,
}

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionRole::Host => f.write_str("host"),
            SessionRole::Client => f.write_str("client"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LobbyVisibility {
    #[default]
    Private,
    FriendsOnly,
    Public,
    Invisible,
}

pub type SessionMetadata = HashMap<String, String>;

// ==== DIRECTORY RESULT CODES ====

/// Outcome of a create request as reported by the directory.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateResultCode {
    Ok,
    Fail,
    NoConnection,
    AccessDenied,
    Timeout,
    LimitExceeded,
}

impl fmt::Display for CreateResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CreateResultCode::Ok => "ok",
            CreateResultCode::Fail => "request failed",
            CreateResultCode::NoConnection => "no connection to directory",
            CreateResultCode::AccessDenied => "access denied",
            CreateResultCode::Timeout => "directory timed out",
            CreateResultCode::LimitExceeded => "room limit exceeded",
        };
        f.write_str(name)
    }
}

/// Outcome of a join request as reported by the directory.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryResponse {
    Success,
    DoesntExist,
    NotAllowed,
    Full,
    Error,
    Banned,
    Limited,
    RateLimitExceeded,
}

impl fmt::Display for EntryResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryResponse::Success => "success",
            EntryResponse::DoesntExist => "room does not exist",
            EntryResponse::NotAllowed => "not allowed",
            EntryResponse::Full => "room is full",
            EntryResponse::Error => "directory error",
            EntryResponse::Banned => "banned from room",
            EntryResponse::Limited => "account limited",
            EntryResponse::RateLimitExceeded => "rate limit exceeded",
        };
        f.write_str(name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateResult {
    pub code: CreateResultCode,
    pub session: Option<SessionId>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinResult {
    pub response: EntryResponse,
    pub session: SessionId,
}

// ==== EVENTS ====

// 🎮 UI intent sent to the session controller
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub enum SessionRequest {
    Host,
    Join(String),
    Reset,
}

// 📣 Outward notification of a create/join outcome
#[derive(Event, Debug, Clone, PartialEq)]
pub enum SessionResult {
    Created(SessionId),
    CreateFailed(SessionError),
    JoinSucceeded(SessionId),
    JoinFailed(SessionError),
}

impl SessionResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, SessionResult::CreateFailed(_) | SessionResult::JoinFailed(_))
    }

    /// Reason string for failed outcomes.
    pub fn reason(&self) -> Option<String> {
        match self {
            SessionResult::CreateFailed(err) | SessionResult::JoinFailed(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

pub struct ProtocolPlugin;

impl Plugin for ProtocolPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SessionRequest>()
            .add_event::<SessionResult>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_padded_ids() {
        assert_eq!(SessionId::parse("12345").map(SessionId::get), Ok(12345));
        assert_eq!(SessionId::parse("  777\n").map(SessionId::get), Ok(777));
        assert_eq!(
            SessionId::parse("18446744073709551615").map(SessionId::get),
            Ok(u64::MAX)
        );
    }

    #[test]
    fn rejects_malformed_ids() {
        for text in ["", "   ", "notanumber", "-5", "+5", "12a", "1 2", "0", "18446744073709551616"] {
            assert_eq!(SessionId::parse(text), Err(SessionError::InvalidInput), "{text:?}");
        }
    }

    #[test]
    fn displays_as_decimal() {
        let id = SessionId::new(777).unwrap();
        assert_eq!(id.to_string(), "777");
        assert_eq!("777".parse::<SessionId>(), Ok(id));
    }

    #[test]
    fn failure_reason_is_error_display() {
        let failed = SessionResult::JoinFailed(SessionError::Timeout);
        assert!(failed.is_failure());
        assert_eq!(failed.reason().as_deref(), Some("connection timed out"));
        assert_eq!(SessionResult::Created(SessionId::new(1).unwrap()).reason(), None);
    }
}
