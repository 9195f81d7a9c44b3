use std::time::Duration;

use clap::{Parser, ValueEnum};
use shared::prelude::*;

#[derive(Parser, Debug, Clone)]
#[command(name = "roomlink-client")]
#[command(about = "Host a Room Link room or join one by id")]
pub struct ClientArgs {
    /// Identity published to joiners as the host address (random when omitted)
    #[arg(long, env = "ROOMLINK_IDENTITY")]
    pub identity: Option<String>,

    /// Players per hosted room
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..=250))]
    pub capacity: u32,

    #[arg(long, value_enum, default_value_t = VisibilityArg::Private)]
    pub visibility: VisibilityArg,

    /// Seconds to wait for the directory before a join is given up
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub join_timeout_secs: u64,

    #[arg(long, env = "ROOMLINK_LOG", default_value = "info,wgpu=error,naga=warn")]
    pub log_filter: String,

    /// Join this room right after startup
    #[arg(long)]
    pub room: Option<String>,

    /// Open a room owned by a local demo host so joining can be tried out
    #[arg(long)]
    pub demo_room: bool,

    /// Print the effective session configuration as JSON and exit
    #[arg(long)]
    pub print_config: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityArg {
    Private,
    FriendsOnly,
    Public,
    Invisible,
}

impl From<VisibilityArg> for LobbyVisibility {
    fn from(arg: VisibilityArg) -> Self {
        match arg {
            VisibilityArg::Private => LobbyVisibility::Private,
            VisibilityArg::FriendsOnly => LobbyVisibility::FriendsOnly,
            VisibilityArg::Public => LobbyVisibility::Public,
            VisibilityArg::Invisible => LobbyVisibility::Invisible,
        }
    }
}

impl ClientArgs {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            capacity: self.capacity,
            visibility: self.visibility.into(),
            join_timeout: Duration::from_secs(self.join_timeout_secs),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_session_defaults() {
        let args = ClientArgs::try_parse_from(["roomlink-client"]).unwrap();
        assert_eq!(args.session_config(), SessionConfig::default());
        assert!(args.room.is_none());
    }

    #[test]
    fn overrides_reach_session_config() {
        let args = ClientArgs::try_parse_from([
            "roomlink-client",
            "--capacity",
            "8",
            "--visibility",
            "friends-only",
            "--join-timeout-secs",
            "3",
            "--room",
            "777",
        ])
        .unwrap();

        let config = args.session_config();
        assert_eq!(config.capacity, 8);
        assert_eq!(config.visibility, LobbyVisibility::FriendsOnly);
        assert_eq!(config.join_timeout, Duration::from_secs(3));
        assert_eq!(args.room.as_deref(), Some("777"));
    }

    #[test]
    fn rejects_zero_capacity() {
        assert!(ClientArgs::try_parse_from(["roomlink-client", "--capacity", "0"]).is_err());
    }
}
