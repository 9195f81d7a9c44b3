use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::protocol_plugin::{LobbyVisibility, HOST_ADDRESS_KEY};

// 🏠 Session establishment configuration
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub capacity: u32,                // 4 players per room
    pub visibility: LobbyVisibility,  // private rooms, joined by id
    pub join_timeout: Duration,       // give up on a join after 10s
    pub host_address_key: String,     // "HostAddress"
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: 4,
            visibility: LobbyVisibility::Private,
            join_timeout: Duration::from_secs(10),
            host_address_key: HOST_ADDRESS_KEY.to_string(),
        }
    }
}
