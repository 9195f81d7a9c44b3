use bevy::prelude::*;

use crate::config::SessionConfig;
use crate::controller::SessionController;
use crate::directory::{LobbyDirectory, NetworkTransport};
use crate::protocol_plugin::{ProtocolPlugin, SessionRequest, SessionResult};

/// Lobby directory the session controller talks to.
#[derive(Resource)]
pub struct Directory(pub Box<dyn LobbyDirectory>);

impl Directory {
    pub fn new(directory: impl LobbyDirectory) -> Self {
        Self(Box::new(directory))
    }
}

/// Network transport started once a room is hosted or joined.
#[derive(Resource)]
pub struct Transport(pub Box<dyn NetworkTransport>);

impl Transport {
    pub fn new(transport: impl NetworkTransport) -> Self {
        Self(Box::new(transport))
    }
}

/// Systems that turn requests into results. UI readers of [`SessionResult`] run after it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionSet;

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(ProtocolPlugin)
            .init_resource::<SessionConfig>()
            .init_resource::<SessionController>()
            .add_systems(
                Update,
                (
                    sync_session_config,
                    handle_session_requests,
                    pump_directory_callbacks,
                    tick_join_timeout,
                    publish_session_results,
                )
                    .chain()
                    .in_set(SessionSet)
                    .run_if(collaborators_present),
            );
    }
}

// ==== SESSION SYSTEMS ====

fn collaborators_present(directory: Option<Res<Directory>>, transport: Option<Res<Transport>>) -> bool {
    directory.is_some() && transport.is_some()
}

fn sync_session_config(config: Res<SessionConfig>, mut controller: ResMut<SessionController>) {
    if config.is_changed() {
        controller.set_config(config.clone());
    }
}

// Turn UI intent into directory requests
fn handle_session_requests(
    mut requests: EventReader<SessionRequest>,
    mut controller: ResMut<SessionController>,
    mut directory: ResMut<Directory>,
    mut transport: ResMut<Transport>,
) {
    for request in requests.read() {
        match request {
            SessionRequest::Host => controller.host_session(directory.0.as_mut()),
            SessionRequest::Join(text) => controller.join_session(text, directory.0.as_mut()),
            SessionRequest::Reset => controller.reset(directory.0.as_mut(), transport.0.as_mut()),
        }
    }
}

// Deliver queued directory callbacks before the deadline is checked, so an answer
// arriving in the same frame as the timeout wins.
fn pump_directory_callbacks(
    mut controller: ResMut<SessionController>,
    mut directory: ResMut<Directory>,
    mut transport: ResMut<Transport>,
) {
    controller.pump(directory.0.as_mut(), transport.0.as_mut());
}

fn tick_join_timeout(time: Res<Time>, mut controller: ResMut<SessionController>) {
    controller.tick(time.delta());
}

fn publish_session_results(mut controller: ResMut<SessionController>, mut results: EventWriter<SessionResult>) {
    results.write_batch(controller.drain_results());
}
