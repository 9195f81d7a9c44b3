use bevy::log::LogPlugin;
use bevy::prelude::*;

use shared::prelude::*;

use crate::cli::ClientArgs;
use crate::input::MenuInputPlugin;
use crate::screens::{AutoJoin, ScreensPlugin};

pub struct ClientPlugin {
    args: ClientArgs,
}

impl ClientPlugin {
    pub fn new(args: ClientArgs) -> Self {
        Self { args }
    }
}

impl Plugin for ClientPlugin {
    fn build(&self, app: &mut App) {
        // Basic Bevy plugins
        app.add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Room Link".to_string(),
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    filter: self.args.log_filter.clone(),
                    ..default()
                }),
        );

        info!("🎮 Room Link client starting...");
        app.add_plugins(MenuInputPlugin);

        // Session establishment against the in-process directory
        let registry = LoopbackDirectory::new();
        let directory = match &self.args.identity {
            Some(identity) => registry.connect(identity.clone()),
            None => registry.connect_anonymous(),
        };
        info!("🔐 Local identity: {}", directory.local_identity());

        if self.args.demo_room {
            match open_demo_room(&registry, &self.args.session_config()) {
                Ok(session) => info!("🏠 Demo room ready, join it with id {}", session),
                Err(err) => warn!("❌ Could not open demo room: {}", err),
            }
        }

        app.add_plugins(SessionPlugin)
            .insert_resource(self.args.session_config())
            .insert_resource(Directory::new(directory))
            .insert_resource(Transport::new(LoopbackTransport::default()))
            .insert_resource(AutoJoin(self.args.room.clone()));

        app.add_plugins(ScreensPlugin);
        app.add_systems(Startup, setup_camera);
    }
}

/// Opens a room owned by a local stand-in host and publishes its address.
fn open_demo_room(registry: &LoopbackDirectory, config: &SessionConfig) -> Result<SessionId, SessionError> {
    let mut host = registry.connect("demo-host");
    host.create_session(config.visibility, config.capacity)?;
    let session = match host.poll_callback() {
        Some(DirectoryCallback::Created(CreateResult {
            code: CreateResultCode::Ok,
            session: Some(session),
        })) => session,
        Some(DirectoryCallback::Created(result)) => return Err(SessionError::CreateRejected(result.code)),
        _ => return Err(SessionError::CreateRejected(CreateResultCode::Fail)),
    };
    let identity = host.local_identity();
    host.set_metadata(session, &config.host_address_key, &identity)?;
    Ok(session)
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_room_is_joinable() {
        let registry = LoopbackDirectory::new();
        let session = open_demo_room(&registry, &SessionConfig::default()).unwrap();

        assert_eq!(
            registry.metadata(session, HOST_ADDRESS_KEY).as_deref(),
            Some("demo-host")
        );
        assert_eq!(registry.capacity(session), Some(4));
    }
}
