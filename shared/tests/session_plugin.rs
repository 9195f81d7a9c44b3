use std::time::Duration;

use bevy::{prelude::*, time::TimeUpdateStrategy};
use shared::prelude::*;
use test_log::test;

#[derive(Resource, Default)]
struct ResultLog(Vec<SessionResult>);

fn record_results(mut results: EventReader<SessionResult>, mut log: ResMut<ResultLog>) {
    log.0.extend(results.read().cloned());
}

fn session_app(directory: LoopbackHandle) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, SessionPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(200)))
        .insert_resource(Directory::new(directory))
        .insert_resource(Transport::new(LoopbackTransport::default()))
        .init_resource::<ResultLog>()
        .add_systems(Update, record_results.after(SessionSet));
    app
}

fn take_results(app: &mut App) -> Vec<SessionResult> {
    std::mem::take(&mut app.world_mut().resource_mut::<ResultLog>().0)
}

fn request(app: &mut App, request: SessionRequest) {
    app.world_mut().send_event(request);
}

#[test]
fn host_and_join_through_shared_directory() {
    let registry = LoopbackDirectory::new();
    let mut host_app = session_app(registry.connect("host-identity"));
    let mut join_app = session_app(registry.connect("joiner"));

    request(&mut host_app, SessionRequest::Host);
    host_app.update();

    let results = take_results(&mut host_app);
    let [SessionResult::Created(session)] = results.as_slice() else {
        panic!("host did not create a room: {results:?}");
    };
    let session = *session;
    assert_eq!(
        registry.metadata(session, HOST_ADDRESS_KEY).as_deref(),
        Some("host-identity")
    );

    request(&mut join_app, SessionRequest::Join(session.to_string()));
    join_app.update();

    assert_eq!(
        take_results(&mut join_app),
        vec![SessionResult::JoinSucceeded(session)]
    );
    let controller = join_app.world().resource::<SessionController>();
    assert_eq!(controller.role(), Some(SessionRole::Client));
    assert_eq!(registry.members(session), Some(2));
}

#[test]
fn unanswered_join_times_out_once() {
    let registry = LoopbackDirectory::new();
    let mut directory = registry.connect("joiner");
    directory.hold_callbacks(true);
    let mut app = session_app(directory);

    request(&mut app, SessionRequest::Join("12345".to_string()));
    // 200ms per frame, well past the 10s deadline.
    for _ in 0..70 {
        app.update();
    }

    assert_eq!(
        take_results(&mut app),
        vec![SessionResult::JoinFailed(SessionError::Timeout)]
    );
    assert!(app
        .world()
        .resource::<SessionController>()
        .pending_join()
        .is_none());
}

#[test]
fn configured_timeout_applies_to_new_attempts() {
    let registry = LoopbackDirectory::new();
    let mut directory = registry.connect("joiner");
    directory.hold_callbacks(true);
    let mut app = session_app(directory);
    app.insert_resource(SessionConfig {
        join_timeout: Duration::from_secs(1),
        ..default()
    });
    app.update();

    request(&mut app, SessionRequest::Join("12345".to_string()));
    for _ in 0..10 {
        app.update();
    }

    assert_eq!(
        take_results(&mut app),
        vec![SessionResult::JoinFailed(SessionError::Timeout)]
    );
}

#[test]
fn invalid_id_is_reported_without_attempt() {
    let registry = LoopbackDirectory::new();
    let mut app = session_app(registry.connect("joiner"));

    request(&mut app, SessionRequest::Join("notanumber".to_string()));
    app.update();

    let results = take_results(&mut app);
    assert_eq!(
        results,
        vec![SessionResult::JoinFailed(SessionError::InvalidInput)]
    );
    assert_eq!(results[0].reason().as_deref(), Some("invalid id format"));
    assert!(matches!(
        app.world().resource::<SessionController>().join_state(),
        JoinState::Idle
    ));
}

#[test]
fn reset_leaves_hosted_room() {
    let registry = LoopbackDirectory::new();
    let mut app = session_app(registry.connect("host"));

    request(&mut app, SessionRequest::Host);
    app.update();
    assert_eq!(registry.session_count(), 1);

    request(&mut app, SessionRequest::Reset);
    app.update();

    assert_eq!(registry.session_count(), 0);
    let controller = app.world().resource::<SessionController>();
    assert_eq!(controller.current_session(), None);
    assert_eq!(controller.role(), None);
}

#[test]
fn systems_wait_for_collaborators() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, SessionPlugin))
        .init_resource::<ResultLog>()
        .add_systems(Update, record_results.after(SessionSet));

    request(&mut app, SessionRequest::Host);
    app.update();
    assert!(take_results(&mut app).is_empty());
    app.world_mut().resource_mut::<Events<SessionRequest>>().clear();

    app.insert_resource(Directory::new(LoopbackDirectory::new().connect_anonymous()))
        .insert_resource(Transport::new(LoopbackTransport::default()));
    request(&mut app, SessionRequest::Host);
    app.update();

    assert!(matches!(
        take_results(&mut app).as_slice(),
        [SessionResult::Created(_)]
    ));
}
