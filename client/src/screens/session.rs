use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

use shared::prelude::*;

use super::{button_bundle, button_color, button_label, AppState, MenuStatus, StatusTone, SCREEN_BACKGROUND};
use crate::input::MenuAction;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(AppState::InSession), spawn_session_screen)
        .add_systems(OnExit(AppState::InSession), cleanup_session_screen)
        .add_systems(
            Update,
            leave_session
                .before(SessionSet)
                .run_if(in_state(AppState::InSession)),
        );
}

// Marker tag for session screen components.
#[derive(Component)]
struct SessionUI;

#[derive(Component)]
struct LeaveButton;

fn session_headline(role: Option<SessionRole>, session: Option<SessionId>) -> String {
    match (role, session) {
        (Some(SessionRole::Host), Some(session)) => format!("Hosting room {session}"),
        (Some(SessionRole::Client), Some(session)) => format!("Connected to room {session}"),
        _ => "Not in a room".to_string(),
    }
}

fn spawn_session_screen(mut commands: Commands, controller: Res<SessionController>) {
    let headline = session_headline(controller.role(), controller.current_session());
    info!("🎮 {}", headline);

    commands
        .spawn((
            SessionUI,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(SCREEN_BACKGROUND),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(headline),
                TextFont::from_font_size(30.0),
                TextColor(Color::WHITE),
                Node {
                    margin: UiRect::bottom(Val::Px(20.0)),
                    ..default()
                },
            ));

            parent
                .spawn((button_bundle(150.0), LeaveButton))
                .with_children(|b| {
                    b.spawn(button_label("LEAVE"));
                });
        });
}

fn cleanup_session_screen(mut commands: Commands, session_query: Query<Entity, With<SessionUI>>) {
    for entity in session_query.iter() {
        commands.entity(entity).despawn();
    }
}

// 👋 LEAVE button or Escape drops the room and returns to the menu
fn leave_session(
    mut interaction_query: Query<(&Interaction, &mut BackgroundColor), (Changed<Interaction>, With<LeaveButton>)>,
    actions: Res<ActionState<MenuAction>>,
    mut requests: EventWriter<SessionRequest>,
    mut status: ResMut<MenuStatus>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let mut leave = actions.just_pressed(&MenuAction::Leave);
    for (interaction, mut color) in interaction_query.iter_mut() {
        *color = BackgroundColor(button_color(*interaction));
        leave |= *interaction == Interaction::Pressed;
    }
    if !leave {
        return;
    }

    requests.write(SessionRequest::Reset);
    *status = MenuStatus::default();
    status.set("Left the room.", StatusTone::Neutral);
    next_state.set(AppState::MainMenu);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headline_names_role_and_room() {
        let session = SessionId::new(777);
        assert_eq!(
            session_headline(Some(SessionRole::Host), session),
            "Hosting room 777"
        );
        assert_eq!(
            session_headline(Some(SessionRole::Client), session),
            "Connected to room 777"
        );
        assert_eq!(session_headline(None, None), "Not in a room");
    }
}
