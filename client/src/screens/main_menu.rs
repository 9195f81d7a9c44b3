use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

use shared::prelude::*;

use super::{button_bundle, button_color, button_label, AppState, SCREEN_BACKGROUND};
use crate::input::MenuAction;

/// u64 ids never need more digits than this.
const MAX_ROOM_ID_LEN: usize = 20;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<MenuStatus>()
        .init_resource::<RoomIdInput>()
        .init_resource::<AutoJoin>()
        .add_systems(OnEnter(AppState::MainMenu), (setup_main_menu, auto_join).chain())
        .add_systems(OnExit(AppState::MainMenu), cleanup_main_menu)
        .add_systems(Update, apply_session_results.after(SessionSet))
        .add_systems(
            Update,
            (handle_menu_buttons, type_room_id, refresh_menu_text)
                .chain()
                .before(SessionSet)
                .run_if(in_state(AppState::MainMenu)),
        );
}

/// Room to join as soon as the menu opens, from the command line.
#[derive(Resource, Default, Debug, Clone)]
pub struct AutoJoin(pub Option<String>);

#[derive(Resource, Default, Debug, Clone, PartialEq, Eq)]
struct RoomIdInput(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Neutral,
    Pending,
    Success,
    Error,
}

impl StatusTone {
    pub fn color(self) -> Color {
        match self {
            StatusTone::Neutral => Color::srgb(0.9, 0.9, 0.9),
            StatusTone::Pending => Color::srgb(1.0, 0.9, 0.2),
            StatusTone::Success => Color::srgb(0.3, 0.9, 0.3),
            StatusTone::Error => Color::srgb(1.0, 0.3, 0.3),
        }
    }
}

// 📊 What the menu currently tells the player
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct MenuStatus {
    pub room_label: String,
    pub message: String,
    pub tone: StatusTone,
}

impl Default for MenuStatus {
    fn default() -> Self {
        Self {
            room_label: "Room ID: -".to_string(),
            message: String::new(),
            tone: StatusTone::Neutral,
        }
    }
}

impl MenuStatus {
    pub fn set(&mut self, message: impl Into<String>, tone: StatusTone) {
        self.message = message.into();
        self.tone = tone;
    }

    pub fn apply(&mut self, result: &SessionResult) {
        match result {
            SessionResult::Created(session) => {
                self.room_label = format!("Room ID: {session}");
                self.set("Room created successfully!", StatusTone::Success);
            }
            SessionResult::CreateFailed(err) => {
                self.room_label = "Room ID: Failed".to_string();
                self.set(format!("Failed to create room: {err}"), StatusTone::Error);
            }
            SessionResult::JoinSucceeded(session) => {
                self.room_label = format!("Room ID: {session}");
                self.set("Successfully joined the room!", StatusTone::Success);
            }
            SessionResult::JoinFailed(err) => {
                self.set(format!("Error: {err}"), StatusTone::Error);
            }
        }
    }
}

/// Validates the typed room id before it reaches the controller.
fn join_request(text: &str, status: &mut MenuStatus) -> Option<SessionRequest> {
    if text.trim().is_empty() {
        status.set("Error: Room ID is empty!", StatusTone::Error);
        return None;
    }
    status.set("Joining room...", StatusTone::Pending);
    Some(SessionRequest::Join(text.to_string()))
}

fn input_display(input: &RoomIdInput) -> (String, Color) {
    if input.0.is_empty() {
        ("Type a room id".to_string(), Color::srgb(0.6, 0.6, 0.6))
    } else {
        (input.0.clone(), Color::WHITE)
    }
}

// 🏷️ UI component markers
#[derive(Component)]
struct MainMenuUI;

#[derive(Component)]
struct RoomIdText;

#[derive(Component)]
struct RoomInputText;

#[derive(Component)]
struct StatusText;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
enum MenuButton {
    Host,
    Join,
}

// 🏠 Build the main menu
fn setup_main_menu(mut commands: Commands, status: Res<MenuStatus>, input: Res<RoomIdInput>) {
    info!("🏠 Setting up main menu");

    commands
        .spawn((
            MainMenuUI,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                padding: UiRect::all(Val::Percent(2.0)),
                ..default()
            },
            BackgroundColor(SCREEN_BACKGROUND),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("🎮 Room Link"),
                TextFont {
                    font_size: 28.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Node {
                    margin: UiRect::all(Val::Px(15.0)),
                    ..default()
                },
            ));

            parent.spawn((
                Text::new(status.room_label.clone()),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.9)),
                Node {
                    margin: UiRect::all(Val::Px(8.0)),
                    ..default()
                },
                RoomIdText,
            ));

            // Room id input field
            parent
                .spawn((
                    Node {
                        width: Val::Px(260.0),
                        height: Val::Px(40.0),
                        margin: UiRect::all(Val::Px(8.0)),
                        padding: UiRect::horizontal(Val::Px(10.0)),
                        align_items: AlignItems::Center,
                        border: UiRect::all(Val::Px(2.0)),
                        ..default()
                    },
                    BorderColor(Color::srgb(0.57, 0.23, 1.0)),
                    BackgroundColor(Color::srgb(0.1, 0.05, 0.15)),
                ))
                .with_children(|field| {
                    let (text, color) = input_display(&input);
                    field.spawn((
                        Text::new(text),
                        TextFont {
                            font_size: 16.0,
                            ..default()
                        },
                        TextColor(color),
                        RoomInputText,
                    ));
                });

            parent
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    margin: UiRect::all(Val::Px(12.0)),
                    ..default()
                })
                .with_children(|row| {
                    for (button, label) in [(MenuButton::Host, "HOST"), (MenuButton::Join, "JOIN")] {
                        row.spawn((button_bundle(140.0), button))
                            .with_children(|b| {
                                b.spawn(button_label(label));
                            });
                    }
                });

            parent.spawn((
                Text::new(status.message.clone()),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(status.tone.color()),
                Node {
                    margin: UiRect::all(Val::Px(10.0)),
                    max_width: Val::Percent(85.0),
                    ..default()
                },
                StatusText,
            ));
        });
}

fn cleanup_main_menu(mut commands: Commands, menu_query: Query<Entity, With<MainMenuUI>>) {
    for entity in menu_query.iter() {
        commands.entity(entity).despawn();
    }
}

fn auto_join(
    mut auto_join: ResMut<AutoJoin>,
    mut status: ResMut<MenuStatus>,
    mut requests: EventWriter<SessionRequest>,
) {
    if let Some(room) = auto_join.0.take() {
        info!("🔌 Joining room {} from the command line", room);
        if let Some(request) = join_request(&room, &mut status) {
            requests.write(request);
        }
    }
}

// 🎮 Handle HOST / JOIN clicks
fn handle_menu_buttons(
    mut interaction_query: Query<(&Interaction, &mut BackgroundColor, &MenuButton), (Changed<Interaction>, With<Button>)>,
    input: Res<RoomIdInput>,
    mut status: ResMut<MenuStatus>,
    mut requests: EventWriter<SessionRequest>,
) {
    for (interaction, mut color, button) in interaction_query.iter_mut() {
        *color = BackgroundColor(button_color(*interaction));
        if *interaction != Interaction::Pressed {
            continue;
        }
        match button {
            MenuButton::Host => {
                status.set("Creating room...", StatusTone::Pending);
                requests.write(SessionRequest::Host);
            }
            MenuButton::Join => {
                if let Some(request) = join_request(&input.0, &mut status) {
                    requests.write(request);
                }
            }
        }
    }
}

// ⌨️ Digits go into the room id field, Backspace erases, Enter joins
fn type_room_id(
    mut keys: EventReader<KeyboardInput>,
    actions: Res<ActionState<MenuAction>>,
    mut input: ResMut<RoomIdInput>,
    mut status: ResMut<MenuStatus>,
    mut requests: EventWriter<SessionRequest>,
) {
    for key in keys.read() {
        if !key.state.is_pressed() {
            continue;
        }
        if let Key::Character(chars) = &key.logical_key {
            for digit in chars.chars().filter(char::is_ascii_digit) {
                if input.0.len() < MAX_ROOM_ID_LEN {
                    input.0.push(digit);
                }
            }
        }
    }

    if actions.just_pressed(&MenuAction::Erase) {
        input.0.pop();
    }
    if actions.just_pressed(&MenuAction::Submit) {
        if let Some(request) = join_request(&input.0, &mut status) {
            requests.write(request);
        }
    }
}

fn refresh_menu_text(
    status: Res<MenuStatus>,
    input: Res<RoomIdInput>,
    mut room_query: Query<&mut Text, (With<RoomIdText>, Without<StatusText>, Without<RoomInputText>)>,
    mut status_query: Query<(&mut Text, &mut TextColor), (With<StatusText>, Without<RoomInputText>)>,
    mut input_query: Query<(&mut Text, &mut TextColor), (With<RoomInputText>, Without<StatusText>)>,
) {
    if status.is_changed() {
        if let Ok(mut text) = room_query.single_mut() {
            **text = status.room_label.clone();
        }
        if let Ok((mut text, mut color)) = status_query.single_mut() {
            **text = status.message.clone();
            color.0 = status.tone.color();
        }
    }

    if input.is_changed() {
        if let Ok((mut text, mut color)) = input_query.single_mut() {
            let (shown, shown_color) = input_display(&input);
            **text = shown;
            color.0 = shown_color;
        }
    }
}

// 🎯 Reflect session outcomes in the menu and move on once the transport runs
fn apply_session_results(
    mut results: EventReader<SessionResult>,
    mut status: ResMut<MenuStatus>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for result in results.read() {
        status.apply(result);
        if matches!(result, SessionResult::Created(_) | SessionResult::JoinSucceeded(_)) {
            next_state.set(AppState::InSession);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_room_id_is_refused_locally() {
        let mut status = MenuStatus::default();
        assert_eq!(join_request("   ", &mut status), None);
        assert_eq!(status.message, "Error: Room ID is empty!");
        assert_eq!(status.tone, StatusTone::Error);
    }

    #[test]
    fn typed_room_id_becomes_join_request() {
        let mut status = MenuStatus::default();
        assert_eq!(
            join_request("777", &mut status),
            Some(SessionRequest::Join("777".to_string()))
        );
        assert_eq!(status.message, "Joining room...");
        assert_eq!(status.tone, StatusTone::Pending);
    }

    #[test]
    fn results_update_room_label_and_status() {
        let session = SessionId::new(777).unwrap();
        let mut status = MenuStatus::default();

        status.apply(&SessionResult::Created(session));
        assert_eq!(status.room_label, "Room ID: 777");
        assert_eq!(status.message, "Room created successfully!");
        assert_eq!(status.tone, StatusTone::Success);

        status.apply(&SessionResult::JoinFailed(SessionError::Timeout));
        assert_eq!(status.message, "Error: connection timed out");
        assert_eq!(status.tone, StatusTone::Error);

        status.apply(&SessionResult::CreateFailed(SessionError::CreateRejected(
            CreateResultCode::Fail,
        )));
        assert_eq!(status.room_label, "Room ID: Failed");
        assert_eq!(status.message, "Failed to create room: request failed");
    }
}
