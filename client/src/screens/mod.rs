use bevy::prelude::*;

mod main_menu;
mod session;

pub use main_menu::{AutoJoin, MenuStatus, StatusTone};

// 🎮 Screens
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    #[default]
    MainMenu,
    InSession,
}

pub struct ScreensPlugin;

impl Plugin for ScreensPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppState>()
            .add_plugins((main_menu::plugin, session::plugin));
    }
}

// 🎨 Purple theme shared by both screens
const BUTTON_NORMAL: Color = Color::srgb(0.57, 0.23, 1.0);
const BUTTON_HOVERED: Color = Color::srgb(0.7, 0.3, 1.0);
const BUTTON_PRESSED: Color = Color::srgb(0.3, 0.6, 0.3);
const SCREEN_BACKGROUND: Color = Color::srgb(0.2, 0.1, 0.3);

fn button_bundle(width: f32) -> impl Bundle {
    (
        Button,
        Node {
            width: Val::Px(width),
            height: Val::Px(50.0),
            margin: UiRect::all(Val::Px(8.0)),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        BackgroundColor(BUTTON_NORMAL),
    )
}

fn button_label(text: &str) -> impl Bundle {
    (
        Text::new(text),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::WHITE),
    )
}

fn button_color(interaction: Interaction) -> Color {
    match interaction {
        Interaction::Pressed => BUTTON_PRESSED,
        Interaction::Hovered => BUTTON_HOVERED,
        Interaction::None => BUTTON_NORMAL,
    }
}
