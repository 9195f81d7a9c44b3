use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use serde::{Deserialize, Serialize};

// Keyboard shortcuts for the menus
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Actionlike)]
pub enum MenuAction {
    Submit,
    Erase,
    Leave,
}

impl MenuAction {
    pub fn default_input_map() -> InputMap<Self> {
        InputMap::new([
            (Self::Submit, KeyCode::Enter),
            (Self::Submit, KeyCode::NumpadEnter),
            (Self::Erase, KeyCode::Backspace),
            (Self::Leave, KeyCode::Escape),
        ])
    }
}

pub struct MenuInputPlugin;

impl Plugin for MenuInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<MenuAction>::default())
            .init_resource::<ActionState<MenuAction>>()
            .insert_resource(MenuAction::default_input_map());
    }
}
