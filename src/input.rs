//! Keyboard bindings.
//!
//! Keys act on release. Bindings map to a `DungeonAction`; the event loop
//! applies it to the `Dungeon`, so no solver logic lives here.

use winit::event::ElementState;
use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DungeonAction {
    Quit,
    TogglePause,
    Begin,
    Reset,
}

/// Action bound to `key`, if any.
pub fn binding(key: KeyCode) -> Option<DungeonAction> {
    match key {
        KeyCode::Escape => Some(DungeonAction::Quit),
        KeyCode::Space => Some(DungeonAction::TogglePause),
        KeyCode::KeyB => Some(DungeonAction::Begin),
        KeyCode::KeyR => Some(DungeonAction::Reset),
        _ => None,
    }
}

/// Translate a key event; presses are ignored.
pub fn process_key(key: KeyCode, state: ElementState) -> Option<DungeonAction> {
    match state {
        ElementState::Released => binding(key),
        ElementState::Pressed => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings() {
        assert_eq!(binding(KeyCode::Escape), Some(DungeonAction::Quit));
        assert_eq!(binding(KeyCode::Space), Some(DungeonAction::TogglePause));
        assert_eq!(binding(KeyCode::KeyB), Some(DungeonAction::Begin));
        assert_eq!(binding(KeyCode::KeyR), Some(DungeonAction::Reset));
        assert_eq!(binding(KeyCode::KeyQ), None);
    }

    #[test]
    fn test_only_release_triggers() {
        assert_eq!(process_key(KeyCode::KeyB, ElementState::Pressed), None);
        assert_eq!(
            process_key(KeyCode::KeyB, ElementState::Released),
            Some(DungeonAction::Begin)
        );
    }
}
