use std::collections::HashSet;

use glam::Vec2;
use townwalk_shared::actions::ActionFlags;
use winit::keyboard::KeyCode;

/// Which physical keys drive each action. Any listed key asserts the action.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub actions: Vec<(ActionFlags, Vec<KeyCode>)>,
    pub toggle_camera: KeyCode,
    pub release_cursor: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            actions: vec![
                (ActionFlags::FORWARD, vec![KeyCode::KeyW, KeyCode::ArrowUp]),
                (ActionFlags::BACKWARD, vec![KeyCode::KeyS, KeyCode::ArrowDown]),
                (ActionFlags::LEFT, vec![KeyCode::KeyA, KeyCode::ArrowLeft]),
                (ActionFlags::RIGHT, vec![KeyCode::KeyD, KeyCode::ArrowRight]),
                (ActionFlags::JUMP, vec![KeyCode::Space]),
                (ActionFlags::RUN, vec![KeyCode::ShiftLeft]),
            ],
            toggle_camera: KeyCode::KeyV,
            release_cursor: KeyCode::Escape,
        }
    }
}

#[derive(Debug, Default)]
pub struct InputState {
    pressed_keys: HashSet<KeyCode>,
    pub mouse_delta: Vec2,
}

impl InputState {
    pub fn press_key(&mut self, key: KeyCode) {
        self.pressed_keys.insert(key);
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.pressed_keys.remove(&key);
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    pub fn add_mouse_delta(&mut self, delta: Vec2) {
        self.mouse_delta += delta;
    }

    /// Returns the motion accumulated since the last call and resets it.
    pub fn take_mouse_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.mouse_delta)
    }

    /// Held-key state collapsed into action flags, sampled once per tick.
    pub fn sample(&self, bindings: &KeyBindings) -> ActionFlags {
        bindings
            .actions
            .iter()
            .filter(|(_, keys)| keys.iter().any(|key| self.is_pressed(*key)))
            .fold(ActionFlags::empty(), |flags, (action, _)| flags | *action)
    }

    /// Forgets held keys and pending motion, e.g. when focus is lost.
    pub fn clear(&mut self) {
        self.pressed_keys.clear();
        self.mouse_delta = Vec2::ZERO;
    }
}
