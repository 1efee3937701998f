use std::collections::HashSet;

use super::types::{Key, MouseButton};

/// Per-frame input deltas.
///
/// `InputState` holds what is down right now; `InputFrame` holds what changed
/// since the previous frame and is cleared after every frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Pointer motion in physical pixels, summed over the frame.
    pub pointer_delta: (f32, f32),

    /// Wheel motion in lines, summed over the frame.
    pub wheel_lines: f32,

    pub keys_pressed: HashSet<Key>,
    pub buttons_pressed: HashSet<MouseButton>,
    pub buttons_released: HashSet<MouseButton>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.pointer_delta = (0.0, 0.0);
        self.wheel_lines = 0.0;
        self.keys_pressed.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }
}
