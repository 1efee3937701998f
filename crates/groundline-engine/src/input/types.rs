/// Keyboard keys the runtime maps explicitly.
///
/// Everything else arrives as `Key::Unknown` with the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Space,
    G,
    N,
    R,
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Press/release state shared by keys and buttons.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer position in physical pixels, origin top-left.
    PointerMoved { x: f32, y: f32 },

    /// Pointer left the window surface.
    PointerLeft,

    PointerButton {
        button: MouseButton,
        state: ButtonState,
    },

    /// Vertical wheel motion in lines, positive away from the user.
    Wheel { lines: f32 },

    Key {
        key: Key,
        state: ButtonState,
        /// True for auto-repeat.
        repeat: bool,
    },

    /// Window focus change.
    Focused(bool),
}
