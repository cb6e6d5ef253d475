use enigo::{
    Axis as ScrollAxis, Coordinate,
    Direction::{Press, Release},
    Enigo, InputResult, Keyboard, Mouse, NewConError, Settings,
};

use crate::{KeyCombo, MouseButton};

/// Synthesizes keyboard and pointer input through enigo.
pub struct Performer {
    enigo: Enigo,
}

// SAFETY: the performer is owned by the poll thread; the platform event
// source inside `Enigo` is only used from the thread that calls into it.
unsafe impl Send for Performer {}

impl Performer {
    pub fn new() -> Result<Self, NewConError> {
        let settings = Settings::default();
        let enigo = Enigo::new(&settings)?;
        Ok(Self { enigo })
    }

    /// Press modifiers, then keys.
    pub fn press(&mut self, combo: &KeyCombo) -> InputResult<()> {
        for key in combo.press_order() {
            self.enigo.key(key.into(), Press)?;
        }
        Ok(())
    }

    /// Release keys, then modifiers.
    pub fn release(&mut self, combo: &KeyCombo) -> InputResult<()> {
        for key in combo.release_order() {
            self.enigo.key(key.into(), Release)?;
        }
        Ok(())
    }

    pub fn mouse_press(&mut self, button: MouseButton) -> InputResult<()> {
        self.enigo.button(button.to_enigo(), Press)
    }

    pub fn mouse_release(&mut self, button: MouseButton) -> InputResult<()> {
        self.enigo.button(button.to_enigo(), Release)
    }

    /// Move the pointer relative to its current position.
    pub fn mouse_move(&mut self, dx: i32, dy: i32) -> InputResult<()> {
        self.enigo.move_mouse(dx, dy, Coordinate::Rel)
    }

    /// Scroll horizontally.
    /// Uses macOS specific smooth scrolling.
    #[cfg(target_os = "macos")]
    pub fn scroll_x(&mut self, value: i32) -> InputResult<()> {
        self.enigo.smooth_scroll(value, ScrollAxis::Horizontal)
    }

    /// Scroll vertically.
    /// Uses macOS specific smooth scrolling.
    #[cfg(target_os = "macos")]
    pub fn scroll_y(&mut self, value: i32) -> InputResult<()> {
        self.enigo.smooth_scroll(value, ScrollAxis::Vertical)
    }

    #[cfg(not(target_os = "macos"))]
    pub fn scroll_x(&mut self, value: i32) -> InputResult<()> {
        self.enigo.scroll(value, ScrollAxis::Horizontal)
    }

    #[cfg(not(target_os = "macos"))]
    pub fn scroll_y(&mut self, value: i32) -> InputResult<()> {
        self.enigo.scroll(value, ScrollAxis::Vertical)
    }
}
