//! Gamepad button state and edge detection
//!
//! The shield reports its buttons as part of every response frame. The
//! driver keeps the latest mask and the one before it; "down" and "up" edges
//! are derived from the pair.

use jacdac_spi::Button;

/// Current and previous button masks
///
/// Bits 1-7 follow [`Button::mask`]; bit 0 is never set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonState {
    current: u8,
    previous: u8,
}

impl ButtonState {
    /// Both masks cleared
    pub const fn new() -> Self {
        Self {
            current: 0,
            previous: 0,
        }
    }

    /// Record a freshly decoded mask, shifting the current one into history
    pub fn update(&mut self, mask: u8) {
        self.previous = self.current;
        self.current = mask;
    }

    /// Mask from the latest reading
    pub fn current(&self) -> u8 {
        self.current
    }

    /// Mask from the reading before that
    pub fn previous(&self) -> u8 {
        self.previous
    }

    /// Any button in `mask` is held
    pub fn is_pressed(&self, mask: u8) -> bool {
        self.current & mask != 0
    }

    /// A button in `mask` went down with the latest reading
    pub fn is_down(&self, mask: u8) -> bool {
        self.current & mask != 0 && self.previous & mask == 0
    }

    /// A button in `mask` was released with the latest reading
    pub fn is_up(&self, mask: u8) -> bool {
        self.current & mask == 0 && self.previous & mask != 0
    }

    pub fn pressed(&self, button: Button) -> bool {
        self.is_pressed(button.mask())
    }

    pub fn down(&self, button: Button) -> bool {
        self.is_down(button.mask())
    }

    pub fn up(&self, button: Button) -> bool {
        self.is_up(button.mask())
    }
}
