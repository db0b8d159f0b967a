//! Arcade gamepad readings
//!
//! The gamepad answers with a `GET(REG_READING)` packet whose data is a list
//! of `(button, pressure)` byte pairs. A button counts as pressed when its
//! pressure is non-zero.

use heapless::Vec;

use crate::frame::{ValidatedFrame, MAX_PAYLOAD_SIZE};
use crate::packet::{Packet, PACKET_HEADER_SIZE};
use crate::services::{arcade_gamepad, get};

/// Largest number of pairs one packet can carry
pub const MAX_BUTTON_READINGS: usize = (MAX_PAYLOAD_SIZE - PACKET_HEADER_SIZE) / 2;

/// Gamepad buttons reported by the shield
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Left,
    Up,
    Right,
    Down,
    A,
    B,
    Menu,
}

// Wire format button indices
const BUTTON_LEFT: u8 = 1;
const BUTTON_UP: u8 = 2;
const BUTTON_RIGHT: u8 = 3;
const BUTTON_DOWN: u8 = 4;
const BUTTON_A: u8 = 5;
const BUTTON_B: u8 = 6;
const BUTTON_MENU: u8 = 7;

impl Button {
    /// All buttons, in wire index order
    pub const ALL: [Button; 7] = [
        Button::Left,
        Button::Up,
        Button::Right,
        Button::Down,
        Button::A,
        Button::B,
        Button::Menu,
    ];

    /// Parse a button from its wire index
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            BUTTON_LEFT => Some(Button::Left),
            BUTTON_UP => Some(Button::Up),
            BUTTON_RIGHT => Some(Button::Right),
            BUTTON_DOWN => Some(Button::Down),
            BUTTON_A => Some(Button::A),
            BUTTON_B => Some(Button::B),
            BUTTON_MENU => Some(Button::Menu),
            _ => None,
        }
    }

    /// Wire index of this button
    pub fn index(self) -> u8 {
        match self {
            Button::Left => BUTTON_LEFT,
            Button::Up => BUTTON_UP,
            Button::Right => BUTTON_RIGHT,
            Button::Down => BUTTON_DOWN,
            Button::A => BUTTON_A,
            Button::B => BUTTON_B,
            Button::Menu => BUTTON_MENU,
        }
    }

    /// Bit of this button in a button mask (bit 0 is never used)
    pub fn mask(self) -> u8 {
        1 << self.index()
    }
}

/// One `(button, pressure)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonReading {
    /// Wire button index
    pub index: u8,
    /// Pressure, 0 when released
    pub pressure: u8,
}

impl ButtonReading {
    /// Mask bit contributed by this reading
    ///
    /// Only indices 1 to 7 map to a bit; anything else, and any zero
    /// pressure, contributes nothing.
    pub fn mask_bit(&self) -> u8 {
        if self.pressure > 0 && (1..=7).contains(&self.index) {
            1 << self.index
        } else {
            0
        }
    }
}

/// A decoded gamepad reading packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamepadReading {
    readings: Vec<ButtonReading, MAX_BUTTON_READINGS>,
}

impl GamepadReading {
    /// Decode the pairs of a reading packet's data
    ///
    /// An odd trailing byte is ignored.
    pub fn parse(data: &[u8]) -> Self {
        let readings = data
            .chunks_exact(2)
            .take(MAX_BUTTON_READINGS)
            .map(|pair| ButtonReading {
                index: pair[0],
                pressure: pair[1],
            })
            .collect();
        Self { readings }
    }

    /// Decode `packet` if it is a reading from `service_number`
    pub fn from_packet(packet: &Packet<'_>, service_number: u8) -> Option<Self> {
        packet
            .matches(service_number, get(arcade_gamepad::REG_READING))
            .then(|| Self::parse(packet.data))
    }

    /// Find the first reading from `service_number` in a frame
    pub fn find(frame: &ValidatedFrame<'_>, service_number: u8) -> Option<Self> {
        frame
            .packets()
            .find_map(|packet| Self::from_packet(&packet, service_number))
    }

    /// Decoded pairs
    pub fn readings(&self) -> &[ButtonReading] {
        &self.readings
    }

    /// Mask of the currently pressed buttons
    pub fn mask(&self) -> u8 {
        self.readings
            .iter()
            .fold(0, |mask, reading| mask | reading.mask_bit())
    }
}
