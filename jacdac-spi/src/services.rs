//! Service identifiers, command words and display command payloads
//!
//! Command words combine an access flag with a register or command code:
//! - `0x1000 | reg`: read a register
//! - `0x2000 | reg`: write a register
//! - plain code: service-specific action
//!
//! Values are shared with the peer firmware and must match bit for bit.

use crate::frame::{Frame, FrameError};

/// Register read flag
pub const CMD_GET_REG: u16 = 0x1000;
/// Register write flag
pub const CMD_SET_REG: u16 = 0x2000;

/// Command word reading register `reg`
pub const fn get(reg: u16) -> u16 {
    CMD_GET_REG | reg
}

/// Command word writing register `reg`
pub const fn set(reg: u16) -> u16 {
    CMD_SET_REG | reg
}

/// JACDAC service class of the indexed screen
pub const SERVICE_CLASS_INDEXED_SCREEN: u32 = 0x16fa_36e5;
/// JACDAC service class of the arcade gamepad
pub const SERVICE_CLASS_ARCADE_GAMEPAD: u32 = 0x1dea_a06e;

/// Indexed screen service
pub mod indexed_screen {
    /// Palette register (16 x u32)
    pub const REG_PALETTE: u16 = 0x80;
    /// Brightness register (u8)
    pub const REG_BRIGHTNESS: u16 = 0x01;
    /// Begin a pixel update over a rectangle
    pub const CMD_START_UPDATE: u16 = 0x81;
    /// Pixel data for the update in progress
    pub const CMD_SET_PIXELS: u16 = 0x83;

    /// Palette entries
    pub const PALETTE_SIZE: usize = 16;
    /// Encoded palette size in bytes
    pub const PALETTE_BYTES: usize = PALETTE_SIZE * 4;
}

/// Arcade gamepad service
pub mod arcade_gamepad {
    /// Button reading register
    pub const REG_READING: u16 = 0x101;
}

/// Rectangle carried by the start-update command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    /// Encoded size in bytes
    pub const ENCODED_SIZE: usize = 8;

    /// Rectangle anchored at the origin
    pub const fn full(width: u16, height: u16) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Encode as four little-endian u16 (x, y, width, height)
    pub fn encode(&self, buffer: &mut [u8]) {
        for (chunk, value) in buffer[..Self::ENCODED_SIZE]
            .chunks_exact_mut(2)
            .zip([self.x, self.y, self.width, self.height])
        {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
    }

    /// Decode from at least 8 bytes
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < Self::ENCODED_SIZE {
            return None;
        }
        let field = |i: usize| u16::from_le_bytes([data[i * 2], data[i * 2 + 1]]);
        Some(Self {
            x: field(0),
            y: field(1),
            width: field(2),
            height: field(3),
        })
    }
}

/// Commands the host sends to the display service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCommand<'a> {
    /// Replace the 16-entry palette (0xAARRGGBB per entry)
    SetPalette(&'a [u32; indexed_screen::PALETTE_SIZE]),
    /// Set backlight brightness
    SetBrightness(u8),
    /// Announce a pixel update covering a rectangle
    StartUpdate(Rect),
    /// Packed pixel data for the update in progress
    SetPixels(&'a [u8]),
}

impl<'a> DisplayCommand<'a> {
    /// Command word for this command
    pub fn command(&self) -> u16 {
        match self {
            DisplayCommand::SetPalette(_) => set(indexed_screen::REG_PALETTE),
            DisplayCommand::SetBrightness(_) => set(indexed_screen::REG_BRIGHTNESS),
            DisplayCommand::StartUpdate(_) => indexed_screen::CMD_START_UPDATE,
            DisplayCommand::SetPixels(_) => indexed_screen::CMD_SET_PIXELS,
        }
    }

    /// Data length of the packet this command produces
    pub fn size(&self) -> usize {
        match self {
            DisplayCommand::SetPalette(_) => indexed_screen::PALETTE_BYTES,
            DisplayCommand::SetBrightness(_) => 1,
            DisplayCommand::StartUpdate(_) => Rect::ENCODED_SIZE,
            DisplayCommand::SetPixels(pixels) => pixels.len(),
        }
    }

    /// Append this command as a packet for `service_number`
    pub fn write_to(&self, frame: &mut Frame, service_number: u8) -> Result<(), FrameError> {
        let size = u8::try_from(self.size()).map_err(|_| FrameError::PayloadTooLarge)?;
        let data = frame.push_packet(service_number, self.command(), size)?;

        match self {
            DisplayCommand::SetPalette(palette) => {
                for (chunk, color) in data.chunks_exact_mut(4).zip(palette.iter()) {
                    chunk.copy_from_slice(&color.to_le_bytes());
                }
            }
            DisplayCommand::SetBrightness(level) => data[0] = *level,
            DisplayCommand::StartUpdate(rect) => rect.encode(data),
            DisplayCommand::SetPixels(pixels) => data.copy_from_slice(pixels),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ValidatedFrame;

    #[test]
    fn test_command_words() {
        assert_eq!(set(indexed_screen::REG_PALETTE), 0x2080);
        assert_eq!(set(indexed_screen::REG_BRIGHTNESS), 0x2001);
        assert_eq!(get(arcade_gamepad::REG_READING), 0x1101);
    }

    #[test]
    fn test_rect_encoding() {
        let mut buf = [0u8; 8];
        Rect::full(160, 120).encode(&mut buf);
        assert_eq!(buf, [0, 0, 0, 0, 160, 0, 120, 0]);
        assert_eq!(Rect::decode(&buf), Some(Rect::full(160, 120)));
        assert_eq!(Rect::decode(&buf[..7]), None);
    }

    #[test]
    fn test_start_update_packet() {
        let mut frame = Frame::new(0);
        DisplayCommand::StartUpdate(Rect::full(160, 120))
            .write_to(&mut frame, 1)
            .unwrap();

        let bytes = frame.to_bytes();
        let parsed = ValidatedFrame::parse(&bytes).unwrap();
        let packet = parsed.packets().next().unwrap();
        assert!(packet.matches(1, indexed_screen::CMD_START_UPDATE));
        assert_eq!(Rect::decode(packet.data), Some(Rect::full(160, 120)));
    }

    #[test]
    fn test_palette_packet() {
        let mut palette = [0u32; 16];
        palette[0] = 0x0000_0000;
        palette[1] = 0x00FF_FFFF;
        palette[15] = 0x1122_3344;

        let mut frame = Frame::new(0);
        DisplayCommand::SetPalette(&palette).write_to(&mut frame, 1).unwrap();
        assert_eq!(frame.payload_len(), 68);

        let data = &frame.payload()[4..];
        assert_eq!(&data[4..8], &[0xFF, 0xFF, 0xFF, 0x00]);
        assert_eq!(&data[60..64], &[0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn test_brightness_packet() {
        let mut frame = Frame::new(0);
        DisplayCommand::SetBrightness(200).write_to(&mut frame, 1).unwrap();
        assert_eq!(frame.payload(), &[1, 1, 0x01, 0x20, 200, 0, 0, 0]);
    }

    #[test]
    fn test_set_pixels_too_large() {
        let pixels = [0u8; 256];
        let mut frame = Frame::new(0);
        assert_eq!(
            DisplayCommand::SetPixels(&pixels).write_to(&mut frame, 1),
            Err(FrameError::PayloadTooLarge)
        );
        assert!(frame.is_empty());
    }
}
