//! SPI bus abstractions
//!
//! The link is byte-synchronous: every byte clocked out yields exactly one
//! byte clocked in. Implementations only have to provide
//! [`SpiBus::transfer_byte`]; buffer transfers default to a byte loop.

/// SPI bus master
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Exchange a single byte (send `byte`, return the byte received)
    fn transfer_byte(&mut self, byte: u8) -> Result<u8, Self::Error>;

    /// Transfer data (simultaneous read/write)
    ///
    /// Writes data from `write` buffer while reading into `read` buffer.
    /// Both buffers must be the same length; extra bytes in the longer one
    /// are left untouched.
    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        for (rx, &tx) in read.iter_mut().zip(write) {
            *rx = self.transfer_byte(tx)?;
        }
        Ok(())
    }

    /// Transfer data in place
    ///
    /// Writes data from buffer while reading into the same buffer.
    fn transfer_in_place(&mut self, data: &mut [u8]) -> Result<(), Self::Error> {
        for byte in data.iter_mut() {
            *byte = self.transfer_byte(*byte)?;
        }
        Ok(())
    }
}

impl<T: SpiBus + ?Sized> SpiBus for &mut T {
    type Error = T::Error;

    fn transfer_byte(&mut self, byte: u8) -> Result<u8, Self::Error> {
        (**self).transfer_byte(byte)
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        (**self).transfer(read, write)
    }

    fn transfer_in_place(&mut self, data: &mut [u8]) -> Result<(), Self::Error> {
        (**self).transfer_in_place(data)
    }
}

/// SPI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock mode
    pub mode: Mode,
    /// Most significant bit first
    pub msb_first: bool,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 16_000_000, // 16 MHz
            mode: Mode::Mode0,
            msb_first: true,
        }
    }
}

/// SPI clock mode (CPOL, CPHA)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}
