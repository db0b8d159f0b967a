//! Frame exchange over the SPI link
//!
//! [`Link`] owns the bus plus one outgoing frame and one receive buffer,
//! reused for every exchange. An exchange clocks the full frame out while
//! clocking the peer's frame in; there is no partial exchange.

use jacdac_spi::{Frame, FrameError, GamepadReading, ValidatedFrame, FRAME_SIZE};
use smartshield_hal::SpiBus;

/// Errors surfaced by link operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// The SPI bus reported an error
    Transport(E),
    /// Ready line stayed low past the configured spin limit
    ReadyTimeout,
    /// Ready line could not be awaited
    Ready,
    /// A packet did not fit in the outgoing frame
    Frame(FrameError),
}

impl<E> From<FrameError> for LinkError<E> {
    fn from(error: FrameError) -> Self {
        LinkError::Frame(error)
    }
}

/// What the driver made of a received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// Frame failed validation and was dropped
    Discarded(FrameError),
    /// Valid frame without a gamepad reading
    Ignored,
    /// Gamepad reading decoded into this button mask
    Buttons(u8),
}

/// Exchange engine for one peer
pub struct Link<SPI> {
    spi: SPI,
    device_id: u64,
    tx: Frame,
    tx_bytes: [u8; FRAME_SIZE],
    rx_bytes: [u8; FRAME_SIZE],
}

impl<SPI: SpiBus> Link<SPI> {
    /// Create a link addressing `device_id`
    pub fn new(spi: SPI, device_id: u64) -> Self {
        Self {
            spi,
            device_id,
            tx: Frame::new(device_id),
            tx_bytes: [0; FRAME_SIZE],
            rx_bytes: [0; FRAME_SIZE],
        }
    }

    /// Clear the outgoing frame and return it for packet building
    pub fn begin_frame(&mut self) -> &mut Frame {
        self.tx.begin(self.device_id);
        &mut self.tx
    }

    /// Outgoing frame as built so far
    pub fn frame(&self) -> &Frame {
        &self.tx
    }

    /// Send the outgoing frame and capture the peer's frame
    pub fn exchange(&mut self) -> Result<(), LinkError<SPI::Error>> {
        self.tx.encode(&mut self.tx_bytes);
        self.spi
            .transfer(&mut self.rx_bytes, &self.tx_bytes)
            .map_err(LinkError::Transport)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("exchanged frame, {} payload bytes out", self.tx.payload_len());

        Ok(())
    }

    /// Validate the most recently received frame
    pub fn response(&self) -> Result<ValidatedFrame<'_>, FrameError> {
        ValidatedFrame::parse(&self.rx_bytes)
    }

    /// Decode the most recently received frame
    ///
    /// Looks for a reading from `gamepad_service`; everything else in the
    /// frame is ignored.
    pub fn decode(&self, gamepad_service: u8) -> Response {
        match self.response() {
            Ok(frame) => match GamepadReading::find(&frame, gamepad_service) {
                Some(reading) => Response::Buttons(reading.mask()),
                None => Response::Ignored,
            },
            Err(error) => {
                #[cfg(feature = "defmt")]
                defmt::trace!("dropping received frame: {:?}", error);
                Response::Discarded(error)
            }
        }
    }

    /// Raw bytes of the last received frame
    pub fn received(&self) -> &[u8; FRAME_SIZE] {
        &self.rx_bytes
    }

    /// Release the bus
    pub fn release(self) -> SPI {
        self.spi
    }
}
