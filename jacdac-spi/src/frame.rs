//! Frame encoding and validation for the JACDAC-SPI link.
//!
//! Frame format (252 bytes, little-endian):
//! - MAGIC (2 bytes, offset 0): 0x7ACD for a data frame
//! - LENGTH (1 byte, offset 2): populated payload bytes, 4-byte aligned
//! - FLAGS (1 byte, offset 3): reserved
//! - DEVICE ID (8 bytes, offset 4): addressed peer
//! - PAYLOAD (240 bytes, offset 12): packets, then don't-care bytes
//!
//! Frames are always exchanged at full size. Bytes past LENGTH travel on the
//! wire but are never interpreted.

use crate::packet::{self, PacketIter, PACKET_HEADER_SIZE};

/// Sentinel stamped on every data frame
pub const MAGIC: u16 = 0x7ACD;

/// Sentinel the peer uses for frames that carry nothing
pub const MAGIC_NOOP: u16 = 0xB3CD;

/// Frame header size (MAGIC + LENGTH + FLAGS + DEVICE ID)
pub const HEADER_SIZE: usize = 12;

/// Payload capacity in bytes
pub const MAX_PAYLOAD_SIZE: usize = 240;

/// Size of every frame on the wire
pub const FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD_SIZE;

const MAGIC_OFFSET: usize = 0;
const LENGTH_OFFSET: usize = 2;
const FLAGS_OFFSET: usize = 3;
const DEVICE_ID_OFFSET: usize = 4;
const PAYLOAD_OFFSET: usize = HEADER_SIZE;

/// Reasons a frame is rejected or cannot be built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Magic sentinel does not match (noise or foreign traffic)
    BadMagic,
    /// Peer sent its no-op sentinel
    Noop,
    /// Frame carries no packets
    Empty,
    /// Declared payload length exceeds the payload capacity
    Oversized,
    /// Fewer bytes than a frame header were supplied
    Truncated,
    /// Packet does not fit in the remaining payload space
    PayloadTooLarge,
}

/// Outgoing frame under construction
///
/// One instance is reused for every transmission: [`Frame::begin`] resets it,
/// packets are appended with [`Frame::push_packet`] and [`Frame::encode`]
/// produces the wire image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload_len: u8,
    flags: u8,
    device_id: u64,
    payload: [u8; MAX_PAYLOAD_SIZE],
}

impl Frame {
    /// Create an empty frame addressed to `device_id`
    pub const fn new(device_id: u64) -> Self {
        Self {
            payload_len: 0,
            flags: 0,
            device_id,
            payload: [0; MAX_PAYLOAD_SIZE],
        }
    }

    /// Clear the frame and address it to `device_id`
    pub fn begin(&mut self, device_id: u64) {
        self.payload_len = 0;
        self.flags = 0;
        self.device_id = device_id;
        self.payload.fill(0);
    }

    /// Addressed device
    pub fn device_id(&self) -> u64 {
        self.device_id
    }

    /// Reserved flags byte
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Number of populated payload bytes
    pub fn payload_len(&self) -> usize {
        self.payload_len as usize
    }

    /// Returns true if no packet has been appended
    pub fn is_empty(&self) -> bool {
        self.payload_len == 0
    }

    /// Payload bytes still available for packets
    pub fn remaining(&self) -> usize {
        MAX_PAYLOAD_SIZE - self.payload_len()
    }

    /// Populated part of the payload
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.payload_len()]
    }

    /// Append a packet and return its data region for the caller to fill
    ///
    /// The cursor advances by the packet's aligned footprint, so consecutive
    /// calls pack packets back to back.
    pub fn push_packet(
        &mut self,
        service_number: u8,
        service_command: u16,
        size: u8,
    ) -> Result<&mut [u8], FrameError> {
        let total = packet::footprint(size as usize);
        if total > self.remaining() {
            return Err(FrameError::PayloadTooLarge);
        }

        let start = self.payload_len();
        packet::write_header(
            &mut self.payload[start..start + PACKET_HEADER_SIZE],
            size,
            service_number,
            service_command,
        );
        // total <= MAX_PAYLOAD_SIZE - payload_len, so this stays within u8
        self.payload_len += total as u8;

        let data = start + PACKET_HEADER_SIZE;
        Ok(&mut self.payload[data..data + size as usize])
    }

    /// Append a packet carrying a copy of `data`
    pub fn push_packet_with(
        &mut self,
        service_number: u8,
        service_command: u16,
        data: &[u8],
    ) -> Result<(), FrameError> {
        let size = u8::try_from(data.len()).map_err(|_| FrameError::PayloadTooLarge)?;
        self.push_packet(service_number, service_command, size)?
            .copy_from_slice(data);
        Ok(())
    }

    /// Stamp the magic sentinel and write the full wire image into `buffer`
    pub fn encode(&self, buffer: &mut [u8; FRAME_SIZE]) {
        buffer[MAGIC_OFFSET..LENGTH_OFFSET].copy_from_slice(&MAGIC.to_le_bytes());
        buffer[LENGTH_OFFSET] = self.payload_len;
        buffer[FLAGS_OFFSET] = self.flags;
        buffer[DEVICE_ID_OFFSET..PAYLOAD_OFFSET].copy_from_slice(&self.device_id.to_le_bytes());
        buffer[PAYLOAD_OFFSET..].copy_from_slice(&self.payload);
    }

    /// Encode into a fresh array
    pub fn to_bytes(&self) -> [u8; FRAME_SIZE] {
        let mut buffer = [0u8; FRAME_SIZE];
        self.encode(&mut buffer);
        buffer
    }
}

/// A received frame that passed validation
///
/// Borrows the receive buffer; only the populated part of the payload is
/// exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedFrame<'a> {
    flags: u8,
    device_id: u64,
    payload: &'a [u8],
}

impl<'a> ValidatedFrame<'a> {
    /// Validate a received wire image
    ///
    /// Rejects frames whose magic is not [`MAGIC`] and frames that declare
    /// an empty payload. Nothing beyond the magic is checked; the link has no
    /// CRC.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, FrameError> {
        if bytes.len() < HEADER_SIZE {
            return Err(FrameError::Truncated);
        }

        match u16::from_le_bytes([bytes[MAGIC_OFFSET], bytes[MAGIC_OFFSET + 1]]) {
            MAGIC => {}
            MAGIC_NOOP => return Err(FrameError::Noop),
            _ => return Err(FrameError::BadMagic),
        }

        let length = bytes[LENGTH_OFFSET] as usize;
        if length == 0 {
            return Err(FrameError::Empty);
        }
        if length > MAX_PAYLOAD_SIZE || PAYLOAD_OFFSET + length > bytes.len() {
            return Err(FrameError::Oversized);
        }

        let mut device_id = [0u8; 8];
        device_id.copy_from_slice(&bytes[DEVICE_ID_OFFSET..PAYLOAD_OFFSET]);

        Ok(Self {
            flags: bytes[FLAGS_OFFSET],
            device_id: u64::from_le_bytes(device_id),
            payload: &bytes[PAYLOAD_OFFSET..PAYLOAD_OFFSET + length],
        })
    }

    /// Device identifier carried by the frame
    pub fn device_id(&self) -> u64 {
        self.device_id
    }

    /// Reserved flags byte
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Populated payload bytes
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Iterate over the packets in the payload, in order
    pub fn packets(&self) -> PacketIter<'a> {
        PacketIter::new(self.payload)
    }
}
