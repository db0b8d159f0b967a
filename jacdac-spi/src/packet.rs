//! Service packets inside a frame payload.
//!
//! Packet format:
//! - SIZE (1 byte): data length, not counting the header or padding
//! - SERVICE (1 byte): service number on the peer
//! - COMMAND (2 bytes, little-endian): get/set flag plus register or command
//! - DATA (SIZE bytes), then padding up to the next multiple of 4

/// Packet header size
pub const PACKET_HEADER_SIZE: usize = 4;

/// Bytes a packet with `size` data bytes occupies inside the payload
pub const fn footprint(size: usize) -> usize {
    PACKET_HEADER_SIZE + ((size + 3) & !3)
}

/// Write a packet header into the first four bytes of `buffer`
pub(crate) fn write_header(buffer: &mut [u8], size: u8, service_number: u8, service_command: u16) {
    let [cmd_lo, cmd_hi] = service_command.to_le_bytes();
    buffer[0] = size;
    buffer[1] = service_number;
    buffer[2] = cmd_lo;
    buffer[3] = cmd_hi;
}

/// A packet borrowed from a received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    /// Service number on the peer
    pub service_number: u8,
    /// Command word
    pub service_command: u16,
    /// Packet data (exactly `service_size` bytes)
    pub data: &'a [u8],
}

impl<'a> Packet<'a> {
    /// Declared data length
    pub fn service_size(&self) -> u8 {
        self.data.len() as u8
    }

    /// Returns true if this packet is addressed to `service_number` with
    /// `service_command`
    pub fn matches(&self, service_number: u8, service_command: u16) -> bool {
        self.service_number == service_number && self.service_command == service_command
    }
}

/// Iterator over the packets of a payload
///
/// Stops at the end of the populated payload, or at the first packet whose
/// declared size runs past it.
#[derive(Debug, Clone)]
pub struct PacketIter<'a> {
    payload: &'a [u8],
    offset: usize,
}

impl<'a> PacketIter<'a> {
    /// Iterate over the packets packed into `payload`
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload, offset: 0 }
    }
}

impl<'a> Iterator for PacketIter<'a> {
    type Item = Packet<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let header_end = self.offset + PACKET_HEADER_SIZE;
        if header_end > self.payload.len() {
            return None;
        }

        let header = &self.payload[self.offset..header_end];
        let size = header[0] as usize;
        let data_end = header_end + size;
        if data_end > self.payload.len() {
            self.offset = self.payload.len();
            return None;
        }

        let packet = Packet {
            service_number: header[1],
            service_command: u16::from_le_bytes([header[2], header[3]]),
            data: &self.payload[header_end..data_end],
        };
        self.offset += footprint(size);
        Some(packet)
    }
}
