//! JACDAC-SPI Link Protocol
//!
//! This crate defines the framed protocol spoken between a host controller
//! and the SmartShield peripheral (indexed-color display plus arcade
//! gamepad). Every exchange moves one fixed-size frame in each direction;
//! a frame carries zero or more service packets.
//!
//! # Frame Layout
//!
//! All multi-byte fields are little-endian:
//! ```text
//! ┌───────┬────────┬───────┬───────────┬───────────────────┐
//! │ MAGIC │ LENGTH │ FLAGS │ DEVICE ID │ PAYLOAD           │
//! │ 2B    │ 1B     │ 1B    │ 8B        │ 240B (fixed)      │
//! └───────┴────────┴───────┴───────────┴───────────────────┘
//! ```
//!
//! # Packet Layout (inside the payload, 4-byte aligned)
//! ```text
//! ┌──────┬─────────┬─────────┬──────────────────┬─────────┐
//! │ SIZE │ SERVICE │ COMMAND │ DATA             │ PADDING │
//! │ 1B   │ 1B      │ 2B      │ SIZE bytes       │ 0-3B    │
//! └──────┴─────────┴─────────┴──────────────────┴─────────┘
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod gamepad;
pub mod packet;
pub mod services;

pub use frame::{Frame, FrameError, ValidatedFrame, FRAME_SIZE, MAGIC, MAX_PAYLOAD_SIZE};
pub use gamepad::{Button, ButtonReading, GamepadReading};
pub use packet::{footprint, Packet, PacketIter, PACKET_HEADER_SIZE};
pub use services::{DisplayCommand, Rect};
