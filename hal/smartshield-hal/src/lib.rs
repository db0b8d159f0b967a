//! SmartShield Hardware Abstraction Layer
//!
//! This crate defines the narrow hardware boundary the link driver needs.
//! Board support code (or the `embedded-hal` adapters in the `smartshield`
//! crate) implements these traits for a concrete MCU.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application                            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  smartshield (driver)                   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  smartshield-hal (this crate - traits)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`spi::SpiBus`] - Full-duplex byte exchange with the peer
//! - [`gpio::InputPin`] - The peer's "ready" flow-control line
//! - [`gpio::OutputPin`] - The peer's reset line

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OutputPin};
pub use spi::{Mode, SpiBus, SpiConfig};
