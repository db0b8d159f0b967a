//! Host-side driver for the SmartShield companion board
//!
//! The shield carries a 160x120 indexed-color display and an arcade gamepad,
//! reached over a JACDAC-SPI link: fixed 252-byte frames exchanged
//! byte-for-byte, paced by a ready line the shield raises when it can take
//! the next frame.
//!
//! This crate provides:
//! - `Framebuffer`: 4-bit column-major pixel store, with text rendering and
//!   an `embedded-graphics` `DrawTarget`
//! - `SmartShield`: connection lifecycle, framebuffer push, display
//!   commands, and button state decoded from the shield's responses
//! - `HalSpi` / `HalPin`: adapters from `embedded-hal` 1.0 peripherals
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   UpdatePlan    ┌──────────┐  252 B  ┌──────────┐
//! │ Framebuffer  │ ──────────────► │   Link   │ ◄─────► │  Shield  │
//! └──────────────┘  column batches └──────────┘   SPI   └──────────┘
//!                                       │                    │
//!                                       ▼                    │ ready
//!                                 ┌─────────────┐            │
//!                                 │ ButtonState │ ◄── SmartShield
//!                                 └─────────────┘
//! ```
//!
//! A full update is one start-update frame and 54 frames of pixel columns.
//! Every exchange also brings back a frame from the shield; gamepad
//! readings in it update the button state.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod config;
pub mod driver;
pub mod framebuffer;
pub mod input;
pub mod link;
pub mod text;
pub mod update;

#[cfg(test)]
mod mock;

// Re-export key types
pub use adapters::{hal_spi_mode, HalPin, HalSpi};
pub use config::ShieldConfig;
pub use driver::{SmartShield, Transmit, UpdateStatus};
pub use framebuffer::{Framebuffer, FRAMEBUFFER_SIZE, HEIGHT, WIDTH};
pub use input::ButtonState;
pub use jacdac_spi::Button;
pub use link::{LinkError, Response};
pub use text::TextStyle;
