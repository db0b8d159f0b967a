//! Driver configuration
//!
//! Defaults match the shield firmware; most applications use
//! `ShieldConfig::default()` unchanged.

use smartshield_hal::SpiConfig;

/// Device identifier the shield answers to
pub const DEFAULT_DEVICE_ID: u64 = 0x1234_5678_9ABC_DEF0;

/// Service number of the indexed screen on the shield
pub const DEFAULT_DISPLAY_SERVICE: u8 = 1;

/// Service number of the arcade gamepad on the shield
pub const DEFAULT_GAMEPAD_SERVICE: u8 = 2;

/// SmartShield driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShieldConfig {
    /// Device identifier stamped on every outgoing frame
    pub device_id: u64,
    /// Service number addressed by display commands
    pub display_service: u8,
    /// Service number whose readings update the button state
    pub gamepad_service: u8,
    /// Bus settings the board support code should apply
    pub spi: SpiConfig,
    /// How long reset is held low in [`crate::SmartShield::begin`]
    pub reset_pulse_ms: u32,
    /// Time the shield needs to boot after reset
    pub boot_delay_ms: u32,
    /// Maximum ready-line samples before a framebuffer push gives up
    ///
    /// `None` waits forever.
    pub ready_spin_limit: Option<u32>,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            device_id: DEFAULT_DEVICE_ID,
            display_service: DEFAULT_DISPLAY_SERVICE,
            gamepad_service: DEFAULT_GAMEPAD_SERVICE,
            spi: SpiConfig::default(),
            reset_pulse_ms: 20,
            boot_delay_ms: 500,
            ready_spin_limit: None,
        }
    }
}

impl ShieldConfig {
    /// Give up waiting for the ready line after `samples` polls
    pub fn with_ready_spin_limit(mut self, samples: u32) -> Self {
        self.ready_spin_limit = Some(samples);
        self
    }
}
