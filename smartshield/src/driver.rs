//! SmartShield driver
//!
//! Ties together the link, the framebuffer and the button state. All
//! operations are blocking and single-threaded; `&mut self` keeps protocol
//! operations from overlapping and keeps the framebuffer still while it is
//! being pushed.
//!
//! # Usage
//!
//! ```ignore
//! let mut shield = SmartShield::new(HalSpi(spi), HalPin(ready), ShieldConfig::default());
//! shield.begin(&mut HalPin(reset), &mut delay);
//!
//! loop {
//!     shield.poll();
//!     shield.framebuffer_mut().clear(0);
//!     shield.framebuffer_mut().draw_text(10, 10, "Hello", TextStyle::new(15));
//!     shield.push_framebuffer()?;
//!
//!     if shield.a_down() {
//!         // ...
//!     }
//! }
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use jacdac_spi::services::indexed_screen::PALETTE_SIZE;
use jacdac_spi::{Button, DisplayCommand};
use smartshield_hal::{InputPin, OutputPin, SpiBus};

use crate::config::ShieldConfig;
use crate::framebuffer::Framebuffer;
use crate::input::ButtonState;
use crate::link::{Link, LinkError, Response};
use crate::update::{Batch, UpdatePlan};

/// Result of a single-frame display command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transmit {
    /// Shield not connected yet; nothing was sent
    NotConnected,
    /// Frame exchanged
    Sent,
}

/// Result of a framebuffer push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdateStatus {
    /// Shield not connected yet; nothing was sent
    NotConnected,
    /// Start frame and every batch exchanged
    Completed {
        /// Pixel batches sent after the start frame
        batches: usize,
        /// Responses dropped by validation
        discarded: usize,
    },
}

/// Host-side driver for the SmartShield display and gamepad
pub struct SmartShield<SPI, READY> {
    link: Link<SPI>,
    ready: READY,
    config: ShieldConfig,
    framebuffer: Framebuffer,
    buttons: ButtonState,
    connected: bool,
}

impl<SPI, READY> SmartShield<SPI, READY>
where
    SPI: SpiBus,
    READY: InputPin,
{
    /// Create a driver; nothing is sent until the shield is connected
    pub fn new(spi: SPI, ready: READY, config: ShieldConfig) -> Self {
        Self {
            link: Link::new(spi, config.device_id),
            ready,
            config,
            framebuffer: Framebuffer::new(),
            buttons: ButtonState::new(),
            connected: false,
        }
    }

    /// Reset the shield and wait for it to boot
    pub fn begin<RST, D>(&mut self, reset: &mut RST, delay: &mut D)
    where
        RST: OutputPin,
        D: DelayNs,
    {
        #[cfg(feature = "defmt")]
        defmt::info!(
            "resetting shield, bus {} Hz {} msb_first={}",
            self.config.spi.frequency,
            self.config.spi.mode,
            self.config.spi.msb_first
        );

        reset.set_low();
        delay.delay_ms(self.config.reset_pulse_ms);
        reset.set_high();
        delay.delay_ms(self.config.boot_delay_ms);
    }

    /// Sample the ready line; the first high sample marks the shield connected
    ///
    /// Call periodically. Once connected the driver stays connected.
    pub fn poll(&mut self) -> bool {
        if !self.connected && self.ready.is_high() {
            self.connected = true;

            #[cfg(feature = "defmt")]
            defmt::info!("shield connected");
        }
        self.connected
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn config(&self) -> &ShieldConfig {
        &self.config
    }

    /// Replace the display palette (0xAARRGGBB entries)
    pub fn set_palette(
        &mut self,
        palette: &[u32; PALETTE_SIZE],
    ) -> Result<Transmit, LinkError<SPI::Error>> {
        self.send_command(DisplayCommand::SetPalette(palette))
    }

    /// Set the display backlight brightness
    pub fn set_brightness(&mut self, brightness: u8) -> Result<Transmit, LinkError<SPI::Error>> {
        self.send_command(DisplayCommand::SetBrightness(brightness))
    }

    fn send_command(
        &mut self,
        command: DisplayCommand<'_>,
    ) -> Result<Transmit, LinkError<SPI::Error>> {
        if !self.connected {
            return Ok(Transmit::NotConnected);
        }

        command.write_to(self.link.begin_frame(), self.config.display_service)?;
        self.link.exchange()?;
        Ok(Transmit::Sent)
    }

    /// Block until the shield raises its ready line
    ///
    /// Spins without sleeping. With `ready_spin_limit` set, gives up after
    /// that many low samples.
    pub fn wait_ready(&mut self) -> Result<(), LinkError<SPI::Error>> {
        let mut samples: u32 = 0;
        while !self.ready.is_high() {
            if let Some(limit) = self.config.ready_spin_limit {
                if samples >= limit {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("ready line low after {} samples", samples);
                    return Err(LinkError::ReadyTimeout);
                }
            }
            samples = samples.saturating_add(1);
            core::hint::spin_loop();
        }
        Ok(())
    }

    /// Send the whole framebuffer to the display
    ///
    /// One start-update frame, then one frame per batch of columns, each
    /// preceded by [`Self::wait_ready`]. Button readings in the responses
    /// are applied as they arrive.
    pub fn push_framebuffer(&mut self) -> Result<UpdateStatus, LinkError<SPI::Error>> {
        if !self.connected {
            return Ok(UpdateStatus::NotConnected);
        }

        let mut discarded = self.send_start()?;
        let mut batches = 0;
        for batch in UpdatePlan::new() {
            self.wait_ready()?;
            discarded += self.send_batch(&batch)?;
            batches += 1;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("framebuffer pushed in {} batches", batches);

        Ok(UpdateStatus::Completed { batches, discarded })
    }

    /// Returns 1 if the response was discarded, for tallying
    fn send_start(&mut self) -> Result<usize, LinkError<SPI::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("starting framebuffer push");

        UpdatePlan::write_start(self.link.begin_frame(), self.config.display_service)?;
        self.link.exchange()?;
        Ok(self.apply_response())
    }

    fn send_batch(&mut self, batch: &Batch) -> Result<usize, LinkError<SPI::Error>> {
        let frame = self.link.begin_frame();
        batch.write_to(frame, &self.framebuffer, self.config.display_service)?;
        self.link.exchange()?;
        Ok(self.apply_response())
    }

    fn apply_response(&mut self) -> usize {
        match self.link.decode(self.config.gamepad_service) {
            Response::Buttons(mask) => {
                self.buttons.update(mask);
                0
            }
            Response::Ignored => 0,
            Response::Discarded(_) => 1,
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Drawing surface; changes reach the display on the next push
    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    pub fn buttons(&self) -> &ButtonState {
        &self.buttons
    }

    /// Current button mask
    pub fn read_buttons(&self) -> u8 {
        self.buttons.current()
    }

    pub fn is_button_pressed(&self, mask: u8) -> bool {
        self.buttons.is_pressed(mask)
    }

    pub fn is_button_down(&self, mask: u8) -> bool {
        self.buttons.is_down(mask)
    }

    pub fn is_button_up(&self, mask: u8) -> bool {
        self.buttons.is_up(mask)
    }

    pub fn left_pressed(&self) -> bool {
        self.buttons.pressed(Button::Left)
    }

    pub fn up_pressed(&self) -> bool {
        self.buttons.pressed(Button::Up)
    }

    pub fn right_pressed(&self) -> bool {
        self.buttons.pressed(Button::Right)
    }

    pub fn down_pressed(&self) -> bool {
        self.buttons.pressed(Button::Down)
    }

    pub fn a_pressed(&self) -> bool {
        self.buttons.pressed(Button::A)
    }

    pub fn b_pressed(&self) -> bool {
        self.buttons.pressed(Button::B)
    }

    pub fn menu_pressed(&self) -> bool {
        self.buttons.pressed(Button::Menu)
    }

    pub fn left_down(&self) -> bool {
        self.buttons.down(Button::Left)
    }

    pub fn up_down(&self) -> bool {
        self.buttons.down(Button::Up)
    }

    pub fn right_down(&self) -> bool {
        self.buttons.down(Button::Right)
    }

    pub fn down_down(&self) -> bool {
        self.buttons.down(Button::Down)
    }

    pub fn a_down(&self) -> bool {
        self.buttons.down(Button::A)
    }

    pub fn b_down(&self) -> bool {
        self.buttons.down(Button::B)
    }

    pub fn menu_down(&self) -> bool {
        self.buttons.down(Button::Menu)
    }

    pub fn left_up(&self) -> bool {
        self.buttons.up(Button::Left)
    }

    pub fn up_up(&self) -> bool {
        self.buttons.up(Button::Up)
    }

    pub fn right_up(&self) -> bool {
        self.buttons.up(Button::Right)
    }

    pub fn down_up(&self) -> bool {
        self.buttons.up(Button::Down)
    }

    pub fn a_up(&self) -> bool {
        self.buttons.up(Button::A)
    }

    pub fn b_up(&self) -> bool {
        self.buttons.up(Button::B)
    }

    pub fn menu_up(&self) -> bool {
        self.buttons.up(Button::Menu)
    }

    /// Release the bus and the ready line
    pub fn release(self) -> (SPI, READY) {
        (self.link.release(), self.ready)
    }
}

impl<SPI, READY> SmartShield<SPI, READY>
where
    SPI: SpiBus,
    READY: InputPin + Wait,
{
    /// [`Self::push_framebuffer`] for cooperative executors
    ///
    /// Awaits the ready line instead of spinning on it. Frames go out in the
    /// same order as the blocking push; the exchanges themselves still block.
    pub async fn push_framebuffer_async(&mut self) -> Result<UpdateStatus, LinkError<SPI::Error>> {
        if !self.connected {
            return Ok(UpdateStatus::NotConnected);
        }

        let mut discarded = self.send_start()?;
        let mut batches = 0;
        for batch in UpdatePlan::new() {
            self.ready
                .wait_for_high()
                .await
                .map_err(|_| LinkError::Ready)?;
            discarded += self.send_batch(&batch)?;
            batches += 1;
        }

        Ok(UpdateStatus::Completed { batches, discarded })
    }
}
