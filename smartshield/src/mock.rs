//! Test doubles for the bus, pins and delay

use core::convert::Infallible;
use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::ErrorType;
use embedded_hal_async::digital::Wait;
use jacdac_spi::services::{arcade_gamepad, get};
use jacdac_spi::{Frame, FRAME_SIZE};
use smartshield_hal::{InputPin, OutputPin, SpiBus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

/// SPI peer that records every frame clocked out and answers with queued
/// frames, or zeros once the queue runs dry
pub struct MockSpi {
    responses: VecDeque<[u8; FRAME_SIZE]>,
    current: [u8; FRAME_SIZE],
    outgoing: [u8; FRAME_SIZE],
    position: usize,
    sent: Vec<[u8; FRAME_SIZE]>,
    transferred: usize,
    fail_after: Option<usize>,
}

impl MockSpi {
    pub fn new() -> Self {
        Self {
            responses: VecDeque::new(),
            current: [0; FRAME_SIZE],
            outgoing: [0; FRAME_SIZE],
            position: 0,
            sent: Vec::new(),
            transferred: 0,
            fail_after: None,
        }
    }

    pub fn queue_response(&mut self, frame: [u8; FRAME_SIZE]) {
        self.responses.push_back(frame);
    }

    /// Fail every byte after the first `bytes`
    pub fn fail_after(&mut self, bytes: usize) {
        self.fail_after = Some(bytes);
    }

    pub fn bytes_transferred(&self) -> usize {
        self.transferred
    }

    /// Complete frames clocked out so far
    pub fn sent(&self) -> &[[u8; FRAME_SIZE]] {
        &self.sent
    }
}

impl SpiBus for MockSpi {
    type Error = BusFault;

    fn transfer_byte(&mut self, byte: u8) -> Result<u8, Self::Error> {
        if self.fail_after.is_some_and(|limit| self.transferred >= limit) {
            return Err(BusFault);
        }

        if self.position == 0 {
            self.current = self.responses.pop_front().unwrap_or([0; FRAME_SIZE]);
        }

        self.outgoing[self.position] = byte;
        let reply = self.current[self.position];
        self.position += 1;
        self.transferred += 1;

        if self.position == FRAME_SIZE {
            self.sent.push(self.outgoing);
            self.position = 0;
        }

        Ok(reply)
    }
}

/// Encoded frame carrying one gamepad reading packet
pub fn gamepad_response(service: u8, pairs: &[(u8, u8)]) -> [u8; FRAME_SIZE] {
    let data: Vec<u8> = pairs.iter().flat_map(|&(index, pressure)| [index, pressure]).collect();
    let mut frame = Frame::new(0);
    frame
        .push_packet_with(service, get(arcade_gamepad::REG_READING), &data)
        .unwrap();
    frame.to_bytes()
}

enum Script {
    Level(bool),
    /// `low` low samples, then one high sample, repeating
    Pulsing { low: u32, count: u32 },
}

/// Scripted pin usable as the ready line or the reset line
pub struct MockPin {
    script: Script,
    samples: usize,
    waits: usize,
    history: Vec<bool>,
}

impl MockPin {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            samples: 0,
            waits: 0,
            history: Vec::new(),
        }
    }

    pub fn high() -> Self {
        Self::with_script(Script::Level(true))
    }

    pub fn low() -> Self {
        Self::with_script(Script::Level(false))
    }

    pub fn pulsing(low: u32) -> Self {
        Self::with_script(Script::Pulsing { low, count: 0 })
    }

    pub fn set(&mut self, high: bool) {
        self.script = Script::Level(high);
    }

    /// Number of `is_high` samples taken
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Number of completed `wait_for_high` calls
    pub fn waits(&self) -> usize {
        self.waits
    }

    /// Levels driven through `OutputPin`, oldest first
    pub fn history(&self) -> &[bool] {
        &self.history
    }
}

impl InputPin for MockPin {
    fn is_high(&mut self) -> bool {
        self.samples += 1;
        match &mut self.script {
            Script::Level(level) => *level,
            Script::Pulsing { low, count } => {
                if *count == *low {
                    *count = 0;
                    true
                } else {
                    *count += 1;
                    false
                }
            }
        }
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.history.push(true);
        self.script = Script::Level(true);
    }

    fn set_low(&mut self) {
        self.history.push(false);
        self.script = Script::Level(false);
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl Wait for MockPin {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        self.waits += 1;
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Delay that only adds up the requested time
#[derive(Default)]
pub struct MockDelay {
    elapsed_ns: u64,
}

impl MockDelay {
    pub fn total_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}
