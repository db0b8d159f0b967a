//! Framebuffer update planning
//!
//! A full-screen update is one start-update frame followed by frames of up
//! to [`COLUMNS_PER_BATCH`] set-pixels packets, one packet per column.
//!
//! The batch size is fixed: three packed columns plus their packet headers
//! fit the frame payload, four do not.

use core::ops::Range;

use jacdac_spi::{footprint, DisplayCommand, Frame, FrameError, Rect, MAX_PAYLOAD_SIZE};

use crate::framebuffer::{Framebuffer, COLUMN_BYTES, HEIGHT, WIDTH};

/// Columns sent per frame
pub const COLUMNS_PER_BATCH: usize = 3;

/// Batches needed for a full-screen update
pub const BATCH_COUNT: usize = WIDTH.div_ceil(COLUMNS_PER_BATCH);

const _: () = assert!(COLUMNS_PER_BATCH * footprint(COLUMN_BYTES) <= MAX_PAYLOAD_SIZE);

/// A run of consecutive columns sent in one frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Batch {
    /// First column
    pub start: usize,
    /// Number of columns (1 to [`COLUMNS_PER_BATCH`])
    pub len: usize,
}

impl Batch {
    /// Column indices in this batch
    pub fn columns(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// Append one set-pixels packet per column to `frame`
    pub fn write_to(
        &self,
        frame: &mut Frame,
        framebuffer: &Framebuffer,
        display_service: u8,
    ) -> Result<(), FrameError> {
        for column in self.columns().filter_map(|x| framebuffer.column(x)) {
            DisplayCommand::SetPixels(column).write_to(frame, display_service)?;
        }
        Ok(())
    }
}

/// Iterator over the batches covering `width` columns
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    next_column: usize,
    width: usize,
}

impl UpdatePlan {
    /// Plan covering the full framebuffer
    pub fn new() -> Self {
        Self::with_width(WIDTH)
    }

    /// Plan covering the first `width` columns
    pub fn with_width(width: usize) -> Self {
        Self {
            next_column: 0,
            width,
        }
    }

    /// Append the start-update packet for the full display to `frame`
    pub fn write_start(frame: &mut Frame, display_service: u8) -> Result<(), FrameError> {
        DisplayCommand::StartUpdate(Rect::full(WIDTH as u16, HEIGHT as u16))
            .write_to(frame, display_service)
    }
}

impl Default for UpdatePlan {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for UpdatePlan {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_column >= self.width {
            return None;
        }

        let start = self.next_column;
        let len = COLUMNS_PER_BATCH.min(self.width - start);
        self.next_column += len;
        Some(Batch { start, len })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .width
            .saturating_sub(self.next_column)
            .div_ceil(COLUMNS_PER_BATCH);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for UpdatePlan {}
