//! Packed indexed framebuffer
//!
//! 160 x 120 pixels, 4-bit palette indices, two pixels per byte. Storage is
//! column-major so a column's bytes can be sent to the display as-is:
//!
//! ```text
//! byte(x, y) = x * COLUMN_BYTES + y / 2
//! even y -> low nibble, odd y -> high nibble
//! ```
//!
//! Coordinates outside the grid are ignored on write and read back as 0.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::{Gray4, GrayColor};
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Size};
use embedded_graphics::primitives::Rectangle;

/// Display width in pixels
pub const WIDTH: usize = 160;

/// Display height in pixels
pub const HEIGHT: usize = 120;

/// Packed bytes per column
pub const COLUMN_BYTES: usize = HEIGHT / 2;

/// Total framebuffer size in bytes
pub const FRAMEBUFFER_SIZE: usize = WIDTH * COLUMN_BYTES;

/// 4-bit indexed framebuffer
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    buffer: [u8; FRAMEBUFFER_SIZE],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("width", &WIDTH)
            .field("height", &HEIGHT)
            .finish_non_exhaustive()
    }
}

impl Framebuffer {
    /// Create a framebuffer with every pixel set to index 0
    pub const fn new() -> Self {
        Self {
            buffer: [0; FRAMEBUFFER_SIZE],
        }
    }

    /// Width in pixels
    pub const fn width(&self) -> usize {
        WIDTH
    }

    /// Height in pixels
    pub const fn height(&self) -> usize {
        HEIGHT
    }

    /// Byte index and nibble parity for an in-range coordinate
    fn locate(x: i32, y: i32) -> Option<(usize, bool)> {
        let x = usize::try_from(x).ok().filter(|&x| x < WIDTH)?;
        let y = usize::try_from(y).ok().filter(|&y| y < HEIGHT)?;
        Some((x * COLUMN_BYTES + y / 2, y % 2 == 1))
    }

    /// Fill every pixel with `color`
    pub fn clear(&mut self, color: u8) {
        let color = color & 0x0F;
        self.buffer.fill((color << 4) | color);
    }

    /// Set one pixel; out-of-range coordinates are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u8) {
        let Some((index, odd)) = Self::locate(x, y) else {
            return;
        };

        let byte = &mut self.buffer[index];
        if odd {
            *byte = (*byte & 0x0F) | ((color & 0x0F) << 4);
        } else {
            *byte = (*byte & 0xF0) | (color & 0x0F);
        }
    }

    /// Read one pixel; out-of-range coordinates read as 0
    pub fn get_pixel(&self, x: i32, y: i32) -> u8 {
        match Self::locate(x, y) {
            Some((index, true)) => self.buffer[index] >> 4,
            Some((index, false)) => self.buffer[index] & 0x0F,
            None => 0,
        }
    }

    /// Fill a rectangle, clipped to the framebuffer
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: u8) {
        let x0 = i64::from(x).max(0);
        let y0 = i64::from(y).max(0);
        let x1 = (i64::from(x) + i64::from(width)).min(WIDTH as i64);
        let y1 = (i64::from(y) + i64::from(height)).min(HEIGHT as i64);

        // Both ranges are now inside the grid, so the casts are lossless
        for py in y0..y1 {
            for px in x0..x1 {
                self.set_pixel(px as i32, py as i32, color);
            }
        }
    }

    /// Packed bytes of column `x`, in the order the display expects them
    pub fn column(&self, x: usize) -> Option<&[u8]> {
        (x < WIDTH).then(|| &self.buffer[x * COLUMN_BYTES..(x + 1) * COLUMN_BYTES])
    }

    /// Raw packed storage
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

/// Drawing with `embedded-graphics`; the `Gray4` luma is the palette index
impl DrawTarget for Framebuffer {
    type Color = Gray4;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.luma());
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(
            area.top_left.x,
            area.top_left.y,
            area.size.width,
            area.size.height,
            color.luma(),
        );
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        Framebuffer::clear(self, color.luma());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::{Point, Primitive};
    use embedded_graphics::primitives::{Line, PrimitiveStyle};
    use embedded_graphics::Drawable;
    use proptest::prelude::*;

    #[test]
    fn test_new_is_zeroed() {
        let fb = Framebuffer::new();
        assert_eq!(fb.as_bytes().len(), 9600);
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_nibble_packing() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(2, 10, 0x3);
        fb.set_pixel(2, 11, 0xC);

        assert_eq!(fb.as_bytes()[2 * 60 + 5], 0xC3);
        assert_eq!(fb.get_pixel(2, 10), 0x3);
        assert_eq!(fb.get_pixel(2, 11), 0xC);
    }

    #[test]
    fn test_set_pixel_masks_color() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(0, 0, 0xFA);
        fb.set_pixel(0, 1, 0x15);
        assert_eq!(fb.get_pixel(0, 0), 0xA);
        assert_eq!(fb.get_pixel(0, 1), 0x5);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut fb = Framebuffer::new();
        fb.clear(7);
        let before = fb.clone();

        for (x, y) in [(160, 0), (0, 120), (-1, 5), (5, -1), (i32::MAX, i32::MAX)] {
            fb.set_pixel(x, y, 3);
            assert_eq!(fb.get_pixel(x, y), 0);
        }
        assert_eq!(fb, before);
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new();
        fb.clear(0x9);
        assert!(fb.as_bytes().iter().all(|&b| b == 0x99));
        assert_eq!(fb.get_pixel(159, 119), 0x9);
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut fb = Framebuffer::new();
        fb.fill_rect(150, 110, 20, 20, 4);

        assert_eq!(fb.get_pixel(150, 110), 4);
        assert_eq!(fb.get_pixel(159, 119), 4);
        assert_eq!(fb.get_pixel(149, 110), 0);
        assert_eq!(fb.get_pixel(150, 109), 0);

        let painted = (0..160)
            .flat_map(|x| (0..120).map(move |y| (x, y)))
            .filter(|&(x, y)| fb.get_pixel(x, y) == 4)
            .count();
        assert_eq!(painted, 100);
    }

    #[test]
    fn test_fill_rect_negative_origin() {
        let mut fb = Framebuffer::new();
        fb.fill_rect(-5, -5, 7, 7, 2);
        assert_eq!(fb.get_pixel(0, 0), 2);
        assert_eq!(fb.get_pixel(1, 1), 2);
        assert_eq!(fb.get_pixel(2, 2), 0);
    }

    #[test]
    fn test_column_slice() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(5, 0, 1);
        fb.set_pixel(5, 119, 2);

        let column = fb.column(5).unwrap();
        assert_eq!(column.len(), COLUMN_BYTES);
        assert_eq!(column[0], 0x01);
        assert_eq!(column[59], 0x20);
        assert!(fb.column(160).is_none());
    }

    #[test]
    fn test_draw_target_line() {
        let mut fb = Framebuffer::new();
        Line::new(Point::new(0, 0), Point::new(9, 0))
            .into_styled(PrimitiveStyle::with_stroke(Gray4::new(6), 1))
            .draw(&mut fb)
            .unwrap();

        assert!((0..10).all(|x| fb.get_pixel(x, 0) == 6));
        assert_eq!(fb.get_pixel(10, 0), 0);
    }

    proptest! {
        #[test]
        fn prop_set_get_roundtrip(x in 0i32..160, y in 0i32..120, color in 0u8..16) {
            let mut fb = Framebuffer::new();
            fb.clear(0xF - color);
            fb.set_pixel(x, y, color);
            prop_assert_eq!(fb.get_pixel(x, y), color);
            // The other pixel sharing the byte is untouched
            let neighbour = y ^ 1;
            prop_assert_eq!(fb.get_pixel(x, neighbour), 0xF - color);
        }

        #[test]
        fn prop_out_of_range_is_inert(
            x in prop_oneof![160i32..10_000, i32::MIN..0],
            y in any::<i32>(),
            color in 0u8..16,
        ) {
            let mut fb = Framebuffer::new();
            fb.set_pixel(x, y, color);
            prop_assert!(fb.as_bytes().iter().all(|&b| b == 0));
            prop_assert_eq!(fb.get_pixel(x, y), 0);
        }

        #[test]
        fn prop_clear_reads_back(color in 0u8..16, x in 0i32..160, y in 0i32..120) {
            let mut fb = Framebuffer::new();
            fb.clear(color);
            prop_assert_eq!(fb.get_pixel(x, y), color);
        }
    }
}
