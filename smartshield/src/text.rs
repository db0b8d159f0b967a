//! Text rendering onto the framebuffer
//!
//! Glyphs come from the `embedded-graphics` 5x7 ASCII font. Each character
//! occupies a 6x8 cell (one column and one row of spacing) multiplied by an
//! integer scale factor.

use core::fmt::Write as _;

use embedded_graphics::mono_font::ascii::FONT_5X7;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::{Gray4, GrayColor};
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Point, Size};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable;
use heapless::String;

use crate::framebuffer::{Framebuffer, HEIGHT, WIDTH};

/// Character cell width at scale 1
pub const CHAR_WIDTH: i32 = 6;

/// Character cell height at scale 1
pub const CHAR_HEIGHT: i32 = 8;

/// Longest formatted string accepted by [`Framebuffer::draw_fmt`]
pub const MAX_FORMATTED_LEN: usize = 64;

/// Colors and scale used for text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextStyle {
    /// Glyph color
    pub color: u8,
    /// Cell background, `None` for transparent
    ///
    /// A background equal to `color` is also treated as transparent.
    pub background: Option<u8>,
    /// Integer scale factor (0 is treated as 1)
    pub size: u8,
}

impl TextStyle {
    /// Transparent text at scale 1
    pub const fn new(color: u8) -> Self {
        Self {
            color,
            background: None,
            size: 1,
        }
    }

    /// Set an opaque background
    pub const fn with_background(mut self, background: u8) -> Self {
        self.background = Some(background);
        self
    }

    /// Set the scale factor
    pub const fn with_size(mut self, size: u8) -> Self {
        self.size = size;
        self
    }

    /// Background to paint, if any; one matching the glyph color is skipped
    fn opaque_background(&self) -> Option<u8> {
        self.background
            .filter(|&background| background & 0x0F != self.color & 0x0F)
    }

    fn scale(&self) -> i32 {
        i32::from(self.size.max(1))
    }
}

/// Draw target that blows every pixel up to a `scale` x `scale` block
struct Scaled<'a> {
    target: &'a mut Framebuffer,
    origin: Point,
    scale: i32,
}

impl OriginDimensions for Scaled<'_> {
    fn size(&self) -> Size {
        Size::new(CHAR_WIDTH as u32, CHAR_HEIGHT as u32)
    }
}

impl DrawTarget for Scaled<'_> {
    type Color = Gray4;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let x = self.origin.x.saturating_add(point.x.saturating_mul(self.scale));
            let y = self.origin.y.saturating_add(point.y.saturating_mul(self.scale));
            if self.scale == 1 {
                self.target.set_pixel(x, y, color.luma());
            } else {
                let side = self.scale as u32;
                self.target.fill_rect(x, y, side, side, color.luma());
            }
        }
        Ok(())
    }
}

impl Framebuffer {
    /// Draw one character with its top-left corner at (`x`, `y`)
    ///
    /// Characters outside printable ASCII are skipped.
    pub fn draw_char(&mut self, x: i32, y: i32, c: char, style: TextStyle) {
        if !(' '..='~').contains(&c) {
            return;
        }

        let scale = style.scale();
        if let Some(background) = style.opaque_background() {
            self.fill_rect(
                x,
                y,
                (CHAR_WIDTH * scale) as u32,
                (CHAR_HEIGHT * scale) as u32,
                background,
            );
        }

        let mut buf = [0u8; 4];
        let glyph = c.encode_utf8(&mut buf);
        let font = MonoTextStyle::new(&FONT_5X7, Gray4::new(style.color & 0x0F));
        let mut target = Scaled {
            target: self,
            origin: Point::new(x, y),
            scale,
        };
        // Infallible target
        let _ = Text::with_baseline(glyph, Point::zero(), font, Baseline::Top).draw(&mut target);
    }

    /// Draw a string starting at (`x`, `y`)
    ///
    /// `\n` moves to the next line, `\r` returns to the starting column.
    /// Text wraps when a character would cross the right edge and stops at
    /// the first line that would cross the bottom edge. Returns the cursor
    /// position after the last character.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, style: TextStyle) -> Point {
        let cell_width = CHAR_WIDTH * style.scale();
        let cell_height = CHAR_HEIGHT * style.scale();
        let mut cursor = Point::new(x, y);

        for c in text.chars() {
            match c {
                '\n' => {
                    let Some(next) = cursor.y.checked_add(cell_height) else {
                        break;
                    };
                    cursor = Point::new(x, next);
                }
                '\r' => cursor.x = x,
                _ => {
                    let fits = cursor
                        .x
                        .checked_add(cell_width)
                        .is_some_and(|end| end <= WIDTH as i32);
                    if !fits {
                        let Some(next) = cursor.y.checked_add(cell_height) else {
                            break;
                        };
                        cursor = Point::new(x, next);
                    }
                    let on_screen = cursor
                        .y
                        .checked_add(cell_height)
                        .is_some_and(|end| end <= HEIGHT as i32);
                    if !on_screen {
                        break;
                    }
                    self.draw_char(cursor.x, cursor.y, c, style);
                    cursor.x = cursor.x.saturating_add(cell_width);
                }
            }
        }

        cursor
    }

    /// Format and draw text, e.g. a score counter
    ///
    /// Output longer than [`MAX_FORMATTED_LEN`] bytes is cut short.
    pub fn draw_fmt(
        &mut self,
        x: i32,
        y: i32,
        args: core::fmt::Arguments<'_>,
        style: TextStyle,
    ) -> Point {
        let mut text = String::<MAX_FORMATTED_LEN>::new();
        // Overflow only truncates
        let _ = text.write_fmt(args);
        self.draw_text(x, y, &text, style)
    }
}
