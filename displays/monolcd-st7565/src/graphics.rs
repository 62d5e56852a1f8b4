//! embedded-graphics support
//!
//! Drawing goes to the framebuffer only. Push it to the panel with
//! [`St7565::sync_all`](crate::St7565::sync_all) afterwards.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use crate::error::OutOfRange;
use crate::framebuffer::Framebuffer;

impl<const W: usize, const P: usize> OriginDimensions for Framebuffer<W, P> {
    fn size(&self) -> Size {
        Size::new(W as u32, Self::HEIGHT as u32)
    }
}

impl<const W: usize, const P: usize> DrawTarget for Framebuffer<W, P> {
    type Color = BinaryColor;
    type Error = Infallible;

    /// `BinaryColor::On` sets the pixel; points off the panel are dropped
    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                continue;
            };
            match self.write_pixel(x, y, color.is_on()) {
                // Off-panel points are clipped
                Ok(_) | Err(OutOfRange) => {}
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(if color.is_on() { 0xFF } else { 0x00 });
        Ok(())
    }
}
