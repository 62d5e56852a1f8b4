//! Framebuffer-backed ST7565 driver
//!
//! [`St7565`] pairs a [`Controller`] with a [`Framebuffer`] of the same
//! geometry. Pixel writes update the buffer and push the one affected byte;
//! [`St7565::sync_all`] streams every page; glyph and text drawing only touch
//! the buffer until the next sync.

use monolcd_hal::{DelayMs, OutputPin};

use crate::config::InitConfig;
use crate::controller::{Controller, SessionState};
use crate::error::{Error, OutOfRange};
use crate::framebuffer::{Framebuffer, PixelAddress};
use crate::glyph::{font, Glyph, GLYPH_WIDTH};
use crate::interface::DisplayInterface;

type Result<T, DI> = core::result::Result<T, Error<<DI as DisplayInterface>::Error>>;

/// ST7565 display with a local framebuffer
///
/// `W` and `P` default to the 128x64 module.
pub struct St7565<DI, RST, const W: usize = 128, const P: usize = 8> {
    controller: Controller<DI, RST>,
    buffer: Framebuffer<W, P>,
}

impl<DI, RST, const W: usize, const P: usize> St7565<DI, RST, W, P>
where
    DI: DisplayInterface,
    RST: OutputPin,
{
    /// Create a driver with an all-clear buffer
    ///
    /// Nothing is sent until [`initialize`](Self::initialize).
    pub fn new(interface: DI, reset: RST, config: InitConfig) -> Self {
        Self {
            controller: Controller::new(interface, reset, Framebuffer::<W, P>::geometry(), config),
            buffer: Framebuffer::new(),
        }
    }

    /// Run the controller power-up sequence
    ///
    /// The buffer is left as is; call [`sync_all`](Self::sync_all) or
    /// [`clear`](Self::clear) to bring the panel in line with it.
    pub fn initialize<D: DelayMs>(&mut self, delay: &mut D) -> Result<(), DI> {
        self.controller.initialize(delay)
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.controller.state()
    }

    fn ensure_ready(&self) -> Result<(), DI> {
        if self.controller.is_ready() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    /// Set one pixel and push its byte
    ///
    /// Returns the linear buffer offset that was written.
    pub fn set_pixel(&mut self, x: usize, y: usize) -> Result<usize, DI> {
        self.write_pixel(x, y, true)
    }

    /// Clear one pixel and push its byte
    pub fn clear_pixel(&mut self, x: usize, y: usize) -> Result<usize, DI> {
        self.write_pixel(x, y, false)
    }

    /// Set or clear one pixel and push its byte
    ///
    /// The buffer is updated before the bus write, so on a bus error the
    /// panel lags the buffer until the next [`sync_all`](Self::sync_all).
    pub fn write_pixel(&mut self, x: usize, y: usize, on: bool) -> Result<usize, DI> {
        self.ensure_ready()?;
        let addr = self.buffer.write_pixel(x, y, on)?;
        self.push_byte(addr)
    }

    fn push_byte(&mut self, addr: PixelAddress) -> Result<usize, DI> {
        let byte = self.buffer.cell(addr.page, addr.column).ok_or(OutOfRange)?;
        self.controller.ensure_cursor(addr.page, addr.column)?;
        self.controller.send_data(byte)?;
        Ok(addr.offset)
    }

    /// Blank the panel and the buffer
    pub fn clear(&mut self) -> Result<(), DI> {
        self.ensure_ready()?;
        #[cfg(feature = "defmt")]
        defmt::debug!("st7565 clear ({} pages)", P);

        let zeros = [0u8; W];
        for page in 0..P {
            self.controller.set_cursor(page, 0)?;
            self.controller.send_data_block(&zeros)?;
            self.buffer.clear_page(page)?;
        }
        Ok(())
    }

    /// Stream the whole buffer to the panel, one page at a time
    pub fn sync_all(&mut self) -> Result<(), DI> {
        self.ensure_ready()?;
        #[cfg(feature = "defmt")]
        defmt::debug!("st7565 sync ({} bytes)", Framebuffer::<W, P>::SIZE);

        for (page, row) in self.buffer.pages().iter().enumerate() {
            self.controller.set_cursor(page, 0)?;
            self.controller.send_data_block(row)?;
        }
        Ok(())
    }

    /// Copy a glyph into the buffer cell at column `x` of `page`
    ///
    /// Buffer only; nothing is visible until the next
    /// [`sync_all`](Self::sync_all).
    pub fn blit_glyph(&mut self, x: usize, page: usize, glyph: &Glyph) -> core::result::Result<usize, OutOfRange> {
        self.buffer.blit_glyph(x, page, glyph)
    }

    /// Draw a string of 8x8 glyphs starting at `column` of `page`
    ///
    /// Characters without a glyph are drawn blank. Stops with
    /// [`OutOfRange`] at the first cell that would cross the right edge;
    /// cells already drawn stay. Returns the column after the last cell.
    /// Buffer only, like [`blit_glyph`](Self::blit_glyph).
    pub fn draw_text(&mut self, column: usize, page: usize, text: &str) -> core::result::Result<usize, OutOfRange> {
        let mut x = column;
        for ch in text.chars() {
            let glyph = font::glyph_for(ch).unwrap_or(Glyph::BLANK);
            self.buffer.blit_glyph(x, page, &glyph)?;
            x += GLYPH_WIDTH;
        }
        Ok(x)
    }

    /// Read one pixel from the buffer
    pub fn pixel(&self, x: usize, y: usize) -> core::result::Result<bool, OutOfRange> {
        self.buffer.pixel(x, y)
    }

    /// The framebuffer
    pub fn buffer(&self) -> &Framebuffer<W, P> {
        &self.buffer
    }

    /// Mutable framebuffer, for batch drawing before a [`sync_all`](Self::sync_all)
    pub fn buffer_mut(&mut self) -> &mut Framebuffer<W, P> {
        &mut self.buffer
    }

    /// The protocol layer, for contrast and display mode commands
    pub fn controller(&self) -> &Controller<DI, RST> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller<DI, RST> {
        &mut self.controller
    }

    /// Release the interface and reset pin
    pub fn release(self) -> (DI, RST) {
        self.controller.release()
    }
}
