//! Blocking delays
//!
//! Only used for controller power-up settle times, so millisecond
//! resolution is enough.

/// Blocking millisecond delay
pub trait DelayMs {
    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<D: DelayMs + ?Sized> DelayMs for &mut D {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms);
    }
}
