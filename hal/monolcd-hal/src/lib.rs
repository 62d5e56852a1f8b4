//! monolcd Hardware Abstraction Layer
//!
//! This crate defines the bus adapter traits that display drivers in the
//! monolcd workspace are written against. A board support crate implements
//! them for its SPI peripheral, GPIO lines and timer, and the driver never
//! touches registers directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application / display-control loop     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  monolcd-st7565 (display driver)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  monolcd-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ board support │       │ embedded-hal  │
//! │    crate      │       │   adapters    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Chip-select, command/data and reset lines
//! - [`spi::SpiBus`] - Synchronous byte transfers
//! - [`delay::DelayMs`] - Blocking millisecond waits
//!
//! With the `embedded-hal` feature, [`embedded`] wraps `embedded-hal` 1.0
//! implementations so they can be handed to a driver directly.

#![no_std]
#![deny(unsafe_code)]

pub mod delay;
#[cfg(feature = "embedded-hal")]
pub mod embedded;
pub mod gpio;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use delay::DelayMs;
pub use gpio::OutputPin;
pub use spi::{Mode, SpiBus, SpiConfig};
