// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! serprog protocol engine for SPI bridge firmware.
//!
//! This crate supports both `no_std` (embedded) and `std` (host) environments:
//! - Default: `no_std` mode for embedded targets
//! - `std` feature: Enables `std` support for host tools
//! - `defmt` feature: `defmt::Format` derives and debug logging on firmware

#![cfg_attr(not(feature = "std"), no_std)]

pub mod bitbang;
pub mod caps;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod spiop;
pub mod transport;

// Re-export commonly used types
pub use caps::{Capabilities, CommandMap, PICO_SERPROG};
pub use dispatch::Dispatcher;
pub use error::Error;
pub use protocol::{Opcode, ACK, NAK, SCRATCH_LEN};
pub use transport::SpiTransport;
