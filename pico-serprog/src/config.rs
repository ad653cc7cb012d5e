// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Build-time board configuration.
//!
//! Bus pins (SPI0 function set): SCK GPIO2, MOSI GPIO3, MISO GPIO4, CS GPIO5.
//! The pin numbers are fixed by the types in `peripherals`.

/// Crystal on the Pico board.
pub const XOSC_HZ: u32 = 12_000_000;

/// SPI clock requested at power-up.
pub const DEFAULT_SPI_HZ: u32 = 12_000_000;

pub const USB_VID: u16 = 0x2E8A;
pub const USB_PID: u16 = 0x000A;
pub const USB_MANUFACTURER: &str = "Raspberry Pi";
pub const USB_PRODUCT: &str = "pico-serprog";
pub const USB_SERIAL: &str = "0001";
