// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! pico-serprog: serprog SPI flash programmer for the RP2040 over USB CDC.

#![no_std]
#![no_main]

#[cfg(feature = "bitbang")]
mod bitbang_bus;
mod config;
mod peripherals;
#[cfg(not(feature = "bitbang"))]
mod pl022;
mod usb_link;

use defmt_rtt as _;
use panic_probe as _;
use serprog_common::{Dispatcher, Error, PICO_SERPROG};

defmt::timestamp!("{=u64:us}", { 0 });

use cortex_m_rt::entry;

#[unsafe(link_section = ".boot2")]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_GENERIC_03H;

#[entry]
fn main() -> ! {
    defmt::println!("pico-serprog init");

    #[allow(unused_mut)]
    let mut p = peripherals::init();

    #[cfg(not(feature = "bitbang"))]
    let bus = pl022::Pl022Bus::new(
        p.spi0,
        p.bus_pins,
        &mut p.resets,
        p.peri_freq,
        p.timer,
        config::DEFAULT_SPI_HZ,
    );
    #[cfg(feature = "bitbang")]
    let bus = bitbang_bus::new(p.bus_pins, p.timer);

    let mut dispatcher = Dispatcher::new(bus, &PICO_SERPROG, config::DEFAULT_SPI_HZ);
    defmt::println!("SPI at {} Hz, entering command loop", dispatcher.frequency());

    let mut link = usb_link::UsbLink::new(peripherals::usb_bus_ref());

    loop {
        match dispatcher.run(&mut link) {
            Error::Closed => defmt::println!("Host link closed"),
            Error::Link(e) => defmt::println!("Host link error: {}", e),
        }
    }
}
