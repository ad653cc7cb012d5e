// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Bus transport on the SPI0 PL022 controller.
//!
//! Chip select is a plain SIO output so a transaction can span any number of
//! controller transfers. Releasing the bus disables the controller and
//! forces the output enable of all four pads off; the pads are configured
//! without pulls, so the lines float.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{SpiBus, MODE_0};
use rp2040_hal as hal;
use rp2040_hal::fugit::{HertzU32, RateExtU32};
use rp2040_hal::gpio::bank0::{Gpio2, Gpio3, Gpio4, Gpio5};
use rp2040_hal::gpio::{FunctionSioOutput, FunctionSpi, OutputEnableOverride, Pin, PullNone};
use rp2040_hal::spi::{Enabled, Spi};
use serprog_common::transport::{pl022_rate, settle_ns, SpiTransport, READ_FILL, RELEASED_FILL};

use crate::peripherals::BusPins;

type Sck = Pin<Gpio2, FunctionSpi, PullNone>;
type Mosi = Pin<Gpio3, FunctionSpi, PullNone>;
type Miso = Pin<Gpio4, FunctionSpi, PullNone>;
type Cs = Pin<Gpio5, FunctionSioOutput, PullNone>;

/// Pinout in the order the HAL expects: (TX, RX, SCK).
type SpiPins = (Mosi, Miso, Sck);
type Controller = Spi<Enabled, hal::pac::SPI0, SpiPins, 8>;

enum Lines {
    Driven(Controller),
    Released(hal::pac::SPI0, SpiPins),
}

pub struct Pl022Bus {
    // Only empty while switching between states
    lines: Option<Lines>,
    cs: Cs,
    timer: hal::Timer,
    peri_freq: HertzU32,
    frequency: u32,
}

impl Pl022Bus {
    /// Configure SPI0 in mode 0 at `hz` and leave the bus released.
    pub fn new(
        spi0: hal::pac::SPI0,
        pins: BusPins,
        resets: &mut hal::pac::RESETS,
        peri_freq: HertzU32,
        timer: hal::Timer,
        hz: u32,
    ) -> Self {
        let sck: Sck = pins.sck.reconfigure();
        let mosi: Mosi = pins.mosi.reconfigure();
        let miso: Miso = pins.miso.reconfigure();
        let mut cs: Cs = pins.cs.reconfigure();
        cs.set_high().ok();

        let spi = Spi::<_, _, _, 8>::new(spi0, (mosi, miso, sck)).init(
            resets,
            peri_freq,
            hz.Hz(),
            MODE_0,
        );

        let mut bus = Self {
            lines: Some(Lines::Driven(spi)),
            cs,
            timer,
            peri_freq,
            frequency: pl022_rate(peri_freq.to_Hz(), hz),
        };
        bus.disable();
        bus
    }

    fn settle(&mut self) {
        let ns = settle_ns(self.frequency);
        self.timer.delay_ns(ns);
    }
}

fn set_output_enable(pins: &mut SpiPins, cs: &mut Cs, value: OutputEnableOverride) {
    pins.0.set_output_enable_override(value);
    pins.1.set_output_enable_override(value);
    pins.2.set_output_enable_override(value);
    cs.set_output_enable_override(value);
}

impl SpiTransport for Pl022Bus {
    fn write(&mut self, data: &[u8]) {
        if let Some(Lines::Driven(spi)) = self.lines.as_mut() {
            SpiBus::write(spi, data).ok();
            SpiBus::flush(spi).ok();
        }
    }

    fn read(&mut self, buf: &mut [u8]) {
        buf.fill(READ_FILL);
        match self.lines.as_mut() {
            Some(Lines::Driven(spi)) => {
                SpiBus::transfer_in_place(spi, buf).ok();
            }
            _ => buf.fill(RELEASED_FILL),
        }
    }

    fn set_frequency(&mut self, hz: u32) -> u32 {
        self.frequency = match self.lines.as_mut() {
            Some(Lines::Driven(spi)) => spi.set_baudrate(self.peri_freq, hz.Hz()).to_Hz(),
            _ => pl022_rate(self.peri_freq.to_Hz(), hz),
        };
        self.frequency
    }

    fn enable(&mut self, hz: u32) {
        self.cs.set_high().ok();

        self.lines = match self.lines.take() {
            Some(Lines::Released(device, mut pins)) => {
                set_output_enable(&mut pins, &mut self.cs, OutputEnableOverride::DontInvert);
                Some(Lines::Driven(Spi::<_, _, _, 8>::new(device, pins).enable()))
            }
            other => other,
        };

        self.set_frequency(hz);
    }

    fn disable(&mut self) {
        self.cs.set_high().ok();

        self.lines = match self.lines.take() {
            Some(Lines::Driven(spi)) => {
                let (device, mut pins) = spi.disable().free();
                set_output_enable(&mut pins, &mut self.cs, OutputEnableOverride::Disable);
                Some(Lines::Released(device, pins))
            }
            other => other,
        };
    }

    fn select(&mut self) {
        self.settle();
        self.cs.set_low().ok();
        self.settle();
    }

    fn deselect(&mut self) {
        self.settle();
        self.cs.set_high().ok();
        self.settle();
    }
}
