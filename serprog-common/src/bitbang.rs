// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! SPI mode 0, MSB first, driven entirely from GPIOs.
//!
//! Works on any board whose pins implement the `embedded-hal` digital traits
//! plus [`Release`]. Timing comes from a [`DelayNs`] source, so the achieved
//! clock is approximate and capped at [`BITBANG_MAX_HZ`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::transport::{settle_ns, SpiTransport, READ_FILL, RELEASED_FILL};

/// Fastest clock the bit-banged bus will attempt.
pub const BITBANG_MAX_HZ: u32 = 4_000_000;

const NS_PER_HALF_SECOND: u32 = 500_000_000;
const MIN_HALF_PERIOD_NS: u32 = NS_PER_HALF_SECOND / BITBANG_MAX_HZ;

/// A line that can stop driving and float.
pub trait Release {
    /// Stop driving the line: high impedance, no pulls.
    fn release(&mut self);
    /// Take the line back into its configured function.
    fn reclaim(&mut self);
}

/// Half of the SCK period used for a request of `hz`, in nanoseconds.
pub fn half_period_ns(hz: u32) -> u32 {
    NS_PER_HALF_SECOND.div_ceil(hz.max(1)).max(MIN_HALF_PERIOD_NS)
}

pub struct BitBangSpi<SCK, MOSI, MISO, CS, D> {
    sck: SCK,
    mosi: MOSI,
    miso: MISO,
    cs: CS,
    delay: D,
    half_period_ns: u32,
    driven: bool,
}

impl<SCK, MOSI, MISO, CS, D> BitBangSpi<SCK, MOSI, MISO, CS, D>
where
    SCK: OutputPin + Release,
    MOSI: OutputPin + Release,
    MISO: InputPin + Release,
    CS: OutputPin + Release,
    D: DelayNs,
{
    /// Wrap the four bus lines. The bus starts released.
    pub fn new(sck: SCK, mosi: MOSI, miso: MISO, cs: CS, delay: D) -> Self {
        let mut bus = Self {
            sck,
            mosi,
            miso,
            cs,
            delay,
            half_period_ns: MIN_HALF_PERIOD_NS,
            driven: true,
        };
        bus.disable();
        bus
    }

    /// Achieved clock rate in Hz.
    pub fn frequency(&self) -> u32 {
        NS_PER_HALF_SECOND / self.half_period_ns
    }

    pub fn is_driven(&self) -> bool {
        self.driven
    }

    pub fn free(self) -> (SCK, MOSI, MISO, CS, D) {
        (self.sck, self.mosi, self.miso, self.cs, self.delay)
    }

    fn transfer_byte(&mut self, out: u8) -> u8 {
        let mut input = 0u8;
        for bit in (0..8).rev() {
            if out & (1 << bit) != 0 {
                self.mosi.set_high().ok();
            } else {
                self.mosi.set_low().ok();
            }
            self.delay.delay_ns(self.half_period_ns);

            self.sck.set_high().ok();
            if self.miso.is_high().unwrap_or(false) {
                input |= 1 << bit;
            }
            self.delay.delay_ns(self.half_period_ns);

            self.sck.set_low().ok();
        }
        input
    }

    fn settle(&mut self) {
        let ns = settle_ns(self.frequency());
        self.delay.delay_ns(ns);
    }
}

impl<SCK, MOSI, MISO, CS, D> SpiTransport for BitBangSpi<SCK, MOSI, MISO, CS, D>
where
    SCK: OutputPin + Release,
    MOSI: OutputPin + Release,
    MISO: InputPin + Release,
    CS: OutputPin + Release,
    D: DelayNs,
{
    fn write(&mut self, data: &[u8]) {
        if !self.driven {
            return;
        }
        for &byte in data {
            self.transfer_byte(byte);
        }
    }

    fn read(&mut self, buf: &mut [u8]) {
        if !self.driven {
            buf.fill(RELEASED_FILL);
            return;
        }
        for byte in buf.iter_mut() {
            *byte = self.transfer_byte(READ_FILL);
        }
    }

    fn set_frequency(&mut self, hz: u32) -> u32 {
        self.half_period_ns = half_period_ns(hz);
        self.frequency()
    }

    fn enable(&mut self, hz: u32) {
        self.set_frequency(hz);

        self.cs.set_high().ok();
        self.sck.set_low().ok();
        self.mosi.set_low().ok();

        self.cs.reclaim();
        self.sck.reclaim();
        self.mosi.reclaim();
        self.miso.reclaim();
        self.driven = true;
    }

    fn disable(&mut self) {
        self.cs.set_high().ok();
        self.sck.set_low().ok();

        self.cs.release();
        self.sck.release();
        self.mosi.release();
        self.miso.release();
        self.driven = false;
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
