// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Bit-banged bus transport on SIO GPIOs (`bitbang` feature).

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use rp2040_hal as hal;
use rp2040_hal::gpio::bank0::{Gpio2, Gpio3, Gpio4, Gpio5};
use rp2040_hal::gpio::{
    Function, FunctionSioInput, FunctionSioOutput, OutputEnableOverride, Pin, PinId, PullNone,
};
use serprog_common::bitbang::{BitBangSpi, Release};

use crate::peripherals::BusPins;

/// A pull-less GPIO whose output driver can be forced off.
pub struct Tristate<I: PinId, F: Function>(Pin<I, F, PullNone>);

impl<I: PinId, F: Function> Release for Tristate<I, F> {
    fn release(&mut self) {
        self.0.set_output_enable_override(OutputEnableOverride::Disable);
    }

    fn reclaim(&mut self) {
        self.0.set_output_enable_override(OutputEnableOverride::DontInvert);
    }
}

impl<I: PinId, F: Function> ErrorType for Tristate<I, F> {
    type Error = Infallible;
}

impl<I: PinId, F: Function> OutputPin for Tristate<I, F>
where
    Pin<I, F, PullNone>: OutputPin<Error = Infallible>,
{
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.set_low()
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.set_high()
    }
}

impl<I: PinId, F: Function> InputPin for Tristate<I, F>
where
    Pin<I, F, PullNone>: InputPin<Error = Infallible>,
{
    fn is_high(&mut self) -> Result<bool, Infallible> {
        self.0.is_high()
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.0.is_low()
    }
}

pub type BitBangBus = BitBangSpi<
    Tristate<Gpio2, FunctionSioOutput>,
    Tristate<Gpio3, FunctionSioOutput>,
    Tristate<Gpio4, FunctionSioInput>,
    Tristate<Gpio5, FunctionSioOutput>,
    hal::Timer,
>;

/// Hand the bus pins to the bit-banged transport. The bus starts released.
pub fn new(pins: BusPins, timer: hal::Timer) -> BitBangBus {
    BitBangSpi::new(
        Tristate(pins.sck.reconfigure()),
        Tristate(pins.mosi.reconfigure()),
        Tristate(pins.miso.reconfigure()),
        Tristate(pins.cs.reconfigure()),
        timer,
    )
}
