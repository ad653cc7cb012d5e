// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Bus transport abstraction driven by the dispatcher.
//!
//! The bridge talks to exactly one SPI target through a [`SpiTransport`].
//! Drivers decide how bytes reach the wire (controller peripheral, GPIO
//! bit-banging, a test double); the protocol engine only sees this trait.

/// Byte clocked out on MOSI while reading.
pub const READ_FILL: u8 = 0x00;

/// Byte returned by reads while the bus is released.
pub const RELEASED_FILL: u8 = 0xFF;

/// Shortest settle time around a chip-select edge, in nanoseconds.
pub const SETTLE_MIN_NS: u32 = 25;

/// SPI bus as seen by the protocol engine.
///
/// All operations block until the bus work is complete. Transfers are
/// infallible at this level: a released bus discards writes and reads
/// [`RELEASED_FILL`].
pub trait SpiTransport {
    /// Clock `data` out, discarding whatever comes back.
    fn write(&mut self, data: &[u8]);

    /// Fill `buf` with bytes clocked in while sending [`READ_FILL`].
    fn read(&mut self, buf: &mut [u8]);

    /// Program the clock as close to `hz` as the hardware allows. Returns
    /// the rate actually achieved. `hz` is never 0.
    fn set_frequency(&mut self, hz: u32) -> u32;

    /// Claim and drive the bus pins at `hz`, chip select inactive.
    fn enable(&mut self, hz: u32);

    /// Release the bus pins to high impedance with no pulls.
    fn disable(&mut self);

    /// Assert chip select, settling on both sides of the edge.
    fn select(&mut self);

    /// Deassert chip select, settling on both sides of the edge.
    fn deselect(&mut self);
}

impl<T: SpiTransport + ?Sized> SpiTransport for &mut T {
    fn write(&mut self, data: &[u8]) {
        (**self).write(data)
    }

    fn read(&mut self, buf: &mut [u8]) {
        (**self).read(buf)
    }

    fn set_frequency(&mut self, hz: u32) -> u32 {
        (**self).set_frequency(hz)
    }

    fn enable(&mut self, hz: u32) {
        (**self).enable(hz)
    }

    fn disable(&mut self) {
        (**self).disable()
    }

    fn select(&mut self) {
        (**self).select()
    }

    fn deselect(&mut self) {
        (**self).deselect()
    }
}

/// Settle time around a chip-select edge for a bus clocked at `hz`.
///
/// One full SCK period, never shorter than [`SETTLE_MIN_NS`].
pub fn settle_ns(hz: u32) -> u32 {
    if hz == 0 {
        return SETTLE_MIN_NS;
    }
    1_000_000_000u32.div_ceil(hz).max(SETTLE_MIN_NS)
}

/// Rate the RP2040 PL022 produces for a request of `want_hz` when fed by a
/// `peri_hz` peripheral clock.
///
/// SCK = peri / (prescale * (1 + postdiv)) with an even prescale in 2..=254
/// and postdiv in 0..=255. Picks the smallest prescale whose next step up
/// would bring the rate into post-divider range, then the largest postdiv
/// keeping SCK <= want. Matches the divider search of the RP2040 SDK and HAL.
pub fn pl022_rate(peri_hz: u32, want_hz: u32) -> u32 {
    let want = want_hz.max(1) as u64;
    let peri = peri_hz as u64;

    let prescale = (2..=254u64)
        .step_by(2)
        .find(|p| peri < (p + 2) * 256 * want)
        .unwrap_or(254);

    let postdiv = (1..=255u64)
        .rev()
        .find(|d| peri / (prescale * d) > want)
        .unwrap_or(0);

    (peri / (prescale * (1 + postdiv))) as u32
}
