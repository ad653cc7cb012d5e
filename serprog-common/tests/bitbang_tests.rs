// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! GPIO bit-banged transport against simulated pins.

mod common;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use common::MockLink;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use serprog_common::bitbang::{half_period_ns, BitBangSpi, Release, BITBANG_MAX_HZ};
use serprog_common::protocol::{spiop_header, ACK};
use serprog_common::transport::{settle_ns, SpiTransport, RELEASED_FILL};
use serprog_common::{Dispatcher, PICO_SERPROG};

/// Shared electrical state of the four simulated lines.
#[derive(Default)]
struct Wire {
    sck: bool,
    mosi: bool,
    cs: bool,
    released: [bool; 4],
    /// MOSI level at each rising SCK edge.
    sampled: Vec<bool>,
    /// Levels MISO presents at successive samples; idles high.
    miso: VecDeque<bool>,
    sck_edges: usize,
    delay_ns: u64,
}

type Shared = Rc<RefCell<Wire>>;

#[derive(Clone, Copy)]
enum Line {
    Sck = 0,
    Mosi = 1,
    Miso = 2,
    Cs = 3,
}

struct SimPin {
    wire: Shared,
    line: Line,
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        let mut w = self.wire.borrow_mut();
        match self.line {
            Line::Sck => w.sck = false,
            Line::Mosi => w.mosi = false,
            Line::Cs => w.cs = false,
            Line::Miso => {}
        }
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        let mut w = self.wire.borrow_mut();
        match self.line {
            Line::Sck => {
                if !w.sck {
                    let level = w.mosi;
                    w.sampled.push(level);
                    w.sck_edges += 1;
                }
                w.sck = true;
            }
            Line::Mosi => w.mosi = true,
            Line::Cs => w.cs = true,
            Line::Miso => {}
        }
        Ok(())
    }
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.wire.borrow_mut().miso.pop_front().unwrap_or(true))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|h| !h)
    }
}

impl Release for SimPin {
    fn release(&mut self) {
        self.wire.borrow_mut().released[self.line as usize] = true;
    }

    fn reclaim(&mut self) {
        self.wire.borrow_mut().released[self.line as usize] = false;
    }
}

struct SimDelay(Shared);

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().delay_ns += ns as u64;
    }
}

type SimBus = BitBangSpi<SimPin, SimPin, SimPin, SimPin, SimDelay>;

fn sim_bus() -> (SimBus, Shared) {
    let wire: Shared = Rc::new(RefCell::new(Wire::default()));
    let pin = |line| SimPin {
        wire: wire.clone(),
        line,
    };
    let bus = BitBangSpi::new(
        pin(Line::Sck),
        pin(Line::Mosi),
        pin(Line::Miso),
        pin(Line::Cs),
        SimDelay(wire.clone()),
    );
    (bus, wire)
}

fn bits(byte: u8) -> Vec<bool> {
    (0..8).rev().map(|i| byte & (1 << i) != 0).collect()
}

// =============================================================================
// Pin ownership
// =============================================================================

#[test]
fn test_new_starts_released() {
    let (bus, wire) = sim_bus();
    assert!(!bus.is_driven());
    let w = wire.borrow();
    assert_eq!(w.released, [true; 4]);
    assert!(w.cs);
    assert!(!w.sck);
}

#[test]
fn test_enable_reclaims_lines_idle() {
    let (mut bus, wire) = sim_bus();
    bus.enable(1_000_000);

    assert!(bus.is_driven());
    let w = wire.borrow();
    assert_eq!(w.released, [false; 4]);
    assert!(w.cs, "chip select must idle inactive");
    assert!(!w.sck, "mode 0 idles SCK low");
}

#[test]
fn test_disable_releases_lines() {
    let (mut bus, wire) = sim_bus();
    bus.enable(1_000_000);
    bus.disable();

    assert!(!bus.is_driven());
    assert_eq!(wire.borrow().released, [true; 4]);
}

// =============================================================================
// Transfers
// =============================================================================

#[test]
fn test_write_shifts_msb_first() {
    let (mut bus, wire) = sim_bus();
    bus.enable(1_000_000);
    bus.write(&[0xA5, 0x01]);

    let w = wire.borrow();
    let mut expected = bits(0xA5);
    expected.extend(bits(0x01));
    assert_eq!(w.sampled, expected);
    assert!(!w.sck);
}

#[test]
fn test_read_samples_miso_and_sends_zero() {
    let (mut bus, wire) = sim_bus();
    bus.enable(1_000_000);
    wire.borrow_mut().miso.extend(bits(0x3C));
    wire.borrow_mut().miso.extend(bits(0xC2));

    let mut buf = [0u8; 3];
    bus.read(&mut buf);

    // The third byte reads the idle-high line
    assert_eq!(buf, [0x3C, 0xC2, 0xFF]);
    let w = wire.borrow();
    assert_eq!(w.sampled.len(), 24);
    assert!(w.sampled.iter().all(|b| !b));
}

#[test]
fn test_released_bus_does_not_clock() {
    let (mut bus, wire) = sim_bus();
    bus.write(&[0xFF]);

    let mut buf = [0u8; 4];
    bus.read(&mut buf);

    assert_eq!(buf, [RELEASED_FILL; 4]);
    assert_eq!(wire.borrow().sck_edges, 0);
}

#[test]
fn test_select_and_deselect_settle_around_edge() {
    let (mut bus, wire) = sim_bus();
    let hz = bus.set_frequency(1_000_000);
    bus.enable(hz);
    let before = wire.borrow().delay_ns;

    bus.select();
    assert!(!wire.borrow().cs);
    bus.deselect();
    assert!(wire.borrow().cs);

    let spent = wire.borrow().delay_ns - before;
    assert_eq!(spent, 4 * settle_ns(hz) as u64);
}

// =============================================================================
// Clock
// =============================================================================

#[test]
fn test_frequency_exact_when_divisible() {
    let (mut bus, _) = sim_bus();
    assert_eq!(bus.set_frequency(1_000_000), 1_000_000);
    assert_eq!(half_period_ns(1_000_000), 500);
}

#[test]
fn test_frequency_rounds_down() {
    let (mut bus, _) = sim_bus();
    // 167 ns half period
    assert_eq!(bus.set_frequency(3_000_000), 2_994_011);
}

#[test]
fn test_frequency_capped() {
    let (mut bus, _) = sim_bus();
    assert_eq!(bus.set_frequency(50_000_000), BITBANG_MAX_HZ);
    assert_eq!(bus.frequency(), BITBANG_MAX_HZ);
}

#[test]
fn test_byte_takes_sixteen_half_periods() {
    let (mut bus, wire) = sim_bus();
    bus.enable(1_000_000);
    let before = wire.borrow().delay_ns;
    bus.write(&[0x00]);
    assert_eq!(wire.borrow().delay_ns - before, 16 * 500);
}

// =============================================================================
// Through the dispatcher
// =============================================================================

#[test]
fn test_dispatcher_spiop_over_bitbang() {
    let (bus, wire) = sim_bus();
    let mut d = Dispatcher::new(bus, &PICO_SERPROG, 1_000_000);
    assert!(d.bus().is_driven());

    // MISO is sampled during the opcode byte too
    wire.borrow_mut().miso.extend(bits(0x00));
    wire.borrow_mut().miso.extend(bits(0xEF));
    wire.borrow_mut().miso.extend(bits(0x40));
    wire.borrow_mut().miso.extend(bits(0x18));

    let mut req = spiop_header(1, 3).to_vec();
    req.push(0x9F);
    let mut link = MockLink::new(&req);
    d.serve(&mut link).unwrap();

    assert_eq!(link.output, vec![ACK, 0xEF, 0x40, 0x18]);
    let w = wire.borrow();
    assert_eq!(&w.sampled[..8], &bits(0x9F)[..]);
    assert!(w.cs, "chip select released after the transaction");
}
