// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! serprog command dispatcher.
//!
//! One [`Dispatcher`] owns the bridge session: the bus transport, the
//! current clock rate, whether the pins are driven, and the chunk buffer.
//! Each call to [`Dispatcher::serve`] consumes exactly one command from the
//! host, answers it completely and flushes before returning, so the host and
//! the bridge always agree on which response belongs to which request.

use embedded_io::{Read, Write};

use crate::caps::Capabilities;
use crate::error::{Error, Result};
use crate::protocol::{u24_from_le, Opcode, ACK, IFACE_VERSION, NAK, SCRATCH_LEN, SERBUF_SIZE};
use crate::spiop::{spi_op, SpiOp};
use crate::transport::SpiTransport;

/// Bridge session state, threaded through every command handler.
pub struct Dispatcher<B> {
    bus: B,
    caps: &'static Capabilities,
    frequency: u32,
    enabled: bool,
    scratch: [u8; SCRATCH_LEN],
}

impl<B: SpiTransport> Dispatcher<B> {
    /// Bring the bus up at `default_hz` and start a session.
    pub fn new(mut bus: B, caps: &'static Capabilities, default_hz: u32) -> Self {
        let frequency = bus.set_frequency(default_hz);
        bus.enable(frequency);

        #[cfg(feature = "defmt")]
        defmt::debug!("serprog: bus enabled at {} Hz", frequency);

        Self {
            bus,
            caps,
            frequency,
            enabled: true,
            scratch: [0; SCRATCH_LEN],
        }
    }

    /// Achieved SPI clock rate in Hz.
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Whether the bus pins are currently driven.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Serve commands until the host link fails, returning why it stopped.
    pub fn run<L: Read + Write>(&mut self, link: &mut L) -> Error<L::Error> {
        loop {
            if let Err(e) = self.serve(link) {
                return e;
            }
        }
    }

    /// Read one opcode, answer it and flush the response.
    pub fn serve<L: Read + Write>(&mut self, link: &mut L) -> Result<(), L::Error> {
        let mut byte = [0u8; 1];
        link.read_exact(&mut byte)?;

        match Opcode::try_from(byte[0]) {
            Ok(op) => self.handle(link, op)?,
            Err(_unknown) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("serprog: unknown opcode {=u8:#04x}", _unknown);
                reply(link, &[NAK])?;
            }
        }

        link.flush().map_err(Error::Link)
    }

    fn handle<L: Read + Write>(&mut self, link: &mut L, op: Opcode) -> Result<(), L::Error> {
        match op {
            Opcode::Nop => reply(link, &[ACK]),
            Opcode::QueryIface => {
                reply(link, &[ACK])?;
                reply(link, &IFACE_VERSION)
            }
            Opcode::QueryCmdMap => {
                reply(link, &[ACK])?;
                reply(link, self.caps.command_map.as_bytes())
            }
            Opcode::QueryPgmName => {
                reply(link, &[ACK])?;
                reply(link, &self.caps.name)
            }
            Opcode::QuerySerBuf => {
                reply(link, &[ACK])?;
                reply(link, &SERBUF_SIZE.to_le_bytes())
            }
            Opcode::QueryBusType => reply(link, &[ACK, self.caps.bus_types]),
            // NAK then ACK: hosts resynchronise by looking for this pair
            Opcode::SyncNop => reply(link, &[NAK, ACK]),
            Opcode::SetBusType => self.handle_set_bus_type(link),
            Opcode::SpiOp => self.handle_spi_op(link),
            Opcode::SetSpiFreq => self.handle_set_spi_freq(link),
            Opcode::SetPinState => self.handle_set_pin_state(link),
        }
    }

    /// Capability check only; nothing is stored.
    fn handle_set_bus_type<L: Read + Write>(&mut self, link: &mut L) -> Result<(), L::Error> {
        let mut mask = [0u8; 1];
        link.read_exact(&mut mask)?;

        if self.caps.supports_bus(mask[0]) {
            reply(link, &[ACK])
        } else {
            reply(link, &[NAK])
        }
    }

    fn handle_spi_op<L: Read + Write>(&mut self, link: &mut L) -> Result<(), L::Error> {
        let mut header = [0u8; 6];
        link.read_exact(&mut header)?;

        let op = SpiOp {
            write_len: u24_from_le([header[0], header[1], header[2]]),
            read_len: u24_from_le([header[3], header[4], header[5]]),
        };

        spi_op(link, &mut self.bus, &mut self.scratch, op)
    }

    fn handle_set_spi_freq<L: Read + Write>(&mut self, link: &mut L) -> Result<(), L::Error> {
        let mut raw = [0u8; 4];
        link.read_exact(&mut raw)?;

        let want = u32::from_le_bytes(raw);
        if want == 0 {
            // 0 Hz is reserved
            return reply(link, &[NAK]);
        }

        self.frequency = self.bus.set_frequency(want);

        #[cfg(feature = "defmt")]
        defmt::debug!("serprog: requested {} Hz, got {} Hz", want, self.frequency);

        reply(link, &[ACK])?;
        reply(link, &self.frequency.to_le_bytes())
    }

    fn handle_set_pin_state<L: Read + Write>(&mut self, link: &mut L) -> Result<(), L::Error> {
        let mut state = [0u8; 1];
        link.read_exact(&mut state)?;

        if state[0] != 0 {
            self.bus.enable(self.frequency);
            self.enabled = true;
        } else {
            self.bus.disable();
            self.enabled = false;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("serprog: pins {}", if self.enabled { "driven" } else { "released" });

        reply(link, &[ACK])
    }
}

fn reply<L: Write>(link: &mut L, bytes: &[u8]) -> Result<(), L::Error> {
    link.write_all(bytes).map_err(Error::Link)
}
