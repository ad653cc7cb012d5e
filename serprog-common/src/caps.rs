// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Static facts the bridge advertises to the host.
//!
//! Everything here is built in `const` context so the query handlers are
//! plain lookups into `'static` data.

use crate::protocol::{bus, Opcode, CMDMAP_LEN, PGMNAME_LEN};

/// Bitmap of implemented opcodes: bit `i` of the 256-bit vector (byte
/// `i / 8`, bit `i % 8`) is set when opcode `i` is handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandMap([u8; CMDMAP_LEN]);

impl CommandMap {
    pub const fn empty() -> Self {
        Self([0; CMDMAP_LEN])
    }

    pub const fn from_opcodes(opcodes: &[Opcode]) -> Self {
        let mut map = [0u8; CMDMAP_LEN];
        let mut i = 0;
        while i < opcodes.len() {
            let op = opcodes[i] as u8;
            map[(op / 8) as usize] |= 1 << (op % 8);
            i += 1;
        }
        Self(map)
    }

    pub const fn from_bytes(bytes: [u8; CMDMAP_LEN]) -> Self {
        Self(bytes)
    }

    pub fn supports(&self, opcode: u8) -> bool {
        self.0[(opcode / 8) as usize] & (1 << (opcode % 8)) != 0
    }

    pub fn as_bytes(&self) -> &[u8; CMDMAP_LEN] {
        &self.0
    }
}

/// Programmer name, NUL padded to the fixed wire width.
///
/// Names longer than 16 bytes are truncated.
pub const fn program_name(name: &str) -> [u8; PGMNAME_LEN] {
    let src = name.as_bytes();
    let mut out = [0u8; PGMNAME_LEN];
    let mut i = 0;
    while i < src.len() && i < PGMNAME_LEN {
        out[i] = src[i];
        i += 1;
    }
    out
}

/// Capability registry of one bridge build.
#[derive(Debug)]
pub struct Capabilities {
    pub bus_types: u8,
    pub command_map: CommandMap,
    pub name: [u8; PGMNAME_LEN],
}

impl Capabilities {
    /// Accept a host's `S_BUSTYPE` request only if it asks for nothing we
    /// lack.
    pub fn supports_bus(&self, requested: u8) -> bool {
        requested & !self.bus_types == 0
    }
}

/// The pico-serprog bridge: SPI only, every [`Opcode`] implemented.
pub static PICO_SERPROG: Capabilities = Capabilities {
    bus_types: bus::SPI,
    command_map: CommandMap::from_opcodes(&Opcode::ALL),
    name: program_name("pico-serprog"),
};
