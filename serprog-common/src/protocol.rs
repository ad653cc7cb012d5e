// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! serprog wire constants and opcodes shared by the bridge and host tools.
//!
//! Multi-byte integers travel little-endian. Lengths in `O_SPIOP` frames are
//! 24-bit.

// --- Response codes ---

pub const ACK: u8 = 0x06;
pub const NAK: u8 = 0x15;

// --- Fixed response payloads ---

/// Interface version reported by `Q_IFACE`, sent as `[major, minor]`.
pub const IFACE_VERSION: [u8; 2] = [0x01, 0x00];

/// Serial buffer size reported by `Q_SERBUF`. The bridge consumes input as
/// fast as it arrives, so it advertises the maximum.
pub const SERBUF_SIZE: u16 = 0xFFFF;

pub const CMDMAP_LEN: usize = 32;
pub const PGMNAME_LEN: usize = 16;

/// Largest length encodable in a 3-byte frame field.
pub const MAX_TRANSFER_LEN: u32 = 0x00FF_FFFF;

/// Capacity of the chunk buffer used by `O_SPIOP`.
pub const SCRATCH_LEN: usize = 4096;

/// Bus type bits for `Q_BUSTYPE` / `S_BUSTYPE`.
pub mod bus {
    pub const PARALLEL: u8 = 1 << 0;
    pub const LPC: u8 = 1 << 1;
    pub const FWH: u8 = 1 << 2;
    pub const SPI: u8 = 1 << 3;
}

/// Commands implemented by the bridge.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Opcode {
    Nop = 0x00,
    QueryIface = 0x01,
    QueryCmdMap = 0x02,
    QueryPgmName = 0x03,
    QuerySerBuf = 0x04,
    QueryBusType = 0x05,
    SyncNop = 0x10,
    SetBusType = 0x12,
    SpiOp = 0x13,
    SetSpiFreq = 0x14,
    SetPinState = 0x15,
}

impl Opcode {
    /// Every opcode, in wire order.
    pub const ALL: [Opcode; 11] = [
        Opcode::Nop,
        Opcode::QueryIface,
        Opcode::QueryCmdMap,
        Opcode::QueryPgmName,
        Opcode::QuerySerBuf,
        Opcode::QueryBusType,
        Opcode::SyncNop,
        Opcode::SetBusType,
        Opcode::SpiOp,
        Opcode::SetSpiFreq,
        Opcode::SetPinState,
    ];

    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Opcode {
    /// The unrecognised byte.
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Ok(match byte {
            0x00 => Opcode::Nop,
            0x01 => Opcode::QueryIface,
            0x02 => Opcode::QueryCmdMap,
            0x03 => Opcode::QueryPgmName,
            0x04 => Opcode::QuerySerBuf,
            0x05 => Opcode::QueryBusType,
            0x10 => Opcode::SyncNop,
            0x12 => Opcode::SetBusType,
            0x13 => Opcode::SpiOp,
            0x14 => Opcode::SetSpiFreq,
            0x15 => Opcode::SetPinState,
            other => return Err(other),
        })
    }
}

// --- 24-bit length fields ---

/// Decode a 3-byte little-endian length.
pub fn u24_from_le(bytes: [u8; 3]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0])
}

/// Encode the low 24 bits of `value` little-endian. Higher bits are dropped.
pub fn u24_to_le(value: u32) -> [u8; 3] {
    let b = value.to_le_bytes();
    [b[0], b[1], b[2]]
}

/// Header of an `O_SPIOP` request: opcode, write length, read length.
pub fn spiop_header(write_len: u32, read_len: u32) -> [u8; 7] {
    let w = u24_to_le(write_len);
    let r = u24_to_le(read_len);
    [Opcode::SpiOp.as_u8(), w[0], w[1], w[2], r[0], r[1], r[2]]
}
