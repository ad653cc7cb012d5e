// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Request encoding and response decoding for the serprog wire format.

use anyhow::{bail, Result};

use serprog_common::protocol::{bus, spiop_header, MAX_TRANSFER_LEN};
use serprog_common::{Opcode, ACK, NAK};

/// SPI flash opcodes used by the probe.
pub mod flash {
    pub const READ_JEDEC_ID: u8 = 0x9F;
    pub const READ_DATA: u8 = 0x03;

    /// Bytes reachable with a 3-byte address.
    pub const ADDRESS_SPACE: u64 = 1 << 24;
}

/// Opcode byte followed by its parameters.
pub fn encode_command(op: Opcode, params: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(1 + params.len());
    frame.push(op.as_u8());
    frame.extend_from_slice(params);
    frame
}

/// Full O_SPIOP request: opcode, 24-bit lengths, then the bytes to send.
pub fn encode_spi_op(write: &[u8], read_len: usize) -> Result<Vec<u8>> {
    if write.len() as u64 > MAX_TRANSFER_LEN as u64 || read_len as u64 > MAX_TRANSFER_LEN as u64
    {
        bail!(
            "SPI operation too long: {} bytes out, {} bytes in (limit {})",
            write.len(),
            read_len,
            MAX_TRANSFER_LEN
        );
    }

    let header = spiop_header(write.len() as u32, read_len as u32);
    let mut frame = Vec::with_capacity(header.len() + write.len());
    frame.extend_from_slice(&header);
    frame.extend_from_slice(write);
    Ok(frame)
}

/// Flash READ with a 24-bit big-endian address.
pub fn read_data_command(address: u32) -> [u8; 4] {
    let [_, a2, a1, a0] = address.to_be_bytes();
    [flash::READ_DATA, a2, a1, a0]
}

/// Reject ranges that a 3-byte READ address cannot reach.
pub fn check_flash_range(address: u32, length: u32) -> Result<()> {
    let end = address as u64 + length as u64;
    if end > flash::ADDRESS_SPACE {
        bail!(
            "Range 0x{:x}..0x{:x} is beyond the 16 MiB reachable with 3-byte addresses",
            address,
            end
        );
    }
    Ok(())
}

/// Interpret the status byte that starts every response.
pub fn check_status(op: Opcode, status: u8) -> Result<()> {
    match status {
        ACK => Ok(()),
        NAK => bail!("{:?} rejected by the programmer (NAK)", op),
        other => bail!("{:?}: unexpected response byte 0x{:02x}", op, other),
    }
}

/// Programmer name with the NUL padding stripped.
pub fn decode_name(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Human-readable list of the buses set in `mask`.
pub fn decode_bus_types(mask: u8) -> Vec<&'static str> {
    [
        (bus::PARALLEL, "parallel"),
        (bus::LPC, "LPC"),
        (bus::FWH, "FWH"),
        (bus::SPI, "SPI"),
    ]
    .into_iter()
    .filter(|(bit, _)| mask & bit != 0)
    .map(|(_, name)| name)
    .collect()
}

/// Opcodes that the command map marks as implemented, in numeric order.
pub fn supported_opcodes(map: &[u8]) -> Vec<u8> {
    map.iter()
        .enumerate()
        .flat_map(|(index, byte)| {
            (0..8u8)
                .filter(move |bit| byte & (1 << bit) != 0)
                .map(move |bit| (index * 8) as u8 + bit)
        })
        .collect()
}
