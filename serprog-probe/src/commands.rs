// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command implementations for probe operations.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use crc::{Crc, CRC_32_ISO_HDLC};
use indicatif::{ProgressBar, ProgressStyle};

use serprog_common::protocol::{bus, CMDMAP_LEN, PGMNAME_LEN};
use serprog_common::{Opcode, SCRATCH_LEN};

use crate::frame::{
    check_flash_range, decode_bus_types, decode_name, flash, read_data_command, supported_opcodes,
};
use crate::transport::Transport;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Bytes fetched per READ transaction.
const CHUNK_SIZE: usize = SCRATCH_LEN;

/// Query and display the programmer's identity and capabilities.
pub fn info(transport: &mut Transport) -> Result<()> {
    let mut iface = [0u8; 2];
    transport.command(Opcode::QueryIface, &[], &mut iface)?;

    let mut name = [0u8; PGMNAME_LEN];
    transport.command(Opcode::QueryPgmName, &[], &mut name)?;

    let mut serbuf = [0u8; 2];
    transport.command(Opcode::QuerySerBuf, &[], &mut serbuf)?;

    let mut bus_types = [0u8; 1];
    transport.command(Opcode::QueryBusType, &[], &mut bus_types)?;

    let mut map = [0u8; CMDMAP_LEN];
    transport.command(Opcode::QueryCmdMap, &[], &mut map)?;

    let opcodes: Vec<String> = supported_opcodes(&map)
        .into_iter()
        .map(|op| format!("0x{:02x}", op))
        .collect();

    println!("Programmer:");
    println!("  Name:       {}", decode_name(&name));
    println!("  Interface:  {}", u16::from_le_bytes(iface));
    println!("  Serial buf: {} bytes", u16::from_le_bytes(serbuf));
    println!("  Buses:      {}", decode_bus_types(bus_types[0]).join(", "));
    println!("  Commands:   {}", opcodes.join(" "));

    Ok(())
}

/// Resynchronize the command stream.
pub fn sync(transport: &mut Transport) -> Result<()> {
    transport.synchronize()?;
    println!("Synchronized with {}", transport.port_name());
    Ok(())
}

/// Request an SPI clock and report what the programmer achieved.
pub fn set_frequency(transport: &mut Transport, hz: u32) -> Result<()> {
    if hz == 0 {
        bail!("Frequency must be non-zero");
    }

    let mut actual = [0u8; 4];
    transport.command(Opcode::SetSpiFreq, &hz.to_le_bytes(), &mut actual)?;

    println!("Requested {} Hz, got {} Hz", hz, u32::from_le_bytes(actual));
    Ok(())
}

/// Drive or release the programmer's bus lines.
pub fn set_pins(transport: &mut Transport, drive: bool) -> Result<()> {
    transport.command(Opcode::SetPinState, &[drive as u8], &mut [])?;
    println!("Bus lines {}", if drive { "driven" } else { "released" });
    Ok(())
}

/// Read the flash chip's JEDEC manufacturer and device ID.
pub fn jedec(transport: &mut Transport) -> Result<()> {
    prepare_spi(transport)?;

    let mut id = [0u8; 3];
    transport.spi_op(&[flash::READ_JEDEC_ID], &mut id)?;

    if id == [0xFF; 3] || id == [0x00; 3] {
        bail!("No flash chip answered (JEDEC ID {:02x?})", id);
    }

    println!(
        "JEDEC ID: manufacturer 0x{:02x}, device 0x{:02x}{:02x}",
        id[0], id[1], id[2]
    );
    Ok(())
}

/// Dump `length` bytes starting at `address` into `file`.
pub fn read(transport: &mut Transport, address: u32, length: u32, file: &Path) -> Result<()> {
    check_flash_range(address, length)?;
    prepare_spi(transport)?;

    let data = read_flash(transport, address, length)?;
    fs::write(file, &data).with_context(|| format!("Failed to write {}", file.display()))?;

    println!(
        "Read {} bytes from 0x{:06x} into {} (CRC32: 0x{:08x})",
        data.len(),
        address,
        file.display(),
        CRC32.checksum(&data)
    );
    Ok(())
}

/// Compare flash contents at `address` against `file`.
pub fn verify(transport: &mut Transport, address: u32, file: &Path) -> Result<()> {
    let expected = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let length = u32::try_from(expected.len()).context("Image larger than 4 GiB")?;
    check_flash_range(address, length)?;
    let expected_crc = CRC32.checksum(&expected);

    println!(
        "Image: {} ({} bytes, CRC32: 0x{:08x})",
        file.display(),
        expected.len(),
        expected_crc
    );

    prepare_spi(transport)?;
    let actual = read_flash(transport, address, length)?;
    let actual_crc = CRC32.checksum(&actual);

    if actual_crc != expected_crc {
        let offset = first_mismatch(&expected, &actual).unwrap_or(0);
        bail!(
            "Verify failed at 0x{:06x}: flash CRC32 0x{:08x}, image CRC32 0x{:08x}",
            address as usize + offset,
            actual_crc,
            expected_crc
        );
    }

    println!("Flash matches image.");
    Ok(())
}

/// Check the programmer speaks SPI and drive its lines.
fn prepare_spi(transport: &mut Transport) -> Result<()> {
    transport
        .command(Opcode::SetBusType, &[bus::SPI], &mut [])
        .context("Programmer does not support SPI")?;
    transport.command(Opcode::SetPinState, &[1], &mut [])?;
    Ok(())
}

/// Caller checks the range with `check_flash_range` first.
fn read_flash(transport: &mut Transport, address: u32, length: u32) -> Result<Vec<u8>> {
    let mut data = vec![0u8; length as usize];

    let pb = ProgressBar::new(length as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let mut offset = 0usize;
    for chunk in data.chunks_mut(CHUNK_SIZE) {
        let chunk_address = address + offset as u32;
        if let Err(e) = transport.spi_op(&read_data_command(chunk_address), chunk) {
            pb.abandon();
            return Err(e).with_context(|| format!("Read failed at 0x{:06x}", chunk_address));
        }

        offset += chunk.len();
        pb.set_position(offset as u64);
    }

    pb.finish_and_clear();
    Ok(data)
}

fn first_mismatch(expected: &[u8], actual: &[u8]) -> Option<usize> {
    expected
        .iter()
        .zip(actual)
        .position(|(a, b)| a != b)
        .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_mismatch() {
        assert_eq!(first_mismatch(b"abcd", b"abcd"), None);
        assert_eq!(first_mismatch(b"abcd", b"abXd"), Some(2));
        assert_eq!(first_mismatch(b"abcd", b"ab"), Some(2));
    }

    #[test]
    fn test_crc32_matches_iso_hdlc() {
        assert_eq!(CRC32.checksum(b"123456789"), 0xCBF4_3926);
    }
}
