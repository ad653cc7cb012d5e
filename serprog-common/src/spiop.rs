// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! `O_SPIOP`: one chip-select-bracketed write-then-read transaction.
//!
//! The host sends the whole write payload without waiting; we stream it to
//! the bus in scratch-sized chunks, ACK once it is all on the wire, then
//! stream the read phase back chunk by chunk.

use embedded_io::{Read, Write};

use crate::error::{Error, Result};
use crate::protocol::{ACK, SCRATCH_LEN};
use crate::transport::SpiTransport;

/// Write and read lengths of one transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiOp {
    pub write_len: u32,
    pub read_len: u32,
}

/// Run `op` against `bus`, pulling the write payload from and pushing the
/// read payload to `link`.
///
/// Chip select is released again even if the link fails mid-transaction.
pub fn spi_op<L, B>(
    link: &mut L,
    bus: &mut B,
    scratch: &mut [u8; SCRATCH_LEN],
    op: SpiOp,
) -> Result<(), L::Error>
where
    L: Read + Write,
    B: SpiTransport + ?Sized,
{
    bus.select();
    let result = transfer(link, bus, scratch, op);
    bus.deselect();
    result
}

fn transfer<L, B>(
    link: &mut L,
    bus: &mut B,
    scratch: &mut [u8; SCRATCH_LEN],
    op: SpiOp,
) -> Result<(), L::Error>
where
    L: Read + Write,
    B: SpiTransport + ?Sized,
{
    let mut remaining = op.write_len as usize;
    while remaining > 0 {
        let n = remaining.min(SCRATCH_LEN);
        let chunk = &mut scratch[..n];
        link.read_exact(chunk)?;
        bus.write(chunk);
        remaining -= n;
    }

    link.write_all(&[ACK]).map_err(Error::Link)?;

    let mut remaining = op.read_len as usize;
    while remaining > 0 {
        let n = remaining.min(SCRATCH_LEN);
        let chunk = &mut scratch[..n];
        bus.read(chunk);
        link.write_all(chunk).map_err(Error::Link)?;
        remaining -= n;
    }

    Ok(())
}
