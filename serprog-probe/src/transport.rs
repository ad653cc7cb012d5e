// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Serial transport layer for serprog programmers.

use anyhow::{bail, Context, Result};
use serialport::SerialPort;
use std::io::{Read, Write};
use std::time::Duration;

use serprog_common::{Opcode, ACK, NAK};

use crate::frame::{check_status, encode_command, encode_spi_op};

/// Default timeout for serial operations in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Attempts at finding the NAK/ACK pair after a SYNCNOP.
const SYNC_ATTEMPTS: usize = 8;

/// Bytes skipped per attempt while looking for the NAK/ACK pair.
const SYNC_SCAN_LIMIT: usize = 64;

/// USB CDC (or UART) connection to a serprog programmer.
pub struct Transport {
    port: Box<dyn SerialPort>,
}

impl Transport {
    /// Open the serial port. The baud rate only matters for real UARTs.
    pub fn new(port_name: &str, baud: u32) -> Result<Self> {
        let port = serialport::new(port_name, baud)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()
            .with_context(|| format!("Failed to open serial port {}", port_name))?;

        log::info!("Opened {} at {} baud", port_name, baud);

        Ok(Self { port })
    }

    /// Get the port name.
    pub fn port_name(&self) -> String {
        self.port.name().unwrap_or_else(|| "?".to_string())
    }

    /// Send a command and check its status byte, then read `ret.len()` bytes
    /// of payload.
    pub fn command(&mut self, op: Opcode, params: &[u8], ret: &mut [u8]) -> Result<()> {
        log::debug!("-> {:?} {:02x?}", op, params);
        self.send(&encode_command(op, params))?;

        let status = self.read_byte()?;
        check_status(op, status)?;

        self.read_exact(ret)?;
        log::debug!("<- {:02x?}", ret);
        Ok(())
    }

    /// Run one SPI transaction: clock out `write`, then clock `read.len()`
    /// bytes back in.
    pub fn spi_op(&mut self, write: &[u8], read: &mut [u8]) -> Result<()> {
        let frame = encode_spi_op(write, read.len())?;
        log::debug!("-> SpiOp w={} r={}", write.len(), read.len());
        self.send(&frame)?;

        let status = self.read_byte()?;
        check_status(Opcode::SpiOp, status)?;

        self.read_exact(read)
    }

    /// Bring the programmer's parser back to waiting-for-opcode.
    ///
    /// Any half-sent command is completed with NOPs, stale output is
    /// drained, and SYNCNOP is repeated until its NAK ACK answer shows up.
    pub fn synchronize(&mut self) -> Result<()> {
        self.send(&[Opcode::Nop.as_u8(); 8])?;
        self.drain_rx();

        for attempt in 0..SYNC_ATTEMPTS {
            log::debug!("SYNCNOP attempt {}", attempt + 1);
            self.send(&[Opcode::SyncNop.as_u8()])?;
            if self.expect_sync_reply()? {
                self.drain_rx();
                return Ok(());
            }
        }

        bail!("Programmer did not answer SYNCNOP after {} attempts", SYNC_ATTEMPTS)
    }

    fn expect_sync_reply(&mut self) -> Result<bool> {
        let old_timeout = self.port.timeout();
        let _ = self.port.set_timeout(Duration::from_millis(100));

        let result = scan_for_sync_reply(&mut self.port).context("Serial read error");

        let _ = self.port.set_timeout(old_timeout);
        result
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.port
            .write_all(bytes)
            .context("Failed to write to serial port")?;
        self.port.flush()?;
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.port.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                bail!("Timeout waiting for response")
            }
            Err(e) => bail!("Serial read error: {}", e),
        }
    }

    fn drain_rx(&mut self) {
        let mut buf = [0u8; 64];
        let old_timeout = self.port.timeout();
        let _ = self.port.set_timeout(Duration::from_millis(10));
        while self.port.read(&mut buf).unwrap_or(0) > 0 {}
        let _ = self.port.set_timeout(old_timeout);
    }
}

/// Discard bytes until an ACK directly follows a NAK.
///
/// Returns `false` when the port times out or the scan limit is hit.
fn scan_for_sync_reply<R: Read + ?Sized>(port: &mut R) -> std::io::Result<bool> {
    let mut previous = None;
    for _ in 0..SYNC_SCAN_LIMIT {
        let mut byte = [0u8; 1];
        match port.read_exact(&mut byte) {
            Ok(()) => {}
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::TimedOut | std::io::ErrorKind::UnexpectedEof
                ) =>
            {
                return Ok(false)
            }
            Err(e) => return Err(e),
        }

        if previous == Some(NAK) && byte[0] == ACK {
            return Ok(true);
        }
        previous = Some(byte[0]);
    }
    Ok(false)
}
