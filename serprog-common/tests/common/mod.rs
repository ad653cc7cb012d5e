// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! In-memory host link and bus doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::convert::Infallible;

use serprog_common::transport::SpiTransport;

/// Host side of the serial stream: bytes queued for the bridge to read and
/// everything it wrote back, with the output length at every flush.
#[derive(Default)]
pub struct MockLink {
    pub input: VecDeque<u8>,
    pub output: Vec<u8>,
    pub flushes: Vec<usize>,
}

impl MockLink {
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            ..Default::default()
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    /// Take everything written so far.
    pub fn take_output(&mut self) -> Vec<u8> {
        self.flushes.clear();
        std::mem::take(&mut self.output)
    }
}

impl embedded_io::ErrorType for MockLink {
    type Error = Infallible;
}

impl embedded_io::Read for MockLink {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.input.len());
        for slot in buf[..n].iter_mut() {
            *slot = self.input.pop_front().unwrap();
        }
        Ok(n)
    }
}

impl embedded_io::Write for MockLink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes.push(self.output.len());
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BusEvent {
    SetFrequency(u32),
    Enable(u32),
    Disable,
    Select,
    Deselect,
    Write(Vec<u8>),
    Read(usize),
}

/// Loopback transport: every written byte lands in the read queue behind
/// one leading fill byte, so reads come back shifted by one position.
pub struct LoopbackBus {
    pub events: Vec<BusEvent>,
    pub rx: VecDeque<u8>,
    pub max_hz: u32,
}

pub const LOOPBACK_FILL: u8 = 0xA5;
pub const LOOPBACK_MAX_HZ: u32 = 24_000_000;

impl LoopbackBus {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            rx: VecDeque::from([LOOPBACK_FILL]),
            max_hz: LOOPBACK_MAX_HZ,
        }
    }

    pub fn written(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                BusEvent::Write(data) => Some(data.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn transfer_events(&self) -> Vec<BusEvent> {
        self.events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    BusEvent::Select | BusEvent::Deselect | BusEvent::Write(_) | BusEvent::Read(_)
                )
            })
            .cloned()
            .collect()
    }
}

impl SpiTransport for LoopbackBus {
    fn write(&mut self, data: &[u8]) {
        self.rx.extend(data);
        self.events.push(BusEvent::Write(data.to_vec()));
    }

    fn read(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte = self.rx.pop_front().unwrap_or(0xFF);
        }
        self.events.push(BusEvent::Read(buf.len()));
    }

    fn set_frequency(&mut self, hz: u32) -> u32 {
        let achieved = hz.min(self.max_hz);
        self.events.push(BusEvent::SetFrequency(hz));
        achieved
    }

    fn enable(&mut self, hz: u32) {
        self.events.push(BusEvent::Enable(hz));
    }

    fn disable(&mut self) {
        self.events.push(BusEvent::Disable);
    }

    fn select(&mut self) {
        self.events.push(BusEvent::Select);
    }

    fn deselect(&mut self) {
        self.events.push(BusEvent::Deselect);
    }
}
