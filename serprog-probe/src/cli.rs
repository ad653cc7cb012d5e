// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::commands;
use crate::transport::Transport;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "serprog-probe")]
#[command(about = "Talk to a serprog SPI programmer over a serial port")]
pub struct Cli {
    /// Serial port (e.g., /dev/ttyACM0)
    #[arg(short, long)]
    pub port: String,

    /// Baud rate (ignored by USB CDC devices)
    #[arg(short, long, default_value = "115200")]
    pub baud: u32,

    /// Log protocol traffic
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PinState {
    On,
    Off,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show programmer name, interface version and capabilities
    Info,

    /// Resynchronize the command stream
    Sync,

    /// Set the SPI clock frequency
    Freq {
        /// Requested frequency in Hz
        #[arg(value_name = "HZ")]
        hz: u32,
    },

    /// Drive (on) or release (off) the bus lines
    Pins {
        #[arg(value_enum)]
        state: PinState,
    },

    /// Read the flash chip's JEDEC ID
    Jedec,

    /// Dump flash contents to a file
    Read {
        /// Output file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Start address
        #[arg(short, long, default_value = "0", value_parser = parse_u32)]
        address: u32,

        /// Number of bytes to read
        #[arg(short, long, value_parser = parse_u32)]
        length: u32,
    },

    /// Compare flash contents against a file
    Verify {
        /// Image file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Start address
        #[arg(short, long, default_value = "0", value_parser = parse_u32)]
        address: u32,
    },
}

/// Decimal or `0x`-prefixed hexadecimal.
fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}

/// Execute the parsed CLI command.
pub fn run(cli: Cli) -> Result<()> {
    let mut transport = Transport::new(&cli.port, cli.baud)?;
    transport.synchronize()?;

    match cli.command {
        Commands::Info => commands::info(&mut transport),
        Commands::Sync => commands::sync(&mut transport),
        Commands::Freq { hz } => commands::set_frequency(&mut transport, hz),
        Commands::Pins { state } => {
            commands::set_pins(&mut transport, matches!(state, PinState::On))
        }
        Commands::Jedec => commands::jedec(&mut transport),
        Commands::Read {
            file,
            address,
            length,
        } => commands::read(&mut transport, address, length, &file),
        Commands::Verify { file, address } => commands::verify(&mut transport, address, &file),
    }
}
