// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Host-side probe for serprog SPI programmers via USB CDC.
//!
//! Usage:
//!   serprog-probe --port /dev/ttyACM0 info
//!   serprog-probe --port /dev/ttyACM0 jedec
//!   serprog-probe --port /dev/ttyACM0 read dump.bin --length 0x100000

mod cli;
mod commands;
mod frame;
mod transport;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    cli::run(args)
}
