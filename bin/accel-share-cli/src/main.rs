// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # accel-share
//!
//! Command-line inspection for the accel-share accounting core.
//!
//! ## Usage
//! ```bash
//! # Enumerate devices and their capacity tags
//! accel-share devices --config ./registry.toml
//!
//! # Show the monitor's limits after applying the configured cap
//! accel-share limits --config ./registry.toml
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "accel-share",
    about = "GPU-sharing runtime resource inspection",
    version,
    author
)]
struct Cli {
    /// Path to a registry TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate devices and print their typed capacities.
    Devices,

    /// Build the registry, apply the configured cap, and print the
    /// resulting monitor limits.
    Limits,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Devices => commands::devices::execute(cli.config.as_deref()),
        Commands::Limits => commands::limits::execute(cli.config.as_deref()),
    }
}
