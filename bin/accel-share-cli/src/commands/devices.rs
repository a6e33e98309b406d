// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `accel-share devices` command: enumerate devices and capacities.

use device_registry::DeviceRegistry;
use resource_core::format_quantity;
use std::path::Path;

pub fn execute(config: Option<&Path>) -> anyhow::Result<()> {
    let config = super::load_config(config)?;
    let registry = DeviceRegistry::discover(&config)?;

    println!("Devices");
    for line in registry.summary().lines() {
        println!("  {line}");
    }
    println!();

    println!("Capacity tags");
    let capacity = registry.capacity();
    print!("{}", capacity.debug_string("  "));
    println!();
    println!(
        "Total accountable memory: {}",
        format_quantity(capacity.total_memory()),
    );

    Ok(())
}
