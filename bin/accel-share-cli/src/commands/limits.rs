// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `accel-share limits` command: show monitor limits after the cap.

use device_registry::DeviceRegistry;
use resource_monitor::ResourceMonitor;
use std::path::Path;

pub fn execute(config: Option<&Path>) -> anyhow::Result<()> {
    let config = super::load_config(config)?;
    let registry = DeviceRegistry::discover(&config)?;
    let cap = config.parse_cap()?;

    let monitor = ResourceMonitor::new();
    if cap.is_empty() {
        monitor.initialize_limits(&registry);
    } else {
        println!("Applying capacity cap:");
        print!("{}", cap.debug_string("  "));
        println!();
        monitor.initialize_limits_capped(&registry, &cap);
    }

    print!("{}", monitor.debug_string());
    Ok(())
}
