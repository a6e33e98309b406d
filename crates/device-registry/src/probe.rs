// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Host memory and core probing via `/proc/meminfo`.
//!
//! The registry publishes the host CPU as one device; its MEMORY
//! capacity comes from the kernel's `MemTotal` and its COMPUTE slot
//! count from the number of schedulable cores.

use crate::RegistryError;
use std::path::Path;

/// Default path to the kernel memory info file.
const MEMINFO_PATH: &str = "/proc/meminfo";

/// Physical memory of the host, as reported by the kernel.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct HostMemory {
    /// Total physical memory in bytes.
    pub total_bytes: u64,
}

impl HostMemory {
    /// Reads total memory from `/proc/meminfo`.
    pub fn read() -> Result<Self, RegistryError> {
        Self::read_from(Path::new(MEMINFO_PATH))
    }

    /// Reads memory information from a specific file (for testing).
    pub(crate) fn read_from(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|e| RegistryError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    /// Parses the content of a `/proc/meminfo`-formatted string.
    pub(crate) fn parse(content: &str, source_path: &Path) -> Result<Self, RegistryError> {
        for line in content.lines() {
            let mut parts = line.split_whitespace();
            if parts.next() == Some("MemTotal:") {
                let kb: u64 = parts
                    .next()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| RegistryError::ParseError {
                        path: source_path.display().to_string(),
                        detail: "malformed MemTotal line".to_string(),
                    })?;
                return Ok(Self {
                    total_bytes: kb * 1024,
                });
            }
        }
        Err(RegistryError::ParseError {
            path: source_path.display().to_string(),
            detail: "MemTotal not found".to_string(),
        })
    }
}

/// Returns the number of schedulable cores, falling back to 1.
pub fn online_cores() -> u64 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u64)
        .unwrap_or(1)
}
