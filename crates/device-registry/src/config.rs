// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Registry configuration loaded from TOML files or constructed
//! programmatically.
//!
//! # TOML Format
//! ```toml
//! [cpu]
//! memory = "16G"        # optional; defaults to /proc/meminfo MemTotal
//! compute_slots = 8     # optional; defaults to online core count
//!
//! [[gpu]]
//! index = 0
//! memory = "8G"
//! streams = 128         # optional
//! compute_slots = 4     # optional
//!
//! [cap]
//! "MEMORY:GPU:0" = "4G"
//! "COMPUTE:CPU:0" = "4"
//! ```
//!
//! The `[cap]` table is the optional capacity cap applied on top of the
//! enumerated hardware. Keys are canonical resource tag strings; entries
//! with an unrecognized resource type are dropped rather than rejected.

use crate::RegistryError;
use resource_core::{parse_quantity, ResourceTag, Resources};
use std::collections::BTreeMap;
use std::path::Path;

/// Configuration for device discovery and the optional capacity cap.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct RegistryConfig {
    /// Host CPU overrides.
    #[serde(default)]
    pub cpu: CpuConfig,
    /// Declared accelerators. There is no driver probing in the core;
    /// the host declares its GPUs here.
    #[serde(default, rename = "gpu")]
    pub gpus: Vec<GpuConfig>,
    /// Capacity cap: canonical tag string → quantity string.
    #[serde(default)]
    pub cap: BTreeMap<String, String>,
}

/// Host CPU overrides; every field optional.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CpuConfig {
    /// Memory capacity override (e.g. `"16G"`).
    pub memory: Option<String>,
    /// COMPUTE slot override.
    pub compute_slots: Option<u64>,
}

/// One declared accelerator.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GpuConfig {
    /// Device index.
    pub index: u32,
    /// Memory capacity (e.g. `"8G"`).
    pub memory: String,
    /// GPU_STREAM concurrency; defaults to
    /// [`DEFAULT_GPU_STREAMS`](crate::DEFAULT_GPU_STREAMS).
    pub streams: Option<u64>,
    /// COMPUTE slots; defaults to
    /// [`DEFAULT_GPU_COMPUTE_SLOTS`](crate::DEFAULT_GPU_COMPUTE_SLOTS).
    pub compute_slots: Option<u64>,
}

impl RegistryConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|e| RegistryError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, RegistryError> {
        toml::from_str(toml_str)
            .map_err(|e| RegistryError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, RegistryError> {
        toml::to_string_pretty(self)
            .map_err(|e| RegistryError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Parses the `[cap]` table into a [`Resources`] map.
    ///
    /// Tags with an unrecognized resource type are dropped (parse
    /// fallback), a malformed device or quantity is an error.
    pub fn parse_cap(&self) -> Result<Resources, RegistryError> {
        let mut cap = Resources::new();
        for (tag_s, qty_s) in &self.cap {
            let tag: ResourceTag = tag_s.parse().map_err(|e| {
                RegistryError::ConfigError(format!("bad cap entry '{tag_s}': {e}"))
            })?;
            let qty = parse_quantity(qty_s).map_err(|e| {
                RegistryError::ConfigError(format!("bad cap entry '{tag_s}': {e}"))
            })?;
            cap.set(tag, qty);
        }
        cap.remove_invalid();
        Ok(cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_core::{DeviceSpec, ResourceTag};

    #[test]
    fn test_default_is_empty() {
        let c = RegistryConfig::default();
        assert!(c.gpus.is_empty());
        assert!(c.cap.is_empty());
        assert!(c.cpu.memory.is_none());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
[cpu]
compute_slots = 8

[[gpu]]
index = 0
memory = "8G"

[[gpu]]
index = 1
memory = "4G"
streams = 64

[cap]
"MEMORY:GPU:0" = "4G"
"#;
        let c = RegistryConfig::from_toml(toml).unwrap();
        assert_eq!(c.cpu.compute_slots, Some(8));
        assert_eq!(c.gpus.len(), 2);
        assert_eq!(c.gpus[1].streams, Some(64));
        assert_eq!(c.cap.len(), 1);
    }

    #[test]
    fn test_toml_roundtrip() {
        let toml = r#"
[[gpu]]
index = 0
memory = "2G"
"#;
        let c = RegistryConfig::from_toml(toml).unwrap();
        let back = RegistryConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(back.gpus.len(), 1);
        assert_eq!(back.gpus[0].memory, "2G");
    }

    #[test]
    fn test_parse_cap() {
        let mut c = RegistryConfig::default();
        c.cap
            .insert("MEMORY:GPU:0".to_string(), "1G".to_string());
        c.cap.insert("COMPUTE:CPU:0".to_string(), "4".to_string());
        let cap = c.parse_cap().unwrap();
        assert_eq!(cap.get(&ResourceTag::GPU0_MEMORY), 1 << 30);
        assert_eq!(cap.get(&ResourceTag::compute(DeviceSpec::CPU0)), 4);
    }

    #[test]
    fn test_parse_cap_unknown_type_dropped() {
        let mut c = RegistryConfig::default();
        c.cap
            .insert("BANDWIDTH:GPU:0".to_string(), "1G".to_string());
        let cap = c.parse_cap().unwrap();
        assert!(cap.is_empty());
    }

    #[test]
    fn test_parse_cap_malformed() {
        let mut c = RegistryConfig::default();
        c.cap.insert("MEMORY:GPU:x".to_string(), "1G".to_string());
        assert!(c.parse_cap().is_err());

        let mut c = RegistryConfig::default();
        c.cap.insert("MEMORY:GPU:0".to_string(), "lots".to_string());
        assert!(c.parse_cap().is_err());
    }
}
