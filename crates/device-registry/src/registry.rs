// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The device registry: enumeration and capacity publication.
//!
//! Enumerates hardware once at startup and publishes one typed capacity
//! map. The registry is queried exactly once by the monitor's
//! `initialize_limits` and not consulted again; there is no re-probing
//! or hotplug handling.

use crate::{online_cores, HostMemory, RegistryConfig, RegistryError};
use resource_core::{format_quantity, parse_quantity, DeviceKind, DeviceSpec, ResourceTag, Resources};

/// Default GPU_STREAM concurrency for an accelerator.
pub const DEFAULT_GPU_STREAMS: u64 = 128;

/// Default COMPUTE slots for an accelerator (one per SM group).
pub const DEFAULT_GPU_COMPUTE_SLOTS: u64 = 4;

/// One enumerated device and its raw capacities.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DeviceInfo {
    /// Device identity.
    pub spec: DeviceSpec,
    /// Total memory in bytes.
    pub total_memory: u64,
    /// COMPUTE scheduling slots.
    pub compute_slots: u64,
    /// GPU_STREAM concurrency; `None` for devices without streams.
    pub streams: Option<u64>,
}

/// A source of devices. The registry composes one or more enumerators,
/// so tests can swap the host probe for a fixed device list.
pub trait DeviceEnumerator {
    /// Yields every device this source knows about.
    fn enumerate(&self) -> Result<Vec<DeviceInfo>, RegistryError>;
}

/// Enumerates the host CPU from `/proc/meminfo` and the core count.
#[derive(Debug, Clone, Default)]
pub struct HostEnumerator {
    /// Memory capacity override in bytes.
    pub memory_override: Option<u64>,
    /// COMPUTE slot override.
    pub compute_override: Option<u64>,
}

impl DeviceEnumerator for HostEnumerator {
    fn enumerate(&self) -> Result<Vec<DeviceInfo>, RegistryError> {
        let total_memory = match self.memory_override {
            Some(bytes) => bytes,
            None => HostMemory::read()?.total_bytes,
        };
        Ok(vec![DeviceInfo {
            spec: DeviceSpec::cpu(0),
            total_memory,
            compute_slots: self.compute_override.unwrap_or_else(online_cores),
            streams: None,
        }])
    }
}

/// Enumerates a fixed device list (declared GPUs, tests).
#[derive(Debug, Clone, Default)]
pub struct StaticEnumerator {
    devices: Vec<DeviceInfo>,
}

impl StaticEnumerator {
    /// Wraps a fixed device list.
    pub fn new(devices: Vec<DeviceInfo>) -> Self {
        Self { devices }
    }
}

impl DeviceEnumerator for StaticEnumerator {
    fn enumerate(&self) -> Result<Vec<DeviceInfo>, RegistryError> {
        Ok(self.devices.clone())
    }
}

/// The startup-time device inventory.
///
/// # Example
/// ```no_run
/// use device_registry::{DeviceRegistry, RegistryConfig};
///
/// let config = RegistryConfig::from_toml(r#"
/// [[gpu]]
/// index = 0
/// memory = "8G"
/// "#).unwrap();
/// let registry = DeviceRegistry::discover(&config).unwrap();
/// println!("{}", registry.capacity());
/// ```
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    devices: Vec<DeviceInfo>,
}

impl DeviceRegistry {
    /// Enumerates the host CPU plus the GPUs declared in `config`.
    pub fn discover(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let host = HostEnumerator {
            memory_override: config
                .cpu
                .memory
                .as_deref()
                .map(|s| {
                    parse_quantity(s)
                        .map_err(|e| RegistryError::ConfigError(format!("bad cpu.memory: {e}")))
                })
                .transpose()?,
            compute_override: config.cpu.compute_slots,
        };

        let mut gpus = Vec::with_capacity(config.gpus.len());
        for gpu in &config.gpus {
            gpus.push(DeviceInfo {
                spec: DeviceSpec::gpu(gpu.index),
                total_memory: parse_quantity(&gpu.memory).map_err(|e| {
                    RegistryError::ConfigError(format!("bad gpu {} memory: {e}", gpu.index))
                })?,
                compute_slots: gpu.compute_slots.unwrap_or(DEFAULT_GPU_COMPUTE_SLOTS),
                streams: Some(gpu.streams.unwrap_or(DEFAULT_GPU_STREAMS)),
            });
        }

        Self::from_enumerators(&[&host, &StaticEnumerator::new(gpus)])
    }

    /// Builds a registry from explicit enumerators.
    pub fn from_enumerators(
        enumerators: &[&dyn DeviceEnumerator],
    ) -> Result<Self, RegistryError> {
        let mut devices = Vec::new();
        for e in enumerators {
            devices.extend(e.enumerate()?);
        }
        devices.sort_by_key(|d| d.spec);
        for d in &devices {
            tracing::info!(
                "discovered {}: {} memory, {} compute slots",
                d.spec,
                format_quantity(d.total_memory),
                d.compute_slots,
            );
        }
        Ok(Self { devices })
    }

    /// Returns the enumerated devices, sorted by spec.
    pub fn devices(&self) -> &[DeviceInfo] {
        &self.devices
    }

    /// Publishes the typed capacity map.
    ///
    /// Per device: a MEMORY tag with total memory, a COMPUTE tag with
    /// slot count, and (for accelerators) a GPU_STREAM tag.
    pub fn capacity(&self) -> Resources {
        let mut cap = Resources::new();
        for d in &self.devices {
            cap.set(ResourceTag::memory(d.spec), d.total_memory);
            cap.set(ResourceTag::compute(d.spec), d.compute_slots);
            if d.spec.kind == DeviceKind::Gpu {
                cap.set(
                    ResourceTag::stream(d.spec),
                    d.streams.unwrap_or(DEFAULT_GPU_STREAMS),
                );
            }
        }
        cap.remove_invalid();
        cap
    }

    /// Returns a one-line-per-device summary suitable for CLI display.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for d in &self.devices {
            let streams = d
                .streams
                .map(|s| format!(", {s} streams"))
                .unwrap_or_default();
            out.push_str(&format!(
                "{}: {} memory, {} compute slots{streams}\n",
                d.spec,
                format_quantity(d.total_memory),
                d.compute_slots,
            ));
        }
        out
    }
}
