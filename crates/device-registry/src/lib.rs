// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # device-registry
//!
//! Startup-time hardware enumeration for the accel-share runtime.
//!
//! The registry answers one question: what typed capacities exist on
//! this host? Each device contributes a MEMORY tag (bytes), a COMPUTE
//! tag (scheduling slots), and — for accelerators — a GPU_STREAM tag
//! (concurrency). The resulting [`Resources`](resource_core::Resources)
//! map seeds the resource monitor's limits exactly once; the registry is
//! never consulted again after initialization.
//!
//! # Graceful Degradation
//! The host CPU is probed from `/proc/meminfo`; GPUs are declared in
//! configuration (the core does no driver probing). On hosts without
//! `/proc/meminfo`, configure `[cpu] memory` explicitly.
//!
//! # Example
//! ```no_run
//! use device_registry::{DeviceRegistry, RegistryConfig};
//!
//! let config = RegistryConfig::default();
//! let registry = DeviceRegistry::discover(&config).unwrap();
//! println!("{}", registry.summary());
//! ```

mod config;
mod error;
mod probe;
mod registry;

pub use config::{CpuConfig, GpuConfig, RegistryConfig};
pub use error::RegistryError;
pub use probe::{online_cores, HostMemory};
pub use registry::{
    DeviceEnumerator, DeviceInfo, DeviceRegistry, HostEnumerator, StaticEnumerator,
    DEFAULT_GPU_COMPUTE_SLOTS, DEFAULT_GPU_STREAMS,
};
