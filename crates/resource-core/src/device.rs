// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Device identifiers.
//!
//! A [`DeviceSpec`] names one physical execution device as a
//! `(kind, index)` pair, e.g. `GPU:0` or `CPU:0`. It is one half of a
//! [`ResourceTag`](crate::ResourceTag) and carries no capacity of its own.

use crate::ResourceError;
use std::fmt;
use std::str::FromStr;

/// Physical device class.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum DeviceKind {
    /// Host CPU.
    Cpu,
    /// Accelerator.
    Gpu,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Cpu => write!(f, "CPU"),
            DeviceKind::Gpu => write!(f, "GPU"),
        }
    }
}

impl FromStr for DeviceKind {
    type Err = ResourceError;

    /// Case-insensitive: `"cpu"`, `"CPU"`, `"Gpu"`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("cpu") {
            Ok(DeviceKind::Cpu)
        } else if s.eq_ignore_ascii_case("gpu") {
            Ok(DeviceKind::Gpu)
        } else {
            Err(ResourceError::InvalidTag {
                input: s.to_string(),
                detail: "expected device kind 'CPU' or 'GPU'".to_string(),
            })
        }
    }
}

/// One physical device: `(kind, index)`.
///
/// Equality is structural and the type is hashable, so a `DeviceSpec`
/// can key accounting maps. The canonical textual form is
/// `<KIND>:<index>`, e.g. `GPU:1`.
///
/// # Example
/// ```
/// use resource_core::DeviceSpec;
///
/// let dev = DeviceSpec::gpu(0);
/// assert_eq!(dev.to_string(), "GPU:0");
/// assert_eq!(dev, DeviceSpec::GPU0);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct DeviceSpec {
    /// Device class.
    pub kind: DeviceKind,
    /// Zero-based index within the class.
    pub index: u32,
}

impl DeviceSpec {
    /// The first CPU device.
    pub const CPU0: DeviceSpec = DeviceSpec::cpu(0);
    /// The first GPU device.
    pub const GPU0: DeviceSpec = DeviceSpec::gpu(0);
    /// The second GPU device.
    pub const GPU1: DeviceSpec = DeviceSpec::gpu(1);

    /// Creates a CPU device spec.
    pub const fn cpu(index: u32) -> Self {
        Self {
            kind: DeviceKind::Cpu,
            index,
        }
    }

    /// Creates a GPU device spec.
    pub const fn gpu(index: u32) -> Self {
        Self {
            kind: DeviceKind::Gpu,
            index,
        }
    }
}

impl fmt::Display for DeviceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.index)
    }
}

impl FromStr for DeviceSpec {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind_s, index_s) = s.split_once(':').ok_or_else(|| ResourceError::InvalidTag {
            input: s.to_string(),
            detail: "expected '<KIND>:<index>'".to_string(),
        })?;
        let kind: DeviceKind = kind_s.trim().parse()?;
        let index: u32 = index_s
            .trim()
            .parse()
            .map_err(|_| ResourceError::InvalidTag {
                input: s.to_string(),
                detail: format!("expected nonnegative device index, got '{index_s}'"),
            })?;
        Ok(Self { kind, index })
    }
}
