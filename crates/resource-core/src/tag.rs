// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Resource tags: the atomic unit of accounting.
//!
//! A [`ResourceTag`] pairs a [`ResourceType`] with a
//! [`DeviceSpec`](crate::DeviceSpec). All quantities tracked by the
//! monitor and the admission gate are per-tag. The canonical textual
//! form is `<type>:<kind>:<index>`, e.g. `MEMORY:GPU:0`, and is the
//! spelling used in configuration files and debug output.

use crate::{DeviceSpec, ResourceError};
use std::fmt;
use std::str::FromStr;

/// The class of capacity a tag accounts for.
///
/// `Unknown` exists only as a parse fallback; tags carrying it are
/// stripped by [`Resources::remove_invalid`](crate::Resources::remove_invalid)
/// before they can reach any accounting path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum ResourceType {
    /// Scheduling slots (one per core / SM group).
    Compute,
    /// Memory, in bytes.
    Memory,
    /// Concurrent GPU stream slots.
    GpuStream,
    /// Unrecognized spelling; never participates in accounting.
    Unknown,
}

impl ResourceType {
    /// Parses a type spelling, falling back to `Unknown`.
    ///
    /// Unlike device kinds, an unrecognized type is not an error: the
    /// resulting tag survives parsing and is dropped later by
    /// `remove_invalid`, so a stale config entry cannot fail loudly.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("compute") {
            ResourceType::Compute
        } else if s.eq_ignore_ascii_case("memory") {
            ResourceType::Memory
        } else if s.eq_ignore_ascii_case("gpu_stream") {
            ResourceType::GpuStream
        } else {
            ResourceType::Unknown
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceType::Compute => "COMPUTE",
            ResourceType::Memory => "MEMORY",
            ResourceType::GpuStream => "GPU_STREAM",
            ResourceType::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

/// The unit of accounting: `(type, device)`.
///
/// # Example
/// ```
/// use resource_core::{DeviceSpec, ResourceTag, ResourceType};
///
/// let tag = ResourceTag::memory(DeviceSpec::gpu(0));
/// assert_eq!(tag.to_string(), "MEMORY:GPU:0");
/// assert_eq!("MEMORY:GPU:0".parse::<ResourceTag>().unwrap(), tag);
/// assert_eq!(tag, ResourceTag::GPU0_MEMORY);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceTag {
    /// Capacity class.
    pub ty: ResourceType,
    /// Device the capacity lives on.
    pub device: DeviceSpec,
}

impl ResourceTag {
    /// Memory on the first CPU.
    pub const CPU0_MEMORY: ResourceTag = ResourceTag::memory(DeviceSpec::CPU0);
    /// Memory on the first GPU.
    pub const GPU0_MEMORY: ResourceTag = ResourceTag::memory(DeviceSpec::GPU0);
    /// Memory on the second GPU.
    pub const GPU1_MEMORY: ResourceTag = ResourceTag::memory(DeviceSpec::GPU1);

    /// Creates a MEMORY tag for `device`.
    pub const fn memory(device: DeviceSpec) -> Self {
        Self {
            ty: ResourceType::Memory,
            device,
        }
    }

    /// Creates a COMPUTE tag for `device`.
    pub const fn compute(device: DeviceSpec) -> Self {
        Self {
            ty: ResourceType::Compute,
            device,
        }
    }

    /// Creates a GPU_STREAM tag for `device`.
    pub const fn stream(device: DeviceSpec) -> Self {
        Self {
            ty: ResourceType::GpuStream,
            device,
        }
    }
}

impl fmt::Display for ResourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ty, self.device)
    }
}

impl FromStr for ResourceTag {
    type Err = ResourceError;

    /// Parses `<type>:<kind>:<index>`.
    ///
    /// An unrecognized type yields a tag with [`ResourceType::Unknown`];
    /// a malformed kind or index is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ty_s, device_s) = s.split_once(':').ok_or_else(|| ResourceError::InvalidTag {
            input: s.to_string(),
            detail: "expected '<type>:<kind>:<index>'".to_string(),
        })?;
        let ty = ResourceType::parse(ty_s);
        let device: DeviceSpec = device_s.parse()?;
        Ok(Self { ty, device })
    }
}

// Tags serialize as their canonical string so a `Resources` map keyed by
// tags round-trips through JSON and TOML key positions.
impl serde::Serialize for ResourceTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ResourceTag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_parse() {
        assert_eq!(ResourceType::parse("COMPUTE"), ResourceType::Compute);
        assert_eq!(ResourceType::parse("memory"), ResourceType::Memory);
        assert_eq!(ResourceType::parse("Gpu_Stream"), ResourceType::GpuStream);
        assert_eq!(ResourceType::parse("FANCY"), ResourceType::Unknown);
        assert_eq!(ResourceType::parse(""), ResourceType::Unknown);
    }

    #[test]
    fn test_type_display_roundtrip() {
        for ty in [
            ResourceType::Compute,
            ResourceType::Memory,
            ResourceType::GpuStream,
            ResourceType::Unknown,
        ] {
            assert_eq!(ResourceType::parse(&ty.to_string()), ty);
        }
    }

    #[test]
    fn test_tag_display() {
        let tag = ResourceTag::stream(DeviceSpec::gpu(2));
        assert_eq!(tag.to_string(), "GPU_STREAM:GPU:2");
    }

    #[test]
    fn test_tag_parse() {
        let tag: ResourceTag = "MEMORY:GPU:0".parse().unwrap();
        assert_eq!(tag, ResourceTag::GPU0_MEMORY);

        let tag: ResourceTag = "compute:cpu:0".parse().unwrap();
        assert_eq!(tag, ResourceTag::compute(DeviceSpec::CPU0));
    }

    #[test]
    fn test_tag_parse_unknown_type() {
        // Unknown type is not an error; the tag carries Unknown.
        let tag: ResourceTag = "BANDWIDTH:GPU:0".parse().unwrap();
        assert_eq!(tag.ty, ResourceType::Unknown);
        assert_eq!(tag.device, DeviceSpec::GPU0);
    }

    #[test]
    fn test_tag_parse_invalid() {
        assert!("MEMORY".parse::<ResourceTag>().is_err());
        assert!("MEMORY:TPU:0".parse::<ResourceTag>().is_err());
        assert!("MEMORY:GPU:x".parse::<ResourceTag>().is_err());
    }

    #[test]
    fn test_tag_ordering_deterministic() {
        let mut tags = vec![
            ResourceTag::GPU0_MEMORY,
            ResourceTag::compute(DeviceSpec::CPU0),
            ResourceTag::stream(DeviceSpec::GPU0),
            ResourceTag::CPU0_MEMORY,
        ];
        tags.sort();
        assert_eq!(
            tags,
            vec![
                ResourceTag::compute(DeviceSpec::CPU0),
                ResourceTag::CPU0_MEMORY,
                ResourceTag::GPU0_MEMORY,
                ResourceTag::stream(DeviceSpec::GPU0),
            ]
        );
    }

    #[test]
    fn test_tag_serde_as_string() {
        let tag = ResourceTag::GPU0_MEMORY;
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, "\"MEMORY:GPU:0\"");
        let back: ResourceTag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
    }
}
