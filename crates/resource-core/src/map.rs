// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The resource algebra: tag → quantity maps and pure operations on them.
//!
//! [`Resources`] is the value type every accounting decision is made
//! over. Missing tags read as zero, so two maps are equal when their
//! non-zero entries agree, regardless of physical representation. All
//! mutating operations return `&mut Self` so multi-step updates chain:
//!
//! ```
//! use resource_core::{DeviceSpec, ResourceTag, Resources};
//!
//! let gpu_mem = ResourceTag::memory(DeviceSpec::gpu(0));
//! let mut avail = Resources::from_entries([(gpu_mem, 1000)]);
//! let req = Resources::from_entries([(gpu_mem, 300)]);
//!
//! assert!(avail.contains(&req));
//! avail.subtract(&req, false);
//! assert_eq!(avail.get(&gpu_mem), 700);
//! ```
//!
//! Operations are deterministic and side-effect-free; the map is stored
//! hashed and sorted only when rendered, so debug output is stable for
//! test oracles while mutation stays O(1) per tag.

use crate::{ResourceTag, ResourceType};
use std::collections::HashMap;
use std::fmt;

/// A mapping from [`ResourceTag`] to a nonnegative quantity.
///
/// Units are tag-specific: bytes for MEMORY, abstract slots for COMPUTE
/// and GPU_STREAM.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Resources {
    entries: HashMap<ResourceTag, u64>,
}

impl Resources {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from `(tag, quantity)` pairs.
    ///
    /// Later duplicates overwrite earlier ones.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ResourceTag, u64)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Returns the quantity for `tag`, with missing tags reading as zero.
    pub fn get(&self, tag: &ResourceTag) -> u64 {
        self.entries.get(tag).copied().unwrap_or(0)
    }

    /// Sets the quantity for `tag`. Setting zero removes the entry.
    pub fn set(&mut self, tag: ResourceTag, quantity: u64) {
        if quantity == 0 {
            self.entries.remove(&tag);
        } else {
            self.entries.insert(tag, quantity);
        }
    }

    /// Returns `true` if no tag has a non-zero quantity.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|&q| q == 0)
    }

    /// Returns the number of tags with a non-zero quantity.
    pub fn len(&self) -> usize {
        self.entries.values().filter(|&&q| q > 0).count()
    }

    /// Iterates over the non-zero entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceTag, u64)> {
        self.entries
            .iter()
            .filter(|(_, &q)| q > 0)
            .map(|(t, &q)| (t, q))
    }

    /// Returns `true` iff every tag requested in `req` fits in `self`.
    ///
    /// Absent tags in `self` are treated as zero; tags present only in
    /// `self` are irrelevant.
    pub fn contains(&self, req: &Resources) -> bool {
        req.iter().all(|(tag, q)| self.get(tag) >= q)
    }

    /// Returns `true` iff every tag present in `rhs` (non-zero) is also
    /// present in `self` (non-zero).
    ///
    /// Used to verify that a request only names device/type combinations
    /// the monitor knows about, independent of quantities.
    pub fn compatible(&self, rhs: &Resources) -> bool {
        rhs.iter().all(|(tag, _)| self.get(tag) > 0)
    }

    /// Adds every entry of `rhs` into `self`.
    ///
    /// With `skip_non_exist`, tags absent from `self` are ignored rather
    /// than inserted.
    pub fn merge(&mut self, rhs: &Resources, skip_non_exist: bool) -> &mut Self {
        for (tag, q) in rhs.iter() {
            if skip_non_exist && self.get(tag) == 0 {
                continue;
            }
            let cur = self.get(tag);
            self.set(*tag, cur.saturating_add(q));
        }
        self
    }

    /// Subtracts every entry of `rhs` from `self`, clamping at zero.
    ///
    /// Tags whose quantity falls to zero are removed. With
    /// `skip_non_exist`, tags absent from `self` are ignored.
    pub fn subtract(&mut self, rhs: &Resources, skip_non_exist: bool) -> &mut Self {
        for (tag, q) in rhs.iter() {
            let cur = self.get(tag);
            if skip_non_exist && cur == 0 {
                continue;
            }
            self.set(*tag, cur.saturating_sub(q));
        }
        self
    }

    /// Multiplies every quantity by `factor`, rounding to the nearest
    /// nonnegative integer. Tags reaching zero are removed.
    pub fn scale(&mut self, factor: f64) -> &mut Self {
        let scaled: Vec<(ResourceTag, u64)> = self
            .iter()
            .map(|(tag, q)| {
                let v = (q as f64 * factor).round();
                (*tag, if v.is_finite() && v > 0.0 { v as u64 } else { 0 })
            })
            .collect();
        self.entries.clear();
        for (tag, q) in scaled {
            self.set(tag, q);
        }
        self
    }

    /// Drops every tag with a zero quantity or an `Unknown` type.
    ///
    /// Applied at every mutation boundary of the monitor and the
    /// admission gate, so parse fallbacks and degenerate requests never
    /// reach accounting.
    pub fn remove_invalid(&mut self) -> &mut Self {
        self.entries
            .retain(|tag, q| *q > 0 && tag.ty != ResourceType::Unknown);
        self
    }

    /// Sums the quantities of all MEMORY tags across devices.
    ///
    /// This is the scalar used for victim ranking and for ordering
    /// sessions by declared peak.
    pub fn total_memory(&self) -> u64 {
        self.iter()
            .filter(|(tag, _)| tag.ty == ResourceType::Memory)
            .map(|(_, q)| q)
            .sum()
    }

    /// Non-zero entries sorted by tag, for deterministic rendering.
    fn sorted_entries(&self) -> Vec<(ResourceTag, u64)> {
        let mut v: Vec<(ResourceTag, u64)> = self.iter().map(|(t, q)| (*t, q)).collect();
        v.sort_by_key(|(t, _)| *t);
        v
    }

    /// Renders one `  <tag> -> <quantity>` line per non-zero entry,
    /// sorted by tag. Deterministic given equal state.
    pub fn debug_string(&self, indent: &str) -> String {
        let mut out = String::new();
        for (tag, q) in self.sorted_entries() {
            out.push_str(indent);
            out.push_str(&format!("{tag} -> {q}\n"));
        }
        out
    }
}

// Equality ignores explicit zero entries: `{GPU0:MEMORY: 0}` equals `{}`.
impl PartialEq for Resources {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(tag, q)| other.get(tag) == q)
    }
}

impl Eq for Resources {}

impl fmt::Display for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.debug_string(""))
    }
}

impl FromIterator<(ResourceTag, u64)> for Resources {
    fn from_iter<I: IntoIterator<Item = (ResourceTag, u64)>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}
