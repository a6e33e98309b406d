// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # resource-core
//!
//! The shared vocabulary of the accel-share accounting core: typed
//! device capacities and the pure algebra the monitor and the admission
//! gate decide with.
//!
//! # Key Components
//!
//! - [`DeviceSpec`] — one physical device, `(kind, index)`.
//! - [`ResourceTag`] — the atomic unit of accounting,
//!   `(ResourceType, DeviceSpec)`, with the canonical string form
//!   `<type>:<kind>:<index>` used in configuration and debug output.
//! - [`Resources`] — tag → quantity map with the accounting algebra:
//!   containment, merge, subtract, scale, validity.
//! - [`Ticket`] — opaque monotonically-increasing reservation handle;
//!   `0` is [`Ticket::INVALID`].
//! - [`parse_quantity`] / [`format_quantity`] — `"512M"`-style capacity
//!   strings for configuration ergonomics.
//!
//! # Example
//! ```
//! use resource_core::{DeviceSpec, ResourceTag, Resources};
//!
//! let mut limits = Resources::from_entries([
//!     (ResourceTag::memory(DeviceSpec::gpu(0)), 8 << 30),
//!     (ResourceTag::stream(DeviceSpec::gpu(0)), 128),
//! ]);
//! let req = Resources::from_entries([
//!     (ResourceTag::memory(DeviceSpec::gpu(0)), 1 << 30),
//! ]);
//! assert!(limits.contains(&req));
//! limits.subtract(&req, false);
//! ```

mod device;
mod error;
mod map;
mod quantity;
mod tag;
mod ticket;

pub use device::{DeviceKind, DeviceSpec};
pub use error::ResourceError;
pub use map::Resources;
pub use quantity::{format_quantity, parse_quantity};
pub use tag::{ResourceTag, ResourceType};
pub use ticket::Ticket;
