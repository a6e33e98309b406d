// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # resource-monitor
//!
//! Two-phase resource accounting for the accel-share runtime.
//!
//! Worker threads declare estimated usage per device; the scheduler
//! reserves it speculatively and charges actuals as tasks run:
//!
//! 1. [`ResourceMonitor::pre_allocate`] — verify the request against
//!    headroom and stage it under a fresh [`Ticket`](resource_core::Ticket),
//!    or report the exact per-tag shortfall.
//! 2. [`ResourceMonitor::allocate`] — move actuals from staging into
//!    in-use; over-draws succeed but are flagged and charged.
//! 3. [`ResourceMonitor::free`] / [`ResourceMonitor::free_staging`] —
//!    drain the ticket; it is erased once both sides are empty.
//!
//! The monitor also ranks tickets as eviction victims
//! ([`ResourceMonitor::sort_victim`]) when the pool is over-subscribed —
//! ranking only, policy lives with the scheduler.
//!
//! # Key Components
//!
//! - [`ResourceMonitor`] — the thread-safe accounting custodian.
//! - [`LockedMonitor`] — an RAII proxy holding the monitor's mutex so a
//!   scheduler can inspect staging and draw from it in one critical
//!   section.
//!
//! No operation returns an error for ordinary exhaustion: shortfalls,
//! over-draws, and drained tickets are all encoded in return values so
//! callers can wait, retry, or evict.

mod locked;
mod monitor;

pub use locked::LockedMonitor;
pub use monitor::ResourceMonitor;
