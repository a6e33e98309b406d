// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Scoped exclusive view of the monitor.
//!
//! [`LockedMonitor`] is the RAII mechanism for multi-step atomic
//! updates: a scheduler that must inspect staging before deciding how
//! much to draw takes the lock once, and every operation through the
//! proxy runs inside that one critical section. Dropping the proxy
//! releases the mutex on every exit path; moving it transfers
//! ownership; it cannot be copied or cloned. The borrow checker rules
//! out use-after-release at compile time.

use crate::monitor::MonitorState;
use resource_core::{Resources, Ticket};
use std::sync::MutexGuard;

/// A held monitor lock exposing the in-section operations.
///
/// # Example
/// ```
/// use resource_core::{DeviceSpec, ResourceTag, Resources};
/// use resource_monitor::ResourceMonitor;
///
/// let gpu_mem = ResourceTag::memory(DeviceSpec::gpu(0));
/// let monitor = ResourceMonitor::with_limits(
///     Resources::from_entries([(gpu_mem, 1000)]),
/// );
/// let ticket = monitor
///     .pre_allocate(&Resources::from_entries([(gpu_mem, 400)]))
///     .unwrap();
///
/// // Inspect-then-draw, atomically.
/// let mut locked = monitor.lock();
/// let staged = locked.query_staging(ticket).unwrap();
/// locked.allocate(ticket, &staged);
/// drop(locked); // lock released
/// ```
///
/// Callers must not perform blocking work while the proxy is alive:
/// every other monitor operation waits behind it.
pub struct LockedMonitor<'a> {
    state: MutexGuard<'a, MonitorState>,
}

impl<'a> LockedMonitor<'a> {
    pub(crate) fn new(state: MutexGuard<'a, MonitorState>) -> Self {
        Self { state }
    }

    /// Same contract as [`ResourceMonitor::allocate`](crate::ResourceMonitor::allocate),
    /// without re-locking.
    pub fn allocate(&mut self, ticket: Ticket, res: &Resources) -> bool {
        self.state.allocate(ticket, res)
    }

    /// Same contract as [`ResourceMonitor::free`](crate::ResourceMonitor::free),
    /// without re-locking.
    pub fn free(&mut self, ticket: Ticket, res: &Resources) -> bool {
        self.state.free(ticket, res)
    }

    /// Snapshot of the ticket's staged reservation.
    pub fn query_staging(&self, ticket: Ticket) -> Option<Resources> {
        self.state.query_staging(ticket)
    }
}
