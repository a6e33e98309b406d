// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The resource monitor: custodian of limits, staged reservations, and
//! in-use amounts keyed by ticket.
//!
//! # Accounting protocol
//! ```text
//! pre_allocate(req)          reserve against headroom     → Ticket
//!       │
//!       ▼
//! allocate(ticket, actual)   move staging → using
//!       │
//!       ▼
//! free(ticket, actual)       return using → headroom
//! free_staging(ticket)       refund unused reservation
//! ```
//!
//! Headroom is always `limits − Σ staging − Σ using`, clamped at zero.
//! A ticket is live while it has an entry in either map; it is erased
//! once both are drained, and its number is never reused.
//!
//! # Thread Safety
//! One mutex guards all state; every public operation acquires it for
//! its duration. Critical sections are O(tags) arithmetic — O(tickets)
//! only for [`ResourceMonitor::query_usages`] and
//! [`ResourceMonitor::sort_victim`]. For multi-step atomic updates, see
//! [`ResourceMonitor::lock`].

use crate::LockedMonitor;
use device_registry::DeviceRegistry;
use resource_core::{Resources, Ticket};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// All monitor state, guarded by one mutex.
pub(crate) struct MonitorState {
    /// Total capacity per tag. Reduced permanently when an allocation
    /// over-draws its reservation.
    limits: Resources,
    /// `Σ staging + Σ using` across live tickets, maintained
    /// incrementally by every mutation so headroom stays O(tags) per
    /// operation. Kept as the charged total rather than a clamped
    /// headroom map: clamping would lose the deficit after an over-draw
    /// past limits, while the charged total subtracts exactly what each
    /// mutation charged.
    charged: Resources,
    /// Reserved but not yet allocated, per ticket.
    staging: HashMap<Ticket, Resources>,
    /// Actively charged against limits, per ticket.
    using: HashMap<Ticket, Resources>,
    /// Next ticket number; monotonic, never reused. 0 is invalid.
    next_ticket: u64,
}

impl MonitorState {
    fn new() -> Self {
        Self {
            limits: Resources::new(),
            charged: Resources::new(),
            staging: HashMap::new(),
            using: HashMap::new(),
            next_ticket: 1,
        }
    }

    fn issue_ticket(&mut self) -> Ticket {
        let t = Ticket::new(self.next_ticket);
        self.next_ticket += 1;
        t
    }

    fn is_live(&self, ticket: Ticket) -> bool {
        self.staging.contains_key(&ticket) || self.using.contains_key(&ticket)
    }

    /// `limits − Σ staging − Σ using`, element-wise, clamped at zero.
    /// O(tags): the sum is the running `charged` total.
    fn headroom(&self) -> Resources {
        let mut head = self.limits.clone();
        head.subtract(&self.charged, false);
        head
    }

    pub(crate) fn set_limits(&mut self, mut limits: Resources) {
        limits.remove_invalid();
        self.limits = limits;
    }

    pub(crate) fn pre_allocate(&mut self, req: &Resources) -> Result<Ticket, Resources> {
        let mut req = req.clone();
        req.remove_invalid();

        let headroom = self.headroom();
        if headroom.contains(&req) {
            let ticket = self.issue_ticket();
            tracing::debug!("ticket {ticket} staged:\n{req}");
            self.charged.merge(&req, false);
            self.staging.insert(ticket, req);
            Ok(ticket)
        } else {
            let mut missing = Resources::new();
            for (tag, q) in req.iter() {
                let have = headroom.get(tag);
                if q > have {
                    missing.set(*tag, q - have);
                }
            }
            Err(missing)
        }
    }

    pub(crate) fn allocate(&mut self, ticket: Ticket, res: &Resources) -> bool {
        let mut res = res.clone();
        res.remove_invalid();

        if !self.is_live(ticket) {
            tracing::warn!("allocate on unknown ticket {ticket}; ignored");
            return false;
        }

        let staged = self.staging.entry(ticket).or_default();
        if staged.contains(&res) {
            staged.subtract(&res, false);
            self.using.entry(ticket).or_default().merge(&res, false);
            true
        } else {
            // Over-draw: the reservation was too small. Charge the full
            // amount to the ticket and the unreserved excess against
            // limits. The excess is not refunded on free.
            let mut excess = res.clone();
            excess.subtract(staged, false);
            tracing::warn!("ticket {ticket} over-draws staging; excess:\n{excess}");
            staged.subtract(&res, false);
            self.using.entry(ticket).or_default().merge(&res, false);
            // Staging dropped by (res − excess) and using rose by res,
            // so the net new charge is exactly the excess.
            self.charged.merge(&excess, false);
            self.limits.subtract(&excess, false);
            false
        }
    }

    pub(crate) fn free(&mut self, ticket: Ticket, res: &Resources) -> bool {
        let mut res = res.clone();
        res.remove_invalid();

        if !self.is_live(ticket) {
            tracing::debug!("free on already-drained ticket {ticket}");
            return true;
        }

        if let Some(in_use) = self.using.get_mut(&ticket) {
            // The subtraction clamps, so only what the ticket actually
            // held comes off the charged total.
            let mut freed = Resources::new();
            for (tag, q) in res.iter() {
                freed.set(*tag, q.min(in_use.get(tag)));
            }
            in_use.subtract(&res, false);
            self.charged.subtract(&freed, false);
        }
        self.maybe_erase(ticket)
    }

    pub(crate) fn free_staging(&mut self, ticket: Ticket) {
        if let Some(staged) = self.staging.remove(&ticket) {
            self.charged.subtract(&staged, false);
        }
        if self.using.get(&ticket).is_none_or(|u| u.is_empty()) {
            self.using.remove(&ticket);
        }
    }

    /// Erases the ticket if both maps are drained. Returns `true` iff
    /// the ticket no longer holds anything.
    fn maybe_erase(&mut self, ticket: Ticket) -> bool {
        let staging_empty = self.staging.get(&ticket).is_none_or(|s| s.is_empty());
        let using_empty = self.using.get(&ticket).is_none_or(|u| u.is_empty());
        if staging_empty && using_empty {
            self.staging.remove(&ticket);
            self.using.remove(&ticket);
            tracing::debug!("ticket {ticket} drained");
            true
        } else {
            false
        }
    }

    pub(crate) fn query_staging(&self, ticket: Ticket) -> Option<Resources> {
        self.staging.get(&ticket).cloned()
    }

    fn query_usage(&self, ticket: Ticket) -> Option<Resources> {
        self.using.get(&ticket).cloned()
    }

    fn query_usages(&self, tickets: &HashSet<Ticket>) -> Resources {
        let mut total = Resources::new();
        for t in tickets {
            if let Some(u) = self.using.get(t) {
                total.merge(u, false);
            }
        }
        total
    }

    fn sort_victim(&self, candidates: &HashSet<Ticket>) -> Vec<(u64, Ticket)> {
        let mut ranked: Vec<(u64, Ticket)> = candidates
            .iter()
            .filter(|t| self.is_live(**t))
            .map(|t| {
                let mem = self.using.get(t).map(Resources::total_memory).unwrap_or(0);
                (mem, *t)
            })
            .collect();
        // Largest memory first; older (smaller) tickets first on ties.
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        ranked
    }

    fn debug_string(&self) -> String {
        let mut out = String::from("limits:\n");
        out.push_str(&self.limits.debug_string("  "));

        let tickets: BTreeSet<Ticket> = self
            .staging
            .keys()
            .chain(self.using.keys())
            .copied()
            .collect();
        for t in tickets {
            out.push_str(&format!("ticket {t}:\n"));
            if let Some(s) = self.staging.get(&t) {
                out.push_str("  staging:\n");
                out.push_str(&s.debug_string("    "));
            }
            if let Some(u) = self.using.get(&t) {
                out.push_str("  using:\n");
                out.push_str(&u.debug_string("    "));
            }
        }
        out
    }
}

/// Thread-safe custodian of device capacities and per-ticket usage.
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
///
/// let ticket = monitor
///     .pre_allocate(&Resources::from_entries([(gpu_mem, 300)]))
///     .expect("fits");
/// assert!(monitor.allocate(ticket, &Resources::from_entries([(gpu_mem, 300)])));
/// assert!(monitor.free(ticket, &Resources::from_entries([(gpu_mem, 300)])));
/// ```
pub struct ResourceMonitor {
    state: Mutex<MonitorState>,
}

impl ResourceMonitor {
    /// Creates a monitor with no capacity. Call
    /// [`initialize_limits`](Self::initialize_limits) before use.
    pub fn new() -> Self {
        Self::with_limits(Resources::new())
    }

    /// Creates a monitor with explicit limits, bypassing the registry.
    pub fn with_limits(limits: Resources) -> Self {
        let mut state = MonitorState::new();
        state.set_limits(limits);
        Self {
            state: Mutex::new(state),
        }
    }

    /// Acquires the state, recovering from a poisoned lock.
    ///
    /// Accounting operations never panic while holding the mutex, and a
    /// poisoned guard still refers to a consistent map, so recovery is
    /// safe and keeps the no-panic contract of every public operation.
    pub(crate) fn state(&self) -> MutexGuard<'_, MonitorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Populates limits from the device registry.
    pub fn initialize_limits(&self, registry: &DeviceRegistry) {
        let capacity = registry.capacity();
        tracing::info!("limits initialized:\n{capacity}");
        self.state().set_limits(capacity);
    }

    /// Populates limits from the registry, element-wise capped by `cap`.
    ///
    /// Tags missing from `cap` are unconstrained; tags in `cap` that the
    /// hardware does not expose are dropped.
    pub fn initialize_limits_capped(&self, registry: &DeviceRegistry, cap: &Resources) {
        let hardware = registry.capacity();
        let mut limits = Resources::new();
        for (tag, q) in hardware.iter() {
            let ceiling = cap.get(tag);
            limits.set(*tag, if ceiling > 0 { q.min(ceiling) } else { q });
        }
        tracing::info!("limits initialized (capped):\n{limits}");
        self.state().set_limits(limits);
    }

    /// Attempts to reserve `req` against current headroom.
    ///
    /// On success, returns a fresh ticket with `req` moved into staging.
    /// On failure, returns the per-tag shortfall that would have made
    /// the reservation succeed. `req` is cleaned with `remove_invalid`
    /// first; an empty request still issues a ticket (a legal no-op
    /// reservation, so every task owns a ticket).
    pub fn pre_allocate(&self, req: &Resources) -> Result<Ticket, Resources> {
        self.state().pre_allocate(req)
    }

    /// Moves `res` from the ticket's staging into its in-use amounts.
    ///
    /// Returns `true` when the reservation covered `res`. On over-draw
    /// the allocation still takes effect: staging is drained (clamped),
    /// the full `res` is charged to the ticket, the unreserved excess is
    /// subtracted from limits — permanently, it is not refunded by
    /// [`free`](Self::free) — and `false` is returned so the scheduler
    /// can react to the underestimate.
    pub fn allocate(&self, ticket: Ticket, res: &Resources) -> bool {
        self.state().allocate(ticket, res)
    }

    /// Returns `res` from the ticket's in-use amounts to headroom.
    ///
    /// Returns `true` iff the ticket holds nothing more in either map
    /// (it is then erased). Freeing an unknown or already-drained ticket
    /// is a no-op returning `true`.
    pub fn free(&self, ticket: Ticket, res: &Resources) -> bool {
        self.state().free(ticket, res)
    }

    /// Releases the ticket's remaining staged reservation.
    pub fn free_staging(&self, ticket: Ticket) {
        self.state().free_staging(ticket)
    }

    /// Snapshot of the ticket's in-use amounts.
    pub fn query_usage(&self, ticket: Ticket) -> Option<Resources> {
        self.state().query_usage(ticket)
    }

    /// Returns `true` iff the ticket currently holds in-use resources.
    pub fn has_usage(&self, ticket: Ticket) -> bool {
        self.state()
            .query_usage(ticket)
            .is_some_and(|u| !u.is_empty())
    }

    /// Element-wise sum of in-use amounts across `tickets`.
    pub fn query_usages(&self, tickets: &HashSet<Ticket>) -> Resources {
        self.state().query_usages(tickets)
    }

    /// Ranks live candidates as eviction victims: descending by total
    /// in-use memory, ties broken by ascending ticket (older
    /// reservations first). Ranking only — eviction policy is external.
    pub fn sort_victim(&self, candidates: &HashSet<Ticket>) -> Vec<(u64, Ticket)> {
        self.state().sort_victim(candidates)
    }

    /// Takes the monitor's mutex for a multi-step atomic update.
    ///
    /// The returned proxy exposes `allocate`, `free`, and
    /// `query_staging` without re-locking and releases the mutex when
    /// dropped. Do not perform blocking work while holding it.
    pub fn lock(&self) -> LockedMonitor<'_> {
        LockedMonitor::new(self.state())
    }

    /// Deterministic rendering of limits and per-ticket state.
    pub fn debug_string(&self) -> String {
        self.state().debug_string()
    }
}

impl Default for ResourceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResourceMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("ResourceMonitor")
            .field("limits", &state.limits)
            .field("live_tickets", &state.staging.len().max(state.using.len()))
            .field("next_ticket", &state.next_ticket)
            .finish()
    }
}
