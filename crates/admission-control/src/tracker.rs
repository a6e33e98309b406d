// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The session admission gate.
//!
//! Before a session is created, its declared peak is checked against
//! global limits: the persistent contributions of every admitted
//! session must fit alongside the single largest temporary peak. The
//! temporary term is modeled as a max rather than a sum because the
//! scheduler runs at most one session at its peak at a time; admission
//! is conservative within that model.
//!
//! The tracker is an explicit instance owned by the host — there is no
//! process-wide singleton. Its `limits` are fixed at construction; all
//! mutable state lives behind one mutex.

use crate::{AdmissionError, SessionResources};
use resource_core::{Resources, Ticket};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// All tracker state, guarded by one mutex.
struct TrackerState {
    /// When set, every admission succeeds and accounting is skipped.
    disabled: bool,
    /// Next ticket number; monotonic, never reused. 0 is invalid.
    next_ticket: u64,
    /// Admitted sessions by ticket.
    sessions: HashMap<Ticket, SessionResources>,
    /// Admitted tickets keyed by declared temporary memory; the
    /// current peak is the largest element. Stable ids into
    /// `sessions`, ordered so admission reads the head in
    /// O(log sessions) instead of scanning.
    peak: BTreeSet<(u64, Ticket)>,
    /// Σ persistent across admitted sessions, maintained incrementally
    /// by `insert` and `free` so `admit` stays O(tags).
    persistent_sum: Resources,
}

impl TrackerState {
    fn issue_ticket(&mut self) -> Ticket {
        let t = Ticket::new(self.next_ticket);
        self.next_ticket += 1;
        t
    }

    /// Inserts into `sessions`, the peak ordering, and the running
    /// persistent sum.
    fn insert(&mut self, ticket: Ticket, session: SessionResources) {
        self.persistent_sum.merge(&session.persistent, false);
        self.peak.insert((session.temporary.total_memory(), ticket));
        self.sessions.insert(ticket, session);
    }

    /// The admitted session with the largest temporary memory.
    fn peak_head(&self) -> Option<&SessionResources> {
        self.peak.last().and_then(|(_, t)| self.sessions.get(t))
    }

    /// The admission inequality: persistent of everyone (incumbents and
    /// the candidate) plus the element-wise max of the candidate's
    /// temporary and the current peak head's temporary.
    fn required_with(&self, cap: &SessionResources) -> Resources {
        let mut required = cap.temporary.clone();
        if let Some(head) = self.peak_head() {
            for (tag, q) in head.temporary.iter() {
                if q > required.get(tag) {
                    required.set(*tag, q);
                }
            }
        }
        required.merge(&cap.persistent, false);
        required.merge(&self.persistent_sum, false);
        required
    }
}

/// Gate deciding whether a session's declared peak fits global headroom.
///
/// # Example
/// ```
/// use admission_control::{SessionResources, SessionTracker};
/// use resource_core::{ResourceTag, Resources};
///
/// let tracker = SessionTracker::new(
///     Resources::from_entries([(ResourceTag::GPU0_MEMORY, 1000)]),
/// );
/// let cap = SessionResources::new(
///     Resources::from_entries([(ResourceTag::GPU0_MEMORY, 300)]),
///     Resources::from_entries([(ResourceTag::GPU0_MEMORY, 400)]),
/// );
///
/// let ticket = tracker.admit(&cap).expect("fits");
/// tracker.accept_admission(ticket, "sess-1").unwrap();
/// tracker.free(ticket);
/// ```
pub struct SessionTracker {
    limits: Resources,
    state: Mutex<TrackerState>,
}

impl SessionTracker {
    /// Creates a tracker with explicit limits.
    pub fn new(mut limits: Resources) -> Self {
        limits.remove_invalid();
        Self {
            limits,
            state: Mutex::new(TrackerState {
                disabled: false,
                next_ticket: 1,
                sessions: HashMap::new(),
                peak: BTreeSet::new(),
                persistent_sum: Resources::new(),
            }),
        }
    }

    /// Creates a tracker from hardware capacity, element-wise capped.
    ///
    /// Tags missing from `cap` are unconstrained; cap entries for tags
    /// the hardware does not expose are dropped.
    pub fn with_cap(hardware: Resources, cap: &Resources) -> Self {
        let mut limits = Resources::new();
        for (tag, q) in hardware.iter() {
            let ceiling = cap.get(tag);
            limits.set(*tag, if ceiling > 0 { q.min(ceiling) } else { q });
        }
        Self::new(limits)
    }

    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Disables (or re-enables) admission control. While disabled,
    /// every `admit` succeeds and accounting is skipped — used for
    /// unconstrained test runs.
    pub fn set_disabled(&self, disabled: bool) {
        tracing::info!("admission control disabled: {disabled}");
        self.state().disabled = disabled;
    }

    /// Returns whether admission control is disabled.
    pub fn disabled(&self) -> bool {
        self.state().disabled
    }

    /// Decides whether `cap` fits. On admission, returns the session's
    /// ticket; on denial, `None`.
    pub fn admit(&self, cap: &SessionResources) -> Option<Ticket> {
        let mut cleaned = cap.clone();
        cleaned.temporary.remove_invalid();
        cleaned.persistent.remove_invalid();

        let mut st = self.state();
        if st.disabled {
            let ticket = st.issue_ticket();
            st.insert(ticket, cleaned);
            return Some(ticket);
        }

        let required = st.required_with(&cleaned);
        if self.limits.contains(&required) {
            let ticket = st.issue_ticket();
            tracing::debug!("session admitted under ticket {ticket}");
            st.insert(ticket, cleaned);
            Some(ticket)
        } else {
            tracing::info!("session denied; would require:\n{required}");
            None
        }
    }

    /// Binds the admitted session to its handle. Idempotent for the
    /// same handle; binding a different handle is an error.
    pub fn accept_admission(&self, ticket: Ticket, handle: &str) -> Result<(), AdmissionError> {
        let mut st = self.state();
        let session = st
            .sessions
            .get_mut(&ticket)
            .ok_or(AdmissionError::UnknownTicket(ticket))?;
        if session.persistent_handle.is_empty() {
            session.persistent_handle = handle.to_string();
            Ok(())
        } else if session.persistent_handle == handle {
            Ok(())
        } else {
            Err(AdmissionError::HandleMismatch {
                ticket,
                existing: session.persistent_handle.clone(),
                requested: handle.to_string(),
            })
        }
    }

    /// Snapshot of the session's declaration.
    pub fn usage(&self, ticket: Ticket) -> Option<SessionResources> {
        self.state().sessions.get(&ticket).cloned()
    }

    /// Releases the session. No-op for an unknown ticket.
    pub fn free(&self, ticket: Ticket) {
        let mut st = self.state();
        if let Some(session) = st.sessions.remove(&ticket) {
            st.persistent_sum.subtract(&session.persistent, false);
            st.peak.remove(&(session.temporary.total_memory(), ticket));
            tracing::debug!("session {ticket} freed");
        }
    }

    /// Deterministic rendering: limits, disabled flag, then sessions
    /// sorted by ticket.
    pub fn debug_string(&self) -> String {
        let st = self.state();
        let mut out = String::from("limits:\n");
        out.push_str(&self.limits.debug_string("  "));
        out.push_str(&format!("disabled: {}\n", st.disabled));

        let mut tickets: Vec<Ticket> = st.sessions.keys().copied().collect();
        tickets.sort();
        for t in tickets {
            out.push_str(&format!("session {t}:\n"));
            out.push_str(&st.sessions[&t].debug_string("  "));
        }
        out
    }
}

impl std::fmt::Debug for SessionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.state();
        f.debug_struct("SessionTracker")
            .field("limits", &self.limits)
            .field("disabled", &st.disabled)
            .field("sessions", &st.sessions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_core::ResourceTag;

    const GPU0_MEM: ResourceTag = ResourceTag::GPU0_MEMORY;

    fn mem(q: u64) -> Resources {
        Resources::from_entries([(GPU0_MEM, q)])
    }

    fn declaration(temporary: u64, persistent: u64) -> SessionResources {
        SessionResources::new(mem(temporary), mem(persistent))
    }

    #[test]
    fn test_admit_within_limits() {
        let tracker = SessionTracker::new(mem(1000));
        let t = tracker.admit(&declaration(300, 400)).unwrap();
        assert_eq!(t, Ticket::new(1));
        assert_eq!(tracker.usage(t).unwrap().temporary, mem(300));
    }

    #[test]
    fn test_denial_uses_peak_model() {
        // Persistent 400 admitted with temporary 300. A second session
        // with persistent 400 and temporary 500 would require
        // 400 + 400 + max(300, 500) = 1300 > 1000.
        let tracker = SessionTracker::new(mem(1000));
        let t1 = tracker.admit(&declaration(300, 400)).unwrap();
        assert!(tracker.admit(&declaration(500, 400)).is_none());

        // A lighter session fits: 400 + 100 + max(300, 150) = 800.
        assert!(tracker.admit(&declaration(150, 100)).is_some());
        tracker.free(t1);
    }

    #[test]
    fn test_temporary_counts_as_max_not_sum() {
        let tracker = SessionTracker::new(mem(1000));
        // Three sessions, each temporary 600, no persistent: summed
        // they would be 1800, but the model charges only the max.
        for _ in 0..3 {
            assert!(tracker.admit(&declaration(600, 0)).is_some());
        }
        // Persistent still accumulates: 600 + 500 > 1000.
        assert!(tracker.admit(&declaration(0, 500)).is_none());
    }

    #[test]
    fn test_free_restores_headroom() {
        let tracker = SessionTracker::new(mem(1000));
        let t1 = tracker.admit(&declaration(0, 900)).unwrap();
        assert!(tracker.admit(&declaration(0, 200)).is_none());
        tracker.free(t1);
        assert!(tracker.admit(&declaration(0, 200)).is_some());
    }

    #[test]
    fn test_free_updates_peak_head() {
        let tracker = SessionTracker::new(mem(1000));
        let big = tracker.admit(&declaration(800, 0)).unwrap();
        // 800 is the peak: adding persistent 300 would need 1100.
        assert!(tracker.admit(&declaration(0, 300)).is_none());

        tracker.free(big);
        // Peak head gone; 300 persistent + 0 temporary fits.
        assert!(tracker.admit(&declaration(0, 300)).is_some());
    }

    #[test]
    fn test_equal_peaks_stay_distinct() {
        let tracker = SessionTracker::new(mem(1000));
        let t1 = tracker.admit(&declaration(400, 0)).unwrap();
        let t2 = tracker.admit(&declaration(400, 0)).unwrap();

        // Freeing one of two equal peaks must leave the other in place.
        tracker.free(t2);
        assert!(tracker.admit(&declaration(0, 700)).is_none());

        tracker.free(t1);
        assert!(tracker.admit(&declaration(0, 700)).is_some());
    }

    #[test]
    fn test_free_unknown_is_noop() {
        let tracker = SessionTracker::new(mem(1000));
        tracker.free(Ticket::new(42));
        assert!(tracker.admit(&declaration(100, 100)).is_some());
    }

    #[test]
    fn test_disabled_admits_anything() {
        let tracker = SessionTracker::new(mem(1000));
        tracker.set_disabled(true);
        assert!(tracker.disabled());

        let t = tracker.admit(&declaration(10_000, 10_000)).unwrap();
        assert!(t.is_valid());
        assert!(tracker.usage(t).is_some());
    }

    #[test]
    fn test_accept_admission_idempotent() {
        let tracker = SessionTracker::new(mem(1000));
        let t = tracker.admit(&declaration(100, 100)).unwrap();

        tracker.accept_admission(t, "sess-a").unwrap();
        tracker.accept_admission(t, "sess-a").unwrap();
        assert_eq!(tracker.usage(t).unwrap().persistent_handle, "sess-a");

        assert!(matches!(
            tracker.accept_admission(t, "sess-b"),
            Err(AdmissionError::HandleMismatch { .. })
        ));
        assert!(matches!(
            tracker.accept_admission(Ticket::new(99), "sess-x"),
            Err(AdmissionError::UnknownTicket(_))
        ));
    }

    #[test]
    fn test_with_cap_element_wise_min() {
        let hardware = Resources::from_entries([
            (GPU0_MEM, 8000),
            (ResourceTag::GPU1_MEMORY, 4000),
        ]);
        let cap = Resources::from_entries([
            (GPU0_MEM, 1000),
            // Unknown to hardware: dropped.
            (ResourceTag::CPU0_MEMORY, 500),
        ]);
        let tracker = SessionTracker::with_cap(hardware, &cap);

        assert!(tracker.admit(&declaration(0, 1001)).is_none());
        assert!(tracker.admit(&declaration(0, 1000)).is_some());

        // CPU memory cap did not create capacity out of thin air.
        let cpu_heavy = SessionResources::new(
            Resources::new(),
            Resources::from_entries([(ResourceTag::CPU0_MEMORY, 1)]),
        );
        assert!(tracker.admit(&cpu_heavy).is_none());
    }

    #[test]
    fn test_tickets_monotonic_across_frees() {
        let tracker = SessionTracker::new(mem(1000));
        let t1 = tracker.admit(&declaration(10, 10)).unwrap();
        tracker.free(t1);
        let t2 = tracker.admit(&declaration(10, 10)).unwrap();
        assert!(t2 > t1);
    }

    #[test]
    fn test_debug_string_deterministic() {
        let tracker = SessionTracker::new(mem(1000));
        let t = tracker.admit(&declaration(100, 200)).unwrap();
        tracker.accept_admission(t, "sess-1").unwrap();

        let a = tracker.debug_string();
        assert_eq!(a, tracker.debug_string());
        assert!(a.starts_with("limits:\n  MEMORY:GPU:0 -> 1000\ndisabled: false\n"));
        assert!(a.contains("session 1:\n"));
        assert!(a.contains("handle: sess-1"));
    }
}
