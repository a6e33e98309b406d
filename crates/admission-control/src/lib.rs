// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # admission-control
//!
//! The session-level admission gate for the accel-share runtime.
//!
//! Task-level accounting (the resource monitor) is fine-grained and
//! per-iteration; admission is coarser: when a client asks to create a
//! session, the [`SessionTracker`] decides whether the session's
//! declared peak — persistent holdings plus transient working set —
//! fits what remains of global capacity. Admitted sessions satisfy,
//! element-wise:
//!
//! ```text
//! Σ persistent(s)  +  max temporary(s)  ≤  limits
//! ```
//!
//! with the temporary term a max rather than a sum, since the scheduler
//! runs at most one session at its peak at a time.
//!
//! # Key Components
//!
//! - [`SessionResources`] — a session's `(temporary, persistent)`
//!   declaration and its handle.
//! - [`SessionTracker`] — the gate: `admit`, `accept_admission`,
//!   `usage`, `free`, and a disable switch for unconstrained runs.
//! - [`AdmissionError`] — handle-binding failures; denial itself is a
//!   return value, not an error.

mod error;
mod session;
mod tracker;

pub use error::AdmissionError;
pub use session::SessionResources;
pub use tracker::SessionTracker;
