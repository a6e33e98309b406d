// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for session admission.

use resource_core::Ticket;

/// Errors that can occur while naming admitted sessions.
///
/// Admission denial itself is not an error; [`admit`](crate::SessionTracker::admit)
/// encodes it in its return value.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    /// The ticket names no admitted session.
    #[error("no admitted session for ticket {0}")]
    UnknownTicket(Ticket),

    /// The ticket is already bound to a different session handle.
    #[error("ticket {ticket} already bound to handle '{existing}', refusing '{requested}'")]
    HandleMismatch {
        ticket: Ticket,
        existing: String,
        requested: String,
    },
}
