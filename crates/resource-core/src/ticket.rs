// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reservation tickets.

use std::fmt;

/// An opaque 64-bit handle identifying one reservation.
///
/// Tickets are issued monotonically from `1` by whichever tracker owns
/// them and are never reused, even after the reservation is freed. `0`
/// is reserved as [`Ticket::INVALID`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Ticket(u64);

impl Ticket {
    /// The reserved "no reservation" value.
    pub const INVALID: Ticket = Ticket(0);

    /// Wraps a raw ticket number.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw ticket number.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns `true` unless this is [`Ticket::INVALID`].
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid() {
        assert!(!Ticket::INVALID.is_valid());
        assert!(Ticket::new(1).is_valid());
        assert_eq!(Ticket::INVALID.as_u64(), 0);
    }

    #[test]
    fn test_ordering() {
        assert!(Ticket::new(1) < Ticket::new(2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Ticket::new(42).to_string(), "42");
    }
}
