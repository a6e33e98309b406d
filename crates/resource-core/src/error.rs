// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the resource vocabulary.

/// Errors that can occur while parsing resource tags and quantities.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// A resource tag string did not match `<type>:<kind>:<index>`.
    #[error("invalid resource tag '{input}': {detail}")]
    InvalidTag { input: String, detail: String },

    /// A quantity string could not be parsed.
    #[error("invalid quantity '{input}': {detail}")]
    InvalidQuantity { input: String, detail: String },
}
