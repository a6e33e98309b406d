// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for device enumeration.

/// Errors that can occur while enumerating devices or loading the
/// registry configuration.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Failed to read a procfs file or a configuration file.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse a value from a system file.
    #[error("failed to parse value from {path}: {detail}")]
    ParseError { path: String, detail: String },

    /// The registry configuration is malformed.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
