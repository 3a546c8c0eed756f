// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the FriendSOS check-in engine.

use thiserror::Error;

/// The primary error type used across adapter traits and engine operations.
#[derive(Debug, Error)]
pub enum FriendsosError {
    /// Malformed creation parameters (non-positive interval, missing message or contacts).
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// The referenced check-in does not exist or is no longer active.
    #[error("check-in not found: {id}")]
    NotFound { id: String },

    /// Delivery of an escalation to a single contact failed.
    #[error("dispatch to contact {contact_id} failed: {message}")]
    Dispatch {
        contact_id: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The durable store could not be read or written.
    #[error("persistence error: {source}")]
    Persistence {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FriendsosError {
    /// Shorthand for a [`FriendsosError::Validation`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`FriendsosError::NotFound`].
    pub fn not_found(id: impl ToString) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// Wraps any error as a [`FriendsosError::Persistence`].
    pub fn persistence(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Persistence {
            source: source.into(),
        }
    }

    /// True for errors the presentation layer should show as user mistakes
    /// rather than system faults.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for FriendsosError {
    fn from(err: serde_json::Error) -> Self {
        Self::persistence(err)
    }
}
