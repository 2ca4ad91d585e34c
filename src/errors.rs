// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for action translation and remote execution.
//!
//! Every stage of the action pipeline returns [`ActionError`]. The first five variants are
//! local failures detected before any remote call is made; [`ActionError::Remote`] wraps the
//! opaque failure reported by the WAPI server.
//!
//! The error's `Display` text becomes the failure message of the action result, so messages
//! are written for the operator who invoked the action.

use thiserror::Error;

/// Errors that can occur while validating, translating or executing an action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// A parameter is missing, malformed, out of range or conflicts with another parameter.
    #[error("Invalid parameter '{field}': {reason}")]
    Validation {
        /// The offending parameter name
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// A free-form parameter (JSON text or extended attribute string) could not be parsed.
    #[error("Failed to parse '{field}': {reason}")]
    Parse {
        /// The parameter holding the unparseable text
        field: String,
        /// Parser diagnostic
        reason: String,
    },

    /// No remote object type exists for the given rule type / object type combination.
    #[error("No object type mapping for rule type '{rule_type}' and object type '{object_type}'")]
    Mapping {
        /// Rule type label (or record kind) supplied by the caller
        rule_type: String,
        /// Object type label supplied by the caller
        object_type: String,
    },

    /// An extended attribute key appears more than once in a filter string.
    #[error("Duplicate extended attribute '{key}'")]
    DuplicateAttribute {
        /// The repeated attribute name
        key: String,
    },

    /// `additional_parameters` tries to re-specify a field already set from a typed parameter.
    #[error("Additional parameter '{field}' conflicts with a value already set by the action's parameters")]
    Conflict {
        /// The field that was already populated
        field: String,
    },

    /// The remote server rejected or failed the request.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl ActionError {
    /// Shorthand for [`ActionError::Validation`].
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ActionError::Parse`].
    pub fn parse(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable label for the error class, used in result summaries and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::Parse { .. } => "ParseError",
            Self::Mapping { .. } => "MappingError",
            Self::DuplicateAttribute { .. } => "DuplicateAttributeError",
            Self::Conflict { .. } => "ConflictError",
            Self::Remote(_) => "RemoteError",
        }
    }

    /// Whether the error was detected locally, before any remote call.
    #[must_use]
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Remote(_))
    }
}

/// Failure reported by the WAPI server or the transport in front of it.
///
/// The message is the server-supplied text and is surfaced verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    /// HTTP status code, when the server answered at all
    pub status: Option<u16>,
    /// Server-supplied (or transport) error message
    pub message: String,
}

impl RemoteError {
    /// Error for a response the server answered with a non-success status.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Error for a request that never got an HTTP answer (connection, TLS, timeout).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
