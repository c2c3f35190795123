//! Error types for stepbench core
//!
//! Provides the failure taxonomy for:
//! - Remote client calls (create, delete, list, get)
//! - Readiness and deletion waits
//! - Configuration loading

use crate::resource::ResourceId;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Errors reported by a remote client or resource manager
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The id no longer resolves on the remote side
    #[error("resource not found: {0}")]
    NotFound(ResourceId),

    /// The service answered with an error
    #[error("api error ({code}): {message}")]
    Api { code: u16, message: String },

    /// The request never got a usable answer
    #[error("transport error: {0}")]
    Transport(String),
}

impl ClientError {
    /// Check if this is the not-found signal
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Create api error
    #[inline]
    pub fn api(code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }
}

/// What a wait was trying to reach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTarget {
    /// The readiness predicate
    Ready,
    /// Confirmed absence
    Deleted,
}

impl fmt::Display for WaitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("ready"),
            Self::Deleted => f.write_str("deleted"),
        }
    }
}

/// Wait failures
///
/// None of these are retried by the waiters; they propagate to the
/// scenario step that started the wait.
#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    /// Deadline passed without success
    #[error(
        "resource {resource} did not become {target} within {timeout:?} (last status: {})",
        .last_status.as_deref().unwrap_or("unknown")
    )]
    Timeout {
        resource: ResourceId,
        target: WaitTarget,
        last_status: Option<String>,
        timeout: Duration,
    },

    /// Readiness target vanished before becoming ready
    #[error("resource {resource} disappeared while waiting for it to become ready")]
    ResourceDisappeared { resource: ResourceId },

    /// Manager reported a terminal failure status
    #[error(
        "resource {resource} went to status {status}: {}",
        .fault.as_deref().unwrap_or("no fault details")
    )]
    ResourceFailedTransition {
        resource: ResourceId,
        status: String,
        fault: Option<String>,
    },

    /// The refresh call itself failed
    #[error("failed to query manager for resource {resource}: {source}")]
    ManagerQueryFailure {
        resource: ResourceId,
        #[source]
        source: ClientError,
    },
}

impl WaitError {
    /// Resource the failed wait was about
    #[must_use]
    pub fn resource(&self) -> &ResourceId {
        match self {
            Self::Timeout { resource, .. }
            | Self::ResourceDisappeared { resource }
            | Self::ResourceFailedTransition { resource, .. }
            | Self::ManagerQueryFailure { resource, .. } => resource,
        }
    }

    /// Last known status, where the failure carries one
    #[must_use]
    pub fn last_status(&self) -> Option<&str> {
        match self {
            Self::Timeout { last_status, .. } => last_status.as_deref(),
            Self::ResourceFailedTransition { status, .. } => Some(status),
            Self::ResourceDisappeared { .. } | Self::ManagerQueryFailure { .. } => None,
        }
    }

    /// Check if this is a deadline failure
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if the failure comes from infrastructure rather than the resource lifecycle
    #[inline]
    #[must_use]
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::ManagerQueryFailure { .. })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Well-formed but unusable value
    #[error("invalid config value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    /// Create invalid-value error
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
