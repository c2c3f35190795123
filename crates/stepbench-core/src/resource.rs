//! Resource handles and wait configuration
//!
//! Defines the values a waiter reads and produces:
//! - Remote resource identity
//! - Snapshot of a resource as last reported by its manager
//! - Interval/timeout pair for one wait

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Remote resource identifier
///
/// Opaque to this crate; passed to the manager exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub String);

impl ResourceId {
    /// Create new resource id
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of a remote resource
///
/// Each refresh produces a new handle; a handle is never updated in place
/// once a waiter has read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceHandle {
    /// Remote identity
    pub id: ResourceId,
    /// Display name, if the service reports one
    #[serde(default)]
    pub name: Option<String>,
    /// Lifecycle status as reported by the manager
    #[serde(default)]
    pub status: Option<String>,
    /// Failure detail attached to a failed resource
    #[serde(default)]
    pub fault: Option<String>,
    /// Raw remote representation
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl ResourceHandle {
    /// Create handle with no status
    #[inline]
    pub fn new(id: impl Into<ResourceId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            status: None,
            fault: None,
            raw: serde_json::Value::Null,
        }
    }

    /// With status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// With name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// With fault detail
    #[inline]
    #[must_use]
    pub fn with_fault(mut self, fault: impl Into<String>) -> Self {
        self.fault = Some(fault.into());
        self
    }

    /// With raw remote body
    #[inline]
    #[must_use]
    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = raw;
        self
    }

    /// Current status, if reported
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

/// Interval and deadline for a single wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSpec {
    /// Sleep between polls
    pub check_interval: Duration,
    /// Hard deadline, measured from the first poll
    pub timeout: Duration,
}

impl WaitSpec {
    /// Default sleep between polls
    pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(1);

    /// Default deadline
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    /// Create wait spec
    ///
    /// `check_interval` must be non-zero; a zero interval polls the manager
    /// back to back until the deadline.
    #[inline]
    #[must_use]
    pub fn new(check_interval: Duration, timeout: Duration) -> Self {
        debug_assert!(!check_interval.is_zero(), "check_interval must be non-zero");
        Self {
            check_interval,
            timeout,
        }
    }

    /// With check interval
    #[inline]
    #[must_use]
    pub fn with_check_interval(mut self, check_interval: Duration) -> Self {
        debug_assert!(!check_interval.is_zero(), "check_interval must be non-zero");
        self.check_interval = check_interval;
        self
    }

    /// With timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for WaitSpec {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CHECK_INTERVAL, Self::DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_spec_defaults() {
        let spec = WaitSpec::default();
        assert_eq!(spec.check_interval, Duration::from_secs(1));
        assert_eq!(spec.timeout, Duration::from_secs(120));
    }

    #[test]
    fn wait_spec_overrides() {
        let spec = WaitSpec::default()
            .with_check_interval(Duration::from_millis(250))
            .with_timeout(Duration::from_secs(10));
        assert_eq!(spec.check_interval, Duration::from_millis(250));
        assert_eq!(spec.timeout, Duration::from_secs(10));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "check_interval must be non-zero")]
    fn zero_check_interval_is_rejected() {
        let _ = WaitSpec::new(Duration::ZERO, Duration::from_secs(10));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "check_interval must be non-zero")]
    fn zero_check_interval_override_is_rejected() {
        let _ = WaitSpec::default().with_check_interval(Duration::ZERO);
    }

    #[test]
    fn handle_builder() {
        let handle = ResourceHandle::new("img-1")
            .with_name("cirros")
            .with_status("queued");

        assert_eq!(handle.id, ResourceId::from("img-1"));
        assert_eq!(handle.status(), Some("queued"));
        assert_eq!(handle.name.as_deref(), Some("cirros"));
        assert!(handle.fault.is_none());
    }

    #[test]
    fn handle_deserializes_with_missing_fields() {
        let handle: ResourceHandle = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(handle.id.as_str(), "abc");
        assert_eq!(handle.status(), None);
        assert!(handle.raw.is_null());
    }
}
