//! Error types for benchmark scenarios

use stepbench_core::{ClientError, WaitError};

/// Scenario step failure
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// The mutating or listing call itself failed
    #[error("client call failed: {0}")]
    Client(#[from] ClientError),

    /// The call succeeded but the resource never settled
    #[error(transparent)]
    Wait(#[from] WaitError),
}

impl ScenarioError {
    /// Short classification used in reports
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Client(_) => "client_error",
            Self::Wait(WaitError::Timeout { .. }) => "wait_timeout",
            Self::Wait(WaitError::ResourceDisappeared { .. }) => "resource_disappeared",
            Self::Wait(WaitError::ResourceFailedTransition { .. }) => "resource_failed_transition",
            Self::Wait(WaitError::ManagerQueryFailure { .. }) => "manager_query_failure",
        }
    }

    /// Last known resource status, where the failure carries one
    #[must_use]
    pub fn last_status(&self) -> Option<&str> {
        match self {
            Self::Client(_) => None,
            Self::Wait(e) => e.last_status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use stepbench_core::{ResourceId, WaitTarget};

    #[test]
    fn kind_follows_wait_taxonomy() {
        let timeout: ScenarioError = WaitError::Timeout {
            resource: ResourceId::from("img"),
            target: WaitTarget::Ready,
            last_status: Some("queued".into()),
            timeout: Duration::from_secs(120),
        }
        .into();
        assert_eq!(timeout.kind(), "wait_timeout");
        assert_eq!(timeout.last_status(), Some("queued"));

        let client: ScenarioError = ClientError::api(409, "conflict").into();
        assert_eq!(client.kind(), "client_error");
        assert_eq!(client.last_status(), None);
    }
}
