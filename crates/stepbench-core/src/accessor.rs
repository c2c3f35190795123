//! Manager access and failure classification
//!
//! A refresh re-fetches a resource from its owning manager and classifies
//! the answer into one [`RefreshOutcome`]. The same outcome is read two
//! ways: a readiness wait treats not-found as fatal, a deletion wait treats
//! it as success.

use crate::error::{ClientError, WaitError};
use crate::resource::{ResourceHandle, ResourceId};
use async_trait::async_trait;

/// Statuses that mark a resource as permanently failed
pub const DEFAULT_FAILURE_STATUSES: &[&str] = &["error"];

/// Remote manager capability: fetch current state by id
///
/// Implementations must report an id that no longer resolves as
/// [`ClientError::NotFound`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceManager: Send + Sync {
    /// Fetch current state of a resource
    async fn get(&self, id: &ResourceId) -> Result<ResourceHandle, ClientError>;
}

/// Classified result of one refresh
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Fresh handle in a non-terminal status
    Current(ResourceHandle),
    /// Fresh handle in a terminal failure status
    Failed(ResourceHandle),
    /// The manager no longer resolves the id
    NotFound,
    /// The refresh call itself failed
    QueryFailed(ClientError),
}

impl RefreshOutcome {
    /// Interpret for a readiness wait
    ///
    /// # Errors
    /// - `ResourceDisappeared` on not-found
    /// - `ResourceFailedTransition` on a terminal failure status
    /// - `ManagerQueryFailure` if the manager call failed
    pub fn into_readiness(self, resource: &ResourceId) -> Result<ResourceHandle, WaitError> {
        match self {
            Self::Current(handle) => Ok(handle),
            Self::NotFound => Err(WaitError::ResourceDisappeared {
                resource: resource.clone(),
            }),
            Self::Failed(handle) => Err(WaitError::ResourceFailedTransition {
                resource: resource.clone(),
                status: handle.status.unwrap_or_default(),
                fault: handle.fault,
            }),
            Self::QueryFailed(source) => Err(WaitError::ManagerQueryFailure {
                resource: resource.clone(),
                source,
            }),
        }
    }

    /// Interpret for a deletion wait
    ///
    /// Returns `None` once the resource is gone, otherwise the handle that
    /// is still present (failed or not).
    ///
    /// # Errors
    /// - `ManagerQueryFailure` if the manager call failed
    pub fn into_deletion(self, resource: &ResourceId) -> Result<Option<ResourceHandle>, WaitError> {
        match self {
            Self::NotFound => Ok(None),
            Self::Current(handle) | Self::Failed(handle) => Ok(Some(handle)),
            Self::QueryFailed(source) => Err(WaitError::ManagerQueryFailure {
                resource: resource.clone(),
                source,
            }),
        }
    }
}

/// Refresh capability used by the waiters
#[async_trait]
pub trait Refresh: Send + Sync {
    /// Re-fetch `handle` and classify the answer
    async fn refresh(&self, handle: &ResourceHandle) -> RefreshOutcome;
}

/// Refreshes resources through a [`ResourceManager`]
pub struct ManagerAccessor<'a, M: ?Sized> {
    manager: &'a M,
    failure_statuses: Vec<String>,
}

impl<'a, M: ResourceManager + ?Sized> ManagerAccessor<'a, M> {
    /// Create accessor with the default failure statuses
    #[must_use]
    pub fn new(manager: &'a M) -> Self {
        Self {
            manager,
            failure_statuses: DEFAULT_FAILURE_STATUSES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// With failure statuses (compared case-insensitively)
    #[must_use]
    pub fn with_failure_statuses<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.failure_statuses = statuses
            .into_iter()
            .map(|s| s.as_ref().to_lowercase())
            .collect();
        self
    }

    /// Statuses treated as terminal failures
    #[inline]
    #[must_use]
    pub fn failure_statuses(&self) -> &[String] {
        &self.failure_statuses
    }

    fn is_failure_status(&self, status: Option<&str>) -> bool {
        status.is_some_and(|status| {
            let status = status.to_lowercase();
            self.failure_statuses.iter().any(|f| *f == status)
        })
    }
}

#[async_trait]
impl<M: ResourceManager + ?Sized> Refresh for ManagerAccessor<'_, M> {
    async fn refresh(&self, handle: &ResourceHandle) -> RefreshOutcome {
        match self.manager.get(&handle.id).await {
            Ok(fresh) if self.is_failure_status(fresh.status()) => RefreshOutcome::Failed(fresh),
            Ok(fresh) => RefreshOutcome::Current(fresh),
            Err(ClientError::NotFound(_)) => RefreshOutcome::NotFound,
            Err(e) => RefreshOutcome::QueryFailed(e),
        }
    }
}

impl<M: ?Sized> std::fmt::Debug for ManagerAccessor<'_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerAccessor")
            .field("failure_statuses", &self.failure_statuses)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn manager_returning(
        result: Result<ResourceHandle, ClientError>,
    ) -> MockResourceManager {
        let mut manager = MockResourceManager::new();
        manager
            .expect_get()
            .with(eq(ResourceId::from("img-1")))
            .times(1)
            .return_once(move |_| result);
        manager
    }

    #[tokio::test]
    async fn refresh_returns_fresh_handle() {
        let manager = manager_returning(Ok(ResourceHandle::new("img-1").with_status("saving")));
        let accessor = ManagerAccessor::new(&manager);

        let outcome = accessor.refresh(&ResourceHandle::new("img-1")).await;
        match outcome {
            RefreshOutcome::Current(handle) => assert_eq!(handle.status(), Some("saving")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn refresh_classifies_error_status_as_failed() {
        let manager = manager_returning(Ok(ResourceHandle::new("img-1")
            .with_status("ERROR")
            .with_fault("checksum mismatch")));
        let accessor = ManagerAccessor::new(&manager);

        let outcome = accessor.refresh(&ResourceHandle::new("img-1")).await;
        assert!(matches!(outcome, RefreshOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn refresh_honours_custom_failure_statuses() {
        let manager = manager_returning(Ok(ResourceHandle::new("img-1").with_status("killed")));
        let accessor = ManagerAccessor::new(&manager).with_failure_statuses(["error", "KILLED"]);

        assert_eq!(accessor.failure_statuses(), &["error", "killed"]);
        let outcome = accessor.refresh(&ResourceHandle::new("img-1")).await;
        assert!(matches!(outcome, RefreshOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn refresh_maps_not_found() {
        let manager = manager_returning(Err(ClientError::NotFound(ResourceId::from("img-1"))));
        let accessor = ManagerAccessor::new(&manager);

        let outcome = accessor.refresh(&ResourceHandle::new("img-1")).await;
        assert!(matches!(outcome, RefreshOutcome::NotFound));
    }

    #[tokio::test]
    async fn refresh_keeps_other_errors() {
        let manager = manager_returning(Err(ClientError::api(503, "unavailable")));
        let accessor = ManagerAccessor::new(&manager);

        let outcome = accessor.refresh(&ResourceHandle::new("img-1")).await;
        assert!(matches!(
            outcome,
            RefreshOutcome::QueryFailed(ClientError::Api { code: 503, .. })
        ));
    }

    #[test]
    fn not_found_means_opposite_things() {
        let id = ResourceId::from("img-1");

        let readiness = RefreshOutcome::NotFound.into_readiness(&id);
        assert!(matches!(readiness, Err(WaitError::ResourceDisappeared { .. })));

        let deletion = RefreshOutcome::NotFound.into_deletion(&id);
        assert!(matches!(deletion, Ok(None)));
    }

    #[test]
    fn failed_status_only_fatal_for_readiness() {
        let id = ResourceId::from("img-1");
        let failed = || {
            RefreshOutcome::Failed(
                ResourceHandle::new("img-1")
                    .with_status("error")
                    .with_fault("quota exceeded"),
            )
        };

        match failed().into_readiness(&id) {
            Err(WaitError::ResourceFailedTransition { status, fault, .. }) => {
                assert_eq!(status, "error");
                assert_eq!(fault.as_deref(), Some("quota exceeded"));
            }
            other => panic!("unexpected: {other:?}"),
        }

        let still_there = failed().into_deletion(&id).unwrap();
        assert!(still_there.is_some());
    }

    #[test]
    fn query_failure_fatal_for_both() {
        let id = ResourceId::from("img-1");
        let failed = || RefreshOutcome::QueryFailed(ClientError::Transport("reset".into()));

        assert!(matches!(
            failed().into_readiness(&id),
            Err(WaitError::ManagerQueryFailure { .. })
        ));
        assert!(matches!(
            failed().into_deletion(&id),
            Err(WaitError::ManagerQueryFailure { .. })
        ));
    }
}
