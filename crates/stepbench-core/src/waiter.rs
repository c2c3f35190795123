//! Readiness and deletion waiters
//!
//! Both waiters share one loop shape:
//! 1. Refresh immediately (no initial sleep)
//! 2. Interpret the outcome; hard failures return at once, never retried
//! 3. Stop on success
//! 4. Sleep `check_interval`
//! 5. Fail with `Timeout` once the deadline has passed, otherwise go again
//!
//! The interval is fixed and the deadline is wall-clock from the first
//! poll. The sleep is the only suspension point besides the refresh itself
//! and is cancelled by dropping the future.

use crate::accessor::Refresh;
use crate::error::{WaitError, WaitTarget};
use crate::resource::{ResourceHandle, WaitSpec};
use tokio::time::Instant;

/// Poll `handle` until `is_ready` accepts a freshly refreshed copy
///
/// The predicate is only ever evaluated on the handle returned by the same
/// poll, and that handle is returned on success.
///
/// # Errors
/// - `ResourceDisappeared` if the manager stops resolving the id
/// - `ResourceFailedTransition` on a terminal failure status
/// - `ManagerQueryFailure` if a refresh call fails
/// - `Timeout` with the last observed status when the deadline passes
pub async fn wait_for<P, A>(
    handle: ResourceHandle,
    is_ready: P,
    spec: &WaitSpec,
    accessor: &A,
) -> Result<ResourceHandle, WaitError>
where
    P: Fn(&ResourceHandle) -> bool,
    A: Refresh + ?Sized,
{
    let resource = &handle.id;
    let started = Instant::now();
    let mut polls = 0u32;

    loop {
        polls += 1;
        let fresh = match accessor.refresh(&handle).await.into_readiness(resource) {
            Ok(fresh) => fresh,
            Err(e) => {
                tracing::warn!(resource = %resource, polls, error = %e, "readiness wait failed");
                return Err(e);
            }
        };
        tracing::debug!(resource = %resource, poll = polls, status = ?fresh.status(), "polled resource");

        if is_ready(&fresh) {
            tracing::info!(
                resource = %resource,
                polls,
                elapsed = ?started.elapsed(),
                "resource ready"
            );
            return Ok(fresh);
        }
        let last_status = fresh.status;

        tokio::time::sleep(spec.check_interval).await;
        if started.elapsed() >= spec.timeout {
            tracing::warn!(resource = %resource, polls, timeout = ?spec.timeout, "readiness wait timed out");
            return Err(WaitError::Timeout {
                resource: resource.clone(),
                target: WaitTarget::Ready,
                last_status,
                timeout: spec.timeout,
            });
        }
    }
}

/// Poll `handle` until its manager reports it absent
///
/// A resource in a failure status is still present and keeps being polled.
///
/// # Errors
/// - `ManagerQueryFailure` if a refresh call fails
/// - `Timeout` with the last observed status when the deadline passes
pub async fn wait_for_delete<A>(
    handle: ResourceHandle,
    spec: &WaitSpec,
    accessor: &A,
) -> Result<(), WaitError>
where
    A: Refresh + ?Sized,
{
    let resource = &handle.id;
    let started = Instant::now();
    let mut polls = 0u32;

    loop {
        polls += 1;
        let present = match accessor.refresh(&handle).await.into_deletion(resource) {
            Ok(present) => present,
            Err(e) => {
                tracing::warn!(resource = %resource, polls, error = %e, "deletion wait failed");
                return Err(e);
            }
        };

        let Some(fresh) = present else {
            tracing::info!(
                resource = %resource,
                polls,
                elapsed = ?started.elapsed(),
                "resource deleted"
            );
            return Ok(());
        };
        tracing::debug!(resource = %resource, poll = polls, status = ?fresh.status(), "resource still present");
        let last_status = fresh.status;

        tokio::time::sleep(spec.check_interval).await;
        if started.elapsed() >= spec.timeout {
            tracing::warn!(resource = %resource, polls, timeout = ?spec.timeout, "deletion wait timed out");
            return Err(WaitError::Timeout {
                resource: resource.clone(),
                target: WaitTarget::Deleted,
                last_status,
                timeout: spec.timeout,
            });
        }
    }
}
