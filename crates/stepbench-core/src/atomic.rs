//! Atomic action timing
//!
//! Every high-level step is wrapped in a named timer whose elapsed time is
//! appended to the run's [`ActionLog`]:
//! - One entry per timer scope, in the order scopes end
//! - Failed and cancelled scopes are recorded too
//! - Entries are never merged; aggregation is left to reporting

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::time::Instant;

/// One timed sub-operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicAction {
    /// Action name, e.g. `glance.create_image`
    pub name: String,
    /// Elapsed time in seconds
    pub duration: f64,
}

/// Ordered, append-only record of atomic actions for one scenario run
///
/// Clones share the same underlying log.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    inner: Arc<Mutex<Vec<AtomicAction>>>,
}

impl ActionLog {
    /// Create empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing `name`; the entry is appended when the guard drops
    #[must_use = "the action is recorded when the timer is dropped"]
    pub fn timer(&self, name: impl Into<String>) -> AtomicActionTimer {
        AtomicActionTimer {
            name: name.into(),
            started: Instant::now(),
            log: self.clone(),
        }
    }

    /// Time a future under `name`
    ///
    /// The entry is recorded whatever the future resolves to, and also if
    /// the returned future is dropped before completion.
    pub async fn measure<F: Future>(&self, name: impl Into<String>, fut: F) -> F::Output {
        let _timer = self.timer(name);
        fut.await
    }

    /// Append an entry
    pub fn record(&self, name: impl Into<String>, duration: f64) {
        let action = AtomicAction {
            name: name.into(),
            duration,
        };
        tracing::debug!(action = %action.name, duration = action.duration, "atomic action recorded");
        self.inner.lock().push(action);
    }

    /// Snapshot of recorded actions
    #[must_use]
    pub fn actions(&self) -> Vec<AtomicAction> {
        self.inner.lock().clone()
    }

    /// Number of recorded actions
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether nothing was recorded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Scoped timer for one atomic action
///
/// Records exactly once, on drop.
#[derive(Debug)]
pub struct AtomicActionTimer {
    name: String,
    started: Instant,
    log: ActionLog,
}

impl AtomicActionTimer {
    /// Action name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time since the scope started
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started.elapsed()
    }
}

impl Drop for AtomicActionTimer {
    fn drop(&mut self) {
        let duration = self.started.elapsed().as_secs_f64();
        self.log.record(std::mem::take(&mut self.name), duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn timer_records_on_drop() {
        let log = ActionLog::new();
        {
            let _timer = log.timer("glance.list_images");
            tokio::time::sleep(Duration::from_secs(3)).await;
        }

        let actions = log.actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].name, "glance.list_images");
        assert!((actions[0].duration - 3.0).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn measure_records_failures() {
        let log = ActionLog::new();

        let result: Result<(), &str> = log
            .measure("glance.create_image", async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Err("boom")
            })
            .await;

        assert!(result.is_err());
        let actions = log.actions();
        assert_eq!(actions.len(), 1);
        assert!((actions[0].duration - 2.0).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_scope_is_recorded() {
        let log = ActionLog::new();

        let slow = log.measure("glance.delete_image", tokio::time::sleep(Duration::from_secs(60)));
        let outcome = tokio::time::timeout(Duration::from_secs(5), slow).await;

        assert!(outcome.is_err());
        let actions = log.actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].name, "glance.delete_image");
        assert!((actions[0].duration - 5.0).abs() < 1e-6);
    }

    #[test]
    fn repeated_names_are_kept() {
        let log = ActionLog::new();
        for _ in 0..3 {
            let _timer = log.timer("glance.list_images");
        }
        drop(log.timer("glance.create_image"));

        let names: Vec<_> = log.actions().into_iter().map(|a| a.name).collect();
        assert_eq!(
            names,
            [
                "glance.list_images",
                "glance.list_images",
                "glance.list_images",
                "glance.create_image"
            ]
        );
    }

    #[test]
    fn clones_share_entries() {
        let log = ActionLog::new();
        let view = log.clone();
        assert!(view.is_empty());

        log.record("nova.boot_server", 1.5);
        assert_eq!(view.len(), 1);
        assert_eq!(view.actions()[0].duration, 1.5);
    }

    #[test]
    fn actions_serialize_as_name_duration_pairs() {
        let log = ActionLog::new();
        log.record("glance.list_images", 0.25);

        let json = serde_json::to_value(log.actions()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"name": "glance.list_images", "duration": 0.25}])
        );
    }
}
