//! Iteration runner
//!
//! Runs a scenario a number of times, up to `concurrency` iterations at
//! once. Every iteration gets its own steps and action log; nothing is
//! shared between iterations except the client.

use crate::client::ImageClient;
use crate::glance::GlanceScenario;
use crate::images::{run_iteration, ImageArgs, ImageScenario};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use stepbench_core::{AtomicAction, BenchConfig};

/// What to run
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub scenario: ImageScenario,
    pub iterations: usize,
    pub concurrency: usize,
    pub args: ImageArgs,
}

impl RunSpec {
    /// One iteration of `scenario` with default image args
    #[must_use]
    pub fn new(scenario: ImageScenario) -> Self {
        Self {
            scenario,
            iterations: 1,
            concurrency: 1,
            args: ImageArgs::default(),
        }
    }

    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_args(mut self, args: ImageArgs) -> Self {
        self.args = args;
        self
    }
}

/// Failure of one iteration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationFailure {
    pub kind: &'static str,
    pub message: String,
    pub last_status: Option<String>,
}

/// Outcome of one iteration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationReport {
    pub iteration: usize,
    pub actions: Vec<AtomicAction>,
    pub error: Option<IterationFailure>,
}

impl IterationReport {
    #[inline]
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Run every iteration and return the reports in iteration order
pub async fn run<C>(client: Arc<C>, config: &BenchConfig, spec: &RunSpec) -> Vec<IterationReport>
where
    C: ImageClient + ?Sized,
{
    tracing::info!(
        scenario = %spec.scenario,
        iterations = spec.iterations,
        concurrency = spec.concurrency,
        "starting run"
    );

    let mut reports: Vec<IterationReport> = stream::iter(0..spec.iterations)
        .map(|iteration| {
            let steps = GlanceScenario::from_config(Arc::clone(&client), config);
            async move {
                let result = run_iteration(spec.scenario, &steps, &spec.args).await;
                let error = result.err().map(|e| {
                    tracing::warn!(iteration, kind = e.kind(), error = %e, "iteration failed");
                    IterationFailure {
                        kind: e.kind(),
                        message: e.to_string(),
                        last_status: e.last_status().map(str::to_string),
                    }
                });
                IterationReport {
                    iteration,
                    actions: steps.atomic_actions(),
                    error,
                }
            }
        })
        .buffer_unordered(spec.concurrency.max(1))
        .collect()
        .await;

    reports.sort_by_key(|r| r.iteration);
    let failed = reports.iter().filter(|r| !r.succeeded()).count();
    tracing::info!(scenario = %spec.scenario, failed, "run finished");
    reports
}
