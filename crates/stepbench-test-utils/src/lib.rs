//! Testing utilities for stepbench workspace
//!
//! Shared fakes and fixtures for waiter and scenario tests.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use stepbench_core::{ClientError, ResourceHandle, ResourceId, ResourceManager};
use tokio::time::Instant;

pub fn handle(id: &str, status: &str) -> ResourceHandle {
    ResourceHandle::new(id).with_status(status)
}

pub fn not_found(id: &str) -> ClientError {
    ClientError::NotFound(ResourceId::from(id))
}

/// One scripted answer to `get`
#[derive(Debug, Clone)]
pub enum Step {
    Status(String),
    Failed { status: String, fault: String },
    Err(ClientError),
}

impl Step {
    pub fn status(status: &str) -> Self {
        Self::Status(status.to_string())
    }

    pub fn failed(status: &str, fault: &str) -> Self {
        Self::Failed {
            status: status.to_string(),
            fault: fault.to_string(),
        }
    }

    fn answer(&self, id: &ResourceId) -> Result<ResourceHandle, ClientError> {
        match self {
            Self::Status(status) => Ok(ResourceHandle::new(id.clone()).with_status(status.as_str())),
            Self::Failed { status, fault } => Ok(ResourceHandle::new(id.clone())
                .with_status(status.as_str())
                .with_fault(fault.as_str())),
            Self::Err(e) => Err(e.clone()),
        }
    }
}

/// Manager answering `get` from a script, repeating the last step forever
///
/// Records when each poll happened so tests can assert on spacing.
#[derive(Debug, Default)]
pub struct ScriptedManager {
    script: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    polls: Mutex<Vec<(ResourceId, Instant)>>,
}

impl ScriptedManager {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Statuses only
    pub fn statuses(statuses: &[&str]) -> Self {
        Self::new(statuses.iter().map(|s| Step::status(s)))
    }

    pub fn poll_count(&self) -> usize {
        self.polls.lock().len()
    }

    pub fn poll_times(&self) -> Vec<Instant> {
        self.polls.lock().iter().map(|(_, at)| *at).collect()
    }

    pub fn polled_ids(&self) -> Vec<ResourceId> {
        self.polls.lock().iter().map(|(id, _)| id.clone()).collect()
    }
}

#[async_trait]
impl ResourceManager for ScriptedManager {
    async fn get(&self, id: &ResourceId) -> Result<ResourceHandle, ClientError> {
        self.polls.lock().push((id.clone(), Instant::now()));

        let step = match self.script.lock().pop_front() {
            Some(step) => {
                *self.last.lock() = Some(step.clone());
                step
            }
            None => self
                .last
                .lock()
                .clone()
                .unwrap_or_else(|| Step::Err(ClientError::NotFound(id.clone()))),
        };
        step.answer(id)
    }
}
