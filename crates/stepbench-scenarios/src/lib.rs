//! stepbench scenarios - image service benchmark steps
//!
//! Steps and scenarios built on [`stepbench_core`]:
//! - `glance.create_image`, `glance.delete_image`, `glance.list_images` steps
//! - Composite scenarios run per iteration
//! - A concurrent iteration runner with per-iteration reports
//! - An in-memory image service for dry runs and tests

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod error;
pub mod glance;
pub mod images;
pub mod naming;
pub mod runner;
pub mod simulated;

// Re-exports for convenience
pub use client::{CreateImageRequest, ImageClient, ImageSource};
pub use error::ScenarioError;
pub use glance::{GlanceScenario, READY_STATUS};
pub use images::{run_iteration, ImageArgs, ImageScenario};
pub use naming::{random_name, ResourceKind, DEFAULT_NAME_PREFIX, GLANCE_IMAGE};
pub use runner::{run, IterationFailure, IterationReport, RunSpec};
pub use simulated::{SimulatedImageService, SimulationProfile, SIMULATED_FAULT};
