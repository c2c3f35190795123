//! stepbench core - bounded polling and atomic action timing
//!
//! The engine underneath every benchmark step:
//! - Status predicates over remote resources
//! - Manager access with failure classification
//! - Readiness and deletion waiters with fixed interval and hard timeout
//! - Scoped duration recording into an ordered action log
//!
//! # Example
//!
//! ```rust,ignore
//! use stepbench_core::prelude::*;
//!
//! # async fn example(manager: &impl ResourceManager, handle: ResourceHandle) -> Result<(), WaitError> {
//! let actions = ActionLog::new();
//! let accessor = ManagerAccessor::new(manager);
//!
//! let ready = {
//!     let _timer = actions.timer("glance.create_image");
//!     wait_for(handle, resource_is("active"), &WaitSpec::default(), &accessor).await?
//! };
//!
//! println!("{} is {:?}", ready.id, ready.status());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod accessor;
pub mod atomic;
pub mod config;
pub mod error;
pub mod predicate;
pub mod resource;
pub mod waiter;

// Re-exports for convenience
pub use accessor::{ManagerAccessor, Refresh, RefreshOutcome, ResourceManager, DEFAULT_FAILURE_STATUSES};
pub use atomic::{ActionLog, AtomicAction, AtomicActionTimer};
pub use config::{BenchConfig, WaitDefaults, WaitOverride};
pub use error::{ClientError, ConfigError, WaitError, WaitTarget};
pub use predicate::{resource_is, StatusPredicate};
pub use resource::{ResourceHandle, ResourceId, WaitSpec};
pub use waiter::{wait_for, wait_for_delete};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for writing benchmark steps
    pub use crate::{
        resource_is, wait_for, wait_for_delete, ActionLog, AtomicAction, ClientError,
        ManagerAccessor, Refresh, RefreshOutcome, ResourceHandle, ResourceId, ResourceManager,
        StatusPredicate, WaitError, WaitSpec,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
