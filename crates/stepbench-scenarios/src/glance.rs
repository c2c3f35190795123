//! Image service benchmark steps
//!
//! Each step is timed as one atomic action covering the remote call and the
//! wait for the service to settle:
//! - `glance.create_image`: create, then wait for `active`
//! - `glance.delete_image`: delete, then wait until the image is gone
//! - `glance.list_images`: list, no waiting

use crate::client::{CreateImageRequest, ImageClient, ImageSource};
use crate::error::ScenarioError;
use crate::naming::{random_name, DEFAULT_NAME_PREFIX, GLANCE_IMAGE};
use std::collections::BTreeMap;
use std::sync::Arc;
use stepbench_core::{
    resource_is, wait_for, wait_for_delete, ActionLog, AtomicAction, BenchConfig, ManagerAccessor,
    ResourceHandle, WaitSpec, DEFAULT_FAILURE_STATUSES,
};

/// Status a created image must reach
pub const READY_STATUS: &str = "active";

/// Image benchmark steps bound to one client and one action log
pub struct GlanceScenario<C: ?Sized> {
    client: Arc<C>,
    actions: ActionLog,
    wait: WaitSpec,
    failure_statuses: Vec<String>,
    name_prefix: String,
}

impl<C: ImageClient + ?Sized> GlanceScenario<C> {
    /// Create scenario with default waits and a fresh action log
    #[must_use]
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            actions: ActionLog::new(),
            wait: WaitSpec::default(),
            failure_statuses: DEFAULT_FAILURE_STATUSES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
        }
    }

    /// Create scenario with waits tuned from config
    #[must_use]
    pub fn from_config(client: Arc<C>, config: &BenchConfig) -> Self {
        Self::new(client)
            .with_wait_spec(config.wait_spec_for(GLANCE_IMAGE.service))
            .with_failure_statuses(config.failure_statuses_for(GLANCE_IMAGE.service).to_vec())
    }

    /// With wait spec
    #[must_use]
    pub fn with_wait_spec(mut self, wait: WaitSpec) -> Self {
        self.wait = wait;
        self
    }

    /// With terminal failure statuses
    #[must_use]
    pub fn with_failure_statuses(mut self, statuses: Vec<String>) -> Self {
        self.failure_statuses = statuses;
        self
    }

    /// With prefix for generated image names
    #[must_use]
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Record into an existing log instead of a fresh one
    #[must_use]
    pub fn with_action_log(mut self, actions: ActionLog) -> Self {
        self.actions = actions;
        self
    }

    /// Recorded atomic actions, in completion order
    #[must_use]
    pub fn atomic_actions(&self) -> Vec<AtomicAction> {
        self.actions.actions()
    }

    /// Underlying action log
    #[inline]
    #[must_use]
    pub fn action_log(&self) -> &ActionLog {
        &self.actions
    }

    /// Wait spec used by create and delete
    #[inline]
    #[must_use]
    pub fn wait_spec(&self) -> &WaitSpec {
        &self.wait
    }

    /// List images
    pub async fn list_images(&self) -> Result<Vec<ResourceHandle>, ScenarioError> {
        let _timer = self.actions.timer(GLANCE_IMAGE.list_action());
        let images = self.client.list_images().await?;
        tracing::debug!(count = images.len(), "listed images");
        Ok(images)
    }

    /// Create an image and wait for it to become active
    ///
    /// `image_location` is uploaded if it names an existing local file and
    /// passed to the service as a remote location otherwise.
    ///
    /// # Errors
    /// - `ScenarioError::Client` if the create call fails
    /// - `ScenarioError::Wait` if the image never becomes active
    pub async fn create_image(
        &self,
        container_format: &str,
        image_location: &str,
        disk_format: &str,
        properties: BTreeMap<String, serde_json::Value>,
    ) -> Result<ResourceHandle, ScenarioError> {
        let _timer = self.actions.timer(GLANCE_IMAGE.create_action());

        let request = CreateImageRequest {
            name: random_name(&self.name_prefix),
            container_format: container_format.to_string(),
            disk_format: disk_format.to_string(),
            source: ImageSource::detect(image_location),
            properties,
        };
        tracing::info!(name = %request.name, source = ?request.source, "creating image");

        let image = self.client.create_image(request).await?;
        let image = wait_for(image, resource_is(READY_STATUS), &self.wait, &self.accessor()).await?;
        Ok(image)
    }

    /// Delete an image and wait until the service no longer resolves it
    ///
    /// # Errors
    /// - `ScenarioError::Client` if the delete call fails
    /// - `ScenarioError::Wait` if the image is still there at the deadline
    pub async fn delete_image(&self, image: &ResourceHandle) -> Result<(), ScenarioError> {
        let _timer = self.actions.timer(GLANCE_IMAGE.delete_action());

        tracing::info!(image = %image.id, "deleting image");
        self.client.delete_image(&image.id).await?;
        wait_for_delete(image.clone(), &self.wait, &self.accessor()).await?;
        Ok(())
    }

    fn accessor(&self) -> ManagerAccessor<'_, C> {
        ManagerAccessor::new(&*self.client).with_failure_statuses(&self.failure_statuses)
    }
}

impl<C: ?Sized> std::fmt::Debug for GlanceScenario<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlanceScenario")
            .field("actions", &self.actions)
            .field("wait", &self.wait)
            .field("failure_statuses", &self.failure_statuses)
            .field("name_prefix", &self.name_prefix)
            .finish_non_exhaustive()
    }
}
