//! In-memory image service with eventual-consistency behavior
//!
//! Created images answer `queued`, then `saving`, and settle after a fixed
//! number of `get` calls. Deleted images keep resolving as `deleted` for a
//! while before the id stops resolving.

use crate::client::{CreateImageRequest, ImageClient};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use stepbench_core::{ClientError, ResourceHandle, ResourceId, ResourceManager};
use uuid::Uuid;

/// Fault attached to images when uploads are set to fail
pub const SIMULATED_FAULT: &str = "simulated upload failure";

/// Simulation knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationProfile {
    /// `get` calls before a created image settles
    pub polls_until_active: u32,
    /// `get` calls a deleted image keeps resolving for
    pub polls_until_gone: u32,
    /// Settle in `error` instead of `active`
    pub fail_uploads: bool,
    /// Fail every `get` with a transport error
    pub outage: bool,
}

impl Default for SimulationProfile {
    fn default() -> Self {
        Self {
            polls_until_active: 2,
            polls_until_gone: 1,
            fail_uploads: false,
            outage: false,
        }
    }
}

#[derive(Debug)]
struct SimImage {
    request: CreateImageRequest,
    /// Every `get` answered for this id, deleted-but-lingering included
    gets: u32,
    polls: u32,
    /// Polls seen since deletion, `None` while live
    deleted: Option<u32>,
}

impl SimImage {
    fn status(&self, profile: &SimulationProfile) -> &'static str {
        if self.deleted.is_some() {
            "deleted"
        } else if self.polls == 0 {
            "queued"
        } else if self.polls < profile.polls_until_active {
            "saving"
        } else if profile.fail_uploads {
            "error"
        } else {
            "active"
        }
    }

    fn handle(&self, id: &ResourceId, profile: &SimulationProfile) -> ResourceHandle {
        let status = self.status(profile);
        let mut handle = ResourceHandle::new(id.clone())
            .with_name(self.request.name.as_str())
            .with_status(status)
            .with_raw(serde_json::json!({
                "id": id,
                "name": self.request.name,
                "status": status,
                "container_format": self.request.container_format,
                "disk_format": self.request.disk_format,
                "properties": self.request.properties,
            }));
        if status == "error" {
            handle = handle.with_fault(SIMULATED_FAULT);
        }
        handle
    }
}

/// Eventually-consistent image service kept in memory
#[derive(Debug, Default)]
pub struct SimulatedImageService {
    profile: SimulationProfile,
    images: Mutex<BTreeMap<ResourceId, SimImage>>,
}

impl SimulatedImageService {
    /// Create service with a profile
    #[must_use]
    pub fn new(profile: SimulationProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Simulation profile in use
    #[inline]
    #[must_use]
    pub fn profile(&self) -> &SimulationProfile {
        &self.profile
    }

    /// Number of `get` calls an id received while it still resolved
    ///
    /// Zero once the image has vanished.
    #[must_use]
    pub fn get_count(&self, id: &ResourceId) -> u32 {
        self.images.lock().get(id).map_or(0, |image| image.gets)
    }

    /// Number of images still resolving, deleted-but-lingering included
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.images.lock().len()
    }
}

#[async_trait]
impl ResourceManager for SimulatedImageService {
    async fn get(&self, id: &ResourceId) -> Result<ResourceHandle, ClientError> {
        let mut images = self.images.lock();
        if self.profile.outage {
            if let Some(image) = images.get_mut(id) {
                image.gets += 1;
            }
            return Err(ClientError::Transport("simulated outage".to_string()));
        }
        let image = images
            .get_mut(id)
            .ok_or_else(|| ClientError::NotFound(id.clone()))?;
        image.gets += 1;

        let deleted = image.deleted;
        match deleted {
            Some(seen) if seen >= self.profile.polls_until_gone => {
                images.remove(id);
                Err(ClientError::NotFound(id.clone()))
            }
            Some(seen) => {
                image.deleted = Some(seen + 1);
                Ok(image.handle(id, &self.profile))
            }
            None => {
                image.polls += 1;
                Ok(image.handle(id, &self.profile))
            }
        }
    }
}

#[async_trait]
impl ImageClient for SimulatedImageService {
    async fn create_image(&self, request: CreateImageRequest) -> Result<ResourceHandle, ClientError> {
        let id = ResourceId::new(Uuid::new_v4().to_string());
        let image = SimImage {
            request,
            gets: 0,
            polls: 0,
            deleted: None,
        };
        let handle = image.handle(&id, &self.profile);
        self.images.lock().insert(id, image);
        Ok(handle)
    }

    async fn delete_image(&self, id: &ResourceId) -> Result<(), ClientError> {
        let mut images = self.images.lock();
        match images.get_mut(id) {
            Some(image) if image.deleted.is_none() => {
                image.deleted = Some(0);
                Ok(())
            }
            _ => Err(ClientError::NotFound(id.clone())),
        }
    }

    async fn list_images(&self) -> Result<Vec<ResourceHandle>, ClientError> {
        let images = self.images.lock();
        Ok(images
            .iter()
            .filter(|(_, image)| image.deleted.is_none())
            .map(|(id, image)| image.handle(id, &self.profile))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ImageSource;

    fn request() -> CreateImageRequest {
        CreateImageRequest {
            name: "stepbench_test".to_string(),
            container_format: "bare".to_string(),
            disk_format: "qcow2".to_string(),
            source: ImageSource::Location("http://example.com/cirros.img".to_string()),
            properties: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn image_settles_after_configured_polls() {
        let service = SimulatedImageService::new(SimulationProfile {
            polls_until_active: 3,
            ..SimulationProfile::default()
        });
        let created = service.create_image(request()).await.unwrap();
        assert_eq!(created.status(), Some("queued"));

        let mut statuses = Vec::new();
        for _ in 0..4 {
            statuses.push(service.get(&created.id).await.unwrap().status.unwrap());
        }
        assert_eq!(statuses, ["saving", "saving", "active", "active"]);
        assert_eq!(service.get_count(&created.id), 4);
    }

    #[tokio::test]
    async fn failing_uploads_settle_in_error() {
        let service = SimulatedImageService::new(SimulationProfile {
            polls_until_active: 1,
            fail_uploads: true,
            ..SimulationProfile::default()
        });
        let created = service.create_image(request()).await.unwrap();

        let image = service.get(&created.id).await.unwrap();
        assert_eq!(image.status(), Some("error"));
        assert_eq!(image.fault.as_deref(), Some(SIMULATED_FAULT));
    }

    #[tokio::test]
    async fn deleted_image_lingers_then_vanishes() {
        let service = SimulatedImageService::new(SimulationProfile {
            polls_until_gone: 2,
            ..SimulationProfile::default()
        });
        let created = service.create_image(request()).await.unwrap();
        service.delete_image(&created.id).await.unwrap();

        assert!(service.list_images().await.unwrap().is_empty());
        assert_eq!(service.get(&created.id).await.unwrap().status(), Some("deleted"));
        assert_eq!(service.get(&created.id).await.unwrap().status(), Some("deleted"));
        assert!(service.get(&created.id).await.unwrap_err().is_not_found());
        assert_eq!(service.image_count(), 0);
    }

    #[tokio::test]
    async fn vanished_images_leave_no_counters_behind() {
        let service = SimulatedImageService::default();
        let created = service.create_image(request()).await.unwrap();
        service.get(&created.id).await.unwrap();
        assert_eq!(service.get_count(&created.id), 1);

        service.delete_image(&created.id).await.unwrap();
        service.get(&created.id).await.unwrap();
        assert_eq!(service.get_count(&created.id), 2);

        for _ in 0..3 {
            assert!(service.get(&created.id).await.unwrap_err().is_not_found());
        }
        assert_eq!(service.get_count(&created.id), 0);
        assert!(service.images.lock().is_empty());
    }

    #[tokio::test]
    async fn double_delete_is_not_found() {
        let service = SimulatedImageService::default();
        let created = service.create_image(request()).await.unwrap();

        service.delete_image(&created.id).await.unwrap();
        let err = service.delete_image(&created.id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn outage_fails_gets() {
        let service = SimulatedImageService::new(SimulationProfile {
            outage: true,
            ..SimulationProfile::default()
        });
        let created = service.create_image(request()).await.unwrap();

        let err = service.get(&created.id).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert_eq!(service.get_count(&created.id), 1);

        let err = service.get(&ResourceId::from("missing")).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert_eq!(service.image_count(), 1);
    }

    #[tokio::test]
    async fn raw_body_mirrors_request() {
        let service = SimulatedImageService::default();
        let created = service.create_image(request()).await.unwrap();

        assert_eq!(created.raw["name"], "stepbench_test");
        assert_eq!(created.raw["disk_format"], "qcow2");
        assert_eq!(created.raw["status"], "queued");
    }
}
