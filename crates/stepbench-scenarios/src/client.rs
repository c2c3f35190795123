//! Image service client interface
//!
//! The network client is an external collaborator; scenarios only see this
//! trait. `get` comes from [`ResourceManager`] so the same client doubles as
//! the manager the waiters poll.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use stepbench_core::{ClientError, ResourceHandle, ResourceId, ResourceManager};

/// Where image bits come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// Local file uploaded as image data
    File(PathBuf),
    /// Remote location the service fetches itself
    Location(String),
}

impl ImageSource {
    /// Existing local path becomes an upload, anything else a location
    pub fn detect(location: impl AsRef<str>) -> Self {
        let location = location.as_ref();
        if Path::new(location).is_file() {
            Self::File(PathBuf::from(location))
        } else {
            Self::Location(location.to_string())
        }
    }
}

/// Parameters for creating an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateImageRequest {
    pub name: String,
    pub container_format: String,
    pub disk_format: String,
    pub source: ImageSource,
    /// Extra properties passed through as-is
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

/// Image service operations used by the benchmark steps
#[async_trait]
pub trait ImageClient: ResourceManager {
    /// Create an image; the returned handle is usually not yet active
    async fn create_image(&self, request: CreateImageRequest) -> Result<ResourceHandle, ClientError>;

    /// Request deletion; the image may keep resolving for a while
    async fn delete_image(&self, id: &ResourceId) -> Result<(), ClientError>;

    /// List images visible to the caller
    async fn list_images(&self) -> Result<Vec<ResourceHandle>, ClientError>;
}
