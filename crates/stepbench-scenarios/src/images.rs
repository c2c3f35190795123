//! Image benchmark scenarios
//!
//! Composite runs built from the glance steps. One call is one iteration.

use crate::client::ImageClient;
use crate::error::ScenarioError;
use crate::glance::GlanceScenario;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Available image scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageScenario {
    /// List images
    ListImages,
    /// Create an image, then list images
    CreateAndListImage,
    /// Create an image, then delete it
    CreateAndDeleteImage,
}

impl ImageScenario {
    /// Every scenario, in display order
    pub const ALL: [Self; 3] = [
        Self::ListImages,
        Self::CreateAndListImage,
        Self::CreateAndDeleteImage,
    ];

    /// Scenario name as used on the command line
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListImages => "list_images",
            Self::CreateAndListImage => "create_and_list_image",
            Self::CreateAndDeleteImage => "create_and_delete_image",
        }
    }
}

impl fmt::Display for ImageScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ImageScenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.name() == normalized)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|s| s.name()).collect();
                format!("unknown scenario '{s}', expected one of: {}", known.join(", "))
            })
    }
}

/// Image parameters for create steps
#[derive(Debug, Clone, PartialEq)]
pub struct ImageArgs {
    pub container_format: String,
    pub image_location: String,
    pub disk_format: String,
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Default for ImageArgs {
    fn default() -> Self {
        Self {
            container_format: "bare".to_string(),
            image_location: "http://example.com/images/cirros-x86_64-disk.img".to_string(),
            disk_format: "qcow2".to_string(),
            properties: BTreeMap::new(),
        }
    }
}

/// Run one iteration of `scenario`
///
/// # Errors
/// The first failing step's error; later steps are skipped.
pub async fn run_iteration<C: ImageClient + ?Sized>(
    scenario: ImageScenario,
    steps: &GlanceScenario<C>,
    args: &ImageArgs,
) -> Result<(), ScenarioError> {
    match scenario {
        ImageScenario::ListImages => {
            steps.list_images().await?;
        }
        ImageScenario::CreateAndListImage => {
            create(steps, args).await?;
            steps.list_images().await?;
        }
        ImageScenario::CreateAndDeleteImage => {
            let image = create(steps, args).await?;
            steps.delete_image(&image).await?;
        }
    }
    Ok(())
}

async fn create<C: ImageClient + ?Sized>(
    steps: &GlanceScenario<C>,
    args: &ImageArgs,
) -> Result<stepbench_core::ResourceHandle, ScenarioError> {
    steps
        .create_image(
            &args.container_format,
            &args.image_location,
            &args.disk_format,
            args.properties.clone(),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_with_either_separator() {
        assert_eq!(
            "create_and_delete_image".parse::<ImageScenario>(),
            Ok(ImageScenario::CreateAndDeleteImage)
        );
        assert_eq!(
            "create-and-list-image".parse::<ImageScenario>(),
            Ok(ImageScenario::CreateAndListImage)
        );
    }

    #[test]
    fn unknown_name_lists_choices() {
        let err = "boot_server".parse::<ImageScenario>().unwrap_err();
        assert!(err.contains("list_images"));
        assert!(err.contains("create_and_delete_image"));
    }
}
