//! Action and resource naming

use rand::distr::Alphanumeric;
use rand::Rng;

/// Default prefix for generated resource names
pub const DEFAULT_NAME_PREFIX: &str = "stepbench_";

/// Service/resource pair that atomic action names are built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceKind {
    /// Service name, e.g. `glance`
    pub service: &'static str,
    /// Singular resource name, e.g. `image`
    pub resource: &'static str,
}

/// Images in the image service
pub const GLANCE_IMAGE: ResourceKind = ResourceKind::new("glance", "image");

impl ResourceKind {
    #[must_use]
    pub const fn new(service: &'static str, resource: &'static str) -> Self {
        Self { service, resource }
    }

    /// `<service>.create_<resource>`
    #[must_use]
    pub fn create_action(&self) -> String {
        format!("{}.create_{}", self.service, self.resource)
    }

    /// `<service>.delete_<resource>`
    #[must_use]
    pub fn delete_action(&self) -> String {
        format!("{}.delete_{}", self.service, self.resource)
    }

    /// `<service>.list_<resource>s`
    #[must_use]
    pub fn list_action(&self) -> String {
        format!("{}.list_{}s", self.service, self.resource)
    }
}

/// `prefix` followed by eight random alphanumerics
#[must_use]
pub fn random_name(prefix: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{prefix}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glance_action_names() {
        assert_eq!(GLANCE_IMAGE.create_action(), "glance.create_image");
        assert_eq!(GLANCE_IMAGE.delete_action(), "glance.delete_image");
        assert_eq!(GLANCE_IMAGE.list_action(), "glance.list_images");
    }

    #[test]
    fn random_names_keep_prefix() {
        let a = random_name(DEFAULT_NAME_PREFIX);
        let b = random_name(DEFAULT_NAME_PREFIX);

        assert!(a.starts_with("stepbench_"));
        assert_eq!(a.len(), "stepbench_".len() + 8);
        assert_ne!(a, b);
    }
}
