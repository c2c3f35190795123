//! Status predicates
//!
//! A readiness check is any `Fn(&ResourceHandle) -> bool`. The common case,
//! "status equals X", is built here.

use crate::resource::ResourceHandle;

/// Case-insensitive status equality check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPredicate {
    target: String,
}

impl StatusPredicate {
    /// Create predicate for a target status
    pub fn new(target: impl AsRef<str>) -> Self {
        Self {
            target: target.as_ref().to_lowercase(),
        }
    }

    /// Normalized target status
    #[inline]
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Check a handle; an absent status is never a match
    #[must_use]
    pub fn matches(&self, handle: &ResourceHandle) -> bool {
        handle
            .status()
            .is_some_and(|status| status.to_lowercase() == self.target)
    }
}

/// Build a readiness check for `target` status
pub fn resource_is(target: impl AsRef<str>) -> impl Fn(&ResourceHandle) -> bool + Clone + Send + Sync {
    let predicate = StatusPredicate::new(target);
    move |handle| predicate.matches(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn matches_ignoring_case() {
        let is_active = resource_is("active");
        assert!(is_active(&ResourceHandle::new("a").with_status("ACTIVE")));
        assert!(is_active(&ResourceHandle::new("a").with_status("Active")));
        assert!(!is_active(&ResourceHandle::new("a").with_status("saving")));
    }

    #[test]
    fn missing_status_is_not_ready() {
        let predicate = StatusPredicate::new("active");
        assert!(!predicate.matches(&ResourceHandle::new("a")));
    }

    #[test]
    fn target_is_normalized() {
        assert_eq!(StatusPredicate::new("AcTiVe").target(), "active");
    }

    proptest! {
        #[test]
        fn prop_case_never_changes_the_answer(status in "[a-zA-Z_]{1,12}", target in "[a-zA-Z_]{1,12}") {
            let upper = ResourceHandle::new("r").with_status(status.to_uppercase());
            let lower = ResourceHandle::new("r").with_status(status.to_lowercase());
            let predicate = StatusPredicate::new(&target);

            prop_assert_eq!(predicate.matches(&upper), predicate.matches(&lower));
            prop_assert_eq!(
                predicate.matches(&lower),
                status.to_lowercase() == target.to_lowercase()
            );
        }
    }
}
