#![forbid(unsafe_code)]

//! Registry and link configuration.

/// What happens to an owner's callbacks when the owner is cloned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClonePolicy {
    /// The clone starts with empty observer and validator lists.
    #[default]
    Reset,
    /// The clone gets copies of the lists. Closures are shared, not
    /// duplicated, so captured state is common to both owners.
    Share,
}

/// Echo handling for linked properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkMode {
    /// Every source change is assigned to the target, even when the target
    /// already holds the value. A two-way link re-assigns the source once
    /// per change.
    #[default]
    Always,
    /// Assignments whose validated value equals the stored one are dropped
    /// without notifying observers. Suppresses the two-way echo.
    SkipUnchanged,
}

/// Configuration for a [`Registry`](crate::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryConfig {
    /// Behaviour of `Clone` on the registry (and thus on its owner).
    pub clone_policy: ClonePolicy,
}

impl RegistryConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the clone policy.
    #[must_use]
    pub fn with_clone_policy(mut self, policy: ClonePolicy) -> Self {
        self.clone_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative() {
        let config = RegistryConfig::default();
        assert_eq!(config.clone_policy, ClonePolicy::Reset);
        assert_eq!(LinkMode::default(), LinkMode::Always);
    }

    #[test]
    fn builder_sets_policy() {
        let config = RegistryConfig::new().with_clone_policy(ClonePolicy::Share);
        assert_eq!(config.clone_policy, ClonePolicy::Share);
    }
}
