use std::{fmt, sync::Arc};

use crate::merge::{DefaultMergeHandler, MergeHandler, MergeStrategy};

/// Settings for a [`crate::merge::MappingSetMerger`].
///
/// # Example
///
/// ```rust
/// use mapscope::merge::{MergeConfig, MergeStrategy};
///
/// let config = MergeConfig::builder()
///     .with_field_strategy(MergeStrategy::Loose)
///     .with_parallelism(4)
///     .build();
/// assert_eq!(config.field_strategy, MergeStrategy::Loose);
/// assert_eq!(config.method_strategy, MergeStrategy::Strict);
/// ```
#[derive(Clone)]
pub struct MergeConfig {
    /// Decides what every matched pair becomes
    pub handler: Arc<dyn MergeHandler>,
    /// How right fields are located
    pub field_strategy: MergeStrategy,
    /// How right methods are located
    pub method_strategy: MergeStrategy,
    /// Worker threads for top-level classes; zero or negative uses the pool default
    pub parallelism: isize,
}

impl MergeConfig {
    /// Start from the default configuration
    #[must_use]
    pub fn builder() -> MergeConfigBuilder {
        MergeConfigBuilder {
            config: MergeConfig::default(),
        }
    }

    /// Loose matching for both fields and methods
    #[must_use]
    pub fn loose() -> Self {
        MergeConfig {
            field_strategy: MergeStrategy::Loose,
            method_strategy: MergeStrategy::Loose,
            ..MergeConfig::default()
        }
    }

    /// The worker count to request, `None` for the pool default
    #[must_use]
    pub fn thread_count(&self) -> Option<usize> {
        usize::try_from(self.parallelism).ok().filter(|n| *n > 0)
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        MergeConfig {
            handler: Arc::new(DefaultMergeHandler),
            field_strategy: MergeStrategy::Strict,
            method_strategy: MergeStrategy::Strict,
            parallelism: -1,
        }
    }
}

impl fmt::Debug for MergeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeConfig")
            .field("field_strategy", &self.field_strategy)
            .field("method_strategy", &self.method_strategy)
            .field("parallelism", &self.parallelism)
            .finish_non_exhaustive()
    }
}

/// Builder for [`MergeConfig`]
#[derive(Debug, Clone)]
pub struct MergeConfigBuilder {
    config: MergeConfig,
}

impl MergeConfigBuilder {
    /// Use a custom handler
    #[must_use]
    pub fn with_handler(mut self, handler: impl MergeHandler + 'static) -> Self {
        self.config.handler = Arc::new(handler);
        self
    }

    /// Use an already shared handler
    #[must_use]
    pub fn with_shared_handler(mut self, handler: Arc<dyn MergeHandler>) -> Self {
        self.config.handler = handler;
        self
    }

    /// Set the field matching strategy
    #[must_use]
    pub fn with_field_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.config.field_strategy = strategy;
        self
    }

    /// Set the method matching strategy
    #[must_use]
    pub fn with_method_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.config.method_strategy = strategy;
        self
    }

    /// Set the number of worker threads; zero or negative uses the pool default
    #[must_use]
    pub fn with_parallelism(mut self, parallelism: isize) -> Self {
        self.config.parallelism = parallelism;
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> MergeConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_count() {
        assert_eq!(MergeConfig::default().thread_count(), None);
        assert_eq!(MergeConfig::builder().with_parallelism(0).build().thread_count(), None);
        assert_eq!(MergeConfig::builder().with_parallelism(3).build().thread_count(), Some(3));
    }

    #[test]
    fn test_loose_preset() {
        let config = MergeConfig::loose();
        assert_eq!(config.field_strategy, MergeStrategy::Loose);
        assert_eq!(config.method_strategy, MergeStrategy::Loose);
        assert_eq!(config.parallelism, -1);
    }
}
