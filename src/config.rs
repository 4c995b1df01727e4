use std::time::Duration;

/// What name generation does with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExceptionHandlingStrategy {
    /// Return the error to the caller.
    Throw,
    /// Log the error and return `None`.
    #[default]
    Catch,
}

/// Configuration for [`MarketCacheProvider`](crate::cache::MarketCacheProvider) and the name
/// providers built on top of it.
// Not implementing `Copy` as it holds the culture list.
#[derive(Debug, Clone)]
pub struct MarketCacheConfig {
    /// Cultures loaded eagerly by the list caches. Other cultures are loaded on first request and
    /// refreshed from then on.
    ///
    /// Defaults to [`MarketCacheConfig::DEFAULT_CULTURE`].
    pub cultures: Vec<String>,
    /// Interval between full refreshes of the invariant and variant list caches.
    ///
    /// Defaults to [`MarketCacheConfig::DEFAULT_REFRESH_INTERVAL`].
    pub refresh_interval: Duration,
    /// Randomized duration subtracted from `refresh_interval`, so that many instances do not
    /// refresh in lockstep.
    ///
    /// Defaults to [`MarketCacheConfig::DEFAULT_REFRESH_JITTER`].
    pub refresh_jitter: Duration,
    /// Defaults to [`ExceptionHandlingStrategy::Catch`].
    pub exception_handling_strategy: ExceptionHandlingStrategy,
}

impl MarketCacheConfig {
    /// Default value for [`MarketCacheConfig::cultures`].
    pub const DEFAULT_CULTURE: &'static str = "en";
    /// Default value for [`MarketCacheConfig::refresh_interval`].
    pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);
    /// Default value for [`MarketCacheConfig::refresh_jitter`].
    pub const DEFAULT_REFRESH_JITTER: Duration = Duration::from_secs(30);

    /// Create a new `MarketCacheConfig` using default configuration.
    pub fn new() -> MarketCacheConfig {
        MarketCacheConfig::default()
    }

    pub fn with_cultures<S: Into<String>>(
        mut self,
        cultures: impl IntoIterator<Item = S>,
    ) -> MarketCacheConfig {
        self.cultures = cultures.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> MarketCacheConfig {
        self.refresh_interval = interval;
        self
    }

    pub fn with_refresh_jitter(mut self, jitter: Duration) -> MarketCacheConfig {
        self.refresh_jitter = jitter;
        self
    }

    pub fn with_exception_handling_strategy(
        mut self,
        strategy: ExceptionHandlingStrategy,
    ) -> MarketCacheConfig {
        self.exception_handling_strategy = strategy;
        self
    }
}

impl Default for MarketCacheConfig {
    fn default() -> MarketCacheConfig {
        MarketCacheConfig {
            cultures: vec![MarketCacheConfig::DEFAULT_CULTURE.to_owned()],
            refresh_interval: MarketCacheConfig::DEFAULT_REFRESH_INTERVAL,
            refresh_jitter: MarketCacheConfig::DEFAULT_REFRESH_JITTER,
            exception_handling_strategy: ExceptionHandlingStrategy::default(),
        }
    }
}
