//! Per-culture storage for catalogs that the provider only serves as full lists.
use std::{
    collections::{BTreeSet, HashMap},
    hash::Hash,
    sync::{Arc, Mutex, RwLock, Weak},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    refresher::{Refresh, RefreshTask, RefreshTaskConfig},
    CacheError,
};
use crate::{
    config::MarketCacheConfig,
    fetcher::{FetchError, MarketDescriptionFetcher},
};

/// An item of a list catalog.
#[async_trait]
pub(crate) trait CatalogEntry: Clone + Send + Sync + 'static {
    type Key: Eq + Hash + Clone + Send + Sync + 'static;

    /// Name used in logs.
    const CATALOG: &'static str;

    fn key(&self) -> Self::Key;

    /// Add names of another culture of the same item.
    fn merge(&mut self, other: Self);

    /// Fetch the full catalog in one culture.
    async fn fetch(
        fetcher: &dyn MarketDescriptionFetcher,
        culture: &str,
    ) -> Result<Vec<Self>, FetchError>;
}

/// Catalog contents in one culture. Immutable once stored, replaced completely on refresh.
struct CultureSnapshot<E: CatalogEntry> {
    fetched_at: DateTime<Utc>,
    items: HashMap<E::Key, E>,
}

/// Thread-safe storage of a list catalog.
///
/// Readers take a snapshot of the requested cultures and never observe a half-updated list. A
/// culture requested for the first time is fetched on demand and refreshed from then on.
pub(crate) struct CatalogCache<E: CatalogEntry> {
    fetcher: Arc<dyn MarketDescriptionFetcher>,
    /// Cultures loaded eagerly by the refresh task.
    cultures: Vec<String>,
    store: RwLock<HashMap<String, Arc<CultureSnapshot<E>>>>,
    /// Serializes fetches so that concurrent misses of the same culture fetch it once.
    load_lock: tokio::sync::Mutex<()>,
    refresh_task: Mutex<Option<RefreshTask>>,
}

impl<E: CatalogEntry> CatalogCache<E> {
    /// Create a cache without a refresh task. Cultures are only loaded on demand or by
    /// [`CatalogCache::reload`].
    pub fn new(fetcher: Arc<dyn MarketDescriptionFetcher>, cultures: Vec<String>) -> Self {
        CatalogCache {
            fetcher,
            cultures,
            store: RwLock::new(HashMap::new()),
            load_lock: tokio::sync::Mutex::new(()),
            refresh_task: Mutex::new(None),
        }
    }

    /// Create a cache and start its refresh task. The first refresh loads all configured cultures
    /// right away.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn start(fetcher: Arc<dyn MarketDescriptionFetcher>, config: &MarketCacheConfig) -> Arc<Self> {
        let cache = Arc::new(CatalogCache::new(fetcher, config.cultures.clone()));

        let target: Weak<dyn Refresh> = Arc::downgrade(&cache) as Weak<dyn Refresh>;
        let task = RefreshTask::start(
            target,
            RefreshTaskConfig {
                interval: config.refresh_interval,
                jitter: config.refresh_jitter,
            },
        );
        *cache.refresh_task_slot() = Some(task);

        cache
    }

    /// Get the item with `key` with names in all `cultures`. Missing cultures are fetched first.
    ///
    /// Returns `None` if the item is absent in any of the cultures.
    pub async fn get<S: AsRef<str> + Sync>(
        &self,
        key: &E::Key,
        cultures: &[S],
    ) -> Result<Option<E>, CacheError> {
        self.ensure_cultures(cultures).await?;

        let snapshots = {
            let store = self.read_store();
            cultures
                .iter()
                .map(|culture| store.get(culture.as_ref()).cloned())
                .collect::<Option<Vec<_>>>()
        };
        let Some(snapshots) = snapshots else {
            // A culture disappeared between load and read, which is only possible if it was
            // never loaded successfully.
            return Ok(None);
        };

        let mut result: Option<E> = None;
        for snapshot in snapshots {
            let Some(item) = snapshot.items.get(key) else {
                return Ok(None);
            };
            match &mut result {
                Some(result) => result.merge(item.clone()),
                None => result = Some(item.clone()),
            }
        }
        Ok(result)
    }

    /// Fetch every tracked culture again: the configured ones and all loaded on demand.
    ///
    /// All cultures are attempted. The error of the last failed culture is returned.
    pub async fn reload(&self) -> Result<(), CacheError> {
        let _guard = self.load_lock.lock().await;

        let mut result = Ok(());
        for culture in self.tracked_cultures() {
            if let Err(err) = self.load_culture(&culture).await {
                result = Err(err);
            }
        }
        result
    }

    /// Cultures currently held by the cache, sorted.
    pub fn loaded_cultures(&self) -> Vec<String> {
        let mut cultures: Vec<String> = self.read_store().keys().cloned().collect();
        cultures.sort();
        cultures
    }

    /// When `culture` was last fetched successfully.
    pub fn last_fetched(&self, culture: &str) -> Option<DateTime<Utc>> {
        self.read_store()
            .get(culture)
            .map(|snapshot| snapshot.fetched_at)
    }

    /// Stop the refresh task (if running) and wait for it to exit.
    pub async fn shutdown(&self) -> Result<(), CacheError> {
        let task = self.refresh_task_slot().take();
        match task {
            Some(task) => task.shutdown().await,
            None => Ok(()),
        }
    }

    async fn ensure_cultures<S: AsRef<str> + Sync>(&self, cultures: &[S]) -> Result<(), CacheError> {
        if self.missing_cultures(cultures).is_empty() {
            return Ok(());
        }

        let _guard = self.load_lock.lock().await;
        // Another caller may have loaded them while we were waiting.
        for culture in self.missing_cultures(cultures) {
            self.load_culture(&culture).await?;
        }
        Ok(())
    }

    fn missing_cultures<S: AsRef<str>>(&self, cultures: &[S]) -> Vec<String> {
        let store = self.read_store();
        cultures
            .iter()
            .map(AsRef::as_ref)
            .filter(|culture| !store.contains_key(*culture))
            .map(str::to_owned)
            .collect()
    }

    fn tracked_cultures(&self) -> BTreeSet<String> {
        let mut cultures: BTreeSet<String> = self.cultures.iter().cloned().collect();
        cultures.extend(self.read_store().keys().cloned());
        cultures
    }

    /// Fetch the full catalog in `culture` and swap it in. Callers must hold `load_lock`.
    async fn load_culture(&self, culture: &str) -> Result<(), CacheError> {
        log::debug!(target: "oddsfeed", culture, catalog = E::CATALOG; "fetching catalog");

        let entries = E::fetch(self.fetcher.as_ref(), culture)
            .await
            .map_err(|err| {
                log::warn!(target: "oddsfeed",
                           culture,
                           catalog = E::CATALOG;
                           "failed to fetch catalog: {err}");
                err
            })?;

        let mut items = HashMap::with_capacity(entries.len());
        for entry in entries {
            items.entry(entry.key()).or_insert(entry);
        }
        let count = items.len();

        let snapshot = Arc::new(CultureSnapshot {
            fetched_at: Utc::now(),
            items,
        });
        self.write_store().insert(culture.to_owned(), snapshot);

        log::debug!(target: "oddsfeed", culture, catalog = E::CATALOG, count; "catalog updated");
        Ok(())
    }

    fn read_store(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<CultureSnapshot<E>>>> {
        // Err() is possible only if the lock is poisoned (writer panicked while holding the lock),
        // which should never happen.
        self.store
            .read()
            .expect("thread holding catalog lock should not panic")
    }

    fn write_store(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<CultureSnapshot<E>>>> {
        self.store
            .write()
            .expect("thread holding catalog lock should not panic")
    }

    fn refresh_task_slot(&self) -> std::sync::MutexGuard<'_, Option<RefreshTask>> {
        self.refresh_task
            .lock()
            .expect("thread holding refresh task lock should not panic")
    }
}

#[async_trait]
impl<E: CatalogEntry> Refresh for CatalogCache<E> {
    fn name(&self) -> &'static str {
        E::CATALOG
    }

    async fn refresh(&self) {
        if let Err(err) = self.reload().await {
            log::warn!(target: "oddsfeed",
                       catalog = E::CATALOG;
                       "catalog refresh failed, keeping previous contents: {err}");
        }
    }
}
