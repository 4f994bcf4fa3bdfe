//! Content Loader
//!
//! Cache-first loading of localized content. Misses go to the
//! `ContentSource` with exponential backoff; when every attempt fails the
//! bundled table is served instead. Fallback content is never cached, so
//! the next request tries the network again.

use super::cache::{CacheConfig, CacheStats, ContentCache};
use super::error::ContentError;
use super::fallback::bundled_content;
use super::types::{ContentKey, ContentType, Language, LocalizedContent};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Where localized content comes from
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch all content of one type in one language
    async fn fetch_content(
        &self,
        content_type: ContentType,
        language: Language,
    ) -> Result<Vec<LocalizedContent>, ContentError>;
}

/// Exponential backoff settings
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based): base * multiplier^(retry-1), capped
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1) as i32;
        let delay = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        // NaN and negative products collapse to zero
        Duration::from_secs_f64(delay.max(0.0).min(self.max_delay.as_secs_f64()))
    }
}

/// Loader settings
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub cache: CacheConfig,
    pub retry: RetryPolicy,
    /// Serve bundled translations when the source keeps failing
    pub use_fallback: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            retry: RetryPolicy::default(),
            use_fallback: true,
        }
    }
}

/// How a load was satisfied
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentOrigin {
    Cache,
    Network,
    Fallback,
}

/// Result of a content load
#[derive(Debug, Clone)]
pub struct LoadedContent {
    pub items: Arc<Vec<LocalizedContent>>,
    pub origin: ContentOrigin,
}

impl LoadedContent {
    pub fn find(&self, content_id: &str) -> Option<&LocalizedContent> {
        self.items.iter().find(|c| c.content_id == content_id)
    }
}

/// Outcome of a preload run
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreloadReport {
    pub loaded: Vec<ContentKey>,
    pub fallback: Vec<ContentKey>,
    pub failed: Vec<ContentKey>,
}

/// Cache-first loader for localized content
pub struct ContentLoader {
    source: Arc<dyn ContentSource>,
    cache: RwLock<ContentCache<ContentKey, Vec<LocalizedContent>>>,
    config: LoaderConfig,
}

impl ContentLoader {
    pub fn new(source: Arc<dyn ContentSource>, config: LoaderConfig) -> Self {
        Self {
            source,
            cache: RwLock::new(ContentCache::new(config.cache.clone())),
            config,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load all content of a type in a language
    pub async fn load_content_by_type(
        &self,
        content_type: ContentType,
        language: Language,
    ) -> Result<LoadedContent, ContentError> {
        let key = ContentKey::new(content_type, language);

        if let Some(items) = self.cache.write().await.get(&key) {
            tracing::trace!(key = %key, "Content cache hit");
            return Ok(LoadedContent {
                items,
                origin: ContentOrigin::Cache,
            });
        }

        match self.fetch_with_retry(content_type, language).await {
            Ok(items) => {
                let active: Vec<LocalizedContent> =
                    items.into_iter().filter(|c| c.is_active).collect();
                tracing::debug!(key = %key, items = active.len(), "Loaded content from source");

                let items = self.cache.write().await.insert(key, active);
                Ok(LoadedContent {
                    items,
                    origin: ContentOrigin::Network,
                })
            }
            Err(e) => {
                let bundled = if self.config.use_fallback {
                    bundled_content(content_type, language)
                } else {
                    Vec::new()
                };

                if bundled.is_empty() {
                    tracing::error!(key = %key, error = %e, "Content unavailable");
                    return Err(e);
                }

                tracing::warn!(key = %key, error = %e, "Serving bundled content");
                Ok(LoadedContent {
                    items: Arc::new(bundled),
                    origin: ContentOrigin::Fallback,
                })
            }
        }
    }

    /// Load one content item by id
    pub async fn get_content(
        &self,
        content_type: ContentType,
        content_id: &str,
        language: Language,
    ) -> Result<Option<LocalizedContent>, ContentError> {
        let loaded = self.load_content_by_type(content_type, language).await?;
        Ok(loaded.find(content_id).cloned())
    }

    async fn fetch_with_retry(
        &self,
        content_type: ContentType,
        language: Language,
    ) -> Result<Vec<LocalizedContent>, ContentError> {
        let policy = &self.config.retry;
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.source.fetch_content(content_type, language).await {
                Ok(items) => return Ok(items),
                Err(e) if attempt >= max_attempts => return Err(e),
                Err(e) => {
                    let delay = policy.delay_for(attempt);
                    tracing::debug!(
                        content_type = %content_type,
                        language = %language,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Content fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Drop one cached (type, language) entry
    pub async fn invalidate(&self, content_type: ContentType, language: Language) -> bool {
        let removed = self
            .cache
            .write()
            .await
            .invalidate(&ContentKey::new(content_type, language));
        tracing::debug!(content_type = %content_type, language = %language, removed, "Invalidated content");
        removed
    }

    /// Drop every cached entry for a language
    pub async fn invalidate_language(&self, language: Language) -> usize {
        self.cache
            .write()
            .await
            .retain(|key| key.language != language)
    }

    /// Drop every cached entry for a content type
    pub async fn invalidate_type(&self, content_type: ContentType) -> usize {
        self.cache
            .write()
            .await
            .retain(|key| key.content_type != content_type)
    }

    /// Drop the whole cache
    pub async fn clear(&self) {
        self.cache.write().await.clear();
        tracing::info!("Content cache cleared");
    }

    /// Warm the cache for the given pairs concurrently
    pub async fn preload(&self, keys: &[ContentKey]) -> PreloadReport {
        let loads = keys.iter().map(|key| async move {
            let result = self
                .load_content_by_type(key.content_type, key.language)
                .await;
            (*key, result)
        });

        let mut report = PreloadReport::default();
        for (key, result) in futures_util::future::join_all(loads).await {
            match result {
                Ok(loaded) if loaded.origin == ContentOrigin::Fallback => report.fallback.push(key),
                Ok(_) => report.loaded.push(key),
                Err(_) => report.failed.push(key),
            }
        }

        tracing::info!(
            loaded = report.loaded.len(),
            fallback = report.fallback.len(),
            failed = report.failed.len(),
            "Content preload finished"
        );
        report
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Source that fails a fixed number of times before succeeding
    struct FlakySource {
        calls: AtomicU32,
        failures_before_success: u32,
    }

    impl FlakySource {
        fn new(failures_before_success: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                failures_before_success,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContentSource for FlakySource {
        async fn fetch_content(
            &self,
            content_type: ContentType,
            language: Language,
        ) -> Result<Vec<LocalizedContent>, ContentError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                return Err(ContentError::Invalid("backend down".to_string()));
            }
            Ok(vec![
                LocalizedContent::new(content_type, "survey.next", language, "Continue"),
                LocalizedContent {
                    is_active: false,
                    ..LocalizedContent::new(content_type, "retired", language, "Old")
                },
            ])
        }
    }

    fn loader(source: Arc<FlakySource>) -> ContentLoader {
        ContentLoader::new(source, LoaderConfig::default())
    }

    #[test]
    fn test_retry_delays() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for(5), Duration::from_secs(10));

        let shrinking = RetryPolicy {
            multiplier: -3.0,
            ..RetryPolicy::default()
        };
        assert_eq!(shrinking.delay_for(2), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_skips_source() {
        let source = Arc::new(FlakySource::new(0));
        let loader = loader(Arc::clone(&source));

        let first = loader
            .load_content_by_type(ContentType::Ui, Language::En)
            .await
            .unwrap();
        assert_eq!(first.origin, ContentOrigin::Network);
        // Inactive items are dropped
        assert_eq!(first.items.len(), 1);

        let second = loader
            .load_content_by_type(ContentType::Ui, Language::En)
            .await
            .unwrap();
        assert_eq!(second.origin, ContentOrigin::Cache);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_after_ttl() {
        let source = Arc::new(FlakySource::new(0));
        let loader = loader(Arc::clone(&source));

        loader
            .load_content_by_type(ContentType::Ui, Language::Ar)
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(5 * 60 + 1)).await;

        let again = loader
            .load_content_by_type(ContentType::Ui, Language::Ar)
            .await
            .unwrap();
        assert_eq!(again.origin, ContentOrigin::Network);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_then_success() {
        let source = Arc::new(FlakySource::new(2));
        let loader = loader(Arc::clone(&source));

        let start = tokio::time::Instant::now();
        let loaded = loader
            .load_content_by_type(ContentType::Question, Language::En)
            .await
            .unwrap();

        assert_eq!(loaded.origin, ContentOrigin::Network);
        assert_eq!(source.calls(), 3);
        // 1s + 2s of backoff
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_after_exhausting_retries() {
        let source = Arc::new(FlakySource::new(u32::MAX));
        let loader = loader(Arc::clone(&source));

        let loaded = loader
            .load_content_by_type(ContentType::Ui, Language::Ar)
            .await
            .unwrap();
        assert_eq!(loaded.origin, ContentOrigin::Fallback);
        assert_eq!(loaded.find("survey.next").unwrap().text, "التالي");
        assert_eq!(source.calls(), 3);

        // Fallback is not cached
        loader
            .load_content_by_type(ContentType::Ui, Language::Ar)
            .await
            .unwrap();
        assert_eq!(source.calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_when_nothing_bundled() {
        let source = Arc::new(FlakySource::new(u32::MAX));
        let loader = loader(source);

        let result = loader
            .load_content_by_type(ContentType::Recommendation, Language::En)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_and_clear() {
        let source = Arc::new(FlakySource::new(0));
        let loader = loader(Arc::clone(&source));

        let keys = [
            ContentKey::new(ContentType::Ui, Language::En),
            ContentKey::new(ContentType::Ui, Language::Ar),
            ContentKey::new(ContentType::Pillar, Language::Ar),
        ];
        let report = loader.preload(&keys).await;
        assert_eq!(report.loaded.len(), 3);
        assert_eq!(loader.stats().await.entries, 3);

        assert!(loader.invalidate(ContentType::Ui, Language::En).await);
        assert_eq!(loader.invalidate_language(Language::Ar).await, 2);
        assert_eq!(loader.stats().await.entries, 0);

        loader.preload(&keys).await;
        assert_eq!(loader.invalidate_type(ContentType::Ui).await, 2);
        loader.clear().await;
        assert_eq!(loader.stats().await.entries, 0);
        assert_eq!(source.calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_content() {
        let source = Arc::new(FlakySource::new(0));
        let loader = loader(source);

        let item = loader
            .get_content(ContentType::Ui, "survey.next", Language::En)
            .await
            .unwrap();
        assert_eq!(item.unwrap().text, "Continue");

        let missing = loader
            .get_content(ContentType::Ui, "retired", Language::En)
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
