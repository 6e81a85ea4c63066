use crate::cache::Cache;
use crate::model::{AdvisoryQueryResult, AdvisoryRecord};
use async_trait::async_trait;

/// Wraps an advisory source with the on-disk [`Cache`].
///
/// Only confirmed lookups are stored. A warning or an inconclusive answer
/// (rate limit, server error, unreadable body) is passed through untouched
/// so the next run asks the source again.
pub struct CachedAdvisorySource<S> {
    inner: S,
    cache: Cache,
}

impl<S: super::AdvisorySource> CachedAdvisorySource<S> {
    pub fn new(inner: S, cache: Cache) -> Self {
        Self { inner, cache }
    }

    fn cache_key(name: &str, version: &str) -> String {
        format!("advisories_{}@{}", name, version)
    }
}

#[async_trait]
impl<S: super::AdvisorySource> super::AdvisorySource for CachedAdvisorySource<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn query(&self, name: &str, version: &str) -> AdvisoryQueryResult {
        let key = Self::cache_key(name, version);

        if let Some(advisories) = self.cache.get::<Vec<AdvisoryRecord>>(&key) {
            return AdvisoryQueryResult::found(advisories);
        }

        let result = self.inner.query(name, version).await;

        if result.confirmed {
            if let Err(e) = self.cache.set(&key, &result.advisories) {
                tracing::debug!(error = %e, key = %key, "failed to write advisory cache");
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{AdvisorySource, GitHubAdvisoryClient, HttpResponse, HttpTransport};
    use crate::error::TransportError;
    use crate::logger::testing::RecordingLogger;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct CountingSource {
        calls: AtomicUsize,
        result: AdvisoryQueryResult,
    }

    #[async_trait]
    impl AdvisorySource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn query(&self, _name: &str, _version: &str) -> AdvisoryQueryResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn cached(
        result: AdvisoryQueryResult,
    ) -> (tempfile::TempDir, CachedAdvisorySource<CountingSource>) {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::with_dir(dir.path(), Duration::from_secs(3600));
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            result,
        };
        (dir, CachedAdvisorySource::new(source, cache))
    }

    #[tokio::test]
    async fn test_clean_result_is_served_from_cache() {
        let advisories = vec![AdvisoryRecord::new("high", "XSS")];
        let (_dir, source) = cached(AdvisoryQueryResult::found(advisories.clone()));

        let first = source.query("jquery", "1.12.4").await;
        let second = source.query("jquery", "1.12.4").await;

        assert_eq!(first.advisories, advisories);
        assert_eq!(second.advisories, advisories);
        assert!(!second.has_warning());
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_warning_result_is_not_cached() {
        let (_dir, source) = cached(AdvisoryQueryResult::unavailable(
            "Warning: Request to the GitHub Advisory API timed out.",
        ));

        let first = source.query("jquery", "1.12.4").await;
        let second = source.query("jquery", "1.12.4").await;

        assert!(first.has_warning());
        assert!(second.has_warning());
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_versions_are_cached_separately() {
        let (_dir, source) = cached(AdvisoryQueryResult::found(Vec::new()));

        source.query("jquery", "1.12.4").await;
        source.query("jquery", "3.7.1").await;
        source.query("jquery", "3.7.1").await;

        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_inconclusive_result_is_not_cached() {
        let (_dir, source) = cached(AdvisoryQueryResult::inconclusive());

        let first = source.query("jquery", "1.12.4").await;
        source.query("jquery", "1.12.4").await;

        assert!(!first.confirmed);
        assert!(!first.has_warning());
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 2);
    }

    /// Replies with each scripted response in turn.
    struct SequenceTransport {
        replies: Mutex<VecDeque<HttpResponse>>,
    }

    #[async_trait]
    impl HttpTransport for SequenceTransport {
        async fn get(&self, _url: &str) -> Result<HttpResponse, TransportError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| TransportError::Other("no scripted reply left".to_string()))
        }
    }

    #[tokio::test]
    async fn test_rate_limited_lookup_does_not_hide_later_advisories() {
        let dir = tempfile::tempdir().unwrap();
        let transport = SequenceTransport {
            replies: Mutex::new(VecDeque::from([
                HttpResponse {
                    status: 429,
                    body: String::new(),
                },
                HttpResponse {
                    status: 200,
                    body: r#"[{"severity":"high","description":"XSS in htmlPrefilter"}]"#
                        .to_string(),
                },
            ])),
        };
        let client = GitHubAdvisoryClient::with_transport(
            transport,
            "https://api.github.com/advisories",
            RecordingLogger::new(),
        );
        let source = CachedAdvisorySource::new(
            client,
            Cache::with_dir(dir.path(), Duration::from_secs(3600)),
        );

        let rate_limited = source.query("jquery", "1.12.4").await;
        let answered = source.query("jquery", "1.12.4").await;
        let cached = source.query("jquery", "1.12.4").await;

        assert!(rate_limited.advisories.is_empty());
        assert!(!rate_limited.confirmed);
        assert_eq!(answered.advisories.len(), 1);
        assert_eq!(cached.advisories, answered.advisories);
        assert!(cached.confirmed);
    }
}
