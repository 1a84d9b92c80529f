use crate::keys;
use async_trait::async_trait;
use jiff::Timestamp;
use snip_core::{
    Fingerprint, KvBackend, LinkDetail, ShortCode, ShortenParams, Shortener, ShortenerError,
    StorageError,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

type Result<T> = std::result::Result<T, ShortenerError>;

/// The link store: a concrete implementation of the `Shortener` trait.
///
/// A shortening event owns four records in the backend: the counter bump, the
/// forward mapping, the fingerprint (dedup) mapping and the detail record. The
/// three mappings are written with the same time-to-live so that they expire
/// together.
///
/// The store keeps no mutable state of its own. Uniqueness of minted codes
/// rests entirely on the backend's atomic `incr`, so any number of callers may
/// share one store (or several stores may share one backend).
///
/// Note: writes are not rolled back. If one of the three writes fails the
/// error is returned and whatever was written expires with its ttl.
#[derive(Debug)]
pub struct LinkStore<B> {
    backend: Arc<B>,
}

impl<B> Clone for LinkStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: KvBackend> LinkStore<B> {
    /// Creates a new `LinkStore` on top of `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Looks up the code a previous shortening of the same URL left behind.
    ///
    /// An absent key and an empty value both mean "mint a new code".
    async fn existing_code(&self, hash_key: &str) -> Result<Option<ShortCode>> {
        match self.backend.get(hash_key).await? {
            None => Ok(None),
            Some(value) if value.is_empty() => {
                trace!(key = hash_key, "ignoring empty dedup entry");
                Ok(None)
            }
            Some(value) => ShortCode::parse(value).map(Some).map_err(|e| {
                StorageError::InvalidData(format!("dedup entry '{hash_key}': {e}")).into()
            }),
        }
    }

    async fn write(
        &self,
        code: &ShortCode,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<()> {
        self.backend.set(key, value, ttl).await.map_err(|e| {
            warn!(
                code = %code,
                key,
                error = %e,
                "write failed, records of this short code may be incomplete until they expire"
            );
            ShortenerError::from(e)
        })
    }
}

#[async_trait]
impl<B: KvBackend> Shortener for LinkStore<B> {
    async fn shorten(&self, params: ShortenParams) -> Result<ShortCode> {
        let ShortenParams {
            original_url,
            expiration,
        } = params;

        if original_url.is_empty() {
            return Err(ShortenerError::InvalidInput(
                "URL cannot be empty".to_string(),
            ));
        }
        expiration.validate()?;

        let fingerprint = Fingerprint::of(&original_url);
        let hash_key = keys::url_hash_key(&fingerprint);

        if let Some(code) = self.existing_code(&hash_key).await? {
            debug!(code = %code, "URL already shortened, reusing short code");
            return Ok(code);
        }

        let id = self.backend.incr(keys::URL_ID_KEY).await?;
        let code = ShortCode::from_id(id);
        let ttl = expiration.ttl();

        let detail = LinkDetail {
            url: original_url.clone(),
            created_at: Timestamp::now(),
            expiration_in_minutes: expiration.as_minutes(),
        };
        let detail = serde_json::to_string(&detail).map_err(|e| {
            StorageError::InvalidData(format!("failed to serialize detail record: {e}"))
        })?;

        self.write(&code, &keys::short_link_key(&code), &original_url, ttl)
            .await?;
        self.write(&code, &hash_key, code.as_str(), ttl).await?;
        self.write(&code, &keys::short_link_detail_key(&code), &detail, ttl)
            .await?;

        info!(
            code = %code,
            expiration_in_minutes = expiration.as_minutes(),
            "minted short code"
        );
        Ok(code)
    }

    async fn resolve(&self, code: &ShortCode) -> Result<String> {
        trace!(code = %code, "resolving short code");

        match self.backend.get(&keys::short_link_key(code)).await? {
            Some(url) => {
                debug!(code = %code, url = %url, "resolved short code");
                Ok(url)
            }
            None => {
                debug!(code = %code, "short code not found");
                Err(ShortenerError::NotFound(code.to_string()))
            }
        }
    }

    async fn info(&self, code: &ShortCode) -> Result<LinkDetail> {
        trace!(code = %code, "fetching detail record");

        let Some(raw) = self.backend.get(&keys::short_link_detail_key(code)).await? else {
            debug!(code = %code, "detail record not found");
            return Err(ShortenerError::NotFound(code.to_string()));
        };

        serde_json::from_str::<LinkDetail>(&raw).map_err(|e| {
            warn!(code = %code, error = %e, "failed to deserialize detail record");
            StorageError::InvalidData(format!("invalid detail record for '{code}': {e}")).into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;
    use snip_storage::{InMemoryBackend, ManualClock};
    use std::collections::HashSet;

    fn test_store() -> (LinkStore<InMemoryBackend<ManualClock>>, ManualClock) {
        let clock = ManualClock::new(Timestamp::now());
        let store = LinkStore::new(InMemoryBackend::with_clock(clock.clone()));
        (store, clock)
    }

    async fn counter(store: &LinkStore<InMemoryBackend<ManualClock>>) -> Option<String> {
        store.backend().get(keys::URL_ID_KEY).await.unwrap()
    }

    #[tokio::test]
    async fn first_shorten_mints_one_and_resolves() {
        let (store, _) = test_store();

        let code = store
            .shorten(ShortenParams::new("https://example.com", 60))
            .await
            .unwrap();
        assert_eq!(code.as_str(), "1");

        let url = store.resolve(&code).await.unwrap();
        assert_eq!(url, "https://example.com");
    }

    #[tokio::test]
    async fn shorten_same_url_is_idempotent() {
        let (store, _) = test_store();

        let first = store
            .shorten(ShortenParams::new("https://example.com", 60))
            .await
            .unwrap();
        let second = store
            .shorten(ShortenParams::new("https://example.com", 60))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(second.as_str(), "1");
        assert_eq!(counter(&store).await.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn distinct_urls_get_distinct_codes() {
        let (store, _) = test_store();

        let a = store
            .shorten(ShortenParams::new("https://example.com/a", 0))
            .await
            .unwrap();
        let b = store
            .shorten(ShortenParams::new("https://example.com/b", 0))
            .await
            .unwrap();

        assert_ne!(a, b);
        assert_eq!(store.resolve(&a).await.unwrap(), "https://example.com/a");
        assert_eq!(store.resolve(&b).await.unwrap(), "https://example.com/b");
    }

    #[tokio::test]
    async fn info_reflects_request() {
        let (store, _) = test_store();
        let before = Timestamp::now();

        let code = store
            .shorten(ShortenParams::new("https://example.com", 90))
            .await
            .unwrap();
        let detail = store.info(&code).await.unwrap();

        assert_eq!(detail.url, "https://example.com");
        assert_eq!(detail.expiration_in_minutes, 90);
        assert!(detail.created_at >= before);
    }

    #[tokio::test]
    async fn all_records_are_written_with_the_same_key_layout() {
        let (store, _) = test_store();

        let code = store
            .shorten(ShortenParams::new("https://example.com", 5))
            .await
            .unwrap();
        let backend = store.backend();

        let hash_key = keys::url_hash_key(&Fingerprint::of("https://example.com"));
        assert_eq!(
            backend.get("shortLink:1:url").await.unwrap().as_deref(),
            Some("https://example.com")
        );
        assert_eq!(backend.get(&hash_key).await.unwrap().as_deref(), Some("1"));
        assert!(backend.get("shortLink:1:detail").await.unwrap().is_some());
        assert_eq!(code.as_str(), "1");
    }

    #[tokio::test]
    async fn resolve_unknown_code_is_not_found() {
        let (store, _) = test_store();
        let code = ShortCode::parse("unknown").unwrap();

        let err = store.resolve(&code).await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(_)));

        let err = store.info(&code).await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(_)));
    }

    #[tokio::test]
    async fn expired_code_is_not_found() {
        let (store, clock) = test_store();

        let code = store
            .shorten(ShortenParams::new("https://example.com", 60))
            .await
            .unwrap();

        clock.advance(SignedDuration::from_mins(59));
        assert!(store.resolve(&code).await.is_ok());

        clock.advance(SignedDuration::from_mins(1));
        assert!(matches!(
            store.resolve(&code).await.unwrap_err(),
            ShortenerError::NotFound(_)
        ));
        assert!(matches!(
            store.info(&code).await.unwrap_err(),
            ShortenerError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn dedup_entry_expires_with_the_link() {
        let (store, clock) = test_store();

        let first = store
            .shorten(ShortenParams::new("https://example.com", 1))
            .await
            .unwrap();
        clock.advance(SignedDuration::from_mins(1));

        let second = store
            .shorten(ShortenParams::new("https://example.com", 1))
            .await
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(store.resolve(&second).await.unwrap(), "https://example.com");
    }

    #[tokio::test]
    async fn zero_ttl_never_expires() {
        let (store, clock) = test_store();

        let code = store
            .shorten(ShortenParams::new("https://example.com", 0))
            .await
            .unwrap();
        clock.advance(SignedDuration::from_hours(24 * 365 * 10));

        assert_eq!(store.resolve(&code).await.unwrap(), "https://example.com");
        assert_eq!(store.info(&code).await.unwrap().expiration_in_minutes, 0);
    }

    #[tokio::test]
    async fn empty_url_is_rejected_before_any_backend_call() {
        let (store, _) = test_store();

        let err = store.shorten(ShortenParams::new("", 10)).await.unwrap_err();

        assert!(matches!(err, ShortenerError::InvalidInput(_)));
        assert!(store.backend().is_empty());
    }

    #[tokio::test]
    async fn oversized_expiration_is_rejected_without_consuming_an_id() {
        let (store, _) = test_store();

        let err = store
            .shorten(ShortenParams::new("https://example.com", 10_000_000_000))
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidInput(_)));
        assert_eq!(counter(&store).await, None);

        let code = store
            .shorten(ShortenParams::new(
                "https://example.com",
                snip_core::MAX_EXPIRATION_MINUTES,
            ))
            .await
            .unwrap();
        assert_eq!(code.as_str(), "1");
    }

    #[tokio::test]
    async fn empty_dedup_entry_mints_new_code() {
        let (store, _) = test_store();
        let hash_key = keys::url_hash_key(&Fingerprint::of("https://example.com"));
        store.backend().set(&hash_key, "", None).await.unwrap();

        let code = store
            .shorten(ShortenParams::new("https://example.com", 0))
            .await
            .unwrap();

        assert_eq!(code.as_str(), "1");
        assert_eq!(
            store.backend().get(&hash_key).await.unwrap().as_deref(),
            Some("1")
        );
    }

    #[tokio::test]
    async fn corrupt_dedup_entry_is_a_backend_error() {
        let (store, _) = test_store();
        let hash_key = keys::url_hash_key(&Fingerprint::of("https://example.com"));
        store.backend().set(&hash_key, "{}", None).await.unwrap();

        let err = store
            .shorten(ShortenParams::new("https://example.com", 0))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShortenerError::Backend(StorageError::InvalidData(_))
        ));
        assert!(counter(&store).await.is_none());
    }

    #[tokio::test]
    async fn corrupt_detail_record_is_a_backend_error() {
        let (store, _) = test_store();
        store
            .backend()
            .set("shortLink:1:detail", "not json", None)
            .await
            .unwrap();

        let err = store
            .info(&ShortCode::from_id(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShortenerError::Backend(StorageError::InvalidData(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_shortens_mint_distinct_codes() {
        let (store, _) = test_store();
        let mut handles = vec![];

        for i in 0..100 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .shorten(ShortenParams::new(format!("https://example.com/{i}"), 10))
                    .await
                    .unwrap()
            }));
        }

        let mut codes = HashSet::new();
        for handle in handles {
            assert!(codes.insert(handle.await.unwrap()));
        }

        assert_eq!(codes.len(), 100);
        assert_eq!(counter(&store).await.as_deref(), Some("100"));
        let ids: HashSet<u64> = codes.iter().map(ShortCode::id).collect();
        assert_eq!(ids, (1..=100).collect());
    }

    /// Wraps the in-memory backend and fails selected operations.
    struct FailingBackend {
        inner: InMemoryBackend,
        fail_incr: bool,
        fail_set_on: Option<&'static str>,
    }

    impl FailingBackend {
        fn new() -> Self {
            Self {
                inner: InMemoryBackend::new(),
                fail_incr: false,
                fail_set_on: None,
            }
        }
    }

    #[async_trait]
    impl KvBackend for FailingBackend {
        async fn get(&self, key: &str) -> snip_core::backend::Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(
            &self,
            key: &str,
            value: &str,
            ttl: Option<Duration>,
        ) -> snip_core::backend::Result<()> {
            if self.fail_set_on.is_some_and(|suffix| key.ends_with(suffix)) {
                return Err(StorageError::Unavailable("connection reset".to_string()));
            }
            self.inner.set(key, value, ttl).await
        }

        async fn incr(&self, key: &str) -> snip_core::backend::Result<u64> {
            if self.fail_incr {
                return Err(StorageError::Timeout("incr timed out".to_string()));
            }
            self.inner.incr(key).await
        }
    }

    #[tokio::test]
    async fn failed_increment_aborts_without_writes() {
        let store = LinkStore::new(FailingBackend {
            fail_incr: true,
            ..FailingBackend::new()
        });

        let err = store
            .shorten(ShortenParams::new("https://example.com", 10))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShortenerError::Backend(StorageError::Timeout(_))
        ));
        assert!(store.backend().inner.is_empty());
    }

    #[tokio::test]
    async fn failed_detail_write_is_reported_without_rollback() {
        let store = LinkStore::new(FailingBackend {
            fail_set_on: Some(":detail"),
            ..FailingBackend::new()
        });

        let err = store
            .shorten(ShortenParams::new("https://example.com", 10))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShortenerError::Backend(StorageError::Unavailable(_))
        ));
        // forward mapping stays until its ttl elapses
        assert_eq!(
            store
                .backend()
                .inner
                .get("shortLink:1:url")
                .await
                .unwrap()
                .as_deref(),
            Some("https://example.com")
        );
    }
}
