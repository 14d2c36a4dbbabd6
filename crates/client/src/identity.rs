use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use lru::LruCache;

use slack_protocol::{SlackError, UserInfo};

use crate::port::{RawUser, SlackPort};

const DEFAULT_CACHE_CAPACITY: usize = 1024;
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(900);

struct CachedIdentity {
    user: UserInfo,
    resolved_at: Instant,
}

/// Resolves user ids to display identities through the directory port.
///
/// Results are cached in a bounded LRU with a TTL so renamed or deleted
/// users eventually refresh. The cache is shared by all concurrent tool
/// invocations; the lock is never held across an await, so a cancelled
/// in-flight resolution simply never populates its entry.
pub struct IdentityResolver {
    port: Arc<dyn SlackPort>,
    cache: Mutex<LruCache<String, CachedIdentity>>,
    ttl: Duration,
}

impl IdentityResolver {
    pub fn new(port: Arc<dyn SlackPort>) -> Self {
        Self::with_cache(port, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }

    pub fn with_cache(port: Arc<dyn SlackPort>, capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            port,
            cache: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Resolves a user id to an identity.
    ///
    /// Returns `Ok(None)` only for an empty id. A deleted user yields a
    /// cached placeholder, never an error; transport and auth failures
    /// propagate classified and uncached, and callers are expected to treat
    /// them as non-fatal.
    pub async fn resolve(&self, user_id: &str) -> Result<Option<UserInfo>, SlackError> {
        if user_id.is_empty() {
            return Ok(None);
        }

        if let Some(cached) = self.cache_lookup(user_id) {
            return Ok(Some(cached));
        }

        let user = match self.port.resolve_user(user_id).await? {
            Some(raw) => identity_from_raw(raw),
            None => UserInfo::deleted_placeholder(user_id),
        };

        self.cache_store(user_id, user.clone());
        Ok(Some(user))
    }

    /// Identity of the authenticated caller: identify-self, then a normal
    /// [`resolve`](Self::resolve) so the result lands in the cache.
    pub async fn current_identity(&self) -> Result<Option<UserInfo>, SlackError> {
        let user_id = self.port.identify_self().await?;
        self.resolve(&user_id).await
    }

    fn cache_lookup(&self, user_id: &str) -> Option<UserInfo> {
        let mut cache = match self.cache.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        match cache.get(user_id) {
            Some(entry) if entry.resolved_at.elapsed() < self.ttl => Some(entry.user.clone()),
            Some(_) => {
                cache.pop(user_id);
                None
            }
            None => None,
        }
    }

    fn cache_store(&self, user_id: &str, user: UserInfo) {
        let mut cache = match self.cache.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.put(
            user_id.to_string(),
            CachedIdentity {
                user,
                resolved_at: Instant::now(),
            },
        );
    }
}

/// Display-name fallback chain: profile display name, then profile real
/// name, then the handle.
fn identity_from_raw(raw: RawUser) -> UserInfo {
    let mut display_name = raw.display_name;
    if display_name.is_empty() {
        display_name = raw.real_name.clone();
    }
    if display_name.is_empty() {
        display_name = raw.name.clone();
    }
    UserInfo {
        id: raw.id,
        name: raw.name,
        display_name,
        real_name: raw.real_name,
        is_bot: raw.is_bot,
        is_deleted: raw.deleted,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use slack_protocol::{Message, SearchMatch};

    use super::*;
    use crate::port::ChannelPageRequest;

    /// Directory stub that returns a differently-named user on every call
    /// and counts how often it is asked.
    struct CountingPort {
        calls: AtomicUsize,
        not_found: bool,
        fail: bool,
    }

    impl CountingPort {
        fn resolving() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                not_found: false,
                fail: false,
            }
        }

        fn missing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                not_found: true,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                not_found: false,
                fail: true,
            }
        }
    }

    #[async_trait]
    impl SlackPort for CountingPort {
        async fn fetch_message(&self, _: &str, _: &str) -> Result<Message, SlackError> {
            unimplemented!("not exercised")
        }

        async fn fetch_thread(&self, _: &str, _: &str) -> Result<Vec<Message>, SlackError> {
            unimplemented!("not exercised")
        }

        async fn fetch_channel_page(
            &self,
            _: &ChannelPageRequest,
        ) -> Result<(Vec<Message>, bool), SlackError> {
            unimplemented!("not exercised")
        }

        async fn fetch_search_page(
            &self,
            _: &str,
            _: u32,
            _: &str,
        ) -> Result<(Vec<SearchMatch>, u64), SlackError> {
            unimplemented!("not exercised")
        }

        async fn resolve_user(&self, user_id: &str) -> Result<Option<RawUser>, SlackError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SlackError::RateLimited);
            }
            if self.not_found {
                return Ok(None);
            }
            Ok(Some(RawUser {
                id: user_id.to_string(),
                name: format!("handle-{call}"),
                display_name: format!("Display {call}"),
                real_name: format!("Real {call}"),
                is_bot: false,
                deleted: false,
            }))
        }

        async fn identify_self(&self) -> Result<String, SlackError> {
            Ok("USELF".to_string())
        }
    }

    #[tokio::test]
    async fn empty_id_resolves_to_none_without_port_call() {
        let port = Arc::new(CountingPort::resolving());
        let resolver = IdentityResolver::new(port.clone());
        let resolved = resolver.resolve("").await.expect("no error");
        assert_eq!(resolved, None);
        assert_eq!(port.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn second_resolve_is_served_from_cache() {
        let port = Arc::new(CountingPort::resolving());
        let resolver = IdentityResolver::new(port.clone());

        let first = resolver.resolve("U1").await.expect("ok").expect("some");
        let second = resolver.resolve("U1").await.expect("ok").expect("some");

        // The stub returns a different identity per call; a cache hit must
        // surface the first one both times.
        assert_eq!(first.display_name, "Display 0");
        assert_eq!(second, first);
        assert_eq!(port.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entries_are_resolved_again() {
        let port = Arc::new(CountingPort::resolving());
        let resolver = IdentityResolver::with_cache(port.clone(), 16, Duration::ZERO);

        let first = resolver.resolve("U1").await.expect("ok").expect("some");
        let second = resolver.resolve("U1").await.expect("ok").expect("some");

        assert_eq!(first.display_name, "Display 0");
        assert_eq!(second.display_name, "Display 1");
        assert_eq!(port.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_user_becomes_cached_placeholder() {
        let port = Arc::new(CountingPort::missing());
        let resolver = IdentityResolver::new(port.clone());

        let user = resolver.resolve("U404").await.expect("ok").expect("some");
        assert!(user.is_deleted);
        assert_eq!(user.name, "deleted_user");

        let again = resolver.resolve("U404").await.expect("ok").expect("some");
        assert_eq!(again, user);
        assert_eq!(port.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transport_failures_propagate_and_are_not_cached() {
        let port = Arc::new(CountingPort::failing());
        let resolver = IdentityResolver::new(port.clone());

        let err = resolver.resolve("U1").await.expect_err("classified error");
        assert_eq!(err, SlackError::RateLimited);
        let err = resolver.resolve("U1").await.expect_err("still failing");
        assert_eq!(err, SlackError::RateLimited);
        assert_eq!(port.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn current_identity_goes_through_the_cache() {
        let port = Arc::new(CountingPort::resolving());
        let resolver = IdentityResolver::new(port.clone());

        let me = resolver.current_identity().await.expect("ok").expect("some");
        assert_eq!(me.id, "USELF");

        // A direct resolve for the same id must hit the cache.
        resolver.resolve("USELF").await.expect("ok").expect("some");
        assert_eq!(port.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn display_name_fallback_chain() {
        let full = identity_from_raw(RawUser {
            id: "U1".into(),
            name: "handle".into(),
            display_name: "Display".into(),
            real_name: "Real".into(),
            is_bot: false,
            deleted: false,
        });
        assert_eq!(full.display_name, "Display");

        let no_display = identity_from_raw(RawUser {
            id: "U1".into(),
            name: "handle".into(),
            display_name: String::new(),
            real_name: "Real".into(),
            is_bot: false,
            deleted: false,
        });
        assert_eq!(no_display.display_name, "Real");

        let bare = identity_from_raw(RawUser {
            id: "U1".into(),
            name: "handle".into(),
            display_name: String::new(),
            real_name: String::new(),
            is_bot: true,
            deleted: false,
        });
        assert_eq!(bare.display_name, "handle");
        assert!(bare.is_bot);
    }
}
