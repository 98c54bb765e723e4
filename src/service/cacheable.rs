//! Memoization wrapper that routes a function's results through the cache.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::CacheService;

/// TTL used by [`Cacheable`] unless overridden.
pub const DEFAULT_CACHEABLE_TTL: u64 = 3600;

/// Builds `"{class}:{method}:{json(args)}"`.
///
/// Returns `None` when the arguments cannot be serialized; such calls bypass
/// the cache.
pub fn method_key<A: Serialize + ?Sized>(class: &str, method: &str, args: &A) -> Option<String> {
    match serde_json::to_string(args) {
        Ok(json) => Some(format!("{}:{}:{}", class, method, json)),
        Err(e) => {
            warn!(class, method, "Arguments not serializable, bypassing cache: {}", e);
            None
        }
    }
}

/// A fallible async function whose `Ok` results are cached.
///
/// ```ignore
/// let top_products = Cacheable::for_method(cache.clone(), "ProductService", "top", |limit: u32| {
///     let db = db.clone();
///     async move { db.top_products(limit).await }
/// })
/// .with_ttl(600);
///
/// let products = top_products.call(10).await?;
/// ```
pub struct Cacheable<K, F> {
    cache: CacheService,
    key_fn: K,
    func: F,
    ttl: u64,
}

impl<K, F> Cacheable<K, F> {
    /// Wraps `func`, deriving cache keys with `key_fn`.
    pub fn new(cache: CacheService, key_fn: K, func: F) -> Self {
        Self {
            cache,
            key_fn,
            func,
            ttl: DEFAULT_CACHEABLE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    /// Returns the cached result for `args`, or calls the wrapped function
    /// and caches an `Ok` result.
    pub async fn call<A, T, E, Fut>(&self, args: A) -> Result<T, E>
    where
        K: Fn(&A) -> Option<String>,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Serialize + DeserializeOwned,
    {
        let Some(key) = (self.key_fn)(&args) else {
            return (self.func)(args).await;
        };

        self.cache
            .get_or_compute(&key, Some(self.ttl), || (self.func)(args))
            .await
    }
}

impl<F> Cacheable<(), F> {
    /// Wraps `func` with keys built by [`method_key`] from `class`, `method`
    /// and the call arguments.
    pub fn for_method<A, Fut>(
        cache: CacheService,
        class: impl Into<String>,
        method: impl Into<String>,
        func: F,
    ) -> Cacheable<impl Fn(&A) -> Option<String>, F>
    where
        A: Serialize,
        F: Fn(A) -> Fut,
        Fut: Future,
    {
        let class = class.into();
        let method = method.into();
        Cacheable::new(cache, move |args: &A| method_key(&class, &method, args), func)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TierConfig;
    use crate::remote::fakes::FakeRemote;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn cache() -> CacheService {
        CacheService::new(TierConfig::default(), Arc::new(FakeRemote::new()))
    }

    #[test]
    fn test_method_key_format() {
        let key = method_key("ProductService", "search", &("beach", 2)).unwrap();
        assert_eq!(key, r#"ProductService:search:["beach",2]"#);
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let price = Cacheable::for_method(cache(), "ProductService", "price", move |id: u32| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<f64, String>(id as f64 * 1.5)
            }
        });

        assert_eq!(price.ttl(), DEFAULT_CACHEABLE_TTL);
        assert_eq!(price.call(2).await, Ok(3.0));
        assert_eq!(price.call(2).await, Ok(3.0));
        assert_eq!(price.call(4).await, Ok(6.0));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let flaky = Cacheable::for_method(cache(), "OrderService", "load", move |_id: u32| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err("timeout".to_string())
                } else {
                    Ok("order".to_string())
                }
            }
        })
        .with_ttl(60);

        assert!(flaky.call(1).await.is_err());
        assert_eq!(flaky.call(1).await, Ok("order".to_string()));
        assert_eq!(flaky.call(1).await, Ok("order".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_key_fn_none_bypasses_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let uncached = Cacheable::new(
            cache(),
            |_: &u32| -> Option<String> { None },
            move |id: u32| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<u32, String>(id) }
            },
        );

        uncached.call(1).await.unwrap();
        uncached.call(1).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
