//! Token decimals resolution.
//!
//! The engine never caches decimals itself. Callers pass a resolver, and
//! caching is layered on with [`CachedDecimals`].

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use rangebook_core::{LookupError, TokenDecimals};
use rangebook_telemetry::Metrics;
use tracing::{debug, warn};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Source of token decimals, typically an ERC-20 `decimals()` call.
pub trait DecimalsResolver: Send + Sync {
    fn fetch_decimals<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<TokenDecimals, LookupError>>;
}

impl<R: DecimalsResolver + ?Sized> DecimalsResolver for Arc<R> {
    fn fetch_decimals<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<TokenDecimals, LookupError>> {
        (**self).fetch_decimals(token)
    }
}

/// Arc wrapper for resolver trait objects.
pub type DynDecimalsResolver = Arc<dyn DecimalsResolver>;

/// Look up both tokens of a pair concurrently.
///
/// The first failure aborts the other lookup and is returned as-is.
pub async fn resolve_pair<R: DecimalsResolver + ?Sized>(
    resolver: &R,
    base_token: &str,
    quote_token: &str,
) -> Result<(TokenDecimals, TokenDecimals), LookupError> {
    let started = Instant::now();
    let decimals = tokio::try_join!(
        resolver.fetch_decimals(base_token),
        resolver.fetch_decimals(quote_token)
    )?;
    Metrics::decimals_resolved("pair", started.elapsed().as_secs_f64() * 1000.0);
    Ok(decimals)
}

/// Fixed address → decimals table.
///
/// Addresses are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct StaticDecimals {
    table: HashMap<String, TokenDecimals>,
}

impl StaticDecimals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: &str, decimals: TokenDecimals) -> Self {
        self.insert(token, decimals);
        self
    }

    pub fn insert(&mut self, token: &str, decimals: TokenDecimals) {
        self.table.insert(token.to_ascii_lowercase(), decimals);
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, TokenDecimals)> for StaticDecimals {
    fn from_iter<I: IntoIterator<Item = (S, TokenDecimals)>>(iter: I) -> Self {
        let mut resolver = Self::new();
        for (token, decimals) in iter {
            resolver.insert(token.as_ref(), decimals);
        }
        resolver
    }
}

impl DecimalsResolver for StaticDecimals {
    fn fetch_decimals<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<TokenDecimals, LookupError>> {
        Box::pin(async move {
            self.table
                .get(&token.to_ascii_lowercase())
                .copied()
                .ok_or_else(|| LookupError::new(token, "token not configured"))
        })
    }
}

/// Caching decorator over another resolver.
///
/// Successful lookups are kept for the lifetime of the cache. Failures are
/// passed through and never cached, so a transient error does not stick.
pub struct CachedDecimals<R> {
    inner: R,
    cache: DashMap<String, TokenDecimals>,
}

impl<R: DecimalsResolver> CachedDecimals<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    /// Cached value, without consulting the inner resolver.
    pub fn get(&self, token: &str) -> Option<TokenDecimals> {
        self.cache
            .get(&token.to_ascii_lowercase())
            .map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Drop one token, e.g. after a proxy upgrade.
    pub fn invalidate(&self, token: &str) -> Option<TokenDecimals> {
        self.cache
            .remove(&token.to_ascii_lowercase())
            .map(|(_, decimals)| decimals)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

impl<R: DecimalsResolver> DecimalsResolver for CachedDecimals<R> {
    fn fetch_decimals<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<TokenDecimals, LookupError>> {
        Box::pin(async move {
            if let Some(decimals) = self.get(token) {
                Metrics::decimals_cache_hit();
                return Ok(decimals);
            }
            Metrics::decimals_cache_miss();

            match self.inner.fetch_decimals(token).await {
                Ok(decimals) => {
                    debug!(token, decimals, "Decimals cached");
                    self.cache.insert(token.to_ascii_lowercase(), decimals);
                    Ok(decimals)
                }
                Err(err) => {
                    Metrics::decimals_lookup_failed();
                    warn!(token, error = %err.message, "Decimals lookup failed");
                    Err(err)
                }
            }
        })
    }
}

/// Mock resolver for testing.
///
/// Serves a static table, records every call and can be told to fail for
/// specific tokens.
#[derive(Debug, Default)]
pub struct MockDecimals {
    table: StaticDecimals,
    calls: parking_lot::Mutex<Vec<String>>,
    failures: parking_lot::Mutex<HashMap<String, String>>,
}

impl MockDecimals {
    pub fn new(table: StaticDecimals) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    /// Fail every lookup of `token` with `message` until cleared.
    pub fn fail_token(&self, token: &str, message: &str) {
        self.failures
            .lock()
            .insert(token.to_ascii_lowercase(), message.to_string());
    }

    pub fn clear_failures(&self) {
        self.failures.lock().clear();
    }

    /// Tokens requested so far, in call order.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl DecimalsResolver for MockDecimals {
    fn fetch_decimals<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<TokenDecimals, LookupError>> {
        Box::pin(async move {
            self.calls.lock().push(token.to_string());
            let failure = self.failures.lock().get(&token.to_ascii_lowercase()).cloned();
            if let Some(message) = failure {
                return Err(LookupError::new(token, message));
            }
            self.table.fetch_decimals(token).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
    const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

    fn table() -> StaticDecimals {
        StaticDecimals::new().with_token(WETH, 18).with_token(USDC, 6)
    }

    #[tokio::test]
    async fn test_static_lookup_is_case_insensitive() {
        let resolver = table();
        assert_eq!(resolver.fetch_decimals(WETH).await.unwrap(), 18);
        assert_eq!(
            resolver.fetch_decimals(&USDC.to_lowercase()).await.unwrap(),
            6
        );

        let err = resolver.fetch_decimals("0xdead").await.unwrap_err();
        assert_eq!(err.token, "0xdead");
    }

    #[tokio::test]
    async fn test_resolve_pair_returns_in_order() {
        let resolver = table();
        assert_eq!(resolve_pair(&resolver, WETH, USDC).await.unwrap(), (18, 6));
        assert_eq!(resolve_pair(&resolver, USDC, WETH).await.unwrap(), (6, 18));
    }

    #[tokio::test]
    async fn test_resolve_pair_propagates_message_verbatim() {
        let mock = MockDecimals::new(table());
        mock.fail_token(USDC, "rpc timeout");

        let err = resolve_pair(&mock, WETH, USDC).await.unwrap_err();
        assert_eq!(err.message, "rpc timeout");
    }

    #[tokio::test]
    async fn test_cache_hits_skip_inner_resolver() {
        let mock = Arc::new(MockDecimals::new(table()));
        let cached = CachedDecimals::new(Arc::clone(&mock));

        assert_eq!(cached.fetch_decimals(WETH).await.unwrap(), 18);
        assert_eq!(cached.fetch_decimals(WETH).await.unwrap(), 18);
        assert_eq!(
            cached.fetch_decimals(&WETH.to_uppercase()).await.unwrap(),
            18
        );

        assert_eq!(mock.get_calls().len(), 1);
        assert_eq!(cached.get(WETH), Some(18));
    }

    #[tokio::test]
    async fn test_cache_never_stores_failures() {
        let mock = Arc::new(MockDecimals::new(table()));
        let cached = CachedDecimals::new(Arc::clone(&mock));

        mock.fail_token(USDC, "rpc timeout");
        assert!(cached.fetch_decimals(USDC).await.is_err());
        assert!(cached.is_empty());

        mock.clear_failures();
        assert_eq!(cached.fetch_decimals(USDC).await.unwrap(), 6);
        assert_eq!(mock.get_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let mock = Arc::new(MockDecimals::new(table()));
        let cached = CachedDecimals::new(Arc::clone(&mock));

        cached.fetch_decimals(WETH).await.unwrap();
        assert_eq!(cached.invalidate(WETH), Some(18));
        cached.fetch_decimals(WETH).await.unwrap();
        assert_eq!(mock.get_calls().len(), 2);
    }

    #[test]
    fn test_static_from_iter() {
        let resolver: StaticDecimals = [("0xAA", 8u8), ("0xbb", 2u8)].into_iter().collect();
        assert_eq!(resolver.len(), 2);
        let decimals = tokio_test::block_on(resolver.fetch_decimals("0xaa")).unwrap();
        assert_eq!(decimals, 8);
    }
}
