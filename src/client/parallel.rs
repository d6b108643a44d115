//! Bounded-concurrency resolution for per-ticket lookups.
//!
//! Keeps a fixed number of lookups in flight and collects results as they
//! complete. Individual failures are returned alongside successes so one bad
//! ticket cannot abort the rest of a batch.

use std::future::Future;
use std::pin::Pin;

use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;

use crate::error::Result;

/// Type alias for boxed futures used in bounded resolution
type ResolveFuture<K, V> = Pin<Box<dyn Future<Output = (K, Result<V>)> + Send>>;

/// Resolve a batch of keys with at most `max_concurrent` lookups in flight.
///
/// Seeds the initial batch, then starts the next lookup each time one
/// completes. Results arrive in completion order, not submission order, and
/// each carries its own `Result` — errors are data here, not early exits.
pub async fn resolve_concurrently<K, V, F, Fut>(
    keys: Vec<K>,
    resolve: F,
    max_concurrent: usize,
) -> Vec<(K, Result<V>)>
where
    K: Clone + Send + 'static,
    V: Send + 'static,
    F: Fn(K) -> Fut + Send + Sync,
    Fut: Future<Output = Result<V>> + Send + 'static,
{
    if keys.is_empty() {
        return Vec::new();
    }

    debug!(
        "Resolving {} lookups with max {} concurrent",
        keys.len(),
        max_concurrent
    );

    let mut results = Vec::with_capacity(keys.len());
    let mut futures: FuturesUnordered<ResolveFuture<K, V>> = FuturesUnordered::new();
    let mut pending = keys.into_iter();

    // Helper to create a boxed future tagged with its key
    let make_future = |key: K, f: &F| -> ResolveFuture<K, V> {
        let fut = f(key.clone());
        Box::pin(async move {
            let result = fut.await;
            (key, result)
        })
    };

    // Seed initial batch up to max_concurrent
    for key in pending.by_ref().take(max_concurrent) {
        futures.push(make_future(key, &resolve));
    }

    // Collect completions and keep the pipeline full
    while let Some(outcome) = futures.next().await {
        results.push(outcome);

        if let Some(next_key) = pending.next() {
            futures.push(make_future(next_key, &resolve));
        }
    }

    results
}
