use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::sync::Arc;

type SharedFetch<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

/// Concurrent-request de-duplication
///
/// The first caller for a key registers a shared future; callers arriving
/// while it is pending await the same future instead of starting their own.
/// A spawned task drives the future, so it runs to completion and releases
/// its slot even when every caller has gone away. Errors reach every waiter
/// and are not remembered.
pub struct InFlight<V, E> {
    pending: Arc<DashMap<String, SharedFetch<V, E>>>,
}

impl<V, E> Default for InFlight<V, E> {
    fn default() -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
        }
    }
}

impl<V, E> InFlight<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `make()` for `key` unless an identical request is already pending
    ///
    /// Returns the result and whether this call joined an existing request.
    /// `make` is only invoked when no request is pending.
    pub async fn run<F, Fut>(&self, key: &str, make: F) -> (Result<V, E>, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let (fetch, joined) = match self.pending.entry(key.to_string()) {
            Entry::Occupied(slot) => (slot.get().clone(), true),
            Entry::Vacant(slot) => {
                let pending = Arc::clone(&self.pending);
                let owned_key = key.to_string();
                let inner = make();

                let fetch = async move {
                    let result = inner.await;
                    pending.remove(&owned_key);
                    result
                }
                .boxed()
                .shared();

                slot.insert(fetch.clone());
                tokio::spawn(fetch.clone());
                (fetch, false)
            }
        };

        (fetch.await, joined)
    }

    /// Number of requests currently pending
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_request() {
        let in_flight: Arc<InFlight<u32, String>> = Arc::new(InFlight::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let in_flight = Arc::clone(&in_flight);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                in_flight
                    .run("recipe:1", move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(42)
                    })
                    .await
            }));
        }

        let mut joined = 0;
        for handle in handles {
            let (result, was_joined) = handle.await.unwrap();
            assert_eq!(result, Ok(42));
            if was_joined {
                joined += 1;
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(joined, 7);
        assert!(in_flight.is_empty());
    }

    #[tokio::test]
    async fn test_error_reaches_waiters_and_releases_slot() {
        let in_flight: InFlight<u32, String> = InFlight::new();

        let (result, _) = in_flight
            .run("k", || async { Err("upstream down".to_string()) })
            .await;
        assert_eq!(result, Err("upstream down".to_string()));
        assert!(in_flight.is_empty());

        let (retry, joined) = in_flight.run("k", || async { Ok(7) }).await;
        assert_eq!(retry, Ok(7));
        assert!(!joined);
    }

    #[tokio::test]
    async fn test_distinct_keys_run_independently() {
        let in_flight: InFlight<&'static str, ()> = InFlight::new();
        let (a, b) = tokio::join!(
            in_flight.run("a", || async { Ok("a") }),
            in_flight.run("b", || async { Ok("b") }),
        );
        assert_eq!(a, (Ok("a"), false));
        assert_eq!(b, (Ok("b"), false));
    }

    #[tokio::test]
    async fn test_abandoned_request_finishes_in_background() {
        let in_flight: InFlight<u32, ()> = InFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));

        // Start a request, then drop the caller before it resolves
        let counted = Arc::clone(&calls);
        let abandoned = in_flight.run("k", move || async move {
            counted.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(1)
        });
        assert!(tokio::time::timeout(Duration::from_millis(1), abandoned)
            .await
            .is_err());
        assert_eq!(in_flight.len(), 1);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(in_flight.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let (result, joined) = in_flight.run("k", || async { Ok(2) }).await;
        assert_eq!(result, Ok(2));
        assert!(!joined);
    }

    #[tokio::test]
    async fn test_caller_arriving_mid_flight_joins_abandoned_request() {
        let in_flight: InFlight<u32, ()> = InFlight::new();

        let abandoned = in_flight.run("k", || async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            Ok(1)
        });
        let _ = tokio::time::timeout(Duration::from_millis(1), abandoned).await;

        let (result, joined) = in_flight.run("k", || async { Ok(2) }).await;
        assert_eq!(result, Ok(1));
        assert!(joined);
        assert!(in_flight.is_empty());
    }
}
