//! Admission controller - fixed-window decisions over a counter store.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::domain::{Admission, Decision, DegradedReason, RateLimitPolicy, WindowKey};
use crate::ports::{Clock, CounterBackend, CounterStoreError, SystemClock};

/// Decides whether a request may proceed.
///
/// Holds no per-identity state: every count lives in the counter store, and
/// the controller never decrements or resets a counter. When the store is
/// absent or failing, requests are admitted with optimistic quota metadata.
///
/// Fixed windows allow up to `2 * max_requests` admissions across a window
/// boundary. Use a smaller window when that burst is unacceptable.
pub struct AdmissionController {
    backend: CounterBackend,
    clock: Arc<dyn Clock>,
    stats: AdmissionStats,
}

impl AdmissionController {
    pub fn new(backend: CounterBackend) -> Self {
        Self::with_clock(backend, Arc::new(SystemClock))
    }

    pub fn with_clock(backend: CounterBackend, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            stats: AdmissionStats::default(),
        }
    }

    /// Controller with no counter store; every request is a degraded admit.
    pub fn unconfigured() -> Self {
        Self::new(CounterBackend::NotConfigured)
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_configured()
    }

    /// Decide for the current wall-clock time.
    pub async fn check(&self, identity: &str, policy: &RateLimitPolicy) -> Decision {
        let now = self.clock.unix_seconds();
        self.decide(identity, policy, now).await
    }

    /// Decide for `identity` at unix time `now`.
    ///
    /// Makes at most one store call (plus the store's own bounded retries).
    pub async fn decide(&self, identity: &str, policy: &RateLimitPolicy, now: u64) -> Decision {
        let store = match &self.backend {
            CounterBackend::Configured(store) => store,
            CounterBackend::NotConfigured => {
                return self.degraded(policy, DegradedReason::NotConfigured);
            }
        };

        let key = WindowKey::new(identity, policy, now);
        let ttl = Duration::from_secs(policy.window_seconds());

        let count = match store.increment(key.as_str(), ttl).await {
            Ok(count) => count,
            Err(CounterStoreError::Unavailable) => {
                return self.degraded(policy, DegradedReason::NotConfigured);
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Counter store failed, failing open");
                return self.degraded(policy, DegradedReason::StoreError);
            }
        };

        let outcome = if count <= policy.max_requests() {
            Admission::Admitted
        } else {
            tracing::debug!(key = %key, count, limit = policy.max_requests(), "Rate limit exceeded");
            Admission::Denied
        };
        self.stats.record(outcome);

        Decision {
            outcome,
            remaining: policy.remaining(count),
            reset_in: policy.reset_in(now),
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn degraded(&self, policy: &RateLimitPolicy, reason: DegradedReason) -> Decision {
        let outcome = Admission::DegradedAdmit(reason);
        self.stats.record(outcome);

        Decision {
            outcome,
            remaining: policy.max_requests(),
            reset_in: policy.window_seconds(),
        }
    }
}

/// Running totals of admission outcomes, split by degradation cause.
#[derive(Debug, Default)]
pub struct AdmissionStats {
    admitted: AtomicU64,
    denied: AtomicU64,
    degraded_not_configured: AtomicU64,
    degraded_store_error: AtomicU64,
}

impl AdmissionStats {
    fn record(&self, outcome: Admission) {
        let counter = match outcome {
            Admission::Admitted => &self.admitted,
            Admission::Denied => &self.denied,
            Admission::DegradedAdmit(DegradedReason::NotConfigured) => {
                &self.degraded_not_configured
            }
            Admission::DegradedAdmit(DegradedReason::StoreError) => &self.degraded_store_error,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            admitted: self.admitted.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
            degraded_not_configured: self.degraded_not_configured.load(Ordering::Relaxed),
            degraded_store_error: self.degraded_store_error.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`AdmissionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub admitted: u64,
    pub denied: u64,
    pub degraded_not_configured: u64,
    pub degraded_store_error: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::CounterStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    /// Counts per key and records every call; TTL is recorded but not enforced.
    #[derive(Default)]
    struct RecordingStore {
        counts: Mutex<HashMap<String, u64>>,
        calls: AtomicUsize,
        last_ttl: Mutex<Option<Duration>>,
    }

    #[async_trait]
    impl CounterStore for RecordingStore {
        async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CounterStoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_ttl.lock().unwrap() = Some(ttl);
            let mut counts = self.counts.lock().unwrap();
            let count = counts.entry(key.to_string()).or_insert(0);
            *count += 1;
            Ok(*count)
        }
    }

    struct FailingStore(CounterStoreError);

    #[async_trait]
    impl CounterStore for FailingStore {
        async fn increment(&self, _key: &str, _ttl: Duration) -> Result<u64, CounterStoreError> {
            Err(self.0.clone())
        }
    }

    struct FixedClock(AtomicU64);

    impl Clock for FixedClock {
        fn unix_seconds(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn policy() -> RateLimitPolicy {
        RateLimitPolicy::new(10, 20).unwrap()
    }

    fn controller_with(store: Arc<RecordingStore>) -> AdmissionController {
        AdmissionController::new(CounterBackend::Configured(store))
    }

    #[tokio::test]
    async fn test_admits_up_to_limit_then_denies() {
        let controller = controller_with(Arc::new(RecordingStore::default()));
        let policy = policy();

        for i in 1..=20u64 {
            let decision = controller.decide("client-a", &policy, 1_000).await;
            assert_eq!(decision.outcome, Admission::Admitted);
            assert_eq!(decision.remaining, 20 - i);
        }

        let decision = controller.decide("client-a", &policy, 1_005).await;
        assert_eq!(decision.outcome, Admission::Denied);
        assert!(!decision.admitted());
        assert_eq!(decision.remaining, 0);
        assert_eq!(decision.reset_in, 5);

        let stats = controller.stats();
        assert_eq!(stats.admitted, 20);
        assert_eq!(stats.denied, 1);
    }

    #[tokio::test]
    async fn test_remaining_monotonic_within_window() {
        let controller = controller_with(Arc::new(RecordingStore::default()));
        let policy = policy();

        let mut previous = policy.max_requests();
        for _ in 0..50 {
            let decision = controller.decide("client-a", &policy, 42).await;
            assert!(decision.remaining <= policy.max_requests());
            assert!(decision.remaining <= previous);
            previous = decision.remaining;
        }
        assert_eq!(previous, 0);
    }

    #[tokio::test]
    async fn test_window_reset_restores_quota() {
        let controller = controller_with(Arc::new(RecordingStore::default()));
        let policy = policy();

        for _ in 0..25 {
            controller.decide("client-a", &policy, 100).await;
        }
        assert!(!controller.decide("client-a", &policy, 109).await.admitted());

        let decision = controller.decide("client-a", &policy, 110).await;
        assert_eq!(decision.outcome, Admission::Admitted);
        assert_eq!(decision.remaining, policy.max_requests() - 1);
        assert_eq!(decision.reset_in, 10);
    }

    #[tokio::test]
    async fn test_identities_have_separate_quota() {
        let controller = controller_with(Arc::new(RecordingStore::default()));
        let policy = policy();

        for _ in 0..20 {
            controller.decide("client-a", &policy, 500).await;
        }

        let decision = controller.decide("client-b", &policy, 500).await;
        assert_eq!(decision.outcome, Admission::Admitted);
        assert_eq!(decision.remaining, policy.max_requests() - 1);
    }

    #[tokio::test]
    async fn test_uses_window_key_and_window_ttl() {
        let store = Arc::new(RecordingStore::default());
        let controller = controller_with(store.clone());

        controller.decide("10.0.0.1:/api/x", &policy(), 1_234).await;

        let counts = store.counts.lock().unwrap();
        assert_eq!(counts.get("rl:10.0.0.1:/api/x:123"), Some(&1));
        assert_eq!(*store.last_ttl.lock().unwrap(), Some(Duration::from_secs(10)));
    }

    #[tokio::test]
    async fn test_boundary_burst_within_tolerance() {
        let controller = controller_with(Arc::new(RecordingStore::default()));
        let policy = policy();

        // Last second of one window, then first second of the next.
        let mut admitted = 0u64;
        for now in [19u64, 20] {
            for _ in 0..policy.max_requests() + 5 {
                if controller.decide("client-a", &policy, now).await.admitted() {
                    admitted += 1;
                }
            }
        }

        assert!(admitted > policy.max_requests());
        assert!(admitted <= 2 * policy.max_requests());
    }

    #[tokio::test]
    async fn test_unconfigured_always_fails_open() {
        let controller = AdmissionController::unconfigured();
        let policy = policy();

        for now in 0..100 {
            let decision = controller.decide("client-a", &policy, now).await;
            assert_eq!(
                decision,
                Decision {
                    outcome: Admission::DegradedAdmit(DegradedReason::NotConfigured),
                    remaining: 20,
                    reset_in: 10,
                }
            );
        }

        assert!(!controller.is_configured());
        assert_eq!(controller.stats().degraded_not_configured, 100);
    }

    #[tokio::test]
    async fn test_unavailable_store_is_not_configured() {
        let controller = AdmissionController::new(CounterBackend::configured(FailingStore(
            CounterStoreError::Unavailable,
        )));

        let decision = controller.decide("client-a", &policy(), 7).await;
        assert_eq!(
            decision.outcome,
            Admission::DegradedAdmit(DegradedReason::NotConfigured)
        );
    }

    #[tokio::test]
    async fn test_transient_error_fails_open_and_is_distinguishable() {
        let controller = AdmissionController::new(CounterBackend::configured(FailingStore(
            CounterStoreError::Transient {
                attempts: 3,
                reason: "connection refused".to_string(),
            },
        )));

        let decision = controller.decide("client-a", &policy(), 7).await;
        assert!(decision.admitted());
        assert_eq!(
            decision.outcome,
            Admission::DegradedAdmit(DegradedReason::StoreError)
        );
        assert_eq!(decision.remaining, 20);
        assert_eq!(decision.reset_in, 10);

        let stats = controller.stats();
        assert_eq!(stats.degraded_store_error, 1);
        assert_eq!(stats.degraded_not_configured, 0);
    }

    #[tokio::test]
    async fn test_invalid_policy_rejected_before_store_call() {
        let store = Arc::new(RecordingStore::default());
        let _controller = controller_with(store.clone());

        assert!(RateLimitPolicy::new(0, 20).is_err());
        assert!(RateLimitPolicy::new(10, -3).is_err());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_check_reads_injected_clock() {
        let clock = Arc::new(FixedClock(AtomicU64::new(95)));
        let controller = AdmissionController::with_clock(
            CounterBackend::Configured(Arc::new(RecordingStore::default())),
            clock.clone(),
        );
        let policy = policy();

        let decision = controller.check("client-a", &policy).await;
        assert_eq!(decision.reset_in, 5);

        clock.0.store(100, Ordering::SeqCst);
        let decision = controller.check("client-a", &policy).await;
        assert_eq!(decision.remaining, policy.max_requests() - 1);
        assert_eq!(decision.reset_in, 10);
    }

    #[tokio::test]
    async fn test_concurrent_decisions_never_over_admit() {
        let controller = Arc::new(controller_with(Arc::new(RecordingStore::default())));
        let policy = policy();

        let decisions = futures::future::join_all((0..100).map(|_| {
            let controller = controller.clone();
            async move { controller.decide("client-a", &policy, 3_000).await }
        }))
        .await;

        let admitted = decisions.iter().filter(|d| d.admitted()).count();
        assert_eq!(admitted, 20);
    }
}
