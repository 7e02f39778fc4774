use crate::infrastructure::error::StoreError;
use std::future::Future;
use tokio::time::{sleep, Duration as TokioDuration};

/// How long a failed fetch waits before surfacing demo data, so the
/// switch does not flash in and out on fast failures.
#[derive(Debug, Clone, Copy)]
pub struct FallbackPolicy {
    pub delay_ms: u64,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self { delay_ms: 600 }
    }
}

/// Outcome of a fetch that can degrade to bundled demo data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    Live(T),
    Degraded { value: T, reason: String },
}

impl<T> Fetched<T> {
    pub fn value(&self) -> &T {
        match self {
            Fetched::Live(value) => value,
            Fetched::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Fetched::Live(value) => value,
            Fetched::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Fetched::Degraded { .. })
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            Fetched::Live(_) => None,
            Fetched::Degraded { reason, .. } => Some(reason.as_str()),
        }
    }
}

/// Runs `fetch` and, when it fails, waits out the policy delay and falls
/// back to `demo_value`. The failure never propagates to the caller.
pub async fn with_fallback<T, F, Fut>(
    policy: FallbackPolicy,
    label: &str,
    fetch: F,
    demo_value: T,
) -> Fetched<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    match fetch().await {
        Ok(value) => Fetched::Live(value),
        Err(error) => {
            sleep(TokioDuration::from_millis(policy.delay_ms)).await;
            Fetched::Degraded {
                value: demo_value,
                reason: format!("{label}: {error}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn instant_policy() -> FallbackPolicy {
        FallbackPolicy { delay_ms: 0 }
    }

    #[tokio::test]
    async fn successful_fetch_is_live() {
        let fetched = with_fallback(
            instant_policy(),
            "tasks",
            || async { Ok::<_, StoreError>(vec![1, 2, 3]) },
            vec![9],
        )
        .await;

        assert_eq!(fetched, Fetched::Live(vec![1, 2, 3]));
        assert!(!fetched.is_degraded());
        assert_eq!(fetched.degraded_reason(), None);
    }

    #[tokio::test]
    async fn failed_fetch_degrades_to_demo_value() {
        let fetched = with_fallback(
            instant_policy(),
            "tasks",
            || async { Err::<Vec<i32>, _>(StoreError::Backend("connection refused".to_string())) },
            vec![9],
        )
        .await;

        assert!(fetched.is_degraded());
        assert_eq!(fetched.value(), &vec![9]);
        let reason = fetched.degraded_reason().expect("degraded reason");
        assert!(reason.starts_with("tasks: "));
        assert!(reason.contains("connection refused"));
    }

    #[tokio::test]
    async fn failed_fetch_waits_before_degrading() {
        let started = tokio::time::Instant::now();
        tokio::time::pause();

        let fetched = with_fallback(
            FallbackPolicy { delay_ms: 600 },
            "notes",
            || async { Err::<Vec<i32>, _>(StoreError::Backend("down".to_string())) },
            Vec::new(),
        )
        .await;

        assert!(fetched.is_degraded());
        assert!(started.elapsed() >= TokioDuration::from_millis(600));
    }

    proptest! {
        #[test]
        fn degraded_value_always_matches_demo_value(demo in prop::collection::vec(any::<u8>(), 0..8)) {
            let runtime = tokio::runtime::Runtime::new().expect("runtime");
            runtime.block_on(async move {
                let fetched = with_fallback(
                    instant_policy(),
                    "sessions",
                    || async { Err::<Vec<u8>, _>(StoreError::Backend("unavailable".to_string())) },
                    demo.clone(),
                )
                .await;
                assert_eq!(fetched.into_value(), demo);
            });
        }
    }
}
