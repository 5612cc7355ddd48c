//! Tests for the retry policy.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use codex::error::CodexError;
use codex::util::retry::RetryPolicy;

#[tokio::test(start_paused = true)]
async fn retry_policy_retries_transport_errors_until_success() {
    let policy = RetryPolicy::new(4, Duration::from_millis(100));
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_for_task = attempts.clone();

    let task = tokio::spawn(async move {
        policy
            .execute(|_| {
                let attempts = attempts_for_task.clone();
                async move {
                    let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err(CodexError::Stream("reset".into()))
                    } else {
                        Ok::<_, CodexError>("ok")
                    }
                }
            })
            .await
    });

    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_secs(1)).await;
    let result = task.await.unwrap();

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_policy_stops_immediately_for_configuration_errors() {
    let policy = RetryPolicy::new(5, Duration::from_millis(1));
    let attempts = Arc::new(AtomicUsize::new(0));

    let result = policy
        .execute(|_| {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(CodexError::Configuration("bad-key".to_string()))
            }
        })
        .await;

    match result {
        Err(CodexError::Configuration(message)) => assert_eq!(message, "bad-key"),
        other => panic!("expected configuration error, got {other:?}"),
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn retry_policy_wraps_last_error_when_retries_are_exhausted() {
    let policy = RetryPolicy::new(2, Duration::from_millis(50));
    let attempts = Arc::new(AtomicUsize::new(0));

    let result = policy
        .execute(|_| {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(CodexError::RateLimited {
                    retry_after_ms: None,
                })
            }
        })
        .await;

    match result {
        Err(CodexError::Transport { attempts, source }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(
                *source,
                CodexError::RateLimited {
                    retry_after_ms: None
                }
            ));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn retry_policy_backs_off_linearly() {
    let policy = RetryPolicy::new(3, Duration::from_millis(200));
    let started = tokio::time::Instant::now();
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));

    let result = policy
        .execute(|attempt| {
            let seen = seen.clone();
            async move {
                seen.lock().unwrap().push((attempt, started.elapsed()));
                Err::<(), _>(CodexError::Stream("down".into()))
            }
        })
        .await;

    assert!(matches!(result, Err(CodexError::Transport { attempts: 4, .. })));
    let seen = seen.lock().unwrap().clone();
    let attempts: Vec<u32> = seen.iter().map(|(attempt, _)| *attempt).collect();
    assert_eq!(attempts, vec![1, 2, 3, 4]);
    // Sleeps of 200, 400, and 600ms between attempts.
    assert!(seen[1].1 >= Duration::from_millis(200));
    assert!(seen[2].1 >= Duration::from_millis(600));
    assert!(seen[3].1 >= Duration::from_millis(1200));
    assert!(seen[3].1 < Duration::from_millis(1300));
}

#[tokio::test]
async fn retry_policy_with_zero_retries_runs_once() {
    let policy = RetryPolicy::new(0, Duration::from_secs(60));
    let attempts = Arc::new(AtomicU32::new(0));

    let result = policy
        .execute(|attempt| {
            let attempts = attempts.clone();
            async move {
                attempts.store(attempt, Ordering::SeqCst);
                Err::<(), _>(CodexError::api(500, "boom"))
            }
        })
        .await;

    assert!(matches!(result, Err(CodexError::Transport { attempts: 1, .. })));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
