// Clock Port (for testability)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Clock interface (allows mocking `now` and sleeps in tests)
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Suspend the caller for `duration`
    async fn sleep(&self, duration: Duration);
}

/// System clock (production)
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Clock frozen at a fixed instant that records sleeps instead of sleeping
    pub struct FixedClock {
        now: DateTime<Utc>,
        sleeps: Mutex<Vec<Duration>>,
    }

    impl FixedClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self {
                now,
                sleeps: Mutex::new(Vec::new()),
            }
        }

        pub fn at_epoch_seconds(secs: i64) -> Self {
            Self::new(DateTime::from_timestamp(secs, 0).unwrap_or_default())
        }

        /// Sleeps requested so far
        pub fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.now
        }

        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::FixedClock;
    use super::*;

    #[test]
    fn test_fixed_clock_records_sleeps() {
        let clock = FixedClock::at_epoch_seconds(1_465_000_000);

        tokio_test::block_on(async {
            clock.sleep(Duration::from_secs(1)).await;
            clock.sleep(Duration::from_millis(250)).await;
        });

        assert_eq!(clock.now().timestamp(), 1_465_000_000);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(1), Duration::from_millis(250)]
        );
    }

    #[tokio::test]
    async fn test_system_clock_sleeps() {
        let clock = SystemClock;
        let before = clock.now();
        clock.sleep(Duration::from_millis(5)).await;
        assert!(clock.now() >= before);
    }
}
