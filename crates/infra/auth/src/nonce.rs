//! Nonce allocation
//!
//! Exchanges reject a signed request whose nonce is not greater than the last
//! one they accepted for the key. One generator is owned per client and
//! shared by every thread issuing requests through it; allocation is a single
//! critical section, so concurrent callers always receive distinct, strictly
//! increasing values even if the wall clock steps backwards.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of wall-clock time since the Unix epoch
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    /// Time elapsed since the Unix epoch
    fn now(&self) -> Duration;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

/// How nonce candidates are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoncePolicy {
    /// Plain counter starting at 1
    Counter,
    /// Unix seconds
    Seconds,
    /// Unix milliseconds
    #[default]
    Millis,
    /// Unix microseconds
    Micros,
}

impl NoncePolicy {
    fn candidate(self, now: Duration) -> u64 {
        let value = match self {
            Self::Counter => 0,
            Self::Seconds => u128::from(now.as_secs()),
            Self::Millis => now.as_millis(),
            Self::Micros => now.as_micros(),
        };
        u64::try_from(value).unwrap_or(u64::MAX)
    }
}

/// Allocated nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nonce(u64);

impl Nonce {
    /// Wrap a raw value, mostly for tests and replay
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Raw value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strictly increasing nonce source
pub struct NonceGenerator {
    policy: NoncePolicy,
    clock: Arc<dyn Clock>,
    last: Mutex<Option<u64>>,
}

impl NonceGenerator {
    /// Generator backed by the system clock
    #[must_use]
    pub fn new(policy: NoncePolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    /// Generator backed by a custom clock
    #[must_use]
    pub fn with_clock(policy: NoncePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            clock,
            last: Mutex::new(None),
        }
    }

    /// Candidate policy
    #[must_use]
    pub const fn policy(&self) -> NoncePolicy {
        self.policy
    }

    /// Allocate the next nonce
    ///
    /// The result is the larger of the clock-derived candidate and the
    /// previous value plus one.
    pub fn next(&self) -> Nonce {
        let mut last = self.last.lock();
        let candidate = self.policy.candidate(self.clock.now());
        let value = match *last {
            Some(prev) => candidate.max(prev.saturating_add(1)),
            None => candidate.max(1),
        };
        *last = Some(value);
        Nonce(value)
    }

    /// Last nonce handed out
    #[must_use]
    pub fn last(&self) -> Option<Nonce> {
        self.last.lock().map(Nonce)
    }
}

impl fmt::Debug for NonceGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonceGenerator")
            .field("policy", &self.policy)
            .field("last", &*self.last.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_counter_starts_at_one() {
        let nonces = NonceGenerator::new(NoncePolicy::Counter);
        assert_eq!(nonces.next().value(), 1);
        assert_eq!(nonces.next().value(), 2);
        assert_eq!(nonces.last(), Some(Nonce::from_raw(2)));
    }

    #[test]
    fn test_millis_follow_the_clock() {
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .return_const(Duration::from_millis(1_700_000_000_123));
        let nonces = NonceGenerator::with_clock(NoncePolicy::Millis, Arc::new(clock));
        assert_eq!(nonces.next().value(), 1_700_000_000_123);
        // same millisecond: bumped by one
        assert_eq!(nonces.next().value(), 1_700_000_000_124);
    }

    #[test]
    fn test_clock_going_backwards_still_increases() {
        let mut clock = MockClock::new();
        let mut seq = mockall::Sequence::new();
        for secs in [1_000, 990, 980] {
            clock
                .expect_now()
                .times(1)
                .in_sequence(&mut seq)
                .return_const(Duration::from_secs(secs));
        }
        let nonces = NonceGenerator::with_clock(NoncePolicy::Seconds, Arc::new(clock));
        assert_eq!(nonces.next().value(), 1_000);
        assert_eq!(nonces.next().value(), 1_001);
        assert_eq!(nonces.next().value(), 1_002);
    }

    #[test]
    fn test_concurrent_allocation_is_distinct() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 250;

        let nonces = Arc::new(NonceGenerator::new(NoncePolicy::Micros));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let nonces = Arc::clone(&nonces);
                thread::spawn(move || {
                    let mut seen = Vec::with_capacity(PER_THREAD);
                    for _ in 0..PER_THREAD {
                        seen.push(nonces.next().value());
                    }
                    seen
                })
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            let seen = handle.join().expect("thread panicked");
            assert!(seen.windows(2).all(|w| w[0] < w[1]));
            all.extend(seen);
        }
        assert_eq!(all.len(), THREADS * PER_THREAD);
    }

    /// Replays recorded readings, then keeps returning the last one
    struct Replay(Mutex<Vec<u64>>);

    impl Clock for Replay {
        fn now(&self) -> Duration {
            let mut readings = self.0.lock();
            let reading = if readings.len() > 1 {
                readings.remove(0)
            } else {
                readings.first().copied().unwrap_or_default()
            };
            Duration::from_millis(reading)
        }
    }

    proptest! {
        #[test]
        fn prop_any_clock_yields_increasing_nonces(readings in prop::collection::vec(0u64..1_000_000, 1..64)) {
            let count = readings.len();
            let nonces = NonceGenerator::with_clock(NoncePolicy::Millis, Arc::new(Replay(Mutex::new(readings))));
            let issued: Vec<u64> = (0..count).map(|_| nonces.next().value()).collect();
            prop_assert!(issued.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(issued[0] >= 1);
        }
    }

    #[test]
    fn test_policy_deserializes_lowercase() -> Result<(), Box<dyn std::error::Error>> {
        #[derive(Deserialize)]
        struct Wrapper {
            nonce: NoncePolicy,
        }
        let parsed: Wrapper = serde_json::from_str(r#"{"nonce":"micros"}"#)?;
        assert_eq!(parsed.nonce, NoncePolicy::Micros);
        assert_eq!(NoncePolicy::default(), NoncePolicy::Millis);
        Ok(())
    }
}
