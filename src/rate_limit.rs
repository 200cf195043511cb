//! Client-side admission control that bounds outbound calls per trailing window.
//!
//! Every executor send passes through a [`RateLimitPolicy`] first. The default
//! [`SlidingWindow`] policy remembers the instants of the last `max_calls` admissions and
//! delays (never rejects) a caller until the oldest one has left the window. Slots are
//! released implicitly by the passage of time.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::time::{self as tokio_time, Instant};
// self
use crate::{_prelude::*, error::ConfigError, obs};

/// Boxed future returned by [`RateLimitPolicy::acquire`].
pub type AcquireFuture<'a> = Pin<Box<dyn Future<Output = Admission> + 'a + Send>>;

/// Strategy consulted before every outbound call.
pub trait RateLimitPolicy
where
	Self: Send + Sync,
{
	/// Suspends until the call may proceed, then reserves one slot.
	fn acquire(&self) -> AcquireFuture<'_>;

	/// Reserves a slot if one is free right now; otherwise reports how long to wait.
	fn try_acquire(&self) -> RateLimitDecision;
}

/// Result of a non-blocking admission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
	/// A slot was reserved; the call may proceed immediately.
	Allow,
	/// No slot is free; retry after the delay.
	Delay(StdDuration),
}

/// Record of a granted admission.
#[derive(Clone, Copy, Debug)]
pub struct Admission {
	/// Instant at which the slot was reserved.
	pub admitted_at: Instant,
	/// Time spent waiting for the slot.
	pub waited: StdDuration,
}

/// Quota of calls per trailing window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
	/// Maximum admissions within any trailing window.
	pub max_calls: u32,
	/// Window length.
	pub period: StdDuration,
}
impl RateLimitConfig {
	/// Reference quota: 50 calls.
	pub const DEFAULT_MAX_CALLS: u32 = 50;
	/// Reference window: 60 seconds.
	pub const DEFAULT_PERIOD: StdDuration = StdDuration::from_secs(60);

	/// Creates a quota of `max_calls` per `period`.
	pub const fn new(max_calls: u32, period: StdDuration) -> Self {
		Self { max_calls, period }
	}

	/// Rejects quotas that could never admit a call.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.max_calls == 0 || self.period.is_zero() {
			Err(ConfigError::InvalidRateLimit)
		} else {
			Ok(())
		}
	}
}
impl Default for RateLimitConfig {
	fn default() -> Self {
		Self::new(Self::DEFAULT_MAX_CALLS, Self::DEFAULT_PERIOD)
	}
}

/// Sliding-window limiter shared by every call issued through one client.
#[derive(Debug)]
pub struct SlidingWindow {
	config: RateLimitConfig,
	history: Mutex<VecDeque<Instant>>,
	// Waiters queue here so admissions are granted in arrival order.
	turn: AsyncMutex<()>,
}
impl SlidingWindow {
	/// Creates a limiter after validating `config`.
	pub fn new(config: RateLimitConfig) -> Result<Self, ConfigError> {
		config.validate()?;

		Ok(Self {
			config,
			history: Mutex::new(VecDeque::new()),
			turn: AsyncMutex::new(()),
		})
	}

	/// Quota enforced by this limiter.
	pub fn config(&self) -> RateLimitConfig {
		self.config
	}

	/// Number of admissions still inside the trailing window.
	pub fn in_window(&self) -> usize {
		let mut history = self.history.lock();

		self.prune(&mut history, Instant::now());

		history.len()
	}

	/// Reserves a slot at `now` or returns the wait until one frees up.
	fn admit_at(&self, now: Instant) -> Option<StdDuration> {
		let mut history = self.history.lock();

		self.prune(&mut history, now);

		if history.len() < self.config.max_calls as usize {
			history.push_back(now);

			return None;
		}

		// Non-empty: max_calls is at least one.
		let oldest = history.front().copied().unwrap_or(now);
		let elapsed = now.saturating_duration_since(oldest);

		Some(self.config.period.saturating_sub(elapsed))
	}

	fn prune(&self, history: &mut VecDeque<Instant>, now: Instant) {
		while let Some(oldest) = history.front() {
			if now.saturating_duration_since(*oldest) >= self.config.period {
				history.pop_front();
			} else {
				break;
			}
		}
	}
}
impl RateLimitPolicy for SlidingWindow {
	fn acquire(&self) -> AcquireFuture<'_> {
		Box::pin(async move {
			let started = Instant::now();
			let _turn = self.turn.lock().await;
			let mut slept = false;

			loop {
				let now = Instant::now();

				match self.admit_at(now) {
					None => {
						let waited = if slept {
							now.saturating_duration_since(started)
						} else {
							StdDuration::ZERO
						};

						return Admission { admitted_at: now, waited };
					},
					Some(wait) => {
						obs::debug_event(&format!("Rate limit reached; waiting {wait:?}."));

						tokio_time::sleep(wait).await;

						slept = true;
					},
				}
			}
		})
	}

	fn try_acquire(&self) -> RateLimitDecision {
		match self.admit_at(Instant::now()) {
			None => RateLimitDecision::Allow,
			Some(wait) => RateLimitDecision::Delay(wait),
		}
	}
}

/// Policy that admits every call immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unlimited;
impl RateLimitPolicy for Unlimited {
	fn acquire(&self) -> AcquireFuture<'_> {
		Box::pin(async move { Admission { admitted_at: Instant::now(), waited: StdDuration::ZERO } })
	}

	fn try_acquire(&self) -> RateLimitDecision {
		RateLimitDecision::Allow
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn window(max_calls: u32, secs: u64) -> SlidingWindow {
		SlidingWindow::new(RateLimitConfig::new(max_calls, StdDuration::from_secs(secs)))
			.expect("Rate limit fixture should be valid.")
	}

	fn assert_window_bound(admitted: &[Instant], max_calls: usize, period: StdDuration) {
		for (idx, later) in admitted.iter().enumerate().skip(max_calls) {
			let earlier = admitted[idx - max_calls];

			assert!(
				later.saturating_duration_since(earlier) >= period,
				"Admission {idx} shares a window with {} earlier admissions.",
				max_calls
			);
		}
	}

	#[test]
	fn config_rejects_empty_quota() {
		assert!(RateLimitConfig::new(0, StdDuration::from_secs(1)).validate().is_err());
		assert!(RateLimitConfig::new(1, StdDuration::ZERO).validate().is_err());
		assert!(RateLimitConfig::default().validate().is_ok());
		assert_eq!(RateLimitConfig::default().max_calls, 50);
		assert_eq!(RateLimitConfig::default().period, StdDuration::from_secs(60));
	}

	#[tokio::test(start_paused = true)]
	async fn huge_quota_starts_with_empty_history() {
		let limiter = SlidingWindow::new(RateLimitConfig::new(u32::MAX, StdDuration::from_secs(60)))
			.expect("Maximal quota should be accepted.");

		assert!(limiter.acquire().await.waited.is_zero());
		assert_eq!(limiter.in_window(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn admits_quota_immediately() {
		let limiter = window(3, 60);

		for _ in 0..3 {
			let admission = limiter.acquire().await;

			assert!(admission.waited.is_zero());
		}

		assert_eq!(limiter.in_window(), 3);
	}

	#[tokio::test(start_paused = true)]
	async fn delays_excess_calls_until_oldest_leaves_window() {
		let limiter = window(2, 10);
		let start = Instant::now();

		limiter.acquire().await;
		tokio_time::advance(StdDuration::from_secs(4)).await;
		limiter.acquire().await;

		let third = limiter.acquire().await;

		assert_eq!(third.admitted_at.duration_since(start), StdDuration::from_secs(10));
		assert_eq!(third.waited, StdDuration::from_secs(6));
	}

	#[tokio::test(start_paused = true)]
	async fn never_exceeds_quota_in_any_window() {
		let limiter = window(3, 1);
		let mut admitted = Vec::new();

		for _ in 0..10 {
			admitted.push(limiter.acquire().await.admitted_at);
		}

		assert_window_bound(&admitted, 3, StdDuration::from_secs(1));
		assert_eq!(admitted[9].duration_since(admitted[0]), StdDuration::from_secs(3));
	}

	#[tokio::test(start_paused = true)]
	async fn concurrent_callers_share_the_window() {
		let limiter = Arc::new(window(2, 5));
		let handles = (0..6)
			.map(|_| {
				let limiter = limiter.clone();

				tokio::spawn(async move { limiter.acquire().await.admitted_at })
			})
			.collect::<Vec<_>>();
		let mut admitted = Vec::new();

		for handle in handles {
			admitted.push(handle.await.expect("Limiter task should not panic."));
		}

		admitted.sort();

		assert_eq!(admitted.len(), 6, "Delayed callers must never be dropped.");
		assert_window_bound(&admitted, 2, StdDuration::from_secs(5));
	}

	#[tokio::test(start_paused = true)]
	async fn try_acquire_reports_remaining_wait() {
		let limiter = window(1, 30);

		assert_eq!(limiter.try_acquire(), RateLimitDecision::Allow);

		tokio_time::advance(StdDuration::from_secs(10)).await;

		assert_eq!(limiter.try_acquire(), RateLimitDecision::Delay(StdDuration::from_secs(20)));

		tokio_time::advance(StdDuration::from_secs(20)).await;

		assert_eq!(limiter.try_acquire(), RateLimitDecision::Allow);
	}

	#[tokio::test]
	async fn unlimited_never_waits() {
		let limiter = Unlimited;

		for _ in 0..100 {
			assert!(limiter.acquire().await.waited.is_zero());
		}

		assert_eq!(limiter.try_acquire(), RateLimitDecision::Allow);
	}
}
