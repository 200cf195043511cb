// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for one client's outbound activity.
#[derive(Debug, Default)]
pub struct ClientMetrics {
	requests: AtomicU64,
	token_refreshes: AtomicU64,
	auth_retries: AtomicU64,
	rate_limit_delays: AtomicU64,
}
impl ClientMetrics {
	/// Returns the number of API requests sent (retries included).
	pub fn requests(&self) -> u64 {
		self.requests.load(Ordering::Relaxed)
	}

	/// Returns the number of tokens minted through the token provider.
	pub fn token_refreshes(&self) -> u64 {
		self.token_refreshes.load(Ordering::Relaxed)
	}

	/// Returns the number of requests retried after a 401.
	pub fn auth_retries(&self) -> u64 {
		self.auth_retries.load(Ordering::Relaxed)
	}

	/// Returns the number of sends that had to wait for the rate limiter.
	pub fn rate_limit_delays(&self) -> u64 {
		self.rate_limit_delays.load(Ordering::Relaxed)
	}

	pub(crate) fn record_request(&self) {
		self.requests.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_token_refresh(&self) {
		self.token_refreshes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_auth_retry(&self) {
		self.auth_retries.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_rate_limit_delay(&self) {
		self.rate_limit_delays.fetch_add(1, Ordering::Relaxed);
	}
}
