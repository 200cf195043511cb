//! Optional observability helpers for client calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `vanta_client.call` with the `call` (kind)
//!   and `stage` (call site) fields, plus debug events for retries and rate-limit waits.
//! - Enable `metrics` to increment the `vanta_client_call_total` counter for every
//!   attempt/retry/success/failure, labeled by `call` + `outcome`.
//!
//! | `call` | stage | outcomes |
//! |---|---|---|
//! | `request` | `execute` | `attempt`, `retry` (once, after a 401), `success`, `failure` |
//! | `token_exchange` | `obtain` | `attempt`, `success`, `failure` |
//! | `pagination` | `collect_all` | `attempt`, `success`, `failure`; per-page requests count as `request` |

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Kinds of outbound work performed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// A single API request through the executor.
	Request,
	/// A client-credentials exchange against the token endpoint.
	TokenExchange,
	/// A multi-page traversal driven by the pager.
	Pagination,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Request => "request",
			CallKind::TokenExchange => "token_exchange",
			CallKind::Pagination => "pagination",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client helper.
	Attempt,
	/// The request is resent once with a freshly minted token; only recorded for
	/// [`CallKind::Request`].
	Retry,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Retry => "retry",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
