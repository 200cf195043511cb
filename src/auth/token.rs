//! Access tokens presented as bearer credentials.

pub mod secret;

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Bearer credential attached to every API request.
///
/// Expiry is usually discovered reactively through a 401 response. When the token endpoint
/// reports a lifetime, [`AccessToken::expires_at`] records it so the executor can refresh
/// before sending a request that would certainly be rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessToken {
	secret: TokenSecret,
	expires_at: Option<OffsetDateTime>,
	// Reported by the token endpoint; the leeway never exceeds half of it.
	lifetime: Option<Duration>,
}
impl AccessToken {
	/// Wraps a token value with unknown expiry.
	pub fn new(value: impl Into<TokenSecret>) -> Self {
		Self { secret: value.into(), expires_at: None, lifetime: None }
	}

	/// Records an absolute expiry instant.
	pub fn with_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);
		self.lifetime = None;

		self
	}

	/// Records a relative lifetime measured from now; non-positive lifetimes are ignored.
	///
	/// A token minted this way is never treated as expired during the first half of its
	/// lifetime, whatever leeway the caller applies.
	pub fn with_expires_in(self, lifetime: Duration) -> Self {
		if lifetime.is_positive() {
			let mut token = self.with_expires_at(OffsetDateTime::now_utc() + lifetime);

			token.lifetime = Some(lifetime);

			token
		} else {
			self
		}
	}

	/// Token secret; callers must avoid logging the exposed value.
	pub fn secret(&self) -> &TokenSecret {
		&self.secret
	}

	/// Expiry instant, when the token endpoint reported one.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_at
	}

	/// Returns `true` when the known expiry falls within `leeway` of `now`.
	///
	/// Tokens with unknown expiry never report as expired.
	pub fn is_expired_at(&self, now: OffsetDateTime, leeway: Duration) -> bool {
		let leeway = match self.lifetime {
			Some(lifetime) => leeway.min(lifetime / 2),
			None => leeway,
		};

		self.expires_at.is_some_and(|expires_at| now + leeway >= expires_at)
	}

	/// Formats the `Authorization` header value.
	pub fn bearer(&self) -> String {
		self.secret.bearer()
	}
}
