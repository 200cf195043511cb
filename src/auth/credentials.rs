//! Authentication modes accepted by the client.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Scope requested during the client-credentials exchange unless overridden.
pub const DEFAULT_SCOPE: &str = "vanta-api.all:read vanta-api.all:write";

/// Exactly one authentication mode per client instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
	/// Static API key sent as a bearer token and never refreshed.
	ApiKey(TokenSecret),
	/// OAuth client credentials exchanged for short-lived access tokens.
	ClientCredentials(ClientCredentials),
}
impl Credentials {
	/// Static API key mode.
	pub fn api_key(key: impl Into<TokenSecret>) -> Self {
		Self::ApiKey(key.into())
	}

	/// Client-credentials mode with the default scope.
	pub fn client_credentials(
		client_id: impl Into<String>,
		client_secret: impl Into<TokenSecret>,
	) -> Self {
		Self::ClientCredentials(ClientCredentials::new(client_id, client_secret))
	}

	/// Overrides the requested scope; no effect in API-key mode.
	pub fn with_scope(self, scope: impl Into<String>) -> Self {
		match self {
			Self::ClientCredentials(creds) => Self::ClientCredentials(creds.with_scope(scope)),
			api_key => api_key,
		}
	}

	/// Returns `true` when tokens can be minted and refreshed.
	pub fn is_refreshable(&self) -> bool {
		matches!(self, Self::ClientCredentials(_))
	}
}

/// OAuth client-credentials pair plus the scope string sent with every exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientCredentials {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// Space-delimited scope string.
	pub scope: String,
}
impl ClientCredentials {
	/// Creates a pair using [`DEFAULT_SCOPE`].
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<TokenSecret>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			scope: DEFAULT_SCOPE.into(),
		}
	}

	/// Overrides the scope string.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn scope_override_only_applies_to_client_credentials() {
		let creds = Credentials::client_credentials("id", "secret").with_scope("custom");

		match &creds {
			Credentials::ClientCredentials(pair) => assert_eq!(pair.scope, "custom"),
			Credentials::ApiKey(_) => panic!("Client credentials should stay client credentials."),
		}

		assert!(creds.is_refreshable());

		let key = Credentials::api_key("key").with_scope("ignored");

		assert_eq!(key, Credentials::api_key("key"));
		assert!(!key.is_refreshable());
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let rendered = format!("{:?}", Credentials::client_credentials("id", "hunter2"));

		assert!(rendered.contains("id"));
		assert!(!rendered.contains("hunter2"));
	}
}
