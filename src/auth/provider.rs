//! Token providers that mint access tokens for the request executor.
//!
//! A provider performs exactly one network exchange per [`TokenProvider::obtain`] call and
//! keeps no cache; the executor owns the current token and decides when to ask for a new one.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ClientCredentials},
	error::{AuthError, ConfigError},
	http::{ApiRequest, Method, ReqwestHttpClient},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Boxed future returned by [`TokenProvider::obtain`].
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<AccessToken>> + 'a + Send>>;

/// Source of fresh access tokens.
pub trait TokenProvider
where
	Self: Send + Sync,
{
	/// Mints a new access token. Safe to call repeatedly.
	fn obtain(&self) -> TokenFuture<'_>;
}

#[derive(Serialize)]
struct TokenRequest<'a> {
	client_id: &'a str,
	client_secret: &'a str,
	grant_type: &'static str,
	scope: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	#[serde(default)]
	expires_in: Option<i64>,
}

/// Exchanges client credentials for an access token with a JSON `POST`.
#[derive(Clone, Debug)]
pub struct ClientCredentialsProvider {
	http_client: ReqwestHttpClient,
	token_endpoint: Url,
	credentials: ClientCredentials,
}
impl ClientCredentialsProvider {
	/// Creates a provider posting to `token_endpoint`.
	pub fn new(
		http_client: ReqwestHttpClient,
		token_endpoint: Url,
		credentials: ClientCredentials,
	) -> Self {
		Self { http_client, token_endpoint, credentials }
	}

	/// Token endpoint used for exchanges.
	pub fn token_endpoint(&self) -> &Url {
		&self.token_endpoint
	}

	async fn exchange(&self) -> Result<AccessToken> {
		let body = TokenRequest {
			client_id: &self.credentials.client_id,
			client_secret: self.credentials.client_secret.expose(),
			grant_type: "client_credentials",
			scope: &self.credentials.scope,
		};
		let request = ApiRequest::new(Method::POST, self.token_endpoint.clone())
			.with_json(&body)
			.map_err(ConfigError::from)?;
		let response = self.http_client.send(&request, None).await?;

		if !response.is_success() {
			return Err(AuthError::TokenEndpoint {
				status: response.status,
				body: response.body_text(),
			}
			.into());
		}

		let mut de = serde_json::Deserializer::from_slice(&response.body);
		let parsed: TokenResponse = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| AuthError::MalformedTokenResponse { source })?;
		let token = AccessToken::new(parsed.access_token);

		Ok(match parsed.expires_in {
			Some(secs) => token.with_expires_in(Duration::seconds(secs)),
			None => token,
		})
	}
}
impl TokenProvider for ClientCredentialsProvider {
	fn obtain(&self) -> TokenFuture<'_> {
		const KIND: CallKind = CallKind::TokenExchange;

		let span = CallSpan::new(KIND, "obtain");

		Box::pin(async move {
			obs::record_call_outcome(KIND, CallOutcome::Attempt);

			let result = span.instrument(self.exchange()).await;

			match &result {
				Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
				Err(e) => {
					obs::record_call_outcome(KIND, CallOutcome::Failure);
					obs::warn_event(&format!("Token exchange failed: {e}."));
				},
			}

			result
		})
	}
}
