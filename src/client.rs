//! The client handle, its configuration, and the credential state shared by every call.

/// Builder API for assembling a validated [`Client`].
pub mod builder;
pub mod executor;
/// Per-client activity counters.
pub mod metrics;

pub use builder::*;
pub use metrics::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Credentials, TokenProvider, TokenSecret},
	http::ReqwestHttpClient,
	pagination::PaginationStyle,
	rate_limit::{RateLimitConfig, RateLimitPolicy},
};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.vanta.com/v1";
/// Default client-credentials token endpoint.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://api.vanta.com/oauth/token";

/// Resolved configuration captured when the client was built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// API root every resource path is joined onto (always ends with `/`).
	pub base_url: Url,
	/// Token endpoint used by the client-credentials exchange.
	pub token_endpoint: Url,
	/// Pagination convention spoken by the target API.
	pub pagination: PaginationStyle,
	/// Page size used by `list_all` helpers.
	pub page_size: u32,
	/// Per-request timeout.
	pub timeout: std::time::Duration,
	/// Outbound call quota.
	pub rate_limit: RateLimitConfig,
	/// Tokens whose known expiry falls within this window are refreshed before use.
	pub expiry_leeway: Duration,
}

/// Async Vanta API client.
///
/// Cloning is cheap: clones share the HTTP connection pool, the current access token, and
/// the rate-limiter history, so every clone counts against the same quota.
#[derive(Clone)]
pub struct Client {
	pub(crate) inner: Arc<ClientInner>,
}
impl Client {
	/// Starts a builder for the given credentials.
	pub fn builder(credentials: Credentials) -> ClientBuilder {
		ClientBuilder::new(credentials)
	}

	/// Starts a builder that mints tokens through a caller-supplied provider.
	pub fn with_token_provider(provider: Arc<dyn TokenProvider>) -> ClientBuilder {
		ClientBuilder::from_provider(provider)
	}

	/// Configuration the client was built with.
	pub fn config(&self) -> &ClientConfig {
		&self.inner.config
	}

	/// Counters describing the client's outbound activity.
	pub fn metrics(&self) -> &ClientMetrics {
		&self.inner.metrics
	}

	/// Currently held access token, if one has been minted (always `None` in API-key mode).
	pub fn current_token(&self) -> Option<AccessToken> {
		match &self.inner.auth {
			Authenticator::ApiKey { .. } => None,
			Authenticator::Token { slot, .. } => slot.read().token.clone(),
		}
	}

	/// Mints a fresh access token now instead of waiting for the first request or a 401.
	///
	/// In API-key mode this is a no-op.
	pub async fn authenticate(&self) -> Result<()> {
		match &self.inner.auth {
			Authenticator::ApiKey { .. } => Ok(()),
			Authenticator::Token { slot, .. } => {
				let generation = slot.read().generation;

				self.inner.auth.refresh_after(generation, &self.inner.metrics).await.map(|_| ())
			},
		}
	}

	/// Joins `path` onto the base URL.
	pub fn endpoint(&self, path: &str) -> Result<Url> {
		let trimmed = path.trim_start_matches('/');

		self.inner.config.base_url.join(trimmed).map_err(|source| {
			crate::error::ConfigError::InvalidUrl { url: path.to_owned(), source }.into()
		})
	}
}
impl Debug for Client {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("config", &self.inner.config)
			.field("auth", &self.inner.auth)
			.finish()
	}
}

pub(crate) struct ClientInner {
	pub(crate) config: ClientConfig,
	pub(crate) http_client: ReqwestHttpClient,
	pub(crate) auth: Authenticator,
	pub(crate) limiter: Arc<dyn RateLimitPolicy>,
	pub(crate) metrics: ClientMetrics,
}

/// Token plus a generation counter so concurrent refreshes can be coalesced.
#[derive(Debug, Default)]
pub(crate) struct TokenSlot {
	pub(crate) token: Option<AccessToken>,
	pub(crate) generation: u64,
}

/// Bearer value attached to one send, tagged with the generation it came from.
#[derive(Clone, Debug)]
pub(crate) struct Credential {
	pub(crate) bearer: String,
	// `None` for static API keys, which cannot be refreshed.
	pub(crate) generation: Option<u64>,
}
impl Credential {
	fn fixed(bearer: &str) -> Self {
		Self { bearer: bearer.to_owned(), generation: None }
	}

	fn minted(token: &AccessToken, generation: u64) -> Self {
		Self { bearer: token.bearer(), generation: Some(generation) }
	}
}

pub(crate) enum Authenticator {
	ApiKey {
		bearer: String,
	},
	Token {
		provider: Arc<dyn TokenProvider>,
		slot: RwLock<TokenSlot>,
		refresh: AsyncMutex<()>,
		leeway: Duration,
	},
}
impl Authenticator {
	pub(crate) fn api_key(key: &TokenSecret) -> Self {
		Self::ApiKey { bearer: key.bearer() }
	}

	pub(crate) fn token(
		provider: Arc<dyn TokenProvider>,
		initial: Option<AccessToken>,
		leeway: Duration,
	) -> Self {
		Self::Token {
			provider,
			slot: RwLock::new(TokenSlot { token: initial, generation: 0 }),
			refresh: AsyncMutex::new(()),
			leeway,
		}
	}

	/// Returns the credential for the next send, minting one if none is usable.
	pub(crate) async fn current(&self, metrics: &ClientMetrics) -> Result<Credential> {
		match self {
			Self::ApiKey { bearer } => Ok(Credential::fixed(bearer)),
			Self::Token { slot, leeway, .. } => {
				let observed = {
					let slot = slot.read();

					match slot.token.as_ref() {
						Some(token) if !token.is_expired_at(OffsetDateTime::now_utc(), *leeway) =>
							return Ok(Credential::minted(token, slot.generation)),
						_ => slot.generation,
					}
				};

				self.refresh_after(observed, metrics).await
			},
		}
	}

	/// Replaces the token minted at `stale_generation`.
	///
	/// When another caller already replaced it, the newer token is returned without a second
	/// exchange.
	pub(crate) async fn refresh_after(
		&self,
		stale_generation: u64,
		metrics: &ClientMetrics,
	) -> Result<Credential> {
		match self {
			Self::ApiKey { bearer } => Ok(Credential::fixed(bearer)),
			Self::Token { provider, slot, refresh, .. } => {
				let _refreshing = refresh.lock().await;

				{
					let slot = slot.read();

					if let Some(token) =
						slot.token.as_ref().filter(|_| slot.generation != stale_generation)
					{
						return Ok(Credential::minted(token, slot.generation));
					}
				}

				let token = provider.obtain().await?;

				metrics.record_token_refresh();

				let mut slot = slot.write();

				slot.generation += 1;

				let credential = Credential::minted(&token, slot.generation);

				slot.token = Some(token);

				Ok(credential)
			},
		}
	}
}
impl Debug for Authenticator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::ApiKey { .. } => f.debug_struct("Authenticator::ApiKey").finish_non_exhaustive(),
			Self::Token { slot, .. } => f
				.debug_struct("Authenticator::Token")
				.field("generation", &slot.read().generation)
				.finish_non_exhaustive(),
		}
	}
}

pub(crate) fn authenticator_for(
	credentials: Credentials,
	http_client: &ReqwestHttpClient,
	token_endpoint: &Url,
	initial: Option<AccessToken>,
	leeway: Duration,
) -> Authenticator {
	match credentials {
		Credentials::ApiKey(key) => Authenticator::api_key(&key),
		Credentials::ClientCredentials(pair) => {
			let provider = crate::auth::ClientCredentialsProvider::new(
				http_client.clone(),
				token_endpoint.clone(),
				pair,
			);

			Authenticator::token(Arc::new(provider), initial, leeway)
		},
	}
}
