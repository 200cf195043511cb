// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Credentials, TokenProvider},
	client::{
		Authenticator, Client, ClientConfig, ClientInner, ClientMetrics, DEFAULT_BASE_URL,
		DEFAULT_TOKEN_ENDPOINT, authenticator_for,
	},
	error::ConfigError,
	http::ReqwestHttpClient,
	pagination::PaginationStyle,
	rate_limit::{RateLimitConfig, RateLimitPolicy, SlidingWindow},
};

/// Where access credentials come from.
#[derive(Clone)]
pub enum AuthSource {
	/// Static key or client-credentials pair.
	Credentials(Credentials),
	/// Caller-supplied token provider.
	Provider(Arc<dyn TokenProvider>),
}
impl Debug for AuthSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Credentials(credentials) =>
				f.debug_tuple("AuthSource::Credentials").field(credentials).finish(),
			Self::Provider(_) => f.write_str("AuthSource::Provider(..)"),
		}
	}
}

/// Builder for [`Client`] values.
pub struct ClientBuilder {
	/// Authentication mode.
	pub auth: AuthSource,
	/// API root; defaults to [`DEFAULT_BASE_URL`].
	pub base_url: Option<Url>,
	/// Token endpoint; defaults to [`DEFAULT_TOKEN_ENDPOINT`].
	pub token_endpoint: Option<Url>,
	/// Pagination convention.
	pub pagination: PaginationStyle,
	/// Page size used by `list_all` helpers.
	pub page_size: u32,
	/// Per-request timeout applied to the internally built HTTP client.
	pub timeout: StdDuration,
	/// Quota for the default sliding-window limiter.
	pub rate_limit: RateLimitConfig,
	/// Replacement for the default sliding-window limiter.
	pub rate_limit_policy: Option<Arc<dyn RateLimitPolicy>>,
	/// Preconfigured reqwest client; its own timeout settings apply.
	pub http_client: Option<ReqwestClient>,
	/// Previously minted token to start with.
	pub initial_token: Option<AccessToken>,
	/// Proactive refresh window for tokens with a known expiry.
	pub expiry_leeway: Duration,
}
impl ClientBuilder {
	/// Default page size for `list_all` helpers.
	pub const DEFAULT_PAGE_SIZE: u32 = 100;
	/// Default per-request timeout.
	pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);
	/// Default proactive refresh window.
	pub const DEFAULT_EXPIRY_LEEWAY: Duration = Duration::seconds(30);

	/// Creates a builder for the provided credentials.
	pub fn new(credentials: Credentials) -> Self {
		Self::with_auth(AuthSource::Credentials(credentials))
	}

	/// Creates a builder that mints tokens through `provider`.
	pub fn from_provider(provider: Arc<dyn TokenProvider>) -> Self {
		Self::with_auth(AuthSource::Provider(provider))
	}

	fn with_auth(auth: AuthSource) -> Self {
		Self {
			auth,
			base_url: None,
			token_endpoint: None,
			pagination: PaginationStyle::default(),
			page_size: Self::DEFAULT_PAGE_SIZE,
			timeout: Self::DEFAULT_TIMEOUT,
			rate_limit: RateLimitConfig::default(),
			rate_limit_policy: None,
			http_client: None,
			initial_token: None,
			expiry_leeway: Self::DEFAULT_EXPIRY_LEEWAY,
		}
	}

	/// Sets the API root.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Selects the pagination convention.
	pub fn pagination(mut self, style: PaginationStyle) -> Self {
		self.pagination = style;

		self
	}

	/// Overrides the page size used by `list_all` helpers.
	pub fn page_size(mut self, page_size: u32) -> Self {
		self.page_size = page_size;

		self
	}

	/// Overrides the per-request timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Overrides the quota of the default limiter.
	pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
		self.rate_limit = config;

		self
	}

	/// Replaces the default limiter.
	pub fn rate_limit_policy(mut self, policy: Arc<dyn RateLimitPolicy>) -> Self {
		self.rate_limit_policy = Some(policy);

		self
	}

	/// Uses a preconfigured reqwest client.
	pub fn http_client(mut self, client: ReqwestClient) -> Self {
		self.http_client = Some(client);

		self
	}

	/// Seeds the client with a previously minted token; ignored in API-key mode.
	pub fn initial_token(mut self, token: AccessToken) -> Self {
		self.initial_token = Some(token);

		self
	}

	/// Overrides the proactive refresh window (negative values clamp to zero).
	pub fn expiry_leeway(mut self, leeway: Duration) -> Self {
		self.expiry_leeway = if leeway.is_negative() { Duration::ZERO } else { leeway };

		self
	}

	/// Consumes the builder and validates the resulting client.
	pub fn build(self) -> Result<Client, ConfigError> {
		let base_url = match self.base_url {
			Some(url) => url,
			None => parse_url(DEFAULT_BASE_URL)?,
		};
		let base_url = normalize_base(validate_endpoint("base", base_url)?);
		let token_endpoint = match self.token_endpoint {
			Some(url) => url,
			None => parse_url(DEFAULT_TOKEN_ENDPOINT)?,
		};
		let token_endpoint = validate_endpoint("token", token_endpoint)?;

		if self.page_size == 0 {
			return Err(ConfigError::InvalidPageSize);
		}

		self.rate_limit.validate()?;

		let limiter: Arc<dyn RateLimitPolicy> = match self.rate_limit_policy {
			Some(policy) => policy,
			None => Arc::new(SlidingWindow::new(self.rate_limit)?),
		};
		let http_client = match self.http_client {
			Some(client) => ReqwestHttpClient::with_client(client),
			None => ReqwestHttpClient::with_timeout(self.timeout)?,
		};
		let auth = match self.auth {
			AuthSource::Credentials(credentials) => authenticator_for(
				credentials,
				&http_client,
				&token_endpoint,
				self.initial_token,
				self.expiry_leeway,
			),
			AuthSource::Provider(provider) =>
				Authenticator::token(provider, self.initial_token, self.expiry_leeway),
		};
		let config = ClientConfig {
			base_url,
			token_endpoint,
			pagination: self.pagination,
			page_size: self.page_size,
			timeout: self.timeout,
			rate_limit: self.rate_limit,
			expiry_leeway: self.expiry_leeway,
		};

		Ok(Client {
			inner: Arc::new(ClientInner {
				config,
				http_client,
				auth,
				limiter,
				metrics: ClientMetrics::default(),
			}),
		})
	}
}
impl Debug for ClientBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientBuilder")
			.field("auth", &self.auth)
			.field("base_url", &self.base_url)
			.field("token_endpoint", &self.token_endpoint)
			.field("pagination", &self.pagination)
			.field("page_size", &self.page_size)
			.field("timeout", &self.timeout)
			.field("rate_limit", &self.rate_limit)
			.field("custom_rate_limit_policy", &self.rate_limit_policy.is_some())
			.field("custom_http_client", &self.http_client.is_some())
			.field("initial_token_set", &self.initial_token.is_some())
			.field("expiry_leeway", &self.expiry_leeway)
			.finish()
	}
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { url: raw.to_owned(), source })
}

fn validate_endpoint(name: &'static str, url: Url) -> Result<Url, ConfigError> {
	if matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base() {
		Ok(url)
	} else {
		Err(ConfigError::UnsupportedUrl { endpoint: name, url: url.to_string() })
	}
}

// `Url::join` replaces the last segment unless the base path ends with a slash.
fn normalize_base(mut url: Url) -> Url {
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse successfully.")
	}

	#[test]
	fn defaults_match_reference_configuration() {
		let client = Client::builder(Credentials::api_key("key"))
			.build()
			.expect("Default API-key client should build.");
		let config = client.config();

		assert_eq!(config.base_url.as_str(), "https://api.vanta.com/v1/");
		assert_eq!(config.token_endpoint.as_str(), DEFAULT_TOKEN_ENDPOINT);
		assert_eq!(config.pagination, PaginationStyle::PageInfo);
		assert_eq!(config.rate_limit, RateLimitConfig::new(50, StdDuration::from_secs(60)));
		assert_eq!(config.timeout, ClientBuilder::DEFAULT_TIMEOUT);
	}

	#[test]
	fn base_url_joins_resource_paths() {
		let client = Client::builder(Credentials::api_key("key"))
			.base_url(url("https://example.com/api/v1"))
			.build()
			.expect("Client with custom base should build.");

		assert_eq!(
			client.endpoint("organizations").expect("Path should join.").as_str(),
			"https://example.com/api/v1/organizations"
		);
		assert_eq!(
			client.endpoint("/users/u-1").expect("Leading slash should be ignored.").as_str(),
			"https://example.com/api/v1/users/u-1"
		);
	}

	#[test]
	fn rejects_unsupported_schemes() {
		let err = Client::builder(Credentials::api_key("key"))
			.base_url(url("ftp://example.com/v1"))
			.build()
			.expect_err("Non-http base URLs should be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedUrl { endpoint: "base", .. }));

		let err = Client::builder(Credentials::client_credentials("id", "secret"))
			.token_endpoint(url("mailto:ops@example.com"))
			.build()
			.expect_err("Opaque token endpoints should be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedUrl { endpoint: "token", .. }));
	}

	#[test]
	fn rejects_invalid_limits() {
		let err = Client::builder(Credentials::api_key("key"))
			.page_size(0)
			.build()
			.expect_err("Zero page size should be rejected.");

		assert!(matches!(err, ConfigError::InvalidPageSize));

		let err = Client::builder(Credentials::api_key("key"))
			.rate_limit(RateLimitConfig::new(0, StdDuration::from_secs(60)))
			.build()
			.expect_err("Zero quota should be rejected.");

		assert!(matches!(err, ConfigError::InvalidRateLimit));
	}

	#[test]
	fn api_key_mode_holds_no_token() {
		let client = Client::builder(Credentials::api_key("key"))
			.initial_token(AccessToken::new("ignored"))
			.build()
			.expect("API-key client should build.");

		assert!(client.current_token().is_none());
	}

	#[test]
	fn initial_token_is_visible_in_token_mode() {
		let client = Client::builder(Credentials::client_credentials("id", "secret"))
			.initial_token(AccessToken::new("seeded"))
			.expiry_leeway(Duration::seconds(-5))
			.build()
			.expect("Client-credentials client should build.");
		let token = client.current_token().expect("Seeded token should be held.");

		assert_eq!(token.secret().expose(), "seeded");
		assert_eq!(client.config().expiry_leeway, Duration::ZERO);
	}

	#[test]
	fn debug_output_hides_secrets() {
		let builder = Client::builder(Credentials::client_credentials("id", "hunter2"));

		assert!(!format!("{builder:?}").contains("hunter2"));

		let client = builder.build().expect("Client-credentials client should build.");

		assert!(!format!("{client:?}").contains("hunter2"));
	}
}
