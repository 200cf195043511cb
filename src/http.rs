//! Transport primitives shared by the request executor and the token provider.
//!
//! [`ReqwestHttpClient`] is the single place that touches `reqwest`: it attaches the JSON
//! headers and optional bearer credential, sends one request, and hands back an
//! [`ApiResponse`] with the status, the `Retry-After` hint, and the raw body. Status
//! interpretation lives with the callers so the executor and the token provider can apply
//! their own policies.

// crates.io
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, RETRY_AFTER};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

pub use reqwest::Method;

const JSON: &str = "application/json";

/// Query parameters in the order they are sent.
pub type Query = Vec<(String, String)>;

/// Collects key/value pairs into a [`Query`].
pub fn query_pairs<I, K, V>(pairs: I) -> Query
where
	I: IntoIterator<Item = (K, V)>,
	K: Into<String>,
	V: ToString,
{
	pairs.into_iter().map(|(key, value)| (key.into(), value.to_string())).collect()
}

/// Fully resolved request, cheap to resend for the single credential retry.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute target URL.
	pub url: Url,
	/// Query parameters appended to the URL.
	pub query: Query,
	/// Serialized JSON body.
	pub body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Creates a request without query or body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, query: Vec::new(), body: None }
	}

	/// Replaces the query parameters.
	pub fn with_query(mut self, query: Query) -> Self {
		self.query = query;

		self
	}

	/// Serializes `body` as the JSON payload.
	pub fn with_json<T>(mut self, body: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(body)?);

		Ok(self)
	}
}

/// Status, retry hint, and raw body of a completed exchange.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` when the body is empty or whitespace only.
	pub fn is_body_empty(&self) -> bool {
		self.body.iter().all(u8::is_ascii_whitespace)
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests fail with [`TransportError::Timeout`] after `timeout`.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}

	/// Sends `request` with JSON headers and, when given, `Authorization: <bearer>`.
	pub async fn send(
		&self,
		request: &ApiRequest,
		bearer: Option<&str>,
	) -> Result<ApiResponse, TransportError> {
		let mut builder = self
			.0
			.request(request.method.clone(), request.url.clone())
			.header(CONTENT_TYPE, JSON)
			.header(ACCEPT, JSON);

		if !request.query.is_empty() {
			builder = builder.query(&request.query);
		}
		if let Some(value) = bearer {
			builder = builder.header(AUTHORIZATION, value);
		}
		if let Some(body) = &request.body {
			builder = builder.body(body.clone());
		}

		let response =
			builder.send().await.map_err(|e| TransportError::from_reqwest(&request.url, e))?;
		let status = response.status().as_u16();
		let retry_after = parse_retry_after(response.headers());
		let body = response
			.bytes()
			.await
			.map_err(|e| TransportError::from_reqwest(&request.url, e))?
			.to_vec();

		Ok(ApiResponse { status, retry_after, body })
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Debug for ReqwestHttpClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ReqwestHttpClient(..)")
	}
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
