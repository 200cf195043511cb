//! Client-level error types shared by the executor, token provider, and pager.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential exchange failed or the API kept rejecting the credential.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// The API answered 429; wait and retry.
	#[error(transparent)]
	RateLimited(#[from] RateLimitError),
	/// The API answered with any other non-success status.
	#[error(transparent)]
	Http(#[from] HttpError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// A success response carried a body that is not JSON.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// A list response carried unusable pagination metadata.
	#[error(transparent)]
	Pagination(#[from] PaginationError),
}
impl Error {
	/// Returns `true` for failures the caller may retry after backing off.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::RateLimited(_) | Self::Transport(_))
	}

	/// HTTP status associated with the failure, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Auth(e) => e.status(),
			Self::RateLimited(_) => Some(429),
			Self::Http(e) => Some(e.status),
			Self::Decode(DecodeError::Body { status, .. }) => Some(*status),
			_ => None,
		}
	}
}

/// Authentication failures.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Token endpoint answered with a non-success status.
	#[error("Token endpoint returned HTTP {status}.")]
	TokenEndpoint {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// Token endpoint answered 2xx but the body could not be parsed or lacked `access_token`.
	#[error("Token endpoint returned a malformed body.")]
	MalformedTokenResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The API rejected the request with 401 even after the credential was refreshed.
	#[error("API rejected the refreshed credential with HTTP {status}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// The API rejected a static API key; static keys cannot be refreshed.
	#[error("API rejected the static API key with HTTP {status}.")]
	ApiKeyRejected {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
}
impl AuthError {
	/// HTTP status associated with the failure, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::TokenEndpoint { status, .. }
			| Self::Rejected { status, .. }
			| Self::ApiKeyRejected { status, .. } => Some(*status),
			Self::MalformedTokenResponse { .. } => None,
		}
	}
}

/// The API throttled the request (HTTP 429).
#[derive(Debug, ThisError)]
#[error("API rate limit exceeded; retry later.")]
pub struct RateLimitError {
	/// Retry-After hint from upstream, if supplied.
	pub retry_after: Option<Duration>,
	/// Raw response body.
	pub body: String,
}

/// The API answered with a non-success status other than 401 or 429.
#[derive(Debug, ThisError)]
#[error("API returned HTTP {status}.")]
pub struct HttpError {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: String,
}
impl HttpError {
	/// Returns `true` for 4xx statuses.
	pub fn is_client_error(&self) -> bool {
		(400..500).contains(&self.status)
	}

	/// Returns `true` for 5xx statuses.
	pub fn is_server_error(&self) -> bool {
		(500..600).contains(&self.status)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Target URL.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete within the configured timeout.
	#[error("Request to {url} timed out.")]
	Timeout {
		/// Target URL.
		url: String,
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Classifies a reqwest failure for the given URL.
	pub fn from_reqwest(url: &Url, e: ReqwestError) -> Self {
		let url = url.to_string();

		if e.is_timeout() {
			Self::Timeout { url, source: Box::new(e) }
		} else {
			Self::Network { url, source: Box::new(e) }
		}
	}
}

/// Configuration and validation failures raised by the client builder.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A URL could not be parsed or joined.
	#[error("Invalid URL `{url}`.")]
	InvalidUrl {
		/// Offending URL or path.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A URL uses a scheme other than http(s) or cannot serve as a base.
	#[error("The {endpoint} URL must be an absolute http(s) URL: {url}.")]
	UnsupportedUrl {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Rate limit quota must admit at least one call per non-empty window.
	#[error("Rate limit requires a positive call count and period.")]
	InvalidRateLimit,
	/// Page size must be positive.
	#[error("Page size must be positive.")]
	InvalidPageSize,
	/// A request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	Body(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// A success response carried an unparseable body.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body is not valid JSON.
	#[error("Response body (HTTP {status}) is not valid JSON.")]
	Body {
		/// HTTP status code.
		status: u16,
		/// Parsing failure.
		#[source]
		source: serde_json::Error,
	},
}

/// Pagination metadata problems detected while traversing a list endpoint.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum PaginationError {
	/// The records field exists but is not an array.
	#[error("List response for `{path}` has a non-array `data` field.")]
	InvalidRecords {
		/// Resource path being listed.
		path: String,
	},
	/// The server reported more pages without a usable cursor.
	#[error("List response for `{path}` reports more pages but no cursor.")]
	MissingCursor {
		/// Resource path being listed.
		path: String,
	},
	/// The server returned the cursor that was just requested.
	#[error("List response for `{path}` repeated cursor `{cursor}`.")]
	CursorRepeated {
		/// Resource path being listed.
		path: String,
		/// Cursor that repeated.
		cursor: String,
	},
}
