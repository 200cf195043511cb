//! Single-request execution: rate limiting, credential attachment, response interpretation,
//! and the one-shot credential retry.
//!
//! One logical call moves through `Idle → RateLimited(wait) → Sent`, then ends in success or
//! failure. The only recovery is a single `Retry → Sent` transition taken when the API answers
//! 401 to a refreshable token; a second 401 ends the call with [`AuthError::Rejected`]. A 429
//! surfaces as [`RateLimitError`] without retrying and every other failure propagates
//! unchanged.

// self
use crate::{
	_prelude::*,
	client::Client,
	error::{AuthError, DecodeError, HttpError, RateLimitError},
	http::{ApiRequest, ApiResponse, Method},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

const UNAUTHORIZED: u16 = 401;
const TOO_MANY_REQUESTS: u16 = 429;

impl Client {
	/// Sends one request to `path` (relative to the base URL) and returns the parsed JSON body,
	/// or `None` when the response body is empty.
	pub async fn execute(
		&self,
		method: Method,
		path: &str,
		body: Option<&Value>,
		query: Option<&[(String, String)]>,
	) -> Result<Option<Value>> {
		let mut request = ApiRequest::new(method, self.endpoint(path)?);

		if let Some(query) = query {
			request = request.with_query(query.to_vec());
		}
		if let Some(body) = body {
			request = request.with_json(body)?;
		}

		self.execute_request(request).await
	}

	/// Runs a prepared request through the full executor contract.
	pub async fn execute_request(&self, request: ApiRequest) -> Result<Option<Value>> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, "execute");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.send_with_retry(&request)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	async fn send_with_retry(&self, request: &ApiRequest) -> Result<Option<Value>> {
		let inner = &self.inner;
		let mut retried = false;
		let mut refreshed = None;

		loop {
			let admission = inner.limiter.acquire().await;

			if !admission.waited.is_zero() {
				inner.metrics.record_rate_limit_delay();
			}

			// The retry reuses the token minted for it instead of re-checking expiry.
			let credential = match refreshed.take() {
				Some(credential) => credential,
				None => inner.auth.current(&inner.metrics).await?,
			};

			inner.metrics.record_request();

			let response =
				inner.http_client.send(request, Some(credential.bearer.as_str())).await?;

			match response.status {
				UNAUTHORIZED => {
					let Some(generation) = credential.generation else {
						return Err(AuthError::ApiKeyRejected {
							status: response.status,
							body: response.body_text(),
						}
						.into());
					};

					if retried {
						obs::warn_event(&format!(
							"{} {} rejected the refreshed token.",
							request.method, request.url
						));

						return Err(AuthError::Rejected {
							status: response.status,
							body: response.body_text(),
						}
						.into());
					}

					obs::debug_event(&format!(
						"{} {} answered 401; refreshing the token and retrying once.",
						request.method, request.url
					));
					obs::record_call_outcome(CallKind::Request, CallOutcome::Retry);
					inner.metrics.record_auth_retry();
					refreshed = Some(inner.auth.refresh_after(generation, &inner.metrics).await?);
					retried = true;
				},
				TOO_MANY_REQUESTS =>
					return Err(RateLimitError {
						retry_after: response.retry_after,
						body: response.body_text(),
					}
					.into()),
				_ if response.is_success() => return decode_body(response),
				status => return Err(HttpError { status, body: response.body_text() }.into()),
			}
		}
	}
}

fn decode_body(response: ApiResponse) -> Result<Option<Value>> {
	if response.is_body_empty() {
		return Ok(None);
	}

	serde_json::from_slice(&response.body)
		.map(Some)
		.map_err(|source| DecodeError::Body { status: response.status, source }.into())
}
