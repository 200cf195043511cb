mod support;

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
use time::{Duration, OffsetDateTime};
// self
use support::*;
use vanta_client::{
	Client, Error,
	auth::{AccessToken, Credentials, TokenFuture, TokenProvider},
	error::AuthError,
};

#[tokio::test]
async fn token_is_minted_lazily_and_reused() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH).header("content-type", "application/json").json_body(
				json!({
					"client_id": TEST_CLIENT_ID,
					"client_secret": TEST_CLIENT_SECRET,
					"grant_type": "client_credentials",
					"scope": "vanta-api.all:read vanta-api.all:write",
				}),
			);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"minted\",\"token_type\":\"bearer\",\"expires_in\":3600}");
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/organizations").header("authorization", "Bearer minted");
			then.status(200).body("{\"data\":[]}");
		})
		.await;

	assert!(client.current_token().is_none());

	client.organizations().list(None).await.expect("First call should mint and succeed.");
	client.organizations().list(None).await.expect("Second call should reuse the token.");

	token_mock.assert_calls_async(1).await;
	api_mock.assert_calls_async(2).await;

	let token = client.current_token().expect("Minted token should be held.");

	assert!(token.expires_at().is_some());
	assert_eq!(client.metrics().token_refreshes(), 1);
}

#[tokio::test]
async fn custom_scope_is_sent_to_the_token_endpoint() {
	let server = MockServer::start_async().await;
	let client = Client::builder(
		Credentials::client_credentials(TEST_CLIENT_ID, TEST_CLIENT_SECRET)
			.with_scope("vanta-api.all:read"),
	)
	.base_url(base_url(&server))
	.token_endpoint(token_url(&server))
	.build()
	.expect("Client with a custom scope should build.");
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH).json_body(json!({
				"client_id": TEST_CLIENT_ID,
				"client_secret": TEST_CLIENT_SECRET,
				"grant_type": "client_credentials",
				"scope": "vanta-api.all:read",
			}));
			then.status(200).body("{\"access_token\":\"read-only\"}");
		})
		.await;

	client.authenticate().await.expect("Explicit authentication should succeed.");

	token_mock.assert_calls_async(1).await;
	assert_eq!(
		client.current_token().expect("Token should be held.").secret().expose(),
		"read-only"
	);
}

#[tokio::test]
async fn token_endpoint_failure_is_an_auth_error() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server);

	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;

	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/users");
			then.status(200).body("{\"data\":[]}");
		})
		.await;
	let err = client.users().list(None).await.expect_err("Token failure should abort the call.");

	match err {
		Error::Auth(AuthError::TokenEndpoint { status, body }) => {
			assert_eq!(status, 400);
			assert!(body.contains("invalid_client"));
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	api_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn token_response_without_access_token_is_malformed() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server);

	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).body("{\"token_type\":\"bearer\"}");
		})
		.await;

	let err = client.authenticate().await.expect_err("Malformed token body should fail.");

	assert!(matches!(err, Error::Auth(AuthError::MalformedTokenResponse { .. })));
	assert!(client.current_token().is_none());
}

#[tokio::test]
async fn token_near_expiry_is_replaced_before_sending() {
	let server = MockServer::start_async().await;
	let client = test_builder(&server)
		.initial_token(
			AccessToken::new("expiring")
				.with_expires_at(OffsetDateTime::now_utc() + Duration::seconds(5)),
		)
		.expiry_leeway(Duration::seconds(30))
		.build()
		.expect("Client with an expiring token should build.");
	let token_mock = mock_token(&server, "renewed").await;
	let expiring_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/audits").header("authorization", "Bearer expiring");
			then.status(200).body("{\"data\":[]}");
		})
		.await;
	let renewed_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/audits").header("authorization", "Bearer renewed");
			then.status(200).body("{\"data\":[]}");
		})
		.await;

	client.audits().list(None).await.expect("Call should succeed with the renewed token.");

	token_mock.assert_calls_async(1).await;
	expiring_mock.assert_calls_async(0).await;
	renewed_mock.assert_calls_async(1).await;
	assert_eq!(client.metrics().auth_retries(), 0);
}

#[tokio::test]
async fn short_lived_token_after_unauthorized_is_minted_once() {
	let server = MockServer::start_async().await;
	let client = test_builder(&server)
		.initial_token(AccessToken::new("stale"))
		.build()
		.expect("Client with a seeded token should build.");
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"fresh\",\"token_type\":\"bearer\",\"expires_in\":10}");
		})
		.await;
	let stale_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/users").header("authorization", "Bearer stale");
			then.status(401);
		})
		.await;
	let fresh_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/users").header("authorization", "Bearer fresh");
			then.status(200).body("{\"data\":[]}");
		})
		.await;

	client.users().list(None).await.expect("Call should succeed after one refresh.");

	token_mock.assert_calls_async(1).await;

	client.users().list(None).await.expect("Follow-up call should reuse the short-lived token.");

	token_mock.assert_calls_async(1).await;
	stale_mock.assert_calls_async(1).await;
	fresh_mock.assert_calls_async(2).await;
	assert_eq!(client.metrics().token_refreshes(), 1);
	assert_eq!(client.metrics().auth_retries(), 1);
}

#[tokio::test]
async fn concurrent_unauthorized_calls_share_one_refresh() {
	let server = MockServer::start_async().await;
	let client = test_builder(&server)
		.initial_token(AccessToken::new("stale"))
		.build()
		.expect("Client with a seeded token should build.");
	let token_mock = mock_token(&server, "fresh").await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/controls").header("authorization", "Bearer stale");
			then.status(401);
		})
		.await;

	let fresh_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/controls").header("authorization", "Bearer fresh");
			then.status(200).body("{\"data\":[]}");
		})
		.await;
	let controls = client.controls();
	let (a, b, c, d) =
		tokio::join!(controls.list(None), controls.list(None), controls.list(None), controls.list(None));

	for result in [a, b, c, d] {
		result.expect("Every concurrent call should succeed after the shared refresh.");
	}

	token_mock.assert_calls_async(1).await;
	fresh_mock.assert_calls_async(4).await;
	assert_eq!(client.metrics().token_refreshes(), 1);
}

struct StaticProvider;
impl TokenProvider for StaticProvider {
	fn obtain(&self) -> TokenFuture<'_> {
		Box::pin(async { Ok::<_, Error>(AccessToken::new("from-provider")) })
	}
}

#[tokio::test]
async fn custom_provider_supplies_the_bearer() {
	let server = MockServer::start_async().await;
	let client = Client::with_token_provider(Arc::new(StaticProvider))
		.base_url(base_url(&server))
		.rate_limit(RELAXED_LIMIT)
		.build()
		.expect("Client with a custom provider should build.");
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/evidence").header("authorization", "Bearer from-provider");
			then.status(200).body("{\"data\":[]}");
		})
		.await;

	client.evidence().list(None).await.expect("Call should use the provider's token.");

	api_mock.assert_calls_async(1).await;
}
