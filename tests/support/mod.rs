//! Shared fixtures for the integration tests.

#![allow(dead_code)]

// std
use std::time::Duration as StdDuration;
// crates.io
use httpmock::prelude::*;
// self
use vanta_client::{
	Client, ClientBuilder, auth::Credentials, rate_limit::RateLimitConfig, url::Url,
};

pub const TEST_CLIENT_ID: &str = "test-client";
pub const TEST_CLIENT_SECRET: &str = "test-secret";
pub const TOKEN_PATH: &str = "/oauth/token";

/// Quota generous enough to never delay a test.
pub const RELAXED_LIMIT: RateLimitConfig = RateLimitConfig::new(10_000, StdDuration::from_secs(1));

pub fn base_url(server: &MockServer) -> Url {
	Url::parse(&server.url("/v1")).expect("Mock base URL should parse successfully.")
}

pub fn token_url(server: &MockServer) -> Url {
	Url::parse(&server.url(TOKEN_PATH)).expect("Mock token endpoint should parse successfully.")
}

/// Client-credentials builder pointed at `server`.
pub fn test_builder(server: &MockServer) -> ClientBuilder {
	Client::builder(Credentials::client_credentials(TEST_CLIENT_ID, TEST_CLIENT_SECRET))
		.base_url(base_url(server))
		.token_endpoint(token_url(server))
		.rate_limit(RELAXED_LIMIT)
}

pub fn build_test_client(server: &MockServer) -> Client {
	test_builder(server).build().expect("Test client should build successfully.")
}

pub fn build_api_key_test_client(server: &MockServer, api_key: &str) -> Client {
	Client::builder(Credentials::api_key(api_key))
		.base_url(base_url(server))
		.rate_limit(RELAXED_LIMIT)
		.build()
		.expect("API key test client should build successfully.")
}

/// Token endpoint mock answering with `access_token`.
pub async fn mock_token<'a>(server: &'a MockServer, access_token: &str) -> httpmock::Mock<'a> {
	let body = format!("{{\"access_token\":\"{access_token}\",\"token_type\":\"bearer\"}}");

	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}
