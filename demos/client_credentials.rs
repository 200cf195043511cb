//! Mints a client-credentials token against a mock Vanta API, recovers from an expired token,
//! and reads one organization through the resource facade.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use vanta_client::{
	Client,
	auth::{AccessToken, Credentials},
	resource::ResourceId,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let expired_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/organizations/org-1").header("authorization", "Bearer expired");
			then.status(401);
		})
		.await;
	let org_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/organizations/org-1")
				.header("authorization", "Bearer demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":\"org-1\",\"name\":\"Acme Corp\"}");
		})
		.await;
	let client = Client::builder(Credentials::client_credentials("demo-client", "super-secret"))
		.base_url(Url::parse(&server.url("/v1"))?)
		.token_endpoint(Url::parse(&server.url("/oauth/token"))?)
		.initial_token(AccessToken::new("expired"))
		.build()?;
	let organization = client.organizations().get(&ResourceId::new("org-1")?).await?;

	println!("Organization: {}.", organization.unwrap_or_default());
	println!(
		"Requests sent: {}, token refreshes: {}.",
		client.metrics().requests(),
		client.metrics().token_refreshes()
	);

	token_mock.assert_async().await;
	expired_mock.assert_async().await;
	org_mock.assert_async().await;

	Ok(())
}
