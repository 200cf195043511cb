//! Lists every control of a mock Vanta API with a static API key and offset-cursor pagination.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use vanta_client::{Client, auth::Credentials, pagination::PaginationStyle};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let first_page = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/controls")
				.header("authorization", "Bearer demo-key")
				.query_param_missing("starting_after");
			then.status(200).json_body(json!({
				"data": [{ "id": "ctl-1", "name": "MFA" }, { "id": "ctl-2", "name": "Backups" }],
				"has_more": true,
			}));
		})
		.await;
	let last_page = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/controls").query_param("starting_after", "ctl-2");
			then.status(200).json_body(json!({
				"data": [{ "id": "ctl-3", "name": "Access reviews" }],
				"has_more": false,
			}));
		})
		.await;
	let client = Client::builder(Credentials::api_key("demo-key"))
		.base_url(Url::parse(&server.url("/v1"))?)
		.pagination(PaginationStyle::OffsetCursor)
		.page_size(2)
		.build()?;

	for control in client.controls().list_all(client.config().page_size).await? {
		println!("{}: {}", control["id"], control["name"]);
	}

	first_page.assert_async().await;
	last_page.assert_async().await;

	Ok(())
}
