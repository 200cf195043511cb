//! Cursor pagination over list endpoints.
//!
//! Two incompatible conventions exist for the same API, so the convention is a
//! [`PaginationStyle`] chosen when the client is built:
//!
//! | Style | Request params | Response envelope | Next cursor |
//! |---|---|---|---|
//! | [`PageInfo`](PaginationStyle::PageInfo) | `pageSize`, `pageCursor` | `{data, pageInfo: {hasNextPage, endCursor}}` | `endCursor` |
//! | [`OffsetCursor`](PaginationStyle::OffsetCursor) | `limit`, `starting_after` | `{data, has_more}` | `id` of the last record |
//!
//! A response without a `data` field is a single, complete, empty page.

// self
use crate::{
	_prelude::*,
	client::Client,
	error::{ConfigError, PaginationError},
	http::{Method, Query},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Pagination convention spoken by the target API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationStyle {
	/// `pageSize`/`pageCursor` with a `pageInfo` envelope.
	#[default]
	PageInfo,
	/// `limit`/`starting_after` with a `has_more` flag.
	OffsetCursor,
}
impl PaginationStyle {
	/// Query parameter carrying the page size.
	pub const fn size_param(self) -> &'static str {
		match self {
			Self::PageInfo => "pageSize",
			Self::OffsetCursor => "limit",
		}
	}

	/// Query parameter carrying the cursor.
	pub const fn cursor_param(self) -> &'static str {
		match self {
			Self::PageInfo => "pageCursor",
			Self::OffsetCursor => "starting_after",
		}
	}

	/// Builds the query for one page, keeping caller parameters that do not collide with the
	/// pagination parameters.
	pub fn page_query(
		self,
		base: &[(String, String)],
		page_size: u32,
		cursor: Option<&str>,
	) -> Query {
		let mut query = base
			.iter()
			.filter(|(key, _)| key != self.size_param() && key != self.cursor_param())
			.cloned()
			.collect::<Query>();

		query.push((self.size_param().into(), page_size.to_string()));

		if let Some(cursor) = cursor {
			query.push((self.cursor_param().into(), cursor.into()));
		}

		query
	}

	/// Splits a list response into records and the cursor of the next page.
	pub fn parse_page(self, path: &str, response: Option<Value>) -> Result<Page, PaginationError> {
		let Some(Value::Object(mut envelope)) = response else {
			return Ok(Page::default());
		};
		let records = match envelope.remove("data") {
			None | Some(Value::Null) => return Ok(Page::default()),
			Some(Value::Array(records)) => records,
			Some(_) => return Err(PaginationError::InvalidRecords { path: path.into() }),
		};
		let (has_more, cursor) = match self {
			Self::PageInfo => {
				let info = envelope.get("pageInfo");
				let has_more = info
					.and_then(|info| info.get("hasNextPage"))
					.and_then(Value::as_bool)
					.unwrap_or(false);
				let cursor = info
					.and_then(|info| info.get("endCursor"))
					.and_then(Value::as_str)
					.map(str::to_owned);

				(has_more, cursor)
			},
			Self::OffsetCursor => {
				let has_more = envelope.get("has_more").and_then(Value::as_bool).unwrap_or(false);
				let cursor = records.last().and_then(|record| record.get("id")).and_then(id_text);

				(has_more, cursor)
			},
		};

		if !has_more {
			return Ok(Page { records, next_cursor: None });
		}

		match cursor.filter(|cursor| !cursor.is_empty()) {
			Some(cursor) => Ok(Page { records, next_cursor: Some(cursor) }),
			None => Err(PaginationError::MissingCursor { path: path.into() }),
		}
	}
}

fn id_text(id: &Value) -> Option<String> {
	match id {
		Value::String(id) => Some(id.clone()),
		Value::Number(id) => Some(id.to_string()),
		_ => None,
	}
}

/// One page of opaque records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
	/// Records in server order.
	pub records: Vec<Value>,
	/// Cursor of the next page; `None` on the last page.
	pub next_cursor: Option<String>,
}
impl Page {
	/// Returns `true` when another page follows.
	pub fn has_more(&self) -> bool {
		self.next_cursor.is_some()
	}
}

/// Lazy traversal of a list endpoint, one page per [`Pager::next_page`] call.
///
/// Each page goes through [`Client::execute`], so rate limiting, the credential retry, and
/// error propagation apply unchanged. A failed page leaves the cursor untouched; calling
/// `next_page` again retries the same page.
#[derive(Debug)]
pub struct Pager<'a> {
	client: &'a Client,
	path: String,
	page_size: u32,
	query: Query,
	cursor: Option<String>,
	finished: bool,
	pages: usize,
}
impl<'a> Pager<'a> {
	/// Creates a pager over `path` requesting `page_size` records per page.
	pub fn new(client: &'a Client, path: impl Into<String>, page_size: u32) -> Result<Self> {
		if page_size == 0 {
			return Err(ConfigError::InvalidPageSize.into());
		}

		Ok(Self {
			client,
			path: path.into(),
			page_size,
			query: Vec::new(),
			cursor: None,
			finished: false,
			pages: 0,
		})
	}

	/// Adds caller query parameters sent with every page.
	pub fn with_query(mut self, query: Query) -> Self {
		self.query = query;

		self
	}

	/// Number of pages fetched so far.
	pub fn pages_fetched(&self) -> usize {
		self.pages
	}

	/// Returns `true` once the last page has been fetched.
	pub fn is_finished(&self) -> bool {
		self.finished
	}

	/// Fetches the next page, or `None` once the listing is exhausted.
	pub async fn next_page(&mut self) -> Result<Option<Page>> {
		if self.finished {
			return Ok(None);
		}

		let style = self.client.config().pagination;
		let query = style.page_query(&self.query, self.page_size, self.cursor.as_deref());
		let response =
			self.client.execute(Method::GET, &self.path, None, Some(query.as_slice())).await?;
		let page = style.parse_page(&self.path, response)?;

		if page.has_more() && page.next_cursor == self.cursor {
			return Err(PaginationError::CursorRepeated {
				path: self.path.clone(),
				cursor: page.next_cursor.unwrap_or_default(),
			}
			.into());
		}

		self.pages += 1;
		self.cursor = page.next_cursor.clone();
		self.finished = self.cursor.is_none();

		Ok(Some(page))
	}

	/// Drains the remaining pages and returns every record in page order.
	pub async fn collect_all(mut self) -> Result<Vec<Value>> {
		const KIND: CallKind = CallKind::Pagination;

		let span = CallSpan::new(KIND, "collect_all");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let mut records = Vec::new();

				while let Some(page) = self.next_page().await? {
					records.extend(page.records);
				}

				obs::debug_event(&format!(
					"Collected {} records from `{}` in {} pages.",
					records.len(),
					self.path,
					self.pages
				));

				Ok(records)
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}
}

impl Client {
	/// Starts a lazy traversal of `path`.
	pub fn pager(&self, path: impl Into<String>, page_size: u32) -> Result<Pager<'_>> {
		Pager::new(self, path, page_size)
	}

	/// Fetches every page of `path` and returns all records in page order.
	pub async fn collect_all(&self, path: &str, page_size: u32) -> Result<Vec<Value>> {
		Pager::new(self, path, page_size)?.collect_all().await
	}
}
