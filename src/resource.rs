//! Uniform CRUD facade over the API's resource collections.
//!
//! Every operation is a fixed mapping onto one [`Client::execute`] call against `{kind}` or
//! `{kind}/{id}`; `list_all` delegates to the pager.

pub mod id;

pub use id::*;

// self
use crate::{
	_prelude::*,
	client::Client,
	http::{Method, Query},
};

/// Resource collections exposed by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
	/// `organizations`
	Organizations,
	/// `users`
	Users,
	/// `controls`
	Controls,
	/// `evidence`
	Evidence,
	/// `audits`
	Audits,
}
impl ResourceKind {
	/// Every resource kind, in declaration order.
	pub const ALL: [Self; 5] =
		[Self::Organizations, Self::Users, Self::Controls, Self::Evidence, Self::Audits];

	/// Collection path relative to the base URL.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Organizations => "organizations",
			Self::Users => "users",
			Self::Controls => "controls",
			Self::Evidence => "evidence",
			Self::Audits => "audits",
		}
	}

	/// Path of a single record.
	pub fn item_path(self, id: &ResourceId) -> String {
		format!("{}/{id}", self.as_str())
	}
}
impl Display for ResourceKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ResourceKind {
	type Err = UnknownResourceKind;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str() == s)
			.ok_or_else(|| UnknownResourceKind(s.to_owned()))
	}
}

/// Raised when parsing a name that is not a known resource collection.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown resource kind `{0}`.")]
pub struct UnknownResourceKind(pub String);

/// CRUD operations for one resource collection.
#[derive(Clone, Copy, Debug)]
pub struct ResourceApi<'a> {
	client: &'a Client,
	kind: ResourceKind,
}
impl<'a> ResourceApi<'a> {
	/// Binds `kind` to `client`.
	pub fn new(client: &'a Client, kind: ResourceKind) -> Self {
		Self { client, kind }
	}

	/// Collection this handle operates on.
	pub fn kind(&self) -> ResourceKind {
		self.kind
	}

	/// `GET {kind}` with optional query parameters; returns the raw list envelope.
	pub async fn list(&self, query: Option<&[(String, String)]>) -> Result<Option<Value>> {
		self.client.execute(Method::GET, self.kind.as_str(), None, query).await
	}

	/// `GET {kind}/{id}`.
	pub async fn get(&self, id: &ResourceId) -> Result<Option<Value>> {
		self.client.execute(Method::GET, &self.kind.item_path(id), None, None).await
	}

	/// `POST {kind}`.
	pub async fn create(&self, body: &Value) -> Result<Option<Value>> {
		self.client.execute(Method::POST, self.kind.as_str(), Some(body), None).await
	}

	/// `PUT {kind}/{id}`.
	pub async fn update(&self, id: &ResourceId, body: &Value) -> Result<Option<Value>> {
		self.client.execute(Method::PUT, &self.kind.item_path(id), Some(body), None).await
	}

	/// `DELETE {kind}/{id}`; `None` when the API answers without a body.
	pub async fn delete(&self, id: &ResourceId) -> Result<Option<Value>> {
		self.client.execute(Method::DELETE, &self.kind.item_path(id), None, None).await
	}

	/// Every record of the collection, fetched `page_size` at a time.
	pub async fn list_all(&self, page_size: u32) -> Result<Vec<Value>> {
		self.client.collect_all(self.kind.as_str(), page_size).await
	}

	/// Every record matching `query`, fetched `page_size` at a time.
	pub async fn list_all_with(&self, query: Query, page_size: u32) -> Result<Vec<Value>> {
		self.client.pager(self.kind.as_str(), page_size)?.with_query(query).collect_all().await
	}
}

impl Client {
	/// Facade for an arbitrary resource collection.
	pub fn resource(&self, kind: ResourceKind) -> ResourceApi<'_> {
		ResourceApi::new(self, kind)
	}

	/// Facade for `organizations`.
	pub fn organizations(&self) -> ResourceApi<'_> {
		self.resource(ResourceKind::Organizations)
	}

	/// Facade for `users`.
	pub fn users(&self) -> ResourceApi<'_> {
		self.resource(ResourceKind::Users)
	}

	/// Facade for `controls`.
	pub fn controls(&self) -> ResourceApi<'_> {
		self.resource(ResourceKind::Controls)
	}

	/// Facade for `evidence`.
	pub fn evidence(&self) -> ResourceApi<'_> {
		self.resource(ResourceKind::Evidence)
	}

	/// Facade for `audits`.
	pub fn audits(&self) -> ResourceApi<'_> {
		self.resource(ResourceKind::Audits)
	}

	/// `list_all` on the collection with the configured page size.
	pub async fn list_all(&self, kind: ResourceKind) -> Result<Vec<Value>> {
		self.resource(kind).list_all(self.config().page_size).await
	}
}
