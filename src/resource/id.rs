//! Validated record identifiers used in `{resource}/{id}` paths.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

/// Maximum number of bytes allowed in a record identifier.
pub const IDENTIFIER_MAX_LEN: usize = 256;

/// Errors produced while validating a [`ResourceId`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("Resource identifier cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Resource identifier contains whitespace.")]
	ContainsWhitespace,
	/// The identifier contains characters that would change the request path.
	#[error("Resource identifier contains the reserved character `{0}`.")]
	ReservedCharacter(char),
	/// The identifier exceeded the allowed length.
	#[error("Resource identifier exceeds {max} bytes.")]
	TooLong {
		/// Maximum permitted length.
		max: usize,
	},
}

/// Identifier of a single record; safe to splice into a request path.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);
impl ResourceId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}

	/// Reads the `id` field of a record returned by the API.
	pub fn from_record(record: &Value) -> Option<Self> {
		record.get("id").and_then(Value::as_str).and_then(|id| Self::new(id).ok())
	}
}
impl Deref for ResourceId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ResourceId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<ResourceId> for String {
	fn from(value: ResourceId) -> Self {
		value.0
	}
}
impl TryFrom<String> for ResourceId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl Borrow<str> for ResourceId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for ResourceId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ResourceId({})", self.0)
	}
}
impl Display for ResourceId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for ResourceId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

fn validate_view(view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace);
	}
	if let Some(reserved) = view.chars().find(|c| matches!(c, '/' | '?' | '#' | '%' | '\\')) {
		return Err(IdentifierError::ReservedCharacter(reserved));
	}
	if view == "." || view == ".." {
		return Err(IdentifierError::ReservedCharacter('.'));
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
