//! Small identifier types

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::key::SEPARATOR;

/// Identifier of a settings source (an enterprise policy feed, a local file, ...)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(Box<str>);

impl SourceId {
	pub fn new(id: impl Into<Box<str>>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// A usable id is a single non-empty key segment, since it names
	/// `sources/<id>` in the settings tree
	pub fn is_valid(&self) -> bool {
		!self.0.is_empty() && !self.0.contains(SEPARATOR)
	}
}

impl fmt::Display for SourceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for SourceId {
	fn from(id: &str) -> Self {
		Self(id.into())
	}
}

impl From<String> for SourceId {
	fn from(id: String) -> Self {
		Self(id.into_boxed_str())
	}
}

impl AsRef<str> for SourceId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

// Ord/Eq of SourceId are those of the inner str, so map lookups by &str are consistent
impl Borrow<str> for SourceId {
	fn borrow(&self) -> &str {
		&self.0
	}
}


// vim: ts=4
