//! Settings documents
//!
//! A document is the unit a source hands to the engine: a version stamp, a set
//! of key assignments, and a set of explicit deletions. A deletion asserts that
//! the key and everything below it should not exist; keys a document does not
//! mention are left alone.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ClResult, Error};
use crate::key::Key;
use crate::value::SettingValue;
use crate::version_stamp::VersionStamp;

/// Read access to a settings document
pub trait SettingsDocument: Send + Sync {
	fn version_stamp(&self) -> &VersionStamp;

	/// Point lookup of an assignment
	fn get_value(&self, key: &Key) -> Option<&SettingValue>;

	/// All assignments, in key order
	fn assignments(&self) -> Box<dyn Iterator<Item = (&Key, &SettingValue)> + '_>;

	/// All deleted keys, in key order
	fn deletions(&self) -> Box<dyn Iterator<Item = &Key> + '_>;

	fn has_deletion(&self, key: &Key) -> bool {
		self.deletions().any(|deleted| deleted == key)
	}

	/// Every key the document writes, assignments and deletions alike
	fn written_keys(&self) -> BTreeSet<Key> {
		self.assignments()
			.map(|(key, _)| key.clone())
			.chain(self.deletions().cloned())
			.collect()
	}

	fn is_empty(&self) -> bool {
		self.assignments().next().is_none() && self.deletions().next().is_none()
	}
}

/// In-memory document, used by delegates that build documents themselves
/// and for the bootstrap trust document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySettingsDocument {
	version_stamp: VersionStamp,
	values: BTreeMap<Key, SettingValue>,
	deletions: BTreeSet<Key>,
}

impl MemorySettingsDocument {
	pub fn new(version_stamp: VersionStamp) -> Self {
		Self { version_stamp, ..Self::default() }
	}

	/// Assign `value` to `key`; fails if the document already deletes `key`
	pub fn set_key(&mut self, key: Key, value: impl Into<SettingValue>) -> ClResult<()> {
		if self.deletions.contains(&key) {
			return Err(Error::ValidationError(format!(
				"Key '{}' is already deleted by this document",
				key
			)));
		}
		self.values.insert(key, value.into());
		Ok(())
	}

	/// Delete `key` and its subtree; fails if the document already assigns `key`
	pub fn set_deletion(&mut self, key: Key) -> ClResult<()> {
		if self.values.contains_key(&key) {
			return Err(Error::ValidationError(format!(
				"Key '{}' is already assigned by this document",
				key
			)));
		}
		self.deletions.insert(key);
		Ok(())
	}

	pub fn with_key(mut self, key: Key, value: impl Into<SettingValue>) -> ClResult<Self> {
		self.set_key(key, value)?;
		Ok(self)
	}

	pub fn with_deletion(mut self, key: Key) -> ClResult<Self> {
		self.set_deletion(key)?;
		Ok(self)
	}
}

impl SettingsDocument for MemorySettingsDocument {
	fn version_stamp(&self) -> &VersionStamp {
		&self.version_stamp
	}

	fn get_value(&self, key: &Key) -> Option<&SettingValue> {
		self.values.get(key)
	}

	fn assignments(&self) -> Box<dyn Iterator<Item = (&Key, &SettingValue)> + '_> {
		Box::new(self.values.iter())
	}

	fn deletions(&self) -> Box<dyn Iterator<Item = &Key> + '_> {
		Box::new(self.deletions.iter())
	}

	fn has_deletion(&self, key: &Key) -> bool {
		self.deletions.contains(key)
	}
}


// vim: ts=4
