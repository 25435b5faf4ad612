//! Read-only settings lookup, handed to source delegates and trust evaluation

use std::collections::BTreeSet;

use crate::prelude::*;

pub trait SettingsService {
	fn get_value(&self, key: &Key) -> Option<&SettingValue>;

	/// Present keys at or below `prefix`
	fn get_keys(&self, prefix: &Key) -> BTreeSet<Key>;
}

// vim: ts=4
