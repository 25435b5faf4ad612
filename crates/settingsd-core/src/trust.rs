//! Trust evaluation over the `sources/*` namespace
//!
//! A source may write a key when its own status is `active` and the most
//! specific access rule covering the key is `active`. The rule for a key is
//! found by walking from the key towards the root: the first of
//! `sources/<id>/access/<key>`, `sources/<id>/access/<parent>`, ...,
//! `sources/<id>/access` that is present wins.
//!
//! For values already in the map, the source status and the covering rule
//! combine into an effective status. `invalid` (including a missing or
//! unparseable status or rule) means the value goes away; `withdrawn` keeps it.

use settingsd_types::keys;

use crate::prelude::*;
use crate::service::SettingsService;
use crate::settings_map::Writer;

/// Status recorded at `sources/<id>/status`; unparseable values count as `invalid`
pub fn source_status(settings: &dyn SettingsService, source: &str) -> Option<SettingStatus> {
	settings
		.get_value(&keys::source_status_key(source))
		.map(|value| SettingStatus::from_value(value).unwrap_or(SettingStatus::Invalid))
}

/// Most specific access rule of `source` covering `key`
pub fn access_rule(settings: &dyn SettingsService, source: &str, key: &Key) -> Option<SettingStatus> {
	let access_root = keys::source_access_root(source);
	key.ancestors().find_map(|ancestor| {
		settings
			.get_value(&access_root.append(&ancestor))
			.map(|value| SettingStatus::from_value(value).unwrap_or(SettingStatus::Invalid))
	})
}

/// Whether `source` may insert documents at all
pub fn source_is_active(settings: &dyn SettingsService, source: &str) -> bool {
	source_status(settings, source) == Some(SettingStatus::Active)
}

pub fn can_write(settings: &dyn SettingsService, writer: &Writer, key: &Key) -> bool {
	match writer {
		Writer::Bootstrap => true,
		Writer::Source(source) => {
			source_is_active(settings, source.as_str())
				&& access_rule(settings, source.as_str(), key) == Some(SettingStatus::Active)
		}
	}
}

/// Status governing a value `source` wrote at `key`
pub fn effective_status(settings: &dyn SettingsService, source: &str, key: &Key) -> SettingStatus {
	let status = source_status(settings, source).unwrap_or(SettingStatus::Invalid);
	let rule = access_rule(settings, source, key).unwrap_or(SettingStatus::Invalid);
	status.combine(rule)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::settings_map::SettingsMap;
	use settingsd_types::MemorySettingsDocument;
	use settingsd_types::keys::{source_access_key, source_access_root, source_status_key};

	fn map_with(entries: &[(Key, &str)]) -> SettingsMap {
		let mut doc = MemorySettingsDocument::new(VersionStamp::new());
		for (key, value) in entries {
			doc.set_key(key.clone(), *value).unwrap();
		}
		let mut map = SettingsMap::new();
		map.apply_unchecked(&doc, &Writer::Bootstrap);
		map
	}

	#[test]
	fn test_most_specific_rule_wins() {
		let map = map_with(&[
			(source_status_key("s"), "active"),
			(source_access_key("s", &Key::new("a")), "active"),
			(source_access_key("s", &Key::new("a/b")), "withdrawn"),
		]);
		assert_eq!(access_rule(&map, "s", &Key::new("a/c")), Some(SettingStatus::Active));
		assert_eq!(access_rule(&map, "s", &Key::new("a/b/c")), Some(SettingStatus::Withdrawn));
		assert_eq!(access_rule(&map, "s", &Key::new("z")), None);

		let writer = Writer::Source(SourceId::from("s"));
		assert!(can_write(&map, &writer, &Key::new("a")));
		assert!(!can_write(&map, &writer, &Key::new("a/b")));
		assert!(!can_write(&map, &writer, &Key::new("z")));
	}

	#[test]
	fn test_root_rule_covers_everything() {
		let map = map_with(&[(source_status_key("s"), "active"), (source_access_root("s"), "active")]);
		assert!(can_write(&map, &Writer::Source(SourceId::from("s")), &Key::new("any/thing")));
	}

	#[test]
	fn test_inactive_source_cannot_write() {
		let map = map_with(&[
			(source_status_key("s"), "withdrawn"),
			(source_access_key("s", &Key::new("a")), "active"),
		]);
		assert!(!can_write(&map, &Writer::Source(SourceId::from("s")), &Key::new("a")));
		assert!(can_write(&map, &Writer::Bootstrap, &Key::new("a")));
	}

	#[test]
	fn test_effective_status() {
		let map = map_with(&[
			(source_status_key("s"), "withdrawn"),
			(source_access_key("s", &Key::new("a")), "active"),
			(source_access_key("s", &Key::new("b")), "invalid"),
			(source_status_key("t"), "bogus"),
		]);
		assert_eq!(effective_status(&map, "s", &Key::new("a")), SettingStatus::Withdrawn);
		assert_eq!(effective_status(&map, "s", &Key::new("b")), SettingStatus::Invalid);
		assert_eq!(effective_status(&map, "s", &Key::new("c")), SettingStatus::Invalid);
		assert_eq!(effective_status(&map, "t", &Key::new("a")), SettingStatus::Invalid);
		assert_eq!(effective_status(&map, "nobody", &Key::new("a")), SettingStatus::Invalid);
	}
}

// vim: ts=4
