//! Common test utilities and helpers
//!
//! A manager bootstrapped with `source0`, which may configure `source1` and
//! `source2`, plus helpers to build documents with ever-increasing stamps and
//! to check the change notifications an insertion produced.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use settingsd_core::{
	InsertionStatus, SettingsDocumentManager, SettingsMap, SettingsService, dummy_delegate_factory,
};
use settingsd_types::keys::{make_source_key, source_access_key, source_name_key, source_status_key};
use settingsd_types::{Key, MemorySettingsDocument, SettingStatus, SettingValue, SourceId, VersionStamp};

pub const SOURCE0: &str = "source0";
pub const SOURCE1: &str = "source1";
pub const SOURCE2: &str = "source2";
pub const SHARED_KEY: &str = "shared";

pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

/// Add status, name and access rules for `source` to `doc`
pub fn configure_source(
	doc: &mut MemorySettingsDocument,
	source: &str,
	status: SettingStatus,
	access_rules: &[(Key, SettingStatus)],
) {
	doc.set_key(source_status_key(source), status).unwrap();
	doc.set_key(source_name_key(source), source).unwrap();
	for (key, rule) in access_rules {
		doc.set_key(source_access_key(source, key), *rule).unwrap();
	}
}

/// `source0` is active and may configure `source1` and `source2`
pub fn initial_trusted_document() -> MemorySettingsDocument {
	let mut doc = MemorySettingsDocument::new(VersionStamp::new());
	configure_source(
		&mut doc,
		SOURCE0,
		SettingStatus::Active,
		&[
			(make_source_key(SOURCE1), SettingStatus::Active),
			(make_source_key(SOURCE2), SettingStatus::Active),
		],
	);
	doc
}

pub struct TestHarness {
	pub manager: SettingsDocumentManager,
	pub current_version: VersionStamp,
}

impl TestHarness {
	pub fn new() -> Self {
		setup_test_logging();
		Self {
			manager: SettingsDocumentManager::new(
				dummy_delegate_factory(),
				SettingsMap::new(),
				&initial_trusted_document(),
			),
			current_version: VersionStamp::new(),
		}
	}

	/// Empty document whose stamp bumps `source`'s component of the shared clock
	pub fn make_document(&mut self, source: &str) -> MemorySettingsDocument {
		self.current_version.bump(source);
		MemorySettingsDocument::new(self.current_version.clone())
	}

	/// Insert `doc` and check the notifications it caused
	///
	/// There must be exactly one notification per entry of `expected`, and
	/// each notification must include the keys of its entry.
	pub fn insert(
		&mut self,
		doc: &MemorySettingsDocument,
		source: &str,
		expected: &[&[Key]],
	) -> InsertionStatus {
		let received: Arc<Mutex<Vec<BTreeSet<Key>>>> = Arc::default();
		let recorder = received.clone();
		let id = self.manager.add_settings_observer(Arc::new(
			move |keys: &BTreeSet<Key>, _: &dyn SettingsService| {
				recorder.lock().push(keys.clone());
			},
		));

		let status = self.manager.insert_document(doc, &SourceId::from(source));
		assert!(self.manager.remove_settings_observer(id));

		let received = received.lock();
		assert_eq!(received.len(), expected.len(), "unexpected notifications: {:?}", *received);
		for (keys, expected_keys) in received.iter().zip(expected) {
			for key in *expected_keys {
				assert!(keys.contains(key), "notification {:?} lacks {}", keys, key);
			}
		}
		status
	}

	/// Have `source0` configure `source` as active with access to its own
	/// sentinel and to the shared key
	pub fn configure_trusted_source(&mut self, source: &str) {
		let mut doc = self.make_document(SOURCE0);
		configure_source(
			&mut doc,
			source,
			SettingStatus::Active,
			&[(Key::new(source), SettingStatus::Active), (Key::new(SHARED_KEY), SettingStatus::Active)],
		);
		assert_eq!(self.insert(&doc, SOURCE0, &[&[]]), InsertionStatus::Success);
	}

	/// Write `source`'s sentinel value, the key named after the source
	pub fn add_sentinel_value(&mut self, source: &str) {
		let doc = self.make_document(source).with_key(Key::new(source), source).unwrap();
		assert_eq!(self.insert(&doc, source, &[&[]]), InsertionStatus::Success);
	}

	pub fn check_sentinel_values(&self, present: &[&str], absent: &[&str]) {
		for source in present {
			assert_eq!(
				self.manager.get_value(&Key::new(source)),
				Some(&SettingValue::from(*source)),
				"sentinel value {} missing or wrong",
				source
			);
		}
		for source in absent {
			assert!(self.manager.get_value(&Key::new(source)).is_none(), "sentinel value {} present", source);
		}
	}
}

/// Values of all keys at or below `prefix`
pub fn snapshot(manager: &SettingsDocumentManager, prefix: &Key) -> BTreeMap<Key, SettingValue> {
	manager
		.get_keys(prefix)
		.into_iter()
		.filter_map(|key| manager.get_value(&key).cloned().map(|value| (key, value)))
		.collect()
}

// vim: ts=4
