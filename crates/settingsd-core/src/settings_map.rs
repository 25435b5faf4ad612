//! Merged settings state
//!
//! The map holds, for every present key, the winning value together with the
//! version stamp of the document that wrote it and the writer's identity.
//! Explicit deletions leave a tombstone carrying the deleting document's
//! stamp, so later writes into a deleted subtree can still be checked for
//! collisions. Entries removed by trust revocation leave no tombstone.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use settingsd_types::SettingsDocument;

use crate::prelude::*;
use crate::service::SettingsService;
use crate::trust;

/// Who wrote an entry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Writer {
	/// The initial trusted document; never subject to trust checks or revocation
	Bootstrap,
	Source(SourceId),
}

impl Writer {
	pub fn source(&self) -> Option<&SourceId> {
		match self {
			Writer::Bootstrap => None,
			Writer::Source(id) => Some(id),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingEntry {
	pub value: SettingValue,
	pub version_stamp: VersionStamp,
	pub writer: Writer,
}

#[derive(Debug, Default)]
pub struct SettingsMap {
	entries: BTreeMap<Key, SettingEntry>,
	tombstones: BTreeMap<Key, VersionStamp>,
}

impl SettingsMap {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get_value(&self, key: &Key) -> Option<&SettingValue> {
		self.entries.get(key).map(|entry| &entry.value)
	}

	pub fn get_entry(&self, key: &Key) -> Option<&SettingEntry> {
		self.entries.get(key)
	}

	/// Present keys at or below `prefix`
	pub fn get_keys(&self, prefix: &Key) -> BTreeSet<Key> {
		self.entries_below(prefix).map(|(key, _)| key.clone()).collect()
	}

	/// Entries at or below `prefix`, in key order
	pub fn entries_below<'a>(
		&'a self,
		prefix: &'a Key,
	) -> impl Iterator<Item = (&'a Key, &'a SettingEntry)> + 'a {
		self.entries.range(prefix.clone()..).take_while(move |(key, _)| prefix.is_prefix_of(key))
	}

	/// Tombstones at `key` or any of its ancestors
	pub fn tombstones_covering<'a>(
		&'a self,
		key: &'a Key,
	) -> impl Iterator<Item = (&'a Key, &'a VersionStamp)> + 'a {
		key.ancestors().filter_map(move |ancestor| self.tombstones.get_key_value(&ancestor))
	}

	/// Tombstoned keys at or below `prefix`
	pub fn tombstones_below<'a>(&'a self, prefix: &'a Key) -> impl Iterator<Item = &'a Key> + 'a {
		self.tombstones
			.range(prefix.clone()..)
			.take_while(move |(key, _)| prefix.is_prefix_of(key))
			.map(|(key, _)| key)
	}

	/// Keys whose current value was written by `source`
	pub fn keys_written_by(&self, source: &SourceId) -> Vec<Key> {
		self.entries
			.iter()
			.filter(|(_, entry)| entry.writer.source() == Some(source))
			.map(|(key, _)| key.clone())
			.collect()
	}

	/// Whether `writer` may currently write `key`, judged from the map's own
	/// `sources/*` namespace
	pub fn can_set_key(&self, key: &Key, writer: &Writer) -> bool {
		trust::can_write(self, writer, key)
	}

	/// Whether `writer` may delete `key` together with everything below it
	///
	/// Every present entry and tombstone in the subtree is checked on its own,
	/// so a more specific rule below `key` still binds the deletion.
	pub fn can_delete_key(&self, key: &Key, writer: &Writer) -> bool {
		self.can_set_key(key, writer)
			&& self.entries_below(key).all(|(below, _)| self.can_set_key(below, writer))
			&& self.tombstones_below(key).all(|below| self.can_set_key(below, writer))
	}

	/// Keys of `document` that `writer` may not write, in key order
	pub fn denied_keys(&self, document: &dyn SettingsDocument, writer: &Writer) -> BTreeSet<Key> {
		document
			.written_keys()
			.into_iter()
			.filter(|key| {
				if document.has_deletion(key) {
					!self.can_delete_key(key, writer)
				} else {
					!self.can_set_key(key, writer)
				}
			})
			.collect()
	}

	/// Apply the parts of `document` that `writer` is allowed to write
	///
	/// Permissions are evaluated against the state before the document is
	/// applied. Forbidden keys are dropped, permitted ones are applied. Returns
	/// the keys whose value or presence changed.
	pub fn insert_document(
		&mut self,
		document: &dyn SettingsDocument,
		writer: &Writer,
	) -> BTreeSet<Key> {
		let denied = self.denied_keys(document, writer);
		if !denied.is_empty() {
			debug!(writer = ?writer, denied = denied.len(), "Dropping keys the writer may not set");
		}
		self.apply(document, writer, |key| !denied.contains(key))
	}

	/// Apply all of `document` without any trust check
	pub(crate) fn apply_unchecked(
		&mut self,
		document: &dyn SettingsDocument,
		writer: &Writer,
	) -> BTreeSet<Key> {
		self.apply(document, writer, |_| true)
	}

	fn apply<F>(
		&mut self,
		document: &dyn SettingsDocument,
		writer: &Writer,
		permitted: F,
	) -> BTreeSet<Key>
	where
		F: Fn(&Key) -> bool,
	{
		let stamp = document.version_stamp();
		let mut changed = BTreeSet::new();

		// Deletions first, so a document can replace a whole subtree
		for deleted in document.deletions() {
			if !permitted(deleted) {
				continue;
			}
			let doomed: Vec<Key> = self.entries_below(deleted).map(|(key, _)| key.clone()).collect();
			for key in doomed {
				self.entries.remove(&key);
				changed.insert(key);
			}

			// The new tombstone covers older ones below it
			let covered: Vec<Key> = self
				.tombstones
				.range(deleted.clone()..)
				.take_while(|(key, _)| deleted.is_prefix_of(key))
				.map(|(key, _)| key.clone())
				.collect();
			let mut tombstone = stamp.clone();
			for key in covered {
				if let Some(older) = self.tombstones.remove(&key) {
					tombstone = tombstone.join(&older);
				}
			}
			self.tombstones.insert(deleted.clone(), tombstone);
		}

		for (key, value) in document.assignments() {
			if !permitted(key) {
				continue;
			}
			// An identical value keeps its original writer and stamp
			if self.entries.get(key).is_some_and(|entry| entry.value == *value) {
				continue;
			}
			self.tombstones.remove(key);
			self.entries.insert(
				key.clone(),
				SettingEntry {
					value: value.clone(),
					version_stamp: stamp.clone(),
					writer: writer.clone(),
				},
			);
			changed.insert(key.clone());
		}

		changed
	}

	/// First key `document` writes whose current state it is not causally after
	///
	/// A write collides when the stamp of the value it would replace (or of the
	/// tombstone covering the key) is concurrent with, or newer than, the
	/// document's stamp. Writes that leave the value unchanged never collide.
	pub fn find_collision(&self, document: &dyn SettingsDocument) -> Option<Key> {
		let stamp = document.version_stamp();

		for deleted in document.deletions() {
			if let Some((key, _)) =
				self.entries_below(deleted).find(|(_, entry)| !supersedes(stamp, &entry.version_stamp))
			{
				return Some(key.clone());
			}
		}

		for (key, value) in document.assignments() {
			let current = self.entries.get(key);
			if current.is_some_and(|entry| entry.value == *value) {
				continue;
			}
			if current.is_some_and(|entry| !supersedes(stamp, &entry.version_stamp)) {
				return Some(key.clone());
			}
			if self.tombstones_covering(key).any(|(_, deleted_at)| !supersedes(stamp, deleted_at)) {
				return Some(key.clone());
			}
		}

		None
	}

	/// Drop an entry without leaving a tombstone
	pub(crate) fn remove_entry(&mut self, key: &Key) -> Option<SettingEntry> {
		self.entries.remove(key)
	}
}

impl SettingsService for SettingsMap {
	fn get_value(&self, key: &Key) -> Option<&SettingValue> {
		SettingsMap::get_value(self, key)
	}

	fn get_keys(&self, prefix: &Key) -> BTreeSet<Key> {
		SettingsMap::get_keys(self, prefix)
	}
}

/// `incoming` is causally after, or equal to, `current`
fn supersedes(incoming: &VersionStamp, current: &VersionStamp) -> bool {
	matches!(incoming.compare(current), Some(Ordering::Greater | Ordering::Equal))
}

#[cfg(test)]
mod tests {
	use super::*;
	use settingsd_types::MemorySettingsDocument;
	use settingsd_types::keys::{source_access_key, source_status_key};

	fn bootstrap(map: &mut SettingsMap) {
		let doc = MemorySettingsDocument::new(VersionStamp::new())
			.with_key(source_status_key("s1"), SettingStatus::Active)
			.unwrap()
			.with_key(source_access_key("s1", &Key::new("allowed")), SettingStatus::Active)
			.unwrap();
		map.apply_unchecked(&doc, &Writer::Bootstrap);
	}

	fn s1() -> Writer {
		Writer::Source(SourceId::from("s1"))
	}

	#[test]
	fn test_insert_reports_changes() {
		let mut map = SettingsMap::new();
		bootstrap(&mut map);

		let doc = MemorySettingsDocument::new(VersionStamp::new().with("s1", 1))
			.with_key(Key::new("allowed/a"), 1)
			.unwrap();
		let changed = map.insert_document(&doc, &s1());
		assert_eq!(changed, BTreeSet::from([Key::new("allowed/a")]));
		assert_eq!(map.get_value(&Key::new("allowed/a")), Some(&SettingValue::Int(1)));

		// Same value again is not a change
		let doc = MemorySettingsDocument::new(VersionStamp::new().with("s1", 2))
			.with_key(Key::new("allowed/a"), 1)
			.unwrap();
		assert!(map.insert_document(&doc, &s1()).is_empty());
		// ...and keeps the original stamp
		assert_eq!(
			map.get_entry(&Key::new("allowed/a")).unwrap().version_stamp,
			VersionStamp::new().with("s1", 1)
		);
	}

	#[test]
	fn test_insert_drops_forbidden_keys_only() {
		let mut map = SettingsMap::new();
		bootstrap(&mut map);

		let doc = MemorySettingsDocument::new(VersionStamp::new().with("s1", 1))
			.with_key(Key::new("allowed"), "yes")
			.unwrap()
			.with_key(Key::new("forbidden"), "no")
			.unwrap();
		let changed = map.insert_document(&doc, &s1());
		assert_eq!(changed, BTreeSet::from([Key::new("allowed")]));
		assert!(map.get_value(&Key::new("forbidden")).is_none());
	}

	#[test]
	fn test_deletion_respects_rules_below() {
		let mut map = SettingsMap::new();
		bootstrap(&mut map);
		let doc = MemorySettingsDocument::new(VersionStamp::new())
			.with_key(Key::new("allowed/locked"), "kept")
			.unwrap()
			.with_key(
				source_access_key("s1", &Key::new("allowed/locked")),
				SettingStatus::Withdrawn,
			)
			.unwrap();
		map.apply_unchecked(&doc, &Writer::Bootstrap);

		assert!(map.can_set_key(&Key::new("allowed"), &s1()));
		assert!(!map.can_delete_key(&Key::new("allowed"), &s1()));
		assert!(map.can_delete_key(&Key::new("allowed/open"), &s1()));

		let delete = MemorySettingsDocument::new(VersionStamp::new().with("s1", 1))
			.with_deletion(Key::new("allowed"))
			.unwrap();
		assert_eq!(map.denied_keys(&delete, &s1()), BTreeSet::from([Key::new("allowed")]));
		assert!(map.insert_document(&delete, &s1()).is_empty());
		assert_eq!(map.get_value(&Key::new("allowed/locked")), Some(&SettingValue::from("kept")));
	}

	#[test]
	fn test_deletion_checks_tombstones_below() {
		let mut map = SettingsMap::new();
		bootstrap(&mut map);
		let doc = MemorySettingsDocument::new(VersionStamp::new())
			.with_key(Key::new("allowed/gone"), 1)
			.unwrap()
			.with_key(source_access_key("s1", &Key::new("allowed/gone")), SettingStatus::Invalid)
			.unwrap();
		map.apply_unchecked(&doc, &Writer::Bootstrap);
		let delete = MemorySettingsDocument::new(VersionStamp::new().with("b", 1))
			.with_deletion(Key::new("allowed/gone"))
			.unwrap();
		map.apply_unchecked(&delete, &Writer::Bootstrap);
		assert_eq!(map.tombstones_below(&Key::new("allowed")).collect::<Vec<_>>(), vec![
			&Key::new("allowed/gone")
		]);

		assert!(!map.can_delete_key(&Key::new("allowed"), &s1()));
	}

	#[test]
	fn test_subtree_deletion() {
		let mut map = SettingsMap::new();
		let doc = MemorySettingsDocument::new(VersionStamp::new().with("a", 1))
			.with_key(Key::new("x/1"), 1)
			.unwrap()
			.with_key(Key::new("x/2"), 2)
			.unwrap()
			.with_key(Key::new("xy"), 3)
			.unwrap();
		map.apply_unchecked(&doc, &Writer::Bootstrap);

		let doc = MemorySettingsDocument::new(VersionStamp::new().with("a", 2))
			.with_deletion(Key::new("x"))
			.unwrap();
		let changed = map.apply_unchecked(&doc, &Writer::Bootstrap);
		assert_eq!(changed, BTreeSet::from([Key::new("x/1"), Key::new("x/2")]));
		assert_eq!(map.get_keys(&Key::root()), BTreeSet::from([Key::new("xy")]));
	}

	#[test]
	fn test_collision_against_concurrent_value() {
		let mut map = SettingsMap::new();
		let common = VersionStamp::new().with("s0", 2);
		let doc = MemorySettingsDocument::new(common.clone().with("s1", 1))
			.with_key(Key::new("shared"), 42)
			.unwrap();
		map.apply_unchecked(&doc, &s1());

		let concurrent = MemorySettingsDocument::new(common.clone().with("s2", 1))
			.with_key(Key::new("shared"), 0)
			.unwrap();
		assert_eq!(map.find_collision(&concurrent), Some(Key::new("shared")));

		// Same value is not a conflict
		let agreeing = MemorySettingsDocument::new(common.clone().with("s2", 1))
			.with_key(Key::new("shared"), 42)
			.unwrap();
		assert_eq!(map.find_collision(&agreeing), None);

		// A causally later write is fine
		let later = MemorySettingsDocument::new(common.with("s1", 1).with("s2", 1))
			.with_key(Key::new("shared"), 0)
			.unwrap();
		assert_eq!(map.find_collision(&later), None);
	}

	#[test]
	fn test_collision_against_tombstone() {
		let mut map = SettingsMap::new();
		let doc = MemorySettingsDocument::new(VersionStamp::new().with("s1", 1))
			.with_key(Key::new("dir/a"), 1)
			.unwrap();
		map.apply_unchecked(&doc, &s1());
		let delete = MemorySettingsDocument::new(VersionStamp::new().with("s1", 2))
			.with_deletion(Key::new("dir"))
			.unwrap();
		map.apply_unchecked(&delete, &s1());

		let concurrent = MemorySettingsDocument::new(VersionStamp::new().with("s1", 1).with("s2", 1))
			.with_key(Key::new("dir/a"), 5)
			.unwrap();
		assert_eq!(map.find_collision(&concurrent), Some(Key::new("dir/a")));

		let later = MemorySettingsDocument::new(VersionStamp::new().with("s1", 2).with("s2", 1))
			.with_key(Key::new("dir/a"), 5)
			.unwrap();
		assert_eq!(map.find_collision(&later), None);
	}

	#[test]
	fn test_deleting_concurrent_value_collides() {
		let mut map = SettingsMap::new();
		let doc = MemorySettingsDocument::new(VersionStamp::new().with("s1", 1))
			.with_key(Key::new("k"), 1)
			.unwrap();
		map.apply_unchecked(&doc, &s1());
		let delete = MemorySettingsDocument::new(VersionStamp::new().with("s2", 1))
			.with_deletion(Key::new("k"))
			.unwrap();
		assert_eq!(map.find_collision(&delete), Some(Key::new("k")));
	}

	#[test]
	fn test_keys_written_by() {
		let mut map = SettingsMap::new();
		bootstrap(&mut map);
		let doc = MemorySettingsDocument::new(VersionStamp::new().with("s1", 1))
			.with_key(Key::new("allowed"), 1)
			.unwrap();
		map.apply_unchecked(&doc, &s1());
		assert_eq!(map.keys_written_by(&SourceId::from("s1")), vec![Key::new("allowed")]);
		assert!(map.keys_written_by(&SourceId::from("s2")).is_empty());
	}
}

// vim: ts=4
