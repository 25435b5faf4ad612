//! Settings document manager
//!
//! The manager accepts documents from sources, checks them against the trust
//! graph stored in its own `sources/*` namespace, merges them into the settings
//! map, and propagates trust revocations transitively before telling observers
//! what changed.
//!
//! Insertion is all-or-nothing. A document is rejected as a whole when
//! - its stamp does not advance the source's own component (`VersionClash`),
//! - the source id is malformed, the source is not active, or any written key
//!   (or anything a deletion would remove) is outside its grants
//!   (`AccessViolation`),
//! - it would overwrite or delete a value it has not seen (`Collision`).

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use settingsd_types::{SettingsDocument, keys};

use crate::config::SettingsdConfig;
use crate::observer::{ObserverId, SettingsObserver};
use crate::prelude::*;
use crate::service::SettingsService;
use crate::settings_map::{SettingsMap, Writer};
use crate::source::{Source, SourceDelegateFactory};
use crate::trust;

/// Outcome of [`SettingsDocumentManager::insert_document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertionStatus {
	Success,
	/// The source is not active, or the document writes a key outside its grants
	AccessViolation,
	/// The source's own stamp component did not advance
	VersionClash,
	/// The document conflicts with a value or deletion it is not causally after
	Collision,
}

impl InsertionStatus {
	pub fn is_success(self) -> bool {
		self == InsertionStatus::Success
	}

	pub fn as_str(self) -> &'static str {
		match self {
			InsertionStatus::Success => "success",
			InsertionStatus::AccessViolation => "access-violation",
			InsertionStatus::VersionClash => "version-clash",
			InsertionStatus::Collision => "collision",
		}
	}
}

impl fmt::Display for InsertionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Default)]
pub struct ManagerOptions {
	/// Notify observers even when an accepted document changed nothing
	pub notify_empty_changes: bool,
}

pub struct SettingsDocumentManager {
	map: SettingsMap,
	sources: BTreeMap<SourceId, Source>,
	delegate_factory: SourceDelegateFactory,
	/// Highest own stamp component accepted per source
	high_water: VersionStamp,
	observers: Vec<(ObserverId, Arc<dyn SettingsObserver>)>,
	next_observer_id: u64,
	options: ManagerOptions,
}

impl SettingsDocumentManager {
	/// Create a manager over `map`, applying `initial` as the trusted bootstrap
	/// document
	pub fn new(
		delegate_factory: SourceDelegateFactory,
		map: SettingsMap,
		initial: &dyn SettingsDocument,
	) -> Self {
		Self::with_options(delegate_factory, map, initial, ManagerOptions::default())
	}

	pub fn with_options(
		delegate_factory: SourceDelegateFactory,
		mut map: SettingsMap,
		initial: &dyn SettingsDocument,
		options: ManagerOptions,
	) -> Self {
		let bootstrapped = map.apply_unchecked(initial, &Writer::Bootstrap);
		info!(keys = bootstrapped.len(), "Applied bootstrap document");

		let mut manager = Self {
			map,
			sources: BTreeMap::new(),
			delegate_factory,
			high_water: VersionStamp::new(),
			observers: Vec::new(),
			next_observer_id: 0,
			options,
		};
		manager.refresh_sources();
		manager
	}

	/// Create a manager with the bootstrap sources and options from `config`
	pub fn from_config(
		delegate_factory: SourceDelegateFactory,
		config: &SettingsdConfig,
	) -> ClResult<Self> {
		let initial = config.bootstrap_document()?;
		Ok(Self::with_options(delegate_factory, SettingsMap::new(), &initial, config.manager_options()))
	}

	/// Validate `document` as coming from `source` and merge it
	///
	/// On anything but `Success` the state is left untouched and observers are
	/// not called.
	pub fn insert_document(
		&mut self,
		document: &dyn SettingsDocument,
		source: &SourceId,
	) -> InsertionStatus {
		match self.merge_document(document, source) {
			Ok(changed) => {
				self.notify(&changed);
				InsertionStatus::Success
			}
			Err(status) => status,
		}
	}

	/// Validate and merge without notifying observers
	///
	/// Returns the changed keys, or the rejection status.
	pub(crate) fn merge_document(
		&mut self,
		document: &dyn SettingsDocument,
		source: &SourceId,
	) -> Result<BTreeSet<Key>, InsertionStatus> {
		if !source.is_valid() {
			warn!(source = %source, "Rejecting document: malformed source id");
			return Err(InsertionStatus::AccessViolation);
		}

		let issued = document.version_stamp().get(source.as_str());
		let accepted = self.high_water.get(source.as_str());
		if issued <= accepted {
			warn!(source = %source, issued, accepted, "Rejecting document: version clash");
			return Err(InsertionStatus::VersionClash);
		}

		if !trust::source_is_active(&self.map, source.as_str()) {
			warn!(source = %source, "Rejecting document: source is not active");
			return Err(InsertionStatus::AccessViolation);
		}

		// A deletion also needs write access to everything it would remove
		let writer = Writer::Source(source.clone());
		if let Some(key) = self.map.denied_keys(document, &writer).into_iter().next() {
			warn!(source = %source, key = %key, "Rejecting document: access violation");
			return Err(InsertionStatus::AccessViolation);
		}

		if let Some(key) = self.map.find_collision(document) {
			warn!(source = %source, key = %key, "Rejecting document: collision");
			return Err(InsertionStatus::Collision);
		}

		let mut changed = self.map.apply_unchecked(document, &writer);
		self.cascade_revocations(&mut changed);
		self.high_water.set(source.clone(), issued);
		self.refresh_sources();

		debug!(source = %source, changed = changed.len(), "Document accepted");
		Ok(changed)
	}

	/// Remove values whose writers lost trust, following the trust graph
	///
	/// Starts from the sources whose configuration keys are in `changed`.
	/// Removing a value under `sources/<id>/` can in turn invalidate `<id>`, so
	/// that source is checked next. Every removal is added to `changed`.
	fn cascade_revocations(&mut self, changed: &mut BTreeSet<Key>) {
		let mut pending: VecDeque<SourceId> = VecDeque::new();
		let mut queued: HashSet<SourceId> = HashSet::new();
		for key in changed.iter() {
			if let Some(source) = keys::source_of_config_key(key)
				&& queued.insert(source.clone())
			{
				pending.push_back(source);
			}
		}

		while let Some(source) = pending.pop_front() {
			queued.remove(&source);

			let revoked: Vec<Key> = self
				.map
				.keys_written_by(&source)
				.into_iter()
				.filter(|key| {
					trust::effective_status(&self.map, source.as_str(), key)
						== SettingStatus::Invalid
				})
				.collect();
			if revoked.is_empty() {
				continue;
			}
			info!(source = %source, count = revoked.len(), "Revoking values of untrusted source");

			for key in revoked {
				self.map.remove_entry(&key);
				if let Some(affected) = keys::source_of_config_key(&key)
					&& queued.insert(affected.clone())
				{
					pending.push_back(affected);
				}
				changed.insert(key);
			}
		}
	}

	/// Bring the source registry in line with the `sources/*` namespace
	fn refresh_sources(&mut self) {
		let configured: BTreeSet<SourceId> = self
			.map
			.get_keys(&keys::sources_root())
			.iter()
			.filter_map(keys::source_of_config_key)
			.collect();

		self.sources.retain(|id, _| {
			let keep = configured.contains(id);
			if !keep {
				info!(source = %id, "Source removed");
			}
			keep
		});

		let settings: &dyn SettingsService = &self.map;
		for id in configured {
			if let Some(source) = self.sources.get_mut(&id) {
				source.update(settings);
				continue;
			}
			let delegate = (self.delegate_factory)(&id, settings);
			let mut source = Source::new(id.clone(), delegate);
			source.update(settings);
			info!(source = %id, status = ?source.status(), "Source added");
			self.sources.insert(id, source);
		}
	}

	/// Tell every observer about `changed`, passing the map as the view to read
	pub(crate) fn notify(&self, changed: &BTreeSet<Key>) {
		if changed.is_empty() && !self.options.notify_empty_changes {
			return;
		}
		for (_, observer) in &self.observers {
			observer.on_settings_changed(changed, &self.map);
		}
	}

	pub fn get_value(&self, key: &Key) -> Option<&SettingValue> {
		self.map.get_value(key)
	}

	/// Present keys at or below `prefix`
	pub fn get_keys(&self, prefix: &Key) -> BTreeSet<Key> {
		self.map.get_keys(prefix)
	}

	pub fn settings_map(&self) -> &SettingsMap {
		&self.map
	}

	/// Register an observer; observers are notified in registration order
	pub fn add_settings_observer(&mut self, observer: Arc<dyn SettingsObserver>) -> ObserverId {
		let id = ObserverId(self.next_observer_id);
		self.next_observer_id += 1;
		self.observers.push((id, observer));
		debug!(observer = %id, "Observer registered");
		id
	}

	/// Unregister an observer; returns `false` if it was not registered
	pub fn remove_settings_observer(&mut self, id: ObserverId) -> bool {
		let before = self.observers.len();
		self.observers.retain(|(registered, _)| *registered != id);
		self.observers.len() != before
	}

	pub fn source(&self, id: &str) -> Option<&Source> {
		self.sources.get(id)
	}

	pub fn source_ids(&self) -> impl Iterator<Item = &SourceId> {
		self.sources.keys()
	}

	/// Highest own stamp component accepted from `source`, 0 if none
	pub fn version_high_water(&self, source: &str) -> u64 {
		self.high_water.get(source)
	}

	/// Drain every source's delegate and insert what it yields
	///
	/// Runs until no delegate has anything left, so sources added by a pulled
	/// document are drained too.
	pub fn pull_documents(&mut self) -> Vec<(SourceId, InsertionStatus)> {
		let mut results = Vec::new();
		while let Some((id, document)) = self.next_pending_document() {
			let status = self.insert_document(document.as_ref(), &id);
			results.push((id, status));
		}
		results
	}

	/// Next document from the first source, in id order, that has one
	pub(crate) fn next_pending_document(
		&mut self,
	) -> Option<(SourceId, Box<dyn SettingsDocument>)> {
		self.sources.iter_mut().find_map(|(id, source)| {
			source.delegate_mut().next_document().map(|document| (id.clone(), document))
		})
	}
}

impl SettingsService for SettingsDocumentManager {
	fn get_value(&self, key: &Key) -> Option<&SettingValue> {
		self.map.get_value(key)
	}

	fn get_keys(&self, prefix: &Key) -> BTreeSet<Key> {
		self.map.get_keys(prefix)
	}
}

impl fmt::Debug for SettingsDocumentManager {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SettingsDocumentManager")
			.field("map", &self.map)
			.field("sources", &self.sources)
			.field("high_water", &self.high_water)
			.field("observers", &self.observers.len())
			.field("options", &self.options)
			.finish_non_exhaustive()
	}
}


// vim: ts=4
