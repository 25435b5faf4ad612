//! Thread-safe handle to a settings document manager
//!
//! One writer at a time, any number of concurrent readers. Reads return owned
//! copies so no lock is held once the call returns.
//!
//! Observers run after the write lock has been downgraded to a read lock, so
//! they may read through a clone of the handle. They must not write through it.

use parking_lot::{RwLock, RwLockWriteGuard};
use std::collections::BTreeSet;
use std::sync::Arc;

use settingsd_types::SettingsDocument;

use crate::manager::{InsertionStatus, SettingsDocumentManager};
use crate::observer::{ObserverId, SettingsObserver};
use crate::prelude::*;

#[derive(Clone, Debug)]
pub struct SharedSettings {
	inner: Arc<RwLock<SettingsDocumentManager>>,
}

impl SharedSettings {
	pub fn new(manager: SettingsDocumentManager) -> Self {
		Self { inner: Arc::new(RwLock::new(manager)) }
	}

	pub fn insert_document(
		&self,
		document: &dyn SettingsDocument,
		source: &SourceId,
	) -> InsertionStatus {
		let mut manager = self.inner.write();
		let outcome = manager.merge_document(document, source);
		let manager = RwLockWriteGuard::downgrade(manager);
		Self::finish(&manager, outcome)
	}

	/// Drain the sources' delegates, taking the write lock once per document
	pub fn pull_documents(&self) -> Vec<(SourceId, InsertionStatus)> {
		let mut results = Vec::new();
		loop {
			let mut manager = self.inner.write();
			let Some((id, document)) = manager.next_pending_document() else {
				break;
			};
			let outcome = manager.merge_document(document.as_ref(), &id);
			let manager = RwLockWriteGuard::downgrade(manager);
			results.push((id, Self::finish(&manager, outcome)));
		}
		results
	}

	fn finish(
		manager: &SettingsDocumentManager,
		outcome: Result<BTreeSet<Key>, InsertionStatus>,
	) -> InsertionStatus {
		match outcome {
			Ok(changed) => {
				manager.notify(&changed);
				InsertionStatus::Success
			}
			Err(status) => status,
		}
	}

	// Reads are recursive so an observer holding the downgraded lock on this
	// thread is not blocked behind a queued writer
	pub fn get_value(&self, key: &Key) -> Option<SettingValue> {
		self.inner.read_recursive().get_value(key).cloned()
	}

	pub fn get_keys(&self, prefix: &Key) -> BTreeSet<Key> {
		self.inner.read_recursive().get_keys(prefix)
	}

	pub fn add_settings_observer(&self, observer: Arc<dyn SettingsObserver>) -> ObserverId {
		self.inner.write().add_settings_observer(observer)
	}

	pub fn remove_settings_observer(&self, id: ObserverId) -> bool {
		self.inner.write().remove_settings_observer(id)
	}

	/// Run `f` against a consistent snapshot under the read lock
	pub fn read<R>(&self, f: impl FnOnce(&SettingsDocumentManager) -> R) -> R {
		f(&self.inner.read_recursive())
	}
}


// vim: ts=4
