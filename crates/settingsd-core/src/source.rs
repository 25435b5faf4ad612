//! Document sources
//!
//! Every source configured under `sources/<id>` gets a [`Source`] record in the
//! manager. The record mirrors the source's trust configuration and owns the
//! [`SourceDelegate`] that produces documents on the source's behalf. Delegates
//! are built by a [`SourceDelegateFactory`] when the source first appears.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use settingsd_types::{SettingsDocument, keys};

use crate::prelude::*;
use crate::service::SettingsService;
use crate::trust;

/// Produces documents for one source
pub trait SourceDelegate: Send + Sync {
	/// Next pending document, or `None` when the source has nothing queued
	fn next_document(&mut self) -> Option<Box<dyn SettingsDocument>>;
}

/// Builds the delegate for a newly configured source
pub type SourceDelegateFactory =
	Box<dyn Fn(&SourceId, &dyn SettingsService) -> Box<dyn SourceDelegate> + Send + Sync>;

/// Delegate for sources that never produce documents on their own
#[derive(Debug, Default)]
pub struct DummySourceDelegate;

impl SourceDelegate for DummySourceDelegate {
	fn next_document(&mut self) -> Option<Box<dyn SettingsDocument>> {
		None
	}
}

pub fn dummy_delegate_factory() -> SourceDelegateFactory {
	Box::new(|_: &SourceId, _: &dyn SettingsService| -> Box<dyn SourceDelegate> {
		Box::new(DummySourceDelegate)
	})
}

type Queue = VecDeque<Box<dyn SettingsDocument>>;

/// Per-source document queues shared between a host and its delegates
///
/// The host pushes documents as they arrive; the manager drains them through
/// [`QueuedSourceDelegate`]s on `pull_documents`.
#[derive(Clone, Default)]
pub struct DocumentQueues {
	queues: Arc<Mutex<HashMap<SourceId, Queue>>>,
}

impl DocumentQueues {
	pub fn new() -> Self {
		Self::default()
	}

	/// Queue `document` for `source`; documents for malformed ids are dropped
	pub fn push(&self, source: impl Into<SourceId>, document: impl SettingsDocument + 'static) {
		let source = source.into();
		if !source.is_valid() {
			warn!(source = %source, "Dropping document queued for a malformed source id");
			return;
		}
		self.queues.lock().entry(source).or_default().push_back(Box::new(document));
	}

	pub fn pending(&self, source: &str) -> usize {
		self.queues.lock().get(source).map_or(0, VecDeque::len)
	}

	fn pop(&self, source: &str) -> Option<Box<dyn SettingsDocument>> {
		self.queues.lock().get_mut(source).and_then(VecDeque::pop_front)
	}

	/// Factory handing every source a delegate reading from these queues
	pub fn factory(&self) -> SourceDelegateFactory {
		let queues = self.clone();
		Box::new(move |source: &SourceId, _: &dyn SettingsService| -> Box<dyn SourceDelegate> {
			Box::new(QueuedSourceDelegate { source: source.clone(), queues: queues.clone() })
		})
	}
}

impl fmt::Debug for DocumentQueues {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let queues = self.queues.lock();
		let mut map = f.debug_map();
		for (source, queue) in queues.iter() {
			map.entry(source, &queue.len());
		}
		map.finish()
	}
}

#[derive(Debug)]
pub struct QueuedSourceDelegate {
	source: SourceId,
	queues: DocumentQueues,
}

impl SourceDelegate for QueuedSourceDelegate {
	fn next_document(&mut self) -> Option<Box<dyn SettingsDocument>> {
		self.queues.pop(self.source.as_str())
	}
}

/// A configured source as currently seen by the manager
pub struct Source {
	id: SourceId,
	name: Option<String>,
	status: Option<SettingStatus>,
	delegate: Box<dyn SourceDelegate>,
}

impl Source {
	pub fn new(id: SourceId, delegate: Box<dyn SourceDelegate>) -> Self {
		Self { id, name: None, status: None, delegate }
	}

	pub fn id(&self) -> &SourceId {
		&self.id
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn status(&self) -> Option<SettingStatus> {
		self.status
	}

	pub fn is_active(&self) -> bool {
		self.status == Some(SettingStatus::Active)
	}

	/// Re-read name and status from `settings`; returns whether either changed
	pub fn update(&mut self, settings: &dyn SettingsService) -> bool {
		let name = settings
			.get_value(&keys::source_name_key(self.id.as_str()))
			.and_then(SettingValue::as_str)
			.map(str::to_string);
		let status = trust::source_status(settings, self.id.as_str());
		let changed = name != self.name || status != self.status;
		if changed {
			debug!(source = %self.id, name = ?name, status = ?status, "Source configuration updated");
		}
		self.name = name;
		self.status = status;
		changed
	}

	pub(crate) fn delegate_mut(&mut self) -> &mut dyn SourceDelegate {
		self.delegate.as_mut()
	}
}

impl fmt::Debug for Source {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Source")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("status", &self.status)
			.finish_non_exhaustive()
	}
}


// vim: ts=4
