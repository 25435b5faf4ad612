//! Change observers

use std::collections::BTreeSet;
use std::fmt;

use crate::prelude::*;
use crate::service::SettingsService;

/// Receives the set of keys whose value or presence changed after each
/// accepted document, together with a read-only view of the merged settings
///
/// Observers must not insert documents from the callback.
pub trait SettingsObserver: Send + Sync {
	fn on_settings_changed(&self, keys: &BTreeSet<Key>, settings: &dyn SettingsService);
}

impl<F> SettingsObserver for F
where
	F: Fn(&BTreeSet<Key>, &dyn SettingsService) + Send + Sync,
{
	fn on_settings_changed(&self, keys: &BTreeSet<Key>, settings: &dyn SettingsService) {
		self(keys, settings);
	}
}

/// Handle returned on registration, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub(crate) u64);

impl fmt::Display for ObserverId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "observer-{}", self.0)
	}
}

// vim: ts=4
