//! Builder - assembles a shared settings engine from configuration

use settingsd_core::source::{SourceDelegateFactory, dummy_delegate_factory};
use settingsd_core::{SettingsDocumentManager, SettingsObserver, SettingsdConfig, SharedSettings};
use std::sync::Arc;

use crate::logging;
use crate::prelude::*;

pub struct SettingsdBuilder {
	config: SettingsdConfig,
	delegate_factory: Option<SourceDelegateFactory>,
	observers: Vec<Arc<dyn SettingsObserver>>,
	init_logging: bool,
}

impl SettingsdBuilder {
	pub fn new() -> Self {
		Self {
			config: SettingsdConfig::default(),
			delegate_factory: None,
			observers: Vec::new(),
			init_logging: false,
		}
	}

	/// Start from the file named by `SETTINGSD_CONFIG`, or the defaults
	pub fn from_env() -> ClResult<Self> {
		Ok(Self::new().config(SettingsdConfig::from_env()?))
	}

	pub fn config(mut self, config: SettingsdConfig) -> Self {
		self.config = config;
		self
	}

	/// Delegates for sources; sources get no delegate of their own if unset
	pub fn delegate_factory(mut self, factory: SourceDelegateFactory) -> Self {
		self.delegate_factory = Some(factory);
		self
	}

	/// Observer registered before the engine sees its first document
	pub fn observer(mut self, observer: Arc<dyn SettingsObserver>) -> Self {
		self.observers.push(observer);
		self
	}

	/// Install the global log subscriber on `build`
	pub fn init_logging(mut self, enable: bool) -> Self {
		self.init_logging = enable;
		self
	}

	pub fn build(self) -> ClResult<SharedSettings> {
		if self.init_logging {
			logging::init_logging(&self.config.log_filter);
		}
		let factory = self.delegate_factory.unwrap_or_else(dummy_delegate_factory);
		let mut manager = SettingsDocumentManager::from_config(factory, &self.config)?;
		for observer in self.observers {
			manager.add_settings_observer(observer);
		}
		info!(
			sources = manager.source_ids().count(),
			keys = manager.settings_map().len(),
			"settingsd engine ready"
		);
		Ok(SharedSettings::new(manager))
	}
}

impl Default for SettingsdBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
