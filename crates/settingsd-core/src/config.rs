//! Engine configuration
//!
//! Configuration is a JSON file naming the log filter, observer options, and
//! the sources trusted from the start. The bootstrap sources become the initial
//! trusted document of the manager.
//!
//! ```json
//! {
//!   "log_filter": "settingsd=debug",
//!   "bootstrap": [
//!     { "id": "owner", "name": "Device owner",
//!       "access": { "sources": "active", "network": "active" } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use settingsd_types::{MemorySettingsDocument, keys};

use crate::manager::ManagerOptions;
use crate::prelude::*;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "SETTINGSD_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsdConfig {
	/// `tracing` filter directive, e.g. `info` or `settingsd_core=debug`
	pub log_filter: String,
	pub notify_empty_changes: bool,
	pub bootstrap: Vec<BootstrapSource>,
}

impl Default for SettingsdConfig {
	fn default() -> Self {
		Self { log_filter: "info".to_string(), notify_empty_changes: false, bootstrap: Vec::new() }
	}
}

/// A source trusted by the initial document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapSource {
	pub id: SourceId,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default = "default_status")]
	pub status: SettingStatus,
	/// Key prefix to access rule
	#[serde(default)]
	pub access: BTreeMap<Key, SettingStatus>,
}

fn default_status() -> SettingStatus {
	SettingStatus::Active
}

impl SettingsdConfig {
	pub fn from_json_str(text: &str) -> ClResult<Self> {
		let config: Self = serde_json::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	pub fn from_file(path: impl AsRef<Path>) -> ClResult<Self> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path)?;
		let config = Self::from_json_str(&text)?;
		info!(path = %path.display(), sources = config.bootstrap.len(), "Loaded configuration");
		Ok(config)
	}

	/// Load the file named by `SETTINGSD_CONFIG`, or the defaults if unset
	pub fn from_env() -> ClResult<Self> {
		match std::env::var(CONFIG_ENV) {
			Ok(path) => Self::from_file(path),
			Err(_) => {
				debug!("{} not set, using default configuration", CONFIG_ENV);
				Ok(Self::default())
			}
		}
	}

	fn validate(&self) -> ClResult<()> {
		let mut seen = HashSet::new();
		for source in &self.bootstrap {
			if !source.id.is_valid() {
				return Err(Error::ConfigError(format!(
					"Invalid bootstrap source id '{}'",
					source.id
				)));
			}
			if !seen.insert(&source.id) {
				return Err(Error::ConfigError(format!(
					"Duplicate bootstrap source '{}'",
					source.id
				)));
			}
		}
		Ok(())
	}

	/// The initial trusted document configuring every bootstrap source
	pub fn bootstrap_document(&self) -> ClResult<MemorySettingsDocument> {
		let mut document = MemorySettingsDocument::new(VersionStamp::new());
		for source in &self.bootstrap {
			let id = source.id.as_str();
			document.set_key(keys::source_status_key(id), source.status)?;
			document.set_key(
				keys::source_name_key(id),
				source.name.clone().unwrap_or_else(|| id.to_string()),
			)?;
			for (key, rule) in &source.access {
				document.set_key(keys::source_access_key(id, key), *rule)?;
			}
		}
		Ok(document)
	}

	pub fn manager_options(&self) -> ManagerOptions {
		ManagerOptions { notify_empty_changes: self.notify_empty_changes }
	}
}


// vim: ts=4
