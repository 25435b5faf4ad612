//! Reserved key names of the trust configuration namespace
//!
//! Layout:
//! - `sources/<id>/status` - [`SettingStatus`](crate::value::SettingStatus) string
//! - `sources/<id>/name` - human-readable name
//! - `sources/<id>/access/<key...>` - status string for writing `<key...>` and below

use crate::key::Key;
use crate::types::SourceId;

pub mod sources {
	pub const ROOT: &str = "sources";
	pub const STATUS: &str = "status";
	pub const NAME: &str = "name";
	pub const ACCESS: &str = "access";
}

/// `sources`
pub fn sources_root() -> Key {
	Key::new(sources::ROOT)
}

/// `sources/<id>`
pub fn make_source_key(source: &str) -> Key {
	sources_root().append(&Key::new(source))
}

/// `sources/<id>/status`
pub fn source_status_key(source: &str) -> Key {
	make_source_key(source).append(&Key::new(sources::STATUS))
}

/// `sources/<id>/name`
pub fn source_name_key(source: &str) -> Key {
	make_source_key(source).append(&Key::new(sources::NAME))
}

/// `sources/<id>/access`
pub fn source_access_root(source: &str) -> Key {
	make_source_key(source).append(&Key::new(sources::ACCESS))
}

/// `sources/<id>/access/<key...>`
pub fn source_access_key(source: &str, key: &Key) -> Key {
	source_access_root(source).append(key)
}

/// The source whose trust configuration `key` belongs to, if any
///
/// `sources/source1/status` yields `source1`; `sources` alone yields `None`.
pub fn source_of_config_key(key: &Key) -> Option<SourceId> {
	match key.segments() {
		[root, id, ..] if root.as_ref() == sources::ROOT => Some(SourceId::from(id.as_ref())),
		_ => None,
	}
}


// vim: ts=4
