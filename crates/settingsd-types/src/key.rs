//! Hierarchical settings keys
//!
//! A key is an ordered sequence of path segments, written with `/` as the
//! separator (e.g. `sources/source1/status`). Equality and ordering are
//! structural over the segment sequence, so all keys sharing a prefix form a
//! contiguous range in a `BTreeMap<Key, _>`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{ClResult, Error};

pub const SEPARATOR: char = '/';

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
	segments: Vec<Box<str>>,
}

impl Key {
	/// Lenient constructor: splits `path` on `/` and skips empty segments
	///
	/// Use [`Key::parse`] for untrusted input.
	pub fn new(path: &str) -> Self {
		Self {
			segments: path
				.split(SEPARATOR)
				.filter(|segment| !segment.is_empty())
				.map(Into::into)
				.collect(),
		}
	}

	/// The empty key, ancestor of every other key
	pub fn root() -> Self {
		Self::default()
	}

	/// Strict parser: rejects empty segments such as `a//b` or a trailing `/`
	///
	/// The empty string parses to the root key.
	pub fn parse(path: &str) -> ClResult<Self> {
		if path.is_empty() {
			return Ok(Self::root());
		}
		let mut segments = Vec::new();
		for segment in path.split(SEPARATOR) {
			if segment.is_empty() {
				return Err(Error::Parse(format!("Key '{}' contains an empty segment", path)));
			}
			segments.push(segment.into());
		}
		Ok(Self { segments })
	}

	/// Build a key from individual segments
	pub fn from_segments<I, S>(segments: I) -> ClResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Self::root().extend(segments)
	}

	pub fn segments(&self) -> &[Box<str>] {
		&self.segments
	}

	pub fn len(&self) -> usize {
		self.segments.len()
	}

	pub fn is_root(&self) -> bool {
		self.segments.is_empty()
	}

	/// Return a new key with `segments` appended
	pub fn extend<I, S>(&self, segments: I) -> ClResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut out = self.clone();
		for segment in segments {
			let segment = segment.as_ref();
			if segment.is_empty() || segment.contains(SEPARATOR) {
				return Err(Error::ValidationError(format!(
					"Invalid key segment '{}'",
					segment
				)));
			}
			out.segments.push(segment.into());
		}
		Ok(out)
	}

	/// Return a new key with all segments of `other` appended
	pub fn append(&self, other: &Key) -> Self {
		let mut out = self.clone();
		out.segments.extend(other.segments.iter().cloned());
		out
	}

	/// Ancestor-or-self test: `self` is a prefix of `other`
	pub fn is_prefix_of(&self, other: &Key) -> bool {
		other.segments.starts_with(&self.segments)
	}

	pub fn parent(&self) -> Option<Self> {
		let (_, rest) = self.segments.split_last()?;
		Some(Self { segments: rest.to_vec() })
	}

	/// The segments of `self` below `prefix`, if `prefix` is an ancestor-or-self
	pub fn suffix_after(&self, prefix: &Key) -> Option<Self> {
		self.segments
			.strip_prefix(prefix.segments.as_slice())
			.map(|rest| Self { segments: rest.to_vec() })
	}

	/// All ancestors-or-self, from `self` up to the root
	pub fn ancestors(&self) -> impl Iterator<Item = Key> + '_ {
		(0..=self.segments.len())
			.rev()
			.map(|len| Self { segments: self.segments[..len].to_vec() })
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (idx, segment) in self.segments.iter().enumerate() {
			if idx > 0 {
				write!(f, "{}", SEPARATOR)?;
			}
			f.write_str(segment)?;
		}
		Ok(())
	}
}

impl FromStr for Key {
	type Err = Error;

	fn from_str(s: &str) -> ClResult<Self> {
		Self::parse(s)
	}
}

impl Serialize for Key {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Key {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let text = String::deserialize(deserializer)?;
		Self::parse(&text).map_err(serde::de::Error::custom)
	}
}


// vim: ts=4
