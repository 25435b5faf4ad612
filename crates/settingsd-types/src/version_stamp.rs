//! Vector version stamps
//!
//! A stamp maps source ids to counters; absent components read as 0. Stamps
//! are only partially ordered: `a.is_after(b)` when every component of `a` is
//! at least the one in `b` and one is strictly greater. Stamps where each
//! side is ahead somewhere are concurrent.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::types::SourceId;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionStamp {
	components: BTreeMap<SourceId, u64>,
}

impl VersionStamp {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, source: &str) -> u64 {
		self.components.get(source).copied().unwrap_or(0)
	}

	pub fn set(&mut self, source: impl Into<SourceId>, value: u64) {
		let source = source.into();
		if value == 0 {
			self.components.remove(&source);
		} else {
			self.components.insert(source, value);
		}
	}

	/// Builder-style variant of [`VersionStamp::set`]
	pub fn with(mut self, source: impl Into<SourceId>, value: u64) -> Self {
		self.set(source, value);
		self
	}

	/// Increment the component of `source` and return the new counter
	pub fn bump(&mut self, source: impl Into<SourceId>) -> u64 {
		let source = source.into();
		let next = self.get(source.as_str()).saturating_add(1);
		self.set(source, next);
		next
	}

	/// Non-zero components in source order
	pub fn components(&self) -> impl Iterator<Item = (&SourceId, u64)> {
		self.components.iter().filter(|(_, v)| **v > 0).map(|(k, v)| (k, *v))
	}

	/// Causal comparison; `None` means the stamps are concurrent
	pub fn compare(&self, other: &VersionStamp) -> Option<Ordering> {
		let mut ahead = false;
		let mut behind = false;
		for source in self.components.keys().chain(other.components.keys()) {
			match self.get(source.as_str()).cmp(&other.get(source.as_str())) {
				Ordering::Greater => ahead = true,
				Ordering::Less => behind = true,
				Ordering::Equal => {}
			}
			if ahead && behind {
				return None;
			}
		}
		match (ahead, behind) {
			(true, false) => Some(Ordering::Greater),
			(false, true) => Some(Ordering::Less),
			_ => Some(Ordering::Equal),
		}
	}

	pub fn is_after(&self, other: &VersionStamp) -> bool {
		self.compare(other) == Some(Ordering::Greater)
	}

	pub fn is_before(&self, other: &VersionStamp) -> bool {
		self.compare(other) == Some(Ordering::Less)
	}

	pub fn is_concurrent(&self, other: &VersionStamp) -> bool {
		self.compare(other).is_none()
	}

	/// Pointwise maximum of both stamps
	pub fn join(&self, other: &VersionStamp) -> VersionStamp {
		let mut out = self.clone();
		for (source, value) in other.components() {
			if value > out.get(source.as_str()) {
				out.set(source.clone(), value);
			}
		}
		out
	}
}

impl PartialEq for VersionStamp {
	fn eq(&self, other: &Self) -> bool {
		self.compare(other) == Some(Ordering::Equal)
	}
}

impl Eq for VersionStamp {}

impl PartialOrd for VersionStamp {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		self.compare(other)
	}
}


// vim: ts=4
