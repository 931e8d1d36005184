use std::collections::HashMap;

use derive_more::Deref;
use derive_more::DerefMut;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// The values available to every tag handler during one call to
/// [`TagEngine::parse`](crate::TagEngine::parse).
///
/// The engine never reads or changes the context. It is handed by shared
/// reference to each handler, including handlers invoked while re-expanding
/// the output of another tag.
#[derive(Debug, Clone, Default, PartialEq, Deref, DerefMut, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(HashMap<String, Value>);

impl Context {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a value, returning the updated context.
	#[must_use]
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.0.insert(key.into(), value.into());
		self
	}

	/// Look up a string value. Returns `None` for missing keys and for
	/// non-string values.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.0.get(key).and_then(Value::as_str)
	}

	/// Copy every entry of `other` into this context, overwriting existing
	/// keys.
	pub fn extend_from(&mut self, other: &Context) {
		for (key, value) in &other.0 {
			self.0.insert(key.clone(), value.clone());
		}
	}
}

impl From<HashMap<String, Value>> for Context {
	fn from(values: HashMap<String, Value>) -> Self {
		Self(values)
	}
}

impl<K, V> FromIterator<(K, V)> for Context
where
	K: Into<String>,
	V: Into<Value>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		)
	}
}
