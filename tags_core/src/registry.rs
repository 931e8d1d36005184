use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::Context;
use crate::Point;
use crate::TagsError;
use crate::TagsResult;

/// The error type returned by tag handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
/// The result type returned by tag handlers.
pub type HandlerResult = Result<String, HandlerError>;

type Handler = Arc<dyn Fn(&TagCall<'_>) -> HandlerResult + Send + Sync>;

/// Everything a handler receives for one tag occurrence.
#[derive(Debug, Clone, Copy)]
pub struct TagCall<'a> {
	/// The registered name of the tag.
	pub name: &'a str,
	/// The arguments, with quotes removed.
	pub args: &'a [String],
	/// The context passed to [`TagEngine::parse`](crate::TagEngine::parse).
	pub context: &'a Context,
	/// The raw, unexpanded body. Only provided to tags that accept a body.
	pub body: Option<&'a str>,
}

impl<'a> TagCall<'a> {
	/// The argument at `index`.
	pub fn arg(&self, index: usize) -> Option<&'a str> {
		self.args.get(index).map(String::as_str)
	}

	/// The body, or the empty string when the tag was used without one.
	pub fn body_or_empty(&self) -> &'a str {
		self.body.unwrap_or_default()
	}
}

/// Whether a tag is used with a body (`{% t %}...{% endt %}`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum BodyMode {
	/// The tag must be used without a body.
	#[default]
	Forbidden,
	/// The tag must be closed with `end` + name.
	Required,
	/// Either form is accepted.
	Optional,
}

/// The number of positional arguments a tag accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Arity {
	/// The exact count, or the minimum when `variadic` is set.
	pub count: usize,
	/// Accept any number of arguments beyond `count`.
	pub variadic: bool,
}

impl Arity {
	pub fn exact(count: usize) -> Self {
		Self {
			count,
			variadic: false,
		}
	}

	pub fn at_least(count: usize) -> Self {
		Self {
			count,
			variadic: true,
		}
	}

	pub fn accepts(&self, got: usize) -> bool {
		if self.variadic {
			got >= self.count
		} else {
			got == self.count
		}
	}
}

/// A tag name together with its handler and the shape of its uses.
///
/// ```rust
/// use tags_core::TagDefinition;
///
/// let shout = TagDefinition::new("shout", |call| Ok(call.body_or_empty().to_uppercase()))
/// 	.body();
/// let join = TagDefinition::new("join", |call| Ok(call.args.join(", ")))
/// 	.args(1)
/// 	.variadic();
/// # let _ = (shout, join);
/// ```
#[derive(Clone)]
pub struct TagDefinition {
	name: String,
	arity: Arity,
	body: BodyMode,
	handler: Handler,
}

impl TagDefinition {
	/// A tag that takes no arguments and no body.
	pub fn new<F>(name: impl Into<String>, handler: F) -> Self
	where
		F: Fn(&TagCall<'_>) -> HandlerResult + Send + Sync + 'static,
	{
		Self {
			name: name.into(),
			arity: Arity::default(),
			body: BodyMode::default(),
			handler: Arc::new(handler),
		}
	}

	/// Require exactly `count` arguments (or at least `count` once
	/// [`variadic`](Self::variadic) is set).
	#[must_use]
	pub fn args(mut self, count: usize) -> Self {
		self.arity.count = count;
		self
	}

	/// Accept extra arguments beyond the declared count.
	#[must_use]
	pub fn variadic(mut self) -> Self {
		self.arity.variadic = true;
		self
	}

	/// Require a body.
	#[must_use]
	pub fn body(self) -> Self {
		self.body_mode(BodyMode::Required)
	}

	/// Accept the tag both with and without a body.
	#[must_use]
	pub fn optional_body(self) -> Self {
		self.body_mode(BodyMode::Optional)
	}

	#[must_use]
	pub fn body_mode(mut self, body: BodyMode) -> Self {
		self.body = body;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn arity(&self) -> Arity {
		self.arity
	}

	pub fn mode(&self) -> BodyMode {
		self.body
	}

	pub fn requires_body(&self) -> bool {
		self.body == BodyMode::Required
	}

	/// Check the arguments and body presence of an occurrence against the
	/// declared shape.
	pub(crate) fn validate(&self, args: &[String], has_body: bool, position: Point) -> TagsResult<()> {
		if !self.arity.accepts(args.len()) {
			return Err(TagsError::ArgumentCount {
				name: self.name.clone(),
				expected: self.arity.count,
				variadic: self.arity.variadic,
				got: args.to_vec(),
				position,
			});
		}

		let expected_body = match self.body {
			BodyMode::Forbidden => false,
			BodyMode::Required => true,
			BodyMode::Optional => return Ok(()),
		};

		if expected_body != has_body {
			return Err(TagsError::BodyMismatch {
				name: self.name.clone(),
				expected_body,
				got_body: has_body,
				position,
			});
		}

		Ok(())
	}

	/// Whether the handler should see the body of an occurrence.
	pub(crate) fn takes_body(&self) -> bool {
		self.body != BodyMode::Forbidden
	}

	pub(crate) fn invoke(&self, call: &TagCall<'_>) -> HandlerResult {
		(self.handler)(call)
	}
}

impl Debug for TagDefinition {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TagDefinition")
			.field("name", &self.name)
			.field("arity", &self.arity)
			.field("body", &self.body)
			.finish_non_exhaustive()
	}
}

/// The tags known to one engine, in registration order.
///
/// Names are unique ignoring case. Registering a name that is already present
/// replaces the earlier definition and keeps its place in the order.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
	tags: Vec<TagDefinition>,
	index: HashMap<String, usize>,
}

impl TagRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a tag, returning the definition it replaced.
	pub fn insert(&mut self, tag: TagDefinition) -> TagsResult<Option<TagDefinition>> {
		validate_name(&tag.name)?;
		let key = registry_key(&tag.name);

		if let Some(&position) = self.index.get(&key) {
			let previous = std::mem::replace(&mut self.tags[position], tag);
			return Ok(Some(previous));
		}

		self.index.insert(key, self.tags.len());
		self.tags.push(tag);

		Ok(None)
	}

	/// Look up a tag by name, ignoring case.
	pub fn get(&self, name: &str) -> Option<&TagDefinition> {
		self.index
			.get(&registry_key(name))
			.map(|&position| &self.tags[position])
	}

	pub fn contains(&self, name: &str) -> bool {
		self.index.contains_key(&registry_key(name))
	}

	/// Registered names in registration order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.tags.iter().map(TagDefinition::name)
	}

	pub fn iter(&self) -> impl Iterator<Item = &TagDefinition> {
		self.tags.iter()
	}

	pub fn len(&self) -> usize {
		self.tags.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tags.is_empty()
	}
}

fn registry_key(name: &str) -> String {
	name.to_lowercase()
}

fn validate_name(name: &str) -> TagsResult<()> {
	let reason = if name.is_empty() {
		"tag names cannot be empty"
	} else if name.chars().any(char::is_whitespace) {
		"tag names cannot contain whitespace"
	} else {
		return Ok(());
	};

	Err(TagsError::Registration {
		name: name.to_string(),
		reason: reason.to_string(),
	})
}
