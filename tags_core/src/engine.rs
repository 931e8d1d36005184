use std::backtrace::Backtrace;
use std::fmt::Write;
use std::sync::OnceLock;

use crate::Context;
use crate::EngineOptions;
use crate::Grammar;
use crate::HandlerError;
use crate::Matcher;
use crate::Point;
use crate::TagCall;
use crate::TagDefinition;
use crate::TagOccurrence;
use crate::TagRegistry;
use crate::TagsError;
use crate::TagsResult;
use crate::lexer::tokenize_arguments;

/// Expands registered tags in text.
///
/// ```rust
/// use tags_core::Context;
/// use tags_core::TagDefinition;
/// use tags_core::TagEngine;
///
/// let mut engine = TagEngine::new();
/// engine
/// 	.register(
/// 		TagDefinition::new("greet", |call| {
/// 			Ok(format!("Hello, {}!", call.arg(0).unwrap_or_default()))
/// 		})
/// 		.args(1),
/// 	)
/// 	.unwrap();
///
/// let output = engine.parse("{% greet world %}", &Context::new()).unwrap();
/// assert_eq!(output, "Hello, world!");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TagEngine {
	options: EngineOptions,
	registry: TagRegistry,
	/// Built on first use from the registered names. Cleared by every
	/// registration.
	matcher: OnceLock<Matcher>,
}

impl TagEngine {
	/// An engine with the default `{%` / `%}` delimiters and no tags.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_options(options: EngineOptions) -> TagsResult<Self> {
		options.validate()?;

		Ok(Self {
			options,
			registry: TagRegistry::new(),
			matcher: OnceLock::new(),
		})
	}

	/// An engine with the given options and tags.
	pub fn with_tags(
		options: EngineOptions,
		tags: impl IntoIterator<Item = TagDefinition>,
	) -> TagsResult<Self> {
		let mut engine = Self::with_options(options)?;
		for tag in tags {
			engine.register(tag)?;
		}

		Ok(engine)
	}

	/// Register a tag. A tag with the same name, ignoring case, is replaced.
	pub fn register(&mut self, tag: TagDefinition) -> TagsResult<()> {
		let name = tag.name().to_string();
		let replaced = self.registry.insert(tag)?;
		self.matcher = OnceLock::new();
		tracing::debug!(tag = %name, replaced = replaced.is_some(), "registered tag");

		Ok(())
	}

	pub fn options(&self) -> &EngineOptions {
		&self.options
	}

	pub fn registry(&self) -> &TagRegistry {
		&self.registry
	}

	/// Expand every registered tag in `text`.
	///
	/// Unknown tags, unclosed tags and stray delimiters are left as they are.
	/// Each handler receives the raw body of its tag; the text it returns is
	/// expanded again before it is substituted. Any error aborts the whole
	/// call.
	pub fn parse(&self, text: &str, context: &Context) -> TagsResult<String> {
		self.expand(text, context, 0)
	}

	fn matcher(&self) -> &Matcher {
		self.matcher.get_or_init(|| {
			tracing::debug!(tags = self.registry.len(), "building tag grammar");
			Grammar::new(&self.options).build(self.registry.names())
		})
	}

	fn expand(&self, text: &str, context: &Context, depth: usize) -> TagsResult<String> {
		if !text.contains(&self.options.open) {
			return Ok(text.to_string());
		}

		let occurrences = self.matcher().scan(text)?;
		if occurrences.is_empty() {
			return Ok(text.to_string());
		}

		let mut output = String::with_capacity(text.len());
		let mut cursor = 0;
		// Occurrences are ordered, so one point walks the text once.
		let mut position = Point::start();

		for occurrence in &occurrences {
			position.advance_str(&text[position.offset..occurrence.span.start]);
			output.push_str(&text[cursor..occurrence.span.start]);
			output.push_str(&self.render(text, occurrence, position, context, depth)?);
			cursor = occurrence.span.end;
		}

		output.push_str(&text[cursor..]);

		Ok(output)
	}

	/// Run the handler for one occurrence and expand its output.
	fn render(
		&self,
		text: &str,
		occurrence: &TagOccurrence<'_>,
		position: Point,
		context: &Context,
		depth: usize,
	) -> TagsResult<String> {
		let Some(tag) = self.registry.get(&occurrence.name) else {
			return Ok(text[occurrence.span.clone()].to_string());
		};

		let args = tokenize_arguments(occurrence.raw_args);

		let body = if self.options.development {
			occurrence.body
		} else {
			tag.validate(&args, occurrence.body.is_some(), position)?;
			occurrence.body.filter(|_| tag.takes_body())
		};

		tracing::trace!(tag = tag.name(), args = ?args, depth, "expanding tag");

		let call = TagCall {
			name: tag.name(),
			args: &args,
			context,
			body,
		};

		let rendered = tag
			.invoke(&call)
			.map_err(|error| self.handler_error(error, tag.name(), position))?;

		if !rendered.contains(&self.options.open) {
			return Ok(rendered);
		}

		if depth >= self.options.max_depth {
			return Err(TagsError::RecursionLimit {
				name: tag.name().to_string(),
				limit: self.options.max_depth,
				position,
			});
		}

		self.expand(&rendered, context, depth + 1)
	}

	/// Errors from nested `parse` calls keep their own position. Anything else
	/// is reported at the tag that failed.
	fn handler_error(&self, error: HandlerError, name: &str, position: Point) -> TagsError {
		match error.downcast::<TagsError>() {
			Ok(error) => *error,
			Err(error) => {
				let trace = self.options.development.then(|| error_trace(&*error));

				TagsError::TagParse {
					name: name.to_string(),
					message: error.to_string(),
					position,
					trace,
				}
			}
		}
	}
}

/// The error, each of its sources, and a backtrace of the engine.
fn error_trace(error: &(dyn std::error::Error + 'static)) -> String {
	let mut trace = error.to_string();
	let mut source = error.source();

	while let Some(cause) = source {
		let _ = write!(trace, "\ncaused by: {cause}");
		source = cause.source();
	}

	let _ = write!(trace, "\n\n{}", Backtrace::force_capture());
	trace
}
