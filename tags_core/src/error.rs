use miette::Diagnostic;
use thiserror::Error;

use crate::Point;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TagsError {
	#[error(transparent)]
	#[diagnostic(code(tags::io_error))]
	Io(#[from] std::io::Error),

	#[error("invalid tag name `{name}`: {reason}")]
	#[diagnostic(
		code(tags::registration),
		help("tag names must be non-empty and must not contain whitespace")
	)]
	Registration { name: String, reason: String },

	#[error("invalid tag delimiters `{open}` and `{close}`: {reason}")]
	#[diagnostic(
		code(tags::invalid_delimiters),
		help("set `open` and `close` in the `[engine]` section of tags.toml")
	)]
	InvalidDelimiters {
		open: String,
		close: String,
		reason: String,
	},

	#[error(
		"tag `{name}` at {position} expects {expected}{} argument(s), got {}",
		at_least(.variadic),
		.got.len()
	)]
	#[diagnostic(code(tags::argument_count))]
	ArgumentCount {
		name: String,
		expected: usize,
		variadic: bool,
		got: Vec<String>,
		position: Point,
	},

	#[error(
		"tag `{name}` at {position} {}, but it was used {}",
		expects_body(.expected_body),
		used_with_body(.got_body)
	)]
	#[diagnostic(
		code(tags::body_mismatch),
		help("body tags are closed with `end` followed by the tag name")
	)]
	BodyMismatch {
		name: String,
		expected_body: bool,
		got_body: bool,
		position: Point,
	},

	#[error("tag `{name}` failed at {position}: {message}")]
	#[diagnostic(code(tags::tag_parse))]
	TagParse {
		name: String,
		message: String,
		position: Point,
		/// The handler's error chain and a backtrace, captured in development
		/// mode only.
		trace: Option<String>,
	},

	#[error("tag `{name}` at {position} exceeded the expansion depth limit of {limit}")]
	#[diagnostic(
		code(tags::recursion_limit),
		help("a tag whose output contains itself never converges; check the handler output")
	)]
	RecursionLimit {
		name: String,
		limit: usize,
		position: Point,
	},

	#[error("tags nested more than {limit} levels deep at {position}")]
	#[diagnostic(code(tags::nesting_limit), help("raise `max_nesting` in tags.toml"))]
	NestingLimit { limit: usize, position: Point },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(tags::config_parse),
		help("check that tags.toml is valid TOML with [engine], [build] and/or [context] sections")
	)]
	ConfigParse(String),

	#[error("invalid glob pattern `{pattern}`: {reason}")]
	#[diagnostic(code(tags::invalid_pattern))]
	InvalidPattern { pattern: String, reason: String },

	#[error("no index.html found in `{root}`")]
	#[diagnostic(
		code(tags::missing_index),
		help("use `--force` to build this folder anyway")
	)]
	MissingIndex { root: String },

	#[error("`{root}` already contains an index.html")]
	#[diagnostic(
		code(tags::site_exists),
		help("use `--force` to overwrite it with a new site")
	)]
	SiteExists { root: String },

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(tags::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },
}

impl TagsError {
	/// Returns true for errors raised while expanding a recognized tag. Site
	/// builds report these per file and carry on.
	pub fn is_tag_error(&self) -> bool {
		matches!(
			self,
			Self::ArgumentCount { .. }
				| Self::BodyMismatch { .. }
				| Self::TagParse { .. }
				| Self::RecursionLimit { .. }
				| Self::NestingLimit { .. }
		)
	}

	/// The source location of a tag error.
	pub fn position(&self) -> Option<Point> {
		match self {
			Self::ArgumentCount { position, .. }
			| Self::BodyMismatch { position, .. }
			| Self::TagParse { position, .. }
			| Self::RecursionLimit { position, .. }
			| Self::NestingLimit { position, .. } => Some(*position),
			_ => None,
		}
	}

	/// The byte offset of a tag error in the text that was being parsed.
	pub fn offset(&self) -> Option<usize> {
		self.position().map(|position| position.offset)
	}
}

fn at_least(variadic: &bool) -> &'static str {
	if *variadic { " or more" } else { "" }
}

fn expects_body(expected_body: &bool) -> &'static str {
	if *expected_body {
		"requires a body"
	} else {
		"does not take a body"
	}
}

fn used_with_body(got_body: &bool) -> &'static str {
	if *got_body { "with one" } else { "without one" }
}

pub type TagsResult<T> = Result<T, TagsError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
