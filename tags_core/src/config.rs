use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::Context;
use crate::TagsError;
use crate::TagsResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["tags.toml", ".tags.toml", ".config/tags.toml"];

/// Default open delimiter.
pub const DEFAULT_OPEN: &str = "{%";
/// Default close delimiter.
pub const DEFAULT_CLOSE: &str = "%}";
/// Default limit for re-expanding handler output.
pub const DEFAULT_MAX_DEPTH: usize = 100;
/// Default limit for tags nested inside bodies.
pub const DEFAULT_MAX_NESTING: usize = 256;

/// Default build output directory, relative to the site root.
pub const DEFAULT_DEST: &str = "_site";
/// Default glob for files that are rendered.
pub const DEFAULT_PATTERN: &str = "**/*.html";
/// Default glob for files that are neither rendered nor copied.
pub const DEFAULT_EXCLUDE: &str = "_*/**";

/// Settings for one [`TagEngine`](crate::TagEngine).
///
/// ```toml
/// [engine]
/// open = "{%"
/// close = "%}"
/// development = false
/// max_depth = 100
/// max_nesting = 256
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
	/// The sequence that opens a tag.
	pub open: String,
	/// The sequence that closes a tag.
	pub close: String,
	/// Skip argument and body validation and keep the full error chain and
	/// a backtrace when a handler fails.
	pub development: bool,
	/// How many times handler output may be re-expanded inside a single tag.
	pub max_depth: usize,
	/// How deeply tags may be nested inside each other's bodies.
	pub max_nesting: usize,
}

impl Default for EngineOptions {
	fn default() -> Self {
		Self {
			open: DEFAULT_OPEN.to_string(),
			close: DEFAULT_CLOSE.to_string(),
			development: false,
			max_depth: DEFAULT_MAX_DEPTH,
			max_nesting: DEFAULT_MAX_NESTING,
		}
	}
}

impl EngineOptions {
	/// Options with custom delimiters.
	pub fn with_delimiters(open: impl Into<String>, close: impl Into<String>) -> Self {
		Self {
			open: open.into(),
			close: close.into(),
			..Self::default()
		}
	}

	/// Check that the delimiters can be told apart.
	pub fn validate(&self) -> TagsResult<()> {
		let reason = if self.open.is_empty() || self.close.is_empty() {
			"delimiters cannot be empty"
		} else if self.open == self.close {
			"the open and close delimiters must differ"
		} else {
			return Ok(());
		};

		Err(TagsError::InvalidDelimiters {
			open: self.open.clone(),
			close: self.close.clone(),
			reason: reason.to_string(),
		})
	}
}

/// Settings for building a site.
///
/// ```toml
/// [build]
/// dest = "_site"
/// pattern = "**/*.html"
/// exclude = "_*/**"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
	/// Output directory, relative to the site root.
	pub dest: PathBuf,
	/// Files matching this glob are rendered through the engine.
	pub pattern: String,
	/// Files matching this glob are skipped entirely.
	pub exclude: String,
}

impl Default for BuildConfig {
	fn default() -> Self {
		Self {
			dest: PathBuf::from(DEFAULT_DEST),
			pattern: DEFAULT_PATTERN.to_string(),
			exclude: DEFAULT_EXCLUDE.to_string(),
		}
	}
}

/// Configuration loaded from a `tags.toml` file.
///
/// ```toml
/// [engine]
/// open = "<%"
/// close = "%>"
///
/// [build]
/// dest = "public"
///
/// [context]
/// site_name = "My site"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagsConfig {
	#[serde(default)]
	pub engine: EngineOptions,
	#[serde(default)]
	pub build: BuildConfig,
	/// Extra values made available to every tag handler.
	#[serde(default)]
	pub context: Context,
}

impl TagsConfig {
	/// Returns the first existing config file path from the supported
	/// candidates.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> TagsResult<Option<TagsConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::from_toml(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	/// Parse a config from TOML text.
	pub fn from_toml(content: &str) -> TagsResult<TagsConfig> {
		let config: TagsConfig =
			toml::from_str(content).map_err(|e| TagsError::ConfigParse(e.to_string()))?;
		config.engine.validate()?;

		Ok(config)
	}
}
