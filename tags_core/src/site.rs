//! Building a static site: every page matching the build pattern is expanded
//! with the [`standard_tags`](crate::builtins::standard_tags), everything else
//! is copied as is.

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::GlobBuilder;
use globset::GlobMatcher;

use crate::BuildConfig;
use crate::Context;
use crate::TagEngine;
use crate::TagsError;
use crate::TagsResult;
use crate::builtins::page_context;

/// Options for [`build_site`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
	/// The site source directory.
	pub root: PathBuf,
	/// The output directory. Relative paths are resolved against `root`.
	pub dest: PathBuf,
	/// Glob for files that are rendered.
	pub pattern: String,
	/// Glob for files that are skipped.
	pub exclude: String,
	/// Build even when the root has no `index.html`.
	pub force: bool,
	/// Values added to the context of every page.
	pub context: Context,
}

impl BuildOptions {
	/// Options for `root` taken from the `[build]` section of the config.
	pub fn from_config(root: impl Into<PathBuf>, config: &BuildConfig) -> Self {
		Self {
			root: root.into(),
			dest: config.dest.clone(),
			pattern: config.pattern.clone(),
			exclude: config.exclude.clone(),
			force: false,
			context: Context::new(),
		}
	}

	/// The absolute (or root-joined) output directory.
	pub fn dest_dir(&self) -> PathBuf {
		self.root.join(&self.dest)
	}
}

/// A page that could not be rendered.
#[derive(Debug)]
pub struct BuildFailure {
	/// Path of the page relative to the site root.
	pub file: PathBuf,
	pub error: TagsError,
}

/// What a site build did.
#[derive(Debug, Default)]
pub struct BuildReport {
	/// Pages rendered through the engine, relative to the site root.
	pub rendered: Vec<PathBuf>,
	/// Files copied unchanged, relative to the site root.
	pub copied: Vec<PathBuf>,
	/// Pages skipped because a tag failed.
	pub failures: Vec<BuildFailure>,
}

impl BuildReport {
	/// Returns true if every page rendered.
	pub fn is_ok(&self) -> bool {
		self.failures.is_empty()
	}
}

/// Compile a glob in which `*` stays within one path segment and `**` spans
/// any number of segments.
pub fn compile_pattern(pattern: &str) -> TagsResult<GlobMatcher> {
	let glob = GlobBuilder::new(pattern.trim_matches('/'))
		.literal_separator(true)
		.build()
		.map_err(|e| {
			TagsError::InvalidPattern {
				pattern: pattern.to_string(),
				reason: e.to_string(),
			}
		})?;

	Ok(glob.compile_matcher())
}

/// Check whether a `/`-separated relative path matches a glob pattern.
pub fn matches_pattern(pattern: &str, path: impl AsRef<Path>) -> TagsResult<bool> {
	Ok(compile_pattern(pattern)?.is_match(path))
}

/// Expand the tags in one page of the site.
pub fn render_file(engine: &TagEngine, root: &Path, filename: &Path) -> TagsResult<String> {
	render_page(engine, root, filename, &Context::new())
}

/// Expand the tags in one page with extra context values. The page's
/// `filename` and `rootdir` take precedence over values in `base`.
pub fn render_page(
	engine: &TagEngine,
	root: &Path,
	filename: &Path,
	base: &Context,
) -> TagsResult<String> {
	let content = std::fs::read_to_string(root.join(filename))?;
	let mut context = base.clone();
	context.extend_from(&page_context(&path_key(filename), root));

	engine.parse(&content, &context)
}

/// Render one page and write it to `dest_file`, creating parent directories.
pub fn build_file(
	engine: &TagEngine,
	root: &Path,
	filename: &Path,
	dest_file: &Path,
) -> TagsResult<()> {
	let output = render_file(engine, root, filename)?;
	write_file(dest_file, &output)
}

/// Build the whole site described by `options`.
///
/// Pages whose tags fail are recorded in [`BuildReport::failures`] and
/// skipped. Any I/O error stops the build.
pub fn build_site(engine: &TagEngine, options: &BuildOptions) -> TagsResult<BuildReport> {
	let root = options.root.as_path();

	if !options.force && !root.join("index.html").is_file() {
		return Err(TagsError::MissingIndex {
			root: root.display().to_string(),
		});
	}

	let include = compile_pattern(&options.pattern)?;
	let exclude = compile_pattern(&options.exclude)?;
	let dest = options.dest_dir();

	tracing::info!(root = %root.display(), dest = %dest.display(), "building site");

	let mut report = BuildReport::default();

	for filename in collect_files(root, &dest)? {
		if exclude.is_match(&filename) {
			continue;
		}

		let dest_file = dest.join(&filename);

		if include.is_match(&filename) {
			match render_page(engine, root, &filename, &options.context) {
				Ok(output) => {
					write_file(&dest_file, &output)?;
					report.rendered.push(filename);
				}
				Err(error) if error.is_tag_error() => {
					tracing::warn!(file = %filename.display(), %error, "skipping page");
					report.failures.push(BuildFailure {
						file: filename,
						error,
					});
				}
				Err(error) => return Err(error),
			}
		} else {
			copy_file(&root.join(&filename), &dest_file)?;
			report.copied.push(filename);
		}
	}

	tracing::info!(
		rendered = report.rendered.len(),
		copied = report.copied.len(),
		failed = report.failures.len(),
		"site built"
	);

	Ok(report)
}

/// The pages and assets of a new site, relative to its root.
pub const STARTER_SITE: [(&str, &str); 5] = [
	("index.html", STARTER_INDEX),
	("about.html", STARTER_ABOUT),
	("_partials/head.html", STARTER_HEAD),
	("_partials/nav.html", STARTER_NAV),
	("css/style.css", STARTER_STYLE),
];

const STARTER_INDEX: &str = r#"<!DOCTYPE html>
<html>
{% include _partials/head.html %}
<body>
  {% include _partials/nav.html %}
  <h1>Welcome!</h1>
</body>
</html>
"#;

const STARTER_ABOUT: &str = r#"<!DOCTYPE html>
<html>
{% include _partials/head.html %}
<body>
  {% include _partials/nav.html %}
  <h1>About</h1>
</body>
</html>
"#;

const STARTER_HEAD: &str = r#"<head>
  <meta charset="utf-8" />
  <title>My new site</title>
  <link rel="stylesheet" href="/css/style.css" />
</head>"#;

const STARTER_NAV: &str = r#"<ul>
    <li><a href="/"{% is index.html %} class="active"{% endis %}>home</a></li>
    <li><a href="/about.html"{% is about.html %} class="active"{% endis %}>about</a></li>
  </ul>"#;

const STARTER_STYLE: &str = ".active { font-weight: bold; }\n";

/// Write a starter site into `root`. Returns the files written.
pub fn new_site(root: &Path, force: bool) -> TagsResult<Vec<PathBuf>> {
	if !force && root.join("index.html").exists() {
		return Err(TagsError::SiteExists {
			root: root.display().to_string(),
		});
	}

	let mut written = Vec::with_capacity(STARTER_SITE.len());

	for (filename, content) in STARTER_SITE {
		let path = root.join(filename);
		write_file(&path, content)?;
		written.push(path);
	}

	tracing::info!(root = %root.display(), files = written.len(), "created new site");

	Ok(written)
}

/// The relative path with `/` separators on every platform.
fn path_key(path: &Path) -> String {
	path.to_string_lossy().replace('\\', "/")
}

fn write_file(path: &Path, content: &str) -> TagsResult<()> {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}

	std::fs::write(path, content)?;
	Ok(())
}

fn copy_file(from: &Path, to: &Path) -> TagsResult<()> {
	if let Some(parent) = to.parent() {
		std::fs::create_dir_all(parent)?;
	}

	std::fs::copy(from, to)?;
	Ok(())
}

/// Every file below `root`, relative to it, skipping the output directory.
fn collect_files(root: &Path, dest: &Path) -> TagsResult<Vec<PathBuf>> {
	let mut files = Vec::new();
	let mut visited_dirs = HashSet::new();
	let dest = dest.canonicalize().ok();

	walk_dir(root, root, dest.as_deref(), &mut files, &mut visited_dirs)?;
	// Sort for deterministic ordering.
	files.sort();

	Ok(files)
}

fn walk_dir(
	root: &Path,
	dir: &Path,
	dest: Option<&Path>,
	files: &mut Vec<PathBuf>,
	visited_dirs: &mut HashSet<PathBuf>,
) -> TagsResult<()> {
	// Detect symlink cycles by tracking canonical paths.
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if Some(canonical.as_path()) == dest {
		return Ok(());
	}
	if !visited_dirs.insert(canonical) {
		return Err(TagsError::SymlinkCycle {
			path: dir.display().to_string(),
		});
	}

	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();

		if path.is_dir() {
			walk_dir(root, &path, dest, files, visited_dirs)?;
		} else if let Ok(relative) = path.strip_prefix(root) {
			files.push(relative.to_path_buf());
		}
	}

	Ok(())
}
