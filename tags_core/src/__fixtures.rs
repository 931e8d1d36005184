use std::path::Path;

use crate::EngineOptions;
use crate::HandlerResult;
use crate::TagCall;
use crate::TagDefinition;
use crate::TagEngine;

/// Joins the arguments and a non-empty body with `", "`.
pub fn join_handler(call: &TagCall<'_>) -> HandlerResult {
	let mut parts: Vec<&str> = call.args.iter().map(String::as_str).collect();
	if let Some(body) = call.body.filter(|body| !body.is_empty()) {
		parts.push(body);
	}

	Ok(parts.join(", "))
}

/// `t` accepting any arguments and an optional body.
pub fn join_tag() -> TagDefinition {
	TagDefinition::new("t", join_handler)
		.variadic()
		.optional_body()
}

/// `t` wrapping its body in square brackets.
pub fn bracket_tag() -> TagDefinition {
	TagDefinition::new("t", |call| Ok(format!("[{}]", call.body_or_empty()))).body()
}

/// `t` returning its body in upper case.
pub fn upper_tag() -> TagDefinition {
	TagDefinition::new("t", |call| Ok(call.body_or_empty().to_uppercase())).body()
}

/// `pair` taking exactly two arguments and no body.
pub fn pair_tag() -> TagDefinition {
	TagDefinition::new("pair", |call| Ok(format!("{}={}", call.args[0], call.args[1]))).args(2)
}

/// `fail` whose handler always errors.
pub fn fail_tag() -> TagDefinition {
	TagDefinition::new("fail", |_| Err("boom".into()))
}

pub fn engine_with(tags: impl IntoIterator<Item = TagDefinition>) -> TagEngine {
	TagEngine::with_tags(EngineOptions::default(), tags)
		.unwrap_or_else(|e| panic!("engine: {e}"))
}

pub fn development_engine_with(tags: impl IntoIterator<Item = TagDefinition>) -> TagEngine {
	let options = EngineOptions {
		development: true,
		..EngineOptions::default()
	};

	TagEngine::with_tags(options, tags).unwrap_or_else(|e| panic!("engine: {e}"))
}

/// Write each `(relative path, content)` pair below `root`.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
	for (name, content) in files {
		let path = root.join(name);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("mkdir: {e}"));
		}
		std::fs::write(&path, content).unwrap_or_else(|e| panic!("write {name}: {e}"));
	}
}

pub fn read_file(path: &Path) -> String {
	std::fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

pub const NAV_PARTIAL: &str = r#"<a{% is index.html %} class="active"{% endis %}>home</a><a{% is about.html %} class="active"{% endis %}>about</a>"#;

/// A small site with two pages sharing a navigation partial, and a stylesheet.
pub fn sample_site(root: &Path) {
	write_files(
		root,
		&[
			("index.html", "{% include _partials/nav.html %}<h1>Home</h1>"),
			("about.html", "{% include _partials/nav.html %}<h1>About</h1>"),
			("_partials/nav.html", NAV_PARTIAL),
			("css/style.css", "body { margin: 0; }"),
		],
	);
}
