#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn tags_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("tags"));
	cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
	cmd
}

/// Write each `(relative path, content)` pair below `root`.
pub fn write_files(root: &Path, files: &[(&str, &str)]) -> std::io::Result<()> {
	for (name, content) in files {
		let path = root.join(name);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(path, content)?;
	}

	Ok(())
}

pub const NAV_PARTIAL: &str = r#"<a{% is index.html %} class="active"{% endis %}>home</a><a{% is about.html %} class="active"{% endis %}>about</a>"#;

/// Two pages sharing a navigation partial, and a stylesheet.
pub fn sample_site(root: &Path) -> std::io::Result<()> {
	write_files(
		root,
		&[
			("index.html", "{% include _partials/nav.html %}<h1>Home</h1>"),
			("about.html", "{% include _partials/nav.html %}<h1>About</h1>"),
			("_partials/nav.html", NAV_PARTIAL),
			("css/style.css", "body { margin: 0; }"),
		],
	)
}
