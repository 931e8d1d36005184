mod common;

use clap::Parser;
use rstest::rstest;
use similar_asserts::assert_eq;
use tags_cli::Commands;
use tags_cli::TagsCli;
use tags_core::AnyEmptyResult;

#[test]
fn build_renders_site() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::sample_site(tmp.path())?;

	common::tags_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Building site from"))
		.stdout(predicates::str::contains("Rendered 2 page(s), copied 1 file(s)."));

	let site = tmp.path().join("_site");
	assert_eq!(
		std::fs::read_to_string(site.join("index.html"))?,
		r#"<a class="active">home</a><a>about</a><h1>Home</h1>"#
	);
	assert_eq!(
		std::fs::read_to_string(site.join("about.html"))?,
		r#"<a>home</a><a class="active">about</a><h1>About</h1>"#
	);
	assert_eq!(
		std::fs::read_to_string(site.join("css/style.css"))?,
		"body { margin: 0; }"
	);
	assert!(!site.join("_partials").exists());

	Ok(())
}

#[test]
fn build_new_site() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::tags_cmd()
		.arg("new")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	common::tags_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let index = std::fs::read_to_string(tmp.path().join("_site/index.html"))?;
	assert!(index.contains(r#"<a href="/" class="active">home</a>"#));
	assert!(!index.contains("{%"));

	Ok(())
}

#[test]
fn build_without_index_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(tmp.path(), &[("page.html", "hello")])?;

	common::tags_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("no index.html found"));

	assert!(!tmp.path().join("_site").exists());

	Ok(())
}

#[test]
fn build_force_without_index() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(tmp.path(), &[("page.html", "hello")])?;

	common::tags_cmd()
		.arg("build")
		.arg("--force")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("_site/page.html"))?,
		"hello"
	);

	Ok(())
}

#[test]
fn build_with_failed_page_exits_with_one() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::sample_site(tmp.path())?;
	common::write_files(tmp.path(), &[("broken.html", "{% include missing.html %}")])?;

	common::tags_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains("Rendered 2 page(s)"))
		.stderr(predicates::str::contains("broken.html"))
		.stderr(predicates::str::contains("1 page(s) failed to render."));

	assert!(tmp.path().join("_site/index.html").exists());
	assert!(!tmp.path().join("_site/broken.html").exists());

	Ok(())
}

#[test]
fn build_reads_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			(
				"tags.toml",
				"[engine]\nopen = \"<%\"\nclose = \"%>\"\n\n[build]\ndest = \"public\"\n",
			),
			("index.html", "<% include _partials/title.html %>"),
			("_partials/title.html", "<h1>Title</h1>"),
		],
	)?;

	common::tags_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("public/index.html"))?,
		"<h1>Title</h1>"
	);
	assert!(!tmp.path().join("_site").exists());

	Ok(())
}

#[test]
fn build_flags_override_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::sample_site(tmp.path())?;
	common::write_files(
		tmp.path(),
		&[
			("tags.toml", "[build]\ndest = \"public\"\n"),
			("notes/todo.txt", "later"),
		],
	)?;

	common::tags_cmd()
		.arg("build")
		.arg("--dest")
		.arg("out")
		.arg("--exclude")
		.arg("{_*/**,notes/**}")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let out = tmp.path().join("out");
	assert!(out.join("index.html").exists());
	assert!(!out.join("notes").exists());
	assert!(!tmp.path().join("public").exists());

	Ok(())
}

#[test]
fn build_rejects_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::sample_site(tmp.path())?;
	common::write_files(tmp.path(), &[("tags.toml", "[engine")])?;

	common::tags_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("tags::config_parse"));

	Ok(())
}

#[test]
fn build_rejects_invalid_pattern() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::sample_site(tmp.path())?;

	common::tags_cmd()
		.arg("build")
		.arg("--pattern")
		.arg("a[")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("invalid glob pattern"));

	Ok(())
}

#[rstest]
#[case::defaults(&["tags", "build"], None, false, false)]
#[case::dest(&["tags", "build", "--dest", "public"], Some("public"), false, false)]
#[case::force(&["tags", "build", "--force"], None, true, false)]
#[case::watch(&["tags", "build", "--watch"], None, false, true)]
fn build_flags_are_parsed(
	#[case] argv: &[&str],
	#[case] expected_dest: Option<&str>,
	#[case] expected_force: bool,
	#[case] expected_watch: bool,
) {
	let cli = TagsCli::parse_from(argv);
	match cli.command {
		Some(Commands::Build {
			dest, force, watch, ..
		}) => {
			assert_eq!(dest.as_deref(), expected_dest.map(std::path::Path::new));
			assert_eq!(force, expected_force);
			assert_eq!(watch, expected_watch);
		}
		_ => panic!("expected Build command"),
	}
}

#[test]
fn global_flags_are_parsed() {
	let cli = TagsCli::parse_from(["tags", "render", "index.html", "--verbose", "--no-color"]);
	assert!(cli.verbose);
	assert!(cli.no_color);
	assert!(matches!(cli.command, Some(Commands::Render { .. })));
}
