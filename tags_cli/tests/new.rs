mod common;

use clap::Parser;
use tags_cli::Commands;
use tags_cli::TagsCli;
use tags_core::AnyEmptyResult;

#[test]
fn new_creates_starter_site() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::tags_cmd()
		.arg("new")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Created index.html"))
		.stdout(predicates::str::contains("Next steps"));

	for file in [
		"index.html",
		"about.html",
		"_partials/head.html",
		"_partials/nav.html",
		"css/style.css",
	] {
		assert!(tmp.path().join(file).is_file(), "missing {file}");
	}

	let nav = std::fs::read_to_string(tmp.path().join("_partials/nav.html"))?;
	assert!(nav.contains("{% is index.html %}"));

	Ok(())
}

#[test]
fn new_does_not_overwrite_existing_site() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("index.html"), "existing content")?;

	common::tags_cmd()
		.arg("new")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("already contains"));

	let content = std::fs::read_to_string(tmp.path().join("index.html"))?;
	assert_eq!(content, "existing content");

	Ok(())
}

#[test]
fn new_force_overwrites_existing_site() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("index.html"), "existing content")?;

	common::tags_cmd()
		.arg("new")
		.arg("--force")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let content = std::fs::read_to_string(tmp.path().join("index.html"))?;
	assert!(content.contains("{% include _partials/head.html %}"));

	Ok(())
}

#[test]
fn new_force_flag_is_parsed() {
	let cli = TagsCli::parse_from(["tags", "new", "--force"]);
	match cli.command {
		Some(Commands::New { force }) => assert!(force),
		_ => panic!("expected New command"),
	}

	let cli = TagsCli::parse_from(["tags", "new"]);
	match cli.command {
		Some(Commands::New { force }) => assert!(!force),
		_ => panic!("expected New command"),
	}
}

#[test]
fn missing_subcommand_fails() {
	common::tags_cmd()
		.assert()
		.code(1)
		.stderr(predicates::str::contains("No subcommand specified"));
}
