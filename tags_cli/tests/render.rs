mod common;

use tags_core::AnyEmptyResult;

#[test]
fn render_prints_expanded_page() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::sample_site(tmp.path())?;

	let output = common::tags_cmd()
		.arg("render")
		.arg("about.html")
		.arg("--path")
		.arg(tmp.path())
		.output()?;

	assert!(output.status.success());
	let stdout = String::from_utf8(output.stdout)?;
	insta::assert_snapshot!(stdout, @r#"<a>home</a><a class="active">about</a><h1>About</h1>"#);

	Ok(())
}

#[test]
fn render_uses_configured_delimiters() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			("tags.toml", "[engine]\nopen = \"<%\"\nclose = \"%>\"\n"),
			("index.html", "<% is index.html %>here<% endis %> {% is index.html %}"),
		],
	)?;

	common::tags_cmd()
		.arg("render")
		.arg("index.html")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("here {% is index.html %}");

	Ok(())
}

#[test]
fn render_reports_tag_errors() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(tmp.path(), &[("index.html", "{% include missing.html %}")])?;

	common::tags_cmd()
		.arg("render")
		.arg("index.html")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("tag `include` failed"));

	Ok(())
}

#[test]
fn render_reports_argument_errors() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(tmp.path(), &[("index.html", "\n{% include a.html b.html %}")])?;

	common::tags_cmd()
		.arg("render")
		.arg("index.html")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("tags::argument_count"))
		.stderr(predicates::str::contains("line 2, column 1"));

	Ok(())
}

#[test]
fn render_missing_file_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::tags_cmd()
		.arg("render")
		.arg("nope.html")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2);

	Ok(())
}
