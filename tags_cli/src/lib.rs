use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Build static sites from pages written with custom template tags.",
	long_about = "tags expands custom tags such as `{% include _partials/nav.html %}` and `{% is \
	              index.html %}...{% endis %}` in your pages and writes the result to an output \
	              folder.\n\nQuick start:\n  tags new     Create a starter site\n  tags build   \
	              Render the site into _site\n  tags render  Print one rendered page"
)]
pub struct TagsCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the site root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create a starter site with two pages, shared partials and a stylesheet.
	///
	/// Refuses to touch a folder that already has an `index.html` unless
	/// `--force` is given.
	New {
		/// Overwrite an existing site.
		#[arg(long, default_value_t = false)]
		force: bool,
	},
	/// Render every page of the site into the output folder.
	///
	/// Files matching `--pattern` are rendered, other files are copied and
	/// files matching `--exclude` are skipped. Exits with status 1 when any
	/// page fails to render.
	Build {
		/// Output folder, relative to the site root. Defaults to `_site` or the
		/// `[build]` section of tags.toml.
		#[arg(long)]
		dest: Option<PathBuf>,

		/// Glob for the files that are rendered.
		#[arg(long)]
		pattern: Option<String>,

		/// Glob for the files that are skipped.
		#[arg(long)]
		exclude: Option<String>,

		/// Build even when the site root has no `index.html`.
		#[arg(long, default_value_t = false)]
		force: bool,

		/// Watch for file changes and rebuild automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// Render a single page and print it to stdout.
	Render {
		/// The page to render, relative to the site root.
		file: PathBuf,
	},
}
