use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use owo_colors::OwoColorize;
use tags_cli::Commands;
use tags_cli::TagsCli;
use tags_core::TagEngine;
use tags_core::TagsConfig;
use tags_core::TagsError;
use tags_core::builtins::standard_tags;
use tags_core::site::BuildOptions;
use tags_core::site::BuildReport;
use tags_core::site::build_site;
use tags_core::site::new_site;
use tags_core::site::render_page;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
	let args = TagsCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::New { force }) => run_new(&args, *force),
		Some(Commands::Build {
			dest,
			pattern,
			exclude,
			force,
			watch,
		}) => {
			let overrides = BuildOverrides {
				dest: dest.clone(),
				pattern: pattern.clone(),
				exclude: exclude.clone(),
				force: *force,
			};
			run_build(&args, &overrides, *watch)
		}
		Some(Commands::Render { file }) => run_render(&args, file),
		None => {
			eprintln!("No subcommand specified. Run `tags --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<TagsError>() {
			Ok(tags_err) => {
				let report: miette::Report = (*tags_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.without_time()
		.try_init();
}

fn resolve_root(args: &TagsCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_config(root: &Path) -> CliResult<TagsConfig> {
	Ok(TagsConfig::load(root)?.unwrap_or_default())
}

fn create_engine(config: &TagsConfig) -> CliResult<TagEngine> {
	Ok(TagEngine::with_tags(config.engine.clone(), standard_tags())?)
}

fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}

fn run_new(args: &TagsCli, force: bool) -> CliResult<()> {
	let root = resolve_root(args);
	let written = new_site(&root, force)?;

	for path in &written {
		println!("Created {}", make_relative(path, &root));
	}

	println!();
	println!("Next steps:");
	println!("  1. Edit index.html and the partials in _partials/");
	println!("  2. Run `tags build` to render the site into _site/");

	Ok(())
}

/// Command line values that replace the `[build]` section of the config.
struct BuildOverrides {
	dest: Option<PathBuf>,
	pattern: Option<String>,
	exclude: Option<String>,
	force: bool,
}

fn build_options(root: &Path, config: &TagsConfig, overrides: &BuildOverrides) -> BuildOptions {
	let mut options = BuildOptions::from_config(root, &config.build);
	options.force = overrides.force;
	options.context = config.context.clone();

	if let Some(dest) = &overrides.dest {
		options.dest.clone_from(dest);
	}
	if let Some(pattern) = &overrides.pattern {
		options.pattern.clone_from(pattern);
	}
	if let Some(exclude) = &overrides.exclude {
		options.exclude.clone_from(exclude);
	}

	options
}

fn run_build(args: &TagsCli, overrides: &BuildOverrides, watch: bool) -> CliResult<()> {
	// Run the initial build.
	let is_ok = run_build_once(args, overrides)?;

	if !watch {
		if !is_ok {
			process::exit(1);
		}
		return Ok(());
	}

	// Watch mode
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let root = resolve_root(args);
	let config = load_config(&root)?;
	let dest = build_options(&root, &config, overrides).dest_dir();
	let dest = dest.canonicalize().unwrap_or(dest);
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			let Ok(event) = res else {
				return;
			};

			let is_change = matches!(
				event.kind,
				notify::EventKind::Modify(_)
					| notify::EventKind::Create(_)
					| notify::EventKind::Remove(_)
			);
			// Ignore our own writes into the output folder.
			let is_source = event.paths.iter().any(|path| !path.starts_with(&dest));

			if is_change && is_source {
				let _ = tx.send(());
			}
		})?;

	use notify::Watcher;
	watcher.watch(&root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, rebuilding...");
		if let Err(e) = run_build_once(args, overrides) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

/// Build the site once and return whether every page rendered.
fn run_build_once(args: &TagsCli, overrides: &BuildOverrides) -> CliResult<bool> {
	let root = resolve_root(args);
	let config = load_config(&root)?;
	let engine = create_engine(&config)?;
	let options = build_options(&root, &config, overrides);

	println!(
		"Building site from '{}' into '{}'",
		root.display(),
		options.dest.display()
	);

	let report = build_site(&engine, &options)?;
	Ok(print_report(args, report))
}

fn print_report(args: &TagsCli, report: BuildReport) -> bool {
	if args.verbose {
		for file in &report.rendered {
			println!("  rendered {}", file.display());
		}
		for file in &report.copied {
			println!("  copied   {}", file.display());
		}
	}

	let summary = format!(
		"Rendered {} page(s), copied {} file(s).",
		report.rendered.len(),
		report.copied.len()
	);
	println!("{}", colored!(summary, green));

	if report.failures.is_empty() {
		return true;
	}

	let failed = report.failures.len();
	for failure in report.failures {
		let file = failure.file.display().to_string();
		let diagnostic: miette::Report = failure.error.into();
		eprintln!("{} {diagnostic:?}", colored!(file, bold));
	}

	eprintln!(
		"{}",
		colored!(format!("{failed} page(s) failed to render."), red)
	);

	false
}

fn run_render(args: &TagsCli, file: &Path) -> CliResult<()> {
	let root = resolve_root(args);
	let config = load_config(&root)?;
	let engine = create_engine(&config)?;

	let output = render_page(&engine, &root, file, &config.context)?;
	print!("{output}");

	Ok(())
}
