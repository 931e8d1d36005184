//! The tags every site gets.
//!
//! - `{% include PATH %}` is replaced by the contents of `PATH`, relative to
//!   the site root.
//! - `{% is PATH %}...{% endis %}` keeps its body only while rendering the page
//!   at `PATH`, which makes it handy for marking the active navigation link.

use std::path::Path;

use crate::Context;
use crate::HandlerResult;
use crate::TagCall;
use crate::TagDefinition;

/// Context key holding the page being rendered, relative to the site root.
pub const FILENAME_KEY: &str = "filename";
/// Context key holding the site root directory.
pub const ROOTDIR_KEY: &str = "rootdir";

/// The `include` and `is` tags.
pub fn standard_tags() -> Vec<TagDefinition> {
	vec![
		TagDefinition::new("include", include).args(1),
		TagDefinition::new("is", is).args(1).optional_body(),
	]
}

/// The context used to render one page of a site.
pub fn page_context(filename: &str, rootdir: &Path) -> Context {
	Context::new()
		.with(FILENAME_KEY, filename)
		.with(ROOTDIR_KEY, rootdir.to_string_lossy().into_owned())
}

fn include(call: &TagCall<'_>) -> HandlerResult {
	let path = call.arg(0).unwrap_or_default();
	let root = call.context.get_str(ROOTDIR_KEY).unwrap_or(".");
	let full_path = Path::new(root).join(path);

	std::fs::read_to_string(&full_path)
		.map_err(|e| format!("cannot include `{}`: {e}", full_path.display()).into())
}

fn is(call: &TagCall<'_>) -> HandlerResult {
	let path = call.arg(0).unwrap_or_default();

	if call.context.get_str(FILENAME_KEY) == Some(path) {
		Ok(call.body_or_empty().to_string())
	} else {
		Ok(String::new())
	}
}
