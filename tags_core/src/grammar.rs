//! Builds the matcher that recognizes registered tags in a document.
//!
//! For every registered name `t` the grammar has three productions:
//!
//! ```text
//! open  := OPEN ws* t ARGS CLOSE        ARGS is everything up to the next CLOSE
//! close := OPEN ws* "end" t ws* CLOSE
//! tag   := open body close | open
//! body  := ( any-tag | free-text )*     free-text contains neither delimiter
//! ```
//!
//! Names match case-insensitively and as whole words. `tag` is an ordered
//! choice: when no matching close tag follows the body, the open tag alone is
//! matched. Only closed bodies count towards `max_nesting`.

use std::ops::Range;

use crate::EngineOptions;
use crate::Point;
use crate::TagsError;
use crate::TagsResult;

/// Turns a set of tag names into a [`Matcher`].
#[derive(Debug, Clone)]
pub struct Grammar {
	open: String,
	close: String,
	max_nesting: usize,
}

impl Grammar {
	pub fn new(options: &EngineOptions) -> Self {
		Self {
			open: options.open.clone(),
			close: options.close.clone(),
			max_nesting: options.max_nesting,
		}
	}

	/// Build a matcher for the given names. Names are tried in the order
	/// given.
	pub fn build<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> Matcher {
		let tags = names
			.into_iter()
			.map(|name| {
				TagPattern {
					name: name.to_string(),
					close_name: format!("end{name}"),
				}
			})
			.collect();

		Matcher {
			open: self.open.clone(),
			close: self.close.clone(),
			max_nesting: self.max_nesting,
			tags,
		}
	}
}

#[derive(Debug, Clone)]
struct TagPattern {
	name: String,
	close_name: String,
}

/// A tag found in a document by the [`Matcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOccurrence<'t> {
	/// The registered name of the tag, which may differ in case from the
	/// source text.
	pub name: String,
	/// Everything between the tag name and the close delimiter of the open
	/// tag.
	pub raw_args: &'t str,
	/// The unexpanded text between the open and close tags, if the tag was
	/// closed.
	pub body: Option<&'t str>,
	/// Byte range of the whole occurrence, close tag included.
	pub span: Range<usize>,
}

/// Recognizes the union of all registered tags.
#[derive(Debug, Clone)]
pub struct Matcher {
	open: String,
	close: String,
	max_nesting: usize,
	tags: Vec<TagPattern>,
}

impl Matcher {
	/// The names this matcher recognizes, in match order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.tags.iter().map(|tag| tag.name.as_str())
	}

	/// Find every top-level tag occurrence in `text`, left to right. Tags
	/// nested inside a body are part of the outer occurrence and are not
	/// reported separately.
	pub fn scan<'t>(&self, text: &'t str) -> TagsResult<Vec<TagOccurrence<'t>>> {
		let mut occurrences = vec![];

		if self.tags.is_empty() {
			return Ok(occurrences);
		}

		let table = Table::build(self, text);
		let mut index = 0;

		while let Some(entry) = table.entries.get(index) {
			let Some(found) = entry.tag else {
				index += 1;
				continue;
			};

			if found.depth > self.max_nesting {
				return Err(TagsError::NestingLimit {
					limit: self.max_nesting,
					position: Point::locate(text, table.too_deep(found, self.max_nesting)),
				});
			}

			occurrences.push(found.into_occurrence(self, text));
			index = table.index_at(found.end);
		}

		Ok(occurrences)
	}
}

/// The byte ranges of a matched tag.
#[derive(Debug, Clone, Copy)]
struct Found {
	tag: usize,
	start: usize,
	args_start: usize,
	args_end: usize,
	body_start: usize,
	/// End of the body when the tag was closed.
	body_end: Option<usize>,
	end: usize,
	/// Closed bodies nested in this tag, its own included.
	depth: usize,
}

impl Found {
	fn into_occurrence<'t>(self, matcher: &Matcher, text: &'t str) -> TagOccurrence<'t> {
		TagOccurrence {
			name: matcher.tags[self.tag].name.clone(),
			raw_args: &text[self.args_start..self.args_end],
			body: self.body_end.map(|end| &text[self.body_start..end]),
			span: self.start..self.end,
		}
	}
}

/// The body production starting at some offset: a run of tags and free text.
#[derive(Debug, Clone, Copy, Default)]
struct Run {
	/// Where the body stops: the end of the text or the first delimiter that
	/// does not begin a tag.
	end: usize,
	/// The deepest tag in the run.
	depth: usize,
	/// Start of the first tag in the run with that depth.
	deepest: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
	tag: Option<Found>,
	run: Run,
}

/// The tag and body productions at every delimiter of one text.
///
/// A tag's extent depends only on where it starts and on the tags after it,
/// so entries are filled from the last delimiter to the first and each body
/// lookup finds its answer already in the table.
struct Table<'m, 't> {
	matcher: &'m Matcher,
	text: &'t str,
	/// Sorted start offsets of every open or close delimiter.
	delimiters: Vec<usize>,
	/// Sorted start offsets of every close delimiter.
	closes: Vec<usize>,
	/// One entry per delimiter.
	entries: Vec<Entry>,
}

impl<'m, 't> Table<'m, 't> {
	fn build(matcher: &'m Matcher, text: &'t str) -> Self {
		let opens = find_all(text, &matcher.open);
		let closes = find_all(text, &matcher.close);
		let mut delimiters: Vec<usize> = opens.into_iter().chain(closes.iter().copied()).collect();
		delimiters.sort_unstable();
		delimiters.dedup();

		let mut table = Self {
			matcher,
			text,
			entries: vec![Entry::default(); delimiters.len()],
			delimiters,
			closes,
		};

		for index in (0..table.delimiters.len()).rev() {
			let start = table.delimiters[index];
			let tag = table.match_tag(start);
			let run = match tag {
				Some(found) => {
					let rest = table.run_at(found.end);
					if found.depth > 0 && found.depth >= rest.depth {
						Run {
							end: rest.end,
							depth: found.depth,
							deepest: Some(start),
						}
					} else {
						rest
					}
				}
				None => {
					Run {
						end: start,
						..Run::default()
					}
				}
			};

			table.entries[index] = Entry { tag, run };
		}

		table
	}

	/// Index of the first delimiter at or after `offset`.
	fn index_at(&self, offset: usize) -> usize {
		self.delimiters.partition_point(|&start| start < offset)
	}

	/// The body production at `offset`. Free text up to the next delimiter
	/// is skipped.
	fn run_at(&self, offset: usize) -> Run {
		match self.entries.get(self.index_at(offset)) {
			Some(entry) => entry.run,
			None => {
				Run {
					end: self.text.len(),
					..Run::default()
				}
			}
		}
	}

	fn tag_at(&self, offset: usize) -> Option<Found> {
		let index = self.index_at(offset);
		self.entries
			.get(index)
			.filter(|_| self.delimiters[index] == offset)
			.and_then(|entry| entry.tag)
	}

	/// The full tag production at `start`, trying each registered name in
	/// order. Only entries after `start` are read.
	fn match_tag(&self, start: usize) -> Option<Found> {
		let name_start = self.after_open(start)?;

		for (index, tag) in self.matcher.tags.iter().enumerate() {
			let Some(args_start) = match_keyword(self.text, name_start, &tag.name) else {
				continue;
			};
			let next_close = self.closes.partition_point(|&close| close < args_start);
			let Some(&args_end) = self.closes.get(next_close) else {
				continue;
			};

			let body_start = args_end + self.matcher.close.len();
			let body = self.run_at(body_start);

			let found = match self.match_close(body.end, index) {
				Some(end) => {
					Found {
						tag: index,
						start,
						args_start,
						args_end,
						body_start,
						body_end: Some(body.end),
						end,
						depth: body.depth + 1,
					}
				}
				None => {
					Found {
						tag: index,
						start,
						args_start,
						args_end,
						body_start,
						body_end: None,
						end: body_start,
						depth: 0,
					}
				}
			};

			return Some(found);
		}

		None
	}

	/// Start of the first body nested deeper than `limit` inside `found`.
	fn too_deep(&self, found: Found, limit: usize) -> usize {
		let mut current = found;

		for _ in 0..limit {
			let Some(next) = self
				.run_at(current.body_start)
				.deepest
				.and_then(|start| self.tag_at(start))
			else {
				break;
			};
			current = next;
		}

		current.body_start
	}

	/// The close production for the tag at `index`, starting exactly at
	/// `start`.
	fn match_close(&self, start: usize, index: usize) -> Option<usize> {
		let name_start = self.after_open(start)?;
		let name_end = match_keyword(self.text, name_start, &self.matcher.tags[index].close_name)?;
		let close_start = skip_whitespace(self.text, name_end);

		self.text[close_start..]
			.starts_with(&self.matcher.close)
			.then(|| close_start + self.matcher.close.len())
	}

	/// If an open delimiter starts at `start`, the offset of the first
	/// non-whitespace character after it.
	fn after_open(&self, start: usize) -> Option<usize> {
		self.text[start..]
			.starts_with(&self.matcher.open)
			.then(|| skip_whitespace(self.text, start + self.matcher.open.len()))
	}
}

/// Start offsets of every occurrence of `pattern`, overlapping ones included.
fn find_all(text: &str, pattern: &str) -> Vec<usize> {
	let mut offsets = vec![];
	let mut cursor = 0;

	while let Some(relative) = text[cursor..].find(pattern) {
		let start = cursor + relative;
		offsets.push(start);
		cursor = start + next_char_len(&text[start..]);
	}

	offsets
}

/// Characters that continue a word. A tag name must not be followed by one
/// of these.
fn is_word_char(ch: char) -> bool {
	ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

fn skip_whitespace(text: &str, start: usize) -> usize {
	let rest = &text[start..];
	start + (rest.len() - rest.trim_start_matches([' ', '\t', '\r', '\n']).len())
}

fn next_char_len(text: &str) -> usize {
	text.chars().next().map_or(1, char::len_utf8)
}

/// Match `word` case-insensitively at `start` as a whole word. Returns the
/// offset just past the word.
fn match_keyword(text: &str, start: usize, word: &str) -> Option<usize> {
	let mut chars = text[start..].char_indices();
	let mut end = start;

	for expected in word.chars() {
		let (index, actual) = chars.next()?;
		if actual != expected && !actual.to_lowercase().eq(expected.to_lowercase()) {
			return None;
		}
		end = start + index + actual.len_utf8();
	}

	match text[end..].chars().next() {
		Some(ch) if is_word_char(ch) => None,
		_ => Some(end),
	}
}
