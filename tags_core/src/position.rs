use std::fmt::Display;
use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;

/// A single location in a document.
///
/// `line` and `column` are 1-indexed (columns count characters, not bytes).
/// `offset` is the 0-indexed byte offset into the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
	pub line: usize,
	pub column: usize,
	pub offset: usize,
}

impl Point {
	pub fn new(line: usize, column: usize, offset: usize) -> Self {
		Self {
			line,
			column,
			offset,
		}
	}

	/// The point at the very beginning of a document.
	pub fn start() -> Self {
		Self::new(1, 1, 0)
	}

	/// Locate a byte offset in `source`. Offsets past the end are clamped to
	/// the end of the text.
	pub fn locate(source: &str, offset: usize) -> Self {
		let mut offset = offset.min(source.len());
		while !source.is_char_boundary(offset) {
			offset -= 1;
		}

		let mut point = Self::start();
		point.advance_str(&source[..offset]);
		point
	}

	/// Move this point forward over the given text.
	pub fn advance_str(&mut self, text: &str) {
		for ch in text.chars() {
			self.advance_char(ch);
		}
	}

	fn advance_char(&mut self, ch: char) {
		self.offset += ch.len_utf8();

		if ch == '\n' {
			self.line += 1;
			self.column = 1;
		} else {
			self.column += 1;
		}
	}
}

impl Display for Point {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "line {}, column {}", self.line, self.column)
	}
}

/// The start and end [`Point`] of a span of source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
	pub start: Point,
	pub end: Point,
}

impl Position {
	pub fn new(
		start_line: usize,
		start_column: usize,
		start_offset: usize,
		end_line: usize,
		end_column: usize,
		end_offset: usize,
	) -> Self {
		Self {
			start: Point::new(start_line, start_column, start_offset),
			end: Point::new(end_line, end_column, end_offset),
		}
	}

	/// Build the position of a byte range within `source`.
	pub fn from_span(source: &str, span: &Range<usize>) -> Self {
		let start = Point::locate(source, span.start);
		let mut end = start;
		let end_offset = span.end.clamp(start.offset, source.len());
		if let Some(rest) = source.get(start.offset..end_offset) {
			end.advance_str(rest);
		}

		Self { start, end }
	}

	/// The byte range covered by this position.
	pub fn span(&self) -> Range<usize> {
		self.start.offset..self.end.offset
	}
}
