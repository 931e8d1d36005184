use std::ops::Range;

use logos::Logos;

/// Raw tokens produced by logos for the argument span of an open tag.
///
/// The classes are disjoint so every byte of the input belongs to exactly one
/// token kind.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
	#[regex(r"[ \t\r\n]+")]
	Whitespace,
	#[token("\"")]
	DoubleQuote,
	#[token("'")]
	SingleQuote,
	#[regex(r#"[^ \t\r\n"']+"#)]
	Text,
}

/// Walks the logos token stream and assembles argument strings.
struct ArgumentWalker<'a> {
	/// The raw argument span of the tag.
	source: &'a str,
	/// The collected raw tokens and their byte spans.
	raw_tokens: Vec<(Result<RawToken, ()>, Range<usize>)>,
	/// Current index into `raw_tokens`.
	cursor: usize,
	/// Collected arguments.
	arguments: Vec<String>,
}

impl<'a> ArgumentWalker<'a> {
	fn new(source: &'a str) -> Self {
		let raw_tokens: Vec<_> = RawToken::lexer(source).spanned().collect();

		Self {
			source,
			raw_tokens,
			cursor: 0,
			arguments: vec![],
		}
	}

	fn kind(&self, index: usize) -> Option<RawToken> {
		self.raw_tokens
			.get(index)
			.map(|(result, _)| result.unwrap_or(RawToken::Text))
	}

	fn span(&self, index: usize) -> Range<usize> {
		self.raw_tokens[index].1.clone()
	}

	/// Find the closing quote for the quote at the cursor. A quoted literal
	/// never spans a line break.
	fn find_closing_quote(&self, quote: RawToken) -> Option<usize> {
		for index in (self.cursor + 1)..self.raw_tokens.len() {
			match self.kind(index) {
				Some(kind) if kind == quote => return Some(index),
				Some(RawToken::Whitespace) => {
					let slice = &self.source[self.span(index)];
					if slice.contains(['\n', '\r']) {
						return None;
					}
				}
				_ => {}
			}
		}

		None
	}

	/// Push the text between the quote at the cursor and its partner, with the
	/// quotes stripped. Returns false when the quote is never closed.
	fn process_quoted(&mut self, quote: RawToken) -> bool {
		let Some(closing) = self.find_closing_quote(quote) else {
			return false;
		};

		let start = self.span(self.cursor).end;
		let end = self.span(closing).start;
		self.arguments.push(self.source[start..end].to_string());
		self.cursor = closing + 1;

		true
	}

	/// Push a maximal run of non-whitespace tokens as one argument.
	fn process_bare(&mut self) {
		let start = self.span(self.cursor).start;
		let mut end = start;

		while let Some(kind) = self.kind(self.cursor) {
			if kind == RawToken::Whitespace {
				break;
			}
			end = self.span(self.cursor).end;
			self.cursor += 1;
		}

		self.arguments.push(self.source[start..end].to_string());
	}

	fn process(mut self) -> Vec<String> {
		while let Some(kind) = self.kind(self.cursor) {
			match kind {
				RawToken::Whitespace => {
					self.cursor += 1;
				}
				RawToken::DoubleQuote | RawToken::SingleQuote => {
					if !self.process_quoted(kind) {
						self.process_bare();
					}
				}
				RawToken::Text => {
					self.process_bare();
				}
			}
		}

		self.arguments
	}
}

/// Split the raw argument span of an open tag into arguments.
///
/// Arguments are separated by whitespace. A single or double quoted literal
/// becomes one argument with its quotes removed, so it may contain
/// whitespace. No escape sequences are recognised.
pub fn tokenize_arguments(source: &str) -> Vec<String> {
	ArgumentWalker::new(source).process()
}
