use crate::textproto::TextprotoError;

/// Simple bounded cursor over textproto source text.
pub(crate) struct Scanner<'a> {
	src: &'a str,
	pos: usize,
}

impl<'a> Scanner<'a> {
	/// Create a scanner at position 0.
	pub fn new(src: &'a str) -> Self {
		Self { src, pos: 0 }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return the byte at the current position without consuming it.
	pub fn peek(&self) -> Option<u8> {
		self.peek_at(0)
	}

	/// Return the byte `offset` positions ahead without consuming anything.
	pub fn peek_at(&self, offset: usize) -> Option<u8> {
		self.src.as_bytes().get(self.pos + offset).copied()
	}

	/// Consume and return one byte.
	pub fn bump(&mut self) -> Option<u8> {
		let byte = self.peek()?;
		self.pos += 1;
		Some(byte)
	}

	/// Consume `expected` if it is next.
	pub fn eat(&mut self, expected: u8) -> bool {
		if self.peek() == Some(expected) {
			self.pos += 1;
			return true;
		}
		false
	}

	/// Consume a run of ASCII bytes matching `pred`.
	pub fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
		self.take_while_max(usize::MAX, pred)
	}

	/// Consume at most `max` ASCII bytes matching `pred`.
	pub fn take_while_max(&mut self, max: usize, pred: impl Fn(u8) -> bool) -> &'a str {
		let start = self.pos;
		while self.pos - start < max && self.peek().is_some_and(|byte| byte.is_ascii() && pred(byte)) {
			self.pos += 1;
		}
		&self.src[start..self.pos]
	}

	/// Return source text from `start` up to the current position.
	pub fn slice_from(&self, start: usize) -> &'a str {
		&self.src[start..self.pos]
	}

	/// Skip whitespace and `#` line comments.
	pub fn skip_trivia(&mut self) {
		while let Some(byte) = self.peek() {
			match byte {
				b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => self.pos += 1,
				b'#' => {
					while let Some(byte) = self.bump() {
						if byte == b'\n' {
							break;
						}
					}
				}
				_ => break,
			}
		}
	}

	/// Build a syntax error located at the current position.
	pub fn error(&self, message: impl Into<String>) -> TextprotoError {
		let (line, column) = self.location();
		TextprotoError::Syntax {
			line,
			column,
			message: message.into(),
		}
	}

	/// Return one-based `(line, column)` of the current position.
	pub fn location(&self) -> (usize, usize) {
		let before = &self.src.as_bytes()[..self.pos.min(self.src.len())];
		let line = before.iter().filter(|byte| **byte == b'\n').count() + 1;
		let column = match before.iter().rposition(|byte| *byte == b'\n') {
			Some(newline) => before.len() - newline,
			None => before.len() + 1,
		};
		(line, column)
	}
}

#[cfg(test)]
mod tests {
	use super::Scanner;

	#[test]
	fn trivia_skips_comments_and_whitespace() {
		let mut scanner = Scanner::new("  # comment\n\tname");
		scanner.skip_trivia();
		assert_eq!(scanner.take_while(|byte| byte.is_ascii_alphabetic()), "name");
		assert_eq!(scanner.peek(), None);
	}

	#[test]
	fn location_is_one_based() {
		let mut scanner = Scanner::new("a\nbc");
		assert_eq!(scanner.location(), (1, 1));
		scanner.bump();
		scanner.bump();
		scanner.bump();
		assert_eq!(scanner.location(), (2, 2));
	}
}
