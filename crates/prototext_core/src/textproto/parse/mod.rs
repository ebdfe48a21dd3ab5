use crate::textproto::scanner::Scanner;
use crate::textproto::{DEFAULT_MAX_DEPTH, Key, Result, TextprotoError, Value};

/// Parse textproto source into the key/value pairs of its top-level message body.
///
/// Nesting is limited to [`DEFAULT_MAX_DEPTH`] message bodies.
pub fn parse(input: &str) -> Result<Vec<(Key, Value)>> {
	parse_with_depth(input, DEFAULT_MAX_DEPTH)
}

/// Parse textproto source, failing with `DecodeDepthExceeded` once a nested body would sit at depth `max_depth`.
///
/// The top-level body is depth 0, matching the decoder's count.
pub fn parse_with_depth(input: &str, max_depth: u32) -> Result<Vec<(Key, Value)>> {
	let mut parser = Parser {
		scanner: Scanner::new(input),
		depth: 0,
		max_depth,
	};
	parser.message_body(None)
}

struct Parser<'a> {
	scanner: Scanner<'a>,
	depth: u32,
	max_depth: u32,
}

impl Parser<'_> {
	fn message_body(&mut self, close: Option<u8>) -> Result<Vec<(Key, Value)>> {
		let mut pairs = Vec::new();
		loop {
			self.scanner.skip_trivia();
			match self.scanner.peek() {
				None => {
					return match close {
						Some(close) => Err(self.scanner.error(format!("unexpected end of input, expected '{}'", char::from(close)))),
						None => Ok(pairs),
					};
				}
				Some(byte) if Some(byte) == close => {
					self.scanner.bump();
					return Ok(pairs);
				}
				Some(_) => {}
			}

			let key = self.key()?;
			self.scanner.skip_trivia();
			let value = if self.scanner.eat(b':') {
				self.scanner.skip_trivia();
				self.field_value()?
			} else if matches!(self.scanner.peek(), Some(b'{' | b'<')) {
				self.field_value()?
			} else {
				return Err(self.scanner.error(format!("expected ':' after {key}")));
			};
			pairs.push((key, value));

			self.scanner.skip_trivia();
			if !self.scanner.eat(b',') {
				self.scanner.eat(b';');
			}
		}
	}

	fn key(&mut self) -> Result<Key> {
		if self.scanner.eat(b'[') {
			self.scanner.skip_trivia();
			let name = self.scanner.take_while(|byte| is_ident_byte(byte) || matches!(byte, b'.' | b'/' | b'-'));
			if name.is_empty() {
				return Err(self.scanner.error("expected extension name or type URL"));
			}
			self.scanner.skip_trivia();
			if !self.scanner.eat(b']') {
				return Err(self.scanner.error("expected ']' after extension name"));
			}
			return Ok(Key::Str(name.to_owned()));
		}

		match self.scanner.peek() {
			Some(byte) if is_ident_start(byte) => Ok(Key::Name(self.scanner.take_while(is_ident_byte).to_owned())),
			_ => Err(self.scanner.error("expected field name")),
		}
	}

	fn field_value(&mut self) -> Result<Value> {
		if self.scanner.eat(b'[') {
			return self.list();
		}
		self.list_item()
	}

	fn list(&mut self) -> Result<Value> {
		let mut items = Vec::new();
		self.scanner.skip_trivia();
		if self.scanner.eat(b']') {
			return Ok(Value::List(items));
		}

		loop {
			self.scanner.skip_trivia();
			items.push(self.list_item()?);
			self.scanner.skip_trivia();
			if self.scanner.eat(b']') {
				return Ok(Value::List(items));
			}
			if !self.scanner.eat(b',') {
				return Err(self.scanner.error("expected ',' or ']' in list"));
			}
		}
	}

	fn list_item(&mut self) -> Result<Value> {
		if self.scanner.eat(b'{') {
			return self.nested_body(b'}');
		}
		if self.scanner.eat(b'<') {
			return self.nested_body(b'>');
		}
		self.scalar()
	}

	fn nested_body(&mut self, close: u8) -> Result<Value> {
		if self.depth + 1 >= self.max_depth {
			return Err(TextprotoError::DecodeDepthExceeded { max_depth: self.max_depth });
		}
		self.depth += 1;
		let body = self.message_body(Some(close));
		self.depth -= 1;
		Ok(Value::Message(body?))
	}

	fn scalar(&mut self) -> Result<Value> {
		match self.scanner.peek() {
			Some(b'"' | b'\'') => self.strings(),
			Some(b'-') => {
				self.scanner.bump();
				match self.scanner.peek() {
					Some(byte) if byte.is_ascii_digit() || byte == b'.' => self.number(true),
					Some(byte) if is_ident_start(byte) => {
						let ident = self.scanner.take_while(is_ident_byte);
						match ident.to_ascii_lowercase().as_str() {
							"inf" | "infinity" => Ok(Value::Float(f64::NEG_INFINITY)),
							"nan" => Ok(Value::Float(f64::NAN)),
							_ => Err(self.scanner.error(format!("invalid negative value -{ident}"))),
						}
					}
					_ => Err(self.scanner.error("expected number after '-'")),
				}
			}
			Some(byte) if byte.is_ascii_digit() || byte == b'.' => self.number(false),
			Some(byte) if is_ident_start(byte) => Ok(Value::Name(self.scanner.take_while(is_ident_byte).to_owned())),
			Some(byte) => Err(self.scanner.error(format!("unexpected character {:?}", char::from(byte)))),
			None => Err(self.scanner.error("unexpected end of input, expected value")),
		}
	}

	fn number(&mut self, negative: bool) -> Result<Value> {
		if self.scanner.peek() == Some(b'0') && matches!(self.scanner.peek_at(1), Some(b'x' | b'X')) {
			self.scanner.bump();
			self.scanner.bump();
			let digits = self.scanner.take_while(|byte| byte.is_ascii_hexdigit());
			self.reject_ident_tail()?;
			let magnitude = u64::from_str_radix(digits, 16).map_err(|_| self.scanner.error(format!("invalid hex integer 0x{digits}")))?;
			return self.integer(negative, magnitude);
		}

		let start = self.scanner.pos();
		let int_digits = self.scanner.take_while(|byte| byte.is_ascii_digit());
		let mut is_float = false;
		if self.scanner.eat(b'.') {
			self.scanner.take_while(|byte| byte.is_ascii_digit());
			is_float = true;
		}
		if matches!(self.scanner.peek(), Some(b'e' | b'E')) {
			self.scanner.bump();
			if matches!(self.scanner.peek(), Some(b'+' | b'-')) {
				self.scanner.bump();
			}
			if self.scanner.take_while(|byte| byte.is_ascii_digit()).is_empty() {
				return Err(self.scanner.error("missing exponent digits"));
			}
			is_float = true;
		}
		let text = self.scanner.slice_from(start);
		if matches!(self.scanner.peek(), Some(b'f' | b'F')) {
			self.scanner.bump();
			is_float = true;
		}
		self.reject_ident_tail()?;

		if is_float {
			let value: f64 = text.parse().map_err(|_| self.scanner.error(format!("invalid float {text}")))?;
			return Ok(Value::Float(if negative { -value } else { value }));
		}

		let magnitude = if int_digits.len() > 1 && int_digits.starts_with('0') {
			u64::from_str_radix(&int_digits[1..], 8)
		} else {
			int_digits.parse::<u64>()
		}
		.map_err(|_| self.scanner.error(format!("invalid integer {int_digits}")))?;
		self.integer(negative, magnitude)
	}

	fn integer(&self, negative: bool, magnitude: u64) -> Result<Value> {
		if !negative {
			return Ok(Value::Uint(magnitude));
		}
		if magnitude == 1 << 63 {
			return Ok(Value::Int(i64::MIN));
		}
		i64::try_from(magnitude)
			.map(|value| Value::Int(-value))
			.map_err(|_| self.scanner.error(format!("integer -{magnitude} out of range")))
	}

	fn reject_ident_tail(&self) -> Result<()> {
		match self.scanner.peek() {
			Some(byte) if is_ident_byte(byte) || byte == b'.' => Err(self.scanner.error("invalid number literal")),
			_ => Ok(()),
		}
	}

	fn strings(&mut self) -> Result<Value> {
		let mut out = Vec::new();
		while let Some(quote @ (b'"' | b'\'')) = self.scanner.peek() {
			self.scanner.bump();
			self.string_literal(quote, &mut out)?;
			self.scanner.skip_trivia();
		}
		Ok(Value::Str(out))
	}

	fn string_literal(&mut self, quote: u8, out: &mut Vec<u8>) -> Result<()> {
		loop {
			match self.scanner.bump() {
				None | Some(b'\n') => return Err(self.scanner.error("unterminated string literal")),
				Some(byte) if byte == quote => return Ok(()),
				Some(b'\\') => self.escape(out)?,
				Some(byte) => out.push(byte),
			}
		}
	}

	fn escape(&mut self, out: &mut Vec<u8>) -> Result<()> {
		let Some(byte) = self.scanner.bump() else {
			return Err(self.scanner.error("unterminated escape sequence"));
		};

		match byte {
			b'n' => out.push(b'\n'),
			b't' => out.push(b'\t'),
			b'r' => out.push(b'\r'),
			b'a' => out.push(0x07),
			b'b' => out.push(0x08),
			b'f' => out.push(0x0c),
			b'v' => out.push(0x0b),
			b'\\' | b'\'' | b'"' | b'?' => out.push(byte),
			b'0'..=b'7' => {
				let mut value = u32::from(byte - b'0');
				for _ in 0..2 {
					match self.scanner.peek() {
						Some(digit @ b'0'..=b'7') => {
							self.scanner.bump();
							value = value * 8 + u32::from(digit - b'0');
						}
						_ => break,
					}
				}
				let byte = u8::try_from(value).map_err(|_| self.scanner.error(format!("octal escape \\{value:o} out of range")))?;
				out.push(byte);
			}
			b'x' | b'X' => {
				let digits = self.scanner.take_while_max(2, |byte| byte.is_ascii_hexdigit());
				let byte = u8::from_str_radix(digits, 16).map_err(|_| self.scanner.error("\\x escape needs hex digits"))?;
				out.push(byte);
			}
			b'u' => self.unicode_escape(4, out)?,
			b'U' => self.unicode_escape(8, out)?,
			other => return Err(self.scanner.error(format!("invalid escape \\{}", char::from(other)))),
		}
		Ok(())
	}

	fn unicode_escape(&mut self, len: usize, out: &mut Vec<u8>) -> Result<()> {
		let digits = self.scanner.take_while_max(len, |byte| byte.is_ascii_hexdigit());
		if digits.len() != len {
			return Err(self.scanner.error(format!("unicode escape needs {len} hex digits")));
		}
		let code = u32::from_str_radix(digits, 16).map_err(|_| self.scanner.error("invalid unicode escape"))?;
		let ch = char::from_u32(code).ok_or_else(|| self.scanner.error(format!("invalid unicode code point {code:#x}")))?;
		let mut buf = [0_u8; 4];
		out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
		Ok(())
	}
}

fn is_ident_start(byte: u8) -> bool {
	byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_ident_byte(byte: u8) -> bool {
	byte.is_ascii_alphanumeric() || byte == b'_'
}
