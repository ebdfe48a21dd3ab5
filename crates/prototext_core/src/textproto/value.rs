use std::fmt;

/// Key of one `key: value` pair in a message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
	/// Bare identifier, e.g. `count`.
	Name(String),
	/// Bracketed name, e.g. `[pkg.ext]` or `[type.googleapis.com/pkg.Msg]`.
	Str(String),
}

impl Key {
	/// Build a bare-name key.
	pub fn name(name: impl Into<String>) -> Self {
		Self::Name(name.into())
	}

	/// Build a bracketed key.
	pub fn ext(name: impl Into<String>) -> Self {
		Self::Str(name.into())
	}

	/// Return the identifier for bare-name keys.
	pub fn as_name(&self) -> Option<&str> {
		match self {
			Self::Name(name) => Some(name),
			Self::Str(_) => None,
		}
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Name(name) => f.write_str(name),
			Self::Str(name) => write!(f, "[{name}]"),
		}
	}
}

/// Untyped value tree produced by the tokenizer.
///
/// Carries no schema information. Leaf accessors expose the width views the
/// decoder needs and return `None` on a type mismatch or range overflow.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Bare identifier such as `RED`, `true`, or `inf`.
	Name(String),
	/// String literal after escape processing; may hold invalid UTF-8.
	Str(Vec<u8>),
	/// Negative integer literal.
	Int(i64),
	/// Non-negative integer literal.
	Uint(u64),
	/// Floating-point literal.
	Float(f64),
	/// Boolean produced by a caller-built tree.
	Bool(bool),
	/// Ordered `key: value` pairs; keys may repeat.
	Message(Vec<(Key, Value)>),
	/// Bracketed list.
	List(Vec<Value>),
}

impl Value {
	/// Build a string literal from UTF-8 text.
	pub fn str(text: impl Into<String>) -> Self {
		Self::Str(text.into().into_bytes())
	}

	/// Build a bare name leaf.
	pub fn name(name: impl Into<String>) -> Self {
		Self::Name(name.into())
	}

	/// Read a boolean, accepting the textproto spellings of `true` and `false`.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(value) => Some(*value),
			Self::Name(name) => match name.as_str() {
				"true" | "True" | "t" => Some(true),
				"false" | "False" | "f" => Some(false),
				_ => None,
			},
			_ => None,
		}
	}

	/// Read a signed 64-bit integer.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Int(value) => Some(*value),
			Self::Uint(value) => i64::try_from(*value).ok(),
			_ => None,
		}
	}

	/// Read a signed 32-bit integer.
	pub fn as_i32(&self) -> Option<i32> {
		self.as_i64().and_then(|value| i32::try_from(value).ok())
	}

	/// Read an unsigned 64-bit integer.
	pub fn as_u64(&self) -> Option<u64> {
		match self {
			Self::Uint(value) => Some(*value),
			Self::Int(value) => u64::try_from(*value).ok(),
			_ => None,
		}
	}

	/// Read an unsigned 32-bit integer.
	pub fn as_u32(&self) -> Option<u32> {
		self.as_u64().and_then(|value| u32::try_from(value).ok())
	}

	/// Read a double from a float, an integer, or an `inf`/`nan` name.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Float(value) => Some(*value),
			Self::Int(value) => Some(*value as f64),
			Self::Uint(value) => Some(*value as f64),
			Self::Name(name) => match name.to_ascii_lowercase().as_str() {
				"inf" | "infinity" => Some(f64::INFINITY),
				"nan" => Some(f64::NAN),
				_ => None,
			},
			_ => None,
		}
	}

	/// Narrow to `f32`; finite values beyond the `f32` range are rejected.
	pub fn as_f32(&self) -> Option<f32> {
		let value = self.as_f64()?;
		if value.is_finite() && value.abs() > f64::from(f32::MAX) {
			return None;
		}
		Some(value as f32)
	}

	/// Return the identifier of a bare name.
	pub fn as_name(&self) -> Option<&str> {
		match self {
			Self::Name(name) => Some(name),
			_ => None,
		}
	}

	/// Return string literal bytes.
	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			Self::Str(bytes) => Some(bytes),
			_ => None,
		}
	}

	/// Return message body pairs.
	pub fn as_message(&self) -> Option<&[(Key, Value)]> {
		match self {
			Self::Message(pairs) => Some(pairs),
			_ => None,
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Name(name) => f.write_str(name),
			Self::Str(bytes) => write_quoted(f, bytes),
			Self::Int(value) => write!(f, "{value}"),
			Self::Uint(value) => write!(f, "{value}"),
			Self::Float(value) if value.is_nan() => f.write_str("nan"),
			Self::Float(value) if value.is_infinite() => f.write_str(if *value > 0.0 { "inf" } else { "-inf" }),
			Self::Float(value) => write!(f, "{value}"),
			Self::Bool(value) => write!(f, "{value}"),
			Self::Message(pairs) => {
				f.write_str("{")?;
				for (idx, (key, value)) in pairs.iter().enumerate() {
					if idx > 0 {
						f.write_str(" ")?;
					}
					write!(f, "{key}: {value}")?;
				}
				f.write_str("}")
			}
			Self::List(items) => {
				f.write_str("[")?;
				for (idx, item) in items.iter().enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{item}")?;
				}
				f.write_str("]")
			}
		}
	}
}

fn write_quoted(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
	f.write_str("\"")?;
	match std::str::from_utf8(bytes) {
		Ok(text) => {
			for ch in text.chars() {
				match ch {
					'"' => f.write_str("\\\"")?,
					'\\' => f.write_str("\\\\")?,
					'\n' => f.write_str("\\n")?,
					'\r' => f.write_str("\\r")?,
					'\t' => f.write_str("\\t")?,
					ch if ch.is_control() => write!(f, "\\x{:02x}", u32::from(ch))?,
					ch => write!(f, "{ch}")?,
				}
			}
		}
		Err(_) => {
			for byte in bytes {
				match byte {
					b'"' => f.write_str("\\\"")?,
					b'\\' => f.write_str("\\\\")?,
					0x20..=0x7e => write!(f, "{}", char::from(*byte))?,
					_ => write!(f, "\\x{byte:02x}")?,
				}
			}
		}
	}
	f.write_str("\"")
}
