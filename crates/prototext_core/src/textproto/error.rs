use std::fmt;

use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, TextprotoError>;

/// Fatal errors produced while reading, tokenizing, decoding, and encoding messages.
///
/// Any of these aborts the current top-level decode. Decode variants name the
/// fully-qualified field or message and render the offending input value.
#[derive(Debug, Error)]
pub enum TextprotoError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Schema document was not valid JSON.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Source text was not valid UTF-8.
	#[error("input is not valid UTF-8 at byte {offset}")]
	InputNotUtf8 {
		/// Offset of the first invalid byte.
		offset: usize,
	},
	/// Tokenizer rejected the input text.
	#[error("syntax error at {line}:{column}: {message}")]
	Syntax {
		/// One-based line number.
		line: usize,
		/// One-based byte column.
		column: usize,
		/// Human-readable reason.
		message: String,
	},
	/// Schema could not be linked into a descriptor pool.
	#[error("schema: {message}")]
	Schema {
		/// Human-readable reason.
		message: String,
	},
	/// Requested message type is not part of the pool.
	#[error("message type not found: {name}")]
	MessageNotFound {
		/// Requested full name.
		name: String,
	},
	/// Key did not resolve to a field, extension, or reserved name.
	#[error("{message} contains unknown field: {key}")]
	UnknownField {
		/// Enclosing message full name.
		message: String,
		/// Rendered key.
		key: String,
	},
	/// Resolver failed while looking up an extension.
	#[error("unable to resolve [{name}]: {reason}")]
	UnresolvedExtension {
		/// Extension full name as written.
		name: String,
		/// Resolver failure.
		reason: String,
	},
	/// Resolver could not produce the message type named by an Any type URL.
	#[error("unable to resolve message [{url}]: {reason}")]
	UnresolvedMessage {
		/// Type URL as written.
		url: String,
		/// Resolver failure or "not found".
		reason: String,
	},
	/// Leaf value does not fit the field kind.
	#[error("{field} contains invalid scalar value: {value}")]
	InvalidScalar {
		/// Field full name.
		field: String,
		/// Rendered input value.
		value: String,
	},
	/// Message or group field was given a non-message value.
	#[error("{field} contains invalid message/group value: {value}")]
	InvalidMessageValue {
		/// Field full name.
		field: String,
		/// Rendered input value.
		value: String,
	},
	/// Map field was given something other than an entry message.
	#[error("{field} contains invalid map entry: {value}")]
	InvalidMapEntry {
		/// Map field full name.
		field: String,
		/// Rendered input value.
		value: String,
	},
	/// Map entry key could not be coerced to the key kind.
	#[error("{field} contains invalid key: {value}")]
	InvalidMapKey {
		/// Key field full name.
		field: String,
		/// Rendered input value.
		value: String,
	},
	/// Map entry used a name other than `key` or `value`.
	#[error("{field} contains unknown map entry name: {name}")]
	UnknownMapEntryName {
		/// Map field full name.
		field: String,
		/// Rendered entry key.
		name: String,
	},
	/// Map entry repeated `key` or `value`.
	#[error("{field} contains duplicate {name} field")]
	DuplicateMapEntryField {
		/// Map field full name.
		field: String,
		/// `key` or `value`.
		name: &'static str,
	},
	/// Non-repeated field appeared twice in one message body.
	#[error("non-repeated field {field} is repeated")]
	RepeatedField {
		/// Field full name.
		field: String,
	},
	/// Second member of a oneof assigned in one message body.
	#[error("oneof {oneof} is already set")]
	OneofAlreadySet {
		/// Oneof full name.
		oneof: String,
	},
	/// Required fields absent after decode or before encode.
	#[error("required field(s) missing in {message}: {}", .fields.join(", "))]
	RequiredFieldsMissing {
		/// Message full name.
		message: String,
		/// Paths of the missing fields, relative to `message`.
		fields: Vec<String>,
	},
	/// Decoder recursion depth exceeded configured limit.
	#[error("decode depth exceeded (max={max_depth})")]
	DecodeDepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Stored value cannot be written in the binary wire format.
	#[error("cannot encode {field}: {reason}")]
	Encode {
		/// Field full name.
		field: String,
		/// Why the value was rejected.
		reason: &'static str,
	},
	/// Any wrapper descriptor lacks its well-known fields.
	#[error("{message} is missing well-known field {number}")]
	MalformedAny {
		/// Wrapper message full name.
		message: String,
		/// Missing field number.
		number: u32,
	},
}

impl TextprotoError {
	pub(crate) fn schema(message: impl Into<String>) -> Self {
		Self::Schema { message: message.into() }
	}
}

/// Non-fatal problem recorded during an otherwise successful decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
	/// String field received bytes that are not valid UTF-8; the value was still stored.
	InvalidUtf8 {
		/// Field full name.
		field: String,
	},
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::InvalidUtf8 { field } => write!(f, "field {field} contains invalid UTF-8"),
		}
	}
}

/// Soft diagnostics accumulated across one decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
	items: Vec<Diagnostic>,
}

impl Diagnostics {
	/// Create an empty collection.
	pub fn new() -> Self {
		Self::default()
	}

	/// Record one diagnostic.
	pub fn push(&mut self, diagnostic: Diagnostic) {
		self.items.push(diagnostic);
	}

	/// Append every diagnostic from `other`, keeping order.
	pub fn merge(&mut self, other: Diagnostics) {
		self.items.extend(other.items);
	}

	/// Return whether nothing was recorded.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Return the number of recorded diagnostics.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Iterate recorded diagnostics in order.
	pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
		self.items.iter()
	}

	/// Consume into the underlying list.
	pub fn into_vec(self) -> Vec<Diagnostic> {
		self.items
	}
}

impl Extend<Diagnostic> for Diagnostics {
	fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
		self.items.extend(iter);
	}
}

impl<'a> IntoIterator for &'a Diagnostics {
	type Item = &'a Diagnostic;
	type IntoIter = std::slice::Iter<'a, Diagnostic>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.iter()
	}
}

impl IntoIterator for Diagnostics {
	type Item = Diagnostic;
	type IntoIter = std::vec::IntoIter<Diagnostic>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.into_iter()
	}
}
