use std::fs;
use std::path::Path;

use crate::textproto::compression::decode_bytes;
use crate::textproto::{Compression, Key, Result, TextprotoError, Value, parse, parse_with_depth};

/// Textproto source read from disk, decompressed and validated as UTF-8.
#[derive(Debug, Clone)]
pub struct TextprotoFile {
	/// Compression mode detected for source bytes.
	pub compression: Compression,
	text: String,
}

impl TextprotoFile {
	/// Read and decode a textproto file from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let raw = fs::read(path)?;
		Self::from_bytes(raw)
	}

	/// Decode in-memory bytes, plain or zstd-compressed.
	pub fn from_bytes(raw: Vec<u8>) -> Result<Self> {
		let (compression, bytes) = decode_bytes(raw)?;
		let text = String::from_utf8(bytes).map_err(|err| TextprotoError::InputNotUtf8 {
			offset: err.utf8_error().valid_up_to(),
		})?;
		Ok(Self { compression, text })
	}

	/// Return decoded source text.
	pub fn text(&self) -> &str {
		&self.text
	}

	/// Tokenize the source into its top-level message body.
	pub fn parse(&self) -> Result<Vec<(Key, Value)>> {
		parse(&self.text)
	}

	/// Tokenize the source with an explicit nesting limit.
	pub fn parse_with_depth(&self, max_depth: u32) -> Result<Vec<(Key, Value)>> {
		parse_with_depth(&self.text, max_depth)
	}
}
