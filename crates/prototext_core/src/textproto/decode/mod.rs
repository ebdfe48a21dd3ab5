use tracing::trace;

use crate::textproto::field::resolve_field;
use crate::textproto::reify::DecodeScope;
use crate::textproto::{Diagnostics, Key, ReflectMessage, Result, TextprotoError, TypeResolver, Value, parse_with_depth};

/// Default nesting ceiling for message bodies.
pub const DEFAULT_MAX_DEPTH: u32 = 100;

/// Decoder options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
	/// Accept messages whose required fields are unset, and encode Any payloads partially.
	pub allow_partial: bool,
	/// Maximum message nesting depth before decoding fails.
	pub max_depth: u32,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			allow_partial: false,
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}
}

impl DecodeOptions {
	/// Options that skip required-field checks.
	pub fn partial() -> Self {
		Self {
			allow_partial: true,
			..Self::default()
		}
	}
}

/// State threaded through one top-level decode.
pub(crate) struct Decoder<'a> {
	pub(crate) options: &'a DecodeOptions,
	pub(crate) resolver: &'a dyn TypeResolver,
	pub(crate) diagnostics: Diagnostics,
}

impl Decoder<'_> {
	/// Decode one message body into `target`, recursing through nested messages.
	pub(crate) fn decode_message<M: ReflectMessage>(&mut self, body: &[(Key, Value)], target: &mut M, depth: u32) -> Result<()> {
		if depth >= self.options.max_depth {
			return Err(TextprotoError::DecodeDepthExceeded {
				max_depth: self.options.max_depth,
			});
		}

		let descriptor = target.descriptor().clone();
		trace!(message_type = descriptor.full_name(), depth, pairs = body.len(), "decoding message");

		if descriptor.is_any()
			&& let [(Key::Str(url), Value::Message(nested))] = body
		{
			return self.decode_any(url, nested, target, depth);
		}

		let mut scope = DecodeScope::default();
		for (key, value) in body {
			let Some(field) = resolve_field(key, &descriptor, self.resolver)? else {
				continue;
			};
			self.reify_field(&field, value, &mut scope, target, depth)?;
		}
		Ok(())
	}
}

/// Decode a message body into `target`, resolving extensions and Any URLs against its own pool.
pub fn decode<M: ReflectMessage>(body: &[(Key, Value)], target: &mut M, options: &DecodeOptions) -> Result<Diagnostics> {
	let pool = target.descriptor().pool().clone();
	decode_with_resolver(body, target, options, &pool)
}

/// Decode a message body into `target` using an explicit type resolver.
///
/// `target` is cleared first. On success the soft diagnostics are returned;
/// any fatal error discards them.
pub fn decode_with_resolver<M: ReflectMessage>(
	body: &[(Key, Value)],
	target: &mut M,
	options: &DecodeOptions,
	resolver: &dyn TypeResolver,
) -> Result<Diagnostics> {
	target.clear();
	let mut decoder = Decoder {
		options,
		resolver,
		diagnostics: Diagnostics::new(),
	};
	decoder.decode_message(body, target, 0)?;

	if !options.allow_partial {
		let missing = target.missing_required();
		if !missing.is_empty() {
			return Err(TextprotoError::RequiredFieldsMissing {
				message: target.descriptor().full_name().to_owned(),
				fields: missing,
			});
		}
	}
	Ok(decoder.diagnostics)
}

/// Tokenize `text` and decode it into `target`; tokenizing honors `options.max_depth`.
pub fn decode_str<M: ReflectMessage>(text: &str, target: &mut M, options: &DecodeOptions) -> Result<Diagnostics> {
	let body = parse_with_depth(text, options.max_depth)?;
	decode(&body, target, options)
}

#[cfg(test)]
mod tests;
