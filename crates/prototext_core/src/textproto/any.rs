use tracing::debug;

use crate::textproto::decode::Decoder;
use crate::textproto::{
	ANY_TYPE_URL_NUMBER, ANY_VALUE_NUMBER, EncodeOptions, Key, ReflectMessage, Result, ScalarValue, TextprotoError, Value,
};

impl Decoder<'_> {
	/// Decode an expanded `google.protobuf.Any` body `[type_url] { ... }` into `target`.
	///
	/// The payload is decoded as the type the URL names, re-encoded
	/// deterministically, and stored with the URL in the wrapper's fields.
	pub(crate) fn decode_any<M: ReflectMessage>(&mut self, url: &str, body: &[(Key, Value)], target: &mut M, depth: u32) -> Result<()> {
		let unresolved = |reason: String| TextprotoError::UnresolvedMessage {
			url: url.to_owned(),
			reason,
		};
		let descriptor = self
			.resolver
			.find_message_by_url(url)
			.map_err(|err| unresolved(err.to_string()))?
			.ok_or_else(|| unresolved("not found".to_owned()))?;
		debug!(type_url = url, payload_type = descriptor.full_name(), "expanding Any");

		let mut payload = M::new_instance(descriptor);
		self.decode_message(body, &mut payload, depth + 1)?;
		let bytes = payload.encode(EncodeOptions {
			allow_partial: self.options.allow_partial,
			deterministic: true,
		})?;

		let wrapper = target.descriptor().clone();
		let field = |number| {
			wrapper.field_by_number(number).ok_or_else(|| TextprotoError::MalformedAny {
				message: wrapper.full_name().to_owned(),
				number,
			})
		};
		let type_url = field(ANY_TYPE_URL_NUMBER)?;
		let value = field(ANY_VALUE_NUMBER)?;
		target.set_scalar(&type_url, ScalarValue::String(url.as_bytes().to_vec()));
		target.set_scalar(&value, ScalarValue::Bytes(bytes));
		Ok(())
	}
}
