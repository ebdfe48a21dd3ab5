use tracing::{debug, trace};

use crate::textproto::{FieldDescriptor, Key, Kind, MessageDescriptor, Result, TextprotoError, TypeResolver};

const MESSAGE_SET_SUFFIX: &str = ".message_set_extension";

/// Resolve a message-body key to the field it names.
///
/// Returns `Ok(None)` for reserved bare names, which callers skip.
pub(crate) fn resolve_field(key: &Key, message: &MessageDescriptor, resolver: &dyn TypeResolver) -> Result<Option<FieldDescriptor>> {
	let found = match key {
		Key::Name(name) => message
			.field_by_name(name)
			.or_else(|| message.field_by_name(&name.to_lowercase())),
		Key::Str(_) if message.is_any() => None,
		Key::Str(name) => find_extension(name, resolver)?.filter(|field| field.containing_message() == *message),
	};

	match (found, key) {
		(Some(field), _) => Ok(Some(field)),
		(None, Key::Name(name)) if message.is_reserved_name(name) => {
			trace!(message_type = message.full_name(), name = name.as_str(), "skipping reserved field name");
			Ok(None)
		}
		(None, _) => Err(TextprotoError::UnknownField {
			message: message.full_name().to_owned(),
			key: key.to_string(),
		}),
	}
}

/// Look up an extension by exact name, falling back to the MessageSet naming convention.
fn find_extension(name: &str, resolver: &dyn TypeResolver) -> Result<Option<FieldDescriptor>> {
	let exact = resolver
		.find_extension_by_name(name)
		.map_err(|err| TextprotoError::UnresolvedExtension {
			name: name.to_owned(),
			reason: err.to_string(),
		})?;
	if exact.is_some() {
		debug!(extension = name, "resolved extension");
		return Ok(exact);
	}

	let fallback = format!("{name}{MESSAGE_SET_SUFFIX}");
	let found = resolver
		.find_extension_by_name(&fallback)
		.ok()
		.flatten()
		.filter(is_message_set_extension);
	if found.is_some() {
		debug!(extension = fallback.as_str(), "resolved MessageSet extension");
	}
	Ok(found)
}

/// An extension named `<Msg>.message_set_extension` whose value type is `<Msg>` itself.
fn is_message_set_extension(field: &FieldDescriptor) -> bool {
	let Some(scope) = field.full_name().strip_suffix(MESSAGE_SET_SUFFIX) else {
		return false;
	};
	matches!(field.kind(), Kind::Message(message) if message.full_name() == scope)
}
