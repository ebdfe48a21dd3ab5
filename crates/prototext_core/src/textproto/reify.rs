use std::collections::HashSet;

use crate::textproto::decode::Decoder;
use crate::textproto::scalar::coerce_scalar;
use crate::textproto::{FieldDescriptor, Key, MapKey, ReflectMessage, ReflectValue, Result, ScalarValue, TextprotoError, Value};

/// Per-body bookkeeping for duplicate singular fields and oneof exclusivity.
#[derive(Debug, Default)]
pub(crate) struct DecodeScope {
	seen_numbers: HashSet<u32>,
	seen_oneofs: HashSet<usize>,
}

/// Treat a non-list value as a one-element list.
fn promote(value: &Value) -> &[Value] {
	match value {
		Value::List(items) => items,
		other => std::slice::from_ref(other),
	}
}

impl Decoder<'_> {
	/// Apply one resolved `field: value` pair to `target`.
	pub(crate) fn reify_field<M: ReflectMessage>(
		&mut self,
		field: &FieldDescriptor,
		value: &Value,
		scope: &mut DecodeScope,
		target: &mut M,
		depth: u32,
	) -> Result<()> {
		if field.is_map() {
			self.reify_map(field, promote(value), target, depth)
		} else if field.is_list() {
			self.reify_list(field, promote(value), target, depth)
		} else {
			self.reify_singular(field, value, scope, target, depth)
		}
	}

	fn reify_list<M: ReflectMessage>(&mut self, field: &FieldDescriptor, items: &[Value], target: &mut M, depth: u32) -> Result<()> {
		target.get_or_create_list(field);
		let is_message = field.kind().is_message();

		for item in items {
			let value = if is_message {
				ReflectValue::Message(self.decode_submessage(field, item, target, depth)?)
			} else {
				ReflectValue::Scalar(self.coerce(item, field)?)
			};
			target.get_or_create_list(field).push(value);
		}
		Ok(())
	}

	fn reify_map<M: ReflectMessage>(&mut self, field: &FieldDescriptor, items: &[Value], target: &mut M, depth: u32) -> Result<()> {
		let (Some(key_field), Some(value_field)) = (field.map_key(), field.map_value()) else {
			return Err(TextprotoError::schema(format!("map field {} has no key/value entry fields", field.full_name())));
		};
		target.get_or_create_map(field);
		let key_kind = key_field.kind();
		let value_kind = value_field.kind();
		let message_values = value_kind.is_message();

		for item in items {
			let Value::Message(entry) = item else {
				return Err(TextprotoError::InvalidMapEntry {
					field: field.full_name().to_owned(),
					value: item.to_string(),
				});
			};
			let (key_value, value_value) = parse_map_entry(field, entry)?;

			let key_scalar = match key_value {
				Some(input) => {
					let (scalar, diagnostic) = coerce_scalar(input, &key_field).map_err(|_| TextprotoError::InvalidMapKey {
						field: key_field.full_name().to_owned(),
						value: input.to_string(),
					})?;
					self.diagnostics.extend(diagnostic);
					Some(scalar)
				}
				None => ScalarValue::zero_for(&key_kind),
			};
			let key = key_scalar.and_then(MapKey::from_scalar).ok_or_else(|| TextprotoError::InvalidMapKey {
				field: key_field.full_name().to_owned(),
				value: key_value.map_or_else(String::new, Value::to_string),
			})?;

			let value = if message_values {
				let empty = Value::Message(Vec::new());
				let input = value_value.unwrap_or(&empty);
				ReflectValue::Message(self.decode_submessage(&value_field, input, target, depth)?)
			} else {
				let scalar = match value_value {
					Some(input) => self.coerce(input, &value_field)?,
					None => ScalarValue::zero_for(&value_kind).ok_or_else(|| TextprotoError::InvalidScalar {
						field: value_field.full_name().to_owned(),
						value: String::new(),
					})?,
				};
				ReflectValue::Scalar(scalar)
			};

			target.get_or_create_map(field).insert(key, value);
		}
		Ok(())
	}

	fn reify_singular<M: ReflectMessage>(
		&mut self,
		field: &FieldDescriptor,
		value: &Value,
		scope: &mut DecodeScope,
		target: &mut M,
		depth: u32,
	) -> Result<()> {
		let oneof = field.oneof_index();
		if oneof.is_some_and(|index| scope.seen_oneofs.contains(&index)) {
			return Err(TextprotoError::OneofAlreadySet {
				oneof: field.oneof_name().unwrap_or(field.full_name()).to_owned(),
			});
		}
		if scope.seen_numbers.contains(&field.number()) {
			return Err(TextprotoError::RepeatedField {
				field: field.full_name().to_owned(),
			});
		}

		if field.kind().is_message() {
			let message = self.decode_submessage(field, value, target, depth)?;
			target.set_message(field, message);
		} else {
			let scalar = self.coerce(value, field)?;
			target.set_scalar(field, scalar);
		}

		if let Some(index) = oneof {
			scope.seen_oneofs.insert(index);
		}
		scope.seen_numbers.insert(field.number());
		Ok(())
	}

	/// Decode a `Message` value into a fresh submessage for `field`.
	fn decode_submessage<M: ReflectMessage>(&mut self, field: &FieldDescriptor, value: &Value, parent: &M, depth: u32) -> Result<M> {
		let invalid = || TextprotoError::InvalidMessageValue {
			field: field.full_name().to_owned(),
			value: value.to_string(),
		};
		let Value::Message(body) = value else {
			return Err(invalid());
		};
		let mut message = parent.new_submessage(field).ok_or_else(invalid)?;
		self.decode_message(body, &mut message, depth + 1)?;
		Ok(message)
	}

	/// Coerce a leaf, recording any soft diagnostic.
	fn coerce(&mut self, value: &Value, field: &FieldDescriptor) -> Result<ScalarValue> {
		let (scalar, diagnostic) = coerce_scalar(value, field)?;
		self.diagnostics.extend(diagnostic);
		Ok(scalar)
	}
}

/// Split an entry body into its `key` and `value` items.
fn parse_map_entry<'v>(field: &FieldDescriptor, entry: &'v [(Key, Value)]) -> Result<(Option<&'v Value>, Option<&'v Value>)> {
	let mut key = None;
	let mut value = None;

	for (name, item) in entry {
		let (slot, label) = match name.as_name() {
			Some("key") => (&mut key, "key"),
			Some("value") => (&mut value, "value"),
			_ => {
				return Err(TextprotoError::UnknownMapEntryName {
					field: field.full_name().to_owned(),
					name: name.to_string(),
				});
			}
		};
		if slot.replace(item).is_some() {
			return Err(TextprotoError::DuplicateMapEntryField {
				field: field.full_name().to_owned(),
				name: label,
			});
		}
	}
	Ok((key, value))
}
