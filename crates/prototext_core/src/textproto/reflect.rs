use std::collections::BTreeMap;

use crate::textproto::{FieldDescriptor, Kind, MessageDescriptor, Result};

/// Typed scalar stored in a reflective message.
///
/// `String` holds raw bytes because text fields may legally carry invalid
/// UTF-8 after a decode that reported a soft diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
	/// `bool`.
	Bool(bool),
	/// `int32`, `sint32`, `sfixed32`.
	I32(i32),
	/// `int64`, `sint64`, `sfixed64`.
	I64(i64),
	/// `uint32`, `fixed32`.
	U32(u32),
	/// `uint64`, `fixed64`.
	U64(u64),
	/// `float`.
	F32(f32),
	/// `double`.
	F64(f64),
	/// `string`, possibly not valid UTF-8.
	String(Vec<u8>),
	/// `bytes`.
	Bytes(Vec<u8>),
	/// Enum number, not checked against declared values.
	Enum(i32),
}

impl ScalarValue {
	/// Return the zero value of a scalar kind; enums use their first declared value.
	pub fn zero_for(kind: &Kind) -> Option<Self> {
		Some(match kind {
			Kind::Bool => Self::Bool(false),
			Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => Self::I32(0),
			Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => Self::I64(0),
			Kind::Uint32 | Kind::Fixed32 => Self::U32(0),
			Kind::Uint64 | Kind::Fixed64 => Self::U64(0),
			Kind::Float => Self::F32(0.0),
			Kind::Double => Self::F64(0.0),
			Kind::String => Self::String(Vec::new()),
			Kind::Bytes => Self::Bytes(Vec::new()),
			Kind::Enum(descriptor) => Self::Enum(descriptor.default_number()),
			Kind::Message(_) | Kind::Group(_) => return None,
		})
	}

	/// Return string contents when they are valid UTF-8.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(bytes) => std::str::from_utf8(bytes).ok(),
			_ => None,
		}
	}
}

/// Map key; ordered so map iteration and encoding are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
	/// `bool` key.
	Bool(bool),
	/// 32-bit signed key.
	I32(i32),
	/// 64-bit signed key.
	I64(i64),
	/// 32-bit unsigned key.
	U32(u32),
	/// 64-bit unsigned key.
	U64(u64),
	/// `string` key as raw bytes.
	String(Vec<u8>),
}

impl MapKey {
	/// Convert a coerced scalar into a key; floats, bytes, and enums are not valid keys.
	pub fn from_scalar(value: ScalarValue) -> Option<Self> {
		Some(match value {
			ScalarValue::Bool(value) => Self::Bool(value),
			ScalarValue::I32(value) => Self::I32(value),
			ScalarValue::I64(value) => Self::I64(value),
			ScalarValue::U32(value) => Self::U32(value),
			ScalarValue::U64(value) => Self::U64(value),
			ScalarValue::String(value) => Self::String(value),
			_ => return None,
		})
	}

	/// Convert back into the scalar stored in an entry's `key` field.
	pub fn into_scalar(self) -> ScalarValue {
		match self {
			Self::Bool(value) => ScalarValue::Bool(value),
			Self::I32(value) => ScalarValue::I32(value),
			Self::I64(value) => ScalarValue::I64(value),
			Self::U32(value) => ScalarValue::U32(value),
			Self::U64(value) => ScalarValue::U64(value),
			Self::String(value) => ScalarValue::String(value),
		}
	}
}

/// Value held by a singular field, list element, or map entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ReflectValue<M> {
	/// Scalar or enum value.
	Scalar(ScalarValue),
	/// Nested message or group.
	Message(M),
}

impl<M> ReflectValue<M> {
	/// Return the scalar payload.
	pub fn as_scalar(&self) -> Option<&ScalarValue> {
		match self {
			Self::Scalar(value) => Some(value),
			Self::Message(_) => None,
		}
	}

	/// Return the message payload.
	pub fn as_message(&self) -> Option<&M> {
		match self {
			Self::Message(message) => Some(message),
			Self::Scalar(_) => None,
		}
	}
}

/// Binary encoder switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
	/// Skip the required-field completeness check.
	pub allow_partial: bool,
	/// Emit fields and map entries in a stable order.
	pub deterministic: bool,
}

/// Mutable, descriptor-driven message the decoder writes into.
pub trait ReflectMessage: Sized {
	/// Return this message's type.
	fn descriptor(&self) -> &MessageDescriptor;

	/// Construct an empty message of type `descriptor`.
	fn new_instance(descriptor: MessageDescriptor) -> Self;

	/// Reset every field.
	fn clear(&mut self);

	/// Return the list container for `field`, creating it when absent.
	fn get_or_create_list(&mut self, field: &FieldDescriptor) -> &mut Vec<ReflectValue<Self>>;

	/// Return the map container for `field`, creating it when absent.
	fn get_or_create_map(&mut self, field: &FieldDescriptor) -> &mut BTreeMap<MapKey, ReflectValue<Self>>;

	/// Assign a singular field. Setting a oneof member clears its siblings.
	fn set(&mut self, field: &FieldDescriptor, value: ReflectValue<Self>);

	/// Return paths (such as `child.id` or `items[0].sku`) of required fields that are unset, nested messages included.
	fn missing_required(&self) -> Vec<String>;

	/// Serialize to the binary wire format.
	fn encode(&self, options: EncodeOptions) -> Result<Vec<u8>>;

	/// Assign a scalar to a singular field.
	fn set_scalar(&mut self, field: &FieldDescriptor, value: ScalarValue) {
		self.set(field, ReflectValue::Scalar(value));
	}

	/// Assign a nested message to a singular field.
	fn set_message(&mut self, field: &FieldDescriptor, message: Self) {
		self.set(field, ReflectValue::Message(message));
	}

	/// Construct an empty submessage for a message or group field.
	fn new_submessage(&self, field: &FieldDescriptor) -> Option<Self> {
		field.message_type().map(Self::new_instance)
	}
}

#[cfg(test)]
mod tests {
	use super::{MapKey, ScalarValue};
	use crate::textproto::Kind;

	#[test]
	fn map_keys_order_and_round_trip() {
		let mut keys = [MapKey::I32(3), MapKey::I32(-1), MapKey::I32(0)];
		keys.sort();
		assert_eq!(keys, [MapKey::I32(-1), MapKey::I32(0), MapKey::I32(3)]);

		let key = MapKey::from_scalar(ScalarValue::String(b"k".to_vec())).expect("string keys allowed");
		assert_eq!(key.into_scalar(), ScalarValue::String(b"k".to_vec()));
		assert_eq!(MapKey::from_scalar(ScalarValue::F64(1.0)), None);
	}

	#[test]
	fn zero_values_follow_kind() {
		assert_eq!(ScalarValue::zero_for(&Kind::Sint64), Some(ScalarValue::I64(0)));
		assert_eq!(ScalarValue::zero_for(&Kind::Fixed32), Some(ScalarValue::U32(0)));
		assert_eq!(ScalarValue::zero_for(&Kind::String), Some(ScalarValue::String(Vec::new())));
	}
}
