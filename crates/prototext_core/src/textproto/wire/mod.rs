use crate::textproto::{
	DynamicMessage, EncodeOptions, FieldDescriptor, FieldSlot, Kind, MapKey, ReflectMessage, ReflectValue, Result, ScalarValue,
	TextprotoError,
};

/// Wire type carried in the low three bits of every tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
	/// Base-128 varint.
	Varint = 0,
	/// Eight little-endian bytes.
	Fixed64 = 1,
	/// Length-prefixed bytes.
	Len = 2,
	/// Group opening tag.
	StartGroup = 3,
	/// Group closing tag.
	EndGroup = 4,
	/// Four little-endian bytes.
	Fixed32 = 5,
}

/// Encode `message` in the binary wire format.
///
/// Fields are written in number order and map entries in key order, so the
/// output is always deterministic. Repeated fields are written unpacked.
pub fn encode_message(message: &DynamicMessage, options: EncodeOptions) -> Result<Vec<u8>> {
	if !options.allow_partial {
		let missing = message.missing_required();
		if !missing.is_empty() {
			return Err(TextprotoError::RequiredFieldsMissing {
				message: message.descriptor().full_name().to_owned(),
				fields: missing,
			});
		}
	}

	let mut out = Vec::new();
	write_message(message, &mut out)?;
	Ok(out)
}

fn write_message(message: &DynamicMessage, out: &mut Vec<u8>) -> Result<()> {
	for (field, slot) in message.fields() {
		let kind = field.kind();
		match slot {
			FieldSlot::Singular(value) => write_value(field, field.number(), &kind, value, out)?,
			FieldSlot::List(items) => {
				for item in items {
					write_value(field, field.number(), &kind, item, out)?;
				}
			}
			FieldSlot::Map(entries) => {
				let (Some(key_field), Some(value_field)) = (field.map_key(), field.map_value()) else {
					return Err(encode_error(field, "map entry type lacks key or value field"));
				};
				let key_kind = key_field.kind();
				let value_kind = value_field.kind();
				for (key, value) in entries {
					let mut entry = Vec::new();
					write_map_key(&key_field, &key_kind, key, &mut entry)?;
					write_value(&value_field, 2, &value_kind, value, &mut entry)?;
					write_tag(field.number(), WireType::Len, out);
					write_len_prefixed(&entry, out);
				}
			}
		}
	}
	Ok(())
}

fn write_map_key(field: &FieldDescriptor, kind: &Kind, key: &MapKey, out: &mut Vec<u8>) -> Result<()> {
	write_scalar(field, 1, kind, &key.clone().into_scalar(), out)
}

fn write_value(field: &FieldDescriptor, number: u32, kind: &Kind, value: &ReflectValue<DynamicMessage>, out: &mut Vec<u8>) -> Result<()> {
	match (kind, value) {
		(Kind::Group(_), ReflectValue::Message(message)) => {
			write_tag(number, WireType::StartGroup, out);
			write_message(message, out)?;
			write_tag(number, WireType::EndGroup, out);
			Ok(())
		}
		(Kind::Message(_), ReflectValue::Message(message)) => {
			let mut nested = Vec::new();
			write_message(message, &mut nested)?;
			write_tag(number, WireType::Len, out);
			write_len_prefixed(&nested, out);
			Ok(())
		}
		(_, ReflectValue::Scalar(scalar)) => write_scalar(field, number, kind, scalar, out),
		(_, ReflectValue::Message(_)) => Err(encode_error(field, "message value stored in scalar field")),
	}
}

fn write_scalar(field: &FieldDescriptor, number: u32, kind: &Kind, value: &ScalarValue, out: &mut Vec<u8>) -> Result<()> {
	match (kind, value) {
		(Kind::Bool, ScalarValue::Bool(value)) => write_varint_field(number, u64::from(*value), out),
		(Kind::Int32, ScalarValue::I32(value)) | (Kind::Enum(_), ScalarValue::Enum(value)) => {
			write_varint_field(number, i64::from(*value) as u64, out);
		}
		(Kind::Sint32, ScalarValue::I32(value)) => write_varint_field(number, u64::from(zigzag32(*value)), out),
		(Kind::Sfixed32, ScalarValue::I32(value)) => write_fixed32_field(number, value.to_le_bytes(), out),
		(Kind::Int64, ScalarValue::I64(value)) => write_varint_field(number, *value as u64, out),
		(Kind::Sint64, ScalarValue::I64(value)) => write_varint_field(number, zigzag64(*value), out),
		(Kind::Sfixed64, ScalarValue::I64(value)) => write_fixed64_field(number, value.to_le_bytes(), out),
		(Kind::Uint32, ScalarValue::U32(value)) => write_varint_field(number, u64::from(*value), out),
		(Kind::Fixed32, ScalarValue::U32(value)) => write_fixed32_field(number, value.to_le_bytes(), out),
		(Kind::Uint64, ScalarValue::U64(value)) => write_varint_field(number, *value, out),
		(Kind::Fixed64, ScalarValue::U64(value)) => write_fixed64_field(number, value.to_le_bytes(), out),
		(Kind::Float, ScalarValue::F32(value)) => write_fixed32_field(number, value.to_le_bytes(), out),
		(Kind::Double, ScalarValue::F64(value)) => write_fixed64_field(number, value.to_le_bytes(), out),
		(Kind::String, ScalarValue::String(bytes)) | (Kind::Bytes, ScalarValue::Bytes(bytes)) => {
			write_tag(number, WireType::Len, out);
			write_len_prefixed(bytes, out);
		}
		_ => return Err(encode_error(field, "stored value does not match field kind")),
	}
	Ok(())
}

fn encode_error(field: &FieldDescriptor, reason: &'static str) -> TextprotoError {
	TextprotoError::Encode {
		field: field.full_name().to_owned(),
		reason,
	}
}

fn zigzag32(value: i32) -> u32 {
	((value << 1) ^ (value >> 31)) as u32
}

fn zigzag64(value: i64) -> u64 {
	((value << 1) ^ (value >> 63)) as u64
}

fn write_tag(number: u32, wire_type: WireType, out: &mut Vec<u8>) {
	write_varint((u64::from(number) << 3) | wire_type as u64, out);
}

fn write_varint_field(number: u32, value: u64, out: &mut Vec<u8>) {
	write_tag(number, WireType::Varint, out);
	write_varint(value, out);
}

fn write_fixed32_field(number: u32, bytes: [u8; 4], out: &mut Vec<u8>) {
	write_tag(number, WireType::Fixed32, out);
	out.extend_from_slice(&bytes);
}

fn write_fixed64_field(number: u32, bytes: [u8; 8], out: &mut Vec<u8>) {
	write_tag(number, WireType::Fixed64, out);
	out.extend_from_slice(&bytes);
}

fn write_len_prefixed(bytes: &[u8], out: &mut Vec<u8>) {
	write_varint(bytes.len() as u64, out);
	out.extend_from_slice(bytes);
}

fn write_varint(mut value: u64, out: &mut Vec<u8>) {
	while value >= 0x80 {
		out.push((value as u8) | 0x80);
		value >>= 7;
	}
	out.push(value as u8);
}
