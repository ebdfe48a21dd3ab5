use crate::textproto::{Diagnostic, FieldDescriptor, Kind, Result, ScalarValue, TextprotoError, Value};

/// Coerce one leaf to the scalar kind declared by `field`.
///
/// Invalid UTF-8 in a `string` field is not fatal: the bytes are kept and a
/// diagnostic is returned alongside them.
pub(crate) fn coerce_scalar(value: &Value, field: &FieldDescriptor) -> Result<(ScalarValue, Option<Diagnostic>)> {
	let coerced = match field.kind() {
		Kind::Bool => value.as_bool().map(ScalarValue::Bool),
		Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => value.as_i32().map(ScalarValue::I32),
		Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => value.as_i64().map(ScalarValue::I64),
		Kind::Uint32 | Kind::Fixed32 => value.as_u32().map(ScalarValue::U32),
		Kind::Uint64 | Kind::Fixed64 => value.as_u64().map(ScalarValue::U64),
		Kind::Float => value.as_f32().map(ScalarValue::F32),
		Kind::Double => value.as_f64().map(ScalarValue::F64),
		Kind::String => {
			if let Some(bytes) = value.as_bytes() {
				let diagnostic = std::str::from_utf8(bytes).is_err().then(|| Diagnostic::InvalidUtf8 {
					field: field.full_name().to_owned(),
				});
				return Ok((ScalarValue::String(bytes.to_vec()), diagnostic));
			}
			None
		}
		Kind::Bytes => value.as_bytes().map(|bytes| ScalarValue::Bytes(bytes.to_vec())),
		Kind::Enum(descriptor) => match value {
			Value::Name(name) => descriptor.value_by_name(name).map(ScalarValue::Enum),
			_ => value.as_i32().map(ScalarValue::Enum),
		},
		Kind::Message(_) | Kind::Group(_) => None,
	};

	coerced.map(|scalar| (scalar, None)).ok_or_else(|| TextprotoError::InvalidScalar {
		field: field.full_name().to_owned(),
		value: value.to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::coerce_scalar;
	use crate::textproto::{
		DescriptorPool, Diagnostic, FieldDescriptor, MessageBuilder, ScalarType, ScalarValue, TextprotoError, TypeRef, Value,
	};

	fn field(name: &str) -> FieldDescriptor {
		let pool = DescriptorPool::builder()
			.enumeration("pkg.Level", [("LOW", 0), ("HIGH", 5)])
			.message(
				MessageBuilder::new("pkg.Scalars")
					.field("flag", 1, ScalarType::Bool)
					.field("small", 2, ScalarType::Sint32)
					.field("unsigned", 3, ScalarType::Fixed32)
					.field("wide", 4, ScalarType::Int64)
					.field("single", 5, ScalarType::Float)
					.field("text", 6, ScalarType::String)
					.field("blob", 7, ScalarType::Bytes)
					.field("level", 8, TypeRef::enumeration("pkg.Level"))
					.field("nested", 9, TypeRef::message("pkg.Scalars")),
			)
			.build()
			.expect("pool builds");
		pool.message_by_name("pkg.Scalars")
			.and_then(|message| message.field_by_name(name))
			.expect("field exists")
	}

	fn coerce(value: Value, name: &str) -> Result<ScalarValue, TextprotoError> {
		coerce_scalar(&value, &field(name)).map(|(scalar, _)| scalar)
	}

	#[test]
	fn integers_are_range_checked_per_width() {
		assert_eq!(coerce(Value::Int(-3), "small").expect("fits"), ScalarValue::I32(-3));
		assert!(coerce(Value::Uint(1 << 31), "small").is_err());
		assert_eq!(coerce(Value::Uint(u64::from(u32::MAX)), "unsigned").expect("fits"), ScalarValue::U32(u32::MAX));
		assert!(coerce(Value::Int(-1), "unsigned").is_err());
		assert_eq!(coerce(Value::Uint(1 << 40), "wide").expect("fits"), ScalarValue::I64(1 << 40));
	}

	#[test]
	fn floats_accept_integers_and_special_names() {
		assert_eq!(coerce(Value::Uint(2), "single").expect("integer to float"), ScalarValue::F32(2.0));
		assert_eq!(coerce(Value::name("Infinity"), "single").expect("inf"), ScalarValue::F32(f32::INFINITY));
		assert!(coerce(Value::Float(1e40), "single").is_err());
	}

	#[test]
	fn bool_rejects_integers() {
		assert_eq!(coerce(Value::name("true"), "flag").expect("bool"), ScalarValue::Bool(true));
		let err = coerce(Value::Uint(1), "flag").expect_err("integers are not bools");
		assert_eq!(err.to_string(), "pkg.Scalars.flag contains invalid scalar value: 1");
	}

	#[test]
	fn invalid_utf8_is_soft_for_strings_only() {
		let (value, diagnostic) = coerce_scalar(&Value::Str(vec![0xff]), &field("text")).expect("soft failure");
		assert_eq!(value, ScalarValue::String(vec![0xff]));
		assert_eq!(
			diagnostic,
			Some(Diagnostic::InvalidUtf8 {
				field: "pkg.Scalars.text".to_owned()
			})
		);

		let (value, diagnostic) = coerce_scalar(&Value::Str(vec![0xff]), &field("blob")).expect("bytes accept anything");
		assert_eq!(value, ScalarValue::Bytes(vec![0xff]));
		assert_eq!(diagnostic, None);
		assert!(coerce(Value::name("abc"), "text").is_err());
	}

	#[test]
	fn enums_accept_names_and_unchecked_numbers() {
		assert_eq!(coerce(Value::name("HIGH"), "level").expect("by name"), ScalarValue::Enum(5));
		assert_eq!(coerce(Value::Uint(42), "level").expect("by number"), ScalarValue::Enum(42));
		assert_eq!(coerce(Value::Int(-1), "level").expect("negative number"), ScalarValue::Enum(-1));
		assert!(coerce(Value::name("MEDIUM"), "level").is_err());
	}

	#[test]
	fn message_kinds_are_not_scalars() {
		assert!(matches!(
			coerce(Value::Message(Vec::new()), "nested"),
			Err(TextprotoError::InvalidScalar { .. })
		));
	}
}
