use prototext::textproto::{DynamicMessage, EnumDescriptor, FieldDescriptor, FieldSlot, Kind, MapKey, ReflectMessage, ReflectValue, ScalarValue};
use serde_json::{Map, Number, Value as JsonValue};

/// Output truncation and formatting limits for decoded messages.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of fields printed for a single message.
	pub max_fields_per_message: usize,
	/// Maximum number of Unicode scalar values printed for strings.
	pub max_string_len: usize,
	/// Maximum number of elements printed for lists and maps.
	pub max_list_items: usize,
	/// Maximum recursive print depth for nested messages.
	pub max_print_depth: u32,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_fields_per_message: 80,
			max_string_len: 200,
			max_list_items: 16,
			max_print_depth: 6,
		}
	}
}

/// Print a message as an indented tree.
pub fn print_message(message: &DynamicMessage, indent: usize, depth: u32, options: PrintOptions) {
	print_message_with("", message, indent, depth, options);
}

fn print_message_with(prefix: &str, message: &DynamicMessage, indent: usize, depth: u32, options: PrintOptions) {
	let pad = " ".repeat(indent);
	let type_name = message.descriptor().full_name();
	if depth >= options.max_print_depth {
		println!("{pad}{prefix}{type_name} {{ ... }}");
		return;
	}

	println!("{pad}{prefix}{type_name} {{");
	let fields: Vec<_> = message.fields().collect();
	for (field, slot) in fields.iter().take(options.max_fields_per_message) {
		print_field(field, slot, indent + 2, depth + 1, options);
	}
	if fields.len() > options.max_fields_per_message {
		println!("{pad}  ... {} more fields", fields.len() - options.max_fields_per_message);
	}
	println!("{pad}}}");
}

fn print_field(field: &FieldDescriptor, slot: &FieldSlot, indent: usize, depth: u32, options: PrintOptions) {
	let pad = " ".repeat(indent);
	let label = field_label(field);
	match slot {
		FieldSlot::Singular(value) => {
			let enum_type = enum_type(&field.kind());
			print_value(&format!("{label}: "), value, enum_type.as_ref(), indent, depth, options);
		}
		FieldSlot::List(items) => {
			if depth >= options.max_print_depth {
				println!("{pad}{label}: [... {} items]", items.len());
				return;
			}
			let enum_type = enum_type(&field.kind());
			println!("{pad}{label}: [");
			for item in items.iter().take(options.max_list_items) {
				print_value("", item, enum_type.as_ref(), indent + 2, depth + 1, options);
			}
			if items.len() > options.max_list_items {
				println!("{pad}  ... {} more", items.len() - options.max_list_items);
			}
			println!("{pad}]");
		}
		FieldSlot::Map(entries) => {
			if depth >= options.max_print_depth {
				println!("{pad}{label}: {{... {} entries}}", entries.len());
				return;
			}
			let enum_type = field.map_value().and_then(|value| enum_type(&value.kind()));
			println!("{pad}{label}: {{");
			for (key, value) in entries.iter().take(options.max_list_items) {
				let prefix = format!("{}: ", render_map_key(key, options.max_string_len));
				print_value(&prefix, value, enum_type.as_ref(), indent + 2, depth + 1, options);
			}
			if entries.len() > options.max_list_items {
				println!("{pad}  ... {} more", entries.len() - options.max_list_items);
			}
			println!("{pad}}}");
		}
	}
}

fn print_value(
	prefix: &str,
	value: &ReflectValue<DynamicMessage>,
	enum_type: Option<&EnumDescriptor>,
	indent: usize,
	depth: u32,
	options: PrintOptions,
) {
	match value {
		ReflectValue::Scalar(scalar) => {
			let pad = " ".repeat(indent);
			println!("{pad}{prefix}{}", render_scalar(scalar, enum_type, options.max_string_len));
		}
		ReflectValue::Message(message) => print_message_with(prefix, message, indent, depth, options),
	}
}

/// Render a scalar as a single display token.
pub(crate) fn render_scalar(value: &ScalarValue, enum_type: Option<&EnumDescriptor>, max_string_len: usize) -> String {
	match value {
		ScalarValue::Bool(v) => v.to_string(),
		ScalarValue::I32(v) => v.to_string(),
		ScalarValue::I64(v) => v.to_string(),
		ScalarValue::U32(v) => v.to_string(),
		ScalarValue::U64(v) => v.to_string(),
		ScalarValue::F32(v) => v.to_string(),
		ScalarValue::F64(v) => v.to_string(),
		ScalarValue::String(bytes) => format!("{:?}", truncate(&String::from_utf8_lossy(bytes), max_string_len)),
		ScalarValue::Bytes(bytes) => format!("bytes[{}]", bytes.len()),
		ScalarValue::Enum(number) => match enum_type.and_then(|item| item.name_by_number(*number)) {
			Some(name) => name.to_owned(),
			None => number.to_string(),
		},
	}
}

fn render_map_key(key: &MapKey, max_string_len: usize) -> String {
	match key {
		MapKey::String(bytes) => format!("{:?}", truncate(&String::from_utf8_lossy(bytes), max_string_len)),
		other => map_key_label(other),
	}
}

/// Convert a message into a JSON object keyed by field name; extensions use `[full.name]`.
///
/// Enum values render by name when declared, bytes as lowercase hex, and
/// non-finite floats as strings.
pub fn message_json(message: &DynamicMessage) -> JsonValue {
	let mut out = Map::new();
	for (field, slot) in message.fields() {
		let value = match slot {
			FieldSlot::Singular(value) => value_json(value, enum_type(&field.kind()).as_ref()),
			FieldSlot::List(items) => {
				let enum_type = enum_type(&field.kind());
				JsonValue::Array(items.iter().map(|item| value_json(item, enum_type.as_ref())).collect())
			}
			FieldSlot::Map(entries) => {
				let enum_type = field.map_value().and_then(|value| enum_type(&value.kind()));
				JsonValue::Object(
					entries
						.iter()
						.map(|(key, value)| (map_key_label(key), value_json(value, enum_type.as_ref())))
						.collect(),
				)
			}
		};
		out.insert(field_label(field), value);
	}
	JsonValue::Object(out)
}

fn value_json(value: &ReflectValue<DynamicMessage>, enum_type: Option<&EnumDescriptor>) -> JsonValue {
	match value {
		ReflectValue::Message(message) => message_json(message),
		ReflectValue::Scalar(scalar) => scalar_json(scalar, enum_type),
	}
}

fn scalar_json(value: &ScalarValue, enum_type: Option<&EnumDescriptor>) -> JsonValue {
	match value {
		ScalarValue::Bool(v) => JsonValue::Bool(*v),
		ScalarValue::I32(v) => JsonValue::from(*v),
		ScalarValue::I64(v) => JsonValue::from(*v),
		ScalarValue::U32(v) => JsonValue::from(*v),
		ScalarValue::U64(v) => JsonValue::from(*v),
		ScalarValue::F32(v) => float_json(f64::from(*v)),
		ScalarValue::F64(v) => float_json(*v),
		ScalarValue::String(bytes) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
		ScalarValue::Bytes(bytes) => JsonValue::String(crate::cmd::util::hex(bytes)),
		ScalarValue::Enum(number) => match enum_type.and_then(|item| item.name_by_number(*number)) {
			Some(name) => JsonValue::String(name.to_owned()),
			None => JsonValue::from(*number),
		},
	}
}

fn float_json(value: f64) -> JsonValue {
	Number::from_f64(value).map_or_else(|| JsonValue::String(value.to_string()), JsonValue::Number)
}

fn map_key_label(key: &MapKey) -> String {
	match key {
		MapKey::Bool(v) => v.to_string(),
		MapKey::I32(v) => v.to_string(),
		MapKey::I64(v) => v.to_string(),
		MapKey::U32(v) => v.to_string(),
		MapKey::U64(v) => v.to_string(),
		MapKey::String(bytes) => String::from_utf8_lossy(bytes).into_owned(),
	}
}

fn field_label(field: &FieldDescriptor) -> String {
	if field.is_extension() {
		format!("[{}]", field.full_name())
	} else {
		field.name().to_owned()
	}
}

fn enum_type(kind: &Kind) -> Option<EnumDescriptor> {
	match kind {
		Kind::Enum(descriptor) => Some(descriptor.clone()),
		_ => None,
	}
}

fn truncate(input: &str, max_len: usize) -> String {
	if input.chars().count() <= max_len {
		return input.to_owned();
	}
	let out: String = input.chars().take(max_len).collect();
	format!("{out}...")
}

#[cfg(test)]
mod tests;
