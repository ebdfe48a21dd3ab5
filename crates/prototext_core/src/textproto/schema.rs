use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::textproto::{DescriptorPool, MessageBuilder, PoolBuilder, Result, ScalarType, TextprotoError, TypeRef};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDocument {
	#[serde(default)]
	messages: Vec<MessageSchema>,
	#[serde(default)]
	enums: Vec<EnumSchema>,
	#[serde(default)]
	extensions: Vec<ExtensionSchema>,
	#[serde(default = "default_true")]
	well_known: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MessageSchema {
	name: String,
	#[serde(default)]
	fields: Vec<FieldSchema>,
	#[serde(default)]
	reserved_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldSchema {
	name: String,
	number: u32,
	#[serde(rename = "type")]
	ty: String,
	#[serde(default)]
	type_name: Option<String>,
	#[serde(default)]
	label: Label,
	#[serde(default)]
	oneof: Option<String>,
	#[serde(default)]
	key_type: Option<String>,
	#[serde(default)]
	value_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnumSchema {
	name: String,
	values: Vec<EnumValueSchema>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnumValueSchema {
	name: String,
	number: i32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExtensionSchema {
	name: String,
	extendee: String,
	number: u32,
	#[serde(rename = "type")]
	ty: String,
	#[serde(default)]
	type_name: Option<String>,
	#[serde(default)]
	label: Label,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Label {
	#[default]
	Optional,
	Required,
	Repeated,
}

fn default_true() -> bool {
	true
}

/// Build a descriptor pool from a JSON schema document.
///
/// Type names are fully qualified; a leading `.` is accepted. `google.protobuf.Any`
/// is registered unless `"well_known": false` is given.
pub fn parse_schema(json: &str) -> Result<DescriptorPool> {
	let document: SchemaDocument = serde_json::from_str(json)?;
	document.into_builder()?.build()
}

/// Read and build a JSON schema document from disk.
pub fn load_schema_file(path: impl AsRef<Path>) -> Result<DescriptorPool> {
	let json = fs::read_to_string(path)?;
	parse_schema(&json)
}

impl SchemaDocument {
	fn into_builder(self) -> Result<PoolBuilder> {
		let mut builder = PoolBuilder::new();
		if self.well_known {
			builder = builder.with_well_known();
		}

		for item in self.enums {
			builder = builder.enumeration(
				strip_dot(&item.name),
				item.values.into_iter().map(|value| (value.name, value.number)),
			);
		}

		for message in self.messages {
			let name = strip_dot(&message.name).to_owned();
			let mut out = MessageBuilder::new(name.clone());
			for field in message.fields {
				out = add_field(out, &name, field)?;
			}
			for reserved in message.reserved_names {
				out = out.reserved_name(reserved);
			}
			builder = builder.message(out);
		}

		for item in self.extensions {
			let ty = type_ref(&item.ty, item.type_name.as_deref(), &item.name)?;
			builder = match item.label {
				Label::Optional => builder.extension(strip_dot(&item.name), strip_dot(&item.extendee), item.number, ty),
				Label::Repeated => builder.repeated_extension(strip_dot(&item.name), strip_dot(&item.extendee), item.number, ty),
				Label::Required => return Err(TextprotoError::schema(format!("extension {} cannot be required", item.name))),
			};
		}

		Ok(builder)
	}
}

fn add_field(message: MessageBuilder, owner: &str, field: FieldSchema) -> Result<MessageBuilder> {
	let full_name = format!("{owner}.{}", field.name);

	if field.ty == "map" {
		let key = field
			.key_type
			.as_deref()
			.and_then(ScalarType::from_name)
			.ok_or_else(|| TextprotoError::schema(format!("map field {full_name} needs a scalar key_type")))?;
		let value_type = field
			.value_type
			.as_deref()
			.ok_or_else(|| TextprotoError::schema(format!("map field {full_name} needs a value_type")))?;
		let value = type_ref(value_type, field.type_name.as_deref(), &full_name)?;
		return Ok(message.map(field.name, field.number, key, value));
	}

	let ty = type_ref(&field.ty, field.type_name.as_deref(), &full_name)?;
	Ok(match (field.oneof, field.label) {
		(Some(oneof), Label::Optional) => message.oneof(oneof, field.name, field.number, ty),
		(Some(_), _) => return Err(TextprotoError::schema(format!("oneof member {full_name} must be optional"))),
		(None, Label::Optional) => message.field(field.name, field.number, ty),
		(None, Label::Required) => message.required(field.name, field.number, ty),
		(None, Label::Repeated) => message.repeated(field.name, field.number, ty),
	})
}

fn type_ref(ty: &str, type_name: Option<&str>, owner: &str) -> Result<TypeRef> {
	let named = || {
		type_name
			.map(|name| strip_dot(name).to_owned())
			.ok_or_else(|| TextprotoError::schema(format!("{owner} of type {ty} needs a type_name")))
	};
	match ty {
		"enum" => Ok(TypeRef::Enum(named()?)),
		"message" => Ok(TypeRef::Message(named()?)),
		"group" => Ok(TypeRef::Group(named()?)),
		other => ScalarType::from_name(other)
			.map(TypeRef::Scalar)
			.ok_or_else(|| TextprotoError::schema(format!("{owner} has unknown type {other}"))),
	}
}

fn strip_dot(name: &str) -> &str {
	name.strip_prefix('.').unwrap_or(name)
}

#[cfg(test)]
mod tests {
	use super::{load_schema_file, parse_schema};
	use crate::textproto::{Kind, TextprotoError};

	const SCHEMA: &str = r#"{
		"enums": [{ "name": ".pkg.Kind", "values": [{ "name": "A", "number": 0 }, { "name": "B", "number": 1 }] }],
		"messages": [
			{
				"name": "pkg.Item",
				"fields": [
					{ "name": "id", "number": 1, "type": "int64", "label": "required" },
					{ "name": "kind", "number": 2, "type": "enum", "type_name": "pkg.Kind" },
					{ "name": "tags", "number": 3, "type": "string", "label": "repeated" },
					{ "name": "props", "number": 4, "type": "map", "key_type": "string", "value_type": "message", "type_name": "pkg.Item" },
					{ "name": "x", "number": 5, "type": "bool", "oneof": "pick" },
					{ "name": "Data", "number": 6, "type": "group", "type_name": "pkg.Item.Data" }
				],
				"reserved_names": ["gone"]
			},
			{ "name": "pkg.Item.Data", "fields": [{ "name": "v", "number": 1, "type": "sint32" }] }
		],
		"extensions": [{ "name": "pkg.extra", "extendee": "pkg.Item", "number": 100, "type": "string", "label": "repeated" }]
	}"#;

	#[test]
	fn json_schema_builds_linked_pool() {
		let pool = parse_schema(SCHEMA).expect("schema loads");
		let item = pool.message_by_name("pkg.Item").expect("item exists");
		assert!(item.field_by_name("id").is_some_and(|field| field.is_required()));
		assert!(matches!(item.field_by_name("kind").map(|field| field.kind()), Some(Kind::Enum(_))));
		assert!(item.field_by_name("tags").is_some_and(|field| field.is_list()));
		assert!(item.field_by_name("props").is_some_and(|field| field.is_map()));
		assert_eq!(item.oneof_names(), ["pkg.Item.pick".to_owned()]);
		assert!(item.is_reserved_name("gone"));
		assert!(matches!(item.field_by_name("Data").map(|field| field.kind()), Some(Kind::Group(_))));
		assert!(pool.extension_by_name("pkg.extra").is_some_and(|field| field.is_list()));
		assert!(pool.message_by_name("google.protobuf.Any").is_some());
	}

	#[test]
	fn schema_errors_are_reported() {
		let err = parse_schema(r#"{ "messages": [{ "name": "a.B", "fields": [{ "name": "c", "number": 1, "type": "float128" }] }] }"#)
			.expect_err("unknown scalar type");
		assert_eq!(err.to_string(), "schema: a.B.c has unknown type float128");

		let err = parse_schema(r#"{ "messages": [{ "name": "a.B", "fields": [{ "name": "c", "number": 1, "type": "message" }] }] }"#)
			.expect_err("missing type_name");
		assert!(matches!(err, TextprotoError::Schema { .. }));

		let err = parse_schema("{ not json").expect_err("invalid json");
		assert!(matches!(err, TextprotoError::Json(_)));
	}

	#[test]
	fn fixture_schema_synthesizes_map_entries() {
		let pool = load_schema_file(prototext_testkit::fixture_path("warehouse.schema.json")).expect("fixture schema loads");
		let entry = pool.message_by_name("acme.Warehouse.StockEntry").expect("map entry synthesized");
		assert!(entry.is_map_entry());
		assert!(pool.message_by_name("acme.Warehouse").is_some_and(|item| item.is_reserved_name("legacy_id")));
	}
}
