use std::path::PathBuf;

use prototext::textproto::{FieldDescriptor, Kind, MessageDescriptor, Result, TextprotoError, load_schema_file};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub schema: PathBuf,
	#[arg(long)]
	pub message: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// Print a summary of a schema document, optionally listing one message's fields.
pub fn run(args: Args) -> Result<()> {
	let Args { schema, message, json } = args;

	let pool = load_schema_file(&schema)?;
	let selected = match message.as_deref() {
		Some(name) => Some(
			pool.message_by_name(name)
				.ok_or_else(|| TextprotoError::MessageNotFound { name: name.to_owned() })?,
		),
		None => None,
	};

	let mut messages: Vec<String> = pool.messages().map(|item| item.full_name().to_owned()).collect();
	let mut enums: Vec<String> = pool.enums().map(|item| item.full_name().to_owned()).collect();
	let mut extensions: Vec<FieldJson> = pool.extensions().map(|field| field_json(&field)).collect();
	messages.sort();
	enums.sort();
	extensions.sort_by(|left, right| left.name.cmp(&right.name));

	if json {
		let payload = SchemaJson {
			path: schema.display().to_string(),
			messages,
			enums,
			extensions,
			fields: selected.as_ref().map(|item| item.fields().map(|field| field_json(&field)).collect()),
		};
		return emit_json(&payload);
	}

	println!("path: {}", schema.display());
	println!("messages: {}", messages.len());
	for name in &messages {
		println!("  {name}");
	}
	println!("enums: {}", enums.len());
	for name in &enums {
		println!("  {name}");
	}
	println!("extensions: {}", extensions.len());
	for item in &extensions {
		println!("  {} = {} ({})", item.name, item.number, item.extendee.as_deref().unwrap_or("-"));
	}

	if let Some(selected) = selected {
		print_fields(&selected);
	}

	Ok(())
}

fn print_fields(message: &MessageDescriptor) {
	println!();
	println!("message: {}", message.full_name());
	println!("number\tname\tlabel\ttype\toneof");
	for field in message.fields() {
		let item = field_json(&field);
		println!(
			"{}\t{}\t{}\t{}\t{}",
			item.number,
			item.name,
			item.label,
			item.type_name,
			item.oneof.as_deref().unwrap_or("-")
		);
	}
	let reserved: Vec<&str> = message.reserved_names().collect();
	if !reserved.is_empty() {
		println!("reserved: {}", reserved.join(", "));
	}
}

fn field_json(field: &FieldDescriptor) -> FieldJson {
	let is_map = field.is_map();
	FieldJson {
		name: if field.is_extension() {
			field.full_name().to_owned()
		} else {
			field.name().to_owned()
		},
		number: field.number(),
		label: if is_map { "map" } else { field.cardinality().as_str() },
		type_name: if is_map { map_type_name(field) } else { type_name(&field.kind()) },
		oneof: field.oneof_name().map(str::to_owned),
		extendee: field.is_extension().then(|| field.containing_message().full_name().to_owned()),
	}
}

fn map_type_name(field: &FieldDescriptor) -> String {
	match (field.map_key(), field.map_value()) {
		(Some(key), Some(value)) => format!("map<{}, {}>", type_name(&key.kind()), type_name(&value.kind())),
		_ => "map".to_owned(),
	}
}

fn type_name(kind: &Kind) -> String {
	match kind {
		Kind::Enum(descriptor) => descriptor.full_name().to_owned(),
		Kind::Message(descriptor) => descriptor.full_name().to_owned(),
		Kind::Group(descriptor) => format!("group {}", descriptor.full_name()),
		other => other.label().to_owned(),
	}
}

#[derive(serde::Serialize)]
struct SchemaJson {
	path: String,
	messages: Vec<String>,
	enums: Vec<String>,
	extensions: Vec<FieldJson>,
	#[serde(skip_serializing_if = "Option::is_none")]
	fields: Option<Vec<FieldJson>>,
}

#[derive(serde::Serialize)]
struct FieldJson {
	name: String,
	number: u32,
	label: &'static str,
	#[serde(rename = "type")]
	type_name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	oneof: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	extendee: Option<String>,
}
