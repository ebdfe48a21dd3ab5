use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::{
	ANY_FULL_NAME, Cardinality, DescriptorPool, EnumDef, ExtensionDef, FieldDef, FieldType, MessageDef, PoolInner, ScalarType,
};
use crate::textproto::{Result, TextprotoError};

/// Unlinked reference to a field's type, by name for enums, messages, and groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
	/// Scalar keyword type.
	Scalar(ScalarType),
	/// Enum full name.
	Enum(String),
	/// Message full name.
	Message(String),
	/// Group message full name.
	Group(String),
}

impl TypeRef {
	/// Reference an enum type by full name.
	pub fn enumeration(full_name: impl Into<String>) -> Self {
		Self::Enum(full_name.into())
	}

	/// Reference a message type by full name.
	pub fn message(full_name: impl Into<String>) -> Self {
		Self::Message(full_name.into())
	}

	/// Reference a group's message type by full name.
	pub fn group(full_name: impl Into<String>) -> Self {
		Self::Group(full_name.into())
	}
}

impl From<ScalarType> for TypeRef {
	fn from(value: ScalarType) -> Self {
		Self::Scalar(value)
	}
}

#[derive(Debug, Clone)]
enum FieldShape {
	Plain(TypeRef),
	Map { key: ScalarType, value: TypeRef },
}

#[derive(Debug, Clone)]
struct FieldSpec {
	name: String,
	number: u32,
	shape: FieldShape,
	cardinality: Cardinality,
	oneof: Option<String>,
}

/// Declaration of one message type.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
	full_name: String,
	fields: Vec<FieldSpec>,
	oneofs: Vec<String>,
	reserved_names: Vec<String>,
	map_entry: bool,
}

impl MessageBuilder {
	/// Start a message declaration.
	pub fn new(full_name: impl Into<String>) -> Self {
		Self {
			full_name: full_name.into(),
			fields: Vec::new(),
			oneofs: Vec::new(),
			reserved_names: Vec::new(),
			map_entry: false,
		}
	}

	/// Add an optional field.
	pub fn field(self, name: impl Into<String>, number: u32, ty: impl Into<TypeRef>) -> Self {
		self.push(name.into(), number, FieldShape::Plain(ty.into()), Cardinality::Optional, None)
	}

	/// Add a required field.
	pub fn required(self, name: impl Into<String>, number: u32, ty: impl Into<TypeRef>) -> Self {
		self.push(name.into(), number, FieldShape::Plain(ty.into()), Cardinality::Required, None)
	}

	/// Add a repeated field.
	pub fn repeated(self, name: impl Into<String>, number: u32, ty: impl Into<TypeRef>) -> Self {
		self.push(name.into(), number, FieldShape::Plain(ty.into()), Cardinality::Repeated, None)
	}

	/// Add an optional field belonging to oneof `oneof`, declaring the oneof on first use.
	pub fn oneof(mut self, oneof: impl Into<String>, name: impl Into<String>, number: u32, ty: impl Into<TypeRef>) -> Self {
		let oneof = oneof.into();
		if !self.oneofs.contains(&oneof) {
			self.oneofs.push(oneof.clone());
		}
		self.push(name.into(), number, FieldShape::Plain(ty.into()), Cardinality::Optional, Some(oneof))
	}

	/// Add a map field; its entry type is synthesized when the pool is built.
	pub fn map(self, name: impl Into<String>, number: u32, key: ScalarType, value: impl Into<TypeRef>) -> Self {
		self.push(
			name.into(),
			number,
			FieldShape::Map { key, value: value.into() },
			Cardinality::Repeated,
			None,
		)
	}

	/// Declare a reserved field name.
	pub fn reserved_name(mut self, name: impl Into<String>) -> Self {
		self.reserved_names.push(name.into());
		self
	}

	/// Return the declared full name.
	pub fn full_name(&self) -> &str {
		&self.full_name
	}

	fn push(mut self, name: String, number: u32, shape: FieldShape, cardinality: Cardinality, oneof: Option<String>) -> Self {
		self.fields.push(FieldSpec {
			name,
			number,
			shape,
			cardinality,
			oneof,
		});
		self
	}
}

#[derive(Debug, Clone)]
struct EnumSpec {
	full_name: String,
	values: Vec<(String, i32)>,
}

#[derive(Debug, Clone)]
struct ExtensionSpec {
	full_name: String,
	extendee: String,
	number: u32,
	ty: TypeRef,
	cardinality: Cardinality,
}

/// Collects declarations and links them into a [`DescriptorPool`].
#[derive(Debug, Clone, Default)]
pub struct PoolBuilder {
	messages: Vec<MessageBuilder>,
	enums: Vec<EnumSpec>,
	extensions: Vec<ExtensionSpec>,
	well_known: bool,
}

impl PoolBuilder {
	/// Start an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Register well-known types (`google.protobuf.Any`) unless declared explicitly.
	pub fn with_well_known(mut self) -> Self {
		self.well_known = true;
		self
	}

	/// Add a message declaration.
	pub fn message(mut self, message: MessageBuilder) -> Self {
		self.messages.push(message);
		self
	}

	/// Add an enum declaration; the first value is the default.
	pub fn enumeration<N: Into<String>>(mut self, full_name: impl Into<String>, values: impl IntoIterator<Item = (N, i32)>) -> Self {
		self.enums.push(EnumSpec {
			full_name: full_name.into(),
			values: values.into_iter().map(|(name, number)| (name.into(), number)).collect(),
		});
		self
	}

	/// Add an optional extension of `extendee`.
	pub fn extension(self, full_name: impl Into<String>, extendee: impl Into<String>, number: u32, ty: impl Into<TypeRef>) -> Self {
		self.push_extension(full_name.into(), extendee.into(), number, ty.into(), Cardinality::Optional)
	}

	/// Add a repeated extension of `extendee`.
	pub fn repeated_extension(self, full_name: impl Into<String>, extendee: impl Into<String>, number: u32, ty: impl Into<TypeRef>) -> Self {
		self.push_extension(full_name.into(), extendee.into(), number, ty.into(), Cardinality::Repeated)
	}

	fn push_extension(mut self, full_name: String, extendee: String, number: u32, ty: TypeRef, cardinality: Cardinality) -> Self {
		self.extensions.push(ExtensionSpec {
			full_name,
			extendee,
			number,
			ty,
			cardinality,
		});
		self
	}

	/// Link all declarations, resolving type names.
	pub fn build(mut self) -> Result<DescriptorPool> {
		if self.well_known && !self.messages.iter().any(|message| message.full_name == ANY_FULL_NAME) {
			self.messages.push(any_message());
		}

		let messages = expand_map_entries(self.messages);

		let mut inner = PoolInner::default();
		for (idx, message) in messages.iter().enumerate() {
			if inner.message_index.insert(message.full_name.clone(), idx).is_some() {
				return Err(TextprotoError::schema(format!("duplicate message type {}", message.full_name)));
			}
		}
		for (idx, item) in self.enums.iter().enumerate() {
			if inner.enum_index.insert(item.full_name.clone(), idx).is_some() {
				return Err(TextprotoError::schema(format!("duplicate enum type {}", item.full_name)));
			}
		}

		for message in &messages {
			let def = link_message(&inner, message)?;
			inner.messages.push(def);
		}

		for item in self.enums {
			if item.values.is_empty() {
				return Err(TextprotoError::schema(format!("enum {} declares no values", item.full_name)));
			}
			inner.enums.push(EnumDef {
				full_name: item.full_name,
				values: item.values,
			});
		}

		for (idx, item) in self.extensions.into_iter().enumerate() {
			let extendee = *inner
				.message_index
				.get(&item.extendee)
				.ok_or_else(|| TextprotoError::schema(format!("extension {} extends unknown message {}", item.full_name, item.extendee)))?;
			let ty = link_type(&inner, &item.ty, &item.full_name)?;
			let name = item.full_name.rsplit_once('.').map_or(item.full_name.as_str(), |(_, name)| name).to_owned();
			if inner.extension_index.insert(item.full_name.clone(), idx).is_some() {
				return Err(TextprotoError::schema(format!("duplicate extension {}", item.full_name)));
			}
			inner.extensions.push(ExtensionDef {
				field: FieldDef {
					name,
					full_name: item.full_name,
					number: item.number,
					ty,
					cardinality: item.cardinality,
					oneof: None,
				},
				extendee,
			});
		}

		Ok(DescriptorPool { inner: Arc::new(inner) })
	}
}

fn any_message() -> MessageBuilder {
	MessageBuilder::new(ANY_FULL_NAME)
		.field("type_url", 1, ScalarType::String)
		.field("value", 2, ScalarType::Bytes)
}

/// Replace map-shaped fields with repeated references to synthesized `<Field>Entry` types.
fn expand_map_entries(messages: Vec<MessageBuilder>) -> Vec<MessageBuilder> {
	let mut out = Vec::with_capacity(messages.len());
	let mut entries = Vec::new();

	for mut message in messages {
		for field in &mut message.fields {
			let FieldShape::Map { key, value } = &field.shape else {
				continue;
			};
			let entry_name = format!("{}.{}", message.full_name, map_entry_name(&field.name));
			let mut entry = MessageBuilder::new(entry_name.clone()).field("key", 1, *key).field("value", 2, value.clone());
			entry.map_entry = true;
			entries.push(entry);
			field.shape = FieldShape::Plain(TypeRef::Message(entry_name));
		}
		out.push(message);
	}

	out.extend(entries);
	out
}

fn map_entry_name(field: &str) -> String {
	let mut out = String::with_capacity(field.len() + 5);
	for part in field.split('_').filter(|part| !part.is_empty()) {
		let mut chars = part.chars();
		if let Some(first) = chars.next() {
			out.extend(first.to_uppercase());
			out.push_str(chars.as_str());
		}
	}
	out.push_str("Entry");
	out
}

fn link_message(inner: &PoolInner, message: &MessageBuilder) -> Result<MessageDef> {
	let mut fields = Vec::with_capacity(message.fields.len());
	let mut by_name = HashMap::new();
	let mut by_number = HashMap::new();

	for (idx, spec) in message.fields.iter().enumerate() {
		let full_name = format!("{}.{}", message.full_name, spec.name);
		let FieldShape::Plain(ty) = &spec.shape else {
			return Err(TextprotoError::schema(format!("map field {full_name} was not expanded")));
		};
		if by_name.insert(spec.name.clone(), idx).is_some() {
			return Err(TextprotoError::schema(format!("duplicate field name {full_name}")));
		}
		if spec.number == 0 || by_number.insert(spec.number, idx).is_some() {
			return Err(TextprotoError::schema(format!("invalid or duplicate field number {} for {full_name}", spec.number)));
		}
		let oneof = spec
			.oneof
			.as_ref()
			.and_then(|name| message.oneofs.iter().position(|oneof| oneof == name));

		fields.push(FieldDef {
			name: spec.name.clone(),
			number: spec.number,
			ty: link_type(inner, ty, &full_name)?,
			cardinality: spec.cardinality,
			oneof,
			full_name,
		});
	}

	Ok(MessageDef {
		full_name: message.full_name.clone(),
		fields,
		by_name,
		by_number,
		oneofs: message.oneofs.iter().map(|oneof| format!("{}.{oneof}", message.full_name)).collect(),
		reserved_names: message.reserved_names.iter().cloned().collect::<HashSet<_>>(),
		map_entry: message.map_entry,
	})
}

fn link_type(inner: &PoolInner, ty: &TypeRef, owner: &str) -> Result<FieldType> {
	let lookup = |index: &HashMap<String, usize>, name: &str, what: &str| {
		index
			.get(name)
			.copied()
			.ok_or_else(|| TextprotoError::schema(format!("{owner} references unknown {what} type {name}")))
	};

	Ok(match ty {
		TypeRef::Scalar(scalar) => FieldType::Scalar(*scalar),
		TypeRef::Enum(name) => FieldType::Enum(lookup(&inner.enum_index, name, "enum")?),
		TypeRef::Message(name) => FieldType::Message(lookup(&inner.message_index, name, "message")?),
		TypeRef::Group(name) => FieldType::Group(lookup(&inner.message_index, name, "message")?),
	})
}
