use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

mod builder;

pub use builder::{MessageBuilder, PoolBuilder, TypeRef};

/// Full name of the well-known dynamic-type wrapper.
pub const ANY_FULL_NAME: &str = "google.protobuf.Any";
/// Field number of `google.protobuf.Any.type_url`.
pub const ANY_TYPE_URL_NUMBER: u32 = 1;
/// Field number of `google.protobuf.Any.value`.
pub const ANY_VALUE_NUMBER: u32 = 2;

/// Scalar field types, named as in `.proto` sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
	/// `bool`.
	Bool,
	/// `int32`, varint encoded.
	Int32,
	/// `sint32`, zigzag encoded.
	Sint32,
	/// `sfixed32`, four bytes.
	Sfixed32,
	/// `int64`, varint encoded.
	Int64,
	/// `sint64`, zigzag encoded.
	Sint64,
	/// `sfixed64`, eight bytes.
	Sfixed64,
	/// `uint32`.
	Uint32,
	/// `fixed32`.
	Fixed32,
	/// `uint64`.
	Uint64,
	/// `fixed64`.
	Fixed64,
	/// `float`.
	Float,
	/// `double`.
	Double,
	/// `string`.
	String,
	/// `bytes`.
	Bytes,
}

impl ScalarType {
	/// Parse a `.proto` scalar type keyword.
	pub fn from_name(name: &str) -> Option<Self> {
		Some(match name {
			"bool" => Self::Bool,
			"int32" => Self::Int32,
			"sint32" => Self::Sint32,
			"sfixed32" => Self::Sfixed32,
			"int64" => Self::Int64,
			"sint64" => Self::Sint64,
			"sfixed64" => Self::Sfixed64,
			"uint32" => Self::Uint32,
			"fixed32" => Self::Fixed32,
			"uint64" => Self::Uint64,
			"fixed64" => Self::Fixed64,
			"float" => Self::Float,
			"double" => Self::Double,
			"string" => Self::String,
			"bytes" => Self::Bytes,
			_ => return None,
		})
	}

	/// Render as the `.proto` keyword.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Bool => "bool",
			Self::Int32 => "int32",
			Self::Sint32 => "sint32",
			Self::Sfixed32 => "sfixed32",
			Self::Int64 => "int64",
			Self::Sint64 => "sint64",
			Self::Sfixed64 => "sfixed64",
			Self::Uint32 => "uint32",
			Self::Fixed32 => "fixed32",
			Self::Uint64 => "uint64",
			Self::Fixed64 => "fixed64",
			Self::Float => "float",
			Self::Double => "double",
			Self::String => "string",
			Self::Bytes => "bytes",
		}
	}
}

/// Field label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
	/// Zero or one value.
	Optional,
	/// Exactly one value once decoding completes.
	Required,
	/// Any number of values; maps are repeated entry messages.
	Repeated,
}

impl Cardinality {
	/// Render as the `.proto` label keyword.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Optional => "optional",
			Self::Required => "required",
			Self::Repeated => "repeated",
		}
	}
}

/// Declared kind of a field, with the referenced type for enums, messages, and groups.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
	/// `bool`.
	Bool,
	/// `int32`, varint encoded.
	Int32,
	/// `sint32`, zigzag encoded.
	Sint32,
	/// `sfixed32`, four bytes.
	Sfixed32,
	/// `int64`, varint encoded.
	Int64,
	/// `sint64`, zigzag encoded.
	Sint64,
	/// `sfixed64`, eight bytes.
	Sfixed64,
	/// `uint32`.
	Uint32,
	/// `fixed32`.
	Fixed32,
	/// `uint64`.
	Uint64,
	/// `fixed64`.
	Fixed64,
	/// `float`.
	Float,
	/// `double`.
	Double,
	/// `string`.
	String,
	/// `bytes`.
	Bytes,
	/// Enum with its value table.
	Enum(EnumDescriptor),
	/// Length-delimited nested message.
	Message(MessageDescriptor),
	/// Group-encoded nested message.
	Group(MessageDescriptor),
}

impl Kind {
	/// Return the message type for message and group kinds.
	pub fn message_type(&self) -> Option<&MessageDescriptor> {
		match self {
			Self::Message(message) | Self::Group(message) => Some(message),
			_ => None,
		}
	}

	/// Return whether values of this kind are nested messages.
	pub fn is_message(&self) -> bool {
		matches!(self, Self::Message(_) | Self::Group(_))
	}

	/// Render as a short stable label.
	pub fn label(&self) -> &'static str {
		match self {
			Self::Bool => "bool",
			Self::Int32 => "int32",
			Self::Sint32 => "sint32",
			Self::Sfixed32 => "sfixed32",
			Self::Int64 => "int64",
			Self::Sint64 => "sint64",
			Self::Sfixed64 => "sfixed64",
			Self::Uint32 => "uint32",
			Self::Fixed32 => "fixed32",
			Self::Uint64 => "uint64",
			Self::Fixed64 => "fixed64",
			Self::Float => "float",
			Self::Double => "double",
			Self::String => "string",
			Self::Bytes => "bytes",
			Self::Enum(_) => "enum",
			Self::Message(_) => "message",
			Self::Group(_) => "group",
		}
	}
}

impl From<ScalarType> for Kind {
	fn from(value: ScalarType) -> Self {
		match value {
			ScalarType::Bool => Self::Bool,
			ScalarType::Int32 => Self::Int32,
			ScalarType::Sint32 => Self::Sint32,
			ScalarType::Sfixed32 => Self::Sfixed32,
			ScalarType::Int64 => Self::Int64,
			ScalarType::Sint64 => Self::Sint64,
			ScalarType::Sfixed64 => Self::Sfixed64,
			ScalarType::Uint32 => Self::Uint32,
			ScalarType::Fixed32 => Self::Fixed32,
			ScalarType::Uint64 => Self::Uint64,
			ScalarType::Fixed64 => Self::Fixed64,
			ScalarType::Float => Self::Float,
			ScalarType::Double => Self::Double,
			ScalarType::String => Self::String,
			ScalarType::Bytes => Self::Bytes,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldType {
	Scalar(ScalarType),
	Enum(usize),
	Message(usize),
	Group(usize),
}

#[derive(Debug)]
struct FieldDef {
	name: String,
	full_name: String,
	number: u32,
	ty: FieldType,
	cardinality: Cardinality,
	oneof: Option<usize>,
}

#[derive(Debug)]
struct MessageDef {
	full_name: String,
	fields: Vec<FieldDef>,
	by_name: HashMap<String, usize>,
	by_number: HashMap<u32, usize>,
	oneofs: Vec<String>,
	reserved_names: HashSet<String>,
	map_entry: bool,
}

#[derive(Debug)]
struct EnumDef {
	full_name: String,
	values: Vec<(String, i32)>,
}

#[derive(Debug)]
struct ExtensionDef {
	field: FieldDef,
	extendee: usize,
}

#[derive(Debug, Default)]
struct PoolInner {
	messages: Vec<MessageDef>,
	enums: Vec<EnumDef>,
	extensions: Vec<ExtensionDef>,
	message_index: HashMap<String, usize>,
	enum_index: HashMap<String, usize>,
	extension_index: HashMap<String, usize>,
}

/// Immutable, shareable set of linked message, enum, and extension descriptors.
#[derive(Clone)]
pub struct DescriptorPool {
	inner: Arc<PoolInner>,
}

impl DescriptorPool {
	/// Start building a pool.
	pub fn builder() -> PoolBuilder {
		PoolBuilder::new()
	}

	/// Look up a message type by full name.
	pub fn message_by_name(&self, full_name: &str) -> Option<MessageDescriptor> {
		let index = *self.inner.message_index.get(full_name)?;
		Some(MessageDescriptor { pool: self.clone(), index })
	}

	/// Look up an enum type by full name.
	pub fn enum_by_name(&self, full_name: &str) -> Option<EnumDescriptor> {
		let index = *self.inner.enum_index.get(full_name)?;
		Some(EnumDescriptor { pool: self.clone(), index })
	}

	/// Look up an extension field by full name.
	pub fn extension_by_name(&self, full_name: &str) -> Option<FieldDescriptor> {
		let index = *self.inner.extension_index.get(full_name)?;
		Some(FieldDescriptor {
			pool: self.clone(),
			loc: FieldLoc::Extension(index),
		})
	}

	/// Iterate message types in declaration order, synthesized map entries included.
	pub fn messages(&self) -> impl Iterator<Item = MessageDescriptor> + '_ {
		(0..self.inner.messages.len()).map(|index| MessageDescriptor { pool: self.clone(), index })
	}

	/// Iterate enum types in declaration order.
	pub fn enums(&self) -> impl Iterator<Item = EnumDescriptor> + '_ {
		(0..self.inner.enums.len()).map(|index| EnumDescriptor { pool: self.clone(), index })
	}

	/// Iterate extension fields in declaration order.
	pub fn extensions(&self) -> impl Iterator<Item = FieldDescriptor> + '_ {
		(0..self.inner.extensions.len()).map(|index| FieldDescriptor {
			pool: self.clone(),
			loc: FieldLoc::Extension(index),
		})
	}

	fn same(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl fmt::Debug for DescriptorPool {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DescriptorPool")
			.field("messages", &self.inner.messages.len())
			.field("enums", &self.inner.enums.len())
			.field("extensions", &self.inner.extensions.len())
			.finish()
	}
}

/// Handle to one message type inside a pool.
#[derive(Clone)]
pub struct MessageDescriptor {
	pool: DescriptorPool,
	index: usize,
}

impl MessageDescriptor {
	fn def(&self) -> &MessageDef {
		&self.pool.inner.messages[self.index]
	}

	/// Return the owning pool.
	pub fn pool(&self) -> &DescriptorPool {
		&self.pool
	}

	/// Return the fully-qualified name.
	pub fn full_name(&self) -> &str {
		&self.def().full_name
	}

	/// Return the last name segment.
	pub fn name(&self) -> &str {
		let full = self.full_name();
		full.rsplit_once('.').map_or(full, |(_, name)| name)
	}

	/// Iterate declared fields in declaration order.
	pub fn fields(&self) -> impl Iterator<Item = FieldDescriptor> + '_ {
		(0..self.def().fields.len()).map(|field| self.field_at(field))
	}

	/// Look up a declared field by exact name.
	pub fn field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
		let field = *self.def().by_name.get(name)?;
		Some(self.field_at(field))
	}

	/// Look up a declared field by number.
	pub fn field_by_number(&self, number: u32) -> Option<FieldDescriptor> {
		let field = *self.def().by_number.get(&number)?;
		Some(self.field_at(field))
	}

	/// Return whether `name` is declared reserved.
	pub fn is_reserved_name(&self, name: &str) -> bool {
		self.def().reserved_names.contains(name)
	}

	/// Return reserved names in unspecified order.
	pub fn reserved_names(&self) -> impl Iterator<Item = &str> + '_ {
		self.def().reserved_names.iter().map(String::as_str)
	}

	/// Return oneof full names, indexed by oneof index.
	pub fn oneof_names(&self) -> &[String] {
		&self.def().oneofs
	}

	/// Return whether this is a synthesized map entry type.
	pub fn is_map_entry(&self) -> bool {
		self.def().map_entry
	}

	/// Return whether this is `google.protobuf.Any`.
	pub fn is_any(&self) -> bool {
		self.full_name() == ANY_FULL_NAME
	}

	fn field_at(&self, field: usize) -> FieldDescriptor {
		FieldDescriptor {
			pool: self.pool.clone(),
			loc: FieldLoc::Message { message: self.index, field },
		}
	}
}

impl PartialEq for MessageDescriptor {
	fn eq(&self, other: &Self) -> bool {
		self.pool.same(&other.pool) && self.index == other.index
	}
}

impl fmt::Debug for MessageDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("MessageDescriptor").field(&self.full_name()).finish()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldLoc {
	Message { message: usize, field: usize },
	Extension(usize),
}

/// Handle to one declared field or extension inside a pool.
#[derive(Clone)]
pub struct FieldDescriptor {
	pool: DescriptorPool,
	loc: FieldLoc,
}

impl FieldDescriptor {
	fn def(&self) -> &FieldDef {
		match self.loc {
			FieldLoc::Message { message, field } => &self.pool.inner.messages[message].fields[field],
			FieldLoc::Extension(index) => &self.pool.inner.extensions[index].field,
		}
	}

	/// Return the short field name.
	pub fn name(&self) -> &str {
		&self.def().name
	}

	/// Return the fully-qualified field name.
	pub fn full_name(&self) -> &str {
		&self.def().full_name
	}

	/// Return the field number.
	pub fn number(&self) -> u32 {
		self.def().number
	}

	/// Return the declared label.
	pub fn cardinality(&self) -> Cardinality {
		self.def().cardinality
	}

	/// Return whether the field is labelled `required`.
	pub fn is_required(&self) -> bool {
		self.cardinality() == Cardinality::Required
	}

	/// Return the declared kind.
	pub fn kind(&self) -> Kind {
		let pool = self.pool.clone();
		match self.def().ty {
			FieldType::Scalar(scalar) => Kind::from(scalar),
			FieldType::Enum(index) => Kind::Enum(EnumDescriptor { pool, index }),
			FieldType::Message(index) => Kind::Message(MessageDescriptor { pool, index }),
			FieldType::Group(index) => Kind::Group(MessageDescriptor { pool, index }),
		}
	}

	/// Return the message type for message and group fields.
	pub fn message_type(&self) -> Option<MessageDescriptor> {
		match self.def().ty {
			FieldType::Message(index) | FieldType::Group(index) => Some(MessageDescriptor {
				pool: self.pool.clone(),
				index,
			}),
			_ => None,
		}
	}

	/// Return whether the field is a map.
	pub fn is_map(&self) -> bool {
		match self.def().ty {
			FieldType::Message(index) => self.cardinality() == Cardinality::Repeated && self.pool.inner.messages[index].map_entry,
			_ => false,
		}
	}

	/// Return whether the field is repeated and not a map.
	pub fn is_list(&self) -> bool {
		self.cardinality() == Cardinality::Repeated && !self.is_map()
	}

	/// Return the `key` field of a map entry.
	pub fn map_key(&self) -> Option<FieldDescriptor> {
		if !self.is_map() {
			return None;
		}
		self.message_type()?.field_by_number(1)
	}

	/// Return the `value` field of a map entry.
	pub fn map_value(&self) -> Option<FieldDescriptor> {
		if !self.is_map() {
			return None;
		}
		self.message_type()?.field_by_number(2)
	}

	/// Return the index of the containing oneof.
	pub fn oneof_index(&self) -> Option<usize> {
		self.def().oneof
	}

	/// Return the full name of the containing oneof.
	pub fn oneof_name(&self) -> Option<&str> {
		let oneof = self.def().oneof?;
		match self.loc {
			FieldLoc::Message { message, .. } => self.pool.inner.messages[message].oneofs.get(oneof).map(String::as_str),
			FieldLoc::Extension(_) => None,
		}
	}

	/// Return whether this is an extension field.
	pub fn is_extension(&self) -> bool {
		matches!(self.loc, FieldLoc::Extension(_))
	}

	/// Return the message this field belongs to (the extendee for extensions).
	pub fn containing_message(&self) -> MessageDescriptor {
		let index = match self.loc {
			FieldLoc::Message { message, .. } => message,
			FieldLoc::Extension(index) => self.pool.inner.extensions[index].extendee,
		};
		MessageDescriptor {
			pool: self.pool.clone(),
			index,
		}
	}
}

impl PartialEq for FieldDescriptor {
	fn eq(&self, other: &Self) -> bool {
		self.pool.same(&other.pool) && self.loc == other.loc
	}
}

impl fmt::Debug for FieldDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("FieldDescriptor").field(&self.full_name()).finish()
	}
}

/// Handle to one enum type inside a pool.
#[derive(Clone)]
pub struct EnumDescriptor {
	pool: DescriptorPool,
	index: usize,
}

impl EnumDescriptor {
	fn def(&self) -> &EnumDef {
		&self.pool.inner.enums[self.index]
	}

	/// Return the fully-qualified name.
	pub fn full_name(&self) -> &str {
		&self.def().full_name
	}

	/// Look up a value number by exact name.
	pub fn value_by_name(&self, name: &str) -> Option<i32> {
		self.def().values.iter().find(|(value, _)| value == name).map(|(_, number)| *number)
	}

	/// Look up the first value name declared for `number`.
	pub fn name_by_number(&self, number: i32) -> Option<&str> {
		self.def().values.iter().find(|(_, value)| *value == number).map(|(name, _)| name.as_str())
	}

	/// Iterate `(name, number)` pairs in declaration order.
	pub fn values(&self) -> impl Iterator<Item = (&str, i32)> + '_ {
		self.def().values.iter().map(|(name, number)| (name.as_str(), *number))
	}

	/// Return the number of the first declared value, the enum's default.
	pub fn default_number(&self) -> i32 {
		self.def().values.first().map_or(0, |(_, number)| *number)
	}
}

impl PartialEq for EnumDescriptor {
	fn eq(&self, other: &Self) -> bool {
		self.pool.same(&other.pool) && self.index == other.index
	}
}

impl fmt::Debug for EnumDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("EnumDescriptor").field(&self.full_name()).finish()
	}
}
