use std::collections::BTreeMap;

use crate::textproto::wire;
use crate::textproto::{EncodeOptions, FieldDescriptor, MapKey, MessageDescriptor, ReflectMessage, ReflectValue, Result, ScalarValue};

/// Storage for one populated field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSlot {
	/// Singular field value.
	Singular(ReflectValue<DynamicMessage>),
	/// Repeated field elements in insertion order.
	List(Vec<ReflectValue<DynamicMessage>>),
	/// Map entries ordered by key.
	Map(BTreeMap<MapKey, ReflectValue<DynamicMessage>>),
}

#[derive(Debug, Clone, PartialEq)]
struct FieldEntry {
	field: FieldDescriptor,
	slot: FieldSlot,
}

/// Reflective message backed by a field-number-indexed value table.
///
/// Works for any descriptor in a [`crate::textproto::DescriptorPool`], extensions included.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicMessage {
	descriptor: MessageDescriptor,
	fields: BTreeMap<u32, FieldEntry>,
}

impl DynamicMessage {
	/// Create an empty message of type `descriptor`.
	pub fn new(descriptor: MessageDescriptor) -> Self {
		Self {
			descriptor,
			fields: BTreeMap::new(),
		}
	}

	/// Return whether no field is populated.
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	/// Return whether `field` is populated.
	pub fn has(&self, field: &FieldDescriptor) -> bool {
		self.fields.get(&field.number()).is_some_and(|entry| entry.field == *field)
	}

	/// Iterate populated fields in field-number order.
	pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &FieldSlot)> + '_ {
		self.fields.values().map(|entry| (&entry.field, &entry.slot))
	}

	/// Return the slot of a declared field by name.
	pub fn get(&self, name: &str) -> Option<&FieldSlot> {
		let field = self.descriptor.field_by_name(name)?;
		self.get_field(&field)
	}

	/// Return the slot of a declared field or extension.
	pub fn get_field(&self, field: &FieldDescriptor) -> Option<&FieldSlot> {
		self.fields
			.get(&field.number())
			.filter(|entry| entry.field == *field)
			.map(|entry| &entry.slot)
	}

	/// Return the slot of an extension, looked up by full name.
	pub fn get_extension(&self, full_name: &str) -> Option<&FieldSlot> {
		self.fields
			.values()
			.find(|entry| entry.field.is_extension() && entry.field.full_name() == full_name)
			.map(|entry| &entry.slot)
	}

	/// Return a singular scalar by field name.
	pub fn get_scalar(&self, name: &str) -> Option<&ScalarValue> {
		match self.get(name)? {
			FieldSlot::Singular(value) => value.as_scalar(),
			_ => None,
		}
	}

	/// Return a singular submessage by field name.
	pub fn get_message(&self, name: &str) -> Option<&DynamicMessage> {
		match self.get(name)? {
			FieldSlot::Singular(value) => value.as_message(),
			_ => None,
		}
	}

	/// Return repeated elements by field name.
	pub fn get_list(&self, name: &str) -> Option<&[ReflectValue<DynamicMessage>]> {
		match self.get(name)? {
			FieldSlot::List(items) => Some(items),
			_ => None,
		}
	}

	/// Return map entries by field name.
	pub fn get_map(&self, name: &str) -> Option<&BTreeMap<MapKey, ReflectValue<DynamicMessage>>> {
		match self.get(name)? {
			FieldSlot::Map(entries) => Some(entries),
			_ => None,
		}
	}

	/// Append paths of unset required fields, each prefixed by `prefix`.
	fn collect_missing(&self, prefix: &str, out: &mut Vec<String>) {
		out.extend(
			self.descriptor
				.fields()
				.filter(|field| field.is_required() && !self.has(field))
				.map(|field| format!("{prefix}{}", field.name())),
		);

		for entry in self.fields.values() {
			let path = if entry.field.is_extension() {
				format!("{prefix}[{}]", entry.field.full_name())
			} else {
				format!("{prefix}{}", entry.field.name())
			};
			match &entry.slot {
				FieldSlot::Singular(value) => {
					if let Some(message) = value.as_message() {
						message.collect_missing(&format!("{path}."), out);
					}
				}
				FieldSlot::List(items) => {
					for (index, item) in items.iter().enumerate() {
						if let Some(message) = item.as_message() {
							message.collect_missing(&format!("{path}[{index}]."), out);
						}
					}
				}
				FieldSlot::Map(entries) => {
					for (key, value) in entries {
						if let Some(message) = value.as_message() {
							message.collect_missing(&format!("{path}[{}].", key_path(key)), out);
						}
					}
				}
			}
		}
	}

	/// Slot for `field`, reset when it holds a stale oneof sibling's value.
	fn slot_for(&mut self, field: &FieldDescriptor, empty: fn() -> FieldSlot) -> &mut FieldSlot {
		let entry = self.fields.entry(field.number()).or_insert_with(|| FieldEntry {
			field: field.clone(),
			slot: empty(),
		});
		if entry.field != *field {
			*entry = FieldEntry {
				field: field.clone(),
				slot: empty(),
			};
		}
		&mut entry.slot
	}
}

fn key_path(key: &MapKey) -> String {
	match key {
		MapKey::Bool(value) => value.to_string(),
		MapKey::I32(value) => value.to_string(),
		MapKey::I64(value) => value.to_string(),
		MapKey::U32(value) => value.to_string(),
		MapKey::U64(value) => value.to_string(),
		MapKey::String(bytes) => format!("{:?}", String::from_utf8_lossy(bytes)),
	}
}

impl FieldSlot {
	/// Elements of a repeated slot; any other shape is replaced by an empty list.
	fn list_mut(&mut self) -> &mut Vec<ReflectValue<DynamicMessage>> {
		match self {
			FieldSlot::List(items) => items,
			other => {
				*other = FieldSlot::List(Vec::new());
				other.list_mut()
			}
		}
	}

	/// Entries of a map slot; any other shape is replaced by an empty map.
	fn map_mut(&mut self) -> &mut BTreeMap<MapKey, ReflectValue<DynamicMessage>> {
		match self {
			FieldSlot::Map(entries) => entries,
			other => {
				*other = FieldSlot::Map(BTreeMap::new());
				other.map_mut()
			}
		}
	}
}

impl ReflectMessage for DynamicMessage {
	fn descriptor(&self) -> &MessageDescriptor {
		&self.descriptor
	}

	fn new_instance(descriptor: MessageDescriptor) -> Self {
		Self::new(descriptor)
	}

	fn clear(&mut self) {
		self.fields.clear();
	}

	fn get_or_create_list(&mut self, field: &FieldDescriptor) -> &mut Vec<ReflectValue<Self>> {
		self.slot_for(field, || FieldSlot::List(Vec::new())).list_mut()
	}

	fn get_or_create_map(&mut self, field: &FieldDescriptor) -> &mut BTreeMap<MapKey, ReflectValue<Self>> {
		self.slot_for(field, || FieldSlot::Map(BTreeMap::new())).map_mut()
	}

	fn set(&mut self, field: &FieldDescriptor, value: ReflectValue<Self>) {
		if let Some(oneof) = field.oneof_index().filter(|_| !field.is_extension()) {
			let number = field.number();
			self.fields
				.retain(|other, entry| *other == number || entry.field.is_extension() || entry.field.oneof_index() != Some(oneof));
		}
		self.fields.insert(
			field.number(),
			FieldEntry {
				field: field.clone(),
				slot: FieldSlot::Singular(value),
			},
		);
	}

	fn missing_required(&self) -> Vec<String> {
		let mut missing = Vec::new();
		self.collect_missing("", &mut missing);
		missing
	}

	fn encode(&self, options: EncodeOptions) -> Result<Vec<u8>> {
		wire::encode_message(self, options)
	}
}
