use std::collections::BTreeMap;

use crate::textproto::{
	DEFAULT_MAX_DEPTH, DecodeOptions, DescriptorPool, Diagnostic, Diagnostics, DynamicMessage, FieldSlot, MapKey, MessageBuilder,
	ReflectMessage, ReflectValue, ScalarType, ScalarValue, TextprotoError, TypeRef, decode, decode_str, parse,
};

fn pool() -> DescriptorPool {
	DescriptorPool::builder()
		.enumeration("pkg.Color", [("GREEN", 3), ("RED", 0)])
		.message(MessageBuilder::new("pkg.Foo").field("bar", 1, ScalarType::Int32))
		.message(
			MessageBuilder::new("pkg.Msg")
				.field("id", 1, ScalarType::Int32)
				.field("name", 2, ScalarType::String)
				.repeated("tags", 3, ScalarType::String)
				.map("counts", 4, ScalarType::String, ScalarType::Int32)
				.map("colors", 5, ScalarType::Int64, TypeRef::enumeration("pkg.Color"))
				.map("foos", 6, ScalarType::String, TypeRef::message("pkg.Foo"))
				.oneof("choice", "a", 7, ScalarType::Bool)
				.oneof("choice", "b", 8, TypeRef::message("pkg.Foo"))
				.field("foo", 9, TypeRef::message("pkg.Foo"))
				.repeated("foo_list", 10, TypeRef::message("pkg.Foo"))
				.field("mygroup", 11, TypeRef::group("pkg.Msg.MyGroup"))
				.field("any", 12, TypeRef::message("google.protobuf.Any"))
				.field("color", 13, TypeRef::enumeration("pkg.Color"))
				.field("blob", 14, ScalarType::Bytes)
				.repeated("children", 15, TypeRef::message("pkg.Msg"))
				.reserved_name("old"),
		)
		.message(MessageBuilder::new("pkg.Msg.MyGroup").field("x", 1, ScalarType::Int32))
		.message(
			MessageBuilder::new("pkg.Req")
				.required("id", 1, ScalarType::Int32)
				.field("child", 2, TypeRef::message("pkg.Req")),
		)
		.message(MessageBuilder::new("pkg.SetItem").field("text", 1, ScalarType::String))
		.extension("pkg.note", "pkg.Msg", 100, ScalarType::String)
		.repeated_extension("pkg.labels", "pkg.Msg", 102, ScalarType::String)
		.extension("pkg.SetItem.message_set_extension", "pkg.Msg", 101, TypeRef::message("pkg.SetItem"))
		.with_well_known()
		.build()
		.expect("pool builds")
}

fn decode_as(message: &str, text: &str, options: &DecodeOptions) -> Result<(DynamicMessage, Diagnostics), TextprotoError> {
	let descriptor = pool().message_by_name(message).expect("message exists");
	let mut target = DynamicMessage::new(descriptor);
	let diagnostics = decode_str(text, &mut target, options)?;
	Ok((target, diagnostics))
}

fn decode_msg(text: &str) -> Result<DynamicMessage, TextprotoError> {
	decode_as("pkg.Msg", text, &DecodeOptions::default()).map(|(message, _)| message)
}

fn scalar(value: ScalarValue) -> ReflectValue<DynamicMessage> {
	ReflectValue::Scalar(value)
}

#[test]
fn decoding_is_deterministic() {
	let text = r#"id: 1 tags: ["x", "y"] counts { key: "b" value: 2 } counts { key: "a" value: 1 } foo { bar: 3 }"#;
	let first = decode_msg(text).expect("decodes");
	let second = decode_msg(text).expect("decodes");
	assert_eq!(first, second);
	assert_eq!(
		first.encode(Default::default()).expect("encodes"),
		second.encode(Default::default()).expect("encodes")
	);
}

#[test]
fn duplicate_singular_field_is_fatal() {
	let err = decode_msg("id: 1 id: 2").expect_err("duplicate field");
	assert_eq!(err.to_string(), "non-repeated field pkg.Msg.id is repeated");

	let err = decode_msg("foo { bar: 1 } foo { bar: 2 }").expect_err("duplicate message field");
	assert!(matches!(err, TextprotoError::RepeatedField { ref field } if field == "pkg.Msg.foo"));

	let err = decode_msg("[pkg.note]: 'a' [pkg.note]: 'b'").expect_err("duplicate extension");
	assert!(matches!(err, TextprotoError::RepeatedField { ref field } if field == "pkg.note"));
}

#[test]
fn oneof_members_are_exclusive_per_body() {
	let err = decode_msg("a: true b { bar: 1 }").expect_err("second oneof member");
	assert_eq!(err.to_string(), "oneof pkg.Msg.choice is already set");

	let message = decode_msg("children { a: true } children { b { bar: 1 } }").expect("separate bodies are independent");
	assert_eq!(message.get_list("children").map(<[_]>::len), Some(2));
}

#[test]
fn list_fields_promote_singletons_and_accumulate() {
	let single = decode_msg(r#"tags: "a""#).expect("decodes");
	let listed = decode_msg(r#"tags: ["a"]"#).expect("decodes");
	assert_eq!(single, listed);

	let message = decode_msg(r#"tags: "a" tags: ["b", "c"] foo_list { bar: 1 } foo_list: [{ bar: 2 }]"#).expect("decodes");
	let tags: Vec<_> = message
		.get_list("tags")
		.expect("tags present")
		.iter()
		.filter_map(|item| item.as_scalar().and_then(ScalarValue::as_str))
		.collect();
	assert_eq!(tags, ["a", "b", "c"]);
	assert_eq!(message.get_list("foo_list").map(<[_]>::len), Some(2));

	let empty = decode_msg("tags: []").expect("decodes");
	assert_eq!(empty.get_list("tags").map(<[_]>::len), Some(0));

	let err = decode_msg("foo_list: 1").expect_err("scalar for message list");
	assert_eq!(err.to_string(), "pkg.Msg.foo_list contains invalid message/group value: 1");
}

#[test]
fn map_entries_default_missing_parts() {
	let message = decode_msg(r#"counts {} colors { key: 7 } foos { key: "k" } counts { key: "x" value: 1 } counts { key: "x" value: 9 }"#)
		.expect("decodes");

	let counts = message.get_map("counts").expect("counts present");
	let expected: BTreeMap<_, _> = [
		(MapKey::String(Vec::new()), scalar(ScalarValue::I32(0))),
		(MapKey::String(b"x".to_vec()), scalar(ScalarValue::I32(9))),
	]
	.into_iter()
	.collect();
	assert_eq!(counts, &expected);

	let colors = message.get_map("colors").expect("colors present");
	assert_eq!(colors.get(&MapKey::I64(7)), Some(&scalar(ScalarValue::Enum(3))));

	let foos = message.get_map("foos").expect("foos present");
	let foo = foos.get(&MapKey::String(b"k".to_vec())).and_then(ReflectValue::as_message).expect("message value");
	assert!(foo.is_empty());
}

#[test]
fn malformed_map_entries_are_fatal() {
	let cases = [
		("counts: 1", "pkg.Msg.counts contains invalid map entry: 1"),
		("counts { key: 'a' key: 'b' }", "pkg.Msg.counts contains duplicate key field"),
		("counts { value: 1 value: 2 }", "pkg.Msg.counts contains duplicate value field"),
		("counts { other: 1 }", "pkg.Msg.counts contains unknown map entry name: other"),
		("colors { key: 'a' }", "pkg.Msg.ColorsEntry.key contains invalid key: \"a\""),
		("counts { value: 'a' }", "pkg.Msg.CountsEntry.value contains invalid scalar value: \"a\""),
	];
	for (text, expected) in cases {
		let err = decode_msg(text).expect_err(text);
		assert_eq!(err.to_string(), expected, "input: {text}");
	}
}

#[test]
fn reserved_names_are_skipped_but_unknown_names_fail() {
	let message = decode_msg("old: 1 id: 2").expect("reserved name ignored");
	assert_eq!(message.get_scalar("id"), Some(&ScalarValue::I32(2)));
	assert_eq!(message.fields().count(), 1);

	let err = decode_msg("missing: 1").expect_err("unknown field");
	assert_eq!(err.to_string(), "pkg.Msg contains unknown field: missing");

	let err = decode_msg("[pkg.unknown]: 1").expect_err("unknown extension");
	assert_eq!(err.to_string(), "pkg.Msg contains unknown field: [pkg.unknown]");
}

#[test]
fn invalid_utf8_is_reported_without_failing() {
	let (message, diagnostics) = decode_as("pkg.Msg", r#"name: "\xff" id: 3"#, &DecodeOptions::default()).expect("soft failure");
	assert_eq!(message.get_scalar("name"), Some(&ScalarValue::String(vec![0xff])));
	assert_eq!(message.get_scalar("id"), Some(&ScalarValue::I32(3)));
	assert_eq!(
		diagnostics.into_vec(),
		[Diagnostic::InvalidUtf8 {
			field: "pkg.Msg.name".to_owned()
		}]
	);

	let err = decode_msg(r#"name: "\xff" id: "x""#).expect_err("fatal error supersedes diagnostics");
	assert!(matches!(err, TextprotoError::InvalidScalar { .. }));
}

#[test]
fn any_payload_is_resolved_and_reencoded() {
	let message = decode_msg("any { [type.googleapis.com/pkg.Foo] { bar: 1 } }").expect("decodes");
	let any = message.get_message("any").expect("any present");
	assert_eq!(any.get_scalar("type_url").and_then(ScalarValue::as_str), Some("type.googleapis.com/pkg.Foo"));
	assert_eq!(any.get_scalar("value"), Some(&ScalarValue::Bytes(vec![0x08, 0x01])));

	let plain = decode_msg(r#"any { type_url: "type.googleapis.com/pkg.Foo" value: "\x08\x01" }"#).expect("plain Any fields");
	assert_eq!(plain.get_message("any"), Some(any));
}

#[test]
fn any_failures_are_fatal() {
	let err = decode_msg("any { [type.googleapis.com/pkg.Nope] {} }").expect_err("unknown type URL");
	assert_eq!(err.to_string(), "unable to resolve message [type.googleapis.com/pkg.Nope]: not found");

	let err = decode_msg("any { [example.com/] {} }").expect_err("empty type name");
	assert!(matches!(err, TextprotoError::UnresolvedMessage { .. }));

	let err = decode_msg("any { [x/pkg.Foo] { bar: 1 } [x/pkg.Foo] { bar: 2 } }").expect_err("two payloads are not an expanded Any");
	assert!(matches!(err, TextprotoError::UnknownField { ref message, .. } if message == "google.protobuf.Any"));
}

#[test]
fn any_payload_required_fields_follow_partial_option() {
	let text = "any { [x/pkg.Req] { child {} } }";
	let err = decode_as("pkg.Msg", text, &DecodeOptions::default()).expect_err("payload incomplete");
	let TextprotoError::RequiredFieldsMissing { message, fields } = err else {
		panic!("expected required-field error");
	};
	assert_eq!(message, "pkg.Req");
	assert_eq!(fields, ["id", "child.id"]);

	let (message, _) = decode_as("pkg.Msg", text, &DecodeOptions::partial()).expect("partial decode");
	let any = message.get_message("any").expect("any present");
	assert_eq!(any.get_scalar("value"), Some(&ScalarValue::Bytes(vec![0x12, 0x00])));
}

#[test]
fn enums_accept_names_and_numbers() {
	let by_name = decode_msg("color: RED").expect("decodes");
	assert_eq!(by_name.get_scalar("color"), Some(&ScalarValue::Enum(0)));
	let by_number = decode_msg("color: 3").expect("decodes");
	assert_eq!(by_number.get_scalar("color"), Some(&ScalarValue::Enum(3)));
	let unknown_number = decode_msg("color: 99").expect("unchecked number");
	assert_eq!(unknown_number.get_scalar("color"), Some(&ScalarValue::Enum(99)));

	let err = decode_msg("color: BLUE").expect_err("unknown enum name");
	assert_eq!(err.to_string(), "pkg.Msg.color contains invalid scalar value: BLUE");
}

#[test]
fn group_fields_accept_type_name_spelling() {
	let message = decode_msg("MyGroup { x: 4 }").expect("decodes");
	let group = message.get_message("mygroup").expect("group present");
	assert_eq!(group.get_scalar("x"), Some(&ScalarValue::I32(4)));
}

#[test]
fn extensions_and_message_set_items_decode() {
	let message = decode_msg("[pkg.note]: 'hi' [pkg.labels]: ['a', 'b'] [pkg.SetItem] { text: 'set' }").expect("decodes");
	assert_eq!(
		message.get_extension("pkg.note"),
		Some(&FieldSlot::Singular(scalar(ScalarValue::String(b"hi".to_vec()))))
	);
	assert!(matches!(message.get_extension("pkg.labels"), Some(FieldSlot::List(items)) if items.len() == 2));

	let Some(FieldSlot::Singular(ReflectValue::Message(item))) = message.get_extension("pkg.SetItem.message_set_extension") else {
		panic!("expected MessageSet item");
	};
	assert_eq!(item.get_scalar("text").and_then(ScalarValue::as_str), Some("set"));
}

#[test]
fn required_fields_are_checked_after_decode() {
	let err = decode_as("pkg.Req", "child { id: 1 }", &DecodeOptions::default()).expect_err("top-level id missing");
	assert_eq!(err.to_string(), "required field(s) missing in pkg.Req: id");

	let (message, _) = decode_as("pkg.Req", "child { id: 1 }", &DecodeOptions::partial()).expect("partial accepted");
	assert!(message.get_message("child").is_some());
}

#[test]
fn missing_required_fields_are_reported_by_path() {
	let err = decode_as("pkg.Req", "child { child { } }", &DecodeOptions::default()).expect_err("ids missing at every level");
	let TextprotoError::RequiredFieldsMissing { message, fields } = err else {
		panic!("expected required-field error");
	};
	assert_eq!(message, "pkg.Req");
	assert_eq!(fields, ["id", "child.id", "child.child.id"]);
}

#[test]
fn nesting_depth_is_bounded() {
	let options = DecodeOptions {
		max_depth: 3,
		..DecodeOptions::default()
	};
	decode_as("pkg.Msg", "children { children { id: 1 } }", &options).expect("depth 3 fits");
	let err = decode_as("pkg.Msg", "children { children { children {} } }", &options).expect_err("too deep");
	assert!(matches!(err, TextprotoError::DecodeDepthExceeded { max_depth: 3 }));
}

#[test]
fn very_deep_input_reports_depth_instead_of_overflowing() {
	let depth = 200_000;
	let text = format!("{}{}", "children { ".repeat(depth), "}".repeat(depth));

	let options = DecodeOptions {
		max_depth: 3,
		..DecodeOptions::default()
	};
	let err = decode_as("pkg.Msg", &text, &options).expect_err("too deep");
	assert!(matches!(err, TextprotoError::DecodeDepthExceeded { max_depth: 3 }));

	let err = decode_msg(&text).expect_err("too deep for the default ceiling");
	assert!(matches!(err, TextprotoError::DecodeDepthExceeded { max_depth } if max_depth == DEFAULT_MAX_DEPTH));
}

#[test]
fn lone_oneof_member_leaves_sibling_unset() {
	let message = decode_msg("a: true").expect("decodes");
	assert_eq!(message.get_scalar("a"), Some(&ScalarValue::Bool(true)));
	assert!(message.get("b").is_none());
}

#[test]
fn absent_integer_map_key_defaults_to_zero() {
	let message = decode_msg("colors { value: RED }").expect("decodes");
	let colors = message.get_map("colors").expect("colors present");
	assert_eq!(colors.len(), 1);
	assert_eq!(colors.get(&MapKey::I64(0)), Some(&scalar(ScalarValue::Enum(0))));
}

#[test]
fn target_is_cleared_before_decoding() {
	let pool = pool();
	let mut target = DynamicMessage::new(pool.message_by_name("pkg.Msg").expect("message exists"));
	decode(&parse("id: 1 name: 'a'").expect("parses"), &mut target, &DecodeOptions::default()).expect("decodes");
	decode(&parse("id: 2").expect("parses"), &mut target, &DecodeOptions::default()).expect("decodes");
	assert_eq!(target.get_scalar("id"), Some(&ScalarValue::I32(2)));
	assert_eq!(target.get_scalar("name"), None);
}

#[test]
fn messages_and_scalars_are_not_interchangeable() {
	let err = decode_msg("foo: 1").expect_err("scalar for message");
	assert_eq!(err.to_string(), "pkg.Msg.foo contains invalid message/group value: 1");

	let err = decode_msg("id { }").expect_err("message for scalar");
	assert_eq!(err.to_string(), "pkg.Msg.id contains invalid scalar value: {}");

	let err = decode_msg("blob: 1").expect_err("integer for bytes");
	assert!(matches!(err, TextprotoError::InvalidScalar { ref field, .. } if field == "pkg.Msg.blob"));
}
