use prototext::textproto::{DecodeOptions, DescriptorPool, DynamicMessage, MessageBuilder, ScalarType, ScalarValue, TypeRef, decode_str};
use serde_json::json;

use super::{message_json, render_scalar, truncate};

fn decode_item(text: &str) -> DynamicMessage {
	let pool = DescriptorPool::builder()
		.enumeration("demo.Mode", [("OFF", 0), ("ON", 1)])
		.message(
			MessageBuilder::new("demo.Item")
				.field("name", 1, ScalarType::String)
				.field("mode", 2, TypeRef::enumeration("demo.Mode"))
				.repeated("scores", 3, ScalarType::Double)
				.map("modes", 4, ScalarType::Int32, TypeRef::enumeration("demo.Mode"))
				.field("raw", 5, ScalarType::Bytes)
				.field("child", 6, TypeRef::message("demo.Item")),
		)
		.extension("demo.tag", "demo.Item", 100, ScalarType::Uint64)
		.build()
		.expect("pool builds");
	let mut message = DynamicMessage::new(pool.message_by_name("demo.Item").expect("item exists"));
	decode_str(text, &mut message, &DecodeOptions::default()).expect("decodes");
	message
}

#[test]
fn message_json_uses_names_for_enums_and_extensions() {
	let message = decode_item(
		r#"name: "top" mode: ON scores: [1.5, inf] modes { key: 7 value: ON } raw: "\x01\xff"
		child { name: "inner" mode: 5 } [demo.tag]: 18446744073709551615"#,
	);

	assert_eq!(
		message_json(&message),
		json!({
			"name": "top",
			"mode": "ON",
			"scores": [1.5, "inf"],
			"modes": { "7": "ON" },
			"raw": "01ff",
			"child": { "name": "inner", "mode": 5 },
			"[demo.tag]": 18446744073709551615_u64,
		})
	);
}

#[test]
fn scalar_rendering_truncates_and_quotes_strings() {
	let text = ScalarValue::String(b"abcdef".to_vec());
	assert_eq!(render_scalar(&text, None, 3), "\"abc...\"");
	assert_eq!(render_scalar(&ScalarValue::Bytes(vec![0; 4]), None, 3), "bytes[4]");
	assert_eq!(render_scalar(&ScalarValue::Enum(9), None, 3), "9");
	assert_eq!(truncate("héllo", 10), "héllo");
}
