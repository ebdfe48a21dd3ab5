#![allow(missing_docs)]

use prototext::textproto::{
	DecodeOptions, DescriptorPool, DynamicMessage, EncodeOptions, FieldSlot, MapKey, ReflectMessage, ReflectValue, ScalarValue,
	TextprotoError, TextprotoFile, decode, load_schema_file,
};
use prototext_testkit::{fixture_path, read_fixture};

fn schema() -> DescriptorPool {
	load_schema_file(fixture_path("warehouse.schema.json")).expect("schema loads")
}

fn decode_fixture(name: &str, options: &DecodeOptions) -> Result<DynamicMessage, TextprotoError> {
	let pool = schema();
	let file = TextprotoFile::open(fixture_path(name))?;
	let mut message = DynamicMessage::new(pool.message_by_name("acme.Warehouse").expect("warehouse exists"));
	decode(&file.parse()?, &mut message, options)?;
	Ok(message)
}

#[test]
fn warehouse_fixture_decodes_every_field_shape() {
	let message = decode_fixture("warehouse.txtpb", &DecodeOptions::default()).expect("decodes");

	assert_eq!(message.get_scalar("name").and_then(ScalarValue::as_str), Some("Central"));
	assert_eq!(message.get_scalar("code"), Some(&ScalarValue::U32(42)));
	assert_eq!(message.get_scalar("status"), Some(&ScalarValue::Enum(1)));

	let items = message.get_list("items").expect("items list");
	assert_eq!(items.len(), 2);
	let second = items[1].as_message().expect("item message");
	assert_eq!(second.get_scalar("qty"), Some(&ScalarValue::I32(-3)));

	let stock = message.get_map("stock").expect("stock map");
	assert_eq!(stock.get(&MapKey::String(b"B-2".to_vec())), Some(&ReflectValue::Scalar(ScalarValue::I32(0))));

	let audit = message.get_message("audit").expect("audit group");
	assert_eq!(audit.get_scalar("at"), Some(&ScalarValue::I64(1_700_000_000)));

	assert!(matches!(
		message.get_extension("acme.priority"),
		Some(FieldSlot::Singular(ReflectValue::Scalar(ScalarValue::I32(3))))
	));
}

#[test]
fn any_payload_is_stored_as_deterministic_bytes() {
	let message = decode_fixture("warehouse.txtpb", &DecodeOptions::default()).expect("decodes");
	let any = message.get_message("metadata").expect("metadata set");

	assert_eq!(
		any.get_scalar("type_url").and_then(ScalarValue::as_str),
		Some("type.googleapis.com/acme.Note")
	);
	let mut expected = vec![0x0a, 0x08];
	expected.extend_from_slice(b"seasonal");
	assert_eq!(any.get_scalar("value"), Some(&ScalarValue::Bytes(expected)));
}

#[test]
fn decoded_message_encodes_in_field_number_order() {
	let message = decode_fixture("minimal.txtpb", &DecodeOptions::default()).expect("decodes");
	let bytes = message.encode(EncodeOptions::default()).expect("encodes");

	let mut expected = vec![0x0a, 0x05];
	expected.extend_from_slice(b"Annex");
	expected.extend_from_slice(&[0x10, 0x01]);
	assert_eq!(bytes, expected);
}

#[test]
fn compressed_fixture_matches_plain_source() {
	let text = read_fixture("warehouse.txtpb");
	let compressed = zstd::encode_all(text.as_bytes(), 3).expect("compress");
	let file = TextprotoFile::from_bytes(compressed).expect("decompresses");

	assert_eq!(file.text(), text);
	assert_eq!(file.parse().expect("parses"), TextprotoFile::from_bytes(text.into_bytes()).expect("plain").parse().expect("parses"));
}

#[test]
fn required_check_respects_partial_option() {
	let err = decode_fixture("missing_required.txtpb", &DecodeOptions::default()).expect_err("required fields missing");
	match err {
		TextprotoError::RequiredFieldsMissing { message, fields } => {
			assert_eq!(message, "acme.Warehouse");
			assert!(fields.contains(&"name".to_owned()));
			assert!(fields.contains(&"items[0].sku".to_owned()));
		}
		other => panic!("unexpected error: {other}"),
	}

	let message = decode_fixture("missing_required.txtpb", &DecodeOptions::partial()).expect("partial decode");
	assert_eq!(message.get_scalar("code"), Some(&ScalarValue::U32(7)));
}
