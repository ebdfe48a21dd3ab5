//! Schema-directed decoding of protobuf text format into reflective messages.

/// Tokenizer, descriptor pool, decoder, and wire encoder for textproto input.
pub mod textproto;
