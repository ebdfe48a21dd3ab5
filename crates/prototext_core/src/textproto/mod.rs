mod any;
mod compression;
mod decode;
mod descriptor;
mod dynamic;
mod error;
mod field;
mod file;
mod parse;
mod reflect;
mod reify;
mod resolver;
mod scalar;
mod scanner;
mod schema;
mod value;
mod wire;

/// Compression detection result and limits.
pub use compression::{Compression, MAX_DECOMPRESSED_BYTES, ZSTD_MAGIC};
/// Decoding entry points and options.
pub use decode::{DEFAULT_MAX_DEPTH, DecodeOptions, decode, decode_str, decode_with_resolver};
/// Descriptor pool, handles, and builders.
pub use descriptor::{
	ANY_FULL_NAME, ANY_TYPE_URL_NUMBER, ANY_VALUE_NUMBER, Cardinality, DescriptorPool, EnumDescriptor, FieldDescriptor, Kind,
	MessageBuilder, MessageDescriptor, PoolBuilder, ScalarType, TypeRef,
};
/// Descriptor-driven message implementation.
pub use dynamic::{DynamicMessage, FieldSlot};
/// Error, diagnostic, and result aliases.
pub use error::{Diagnostic, Diagnostics, Result, TextprotoError};
/// File abstraction over plain or compressed sources.
pub use file::TextprotoFile;
/// Textproto tokenizer.
pub use parse::{parse, parse_with_depth};
/// Reflective message abstraction and value types.
pub use reflect::{EncodeOptions, MapKey, ReflectMessage, ReflectValue, ScalarValue};
/// Extension and Any type lookup.
pub use resolver::{ResolveError, TypeResolver};
/// JSON schema loading.
pub use schema::{load_schema_file, parse_schema};
/// Untyped value tree.
pub use value::{Key, Value};
/// Binary wire encoding.
pub use wire::{WireType, encode_message};
