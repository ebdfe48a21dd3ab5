use std::path::PathBuf;

use prototext::textproto::{
	DEFAULT_MAX_DEPTH, DecodeOptions, Diagnostics, DynamicMessage, Result, TextprotoError, TextprotoFile, decode, load_schema_file,
};
use tracing::debug;

/// Input selection shared by commands that decode a textproto file.
#[derive(clap::Args)]
pub struct InputArgs {
	/// Textproto file, plain or zstd-compressed.
	pub input: PathBuf,
	/// JSON schema document describing the message types.
	#[arg(long)]
	pub schema: PathBuf,
	/// Fully-qualified name of the top-level message type.
	#[arg(long)]
	pub message: String,
	/// Accept messages with unset required fields.
	#[arg(long)]
	pub allow_partial: bool,
	/// Maximum message nesting depth.
	#[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
	pub max_depth: u32,
}

/// Decoded input plus what was learned while reading it.
pub(crate) struct LoadedInput {
	pub file: TextprotoFile,
	pub message: DynamicMessage,
	pub diagnostics: Diagnostics,
}

impl InputArgs {
	pub(crate) fn decode_options(&self) -> DecodeOptions {
		DecodeOptions {
			allow_partial: self.allow_partial,
			max_depth: self.max_depth,
		}
	}

	/// Load the schema, read the input, and decode it into a dynamic message.
	pub(crate) fn load(&self) -> Result<LoadedInput> {
		let pool = load_schema_file(&self.schema)?;
		let descriptor = pool
			.message_by_name(&self.message)
			.ok_or_else(|| TextprotoError::MessageNotFound { name: self.message.clone() })?;

		let file = TextprotoFile::open(&self.input)?;
		debug!(path = %self.input.display(), compression = file.compression.as_str(), "read input");

		let body = file.parse_with_depth(self.max_depth)?;
		let mut message = DynamicMessage::new(descriptor);
		let diagnostics = decode(&body, &mut message, &self.decode_options())?;
		Ok(LoadedInput {
			file,
			message,
			diagnostics,
		})
	}
}

/// Print soft diagnostics to stderr.
pub(crate) fn report_diagnostics(diagnostics: &Diagnostics) {
	for diagnostic in diagnostics {
		eprintln!("warning: {diagnostic}");
	}
}

/// Print a serializable payload as pretty JSON on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) -> Result<()> {
	let text = serde_json::to_string_pretty(payload)?;
	println!("{text}");
	Ok(())
}

/// Render bytes as lowercase hex without separators.
pub(crate) fn hex(bytes: &[u8]) -> String {
	bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
