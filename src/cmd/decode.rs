use prototext::textproto::{ReflectMessage, Result};

use crate::cmd::render::{PrintOptions, message_json, print_message};
use crate::cmd::util::{InputArgs, emit_json, report_diagnostics};

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub input: InputArgs,
	#[arg(long)]
	pub json: bool,
}

/// Decode a textproto file and print the resulting message.
pub fn run(args: Args) -> Result<()> {
	let Args { input, json } = args;

	let loaded = input.load()?;
	report_diagnostics(&loaded.diagnostics);

	if json {
		let payload = DecodeJson {
			path: input.input.display().to_string(),
			message: loaded.message.descriptor().full_name().to_owned(),
			compression: loaded.file.compression.as_str().to_owned(),
			diagnostics: loaded.diagnostics.iter().map(ToString::to_string).collect(),
			value: message_json(&loaded.message),
		};
		return emit_json(&payload);
	}

	println!("path: {}", input.input.display());
	println!("compression: {}", loaded.file.compression.as_str());
	println!("diagnostics: {}", loaded.diagnostics.len());
	println!("decoded:");
	print_message(&loaded.message, 0, 0, PrintOptions::default());

	Ok(())
}

#[derive(serde::Serialize)]
struct DecodeJson {
	path: String,
	message: String,
	compression: String,
	diagnostics: Vec<String>,
	value: serde_json::Value,
}
