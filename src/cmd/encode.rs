use prototext::textproto::{EncodeOptions, ReflectMessage, Result};

use crate::cmd::util::{InputArgs, emit_json, hex, report_diagnostics};

const BYTES_PER_ROW: usize = 16;

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub input: InputArgs,
	#[arg(long)]
	pub json: bool,
}

/// Decode a textproto file and dump its deterministic binary encoding.
pub fn run(args: Args) -> Result<()> {
	let Args { input, json } = args;

	let loaded = input.load()?;
	report_diagnostics(&loaded.diagnostics);

	let bytes = loaded.message.encode(EncodeOptions {
		allow_partial: input.allow_partial,
		deterministic: true,
	})?;

	if json {
		let payload = EncodeJson {
			path: input.input.display().to_string(),
			message: loaded.message.descriptor().full_name().to_owned(),
			len: bytes.len(),
			hex: hex(&bytes),
		};
		return emit_json(&payload);
	}

	println!("path: {}", input.input.display());
	println!("message: {}", loaded.message.descriptor().full_name());
	println!("len: {}", bytes.len());
	for (row, chunk) in bytes.chunks(BYTES_PER_ROW).enumerate() {
		let cells: Vec<String> = chunk.iter().map(|byte| format!("{byte:02x}")).collect();
		println!("{:08x}  {}", row * BYTES_PER_ROW, cells.join(" "));
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct EncodeJson {
	path: String,
	message: String,
	len: usize,
	hex: String,
}
