#![allow(missing_docs)]

use clap::{ArgAction, Parser, Subcommand};

mod cmd;
mod telemetry;

#[derive(Parser)]
#[command(name = "prototext", about = "Schema-directed protobuf text format tools")]
struct Cli {
	/// Raise log verbosity (`-v` debug, `-vv` trace); `RUST_LOG` takes precedence.
	#[arg(short, long, action = ArgAction::Count, global = true)]
	verbose: u8,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Decode a textproto file against a schema and print the message.
	Decode(cmd::decode::Args),
	/// Decode a textproto file and print its binary wire encoding as hex.
	Encode(cmd::encode::Args),
	/// Summarize a JSON schema document.
	Schema(cmd::schema::Args),
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> prototext::textproto::Result<()> {
	let cli = Cli::parse();
	telemetry::init(cli.verbose);

	match cli.command {
		Commands::Decode(args) => cmd::decode::run(args),
		Commands::Encode(args) => cmd::encode::run(args),
		Commands::Schema(args) => cmd::schema::run(args),
	}
}
