use tracing::metadata::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber; `RUST_LOG` directives override the verbosity default.
pub fn init(verbosity: u8) {
	let filter = EnvFilter::builder()
		.with_default_directive(level_from_verbosity(verbosity).into())
		.from_env_lossy();

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.compact()
		.try_init();
}

fn level_from_verbosity(verbosity: u8) -> LevelFilter {
	match verbosity {
		0 => LevelFilter::WARN,
		1 => LevelFilter::DEBUG,
		_ => LevelFilter::TRACE,
	}
}
