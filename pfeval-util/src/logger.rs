//! Logger

// Imports
use {
	std::{fs, io, path::Path, sync::Mutex},
	tracing_subscriber::{prelude::*, EnvFilter},
};

/// Default filter for the terminal
const DEFAULT_TERM_FILTER: &str = "info";

/// Default filter for the log file
const DEFAULT_FILE_FILTER: &str = "debug";

/// Initializes the logger.
///
/// Logs to stderr, filtered by `RUST_LOG`, and, if `log_file` is given,
/// to that file, filtered by `RUST_LOG_FILE`.
///
/// Any messages buffered through [`pre_init`] are emitted afterwards.
pub fn init(log_file: Option<&Path>, log_file_append: bool) {
	let term_filter = self::env_filter("RUST_LOG", DEFAULT_TERM_FILTER);
	let term_layer = tracing_subscriber::fmt::layer()
		.with_writer(io::stderr)
		.with_filter(term_filter);

	let file_layer = log_file.and_then(|path| match self::open_log_file(path, log_file_append) {
		Ok(file) => {
			let file_filter = self::env_filter("RUST_LOG_FILE", DEFAULT_FILE_FILTER);
			let layer = tracing_subscriber::fmt::layer()
				.with_ansi(false)
				.with_writer(Mutex::new(file))
				.with_filter(file_filter);
			Some(layer)
		},
		Err(err) => {
			pre_init::warn(format!("Unable to open log file {path:?}: {err}"));
			None
		},
	});

	if let Err(err) = tracing_subscriber::registry()
		.with(term_layer)
		.with(file_layer)
		.try_init()
	{
		eprintln!("Unable to initialize logger: {err}");
	}

	pre_init::flush();
}

/// Creates an env filter from `var`, falling back to `default`
fn env_filter(var: &str, default: &str) -> EnvFilter {
	EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Opens the log file
fn open_log_file(path: &Path, append: bool) -> Result<fs::File, io::Error> {
	fs::OpenOptions::new()
		.create(true)
		.write(true)
		.append(append)
		.truncate(!append)
		.open(path)
}

/// Logging before the logger is initialized.
///
/// Messages are buffered and emitted once [`init`](super::init) runs.
pub mod pre_init {
	// Imports
	use std::sync::Mutex;

	/// Buffered message level
	#[derive(Clone, Copy, Debug)]
	enum Level {
		Debug,
		Warn,
	}

	/// Buffered messages
	static MESSAGES: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());

	/// Buffers a debug message
	pub fn debug(msg: impl Into<String>) {
		self::push(Level::Debug, msg.into());
	}

	/// Buffers a warning message
	pub fn warn(msg: impl Into<String>) {
		self::push(Level::Warn, msg.into());
	}

	fn push(level: Level, msg: String) {
		// Note: A poisoned lock still holds valid messages
		let mut messages = MESSAGES.lock().unwrap_or_else(|err| err.into_inner());
		messages.push((level, msg));
	}

	/// Emits all buffered messages
	pub(super) fn flush() {
		let messages = std::mem::take(&mut *MESSAGES.lock().unwrap_or_else(|err| err.into_inner()));
		for (level, msg) in messages {
			match level {
				Level::Debug => tracing::debug!(target: "pfeval::pre_init", "{msg}"),
				Level::Warn => tracing::warn!(target: "pfeval::pre_init", "{msg}"),
			}
		}
	}
}
