//! Arguments

// Imports
use std::path::PathBuf;

/// Arguments
#[derive(Debug)]
#[derive(clap::Parser)]
#[clap(about = "Evaluates a cache prefetcher from two simulation traces")]
pub struct Args {
	/// Log file
	///
	/// Specifies a file to perform verbose logging to.
	/// You can use `RUST_LOG_FILE` to set filtering options
	#[clap(long = "log-file")]
	pub log_file: Option<PathBuf>,

	/// Whether to append to the log file
	#[clap(long = "log-file-append")]
	pub log_file_append: bool,

	/// Trace with prefetching enabled
	pub prefetch_trace_file: PathBuf,

	/// Trace without prefetching
	pub no_prefetch_trace_file: PathBuf,

	/// Config file
	#[clap(long = "config")]
	pub config_file: Option<PathBuf>,

	/// Minimum response latency, in cycles, for an access to be a miss.
	///
	/// Overrides the config file. Defaults to 5.
	#[clap(long = "miss-latency")]
	pub miss_latency: Option<u64>,

	/// Responses within this many cycles of the previous response are
	/// considered backlogged hits.
	///
	/// Overrides the config file. Defaults to 3.
	#[clap(long = "backlog")]
	pub backlog: Option<u64>,

	/// Json output file
	#[clap(long = "output")]
	pub output_file: Option<PathBuf>,
}
