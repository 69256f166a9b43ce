//! Prefetcher evaluator (`pfeval`)

// Modules
mod args;

// Imports
use {
	self::args::Args,
	anyhow::Context,
	clap::Parser,
	pfeval::{data, Analyzer, Config, Trace},
	pfeval_util::logger,
	std::{
		fs,
		io::{BufReader, BufWriter, Write},
		path::Path,
	},
};

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Read the config file, if any
	let mut config = match &args.config_file {
		Some(config_path) => {
			let config_file = fs::File::open(config_path)
				.with_context(|| format!("Unable to open config file {config_path:?}"))?;
			Config::from_reader(BufReader::new(config_file))
				.with_context(|| format!("Unable to parse config file {config_path:?}"))?
		},
		None => Config::default(),
	};
	if let Some(miss_latency) = args.miss_latency {
		config.thresholds.miss_latency = miss_latency;
	}
	if let Some(backlog) = args.backlog {
		config.thresholds.backlog = backlog;
	}
	tracing::debug!(?config, "Using config");

	// Read both traces
	let prefetch_trace = self::read_trace(&args.prefetch_trace_file)?;
	let baseline_trace = self::read_trace(&args.no_prefetch_trace_file)?;

	// Then analyze them
	let analyzer = Analyzer::new(config.thresholds);
	let report = analyzer.run(&prefetch_trace, &baseline_trace);
	print!("{report}");

	if let Some(output_path) = &args.output_file {
		let data = data::ReportData::from(&report);
		let output_file = fs::File::create(output_path)
			.with_context(|| format!("Unable to create output file {output_path:?}"))?;
		let mut output_writer = BufWriter::new(output_file);
		serde_json::to_writer_pretty(&mut output_writer, &data).context("Unable to write to output file")?;
		output_writer.flush().context("Unable to flush output file")?;
	}

	Ok(())
}

/// Reads a trace file
fn read_trace(path: &Path) -> Result<Trace, anyhow::Error> {
	let trace = Trace::from_path(path)?;
	tracing::debug!(
		?path,
		total_lines = trace.total_lines(),
		skipped_lines = trace.skipped_lines(),
		events = trace.events().len(),
		"Read trace"
	);

	Ok(trace)
}
