//! Simulation trace parsing.
//!
//! Traces are text logs with one event per line:
//!
//! ```text
//! Cycle: <n> SnoopAddr: <hex> SnoopBlock: <hex>
//! Cycle: <n> SnoopRespAddr: <hex>
//! Cycle: <n> PrefetchAddr: <hex>
//! Cycle: <n> PrefetchRespAddr: <hex>
//! ```
//!
//! Any other line is skipped.

// Imports
use {
	anyhow::Context,
	itertools::Itertools,
	pfeval_util::ParseHexAddr,
	std::{fs, io, path::Path},
};

/// Parsed trace
#[derive(Clone, Debug)]
pub struct Trace {
	/// All events, in trace order
	events: Vec<Event>,

	/// Total lines read
	total_lines: usize,

	/// Lines that weren't recognized as any event
	skipped_lines: usize,
}

impl Trace {
	/// Parses a trace from a file.
	///
	/// # Errors
	/// Returns an error naming `path` if unable to open the file, or
	/// any error from [`Self::from_reader`].
	pub fn from_path(path: &Path) -> Result<Self, anyhow::Error> {
		let file = fs::File::open(path).with_context(|| format!("Unable to open trace file {path:?}"))?;
		Self::from_reader(io::BufReader::new(file)).with_context(|| format!("Unable to parse trace file {path:?}"))
	}

	/// Parses a trace from a reader.
	///
	/// Lines that aren't valid utf-8 are skipped, like any other
	/// unrecognized line.
	///
	/// # Errors
	/// Returns an error if unable to read from `reader`, or if a recognized
	/// line has a malformed cycle or address.
	pub fn from_reader<R: io::BufRead>(mut reader: R) -> Result<Self, anyhow::Error> {
		let mut events = vec![];
		let mut total_lines = 0;
		let mut skipped_lines = 0;
		let mut line_bytes = vec![];
		loop {
			line_bytes.clear();
			let bytes_read = reader
				.read_until(b'\n', &mut line_bytes)
				.with_context(|| format!("Unable to read line {}", total_lines + 1))?;
			if bytes_read == 0 {
				break;
			}
			total_lines += 1;
			let line_idx = total_lines - 1;

			let line = match std::str::from_utf8(&line_bytes) {
				Ok(line) => line.trim_end_matches(['\n', '\r']),
				Err(err) => {
					tracing::trace!(line_idx, ?err, "Skipping non utf-8 line");
					skipped_lines += 1;
					continue;
				},
			};

			let event = self::parse_line(line)
				.with_context(|| format!("Malformed trace line {}: {line:?}", line_idx + 1))?;
			match event {
				Some(event) => events.push(event),
				None => {
					tracing::trace!(line_idx, ?line, "Skipping unrecognized line");
					skipped_lines += 1;
				},
			}
		}

		tracing::debug!(total_lines, skipped_lines, events = events.len(), "Parsed trace");
		Ok(Self {
			events,
			total_lines,
			skipped_lines,
		})
	}

	/// Creates a trace from already parsed events
	pub fn from_events(events: Vec<Event>) -> Self {
		Self {
			total_lines: events.len(),
			skipped_lines: 0,
			events,
		}
	}

	/// Returns all events
	pub fn events(&self) -> &[Event] {
		&self.events
	}

	/// Returns the total number of lines read
	pub fn total_lines(&self) -> usize {
		self.total_lines
	}

	/// Returns the number of unrecognized lines
	pub fn skipped_lines(&self) -> usize {
		self.skipped_lines
	}
}

impl FromIterator<Event> for Trace {
	fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
		Self::from_events(iter.into_iter().collect())
	}
}

/// Trace event
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Event {
	/// Cycle the event happened on
	pub cycle: u64,

	/// Kind
	pub kind: EventKind,
}

/// Trace event kind
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum EventKind {
	/// Demand access request
	SnoopRequest { addr: u64, block_addr: u64 },

	/// Demand access response
	SnoopResponse { addr: u64 },

	/// Prefetch issued
	PrefetchRequest { addr: u64 },

	/// Prefetch completed
	PrefetchResponse { addr: u64 },
}

/// Parses a single trace line.
///
/// Returns `Ok(None)` if the line isn't a recognized event.
///
/// # Errors
/// Returns an error if the line is recognized, but its cycle or
/// address fields can't be parsed.
pub fn parse_line(line: &str) -> Result<Option<Event>, anyhow::Error> {
	let mut tokens = line.split_whitespace();
	let Some(("Cycle:", cycle, kind, addr)) = tokens.next_tuple() else {
		return Ok(None);
	};

	// Note: We check the grammar before parsing any fields, so that
	//       unknown lines are never errors.
	let grammar = match kind {
		"SnoopAddr:" => match tokens.next_tuple() {
			Some(("SnoopBlock:", block_addr)) => Grammar::SnoopRequest { block_addr },
			_ => return Ok(None),
		},
		"SnoopRespAddr:" => Grammar::SnoopResponse,
		"PrefetchAddr:" => Grammar::PrefetchRequest,
		"PrefetchRespAddr:" => Grammar::PrefetchResponse,
		_ => return Ok(None),
	};

	let cycle = cycle
		.parse::<u64>()
		.with_context(|| format!("Unable to parse cycle {cycle:?}"))?;
	let addr = addr
		.parse_hex_addr()
		.with_context(|| format!("Unable to parse address {addr:?}"))?;

	let kind = match grammar {
		Grammar::SnoopRequest { block_addr } => EventKind::SnoopRequest {
			addr,
			block_addr: block_addr
				.parse_hex_addr()
				.with_context(|| format!("Unable to parse block address {block_addr:?}"))?,
		},
		Grammar::SnoopResponse => EventKind::SnoopResponse { addr },
		Grammar::PrefetchRequest => EventKind::PrefetchRequest { addr },
		Grammar::PrefetchResponse => EventKind::PrefetchResponse { addr },
	};

	Ok(Some(Event { cycle, kind }))
}

/// Line grammar, before any fields are parsed
#[derive(Clone, Copy, Debug)]
enum Grammar<'a> {
	SnoopRequest { block_addr: &'a str },
	SnoopResponse,
	PrefetchRequest,
	PrefetchResponse,
}
