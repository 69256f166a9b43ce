//! Access classifier
//!
//! Labels each demand access of a trace as a hit or a miss from the
//! timing between its request and response.

// Imports
use {
	crate::{
		trace::{Event, EventKind},
		Multiset,
	},
	std::{collections::HashMap, fmt},
};

/// Classification thresholds
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Thresholds {
	/// Minimum request-to-response latency (in cycles) of a miss
	pub miss_latency: u64,

	/// Responses arriving within this many cycles of the previous
	/// response are considered backlogged, and thus hits.
	pub backlog: u64,
}

impl Thresholds {
	/// Default miss latency
	pub const DEFAULT_MISS_LATENCY: u64 = 5;
	/// Default backlog
	pub const DEFAULT_BACKLOG: u64 = 3;
}

impl Default for Thresholds {
	fn default() -> Self {
		Self {
			miss_latency: Self::DEFAULT_MISS_LATENCY,
			backlog:      Self::DEFAULT_BACKLOG,
		}
	}
}

/// Access classifier
#[derive(Clone, Debug)]
pub struct Classifier {
	/// Thresholds
	thresholds: Thresholds,
}

impl Classifier {
	/// Creates a new classifier
	pub fn new(thresholds: Thresholds) -> Self {
		Self { thresholds }
	}

	/// Classifies all demand accesses in `events`.
	///
	/// Prefetch events are ignored.
	pub fn classify(&self, events: &[Event]) -> Classification {
		let mut classification = Classification::default();

		// Note: Keyed by the full address, since several accesses to
		//       the same block may be in flight at once.
		let mut outstanding = HashMap::<u64, OutstandingRequest>::new();
		let mut last_response_cycle = 0;
		for event in events {
			match event.kind {
				EventKind::SnoopRequest { addr, block_addr } => {
					let request = OutstandingRequest {
						cycle: event.cycle,
						block_addr,
					};
					if let Some(prev) = outstanding.insert(addr, request) {
						tracing::trace!(addr, ?prev, "Overwriting outstanding request");
						classification.overwritten_requests += 1;
					}
				},

				EventKind::SnoopResponse { addr } => {
					let Some(request) = outstanding.remove(&addr) else {
						tracing::debug!(addr, cycle = event.cycle, "Discarding unmatched response");
						classification.unmatched_responses += 1;
						continue;
					};

					let latency = event.cycle.saturating_sub(request.cycle);
					let since_last_response = event.cycle.saturating_sub(last_response_cycle);
					let is_miss = latency >= self.thresholds.miss_latency && since_last_response > self.thresholds.backlog;
					tracing::trace!(addr, latency, since_last_response, is_miss, "Classified access");

					match is_miss {
						true => classification.misses.insert(request.block_addr),
						false => classification.hits.insert(request.block_addr),
					}
					last_response_cycle = event.cycle;
				},

				EventKind::PrefetchRequest { .. } | EventKind::PrefetchResponse { .. } => (),
			}
		}

		classification.outstanding_requests = outstanding.len();
		if classification.outstanding_requests != 0 {
			tracing::warn!(
				"{} requests never received a response",
				classification.outstanding_requests
			);
		}

		classification
	}
}

/// Outstanding request
#[derive(Clone, Copy, Debug)]
struct OutstandingRequest {
	/// Request cycle
	cycle: u64,

	/// Block address
	block_addr: u64,
}

/// Output of [`Classifier::classify`]
#[derive(Clone, Default, Debug)]
pub struct Classification {
	/// Block addresses of all hits
	pub hits: Multiset<u64>,

	/// Block addresses of all misses
	pub misses: Multiset<u64>,

	/// Responses without a matching request
	pub unmatched_responses: usize,

	/// Requests overwritten by a later request to the same address
	pub overwritten_requests: usize,

	/// Requests still without a response at the end of the trace
	pub outstanding_requests: usize,
}

impl Classification {
	/// Returns the number of matched request/response pairs
	pub fn matched_responses(&self) -> usize {
		self.hits.len() + self.misses.len()
	}

	/// Formats debug output to `f`.
	pub fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
		write!(
			f,
			"{} hits, {} misses, {} unmatched responses, {} overwritten requests, {} outstanding requests",
			self.hits.len(),
			self.misses.len(),
			self.unmatched_responses,
			self.overwritten_requests,
			self.outstanding_requests
		)
	}
}
