//! Prefetch correlator
//!
//! Decides which prefetches of the prefetch-enabled trace turned a would-be
//! miss into a hit.

// Imports
use {
	crate::{
		classifier::Classification,
		trace::{Event, EventKind},
		Multiset,
	},
	std::{
		collections::{hash_map, HashMap, HashSet},
		fmt,
	},
};

/// Prefetch correlator
#[derive(Clone, Debug)]
pub struct Correlator {
	/// Treated hits that weren't hits without prefetching
	new_treated_hits: Multiset<u64>,

	/// Baseline misses that aren't still misses with prefetching
	remaining_baseline_misses: Multiset<u64>,
}

impl Correlator {
	/// Creates a new correlator from the classification of the baseline
	/// (no prefetch) trace and the treated (prefetch) trace.
	pub fn new(baseline: &Classification, treated: &Classification) -> Self {
		let new_treated_hits = treated.hits.difference(&baseline.hits);
		let remaining_baseline_misses = baseline.misses.difference(&treated.misses);
		tracing::debug!(
			new_treated_hits = new_treated_hits.len(),
			remaining_baseline_misses = remaining_baseline_misses.len(),
			"Trimmed classifications"
		);

		Self {
			new_treated_hits,
			remaining_baseline_misses,
		}
	}

	/// Correlates all prefetches of the treated trace `events`.
	///
	/// Every access to a block with a prefetch response records a timeliness
	/// sample, but each prefetch response is credited with at most one
	/// prevented miss, so that `misses_prevented <= prefetch_responses_received`.
	/// A later response to the same address may be credited again.
	pub fn correlate(self, events: &[Event]) -> Correlation {
		let Self {
			mut new_treated_hits,
			mut remaining_baseline_misses,
		} = self;

		let mut prefetches_sent = vec![];
		let mut prefetches_sent_addrs = HashSet::new();
		let mut prefetch_table = HashMap::<u64, PrefetchEntry>::new();
		let mut counters = CorrelationCounters::default();
		for event in events {
			match event.kind {
				EventKind::PrefetchRequest { addr } => {
					prefetches_sent.push(addr);
					prefetches_sent_addrs.insert(addr);
				},

				EventKind::PrefetchResponse { addr } => {
					if !prefetches_sent_addrs.contains(&addr) {
						tracing::debug!(addr, cycle = event.cycle, "Discarding unmatched prefetch response");
						counters.unmatched_prefetch_responses += 1;
						continue;
					}

					match prefetch_table.entry(addr) {
						hash_map::Entry::Occupied(mut entry) => {
							let entry = entry.get_mut();
							entry.cycle = event.cycle;
							entry.unclaimed_responses += 1;
						},
						hash_map::Entry::Vacant(entry) => {
							entry.insert(PrefetchEntry {
								cycle:               event.cycle,
								unclaimed_responses: 1,
							});
							counters.unique_prefetch_responses += 1;
						},
					}
					counters.prefetch_responses_received += 1;
				},

				EventKind::SnoopRequest { block_addr, .. } => {
					let Some(entry) = prefetch_table.get_mut(&block_addr) else {
						continue;
					};

					// Note: Negative if the prefetch only completed after the access
					let lead_time = i128::from(event.cycle) - i128::from(entry.cycle);
					counters.timeliness_cycle_sum += lead_time;
					counters.timeliness_sample_count += 1;

					// Note: Each response may only be credited with a single prevented miss
					if entry.unclaimed_responses > 0 &&
						remaining_baseline_misses.contains(&block_addr) &&
						new_treated_hits.contains(&block_addr)
					{
						remaining_baseline_misses.remove_one(&block_addr);
						new_treated_hits.remove_one(&block_addr);
						entry.unclaimed_responses -= 1;
						counters.misses_prevented += 1;
						counters.useful_prefetches += 1;
						tracing::trace!(block_addr, lead_time, "Prefetch prevented miss");
					}
				},

				EventKind::SnoopResponse { .. } => (),
			}
		}
		counters.prefetches_sent = prefetches_sent.len();

		Correlation {
			counters,
			prefetches_sent,
			new_treated_hits,
			remaining_baseline_misses,
		}
	}
}

/// Prefetch table entry
#[derive(Clone, Copy, Debug)]
struct PrefetchEntry {
	/// Most recent response cycle
	cycle: u64,

	/// Responses not yet credited with a prevented miss
	unclaimed_responses: usize,
}

/// Correlation counters
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
pub struct CorrelationCounters {
	/// Misses prevented by a prefetch
	pub misses_prevented: usize,

	/// Prefetches sent
	pub prefetches_sent: usize,

	/// Responses to sent prefetches
	pub prefetch_responses_received: usize,

	/// Distinct addresses of responses to sent prefetches
	pub unique_prefetch_responses: usize,

	/// Prefetches that prevented a miss
	pub useful_prefetches: usize,

	/// Prefetch responses to addresses never prefetched
	pub unmatched_prefetch_responses: usize,

	/// Accesses to a block after it was prefetched
	pub timeliness_sample_count: usize,

	/// Sum of cycles between each prefetch response and the access to its block
	pub timeliness_cycle_sum: i128,
}

impl CorrelationCounters {
	/// Returns the prefetches that never received a response
	pub fn no_response_prefetches(&self) -> usize {
		// Note: A prefetch may be answered more than once, so saturate
		self.prefetches_sent.saturating_sub(self.prefetch_responses_received)
	}

	/// Returns the prefetches that received a response, but weren't useful
	pub fn unused_acknowledged_prefetches(&self) -> usize {
		self.prefetch_responses_received.saturating_sub(self.useful_prefetches)
	}

	/// Returns all prefetches that weren't useful
	pub fn useless_prefetches(&self) -> usize {
		self.no_response_prefetches() + self.unused_acknowledged_prefetches()
	}

	/// Returns the distinct acknowledged prefetches that weren't useful
	pub fn unused_unique_prefetches(&self) -> usize {
		self.unique_prefetch_responses.saturating_sub(self.useful_prefetches)
	}
}

/// Output of [`Correlator::correlate`]
#[derive(Clone, Debug)]
pub struct Correlation {
	/// Counters
	pub counters: CorrelationCounters,

	/// Addresses of all sent prefetches, in trace order
	pub prefetches_sent: Vec<u64>,

	/// New treated hits left unexplained by any prefetch
	pub new_treated_hits: Multiset<u64>,

	/// Baseline misses left unprevented by any prefetch
	pub remaining_baseline_misses: Multiset<u64>,
}

impl Correlation {
	/// Formats debug output to `f`.
	pub fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
		let counters = &self.counters;
		write!(
			f,
			"{} prefetches sent, {} responses ({} unique, {} unmatched), {} useful, {} timeliness samples",
			counters.prefetches_sent,
			counters.prefetch_responses_received,
			counters.unique_prefetch_responses,
			counters.unmatched_prefetch_responses,
			counters.useful_prefetches,
			counters.timeliness_sample_count
		)
	}
}

#[cfg(test)]
mod tests {
	use {
		super::*,
		crate::{Classifier, Thresholds, Trace},
	};

	fn classification(hits: &[u64], misses: &[u64]) -> Classification {
		Classification {
			hits: hits.iter().copied().collect(),
			misses: misses.iter().copied().collect(),
			..Classification::default()
		}
	}

	fn parse(trace: &str) -> Trace {
		Trace::from_reader(trace.as_bytes()).unwrap()
	}

	const PREFETCH_TRACE: &str = "\
Cycle: 1 PrefetchAddr: b0
Cycle: 3 PrefetchRespAddr: b0
Cycle: 4 SnoopAddr: a0 SnoopBlock: b0
Cycle: 5 SnoopRespAddr: a0
";

	#[test]
	fn prefetch_prevents_miss() {
		let trace = parse(PREFETCH_TRACE);
		let baseline = classification(&[], &[0xb0]);
		let treated = Classifier::new(Thresholds::default()).classify(trace.events());
		assert_eq!(treated.hits.iter().copied().collect::<Vec<_>>(), [0xb0]);

		let correlation = Correlator::new(&baseline, &treated).correlate(trace.events());
		assert_eq!(correlation.counters, CorrelationCounters {
			misses_prevented:             1,
			prefetches_sent:              1,
			prefetch_responses_received:  1,
			unique_prefetch_responses:    1,
			useful_prefetches:            1,
			unmatched_prefetch_responses: 0,
			timeliness_sample_count:      1,
			timeliness_cycle_sum:         1,
		});
		assert_eq!(correlation.prefetches_sent, [0xb0]);
		assert!(correlation.remaining_baseline_misses.is_empty());
		assert!(correlation.new_treated_hits.is_empty());
	}

	#[test]
	fn unrequested_prefetch_response_is_ignored() {
		let trace = parse(
			"\
Cycle: 1 PrefetchRespAddr: b0
Cycle: 4 SnoopAddr: a0 SnoopBlock: b0
Cycle: 5 SnoopRespAddr: a0
",
		);
		let baseline = classification(&[], &[0xb0]);
		let treated = classification(&[0xb0], &[]);

		let correlation = Correlator::new(&baseline, &treated).correlate(trace.events());
		assert_eq!(correlation.counters.prefetch_responses_received, 0);
		assert_eq!(correlation.counters.unique_prefetch_responses, 0);
		assert_eq!(correlation.counters.unmatched_prefetch_responses, 1);
		assert_eq!(correlation.counters.misses_prevented, 0);
		assert_eq!(correlation.counters.timeliness_sample_count, 0);
	}

	#[test]
	fn baseline_hits_are_not_new_hits() {
		let trace = parse(PREFETCH_TRACE);
		let baseline = classification(&[0xb0], &[0xb0]);
		let treated = classification(&[0xb0], &[]);

		let correlation = Correlator::new(&baseline, &treated).correlate(trace.events());
		assert_eq!(correlation.counters.misses_prevented, 0);
		assert_eq!(correlation.counters.timeliness_sample_count, 1);
		assert_eq!(correlation.remaining_baseline_misses.len(), 1);
	}

	#[test]
	fn still_missing_is_not_prevented() {
		let trace = parse(PREFETCH_TRACE);
		let baseline = classification(&[], &[0xb0]);
		let treated = classification(&[0xb0], &[0xb0]);

		let correlation = Correlator::new(&baseline, &treated).correlate(trace.events());
		assert_eq!(correlation.counters.misses_prevented, 0);
	}

	#[test]
	fn miss_is_prevented_once() {
		let trace = parse(
			"\
Cycle: 1 PrefetchAddr: b0
Cycle: 3 PrefetchRespAddr: b0
Cycle: 4 SnoopAddr: a0 SnoopBlock: b0
Cycle: 5 SnoopRespAddr: a0
Cycle: 6 PrefetchRespAddr: b0
Cycle: 9 SnoopAddr: a0 SnoopBlock: b0
Cycle: 10 SnoopRespAddr: a0
",
		);
		let baseline = classification(&[], &[0xb0]);
		let treated = classification(&[0xb0, 0xb0], &[]);

		let correlation = Correlator::new(&baseline, &treated).correlate(trace.events());
		let counters = correlation.counters;
		assert_eq!(counters.misses_prevented, 1);
		assert_eq!(counters.prefetch_responses_received, 2);
		assert_eq!(counters.unique_prefetch_responses, 1);
		assert_eq!(counters.timeliness_sample_count, 2);
		assert_eq!(counters.timeliness_cycle_sum, (4 - 3) + (9 - 6));
		assert_eq!(counters.no_response_prefetches(), 0);
		assert_eq!(counters.unused_acknowledged_prefetches(), 1);
		assert_eq!(counters.useless_prefetches(), 1);
	}

	#[test]
	fn response_is_credited_once() {
		let trace = parse(
			"\
Cycle: 1 PrefetchAddr: b0
Cycle: 3 PrefetchRespAddr: b0
Cycle: 4 SnoopAddr: a0 SnoopBlock: b0
Cycle: 5 SnoopRespAddr: a0
Cycle: 9 SnoopAddr: a1 SnoopBlock: b0
Cycle: 10 SnoopRespAddr: a1
",
		);
		let baseline = classification(&[], &[0xb0, 0xb0]);
		let treated = classification(&[0xb0, 0xb0], &[]);

		let correlation = Correlator::new(&baseline, &treated).correlate(trace.events());
		assert_eq!(correlation.counters.misses_prevented, 1);
		assert_eq!(correlation.counters.timeliness_sample_count, 2);
		assert_eq!(correlation.remaining_baseline_misses.len(), 1);
	}

	#[test]
	fn late_prefetch_has_negative_lead_time() {
		let trace = parse(
			"\
Cycle: 1 PrefetchAddr: b0
Cycle: 2 SnoopAddr: a0 SnoopBlock: b0
Cycle: 6 PrefetchRespAddr: b0
Cycle: 7 SnoopRespAddr: a0
Cycle: 8 SnoopAddr: a1 SnoopBlock: b0
Cycle: 9 SnoopRespAddr: a1
",
		);
		let baseline = classification(&[], &[]);
		let treated = classification(&[0xb0, 0xb0], &[]);

		let correlation = Correlator::new(&baseline, &treated).correlate(trace.events());
		assert_eq!(correlation.counters.timeliness_sample_count, 1);
		assert_eq!(correlation.counters.timeliness_cycle_sum, 2);

		let trace = parse(
			"\
Cycle: 1 PrefetchAddr: b0
Cycle: 2 PrefetchRespAddr: b0
Cycle: 3 PrefetchAddr: b0
Cycle: 4 SnoopAddr: a0 SnoopBlock: b0
Cycle: 9 PrefetchRespAddr: b0
Cycle: 10 SnoopAddr: a0 SnoopBlock: b0
",
		);
		let correlation = Correlator::new(&baseline, &treated).correlate(trace.events());
		assert_eq!(correlation.counters.timeliness_sample_count, 2);
		assert_eq!(correlation.counters.timeliness_cycle_sum, (4 - 2) + (10 - 9));
	}

	#[test]
	fn unanswered_prefetches_are_useless() {
		let trace = parse(
			"\
Cycle: 1 PrefetchAddr: b0
Cycle: 1 PrefetchAddr: b1
Cycle: 1 PrefetchAddr: b2
Cycle: 3 PrefetchRespAddr: b0
",
		);
		let baseline = classification(&[], &[]);
		let treated = classification(&[], &[]);

		let counters = Correlator::new(&baseline, &treated).correlate(trace.events()).counters;
		assert_eq!(counters.prefetches_sent, 3);
		assert_eq!(counters.no_response_prefetches(), 2);
		assert_eq!(counters.unused_acknowledged_prefetches(), 1);
		assert_eq!(counters.useless_prefetches(), 3);
	}
}
