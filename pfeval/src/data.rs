//! Output data

// Imports
use crate::{analyzer::Report, Classification, Thresholds};

/// Output data
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ReportData {
	pub thresholds: Thresholds,
	pub baseline:   ClassificationData,
	pub treated:    ClassificationData,
	pub prefetches: PrefetchData,
	pub metrics:    MetricsData,
}

/// Classification output data
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ClassificationData {
	pub hits:                 usize,
	pub misses:               usize,
	pub unmatched_responses:  usize,
	pub overwritten_requests: usize,
	pub outstanding_requests: usize,
}

/// Prefetch output data
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct PrefetchData {
	pub misses_prevented:             usize,
	pub sent:                         usize,
	pub responses_received:           usize,
	pub unique_responses:             usize,
	pub unmatched_responses:          usize,
	pub useful:                       usize,
	pub no_response:                  usize,
	pub unused_acknowledged:          usize,
	pub useless:                      usize,
	pub timeliness_samples:           usize,
	pub timeliness_cycle_sum:         i128,

	// Note: Sorted by block address, with repeats
	pub remaining_baseline_misses:    Vec<u64>,
	pub unexplained_new_treated_hits: Vec<u64>,
}

/// Metrics output data.
///
/// Metrics that aren't applicable are `null`.
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct MetricsData {
	pub coverage:              Option<f64>,
	pub accuracy_all:          Option<f64>,
	pub accuracy_acknowledged: Option<f64>,
	pub timeliness:            Option<f64>,
}

impl From<&Report> for ReportData {
	fn from(report: &Report) -> Self {
		let counters = &report.correlation.counters;
		Self {
			thresholds: report.thresholds,
			baseline:   ClassificationData::from(&report.baseline),
			treated:    ClassificationData::from(&report.treated),
			prefetches: PrefetchData {
				misses_prevented:             counters.misses_prevented,
				sent:                         counters.prefetches_sent,
				responses_received:           counters.prefetch_responses_received,
				unique_responses:             counters.unique_prefetch_responses,
				unmatched_responses:          counters.unmatched_prefetch_responses,
				useful:                       counters.useful_prefetches,
				no_response:                  counters.no_response_prefetches(),
				unused_acknowledged:          counters.unused_acknowledged_prefetches(),
				useless:                      counters.useless_prefetches(),
				timeliness_samples:           counters.timeliness_sample_count,
				timeliness_cycle_sum:         counters.timeliness_cycle_sum,
				remaining_baseline_misses:    report.correlation.remaining_baseline_misses.iter().copied().collect(),
				unexplained_new_treated_hits: report.correlation.new_treated_hits.iter().copied().collect(),
			},
			metrics:    MetricsData {
				coverage:              report.metrics.coverage,
				accuracy_all:          report.metrics.accuracy_all,
				accuracy_acknowledged: report.metrics.accuracy_acknowledged,
				timeliness:            report.metrics.timeliness,
			},
		}
	}
}

impl From<&Classification> for ClassificationData {
	fn from(classification: &Classification) -> Self {
		Self {
			hits:                 classification.hits.len(),
			misses:               classification.misses.len(),
			unmatched_responses:  classification.unmatched_responses,
			overwritten_requests: classification.overwritten_requests,
			outstanding_requests: classification.outstanding_requests,
		}
	}
}
