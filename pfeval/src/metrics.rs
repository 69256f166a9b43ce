//! Prefetcher metrics

// Imports
use {crate::correlator::CorrelationCounters, std::fmt};

/// Prefetcher metrics.
///
/// Each metric is `None` when it isn't applicable, i.e. when its
/// denominator is zero.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Metrics {
	/// Percentage of misses prevented over all misses that could have been
	pub coverage: Option<f64>,

	/// Percentage of useful prefetches over all sent prefetches
	pub accuracy_all: Option<f64>,

	/// Percentage of useful prefetches over all distinct acknowledged prefetches
	pub accuracy_acknowledged: Option<f64>,

	/// Average cycles between a prefetch response and the access to its block
	pub timeliness: Option<f64>,
}

impl Metrics {
	/// Computes all metrics from the correlation counters and the number of
	/// misses with prefetching.
	pub fn compute(counters: &CorrelationCounters, treated_misses: usize) -> Self {
		let prevented = counters.misses_prevented;

		let timeliness = match counters.timeliness_sample_count {
			0 => None,
			samples => Some(counters.timeliness_cycle_sum as f64 / samples as f64),
		};

		Self {
			coverage: self::percentage(prevented, prevented + treated_misses),
			accuracy_all: self::percentage(prevented, prevented + counters.useless_prefetches()),
			accuracy_acknowledged: self::percentage(prevented, prevented + counters.unused_unique_prefetches()),
			timeliness,
		}
	}
}

/// Returns `numerator / denominator` as a percentage, if the denominator isn't zero
fn percentage(numerator: usize, denominator: usize) -> Option<f64> {
	match denominator {
		0 => None,
		_ => Some(100.0 * numerator as f64 / denominator as f64),
	}
}

/// Display wrapper for an optional metric
#[derive(Clone, Copy, Debug)]
pub struct MetricDisplay {
	/// Value
	value: Option<f64>,

	/// Unit suffix
	unit: &'static str,
}

impl MetricDisplay {
	/// Displays a percentage
	pub fn percentage(value: Option<f64>) -> Self {
		Self { value, unit: "%" }
	}

	/// Displays a number of cycles
	pub fn cycles(value: Option<f64>) -> Self {
		Self { value, unit: " cycles" }
	}
}

impl fmt::Display for MetricDisplay {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.value {
			Some(value) => write!(f, "{value:.2}{}", self.unit),
			None => write!(f, "n/a"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn all_useful() {
		let counters = CorrelationCounters {
			misses_prevented: 1,
			prefetches_sent: 1,
			prefetch_responses_received: 1,
			unique_prefetch_responses: 1,
			useful_prefetches: 1,
			timeliness_sample_count: 1,
			timeliness_cycle_sum: 1,
			..CorrelationCounters::default()
		};

		let metrics = Metrics::compute(&counters, 0);
		assert_eq!(metrics, Metrics {
			coverage:              Some(100.0),
			accuracy_all:          Some(100.0),
			accuracy_acknowledged: Some(100.0),
			timeliness:            Some(1.0),
		});
	}

	#[test]
	fn partial() {
		let counters = CorrelationCounters {
			misses_prevented: 1,
			prefetches_sent: 4,
			prefetch_responses_received: 2,
			unique_prefetch_responses: 2,
			useful_prefetches: 1,
			timeliness_sample_count: 4,
			timeliness_cycle_sum: -2,
			..CorrelationCounters::default()
		};

		let metrics = Metrics::compute(&counters, 3);
		assert_eq!(metrics.coverage, Some(25.0));
		assert_eq!(metrics.accuracy_all, Some(25.0));
		assert_eq!(metrics.accuracy_acknowledged, Some(50.0));
		assert_eq!(metrics.timeliness, Some(-0.5));
	}

	#[test]
	fn degenerate() {
		let metrics = Metrics::compute(&CorrelationCounters::default(), 0);
		assert_eq!(metrics, Metrics {
			coverage:              None,
			accuracy_all:          None,
			accuracy_acknowledged: None,
			timeliness:            None,
		});

		let metrics = Metrics::compute(&CorrelationCounters::default(), 5);
		assert_eq!(metrics.coverage, Some(0.0));
	}

	#[test]
	fn display() {
		assert_eq!(MetricDisplay::percentage(Some(62.5)).to_string(), "62.50%");
		assert_eq!(MetricDisplay::percentage(Some(100.0 / 3.0)).to_string(), "33.33%");
		assert_eq!(MetricDisplay::percentage(None).to_string(), "n/a");
		assert_eq!(MetricDisplay::cycles(Some(-3.0)).to_string(), "-3.00 cycles");
	}
}
