//! Analyzer

// Imports
use {
	crate::{
		classifier::{Classification, Classifier, Thresholds},
		correlator::{Correlation, Correlator},
		metrics::{MetricDisplay, Metrics},
		trace::Trace,
	},
	pfeval_util::DisplayWrapper,
	std::fmt,
};

/// Analyzer
#[derive(Clone, Debug)]
pub struct Analyzer {
	/// Classification thresholds
	thresholds: Thresholds,
}

impl Analyzer {
	/// Creates a new analyzer
	pub fn new(thresholds: Thresholds) -> Self {
		Self { thresholds }
	}

	/// Analyzes a trace with prefetching enabled against one without
	pub fn run(&self, prefetch_trace: &Trace, baseline_trace: &Trace) -> Report {
		let classifier = Classifier::new(self.thresholds);

		let baseline = classifier.classify(baseline_trace.events());
		tracing::debug!("Baseline: {}", DisplayWrapper::new(|f| baseline.fmt_debug(f)));

		let treated = classifier.classify(prefetch_trace.events());
		tracing::debug!("Treated: {}", DisplayWrapper::new(|f| treated.fmt_debug(f)));

		// Note: The prefetch trace must be fully classified before any
		//       prefetch can be correlated, so this is a second pass over it.
		let correlation = Correlator::new(&baseline, &treated).correlate(prefetch_trace.events());
		tracing::debug!("Correlation: {}", DisplayWrapper::new(|f| correlation.fmt_debug(f)));

		let metrics = Metrics::compute(&correlation.counters, treated.misses.len());

		Report {
			thresholds: self.thresholds,
			baseline,
			treated,
			correlation,
			metrics,
		}
	}
}

/// Output for [`Analyzer::run`]
#[derive(Clone, Debug)]
pub struct Report {
	/// Thresholds used
	pub thresholds: Thresholds,

	/// Classification of the trace without prefetching
	pub baseline: Classification,

	/// Classification of the trace with prefetching
	pub treated: Classification,

	/// Prefetch correlation
	pub correlation: Correlation,

	/// Metrics
	pub metrics: Metrics,
}

impl fmt::Display for Report {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "Misses without prefetcher: {}", self.baseline.misses.len())?;
		writeln!(f, "Misses with prefetcher: {}", self.treated.misses.len())?;
		writeln!(f, "Misses prevented: {}", self.correlation.counters.misses_prevented)?;
		writeln!(f, "Coverage: {}", MetricDisplay::percentage(self.metrics.coverage))?;
		writeln!(f, "Accuracy: {}", MetricDisplay::percentage(self.metrics.accuracy_all))?;
		writeln!(
			f,
			"Accuracy (acknowledged): {}",
			MetricDisplay::percentage(self.metrics.accuracy_acknowledged)
		)?;
		if self.metrics.timeliness.is_some() {
			writeln!(f, "Timeliness: {}", MetricDisplay::cycles(self.metrics.timeliness))?;
		}

		Ok(())
	}
}
