//! Prefetcher evaluator (`pfeval`)
//!
//! Evaluates a cache prefetcher by comparing a simulation trace captured
//! with prefetching enabled against one captured without it.

// Modules
pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod correlator;
pub mod data;
pub mod metrics;
pub mod multiset;
pub mod trace;

// Exports
pub use self::{
	analyzer::{Analyzer, Report},
	classifier::{Classification, Classifier, Thresholds},
	config::Config,
	correlator::{Correlation, CorrelationCounters, Correlator},
	metrics::Metrics,
	multiset::Multiset,
	trace::{Event, EventKind, Trace},
};
