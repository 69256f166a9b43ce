//! Configuration

// Imports
use {crate::Thresholds, anyhow::Context, std::io};

/// Configuration
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Classification thresholds
	pub thresholds: Thresholds,
}

impl Config {
	/// Parses a configuration from a json reader
	pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, anyhow::Error> {
		serde_json::from_reader(reader).context("Unable to parse config")
	}
}
