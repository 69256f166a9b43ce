//! Utilities

// Modules
pub mod logger;

// Imports
use std::{cell::RefCell, fmt, num::ParseIntError};

/// Extension trait for `str` to parse trace address fields
#[extend::ext(name = ParseHexAddr)]
pub impl str {
	/// Parses this string as a hexadecimal address.
	///
	/// Accepts either case and an optional `0x` prefix.
	fn parse_hex_addr(&self) -> Result<u64, ParseIntError> {
		let digits = self
			.strip_prefix("0x")
			.or_else(|| self.strip_prefix("0X"))
			.unwrap_or(self);
		u64::from_str_radix(digits, 16)
	}
}

/// [`fmt::Display`] helper to display using a `FnMut(&mut fmt::Formatter)`
pub struct DisplayWrapper<F: FnMut(&mut fmt::Formatter) -> fmt::Result>(RefCell<F>);

impl<F: FnMut(&mut fmt::Formatter) -> fmt::Result> DisplayWrapper<F> {
	/// Creates a new display wrapper
	#[must_use]
	pub const fn new(func: F) -> Self {
		Self(RefCell::new(func))
	}
}


impl<F: FnMut(&mut fmt::Formatter) -> fmt::Result> fmt::Display for DisplayWrapper<F> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		// Note: `f` cannot be re-entrant, so this cannot fail
		self.0.borrow_mut()(f)
	}
}
