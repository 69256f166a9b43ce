//! Multiset

// Imports
use std::{collections::BTreeMap, fmt};

/// Multiset of values.
///
/// Stores a count per distinct value, iterating in value order.
#[derive(PartialEq, Eq, Clone)]
pub struct Multiset<T> {
	/// Occurrences of each value.
	///
	/// Invariant: No count is `0`.
	counts: BTreeMap<T, usize>,

	/// Total occurrences
	len: usize,
}

impl<T: Ord> Multiset<T> {
	/// Creates a new, empty, multiset
	pub fn new() -> Self {
		Self {
			counts: BTreeMap::new(),
			len:    0,
		}
	}

	/// Adds an occurrence of `value`
	pub fn insert(&mut self, value: T) {
		*self.counts.entry(value).or_insert(0) += 1;
		self.len += 1;
	}

	/// Removes a single occurrence of `value`.
	///
	/// Returns whether an occurrence existed.
	pub fn remove_one(&mut self, value: &T) -> bool {
		let Some(count) = self.counts.get_mut(value) else {
			return false;
		};

		*count -= 1;
		if *count == 0 {
			self.counts.remove(value);
		}
		self.len -= 1;

		true
	}

	/// Returns if at least one occurrence of `value` exists
	pub fn contains(&self, value: &T) -> bool {
		self.counts.contains_key(value)
	}

	/// Returns the occurrences of `value`
	pub fn count(&self, value: &T) -> usize {
		self.counts.get(value).copied().unwrap_or(0)
	}

	/// Returns the total occurrences
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns if there are no occurrences
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Returns the number of distinct values
	pub fn distinct_len(&self) -> usize {
		self.counts.len()
	}

	/// Returns all distinct values along with their occurrences
	pub fn counts(&self) -> impl Iterator<Item = (&T, usize)> + '_ {
		self.counts.iter().map(|(value, &count)| (value, count))
	}

	/// Returns all occurrences, with repeated values yielded repeatedly
	pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
		self.counts
			.iter()
			.flat_map(|(value, &count)| std::iter::repeat(value).take(count))
	}
}

impl<T: Ord + Clone> Multiset<T> {
	/// Returns the multiset difference `self - other`.
	///
	/// Each occurrence in `other` removes at most one occurrence from `self`.
	pub fn difference(&self, other: &Self) -> Self {
		let mut output = self.clone();
		for (value, count) in other.counts() {
			for _ in 0..count {
				if !output.remove_one(value) {
					break;
				}
			}
		}

		output
	}
}

impl<T: Ord> Default for Multiset<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Ord> Extend<T> for Multiset<T> {
	fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
		for value in iter {
			self.insert(value);
		}
	}
}

impl<T: Ord> FromIterator<T> for Multiset<T> {
	fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
		let mut multiset = Self::new();
		multiset.extend(iter);
		multiset
	}
}

impl<T: fmt::Debug> fmt::Debug for Multiset<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.counts.iter()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn insert_remove() {
		let mut set = Multiset::new();
		set.insert(0xb0);
		set.insert(0xb0);
		set.insert(0xc0);
		assert_eq!(set.len(), 3);
		assert_eq!(set.distinct_len(), 2);
		assert_eq!(set.count(&0xb0), 2);

		assert!(set.remove_one(&0xb0));
		assert_eq!(set.count(&0xb0), 1);
		assert!(set.remove_one(&0xb0));
		assert!(!set.contains(&0xb0));
		assert!(!set.remove_one(&0xb0));
		assert_eq!(set.len(), 1);
	}

	#[test]
	fn difference_removes_once_per_occurrence() {
		let lhs = [1, 1, 1, 2, 3].into_iter().collect::<Multiset<u64>>();
		let rhs = [1, 1, 3, 3, 4].into_iter().collect::<Multiset<u64>>();

		let diff = lhs.difference(&rhs);
		assert_eq!(diff.iter().copied().collect::<Vec<_>>(), [1, 2]);
		assert_eq!(diff.len(), 2);

		// Note: The operands are untouched
		assert_eq!(lhs.len(), 5);
		assert_eq!(rhs.len(), 5);
	}

	#[test]
	fn iter_is_ordered() {
		let set = [3, 1, 2, 1].into_iter().collect::<Multiset<u64>>();
		assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 1, 2, 3]);
		assert_eq!(set.counts().collect::<Vec<_>>(), [(&1, 2), (&2, 1), (&3, 1)]);
	}
}
