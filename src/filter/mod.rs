//! Counting membership filter.
//!
//! A counting variant of a Bloom filter: each of the `m` slots holds an
//! 8-bit counter instead of a single bit, which is what makes removal
//! well-defined. `contains` can report false positives at the usual
//! Bloom rate for `(m, k, n)` but never a false negative for a value
//! that was added and not since removed past its add count.

mod hashing;

pub use hashing::HashFamily;

use crate::config::FilterSpec;
use crate::error::{Error, Result};

/// Shared probabilistic set of URLs with add/contains/remove.
///
/// The structure itself is single-threaded; the server wraps the one
/// process-wide instance in a lock so that every multi-counter mutation
/// is atomic as a whole.
#[derive(Debug)]
pub struct CountingFilter {
    hashes: HashFamily,
    counters: Vec<u8>,
}

impl CountingFilter {
    /// Build a filter from its startup configuration.
    pub fn new(spec: &FilterSpec) -> Self {
        Self {
            hashes: HashFamily::new(spec.capacity, spec.seeds.clone()),
            counters: vec![0u8; spec.capacity],
        }
    }

    /// Insert `value`. Returns whether the value was already (probably)
    /// present before this call.
    ///
    /// Counters saturate at `u8::MAX` and never wrap.
    pub fn add(&mut self, value: &str) -> bool {
        let present = self.contains(value);
        for idx in self.hashes.indices(value) {
            self.counters[idx] = self.counters[idx].saturating_add(1);
        }
        present
    }

    /// Membership test: true iff every counter the value hashes to is
    /// non-zero.
    pub fn contains(&self, value: &str) -> bool {
        self.hashes.indices(value).all(|idx| self.counters[idx] > 0)
    }

    /// Remove one occurrence of `value`.
    ///
    /// All k counters are checked before any is touched: if one of them
    /// is already zero the value cannot be present, the call fails with
    /// [`Error::NotPresent`] and no counter changes. Decrements saturate
    /// at zero so a value whose indices collide with each other stays
    /// safe.
    pub fn remove(&mut self, value: &str) -> Result<()> {
        if !self.contains(value) {
            return Err(Error::NotPresent);
        }
        for idx in self.hashes.indices(value) {
            self.counters[idx] = self.counters[idx].saturating_sub(1);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterSpec;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn filter(capacity: usize, seeds: &[u64]) -> CountingFilter {
        CountingFilter::new(&FilterSpec {
            capacity,
            seeds: seeds.to_vec(),
        })
    }

    #[test]
    fn added_values_are_members() {
        let mut f = filter(4096, &[3, 11, 17, 29]);
        let urls = ["http://a.com", "http://b.com/x", "https://c.org/?q=1"];
        for url in urls {
            f.add(url);
        }
        for url in urls {
            assert!(f.contains(url), "{} lost after add", url);
        }
    }

    #[test]
    fn add_reports_prior_membership() {
        let mut f = filter(4096, &[3, 11, 17, 29]);
        assert!(!f.add("http://a.com"));
        assert!(f.add("http://a.com"));
    }

    #[test]
    fn remove_of_absent_value_fails_without_mutation() {
        let mut f = filter(4096, &[3, 11, 17, 29]);
        f.add("http://kept-1.com");
        f.add("http://kept-2.com");

        let err = f.remove("http://never-added.com").unwrap_err();
        assert!(matches!(err, Error::NotPresent));

        assert!(f.contains("http://kept-1.com"));
        assert!(f.contains("http://kept-2.com"));
    }

    #[test]
    fn remove_clears_membership() {
        let mut f = filter(1 << 16, &[3, 11, 17, 29]);
        f.add("http://a.com");
        assert!(f.contains("http://a.com"));

        f.remove("http://a.com").unwrap();
        assert!(!f.contains("http://a.com"));
    }

    #[test]
    fn double_add_needs_double_remove() {
        let mut f = filter(1 << 16, &[3, 11, 17, 29]);
        f.add("http://a.com");
        f.add("http://a.com");

        f.remove("http://a.com").unwrap();
        assert!(f.contains("http://a.com"), "one remove cleared two adds");

        f.remove("http://a.com").unwrap();
        assert!(!f.contains("http://a.com"));
        assert!(matches!(
            f.remove("http://a.com"),
            Err(Error::NotPresent)
        ));
    }

    #[test]
    fn counters_saturate_instead_of_wrapping() {
        let mut f = filter(64, &[5]);
        for _ in 0..300 {
            f.add("http://hot.com");
        }
        // a wrapped counter would have gone through zero and dropped membership
        assert!(f.contains("http://hot.com"));
        f.remove("http://hot.com").unwrap();
        assert!(f.contains("http://hot.com"));
    }

    #[test]
    fn false_positive_rate_within_bound() {
        // m = 10_000, k = 4, n = 1_000 gives a theoretical rate of
        // (1 - e^{-kn/m})^k ~= 1.2%; assert with a generous margin.
        let mut f = filter(10_000, &[3, 11, 17, 29]);
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..1_000 {
            let url = format!("http://member-{}.example/", rng.gen::<u64>());
            f.add(&url);
        }

        let probes = 10_000;
        let false_positives = (0..probes)
            .filter(|i| f.contains(&format!("http://probe-{}.example/", i)))
            .count();
        let rate = false_positives as f64 / probes as f64;
        assert!(rate < 0.05, "false positive rate {} exceeds bound", rate);
    }
}
