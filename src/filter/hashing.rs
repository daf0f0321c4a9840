/// Seeded family of hash functions over an index range.
///
/// One blake3 digest of the value yields two 64-bit halves `(h1, h2)`;
/// member `i` of the family maps the value to `(h1 + seed_i * h2) mod m`.
/// The same `(m, seeds)` configuration produces the same indices across
/// calls and across process restarts.
#[derive(Debug, Clone)]
pub struct HashFamily {
    m: usize,
    seeds: Vec<u64>,
}

impl HashFamily {
    pub fn new(m: usize, seeds: Vec<u64>) -> Self {
        debug_assert!(m > 0, "index range must be non-empty");
        debug_assert!(!seeds.is_empty(), "at least one hash seed required");
        Self { m, seeds }
    }

    /// Number of hash functions in the family.
    pub fn k(&self) -> usize {
        self.seeds.len()
    }

    /// The k indices for `value`, each in `[0, m)`, in seed order.
    pub fn indices<'a>(&'a self, value: &str) -> impl Iterator<Item = usize> + 'a {
        let digest = *blake3::hash(value.as_bytes()).as_bytes();
        let h1 = u64::from_le_bytes(digest[0..8].try_into().unwrap());
        let h2 = u64::from_le_bytes(digest[8..16].try_into().unwrap());
        let m = self.m as u64;
        self.seeds
            .iter()
            .map(move |&seed| (h1.wrapping_add(seed.wrapping_mul(h2)) % m) as usize)
    }
}
