//! Fenwick (binary-indexed) cumulative-frequency tables.
//!
//! The adaptive model keeps one of these per symbol context. A Fenwick
//! tree answers prefix sums and point updates in O(log n), which is what
//! turns a 258-symbol adaptive model from O(n) per symbol into something
//! usable. `rank_query` walks the tree top-down by descending powers of
//! two, so locating the symbol that owns a cumulative value, the
//! decoder's hot path, is also O(log n).
//!
//! Counts are held as `u64`; callers keep every count at least 1 (the
//! rescaling here enforces it with the `| 1` step) so prefix sums stay
//! strictly increasing and rank queries are unambiguous.

/// A mutable cumulative-frequency table over a fixed-size alphabet.
#[derive(Debug, Clone)]
pub struct FenwickTable {
    // 1-based; tree[0] unused
    tree: Vec<u64>,
    size: usize,
}

impl FenwickTable {
    /// Build a table from per-slot counts in O(n).
    pub fn from_counts(counts: &[u64]) -> Self {
        let size = counts.len();
        let mut tree = vec![0u64; size + 1];
        tree[1..].copy_from_slice(counts);
        for i in 1..=size {
            let parent = i + (i & i.wrapping_neg());
            if parent <= size {
                tree[parent] += tree[i];
            }
        }
        Self { tree, size }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.size
    }

    /// True when the table has no slots.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Sum of the counts in slots `[0, index)`. `index` may be `len()`.
    pub fn prefix_sum(&self, index: usize) -> u64 {
        debug_assert!(index <= self.size);
        let mut i = index;
        let mut sum = 0u64;
        while i > 0 {
            sum += self.tree[i];
            i -= i & i.wrapping_neg();
        }
        sum
    }

    /// Sum of the counts in slots `[from, to)`.
    pub fn range_sum(&self, from: usize, to: usize) -> u64 {
        self.prefix_sum(to) - self.prefix_sum(from)
    }

    /// Sum over all slots.
    pub fn total(&self) -> u64 {
        self.prefix_sum(self.size)
    }

    /// Add `delta` to the count in one slot.
    pub fn add(&mut self, index: usize, delta: i64) {
        debug_assert!(index < self.size);
        let mut i = index + 1;
        while i <= self.size {
            self.tree[i] = self.tree[i].wrapping_add_signed(delta);
            i += i & i.wrapping_neg();
        }
    }

    /// Current count in one slot.
    pub fn get(&self, index: usize) -> u64 {
        self.range_sum(index, index + 1)
    }

    /// Overwrite the count in one slot.
    pub fn set(&mut self, index: usize, value: u64) {
        let current = self.get(index);
        self.add(index, value as i64 - current as i64);
    }

    /// Smallest index `i` such that `prefix_sum(i + 1) > value`.
    ///
    /// With all counts >= 1 this is the slot whose cumulative interval
    /// contains `value`; for `value >= total()` it returns `len()`.
    pub fn rank_query(&self, value: u64) -> usize {
        let mut pos = 0usize;
        let mut remaining = value;
        let mut mask = if self.size == 0 {
            0
        } else {
            1usize << (usize::BITS - 1 - self.size.leading_zeros())
        };
        while mask > 0 {
            let next = pos + mask;
            if next <= self.size && self.tree[next] <= remaining {
                remaining -= self.tree[next];
                pos = next;
            }
            mask >>= 1;
        }
        pos
    }

    /// Divide every count by `divisor`, forcing each result odd so no
    /// count drops to zero, and rebuild the tree.
    pub fn scale(&mut self, divisor: u64) {
        let mut counts = Vec::with_capacity(self.size);
        let mut previous = 0u64;
        for i in 1..=self.size {
            let cumulative = self.prefix_sum(i);
            counts.push(((cumulative - previous) / divisor) | 1);
            previous = cumulative;
        }
        self.tree[1..].copy_from_slice(&counts);
        for i in 1..=self.size {
            let parent = i + (i & i.wrapping_neg());
            if parent <= self.size {
                self.tree[parent] += self.tree[i];
            }
        }
    }
}
