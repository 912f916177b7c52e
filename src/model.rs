//! Order-1 adaptive symbol model.
//!
//! One Fenwick table per previous-symbol context: after coding symbol `s`,
//! the table for context `s` predicts the next symbol. Literal slots start
//! at weight 128 so the model is near-uniform until it has seen data; the
//! end-of-stream symbol keeps a floor weight of 1 the whole time.
//!
//! The model also owns the preamble mechanism: a scratch table holding
//! almost the entire frequency mass on one expected symbol. Coding through
//! it costs close to zero bits, but the decoder must install the *same*
//! table, built from the same secret material, or its interval drifts
//! and never recovers. The scratch table is selected by an enum tag; the
//! per-context tables are never aliased or mutated for preamble work.

use crate::error::{Error, Result};
use crate::fenwick::FenwickTable;

/// Alphabet size: 256 literals, one reserved slot, one EOF symbol.
pub const SYMBOL_COUNT: usize = 258;
/// Index of the end-of-stream symbol.
pub const EOF_SYMBOL: usize = 257;
/// Index of the reserved slot. Never coded; removing it would shift
/// [`EOF_SYMBOL`] and break stream compatibility.
pub const RESERVED_SYMBOL: usize = 256;
/// Upper bound on any table total.
pub const MAX_FREQUENCY: u64 = (1 << 30) - 1;
/// Divisor applied when a context total outgrows [`MAX_FREQUENCY`].
pub const SCALE_VALUE: u64 = 1 << 14;

const INITIAL_LITERAL_WEIGHT: u64 = 128;
const MAGIC_WEIGHT: u64 = MAX_FREQUENCY - SYMBOL_COUNT as u64;

fn initial_counts() -> Vec<u64> {
    let mut counts = vec![INITIAL_LITERAL_WEIGHT; SYMBOL_COUNT];
    counts[RESERVED_SYMBOL] = 1;
    counts[EOF_SYMBOL] = 1;
    counts
}

#[derive(Debug, Clone, Copy)]
enum Active {
    Context(usize),
    Preamble,
}

/// Adaptive order-1 model with a swappable preamble table.
#[derive(Debug)]
pub struct Model {
    contexts: Vec<FenwickTable>,
    totals: Vec<u64>,
    preamble: FenwickTable,
    active: Active,
    prev: Option<usize>,
    step: u64,
}

impl Model {
    /// Build a fresh model.
    ///
    /// `step` is the adaptation increment added to a symbol's count on
    /// every update; larger steps adapt faster and compress repetitive
    /// input harder.
    ///
    /// # Errors
    /// Returns [`Error::ModelOverflow`] if the initial table total or the
    /// step itself exceeds [`MAX_FREQUENCY`], since the frequency
    /// invariant could then never hold.
    pub fn new(step: u64) -> Result<Self> {
        debug_assert!(step > 0);
        let counts = initial_counts();
        let template = FenwickTable::from_counts(&counts);
        let total = template.total();
        if total > MAX_FREQUENCY || step > MAX_FREQUENCY {
            return Err(Error::ModelOverflow);
        }
        Ok(Self {
            contexts: vec![template.clone(); SYMBOL_COUNT],
            totals: vec![total; SYMBOL_COUNT],
            preamble: template,
            active: Active::Context(0),
            prev: None,
            step,
        })
    }

    /// The table the coder must use for the next symbol.
    pub fn current(&self) -> &FenwickTable {
        match self.active {
            Active::Context(c) => &self.contexts[c],
            Active::Preamble => &self.preamble,
        }
    }

    /// Record `symbol` and select its context for the next symbol.
    ///
    /// The update lands in the context that predicted `symbol`: the
    /// previous symbol's context, or `symbol`'s own when there is no
    /// previous symbol in this phase.
    pub fn update(&mut self, symbol: usize) {
        debug_assert!(symbol < SYMBOL_COUNT);
        let context = self.prev.unwrap_or(symbol);
        if self.totals[context] > MAX_FREQUENCY {
            self.contexts[context].scale(SCALE_VALUE);
            self.totals[context] = self.contexts[context].total();
        }
        self.contexts[context].add(symbol, self.step as i64);
        self.totals[context] += self.step;
        self.prev = Some(symbol);
        self.active = Active::Context(symbol);
    }

    /// Install the preamble table for one expected symbol.
    ///
    /// With no previous preamble byte the scratch table is rebuilt: every
    /// slot 1, the expected slot near the whole mass. With a previous byte
    /// the already-exposed scratch table is repointed in place: the old
    /// slot drops back to 1, the new slot takes the mass.
    ///
    /// # Errors
    /// Returns [`Error::ModelOverflow`] if the resulting total exceeds
    /// [`MAX_FREQUENCY`].
    pub fn set_symbol_magic(&mut self, symbol: usize, prev: Option<usize>) -> Result<()> {
        debug_assert!(symbol < SYMBOL_COUNT);
        match prev {
            None => {
                let mut counts = vec![1u64; SYMBOL_COUNT];
                counts[symbol] = MAGIC_WEIGHT;
                self.preamble = FenwickTable::from_counts(&counts);
                self.active = Active::Preamble;
            }
            Some(p) => {
                self.preamble.set(p, 1);
                self.preamble.set(symbol, MAGIC_WEIGHT);
            }
        }
        if self.preamble.total() > MAX_FREQUENCY {
            return Err(Error::ModelOverflow);
        }
        Ok(())
    }

    /// Rebuild every context table to its initial shape and clear the
    /// previous-symbol state. Runs between preamble phases and before the
    /// payload so both ends restart from identical statistics.
    pub fn reset(&mut self) {
        let counts = initial_counts();
        let template = FenwickTable::from_counts(&counts);
        let total = template.total();
        for context in &mut self.contexts {
            *context = template.clone();
        }
        for t in &mut self.totals {
            *t = total;
        }
        self.prev = None;
        self.active = Active::Context(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_total() {
        let model = Model::new(256).unwrap();
        assert_eq!(model.current().total(), 256 * 128 + 2);
    }

    #[test]
    fn test_update_bumps_predicting_context() {
        let mut model = Model::new(256).unwrap();
        model.update(b'a' as usize);
        // no previous symbol: the update lands in 'a''s own context,
        // which is also the context now selected
        assert_eq!(model.current().get(b'a' as usize), 128 + 256);

        model.update(b'b' as usize);
        // 'b' was predicted by context 'a'; context 'b' is now current
        // and still pristine
        assert_eq!(model.current().get(b'b' as usize), 128);
        model.update(b'a' as usize);
        assert_eq!(model.current().get(b'b' as usize), 128 + 256);
    }

    #[test]
    fn test_magic_table_shape() {
        let mut model = Model::new(256).unwrap();
        model.set_symbol_magic(7, None).unwrap();
        let table = model.current();
        assert_eq!(table.get(7), MAX_FREQUENCY - SYMBOL_COUNT as u64);
        assert_eq!(table.get(8), 1);
        // 257 slots of weight 1 plus the magic slot
        assert_eq!(table.total(), MAX_FREQUENCY - 1);

        model.set_symbol_magic(9, Some(7)).unwrap();
        let table = model.current();
        assert_eq!(table.get(7), 1);
        assert_eq!(table.get(9), MAX_FREQUENCY - SYMBOL_COUNT as u64);
        assert_eq!(table.total(), MAX_FREQUENCY - 1);
    }

    #[test]
    fn test_magic_same_symbol_twice() {
        let mut model = Model::new(256).unwrap();
        model.set_symbol_magic(5, None).unwrap();
        model.set_symbol_magic(5, Some(5)).unwrap();
        assert_eq!(model.current().get(5), MAX_FREQUENCY - SYMBOL_COUNT as u64);
    }

    #[test]
    fn test_reset_restores_initial_shape() {
        let mut model = Model::new(256).unwrap();
        model.update(1);
        model.update(2);
        model.set_symbol_magic(3, None).unwrap();
        model.reset();
        assert_eq!(model.current().total(), 256 * 128 + 2);
        assert_eq!(model.current().get(1), 128);
    }

    #[test]
    fn test_rescale_trigger() {
        let step = 1 << 29;
        let mut model = Model::new(step).unwrap();
        model.update(0);
        model.update(0);
        model.update(0);
        // by the third update the context-0 total had crossed
        // MAX_FREQUENCY and was rescaled before the increment
        assert!(model.current().total() <= MAX_FREQUENCY + step);
        for i in 0..SYMBOL_COUNT {
            assert!(model.current().get(i) >= 1);
        }
    }

    #[test]
    fn test_oversized_step_rejected() {
        assert!(matches!(
            Model::new(MAX_FREQUENCY + 1),
            Err(Error::ModelOverflow)
        ));
    }
}
