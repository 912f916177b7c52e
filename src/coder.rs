//! Integer arithmetic coding with bit-plus-follow renormalization.
//!
//! The classic Witten–Neal–Cleary construction, widened to a 32-bit code
//! value: the message narrows an integer interval `[low, high]`, equal
//! leading bits of both bounds are emitted as they settle, and straddle
//! states near the midpoint are deferred with a pending-bit counter. The
//! encoder and decoder never exchange probabilities: each side queries
//! the shared adaptive [`Model`] for the current cumulative-frequency
//! table, so the two stay in lockstep only while every coded symbol (the
//! secret preamble included) matches.
//!
//! All interval arithmetic is u64: `range * hi` reaches 2^62 when a
//! preamble table holds nearly the whole frequency mass.

use crate::bits::{BitSink, BitSource};
use crate::error::{Error, Result};
use crate::model::{Model, SYMBOL_COUNT};

/// Width of the code-value registers in bits.
pub const CODE_VALUE_BITS: u32 = 32;
/// Largest code value.
pub const TOP_VALUE: u64 = (1 << CODE_VALUE_BITS) - 1;
/// Lower quartile boundary of the code-value range.
pub const FIRST_QUARTER: u64 = TOP_VALUE / 4 + 1;
/// Midpoint of the code-value range.
pub const HALF: u64 = 2 * FIRST_QUARTER;
/// Upper quartile boundary of the code-value range.
pub const THIRD_QUARTER: u64 = 3 * FIRST_QUARTER;

/// Streaming arithmetic encoder.
#[derive(Debug)]
pub struct ArithmeticEncoder {
    low: u64,
    high: u64,
    pending: u64,
}

impl ArithmeticEncoder {
    /// Create an encoder over the full code-value interval.
    pub fn new() -> Self {
        Self {
            low: 0,
            high: TOP_VALUE,
            pending: 0,
        }
    }

    /// Narrow the interval by one symbol under the model's current table.
    pub fn encode(&mut self, model: &Model, symbol: usize, sink: &mut BitSink) {
        let table = model.current();
        let total = table.total();
        let lo = table.prefix_sum(symbol);
        let hi = table.prefix_sum(symbol + 1);

        let range = self.high - self.low + 1;
        self.high = self.low + range * hi / total - 1;
        self.low += range * lo / total;

        loop {
            if self.high < HALF {
                self.bit_plus_follow(0, sink);
            } else if self.low >= HALF {
                self.bit_plus_follow(1, sink);
                self.low -= HALF;
                self.high -= HALF;
            } else if self.low >= FIRST_QUARTER && self.high < THIRD_QUARTER {
                self.pending += 1;
                self.low -= FIRST_QUARTER;
                self.high -= FIRST_QUARTER;
            } else {
                break;
            }
            self.low <<= 1;
            self.high = (self.high << 1) + 1;
        }
    }

    /// Emit the disambiguating tail bits. Call once, after the EOF symbol.
    pub fn finish(mut self, sink: &mut BitSink) {
        self.pending += 1;
        if self.low < FIRST_QUARTER {
            self.bit_plus_follow(0, sink);
        } else {
            self.bit_plus_follow(1, sink);
        }
    }

    fn bit_plus_follow(&mut self, bit: u8, sink: &mut BitSink) {
        sink.write_bit(bit);
        while self.pending > 0 {
            sink.write_bit(1 - bit);
            self.pending -= 1;
        }
    }
}

impl Default for ArithmeticEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Streaming arithmetic decoder.
#[derive(Debug)]
pub struct ArithmeticDecoder {
    low: u64,
    high: u64,
    value: u64,
}

impl ArithmeticDecoder {
    /// Create a decoder and load the initial code value.
    ///
    /// # Errors
    /// Returns [`Error::InputExhausted`] when the input cannot supply the
    /// first `CODE_VALUE_BITS` bits even with padding tolerance.
    pub fn new(source: &mut BitSource<'_>) -> Result<Self> {
        let mut value = 0u64;
        for _ in 0..CODE_VALUE_BITS {
            value = (value << 1) | u64::from(source.read_bit()?);
        }
        Ok(Self {
            low: 0,
            high: TOP_VALUE,
            value,
        })
    }

    /// Decode one symbol under the model's current table.
    ///
    /// # Errors
    /// Returns [`Error::BadCompressed`] when the code value has drifted
    /// outside the working interval (a desynchronized stream), or
    /// [`Error::InputExhausted`] when the source fails.
    pub fn decode(&mut self, model: &Model, source: &mut BitSource<'_>) -> Result<usize> {
        if self.value < self.low || self.value > self.high {
            return Err(Error::BadCompressed);
        }
        let table = model.current();
        let total = table.total();
        let range = self.high - self.low + 1;

        let cum = ((self.value - self.low + 1) * total - 1) / range;
        let symbol = table.rank_query(cum);
        debug_assert!(symbol < SYMBOL_COUNT);

        let lo = table.prefix_sum(symbol);
        let hi = table.prefix_sum(symbol + 1);
        self.high = self.low + range * hi / total - 1;
        self.low += range * lo / total;

        loop {
            if self.high < HALF {
                // both bounds in the lower half: nothing to subtract
            } else if self.low >= HALF {
                self.value -= HALF;
                self.low -= HALF;
                self.high -= HALF;
            } else if self.low >= FIRST_QUARTER && self.high < THIRD_QUARTER {
                self.value -= FIRST_QUARTER;
                self.low -= FIRST_QUARTER;
                self.high -= FIRST_QUARTER;
            } else {
                break;
            }
            self.low <<= 1;
            self.high = (self.high << 1) + 1;
            self.value = (self.value << 1) + u64::from(source.read_bit()?);
        }
        Ok(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EOF_SYMBOL;

    fn roundtrip(data: &[u8], step: u64) -> Vec<u8> {
        let mut model = Model::new(step).unwrap();
        let mut sink = BitSink::new();
        let mut encoder = ArithmeticEncoder::new();
        for &b in data {
            encoder.encode(&model, b as usize, &mut sink);
            model.update(b as usize);
        }
        encoder.encode(&model, EOF_SYMBOL, &mut sink);
        encoder.finish(&mut sink);
        let bytes = sink.finish();

        let mut model = Model::new(step).unwrap();
        let mut source = BitSource::new(&bytes);
        let mut decoder = ArithmeticDecoder::new(&mut source).unwrap();
        let mut out = Vec::new();
        loop {
            let symbol = decoder.decode(&model, &mut source).unwrap();
            if symbol == EOF_SYMBOL {
                break;
            }
            out.push(symbol as u8);
            model.update(symbol);
        }
        out
    }

    #[test]
    fn test_roundtrip_text() {
        let data = b"the quick brown fox jumps over the lazy dog";
        assert_eq!(roundtrip(data, 256), data);
    }

    #[test]
    fn test_roundtrip_empty() {
        assert_eq!(roundtrip(b"", 256), b"");
    }

    #[test]
    fn test_roundtrip_all_byte_values() {
        let data: Vec<u8> = (0..=255).collect();
        assert_eq!(roundtrip(&data, 256), data);
    }

    #[test]
    fn test_repetitive_input_compresses() {
        let data = vec![b'A'; 4096];
        let mut model = Model::new(4096).unwrap();
        let mut sink = BitSink::new();
        let mut encoder = ArithmeticEncoder::new();
        for &b in &data {
            encoder.encode(&model, b as usize, &mut sink);
            model.update(b as usize);
        }
        encoder.encode(&model, EOF_SYMBOL, &mut sink);
        encoder.finish(&mut sink);
        assert!(sink.finish().len() < 200);
    }

    #[test]
    fn test_decoder_rejects_empty_input() {
        let mut source = BitSource::new(&[]);
        assert!(ArithmeticDecoder::new(&mut source).is_err());
    }
}
