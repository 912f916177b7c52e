//! LZW byte-to-code transform with a bounded dictionary.
//!
//! A front-end for the arithmetic coder: repetitive input collapses into
//! 16-bit phrase codes before entropy coding sees it. The dictionary is
//! capped; when it fills, the encoder emits the in-band reset code
//! [`EOB_CODE`] and both ends rebuild their initial dictionaries.
//!
//! Dictionaries are kept in compact form. The encoder keys phrases as
//! `(parent_code, extension_byte)` pairs, so extending the current match
//! by one byte is a single map probe with no byte-sequence copies. The
//! decoder mirrors that with a flat entry arena and materializes a phrase
//! by walking parent links.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Maximum number of dictionary entries, the empty phrase included.
pub const DICT_CAPACITY: usize = 1 << 15;
/// In-band code that resets both dictionaries. Doubles as the code of the
/// empty phrase, which only ever surfaces for empty input.
pub const EOB_CODE: u16 = 0;

const FIRST_FREE_CODE: usize = 257;

/// Byte-sequence to code dictionary coder.
#[derive(Debug)]
pub struct LzwEncoder {
    dict: HashMap<(u16, u8), u16>,
    size: usize,
}

impl LzwEncoder {
    /// Create an encoder with the initial dictionary.
    pub fn new() -> Self {
        let mut encoder = Self {
            dict: HashMap::new(),
            size: 0,
        };
        encoder.reset();
        encoder
    }

    fn reset(&mut self) {
        self.dict.clear();
        for b in 0..=255u8 {
            self.dict.insert((EOB_CODE, b), u16::from(b) + 1);
        }
        self.size = FIRST_FREE_CODE;
    }

    /// Transform bytes into a code sequence.
    pub fn encode(&mut self, data: &[u8]) -> Vec<u16> {
        let mut codes = Vec::new();
        let mut w: u16 = EOB_CODE; // current matched prefix, 0 = empty
        for &c in data {
            if self.size >= DICT_CAPACITY {
                codes.push(w);
                codes.push(EOB_CODE);
                self.reset();
                w = EOB_CODE;
            }
            match self.dict.get(&(w, c)) {
                Some(&code) => w = code,
                None => {
                    codes.push(w);
                    self.dict.insert((w, c), self.size as u16);
                    self.size += 1;
                    w = u16::from(c) + 1;
                }
            }
        }
        codes.push(w);
        codes
    }
}

impl Default for LzwEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    parent: u16,
    byte: u8,
    first: u8,
    len: u32,
}

/// Code to byte-sequence dictionary coder.
#[derive(Debug)]
pub struct LzwDecoder {
    entries: Vec<Entry>,
}

impl LzwDecoder {
    /// Create a decoder with the initial dictionary.
    pub fn new() -> Self {
        let mut decoder = Self {
            entries: Vec::with_capacity(DICT_CAPACITY),
        };
        decoder.reset();
        decoder
    }

    fn reset(&mut self) {
        self.entries.clear();
        // code 0: the empty phrase
        self.entries.push(Entry {
            parent: 0,
            byte: 0,
            first: 0,
            len: 0,
        });
        for b in 0..=255u8 {
            self.entries.push(Entry {
                parent: EOB_CODE,
                byte: b,
                first: b,
                len: 1,
            });
        }
    }

    fn emit(&self, code: u16, out: &mut Vec<u8>) {
        let start = out.len();
        let mut c = code;
        while c != EOB_CODE {
            let entry = self.entries[c as usize];
            out.push(entry.byte);
            c = entry.parent;
        }
        out[start..].reverse();
    }

    /// Transform a code sequence back into bytes.
    ///
    /// # Errors
    /// Returns [`Error::BadCompressed`] for any code outside the
    /// dictionary (beyond the one-step-ahead case) or a stream that
    /// extends the empty phrase.
    pub fn decode(&mut self, codes: &[u16]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut w: Option<u16> = None;
        for &code in codes {
            let Some(prev) = w else {
                // (re)initialize from the first code of a segment
                if (code as usize) >= self.entries.len() {
                    return Err(Error::BadCompressed);
                }
                self.emit(code, &mut out);
                w = Some(code);
                continue;
            };
            if code == EOB_CODE {
                self.reset();
                w = None;
                continue;
            }
            let known = (code as usize) < self.entries.len();
            let first = if known {
                self.entries[code as usize].first
            } else if (code as usize) == self.entries.len() && code as usize != DICT_CAPACITY {
                // the one code the encoder can use before we add it:
                // entry = w + w[0]
                let prev_entry = self.entries[prev as usize];
                if prev_entry.len == 0 {
                    return Err(Error::BadCompressed);
                }
                prev_entry.first
            } else {
                return Err(Error::BadCompressed);
            };

            let prev_entry = self.entries[prev as usize];
            if prev_entry.len == 0 {
                return Err(Error::BadCompressed);
            }
            if self.entries.len() < DICT_CAPACITY {
                self.entries.push(Entry {
                    parent: prev,
                    byte: first,
                    first: prev_entry.first,
                    len: prev_entry.len + 1,
                });
            }
            self.emit(code, &mut out);
            w = Some(code);
        }
        Ok(out)
    }
}

impl Default for LzwDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(data: &[u8]) -> Vec<u8> {
        let codes = LzwEncoder::new().encode(data);
        LzwDecoder::new().decode(&codes).unwrap()
    }

    #[test]
    fn test_single_byte_codes() {
        let codes = LzwEncoder::new().encode(b"A");
        assert_eq!(codes, vec![u16::from(b'A') + 1]);
        assert_eq!(roundtrip(b"A"), b"A");
    }

    #[test]
    fn test_empty_input_emits_empty_phrase() {
        let codes = LzwEncoder::new().encode(b"");
        assert_eq!(codes, vec![EOB_CODE]);
        assert_eq!(roundtrip(b""), b"");
    }

    #[test]
    fn test_classic_phrase() {
        assert_eq!(
            roundtrip(b"TOBEORNOTTOBEORTOBEORNOT"),
            b"TOBEORNOTTOBEORTOBEORNOT"
        );
    }

    #[test]
    fn test_kwkwk_case() {
        // "aaa" forces the decoder to resolve a code one step ahead of
        // its dictionary
        let codes = LzwEncoder::new().encode(b"aaa");
        assert_eq!(codes, vec![98, 257]);
        assert_eq!(roundtrip(b"aaa"), b"aaa");
        assert_eq!(roundtrip(b"aaaaaaaaaa"), b"aaaaaaaaaa");
    }

    #[test]
    fn test_phrase_growth() {
        let data = b"abababababababab".repeat(8);
        let codes = LzwEncoder::new().encode(&data);
        assert!(codes.len() < data.len() / 2);
        assert_eq!(LzwDecoder::new().decode(&codes).unwrap(), data);
    }

    #[test]
    fn test_out_of_range_code_rejected() {
        let mut decoder = LzwDecoder::new();
        assert!(decoder.decode(&[98, 300]).is_err());
    }

    #[test]
    fn test_forced_dictionary_reset() {
        // pseudo-random bytes fill the dictionary quickly: one new entry
        // per unmatched extension
        let mut state = 0x1234_5678u32;
        let data: Vec<u8> = (0..120_000)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 24) as u8
            })
            .collect();
        let mut encoder = LzwEncoder::new();
        let codes = encoder.encode(&data);
        assert!(codes.contains(&EOB_CODE), "expected an in-band reset");
        assert_eq!(LzwDecoder::new().decode(&codes).unwrap(), data);
    }
}
