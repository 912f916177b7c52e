//! # Veil
//!
//! *Adaptive arithmetic coding with a key-bound coder state.*
//!
//! ## Intuition First
//!
//! An adaptive arithmetic coder is a machine whose output depends on
//! everything it has coded so far: every symbol nudges the frequency
//! tables, and the tables steer every bit that follows. Veil turns that
//! path-dependence into light obfuscation. Before the payload, both ends
//! code a *preamble* derived from a key, a PIN and an IV length, through
//! frequency tables rigged so the preamble costs almost nothing on the
//! wire. A decoder holding the same material replays the preamble and
//! lands in exactly the encoder's state. A decoder holding anything else
//! is left with an interval displaced by a few counts out of four
//! billion; renormalization doubles the displacement with every output
//! bit until the payload decodes to noise.
//!
//! ## The Problem
//!
//! Compression and obfuscation usually stack as two passes: compress,
//! then encrypt. When all that is wanted is keyed opacity rather than
//! proven confidentiality, a cipher pass costs machinery and destroys
//! none of the coder's own leverage. Folding the secret into the entropy
//! coder's state gets both effects from one pass.
//!
//! ## Historical Context
//!
//! ```text
//! 1951  Lehmer        Multiplicative congruential generators
//! 1984  Welch         LZW: dictionary coding in practice
//! 1987  Witten,
//!       Neal, Cleary  Arithmetic coding made implementable (CACM 30(6))
//! 1991  Fowler, Noll,
//!       Vo            FNV hashing
//! 1994  Fenwick       Binary-indexed trees for cumulative frequencies
//! ```
//!
//! ## Mathematical Formulation
//!
//! Each symbol $s$ with cumulative bounds $[\mathrm{lo}_s, \mathrm{hi}_s)$
//! out of a total $T$ narrows the working interval:
//!
//! ```text
//! high := low + range * hi_s / T - 1
//! low  := low + range * lo_s / T
//! ```
//!
//! Settled leading bits are emitted and the interval is rescaled by 2;
//! straddles around the midpoint are deferred with a pending-bit counter
//! (bit-plus-follow). The order-1 model conditions the bounds on the
//! previous symbol via one Fenwick table per context.
//!
//! ## Complexity Analysis
//!
//! - **Time**: $O(N \log S)$ for $N$ symbols over the $S = 258$-symbol
//!   alphabet; the Fenwick queries are the log factor.
//! - **Space**: $O(S^2)$ for the context tables (~540 KiB), plus buffers
//!   proportional to the input. Nothing streams; input and output are
//!   whole buffers.
//!
//! ## Failure Modes
//!
//! 1. **This is not a cipher.** No authentication, no indistinguishability
//!    argument, a key space folded to 32 bits. It raises the cost of
//!    casual inspection, nothing more.
//! 2. **Mismatched material is undetectable up front.** There is no MAC;
//!    a wrong key surfaces as empty output or garbage, never as a clean
//!    error.
//! 3. **No framing.** The byte stream does not record which pipeline
//!    (plain or LZW) produced it; the caller must know.
//!
//! ## Implementation Notes
//!
//! This crate provides:
//! - [`Codec`]: the keyed encode/decode pipelines, with an optional LZW
//!   front-end that splits 16-bit codes into separately-modeled half
//!   streams.
//! - [`FenwickTable`], [`Model`], [`ArithmeticEncoder`],
//!   [`ArithmeticDecoder`], [`LzwEncoder`], [`LzwDecoder`],
//!   [`LehmerPrng`], [`FnvHasher`]: the pieces, public for reuse and
//!   testing.
//!
//! ## References
//!
//! - Witten, I. H., Neal, R. M., Cleary, J. G. (1987). "Arithmetic Coding
//!   for Data Compression." Communications of the ACM 30(6).
//! - Fenwick, P. (1994). "A New Data Structure for Cumulative Frequency
//!   Tables." Software: Practice and Experience 24(3).
//! - Welch, T. (1984). "A Technique for High-Performance Data
//!   Compression." IEEE Computer 17(6).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bits;
pub mod codec;
pub mod coder;
pub mod error;
pub mod fenwick;
pub mod hash;
pub mod lzw;
pub mod model;
pub mod prng;

pub use bits::{BitSink, BitSource};
pub use codec::{Codec, DEFAULT_CODING_STEP};
pub use coder::{ArithmeticDecoder, ArithmeticEncoder};
pub use error::{DecodeError, EncodeError, Error};
pub use fenwick::FenwickTable;
pub use hash::{fnv1a, FnvHasher};
pub use lzw::{LzwDecoder, LzwEncoder};
pub use model::Model;
pub use prng::LehmerPrng;
