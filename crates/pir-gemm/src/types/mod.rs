//! Element type, packed word format and the owned matrix.
//!
//! Every kernel operates on [`Elem`] (`u32`) buffers in one of two roles:
//!
//! - **Plain value**: an ordinary matrix or vector entry. Arithmetic wraps
//!   modulo 2^32.
//! - **Packed word**: three 10-bit lanes.
//!
//! ```text
//!  31 30 29          20 19          10 9            0
//! ┌─────┬──────────────┬──────────────┬──────────────┐
//! │ rsv │    lane 2    │    lane 1    │    lane 0    │
//! └─────┴──────────────┴──────────────┴──────────────┘
//! ```
//!
//! A packed matrix with `k` words per row is paired with an **expanded**
//! operand of `3k` entries per row: entry `3j + l` multiplies lane `l` of
//! word `j`.
//!
//! # Example
//!
//! ```rust
//! use pir_gemm::types::{pack_rows, unpack_word, expand_vector};
//!
//! // one row of four lane values packs into two words
//! let packed = pack_rows(&[1, 2, 3, 4], 1, 4).unwrap();
//! assert_eq!(unpack_word(packed[0]), [1, 2, 3]);
//! assert_eq!(unpack_word(packed[1]), [4, 0, 0]);
//!
//! // the matching query is padded to 3 entries per word
//! assert_eq!(expand_vector(&[1, 1, 1, 1], 2).unwrap().len(), 6);
//! ```

mod matrix;
mod packing;

pub use matrix::Matrix;
pub use packing::{
    decode_lane, expand_vector, is_well_formed, pack_rows, pack_word, packed_cols, try_pack_word,
    unpack_rows, unpack_word, validate_packed, Elem, LANES, LANE_BITS, LANE_MASK, MAX_LANE_VALUE,
    RESERVED_MASK,
};
