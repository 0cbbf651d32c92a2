//! The 3x10-bit packed word format.

use crate::error::{extent, require_len, KernelError, Result};

/// Fixed-width element type shared by every kernel.
pub type Elem = u32;

/// Bits per lane.
pub const LANE_BITS: u32 = 10;

/// Lanes per packed word.
pub const LANES: usize = 3;

/// Mask selecting one lane after shifting.
pub const LANE_MASK: Elem = (1 << LANE_BITS) - 1;

/// Largest value a lane can hold.
pub const MAX_LANE_VALUE: Elem = LANE_MASK;

/// Bits above the last lane. Zero in a well-formed word.
pub const RESERVED_MASK: Elem = !((1 << (LANE_BITS * LANES as u32)) - 1);

/// Decodes lane `lane` (0, 1 or 2) of a packed word.
#[inline(always)]
pub fn decode_lane(word: Elem, lane: usize) -> Elem {
    debug_assert!(lane < LANES);
    (word >> (LANE_BITS * lane as u32)) & LANE_MASK
}

/// Decodes all three lanes of a packed word, in lane order.
#[inline(always)]
pub fn unpack_word(word: Elem) -> [Elem; LANES] {
    [
        word & LANE_MASK,
        (word >> LANE_BITS) & LANE_MASK,
        (word >> (2 * LANE_BITS)) & LANE_MASK,
    ]
}

/// Encodes three lane values into one word.
///
/// Lanes wider than 10 bits are a producer bug; debug builds catch it, release
/// builds mask the excess away.
#[inline]
pub fn pack_word(lanes: [Elem; LANES]) -> Elem {
    debug_assert!(
        lanes.iter().all(|&v| v <= MAX_LANE_VALUE),
        "lane value out of range: {:?}",
        lanes
    );
    lanes
        .iter()
        .enumerate()
        .fold(0, |word, (lane, &v)| word | ((v & LANE_MASK) << (LANE_BITS * lane as u32)))
}

/// Like [`pack_word`] but reports an out-of-range lane instead of masking it.
pub fn try_pack_word(lanes: [Elem; LANES]) -> Result<Elem> {
    if let Some((index, &value)) = lanes.iter().enumerate().find(|(_, v)| **v > MAX_LANE_VALUE) {
        return Err(KernelError::LaneOverflow { value, index });
    }
    Ok(pack_word(lanes))
}

/// True if the reserved top bits of `word` are clear.
#[inline]
pub fn is_well_formed(word: Elem) -> bool {
    word & RESERVED_MASK == 0
}

/// Checks every word of a packed buffer for reserved bits.
pub fn validate_packed(words: &[Elem]) -> Result<()> {
    match words.iter().position(|&w| !is_well_formed(w)) {
        Some(index) => Err(KernelError::ReservedBits {
            index,
            word: words[index],
        }),
        None => Ok(()),
    }
}

/// Number of packed words needed for `cols` logical columns.
#[inline]
pub const fn packed_cols(cols: usize) -> usize {
    (cols + LANES - 1) / LANES
}

/// Packs a `rows x cols` matrix of lane values into `rows x packed_cols(cols)`
/// words.
///
/// Logical column `c` of each row lands in word `c / 3`, lane `c % 3`. A
/// trailing partial word is zero-filled.
pub fn pack_rows(values: &[Elem], rows: usize, cols: usize) -> Result<Vec<Elem>> {
    require_len("values", values.len(), extent(rows, cols)?)?;

    let words_per_row = packed_cols(cols);
    let mut out = vec![0; rows * words_per_row];

    for (i, (src, dst)) in values
        .chunks(cols.max(1))
        .zip(out.chunks_mut(words_per_row.max(1)))
        .take(rows)
        .enumerate()
    {
        for (j, word) in dst.iter_mut().enumerate() {
            let mut lanes = [0; LANES];
            for (lane, slot) in lanes.iter_mut().enumerate() {
                let c = j * LANES + lane;
                if c < cols {
                    *slot = src[c];
                }
            }
            *word = try_pack_word(lanes).map_err(|err| match err {
                KernelError::LaneOverflow { value, index } => KernelError::LaneOverflow {
                    value,
                    index: i * cols + j * LANES + index,
                },
                other => other,
            })?;
        }
    }

    Ok(out)
}

/// Inverse of [`pack_rows`]: expands `rows x packed_cols(cols)` words back into
/// `rows x cols` lane values.
pub fn unpack_rows(packed: &[Elem], rows: usize, cols: usize) -> Result<Vec<Elem>> {
    let words_per_row = packed_cols(cols);
    require_len("packed", packed.len(), extent(rows, words_per_row)?)?;

    let mut out = vec![0; extent(rows, cols)?];
    if cols == 0 {
        return Ok(out);
    }

    for (src, dst) in packed.chunks(words_per_row).zip(out.chunks_mut(cols)) {
        for (c, slot) in dst.iter_mut().enumerate() {
            *slot = decode_lane(src[c / LANES], c % LANES);
        }
    }

    Ok(out)
}

/// Zero-pads a plain query vector to the expanded length `3 * packed_cols`.
///
/// Queries built for `cols` logical columns must be padded this way before
/// being paired with a matrix produced by [`pack_rows`].
pub fn expand_vector(v: &[Elem], packed_cols: usize) -> Result<Vec<Elem>> {
    let len = extent(packed_cols, LANES)?;
    if v.len() > len {
        return Err(KernelError::DimensionMismatch(format!(
            "vector of length {} does not fit {} packed columns",
            v.len(),
            packed_cols
        )));
    }
    let mut out = v.to_vec();
    out.resize(len, 0);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_lanes() {
        let word = 7 | (512 << 10) | (1023 << 20);
        assert_eq!(decode_lane(word, 0), 7);
        assert_eq!(decode_lane(word, 1), 512);
        assert_eq!(decode_lane(word, 2), 1023);
        assert_eq!(unpack_word(word), [7, 512, 1023]);
    }

    #[test]
    fn test_decode_ignores_reserved_bits() {
        let word = 0xC000_0001;
        assert_eq!(unpack_word(word), [1, 0, 0]);
        assert!(!is_well_formed(word));
        assert!(is_well_formed(0x3FFF_FFFF));
    }

    #[test]
    fn test_pack_word_layout() {
        assert_eq!(pack_word([1, 0, 0]), 0x0000_0001);
        assert_eq!(pack_word([0, 1, 0]), 0x0000_0400);
        assert_eq!(pack_word([0, 0, 1]), 0x0010_0000);
        assert_eq!(pack_word([1023, 1023, 1023]), 0x3FFF_FFFF);
    }

    #[test]
    fn test_try_pack_word_overflow() {
        assert_eq!(
            try_pack_word([1, 1024, 0]),
            Err(KernelError::LaneOverflow {
                value: 1024,
                index: 1
            })
        );
    }

    #[test]
    fn test_validate_packed() {
        assert!(validate_packed(&[0, 0x3FFF_FFFF]).is_ok());
        assert_eq!(
            validate_packed(&[0, 1, 0x4000_0000]),
            Err(KernelError::ReservedBits {
                index: 2,
                word: 0x4000_0000
            })
        );
    }

    #[test]
    fn test_packed_cols() {
        assert_eq!(packed_cols(0), 0);
        assert_eq!(packed_cols(1), 1);
        assert_eq!(packed_cols(3), 1);
        assert_eq!(packed_cols(4), 2);
        assert_eq!(packed_cols(9), 3);
    }

    #[test]
    fn test_pack_rows_ragged() {
        // 2x4: the second word of each row only has one live lane
        let values = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let packed = pack_rows(&values, 2, 4).unwrap();

        assert_eq!(packed.len(), 4);
        assert_eq!(unpack_word(packed[0]), [1, 2, 3]);
        assert_eq!(unpack_word(packed[1]), [4, 0, 0]);
        assert_eq!(unpack_word(packed[2]), [5, 6, 7]);
        assert_eq!(unpack_word(packed[3]), [8, 0, 0]);

        assert_eq!(unpack_rows(&packed, 2, 4).unwrap(), values);
    }

    #[test]
    fn test_pack_rows_reports_flat_index() {
        let values = vec![0, 0, 0, 0, 2000, 0];
        assert_eq!(
            pack_rows(&values, 2, 3),
            Err(KernelError::LaneOverflow {
                value: 2000,
                index: 4
            })
        );
    }

    #[test]
    fn test_pack_rows_short_buffer() {
        assert!(matches!(
            pack_rows(&[1, 2, 3], 2, 2),
            Err(KernelError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_expand_vector() {
        assert_eq!(expand_vector(&[5, 6, 7, 8], 2).unwrap(), vec![5, 6, 7, 8, 0, 0]);
        assert!(expand_vector(&[1, 2, 3, 4], 1).is_err());
    }
}
