//! This module contains the range (arithmetic) entropy-coding kernels.
//!
//! The coder is a byte-oriented carry-propagating range coder: a `(low,
//! range)` pair is narrowed symbol by symbol according to the cumulative
//! distribution, and high-order bytes are shifted out whenever `range` falls
//! below the 2^24 renormalization threshold. The narrowing state is
//! sequentially dependent, so one chunk is always encoded by one worker;
//! parallelism lives across chunks in the driver.
//!
//! The exact symbol histogram is the model, but a 32-bit `range` cannot
//! divide by totals that reach the input length, so the coder derives a
//! normalized distribution summing to `RANGE_NORM_TOTAL` (2^16). The
//! normalization is deterministic and is reapplied identically on the decode
//! side from the exact table carried in the stream header.

use crate::error::CodecError;
use crate::kernels::histogram::NUM_SYMBOLS;

/// Renormalization threshold: shift out a byte whenever `range` drops below.
pub(crate) const RANGE_TOP: u32 = 1 << 24;

/// Bit width of the normalized coding distribution.
pub(crate) const RANGE_NORM_BITS: u32 = 16;

/// Every normalized distribution sums to exactly this value.
pub(crate) const RANGE_NORM_TOTAL: u32 = 1 << RANGE_NORM_BITS;

/// Bytes the decoder consumes to prime its code register. The first is the
/// encoder's initial zero cache byte.
const CODE_PRIME_BYTES: usize = 5;

//==================================================================================
// 1. Frequency Normalization
//==================================================================================

/// Scales an exact frequency table to a distribution summing to
/// `RANGE_NORM_TOTAL`, keeping every present symbol at frequency >= 1.
///
/// The repair loop below resolves rounding drift against the most frequent
/// symbols, so the result is a pure function of the input table.
pub fn normalize_frequencies(freq: &[u32; NUM_SYMBOLS]) -> Result<[u32; NUM_SYMBOLS], CodecError> {
    let total: u64 = freq.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return Err(CodecError::RangeError(
            "cannot normalize an empty distribution".to_string(),
        ));
    }

    let mut norm = [0u32; NUM_SYMBOLS];
    let mut sum: u64 = 0;
    for (symbol, &count) in freq.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let scaled = ((count as u64 * RANGE_NORM_TOTAL as u64) / total).max(1);
        norm[symbol] = scaled as u32;
        sum += scaled;
    }

    let mut diff = RANGE_NORM_TOTAL as i64 - sum as i64;
    while diff != 0 {
        let idx = norm
            .iter()
            .enumerate()
            .max_by_key(|(_, &f)| f)
            .map(|(i, _)| i)
            .ok_or_else(|| CodecError::Internal("empty frequency table".to_string()))?;
        if diff > 0 {
            norm[idx] += diff as u32;
            diff = 0;
        } else {
            // Never reduce a symbol to zero; with at most 256 present
            // symbols the drift is far smaller than the largest slot.
            let take = (-diff).min(norm[idx] as i64 - 1);
            if take <= 0 {
                return Err(CodecError::Internal(
                    "frequency normalization cannot converge".to_string(),
                ));
            }
            norm[idx] -= take as u32;
            diff += take;
        }
    }
    Ok(norm)
}

//==================================================================================
// 2. Chunk Encoder
//==================================================================================

/// Serial range-encoder state for one chunk.
struct RangeEncoder<'a> {
    low: u64,
    range: u32,
    cache: u8,
    cache_size: u64,
    out: &'a mut Vec<u8>,
}

impl<'a> RangeEncoder<'a> {
    fn new(out: &'a mut Vec<u8>) -> Self {
        Self {
            low: 0,
            range: u32::MAX,
            cache: 0,
            cache_size: 1,
            out,
        }
    }

    /// Narrows the interval to the symbol's CDF slice.
    fn encode(&mut self, cum: u32, freq: u32) {
        let r = self.range >> RANGE_NORM_BITS;
        self.low += r as u64 * cum as u64;
        self.range = r * freq;
        while self.range < RANGE_TOP {
            self.range <<= 8;
            self.shift_low();
        }
    }

    /// Emits the settled high byte of `low`, propagating a pending carry
    /// through any run of 0xFF bytes held back in the cache.
    fn shift_low(&mut self) {
        if (self.low as u32) < 0xFF00_0000 || (self.low >> 32) != 0 {
            let carry = (self.low >> 32) as u8;
            let mut byte = self.cache;
            loop {
                self.out.push(byte.wrapping_add(carry));
                byte = 0xFF;
                self.cache_size -= 1;
                if self.cache_size == 0 {
                    break;
                }
            }
            self.cache = (self.low >> 24) as u8;
        }
        self.cache_size += 1;
        self.low = ((self.low as u32) << 8) as u64;
    }

    /// Flushes the remaining state; the decoder primes on these tail bytes.
    fn flush(&mut self) {
        for _ in 0..CODE_PRIME_BYTES {
            self.shift_low();
        }
    }
}

/// Encodes one chunk against a normalized CDF, appending to `output_buf`.
///
/// The CDF must be the exclusive prefix sum of a `normalize_frequencies`
/// table covering every symbol that appears in the chunk.
pub fn encode_chunk(
    chunk: &[u8],
    cdf: &[u32; NUM_SYMBOLS + 1],
    output_buf: &mut Vec<u8>,
) -> Result<(), CodecError> {
    let mut encoder = RangeEncoder::new(output_buf);
    for &byte in chunk {
        let cum = cdf[byte as usize];
        let freq = cdf[byte as usize + 1] - cum;
        if freq == 0 {
            return Err(CodecError::Internal(format!(
                "symbol {} absent from the coding distribution",
                byte
            )));
        }
        encoder.encode(cum, freq);
    }
    encoder.flush();
    Ok(())
}

//==================================================================================
// 3. Chunk Decoder
//==================================================================================

/// Serial range-decoder state for one chunk, symmetric to `RangeEncoder`.
struct RangeDecoder<'a> {
    input: &'a [u8],
    pos: usize,
    range: u32,
    code: u32,
}

impl<'a> RangeDecoder<'a> {
    fn new(input: &'a [u8]) -> Self {
        let mut decoder = Self {
            input,
            pos: 0,
            range: u32::MAX,
            code: 0,
        };
        for _ in 0..CODE_PRIME_BYTES {
            decoder.code = (decoder.code << 8) | decoder.next_byte();
        }
        decoder
    }

    /// Reads past the payload as zero, matching the encoder's flush padding.
    fn next_byte(&mut self) -> u32 {
        let byte = self.input.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        byte as u32
    }

    /// Selects the symbol whose CDF slice contains the current code value
    /// and narrows the interval the same way the encoder did.
    fn decode(&mut self, cdf: &[u32; NUM_SYMBOLS + 1]) -> u8 {
        let r = self.range >> RANGE_NORM_BITS;
        let value = (self.code / r).min(RANGE_NORM_TOTAL - 1);

        // Largest symbol whose cumulative start is <= value. Zero-frequency
        // symbols collapse to empty slices and are skipped naturally.
        let mut lo = 0usize;
        let mut hi = NUM_SYMBOLS;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if cdf[mid] <= value {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        let cum = cdf[lo];
        let freq = cdf[lo + 1] - cum;
        self.code -= r * cum;
        self.range = r * freq;
        while self.range < RANGE_TOP {
            self.code = (self.code << 8) | self.next_byte();
            self.range <<= 8;
        }
        lo as u8
    }
}

/// Decodes `num_symbols` bytes from one chunk payload into `output_buf`.
pub fn decode_chunk(
    payload: &[u8],
    cdf: &[u32; NUM_SYMBOLS + 1],
    num_symbols: usize,
    output_buf: &mut Vec<u8>,
) -> Result<(), CodecError> {
    if num_symbols == 0 {
        return Ok(());
    }
    if payload.is_empty() {
        return Err(CodecError::CorruptStream(
            "empty range chunk payload with symbols expected".to_string(),
        ));
    }
    output_buf.reserve(num_symbols);
    let mut decoder = RangeDecoder::new(payload);
    for _ in 0..num_symbols {
        output_buf.push(decoder.decode(cdf));
    }
    Ok(())
}
