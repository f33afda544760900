//! Per-codec drivers: the public entry points the benchmarking harness
//! calls.
//!
//! Each driver sequences its kernels in dependency order, owns every piece
//! of per-call scratch (released by RAII on all exit paths), measures
//! wall-clock time around the compute stages only, and computes the
//! `CompressionResult` record. Stream-header assembly and destination
//! copies sit outside the timed interval so the metrics report pure
//! compute throughput.
//!
//! All three stream formats are little-endian and begin with the original
//! input length as a u64, so a decoder can size its output up front.

use std::time::Instant;

use rayon::prelude::*;

use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::kernels::histogram::{self, NUM_SYMBOLS};
use crate::kernels::lattice::LATTICE_DIM;
use crate::kernels::vq::{self, QuantizedBlock, BLOCK_SIZE};
use crate::kernels::{match_finder, range, token};
use crate::types::{Algorithm, CompressionResult};
use crate::utils::{bytes_to_typed_vec, read_u32_le, read_u64_le, typed_slice_to_bytes};

//==================================================================================
// 1. Shared Driver Plumbing
//==================================================================================

/// Runs `work` on the configured thread pool: the global rayon pool when
/// `threads` is 0 (auto), otherwise a scoped pool of exactly that size.
fn run_with_pool<R, F>(threads: usize, work: F) -> Result<R, CodecError>
where
    R: Send,
    F: FnOnce() -> Result<R, CodecError> + Send,
{
    if threads == 0 {
        return work();
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| CodecError::Allocation(format!("worker pool creation failed: {}", e)))?;
    pool.install(work)
}

/// Copies a finished stream into a caller-supplied destination, reporting
/// the true required size instead of ever writing past the boundary.
fn copy_into_destination(stream: &[u8], destination: &mut [u8]) -> Result<usize, CodecError> {
    if stream.len() > destination.len() {
        return Err(CodecError::DestinationTooSmall {
            required: stream.len(),
            available: destination.len(),
        });
    }
    destination[..stream.len()].copy_from_slice(stream);
    Ok(stream.len())
}

fn finish_metrics(
    algorithm: Algorithm,
    original_size: usize,
    stream_len: usize,
    elapsed: std::time::Duration,
) -> CompressionResult {
    let result = CompressionResult::measure(
        algorithm,
        original_size as u64,
        stream_len as u64,
        elapsed,
    );
    log::debug!(
        "{}: {} -> {} bytes in {:.3} ms (ratio {:.3})",
        algorithm,
        result.original_size,
        result.compressed_size,
        result.elapsed_ms,
        result.ratio
    );
    log_metric!(
        "event" = "compress",
        "algorithm" = algorithm,
        "ratio" = &result.ratio,
        "throughput_gbps" = &result.throughput_gbps,
    );
    result
}

fn usize_field(value: u64, what: &str) -> Result<usize, CodecError> {
    value
        .try_into()
        .map_err(|_| CodecError::CorruptStream(format!("{} {} overflows usize", what, value)))
}

//==================================================================================
// 2. Range Codec Driver
//==================================================================================

/// Fixed header: orig_len(8) + chunk_size(4) + num_chunks(4) + freq table.
const RANGE_HEADER_LEN: usize = 16 + NUM_SYMBOLS * 4;

/// Driver for the range (arithmetic) entropy coder.
pub struct RangeCodec {
    config: CodecConfig,
}

impl RangeCodec {
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Compresses `input` into a self-describing stream.
    ///
    /// Stage order: parallel histogram, CDF scan, then independent per-chunk
    /// serial narrowing loops running in parallel across chunks.
    pub fn compress(&self, input: &[u8]) -> Result<(Vec<u8>, CompressionResult), CodecError> {
        if input.is_empty() {
            let result = finish_metrics(Algorithm::Range, 0, 0, std::time::Duration::ZERO);
            return Ok((Vec::new(), result));
        }
        let chunk_size = self.config.range_chunk_size;
        if chunk_size == 0 {
            return Err(CodecError::RangeError(
                "range chunk size must be non-zero".to_string(),
            ));
        }

        let (freq, payloads, elapsed) = run_with_pool(self.config.threads, || {
            let started = Instant::now();
            let freq = histogram::count_frequencies(input);
            let norm = range::normalize_frequencies(&freq)?;
            let cdf = histogram::build_cdf(&norm);

            let payloads: Vec<Vec<u8>> = input
                .par_chunks(chunk_size)
                .map(|chunk| {
                    let mut buf = Vec::new();
                    range::encode_chunk(chunk, &cdf, &mut buf)?;
                    Ok(buf)
                })
                .collect::<Result<_, CodecError>>()?;
            Ok((freq, payloads, started.elapsed()))
        })?;

        let payload_total: usize = payloads.iter().map(|p| p.len()).sum();
        let mut stream =
            Vec::with_capacity(RANGE_HEADER_LEN + payloads.len() * 4 + payload_total);
        stream.extend_from_slice(&(input.len() as u64).to_le_bytes());
        stream.extend_from_slice(&(chunk_size as u32).to_le_bytes());
        stream.extend_from_slice(&(payloads.len() as u32).to_le_bytes());
        stream.extend_from_slice(&typed_slice_to_bytes(&freq));
        for payload in &payloads {
            stream.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        }
        for payload in &payloads {
            stream.extend_from_slice(payload);
        }

        let result = finish_metrics(Algorithm::Range, input.len(), stream.len(), elapsed);
        Ok((stream, result))
    }

    /// Compresses into a caller-supplied buffer; on truncation the error
    /// carries the true required size and nothing is written.
    pub fn compress_into(
        &self,
        input: &[u8],
        destination: &mut [u8],
    ) -> Result<(usize, CompressionResult), CodecError> {
        let (stream, result) = self.compress(input)?;
        let written = copy_into_destination(&stream, destination)?;
        Ok((written, result))
    }

    /// Decodes a stream produced by `compress`.
    pub fn decompress(&self, stream: &[u8]) -> Result<Vec<u8>, CodecError> {
        if stream.is_empty() {
            return Ok(Vec::new());
        }
        let original_len = usize_field(read_u64_le(stream, 0)?, "original length")?;
        let chunk_size = read_u32_le(stream, 8)? as usize;
        let num_chunks = read_u32_le(stream, 12)? as usize;
        if chunk_size == 0 {
            return Err(CodecError::CorruptStream(
                "range stream declares a zero chunk size".to_string(),
            ));
        }
        if num_chunks != original_len.div_ceil(chunk_size) {
            return Err(CodecError::CorruptStream(format!(
                "range stream declares {} chunks for {} bytes",
                num_chunks, original_len
            )));
        }

        let freq_bytes = stream.get(16..RANGE_HEADER_LEN).ok_or_else(|| {
            CodecError::CorruptStream("truncated frequency table".to_string())
        })?;
        let freq_vec: Vec<u32> = bytes_to_typed_vec(freq_bytes)?;
        let freq: [u32; NUM_SYMBOLS] = freq_vec
            .try_into()
            .map_err(|_| CodecError::Internal("frequency table length".to_string()))?;
        let total: u64 = freq.iter().map(|&c| c as u64).sum();
        if total != original_len as u64 {
            return Err(CodecError::CorruptStream(format!(
                "frequency table sums to {} but stream holds {} bytes",
                total, original_len
            )));
        }

        let mut offset = RANGE_HEADER_LEN;
        let mut chunk_lens = Vec::with_capacity(num_chunks);
        for _ in 0..num_chunks {
            chunk_lens.push(read_u32_le(stream, offset)? as usize);
            offset += 4;
        }
        let payload_total: usize = chunk_lens.iter().sum();
        if offset + payload_total != stream.len() {
            return Err(CodecError::CorruptStream(format!(
                "range payload length mismatch: header says {}, stream has {}",
                payload_total,
                stream.len() - offset
            )));
        }

        // The decoder renormalizes the exact table the same deterministic
        // way the encoder did.
        let norm = range::normalize_frequencies(&freq)?;
        let cdf = histogram::build_cdf(&norm);

        let mut chunk_spans = Vec::with_capacity(num_chunks);
        for (index, &len) in chunk_lens.iter().enumerate() {
            let symbols = chunk_size.min(original_len - index * chunk_size);
            chunk_spans.push((offset, len, symbols));
            offset += len;
        }

        let decoded_chunks = run_with_pool(self.config.threads, || {
            chunk_spans
                .par_iter()
                .map(|&(start, len, symbols)| {
                    let mut buf = Vec::new();
                    range::decode_chunk(&stream[start..start + len], &cdf, symbols, &mut buf)?;
                    Ok(buf)
                })
                .collect::<Result<Vec<Vec<u8>>, CodecError>>()
        })?;

        let mut output = Vec::with_capacity(original_len);
        for chunk in decoded_chunks {
            output.extend_from_slice(&chunk);
        }
        Ok(output)
    }
}

impl Default for RangeCodec {
    fn default() -> Self {
        Self::new()
    }
}

//==================================================================================
// 3. LZ77 Codec Driver
//==================================================================================

/// Fixed header: orig_len(8) + token_count(4).
const LZ77_HEADER_LEN: usize = 12;

/// Driver for the hash-chain LZ77 codec.
pub struct Lz77Codec {
    config: CodecConfig,
}

impl Lz77Codec {
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Compresses `input` into a token stream.
    ///
    /// Stage order: sequential chain-index construction, parallel
    /// per-position match search, then the sequential greedy token scan.
    pub fn compress(&self, input: &[u8]) -> Result<(Vec<u8>, CompressionResult), CodecError> {
        if input.is_empty() {
            let result = finish_metrics(Algorithm::Lz77, 0, 0, std::time::Duration::ZERO);
            return Ok((Vec::new(), result));
        }

        let (tokens, elapsed) = run_with_pool(self.config.threads, || {
            let started = Instant::now();
            let index = match_finder::build_chain_index(input);
            let matches = match_finder::find_matches(input, &index);
            let tokens = token::emit_tokens(input, &matches);
            Ok((tokens, started.elapsed()))
        })?;

        let mut stream = Vec::with_capacity(LZ77_HEADER_LEN + tokens.len() * 4);
        stream.extend_from_slice(&(input.len() as u64).to_le_bytes());
        stream.extend_from_slice(&(tokens.len() as u32).to_le_bytes());
        stream.extend_from_slice(&typed_slice_to_bytes(&tokens));

        let result = finish_metrics(Algorithm::Lz77, input.len(), stream.len(), elapsed);
        Ok((stream, result))
    }

    /// Compresses into a caller-supplied buffer; on truncation the error
    /// carries the true required size and nothing is written.
    pub fn compress_into(
        &self,
        input: &[u8],
        destination: &mut [u8],
    ) -> Result<(usize, CompressionResult), CodecError> {
        let (stream, result) = self.compress(input)?;
        let written = copy_into_destination(&stream, destination)?;
        Ok((written, result))
    }

    /// Replays a token stream back into the original bytes (lossless).
    pub fn decompress(&self, stream: &[u8]) -> Result<Vec<u8>, CodecError> {
        if stream.is_empty() {
            return Ok(Vec::new());
        }
        let original_len = usize_field(read_u64_le(stream, 0)?, "original length")?;
        let token_count = read_u32_le(stream, 8)? as usize;

        let payload = stream.get(LZ77_HEADER_LEN..).ok_or_else(|| {
            CodecError::CorruptStream("truncated token payload".to_string())
        })?;
        if payload.len() != token_count * 4 {
            return Err(CodecError::CorruptStream(format!(
                "token payload holds {} bytes, header declares {} tokens",
                payload.len(),
                token_count
            )));
        }
        let tokens: Vec<u32> = bytes_to_typed_vec(payload)?;
        token::decode_tokens(&tokens, original_len)
    }
}

impl Default for Lz77Codec {
    fn default() -> Self {
        Self::new()
    }
}

//==================================================================================
// 4. E8 Lattice Codec Driver
//==================================================================================

/// Fixed header: orig_len(8).
const E8_HEADER_LEN: usize = 8;

/// Bytes per block on the wire: root index + 8 residual words.
const E8_BLOCK_WIRE_LEN: usize = 1 + LATTICE_DIM * 2;

/// Driver for the lossy E8 lattice vector quantizer.
pub struct E8Codec {
    config: CodecConfig,
}

impl E8Codec {
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Quantizes `input` against the E8 root set.
    ///
    /// The input is zero-padded to a whole number of 64-byte blocks; the
    /// padding never counts toward `original_size` in the metrics.
    pub fn compress(&self, input: &[u8]) -> Result<(Vec<u8>, CompressionResult), CodecError> {
        if input.is_empty() {
            let result = finish_metrics(Algorithm::E8Lattice, 0, 0, std::time::Duration::ZERO);
            return Ok((Vec::new(), result));
        }

        let (blocks, elapsed) = run_with_pool(self.config.threads, || {
            let started = Instant::now();
            let blocks = vq::quantize_blocks(input);
            Ok((blocks, started.elapsed()))
        })?;

        let mut stream =
            Vec::with_capacity(E8_HEADER_LEN + blocks.len() * E8_BLOCK_WIRE_LEN);
        stream.extend_from_slice(&(input.len() as u64).to_le_bytes());
        for block in &blocks {
            stream.push(block.root_index);
        }
        for block in &blocks {
            stream.extend_from_slice(&typed_slice_to_bytes(&block.residual));
        }

        let result = finish_metrics(Algorithm::E8Lattice, input.len(), stream.len(), elapsed);
        Ok((stream, result))
    }

    /// Compresses into a caller-supplied buffer; on truncation the error
    /// carries the true required size and nothing is written.
    pub fn compress_into(
        &self,
        input: &[u8],
        destination: &mut [u8],
    ) -> Result<(usize, CompressionResult), CodecError> {
        let (stream, result) = self.compress(input)?;
        let written = copy_into_destination(&stream, destination)?;
        Ok((written, result))
    }

    /// Lossy reconstruction: each block decodes to its root plus the
    /// quantization-bounded residual, never the exact original bytes.
    pub fn decompress(&self, stream: &[u8]) -> Result<Vec<u8>, CodecError> {
        if stream.is_empty() {
            return Ok(Vec::new());
        }
        let original_len = usize_field(read_u64_le(stream, 0)?, "original length")?;
        let num_blocks = original_len.div_ceil(BLOCK_SIZE);
        let expected = E8_HEADER_LEN + num_blocks * E8_BLOCK_WIRE_LEN;
        if stream.len() != expected {
            return Err(CodecError::CorruptStream(format!(
                "lattice stream holds {} bytes, {} blocks need {}",
                stream.len(),
                num_blocks,
                expected
            )));
        }

        let indices = &stream[E8_HEADER_LEN..E8_HEADER_LEN + num_blocks];
        let residual_words: Vec<u16> =
            bytes_to_typed_vec(&stream[E8_HEADER_LEN + num_blocks..])?;

        let mut output = Vec::with_capacity(num_blocks * BLOCK_SIZE);
        for (block_index, &root_index) in indices.iter().enumerate() {
            if root_index as usize >= crate::kernels::lattice::NUM_ROOTS {
                return Err(CodecError::LatticeError(format!(
                    "root index {} out of range",
                    root_index
                )));
            }
            let mut residual = [0u16; LATTICE_DIM];
            residual.copy_from_slice(
                &residual_words[block_index * LATTICE_DIM..(block_index + 1) * LATTICE_DIM],
            );
            let block = QuantizedBlock {
                root_index,
                residual,
            };
            vq::reconstruct_block(&block, &mut output);
        }
        output.truncate(original_len);
        Ok(output)
    }
}

impl Default for E8Codec {
    fn default() -> Self {
        Self::new()
    }
}
