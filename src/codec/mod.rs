//! Section codec: Salsa20 decryption followed by raw DEFLATE inflation.
//!
//! # Stream format
//! Each section is an independent raw DEFLATE stream (no zlib header, no
//! Adler-32 trailer). The original encoder used a 13-bit window; a standard
//! 15-bit inflater reads those streams unchanged.
//!
//! # Output sizing
//! The output buffer starts at `compressed_len * INFLATE_RATIO` bytes. That
//! is an allocation guess only: the buffer grows when the guess is short and
//! the inflater's own `total_out` always decides where the plaintext ends.
//!
//! The codec is pure given (ciphertext, key, nonce). It knows nothing about
//! lanes or the IV table.

use flate2::{Decompress, FlushDecompress, Status};
use thiserror::Error;

use crate::crypto::{apply_keystream, Key, Nonce};

/// Initial output allocation as a multiple of the compressed length.
pub const INFLATE_RATIO: usize = 32;
/// Minimum growth step when the output guess turns out too small.
const GROW_STEP: usize = 16 * 1024;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Inflate error: {0}")]
    Inflate(String),
}

/// Decrypt `data` in place, then inflate it.
///
/// On return `data` holds the decrypted (still compressed) bytes.
pub fn decode_section(data: &mut [u8], key: &Key, nonce: &Nonce) -> Result<Vec<u8>, CodecError> {
    apply_keystream(key, nonce, data);
    inflate_raw(data)
}

/// Inflate a raw DEFLATE stream.
///
/// Stops at the end-of-stream marker, or when the input is exhausted and the
/// inflater cannot make further progress. Only a genuine stream error from
/// the inflater is reported as a failure.
pub fn inflate_raw(compressed: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut inflater = Decompress::new(false);
    let mut out = Vec::with_capacity(compressed.len().saturating_mul(INFLATE_RATIO).max(64));

    loop {
        if out.len() == out.capacity() {
            out.reserve(out.capacity().max(GROW_STEP));
        }

        let consumed = inflater.total_in() as usize;
        let produced = inflater.total_out();
        let status = inflater
            .decompress_vec(&compressed[consumed..], &mut out, FlushDecompress::None)
            .map_err(|e| CodecError::Inflate(e.to_string()))?;

        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::BufError => {
                let stalled = inflater.total_in() as usize == consumed
                    && inflater.total_out() == produced;
                if stalled && out.len() < out.capacity() {
                    break;
                }
            }
        }
    }

    debug_assert_eq!(out.len() as u64, inflater.total_out());
    Ok(out)
}
