//! High-level [`FastFileDecoder`] API — the primary embedding surface.
//!
//! ```no_run
//! use fastfile::archive::{decode_file, DecodeOptions};
//! use fastfile::crypto::KeyRegistry;
//!
//! // Writes patch_mp.ff.zone next to the input.
//! let summary = decode_file("patch_mp.ff", DecodeOptions::default(), &KeyRegistry::builtin())?;
//! println!("{} sections, {} bytes", summary.sections.len(), summary.total_out);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # State machine
//! `Start → HeaderValidated → TableInitialized → SectionLoop → Done`, with
//! any failure jumping straight to `Failed`. Both terminal states refuse a
//! second run.
//!
//! Sections are strictly sequential: each nonce depends on every earlier
//! digest folded into the same lane.

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::codec::decode_section;
use crate::crypto::{section_digest, KeyRegistry};
use crate::error::{FastFileError, FormatError, Result};
use crate::header::{Header, SECTIONS_OFFSET};
use crate::io_stream::{ByteOrder, ByteReader};
use crate::iv_table::{IvTable, LANES};
use crate::platform::{Magic, Platform};

/// Extension appended to the input path by [`decode_file`].
pub const OUTPUT_EXTENSION: &str = "zone";

// ── DecodeOptions ─────────────────────────────────────────────────────────────

/// Configuration for a decode run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Platform whose key decrypts the sections.
    pub source:       Platform,
    /// Version the header must declare.
    pub target:       Platform,
    pub source_order: ByteOrder,
    /// Recorded in the summary; section plaintext is written byte-for-byte.
    pub target_order: ByteOrder,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            source:       Platform::WiiU,
            target:       Platform::WiiU,
            source_order: ByteOrder::Big,
            target_order: ByteOrder::Big,
        }
    }
}

// ── Summary ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionReport {
    pub index:          usize,
    pub lane:           usize,
    pub compressed_len: u32,
    pub inflated_len:   usize,
}

/// What a successful run decoded.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeSummary {
    pub magic:        Magic,
    pub version:      u32,
    pub identifier:   String,
    pub target_order: ByteOrder,
    pub sections:     Vec<SectionReport>,
    pub total_out:    u64,
}

// ── DecoderState ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Start,
    HeaderValidated,
    TableInitialized,
    SectionLoop,
    Done,
    Failed,
}

// ── FastFileDecoder ───────────────────────────────────────────────────────────

pub struct FastFileDecoder<'k, R: Read + Seek> {
    reader:  ByteReader<R>,
    options: DecodeOptions,
    keys:    &'k KeyRegistry,
    state:   DecoderState,
}

impl<'k, R: Read + Seek> FastFileDecoder<'k, R> {
    pub fn new(reader: R, options: DecodeOptions, keys: &'k KeyRegistry) -> Result<Self> {
        Ok(Self {
            reader: ByteReader::new(reader, options.source_order)?,
            options,
            keys,
            state: DecoderState::Start,
        })
    }

    pub fn state(&self) -> DecoderState { self.state }

    /// Current offset in the input stream.
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.reader.position()?)
    }

    /// Decode every section into `out`, in order, then flush it.
    ///
    /// Any error leaves the decoder in [`DecoderState::Failed`]; bytes
    /// already handed to `out` are not considered a usable partial result.
    pub fn decode<W: Write>(&mut self, out: &mut W) -> Result<DecodeSummary> {
        if matches!(self.state, DecoderState::Done | DecoderState::Failed) {
            return Err(FastFileError::Finished);
        }
        match self.run(out) {
            Ok(summary) => {
                self.state = DecoderState::Done;
                Ok(summary)
            }
            Err(e) => {
                self.state = DecoderState::Failed;
                Err(e)
            }
        }
    }

    fn run<W: Write>(&mut self, out: &mut W) -> Result<DecodeSummary> {
        // Key lookup happens before any section I/O.
        let key = *self.keys.key_for(self.options.source)?;

        let header = Header::read(&mut self.reader, Some(self.options.target))?;
        self.state = DecoderState::HeaderValidated;
        info!(
            magic = ?header.magic,
            version = format_args!("0x{:02x}", header.version),
            name = %header.name(),
            "header accepted"
        );

        let mut table = IvTable::new(&header.identifier);
        if header.name().is_empty() {
            warn!("identifier is empty; IV table left zeroed");
        }
        self.state = DecoderState::TableInitialized;

        // The signature region is skipped; it cannot be verified without the
        // private key.
        if self.reader.len() < SECTIONS_OFFSET {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream ends inside the signature region",
            )
            .into());
        }
        self.reader.seek(SECTIONS_OFFSET)?;
        self.state = DecoderState::SectionLoop;

        let mut sections = Vec::new();
        let mut total_out = 0u64;
        let mut index = 0usize;

        loop {
            if self.reader.remaining()? == 0 {
                info!(sections = index, "reached end of stream");
                break;
            }
            let length = self.reader.read_u32()?;
            if length == 0 {
                info!(sections = index, "next section has size 0, stopping");
                break;
            }

            let remaining = self.reader.remaining()?;
            if u64::from(length) > remaining {
                return Err(FormatError::SectionOverrun { index, length, remaining }.into());
            }

            let mut data = self.reader.read_vec(length as usize)?;
            let digest = section_digest(&data);

            let lane = index % LANES;
            let nonce = table.seed_for(lane);
            let plain = decode_section(&mut data, &key, &nonce)
                .map_err(|source| FastFileError::Decompress { index, source })?;

            out.write_all(&plain)?;
            table.fold(lane, &digest);

            debug!(index, lane, compressed = length, inflated = plain.len(), "wrote section");
            total_out += plain.len() as u64;
            sections.push(SectionReport {
                index,
                lane,
                compressed_len: length,
                inflated_len:   plain.len(),
            });
            index += 1;
        }

        out.flush()?;
        Ok(DecodeSummary {
            magic:        header.magic,
            version:      header.version,
            identifier:   header.name(),
            target_order: self.options.target_order,
            sections,
            total_out,
        })
    }
}

// ── File helpers ──────────────────────────────────────────────────────────────

/// `<input>.zone`
pub fn output_path_for(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(OUTPUT_EXTENSION);
    PathBuf::from(name)
}

/// Decode `input` into `<input>.zone`.
pub fn decode_file<P: AsRef<Path>>(input: P, options: DecodeOptions, keys: &KeyRegistry) -> Result<DecodeSummary> {
    let input = input.as_ref();
    decode_file_to(input, &output_path_for(input), options, keys)
}

/// Decode `input` into `output`.
///
/// Sections are staged in a temporary file next to `output`, which only
/// replaces `output` once every section has decoded. A failed run leaves any
/// existing `output` untouched and creates nothing.
pub fn decode_file_to(input: &Path, output: &Path, options: DecodeOptions, keys: &KeyRegistry) -> Result<DecodeSummary> {
    let reader = BufReader::new(File::open(input)?);
    let mut decoder = FastFileDecoder::new(reader, options, keys)?;

    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut out = BufWriter::new(NamedTempFile::new_in(dir)?);
    let summary = decoder.decode(&mut out)?;

    let staged = out.into_inner().map_err(|e| e.into_error())?;
    staged.as_file().sync_all()?;
    staged.persist(output).map_err(|e| e.error)?;
    info!(output = %output.display(), bytes = summary.total_out, "decode complete");
    Ok(summary)
}

/// Read and return the header without checking its version.
pub fn inspect<R: Read + Seek>(reader: R, order: ByteOrder) -> Result<Header> {
    let mut reader = ByteReader::new(reader, order)?;
    Header::read(&mut reader, None)
}
