use std::io;
use thiserror::Error;

use crate::codec::CodecError;
use crate::platform::Platform;

/// Structural problems with the container itself.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Header magic is invalid (0x{0:016X})")]
    InvalidMagic(u64),
    #[error("FastFile version is invalid (0x{found:08x}, but expected 0x{expected:08x})")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("Section {index} declares {length} bytes but only {remaining} remain in the stream")]
    SectionOverrun { index: usize, length: u32, remaining: u64 },
}

/// Every way a decode run can fail. None of them are retried.
#[derive(Error, Debug)]
pub enum FastFileError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("No key material for platform {0}")]
    UnsupportedPlatform(Platform),
    #[error("Section {index} failed to inflate: {source}")]
    Decompress {
        index: usize,
        #[source]
        source: CodecError,
    },
    #[error("Decoder already finished; create a new one to decode again")]
    Finished,
}

pub type Result<T> = std::result::Result<T, FastFileError>;
