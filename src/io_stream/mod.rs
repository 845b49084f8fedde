//! Endian-aware primitive reader over a seekable FastFile stream.
//!
//! # Endianness
//! The container's byte order is declared by the caller, never inferred.
//! Every multi-byte read goes through `byteorder` with the declared order,
//! which is equivalent to swapping whenever the declared order differs from
//! the host's.
//!
//! Short reads surface as `io::ErrorKind::UnexpectedEof`; the decoder treats
//! them as fatal for the current run.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use serde::Serialize;
use std::io::{self, Read, Seek, SeekFrom};

/// Declared byte order of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
}

pub struct ByteReader<R: Read + Seek> {
    inner: R,
    order: ByteOrder,
    len:   u64,
}

impl<R: Read + Seek> ByteReader<R> {
    /// Wrap `inner`, measuring its total length once. The cursor is left at 0.
    pub fn new(mut inner: R, order: ByteOrder) -> io::Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self { inner, order, len })
    }

    /// Total stream length in bytes, measured at construction.
    pub(crate) fn len(&self) -> u64 { self.len }

    pub fn position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    /// Bytes between the cursor and the end of the stream.
    pub fn remaining(&mut self) -> io::Result<u64> {
        Ok(self.len.saturating_sub(self.position()?))
    }

    /// Reposition to an absolute offset.
    pub fn seek(&mut self, offset: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        self.inner.read_u8()
    }

    pub fn read_u16(&mut self) -> io::Result<u16> {
        match self.order {
            ByteOrder::Big    => self.inner.read_u16::<BigEndian>(),
            ByteOrder::Little => self.inner.read_u16::<LittleEndian>(),
        }
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        match self.order {
            ByteOrder::Big    => self.inner.read_u32::<BigEndian>(),
            ByteOrder::Little => self.inner.read_u32::<LittleEndian>(),
        }
    }

    pub fn read_u64(&mut self) -> io::Result<u64> {
        match self.order {
            ByteOrder::Big    => self.inner.read_u64::<BigEndian>(),
            ByteOrder::Little => self.inner.read_u64::<LittleEndian>(),
        }
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf)
    }

    /// Read exactly `len` raw bytes into a fresh buffer.
    pub fn read_vec(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }
}
