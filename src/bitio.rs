//! Bit-level input and output ports.
//!
//! The codec only ever talks to a [`BitInput`] and a [`BitOutput`]. Two pairs of
//! implementations are provided: buffered streams over any `Read + Seek` / `Write`
//! resource, and in-memory ports backed by a [`BitVec`]. All of them read and write
//! fields most-significant bit first.
use std::io::{BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};

use bit_vec::BitVec;

use crate::error::{Error, Result};

/// The widest field a port accepts in a single call.
pub const MAX_WIDTH: u32 = 32;

/// A source of bits.
pub trait BitInput {
    /// Reads a `width`-bit field, returning `None` once fewer than `width` bits remain.
    ///
    /// # Errors
    ///
    /// Returns an error if `width` is outside `1..=32` or the underlying resource fails.
    fn read_bits(&mut self, width: u32) -> Result<Option<u32>>;

    /// Moves back to the start of the source.
    fn rewind(&mut self) -> Result<()>;

    /// Number of bits read since creation or the last rewind.
    fn bits_read(&self) -> u64;
}

/// A sink for bits.
pub trait BitOutput {
    /// Writes the low `width` bits of `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if `width` is outside `1..=32`, `value` does not fit in `width`
    /// bits, the port is closed, or the underlying resource fails.
    fn write_bits(&mut self, width: u32, value: u32) -> Result<()>;

    /// Pads the final partial byte with zero bits and flushes. Closing twice is a no-op.
    fn close(&mut self) -> Result<()>;

    /// Number of bits written, not counting the padding added by `close`.
    fn bits_written(&self) -> u64;
}

fn check_width(width: u32) -> Result<()> {
    if width == 0 || width > MAX_WIDTH {
        return Err(Error::InvalidWidth(width));
    }
    Ok(())
}

fn check_field(width: u32, value: u32) -> Result<()> {
    check_width(width)?;
    if width < MAX_WIDTH && value >> width != 0 {
        return Err(Error::ValueOutOfRange { width, value });
    }
    Ok(())
}

/// Buffered bit reader over a seekable byte resource.
pub struct BitInputStream<R: Read + Seek> {
    inner: BufReader<R>,
    buffer: u64,
    buffered: u32,
    bits_read: u64,
}

impl<R: Read + Seek> BitInputStream<R> {
    pub fn new(inner: R) -> Self {
        BitInputStream {
            inner: BufReader::new(inner),
            buffer: 0,
            buffered: 0,
            bits_read: 0,
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<R: Read + Seek> BitInput for BitInputStream<R> {
    fn read_bits(&mut self, width: u32) -> Result<Option<u32>> {
        check_width(width)?;

        while self.buffered < width {
            match self.next_byte()? {
                Some(byte) => {
                    self.buffer = (self.buffer << 8) | u64::from(byte);
                    self.buffered += 8;
                }
                None => return Ok(None),
            }
        }

        self.buffered -= width;
        let value = (self.buffer >> self.buffered) & ((1u64 << width) - 1);
        self.buffer &= (1u64 << self.buffered) - 1;
        self.bits_read += u64::from(width);

        Ok(Some(value as u32))
    }

    fn rewind(&mut self) -> Result<()> {
        self.inner.seek(SeekFrom::Start(0))?;
        self.buffer = 0;
        self.buffered = 0;
        self.bits_read = 0;
        Ok(())
    }

    fn bits_read(&self) -> u64 {
        self.bits_read
    }
}

/// Buffered bit writer over a byte sink.
pub struct BitOutputStream<W: Write> {
    inner: BufWriter<W>,
    partial: u8,
    filled: u32,
    bits_written: u64,
    closed: bool,
}

impl<W: Write> BitOutputStream<W> {
    pub fn new(inner: W) -> Self {
        BitOutputStream {
            inner: BufWriter::new(inner),
            partial: 0,
            filled: 0,
            bits_written: 0,
            closed: false,
        }
    }

    /// Closes the port and hands back the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.close()?;
        self.inner.into_inner().map_err(|e| Error::Io(e.into_error()))
    }
}

impl<W: Write> BitOutput for BitOutputStream<W> {
    fn write_bits(&mut self, width: u32, value: u32) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        check_field(width, value)?;

        for shift in (0..width).rev() {
            self.partial = (self.partial << 1) | ((value >> shift) & 1) as u8;
            self.filled += 1;
            if self.filled == 8 {
                self.inner.write_all(&[self.partial])?;
                self.partial = 0;
                self.filled = 0;
            }
        }
        self.bits_written += u64::from(width);

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if self.filled > 0 {
            let padded = self.partial << (8 - self.filled);
            self.inner.write_all(&[padded])?;
            self.partial = 0;
            self.filled = 0;
        }
        self.inner.flush()?;
        self.closed = true;
        Ok(())
    }

    fn bits_written(&self) -> u64 {
        self.bits_written
    }
}

/// In-memory bit reader over a byte slice.
pub struct MemoryBitInput {
    bits: BitVec,
    position: usize,
}

impl MemoryBitInput {
    pub fn new(bytes: &[u8]) -> Self {
        MemoryBitInput {
            bits: BitVec::from_bytes(bytes),
            position: 0,
        }
    }
}

impl BitInput for MemoryBitInput {
    fn read_bits(&mut self, width: u32) -> Result<Option<u32>> {
        check_width(width)?;

        let end = self.position + width as usize;
        if end > self.bits.len() {
            return Ok(None);
        }

        let mut value = 0u32;
        for i in self.position..end {
            value = (value << 1) | u32::from(self.bits.get(i).unwrap_or(false));
        }
        self.position = end;

        Ok(Some(value))
    }

    fn rewind(&mut self) -> Result<()> {
        self.position = 0;
        Ok(())
    }

    fn bits_read(&self) -> u64 {
        self.position as u64
    }
}

/// In-memory bit writer; the packed bytes are taken with [`MemoryBitOutput::into_bytes`].
#[derive(Default)]
pub struct MemoryBitOutput {
    bits: BitVec,
    bits_written: u64,
    closed: bool,
}

impl MemoryBitOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the written bytes, zero-padding the last one.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bits.to_bytes()
    }
}

impl BitOutput for MemoryBitOutput {
    fn write_bits(&mut self, width: u32, value: u32) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        check_field(width, value)?;

        for shift in (0..width).rev() {
            self.bits.push((value >> shift) & 1 == 1);
        }
        self.bits_written += u64::from(width);

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        while self.bits.len() % 8 != 0 {
            self.bits.push(false);
        }
        self.closed = true;
        Ok(())
    }

    fn bits_written(&self) -> u64 {
        self.bits_written
    }
}
