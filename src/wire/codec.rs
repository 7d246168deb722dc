//! Element codec
//!
//! Primitive encode/decode for the wire format:
//! - Fixed-width integers, little-endian
//! - Compact-size variable-length integers
//! - Count-prefixed byte slices, strings, and lists
//! - Booleans and fixed-size byte arrays
//!
//! Reads never go past the bytes a field requires, and length prefixes are
//! bounded by [`MAX_MESSAGE_PAYLOAD`] before anything is allocated.

use crate::wire::error::{WireError, WireResult};
use crate::wire::protocol::{ServiceFlags, MAX_MESSAGE_PAYLOAD};
use std::io::{Read, Write};

// =============================================================================
// Constants
// =============================================================================

/// Upper bound on speculative preallocation for count-prefixed data
const PREALLOC_BYTES: u64 = 64 * 1024;

/// Largest value encoded in the single-byte compact-size form
const COMPACT_SIZE_MAX_SINGLE: u64 = 0xfc;

/// Compact-size markers
const COMPACT_SIZE_U16: u8 = 0xfd;
const COMPACT_SIZE_U32: u8 = 0xfe;
const COMPACT_SIZE_U64: u8 = 0xff;

/// Number of bytes the minimal compact-size encoding of `value` takes
pub fn compact_size_len(value: u64) -> usize {
    match value {
        0..=COMPACT_SIZE_MAX_SINGLE => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

// =============================================================================
// Element Trait
// =============================================================================

/// A value with a fixed wire representation
pub trait Element: Sized {
    /// Read one value from `r`
    fn decode_element<R: Read>(r: &mut WireReader<'_, R>, field: &'static str) -> WireResult<Self>;

    /// Write this value to `w`
    fn encode_element<W: Write>(
        &self,
        w: &mut WireWriter<'_, W>,
        field: &'static str,
    ) -> WireResult<()>;
}

// =============================================================================
// Reader
// =============================================================================

/// Reads wire elements on behalf of one message
pub struct WireReader<'a, R> {
    inner: &'a mut R,
    command: &'static str,
    consumed: u64,
}

impl<'a, R: Read> WireReader<'a, R> {
    pub fn new(inner: &'a mut R, command: &'static str) -> Self {
        Self {
            inner,
            command,
            consumed: 0,
        }
    }

    /// Command of the message being read
    pub fn command(&self) -> &'static str {
        self.command
    }

    /// Bytes consumed so far
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Fill `buf` completely
    pub fn read_exact(&mut self, buf: &mut [u8], field: &'static str) -> WireResult<()> {
        self.inner
            .read_exact(buf)
            .map_err(|e| WireError::from_read(self.command, field, e))?;
        self.consumed += buf.len() as u64;
        Ok(())
    }

    /// Read a fixed-size byte array
    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> WireResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf, field)?;
        Ok(buf)
    }

    /// Read any element
    pub fn read<T: Element>(&mut self, field: &'static str) -> WireResult<T> {
        T::decode_element(self, field)
    }

    /// Read a compact-size integer, accepting non-minimal forms
    pub fn read_compact_size(&mut self, field: &'static str) -> WireResult<u64> {
        let marker: u8 = self.read(field)?;
        let value = match marker {
            COMPACT_SIZE_U16 => u64::from(self.read::<u16>(field)?),
            COMPACT_SIZE_U32 => u64::from(self.read::<u32>(field)?),
            COMPACT_SIZE_U64 => self.read::<u64>(field)?,
            single => u64::from(single),
        };
        Ok(value)
    }

    /// Read a length or count prefix, bounded by the message ceiling
    pub fn read_length(&mut self, field: &'static str) -> WireResult<u64> {
        let len = self.read_compact_size(field)?;
        if len > u64::from(MAX_MESSAGE_PAYLOAD) {
            return Err(WireError::ElementTooLarge {
                command: self.command,
                field,
                len,
                max: u64::from(MAX_MESSAGE_PAYLOAD),
            });
        }
        Ok(len)
    }

    /// Read a count-prefixed byte slice
    pub fn read_var_bytes(&mut self, field: &'static str) -> WireResult<Vec<u8>> {
        let len = self.read_length(field)?;
        let mut buf = Vec::with_capacity(len.min(PREALLOC_BYTES) as usize);
        let read = self
            .inner
            .by_ref()
            .take(len)
            .read_to_end(&mut buf)
            .map_err(|e| WireError::from_read(self.command, field, e))?;
        self.consumed += read as u64;
        if (read as u64) < len {
            return Err(WireError::TruncatedInput {
                command: self.command,
                field,
            });
        }
        Ok(buf)
    }

    /// Read a count-prefixed list of elements
    pub fn read_list<T: Element>(&mut self, field: &'static str) -> WireResult<Vec<T>> {
        let count = self.read_length(field)?;
        let item_size = std::mem::size_of::<T>().max(1) as u64;
        let mut items = Vec::with_capacity(count.min(PREALLOC_BYTES / item_size) as usize);
        for _ in 0..count {
            items.push(self.read(field)?);
        }
        Ok(items)
    }
}

// =============================================================================
// Writer
// =============================================================================

/// Writes wire elements on behalf of one message
pub struct WireWriter<'a, W> {
    inner: &'a mut W,
    command: &'static str,
    written: u64,
}

impl<'a, W: Write> WireWriter<'a, W> {
    pub fn new(inner: &'a mut W, command: &'static str) -> Self {
        Self {
            inner,
            command,
            written: 0,
        }
    }

    /// Command of the message being written
    pub fn command(&self) -> &'static str {
        self.command
    }

    /// Bytes written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Write all of `buf`
    pub fn write_all(&mut self, buf: &[u8], field: &'static str) -> WireResult<()> {
        self.inner
            .write_all(buf)
            .map_err(|e| WireError::from_write(self.command, field, e))?;
        self.written += buf.len() as u64;
        Ok(())
    }

    /// Write any element
    pub fn write<T: Element>(&mut self, value: &T, field: &'static str) -> WireResult<()> {
        value.encode_element(self, field)
    }

    /// Write a compact-size integer in its minimal form
    pub fn write_compact_size(&mut self, value: u64, field: &'static str) -> WireResult<()> {
        match compact_size_len(value) {
            1 => self.write_all(&[value as u8], field),
            3 => {
                self.write_all(&[COMPACT_SIZE_U16], field)?;
                self.write_all(&(value as u16).to_le_bytes(), field)
            }
            5 => {
                self.write_all(&[COMPACT_SIZE_U32], field)?;
                self.write_all(&(value as u32).to_le_bytes(), field)
            }
            _ => {
                self.write_all(&[COMPACT_SIZE_U64], field)?;
                self.write_all(&value.to_le_bytes(), field)
            }
        }
    }

    /// Write a count-prefixed byte slice
    pub fn write_var_bytes(&mut self, bytes: &[u8], field: &'static str) -> WireResult<()> {
        self.write_compact_size(bytes.len() as u64, field)?;
        self.write_all(bytes, field)
    }

    /// Write a count-prefixed list of elements
    pub fn write_list<T: Element>(&mut self, items: &[T], field: &'static str) -> WireResult<()> {
        self.write_compact_size(items.len() as u64, field)?;
        for item in items {
            self.write(item, field)?;
        }
        Ok(())
    }
}

// =============================================================================
// Element Implementations
// =============================================================================

macro_rules! impl_int_element {
    ($($ty:ty),*) => {$(
        impl Element for $ty {
            fn decode_element<R: Read>(
                r: &mut WireReader<'_, R>,
                field: &'static str,
            ) -> WireResult<Self> {
                Ok(<$ty>::from_le_bytes(r.read_array(field)?))
            }

            fn encode_element<W: Write>(
                &self,
                w: &mut WireWriter<'_, W>,
                field: &'static str,
            ) -> WireResult<()> {
                w.write_all(&self.to_le_bytes(), field)
            }
        }
    )*};
}

impl_int_element!(u8, i8, u16, u32, i32, u64, i64);

impl Element for bool {
    fn decode_element<R: Read>(r: &mut WireReader<'_, R>, field: &'static str) -> WireResult<Self> {
        let byte: u8 = r.read(field)?;
        Ok(byte != 0)
    }

    fn encode_element<W: Write>(
        &self,
        w: &mut WireWriter<'_, W>,
        field: &'static str,
    ) -> WireResult<()> {
        w.write(&u8::from(*self), field)
    }
}

impl<const N: usize> Element for [u8; N] {
    fn decode_element<R: Read>(r: &mut WireReader<'_, R>, field: &'static str) -> WireResult<Self> {
        r.read_array(field)
    }

    fn encode_element<W: Write>(
        &self,
        w: &mut WireWriter<'_, W>,
        field: &'static str,
    ) -> WireResult<()> {
        w.write_all(self, field)
    }
}

impl<T: Element> Element for Box<T> {
    fn decode_element<R: Read>(r: &mut WireReader<'_, R>, field: &'static str) -> WireResult<Self> {
        Ok(Box::new(r.read(field)?))
    }

    fn encode_element<W: Write>(
        &self,
        w: &mut WireWriter<'_, W>,
        field: &'static str,
    ) -> WireResult<()> {
        w.write(&**self, field)
    }
}

impl Element for Vec<u8> {
    fn decode_element<R: Read>(r: &mut WireReader<'_, R>, field: &'static str) -> WireResult<Self> {
        r.read_var_bytes(field)
    }

    fn encode_element<W: Write>(
        &self,
        w: &mut WireWriter<'_, W>,
        field: &'static str,
    ) -> WireResult<()> {
        w.write_var_bytes(self, field)
    }
}

impl Element for String {
    fn decode_element<R: Read>(r: &mut WireReader<'_, R>, field: &'static str) -> WireResult<Self> {
        let bytes = r.read_var_bytes(field)?;
        String::from_utf8(bytes).map_err(|_| WireError::InvalidString {
            command: r.command(),
            field,
        })
    }

    fn encode_element<W: Write>(
        &self,
        w: &mut WireWriter<'_, W>,
        field: &'static str,
    ) -> WireResult<()> {
        w.write_var_bytes(self.as_bytes(), field)
    }
}

impl Element for ServiceFlags {
    fn decode_element<R: Read>(r: &mut WireReader<'_, R>, field: &'static str) -> WireResult<Self> {
        Ok(ServiceFlags::from_bits_retain(r.read(field)?))
    }

    fn encode_element<W: Write>(
        &self,
        w: &mut WireWriter<'_, W>,
        field: &'static str,
    ) -> WireResult<()> {
        w.write(&self.bits(), field)
    }
}
