use alloc::vec::Vec;
use core::mem::size_of;

use crate::var_uint::VarUInt;
use crate::{EncodedData, Error, LengthItem, NativeEncoding, SequenceItem, SizeOf};

macro_rules! read_native {
    ($($ty:ident),*) => {
        paste::paste! {
            $(
                #[doc = "Read `" $ty "` in host byte order."]
                pub fn [<read_ $ty>](&mut self) -> Result<$ty, Error> {
                    self.read::<$ty>()
                }
            )*
        }
    };
}

/// Sequential reader over the valid bytes of a buffer.
///
/// Every operation is bounds checked against the end of the slice and advances the position
/// only on success, so a failed read can be retried or reported without losing the place.
/// This also holds for size prefixed reads: when the prefix decodes but the block does not fit,
/// the reader stays in front of the prefix.
#[derive(Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufReader<'i> {
    buf: &'i [u8],
    /// Next byte to read from
    byte_idx: usize,
}

impl<'i> BufReader<'i> {
    /// Create a new BufReader from the provided slice.
    pub fn new(buf: &'i [u8]) -> Self {
        Self { buf, byte_idx: 0 }
    }

    /// Create a BufReader that starts reading at `offset`.
    ///
    /// # Panics
    /// If `offset` is past the end of `buf`.
    pub fn at(buf: &'i [u8], offset: usize) -> Self {
        assert!(
            offset <= buf.len(),
            "reader offset {offset} is past the end of the buffer ({} bytes)",
            buf.len()
        );
        Self {
            buf,
            byte_idx: offset,
        }
    }

    /// Read any native scalar.
    pub fn read<T: NativeEncoding>(&mut self) -> Result<T, Error> {
        let bytes = self.read_raw_slice(size_of::<T>())?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    read_native!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

    /// Read a number encoded as [VarUInt].
    pub fn read_var_uint(&mut self) -> Result<u64, Error> {
        let value = self.atomic(VarUInt::read_forward)?.0;

        #[cfg(feature = "defmt-extended")]
        defmt::trace!("read_var_uint() = {}", value);
        #[cfg(feature = "tracing-extended")]
        tracing::trace!("read_var_uint() = {}", value);

        Ok(value)
    }

    /// Read a fixed width length prefix.
    ///
    /// A length that does not fit into usize cannot describe anything inside this buffer and is reported as
    /// [Error::BufferTooShort].
    pub fn read_length(&mut self, item: LengthItem) -> Result<usize, Error> {
        self.atomic(|rd| match item {
            LengthItem::U8 => Ok(usize::from(rd.read_u8()?)),
            LengthItem::U16 => Ok(usize::from(rd.read_u16()?)),
            LengthItem::U32 => usize::try_from(rd.read_u32()?).map_err(|_| Error::BufferTooShort),
            LengthItem::U64 => usize::try_from(rd.read_u64()?).map_err(|_| Error::BufferTooShort),
            LengthItem::Usize => rd.read_usize(),
        })
    }

    /// Borrow the next `len` bytes.
    pub fn read_raw_slice(&mut self, len: usize) -> Result<&'i [u8], Error> {
        if self.bytes_left() < len {
            return Err(Error::BufferTooShort);
        }
        let val = &self.buf[self.byte_idx..self.byte_idx + len];
        self.byte_idx += len;
        Ok(val)
    }

    /// Read the length of a block according to `size` and borrow the block.
    /// All other block reads (data, strings and arrays) go through here.
    pub fn read_block(&mut self, size: SizeOf) -> Result<&'i [u8], Error> {
        self.atomic(|rd| {
            let len = match size {
                SizeOf::Explicit(len) => len,
                SizeOf::Fixed(item) => rd.read_length(item)?,
                SizeOf::VarUInt => {
                    usize::try_from(rd.read_var_uint()?).map_err(|_| Error::BufferTooShort)?
                }
            };

            #[cfg(feature = "defmt-extended")]
            defmt::trace!("read_block({}): len={}", size, len);
            #[cfg(feature = "tracing-extended")]
            tracing::trace!("read_block({size:?}): len={len} at={}", rd.byte_idx);

            rd.read_raw_slice(len)
        })
    }

    /// Read a block into a new, independently owned [EncodedData].
    pub fn read_data(&mut self, size: SizeOf) -> Result<EncodedData, Error> {
        Ok(EncodedData::from_slice(self.read_block(size)?))
    }

    /// Read a block and check that it is valid UTF-8.
    pub fn read_str(&mut self, size: SizeOf) -> Result<&'i str, Error> {
        self.atomic(|rd| {
            let bytes = rd.read_block(size)?;
            core::str::from_utf8(bytes).map_err(|_| Error::StringIsNotUtf8)
        })
    }

    /// Read a block and reinterpret it as native elements.
    /// Block size is in bytes, trailing bytes that do not form a whole element are skipped over and dropped.
    pub fn read_array<T: SequenceItem>(&mut self, size: SizeOf) -> Result<Vec<T>, Error> {
        let bytes = self.read_block(size)?;
        Ok(bytes
            .chunks_exact(size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
            .collect())
    }

    /// Run `f` on a copy of this reader and only keep its position if it succeeded.
    fn atomic<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, Error>) -> Result<T, Error> {
        let mut rd = *self;
        let value = f(&mut rd)?;
        *self = rd;
        Ok(value)
    }

    /// Returns the number of bytes left.
    #[inline]
    pub fn bytes_left(&self) -> usize {
        self.buf.len() - self.byte_idx
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.bytes_left() == 0
    }

    /// Return byte position that will be used on the next read call.
    #[inline]
    pub fn pos(&self) -> usize {
        self.byte_idx
    }
}
