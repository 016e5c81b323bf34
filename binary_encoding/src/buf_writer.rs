use crate::var_uint::VarUInt;
use crate::{EncodedData, Error, LengthItem, NativeEncoding, Prefix, SequenceItem};

macro_rules! write_native {
    ($($ty:ident),*) => {
        paste::paste! {
            $(
                #[doc = "Write `" $ty "` in host byte order."]
                pub fn [<write_ $ty>](&mut self, val: $ty) -> Result<(), Error> {
                    self.write::<$ty>(val)
                }
            )*
        }
    };
}

/// Sequential writer over a mutable byte slice, usually the whole allocated capacity of a buffer.
/// No alignment requirements are imposed on the byte slice provided.
///
/// Every operation checks that all of its bytes fit before writing the first one, so a failed
/// write leaves both the position and the slice contents untouched.
///
/// # Example
/// ```
/// use binary_encoding::{BufWriter, Prefix};
///
/// let mut buf = [0u8; 16];
/// let mut wr = BufWriter::new(&mut buf);
/// wr.write_u8(0xaa).unwrap();
/// wr.write_var_uint(200).unwrap();
/// wr.write_str("hi", Prefix::VarUInt).unwrap();
/// assert_eq!(wr.finish(), &[0xaa, 0x81, 0x48, 2, b'h', b'i']);
/// ```
pub struct BufWriter<'i> {
    buf: &'i mut [u8],
    // Next byte to write to
    byte_idx: usize,
}

impl<'i> BufWriter<'i> {
    pub fn new(buf: &'i mut [u8]) -> Self {
        Self { buf, byte_idx: 0 }
    }

    /// Create a BufWriter that starts writing at `offset`, bytes before it are kept as is.
    ///
    /// # Panics
    /// If `offset` is past the end of `buf`.
    pub fn at(buf: &'i mut [u8], offset: usize) -> Self {
        assert!(
            offset <= buf.len(),
            "writer offset {offset} is past the end of the buffer ({} bytes)",
            buf.len()
        );
        Self {
            buf,
            byte_idx: offset,
        }
    }

    /// Write any native scalar.
    pub fn write<T: NativeEncoding>(&mut self, val: T) -> Result<(), Error> {
        self.write_raw_slice(bytemuck::bytes_of(&val))
    }

    write_native!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

    /// Write a number in [VarUInt] encoding, it will take from 1 to [VarUInt::MAX_SIZE] bytes.
    pub fn write_var_uint(&mut self, val: u64) -> Result<(), Error> {
        VarUInt(val).write_forward(self)
    }

    /// Write `len` as a fixed width length prefix.
    pub fn write_length(&mut self, item: LengthItem, len: usize) -> Result<(), Error> {
        if !item.fits(len) {
            return Err(Error::LengthTooLong);
        }
        // casts are lossless, checked above
        match item {
            LengthItem::U8 => self.write_u8(len as u8),
            LengthItem::U16 => self.write_u16(len as u16),
            LengthItem::U32 => self.write_u32(len as u32),
            LengthItem::U64 => self.write_u64(len as u64),
            LengthItem::Usize => self.write_usize(len),
        }
    }

    /// Write the provided slice as is. Note that it can only be read back if the length is known
    /// to the reader, see [BufWriter::write_block()] for size prefixed slices.
    pub fn write_raw_slice(&mut self, val: &[u8]) -> Result<(), Error> {
        if self.bytes_left() < val.len() {
            return Err(Error::BufferTooShort);
        }
        self.buf[self.byte_idx..self.byte_idx + val.len()].copy_from_slice(val);
        self.byte_idx += val.len();
        Ok(())
    }

    /// Write the byte length of `val` as requested by `prefix`, followed by `val` itself.
    /// All other block writes (data, strings and arrays) go through here.
    pub fn write_block(&mut self, val: &[u8], prefix: Prefix) -> Result<(), Error> {
        let prefix_len = prefix.len_bytes(val.len())?;
        let bytes_left = self.bytes_left();
        if bytes_left < prefix_len || bytes_left - prefix_len < val.len() {
            return Err(Error::BufferTooShort);
        }

        #[cfg(feature = "defmt-extended")]
        defmt::trace!("write_block({}): len={}", prefix, val.len());
        #[cfg(feature = "tracing-extended")]
        tracing::trace!("write_block({prefix:?}): len={} at={}", val.len(), self.byte_idx);

        match prefix {
            Prefix::None => {}
            Prefix::Fixed(item) => self.write_length(item, val.len())?,
            Prefix::VarUInt => self.write_var_uint(val.len() as u64)?,
        }
        self.write_raw_slice(val)
    }

    /// Write the valid bytes of another buffer.
    pub fn write_data(&mut self, val: &EncodedData, prefix: Prefix) -> Result<(), Error> {
        self.write_block(val.as_bytes(), prefix)
    }

    /// Write UTF-8 bytes of a string, no terminator is added.
    pub fn write_str(&mut self, val: &str, prefix: Prefix) -> Result<(), Error> {
        self.write_block(val.as_bytes(), prefix)
    }

    /// Write elements back to back in their native representation.
    /// Prefix, if any, holds the length in bytes, not the element count.
    pub fn write_array<T: SequenceItem>(&mut self, val: &[T], prefix: Prefix) -> Result<(), Error> {
        self.write_block(bytemuck::cast_slice(val), prefix)
    }

    /// Return the slice from the start of the buffer up to the current position.
    pub fn finish(self) -> &'i [u8] {
        let buf: &'i [u8] = self.buf;
        &buf[..self.byte_idx]
    }

    /// Return the number of bytes left.
    #[inline]
    pub fn bytes_left(&self) -> usize {
        self.buf.len() - self.byte_idx
    }

    /// Return the position of the next byte to be written.
    #[inline]
    pub fn pos(&self) -> usize {
        self.byte_idx
    }
}

#[cfg(test)]
mod tests {
    use crate::{BufWriter, Error, LengthItem, Prefix};
    use hex_literal::hex;

    #[test]
    fn bytes() {
        let mut buf = [0xFF; 3];
        let mut wr = BufWriter::new(&mut buf);
        wr.write_u8(1).unwrap();
        wr.write_i8(-1).unwrap();
        assert_eq!(wr.bytes_left(), 1);
        assert_eq!(wr.write_u16(5), Err(Error::BufferTooShort));
        assert_eq!(wr.pos(), 2);
        assert_eq!(wr.finish(), &[1, 0xFF]);
    }

    #[test]
    fn at_keeps_head() {
        let mut buf = [1, 2, 3, 4];
        let mut wr = BufWriter::at(&mut buf, 2);
        wr.write_u8(9).unwrap();
        assert_eq!(wr.finish(), &[1, 2, 9]);
        assert_eq!(buf, [1, 2, 9, 4]);
    }

    #[test]
    fn native_scalars() {
        let mut buf = [0u8; 16];
        let mut wr = BufWriter::new(&mut buf);
        wr.write_i32(-10).unwrap();
        wr.write_f64(0.5).unwrap();
        let bytes = wr.finish();
        assert_eq!(&bytes[..4], &(-10i32).to_ne_bytes());
        assert_eq!(&bytes[4..12], &0.5f64.to_ne_bytes());
    }

    #[test]
    fn var_uint_prefixed_block() {
        let mut buf = [0u8; 8];
        let mut wr = BufWriter::new(&mut buf);
        wr.write_block(&[0xAA, 0xBB], Prefix::VarUInt).unwrap();
        wr.write_block(&[0xCC], Prefix::None).unwrap();
        assert_eq!(wr.finish(), hex!("02 AA BB CC"));
    }

    #[test]
    fn fixed_prefixed_block() {
        let mut buf = [0u8; 8];
        let mut wr = BufWriter::new(&mut buf);
        wr.write_block(&[7, 8], Prefix::Fixed(LengthItem::U32)).unwrap();
        let bytes = wr.finish();
        assert_eq!(&bytes[..4], &2u32.to_ne_bytes());
        assert_eq!(&bytes[4..], &[7, 8]);
    }

    #[test]
    fn block_does_not_fit() {
        let mut buf = [0u8; 3];
        let mut wr = BufWriter::new(&mut buf);
        // prefix fits, body does not: nothing is written
        assert_eq!(
            wr.write_block(&[1, 2, 3], Prefix::VarUInt),
            Err(Error::BufferTooShort)
        );
        assert_eq!(wr.pos(), 0);
        assert!(wr.finish().is_empty());
        assert_eq!(buf, [0, 0, 0]);
    }

    #[test]
    fn length_too_long() {
        let mut buf = [0u8; 512];
        let mut wr = BufWriter::new(&mut buf);
        let long = [0u8; 300];
        assert_eq!(
            wr.write_block(&long, Prefix::Fixed(LengthItem::U8)),
            Err(Error::LengthTooLong)
        );
        assert_eq!(wr.pos(), 0);
        wr.write_block(&long, Prefix::Fixed(LengthItem::U16)).unwrap();
        assert_eq!(wr.pos(), 302);
    }

    #[test]
    fn array_prefix_is_byte_length() {
        let mut buf = [0u8; 16];
        let mut wr = BufWriter::new(&mut buf);
        wr.write_array(&[1u16, 2, 3], Prefix::VarUInt).unwrap();
        let bytes = wr.finish();
        assert_eq!(bytes[0], 6);
        assert_eq!(&bytes[1..3], &1u16.to_ne_bytes());
        assert_eq!(bytes.len(), 7);
    }
}
