//! Typed read, write and append operations of [EncodedData].
//!
//! Every operation takes the position as `offset: &mut usize` and moves it past the bytes read or
//! written on success. On error `offset` and the buffer are left as they were.
//!
//! Writes reserve an upper bound of the bytes they need before encoding (exact size for
//! scalars, [VarUInt::MAX_SIZE](crate::VarUInt::MAX_SIZE) for VarUInt values and prefixes),
//! so capacity may end up larger than strictly required. Only the length is ever treated as written.

use alloc::string::String;
use alloc::vec::Vec;
use core::mem::{size_of, size_of_val};

use crate::var_uint::VarUInt;
use crate::{EncodedData, Error, NativeEncoding, Prefix, SequenceItem, SizeOf};

impl EncodedData {
    /// Read a native scalar at `offset`.
    pub fn read<T: NativeEncoding>(&self, offset: &mut usize) -> Result<T, Error> {
        self.read_at(offset, |rd| rd.read::<T>())
    }

    pub fn read_var_uint(&self, offset: &mut usize) -> Result<u64, Error> {
        self.read_at(offset, |rd| rd.read_var_uint())
    }

    /// Read a block into a new buffer that does not share storage with this one.
    pub fn read_data(&self, size: SizeOf, offset: &mut usize) -> Result<EncodedData, Error> {
        self.read_at(offset, |rd| rd.read_data(size))
    }

    pub fn read_str(&self, size: SizeOf, offset: &mut usize) -> Result<String, Error> {
        self.read_at(offset, |rd| rd.read_str(size).map(String::from))
    }

    /// Read a block of native elements, `size` is in bytes.
    pub fn read_array<T: SequenceItem>(
        &self,
        size: SizeOf,
        offset: &mut usize,
    ) -> Result<Vec<T>, Error> {
        self.read_at(offset, |rd| rd.read_array(size))
    }

    /// Write a native scalar at `offset`, overwriting existing bytes and extending the length if needed.
    ///
    /// # Panics
    /// If `offset` is past the current length.
    pub fn write<T: NativeEncoding>(&mut self, val: T, offset: &mut usize) -> Result<(), Error> {
        self.write_at(offset, size_of::<T>(), |wr| wr.write(val))
    }

    pub fn write_var_uint(&mut self, val: u64, offset: &mut usize) -> Result<(), Error> {
        self.write_at(offset, VarUInt::MAX_SIZE, |wr| wr.write_var_uint(val))
    }

    /// Write raw bytes, preceded by their length as requested by `prefix`.
    pub fn write_bytes(&mut self, val: &[u8], prefix: Prefix, offset: &mut usize) -> Result<(), Error> {
        self.write_at(offset, prefix.max_size() + val.len(), |wr| {
            wr.write_block(val, prefix)
        })
    }

    /// Write the valid bytes of another buffer. To write a buffer into itself, pass a clone of it.
    pub fn write_data(
        &mut self,
        val: &EncodedData,
        prefix: Prefix,
        offset: &mut usize,
    ) -> Result<(), Error> {
        self.write_bytes(val.as_bytes(), prefix, offset)
    }

    pub fn write_str(&mut self, val: &str, prefix: Prefix, offset: &mut usize) -> Result<(), Error> {
        self.write_bytes(val.as_bytes(), prefix, offset)
    }

    /// Write native elements back to back, prefix holds the length in bytes.
    pub fn write_array<T: SequenceItem>(
        &mut self,
        val: &[T],
        prefix: Prefix,
        offset: &mut usize,
    ) -> Result<(), Error> {
        self.write_at(offset, prefix.max_size() + size_of_val(val), |wr| {
            wr.write_array(val, prefix)
        })
    }

    pub fn append<T: NativeEncoding>(&mut self, val: T) -> Result<(), Error> {
        let mut offset = self.len();
        self.write(val, &mut offset)
    }

    pub fn append_var_uint(&mut self, val: u64) -> Result<(), Error> {
        let mut offset = self.len();
        self.write_var_uint(val, &mut offset)
    }

    pub fn append_bytes(&mut self, val: &[u8], prefix: Prefix) -> Result<(), Error> {
        let mut offset = self.len();
        self.write_bytes(val, prefix, &mut offset)
    }

    pub fn append_data(&mut self, val: &EncodedData, prefix: Prefix) -> Result<(), Error> {
        let mut offset = self.len();
        self.write_data(val, prefix, &mut offset)
    }

    pub fn append_str(&mut self, val: &str, prefix: Prefix) -> Result<(), Error> {
        let mut offset = self.len();
        self.write_str(val, prefix, &mut offset)
    }

    pub fn append_array<T: SequenceItem>(&mut self, val: &[T], prefix: Prefix) -> Result<(), Error> {
        let mut offset = self.len();
        self.write_array(val, prefix, &mut offset)
    }
}

#[cfg(test)]
mod tests {
    use crate::{EncodedData, Error, LengthItem, Prefix, SizeOf};

    #[test]
    fn overwrite_keeps_length() {
        let mut data = EncodedData::from([1, 2, 3, 4]);
        let mut offset = 1;
        data.write(0xAAu8, &mut offset).unwrap();
        assert_eq!(offset, 2);
        assert_eq!(data.as_bytes(), &[1, 0xAA, 3, 4]);
    }

    #[test]
    fn overwrite_extends_length() {
        let mut data = EncodedData::from([1, 2, 3]);
        let mut offset = 2;
        data.write(0x0102_0304u32, &mut offset).unwrap();
        assert_eq!(offset, 6);
        assert_eq!(data.len(), 6);
        assert_eq!(&data.as_bytes()[2..], &0x0102_0304u32.to_ne_bytes());
    }

    #[test]
    fn var_uint_reserves_upper_bound_only() {
        let mut data = EncodedData::new();
        data.append_var_uint(5).unwrap();
        assert_eq!(data.len(), 1);
        assert!(data.capacity() >= crate::VarUInt::MAX_SIZE);
        let mut offset = 1;
        assert_eq!(data.read::<u8>(&mut offset), Err(Error::BufferTooShort));
    }

    #[test]
    fn failed_read_keeps_offset() {
        let mut data = EncodedData::new();
        data.append_var_uint(10).unwrap();
        data.append_bytes(&[1, 2, 3], Prefix::None).unwrap();
        let mut offset = 0;
        assert_eq!(
            data.read_data(SizeOf::VarUInt, &mut offset),
            Err(Error::BufferTooShort)
        );
        assert_eq!(offset, 0);
    }

    #[test]
    fn read_past_length() {
        let data = EncodedData::from([1, 2]);
        let mut offset = 5;
        assert_eq!(data.read::<u8>(&mut offset), Err(Error::BufferTooShort));
        assert_eq!(offset, 5);
    }

    #[test]
    #[should_panic]
    fn write_past_length() {
        let mut data = EncodedData::from([1, 2]);
        let mut offset = 3;
        let _ = data.write(1u8, &mut offset);
    }

    #[test]
    fn length_too_long_leaves_data_untouched() {
        let mut data = EncodedData::from([7]);
        let long = [0u8; 256];
        assert_eq!(
            data.append_bytes(&long, Prefix::Fixed(LengthItem::U8)),
            Err(Error::LengthTooLong)
        );
        assert_eq!(data.as_bytes(), &[7]);
    }

    #[test]
    fn read_data_is_independent() {
        let mut data = EncodedData::new();
        data.append_bytes(&[5, 6, 7], Prefix::Fixed(LengthItem::U16)).unwrap();
        let mut offset = 0;
        let mut block = data
            .read_data(SizeOf::Fixed(LengthItem::U16), &mut offset)
            .unwrap();
        assert_eq!(block.as_bytes(), &[5, 6, 7]);
        block.append(8u8).unwrap();
        assert_eq!(data.len(), 5);
    }

    #[test]
    fn append_self() {
        let mut data = EncodedData::from([1, 2]);
        let copy = data.clone();
        data.append_data(&copy, Prefix::VarUInt).unwrap();
        assert_eq!(data.as_bytes(), &[1, 2, 2, 1, 2]);
        assert_eq!(copy.as_bytes(), &[1, 2]);
    }

    #[test]
    fn explicit_size_reads() {
        let mut data = EncodedData::new();
        data.append_str("abc", Prefix::None).unwrap();
        data.append_array(&[1u16, 2], Prefix::None).unwrap();
        let mut offset = 0;
        assert_eq!(data.read_str(SizeOf::Explicit(3), &mut offset).unwrap(), "abc");
        assert_eq!(
            data.read_array::<u16>(SizeOf::Explicit(4), &mut offset).unwrap(),
            vec![1, 2]
        );
        assert_eq!(offset, data.len());
    }
}
