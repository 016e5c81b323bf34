use core::fmt::{Debug, Formatter};

use crate::{BufReader, BufWriter, Error};

/// Variable length encoded u64.
/// Each byte carries 7 bits of the number, most significant group first. All bytes except the
/// last one have the "one more byte" bit (0x80) set.
///
/// Note that this is not LEB128, which emits the least significant group first.
#[derive(Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VarUInt(pub u64);

const ONE_MORE_BYTE: u8 = 0x80;
const GROUP_MASK: u64 = 0x7f;

impl VarUInt {
    /// Maximum number of bytes a single VarUInt may occupy, decoder gives up after that.
    pub const MAX_SIZE: usize = u64::BITS as usize / 7 + 1;

    /// Exact number of bytes [encode](VarUInt::encode) will produce.
    pub fn len_bytes(&self) -> usize {
        if self.0 == 0 {
            1
        } else {
            ((u64::BITS - self.0.leading_zeros()) as usize).div_ceil(7)
        }
    }

    /// Encode into the back of `scratch` and return the encoded bytes.
    pub fn encode<'s>(&self, scratch: &'s mut [u8; VarUInt::MAX_SIZE]) -> &'s [u8] {
        let mut val = self.0;
        let mut idx = VarUInt::MAX_SIZE - 1;
        scratch[idx] = (val & GROUP_MASK) as u8;
        val >>= 7;
        while val != 0 {
            idx -= 1;
            scratch[idx] = (val & GROUP_MASK) as u8 | ONE_MORE_BYTE;
            val >>= 7;
        }
        &scratch[idx..]
    }

    pub(crate) fn write_forward(&self, wr: &mut BufWriter) -> Result<(), Error> {
        let mut scratch = [0u8; VarUInt::MAX_SIZE];
        wr.write_raw_slice(self.encode(&mut scratch))
    }

    /// Advances `rd` even when an error is returned, see [BufReader::read_var_uint] for the atomic version.
    pub(crate) fn read_forward(rd: &mut BufReader) -> Result<Self, Error> {
        let mut num = 0u64;
        for _ in 0..VarUInt::MAX_SIZE {
            let byte = rd.read_u8()?;
            // bits shifted out of u64 on malformed input are dropped
            num = (num << 7) | (byte as u64 & GROUP_MASK);
            if byte & ONE_MORE_BYTE == 0 {
                return Ok(VarUInt(num));
            }
        }
        Err(Error::VarintTooLong)
    }
}

impl From<u64> for VarUInt {
    fn from(value: u64) -> Self {
        VarUInt(value)
    }
}

impl From<VarUInt> for u64 {
    fn from(value: VarUInt) -> Self {
        value.0
    }
}

impl Debug for VarUInt {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
