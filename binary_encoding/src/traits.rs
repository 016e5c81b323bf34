use crate::var_uint::VarUInt;
use crate::Error;

/// Fixed size scalar stored on the wire as its in-memory representation, in host byte order.
///
/// Implemented for all primitive integers and floats. `bytemuck::Pod` provides the byte
/// views, so no alignment is required from the underlying buffer.
pub trait NativeEncoding: bytemuck::Pod {}

macro_rules! impl_native_encoding {
    ($($ty:ty),*) => {
        $(impl NativeEncoding for $ty {})*
    };
}
impl_native_encoding!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

/// Element of a homogeneous array, any native scalar qualifies.
pub trait SequenceItem: NativeEncoding {}

impl<T: NativeEncoding> SequenceItem for T {}

/// Fixed width unsigned integer used as a length prefix in front of a block.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LengthItem {
    U8,
    U16,
    U32,
    U64,
    Usize,
}

impl LengthItem {
    /// Size of the prefix in bytes.
    pub const fn size(&self) -> usize {
        match self {
            LengthItem::U8 => 1,
            LengthItem::U16 => 2,
            LengthItem::U32 => 4,
            LengthItem::U64 => 8,
            LengthItem::Usize => core::mem::size_of::<usize>(),
        }
    }

    /// Whether `len` is representable with this prefix.
    pub fn fits(&self, len: usize) -> bool {
        match self {
            LengthItem::U8 => u8::try_from(len).is_ok(),
            LengthItem::U16 => u16::try_from(len).is_ok(),
            LengthItem::U32 => u32::try_from(len).is_ok(),
            LengthItem::U64 => u64::try_from(len).is_ok(),
            LengthItem::Usize => true,
        }
    }
}

/// Where a reader takes the byte length of a block from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SizeOf {
    /// Length is known to the caller and is not stored in the buffer.
    Explicit(usize),
    /// Length is stored in front of the block as a fixed width native integer.
    Fixed(LengthItem),
    /// Length is stored in front of the block as [VarUInt].
    VarUInt,
}

impl From<LengthItem> for SizeOf {
    fn from(item: LengthItem) -> Self {
        SizeOf::Fixed(item)
    }
}

/// How a writer stores the byte length in front of a block.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prefix {
    /// Block is written as is, reader must know the length.
    None,
    Fixed(LengthItem),
    VarUInt,
}

impl Prefix {
    /// Upper bound of the prefix size, used to reserve capacity before the length is encoded.
    pub const fn max_size(&self) -> usize {
        match self {
            Prefix::None => 0,
            Prefix::Fixed(item) => item.size(),
            Prefix::VarUInt => VarUInt::MAX_SIZE,
        }
    }

    /// Exact prefix size for a block of `len` bytes.
    pub fn len_bytes(&self, len: usize) -> Result<usize, Error> {
        match self {
            Prefix::None => Ok(0),
            Prefix::Fixed(item) => {
                if item.fits(len) {
                    Ok(item.size())
                } else {
                    Err(Error::LengthTooLong)
                }
            }
            Prefix::VarUInt => {
                let len = u64::try_from(len).map_err(|_| Error::LengthTooLong)?;
                Ok(VarUInt(len).len_bytes())
            }
        }
    }
}

impl From<LengthItem> for Prefix {
    fn from(item: LengthItem) -> Self {
        Prefix::Fixed(item)
    }
}
