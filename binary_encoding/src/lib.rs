#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use buf_reader::BufReader;
pub use buf_writer::BufWriter;
pub use encoded_data::EncodedData;
pub use traits::{LengthItem, NativeEncoding, Prefix, SequenceItem, SizeOf};
pub use var_uint::VarUInt;

mod access;
pub mod buf_reader;
pub mod buf_writer;
pub mod encoded_data;
pub mod traits;
pub mod var_uint;

#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Read past the logical length or write past the allocated capacity.
    #[error("buffer is too short")]
    BufferTooShort,
    /// VarUInt continuation bit did not clear within [VarUInt::MAX_SIZE] bytes.
    #[error("varint is too long")]
    VarintTooLong,
    #[error("string is not valid UTF-8")]
    StringIsNotUtf8,
    /// Block length does not fit into the requested fixed width length prefix.
    #[error("length does not fit into the length prefix")]
    LengthTooLong,
}

pub mod prelude {
    pub use crate::buf_reader::BufReader;
    pub use crate::buf_writer::BufWriter;
    pub use crate::encoded_data::EncodedData;
    pub use crate::traits::{LengthItem, NativeEncoding, Prefix, SequenceItem, SizeOf};
    pub use crate::var_uint::VarUInt;
    pub use crate::Error as BinaryEncodingError;
}
