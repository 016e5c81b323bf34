use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::{self, Debug};
use core::hash::{Hash, Hasher};

use crate::{BufReader, BufWriter, Error};

/// Physical storage, possibly shared between several [EncodedData] values.
struct Storage {
    /// Allocated bytes, zeroed on allocation. Only `bytes[..len]` is ever readable.
    bytes: Box<[u8]>,
    len: usize,
}

impl Storage {
    fn with_capacity(capacity: usize) -> Self {
        Storage {
            bytes: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// New storage with at least `capacity` bytes holding a copy of the valid bytes.
    fn copy_of(&self, capacity: usize) -> Self {
        let mut storage = Storage::with_capacity(capacity.max(self.len));
        storage.bytes[..self.len].copy_from_slice(self.valid());
        storage.len = self.len;
        storage
    }

    fn valid(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl Clone for Storage {
    fn clone(&self) -> Self {
        self.copy_of(self.bytes.len())
    }
}

/// Growable byte buffer with value semantics.
///
/// Cloning is cheap: clones share one physical storage until one of them is mutated, at which
/// point the mutated value gets a private copy first. Mutating one value is never observable
/// through another.
///
/// Capacity is the number of allocated bytes, length is the number of valid (written) bytes.
/// Reads are bounded by the length, writes by the capacity, and every write that ends past
/// the current length extends it. Appending is writing at the current length.
///
/// # Example
/// ```
/// use binary_encoding::{EncodedData, Prefix, SizeOf};
///
/// let mut data = EncodedData::new();
/// data.append(10i32).unwrap();
/// data.append_str("hi", Prefix::VarUInt).unwrap();
///
/// let snapshot = data.clone();
/// data.append_var_uint(200).unwrap();
/// assert_eq!(snapshot.len(), 7);
/// assert_eq!(data.len(), 9);
///
/// let mut offset = 0;
/// assert_eq!(data.read::<i32>(&mut offset), Ok(10));
/// assert_eq!(data.read_str(SizeOf::VarUInt, &mut offset).as_deref(), Ok("hi"));
/// assert_eq!(data.read_var_uint(&mut offset), Ok(200));
/// assert_eq!(offset, data.len());
/// ```
#[derive(Clone)]
pub struct EncodedData {
    storage: Rc<Storage>,
}

impl EncodedData {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Empty buffer with at least `minimum_capacity` bytes allocated.
    pub fn with_capacity(minimum_capacity: usize) -> Self {
        EncodedData {
            storage: Rc::new(Storage::with_capacity(minimum_capacity)),
        }
    }

    /// Buffer holding a copy of `bytes`.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut storage = Storage::with_capacity(bytes.len());
        storage.bytes.copy_from_slice(bytes);
        storage.len = bytes.len();
        EncodedData {
            storage: Rc::new(storage),
        }
    }

    /// Number of valid bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of allocated bytes of the current physical storage.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.bytes.len()
    }

    /// Valid bytes, allocated but unwritten capacity is not included.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.storage.valid()
    }

    /// Make sure at least `minimum_capacity` bytes are allocated.
    /// Does nothing if there is enough capacity already, otherwise moves the valid bytes to new storage.
    /// Grows at least twice, so that repeated appends are amortised.
    pub fn reserve_capacity(&mut self, minimum_capacity: usize) {
        if self.capacity() >= minimum_capacity {
            return;
        }
        let capacity = minimum_capacity.max(self.capacity().saturating_mul(2));
        self.detach(capacity);
    }

    /// Shorten to `len` valid bytes, capacity is kept. Does nothing if `len` is not less than the current length.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len() {
            return;
        }
        let capacity = self.capacity();
        self.ensure_unique_storage(capacity).len = len;
    }

    /// Drop all valid bytes, capacity is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Copy-on-write gate, must be passed before any mutation.
    ///
    /// Sole owner only grows if needed. Shared storage is never mutated in place, so a private
    /// copy is allocated even if the current capacity would be enough.
    fn ensure_unique_storage(&mut self, minimum_capacity: usize) -> &mut Storage {
        if Rc::get_mut(&mut self.storage).is_some() {
            self.reserve_capacity(minimum_capacity);
        } else {
            self.detach(minimum_capacity);
        }
        // storage is unique at this point, make_mut won't clone
        Rc::make_mut(&mut self.storage)
    }

    fn detach(&mut self, minimum_capacity: usize) {
        #[cfg(feature = "defmt-extended")]
        defmt::trace!(
            "detach: len={} capacity={} -> {} shared={}",
            self.len(),
            self.capacity(),
            minimum_capacity.max(self.len()),
            Rc::strong_count(&self.storage) > 1
        );
        #[cfg(feature = "tracing-extended")]
        tracing::trace!(
            "detach: len={} capacity={} -> {} shared={}",
            self.len(),
            self.capacity(),
            minimum_capacity.max(self.len()),
            Rc::strong_count(&self.storage) > 1
        );

        self.storage = Rc::new(self.storage.copy_of(minimum_capacity));
    }

    /// Scoped read access through a [BufReader] positioned at `offset`.
    /// `offset` is moved past the consumed bytes only if `f` succeeds.
    pub(crate) fn read_at<T>(
        &self,
        offset: &mut usize,
        f: impl FnOnce(&mut BufReader) -> Result<T, Error>,
    ) -> Result<T, Error> {
        if *offset > self.len() {
            return Err(Error::BufferTooShort);
        }
        let mut rd = BufReader::at(self.as_bytes(), *offset);
        let value = f(&mut rd)?;
        *offset = rd.pos();
        Ok(value)
    }

    /// Scoped write access through a [BufWriter] positioned at `offset` and spanning the whole capacity.
    ///
    /// `max_size` is the upper bound of bytes `f` is going to write, storage is made unique and big enough
    /// for it up front. On success `offset` is moved past the written bytes and the length is extended to it.
    ///
    /// # Panics
    /// If `offset` is past the current length, there would be a gap of unwritten bytes otherwise.
    pub(crate) fn write_at(
        &mut self,
        offset: &mut usize,
        max_size: usize,
        f: impl FnOnce(&mut BufWriter) -> Result<(), Error>,
    ) -> Result<(), Error> {
        assert!(
            *offset <= self.len(),
            "write offset {} is past the end of data ({} bytes)",
            *offset,
            self.len()
        );
        let storage = self.ensure_unique_storage(*offset + max_size);
        let mut wr = BufWriter::at(&mut storage.bytes, *offset);
        f(&mut wr)?;
        let end = wr.pos();
        storage.len = storage.len.max(end);
        *offset = end;
        Ok(())
    }
}

impl Default for EncodedData {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for EncodedData {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<&[u8]> for EncodedData {
    fn from(bytes: &[u8]) -> Self {
        Self::from_slice(bytes)
    }
}

impl<const N: usize> From<[u8; N]> for EncodedData {
    fn from(bytes: [u8; N]) -> Self {
        Self::from_slice(&bytes)
    }
}

impl From<Vec<u8>> for EncodedData {
    fn from(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        EncodedData {
            storage: Rc::new(Storage {
                bytes: bytes.into_boxed_slice(),
                len,
            }),
        }
    }
}

impl FromIterator<u8> for EncodedData {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<u8>>())
    }
}

impl PartialEq for EncodedData {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        Rc::ptr_eq(&self.storage, &other.storage) || self.as_bytes() == other.as_bytes()
    }
}

impl Eq for EncodedData {}

impl Hash for EncodedData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl Debug for EncodedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedData([{}/{}] <", self.len(), self.capacity())?;
        for (i, byte) in self.as_bytes().iter().enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        f.write_str(">)")
    }
}
