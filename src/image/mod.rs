//! Binary image abstraction with annotation write-back.
//!
//! This module provides the address-space layer every decoder in this crate is built on:
//! byte/dword-granularity reads from a binary image at a linear address, plus the write-side
//! annotation operations (names, comments, field markup) that turn a raw image into an
//! annotated one.
//!
//! # Architecture
//!
//! Reads and writes are split across three layers:
//!
//! - [`crate::image::Backend`] - Pluggable data sources (disk files, memory buffers)
//! - [`crate::image::Image`] - An image loaded at a base address, owning a backend and the
//!   annotation store
//! - [`crate::image::AddressSpace`] - The trait decoders consume; implemented by [`Image`]
//!   and by host integrations that bridge into a real analysis database
//!
//! # Key Components
//!
//! ## Core Types
//! - [`crate::image::Address`] - Opaque, totally-ordered linear address with an `INVALID` sentinel
//! - [`crate::image::AddressSpace`] - Read + annotate surface consumed by all decoders
//! - [`crate::image::Image`] - Default `AddressSpace` implementation over a [`Backend`]
//! - [`crate::image::FieldKind`] - Classification of annotated data fields
//!
//! ## Backend Implementations
//! - [`crate::image::Physical`] - Memory-mapped file backend for disk access
//! - [`crate::image::Memory`] - In-memory buffer backend
//!
//! # Examples
//!
//! ```rust
//! use rttiscope::{Address, AddressSpace, Image};
//!
//! let mut image = Image::from_mem(vec![0xE8, 0xFB, 0xFF, 0xFF, 0xFF])
//!     .with_base(Address::new(0x40_1000));
//!
//! assert_eq!(image.read_byte(Address::new(0x40_1000))?, 0xE8);
//! assert_eq!(image.read_dword(Address::new(0x40_1001))?, 0xFFFF_FFFB);
//!
//! assert!(image.annotate_comment(Address::new(0x40_1000), "thunk"));
//! # Ok::<(), rttiscope::Error>(())
//! ```

mod memory;
mod physical;

pub use memory::Memory;
pub use physical::Physical;

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Sub};
use std::path::Path;

use crate::{Error, Result};

/// An opaque linear address into a binary image.
///
/// Addresses are totally ordered, hashable and cheap to copy. The distinguished sentinel
/// [`Address::INVALID`] represents "no address" and is what failed resolutions return
/// instead of a real location. Address arithmetic never panics; operations that would
/// wrap around yield [`Address::INVALID`].
///
/// # Examples
///
/// ```rust
/// use rttiscope::Address;
///
/// let address = Address::new(0x40_1000);
/// assert_eq!((address + 5).value(), 0x40_1005);
/// assert_eq!(address.offset(-0x1000), Address::new(0x40_0000));
/// assert!(Address::INVALID.is_invalid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address {
    /// The "no address" sentinel.
    pub const INVALID: Address = Address(u64::MAX);

    /// Create an address from its linear value.
    #[must_use]
    pub const fn new(value: u64) -> Address {
        Address(value)
    }

    /// The raw linear value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns `true` for the [`Address::INVALID`] sentinel.
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        self.0 == u64::MAX
    }

    /// Returns `true` for the null address.
    ///
    /// A null pointer slot in an RTTI record means "no record here"; decoders treat it
    /// the same way as the sentinel.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Displace the address by a signed byte delta.
    ///
    /// The sentinel is sticky and any wraparound collapses to [`Address::INVALID`],
    /// so branch-target arithmetic over corrupt displacements stays total.
    #[must_use]
    pub fn offset(self, delta: i64) -> Address {
        if self.is_invalid() {
            return Address::INVALID;
        }

        match self.0.checked_add_signed(delta) {
            Some(value) => Address(value),
            None => Address::INVALID,
        }
    }
}

impl Add<u64> for Address {
    type Output = Address;

    fn add(self, rhs: u64) -> Address {
        if self.is_invalid() {
            return Address::INVALID;
        }

        match self.0.checked_add(rhs) {
            Some(value) => Address(value),
            None => Address::INVALID,
        }
    }
}

impl Sub<u64> for Address {
    type Output = Address;

    fn sub(self, rhs: u64) -> Address {
        if self.is_invalid() {
            return Address::INVALID;
        }

        match self.0.checked_sub(rhs) {
            Some(value) => Address(value),
            None => Address::INVALID,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            write!(f, "<invalid>")
        } else {
            write!(f, "{:#x}", self.0)
        }
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Classification of an annotated data field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A 32-bit little-endian integer field.
    Dword,
    /// A 32-bit field holding an address into the image.
    Offset,
    /// A NUL-terminated byte string.
    StringZ,
}

/// A field annotation recorded against an address.
///
/// `size` is the element size in bytes; `count` is 1 for scalar fields and the element
/// count for array fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAnnotation {
    /// Element size in bytes.
    pub size: u32,
    /// Number of elements (1 for scalar fields).
    pub count: u32,
    /// What the field holds.
    pub kind: FieldKind,
}

/// Read and annotation surface over a binary image.
///
/// This is the seam between the decoders in this crate and whatever holds the bytes - the
/// built-in [`Image`] for standalone use, or a host analysis database in an embedding.
/// Reads are bounds-checked and fallible; annotation writes are best-effort and report
/// success as `bool`, because a rejected annotation (e.g. a name collision in the host)
/// must not abort a decode that already has the logical field values in hand.
///
/// Annotation writes are idempotent: re-applying an identical annotation succeeds and
/// leaves the store unchanged.
pub trait AddressSpace {
    /// Read one byte at `address`.
    ///
    /// # Errors
    /// [`crate::Error::InvalidAddress`] for the sentinel, [`crate::Error::OutOfBounds`]
    /// outside the image.
    fn read_byte(&self, address: Address) -> Result<u8>;

    /// Read a little-endian dword at `address`.
    ///
    /// # Errors
    /// [`crate::Error::InvalidAddress`] for the sentinel, [`crate::Error::OutOfBounds`]
    /// outside the image.
    fn read_dword(&self, address: Address) -> Result<u32>;

    /// The display name currently assigned to `address`, if any.
    ///
    /// Names written by this crate are always decorated MSVC names; the
    /// constructor/destructor disambiguation pass relies on that to test for the
    /// `??1` destructor marker.
    fn name_at(&self, address: Address) -> Option<String>;

    /// Assign a display name to `address`. Returns `false` if the write was rejected.
    fn annotate_name(&mut self, address: Address, name: &str) -> bool;

    /// Attach a comment to `address`. Returns `false` if the write was rejected.
    fn annotate_comment(&mut self, address: Address, text: &str) -> bool;

    /// Mark `address` as a scalar data field of `size` bytes.
    /// Returns `false` if the write was rejected.
    fn annotate_data_field(&mut self, address: Address, size: u32, kind: FieldKind) -> bool;

    /// Mark `address` as an array of `count` elements of `element_size` bytes each.
    /// Returns `false` if the write was rejected.
    fn annotate_array_field(
        &mut self,
        address: Address,
        element_size: u32,
        count: u32,
        kind: FieldKind,
    ) -> bool;
}

/// Trait for abstracting the underlying data source of a binary image.
///
/// This trait allows [`Image`] to work with different data sources - memory-mapped
/// files for efficient disk access, or in-memory buffers for dynamic analysis -
/// through a common interface providing bounds-checked byte access.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    ///
    /// This is equivalent to `self.data().len()` but may be more efficient
    /// for some backend implementations.
    fn len(&self) -> usize;
}

/// A binary image loaded at a base address, with an annotation store.
///
/// `Image` is the default [`AddressSpace`] implementation: a [`Backend`] supplies the
/// bytes, the base address maps linear addresses onto backend offsets, and names,
/// comments and field markup written by the decoders land in ordered in-memory maps
/// that callers can read back.
///
/// Hosts embedding this crate into a real analysis database typically implement
/// [`AddressSpace`] themselves instead and route the annotation calls into the
/// database's naming and typing operations.
///
/// # Examples
///
/// ```rust
/// use rttiscope::{Address, AddressSpace, Image};
///
/// let data = vec![0x90, 0x12, 0x34, 0x56];
/// let mut image = Image::from_mem(data).with_base(Address::new(0x40_0000));
///
/// assert_eq!(image.read_dword(Address::new(0x40_0000))?, 0x5634_1290);
/// assert!(image.read_byte(Address::new(0x40_0004)).is_err());
///
/// image.annotate_name(Address::new(0x40_0000), "??0Foo@@QAE@XZ");
/// assert_eq!(image.name_at(Address::new(0x40_0000)).as_deref(), Some("??0Foo@@QAE@XZ"));
/// # Ok::<(), rttiscope::Error>(())
/// ```
pub struct Image {
    /// The data source
    backend: Box<dyn Backend>,
    /// Linear address the image is loaded at
    base: Address,
    /// Display names keyed by address
    names: BTreeMap<Address, String>,
    /// Comments keyed by address
    comments: BTreeMap<Address, String>,
    /// Field markup keyed by address
    fields: BTreeMap<Address, FieldAnnotation>,
}

impl Image {
    /// Load an image from a file on disk via a memory-mapped [`Physical`] backend.
    ///
    /// The image base defaults to zero; chain [`Image::with_base`] to relocate it.
    ///
    /// # Arguments
    /// * `path` - Path of the file to map
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped.
    pub fn from_file(path: &Path) -> Result<Image> {
        Ok(Image::from_backend(Box::new(Physical::new(path)?)))
    }

    /// Wrap an in-memory buffer in a [`Memory`] backend.
    ///
    /// The image base defaults to zero; chain [`Image::with_base`] to relocate it.
    #[must_use]
    pub fn from_mem(data: Vec<u8>) -> Image {
        Image::from_backend(Box::new(Memory::new(data)))
    }

    /// Build an image over a caller-supplied backend.
    #[must_use]
    pub fn from_backend(backend: Box<dyn Backend>) -> Image {
        Image {
            backend,
            base: Address::new(0),
            names: BTreeMap::new(),
            comments: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Set the linear address the image is loaded at.
    #[must_use]
    pub fn with_base(mut self, base: Address) -> Image {
        self.base = base;
        self
    }

    /// The linear address the image is loaded at.
    #[must_use]
    pub fn base(&self) -> Address {
        self.base
    }

    /// Total image size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backend.len()
    }

    /// Returns `true` if the image holds no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backend.len() == 0
    }

    /// The comment attached to `address`, if any.
    #[must_use]
    pub fn comment_at(&self, address: Address) -> Option<&str> {
        self.comments.get(&address).map(String::as_str)
    }

    /// The field markup recorded at `address`, if any.
    #[must_use]
    pub fn field_at(&self, address: Address) -> Option<FieldAnnotation> {
        self.fields.get(&address).copied()
    }

    /// Translate a linear address to a backend offset.
    fn translate(&self, address: Address) -> Result<usize> {
        if address.is_invalid() {
            return Err(Error::InvalidAddress);
        }

        let Some(relative) = address.value().checked_sub(self.base.value()) else {
            return Err(Error::OutOfBounds);
        };

        usize::try_from(relative).map_err(|_| Error::OutOfBounds)
    }

    /// Bounds-check an annotation target of `len` bytes, without reading it.
    fn covers(&self, address: Address, len: usize) -> bool {
        self.translate(address)
            .and_then(|offset| self.backend.data_slice(offset, len))
            .is_ok()
    }
}

impl AddressSpace for Image {
    fn read_byte(&self, address: Address) -> Result<u8> {
        let bytes = self.backend.data_slice(self.translate(address)?, 1)?;
        Ok(bytes[0])
    }

    fn read_dword(&self, address: Address) -> Result<u32> {
        let bytes = self.backend.data_slice(self.translate(address)?, 4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn name_at(&self, address: Address) -> Option<String> {
        self.names.get(&address).cloned()
    }

    fn annotate_name(&mut self, address: Address, name: &str) -> bool {
        if !self.covers(address, 1) {
            return false;
        }

        self.names.insert(address, name.to_owned());
        true
    }

    fn annotate_comment(&mut self, address: Address, text: &str) -> bool {
        if !self.covers(address, 1) {
            return false;
        }

        self.comments.insert(address, text.to_owned());
        true
    }

    fn annotate_data_field(&mut self, address: Address, size: u32, kind: FieldKind) -> bool {
        if size == 0 || !self.covers(address, size as usize) {
            return false;
        }

        self.fields.insert(
            address,
            FieldAnnotation {
                size,
                count: 1,
                kind,
            },
        );
        true
    }

    fn annotate_array_field(
        &mut self,
        address: Address,
        element_size: u32,
        count: u32,
        kind: FieldKind,
    ) -> bool {
        let total = element_size as usize * count as usize;
        if total == 0 || !self.covers(address, total) {
            return false;
        }

        self.fields.insert(
            address,
            FieldAnnotation {
                size: element_size,
                count,
                kind,
            },
        );
        true
    }
}
