//! Physical file backend for memory-mapped I/O.
//!
//! This module provides the [`crate::image::Physical`] backend that implements the
//! [`crate::image::Backend`] trait for accessing image files from disk using memory-mapped
//! I/O. Binaries under analysis can be large and RTTI records are accessed in a
//! non-sequential pattern, so mapping the file beats reading it into memory upfront:
//! only the pages actually touched are loaded, and the OS handles caching.
//!
//! # Usage
//!
//! ```rust,no_run
//! use rttiscope::image::{Backend, Physical};
//! use std::path::Path;
//!
//! let physical = Physical::new(Path::new("target.exe"))?;
//! println!("Image size: {} bytes", physical.len());
//!
//! // Read the DOS signature
//! let header = physical.data_slice(0, 2)?;
//! assert_eq!(header, b"MZ");
//! # Ok::<(), rttiscope::Error>(())
//! ```

use super::Backend;
use crate::Result;

use memmap2::Mmap;
use std::{fs, path::Path};

/// A backend that maps an image file on disk into the process's address space.
///
/// All access goes through [`Backend::data_slice`] and is bounds-checked; the mapping
/// itself is read-only.
#[derive(Debug)]
pub struct Physical {
    /// Memory-mapped file data
    data: Mmap,
}

impl Physical {
    /// Map the file at `path` read-only.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped.
    pub fn new(path: &Path) -> Result<Physical> {
        let file = fs::File::open(path)?;

        // Safety: the mapping is read-only and this crate never truncates the file
        // while it is mapped. An external writer invalidating the mapping is the
        // same hazard every mmap-based reader accepts.
        let data = unsafe { Mmap::map(&file)? };

        Ok(Physical { data })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(offset_end) = offset.checked_add(len) else {
            return Err(crate::Error::OutOfBounds);
        };

        if offset_end > self.data.len() {
            return Err(crate::Error::OutOfBounds);
        }

        Ok(&self.data[offset..offset_end])
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
