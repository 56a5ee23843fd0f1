#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
//#![deny(unsafe_code)]
// - 'image/physical.rs' uses mmap to map a file into memory

//! # rttiscope
//!
//! A cross-platform library for recovering MSVC C++ run-time type information (RTTI)
//! from compiled binaries. Built in pure Rust, `rttiscope` decodes `TypeDescriptor`
//! and `BaseClassDescriptor` records, re-synthesizes the decorated names MSVC gives
//! special member functions, and supplies the scan primitives (wildcard byte matching,
//! relative branch resolution, candidate disambiguation) a vtable-driven class
//! recovery pass is built from - without requiring Windows or a debugger.
//!
//! ## Features
//!
//! - **Efficient memory access** - Memory-mapped file access or in-memory buffers
//!   behind one backend trait
//! - **RTTI record decoding** - `TypeDescriptor` and `BaseClassDescriptor` records
//!   with annotation write-back
//! - **Decorated-name synthesis** - Constructors, the destructor family and
//!   descriptor self-names, including this-adjustor thunk variants
//! - **Scan primitives** - Wildcard byte patterns, `E8`/`E9`/`EB` branch target
//!   resolution and constructor/destructor disambiguation
//! - **Host-neutral** - All annotation flows through one trait, so the same decoders
//!   drive a standalone [`crate::Image`] or an embedding's analysis database
//!
//! ## Quick Start
//!
//! Add `rttiscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! rttiscope = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust
//! use rttiscope::prelude::*;
//!
//! let mut data = vec![0u8; 0x40];
//! data[8..18].copy_from_slice(b".?AVFoo@@\0");
//! let mut image = Image::from_mem(data).with_base(Address::new(0x40_0000));
//!
//! let descriptor = TypeDescriptor::decode(&mut image, Address::new(0x40_0000))?;
//! assert_eq!(descriptor.base_name(), "Foo@@");
//! # Ok::<(), rttiscope::Error>(())
//! ```
//!
//! ### Naming What a Scan Finds
//!
//! ```rust
//! use rttiscope::mangling::{special_member_name, NameKind};
//!
//! // public: virtual void * __thiscall Foo::`scalar deleting destructor'(unsigned int)
//! assert_eq!(
//!     special_member_name("Foo@@", NameKind::ScalarDeletingDestructor, 0),
//!     "??_GFoo@@UAEPAXI@Z"
//! );
//! ```
//!
//! ## Architecture
//!
//! - [`crate::image`] - The address-space layer: backends, the [`crate::Image`]
//!   container and the [`crate::AddressSpace`] trait every decoder consumes
//! - [`crate::rtti`] - `TypeDescriptor` / `BaseClassDescriptor` record decoding
//! - [`crate::mangling`] - The mangled-number codec and decorated-name templates
//! - [`crate::analysis`] - Scan primitives and the candidate-disambiguation pass

#[macro_use]
pub(crate) mod error;

/// Scan primitives and constructor/destructor disambiguation.
pub mod analysis;
/// Binary image access and annotation write-back.
pub mod image;
/// MSVC decorated-name synthesis and the mangled-number codec.
pub mod mangling;
/// Common imports for working with this crate.
pub mod prelude;
/// MSVC RTTI record decoding.
pub mod rtti;

/// Result type alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

pub use error::Error;
pub use image::{Address, AddressSpace, FieldKind, Image};
