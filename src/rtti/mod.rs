//! MSVC RTTI record decoding.
//!
//! The Microsoft C++ ABI embeds per-class run-time type information in compiled
//! binaries: a `TypeDescriptor` carrying the mangled class name, and one
//! `BaseClassDescriptor` per (direct or indirect) base describing where that base
//! lives inside the derived object. This module decodes both record types out of an
//! [`crate::image::AddressSpace`], writes advisory annotations back (field markup,
//! comments, the descriptor's own decorated name), and hands the decoded values to
//! callers - typically a base-class-array walker driven by a vtable scan.
//!
//! The records pre-exist in the image, written by the original compiler; this module
//! only reads them and never mutates record bytes.
//!
//! # Key Components
//!
//! - [`crate::rtti::TypeDescriptor`] - the class-name record
//! - [`crate::rtti::BaseClassDescriptor`] - the per-base placement record
//! - [`crate::rtti::Pmd`] - the member-displacement triple locating a base
//! - [`crate::rtti::BaseClassAttributes`] - typed view of the descriptor attribute bits
//!
//! # Examples
//!
//! ```rust
//! use rttiscope::{Address, Image, rtti::BaseClassDescriptor};
//!
//! # let mut data = vec![0u8; 0x100];
//! # data[0x00..0x04].copy_from_slice(&0x40_0040u32.to_le_bytes());
//! # data[0x0C..0x10].copy_from_slice(&(-1i32).to_le_bytes());
//! # data[0x48..0x52].copy_from_slice(b".?AVFoo@@\0");
//! # let mut image = Image::from_mem(data).with_base(Address::new(0x40_0000));
//! let descriptor = BaseClassDescriptor::decode(&mut image, Address::new(0x40_0000))?;
//! assert_eq!(descriptor.base_name, "Foo@@");
//! # Ok::<(), rttiscope::Error>(())
//! ```

pub mod base_class_descriptor;
pub mod type_descriptor;

pub use base_class_descriptor::BaseClassDescriptor;
pub use type_descriptor::TypeDescriptor;

use bitflags::bitflags;
use std::fmt;

/// The PMD displacement triple locating a base class inside a derived object.
///
/// `mdisp` is the member displacement from the start of the object. When the base is
/// virtual, `pdisp` gives the displacement of the vbtable pointer (`-1` when there is
/// no vbtable involved) and `vdisp` the displacement of the base's entry inside that
/// vbtable. Pure value type with no identity of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pmd {
    /// Member displacement.
    pub mdisp: i32,
    /// Vbtable displacement, `-1` if none.
    pub pdisp: i32,
    /// Displacement inside the vbtable.
    pub vdisp: i32,
}

impl Pmd {
    /// Construct a displacement triple.
    #[must_use]
    pub const fn new(mdisp: i32, pdisp: i32, vdisp: i32) -> Pmd {
        Pmd {
            mdisp,
            pdisp,
            vdisp,
        }
    }

    /// Whether locating the base goes through a vbtable.
    #[must_use]
    pub const fn has_virtual_base(self) -> bool {
        self.pdisp != -1
    }
}

impl fmt::Display for Pmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.mdisp, self.pdisp, self.vdisp)
    }
}

bitflags! {
    /// Attribute bits of a `BaseClassDescriptor`.
    ///
    /// The raw word is opaque to name synthesis (it rides through the mangled-number
    /// codec unchanged); this typed view exists for inspection and filtering. Unknown
    /// bits are retained.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BaseClassAttributes: u32 {
        /// Base is not publicly visible from the complete object.
        const NOT_VISIBLE = 0x01;
        /// Base appears ambiguously in the hierarchy.
        const AMBIGUOUS = 0x02;
        /// Base is inherited privately or protectedly.
        const PRIVATE_OR_PROTECTED_BASE = 0x04;
        /// Base is private or protected somewhere up the derivation chain.
        const PRIVATE_OR_PROTECTED_IN_DERIVED = 0x08;
        /// Base is a virtual base of the containing object.
        const VIRTUAL_BASE_OF_CONTAINING_OBJECT = 0x10;
        /// Base is non-polymorphic (carries no RTTI of its own).
        const NON_POLYMORPHIC = 0x20;
        /// Descriptor is followed by a pointer to the hierarchy descriptor.
        const HAS_HIERARCHY_DESCRIPTOR = 0x40;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pmd_display_matches_the_descriptor_comment_form() {
        assert_eq!(Pmd::new(0, -1, 0).to_string(), "(0,-1,0)");
        assert_eq!(Pmd::new(4, 8, 12).to_string(), "(4,8,12)");
    }

    #[test]
    fn pmd_virtual_base_detection() {
        assert!(!Pmd::new(0, -1, 0).has_virtual_base());
        assert!(Pmd::new(0, 4, 8).has_virtual_base());
    }

    #[test]
    fn attribute_bits_retain_unknown_values() {
        let attributes = BaseClassAttributes::from_bits_retain(0x8000_0041);
        assert!(attributes.contains(BaseClassAttributes::NOT_VISIBLE));
        assert!(attributes.contains(BaseClassAttributes::HAS_HIERARCHY_DESCRIPTOR));
        assert_eq!(attributes.bits(), 0x8000_0041);
    }
}
