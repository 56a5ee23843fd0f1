//! MSVC decorated-name synthesis.
//!
//! The MSVC ABI encodes type and calling-convention information into symbol names
//! ("decoration"). This module re-synthesizes the small subset of that grammar needed to
//! name what RTTI recovery discovers: special member functions (constructors and the
//! destructor family) and the self-names of `RTTI Base Class Descriptor` records.
//!
//! # Key Components
//!
//! - [`crate::mangling::encode_number`] / [`crate::mangling::decode_number`] - the compact
//!   "mangled number" codec used for displacements and counts inside decorated names
//! - [`crate::mangling::NameKind`] - the five special-member symbol kinds this crate emits
//! - [`crate::mangling::special_member_name`] - decorated name for a special member,
//!   including the `W`-marked this-adjustor variant for multiple-inheritance thunks
//! - [`crate::mangling::base_class_descriptor_name`] - the `??_R1...8` self-name of a
//!   base class descriptor record
//!
//! # Examples
//!
//! ```rust
//! use rttiscope::mangling::{special_member_name, NameKind};
//!
//! // public: __thiscall Foo::Foo(void)
//! assert_eq!(
//!     special_member_name("Foo@@", NameKind::Constructor, 0),
//!     "??0Foo@@QAE@XZ"
//! );
//! ```

pub mod name;
pub mod number;

pub use name::{base_class_descriptor_name, special_member_name, NameKind};
pub use number::{decode_number, encode_number};
