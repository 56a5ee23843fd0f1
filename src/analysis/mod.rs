//! Low-level scan primitives and the candidate-disambiguation pass.
//!
//! These are the pieces a vtable/RTTI scanner is built from:
//!
//! - [`crate::analysis::match_bytes`] - exact byte-sequence matching with `??` wildcards
//! - [`crate::analysis::resolve_call`] / [`crate::analysis::resolve_jump`] - absolute
//!   targets of x86 near relative calls (`E8`) and short/near relative jumps (`EB`/`E9`)
//! - [`crate::analysis::CandidateRegistry`] - the ordered, de-duplicated address set a
//!   scan collects constructor/destructor candidates into
//! - [`crate::analysis::resolve_constructor_destructor`] - the pass that tells the two
//!   candidates apart and names the constructor
//!
//! The scanner itself - deciding which addresses look like vtables or RTTI blocks -
//! lives in the embedding host; this module only supplies the primitives it consumes.

pub mod branch;
pub mod pattern;
pub mod registry;

pub use branch::{resolve_call, resolve_jump};
pub use pattern::match_bytes;
pub use registry::{resolve_constructor_destructor, CandidateRegistry, CtorDtorPair};
