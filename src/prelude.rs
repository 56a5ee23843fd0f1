//! # rttiscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and
//! functions from the rttiscope library. Import this module to get quick access to the
//! essential pieces of an RTTI recovery pass.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all rttiscope operations
pub use crate::Error;

/// The result type used throughout rttiscope
pub use crate::Result;

// ================================================================================================
// Image Access
// ================================================================================================

/// Linear addresses and the read/annotate surface decoders consume
pub use crate::image::{Address, AddressSpace, FieldKind, Image};

/// Pluggable data-source backends
pub use crate::image::{Backend, Memory, Physical};

// ================================================================================================
// RTTI Records
// ================================================================================================

/// Decoded RTTI record types
pub use crate::rtti::{BaseClassAttributes, BaseClassDescriptor, Pmd, TypeDescriptor};

// ================================================================================================
// Name Synthesis
// ================================================================================================

/// Decorated-name templates and the mangled-number codec
pub use crate::mangling::{
    base_class_descriptor_name, decode_number, encode_number, special_member_name, NameKind,
};

// ================================================================================================
// Scan Primitives
// ================================================================================================

/// Byte-pattern matching, branch resolution and candidate disambiguation
pub use crate::analysis::{
    match_bytes, resolve_call, resolve_constructor_destructor, resolve_jump, CandidateRegistry,
    CtorDtorPair,
};
