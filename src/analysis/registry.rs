//! Candidate collection and constructor/destructor disambiguation.

use std::collections::BTreeSet;

use crate::{
    analysis::resolve_jump,
    image::{Address, AddressSpace},
    mangling::{special_member_name, NameKind},
    Error, Result,
};

/// Decorated-name prefix of an MSVC destructor (`??1Name@@...`).
const DESTRUCTOR_MARKER: &str = "??1";

/// The ordered, de-duplicated set of addresses a scan collects candidates into.
///
/// Vtable scans find the same constructor or destructor through multiple references,
/// and find them in whatever order the references appear. The registry absorbs both:
/// inserts de-duplicate, and iteration is always in ascending address order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateRegistry {
    entries: BTreeSet<Address>,
}

impl CandidateRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> CandidateRegistry {
        CandidateRegistry::default()
    }

    /// Insert a candidate address, keeping the set sorted and de-duplicated.
    ///
    /// Returns `true` if the address was not already present.
    pub fn insert_sorted(&mut self, address: Address) -> bool {
        self.entries.insert(address)
    }

    /// Whether `address` has been collected.
    #[must_use]
    pub fn contains(&self, address: Address) -> bool {
        self.entries.contains(&address)
    }

    /// Number of distinct candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lowest collected address, if any.
    #[must_use]
    pub fn first(&self) -> Option<Address> {
        self.entries.first().copied()
    }

    /// Highest collected address, if any.
    #[must_use]
    pub fn last(&self) -> Option<Address> {
        self.entries.last().copied()
    }

    /// Iterate candidates in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = Address> + '_ {
        self.entries.iter().copied()
    }

    /// Drop all collected candidates.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// The resolved constructor/destructor pair of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtorDtorPair {
    /// Address of the constructor.
    pub constructor: Address,
    /// Address of the destructor (or the thunk jumping to it).
    pub destructor: Address,
}

/// Tell a class's constructor and destructor apart and name the constructor.
///
/// A scan that walks a class's vtable references ends up with two candidate routines
/// it cannot tell apart from shape alone: the constructor and the destructor both
/// take `this` and touch the vtable pointer. What does distinguish them is that the
/// destructor is usually already named - exported, or recovered from a vector-deleting
/// destructor - while the constructor never is. This pass classifies each candidate by
/// whether its name (following one `jmp` thunk if present) starts with the `??1`
/// destructor marker, then writes `??0{base_name}@...` onto the other one.
///
/// Returns `Ok(None)` when the situation is not the clean two-candidate case: a
/// different candidate count, both candidates classifying the same way, or either
/// classification coming up empty. Ambiguity is a non-answer, not an error.
///
/// The registry is consumed; its lifetime is one scan.
///
/// # Errors
/// - read errors from following thunks propagate
/// - [`crate::Error::AnnotationFailed`] if the address space rejects the
///   constructor's new name
pub fn resolve_constructor_destructor(
    space: &mut dyn AddressSpace,
    registry: CandidateRegistry,
    base_name: &str,
) -> Result<Option<CtorDtorPair>> {
    if registry.len() != 2 {
        return Ok(None);
    }

    let mut constructor = Address::INVALID;
    let mut destructor = Address::INVALID;
    for candidate in registry.iter() {
        // Exported destructors often sit behind a jump thunk; classify the target.
        let target = resolve_jump(space, candidate)?;
        let named = if target.is_invalid() { candidate } else { target };

        let is_destructor = space
            .name_at(named)
            .is_some_and(|name| name.starts_with(DESTRUCTOR_MARKER));
        if is_destructor {
            destructor = candidate;
        } else {
            constructor = candidate;
        }
    }

    if constructor.is_invalid() || destructor.is_invalid() {
        return Ok(None);
    }

    let name = special_member_name(base_name, NameKind::Constructor, 0);
    if !space.annotate_name(constructor, &name) {
        return Err(Error::AnnotationFailed(format!(
            "could not name constructor {name:?} at {constructor}"
        )));
    }

    Ok(Some(CtorDtorPair {
        constructor,
        destructor,
    }))
}
