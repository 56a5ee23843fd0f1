//! Decorated-name templates for the symbols RTTI recovery re-derives.
//!
//! Only the MSVC `__thiscall` member-function subset is covered: the five special
//! member kinds a vtable/RTTI scan can attribute to a class, plus the `??_R1...8`
//! self-name of a `BaseClassDescriptor` record. A general demangler is explicitly
//! out of scope.

use super::number::encode_number;
use crate::rtti::Pmd;

/// The special-member symbol kinds this crate can synthesize names for.
///
/// The set is closed; anything else an analysis discovers keeps its scan-assigned name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    /// `??0Name@@QAE@XZ` - public `__thiscall` constructor.
    Constructor,
    /// `??1Name@@QAE@XZ` - public `__thiscall` destructor.
    Destructor,
    /// `??1Name@@UAE@XZ` - public virtual `__thiscall` destructor.
    VirtualDestructor,
    /// `??_GName@@UAEPAXI@Z` - `` `scalar deleting destructor'(unsigned int) ``.
    ScalarDeletingDestructor,
    /// `??_EName@@QAEPAXI@Z` - `` `vector deleting destructor'(unsigned int) ``.
    VectorDeletingDestructor,
}

/// Build the decorated name of a special member function.
///
/// `base_name` is the class name with the leading 4-character RTTI tag already
/// stripped (e.g. `Foo@@` from `.?AVFoo@@`); see
/// [`crate::rtti::TypeDescriptor::base_name`]. A non-zero `adjustor` produces the
/// thunk variant that embeds the mangled this-displacement between a `W` marker and
/// the calling-convention tag, as the compiler does for multiple-inheritance thunks.
///
/// # Examples
///
/// ```rust
/// use rttiscope::mangling::{special_member_name, NameKind};
///
/// assert_eq!(
///     special_member_name("Foo@@", NameKind::VirtualDestructor, 0),
///     "??1Foo@@UAE@XZ"
/// );
/// assert_eq!(
///     special_member_name("Foo@@", NameKind::Destructor, 5),
///     "??1Foo@@W4AE@XZ"
/// );
/// ```
#[must_use]
pub fn special_member_name(base_name: &str, kind: NameKind, adjustor: i32) -> String {
    let (prefix, access, suffix) = match kind {
        NameKind::Constructor => ("??0", 'Q', "@XZ"),
        NameKind::Destructor => ("??1", 'Q', "@XZ"),
        NameKind::VirtualDestructor => ("??1", 'U', "@XZ"),
        NameKind::ScalarDeletingDestructor => ("??_G", 'U', "PAXI@Z"),
        NameKind::VectorDeletingDestructor => ("??_E", 'Q', "PAXI@Z"),
    };

    if adjustor == 0 {
        format!("{prefix}{base_name}{access}AE{suffix}")
    } else {
        format!(
            "{prefix}{base_name}W{}AE{suffix}",
            encode_number(adjustor)
        )
    }
}

/// Build the `??_R1...8` self-name of a `BaseClassDescriptor` record.
///
/// Demangles to `` Name::`RTTI Base Class Descriptor at (mdisp,pdisp,vdisp,attributes)' ``.
/// The attribute word rides through the signed codec unchanged, matching the encoding
/// the compiler itself emits.
///
/// # Examples
///
/// ```rust
/// use rttiscope::{mangling::base_class_descriptor_name, rtti::Pmd};
///
/// assert_eq!(
///     base_class_descriptor_name("B@@", Pmd::new(0, -1, 0), 0),
///     "??_R1A@?0A@A@B@@8"
/// );
/// ```
#[must_use]
pub fn base_class_descriptor_name(base_name: &str, pmd: Pmd, attributes: u32) -> String {
    #[allow(clippy::cast_possible_wrap)]
    let attributes = attributes as i32;

    format!(
        "??_R1{}{}{}{}{}8",
        encode_number(pmd.mdisp),
        encode_number(pmd.pdisp),
        encode_number(pmd.vdisp),
        encode_number(attributes),
        base_name
    )
}
