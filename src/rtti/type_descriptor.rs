//! `TypeDescriptor` record decoding.

use crate::{
    image::{Address, AddressSpace, FieldKind},
    Error, Result,
};

/// Size of the header (`pVFTable` + `spare`) preceding the name bytes.
pub const TYPE_DESCRIPTOR_HEADER_SIZE: u64 = 8;

/// Length of the RTTI tag (`.?AV`, `.?AU`, ...) prefixing every descriptor name.
pub const RTTI_TAG_LEN: usize = 4;

/// Upper bound for the name scan; anything longer is treated as corrupt data rather
/// than scanned unboundedly.
pub const MAX_TYPE_NAME_LEN: usize = 2048;

/// A decoded MSVC `TypeDescriptor` record.
///
/// The record layout is a `pVFTable` pointer and an unused `spare` dword, followed by
/// the NUL-terminated mangled RTTI name of the class (e.g. `.?AVFoo@@` for
/// `class Foo`). [`TypeDescriptor::decode`] returns the name raw, tag included;
/// callers that need the class's base name apply [`TypeDescriptor::base_name`], which
/// keeps the trim policy visible at the call site instead of hidden in the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Where the record lives.
    pub address: Address,
    /// The raw RTTI name, tag included.
    pub name: String,
}

impl TypeDescriptor {
    /// Decode the `TypeDescriptor` record at `address`.
    ///
    /// Reads the NUL-terminated name starting past the fixed header, bounded by
    /// [`MAX_TYPE_NAME_LEN`], and validates the RTTI name invariant (leading `.`,
    /// longer than the tag). As a side effect the record is annotated in the address
    /// space as structured data - an offset field, the spare dword and the name
    /// string - so later passes see it as a record rather than opaque bytes.
    /// Annotation rejections never abort the decode.
    ///
    /// # Errors
    /// - [`crate::Error::InvalidAddress`] for a null or sentinel address
    /// - [`crate::Error::OutOfBounds`] if the record runs past the image
    /// - [`crate::Error::Malformed`] for an unterminated or tag-less name
    pub fn decode(space: &mut dyn AddressSpace, address: Address) -> Result<TypeDescriptor> {
        if address.is_invalid() || address.is_null() {
            return Err(Error::InvalidAddress);
        }

        let name_start = address + TYPE_DESCRIPTOR_HEADER_SIZE;
        let mut raw = Vec::new();
        loop {
            let byte = space.read_byte(name_start + raw.len() as u64)?;
            if byte == 0 {
                break;
            }

            raw.push(byte);
            if raw.len() > MAX_TYPE_NAME_LEN {
                return Err(malformed_error!("unterminated type name at {}", address));
            }
        }

        let name = String::from_utf8(raw)
            .map_err(|_| malformed_error!("non-ASCII type name at {}", address))?;
        if !name.starts_with('.') || name.len() <= RTTI_TAG_LEN {
            return Err(malformed_error!(
                "type name {:?} at {} is missing the RTTI tag",
                name,
                address
            ));
        }

        // Advisory markup; the logical fields are already in hand.
        space.annotate_data_field(address, 4, FieldKind::Offset);
        space.annotate_comment(address, "pVFTable");
        space.annotate_data_field(address + 4, 4, FieldKind::Dword);
        space.annotate_comment(address + 4, "spare");
        #[allow(clippy::cast_possible_truncation)]
        space.annotate_data_field(name_start, name.len() as u32 + 1, FieldKind::StringZ);

        Ok(TypeDescriptor { address, name })
    }

    /// The class name with the leading RTTI tag stripped (`.?AVFoo@@` -> `Foo@@`).
    ///
    /// This is the form every decorated-name template in [`crate::mangling`] consumes.
    #[must_use]
    pub fn base_name(&self) -> &str {
        &self.name[RTTI_TAG_LEN..]
    }
}
