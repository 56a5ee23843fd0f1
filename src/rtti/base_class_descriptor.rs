//! `BaseClassDescriptor` record decoding.

use crate::{
    image::{Address, AddressSpace, FieldKind},
    mangling::base_class_descriptor_name,
    rtti::{BaseClassAttributes, Pmd, TypeDescriptor},
    Error, Result,
};

/// Byte offsets of the record fields.
const OFFSET_TYPE_DESCRIPTOR: u64 = 0;
const OFFSET_NUM_CONTAINED_BASES: u64 = 4;
const OFFSET_PMD: u64 = 8;
const OFFSET_ATTRIBUTES: u64 = 20;

/// A decoded MSVC `BaseClassDescriptor` record.
///
/// One of these exists per base class reachable from a polymorphic type; the compiler
/// chains them into a base-class array that a hierarchy walker iterates over. Decoding
/// dereferences the embedded [`TypeDescriptor`] to recover the base's class name, and
/// writes the record's own `??_R1...8` decorated self-name back into the address space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseClassDescriptor {
    /// Where the record lives.
    pub address: Address,
    /// Address of the embedded [`TypeDescriptor`].
    pub type_descriptor: Address,
    /// How many bases this base itself contains (sibling count for the array walker).
    pub num_contained_bases: u32,
    /// Where the base lives inside the derived object.
    pub pmd: Pmd,
    /// Raw attribute word.
    pub attributes: u32,
    /// Class name of the base with the RTTI tag stripped (e.g. `Foo@@`).
    pub base_name: String,
}

impl BaseClassDescriptor {
    /// Decode the `BaseClassDescriptor` record at `address`.
    ///
    /// Each step is independently fallible and failures are scoped to this record: a
    /// scan that hits a malformed descriptor skips it and continues. Field markup is
    /// advisory and written before the reads - a rejected annotation does not abort
    /// the decode, since the logical fields come from the raw reads regardless.
    ///
    /// # Errors
    /// - [`crate::Error::InvalidAddress`] for a null or sentinel address
    /// - [`crate::Error::OutOfBounds`] if the record runs past the image
    /// - [`crate::Error::Malformed`] if the embedded [`TypeDescriptor`] is malformed
    pub fn decode(space: &mut dyn AddressSpace, address: Address) -> Result<BaseClassDescriptor> {
        if address.is_invalid() || address.is_null() {
            return Err(Error::InvalidAddress);
        }

        space.annotate_data_field(address + OFFSET_TYPE_DESCRIPTOR, 4, FieldKind::Offset);
        space.annotate_comment(address + OFFSET_TYPE_DESCRIPTOR, "pTypeDescriptor");
        space.annotate_data_field(address + OFFSET_NUM_CONTAINED_BASES, 4, FieldKind::Dword);
        space.annotate_comment(address + OFFSET_NUM_CONTAINED_BASES, "numContainedBases");
        space.annotate_array_field(address + OFFSET_PMD, 4, 3, FieldKind::Dword);
        space.annotate_comment(address + OFFSET_PMD, "PMD where");
        space.annotate_data_field(address + OFFSET_ATTRIBUTES, 4, FieldKind::Dword);
        space.annotate_comment(address + OFFSET_ATTRIBUTES, "attributes");

        let type_descriptor = Address::new(u64::from(
            space.read_dword(address + OFFSET_TYPE_DESCRIPTOR)?,
        ));
        let descriptor = TypeDescriptor::decode(space, type_descriptor)?;

        let num_contained_bases = space.read_dword(address + OFFSET_NUM_CONTAINED_BASES)?;
        #[allow(clippy::cast_possible_wrap)]
        let pmd = Pmd::new(
            space.read_dword(address + OFFSET_PMD)? as i32,
            space.read_dword(address + OFFSET_PMD + 4)? as i32,
            space.read_dword(address + OFFSET_PMD + 8)? as i32,
        );
        let attributes = space.read_dword(address + OFFSET_ATTRIBUTES)?;

        let decoded = BaseClassDescriptor {
            address,
            type_descriptor,
            num_contained_bases,
            pmd,
            attributes,
            base_name: descriptor.base_name().to_owned(),
        };

        space.annotate_name(address, &decoded.self_name());

        Ok(decoded)
    }

    /// The record's own decorated name, `` Name::`RTTI Base Class Descriptor at
    /// (mdisp,pdisp,vdisp,attributes)' `` in demangled form.
    #[must_use]
    pub fn self_name(&self) -> String {
        base_class_descriptor_name(&self.base_name, self.pmd, self.attributes)
    }

    /// Typed view of the attribute bits; unknown bits are retained.
    #[must_use]
    pub fn attribute_flags(&self) -> BaseClassAttributes {
        BaseClassAttributes::from_bits_retain(self.attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;

    const BASE: u64 = 0x40_0000;
    const DESCRIPTOR: u64 = 0x40_0100;
    const TYPE_DESC: u64 = 0x40_0200;

    fn put_dword(data: &mut [u8], offset: usize, value: u32) {
        data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn well_formed_image() -> Image {
        let mut data = vec![0u8; 0x400];

        // BaseClassDescriptor at 0x100
        put_dword(&mut data, 0x100, TYPE_DESC as u32); // pTypeDescriptor
        put_dword(&mut data, 0x104, 1); // numContainedBases
        put_dword(&mut data, 0x108, 0); // mdisp
        put_dword(&mut data, 0x10C, (-1i32) as u32); // pdisp
        put_dword(&mut data, 0x110, 0); // vdisp
        put_dword(&mut data, 0x114, 0); // attributes

        // TypeDescriptor at 0x200
        put_dword(&mut data, 0x200, 0x40_3000); // pVFTable
        data[0x208..0x212].copy_from_slice(b".?AVFoo@@\0");

        Image::from_mem(data).with_base(Address::new(BASE))
    }

    #[test]
    fn decodes_a_well_formed_record() {
        let mut image = well_formed_image();
        let descriptor =
            BaseClassDescriptor::decode(&mut image, Address::new(DESCRIPTOR)).unwrap();

        assert_eq!(descriptor.address, Address::new(DESCRIPTOR));
        assert_eq!(descriptor.type_descriptor, Address::new(TYPE_DESC));
        assert_eq!(descriptor.num_contained_bases, 1);
        assert_eq!(descriptor.pmd, Pmd::new(0, -1, 0));
        assert_eq!(descriptor.attributes, 0);
        assert_eq!(descriptor.base_name, "Foo@@");
        assert_eq!(descriptor.self_name(), "??_R1A@?0A@A@Foo@@8");
    }

    #[test]
    fn writes_the_self_name_and_field_markup() {
        let mut image = well_formed_image();
        BaseClassDescriptor::decode(&mut image, Address::new(DESCRIPTOR)).unwrap();

        assert_eq!(
            image.name_at(Address::new(DESCRIPTOR)).as_deref(),
            Some("??_R1A@?0A@A@Foo@@8")
        );
        assert_eq!(
            image.comment_at(Address::new(DESCRIPTOR)),
            Some("pTypeDescriptor")
        );
        assert_eq!(
            image.comment_at(Address::new(DESCRIPTOR + 4)),
            Some("numContainedBases")
        );
        assert_eq!(
            image.comment_at(Address::new(DESCRIPTOR + 8)),
            Some("PMD where")
        );
        assert_eq!(
            image.comment_at(Address::new(DESCRIPTOR + 20)),
            Some("attributes")
        );

        let pmd_field = image.field_at(Address::new(DESCRIPTOR + 8)).unwrap();
        assert_eq!((pmd_field.size, pmd_field.count), (4, 3));
    }

    #[test]
    fn decode_is_idempotent() {
        let mut image = well_formed_image();
        let first = BaseClassDescriptor::decode(&mut image, Address::new(DESCRIPTOR)).unwrap();
        let second = BaseClassDescriptor::decode(&mut image, Address::new(DESCRIPTOR)).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            image.name_at(Address::new(DESCRIPTOR)).as_deref(),
            Some("??_R1A@?0A@A@Foo@@8")
        );
    }

    #[test]
    fn rejects_null_and_sentinel_addresses() {
        let mut image = well_formed_image();
        assert!(matches!(
            BaseClassDescriptor::decode(&mut image, Address::INVALID),
            Err(Error::InvalidAddress)
        ));
        assert!(matches!(
            BaseClassDescriptor::decode(&mut image, Address::new(0)),
            Err(Error::InvalidAddress)
        ));
    }

    #[test]
    fn null_type_descriptor_pointer_fails_the_record() {
        let mut image = well_formed_image();
        // Record at 0x300 is all zeroes, so pTypeDescriptor is null
        assert!(matches!(
            BaseClassDescriptor::decode(&mut image, Address::new(BASE + 0x300)),
            Err(Error::InvalidAddress)
        ));
    }

    #[test]
    fn malformed_type_descriptor_fails_the_record() {
        // Point the descriptor at bytes that hold no RTTI tag
        let mut data = vec![0u8; 0x400];
        put_dword(&mut data, 0x100, TYPE_DESC as u32);
        data[0x208..0x210].copy_from_slice(b"garbage\0");
        let mut image = Image::from_mem(data).with_base(Address::new(BASE));
        assert!(matches!(
            BaseClassDescriptor::decode(&mut image, Address::new(DESCRIPTOR)),
            Err(Error::Malformed { .. })
        ));

        // And a pointer right past the image is out of bounds
        let mut data = vec![0u8; 0x400];
        put_dword(&mut data, 0x100, (BASE + 0x1000) as u32);
        let mut image = Image::from_mem(data).with_base(Address::new(BASE));
        assert!(matches!(
            BaseClassDescriptor::decode(&mut image, Address::new(DESCRIPTOR)),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn attribute_flags_view() {
        let mut image = well_formed_image();
        let mut descriptor =
            BaseClassDescriptor::decode(&mut image, Address::new(DESCRIPTOR)).unwrap();
        descriptor.attributes = 0x41;
        assert!(descriptor
            .attribute_flags()
            .contains(BaseClassAttributes::NOT_VISIBLE));
        assert!(descriptor
            .attribute_flags()
            .contains(BaseClassAttributes::HAS_HIERARCHY_DESCRIPTOR));
    }
}
