//! End-to-end RTTI recovery over a synthetic image: decode the descriptor chain,
//! match scan patterns, follow branch thunks and disambiguate the ctor/dtor pair.

use rttiscope::prelude::*;

const BASE: u64 = 0x40_0000;
const CTOR: u64 = 0x40_1000;
const DTOR_THUNK: u64 = 0x40_1100;
const DTOR: u64 = 0x40_1200;
const BCD: u64 = 0x40_2000;
const TYPE_DESC: u64 = 0x40_3000;

fn put_dword(data: &mut [u8], address: u64, value: u32) {
    let offset = (address - BASE) as usize;
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// A small image holding everything a class recovery pass touches: a type
/// descriptor, one base class descriptor pointing at it, a constructor body,
/// and a destructor reached through a `jmp near` thunk.
fn build_image() -> Image {
    let mut data = vec![0x90u8; 0x4000];

    // Constructor body: call to a helper, then return
    put_dword(&mut data, CTOR + 1, 0x100 - 5);
    data[(CTOR - BASE) as usize] = 0xE8;

    // Destructor thunk: jmp near to the real destructor
    let displacement = (DTOR as i64 - (DTOR_THUNK as i64 + 5)) as i32;
    data[(DTOR_THUNK - BASE) as usize] = 0xE9;
    put_dword(&mut data, DTOR_THUNK + 1, displacement as u32);

    // BaseClassDescriptor
    put_dword(&mut data, BCD, TYPE_DESC as u32);
    put_dword(&mut data, BCD + 4, 1);
    put_dword(&mut data, BCD + 8, 0); // mdisp
    put_dword(&mut data, BCD + 12, (-1i32) as u32); // pdisp
    put_dword(&mut data, BCD + 16, 0); // vdisp
    put_dword(&mut data, BCD + 20, 0); // attributes

    // TypeDescriptor
    put_dword(&mut data, TYPE_DESC, 0x40_0800);
    let name_offset = (TYPE_DESC - BASE) as usize + 8;
    data[name_offset..name_offset + 10].copy_from_slice(b".?AVFoo@@\0");

    Image::from_mem(data).with_base(Address::new(BASE))
}

#[test]
fn decodes_the_descriptor_chain() {
    let mut image = build_image();

    let descriptor = BaseClassDescriptor::decode(&mut image, Address::new(BCD)).unwrap();
    assert_eq!(descriptor.type_descriptor, Address::new(TYPE_DESC));
    assert_eq!(descriptor.num_contained_bases, 1);
    assert_eq!(descriptor.pmd, Pmd::new(0, -1, 0));
    assert!(!descriptor.pmd.has_virtual_base());
    assert_eq!(descriptor.base_name, "Foo@@");

    // The descriptor named itself in the image
    assert_eq!(
        image.name_at(Address::new(BCD)).as_deref(),
        Some("??_R1A@?0A@A@Foo@@8")
    );
    assert_eq!(image.comment_at(Address::new(BCD)), Some("pTypeDescriptor"));
    assert_eq!(
        image.comment_at(Address::new(TYPE_DESC)),
        Some("pVFTable")
    );

    // Decoding again changes nothing
    let again = BaseClassDescriptor::decode(&mut image, Address::new(BCD)).unwrap();
    assert_eq!(descriptor, again);
}

#[test]
fn type_descriptor_stands_alone() {
    let mut image = build_image();
    let descriptor = TypeDescriptor::decode(&mut image, Address::new(TYPE_DESC)).unwrap();
    assert_eq!(descriptor.name, ".?AVFoo@@");
    assert_eq!(descriptor.base_name(), "Foo@@");
}

#[test]
fn scan_primitives_see_the_synthetic_code() {
    let image = build_image();

    // The constructor body starts with a near call
    assert!(match_bytes(&image, Address::new(CTOR), "E8??000000").unwrap());
    assert_eq!(
        resolve_call(&image, Address::new(CTOR)).unwrap(),
        Address::new(CTOR + 0x100)
    );

    // The thunk resolves to the destructor body
    assert_eq!(
        resolve_jump(&image, Address::new(DTOR_THUNK)).unwrap(),
        Address::new(DTOR)
    );

    // Plain bytes are neither calls nor jumps
    assert_eq!(
        resolve_call(&image, Address::new(DTOR)).unwrap(),
        Address::INVALID
    );
    assert_eq!(
        resolve_jump(&image, Address::new(DTOR)).unwrap(),
        Address::INVALID
    );
}

#[test]
fn full_recovery_round() {
    let mut image = build_image();

    // Decode the hierarchy to learn the class name
    let descriptor = BaseClassDescriptor::decode(&mut image, Address::new(BCD)).unwrap();
    let base_name = descriptor.base_name.clone();

    // The destructor is already known, e.g. from an export
    assert!(image.annotate_name(
        Address::new(DTOR),
        &special_member_name(&base_name, NameKind::Destructor, 0)
    ));

    // A scan collected the two candidates, in the wrong order and with a duplicate
    let mut registry = CandidateRegistry::new();
    registry.insert_sorted(Address::new(DTOR_THUNK));
    registry.insert_sorted(Address::new(CTOR));
    registry.insert_sorted(Address::new(DTOR_THUNK));
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.first(), Some(Address::new(CTOR)));

    let pair = resolve_constructor_destructor(&mut image, registry, &base_name)
        .unwrap()
        .expect("two distinguishable candidates");

    assert_eq!(pair.constructor, Address::new(CTOR));
    assert_eq!(pair.destructor, Address::new(DTOR_THUNK));
    assert_eq!(
        image.name_at(Address::new(CTOR)).as_deref(),
        Some("??0Foo@@QAE@XZ")
    );
}

#[test]
fn recovery_round_stays_silent_when_nothing_is_named() {
    let mut image = build_image();
    let descriptor = BaseClassDescriptor::decode(&mut image, Address::new(BCD)).unwrap();

    let mut registry = CandidateRegistry::new();
    registry.insert_sorted(Address::new(CTOR));
    registry.insert_sorted(Address::new(DTOR_THUNK));

    // No destructor name anywhere: ambiguous, and nothing gets renamed
    let pair =
        resolve_constructor_destructor(&mut image, registry, &descriptor.base_name).unwrap();
    assert!(pair.is_none());
    assert!(image.name_at(Address::new(CTOR)).is_none());
}

#[test]
fn descriptor_names_agree_with_the_templates() {
    let image_pmd = Pmd::new(4, -1, 0);
    assert_eq!(
        base_class_descriptor_name("Foo@@", image_pmd, 0),
        format!("??_R1{}?0A@A@Foo@@8", encode_number(4))
    );
    assert_eq!(decode_number(&encode_number(4)).unwrap(), 4);

    assert_eq!(
        special_member_name("Foo@@", NameKind::VirtualDestructor, 0),
        "??1Foo@@UAE@XZ"
    );
    assert_eq!(
        special_member_name("Foo@@", NameKind::VectorDeletingDestructor, 8),
        "??_EFoo@@W7AEPAXI@Z"
    );
}
