//! Relative branch target resolution for x86 call and jump encodings.

use crate::{
    image::{Address, AddressSpace},
    Result,
};

/// `call rel32`.
const OPCODE_CALL_NEAR: u8 = 0xE8;
/// `jmp rel32`.
const OPCODE_JMP_NEAR: u8 = 0xE9;
/// `jmp rel8`.
const OPCODE_JMP_SHORT: u8 = 0xEB;

/// Resolve the absolute target of a near relative call at `address`.
///
/// Only the five-byte `E8 rel32` encoding is recognized. The target is computed from
/// the end of the instruction, so a displacement of `-5` calls the instruction itself.
/// Any other opcode yields [`Address::INVALID`] - "not a call" is an answer, not an
/// error, so scan loops can probe freely.
///
/// # Errors
/// Read errors propagate; an address past the image is [`crate::Error::OutOfBounds`].
pub fn resolve_call(space: &dyn AddressSpace, address: Address) -> Result<Address> {
    if space.read_byte(address)? != OPCODE_CALL_NEAR {
        return Ok(Address::INVALID);
    }

    #[allow(clippy::cast_possible_wrap)]
    let displacement = space.read_dword(address + 1)? as i32;
    Ok(address.offset(5 + i64::from(displacement)))
}

/// Resolve the absolute target of a relative jump at `address`.
///
/// Recognizes the two-byte `EB rel8` and five-byte `E9 rel32` encodings; both count
/// the displacement from the end of the instruction. Any other opcode yields
/// [`Address::INVALID`].
///
/// # Errors
/// Read errors propagate; an address past the image is [`crate::Error::OutOfBounds`].
pub fn resolve_jump(space: &dyn AddressSpace, address: Address) -> Result<Address> {
    match space.read_byte(address)? {
        OPCODE_JMP_SHORT => {
            #[allow(clippy::cast_possible_wrap)]
            let displacement = space.read_byte(address + 1)? as i8;
            Ok(address.offset(2 + i64::from(displacement)))
        }
        OPCODE_JMP_NEAR => {
            #[allow(clippy::cast_possible_wrap)]
            let displacement = space.read_dword(address + 1)? as i32;
            Ok(address.offset(5 + i64::from(displacement)))
        }
        _ => Ok(Address::INVALID),
    }
}
