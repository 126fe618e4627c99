// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
bit tricks for slot masks.
*/

/// Removes the lowest set bit from `mask` and returns its index, or `None` if the mask is empty.
pub fn extract_lowest_bit(mask: &mut u16) -> Option<u32> {
    if *mask == 0 {
        return None;
    }
    let index = mask.trailing_zeros();
    //clears the lowest set bit
    *mask &= *mask - 1;
    Some(index)
}

/// Bit for `slot` in a 16-bit slot mask. Slots past the mask width have no bit.
pub const fn slot_bit(slot: u32) -> u16 {
    if slot < u16::BITS { 1 << slot } else { 0 }
}

/// Rounds `value` up to a multiple of `alignment`, which must be a power of two.
pub const fn align_up(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

/// Like [`align_up`], for 32-bit quantities.
pub const fn align_up_u32(value: u32, alignment: u32) -> u32 {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}
