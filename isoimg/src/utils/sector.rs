//! Block alignment and extent size calculations
//!
//! The logical block size comes from the Primary Volume Descriptor and is
//! usually, but not necessarily, 2048.

/// Align a byte count up to a block boundary
pub fn align_to_block(value: u64, block_size: u32) -> u64 {
    let bs = block_size as u64;
    value.div_ceil(bs) * bs
}

/// Number of blocks needed for a byte count, minimum 1
///
/// Every item in an image owns at least one extent, even when empty.
pub fn blocks_for_bytes(byte_count: u64, block_size: u32) -> u64 {
    let blocks = byte_count.div_ceil(block_size as u64);
    blocks.max(1)
}

/// Convert a block address to a byte offset
pub fn block_to_byte(block: u64, block_size: u32) -> u64 {
    block * block_size as u64
}

/// Check if a byte count is block-aligned
pub fn is_block_aligned(value: u64, block_size: u32) -> bool {
    value % block_size as u64 == 0
}
