//! File content reading

pub mod extent;

use crate::device;
use crate::directory::DirectoryRecord;
use crate::error::{IsoError, Result};
use crate::utils::sector::block_to_byte;

use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

/// Read a file's contents into `buffer`
///
/// # Arguments
/// * `block_io` - Block device containing the image
/// * `record` - File record to read
/// * `block_size` - Logical block size from the volume descriptor
/// * `buffer` - Buffer of at least `data_length` bytes
///
/// # Returns
/// Number of bytes read
pub fn read_file<B: BlockIo>(
    block_io: &mut B,
    record: &DirectoryRecord,
    block_size: u32,
    buffer: &mut [u8],
) -> Result<usize> {
    let file_size = record.data_length as usize;
    if buffer.len() < file_size {
        return Err(IsoError::InvalidArgument);
    }

    let offset = block_to_byte(record.extent_location as u64, block_size);
    device::read_bytes_at(block_io, offset, &mut buffer[..file_size])?;
    Ok(file_size)
}

/// Read a file's contents into a new Vec
pub fn read_file_vec<B: BlockIo>(
    block_io: &mut B,
    record: &DirectoryRecord,
    block_size: u32,
) -> Result<Vec<u8>> {
    let mut buffer = alloc::vec![0u8; record.data_length as usize];
    read_file(block_io, record, block_size, &mut buffer)?;
    Ok(buffer)
}
