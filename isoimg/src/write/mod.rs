//! Image serialization
//!
//! The writer takes a directory tree (freshly authored or produced by
//! the reader) plus a way to supply each file's bytes, runs the extent
//! allocator, and serializes every structure at its assigned location.
//! Output is append-only: each extent is written once, zero-padded to
//! the block boundary.

pub mod allocator;
pub mod builder;

use crate::device;
use crate::directory::tree;
use crate::error::{IsoError, Result};
use crate::types::{SECTOR_SIZE, VOLUME_DESCRIPTOR_START};
use crate::utils::sector::{align_to_block, block_to_byte};
use crate::volume::{self, PrimaryVolumeDescriptor};

use alloc::vec::Vec;

use gpt_disk_io::BlockIo;
use log::debug;

/// Supplies file content during a write.
///
/// The token is the file record's extent field as it stood when the
/// write started: the source-image LBA when re-serializing a parsed
/// tree, or whatever handle the caller planted when composing one.
pub trait ContentSource {
    /// Read `length` bytes of the content identified by `token`
    fn read_content(&mut self, token: u32, length: u32, buf: &mut [u8]) -> Result<()>;
}

/// Content source backed by another image: tokens are source LBAs
pub struct ImageContentSource<'a, B: BlockIo> {
    block_io: &'a mut B,
    block_size: u32,
}

impl<'a, B: BlockIo> ImageContentSource<'a, B> {
    /// Wrap a source device whose extents use `block_size`
    pub fn new(block_io: &'a mut B, block_size: u32) -> Self {
        Self {
            block_io,
            block_size,
        }
    }
}

impl<B: BlockIo> ContentSource for ImageContentSource<'_, B> {
    fn read_content(&mut self, token: u32, length: u32, buf: &mut [u8]) -> Result<()> {
        let offset = block_to_byte(token as u64, self.block_size);
        device::read_bytes_at(self.block_io, offset, &mut buf[..length as usize])
    }
}

/// Serialize a complete image from `pvd` and its directory tree.
///
/// Runs the allocator, fills every layout-derived descriptor field, and
/// writes the descriptor set, both path tables, every directory extent,
/// and every file's content. Returns the image size in extents.
pub fn write_image<B: BlockIo, S: ContentSource>(
    pvd: &mut PrimaryVolumeDescriptor,
    block_io: &mut B,
    source: &mut S,
) -> Result<u32> {
    let block_size = pvd.log_block_size as u32;
    let plan = allocator::plan_layout(&mut pvd.root_dir_record, block_size)?;

    pvd.space_size = plan.space_size;
    pvd.path_tbl_size = plan.path_tbl_size;
    pvd.path_table_location_le = plan.path_table_location_le;
    pvd.path_table_location_be = plan.path_table_location_be;
    pvd.opt_path_table_location_le = 0;
    pvd.opt_path_table_location_be = 0;

    let path_table = tree::build_path_table(&pvd.root_dir_record);
    debug!(
        "writing image: {} extents, path table {} bytes",
        plan.space_size, plan.path_tbl_size
    );

    // Descriptor set: PVD, terminator, and the reserved version block
    let vd_base = VOLUME_DESCRIPTOR_START * SECTOR_SIZE as u64;
    device::write_bytes_at(block_io, vd_base, &pvd.serialize()?)?;
    device::write_bytes_at(block_io, vd_base + SECTOR_SIZE as u64, &volume::terminator_sector())?;
    device::write_bytes_at(
        block_io,
        vd_base + 2 * SECTOR_SIZE as u64,
        &[0u8; SECTOR_SIZE],
    )?;

    // Both path tables from the one canonical entry list
    let table_bytes = plan.path_table_extents as u64 * block_size as u64;
    for (location, encoding) in [
        (
            plan.path_table_location_le,
            crate::directory::path_table::PathTableType::LittleEndian,
        ),
        (
            plan.path_table_location_be,
            crate::directory::path_table::PathTableType::BigEndian,
        ),
    ] {
        let mut encoded = path_table.encode(encoding);
        encoded.resize(table_bytes as usize, 0);
        device::write_bytes_at(block_io, block_to_byte(location as u64, block_size), &encoded)?;
    }

    // Directory extents in allocation order
    for path in allocator::directory_paths(&pvd.root_dir_record) {
        let node = tree::node_at(&pvd.root_dir_record, &path);
        let encoded = node.encode_extent(block_size)?;
        device::write_bytes_at(
            block_io,
            block_to_byte(node.extent_location as u64, block_size),
            &encoded,
        )?;
    }

    // File content, zero-padded to its extent boundary
    for placement in &plan.files {
        let padded = align_to_block(placement.data_length as u64, block_size) as usize;
        let mut buf: Vec<u8> = alloc::vec![0u8; padded.max(block_size as usize)];
        source.read_content(placement.token, placement.data_length, &mut buf)?;
        device::write_bytes_at(
            block_io,
            block_to_byte(placement.extent as u64, block_size),
            &buf,
        )?;
    }

    block_io.flush().map_err(|_| IsoError::IoError)?;
    Ok(plan.space_size)
}
