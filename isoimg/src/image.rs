//! Image handle and reader orchestration
//!
//! Opening an image runs the whole read path: locate and decode the
//! volume descriptor set, resolve the full directory tree, decode both
//! path tables, and cross-validate everything. A successful open leaves
//! the model fully resolved and queryable; on failure no partial state
//! escapes.

use crate::directory::path_table::{PathTable, PathTableType};
use crate::directory::{tree, DirectoryRecord};
use crate::error::Result;
use crate::file;
use crate::types::MAX_DIRECTORY_DEPTH;
use crate::utils::sector::block_to_byte;
use crate::volume::{self, DescriptorSet, PrimaryVolumeDescriptor};
use crate::{device, IsoError};

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use gpt_disk_io::BlockIo;
use log::debug;

/// An opened, fully resolved ISO9660 image
#[derive(Debug)]
pub struct IsoImage {
    descriptors: DescriptorSet,
    path_table: PathTable,
    parents: BTreeMap<u32, u32>,
}

impl IsoImage {
    /// Open an image from a block device.
    ///
    /// Decodes the descriptor set, walks every directory extent, decodes
    /// the LE and BE path tables, and cross-validates the two against
    /// each other and against the tree.
    pub fn open<B: BlockIo>(block_io: &mut B) -> Result<Self> {
        let mut descriptors = volume::read_descriptor_set(block_io)?;
        let pvd = &mut descriptors.pvd;
        let block_size = pvd.log_block_size as u32;
        debug!(
            "opening volume '{}': {} extents, block size {}",
            pvd.volume_id, pvd.space_size, block_size
        );

        tree::walk_tree(block_io, &mut pvd.root_dir_record, block_size)?;

        let mut table_bytes = alloc::vec![0u8; pvd.path_tbl_size as usize];
        device::read_bytes_at(
            block_io,
            block_to_byte(pvd.path_table_location_le as u64, block_size),
            &mut table_bytes,
        )?;
        let table_le = PathTable::decode(
            &table_bytes,
            PathTableType::LittleEndian,
            pvd.path_table_location_le as u64,
        )?;

        device::read_bytes_at(
            block_io,
            block_to_byte(pvd.path_table_location_be as u64, block_size),
            &mut table_bytes,
        )?;
        let table_be = PathTable::decode(
            &table_bytes,
            PathTableType::BigEndian,
            pvd.path_table_location_be as u64,
        )?;

        table_le.cross_validate(&table_be, pvd.path_table_location_be as u64)?;
        tree::validate(&pvd.root_dir_record, &table_le)?;
        let parents = tree::parent_map(&pvd.root_dir_record);

        Ok(Self {
            descriptors,
            path_table: table_le,
            parents,
        })
    }

    /// Open an image file by path.
    ///
    /// Fails with `InvalidArgument` before any parsing if the path does
    /// not name a readable regular file. Returns the handle together
    /// with the device for subsequent content reads.
    #[cfg(feature = "std")]
    pub fn open_path<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<(Self, crate::device::FileDevice)> {
        let mut device = crate::device::FileDevice::open(path)?;
        let image = Self::open(&mut device)?;
        Ok((image, device))
    }

    /// The Primary Volume Descriptor
    pub fn pvd(&self) -> &PrimaryVolumeDescriptor {
        &self.descriptors.pvd
    }

    /// The root directory record
    pub fn root(&self) -> &DirectoryRecord {
        &self.descriptors.pvd.root_dir_record
    }

    /// The canonical path table
    pub fn path_table(&self) -> &PathTable {
        &self.path_table
    }

    /// Was an El Torito Boot Record descriptor present?
    pub fn has_boot_record(&self) -> bool {
        self.descriptors.has_boot_record
    }

    /// Was a Supplementary (Joliet) descriptor present?
    pub fn has_supplementary(&self) -> bool {
        self.descriptors.has_supplementary
    }

    /// Parent directory extent for a directory extent (root maps to
    /// itself)
    pub fn parent_of(&self, extent: u32) -> Option<u32> {
        self.parents.get(&extent).copied()
    }

    /// Find a file or directory by path.
    ///
    /// Paths are `/`-separated and matched case-insensitively against
    /// display names (version suffixes stripped). The empty path and
    /// `/` resolve to the root.
    pub fn find(&self, path: &str) -> Option<&DirectoryRecord> {
        let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        if components.len() > MAX_DIRECTORY_DEPTH {
            return None;
        }

        let mut node = self.root();
        for component in components {
            node = node.child(component)?;
        }
        Some(node)
    }

    /// Read a file's contents into `buffer`, returning the bytes read
    pub fn read_file<B: BlockIo>(
        &self,
        block_io: &mut B,
        record: &DirectoryRecord,
        buffer: &mut [u8],
    ) -> Result<usize> {
        if record.isdir() {
            return Err(IsoError::InvalidArgument);
        }
        file::read_file(
            block_io,
            record,
            self.pvd().log_block_size as u32,
            buffer,
        )
    }

    /// Read a file's contents into a new Vec
    pub fn read_file_vec<B: BlockIo>(
        &self,
        block_io: &mut B,
        record: &DirectoryRecord,
    ) -> Result<Vec<u8>> {
        if record.isdir() {
            return Err(IsoError::InvalidArgument);
        }
        file::read_file_vec(block_io, record, self.pvd().log_block_size as u32)
    }
}
