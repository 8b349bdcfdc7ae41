//! Volume descriptor set
//!
//! ISO9660 volume descriptors start at sector 16 and describe the
//! filesystem layout. Multiple descriptors may be present (Primary,
//! Supplementary, Boot Record), terminated by a Volume Descriptor Set
//! Terminator. The Primary descriptor is authoritative; the others are
//! recognized as tagged alternatives and skipped structurally.

pub mod primary;

pub use primary::PrimaryVolumeDescriptor;

use crate::device;
use crate::error::{IsoError, Result};
use crate::types::{VolumeDescriptorType, SECTOR_SIZE, VOLUME_DESCRIPTOR_START};

use gpt_disk_io::BlockIo;
use log::debug;

/// Volume Descriptor header (first 7 bytes of each descriptor)
#[repr(C, packed)]
pub struct VolumeDescriptorHeader {
    /// Type code (0=boot, 1=primary, 2=supplementary, 255=terminator)
    pub type_code: u8,

    /// Standard identifier "CD001"
    pub identifier: [u8; 5],

    /// Version (always 1)
    pub version: u8,
}

impl VolumeDescriptorHeader {
    /// CD001 magic bytes
    pub const MAGIC: &'static [u8; 5] = b"CD001";

    /// Check the standard identifier and structure version
    pub fn validate(&self) -> Result<()> {
        if &self.identifier != Self::MAGIC {
            return Err(IsoError::UnsupportedVolumeDescriptor);
        }
        if self.version != 1 {
            return Err(IsoError::UnsupportedVersion);
        }
        Ok(())
    }
}

/// The decoded volume descriptor set
#[derive(Debug, Clone)]
pub struct DescriptorSet {
    /// The authoritative Primary Volume Descriptor
    pub pvd: PrimaryVolumeDescriptor,

    /// An El Torito Boot Record descriptor was present
    pub has_boot_record: bool,

    /// A Supplementary (Joliet) descriptor was present
    pub has_supplementary: bool,
}

/// Safety limit on descriptor set length
const MAX_DESCRIPTORS: u64 = 100;

/// Read the volume descriptor set starting at sector 16.
///
/// Stops at the set terminator. Fails if no Primary descriptor is found
/// before it.
pub fn read_descriptor_set<B: BlockIo>(block_io: &mut B) -> Result<DescriptorSet> {
    let mut buffer = [0u8; SECTOR_SIZE];
    let mut pvd: Option<PrimaryVolumeDescriptor> = None;
    let mut has_boot_record = false;
    let mut has_supplementary = false;

    let mut sector = VOLUME_DESCRIPTOR_START;
    loop {
        device::read_bytes_at(block_io, sector * SECTOR_SIZE as u64, &mut buffer)?;

        let header = unsafe { &*(buffer.as_ptr() as *const VolumeDescriptorHeader) };
        header.validate()?;

        match VolumeDescriptorType::from_byte(header.type_code) {
            Some(VolumeDescriptorType::BootRecord) => {
                has_boot_record = true;
            }
            Some(VolumeDescriptorType::Primary) => {
                debug!("primary volume descriptor at sector {}", sector);
                pvd = Some(PrimaryVolumeDescriptor::parse(&buffer, sector)?);
            }
            Some(VolumeDescriptorType::Supplementary) => {
                has_supplementary = true;
            }
            Some(VolumeDescriptorType::Terminator) => break,
            Some(VolumeDescriptorType::Partition) | None => {
                // Unknown descriptor type - skip
            }
        }

        sector += 1;
        if sector - VOLUME_DESCRIPTOR_START > MAX_DESCRIPTORS {
            break;
        }
    }

    let pvd = pvd.ok_or(IsoError::UnsupportedVolumeDescriptor)?;
    Ok(DescriptorSet {
        pvd,
        has_boot_record,
        has_supplementary,
    })
}

/// Serialize a Volume Descriptor Set Terminator sector
pub fn terminator_sector() -> [u8; SECTOR_SIZE] {
    let mut out = [0u8; SECTOR_SIZE];
    out[0] = VolumeDescriptorType::Terminator as u8;
    out[1..6].copy_from_slice(VolumeDescriptorHeader::MAGIC);
    out[6] = 1;
    out
}
