//! Primary Volume Descriptor
//!
//! The Primary Volume Descriptor (PVD) is always present and describes
//! the global image layout: block size, total extent count, both path
//! table locations, and the root directory record.
//!
//! See ECMA-119 8.4 for the full field list.

use crate::codec::{self, BothEndian16, BothEndian32};
use crate::directory::{record, DirectoryRecord};
use crate::error::{IsoError, Result};
use crate::types::SECTOR_SIZE;
use crate::utils::datetime::DateTime17;
use crate::utils::string;

use alloc::string::String;

/// Raw on-disk PVD layout, through the last field the engine consumes
#[repr(C, packed)]
struct RawPvd {
    // Header (7 bytes)
    type_code: u8,
    identifier: [u8; 5],
    version: u8,

    unused1: u8,
    system_id: [u8; 32],
    volume_id: [u8; 32],
    unused2: [u8; 8],
    space_size: BothEndian32,
    unused3: [u8; 32],
    set_size: BothEndian16,
    seqnum: BothEndian16,
    log_block_size: BothEndian16,
    path_tbl_size: BothEndian32,
    type_l_path_table: [u8; 4],
    opt_type_l_path_table: [u8; 4],
    type_m_path_table: [u8; 4],
    opt_type_m_path_table: [u8; 4],
    root_dir_record: [u8; 34],
    volume_set_id: [u8; 128],
    publisher_id: [u8; 128],
    preparer_id: [u8; 128],
    application_id: [u8; 128],
    copyright_file_id: [u8; 37],
    abstract_file_id: [u8; 37],
    bibliographic_file_id: [u8; 37],
    creation_date: [u8; 17],
    modification_date: [u8; 17],
    expiration_date: [u8; 17],
    effective_date: [u8; 17],
    file_structure_version: u8,
}

/// Decoded Primary Volume Descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryVolumeDescriptor {
    /// System identifier (a-characters, up to 32)
    pub system_id: String,

    /// Volume identifier (d-characters, up to 32)
    pub volume_id: String,

    /// Total extents (blocks) in the image
    pub space_size: u32,

    /// Number of volumes in the set
    pub set_size: u16,

    /// Volume set sequence number (>= 1)
    pub seqnum: u16,

    /// Logical block size, typically 2048
    pub log_block_size: u16,

    /// Path table size in bytes
    pub path_tbl_size: u32,

    /// Location of the little-endian path table
    pub path_table_location_le: u32,

    /// Location of the optional little-endian path table (0 if absent)
    pub opt_path_table_location_le: u32,

    /// Location of the big-endian path table
    pub path_table_location_be: u32,

    /// Location of the optional big-endian path table (0 if absent)
    pub opt_path_table_location_be: u32,

    /// Root directory record, the tree root
    pub root_dir_record: DirectoryRecord,

    /// Volume set identifier (up to 128)
    pub volume_set_id: String,

    /// Publisher identifier (up to 128)
    pub publisher_id: String,

    /// Data preparer identifier (up to 128)
    pub preparer_id: String,

    /// Application identifier (up to 128)
    pub application_id: String,

    /// Copyright file identifier (up to 37)
    pub copyright_file_id: String,

    /// Abstract file identifier (up to 37)
    pub abstract_file_id: String,

    /// Bibliographic file identifier (up to 37)
    pub bibliographic_file_id: String,

    /// Volume creation date, `None` when unset
    pub created_at: Option<DateTime17>,

    /// Volume modification date, `None` when unset
    pub modified_at: Option<DateTime17>,

    /// Volume expiration date, `None` when unset
    pub expires_at: Option<DateTime17>,

    /// Volume effective date, `None` when unset
    pub effective_at: Option<DateTime17>,

    /// File structure version (1)
    pub file_structure_version: u8,
}

impl PrimaryVolumeDescriptor {
    /// Create a descriptor with mastering defaults and an empty root
    pub fn new(volume_id: &str) -> Self {
        Self {
            system_id: String::new(),
            volume_id: String::from(volume_id),
            space_size: 0,
            set_size: 1,
            seqnum: 1,
            log_block_size: SECTOR_SIZE as u16,
            path_tbl_size: 0,
            path_table_location_le: 0,
            opt_path_table_location_le: 0,
            path_table_location_be: 0,
            opt_path_table_location_be: 0,
            root_dir_record: DirectoryRecord::root(),
            volume_set_id: String::new(),
            publisher_id: String::new(),
            preparer_id: String::new(),
            application_id: String::new(),
            copyright_file_id: String::new(),
            abstract_file_id: String::new(),
            bibliographic_file_id: String::new(),
            created_at: None,
            modified_at: None,
            expires_at: None,
            effective_at: None,
            file_structure_version: 1,
        }
    }

    /// Parse a PVD from its 2048-byte sector at `lba`
    pub fn parse(data: &[u8], lba: u64) -> Result<Self> {
        if data.len() < core::mem::size_of::<RawPvd>() {
            return Err(IsoError::CorruptFormat { lba });
        }

        // Cast to struct (every field has alignment 1, size checked above)
        let raw = unsafe { &*(data.as_ptr() as *const RawPvd) };

        if raw.type_code != 1 || &raw.identifier != b"CD001" {
            return Err(IsoError::UnsupportedVolumeDescriptor);
        }
        if raw.version != 1 {
            return Err(IsoError::UnsupportedVersion);
        }

        let corrupt = |_| IsoError::CorruptFormat { lba };
        let space_size = raw.space_size.get().map_err(corrupt)?;
        let path_table_location_le = u32::from_le_bytes(raw.type_l_path_table);
        let path_table_location_be = u32::from_be_bytes(raw.type_m_path_table);

        // Redundant path tables must be distinct and inside the volume
        if path_table_location_le == path_table_location_be
            || path_table_location_le >= space_size
            || path_table_location_be >= space_size
        {
            return Err(IsoError::CorruptFormat { lba });
        }

        let mut root_dir_record = record::decode_one(&raw.root_dir_record)
            .map_err(corrupt)?
            .ok_or(IsoError::CorruptFormat { lba })?
            .0;
        root_dir_record.is_root = true;

        Ok(Self {
            system_id: ident_string(&raw.system_id),
            volume_id: ident_string(&raw.volume_id),
            space_size,
            set_size: raw.set_size.get().map_err(corrupt)?,
            seqnum: raw.seqnum.get().map_err(corrupt)?,
            log_block_size: raw.log_block_size.get().map_err(corrupt)?,
            path_tbl_size: raw.path_tbl_size.get().map_err(corrupt)?,
            path_table_location_le,
            opt_path_table_location_le: u32::from_le_bytes(raw.opt_type_l_path_table),
            path_table_location_be,
            opt_path_table_location_be: u32::from_be_bytes(raw.opt_type_m_path_table),
            root_dir_record,
            volume_set_id: ident_string(&raw.volume_set_id),
            publisher_id: ident_string(&raw.publisher_id),
            preparer_id: ident_string(&raw.preparer_id),
            application_id: ident_string(&raw.application_id),
            copyright_file_id: ident_string(&raw.copyright_file_id),
            abstract_file_id: ident_string(&raw.abstract_file_id),
            bibliographic_file_id: ident_string(&raw.bibliographic_file_id),
            created_at: DateTime17::from_bytes(&raw.creation_date).map_err(corrupt)?,
            modified_at: DateTime17::from_bytes(&raw.modification_date).map_err(corrupt)?,
            expires_at: DateTime17::from_bytes(&raw.expiration_date).map_err(corrupt)?,
            effective_at: DateTime17::from_bytes(&raw.effective_date).map_err(corrupt)?,
            file_structure_version: raw.file_structure_version,
        })
    }

    /// Serialize to a 2048-byte sector, re-deriving every both-endian
    /// pair from the canonical value
    pub fn serialize(&self) -> Result<[u8; SECTOR_SIZE]> {
        let mut out = [0u8; SECTOR_SIZE];
        out[0] = 1;
        out[1..6].copy_from_slice(b"CD001");
        out[6] = 1;

        codec::encode_padded_str(&mut out[8..40], &self.system_id)?;
        codec::encode_padded_str(&mut out[40..72], &self.volume_id)?;
        codec::encode_both_endian_u32(&mut out[80..88], self.space_size);
        codec::encode_both_endian_u16(&mut out[120..124], self.set_size);
        codec::encode_both_endian_u16(&mut out[124..128], self.seqnum);
        codec::encode_both_endian_u16(&mut out[128..132], self.log_block_size);
        codec::encode_both_endian_u32(&mut out[132..140], self.path_tbl_size);
        out[140..144].copy_from_slice(&self.path_table_location_le.to_le_bytes());
        out[144..148].copy_from_slice(&self.opt_path_table_location_le.to_le_bytes());
        out[148..152].copy_from_slice(&self.path_table_location_be.to_be_bytes());
        out[152..156].copy_from_slice(&self.opt_path_table_location_be.to_be_bytes());
        record::encode_one(&mut out[156..190], &self.root_dir_record);
        codec::encode_padded_str(&mut out[190..318], &self.volume_set_id)?;
        codec::encode_padded_str(&mut out[318..446], &self.publisher_id)?;
        codec::encode_padded_str(&mut out[446..574], &self.preparer_id)?;
        codec::encode_padded_str(&mut out[574..702], &self.application_id)?;
        codec::encode_padded_str(&mut out[702..739], &self.copyright_file_id)?;
        codec::encode_padded_str(&mut out[739..776], &self.abstract_file_id)?;
        codec::encode_padded_str(&mut out[776..813], &self.bibliographic_file_id)?;
        out[813..830].copy_from_slice(&DateTime17::encode(self.created_at));
        out[830..847].copy_from_slice(&DateTime17::encode(self.modified_at));
        out[847..864].copy_from_slice(&DateTime17::encode(self.expires_at));
        out[864..881].copy_from_slice(&DateTime17::encode(self.effective_at));
        out[881] = self.file_structure_version;

        Ok(out)
    }
}

fn ident_string(bytes: &[u8]) -> String {
    match string::achars_to_str(bytes) {
        Ok(s) => String::from(s),
        Err(_) => String::from_utf8_lossy(string::trim_trailing_spaces(bytes)).into_owned(),
    }
}
