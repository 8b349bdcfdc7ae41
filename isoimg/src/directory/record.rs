//! Directory record wire format
//!
//! Directory records are variable length: a 33-byte fixed header, the file
//! identifier, and a padding byte that keeps the total length even.

use crate::codec::{BothEndian16, BothEndian32};
use crate::directory::DirectoryRecord;
use crate::error::{IsoError, Result};
use crate::types::FileFlags;
use crate::utils::datetime::DateTime7;

use alloc::vec::Vec;

/// Minimum record length (33-byte header + 1 identifier byte)
pub const MIN_RECORD_LEN: usize = 34;

/// Fixed header portion of a directory record
#[repr(C, packed)]
pub struct RawRecord {
    /// Length of directory record (BP 1)
    pub length: u8,

    /// Extended attribute record length (BP 2)
    pub extended_attr_length: u8,

    /// Extent location (both-endian 32-bit) (BP 3-10)
    pub extent_location: BothEndian32,

    /// Data length (both-endian 32-bit) (BP 11-18)
    pub data_length: BothEndian32,

    /// Recording date and time (7 bytes) (BP 19-25)
    pub recording_datetime: [u8; 7],

    /// File flags (BP 26)
    pub file_flags: u8,

    /// File unit size (interleaved files) (BP 27)
    pub file_unit_size: u8,

    /// Interleave gap size (BP 28)
    pub interleave_gap: u8,

    /// Volume sequence number (both-endian 16-bit) (BP 29-32)
    pub volume_sequence: BothEndian16,

    /// File identifier length (BP 33)
    pub file_id_len: u8,
    // Followed by:
    // - File identifier (file_id_len bytes)
    // - Padding field (1 byte if file_id_len is even)
    // - System use area (variable)
}

impl RawRecord {
    /// Parse the fixed header from the front of a byte slice
    pub fn parse(data: &[u8]) -> Result<&Self> {
        if data.len() < MIN_RECORD_LEN {
            return Err(IsoError::CorruptFormat { lba: 0 });
        }

        // Cast to struct (all fields are byte arrays, alignment 1)
        let record = unsafe { &*(data.as_ptr() as *const RawRecord) };

        if (record.length as usize) < MIN_RECORD_LEN || record.length as usize > data.len() {
            return Err(IsoError::CorruptFormat { lba: 0 });
        }

        if record.file_id_len as usize + 33 > record.length as usize {
            return Err(IsoError::CorruptFormat { lba: 0 });
        }

        Ok(record)
    }
}

/// Record length for an identifier: 33-byte header, identifier bytes,
/// and a padding byte whenever the identifier length is even.
pub fn record_len(ident_len: usize) -> usize {
    let len = 33 + ident_len;
    if ident_len % 2 == 0 {
        len + 1
    } else {
        len
    }
}

/// Decode one directory record from the front of `data`.
///
/// Returns the shallow record (children unresolved) and the number of
/// bytes consumed. A leading zero byte means "padding to the next block
/// boundary" and decodes to `None`.
pub fn decode_one(data: &[u8]) -> Result<Option<(DirectoryRecord, usize)>> {
    if data.is_empty() || data[0] == 0 {
        return Ok(None);
    }

    let raw = RawRecord::parse(data)?;
    let id_len = raw.file_id_len as usize;
    let ident: Vec<u8> = data[33..33 + id_len].to_vec();

    let record = DirectoryRecord {
        dr_len: raw.length,
        extent_location: raw.extent_location.get()?,
        data_length: raw.data_length.get()?,
        file_ident: ident,
        flags: FileFlags::from_byte(raw.file_flags),
        recorded_at: DateTime7::from_bytes(&raw.recording_datetime),
        volume_seq: raw.volume_sequence.get()?,
        is_root: false,
        children: Vec::new(),
    };

    Ok(Some((record, raw.length as usize)))
}

/// Encode one directory record into `dst`, returning the bytes written.
///
/// The caller guarantees `dst` holds at least `record.dr_len` bytes; the
/// encoding mirrors `decode_one` exactly so an unmodified record
/// round-trips byte-identically.
pub fn encode_one(dst: &mut [u8], record: &DirectoryRecord) -> usize {
    let id_len = record.file_ident.len();
    let len = record_len(id_len);

    dst[..len].fill(0);
    dst[0] = len as u8;
    dst[1] = 0; // extended attribute record length
    dst[2..6].copy_from_slice(&record.extent_location.to_le_bytes());
    dst[6..10].copy_from_slice(&record.extent_location.to_be_bytes());
    dst[10..14].copy_from_slice(&record.data_length.to_le_bytes());
    dst[14..18].copy_from_slice(&record.data_length.to_be_bytes());
    dst[18..25].copy_from_slice(&DateTime7::encode(record.recorded_at));
    dst[25] = record.flags.to_byte();
    dst[26] = 0; // file unit size
    dst[27] = 0; // interleave gap
    dst[28..30].copy_from_slice(&record.volume_seq.to_le_bytes());
    dst[30..32].copy_from_slice(&record.volume_seq.to_be_bytes());
    dst[32] = id_len as u8;
    dst[33..33 + id_len].copy_from_slice(&record.file_ident);

    len
}
