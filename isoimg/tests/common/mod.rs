//! Common test utilities and mock block devices
//!
//! Shared across test binaries; not every binary uses every helper.
#![allow(dead_code)]

use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};
use std::io;

/// In-memory block device for testing
#[derive(Debug, Clone)]
pub struct MemoryBlockDevice {
    pub data: Vec<u8>,
    pub block_size: usize,
}

impl MemoryBlockDevice {
    /// Create a new memory block device from raw data
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            block_size: 2048, // ISO9660 sector size
        }
    }

    /// Create an empty device with the given sector count
    pub fn with_sectors(sectors: usize) -> Self {
        Self::new(vec![0u8; sectors * 2048])
    }

    /// Create from a file path
    #[allow(dead_code)]
    pub fn from_file(path: &str) -> io::Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::new(data))
    }

    /// Create a minimal valid ISO9660 volume: empty root directory,
    /// both path tables, the layout genisoimage emits for an empty
    /// source tree (LE table at 19, BE at 21, root at 23, 24 extents)
    pub fn create_minimal_iso() -> Self {
        let mut data = vec![0u8; 24 * 2048];

        // System area (sectors 0-15) - all zeros

        // Primary Volume Descriptor (sector 16)
        let pvd = 16 * 2048;
        data[pvd] = 1;
        data[pvd + 1..pvd + 6].copy_from_slice(b"CD001");
        data[pvd + 6] = 1;

        write_padded(&mut data[pvd + 8..pvd + 40], b"TEST SYSTEM");
        write_padded(&mut data[pvd + 40..pvd + 72], b"TEST VOLUME");

        write_both_endian_u32(&mut data[pvd + 80..], 24); // space size
        write_both_endian_u16(&mut data[pvd + 120..], 1); // set size
        write_both_endian_u16(&mut data[pvd + 124..], 1); // seqnum
        write_both_endian_u16(&mut data[pvd + 128..], 2048); // block size
        write_both_endian_u32(&mut data[pvd + 132..], 10); // path table size
        data[pvd + 140..pvd + 144].copy_from_slice(&19u32.to_le_bytes());
        data[pvd + 148..pvd + 152].copy_from_slice(&21u32.to_be_bytes());

        // Root directory record (at offset 156, 34 bytes)
        write_dir_record(&mut data[pvd + 156..], 23, 2048, 0x02, &[0x00]);

        // Identifier fields are space-padded
        write_padded(&mut data[pvd + 190..pvd + 813], b"");

        // Unset 17-byte dates are sixteen ASCII zeros
        for date in 0..4 {
            let at = pvd + 813 + date * 17;
            data[at..at + 16].copy_from_slice(&[b'0'; 16]);
        }
        data[pvd + 881] = 1; // file structure version

        // Volume Descriptor Set Terminator (sector 17)
        let term = 17 * 2048;
        data[term] = 255;
        data[term + 1..term + 6].copy_from_slice(b"CD001");
        data[term + 6] = 1;

        // Path tables: one root entry each, LE at 19 and BE at 21
        write_path_table_root(&mut data[19 * 2048..], 23, false);
        write_path_table_root(&mut data[21 * 2048..], 23, true);

        // Root directory extent (sector 23): "." and ".." entries
        let root = 23 * 2048;
        write_dir_record(&mut data[root..], 23, 2048, 0x02, &[0x00]);
        write_dir_record(&mut data[root + 34..], 23, 2048, 0x02, &[0x01]);

        Self::new(data)
    }
}

/// Write a both-endian 32-bit pair
pub fn write_both_endian_u32(dst: &mut [u8], value: u32) {
    dst[0..4].copy_from_slice(&value.to_le_bytes());
    dst[4..8].copy_from_slice(&value.to_be_bytes());
}

/// Write a both-endian 16-bit pair
pub fn write_both_endian_u16(dst: &mut [u8], value: u16) {
    dst[0..2].copy_from_slice(&value.to_le_bytes());
    dst[2..4].copy_from_slice(&value.to_be_bytes());
}

/// Write a space-padded identifier field
pub fn write_padded(dst: &mut [u8], value: &[u8]) {
    dst[..value.len()].copy_from_slice(value);
    for byte in dst[value.len()..].iter_mut() {
        *byte = b' ';
    }
}

/// Write one directory record, returning its length
pub fn write_dir_record(dst: &mut [u8], lba: u32, size: u32, flags: u8, ident: &[u8]) -> usize {
    let mut len = 33 + ident.len();
    if ident.len() % 2 == 0 {
        len += 1; // padding to even length
    }

    dst[0] = len as u8;
    dst[1] = 0; // extended attribute length
    write_both_endian_u32(&mut dst[2..], lba);
    write_both_endian_u32(&mut dst[10..], size);
    // Recording date (7 bytes) - all zero means unset
    dst[25] = flags;
    write_both_endian_u16(&mut dst[28..], 1); // volume sequence
    dst[32] = ident.len() as u8;
    dst[33..33 + ident.len()].copy_from_slice(ident);
    len
}

/// Write a single-entry path table holding the root directory
pub fn write_path_table_root(dst: &mut [u8], root_lba: u32, big_endian: bool) {
    dst[0] = 1; // identifier length
    dst[1] = 0; // extended attribute length
    if big_endian {
        dst[2..6].copy_from_slice(&root_lba.to_be_bytes());
        dst[6..8].copy_from_slice(&1u16.to_be_bytes());
    } else {
        dst[2..6].copy_from_slice(&root_lba.to_le_bytes());
        dst[6..8].copy_from_slice(&1u16.to_le_bytes());
    }
    dst[8] = 0; // root identifier
    dst[9] = 0; // padding
}

impl BlockIo for MemoryBlockDevice {
    type Error = io::Error;

    fn block_size(&self) -> BlockSize {
        BlockSize::new(self.block_size as u32).expect("valid block size")
    }

    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        Ok((self.data.len() / self.block_size) as u64)
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        let offset = start_lba.0 as usize * self.block_size;
        if offset + dst.len() > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "read beyond end of device",
            ));
        }
        dst.copy_from_slice(&self.data[offset..offset + dst.len()]);
        Ok(())
    }

    fn write_blocks(&mut self, start_lba: Lba, src: &[u8]) -> Result<(), Self::Error> {
        let offset = start_lba.0 as usize * self.block_size;
        if offset + src.len() > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "write beyond end of device",
            ));
        }
        self.data[offset..offset + src.len()].copy_from_slice(src);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
