//! Block device access helpers
//!
//! The engine addresses the image in logical blocks, but structures are
//! not always sector-aligned (path tables and directory extents end
//! mid-sector). These helpers bridge byte-offset access onto the
//! sector-granular `BlockIo` trait.

use crate::error::{IsoError, Result};
use crate::types::SECTOR_SIZE;

use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

/// Read `buf.len()` bytes starting at an absolute byte offset
pub fn read_bytes_at<B: BlockIo>(block_io: &mut B, offset: u64, buf: &mut [u8]) -> Result<()> {
    let mut sector = [0u8; SECTOR_SIZE];
    let mut done = 0usize;

    while done < buf.len() {
        let pos = offset + done as u64;
        let lba = pos / SECTOR_SIZE as u64;
        let in_sector = (pos % SECTOR_SIZE as u64) as usize;

        block_io
            .read_blocks(Lba(lba), &mut sector)
            .map_err(|_| IsoError::IoError)?;

        let take = (SECTOR_SIZE - in_sector).min(buf.len() - done);
        buf[done..done + take].copy_from_slice(&sector[in_sector..in_sector + take]);
        done += take;
    }

    Ok(())
}

/// Write `data` starting at an absolute byte offset.
///
/// Partial head/tail sectors are read back first so the surrounding
/// bytes survive.
pub fn write_bytes_at<B: BlockIo>(block_io: &mut B, offset: u64, data: &[u8]) -> Result<()> {
    let mut sector = [0u8; SECTOR_SIZE];
    let mut done = 0usize;

    while done < data.len() {
        let pos = offset + done as u64;
        let lba = pos / SECTOR_SIZE as u64;
        let in_sector = (pos % SECTOR_SIZE as u64) as usize;
        let take = (SECTOR_SIZE - in_sector).min(data.len() - done);

        if take < SECTOR_SIZE {
            block_io
                .read_blocks(Lba(lba), &mut sector)
                .map_err(|_| IsoError::IoError)?;
        }
        sector[in_sector..in_sector + take].copy_from_slice(&data[done..done + take]);
        block_io
            .write_blocks(Lba(lba), &sector)
            .map_err(|_| IsoError::IoError)?;
        done += take;
    }

    Ok(())
}

#[cfg(feature = "std")]
pub use file_device::FileDevice;

#[cfg(feature = "std")]
mod file_device {
    use crate::error::{IsoError, Result};
    use crate::types::SECTOR_SIZE;

    use std::fs::File;
    use std::io::{Read, Seek, SeekFrom, Write};
    use std::path::Path;

    use gpt_disk_io::BlockIo;
    use gpt_disk_types::{BlockSize, Lba};

    /// File-backed block device with 2048-byte sectors
    ///
    /// Rejects missing, unreadable, or non-file sources before any byte
    /// of the image is parsed.
    #[derive(Debug)]
    pub struct FileDevice {
        file: File,
        num_sectors: u64,
    }

    impl FileDevice {
        /// Open an image file for reading and writing where permitted
        pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
            let path = path.as_ref();
            let metadata = std::fs::metadata(path).map_err(|_| IsoError::InvalidArgument)?;
            if !metadata.is_file() {
                return Err(IsoError::InvalidArgument);
            }
            let file = File::open(path).map_err(|_| IsoError::InvalidArgument)?;
            Ok(Self {
                file,
                num_sectors: metadata.len() / SECTOR_SIZE as u64,
            })
        }

        /// Create (or truncate) an image file sized to `num_sectors`
        pub fn create<P: AsRef<Path>>(path: P, num_sectors: u64) -> Result<Self> {
            let file = File::options()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(path.as_ref())
                .map_err(|_| IsoError::InvalidArgument)?;
            file.set_len(num_sectors * SECTOR_SIZE as u64)
                .map_err(|_| IsoError::IoError)?;
            Ok(Self { file, num_sectors })
        }
    }

    impl BlockIo for FileDevice {
        type Error = std::io::Error;

        fn block_size(&self) -> BlockSize {
            BlockSize::new(SECTOR_SIZE as u32).expect("valid block size")
        }

        fn num_blocks(&mut self) -> core::result::Result<u64, Self::Error> {
            Ok(self.num_sectors)
        }

        fn read_blocks(
            &mut self,
            start_lba: Lba,
            dst: &mut [u8],
        ) -> core::result::Result<(), Self::Error> {
            self.file
                .seek(SeekFrom::Start(start_lba.0 * SECTOR_SIZE as u64))?;
            self.file.read_exact(dst)
        }

        fn write_blocks(
            &mut self,
            start_lba: Lba,
            src: &[u8],
        ) -> core::result::Result<(), Self::Error> {
            self.file
                .seek(SeekFrom::Start(start_lba.0 * SECTOR_SIZE as u64))?;
            self.file.write_all(src)
        }

        fn flush(&mut self) -> core::result::Result<(), Self::Error> {
            self.file.flush()
        }
    }
}
