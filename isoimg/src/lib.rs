//! ISO9660 Image Engine
//!
//! A `no_std`-capable implementation of the ISO9660 (ECMA-119) optical
//! disc filesystem: parse an existing image, represent its directory
//! hierarchy and volume metadata in memory, and serialize a hierarchy
//! back into a standards-compliant image.
//!
//! # Overview
//!
//! This crate provides:
//! - Volume descriptor set parsing (Primary, Supplementary, Boot Record)
//! - Directory record tree resolution with path table cross-validation
//! - File reading from extent-based storage
//! - A deterministic extent allocator and image writer
//! - A builder for composing new images programmatically
//!
//! # Architecture
//!
//! The implementation is layered:
//! 1. **Codec layer** - Both-endian integers, padded strings, datetimes
//! 2. **Volume layer** - Parses volume descriptors from sectors 16+
//! 3. **Directory layer** - Directory records, path tables, tree building
//! 4. **File layer** - Reads file data from extents
//! 5. **Write layer** - Extent allocation and image serialization
//!
//! # Reading
//!
//! ```ignore
//! use isoimg::IsoImage;
//!
//! let image = IsoImage::open(&mut block_io)?;
//! println!("{} extents", image.pvd().space_size);
//!
//! let readme = image.find("/README.TXT").unwrap();
//! let data = image.read_file_vec(&mut block_io, readme)?;
//! ```
//!
//! # Writing
//!
//! ```ignore
//! use isoimg::IsoBuilder;
//!
//! let mut builder = IsoBuilder::new().volume_id("BACKUP");
//! builder.add_file("/HELLO.TXT;1", b"Hello, World!")?;
//! builder.write(&mut block_io)?;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod codec;
pub mod device;
pub mod directory;
pub mod error;
pub mod file;
pub mod image;
pub mod types;
pub mod utils;
pub mod volume;
pub mod write;

pub use error::{IsoError, Result};
pub use types::{FileFlags, VolumeDescriptorType};

pub use directory::path_table::{PathTable, PathTableEntry, PathTableType};
pub use directory::DirectoryRecord;
pub use image::IsoImage;
pub use volume::{DescriptorSet, PrimaryVolumeDescriptor};
pub use write::builder::IsoBuilder;
pub use write::{write_image, ContentSource, ImageContentSource};

#[cfg(feature = "std")]
pub use device::FileDevice;
