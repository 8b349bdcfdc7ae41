//! Programmatic image authoring
//!
//! Builder for composing an image from scratch: add directories and
//! files by path, then write the result to a block device.
//!
//! # Example
//!
//! ```ignore
//! use isoimg::IsoBuilder;
//!
//! let mut builder = IsoBuilder::new().volume_id("BACKUP");
//! builder.add_directory("/DATA")?;
//! builder.add_file("/DATA/README.TXT;1", b"hello")?;
//! let extents = builder.write(&mut block_io)?;
//! ```

use crate::directory::DirectoryRecord;
use crate::error::{IsoError, Result};
use crate::volume::PrimaryVolumeDescriptor;
use crate::write::{allocator, write_image, ContentSource};

use alloc::string::String;
use alloc::vec::Vec;

use gpt_disk_io::BlockIo;

/// Builder for composing a new ISO9660 image
pub struct IsoBuilder {
    system_id: String,
    volume_id: String,
    application_id: String,
    root: DirectoryRecord,
    contents: Vec<Vec<u8>>,
}

impl Default for IsoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IsoBuilder {
    /// Create an empty image: just the root directory
    pub fn new() -> Self {
        Self {
            system_id: String::new(),
            volume_id: String::new(),
            application_id: String::new(),
            root: DirectoryRecord::root(),
            contents: Vec::new(),
        }
    }

    /// Set the volume identifier
    pub fn volume_id(mut self, id: &str) -> Self {
        self.volume_id = String::from(id);
        self
    }

    /// Set the system identifier
    pub fn system_id(mut self, id: &str) -> Self {
        self.system_id = String::from(id);
        self
    }

    /// Set the application identifier
    pub fn application_id(mut self, id: &str) -> Self {
        self.application_id = String::from(id);
        self
    }

    /// Add a directory; its parent directory must already exist
    pub fn add_directory(&mut self, path: &str) -> Result<()> {
        let (parent, name) = self.split_path(path)?;
        allocator::check_ident_len(name.len())?;
        let node = DirectoryRecord::directory(&name);
        let parent = self.dir_node_mut(&parent).ok_or(IsoError::InvalidArgument)?;
        if parent.child_ident(name.as_bytes()).is_some() {
            return Err(IsoError::InvalidArgument);
        }
        parent.add_child(node);
        Ok(())
    }

    /// Add a file with its content; the parent directory must exist
    pub fn add_file(&mut self, path: &str, content: &[u8]) -> Result<()> {
        let (parent, name) = self.split_path(path)?;
        allocator::check_ident_len(name.len())?;

        let mut node = DirectoryRecord::file(&name, content.len() as u32);
        // The extent field carries the content token until allocation
        node.extent_location = self.contents.len() as u32;

        let parent = self.dir_node_mut(&parent).ok_or(IsoError::InvalidArgument)?;
        if parent.child_ident(name.as_bytes()).is_some() {
            return Err(IsoError::InvalidArgument);
        }
        parent.add_child(node);
        self.contents.push(content.to_vec());
        Ok(())
    }

    /// Allocate the layout and write the complete image.
    ///
    /// Returns the image size in extents.
    pub fn write<B: BlockIo>(mut self, block_io: &mut B) -> Result<u32> {
        let mut pvd = PrimaryVolumeDescriptor::new(&self.volume_id);
        pvd.system_id = self.system_id;
        pvd.application_id = self.application_id;
        pvd.root_dir_record = self.root;

        let mut source = SliceContentSource {
            contents: &self.contents,
        };
        write_image(&mut pvd, block_io, &mut source)
    }

    fn split_path<'a>(&self, path: &'a str) -> Result<(Vec<&'a str>, String)> {
        let mut components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        let name = components.pop().ok_or(IsoError::InvalidArgument)?;
        Ok((components, String::from(name)))
    }

    fn dir_node_mut(&mut self, components: &[&str]) -> Option<&mut DirectoryRecord> {
        let mut node = &mut self.root;
        for component in components {
            let bytes = component.as_bytes();
            node = node
                .children
                .iter_mut()
                .find(|c| c.isdir() && !c.is_dot() && !c.is_dot_dot() && c.file_ident == bytes)?;
        }
        Some(node)
    }
}

/// Content source over the builder's in-memory buffers
struct SliceContentSource<'a> {
    contents: &'a [Vec<u8>],
}

impl ContentSource for SliceContentSource<'_> {
    fn read_content(&mut self, token: u32, length: u32, buf: &mut [u8]) -> Result<()> {
        let content = self
            .contents
            .get(token as usize)
            .ok_or(IsoError::InvalidArgument)?;
        buf[..length as usize].copy_from_slice(&content[..length as usize]);
        Ok(())
    }
}
