//! Directory record tree
//!
//! A directory's extent holds a sequence of variable-length records: the
//! "dot" self entry, the "dot-dot" parent entry, then the remaining
//! entries ordered by identifier. Records never straddle a block
//! boundary; a zero length byte pads the rest of a block.

pub mod path_table;
pub mod record;
pub mod tree;

use crate::error::{IsoError, Result};
use crate::types::FileFlags;
use crate::utils::datetime::DateTime7;
use crate::utils::string;

use alloc::string::String;
use alloc::vec::Vec;

/// Identifier byte for the "dot" self entry
pub const IDENT_SELF: &[u8] = &[0x00];

/// Identifier byte for the "dot-dot" parent entry
pub const IDENT_PARENT: &[u8] = &[0x01];

/// One entry (file or directory) in the hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    /// Record byte length, even-padded
    pub dr_len: u8,

    /// LBA of this entry's data
    pub extent_location: u32,

    /// Byte size of this entry's content
    pub data_length: u32,

    /// Raw identifier bytes (0x00 = self/root, 0x01 = parent)
    pub file_ident: Vec<u8>,

    /// File flags
    pub flags: FileFlags,

    /// Recording date and time, `None` when unset
    pub recorded_at: Option<DateTime7>,

    /// Volume sequence number this extent lives on
    pub volume_seq: u16,

    /// True only for the record reachable as the volume's root
    pub is_root: bool,

    /// Child records, populated only for directories
    pub children: Vec<DirectoryRecord>,
}

impl DirectoryRecord {
    /// Create a record with a computed `dr_len`
    fn new(ident: &[u8], flags: FileFlags) -> Self {
        Self {
            dr_len: record::record_len(ident.len()) as u8,
            extent_location: 0,
            data_length: 0,
            file_ident: ident.to_vec(),
            flags,
            recorded_at: None,
            volume_seq: 1,
            is_root: false,
            children: Vec::new(),
        }
    }

    /// Create the root directory record with its self and parent entries
    pub fn root() -> Self {
        let mut root = Self::new(
            IDENT_SELF,
            FileFlags {
                directory: true,
                ..FileFlags::default()
            },
        );
        root.is_root = true;
        root.children.push(Self::dot());
        root.children.push(Self::dot_dot());
        root
    }

    /// Create a directory record (with self and parent entries) for `name`
    pub fn directory(name: &str) -> Self {
        let mut dir = Self::new(
            name.as_bytes(),
            FileFlags {
                directory: true,
                ..FileFlags::default()
            },
        );
        dir.children.push(Self::dot());
        dir.children.push(Self::dot_dot());
        dir
    }

    /// Create a file record for `name` with a known content length
    pub fn file(name: &str, data_length: u32) -> Self {
        let mut file = Self::new(name.as_bytes(), FileFlags::default());
        file.data_length = data_length;
        file
    }

    /// The "dot" self entry
    pub fn dot() -> Self {
        Self::new(
            IDENT_SELF,
            FileFlags {
                directory: true,
                ..FileFlags::default()
            },
        )
    }

    /// The "dot-dot" parent entry
    pub fn dot_dot() -> Self {
        Self::new(
            IDENT_PARENT,
            FileFlags {
                directory: true,
                ..FileFlags::default()
            },
        )
    }

    /// Is this the "dot" self entry?
    pub fn is_dot(&self) -> bool {
        !self.is_root && self.file_ident.as_slice() == IDENT_SELF
    }

    /// Is this the "dot-dot" parent entry?
    pub fn is_dot_dot(&self) -> bool {
        self.file_ident.as_slice() == IDENT_PARENT
    }

    /// Is this a directory?
    pub fn isdir(&self) -> bool {
        self.flags.directory
    }

    /// Is this a regular file?
    pub fn is_file(&self) -> bool {
        !self.flags.directory
    }

    /// Is this hidden?
    pub fn is_hidden(&self) -> bool {
        self.flags.hidden
    }

    /// Display name: identifier bytes with the version suffix stripped
    pub fn name(&self) -> String {
        match string::dchars_to_str(&self.file_ident) {
            Ok(s) => String::from(string::strip_version(s)),
            Err(_) => String::from_utf8_lossy(&self.file_ident).into_owned(),
        }
    }

    /// File extension of the display name, if any
    pub fn extension(&self) -> Option<String> {
        let name = self.name();
        name.rsplit_once('.').map(|(_, ext)| String::from(ext))
    }

    /// Insert a child, keeping self first, parent second, and the rest
    /// ordered by identifier
    pub fn add_child(&mut self, child: DirectoryRecord) {
        let start = self
            .children
            .iter()
            .take_while(|c| c.is_dot() || c.is_dot_dot())
            .count();
        let at = self.children[start..]
            .iter()
            .position(|c| c.file_ident > child.file_ident)
            .map(|i| start + i)
            .unwrap_or(self.children.len());
        self.children.insert(at, child);
    }

    /// Look up a direct child (skipping self/parent entries) by display
    /// name, case-insensitively
    pub fn child(&self, name: &str) -> Option<&DirectoryRecord> {
        self.children
            .iter()
            .filter(|c| !c.is_dot() && !c.is_dot_dot())
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// Look up a direct child (skipping self/parent entries) by exact
    /// identifier bytes
    pub fn child_ident(&self, ident: &[u8]) -> Option<&DirectoryRecord> {
        self.children
            .iter()
            .filter(|c| !c.is_dot() && !c.is_dot_dot())
            .find(|c| c.file_ident == ident)
    }

    /// Byte length of this directory's encoded extent, before block
    /// rounding (records never straddle a block boundary)
    pub fn encoded_len(&self, block_size: u32) -> u32 {
        let bs = block_size;
        let mut cursor = 0u32;
        for child in &self.children {
            let len = record::record_len(child.file_ident.len()) as u32;
            if cursor % bs + len > bs {
                cursor = (cursor / bs + 1) * bs;
            }
            cursor += len;
        }
        cursor
    }

    /// Encode this directory's extent: self, parent, then the remaining
    /// children in identifier order, zero-padded to the block boundary
    pub fn encode_extent(&self, block_size: u32) -> Result<Vec<u8>> {
        if self.children.len() < 2 || !self.children[0].is_dot() || !self.children[1].is_dot_dot()
        {
            return Err(IsoError::MalformedDirectory {
                lba: self.extent_location as u64,
            });
        }

        let bs = block_size as usize;
        let total = crate::utils::sector::align_to_block(self.encoded_len(block_size) as u64, block_size)
            .max(block_size as u64) as usize;
        let mut out = alloc::vec![0u8; total];
        let mut cursor = 0usize;
        for child in &self.children {
            let len = record::record_len(child.file_ident.len());
            if cursor % bs + len > bs {
                cursor = (cursor / bs + 1) * bs;
            }
            cursor += record::encode_one(&mut out[cursor..], child);
        }
        Ok(out)
    }

    /// Decode one directory extent into its (shallow) child records.
    ///
    /// The first record must be the self entry and the second the parent
    /// entry; anything else is a malformed directory. A zero length byte
    /// skips to the next block boundary.
    pub fn decode_extent(data: &[u8], block_size: u32, lba: u64) -> Result<Vec<DirectoryRecord>> {
        let bs = block_size as usize;
        let mut children = Vec::new();
        let mut offset = 0usize;

        while offset < data.len() {
            match record::decode_one(&data[offset..]) {
                Ok(Some((child, consumed))) => {
                    children.push(child);
                    offset += consumed;
                }
                Ok(None) => {
                    // Padding to the next block boundary
                    offset = (offset / bs + 1) * bs;
                }
                Err(IsoError::CorruptFormat { .. }) => {
                    return Err(IsoError::CorruptFormat { lba });
                }
                Err(e) => return Err(e),
            }
        }

        if children.len() < 2
            || children[0].file_ident.as_slice() != IDENT_SELF
            || children[1].file_ident.as_slice() != IDENT_PARENT
        {
            return Err(IsoError::MalformedDirectory { lba });
        }

        Ok(children)
    }
}
