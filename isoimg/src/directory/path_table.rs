//! Path table model
//!
//! The path table is a flattened, depth-ordered index of every directory,
//! stored twice on disk: once little-endian (Type L) and once big-endian
//! (Type M). Both encodings are derived serializations of one canonical
//! entry list; they are never decoded-then-mutated independently.

use crate::error::{IsoError, Result};

use alloc::vec::Vec;

/// Path table encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTableType {
    /// Little-endian (Type L)
    LittleEndian,
    /// Big-endian (Type M)
    BigEndian,
}

/// One path table entry, referencing a directory's extent and its
/// parent's 1-based index in the same table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTableEntry {
    /// Directory identifier bytes (a single 0x00 for the root)
    pub ident: Vec<u8>,

    /// Location of the directory's extent
    pub extent_location: u32,

    /// 1-based index of the parent directory (the root's parent is itself)
    pub parent_index: u16,
}

impl PathTableEntry {
    /// Serialized size: 8-byte header, identifier, and a padding byte
    /// when the identifier length is odd
    pub fn size(&self) -> usize {
        let base = 8 + self.ident.len();
        if self.ident.len() % 2 == 1 {
            base + 1
        } else {
            base
        }
    }
}

/// The canonical, depth-ordered directory index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTable {
    /// Entries in breadth-first, parent-before-child order
    pub entries: Vec<PathTableEntry>,
}

impl PathTable {
    /// Exact serialized byte length of one encoding (both are equal)
    pub fn size(&self) -> u32 {
        self.entries.iter().map(|e| e.size() as u32).sum()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode a path table from its serialized bytes
    pub fn decode(data: &[u8], table_type: PathTableType, lba: u64) -> Result<Self> {
        let mut entries = Vec::new();
        let mut offset = 0usize;

        while offset < data.len() {
            if offset + 8 > data.len() {
                return Err(IsoError::CorruptFormat { lba });
            }
            let id_len = data[offset] as usize;
            if id_len == 0 {
                return Err(IsoError::CorruptFormat { lba });
            }

            let loc_bytes = [
                data[offset + 2],
                data[offset + 3],
                data[offset + 4],
                data[offset + 5],
            ];
            let parent_bytes = [data[offset + 6], data[offset + 7]];
            let (extent_location, parent_index) = match table_type {
                PathTableType::LittleEndian => (
                    u32::from_le_bytes(loc_bytes),
                    u16::from_le_bytes(parent_bytes),
                ),
                PathTableType::BigEndian => (
                    u32::from_be_bytes(loc_bytes),
                    u16::from_be_bytes(parent_bytes),
                ),
            };

            let id_end = offset + 8 + id_len;
            if id_end > data.len() {
                return Err(IsoError::CorruptFormat { lba });
            }
            let entry = PathTableEntry {
                ident: data[offset + 8..id_end].to_vec(),
                extent_location,
                parent_index,
            };
            offset += entry.size();
            entries.push(entry);
        }

        Ok(Self { entries })
    }

    /// Encode the canonical entry list in the requested byte order
    pub fn encode(&self, table_type: PathTableType) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size() as usize);
        for entry in &self.entries {
            out.push(entry.ident.len() as u8);
            out.push(0); // extended attribute record length
            match table_type {
                PathTableType::LittleEndian => {
                    out.extend_from_slice(&entry.extent_location.to_le_bytes());
                    out.extend_from_slice(&entry.parent_index.to_le_bytes());
                }
                PathTableType::BigEndian => {
                    out.extend_from_slice(&entry.extent_location.to_be_bytes());
                    out.extend_from_slice(&entry.parent_index.to_be_bytes());
                }
            }
            out.extend_from_slice(&entry.ident);
            if entry.ident.len() % 2 == 1 {
                out.push(0);
            }
        }
        out
    }

    /// Check that two independently decoded tables describe the same
    /// structure (the LE/BE cross-validation)
    pub fn cross_validate(&self, other: &PathTable, lba: u64) -> Result<()> {
        if self.entries != other.entries {
            return Err(IsoError::CorruptFormat { lba });
        }
        Ok(())
    }
}
