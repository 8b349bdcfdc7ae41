//! Extent allocation and layout planning
//!
//! A single forward pass with a monotonically increasing LBA cursor:
//! descriptor set first, then the LE and BE path tables, then directory
//! extents breadth-first, then file extents in discovery order.
//! Directories record their children's extent locations, so parents are
//! placed before children and the whole layout is fixed in one pass
//! with no fix-ups.

use crate::directory::{record, tree, DirectoryRecord};
use crate::error::{IsoError, Result};
use crate::types::VOLUME_DESCRIPTOR_START;
use crate::utils::sector::blocks_for_bytes;

use alloc::vec::Vec;

use log::debug;

/// First extent past the descriptor set: sixteen system-area extents,
/// the Primary descriptor, the set terminator, and the version block
/// mastering tools reserve after it.
pub const FIRST_FREE_EXTENT: u64 = VOLUME_DESCRIPTOR_START + 3;

/// Path tables are placed on 4096-byte-aligned extent pairs; each table
/// owns its own extents even when both would fit in one.
const PATH_TABLE_ALIGN: u32 = 4096;

/// Placement of one file's content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePlacement {
    /// Content token: the record's extent field before allocation ran
    pub token: u32,

    /// Assigned extent
    pub extent: u32,

    /// Content length in bytes
    pub data_length: u32,
}

/// The computed image layout
#[derive(Debug, Clone)]
pub struct LayoutPlan {
    /// Path table size in bytes (one encoding)
    pub path_tbl_size: u32,

    /// Extents occupied by each path table
    pub path_table_extents: u32,

    /// Assigned LE path table location
    pub path_table_location_le: u32,

    /// Assigned BE path table location
    pub path_table_location_be: u32,

    /// Total extents in the image
    pub space_size: u32,

    /// File placements in discovery order
    pub files: Vec<FilePlacement>,
}

/// Assign every directory and file below `root` a block-aligned extent.
///
/// Mutates the tree in place: directory `data_length` and every
/// `extent_location` (including the self/parent entries) are filled in.
/// Repeated runs over the same input produce identical assignments.
pub fn plan_layout(root: &mut DirectoryRecord, block_size: u32) -> Result<LayoutPlan> {
    let dir_paths = directory_paths(root);

    // Directory extent sizes depend only on their record lists
    let mut path_tbl_size = 0u32;
    for path in &dir_paths {
        let node = tree::node_at_mut(root, path);
        let encoded = node.encoded_len(block_size) as u64;
        node.data_length =
            (blocks_for_bytes(encoded, block_size) * block_size as u64) as u32;
        let id_len = node.file_ident.len();
        path_tbl_size += (8 + id_len + (id_len & 1)) as u32;
    }

    let mut cursor: u64 = FIRST_FREE_EXTENT;
    let path_table_extents = (path_tbl_size.div_ceil(PATH_TABLE_ALIGN) * 2) as u64;
    let path_table_location_le = cursor as u32;
    cursor += path_table_extents;
    let path_table_location_be = cursor as u32;
    cursor += path_table_extents;

    // Directory extents, breadth-first
    for path in &dir_paths {
        let node = tree::node_at_mut(root, path);
        node.extent_location = cursor as u32;
        cursor += blocks_for_bytes(node.data_length as u64, block_size);
        if cursor > u32::MAX as u64 {
            return Err(IsoError::ImageTooLarge);
        }
    }

    // Self/parent entries mirror their directory's and its parent's
    // placement (the root is its own parent)
    for path in &dir_paths {
        let (own_extent, own_len, parent_extent, parent_len) = {
            let node = tree::node_at(root, path);
            let parent = if path.is_empty() {
                node
            } else {
                tree::node_at(root, &path[..path.len() - 1])
            };
            (
                node.extent_location,
                node.data_length,
                parent.extent_location,
                parent.data_length,
            )
        };
        let node = tree::node_at_mut(root, path);
        node.children[0].extent_location = own_extent;
        node.children[0].data_length = own_len;
        node.children[1].extent_location = parent_extent;
        node.children[1].data_length = parent_len;
    }

    // File extents, in the order the breadth-first walk discovers them
    let mut files = Vec::new();
    for path in &dir_paths {
        let node = tree::node_at_mut(root, path);
        for child in node.children.iter_mut() {
            if child.is_file() {
                let placement = FilePlacement {
                    token: child.extent_location,
                    extent: cursor as u32,
                    data_length: child.data_length,
                };
                child.extent_location = placement.extent;
                files.push(placement);
                cursor += blocks_for_bytes(child.data_length as u64, block_size);
                if cursor > u32::MAX as u64 {
                    return Err(IsoError::ImageTooLarge);
                }
            }
        }
    }

    debug!(
        "layout: {} directories, {} files, {} extents",
        dir_paths.len(),
        files.len(),
        cursor
    );

    Ok(LayoutPlan {
        path_tbl_size,
        path_table_extents: path_table_extents as u32,
        path_table_location_le,
        path_table_location_be,
        space_size: cursor as u32,
        files,
    })
}

/// Index paths of every directory below (and including) `root`, in the
/// same breadth-first order the path table uses
pub fn directory_paths(root: &DirectoryRecord) -> Vec<Vec<usize>> {
    let mut paths: Vec<Vec<usize>> = Vec::new();
    paths.push(Vec::new());

    let mut next = 0usize;
    while next < paths.len() {
        let path = paths[next].clone();
        let node = tree::node_at(root, &path);
        for (i, child) in node.children.iter().enumerate() {
            if child.isdir() && !child.is_dot() && !child.is_dot_dot() {
                let mut child_path = path.clone();
                child_path.push(i);
                paths.push(child_path);
            }
        }
        next += 1;
    }
    paths
}

/// Record length sanity limit for identifiers (`dr_len` is one byte)
pub fn check_ident_len(ident_len: usize) -> Result<()> {
    if record::record_len(ident_len) > u8::MAX as usize {
        return Err(IsoError::FieldTooLong);
    }
    Ok(())
}
