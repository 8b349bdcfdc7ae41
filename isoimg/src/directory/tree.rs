//! Tree building and cross-validation
//!
//! Reconciles the two on-disk views of the hierarchy: the recursive
//! directory record tree and the flat path table. Either structure alone
//! can be internally well-formed yet disagree with the other, so the
//! reader validates them against each other.

use crate::device;
use crate::directory::path_table::{PathTable, PathTableEntry};
use crate::directory::{DirectoryRecord, IDENT_SELF};
use crate::error::{IsoError, Result};
use crate::utils::sector::block_to_byte;

use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::vec::Vec;

use gpt_disk_io::BlockIo;
use log::trace;

/// Resolve the full directory tree below `root`.
///
/// Walks directory extents breadth-first with an explicit worklist
/// rather than recursion, so adversarially deep images cannot exhaust
/// the stack. The standard's tree is acyclic by construction, so a
/// directory extent seen twice means sharing or a cycle.
pub fn walk_tree<B: BlockIo>(
    block_io: &mut B,
    root: &mut DirectoryRecord,
    block_size: u32,
) -> Result<()> {
    let mut visited: BTreeMap<u32, usize> = BTreeMap::new();
    visited.insert(root.extent_location, 0);

    // Worklist of (index path from root, depth)
    let mut queue: VecDeque<(Vec<usize>, usize)> = VecDeque::new();
    queue.push_back((Vec::new(), 0));

    while let Some((path, depth)) = queue.pop_front() {
        let (lba, len) = {
            let node = node_at(root, &path);
            (node.extent_location, node.data_length)
        };
        trace!("walking directory extent {} ({} bytes), depth {}", lba, len, depth);

        let mut data = alloc::vec![0u8; len as usize];
        device::read_bytes_at(block_io, block_to_byte(lba as u64, block_size), &mut data)?;
        let children = DirectoryRecord::decode_extent(&data, block_size, lba as u64)?;

        let node = node_at_mut(root, &path);
        node.children = children;
        for (i, child) in node.children.iter().enumerate() {
            if child.isdir() && !child.is_dot() && !child.is_dot_dot() {
                if visited.insert(child.extent_location, depth + 1).is_some() {
                    return Err(IsoError::InconsistentFilesystem);
                }
                let mut child_path = path.clone();
                child_path.push(i);
                queue.push_back((child_path, depth + 1));
            }
        }
    }

    Ok(())
}

/// Derive the path table from a fully-resolved tree.
///
/// Directories only, breadth-first, parents before children; entries at
/// one level follow their parents' table order, then identifier order
/// (the children are already identifier-sorted).
pub fn build_path_table(root: &DirectoryRecord) -> PathTable {
    let mut entries = Vec::new();
    entries.push(PathTableEntry {
        ident: IDENT_SELF.to_vec(),
        extent_location: root.extent_location,
        parent_index: 1,
    });

    let mut queue: VecDeque<(&DirectoryRecord, u16)> = VecDeque::new();
    queue.push_back((root, 1));

    while let Some((node, index)) = queue.pop_front() {
        for child in &node.children {
            if child.isdir() && !child.is_dot() && !child.is_dot_dot() {
                entries.push(PathTableEntry {
                    ident: child.file_ident.clone(),
                    extent_location: child.extent_location,
                    parent_index: index,
                });
                queue.push_back((child, entries.len() as u16));
            }
        }
    }

    PathTable { entries }
}

/// Cross-validate a resolved tree against an independently decoded path
/// table: one entry per directory, matching extents, identifiers, and
/// parent references, in both directions.
pub fn validate(root: &DirectoryRecord, table: &PathTable) -> Result<()> {
    let dirs = directory_index(root);
    if dirs.len() != table.len() {
        return Err(IsoError::InconsistentFilesystem);
    }

    let mut seen: BTreeSet<u32> = BTreeSet::new();
    for entry in &table.entries {
        let (ident, parent_extent) = dirs
            .get(&entry.extent_location)
            .ok_or(IsoError::InconsistentFilesystem)?;
        if entry.ident != *ident {
            return Err(IsoError::InconsistentFilesystem);
        }

        let parent = entry.parent_index as usize;
        if parent == 0 || parent > table.len() {
            return Err(IsoError::InconsistentFilesystem);
        }
        if table.entries[parent - 1].extent_location != *parent_extent {
            return Err(IsoError::InconsistentFilesystem);
        }

        // Counts match, so a duplicated extent means some directory went
        // unreferenced
        if !seen.insert(entry.extent_location) {
            return Err(IsoError::InconsistentFilesystem);
        }
    }

    Ok(())
}

/// Side index from each directory extent to its parent's extent.
///
/// Self/parent entries are name markers, not ownership edges; true
/// "get parent" navigation goes through this map. The root maps to
/// itself.
pub fn parent_map(root: &DirectoryRecord) -> BTreeMap<u32, u32> {
    let mut map = BTreeMap::new();
    for (extent, (_, parent_extent)) in directory_index(root) {
        map.insert(extent, parent_extent);
    }
    map
}

/// Breadth-first index of every directory: extent -> (ident, parent extent)
fn directory_index(root: &DirectoryRecord) -> BTreeMap<u32, (Vec<u8>, u32)> {
    let mut dirs: BTreeMap<u32, (Vec<u8>, u32)> = BTreeMap::new();
    dirs.insert(
        root.extent_location,
        (IDENT_SELF.to_vec(), root.extent_location),
    );

    let mut queue: VecDeque<&DirectoryRecord> = VecDeque::new();
    queue.push_back(root);
    while let Some(node) = queue.pop_front() {
        for child in &node.children {
            if child.isdir() && !child.is_dot() && !child.is_dot_dot() {
                dirs.insert(
                    child.extent_location,
                    (child.file_ident.clone(), node.extent_location),
                );
                queue.push_back(child);
            }
        }
    }
    dirs
}

pub(crate) fn node_at<'a>(root: &'a DirectoryRecord, path: &[usize]) -> &'a DirectoryRecord {
    let mut node = root;
    for &i in path {
        node = &node.children[i];
    }
    node
}

pub(crate) fn node_at_mut<'a>(
    root: &'a mut DirectoryRecord,
    path: &[usize],
) -> &'a mut DirectoryRecord {
    let mut node = root;
    for &i in path {
        node = &mut node.children[i];
    }
    node
}
