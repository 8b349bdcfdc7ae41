//! Error types for ISO9660 image operations

use core::fmt;

/// Result type for ISO9660 image operations
pub type Result<T> = core::result::Result<T, IsoError>;

/// Errors that can occur while reading or writing an ISO9660 image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsoError {
    /// I/O error reading or writing the block device
    IoError,

    /// No source given, or the source cannot be opened/read
    InvalidArgument,

    /// Volume descriptor standard identifier does not match "CD001"
    UnsupportedVolumeDescriptor,

    /// Unrecognized volume descriptor structure version
    UnsupportedVersion,

    /// Structurally corrupt data (both-endian mismatch, truncated record,
    /// path table divergence)
    CorruptFormat {
        /// Extent the corrupt structure was read from
        lba: u64,
    },

    /// Directory extent missing or misordering its self/parent entries
    MalformedDirectory {
        /// Extent of the offending directory
        lba: u64,
    },

    /// Path table and directory record tree disagree
    InconsistentFilesystem,

    /// Value exceeds a fixed-width field on encode
    FieldTooLong,

    /// Allocation exceeds the 32-bit addressable extent range
    ImageTooLarge,
}

impl fmt::Display for IsoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoError => write!(f, "I/O error on block device"),
            Self::InvalidArgument => write!(f, "No readable image source given"),
            Self::UnsupportedVolumeDescriptor => {
                write!(f, "Invalid volume descriptor identifier")
            }
            Self::UnsupportedVersion => write!(f, "Unsupported volume descriptor version"),
            Self::CorruptFormat { lba } => write!(f, "Corrupt structure at extent {}", lba),
            Self::MalformedDirectory { lba } => {
                write!(f, "Malformed directory extent at {}", lba)
            }
            Self::InconsistentFilesystem => {
                write!(f, "Path table and directory tree disagree")
            }
            Self::FieldTooLong => write!(f, "Value exceeds fixed-width field"),
            Self::ImageTooLarge => write!(f, "Image exceeds addressable extent range"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for IsoError {}
