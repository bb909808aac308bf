//! Error types for DLS collection loading

use std::collections::TryReserveError;
use std::io;

use crate::chunk::FourCc;

/// Errors that can occur while loading a DLS collection
#[derive(Debug, thiserror::Error)]
pub enum DlsError {
    /// Outermost chunk is not a RIFF chunk
    #[error("not a RIFF file (outer chunk is '{0}')")]
    NotRiff(FourCc),

    /// RIFF form type is not "DLS "
    #[error("not a DLS collection (form type is '{0}')")]
    NotDlsCollection(FourCc),

    /// A child chunk extends past the end of its parent
    #[error("chunk '{id}' at 0x{offset:08X} overruns its parent (ends at 0x{end:08X}, parent ends at 0x{parent_end:08X})")]
    ChunkOverrun {
        id: FourCc,
        offset: u64,
        end: u64,
        parent_end: u64,
    },

    /// Stream ended in the middle of a chunk
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// A fixed-size chunk has the wrong payload size
    #[error("chunk '{id}' has size {actual} (expected {expected})")]
    InvalidChunkSize {
        id: FourCc,
        expected: u32,
        actual: u32,
    },

    /// Pool table chunk too small to hold its header
    #[error("pool table chunk too small: {0} bytes")]
    PoolTableTooSmall(u32),

    /// Pool table chunk size disagrees with its header and cue count
    #[error("pool table size mismatch: chunk holds {chunk_size} bytes, header declares {expected}")]
    PoolTableSizeMismatch { chunk_size: u32, expected: u64 },

    /// Pool table header declares an unsupported header size
    #[error("invalid pool table header size: {0} (expected 8)")]
    PoolTableHeaderSize(u32),

    /// Instrument list entry without an 'insh' chunk
    #[error("instrument at 0x{0:08X} has no 'insh' header")]
    MissingInstrumentHeader(u64),

    /// Region list entry without an 'rgnh' chunk
    #[error("region at 0x{0:08X} has no 'rgnh' header")]
    MissingRegionHeader(u64),

    /// Malformed 'wsmp' chunk
    #[error("invalid wave sample chunk at 0x{0:08X}")]
    InvalidWaveSample(u64),

    /// Malformed 'art1'/'art2' chunk
    #[error("invalid articulation chunk at 0x{0:08X}")]
    InvalidArticulation(u64),

    /// Top-level walk hit the configured chunk limit
    #[error("too many chunks: limit of {0} reached")]
    TooManyChunks(u32),

    /// Top-level walk did not advance the stream
    #[error("no forward progress at offset 0x{0:08X}")]
    NoProgress(u64),

    /// Allocation failed
    #[error("out of memory")]
    OutOfMemory(#[from] TryReserveError),

    /// I/O error from the backing stream
    #[error("IO error: {0}")]
    Io(io::Error),
}

impl DlsError {
    /// Malformed input, as opposed to a system failure
    pub fn is_format_error(&self) -> bool {
        !matches!(self, Self::OutOfMemory(_) | Self::Io(_))
    }

    /// Allocation failure
    pub fn is_resource_error(&self) -> bool {
        matches!(self, Self::OutOfMemory(_))
    }
}

impl From<io::Error> for DlsError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEof
        } else {
            Self::Io(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            DlsError::NotRiff(FourCc(*b"RIFX")).to_string(),
            "not a RIFF file (outer chunk is 'RIFX')"
        );
        assert_eq!(
            DlsError::PoolTableHeaderSize(12).to_string(),
            "invalid pool table header size: 12 (expected 8)"
        );
        assert_eq!(
            DlsError::PoolTableSizeMismatch {
                chunk_size: 20,
                expected: 16
            }
            .to_string(),
            "pool table size mismatch: chunk holds 20 bytes, header declares 16"
        );
    }

    #[test]
    fn test_eof_maps_to_unexpected_eof() {
        let err: DlsError = io::Error::from(io::ErrorKind::UnexpectedEof).into();
        assert!(matches!(err, DlsError::UnexpectedEof));

        let err: DlsError = io::Error::other("disk on fire").into();
        assert!(matches!(err, DlsError::Io(_)));
        assert!(!err.is_format_error());
    }

    #[test]
    fn test_classification() {
        assert!(DlsError::PoolTableTooSmall(4).is_format_error());
        assert!(!DlsError::PoolTableTooSmall(4).is_resource_error());

        let reserve = Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err();
        let err = DlsError::from(reserve);
        assert!(err.is_resource_error());
        assert!(!err.is_format_error());
    }
}
