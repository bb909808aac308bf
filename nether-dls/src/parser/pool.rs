//! Pool table ('ptbl') parsing

use std::io::{Read, Seek};

use crate::chunk::{ChunkHeader, ChunkReader};
use crate::error::DlsError;
use crate::module::{POOL_CUE_SIZE, POOL_TABLE_HEADER_SIZE, PoolCue, PoolTable};

use super::helpers::read_u32;

/// Parse a pool table chunk
///
/// The chunk size must match the header size plus the cue records exactly,
/// and the stream must hold the whole chunk, before anything is allocated.
pub(crate) fn parse_pool_table<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    chunk: &ChunkHeader,
) -> Result<PoolTable, DlsError> {
    if chunk.size < POOL_TABLE_HEADER_SIZE {
        return Err(DlsError::PoolTableTooSmall(chunk.size));
    }

    reader.reset_data(chunk)?;
    let header_size = read_u32(reader)?;
    let cue_count = read_u32(reader)?;

    let expected = u64::from(header_size) + u64::from(cue_count) * u64::from(POOL_CUE_SIZE);
    if u64::from(chunk.size) != expected {
        return Err(DlsError::PoolTableSizeMismatch {
            chunk_size: chunk.size,
            expected,
        });
    }
    if header_size != POOL_TABLE_HEADER_SIZE {
        return Err(DlsError::PoolTableHeaderSize(header_size));
    }

    reader.ensure_in_stream(chunk)?;
    let mut cues = Vec::new();
    cues.try_reserve_exact(cue_count as usize)?;
    for _ in 0..cue_count {
        cues.push(PoolCue {
            offset: read_u32(reader)?,
        });
    }

    tracing::debug!(cues = cues.len(), "pool table");

    Ok(PoolTable { header_size, cues })
}
