//! Pool table structures

/// Pool table header size on disk (cbSize + cCues)
pub const POOL_TABLE_HEADER_SIZE: u32 = 8;

/// Size of one cue record on disk
pub const POOL_CUE_SIZE: u32 = 4;

/// One pool cue: offset of a wave inside the wave pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolCue {
    pub offset: u32,
}

/// Decoded 'ptbl' chunk
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoolTable {
    /// Header size as declared in the file (always 8 once validated)
    pub header_size: u32,
    pub cues: Vec<PoolCue>,
}

impl PoolTable {
    pub fn new(cues: Vec<PoolCue>) -> Self {
        Self {
            header_size: POOL_TABLE_HEADER_SIZE,
            cues,
        }
    }

    pub fn cue_count(&self) -> usize {
        self.cues.len()
    }

    pub fn cue(&self, index: usize) -> Option<&PoolCue> {
        self.cues.get(index)
    }

    /// Payload size of the chunk this table serializes to
    pub fn chunk_size(&self) -> u64 {
        u64::from(self.header_size) + self.cues.len() as u64 * u64::from(POOL_CUE_SIZE)
    }
}
