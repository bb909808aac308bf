//! DLS file writer
//!
//! [`RiffWriter`] builds arbitrary (including deliberately malformed) chunk
//! trees; [`CollectionWriter`] serializes a complete collection from the same
//! types the loader produces.

mod instrument;
mod riff;


pub use riff::RiffWriter;

use crate::chunk::FourCc;
use crate::guid::Guid;
use crate::module::{Instrument, PoolTable, Version};

pub(crate) use instrument::write_instrument;

/// Writer for complete DLS collections
#[derive(Debug, Default)]
pub struct CollectionWriter {
    name: Option<String>,
    version: Option<Version>,
    object_id: Option<Guid>,
    pool: Option<PoolTable>,
    wave_pool: Option<Vec<u8>>,
    instruments: Vec<Instrument>,
}

impl CollectionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collection name (written as INFO/INAM)
    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.name = Some(name.to_string());
        self
    }

    /// Set the 'vers' chunk
    pub fn set_version(&mut self, version: Version) -> &mut Self {
        self.version = Some(version);
        self
    }

    /// Set the 'dlid' chunk
    pub fn set_object_id(&mut self, guid: Guid) -> &mut Self {
        self.object_id = Some(guid);
        self
    }

    /// Set the pool table
    pub fn set_pool(&mut self, pool: PoolTable) -> &mut Self {
        self.pool = Some(pool);
        self
    }

    /// Set the raw contents of the wave pool list (written verbatim)
    pub fn set_wave_pool(&mut self, payload: Vec<u8>) -> &mut Self {
        self.wave_pool = Some(payload);
        self
    }

    /// Add an instrument, returning its 0-based index
    pub fn add_instrument(&mut self, instrument: Instrument) -> usize {
        self.instruments.push(instrument);
        self.instruments.len() - 1
    }

    /// Build and return the complete file as bytes
    pub fn write(&self) -> Vec<u8> {
        let mut w = RiffWriter::new();
        w.begin_riff(FourCc::DLS);

        w.chunk(FourCc::COLH, &(self.instruments.len() as u32).to_le_bytes());

        if let Some(version) = self.version {
            let mut data = Vec::with_capacity(8);
            data.extend_from_slice(&version.ms.to_le_bytes());
            data.extend_from_slice(&version.ls.to_le_bytes());
            w.chunk(FourCc::VERS, &data);
        }

        if let Some(guid) = self.object_id {
            w.chunk(FourCc::DLID, &guid.to_bytes());
        }

        w.begin_list(FourCc::LINS);
        for instrument in &self.instruments {
            write_instrument(&mut w, instrument);
        }
        w.end();

        if let Some(pool) = &self.pool {
            let mut data = Vec::with_capacity(pool.chunk_size() as usize);
            data.extend_from_slice(&pool.header_size.to_le_bytes());
            data.extend_from_slice(&(pool.cues.len() as u32).to_le_bytes());
            for cue in &pool.cues {
                data.extend_from_slice(&cue.offset.to_le_bytes());
            }
            w.chunk(FourCc::PTBL, &data);
        }

        if let Some(payload) = &self.wave_pool {
            w.begin_list(FourCc::WVPL);
            w.raw(payload);
            w.end();
        }

        if let Some(name) = &self.name {
            w.begin_list(FourCc::INFO);
            w.chunk(FourCc::INAM, &zero_terminated(name));
            w.end();
        }

        w.finish()
    }
}

pub(crate) fn zero_terminated(text: &str) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    bytes
}
