//! Collection loader
//!
//! Loading runs as a small state machine over the outer RIFF chunk:
//!
//! ```text
//! ExpectOuterRiff -> ExpectDlsType -> ReadDescriptor -> WalkTopChunks -> Done
//! ```
//!
//! Any state may fail, which ends the load with an error. The descriptor pass
//! reads ahead through the whole container, so the stream is rewound to the
//! start of the RIFF data before the top-level walk.

use std::io::{Read, Seek};

use crate::COLLECTION_CLASS_ID;
use crate::chunk::{ChunkCursor, ChunkHeader, ChunkReader, FourCc};
use crate::error::DlsError;
use crate::module::{Collection, CollectionHeader, DescriptorFields, Diagnostic};
use crate::options::LoadOptions;

use super::descriptor::parse_object_descriptor;
use super::helpers::{describe, read_outer_header};
use super::instrument::parse_instrument_list;
use super::pool::parse_pool_table;

#[derive(Debug, Clone, Copy)]
enum LoadState {
    ExpectOuterRiff,
    ExpectDlsType(ChunkHeader),
    ReadDescriptor(ChunkHeader),
    WalkTopChunks(ChunkHeader),
    Done,
}

/// Top-level chunks the loader cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TopChunk {
    CollectionHeader,
    PoolTable,
    WavePool,
    InstrumentList,
    Unrecognized,
}

impl TopChunk {
    fn classify(chunk: &ChunkHeader) -> Self {
        match (chunk.id, chunk.list_type) {
            (FourCc::COLH, _) => Self::CollectionHeader,
            (FourCc::PTBL, _) => Self::PoolTable,
            (FourCc::LIST, Some(FourCc::WVPL)) => Self::WavePool,
            (FourCc::LIST, Some(FourCc::LINS)) => Self::InstrumentList,
            _ => Self::Unrecognized,
        }
    }
}

struct Loader<'a, R> {
    reader: ChunkReader<&'a mut R>,
    options: &'a LoadOptions,
    collection: Collection,
}

/// Load a collection from `stream`, positioned at the outer RIFF chunk
pub(crate) fn load_collection<R: Read + Seek>(
    stream: &mut R,
    options: &LoadOptions,
) -> Result<Collection, DlsError> {
    let mut loader = Loader {
        reader: ChunkReader::new(stream),
        options,
        collection: Collection::default(),
    };

    let mut state = LoadState::ExpectOuterRiff;
    loop {
        tracing::trace!(?state, "load state");
        state = match state {
            LoadState::ExpectOuterRiff => loader.expect_outer_riff()?,
            LoadState::ExpectDlsType(riff) => loader.expect_dls_type(riff)?,
            LoadState::ReadDescriptor(riff) => loader.read_descriptor(riff)?,
            LoadState::WalkTopChunks(riff) => loader.walk_top_chunks(riff)?,
            LoadState::Done => break,
        };
    }

    loader.log_summary();
    Ok(loader.collection)
}

impl<R: Read + Seek> Loader<'_, R> {
    fn expect_outer_riff(&mut self) -> Result<LoadState, DlsError> {
        let chunk = read_outer_header(&mut self.reader)?;
        if chunk.id != FourCc::RIFF {
            tracing::debug!(chunk = %describe(&chunk), size = chunk.size, "not a RIFF chunk, skipping");
            self.reader.skip_declared(&chunk)?;
            return Err(DlsError::NotRiff(chunk.id));
        }
        Ok(LoadState::ExpectDlsType(chunk))
    }

    fn expect_dls_type(&mut self, riff: ChunkHeader) -> Result<LoadState, DlsError> {
        let form = riff.list_type.unwrap_or_default();
        if form != FourCc::DLS {
            tracing::debug!(form = %form, size = riff.size, "not a DLS collection, skipping");
            self.reader.skip_declared(&riff)?;
            return Err(DlsError::NotDlsCollection(form));
        }
        Ok(LoadState::ReadDescriptor(riff))
    }

    fn read_descriptor(&mut self, riff: ChunkHeader) -> Result<LoadState, DlsError> {
        let request = DescriptorFields::NAME_INFO
            | DescriptorFields::VERSION
            | DescriptorFields::OBJECT
            | DescriptorFields::GUID_DLID;

        match parse_object_descriptor(&mut self.reader, &riff, request) {
            Ok(mut descriptor) => {
                descriptor.class_id = Some(COLLECTION_CLASS_ID);
                tracing::debug!(name = ?descriptor.name, "collection descriptor");
                self.collection.descriptor = descriptor;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read collection descriptor");
                self.reader.skip(&riff)?;
                return Err(e);
            }
        }

        self.reader.reset_data(&riff)?;
        Ok(LoadState::WalkTopChunks(riff))
    }

    fn walk_top_chunks(&mut self, riff: ChunkHeader) -> Result<LoadState, DlsError> {
        let mut cursor = self.reader.enter(&riff);
        let result = self.walk_children(&riff, &mut cursor);
        self.reader.leave(cursor);
        result?;

        self.reader.skip(&riff)?;
        Ok(LoadState::Done)
    }

    fn walk_children(
        &mut self,
        riff: &ChunkHeader,
        cursor: &mut ChunkCursor,
    ) -> Result<(), DlsError> {
        let declared = u64::from(riff.data_size());
        let mut consumed = 0u64;
        let mut visited = 0u32;
        let mut position = riff.data_offset();

        while consumed < declared {
            if visited >= self.options.max_chunks {
                return Err(DlsError::TooManyChunks(self.options.max_chunks));
            }
            visited += 1;

            let chunk = match self.reader.next(cursor) {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    self.contain(position, riff.id, e)?;
                    break;
                }
            };

            if chunk.header_offset() < position {
                return Err(DlsError::NoProgress(chunk.header_offset()));
            }
            position = chunk.end();
            consumed += chunk.total_size();

            let result = match TopChunk::classify(&chunk) {
                TopChunk::CollectionHeader => self.read_collection_header(&chunk),
                TopChunk::PoolTable => self.read_pool_table(&chunk),
                TopChunk::WavePool => {
                    tracing::debug!(size = chunk.size, "wave pool (skipping)");
                    Ok(())
                }
                TopChunk::InstrumentList => parse_instrument_list(
                    &mut self.reader,
                    &chunk,
                    &mut self.collection.instruments,
                ),
                TopChunk::Unrecognized => {
                    tracing::trace!(chunk = %describe(&chunk), "unknown top-level chunk (skipping)");
                    Ok(())
                }
            };

            if let Err(e) = result {
                self.contain(chunk.header_offset(), chunk.id, e)?;
            }
        }

        Ok(())
    }

    fn read_collection_header(&mut self, chunk: &ChunkHeader) -> Result<(), DlsError> {
        let raw = self.reader.read_data(chunk)?;
        let header = CollectionHeader { raw };
        tracing::debug!(instruments = ?header.instrument_count(), "collection header");
        self.collection.header = Some(header);
        Ok(())
    }

    fn read_pool_table(&mut self, chunk: &ChunkHeader) -> Result<(), DlsError> {
        let pool = parse_pool_table(&mut self.reader, chunk)?;
        if self.collection.pool.is_some() {
            tracing::debug!("replacing earlier pool table");
        }
        self.collection.pool = Some(pool);
        Ok(())
    }

    /// Record a malformed-input error and keep going, unless it must abort the load
    fn contain(&mut self, offset: u64, id: FourCc, error: DlsError) -> Result<(), DlsError> {
        if !error.is_format_error() || self.options.strict {
            return Err(error);
        }
        tracing::warn!(offset, chunk = %id, error = %error, "ignoring malformed chunk");
        self.collection.diagnostics.push(Diagnostic { offset, id, error });
        Ok(())
    }

    fn log_summary(&self) {
        let collection = &self.collection;
        tracing::debug!(
            name = ?collection.descriptor.name,
            version = ?collection.descriptor.version.map(|v| v.to_string()),
            declared = ?collection.header.as_ref().and_then(|h| h.instrument_count()),
            instruments = collection.instruments.len(),
            cues = collection.pool.as_ref().map_or(0, |p| p.cue_count()),
            diagnostics = collection.diagnostics.len(),
            "collection loaded"
        );
        for (index, instrument) in collection.instruments.iter().enumerate() {
            tracing::trace!(
                index,
                patch = format_args!("0x{:08X}", instrument.patch()),
                name = %instrument.name,
                "loaded instrument"
            );
        }
    }
}
