//! Instrument list and instrument parsing

use std::io::{Read, Seek};
use std::sync::Arc;

use crate::chunk::{ChunkHeader, ChunkReader, FourCc};
use crate::error::DlsError;
use crate::module::{Instrument, MidiLocale};

use super::descriptor::{parse_info_name, read_guid};
use super::helpers::{describe, expect_size, read_u32};
use super::region::{parse_articulators, parse_region_list};

/// Decode every `LIST ins ` of a `LIST lins`, appending to `instruments`
///
/// Stops at the first instrument that fails to decode. Instruments decoded
/// before it stay in `instruments`.
pub(crate) fn parse_instrument_list<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    lins: &ChunkHeader,
    instruments: &mut Vec<Arc<Instrument>>,
) -> Result<(), DlsError> {
    reader.in_scope(lins, |reader, cursor| {
        while let Some(chunk) = reader.next(cursor)? {
            if !chunk.is_list_of(FourCc::INS) {
                tracing::debug!(chunk = %describe(&chunk), "unexpected chunk in instrument list (skipping)");
                continue;
            }

            let instrument = decode_instrument(reader, &chunk).inspect_err(|e| {
                tracing::debug!(offset = chunk.header_offset(), error = %e, "instrument decode failed");
            })?;

            tracing::debug!(
                index = instruments.len(),
                patch = format_args!("0x{:08X}", instrument.patch()),
                name = %instrument.name,
                regions = instrument.regions.len(),
                "instrument"
            );

            instruments.try_reserve(1)?;
            instruments.push(Arc::new(instrument));
        }
        Ok(())
    })
}

/// Decode one `LIST ins `
pub(crate) fn decode_instrument<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    chunk: &ChunkHeader,
) -> Result<Instrument, DlsError> {
    reader.in_scope(chunk, |reader, cursor| {
        let mut instrument = Instrument::default();
        let mut has_header = false;

        while let Some(child) = reader.next(cursor)? {
            match (child.id, child.list_type) {
                (FourCc::INSH, _) => {
                    expect_size(&child, 12)?;
                    reader.reset_data(&child)?;
                    instrument.declared_regions = read_u32(reader)?;
                    instrument.locale = MidiLocale {
                        bank: read_u32(reader)?,
                        program: read_u32(reader)?,
                    };
                    has_header = true;
                }
                (FourCc::DLID, _) => instrument.dlid = Some(read_guid(reader, &child)?),
                (FourCc::LIST, Some(FourCc::LRGN)) => {
                    instrument.regions = parse_region_list(reader, &child)?;
                }
                (FourCc::LIST, Some(FourCc::LART | FourCc::LAR2)) => {
                    parse_articulators(reader, &child, &mut instrument.articulators)?;
                }
                (FourCc::LIST, Some(FourCc::INFO)) => {
                    if let Some(name) = parse_info_name(reader, &child)? {
                        instrument.name = name;
                    }
                }
                _ => tracing::trace!(chunk = %describe(&child), "skipping chunk in instrument"),
            }
        }

        if !has_header {
            return Err(DlsError::MissingInstrumentHeader(chunk.header_offset()));
        }

        if instrument.declared_regions as usize != instrument.regions.len() {
            tracing::warn!(
                name = %instrument.name,
                declared = instrument.declared_regions,
                found = instrument.regions.len(),
                "instrument region count mismatch"
            );
        }

        Ok(instrument)
    })
}
