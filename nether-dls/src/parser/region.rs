//! Region, wave sample and articulation parsing

use std::io::{Read, Seek};

use crate::chunk::{ChunkHeader, ChunkReader, FourCc};
use crate::error::DlsError;
use crate::module::{ConnectionBlock, Region, RegionRange, SampleLoop, WaveLink, WaveSample};

use super::helpers::{describe, expect_size, read_i16, read_i32, read_u16, read_u32};

/// Minimum 'wsmp' header: cbSize, unity note, fine tune, attenuation, options, loop count
const WAVE_SAMPLE_HEADER_SIZE: u32 = 20;
const SAMPLE_LOOP_SIZE: u32 = 16;
/// 'art1'/'art2' header: cbSize, connection count
const ARTICULATION_HEADER_SIZE: u32 = 8;
const CONNECTION_BLOCK_SIZE: u32 = 12;

/// Parse every region of a `LIST lrgn`
pub(crate) fn parse_region_list<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    lrgn: &ChunkHeader,
) -> Result<Vec<Region>, DlsError> {
    reader.in_scope(lrgn, |reader, cursor| {
        let mut regions = Vec::new();
        while let Some(chunk) = reader.next(cursor)? {
            if chunk.is_list_of(FourCc::RGN) || chunk.is_list_of(FourCc::RGN2) {
                let region = parse_region(reader, &chunk)?;
                regions.try_reserve(1)?;
                regions.push(region);
            } else {
                tracing::trace!(chunk = %describe(&chunk), "skipping chunk in region list");
            }
        }
        Ok(regions)
    })
}

/// Parse one `LIST rgn ` / `LIST rgn2`
fn parse_region<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    chunk: &ChunkHeader,
) -> Result<Region, DlsError> {
    reader.in_scope(chunk, |reader, cursor| {
        let mut region = Region {
            level2: chunk.list_type == Some(FourCc::RGN2),
            ..Default::default()
        };
        let mut has_header = false;

        while let Some(child) = reader.next(cursor)? {
            match (child.id, child.list_type) {
                (FourCc::RGNH, _) => {
                    read_region_header(reader, &child, &mut region)?;
                    has_header = true;
                }
                (FourCc::WSMP, _) => region.wave_sample = Some(parse_wave_sample(reader, &child)?),
                (FourCc::WLNK, _) => region.wave_link = Some(parse_wave_link(reader, &child)?),
                (FourCc::LIST, Some(FourCc::LART | FourCc::LAR2)) => {
                    parse_articulators(reader, &child, &mut region.articulators)?;
                }
                _ => tracing::trace!(chunk = %describe(&child), "skipping chunk in region"),
            }
        }

        if !has_header {
            return Err(DlsError::MissingRegionHeader(chunk.header_offset()));
        }
        Ok(region)
    })
}

fn read_region_header<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    chunk: &ChunkHeader,
    region: &mut Region,
) -> Result<(), DlsError> {
    // 12 bytes, or 14 with the editing layer
    if chunk.size != 14 {
        expect_size(chunk, 12)?;
    }
    reader.reset_data(chunk)?;

    region.key_range = RegionRange {
        low: read_u16(reader)?,
        high: read_u16(reader)?,
    };
    region.velocity_range = RegionRange {
        low: read_u16(reader)?,
        high: read_u16(reader)?,
    };
    region.options = read_u16(reader)?;
    region.key_group = read_u16(reader)?;
    region.layer = if chunk.size == 14 {
        Some(read_u16(reader)?)
    } else {
        None
    };
    Ok(())
}

/// Parse a 'wsmp' chunk
///
/// The header may be larger than the fields we know; loops start at `cbSize`.
pub(crate) fn parse_wave_sample<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    chunk: &ChunkHeader,
) -> Result<WaveSample, DlsError> {
    let invalid = || DlsError::InvalidWaveSample(chunk.header_offset());

    if chunk.size < WAVE_SAMPLE_HEADER_SIZE {
        return Err(invalid());
    }
    reader.reset_data(chunk)?;

    let header_size = read_u32(reader)?;
    if header_size < WAVE_SAMPLE_HEADER_SIZE || header_size > chunk.size {
        return Err(invalid());
    }

    let unity_note = read_u16(reader)?;
    let fine_tune = read_i16(reader)?;
    let attenuation = read_i32(reader)?;
    let options = read_u32(reader)?;
    let loop_count = read_u32(reader)?;

    let needed = u64::from(header_size) + u64::from(loop_count) * u64::from(SAMPLE_LOOP_SIZE);
    if needed > u64::from(chunk.size) {
        return Err(invalid());
    }

    reader.ensure_in_stream(chunk)?;
    reader.seek_data(chunk, header_size)?;
    let mut loops = Vec::new();
    loops.try_reserve_exact(loop_count as usize)?;
    for _ in 0..loop_count {
        let _loop_size = read_u32(reader)?;
        loops.push(SampleLoop {
            loop_type: read_u32(reader)?,
            start: read_u32(reader)?,
            length: read_u32(reader)?,
        });
    }

    Ok(WaveSample {
        unity_note,
        fine_tune,
        attenuation,
        options,
        loops,
    })
}

fn parse_wave_link<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    chunk: &ChunkHeader,
) -> Result<WaveLink, DlsError> {
    expect_size(chunk, 12)?;
    reader.reset_data(chunk)?;
    Ok(WaveLink {
        options: read_u16(reader)?,
        phase_group: read_u16(reader)?,
        channel: read_u32(reader)?,
        table_index: read_u32(reader)?,
    })
}

/// Append the connection blocks of every 'art1'/'art2' in a `LIST lart` / `LIST lar2`
pub(crate) fn parse_articulators<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    list: &ChunkHeader,
    blocks: &mut Vec<ConnectionBlock>,
) -> Result<(), DlsError> {
    reader.in_scope(list, |reader, cursor| {
        while let Some(chunk) = reader.next(cursor)? {
            if chunk.id == FourCc::ART1 || chunk.id == FourCc::ART2 {
                parse_connection_blocks(reader, &chunk, blocks)?;
            } else {
                tracing::trace!(chunk = %describe(&chunk), "skipping chunk in articulator list");
            }
        }
        Ok(())
    })
}

fn parse_connection_blocks<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    chunk: &ChunkHeader,
    blocks: &mut Vec<ConnectionBlock>,
) -> Result<(), DlsError> {
    let invalid = || DlsError::InvalidArticulation(chunk.header_offset());

    if chunk.size < ARTICULATION_HEADER_SIZE {
        return Err(invalid());
    }
    reader.reset_data(chunk)?;

    let header_size = read_u32(reader)?;
    let count = read_u32(reader)?;
    let expected =
        u64::from(ARTICULATION_HEADER_SIZE) + u64::from(count) * u64::from(CONNECTION_BLOCK_SIZE);
    if header_size != ARTICULATION_HEADER_SIZE || u64::from(chunk.size) != expected {
        return Err(invalid());
    }

    reader.ensure_in_stream(chunk)?;
    blocks.try_reserve_exact(count as usize)?;
    for _ in 0..count {
        blocks.push(ConnectionBlock {
            source: read_u16(reader)?,
            control: read_u16(reader)?,
            destination: read_u16(reader)?,
            transform: read_u16(reader)?,
            scale: read_i32(reader)?,
        });
    }
    Ok(())
}
