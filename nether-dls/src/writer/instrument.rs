//! Instrument serialization

use super::{RiffWriter, zero_terminated};
use crate::chunk::FourCc;
use crate::module::{ConnectionBlock, Instrument, Region, WaveLink, WaveSample};

/// Write one `LIST ins ` chunk
pub(crate) fn write_instrument(w: &mut RiffWriter, instrument: &Instrument) {
    w.begin_list(FourCc::INS);

    let mut insh = Vec::with_capacity(12);
    insh.extend_from_slice(&(instrument.regions.len() as u32).to_le_bytes());
    insh.extend_from_slice(&instrument.locale.bank.to_le_bytes());
    insh.extend_from_slice(&instrument.locale.program.to_le_bytes());
    w.chunk(FourCc::INSH, &insh);

    if let Some(dlid) = instrument.dlid {
        w.chunk(FourCc::DLID, &dlid.to_bytes());
    }

    if !instrument.regions.is_empty() {
        w.begin_list(FourCc::LRGN);
        for region in &instrument.regions {
            write_region(w, region);
        }
        w.end();
    }

    if !instrument.articulators.is_empty() {
        write_articulators(w, &instrument.articulators);
    }

    if !instrument.name.is_empty() {
        w.begin_list(FourCc::INFO);
        w.chunk(FourCc::INAM, &zero_terminated(&instrument.name));
        w.end();
    }

    w.end();
}

fn write_region(w: &mut RiffWriter, region: &Region) {
    w.begin_list(if region.level2 {
        FourCc::RGN2
    } else {
        FourCc::RGN
    });

    let mut rgnh = Vec::with_capacity(14);
    rgnh.extend_from_slice(&region.key_range.low.to_le_bytes());
    rgnh.extend_from_slice(&region.key_range.high.to_le_bytes());
    rgnh.extend_from_slice(&region.velocity_range.low.to_le_bytes());
    rgnh.extend_from_slice(&region.velocity_range.high.to_le_bytes());
    rgnh.extend_from_slice(&region.options.to_le_bytes());
    rgnh.extend_from_slice(&region.key_group.to_le_bytes());
    if let Some(layer) = region.layer {
        rgnh.extend_from_slice(&layer.to_le_bytes());
    }
    w.chunk(FourCc::RGNH, &rgnh);

    if let Some(wave_sample) = &region.wave_sample {
        w.chunk(FourCc::WSMP, &wave_sample_bytes(wave_sample));
    }

    if let Some(wave_link) = &region.wave_link {
        w.chunk(FourCc::WLNK, &wave_link_bytes(wave_link));
    }

    if !region.articulators.is_empty() {
        write_articulators(w, &region.articulators);
    }

    w.end();
}

fn wave_sample_bytes(wave_sample: &WaveSample) -> Vec<u8> {
    let mut data = Vec::with_capacity(20 + wave_sample.loops.len() * 16);
    data.extend_from_slice(&20u32.to_le_bytes());
    data.extend_from_slice(&wave_sample.unity_note.to_le_bytes());
    data.extend_from_slice(&wave_sample.fine_tune.to_le_bytes());
    data.extend_from_slice(&wave_sample.attenuation.to_le_bytes());
    data.extend_from_slice(&wave_sample.options.to_le_bytes());
    data.extend_from_slice(&(wave_sample.loops.len() as u32).to_le_bytes());
    for sample_loop in &wave_sample.loops {
        data.extend_from_slice(&16u32.to_le_bytes());
        data.extend_from_slice(&sample_loop.loop_type.to_le_bytes());
        data.extend_from_slice(&sample_loop.start.to_le_bytes());
        data.extend_from_slice(&sample_loop.length.to_le_bytes());
    }
    data
}

fn wave_link_bytes(wave_link: &WaveLink) -> Vec<u8> {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&wave_link.options.to_le_bytes());
    data.extend_from_slice(&wave_link.phase_group.to_le_bytes());
    data.extend_from_slice(&wave_link.channel.to_le_bytes());
    data.extend_from_slice(&wave_link.table_index.to_le_bytes());
    data
}

fn write_articulators(w: &mut RiffWriter, blocks: &[ConnectionBlock]) {
    let mut data = Vec::with_capacity(8 + blocks.len() * 12);
    data.extend_from_slice(&8u32.to_le_bytes());
    data.extend_from_slice(&(blocks.len() as u32).to_le_bytes());
    for block in blocks {
        data.extend_from_slice(&block.source.to_le_bytes());
        data.extend_from_slice(&block.control.to_le_bytes());
        data.extend_from_slice(&block.destination.to_le_bytes());
        data.extend_from_slice(&block.transform.to_le_bytes());
        data.extend_from_slice(&block.scale.to_le_bytes());
    }

    w.begin_list(FourCc::LART);
    w.chunk(FourCc::ART1, &data);
    w.end();
}
