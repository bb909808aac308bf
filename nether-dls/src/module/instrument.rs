//! DLS instrument structures

use crate::guid::Guid;

/// Bank flag marking a drum kit
pub const DRUM_KIT_FLAG: u32 = 0x8000_0000;

/// Region option: note is not exclusive within its key group
pub const REGION_OPTION_SELF_NON_EXCLUSIVE: u16 = 0x0001;

/// Wave link option: region is the master of its phase group
pub const WAVE_LINK_OPTION_PHASE_MASTER: u16 = 0x0001;

/// MIDI bank/program location of an instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MidiLocale {
    /// Bank select (MSB in bits 8-14, LSB in bits 0-6) plus the drum flag
    pub bank: u32,
    /// Program change value (0-127)
    pub program: u32,
}

impl MidiLocale {
    /// Patch key: drum flag, 14-bit bank shifted up a byte, 7-bit program
    pub fn patch(&self) -> u32 {
        (self.bank & DRUM_KIT_FLAG) | ((self.bank & 0x7F7F) << 8) | (self.program & 0x7F)
    }

    /// Inverse of [`MidiLocale::patch`]
    pub fn from_patch(patch: u32) -> Self {
        Self {
            bank: (patch & DRUM_KIT_FLAG) | ((patch >> 8) & 0x7F7F),
            program: patch & 0x7F,
        }
    }

    pub fn is_drum_kit(&self) -> bool {
        self.bank & DRUM_KIT_FLAG != 0
    }

    pub fn bank_msb(&self) -> u8 {
        ((self.bank >> 8) & 0x7F) as u8
    }

    pub fn bank_lsb(&self) -> u8 {
        (self.bank & 0x7F) as u8
    }
}

/// Inclusive key or velocity range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionRange {
    pub low: u16,
    pub high: u16,
}

impl RegionRange {
    pub const FULL: Self = Self { low: 0, high: 127 };

    pub fn contains(&self, value: u16) -> bool {
        (self.low..=self.high).contains(&value)
    }
}

impl Default for RegionRange {
    fn default() -> Self {
        Self::FULL
    }
}

/// One sample loop from a 'wsmp' chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleLoop {
    /// 0 = forward loop, 1 = loop and release
    pub loop_type: u32,
    /// Loop start in samples
    pub start: u32,
    /// Loop length in samples
    pub length: u32,
}

/// Playback parameters for a region's wave ('wsmp')
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WaveSample {
    /// MIDI note that plays the wave at its recorded pitch
    pub unity_note: u16,
    /// Fine tune in relative pitch units
    pub fine_tune: i16,
    /// Attenuation in 32-bit relative gain units
    pub attenuation: i32,
    /// Option flags (no truncation / no compression)
    pub options: u32,
    pub loops: Vec<SampleLoop>,
}

/// Link from a region to a wave in the pool table ('wlnk')
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaveLink {
    pub options: u16,
    pub phase_group: u16,
    /// Channel placement bit mask
    pub channel: u32,
    /// Index into the pool table cues
    pub table_index: u32,
}

/// One articulation connection ('art1' / 'art2' entry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionBlock {
    pub source: u16,
    pub control: u16,
    pub destination: u16,
    pub transform: u16,
    pub scale: i32,
}

/// A key/velocity region of an instrument
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Region {
    pub key_range: RegionRange,
    pub velocity_range: RegionRange,
    pub options: u16,
    /// Exclusive key group (0 = none)
    pub key_group: u16,
    /// Editing layer, only present in 14-byte 'rgnh' chunks
    pub layer: Option<u16>,
    /// Stored as 'rgn2' rather than 'rgn '
    pub level2: bool,
    pub wave_sample: Option<WaveSample>,
    pub wave_link: Option<WaveLink>,
    pub articulators: Vec<ConnectionBlock>,
}

impl Region {
    /// True if a note at `key` and `velocity` falls in this region
    pub fn matches(&self, key: u16, velocity: u16) -> bool {
        self.key_range.contains(key) && self.velocity_range.contains(velocity)
    }
}

/// Decoded DLS instrument
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Instrument {
    /// Instrument name from INFO/INAM (empty if absent)
    pub name: String,
    pub locale: MidiLocale,
    /// Region count declared in 'insh'
    pub declared_regions: u32,
    /// DLS identifier, if the instrument carries a 'dlid'
    pub dlid: Option<Guid>,
    pub regions: Vec<Region>,
    /// Instrument-level articulation
    pub articulators: Vec<ConnectionBlock>,
}

impl Instrument {
    /// Patch key used for catalog lookup
    pub fn patch(&self) -> u32 {
        self.locale.patch()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First region that plays `key` at `velocity`
    pub fn region_for(&self, key: u16, velocity: u16) -> Option<&Region> {
        self.regions.iter().find(|r| r.matches(key, velocity))
    }
}
