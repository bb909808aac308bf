//! Nether-DLS: DLS (Downloadable Sounds) instrument collection loader
//!
//! This crate loads DLS Level 1/2 collections from any seekable stream and
//! exposes their instruments as a read-only catalog keyed by MIDI patch.
//! Wave data is not decoded; the wave pool is skipped and only the pool
//! table of cue offsets is kept.
//!
//! # Key Features
//!
//! - **Lazy chunk walking**: payloads are read only when a decoder needs them
//! - **Fault containment**: a malformed pool table or instrument list is
//!   recorded as a [`Diagnostic`] and the rest of the file still loads
//! - **Shareable**: a loaded [`Collection`] is immutable and `Send + Sync`
//! - **Writer**: [`CollectionWriter`] and [`RiffWriter`] build files for tests and tools
//!
//! # DLS Format Overview
//!
//! ```text
//! RIFF 'DLS '
//! ├── colh                 instrument count
//! ├── vers, dlid           version, GUID
//! ├── LIST 'lins'
//! │   └── LIST 'ins '      one per instrument
//! │       ├── insh         region count, bank, program
//! │       ├── LIST 'lrgn'  regions (rgnh, wsmp, wlnk, lart)
//! │       └── LIST 'INFO'  INAM name
//! ├── ptbl                 pool table (wave cue offsets)
//! ├── LIST 'wvpl'          wave pool
//! └── LIST 'INFO'          collection name
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use nether_dls::Collection;
//!
//! let mut file = std::fs::File::open("gm.dls")?;
//! let collection = Collection::load(&mut file)?;
//!
//! if let Some(piano) = collection.get_instrument(0) {
//!     println!("program 0: {}", piano.name());
//! }
//! ```

mod chunk;
mod error;
mod guid;
mod module;
mod options;
mod parser;
mod writer;

pub use chunk::{CHUNK_HEADER_SIZE, ChunkCursor, ChunkHeader, ChunkReader, FourCc, ScopeId};
pub use error::DlsError;
pub use guid::Guid;
pub use module::{
    Collection, CollectionHeader, ConnectionBlock, DRUM_KIT_FLAG, DescriptorFields, Diagnostic,
    EnumeratedInstrument, Instrument, MidiLocale, ObjectDescriptor, POOL_CUE_SIZE,
    POOL_TABLE_HEADER_SIZE, PoolCue, PoolTable, REGION_OPTION_SELF_NON_EXCLUSIVE, Region,
    RegionRange, SampleLoop, Version, WAVE_LINK_OPTION_PHASE_MASTER, WaveLink, WaveSample,
};
pub use options::{DEFAULT_MAX_CHUNKS, LoadOptions};
pub use parser::parse_descriptor;
pub use writer::{CollectionWriter, RiffWriter};

// =============================================================================
// Constants
// =============================================================================

/// Class identifier reported in every collection descriptor
/// (480FF4B0-28B2-11D1-BEF7-00C04FBF8FEF)
pub const COLLECTION_CLASS_ID: Guid = Guid::from_fields(
    0x480F_F4B0,
    0x28B2,
    0x11D1,
    [0xBE, 0xF7, 0x00, 0xC0, 0x4F, 0xBF, 0x8F, 0xEF],
);
