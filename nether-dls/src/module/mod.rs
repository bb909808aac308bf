//! DLS collection data structures

mod descriptor;
mod instrument;
mod pool;

use std::io::{Read, Seek};
use std::sync::Arc;

pub use descriptor::{DescriptorFields, ObjectDescriptor, Version};
pub use instrument::{
    ConnectionBlock, DRUM_KIT_FLAG, Instrument, MidiLocale, REGION_OPTION_SELF_NON_EXCLUSIVE,
    Region, RegionRange, SampleLoop, WAVE_LINK_OPTION_PHASE_MASTER, WaveLink, WaveSample,
};
pub use pool::{POOL_CUE_SIZE, POOL_TABLE_HEADER_SIZE, PoolCue, PoolTable};

use crate::chunk::FourCc;
use crate::error::DlsError;
use crate::options::LoadOptions;

/// Collection header ('colh'), kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectionHeader {
    pub raw: Vec<u8>,
}

impl CollectionHeader {
    /// Instrument count declared by the file, if the payload holds one
    pub fn instrument_count(&self) -> Option<u32> {
        let bytes: [u8; 4] = self.raw.get(..4)?.try_into().ok()?;
        Some(u32::from_le_bytes(bytes))
    }
}

/// A sub-chunk error that did not abort the load
#[derive(Debug)]
pub struct Diagnostic {
    /// Offset of the failing chunk's header
    pub offset: u64,
    pub id: FourCc,
    pub error: DlsError,
}

/// Result of [`Collection::enum_instrument`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratedInstrument {
    pub patch: u32,
    /// Truncated name, present only when a name capacity was requested
    pub name: Option<String>,
}

/// Loaded DLS collection
///
/// Immutable once loaded. Share it as `Arc<Collection>`; lookups hand out
/// `Arc<Instrument>` clones, so instruments can outlive the collection.
#[derive(Debug, Default)]
pub struct Collection {
    pub(crate) descriptor: ObjectDescriptor,
    pub(crate) header: Option<CollectionHeader>,
    pub(crate) pool: Option<PoolTable>,
    pub(crate) instruments: Vec<Arc<Instrument>>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Collection {
    /// Load a collection with default options
    pub fn load<R: Read + Seek>(stream: &mut R) -> Result<Arc<Self>, DlsError> {
        Self::load_with_options(stream, &LoadOptions::default())
    }

    /// Load a collection
    ///
    /// On a wrong outer tag or form type the stream is left positioned after
    /// the outer chunk's declared payload.
    pub fn load_with_options<R: Read + Seek>(
        stream: &mut R,
        options: &LoadOptions,
    ) -> Result<Arc<Self>, DlsError> {
        crate::parser::load_collection(stream, options).map(Arc::new)
    }

    /// Instrument whose patch equals `patch` (first inserted wins)
    pub fn get_instrument(&self, patch: u32) -> Option<Arc<Instrument>> {
        let found = self.instruments.iter().find(|i| i.patch() == patch);
        match found {
            Some(instrument) => {
                tracing::trace!(patch, name = %instrument.name, "instrument found");
                Some(Arc::clone(instrument))
            }
            None => {
                tracing::trace!(patch, "instrument not found");
                None
            }
        }
    }

    /// Patch (and optionally name) of the instrument at `index`
    ///
    /// With `name_capacity`, the name is cut to `capacity - 1` characters,
    /// leaving room for a terminator. `None` means there are no more entries.
    pub fn enum_instrument(
        &self,
        index: usize,
        name_capacity: Option<usize>,
    ) -> Option<EnumeratedInstrument> {
        let instrument = self.instruments.get(index)?;
        let name = name_capacity.map(|capacity| {
            instrument
                .name
                .chars()
                .take(capacity.saturating_sub(1))
                .collect()
        });
        Some(EnumeratedInstrument {
            patch: instrument.patch(),
            name,
        })
    }

    /// Instruments in file order
    pub fn instruments(&self) -> impl Iterator<Item = &Arc<Instrument>> {
        self.instruments.iter()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn descriptor(&self) -> &ObjectDescriptor {
        &self.descriptor
    }

    pub fn header(&self) -> Option<&CollectionHeader> {
        self.header.as_ref()
    }

    pub fn pool(&self) -> Option<&PoolTable> {
        self.pool.as_ref()
    }

    /// Sub-chunk errors tolerated during the load
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
