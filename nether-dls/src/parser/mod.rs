//! DLS collection parser

use std::io::{Read, Seek};

use crate::COLLECTION_CLASS_ID;
use crate::chunk::{ChunkReader, FourCc};
use crate::error::DlsError;
use crate::module::{DescriptorFields, ObjectDescriptor};

mod collection;
mod descriptor;
mod helpers;
mod instrument;
mod pool;
mod region;

pub(crate) use collection::load_collection;

/// Read a collection's descriptor without loading its instruments
///
/// Fills in the name (INFO/INAM), version and class id. A stream that is
/// not a DLS collection is skipped past its outer chunk and reported as
/// [`DlsError::NotRiff`] or [`DlsError::NotDlsCollection`].
pub fn parse_descriptor<R: Read + Seek>(stream: &mut R) -> Result<ObjectDescriptor, DlsError> {
    let mut reader = ChunkReader::new(stream);

    let riff = helpers::read_outer_header(&mut reader)?;
    if riff.id != FourCc::RIFF {
        reader.skip_declared(&riff)?;
        return Err(DlsError::NotRiff(riff.id));
    }
    let form = riff.list_type.unwrap_or_default();
    if form != FourCc::DLS {
        reader.skip_declared(&riff)?;
        return Err(DlsError::NotDlsCollection(form));
    }

    let mut descriptor = descriptor::parse_object_descriptor(
        &mut reader,
        &riff,
        DescriptorFields::NAME_INFO | DescriptorFields::VERSION,
    )?;
    descriptor.class_id = Some(COLLECTION_CLASS_ID);
    Ok(descriptor)
}
