//! Object descriptor parsing

use std::io::{Read, Seek};

use crate::chunk::{ChunkHeader, ChunkReader, FourCc};
use crate::error::DlsError;
use crate::guid::Guid;
use crate::module::{DescriptorFields, ObjectDescriptor, Version};

use super::helpers::{describe, expect_size, read_string, read_u32, read_wide_string};

/// Collect the requested descriptor fields from the children of `riff`
///
/// A malformed descriptor chunk is an error. A malformed or truncated chunk
/// elsewhere ends the walk quietly, so the rest of the container does not
/// have to be well formed.
pub(crate) fn parse_object_descriptor<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    riff: &ChunkHeader,
    request: DescriptorFields,
) -> Result<ObjectDescriptor, DlsError> {
    reader.in_scope(riff, |reader, cursor| {
        let mut desc = ObjectDescriptor::default();

        loop {
            let chunk = match reader.next(cursor) {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) if e.is_format_error() => {
                    tracing::debug!(error = %e, "descriptor walk stopped early");
                    break;
                }
                Err(e) => return Err(e),
            };

            match (chunk.id, chunk.list_type) {
                (FourCc::DLID, _) if request.contains(DescriptorFields::GUID_DLID) => {
                    desc.object_id = Some(read_guid(reader, &chunk)?);
                }
                (FourCc::GUID, _) if request.contains(DescriptorFields::OBJECT) => {
                    desc.object_id = Some(read_guid(reader, &chunk)?);
                }
                (FourCc::VERS, _) if request.contains(DescriptorFields::VERSION) => {
                    expect_size(&chunk, 8)?;
                    reader.reset_data(&chunk)?;
                    let ms = read_u32(reader)?;
                    let ls = read_u32(reader)?;
                    desc.version = Some(Version { ms, ls });
                }
                (FourCc::UNAM, _) if request.contains(DescriptorFields::NAME) => {
                    desc.name = Some(read_wide_string(&reader.read_data(&chunk)?));
                }
                (FourCc::CATG, _) if request.contains(DescriptorFields::CATEGORY) => {
                    desc.category = Some(read_wide_string(&reader.read_data(&chunk)?));
                }
                (FourCc::LIST, Some(FourCc::INFO))
                    if request.contains(DescriptorFields::NAME_INFO) =>
                {
                    if let Some(name) = parse_info_name(reader, &chunk)? {
                        desc.name = Some(name);
                    }
                }
                _ => tracing::trace!(chunk = %describe(&chunk), "not a descriptor chunk"),
            }
        }

        Ok(desc)
    })
}

/// Name from a `LIST INFO` chunk's 'INAM' entry
pub(crate) fn parse_info_name<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    info: &ChunkHeader,
) -> Result<Option<String>, DlsError> {
    reader.in_scope(info, |reader, cursor| {
        let mut name = None;
        while let Some(chunk) = reader.next(cursor)? {
            if chunk.id == FourCc::INAM {
                name = Some(read_string(&reader.read_data(&chunk)?));
            }
        }
        Ok(name)
    })
}

pub(crate) fn read_guid<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    chunk: &ChunkHeader,
) -> Result<Guid, DlsError> {
    expect_size(chunk, 16)?;
    reader.reset_data(chunk)?;
    Ok(Guid::read_from(reader)?)
}
