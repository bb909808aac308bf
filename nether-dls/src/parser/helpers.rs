//! Helper functions for reading chunk payloads

use std::io::{Read, Seek};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::chunk::{CHUNK_HEADER_SIZE, ChunkHeader, ChunkReader};
use crate::error::DlsError;

pub(crate) fn read_u16<R: Read>(reader: &mut R) -> Result<u16, DlsError> {
    Ok(reader.read_u16::<LittleEndian>()?)
}

pub(crate) fn read_i16<R: Read>(reader: &mut R) -> Result<i16, DlsError> {
    Ok(reader.read_i16::<LittleEndian>()?)
}

pub(crate) fn read_u32<R: Read>(reader: &mut R) -> Result<u32, DlsError> {
    Ok(reader.read_u32::<LittleEndian>()?)
}

pub(crate) fn read_i32<R: Read>(reader: &mut R) -> Result<i32, DlsError> {
    Ok(reader.read_i32::<LittleEndian>()?)
}

/// Read the outermost chunk header
///
/// A RIFF or LIST header too small to hold its list type is skipped past its
/// declared payload before the error is returned, like any other rejected
/// outer chunk.
pub(crate) fn read_outer_header<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
) -> Result<ChunkHeader, DlsError> {
    let start = reader.position()?;
    match reader.get() {
        Err(DlsError::InvalidChunkSize {
            id,
            expected,
            actual,
        }) => {
            reader.seek_to(start + CHUNK_HEADER_SIZE + u64::from(actual))?;
            Err(DlsError::InvalidChunkSize {
                id,
                expected,
                actual,
            })
        }
        result => result,
    }
}

/// Fail unless the chunk's payload is exactly `expected` bytes
pub(crate) fn expect_size(chunk: &ChunkHeader, expected: u32) -> Result<(), DlsError> {
    if chunk.size != expected {
        return Err(DlsError::InvalidChunkSize {
            id: chunk.id,
            expected,
            actual: chunk.size,
        });
    }
    Ok(())
}

/// Decode a null-terminated 8-bit string (INFO entries)
pub(crate) fn read_string(bytes: &[u8]) -> String {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..len]).trim_end().to_string()
}

/// Decode a null-terminated UTF-16LE string ('UNAM', 'catg')
pub(crate) fn read_wide_string(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

/// Short tag pair for log lines: "LIST ins " or "colh"
pub(crate) fn describe(chunk: &ChunkHeader) -> String {
    match chunk.list_type {
        Some(list_type) => format!("{} {}", chunk.id, list_type),
        None => chunk.id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_string() {
        assert_eq!(read_string(b"Piano\0junk"), "Piano");
        assert_eq!(read_string(b"No null"), "No null");
        assert_eq!(read_string(b"Trailing  \0"), "Trailing");
        assert_eq!(read_string(b""), "");
    }

    #[test]
    fn test_read_wide_string() {
        let bytes: Vec<u8> = "Bass\0x"
            .encode_utf16()
            .flat_map(|u| u.to_le_bytes())
            .collect();
        assert_eq!(read_wide_string(&bytes), "Bass");
        // Odd trailing byte is ignored
        assert_eq!(read_wide_string(&[b'A', 0, b'B']), "A");
    }
}
