//! RIFF chunk reading over a seekable stream
//!
//! Chunks are visited lazily: a [`ChunkReader`] yields one [`ChunkHeader`] at a
//! time and never reads a payload unless asked to. Nesting is tracked with a
//! stack of scopes owned by the reader; a header refers to its enclosing scope
//! by [`ScopeId`] only, so a header can be copied around freely.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ id (4) │ size (4) │ [type (4)] │  type only for RIFF / LIST
//! ├──────────────────────────────┤
//! │ payload (size bytes)         │  size includes the list type
//! │ [pad byte if size is odd]    │
//! └──────────────────────────────┘
//! ```

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::DlsError;

/// Size of a chunk header (id + size)
pub const CHUNK_HEADER_SIZE: u64 = 8;

/// Four-character chunk tag
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    pub const RIFF: Self = Self(*b"RIFF");
    pub const LIST: Self = Self(*b"LIST");

    /// DLS form type
    pub const DLS: Self = Self(*b"DLS ");
    /// Collection header
    pub const COLH: Self = Self(*b"colh");
    /// Pool table
    pub const PTBL: Self = Self(*b"ptbl");
    /// Wave pool list
    pub const WVPL: Self = Self(*b"wvpl");
    /// Instrument list
    pub const LINS: Self = Self(*b"lins");
    /// Instrument
    pub const INS: Self = Self(*b"ins ");
    /// Instrument header
    pub const INSH: Self = Self(*b"insh");
    /// DLS identifier (GUID)
    pub const DLID: Self = Self(*b"dlid");
    /// Region list
    pub const LRGN: Self = Self(*b"lrgn");
    pub const RGN: Self = Self(*b"rgn ");
    pub const RGN2: Self = Self(*b"rgn2");
    pub const RGNH: Self = Self(*b"rgnh");
    /// Wave sample parameters
    pub const WSMP: Self = Self(*b"wsmp");
    /// Wave link
    pub const WLNK: Self = Self(*b"wlnk");
    /// Articulator lists (level 1 / level 2)
    pub const LART: Self = Self(*b"lart");
    pub const LAR2: Self = Self(*b"lar2");
    pub const ART1: Self = Self(*b"art1");
    pub const ART2: Self = Self(*b"art2");
    /// Info list and its name entry
    pub const INFO: Self = Self(*b"INFO");
    pub const INAM: Self = Self(*b"INAM");
    /// Object descriptor chunks
    pub const VERS: Self = Self(*b"vers");
    pub const GUID: Self = Self(*b"guid");
    pub const UNAM: Self = Self(*b"UNAM");
    pub const CATG: Self = Self(*b"catg");

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// True for the tags that carry a list type after the size
    pub fn is_container(&self) -> bool {
        *self == Self::RIFF || *self == Self::LIST
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if (0x20..0x7F).contains(&b) {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc(\"{}\")", self)
    }
}

/// Handle to an open scope on a [`ChunkReader`]'s scope stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// One chunk header, as read from the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Chunk tag
    pub id: FourCc,
    /// List type, present only for RIFF and LIST chunks
    pub list_type: Option<FourCc>,
    /// Declared payload size (includes the list type for lists)
    pub size: u32,
    /// Absolute offset of the first payload byte
    pub offset: u64,
    /// Enclosing scope, `None` for a top-level chunk
    pub parent: Option<ScopeId>,
}

impl ChunkHeader {
    /// Offset of the chunk's id
    pub fn header_offset(&self) -> u64 {
        self.offset - CHUNK_HEADER_SIZE
    }

    /// Offset of the data following the list type (or the payload start)
    pub fn data_offset(&self) -> u64 {
        if self.list_type.is_some() {
            self.offset + 4
        } else {
            self.offset
        }
    }

    /// Payload size excluding the list type
    pub fn data_size(&self) -> u32 {
        if self.list_type.is_some() {
            self.size.saturating_sub(4)
        } else {
            self.size
        }
    }

    /// Offset one past the payload, padding included
    pub fn end(&self) -> u64 {
        self.offset + padded(self.size)
    }

    /// Bytes this chunk occupies in its parent, header and padding included
    pub fn total_size(&self) -> u64 {
        CHUNK_HEADER_SIZE + padded(self.size)
    }

    /// True if this is `LIST` of the given type
    pub fn is_list_of(&self, list_type: FourCc) -> bool {
        self.id == FourCc::LIST && self.list_type == Some(list_type)
    }
}

fn padded(size: u32) -> u64 {
    (u64::from(size) + 1) & !1
}

#[derive(Debug, Clone, Copy)]
struct Scope {
    start: u64,
    end: u64,
}

/// Iteration state over the children of one scope
#[derive(Debug)]
pub struct ChunkCursor {
    scope: ScopeId,
    current: Option<ChunkHeader>,
}

impl ChunkCursor {
    /// Scope the cursor iterates
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Chunk most recently returned by [`ChunkReader::next`]
    pub fn current(&self) -> Option<&ChunkHeader> {
        self.current.as_ref()
    }
}

/// Lazy chunk reader over a seekable stream
#[derive(Debug)]
pub struct ChunkReader<R> {
    stream: R,
    scopes: Vec<Scope>,
    stream_len: Option<u64>,
}

impl<R: Read + Seek> ChunkReader<R> {
    pub fn new(stream: R) -> Self {
        Self {
            stream,
            scopes: Vec::new(),
            stream_len: None,
        }
    }

    /// Give the stream back
    pub fn into_inner(self) -> R {
        self.stream
    }

    /// Current stream position
    pub fn position(&mut self) -> Result<u64, DlsError> {
        Ok(self.stream.stream_position()?)
    }

    /// Read one chunk header at the current position, with no parent scope
    pub fn get(&mut self) -> Result<ChunkHeader, DlsError> {
        self.read_header(None)
    }

    /// Open a scope over the children of `chunk`
    pub fn enter(&mut self, chunk: &ChunkHeader) -> ChunkCursor {
        let scope = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            start: chunk.data_offset(),
            end: chunk.offset + u64::from(chunk.size),
        });
        ChunkCursor {
            scope,
            current: None,
        }
    }

    /// Close a scope (and any scope opened after it)
    pub fn leave(&mut self, cursor: ChunkCursor) {
        self.scopes.truncate(cursor.scope.0);
    }

    /// Run `f` over the children of `chunk`, closing the scope afterwards
    pub fn in_scope<T>(
        &mut self,
        chunk: &ChunkHeader,
        f: impl FnOnce(&mut Self, &mut ChunkCursor) -> Result<T, DlsError>,
    ) -> Result<T, DlsError> {
        let mut cursor = self.enter(chunk);
        let result = f(self, &mut cursor);
        self.leave(cursor);
        result
    }

    /// Advance `cursor` to the next sibling
    ///
    /// The previous chunk is skipped whether or not its payload was read.
    /// Returns `Ok(None)` once the scope is exhausted.
    pub fn next(&mut self, cursor: &mut ChunkCursor) -> Result<Option<ChunkHeader>, DlsError> {
        let Some(&scope) = self.scopes.get(cursor.scope.0) else {
            return Ok(None);
        };

        let position = match &cursor.current {
            Some(current) => current.end(),
            None => scope.start,
        };
        if position >= scope.end {
            return Ok(None);
        }

        self.stream.seek(SeekFrom::Start(position))?;
        let chunk = self.read_header(Some(cursor.scope))?;

        let chunk_end = chunk.offset + u64::from(chunk.size);
        if chunk_end > scope.end {
            return Err(DlsError::ChunkOverrun {
                id: chunk.id,
                offset: chunk.header_offset(),
                end: chunk_end,
                parent_end: scope.end,
            });
        }

        cursor.current = Some(chunk);
        Ok(Some(chunk))
    }

    /// Position the stream at an absolute offset
    pub fn seek_to(&mut self, offset: u64) -> Result<(), DlsError> {
        self.stream.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Position the stream past the chunk's declared payload, without padding
    pub fn skip_declared(&mut self, chunk: &ChunkHeader) -> Result<(), DlsError> {
        self.seek_to(chunk.offset + u64::from(chunk.size))
    }

    /// Fail with [`DlsError::UnexpectedEof`] unless the stream holds the
    /// chunk's whole declared payload
    ///
    /// Call before any allocation sized from the chunk's header.
    pub fn ensure_in_stream(&mut self, chunk: &ChunkHeader) -> Result<(), DlsError> {
        let stream_len = match self.stream_len {
            Some(len) => len,
            None => {
                let position = self.stream.stream_position()?;
                let len = self.stream.seek(SeekFrom::End(0))?;
                self.stream.seek(SeekFrom::Start(position))?;
                self.stream_len = Some(len);
                len
            }
        };
        if chunk.offset + u64::from(chunk.size) > stream_len {
            tracing::debug!(
                id = %chunk.id,
                size = chunk.size,
                stream_len,
                "chunk extends past the end of the stream"
            );
            return Err(DlsError::UnexpectedEof);
        }
        Ok(())
    }

    /// Position the stream past the chunk's payload
    pub fn skip(&mut self, chunk: &ChunkHeader) -> Result<(), DlsError> {
        self.stream.seek(SeekFrom::Start(chunk.end()))?;
        Ok(())
    }

    /// Position the stream at the start of the chunk's data
    pub fn reset_data(&mut self, chunk: &ChunkHeader) -> Result<(), DlsError> {
        self.stream.seek(SeekFrom::Start(chunk.data_offset()))?;
        Ok(())
    }

    /// Position the stream `delta` bytes into the chunk's data
    pub fn seek_data(&mut self, chunk: &ChunkHeader, delta: u32) -> Result<(), DlsError> {
        self.stream
            .seek(SeekFrom::Start(chunk.data_offset() + u64::from(delta)))?;
        Ok(())
    }

    /// Read the chunk's whole data (list type excluded)
    pub fn read_data(&mut self, chunk: &ChunkHeader) -> Result<Vec<u8>, DlsError> {
        self.ensure_in_stream(chunk)?;
        self.reset_data(chunk)?;
        let len = chunk.data_size() as usize;
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0);
        self.stream.read_exact(&mut data)?;
        Ok(data)
    }

    fn read_header(&mut self, parent: Option<ScopeId>) -> Result<ChunkHeader, DlsError> {
        let mut id = [0u8; 4];
        self.stream.read_exact(&mut id)?;
        let id = FourCc(id);
        let size = self.stream.read_u32::<LittleEndian>()?;
        let offset = self.stream.stream_position()?;

        let list_type = if id.is_container() {
            if size < 4 {
                return Err(DlsError::InvalidChunkSize {
                    id,
                    expected: 4,
                    actual: size,
                });
            }
            let mut list_type = [0u8; 4];
            self.stream.read_exact(&mut list_type)?;
            Some(FourCc(list_type))
        } else {
            None
        };

        tracing::trace!(
            offset = offset - CHUNK_HEADER_SIZE,
            id = %id,
            size,
            list_type = ?list_type,
            "chunk"
        );

        Ok(ChunkHeader {
            id,
            list_type,
            size,
            offset,
            parent,
        })
    }
}

impl<R: Read> Read for ChunkReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::RiffWriter;
    use std::io::Cursor;

    fn nested() -> Vec<u8> {
        let mut w = RiffWriter::new();
        w.begin_riff(FourCc::DLS);
        w.chunk(FourCc::COLH, &1u32.to_le_bytes());
        w.begin_list(FourCc::LINS);
        w.chunk(FourCc(*b"odd!"), &[1, 2, 3]);
        w.chunk(FourCc(*b"even"), &[4, 5]);
        w.end();
        w.end();
        w.finish()
    }

    #[test]
    fn test_fourcc_display_escapes() {
        assert_eq!(FourCc::DLS.to_string(), "DLS ");
        assert_eq!(FourCc([b'a', 0, 0xFF, b'z']).to_string(), "a\\x00\\xffz");
    }

    #[test]
    fn test_walk_nested_scopes() {
        let data = nested();
        let mut reader = ChunkReader::new(Cursor::new(data.as_slice()));

        let riff = reader.get().unwrap();
        assert_eq!(riff.id, FourCc::RIFF);
        assert_eq!(riff.list_type, Some(FourCc::DLS));
        assert_eq!(riff.offset, 8);
        assert_eq!(riff.end() as usize, data.len());

        let mut top = reader.enter(&riff);
        let colh = reader.next(&mut top).unwrap().unwrap();
        assert_eq!(colh.id, FourCc::COLH);
        assert_eq!(colh.parent, Some(top.scope()));

        let lins = reader.next(&mut top).unwrap().unwrap();
        assert!(lins.is_list_of(FourCc::LINS));

        let mut inner = reader.enter(&lins);
        let odd = reader.next(&mut inner).unwrap().unwrap();
        assert_eq!(odd.size, 3);
        assert_eq!(odd.total_size(), 12);
        let even = reader.next(&mut inner).unwrap().unwrap();
        assert_eq!(even.id, FourCc(*b"even"));
        assert_eq!(even.offset, odd.end() + CHUNK_HEADER_SIZE);
        assert!(reader.next(&mut inner).unwrap().is_none());
        reader.leave(inner);

        assert!(reader.next(&mut top).unwrap().is_none());
        reader.leave(top);
    }

    #[test]
    fn test_read_data_and_reset() {
        let data = nested();
        let mut reader = ChunkReader::new(Cursor::new(data.as_slice()));
        let riff = reader.get().unwrap();
        let mut top = reader.enter(&riff);
        let colh = reader.next(&mut top).unwrap().unwrap();

        assert_eq!(reader.read_data(&colh).unwrap(), 1u32.to_le_bytes());
        reader.reset_data(&riff).unwrap();
        assert_eq!(reader.position().unwrap(), 12);
    }

    #[test]
    fn test_child_overrunning_parent_is_rejected() {
        let mut data = nested();
        // Inflate the size of 'colh' past the end of the RIFF payload
        data[16..20].copy_from_slice(&1000u32.to_le_bytes());

        let mut reader = ChunkReader::new(Cursor::new(data.as_slice()));
        let riff = reader.get().unwrap();
        let mut top = reader.enter(&riff);
        let result = reader.next(&mut top);
        assert!(matches!(result, Err(DlsError::ChunkOverrun { id, .. }) if id == FourCc::COLH));
    }

    #[test]
    fn test_truncated_header() {
        let mut reader = ChunkReader::new(Cursor::new(&b"RIFF\x04"[..]));
        assert!(matches!(reader.get(), Err(DlsError::UnexpectedEof)));
    }

    #[test]
    fn test_read_data_past_end_of_stream() {
        // 4 GiB declared, 4 bytes present
        let bytes = b"colh\x00\xff\xff\xff\x01\x00\x00\x00";
        let mut reader = ChunkReader::new(Cursor::new(&bytes[..]));
        let colh = reader.get().unwrap();
        assert!(matches!(reader.read_data(&colh), Err(DlsError::UnexpectedEof)));
        // Measuring the stream does not move it
        assert_eq!(reader.position().unwrap(), 8);
    }

    #[test]
    fn test_skip_declared_ignores_padding() {
        let data = nested();
        let mut reader = ChunkReader::new(Cursor::new(data.as_slice()));
        let riff = reader.get().unwrap();
        let mut top = reader.enter(&riff);
        reader.next(&mut top).unwrap();
        let lins = reader.next(&mut top).unwrap().unwrap();
        let mut inner = reader.enter(&lins);
        let odd = reader.next(&mut inner).unwrap().unwrap();

        reader.skip_declared(&odd).unwrap();
        assert_eq!(reader.position().unwrap(), odd.offset + 3);
        reader.skip(&odd).unwrap();
        assert_eq!(reader.position().unwrap(), odd.offset + 4);
    }

    #[test]
    fn test_list_too_small_for_type() {
        let mut reader = ChunkReader::new(Cursor::new(&b"LIST\x02\x00\x00\x00ab"[..]));
        assert!(matches!(
            reader.get(),
            Err(DlsError::InvalidChunkSize { expected: 4, actual: 2, .. })
        ));
    }
}
