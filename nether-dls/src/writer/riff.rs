//! Low-level RIFF chunk writer

use crate::chunk::FourCc;

/// Chunk tree builder with size back-patching and word padding
#[derive(Debug, Default)]
pub struct RiffWriter {
    buf: Vec<u8>,
    /// Offsets of the size fields of the open lists
    open: Vec<usize>,
}

impl RiffWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the outer RIFF chunk
    pub fn begin_riff(&mut self, form: FourCc) -> &mut Self {
        self.begin(FourCc::RIFF, form)
    }

    /// Open a LIST chunk
    pub fn begin_list(&mut self, list_type: FourCc) -> &mut Self {
        self.begin(FourCc::LIST, list_type)
    }

    /// Write a leaf chunk, padding odd payloads
    pub fn chunk(&mut self, id: FourCc, data: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(id.as_bytes());
        self.buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
        self.buf.extend_from_slice(data);
        if data.len() % 2 != 0 {
            self.buf.push(0);
        }
        self
    }

    /// Write a chunk header with an arbitrary declared size and no payload
    pub fn header(&mut self, id: FourCc, declared_size: u32) -> &mut Self {
        self.buf.extend_from_slice(id.as_bytes());
        self.buf.extend_from_slice(&declared_size.to_le_bytes());
        self
    }

    /// Append bytes as-is
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Close the innermost open list
    pub fn end(&mut self) -> &mut Self {
        if let Some(size_at) = self.open.pop() {
            let size = self.buf.len() - size_at - 4;
            self.buf[size_at..size_at + 4].copy_from_slice(&(size as u32).to_le_bytes());
            if size % 2 != 0 {
                self.buf.push(0);
            }
        }
        self
    }

    /// Close every open list and return the bytes
    pub fn finish(mut self) -> Vec<u8> {
        while !self.open.is_empty() {
            self.end();
        }
        self.buf
    }

    fn begin(&mut self, id: FourCc, list_type: FourCc) -> &mut Self {
        self.buf.extend_from_slice(id.as_bytes());
        self.open.push(self.buf.len());
        self.buf.extend_from_slice(&[0u8; 4]);
        self.buf.extend_from_slice(list_type.as_bytes());
        self
    }
}
