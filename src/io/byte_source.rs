use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::IoError;

/// Random-access source of blob bytes.
///
/// All offsets are absolute from the start of the metadata blob. Implementations
/// must be thread-safe; the scanner shares one source between many cursors.
pub trait ByteSource: Send + Sync {
    /// Read exactly `len` bytes starting at `offset`.
    ///
    /// Returns an error if the range is out of bounds or if the read fails.
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError>;

    /// Get the total size of the source in bytes.
    fn size(&self) -> u64;

    /// Get an identifier for this source (used in log lines).
    fn identifier(&self) -> &str;
}

/// Shared handle to a byte source.
pub type SharedSource = Arc<dyn ByteSource>;

// =============================================================================
// MemorySource
// =============================================================================

/// A [`ByteSource`] over an in-memory buffer.
#[derive(Clone)]
pub struct MemorySource {
    data: Bytes,
    identifier: String,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self::with_identifier(data, "memory")
    }

    pub fn with_identifier(data: impl Into<Bytes>, identifier: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            identifier: identifier.into(),
        }
    }

    /// Wrap the source in a [`SharedSource`].
    pub fn shared(self) -> SharedSource {
        Arc::new(self)
    }

    /// The whole buffer.
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }
}

impl fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySource")
            .field("identifier", &self.identifier)
            .field("size", &self.data.len())
            .finish()
    }
}

impl ByteSource for MemorySource {
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        let size = self.data.len() as u64;
        let end = offset.checked_add(len as u64);
        match end {
            Some(end) if end <= size => Ok(self.data.slice(offset as usize..end as usize)),
            _ => Err(IoError::RangeOutOfBounds {
                offset,
                requested: len as u64,
                size,
            }),
        }
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

// =============================================================================
// SourceCursor
// =============================================================================

/// A positioned reader over a shared source.
///
/// Cursors are cheap to fork. A fork has its own position, so reading from it
/// never moves the cursor it came from or any sibling fork.
#[derive(Clone)]
pub struct SourceCursor {
    source: SharedSource,
    position: u64,
}

impl SourceCursor {
    pub fn new(source: SharedSource, position: u64) -> Self {
        Self { source, position }
    }

    /// Get an independent cursor positioned at `offset`.
    ///
    /// Fails if `offset` lies beyond the end of the source.
    pub fn fork_at(&self, offset: u64) -> Result<SourceCursor, IoError> {
        let size = self.source.size();
        if offset > size {
            return Err(IoError::RangeOutOfBounds {
                offset,
                requested: 0,
                size,
            });
        }
        Ok(SourceCursor {
            source: Arc::clone(&self.source),
            position: offset,
        })
    }

    /// Read `len` bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes, IoError> {
        let bytes = self.source.read_exact_at(self.position, len)?;
        self.position += len as u64;
        Ok(bytes)
    }

    /// Read a fixed-size array and advance past it.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], IoError> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn source(&self) -> &SharedSource {
        &self.source
    }
}

impl fmt::Debug for SourceCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceCursor")
            .field("source", &self.source.identifier())
            .field("position", &self.position)
            .finish()
    }
}
