//! Byte-level access to metadata blobs.

mod byte_source;

pub use byte_source::{ByteSource, MemorySource, SharedSource, SourceCursor};
