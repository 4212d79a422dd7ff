//! Leaf reader for a single MNIST file.
//!
//! A [`FileDecoder`] owns the file handle and the decompressor stacked on top
//! of it. It is created by [`FileDecoder::open`], must read its header once
//! via [`FileDecoder::read_header`], and afterwards hands out fixed-size
//! records with [`FileDecoder::read_record`]. Dropping it (or calling
//! [`FileDecoder::close`]) releases the handle.

use std::{
    fs::File,
    io::{
        self,
        BufRead,
        BufReader,
        ErrorKind,
        Read,
    },
    path::{Path, PathBuf},
};
use tracing::{debug, trace};

use crate::{
    compression::{CompressionType, Decompressor},
    datasets::mnist::header::{DatasetHeader, HeaderError},
    error::{Error, Result},
};

pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

const MAX_PREALLOCATION: usize = 64 * 1024;

pub struct FileDecoder {
    path: PathBuf,
    compression: CompressionType,
    reader: Decompressor<BufReader<File>>,
    header: Option<DatasetHeader>,
    position: u64,
    records_read: u64,
}

impl FileDecoder {
    pub fn open<P: AsRef<Path>>(path: P, compression: CompressionType) -> Result<Self> {
        Self::open_with_capacity(path, compression, DEFAULT_BUFFER_CAPACITY)
    }

    pub fn open_with_capacity<P: AsRef<Path>>(path: P, compression: CompressionType, capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| Error::FileNotFound { path: path.clone(), source })?;
        let mut buffered = BufReader::with_capacity(capacity.max(2), file);

        // peek only, the decompressor still sees the magic bytes
        let head = buffered.fill_buf()?;
        if !compression.matches_framing(head) {
            return Err(Error::Decompression {
                source: io::Error::new(ErrorKind::InvalidData, format!("stream is not {compression} framed")),
                path,
                compression,
            });
        }

        debug!(path = %path.display(), %compression, "opened dataset file");
        Ok(Self {
            reader: compression.decompress(buffered),
            path,
            compression,
            header: None,
            position: 0,
            records_read: 0,
        })
    }

    pub fn read_header(&mut self) -> Result<DatasetHeader> {
        if self.header.is_some() {
            return Err(Error::InvalidState("header has already been read"));
        }
        let header = DatasetHeader::read_from(&mut self.reader).map_err(|e| match e {
            HeaderError::Malformed(reason) => Error::MalformedHeader { path: self.path.clone(), reason },
            HeaderError::Io(e) => self.stream_error(e),
        })?;
        self.position = header.kind.header_len() as u64;
        self.header = Some(header);
        debug!(
            path = %self.path.display(),
            kind = ?header.kind,
            count = header.count,
            dims = ?header.dims,
            "read dataset header"
        );
        Ok(header)
    }

    /// Reads exactly `len` bytes. Running out early is a
    /// [`Error::TruncatedRecord`], never a short record. The `index` it
    /// carries counts records within this file only.
    pub fn read_record(&mut self, len: usize) -> Result<Vec<u8>> {
        if self.header.is_none() {
            return Err(Error::InvalidState("records requested before the header was read"));
        }
        // the buffer grows with the bytes actually present, not the declared geometry
        let mut buf = Vec::with_capacity(len.min(MAX_PREALLOCATION));
        match (&mut self.reader).take(len as u64).read_to_end(&mut buf) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {}
            Err(e) => return Err(self.stream_error(e)),
        }
        if buf.len() < len {
            return Err(Error::TruncatedRecord {
                path: self.path.clone(),
                index: self.records_read,
                expected: len,
                actual: buf.len(),
            });
        }
        self.position += len as u64;
        self.records_read += 1;
        trace!(index = self.records_read - 1, position = self.position, "read record");
        Ok(buf)
    }

    /// Reads a compressed stream through to its end so the envelope's
    /// trailer checksum is verified. Plain streams are left as they are.
    pub fn finish(&mut self) -> Result<()> {
        if self.compression == CompressionType::None {
            return Ok(());
        }
        let trailing = io::copy(&mut self.reader, &mut io::sink()).map_err(|source| Error::Decompression {
            path: self.path.clone(),
            compression: self.compression,
            source,
        })?;
        trace!(path = %self.path.display(), trailing, "drained compressed stream");
        Ok(())
    }

    pub fn header(&self) -> Option<&DatasetHeader> {
        self.header.as_ref()
    }

    /// Offset into the decompressed stream.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn compression(&self) -> CompressionType {
        self.compression
    }

    pub fn close(self) {
        debug!(path = %self.path.display(), records = self.records_read, "closed dataset file");
    }

    fn stream_error(&self, source: io::Error) -> Error {
        match (self.compression, source.kind()) {
            (CompressionType::None, _) => Error::Io(source),
            (_, ErrorKind::InvalidInput | ErrorKind::InvalidData) => Error::Decompression {
                path: self.path.clone(),
                compression: self.compression,
                source,
            },
            _ => Error::Io(source),
        }
    }
}
