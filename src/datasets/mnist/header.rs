//! IDX header layout shared by the MNIST image and label files.
//!
//! Every field is a big-endian `u32`. Label files carry the magic and the
//! record count, image files additionally carry the row and column count.

use std::io::{self, ErrorKind, Read};
use byteorder::{BigEndian, ReadBytesExt};

pub const IMAGE_MAGIC: u32 = 0x0000_0803;
pub const LABEL_MAGIC: u32 = 0x0000_0801;

pub const IMAGE_HEADER_LEN: usize = 16;
pub const LABEL_HEADER_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Images,
    Labels,
}

impl FileKind {
    pub fn magic(&self) -> u32 {
        match self {
            Self::Images => IMAGE_MAGIC,
            Self::Labels => LABEL_MAGIC,
        }
    }

    pub fn header_len(&self) -> usize {
        match self {
            Self::Images => IMAGE_HEADER_LEN,
            Self::Labels => LABEL_HEADER_LEN,
        }
    }

    pub fn from_magic(magic: u32) -> Option<Self> {
        match magic {
            IMAGE_MAGIC => Some(Self::Images),
            LABEL_MAGIC => Some(Self::Labels),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum HeaderError {
    Malformed(String),
    /// The underlying stream failed for a reason other than running out.
    Io(io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetHeader {
    pub kind: FileKind,
    pub count: u32,
    /// `(rows, cols)` for image files.
    pub dims: Option<(u32, u32)>,
}

impl DatasetHeader {
    pub fn images(count: u32, rows: u32, cols: u32) -> Self {
        Self { kind: FileKind::Images, count, dims: Some((rows, cols)) }
    }

    pub fn labels(count: u32) -> Self {
        Self { kind: FileKind::Labels, count, dims: None }
    }

    /// Reads and validates a header. The file kind follows from the magic
    /// number, which must be one of the two known constants.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, HeaderError> {
        let magic = read_field(reader, "magic number")?;
        let kind = FileKind::from_magic(magic)
            .ok_or_else(|| HeaderError::Malformed(format!("unrecognized magic number {magic:#010x}")))?;
        let count = read_field(reader, "record count")?;
        let header = match kind {
            FileKind::Labels => Self::labels(count),
            FileKind::Images => {
                let rows = read_field(reader, "row count")?;
                let cols = read_field(reader, "column count")?;
                Self::images(count, rows, cols)
            }
        };
        header.record_len().map_err(HeaderError::Malformed)?;
        Ok(header)
    }

    /// Bytes occupied by a single record.
    pub fn record_len(&self) -> Result<usize, String> {
        match self.dims {
            None => Ok(1),
            Some((0, _)) | Some((_, 0)) => Err(format!("zero image geometry {:?}", self.dims)),
            Some((rows, cols)) => usize::try_from(rows)
                .ok()
                .zip(usize::try_from(cols).ok())
                .and_then(|(r, c)| r.checked_mul(c))
                .ok_or_else(|| format!("image geometry {rows}x{cols} overflows")),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.kind.header_len());
        out.extend_from_slice(&self.kind.magic().to_be_bytes());
        out.extend_from_slice(&self.count.to_be_bytes());
        if let Some((rows, cols)) = self.dims {
            out.extend_from_slice(&rows.to_be_bytes());
            out.extend_from_slice(&cols.to_be_bytes());
        }
        out
    }
}

fn read_field<R: Read>(reader: &mut R, name: &str) -> Result<u32, HeaderError> {
    reader.read_u32::<BigEndian>().map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => HeaderError::Malformed(format!("stream ends before {name}")),
        _ => HeaderError::Io(e),
    })
}
