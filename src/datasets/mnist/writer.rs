//! Encoding side of the format, for producing fixtures and exporting subsets.

use std::{
    fs::File,
    io::{self, BufWriter, ErrorKind, Write},
    path::Path,
};
use flate2::{
    write::{GzEncoder, ZlibEncoder},
    Compression,
};
use tracing::debug;

use crate::{
    compression::CompressionType,
    datasets::mnist::header::DatasetHeader,
    error::Result,
};

/// Writes `header` followed by `body` through the requested envelope and
/// returns the inner writer once the envelope is finished.
pub fn encode<W: Write>(writer: W, compression: CompressionType, header: &DatasetHeader, body: &[u8]) -> io::Result<W> {
    fn put<W: Write>(mut w: W, header: &DatasetHeader, body: &[u8]) -> io::Result<W> {
        w.write_all(&header.to_bytes())?;
        w.write_all(body)?;
        Ok(w)
    }

    match compression {
        CompressionType::None => put(writer, header, body),
        CompressionType::Gzip => put(GzEncoder::new(writer, Compression::default()), header, body)?.finish(),
        CompressionType::Zlib => put(ZlibEncoder::new(writer, Compression::default()), header, body)?.finish(),
    }
}

/// `pixels` holds the images back to back, `rows * cols` bytes each.
pub fn write_images<P: AsRef<Path>>(path: P, compression: CompressionType, rows: u32, cols: u32, pixels: &[u8]) -> Result<()> {
    let record_len = (rows as usize)
        .checked_mul(cols as usize)
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, format!("image geometry {rows}x{cols} overflows")))?;
    if record_len == 0 || pixels.len() % record_len != 0 {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            format!("{} pixel bytes do not split into {rows}x{cols} images", pixels.len()),
        ).into());
    }
    let count = u32::try_from(pixels.len() / record_len)
        .map_err(|_| io::Error::new(ErrorKind::InvalidInput, "too many images for one file"))?;
    write_file(path.as_ref(), compression, &DatasetHeader::images(count, rows, cols), pixels)
}

pub fn write_labels<P: AsRef<Path>>(path: P, compression: CompressionType, labels: &[u8]) -> Result<()> {
    let count = u32::try_from(labels.len())
        .map_err(|_| io::Error::new(ErrorKind::InvalidInput, "too many labels for one file"))?;
    write_file(path.as_ref(), compression, &DatasetHeader::labels(count), labels)
}

fn write_file(path: &Path, compression: CompressionType, header: &DatasetHeader, body: &[u8]) -> Result<()> {
    let out = encode(BufWriter::new(File::create(path)?), compression, header, body)?;
    out.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    debug!(path = %path.display(), %compression, count = header.count, "wrote dataset file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};
    use flate2::read::GzDecoder;

    use super::*;

    #[test]
    fn plain_layout() {
        let bytes = encode(Vec::new(), CompressionType::None, &DatasetHeader::labels(3), &[5, 0, 9]).unwrap();
        assert_eq!(bytes, [0, 0, 8, 1, 0, 0, 0, 3, 5, 0, 9]);
    }

    #[test]
    fn gzip_envelope() {
        let bytes = encode(Vec::new(), CompressionType::Gzip, &DatasetHeader::images(1, 2, 2), &[0x10, 0x20, 0x30, 0x40]).unwrap();
        assert!(CompressionType::Gzip.matches_framing(&bytes));

        let mut plain = Vec::new();
        GzDecoder::new(Cursor::new(bytes)).read_to_end(&mut plain).unwrap();
        assert_eq!(plain.len(), 16 + 4);
        assert_eq!(&plain[16..], &[0x10, 0x20, 0x30, 0x40]);
    }

    #[test]
    fn image_bytes_must_split_evenly() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_images(dir.path().join("x"), CompressionType::None, 2, 2, &[0; 5]).is_err());
        assert!(write_images(dir.path().join("y"), CompressionType::None, 0, 2, &[]).is_err());
    }

    #[test]
    fn oversized_geometry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_images(dir.path().join("z"), CompressionType::None, u32::MAX, u32::MAX, &[1, 2, 3]).unwrap_err();
        assert!(matches!(&err, crate::Error::Io(e) if e.kind() == ErrorKind::InvalidInput), "{err}");
        assert!(!dir.path().join("z").exists());
    }
}
