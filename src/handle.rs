//! Opaque record source for a host execution engine.
//!
//! The two constructors mirror the host-side dataset operations: both take the
//! list of filenames plus the compression designator in string form. The host
//! owns the handle and pulls records with [`DatasetHandle::get_next`].

use std::path::PathBuf;

use crate::{
    datasets::mnist::{Builder, FileKind, ImageDataset, LabelDataset, OutputShape, Record},
    error::Result,
};

pub enum DatasetHandle {
    Images(ImageDataset),
    Labels(LabelDataset),
}

impl DatasetHandle {
    pub fn images<I: IntoIterator<Item = P>, P: Into<PathBuf>>(filenames: I, compression_type: &str) -> Result<Self> {
        Ok(Self::Images(Builder::new().filenames(filenames).compression_type(compression_type)?.images()?))
    }

    pub fn labels<I: IntoIterator<Item = P>, P: Into<PathBuf>>(filenames: I, compression_type: &str) -> Result<Self> {
        Ok(Self::Labels(Builder::new().filenames(filenames).compression_type(compression_type)?.labels()?))
    }

    pub fn get_next(&mut self) -> Result<Option<Record>> {
        Ok(match self {
            Self::Images(d) => d.next_record()?.map(Record::from),
            Self::Labels(d) => d.next_record()?.map(Record::from),
        })
    }

    pub fn restart(&mut self) -> Result<()> {
        match self {
            Self::Images(d) => d.restart(),
            Self::Labels(d) => d.restart(),
        }
    }

    pub fn kind(&self) -> FileKind {
        match self {
            Self::Images(_) => FileKind::Images,
            Self::Labels(_) => FileKind::Labels,
        }
    }

    /// Rank 2 for images, rank 0 for labels. Image dimensions are only known
    /// once a header has been read.
    pub fn output_shape(&self) -> OutputShape {
        match self {
            Self::Images(d) => d.output_shape(),
            Self::Labels(d) => d.output_shape(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use tempfile::tempdir;

    use super::*;
    use crate::{datasets::mnist::LabelRecord, error::Error};

    #[test]
    fn label_handle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels");
        fs::write(&path, [0u8, 0, 8, 1, 0, 0, 0, 1, 8]).unwrap();

        let mut handle = DatasetHandle::labels([&path], "").unwrap();
        assert_eq!(handle.kind(), FileKind::Labels);
        assert_eq!(handle.output_shape().rank(), 0);
        assert_eq!(handle.get_next().unwrap(), Some(Record::Label(LabelRecord(8))));
        assert_eq!(handle.get_next().unwrap(), None);
        handle.restart().unwrap();
        assert_eq!(handle.get_next().unwrap(), Some(Record::Label(LabelRecord(8))));
    }

    #[test]
    fn unknown_compression_designator() {
        let err = DatasetHandle::images(Vec::<PathBuf>::new(), "snappy").err().unwrap();
        assert!(matches!(err, Error::UnknownCompression(_)));
    }
}
