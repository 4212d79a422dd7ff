//! MNIST image and label files (the IDX format).
//!
//! [`ImageDataset`] and [`LabelDataset`] are single-stream record sources.
//! [`MNIST`] pairs them up per split and walks both in lockstep.

pub mod decoder;
pub mod header;
pub mod iter;
pub mod record;
pub mod writer;

use std::path::{Path, PathBuf};
use tracing::warn;

pub use self::{
    decoder::{FileDecoder, DEFAULT_BUFFER_CAPACITY},
    header::{DatasetHeader, FileKind},
    iter::{ImageDataset, Images, LabelDataset, Labels, RecordIterator, RecordKind},
    record::{ImageRecord, LabelRecord, OutputShape, Record},
};
use crate::{
    compression::CompressionType,
    datasets::Dataset,
    error::{Error, Result},
};

pub const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
pub const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub compression: CompressionType,
    pub buffer_capacity: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            compression: CompressionType::None,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// Collects filenames and options, then opens an image or label source.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    filenames: Vec<PathBuf>,
    options: Options,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filename<P: Into<PathBuf>>(mut self, filename: P) -> Self {
        self.filenames.push(filename.into());
        self
    }

    pub fn filenames<I: IntoIterator<Item = P>, P: Into<PathBuf>>(mut self, filenames: I) -> Self {
        self.filenames.extend(filenames.into_iter().map(Into::into));
        self
    }

    pub fn compression(mut self, compression: CompressionType) -> Self {
        self.options.compression = compression;
        self
    }

    /// Same as [`Builder::compression`] but takes the host's string form
    /// (`""`, `"NONE"`, `"GZIP"` or `"ZLIB"`).
    pub fn compression_type(self, compression_type: &str) -> Result<Self> {
        Ok(self.compression(compression_type.parse()?))
    }

    pub fn buffer_capacity(mut self, buffer_capacity: usize) -> Self {
        self.options.buffer_capacity = buffer_capacity;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn images(self) -> Result<ImageDataset> {
        ImageDataset::new(self.filenames, self.options)
    }

    pub fn labels(self) -> Result<LabelDataset> {
        LabelDataset::new(self.filenames, self.options)
    }
}

/// Image and label files of one split, matched index by index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    pub images: Vec<PathBuf>,
    pub labels: Vec<PathBuf>,
}

impl Split {
    pub fn new<P0: Into<PathBuf>, P1: Into<PathBuf>>(images: P0, labels: P1) -> Self {
        Self {
            images: vec![images.into()],
            labels: vec![labels.into()],
        }
    }

    fn open(&self, options: &Options) -> Result<MNISTIter> {
        Ok(MNISTIter {
            images: ImageDataset::new(self.images.clone(), options.clone())?,
            labels: LabelDataset::new(self.labels.clone(), options.clone())?,
            index: 0,
            failed: false,
        })
    }
}

pub struct MNIST {
    training: Split,
    testing: Split,
    options: Options,
}

impl MNIST {
    pub fn new(training: Split, testing: Split) -> Self {
        Self::with_options(training, testing, Options::default())
    }

    pub fn with_options(training: Split, testing: Split, options: Options) -> Self {
        Self { training, testing, options }
    }

    /// The four files under their usual names in `dir`, with a `.gz` suffix
    /// when `compression` is gzip.
    pub fn in_dir<P: AsRef<Path>>(dir: P, compression: CompressionType) -> Self {
        let dir = dir.as_ref();
        let name = |base: &str| match compression {
            CompressionType::Gzip => dir.join(format!("{base}.gz")),
            _ => dir.join(base),
        };
        Self::with_options(
            Split::new(name(TRAIN_IMAGES), name(TRAIN_LABELS)),
            Split::new(name(TEST_IMAGES), name(TEST_LABELS)),
            Options { compression, ..Options::default() },
        )
    }

    pub fn training(&self) -> &Split {
        &self.training
    }

    pub fn testing(&self) -> &Split {
        &self.testing
    }
}

impl Dataset for MNIST {
    type Input = ImageRecord;
    type Label = LabelRecord;
    type Iter = MNISTIter;

    fn get_training_iter(&self) -> Result<Self::Iter> {
        self.training.open(&self.options)
    }

    fn get_testing_iter(&self) -> Result<Self::Iter> {
        self.testing.open(&self.options)
    }
}

/// Drives an image and a label source together. Streams of different length
/// end in [`Error::LengthMismatch`].
pub struct MNISTIter {
    images: ImageDataset,
    labels: LabelDataset,
    index: u64,
    failed: bool,
}

impl MNISTIter {
    pub fn restart(&mut self) -> Result<()> {
        self.index = 0;
        self.failed = false;
        self.images.restart()?;
        self.labels.restart()
    }

    pub fn images(&self) -> &ImageDataset {
        &self.images
    }

    pub fn labels(&self) -> &LabelDataset {
        &self.labels
    }
}

impl Iterator for MNISTIter {
    type Item = Result<(ImageRecord, LabelRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = match (self.images.next_record(), self.labels.next_record()) {
            (Ok(Some(image)), Ok(Some(label))) => Ok((image, label)),
            (Ok(None), Ok(None)) => return None,
            (Err(e), _) | (_, Err(e)) => Err(e),
            _ => {
                warn!(index = self.index, "image and label streams have different lengths");
                Err(Error::LengthMismatch { index: self.index })
            }
        };
        self.index += 1;
        self.failed = item.is_err();
        Some(item)
    }
}
