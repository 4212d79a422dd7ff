#![forbid(unsafe_code)]

//! # mnist_io
//! # Streaming reader for MNIST image and label files
//!
//! Records are pulled one at a time from a [`RecordIterator`], which reads
//! them from a [`FileDecoder`] over a plain, gzip or zlib stream.
//! ```no_run
//! use mnist_io::prelude::*;
//!
//! # fn main() -> mnist_io::Result<()> {
//! let mut images = Builder::new()
//!     .filename("train-images-idx3-ubyte.gz")
//!     .compression(CompressionType::Gzip)
//!     .images()?;
//! while let Some(image) = images.next_record()? {
//!     println!("{}x{}", image.rows(), image.cols());
//! }
//! // next epoch
//! images.restart()?;
//! # Ok(())
//! # }
//! ```
//! Images and labels come from separate sources. [`MNIST`] walks both in
//! lockstep through the [`Dataset`] trait.
//! ```no_run
//! use mnist_io::prelude::*;
//!
//! # fn main() -> mnist_io::Result<()> {
//! let dataset = MNIST::in_dir("data", CompressionType::Gzip);
//! for pair in dataset.get_training_iter()? {
//!     let (image, label) = pair?;
//!     println!("{} -> {}", image.pixels().len(), label.value());
//! }
//! # Ok(())
//! # }
//! ```
//! A host engine that only knows filenames and a compression string uses
//! [`DatasetHandle`].
//!
//! [`RecordIterator`]: self::datasets::mnist::RecordIterator
//! [`FileDecoder`]: self::datasets::mnist::FileDecoder
//! [`MNIST`]: self::datasets::mnist::MNIST
//! [`Dataset`]: self::datasets::Dataset
//! [`DatasetHandle`]: self::handle::DatasetHandle

pub mod compression;
pub mod datasets;
pub mod error;
pub mod handle;

pub use error::{Error, Result};

#[doc(hidden)]
pub mod prelude {
    pub use crate::{
        compression::CompressionType,
        datasets::{
            Dataset,
            mnist::{
                Builder,
                ImageDataset,
                ImageRecord,
                LabelDataset,
                LabelRecord,
                Options,
                OutputShape,
                Record,
                Split,
                MNIST,
            },
        },
        error::{Error, Result},
        handle::DatasetHandle,
    };
}
