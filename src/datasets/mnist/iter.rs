use std::{
    marker::PhantomData,
    path::PathBuf,
};
use tracing::{debug, warn};

use crate::{
    datasets::mnist::{
        decoder::FileDecoder,
        header::{DatasetHeader, FileKind},
        record::{ImageRecord, LabelRecord, OutputShape},
        Options,
    },
    error::{Error, Result},
};

/// Ties a record type to the file kind it is decoded from.
pub trait RecordKind {
    const KIND: FileKind;
    type Record;

    fn decode(header: &DatasetHeader, bytes: Vec<u8>) -> Self::Record;

    fn shape(header: Option<&DatasetHeader>) -> OutputShape;
}

#[derive(Debug, Clone, Copy)]
pub struct Images;

#[derive(Debug, Clone, Copy)]
pub struct Labels;

impl RecordKind for Images {
    const KIND: FileKind = FileKind::Images;
    type Record = ImageRecord;

    fn decode(header: &DatasetHeader, bytes: Vec<u8>) -> ImageRecord {
        let (rows, cols) = header.dims.unwrap_or_default();
        ImageRecord::from_raw(rows as usize, cols as usize, bytes)
    }

    fn shape(header: Option<&DatasetHeader>) -> OutputShape {
        let dims = header.and_then(|h| h.dims);
        OutputShape::Matrix {
            rows: dims.map(|(r, _)| r as usize),
            cols: dims.map(|(_, c)| c as usize),
        }
    }
}

impl RecordKind for Labels {
    const KIND: FileKind = FileKind::Labels;
    type Record = LabelRecord;

    fn decode(_: &DatasetHeader, bytes: Vec<u8>) -> LabelRecord {
        LabelRecord(bytes[0])
    }

    fn shape(_: Option<&DatasetHeader>) -> OutputShape {
        OutputShape::Scalar
    }
}

struct Cursor {
    decoder: FileDecoder,
    header: DatasetHeader,
    record_len: usize,
    file: usize,
    remaining: u32,
}

enum State {
    Ready(Cursor),
    Exhausted,
    Failed,
}

/// Pull-based reader over one or more files of the same kind.
///
/// Files are read back to back in the order given; each keeps its own header.
/// Any error moves the iterator into a terminal failed state that only
/// [`restart`] leaves.
///
/// [`restart`]: RecordIterator::restart
pub struct RecordIterator<K: RecordKind> {
    filenames: Vec<PathBuf>,
    options: Options,
    state: State,
    header: Option<DatasetHeader>,
    index: u64,
    _kind: PhantomData<K>,
}

pub type ImageDataset = RecordIterator<Images>;
pub type LabelDataset = RecordIterator<Labels>;

impl<K: RecordKind> RecordIterator<K> {
    /// Opens the first file and reads its header.
    pub fn new(filenames: Vec<PathBuf>, options: Options) -> Result<Self> {
        let mut iter = Self {
            filenames,
            options,
            state: State::Exhausted,
            header: None,
            index: 0,
            _kind: PhantomData,
        };
        iter.restart()?;
        Ok(iter)
    }

    pub fn next_record(&mut self) -> Result<Option<K::Record>> {
        let result = self.step();
        if let Err(e) = &result {
            if !matches!(self.state, State::Failed) {
                warn!(kind = ?K::KIND, index = self.index, error = %e, "dataset read failed");
                self.state = State::Failed;
            }
        }
        result
    }

    /// Goes back to record 0 of the first file by reopening it.
    pub fn restart(&mut self) -> Result<()> {
        self.state = State::Exhausted;
        self.index = 0;
        match self.enter(0) {
            Ok(state) => {
                self.state = state;
                Ok(())
            }
            Err(e) => {
                self.state = State::Failed;
                Err(e)
            }
        }
    }

    /// Records produced since the last restart.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Header of the file currently (or most recently) read.
    pub fn header(&self) -> Option<&DatasetHeader> {
        self.header.as_ref()
    }

    pub fn kind(&self) -> FileKind {
        K::KIND
    }

    pub fn output_shape(&self) -> OutputShape {
        K::shape(self.header.as_ref())
    }

    /// Offset into the current file's decompressed stream.
    pub fn position(&self) -> Option<u64> {
        match &self.state {
            State::Ready(cursor) => Some(cursor.decoder.position()),
            _ => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, State::Exhausted)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, State::Failed)
    }

    pub fn filenames(&self) -> &[PathBuf] {
        &self.filenames
    }

    fn step(&mut self) -> Result<Option<K::Record>> {
        loop {
            let next_file = match &mut self.state {
                State::Failed => return Err(Error::InvalidState("dataset failed; restart it to read again")),
                State::Exhausted => return Ok(None),
                State::Ready(cursor) if cursor.remaining > 0 => {
                    let index = self.index;
                    let bytes = cursor.decoder.read_record(cursor.record_len).map_err(|e| match e {
                        Error::TruncatedRecord { path, expected, actual, .. } => {
                            Error::TruncatedRecord { path, index, expected, actual }
                        }
                        e => e,
                    })?;
                    cursor.remaining -= 1;
                    self.index += 1;
                    return Ok(Some(K::decode(&cursor.header, bytes)));
                }
                State::Ready(cursor) => {
                    cursor.decoder.finish()?;
                    cursor.file + 1
                }
            };
            self.state = State::Exhausted;
            self.state = self.enter(next_file)?;
        }
    }

    fn enter(&mut self, file: usize) -> Result<State> {
        let Some(path) = self.filenames.get(file) else {
            debug!(kind = ?K::KIND, records = self.index, "dataset exhausted");
            return Ok(State::Exhausted);
        };
        let mut decoder = FileDecoder::open_with_capacity(path, self.options.compression, self.options.buffer_capacity)?;
        let header = decoder.read_header()?;
        if header.kind != K::KIND {
            return Err(Error::MalformedHeader {
                path: path.clone(),
                reason: format!("expected {:?} file, found {:?}", K::KIND, header.kind),
            });
        }
        let record_len = header
            .record_len()
            .map_err(|reason| Error::MalformedHeader { path: path.clone(), reason })?;
        debug!(kind = ?K::KIND, file, path = %path.display(), count = header.count, "entering dataset file");
        self.header = Some(header);
        Ok(State::Ready(Cursor {
            decoder,
            header,
            record_len,
            file,
            remaining: header.count,
        }))
    }
}

impl<K: RecordKind> Iterator for RecordIterator<K> {
    type Item = Result<K::Record>;

    /// Yields `None` after exhaustion or after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            State::Failed => None,
            _ => self.next_record().transpose(),
        }
    }
}
