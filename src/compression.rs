use std::{
    fmt,
    io::{
        self,
        BufRead,
        Read,
    },
    str::FromStr,
};
use flate2::bufread::{GzDecoder, ZlibDecoder};

use crate::error::Error;

/// Envelope a dataset file is wrapped in. Always declared by the caller,
/// never sniffed from the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressionType {
    #[default]
    None,
    Gzip,
    Zlib,
}

impl CompressionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Gzip => "GZIP",
            Self::Zlib => "ZLIB",
        }
    }

    /// Checks the leading bytes of a stream against this envelope's framing.
    pub fn matches_framing(&self, head: &[u8]) -> bool {
        match self {
            Self::None => true,
            Self::Gzip => head.starts_with(&[0x1f, 0x8b]),
            Self::Zlib => match head {
                [cmf, flg, ..] => {
                    let method = cmf & 0x0f;
                    let window = cmf >> 4;
                    method == 8 && window <= 7 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0
                }
                _ => false,
            },
        }
    }

    pub(crate) fn decompress<R: BufRead>(&self, reader: R) -> Decompressor<R> {
        match self {
            Self::None => Decompressor::Plain(reader),
            Self::Gzip => Decompressor::Gzip(GzDecoder::new(reader)),
            Self::Zlib => Decompressor::Zlib(ZlibDecoder::new(reader)),
        }
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "" | "NONE" => Ok(Self::None),
            "GZIP" => Ok(Self::Gzip),
            "ZLIB" => Ok(Self::Zlib),
            _ => Err(Error::UnknownCompression(s.to_owned())),
        }
    }
}

pub(crate) enum Decompressor<R: BufRead> {
    Plain(R),
    Gzip(GzDecoder<R>),
    Zlib(ZlibDecoder<R>),
}

impl<R: BufRead> Read for Decompressor<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(r) => r.read(buf),
            Self::Gzip(r) => r.read(buf),
            Self::Zlib(r) => r.read(buf),
        }
    }
}
