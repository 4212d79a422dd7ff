use std::ops::Index;

/// One image, `rows * cols` pixel intensities in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRecord {
    rows: usize,
    cols: usize,
    pixels: Vec<u8>,
}

impl ImageRecord {
    /// Returns `None` if `pixels` does not hold exactly `rows * cols` bytes.
    pub fn new(rows: usize, cols: usize, pixels: Vec<u8>) -> Option<Self> {
        (rows.checked_mul(cols)? == pixels.len()).then_some(Self { rows, cols, pixels })
    }

    /// `pixels.len()` must already equal `rows * cols`.
    pub(crate) fn from_raw(rows: usize, cols: usize, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(rows * cols, pixels.len());
        Self { rows, cols, pixels }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn row(&self, row: usize) -> Option<&[u8]> {
        (row < self.rows).then(|| &self.pixels[row * self.cols..(row + 1) * self.cols])
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

impl Index<(usize, usize)> for ImageRecord {
    type Output = u8;

    fn index(&self, (row, col): (usize, usize)) -> &u8 {
        assert!(col < self.cols, "column {col} out of range for {} columns", self.cols);
        &self.pixels[row * self.cols + col]
    }
}

/// One label byte. The format does not restrict the value to `0..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelRecord(pub u8);

impl LabelRecord {
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl From<LabelRecord> for u8 {
    fn from(label: LabelRecord) -> Self {
        label.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Record {
    Image(ImageRecord),
    Label(LabelRecord),
}

impl From<ImageRecord> for Record {
    fn from(image: ImageRecord) -> Self {
        Self::Image(image)
    }
}

impl From<LabelRecord> for Record {
    fn from(label: LabelRecord) -> Self {
        Self::Label(label)
    }
}

/// Shape of the records a source produces. Image dimensions stay unknown
/// until a header has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputShape {
    Matrix {
        rows: Option<usize>,
        cols: Option<usize>,
    },
    Scalar,
}

impl OutputShape {
    pub fn rank(&self) -> usize {
        match self {
            Self::Matrix { .. } => 2,
            Self::Scalar => 0,
        }
    }

    pub fn is_fully_defined(&self) -> bool {
        match self {
            Self::Matrix { rows, cols } => rows.is_some() && cols.is_some(),
            Self::Scalar => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_rows() {
        let image = ImageRecord::new(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(image.row(1), Some(&[4, 5, 6][..]));
        assert_eq!(image.row(2), None);
        assert_eq!(image[(0, 2)], 3);
        assert_eq!(image[(1, 0)], 4);
    }

    #[test]
    fn image_len_must_match() {
        assert!(ImageRecord::new(2, 2, vec![0; 3]).is_none());
        assert!(ImageRecord::new(usize::MAX, 2, Vec::new()).is_none());
    }

    #[test]
    fn shapes() {
        let unknown = OutputShape::Matrix { rows: None, cols: None };
        assert_eq!(unknown.rank(), 2);
        assert!(!unknown.is_fully_defined());
        assert_eq!(OutputShape::Scalar.rank(), 0);
        assert!(OutputShape::Scalar.is_fully_defined());
    }
}
