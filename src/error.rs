use std::fmt;
use std::io;
use std::path::PathBuf;

/// Which of the two fixed headers an error refers to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HeaderKind {
    File,
    Info
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            HeaderKind::File => "BMP header",
            HeaderKind::Info => "BMP info header"
        })
    }
}

/// Every way reading, converting or writing a bitmap can fail. All of them are terminal.
#[derive(Debug, thiserror::Error)]
pub enum BmpError {
    #[error("Error opening input file: {}", path.display())]
    InputOpen {
        path: PathBuf,
        #[source]
        source: io::Error
    },

    #[error("Error opening output file: {}", path.display())]
    OutputOpen {
        path: PathBuf,
        #[source]
        source: io::Error
    },

    #[error("Error reading {header} (expected {expected} bytes, got {actual})")]
    TruncatedHeader {
        header: HeaderKind,
        expected: usize,
        actual: usize
    },

    #[error("Only 24-bit BMPs supported (bit count is {bit_count})")]
    UnsupportedFormat { bit_count: u16 },

    #[error("Invalid image dimensions ({width} x {height})")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("Could not allocate memory for image ({width} x {height})")]
    Allocation { width: usize, height: usize },

    #[error("Error reading pixel data on row {row_index} (expected {expected}, got {actual})")]
    ShortRowRead {
        row_index: usize,
        expected: usize,
        actual: usize
    },

    #[error("Error writing pixel data on row {row_index}")]
    ShortRowWrite {
        row_index: usize,
        #[source]
        source: io::Error
    },

    #[error("Error writing {header} to output")]
    Write {
        header: HeaderKind,
        #[source]
        source: io::Error
    },

    #[error("Error reading BMP data")]
    Read(#[from] io::Error)
}
