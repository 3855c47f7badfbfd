//! Connection table reader.
//!
//! Yields the data rows of a table lazily: header dropped, rows trimmed,
//! blank rows skipped. Bytes that are not UTF-8 are replaced, so a garbled
//! row reaches the decoder instead of failing the whole table.

use super::types::{AddressFamily, ConnectionTableSource};
use crate::error::{Result, SentinelError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Something that can be opened into a stream of table rows
pub trait TableSource {
    /// Family of the addresses stored in this table
    fn family(&self) -> AddressFamily;

    /// Path (or label) used in log lines and errors
    fn origin(&self) -> &Path;

    /// Open the table. The returned reader owns the handle.
    fn open(&self) -> Result<TableReader<Box<dyn BufRead>>>;
}

impl TableSource for ConnectionTableSource {
    fn family(&self) -> AddressFamily {
        self.family
    }

    fn origin(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<TableReader<Box<dyn BufRead>>> {
        let file = File::open(&self.path).map_err(|e| SentinelError::io(&self.path, e))?;
        Ok(TableReader::new(
            Box::new(BufReader::new(file)) as Box<dyn BufRead>,
            &self.path,
        ))
    }
}

/// Lazy, single-pass iterator over the data rows of one table
pub struct TableReader<R> {
    reader: R,
    buf: Vec<u8>,
    origin: PathBuf,
    header_skipped: bool,
    failed: bool,
}

impl<R: BufRead> TableReader<R> {
    pub fn new(reader: R, origin: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            origin: origin.into(),
            header_skipped: false,
            failed: false,
        }
    }

    fn read_line(&mut self) -> Option<Result<String>> {
        if self.failed {
            return None;
        }
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => Some(Ok(String::from_utf8_lossy(&self.buf).into_owned())),
            Err(e) => {
                // a failed read ends the stream
                self.failed = true;
                Some(Err(SentinelError::io(&self.origin, e)))
            }
        }
    }
}

impl<R: BufRead> Iterator for TableReader<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.header_skipped {
            self.header_skipped = true;
            if let Err(e) = self.read_line()? {
                return Some(Err(e));
            }
        }

        loop {
            match self.read_line()? {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Some(Ok(trimmed.to_string()));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn rows(text: &str) -> Vec<String> {
        TableReader::new(Cursor::new(text.to_string()), "test")
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_skips_header() {
        let rows = rows("sl local rem st\n1: a b c\n");
        assert_eq!(rows, vec!["1: a b c"]);
    }

    #[test]
    fn test_trims_and_skips_blank_rows() {
        let rows = rows("header\n   0: x y z   \n\n   \n1: p q r\n");
        assert_eq!(rows, vec!["0: x y z", "1: p q r"]);
    }

    #[test]
    fn test_empty_and_header_only() {
        assert!(rows("").is_empty());
        assert!(rows("sl local rem st\n").is_empty());
    }

    struct FailingRead {
        served: bool,
    }

    impl Read for FailingRead {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.served {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
            }
            self.served = true;
            let data = b"header\n1: a b c\n";
            buf[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }
    }

    #[test]
    fn test_mid_stream_error_is_reported() {
        let reader = BufReader::new(FailingRead { served: false });
        let results: Vec<_> = TableReader::new(reader, "failing").collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap(), "1: a b c");
        assert!(matches!(results[1], Err(SentinelError::Io { .. })));
    }

    #[test]
    fn test_invalid_utf8_row_is_kept_lossy() {
        let mut data = b"header\n0: 0100007F:0050 00000000:0000 01 ".to_vec();
        data.extend_from_slice(&[0xff, 0xfe]);
        data.extend_from_slice(b"\n1: a b c\n");

        let results: Vec<_> = TableReader::new(Cursor::new(data), "garbled")
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].starts_with("0: 0100007F:0050 00000000:0000 01"));
        assert_eq!(results[1], "1: a b c");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = ConnectionTableSource::new("/nonexistent/idled/tcp", AddressFamily::V4);
        assert!(matches!(source.open(), Err(SentinelError::Io { .. })));
    }
}
