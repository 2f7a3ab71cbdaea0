//! Helpers shared by the integration tests and the fuzz targets.

use std::fmt;
use std::io;

/// A writer that fails instead of growing past a fixed number of bytes.
pub struct BoundedWriter<T> {
    inner: T,
    capacity: usize,
}

impl<T> BoundedWriter<T> {
    /// Wraps `inner`, accepting at most `capacity` bytes.
    pub const fn new(inner: T, capacity: usize) -> Self {
        Self { inner, capacity }
    }

    /// Bytes that can still be written.
    pub const fn remaining(&self) -> usize {
        self.capacity
    }

    /// The wrapped writer.
    pub const fn inner(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwraps the writer.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: fmt::Write> fmt::Write for BoundedWriter<T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let remaining = self.capacity.checked_sub(s.len()).ok_or(fmt::Error)?;

        self.inner.write_str(s)?;
        self.capacity = remaining;

        Ok(())
    }
}

impl<T: io::Write> io::Write for BoundedWriter<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.len() > self.capacity {
            return Err(io::Error::other("write exceeds the capacity of the writer"));
        }

        let written = self.inner.write(buf)?;

        self.capacity -= written;

        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// One line of a demangling corpus.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CorpusEntry<'a> {
    /// One-based line number in the corpus file.
    pub line: usize,
    /// The mangled symbol.
    pub symbol: &'a str,
    /// The expected rendering with every detail.
    pub full: &'a str,
    /// The expected simplified rendering.
    pub simplified: &'a str,
}

/// Reads a corpus made of `symbol<TAB>full<TAB>simplified` lines. Empty lines and lines starting with `#` are
/// skipped.
///
/// # Panics
///
/// Panics on lines that do not have exactly three fields.
pub fn corpus_entries(data: &str) -> impl Iterator<Item = CorpusEntry<'_>> {
    data.lines()
        .zip(1..)
        .filter(|(line, _)| !line.is_empty() && !line.starts_with('#'))
        .map(|(text, line)| {
            let fields = text.split('\t').collect::<Vec<_>>();

            let &[symbol, full, simplified] = fields.as_slice() else {
                panic!("line {line}: expected 3 tab-separated fields, found {}", fields.len());
            };

            CorpusEntry {
                line,
                symbol,
                full,
                simplified,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::{BoundedWriter, CorpusEntry};
    use std::fmt::Write as _;
    use std::io::Write as _;

    #[test]
    fn test_bounded_writer() {
        let mut writer = BoundedWriter::new(String::new(), 5);

        assert!(writer.write_str("abc").is_ok());
        assert!(writer.write_str("def").is_err());
        assert_eq!(writer.remaining(), 2);
        assert_eq!(writer.into_inner(), "abc");

        let mut writer = BoundedWriter::new(Vec::new(), 2);

        assert!(writer.write_all(b"xyz").is_err());
        assert_eq!(writer.inner().as_slice(), b"");
    }

    #[test]
    fn test_corpus_entries() {
        let data = "# comment\n\n$sSiD\tSwift.Int\tInt\n";

        assert_eq!(
            super::corpus_entries(data).collect::<Vec<_>>(),
            [CorpusEntry {
                line: 3,
                symbol: "$sSiD",
                full: "Swift.Int",
                simplified: "Int",
            }],
        );
    }

    #[test]
    #[should_panic(expected = "line 1: expected 3 tab-separated fields, found 2")]
    fn test_corpus_entries_missing_field() {
        super::corpus_entries("$sSiD\tSwift.Int").for_each(drop);
    }
}
