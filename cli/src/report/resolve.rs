//! Byte offset to line/column resolution for analyzer source maps.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::report::error::ReportError;

/// A position recovered from a source map offset.
///
/// `column` is the number of bytes between the target offset and the end of
/// its line (terminator included), not a left-to-right count. The analyzer's
/// tooling reads it that way, so it stays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    pub line: usize,   // 1-based
    pub column: usize, // 0-based, counted back from the line end
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Resolve `offset` inside the file at `path`.
///
/// The file handle is dropped as soon as the scan finishes, on every path.
pub fn resolve_offset(path: &Path, offset: usize) -> Result<SourcePosition, ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    match resolve_in(BufReader::new(file), offset).map_err(io_err)? {
        Some(position) => {
            tracing::debug!(path = %path.display(), offset, %position, "resolved source offset");
            Ok(position)
        }
        None => {
            tracing::error!(
                "Error finding the source location in {} for offset {}",
                path.display(),
                offset
            );
            Err(ReportError::OffsetOutOfRange {
                path: path.to_path_buf(),
                offset,
            })
        }
    }
}

/// Scan `reader` line by line until the consumed byte count reaches `offset`.
///
/// Returns `Ok(None)` when the input runs out first. An empty input never
/// enters the loop, so it yields `None` even for offset 0.
pub fn resolve_in<R: BufRead>(mut reader: R, offset: usize) -> io::Result<Option<SourcePosition>> {
    let mut line = 0usize;
    let mut consumed = 0usize;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Ok(None);
        }

        line += 1;
        consumed += read;
        if consumed >= offset {
            return Ok(Some(SourcePosition {
                line,
                column: consumed - offset,
            }));
        }
    }
}
