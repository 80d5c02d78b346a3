use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// What can go wrong while turning a detected-issues response into tables.
#[derive(Error, Debug, Diagnostic)]
pub enum ReportError {
    #[error("Error finding the source location in {} for offset {offset}", .path.display())]
    #[diagnostic(
        code(mythx::report::offset_out_of_range),
        help("The source file on disk must match the one that was submitted for analysis")
    )]
    OffsetOutOfRange { path: PathBuf, offset: usize },

    #[error("Could not read source file {}", .path.display())]
    #[diagnostic(code(mythx::report::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed source map entry `{raw}`: {reason}")]
    #[diagnostic(
        code(mythx::report::source_map),
        help("Source map entries have the form `offset:length:fileIndex`")
    )]
    MalformedSourceMap { raw: String, reason: &'static str },

    #[error("Source map refers to file index {index} but only {known} source file(s) are listed")]
    #[diagnostic(code(mythx::report::file_index))]
    UnknownFileIndex { index: usize, known: usize },
}
