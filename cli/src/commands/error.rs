use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CommandError {
    #[error("Nothing to analyze")]
    #[diagnostic(
        code(mythx::check::empty),
        help("Pass --bytecode, --source, --bytecode-file or --source-file")
    )]
    NothingToSubmit,

    #[error("Could not read {}", .path.display())]
    #[diagnostic(code(mythx::check::input))]
    ReadInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{0}` is not a valid UUID")]
    #[diagnostic(code(mythx::args::uuid))]
    InvalidUuid(String),
}
