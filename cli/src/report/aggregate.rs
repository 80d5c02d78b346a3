use std::io;
use std::path::Path;

use crate::client::models::{IssueReport, Severity};
use crate::report::error::ReportError;
use crate::report::resolve::{SourcePosition, resolve_offset};
use crate::report::source_map::SourceMapTriple;

/// Group name for locations that can't be tied to a source file.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// One table row. `position` is `None` for locations that could not be
/// resolved; those rows never borrow another issue's position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueRow {
    pub position: Option<SourcePosition>,
    pub swc_title: String,
    pub severity: Severity,
    pub description_short: String,
}

/// Rows grouped by source file, in order of first appearance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileReports {
    groups: Vec<(String, Vec<IssueRow>)>,
}

impl FileReports {
    pub fn push(&mut self, file: &str, row: IssueRow) {
        match self.groups.iter_mut().find(|(name, _)| name == file) {
            Some((_, rows)) => rows.push(row),
            None => self.groups.push((file.to_owned(), vec![row])),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[IssueRow])> {
        self.groups
            .iter()
            .map(|(name, rows)| (name.as_str(), rows.as_slice()))
    }

    pub fn get(&self, file: &str) -> Option<&[IssueRow]> {
        self.iter().find(|(name, _)| *name == file).map(|(_, rows)| rows)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

pub fn aggregate(reports: &[IssueReport]) -> Result<FileReports, ReportError> {
    aggregate_with(reports, resolve_offset)
}

/// Build per-file rows for every location of every issue, resolving offsets
/// through `resolve`.
///
/// A missing source file leaves the location unresolved. Any other resolution
/// failure, an offset past the end of the file included, aborts the report.
pub fn aggregate_with<F>(
    reports: &[IssueReport],
    mut resolve: F,
) -> Result<FileReports, ReportError>
where
    F: FnMut(&Path, usize) -> Result<SourcePosition, ReportError>,
{
    let mut out = FileReports::default();

    for report in reports {
        for issue in &report.issues {
            let row = |position| IssueRow {
                position,
                swc_title: issue.swc_title.clone(),
                severity: issue.severity,
                description_short: issue.description_short().to_owned(),
            };

            if issue.locations.is_empty() {
                out.push(UNKNOWN_SOURCE, row(None));
                continue;
            }

            for location in &issue.locations {
                let triple: SourceMapTriple = location.source_map.parse()?;
                let index = match triple.file_index {
                    Some(index) if !report.source_list.is_empty() => index,
                    _ => {
                        out.push(UNKNOWN_SOURCE, row(None));
                        continue;
                    }
                };

                let file = report
                    .source_list
                    .get(index)
                    .ok_or(ReportError::UnknownFileIndex {
                        index,
                        known: report.source_list.len(),
                    })?;

                let position = match resolve(Path::new(file), triple.offset) {
                    Ok(position) => Some(position),
                    Err(ReportError::Io { path, source })
                        if source.kind() == io::ErrorKind::NotFound =>
                    {
                        tracing::warn!(
                            path = %path.display(),
                            "source file not found locally, location left unresolved"
                        );
                        None
                    }
                    Err(e) => return Err(e),
                };
                out.push(file, row(position));
            }
        }
    }

    Ok(out)
}
