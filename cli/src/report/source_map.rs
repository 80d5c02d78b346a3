use std::str::FromStr;

use crate::report::error::ReportError;

/// One `offset:length:fileIndex` entry of an analyzer source map.
///
/// Solidity-style maps may carry a fourth jump field, which is ignored. A file
/// index of `-1` means the region is not backed by any source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceMapTriple {
    pub offset: usize,
    pub length: usize,
    pub file_index: Option<usize>,
}

impl FromStr for SourceMapTriple {
    type Err = ReportError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| ReportError::MalformedSourceMap {
            raw: raw.to_owned(),
            reason,
        };

        let mut fields = raw.trim().split(':');
        let mut next = |what| {
            fields
                .next()
                .filter(|f| !f.is_empty())
                .ok_or_else(|| malformed(what))
        };

        let offset = next("missing offset")?;
        let length = next("missing length")?;
        let file_index = next("missing file index")?;

        let offset = offset
            .parse::<usize>()
            .map_err(|_| malformed("offset is not a non-negative integer"))?;
        let length = length
            .parse::<usize>()
            .map_err(|_| malformed("length is not a non-negative integer"))?;
        let file_index = match file_index.parse::<i64>() {
            Ok(-1) => None,
            Ok(idx) => Some(
                usize::try_from(idx).map_err(|_| malformed("file index is negative"))?,
            ),
            Err(_) => return Err(malformed("file index is not an integer")),
        };

        Ok(Self {
            offset,
            length,
            file_index,
        })
    }
}
