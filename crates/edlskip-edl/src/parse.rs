//! EDL sidecar parsing.
//!
//! Each line holds a start and an end time in seconds, separated by spaces or
//! tabs. Fractions are allowed and truncated. Negative values clamp to zero.
//! Extra fields (such as the MPlayer action column) are ignored. Lines that do
//! not start with two numbers are skipped without error.

use crate::error::{EdlError, Result};
use crate::range::SkipRange;
use std::path::Path;

const FIELD_SEPARATORS: [char; 2] = [' ', '\t'];

/// Parse a single EDL line.
///
/// Returns `None` for blank, short or non-numeric lines.
pub fn parse_line(line: &str) -> Option<SkipRange> {
    let mut fields = line
        .trim()
        .split(FIELD_SEPARATORS)
        .filter(|field| !field.is_empty());

    let start = parse_seconds(fields.next()?)?;
    let end = parse_seconds(fields.next()?)?;

    Some(SkipRange::from_secs(start, end))
}

/// Whole seconds of a field, truncated toward zero.
///
/// Positions are never negative, so a negative start behaves like zero and a
/// negative end yields a range that never matches.
fn parse_seconds(field: &str) -> Option<u64> {
    let value: f64 = field.parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    Some(value.trunc().max(0.0) as u64)
}

/// Parse EDL text into ranges, keeping file order.
pub fn parse_edl(content: &str) -> Vec<SkipRange> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let range = parse_line(line);
            if range.is_none() && !line.trim().is_empty() {
                tracing::trace!(line = idx + 1, content = line, "Skipping malformed EDL line");
            }
            range
        })
        .collect()
}

/// Load the skip ranges from a sidecar file.
///
/// A missing file yields an empty list. Invalid UTF-8 is replaced rather than
/// rejected so one bad byte does not discard the whole file.
pub fn load_skip_ranges(edl_path: &Path) -> Result<Vec<SkipRange>> {
    parse_edl_read(edl_path, std::fs::read(edl_path))
}

/// Turn the outcome of reading `edl_path` into ranges.
///
/// Shared by [`load_skip_ranges`] and async callers that read the file
/// themselves: a missing file yields an empty list, any other read error is
/// returned with the path attached.
pub fn parse_edl_read(
    edl_path: &Path,
    read: std::io::Result<Vec<u8>>,
) -> Result<Vec<SkipRange>> {
    let bytes = match read {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(EdlError::Io {
                path: edl_path.to_path_buf(),
                source,
            })
        }
    };

    let content = String::from_utf8_lossy(&bytes);
    Ok(parse_edl(&content))
}
