use std::fmt;
use std::time::Duration;

/// A half-open segment `[start, end)` of a media file to jump past.
///
/// Bounds are whole seconds. `start < end` is expected but not enforced; an
/// inverted or empty range simply never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SkipRange {
    pub start: Duration,
    pub end: Duration,
}

impl SkipRange {
    pub fn from_secs(start: u64, end: u64) -> Self {
        Self {
            start: Duration::from_secs(start),
            end: Duration::from_secs(end),
        }
    }

    /// Whether `position`, truncated to whole seconds, lies inside the range.
    pub fn contains(&self, position: Duration) -> bool {
        let position = Duration::from_secs(position.as_secs());
        self.start <= position && position < self.end
    }
}

impl fmt::Display for SkipRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s-{}s", self.start.as_secs(), self.end.as_secs())
    }
}

/// First range in file order containing `position`.
///
/// Overlapping ranges are not validated; the earliest one wins.
pub fn find_active_range(ranges: &[SkipRange], position: Duration) -> Option<&SkipRange> {
    ranges.iter().find(|range| range.contains(position))
}
