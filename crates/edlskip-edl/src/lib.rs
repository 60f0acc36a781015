//! Edlskip-EDL: sidecar Edit Decision List handling.
//!
//! An EDL sidecar lives next to a media file (same stem, `.edl` extension)
//! and lists segments to skip, one `start end` pair of seconds per line.
//!
//! - **Path resolution**: [`resolve_edl_path`] maps a media path to its sidecar
//! - **Parsing**: [`parse_edl`] and [`load_skip_ranges`] turn sidecar text into
//!   [`SkipRange`] values in file order
//! - **Matching**: [`find_active_range`] picks the first range containing a
//!   playback position
//!
//! # Examples
//!
//! ```
//! use edlskip_edl::{find_active_range, parse_edl, resolve_edl_path};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! assert_eq!(resolve_edl_path("/movies/foo.mkv"), Path::new("/movies/foo.edl"));
//!
//! let ranges = parse_edl("60 180\n300 330\n");
//! let active = find_active_range(&ranges, Duration::from_secs(90)).unwrap();
//! assert_eq!(active.end, Duration::from_secs(180));
//! ```

pub mod error;
pub mod parse;
pub mod path;
pub mod range;

pub use error::{EdlError, Result};
pub use parse::{load_skip_ranges, parse_edl, parse_edl_read, parse_line};
pub use path::resolve_edl_path;
pub use range::{find_active_range, SkipRange};
