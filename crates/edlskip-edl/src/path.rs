use std::path::PathBuf;

const EDL_EXTENSION: &str = ".edl";

/// Compute the sidecar EDL path for a media file.
///
/// The extension is everything after the last `.` in the final path
/// component. Both `/` and `\` count as separators, since hosts may report
/// Windows paths. A file without an extension gets `.edl` appended.
pub fn resolve_edl_path(media_path: &str) -> PathBuf {
    let name_start = media_path
        .rfind(['/', '\\'])
        .map(|idx| idx + 1)
        .unwrap_or(0);

    let stem_end = media_path[name_start..]
        .rfind('.')
        .map(|idx| name_start + idx)
        .unwrap_or(media_path.len());

    let mut edl = String::with_capacity(stem_end + EDL_EXTENSION.len());
    edl.push_str(&media_path[..stem_end]);
    edl.push_str(EDL_EXTENSION);
    PathBuf::from(edl)
}
