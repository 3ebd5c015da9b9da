//! Request path construction.

/// Join path segments with single slashes.
///
/// Leading and trailing slashes are trimmed from every segment and empty
/// segments are dropped, so the result never contains `//` and never starts
/// or ends with `/`.
pub fn join_path<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for segment in segments {
        let segment = segment.as_ref().trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push('/');
        }
        joined.push_str(segment);
    }
    joined
}
