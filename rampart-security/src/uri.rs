//! URI path normalization.

/// Collapse repeated separators and resolve `.` and `..` segments.
///
/// Only the path is touched; a query string or fragment is kept verbatim.
/// Leading and trailing separators survive, `..` never climbs above the
/// root, and segments made only of dots are dropped.
pub fn normalize_path(uri: &str) -> String {
    let split_at = uri.find(['?', '#']).unwrap_or(uri.len());
    let (path, suffix) = uri.split_at(split_at);

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" => {}
            ".." => {
                segments.pop();
            }
            s if s.chars().all(|c| c == '.') => {}
            s => segments.push(s),
        }
    }

    let mut out = String::with_capacity(uri.len());
    if path.starts_with('/') {
        out.push('/');
    }
    out.push_str(&segments.join("/"));
    if path.ends_with('/') && !segments.is_empty() {
        out.push('/');
    }
    out.push_str(suffix);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_segments() {
        assert_eq!(normalize_path("/a/../b//c"), "/b/c");
        assert_eq!(normalize_path("/a/b/../../c"), "/c");
        assert_eq!(normalize_path("/../../etc/passwd"), "/etc/passwd");
    }

    #[test]
    fn test_dot_segments() {
        assert_eq!(normalize_path("/a/./b/.../c"), "/a/b/c");
        assert_eq!(normalize_path("./a"), "a");
    }

    #[test]
    fn test_slashes() {
        assert_eq!(normalize_path("//a///b/"), "/a/b/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("///"), "/");
        assert_eq!(normalize_path(""), "");
    }

    #[test]
    fn test_query_untouched() {
        assert_eq!(normalize_path("/a//b?next=/x/../y"), "/a/b?next=/x/../y");
        assert_eq!(normalize_path("/a/./#frag//x"), "/a/#frag//x");
    }

    #[test]
    fn test_idempotent() {
        for uri in ["/a/../b//c", "a/b/./", "/x/y/../../..", "rel//path"] {
            let once = normalize_path(uri);
            assert_eq!(normalize_path(&once), once);
        }
    }
}
