use serde::Serialize;

/// A workspace folder URI decoded for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayPath {
    pub full_path: String,
    /// Last two path segments joined by `\`.
    pub short_path: String,
}

/// Decodes the handful of escapes the editor writes into folder URIs and
/// strips the `file:///` scheme.
pub fn normalize_path(file_path: &str) -> DisplayPath {
    let full_path = file_path
        .strip_prefix("file:///")
        .unwrap_or(file_path)
        .replace("%3A", ":")
        .replace("%2F", "/")
        .replace("%5C", "\\")
        .replace("%20", " ");

    let mut tail: Vec<&str> = full_path.rsplit(['/', '\\']).take(2).collect();
    tail.reverse();
    let short_path = tail.join("\\");

    DisplayPath {
        full_path,
        short_path,
    }
}
