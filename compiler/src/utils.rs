/// JSON string quoting, also valid as a JS string literal.
pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

/// Replaces the `.proto` extension (or appends one) with `extension`.
pub fn output_name(input: &str, extension: &str) -> String {
    let stem = input.strip_suffix(".proto").unwrap_or(input);
    format!("{}.{}", stem, extension)
}

/// Module specifier for importing `to` from `from`, both `/`-separated
/// output paths. The extension of `to` is dropped.
pub fn relative_import(from: &str, to: &str) -> String {
    let from_dirs: Vec<&str> = from.split('/').collect();
    let from_dirs = &from_dirs[..from_dirs.len() - 1];
    let to_parts: Vec<&str> = to.split('/').collect();
    let (to_dirs, to_file) = to_parts.split_at(to_parts.len() - 1);

    let common = from_dirs
        .iter()
        .zip(to_dirs.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    parts.extend(std::iter::repeat("..").take(from_dirs.len() - common));
    parts.extend(&to_dirs[common..]);

    let file = to_file[0];
    let file = file.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file);
    parts.push(file);

    let path = parts.join("/");
    if path.starts_with("..") {
        path
    } else {
        format!("./{}", path)
    }
}
