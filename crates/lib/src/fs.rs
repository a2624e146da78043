use camino::{Utf8Path, Utf8PathBuf};

pub fn path_has_extensions<S: AsRef<str>>(path: &Utf8Path, extensions: &[S]) -> bool {
    path.extension()
        .is_some_and(|ext| extensions.iter().any(|e| e.as_ref() == ext))
}

/// Files directly inside `dir` with one of `extensions`, sorted by path.
pub fn files_with_extensions<S: AsRef<str>>(
    dir: &Utf8Path,
    extensions: &[S],
) -> Result<Vec<Utf8PathBuf>, std::io::Error> {
    let mut paths = Vec::new();
    for entry in dir.read_dir_utf8()? {
        let path = entry?.into_path();
        if path.is_file() && path_has_extensions(&path, extensions) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
