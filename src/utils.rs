use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

/// Deserializes an explicit `null` the same as a missing key.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parses a YAML document, returning `None` when it carries no content: blank, only comments,
/// or a bare `---` / `null`.
pub fn parse_document<T: DeserializeOwned>(content: &str) -> Result<Option<T>, serde_yaml::Error> {
    let blank = content.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    });
    if blank {
        return Ok(None);
    }
    serde_yaml::from_str(content)
}

/// Reads `path` to a string, mapping a missing file to `None`.
pub fn read_optional(path: &Path) -> Result<Option<String>, io::Error> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Replaces the file at `path` with `contents` through a temp file in the same directory
/// followed by a rename, so readers observe either the old or the new file, never a mix.
///
/// Symlinks are followed so the link itself survives, and the permissions of an existing
/// target are carried over to the replacement.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), io::Error> {
    let target = resolve_target(path)?;
    let dir = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    if let Ok(meta) = fs::metadata(&target) {
        fs::set_permissions(tmp.path(), meta.permissions())?;
    }
    tmp.persist(&target).map_err(|err| err.error)?;

    // directory fsync is best effort; not every platform allows opening a directory
    if let Ok(dir) = fs::File::open(&dir) {
        let _ = dir.sync_all();
    }
    Ok(())
}

fn resolve_target(path: &Path) -> Result<PathBuf, io::Error> {
    match fs::canonicalize(path) {
        Ok(resolved) => Ok(resolved),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(err) => Err(err),
    }
}
