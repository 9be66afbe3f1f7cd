use crate::error::BotResult;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Replace the contents of `path` by writing a sibling temp file and
/// renaming it over the target. Parent directories are created.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> BotResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, contents).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

/// Read a file, treating a missing file as `None`
pub async fn read_optional(path: &Path) -> BotResult<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("state"));
    name.push(".tmp");
    path.with_file_name(name)
}
