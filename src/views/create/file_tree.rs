use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use super::PendingFile;

/// Expands one dropped path into upload entries. A file yields itself under
/// its own name; a directory yields every file beneath it, named relative
/// to the directory's parent (`docs/readme.txt`).
pub(super) fn collect_dropped(path: &Path) -> Result<Vec<PendingFile>> {
    let name = entry_name(path)?;
    let meta = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;

    let mut out = Vec::new();
    if meta.is_dir() {
        walk_dir(path, &name, &mut out)?;
    } else if meta.is_file() {
        out.push(PendingFile {
            relative_path: name,
            source: path.to_path_buf(),
        });
    }
    Ok(out)
}

fn walk_dir(dir: &Path, prefix: &str, out: &mut Vec<PendingFile>) -> Result<()> {
    for child in read_dir_sorted(dir)? {
        let path = child.path();
        let name = child
            .file_name()
            .into_string()
            .map_err(|_| anyhow!("non-utf8 filename in {}", dir.display()))?;
        let relative = format!("{}/{}", prefix, name);

        let file_type = child.file_type().context("read file type")?;
        if file_type.is_dir() {
            walk_dir(&path, &relative, out)?;
        } else if file_type.is_file()
            || (file_type.is_symlink() && fs::metadata(&path).is_ok_and(|m| m.is_file()))
        {
            out.push(PendingFile {
                relative_path: relative,
                source: path,
            });
        }
    }
    Ok(())
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let mut entries: Vec<fs::DirEntry> = fs::read_dir(dir)
        .with_context(|| format!("read dir {}", dir.display()))?
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("collect dir entries for {}", dir.display()))?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn entry_name(path: &Path) -> Result<String> {
    path.file_name()
        .ok_or_else(|| anyhow!("{} has no file name", path.display()))?
        .to_str()
        .map(ToString::to_string)
        .ok_or_else(|| anyhow!("non-utf8 filename {}", path.display()))
}
