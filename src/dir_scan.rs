use crate::tree_builder::DirMapping;
use anyhow::{Result, bail};
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

/// Describe the directory at `root` as a [`DirMapping`], the same shape the
/// portal sends for a dataset. Entries are visited in file-name order so
/// repeated scans produce the same mapping.
pub fn scan_dir(root: &Path) -> Result<DirMapping> {
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let mut mapping = DirMapping::default();
    for result in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let dirent = match result {
            Ok(v) => v,
            Err(e) => {
                warn!("skipping entry during scan: {e}");
                continue;
            }
        };

        let Ok(rel) = dirent.path().strip_prefix(root) else {
            continue;
        };
        let mut components: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let Some(name) = components.pop() else {
            continue;
        };

        let parent = components
            .iter()
            .fold(&mut mapping, |node, dir| node.dirs.entry(dir.clone()).or_default());
        if dirent.file_type().is_dir() {
            parent.dirs.entry(name).or_default();
        } else {
            parent.files.push(name);
        }
    }
    Ok(mapping)
}
