use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::{unify_path, SearchError, SearchResult};
use crate::filters::{has_accepted_extension, ExtensionSet, IgnoreSet};

/// Recursive directory walk producing the files to search.
///
/// Every directory is entered, hidden ones included, and no ignore files are
/// honored. Symlinked directories are not entered; a symlink to a regular
/// file is yielded under its own path.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    accepted: Option<ExtensionSet>,
    ignore: IgnoreSet,
}

impl TreeWalker {
    /// Validates `root` and resolves it to an absolute path
    pub fn new(
        root: &Path,
        accepted: Option<ExtensionSet>,
        ignore: IgnoreSet,
    ) -> SearchResult<Self> {
        if !root.exists() {
            return Err(SearchError::file_not_found(root));
        }
        if !root.is_dir() {
            return Err(SearchError::not_a_directory(root));
        }

        let root = unify_path(root);
        debug!(
            "Walking {} (extensions: {})",
            root.display(),
            accepted
                .as_ref()
                .map_or_else(|| "all".to_string(), |set| set.to_sorted_vec().join(","))
        );

        Ok(Self {
            root,
            accepted,
            ignore,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily yields accepted file paths
    pub fn files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        let mut builder = WalkBuilder::new(&self.root);
        builder.standard_filters(false).follow_links(false);

        builder
            .build()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    None
                }
            })
            .filter(|entry| {
                entry.file_type().is_some_and(|ft| {
                    ft.is_file() || (ft.is_symlink() && entry.path().is_file())
                })
            })
            .map(|entry| entry.into_path())
            .filter(move |path| {
                has_accepted_extension(path, self.accepted.as_ref())
                    && !self.ignore.should_ignore(path, &self.root)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn names(walker: &TreeWalker) -> Vec<String> {
        let mut names: Vec<String> = walker
            .files()
            .map(|p| {
                p.strip_prefix(walker.root())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        names.sort();
        names
    }

    fn tree() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested/deeper")).unwrap();
        fs::create_dir_all(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("B.TXT"), "b").unwrap();
        fs::write(dir.path().join("nested/c.log"), "c").unwrap();
        fs::write(dir.path().join("nested/deeper/d.xlsx"), "d").unwrap();
        fs::write(dir.path().join(".hidden/e.txt"), "e").unwrap();
        fs::write(dir.path().join(".gitignore"), "*.txt\n").unwrap();
        dir
    }

    #[test]
    fn test_walks_everything() {
        let dir = tree();
        let walker = TreeWalker::new(dir.path(), None, IgnoreSet::default()).unwrap();
        assert_eq!(
            names(&walker),
            vec![
                ".gitignore",
                ".hidden/e.txt",
                "B.TXT",
                "a.txt",
                "nested/c.log",
                "nested/deeper/d.xlsx"
            ]
        );
        assert!(walker.files().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_extension_filter() {
        let dir = tree();
        let accepted: ExtensionSet = [".txt", ".xlsx"].into_iter().collect();
        let walker = TreeWalker::new(dir.path(), Some(accepted), IgnoreSet::default()).unwrap();
        assert_eq!(
            names(&walker),
            vec![".hidden/e.txt", "B.TXT", "a.txt", "nested/deeper/d.xlsx"]
        );
    }

    #[test]
    fn test_ignore_globs() {
        let dir = tree();
        let ignore = IgnoreSet::new(&["nested/**".to_string()]).unwrap();
        let walker = TreeWalker::new(dir.path(), None, ignore).unwrap();
        assert!(names(&walker).iter().all(|n| !n.starts_with("nested/")));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_symlinks_are_yielded() {
        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("real.txt"), "a").unwrap();
        fs::write(outside.path().join("target.txt"), "b").unwrap();
        std::os::unix::fs::symlink(outside.path().join("target.txt"), dir.path().join("link.txt"))
            .unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("sub/linked_dir")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("dangling.txt"))
            .unwrap();

        let walker = TreeWalker::new(dir.path(), None, IgnoreSet::default()).unwrap();
        assert_eq!(names(&walker), vec!["link.txt", "real.txt"]);
    }

    #[test]
    fn test_invalid_roots() {
        let dir = tree();
        let err = TreeWalker::new(&dir.path().join("missing"), None, IgnoreSet::default())
            .unwrap_err();
        assert!(matches!(err, SearchError::FileNotFound(_)));

        let err = TreeWalker::new(&dir.path().join("a.txt"), None, IgnoreSet::default())
            .unwrap_err();
        assert!(matches!(err, SearchError::NotADirectory(_)));
    }
}
