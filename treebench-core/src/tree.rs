//! Test Tree
//!
//! Mirrors the directory structure under a resources root. Each node owns the
//! test files directly inside its directory and one child per subdirectory.
//!
//! ```text
//! resources/               TestTree { leaves: [],        children: {a} }
//! └── a/                   TestTree { leaves: [x.test],  children: {b} }
//!     ├── x.test
//!     └── b/               TestTree { leaves: [y.test],  children: {} }
//!         └── y.test
//! ```

use regex::Regex;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Name that may not appear as a file or directory under the resources root
pub const RESERVED_NAME: &str = "__LEAF__";

/// Errors raised while discovering or building the test tree
#[derive(Debug, Error)]
pub enum TreeError {
    /// A file or directory uses the reserved leaf marker name
    #[error("`__LEAF__` is a reserved name and cannot be used for {}", .path.display())]
    ReservedName {
        /// Offending path
        path: PathBuf,
    },

    /// A listed directory does not live under the root
    #[error("{} is not inside the resources root {}", .path.display(), .root.display())]
    OutsideRoot {
        /// Offending path
        path: PathBuf,
        /// Expected root
        root: PathBuf,
    },

    /// A directory name cannot be used as a node name
    #[error("path segment in {} is not valid UTF-8", .path.display())]
    NonUtf8 {
        /// Offending path
        path: PathBuf,
    },

    /// Root directory is absent
    #[error("resources root {} does not exist or is not a directory", .0.display())]
    MissingRoot(PathBuf),

    /// Filesystem error during the walk
    #[error("failed to walk resources: {0}")]
    Walk(#[from] walkdir::Error),
}

/// One directory and the files directly inside it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirListing {
    /// Directory path (includes the root prefix)
    pub dir: PathBuf,
    /// Files directly in `dir`, as paths including `dir`
    pub files: Vec<PathBuf>,
}

/// Walk `root` recursively and list every directory with its files.
///
/// Entries are visited in file-name order, so the listing (and the tree built
/// from it) is stable for a fixed filesystem snapshot. Links are not followed,
/// and a symlink pointing at a directory is skipped rather than run as a test.
pub fn walk_resources(root: &Path) -> Result<Vec<DirListing>, TreeError> {
    if !root.is_dir() {
        return Err(TreeError::MissingRoot(root.to_path_buf()));
    }

    let mut listings: Vec<DirListing> = Vec::new();
    let mut index: HashMap<PathBuf, usize> = HashMap::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path().to_path_buf();

        // The root itself may be a link; walkdir follows it
        if entry.depth() > 0 && entry.path_is_symlink() && path.is_dir() {
            tracing::debug!("skipping directory symlink {}", path.display());
            continue;
        }

        if entry.file_type().is_dir() {
            index.insert(path.clone(), listings.len());
            listings.push(DirListing {
                dir: path,
                files: Vec::new(),
            });
            continue;
        }

        // Parents are always yielded before their contents
        if let Some(&slot) = path.parent().and_then(|parent| index.get(parent)) {
            listings[slot].files.push(path);
        }
    }

    Ok(listings)
}

/// Recursive test tree node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestTree {
    leaves: Vec<PathBuf>,
    children: BTreeMap<String, TestTree>,
}

impl TestTree {
    /// Build a tree from directory listings taken under `root`.
    ///
    /// Children are created lazily and reused when a later listing walks
    /// through the same directory again.
    pub fn from_listing<I>(root: &Path, listing: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = DirListing>,
    {
        let mut tree = TestTree::default();

        for DirListing { dir, files } in listing {
            let relative = dir.strip_prefix(root).map_err(|_| TreeError::OutsideRoot {
                path: dir.clone(),
                root: root.to_path_buf(),
            })?;

            let mut node = &mut tree;
            for component in relative.components() {
                let segment = match component {
                    Component::Normal(segment) => segment,
                    Component::CurDir => continue,
                    _ => {
                        return Err(TreeError::OutsideRoot {
                            path: dir.clone(),
                            root: root.to_path_buf(),
                        });
                    }
                };
                let name = segment
                    .to_str()
                    .ok_or_else(|| TreeError::NonUtf8 { path: dir.clone() })?;
                check_reserved(name, &dir)?;
                node = node.children.entry(name.to_string()).or_default();
            }

            // Leaf names only need to be runnable paths, not UTF-8
            for file in files {
                if file.file_name() == Some(OsStr::new(RESERVED_NAME)) {
                    return Err(TreeError::ReservedName { path: file });
                }
                node.leaves.push(file);
            }
        }

        Ok(tree)
    }

    /// Walk `root` and build its tree
    pub fn discover(root: &Path) -> Result<Self, TreeError> {
        let listing = walk_resources(root)?;
        Self::from_listing(root, listing)
    }

    /// Test files directly in this directory
    pub fn leaves(&self) -> &[PathBuf] {
        &self.leaves
    }

    /// Subdirectories in traversal order
    pub fn children(&self) -> impl Iterator<Item = (&str, &TestTree)> {
        self.children.iter().map(|(name, child)| (name.as_str(), child))
    }

    /// Child node by name
    pub fn child(&self, name: &str) -> Option<&TestTree> {
        self.children.get(name)
    }

    /// True when this node has no leaves and no children
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty() && self.children.is_empty()
    }

    /// Total number of test files in this subtree
    pub fn leaf_count(&self) -> usize {
        self.leaves.len() + self.children.values().map(TestTree::leaf_count).sum::<usize>()
    }

    /// Number of directory nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.values().map(TestTree::node_count).sum::<usize>()
    }

    /// Levels of subdirectories below this node (0 for a node without children)
    pub fn depth(&self) -> usize {
        self.children
            .values()
            .map(|child| 1 + child.depth())
            .max()
            .unwrap_or(0)
    }

    /// Keep only leaves whose root-relative path matches `pattern`,
    /// dropping directories left without any tests.
    pub fn filter(&self, root: &Path, pattern: &Regex) -> TestTree {
        let leaves = self
            .leaves
            .iter()
            .filter(|leaf| pattern.is_match(&relative_display(root, leaf)))
            .cloned()
            .collect();

        let children = self
            .children
            .iter()
            .map(|(name, child)| (name.clone(), child.filter(root, pattern)))
            .filter(|(_, child)| child.leaf_count() > 0)
            .collect();

        TestTree { leaves, children }
    }
}

/// File name used to label a leaf in reports
pub fn leaf_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `path` relative to `root`, with `/` separators on every platform
pub fn relative_display(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn check_reserved(name: &str, path: &Path) -> Result<(), TreeError> {
    if name == RESERVED_NAME {
        return Err(TreeError::ReservedName {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
