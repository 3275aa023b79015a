//! Test Planner
//!
//! Builds the test tree for a resources root and applies the optional filter.
//!
//! Filtering options:
//! - Regex pattern matching on the root-relative test path (e.g. `arith/add.lisp`)
//!
//! Ordering: the tree iterates children by name and leaves in walk order, so
//! the execution order is deterministic for a given directory snapshot.

use regex::Regex;
use std::path::{Path, PathBuf};
use treebench_core::{TestTree, TreeError};

/// Execution plan for one resources root
#[derive(Debug, Clone)]
pub struct TestPlan {
    /// Root directory the leaf paths live under
    pub root: PathBuf,
    /// Label printed for the root (its directory name)
    pub root_name: String,
    /// Tests to run
    pub tree: TestTree,
}

impl TestPlan {
    /// Number of tests in the plan
    pub fn leaf_count(&self) -> usize {
        self.tree.leaf_count()
    }
}

/// Discover tests under `root` and keep those matching `filter`
pub fn build_plan(root: &Path, filter: Option<&Regex>) -> Result<TestPlan, TreeError> {
    let tree = TestTree::discover(root)?;
    Ok(plan_from_tree(root, tree, filter))
}

/// Wrap an already built tree in a plan
pub fn plan_from_tree(root: &Path, tree: TestTree, filter: Option<&Regex>) -> TestPlan {
    let tree = match filter {
        Some(re) => tree.filter(root, re),
        None => tree,
    };

    TestPlan {
        root: root.to_path_buf(),
        root_name: root_label(root),
        tree,
    }
}

/// Directory name of `root`, falling back to the path as written
pub fn root_label(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}
