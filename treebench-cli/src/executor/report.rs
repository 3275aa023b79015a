//! Outline Reporter
//!
//! Walks the test tree depth-first and prints one line per node:
//!
//! ```text
//! resources
//!   └ x.test 0.012 ± 0.001 seconds (n=11)
//!   └ a
//!     └ y.test 0.010 ± 0.002 seconds (n=12)
//!     └ b
//!       └ z.test 0.011 ± 0.001 seconds (n=9)
//! ```
//!
//! At every node the direct leaves come first, then each child directory.
//! Lines are flushed as soon as they are written, so progress is visible
//! while long tests run.

use super::execution::{LeafRunner, LeafStatus};
use super::formatting::Style;
use std::io::{self, Write};
use treebench_core::{TestTree, leaf_name};
use treebench_stats::StatsConfig;

/// One indentation level
pub const INDENT: &str = "  ";

/// Prefix placed before every non-root label
pub const BRANCH: &str = "\u{2514} ";

/// Counts gathered while reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    /// Leaves visited
    pub leaves: usize,
    /// Directories visited, including the root
    pub directories: usize,
    /// Differential comparisons that matched
    pub passed: usize,
    /// Differential comparisons that differed
    pub failed: usize,
    /// Leaves that could not be measured
    pub errored: usize,
}

impl RunTally {
    /// Whether the run should exit successfully
    pub fn is_success(&self, fail_on_mismatch: bool) -> bool {
        self.errored == 0 && !(fail_on_mismatch && self.failed > 0)
    }
}

/// Writes the outline for a test tree
pub struct TreeReporter<'a, W: Write> {
    out: W,
    style: &'a dyn Style,
    stats: StatsConfig,
}

impl<'a, W: Write> TreeReporter<'a, W> {
    /// Create a reporter writing to `out`
    pub fn new(out: W, style: &'a dyn Style, stats: StatsConfig) -> Self {
        Self { out, style, stats }
    }

    /// Print `tree` under the label `root_name`, running each leaf with `runner`
    pub fn report<R>(
        &mut self,
        root_name: &str,
        tree: &TestTree,
        runner: &mut R,
    ) -> io::Result<RunTally>
    where
        R: LeafRunner + ?Sized,
    {
        let mut tally = RunTally::default();
        let label = self.style.directory(root_name);
        self.line(None, &label)?;
        self.visit(tree, 0, runner, &mut tally)?;
        Ok(tally)
    }

    /// Give back the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn visit<R>(
        &mut self,
        node: &TestTree,
        depth: usize,
        runner: &mut R,
        tally: &mut RunTally,
    ) -> io::Result<()>
    where
        R: LeafRunner + ?Sized,
    {
        tally.directories += 1;

        for leaf in node.leaves() {
            let name = leaf_name(leaf);
            tracing::debug!("running {}", leaf.display());
            let outcome = runner.run_leaf(leaf);

            tally.leaves += 1;
            match outcome.verdict {
                Some(true) => tally.passed += 1,
                Some(false) => tally.failed += 1,
                None => {}
            }

            let text = match &outcome.status {
                LeafStatus::Measured(summary) => format!(
                    "{} {}",
                    self.style.leaf(&name, outcome.verdict),
                    summary.display(self.stats.time_unit, self.stats.round_digits)
                ),
                LeafStatus::Errored(e) => {
                    tally.errored += 1;
                    tracing::debug!("{} failed: {:?}", leaf.display(), e);
                    self.style.error(&name, outcome.verdict, &e.to_string())
                }
                LeafStatus::Listed => self.style.leaf(&name, outcome.verdict),
            };
            self.line(Some(depth), &text)?;
        }

        for (name, child) in node.children() {
            let label = self.style.directory(name);
            self.line(Some(depth), &label)?;
            self.visit(child, depth + 1, runner, tally)?;
        }

        Ok(())
    }

    /// `None` is the unindented root line
    fn line(&mut self, depth: Option<usize>, text: &str) -> io::Result<()> {
        if let Some(depth) = depth {
            for _ in 0..=depth {
                self.out.write_all(INDENT.as_bytes())?;
            }
            self.out.write_all(BRANCH.as_bytes())?;
        }
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }
}
