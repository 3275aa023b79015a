//! Test Executor
//!
//! Runs every leaf of a test plan and prints the outline as it goes.
//!
//! ## Pipeline Overview
//!
//! ```text
//! TestTree (from planner)
//!       │
//!       ▼
//! ┌─────────────┐
//! │   report    │  Depth-first walk, one line per node
//! └──────┬──────┘
//!        │ per leaf
//!        ▼
//! ┌─────────────┐
//! │  execution  │  Compare outputs, sample timings, summarize
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Colour or plain tags
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Leaf runners (harness and list-only)
//! - [`report`] - Tree traversal and line layout
//! - [`formatting`] - Label styles and colour selection

mod execution;
mod formatting;
mod report;

// Re-export public API
pub use execution::{
    ExecutionConfig, HarnessRunner, LeafError, LeafOutcome, LeafRunner, LeafStatus, ListRunner,
};
pub use formatting::{
    AnsiStyle, ColorChoice, NO_COLOR_ENV, PlainStyle, Style, no_color_requested, select_style,
};
pub use report::{BRANCH, INDENT, RunTally, TreeReporter};
