#![warn(missing_docs)]
//! Treebench Core - Test Discovery and Process Runtime
//!
//! This crate provides the pieces that touch the filesystem and spawn processes:
//! - `TestTree` mirroring the resources directory
//! - Wall-clock timing of whole process runs
//! - `AdaptiveSampler` for budget-driven repetition counts
//! - `DifferentialComparator` for byte-exact stdout comparison

mod command;
mod compare;
mod measure;
mod sampler;
mod tree;

pub use command::{BoundCommand, CapturedOutput, CommandError, ProgramCommand};
pub use compare::{CompareError, DifferentialComparator, Verdict};
pub use measure::{Timer, time};
pub use sampler::{
    AdaptiveSampler, DEFAULT_MIN_SAMPLES, DEFAULT_TIME_BUDGET, SampleError, SampleSet,
    SamplerConfig, Workload,
};
pub use tree::{
    DirListing, RESERVED_NAME, TestTree, TreeError, leaf_name, relative_display, walk_resources,
};
