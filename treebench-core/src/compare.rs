//! Differential Comparison
//!
//! Runs a reference implementation and the candidate on the same input and
//! declares PASS iff their standard output is byte-for-byte identical.
//! Standard error and exit codes are kept for diagnostics only.

use crate::command::{CapturedOutput, CommandError, ProgramCommand};
use std::path::Path;
use thiserror::Error;

/// Which side of a comparison failed to run
#[derive(Debug, Error)]
pub enum CompareError {
    /// Reference program could not be launched
    #[error("reference: {0}")]
    Reference(#[source] CommandError),

    /// Candidate program could not be launched
    #[error("candidate: {0}")]
    Candidate(#[source] CommandError),
}

/// Outcome of comparing two programs on one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether stdout matched exactly
    pub passed: bool,
    /// What the reference produced
    pub reference: CapturedOutput,
    /// What the candidate produced
    pub candidate: CapturedOutput,
}

impl Verdict {
    /// Decide from two captured outputs. Only stdout participates.
    pub fn from_outputs(reference: CapturedOutput, candidate: CapturedOutput) -> Self {
        Self {
            passed: reference.stdout == candidate.stdout,
            reference,
            candidate,
        }
    }

    /// Byte offset of the first stdout difference, if any.
    ///
    /// When one output is a prefix of the other this is the shorter length.
    pub fn first_difference(&self) -> Option<usize> {
        if self.passed {
            return None;
        }
        let a = &self.reference.stdout;
        let b = &self.candidate.stdout;
        a.iter()
            .zip(b.iter())
            .position(|(x, y)| x != y)
            .or(Some(a.len().min(b.len())))
    }
}

/// Runs reference then candidate and compares their stdout
#[derive(Debug, Clone)]
pub struct DifferentialComparator {
    reference: ProgramCommand,
    candidate: ProgramCommand,
}

impl DifferentialComparator {
    /// Create a comparator
    pub fn new(reference: ProgramCommand, candidate: ProgramCommand) -> Self {
        Self {
            reference,
            candidate,
        }
    }

    /// Reference command
    pub fn reference(&self) -> &ProgramCommand {
        &self.reference
    }

    /// Candidate command
    pub fn candidate(&self) -> &ProgramCommand {
        &self.candidate
    }

    /// Run both programs to completion on `input` and compare
    pub fn compare(&self, input: &Path) -> Result<Verdict, CompareError> {
        let reference = self
            .reference
            .run_captured(input)
            .map_err(CompareError::Reference)?;
        let candidate = self
            .candidate
            .run_captured(input)
            .map_err(CompareError::Candidate)?;

        let verdict = Verdict::from_outputs(reference, candidate);
        if !verdict.passed {
            tracing::debug!(
                input = %input.display(),
                offset = ?verdict.first_difference(),
                reference_code = ?verdict.reference.exit_code,
                candidate_code = ?verdict.candidate.exit_code,
                "stdout mismatch"
            );
        }
        Ok(verdict)
    }
}
