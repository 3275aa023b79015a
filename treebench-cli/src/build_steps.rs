//! Build Steps
//!
//! Runs the `[[build]]` commands before discovery and tracks the executables
//! they leave behind. The [`ArtifactGuard`] removes every tracked file when it
//! is dropped, so cleanup happens on success, failure and early return alike.

use crate::config::BuildStep;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

/// Errors raised by build steps
#[derive(Debug, Error)]
pub enum BuildError {
    /// Step has an empty `command` list
    #[error("build step {index} has an empty command")]
    EmptyCommand {
        /// Position in the `[[build]]` list
        index: usize,
    },

    /// Step program could not be started
    #[error("build step {index} (`{program}`) failed to start: {source}")]
    Spawn {
        /// Position in the `[[build]]` list
        index: usize,
        /// Program name
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Step exited with a failure status
    #[error("build step {index} (`{program}`) exited with {status}")]
    Failed {
        /// Position in the `[[build]]` list
        index: usize,
        /// Program name
        program: String,
        /// Exit status as reported by the OS
        status: std::process::ExitStatus,
    },

    /// Artifact could not be moved into place
    #[error("failed to move {} to {}: {source}", .from.display(), .to.display())]
    Install {
        /// Produced artifact
        from: PathBuf,
        /// Requested destination
        to: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Removes tracked files on drop
#[derive(Debug, Default)]
pub struct ArtifactGuard {
    paths: Vec<PathBuf>,
}

impl ArtifactGuard {
    /// Create an empty guard
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `path` when the guard is dropped
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    /// Files that will be removed
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!("removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("failed to remove {}: {}", path.display(), e),
            }
        }
    }
}

/// Run build steps in order, tracking produced executables in `guard`.
///
/// Stops at the first failing step. Anything produced before the failure is
/// already tracked and is removed when the guard drops.
pub fn run_build_steps(steps: &[BuildStep], guard: &mut ArtifactGuard) -> Result<(), BuildError> {
    for (index, step) in steps.iter().enumerate() {
        let (program, args) = step
            .command
            .split_first()
            .ok_or(BuildError::EmptyCommand { index })?;

        tracing::info!("build step {}: {}", index, step.command.join(" "));

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| BuildError::Spawn {
                index,
                program: program.clone(),
                source,
            })?;

        if let Some(artifact) = &step.artifact {
            guard.track(artifact);
        }

        if !status.success() {
            return Err(BuildError::Failed {
                index,
                program: program.clone(),
                status,
            });
        }

        if let (Some(artifact), Some(target)) = (&step.artifact, &step.install_as) {
            install(artifact, target)?;
            guard.track(target);
        }
    }
    Ok(())
}

fn install(from: &Path, to: &Path) -> Result<(), BuildError> {
    std::fs::rename(from, to).map_err(|source| BuildError::Install {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;
    tracing::debug!("installed {} as {}", from.display(), to.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn step(command: &[&str], artifact: Option<&Path>, install_as: Option<&Path>) -> BuildStep {
        BuildStep {
            command: command.iter().map(|s| s.to_string()).collect(),
            artifact: artifact.map(Path::to_path_buf),
            install_as: install_as.map(Path::to_path_buf),
        }
    }

    #[test]
    fn test_guard_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("prog.out");
        fs::write(&file, "").unwrap();

        {
            let mut guard = ArtifactGuard::new();
            guard.track(&file);
            guard.track(&file);
            guard.track(dir.path().join("never-created"));
            assert_eq!(guard.paths().len(), 2);
        }

        assert!(!file.exists());
    }

    #[test]
    fn test_empty_command_rejected() {
        let mut guard = ArtifactGuard::new();
        let err = run_build_steps(&[step(&[], None, None)], &mut guard).unwrap_err();
        assert!(matches!(err, BuildError::EmptyCommand { index: 0 }));
    }

    #[test]
    fn test_missing_program_rejected() {
        let mut guard = ArtifactGuard::new();
        let err = run_build_steps(&[step(&["./no-such-build-tool-91ad"], None, None)], &mut guard)
            .unwrap_err();
        assert!(matches!(err, BuildError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_build_install_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("a.out");
        let installed = dir.path().join("prog.out");
        let script = format!("echo built > '{}'", artifact.display());

        {
            let mut guard = ArtifactGuard::new();
            run_build_steps(
                &[step(&["sh", "-c", &script], Some(&artifact), Some(&installed))],
                &mut guard,
            )
            .unwrap();

            assert!(!artifact.exists());
            assert_eq!(fs::read_to_string(&installed).unwrap(), "built\n");
        }

        assert!(!installed.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_step_stops_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.out");
        let script = format!("touch '{}'", first.display());
        let marker = dir.path().join("never.out");
        let never = format!("touch '{}'", marker.display());

        {
            let mut guard = ArtifactGuard::new();
            let err = run_build_steps(
                &[
                    step(&["sh", "-c", &script], Some(&first), None),
                    step(&["false"], None, None),
                    step(&["sh", "-c", &never], None, None),
                ],
                &mut guard,
            )
            .unwrap_err();

            assert!(matches!(err, BuildError::Failed { index: 1, .. }));
            assert!(first.exists());
        }

        assert!(!first.exists());
        assert!(!marker.exists());
    }
}
