//! Subprocess management for solver plugins.
//!
//! Spawns a solver binary, writes the problem to its stdin as JSON, and reads
//! the solution back from stdout. Blocking only: the orchestrator runs one
//! request at a time and has no use for an async runtime here.

use crate::error::{ExitCode, SolverError, SolverResult};
use crate::problem::LpProblem;
use crate::solution::LpSolution;
use crate::SolverId;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// A solver subprocess handle: a resolved binary path plus the wall-clock
/// budget the orchestrator is willing to spend on one solve.
pub struct SolverProcess {
    solver_id: SolverId,
    binary_path: PathBuf,
    timeout_seconds: u64,
}

impl SolverProcess {
    pub fn new(solver_id: SolverId, binary_path: PathBuf, timeout_seconds: u64) -> Self {
        SolverProcess {
            solver_id,
            binary_path,
            timeout_seconds,
        }
    }

    /// Locate a solver binary.
    ///
    /// Search order: `~/.retrofit/solvers/<binary_name>`, then `PATH`.
    pub fn find_binary(solver_id: SolverId) -> SolverResult<PathBuf> {
        let binary_name = solver_id.binary_name();

        if let Some(home) = dirs::home_dir() {
            let candidate = home.join(".retrofit").join("solvers").join(binary_name);
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        if let Ok(path) = which::which(binary_name) {
            return Ok(path);
        }

        Err(SolverError::NotInstalled {
            solver: solver_id,
            binary: binary_name.to_string(),
        })
    }

    pub fn solver_id(&self) -> SolverId {
        self.solver_id
    }

    pub fn binary_path(&self) -> &PathBuf {
        &self.binary_path
    }

    /// Run the solver subprocess to completion, enforcing `timeout_seconds`
    /// as a hard wall-clock bound.
    ///
    /// The subprocess is killed (not merely abandoned) if the bound is
    /// exceeded, and the caller receives [`SolverError::Timeout`] rather than
    /// a partial solution — a timed-out solve is never silently treated as
    /// infeasible.
    pub fn solve_blocking(&self, problem: &LpProblem) -> SolverResult<LpSolution> {
        let start = Instant::now();

        let problem_bytes =
            serde_json::to_vec(problem).map_err(|e| SolverError::Ipc(e.to_string()))?;

        let mut child = Command::new(&self.binary_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(SolverError::ProcessStart)?;

        let mut stdin = child.stdin.take().expect("stdin was piped");
        stdin
            .write_all(&problem_bytes)
            .map_err(|e| SolverError::Ipc(format!("failed to write problem: {e}")))?;
        drop(stdin);

        let timeout = if self.timeout_seconds > 0 {
            Duration::from_secs(self.timeout_seconds)
        } else {
            Duration::from_secs(problem.timeout_seconds.max(1))
        };

        let poll_interval = Duration::from_millis(25);
        let status = loop {
            if let Some(status) = child.try_wait().map_err(SolverError::ProcessStart)? {
                break status;
            }
            if start.elapsed() >= timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SolverError::Timeout {
                    seconds: self.timeout_seconds,
                });
            }
            std::thread::sleep(poll_interval);
        };

        let elapsed = start.elapsed();
        let exit_code = ExitCode::from_raw(status.code().unwrap_or(-1));

        let mut stdout_bytes = Vec::new();
        child
            .stdout
            .take()
            .expect("stdout was piped")
            .read_to_end(&mut stdout_bytes)
            .map_err(|e| SolverError::Ipc(format!("failed to read solution: {e}")))?;

        if !exit_code.is_success() {
            let mut stderr_bytes = Vec::new();
            let _ = child
                .stderr
                .take()
                .expect("stderr was piped")
                .read_to_end(&mut stderr_bytes);
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(SolverError::ProcessFailed {
                exit_code,
                message: stderr.to_string(),
            });
        }

        if stdout_bytes.is_empty() {
            return Err(SolverError::Ipc("empty solution from solver".to_string()));
        }

        let mut solution: LpSolution = serde_json::from_slice(&stdout_bytes)
            .map_err(|e| SolverError::Ipc(format!("failed to parse solution: {e}")))?;

        if solution.solve_time_ms == 0 {
            solution.solve_time_ms = elapsed.as_millis() as u64;
        }

        Ok(solution)
    }
}

/// Whether a solver binary can currently be located.
pub fn is_solver_installed(solver_id: SolverId) -> bool {
    SolverProcess::find_binary(solver_id).is_ok()
}

/// All solver ids with a resolvable binary, in priority order (HiGHS first).
pub fn list_installed_solvers() -> Vec<SolverId> {
    [SolverId::Highs, SolverId::Cbc]
        .into_iter()
        .filter(|&id| is_solver_installed(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_binary_fails_closed_for_unknown_binary() {
        let result = SolverProcess::find_binary(SolverId::Highs);
        // CI has neither ~/.retrofit/solvers nor a PATH entry for this binary.
        if let Err(e) = result {
            assert!(matches!(e, SolverError::NotInstalled { .. }));
        }
    }

    #[test]
    fn list_installed_solvers_never_panics() {
        let _ = list_installed_solvers();
    }
}
