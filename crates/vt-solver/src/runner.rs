//! Timed solver subprocess execution.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};
use vt_types::TrialError;

/// Runs a solver binary against one fixed problem file.
///
/// Each call spawns a fresh subprocess; the runner itself holds no solver
/// state, so one runner can serve many concurrent trials.
#[derive(Debug, Clone)]
pub struct SolverRunner {
    binary: PathBuf,
    problem: PathBuf,
    time_budget: Duration,
}

/// How one timed solver invocation ended.
///
/// `Failed` and `TimedOut` are distinguished here for diagnostics, but both
/// score as the penalty value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    /// Exit code zero within the time budget.
    Solved { elapsed: Duration },
    /// Non-zero exit within the time budget.
    Failed { exit_code: Option<i32> },
    /// The time budget elapsed; the subprocess was killed.
    TimedOut,
}

impl TrialOutcome {
    /// The optimizer-facing score: elapsed seconds on success, the full time
    /// budget otherwise. Lower is better.
    pub fn score(&self, time_budget: Duration) -> f64 {
        match self {
            Self::Solved { elapsed } => elapsed.as_secs_f64(),
            Self::Failed { .. } | Self::TimedOut => time_budget.as_secs_f64(),
        }
    }
}

impl SolverRunner {
    pub fn new(
        binary: impl Into<PathBuf>,
        problem: impl Into<PathBuf>,
        time_budget: Duration,
    ) -> Self {
        Self {
            binary: binary.into(),
            problem: problem.into(),
            time_budget,
        }
    }

    pub fn time_budget(&self) -> Duration {
        self.time_budget
    }

    /// Run one timed trial: `<binary> [options...] --random-seed <seed> <problem>`.
    ///
    /// Returns an error only when the subprocess cannot be spawned or waited
    /// on at all; timeouts and solver failures are ordinary outcomes.
    pub async fn run_trial(
        &self,
        options: &[String],
        seed: u64,
    ) -> Result<TrialOutcome, TrialError> {
        let mut command = Command::new(&self.binary);
        command
            .args(options)
            .arg("--random-seed")
            .arg(seed.to_string())
            .arg(&self.problem)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = command.spawn().map_err(|e| self.spawn_error(e))?;

        match timeout(self.time_budget, child.wait()).await {
            Ok(Ok(status)) => {
                let elapsed = start.elapsed();
                if status.success() {
                    debug!(seed, ?elapsed, "trial solved");
                    Ok(TrialOutcome::Solved { elapsed })
                } else {
                    debug!(seed, code = ?status.code(), "trial failed");
                    Ok(TrialOutcome::Failed {
                        exit_code: status.code(),
                    })
                }
            }
            Ok(Err(e)) => Err(TrialError::WaitFailed {
                message: e.to_string(),
            }),
            Err(_) => {
                // Over budget: terminate and reap before reporting.
                if let Err(e) = child.kill().await {
                    warn!(seed, error = %e, "failed to kill timed-out solver");
                }
                debug!(seed, budget = ?self.time_budget, "trial timed out");
                Ok(TrialOutcome::TimedOut)
            }
        }
    }

    /// Run the solver once in model-producing mode and capture its output.
    ///
    /// Unlike [`run_trial`](Self::run_trial), a non-zero exit here is an
    /// error carrying the solver's stderr: this is the interactive path, not
    /// the scored one.
    pub async fn solve(&self, options: &[String]) -> Result<String, TrialError> {
        let output = Command::new(&self.binary)
            .args(options)
            .arg("--produce-models")
            .arg(&self.problem)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(TrialError::SolverFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }

    fn spawn_error(&self, e: std::io::Error) -> TrialError {
        if e.kind() == std::io::ErrorKind::NotFound {
            TrialError::BinaryNotFound {
                binary: self.binary.to_string_lossy().into_owned(),
            }
        } else {
            TrialError::SpawnFailed {
                message: e.to_string(),
            }
        }
    }
}
