//! The optimization loop: suggest, evaluate concurrently, report, repeat.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{info, warn};
use vt_types::{OptimizeError, TunerResult};

use crate::search::{BayesianSearch, ParameterValue, RandomSearch, SearchStrategy};
use crate::trial::{
    OptimizationConfig, OptimizationStatus, Trial, TrialResult,
};

/// The scoring function an optimization run evaluates.
///
/// Implementations must be safe to call from concurrent trials: each call
/// owns its trial (and, for solver objectives, its own subprocess and seed).
/// A penalty for a slow or failed run is an ordinary `Ok` score; an `Err` is
/// reserved for unrecoverable conditions and aborts the whole run.
#[async_trait]
pub trait Objective: Send + Sync {
    async fn evaluate(
        &self,
        trial_number: usize,
        parameters: &HashMap<String, ParameterValue>,
    ) -> TunerResult<f64>;
}

/// Drives one optimization run to completion.
pub struct Optimizer {
    config: OptimizationConfig,
    status: OptimizationStatus,
    strategy: Box<dyn SearchStrategy>,
}

impl std::fmt::Debug for Optimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Optimizer")
            .field("config", &self.config)
            .field("status", &self.status)
            .field("strategy", &"<dyn SearchStrategy>")
            .finish()
    }
}

impl Optimizer {
    pub fn new(config: OptimizationConfig) -> TunerResult<Self> {
        if config.search_space.is_empty() {
            return Err(OptimizeError::EmptySearchSpace.into());
        }
        let strategy = make_strategy(&config)?;
        let status = OptimizationStatus::new(config.clone());
        Ok(Self {
            config,
            status,
            strategy,
        })
    }

    pub fn status(&self) -> &OptimizationStatus {
        &self.status
    }

    /// Run up to `max_trials` trials, at most `concurrency` at a time.
    ///
    /// Every trial gets a distinct trial number (doubling as its random
    /// seed). Completed scores are fed back to the strategy and the
    /// incumbent is tracked in the returned status.
    pub async fn run(&mut self, objective: Arc<dyn Objective>) -> TunerResult<&OptimizationStatus> {
        self.status.mark_running();
        info!(
            run = %self.config.id,
            strategy = self.strategy.name(),
            max_trials = self.config.max_trials,
            concurrency = self.config.concurrency,
            "starting optimization run"
        );

        let mut next_trial = 0usize;
        while next_trial < self.config.max_trials {
            let want = self
                .config
                .concurrency
                .min(self.config.max_trials - next_trial)
                .max(1);
            let batch = self.strategy.suggest(want);
            if batch.is_empty() {
                break;
            }

            let mut tasks = JoinSet::new();
            for parameters in batch {
                let mut trial = Trial::new(self.config.id, next_trial, parameters);
                next_trial += 1;
                self.status.trials_running += 1;
                let objective = Arc::clone(&objective);
                tasks.spawn(async move {
                    trial.mark_running();
                    let started = Instant::now();
                    let outcome = objective
                        .evaluate(trial.trial_number, &trial.parameters)
                        .await;
                    (trial, outcome, started.elapsed())
                });
            }

            while let Some(joined) = tasks.join_next().await {
                let (mut trial, outcome, elapsed) =
                    joined.map_err(|e| OptimizeError::TrialTaskFailed {
                        message: e.to_string(),
                    })?;
                self.status.trials_running -= 1;

                match outcome {
                    Ok(score) => {
                        let result = TrialResult {
                            trial_id: trial.id,
                            objective: score,
                            parameters: trial.parameters.clone(),
                            duration_seconds: Some(elapsed.as_secs()),
                        };
                        self.strategy.report(&trial.parameters, score);
                        trial.mark_completed(result.clone());
                        self.status.update_best(&result);
                        self.status.trials_completed += 1;
                        info!(
                            trial = trial.trial_number,
                            objective = score,
                            best = self.status.best_trial.as_ref().map(|b| b.objective),
                            "trial complete"
                        );
                    }
                    Err(err) => {
                        // Penalties never reach this arm; an objective error
                        // means the run itself cannot continue.
                        warn!(trial = trial.trial_number, error = %err, "trial errored; aborting run");
                        trial.mark_failed(err.to_string());
                        self.status.trials_failed += 1;
                        self.status.mark_failed(err.to_string());
                        return Err(err);
                    }
                }
            }
        }

        self.status.mark_completed();
        info!(
            run = %self.config.id,
            trials = self.status.trials_completed,
            best = self.status.best_trial.as_ref().map(|b| b.objective),
            "optimization run complete"
        );
        Ok(&self.status)
    }
}

fn make_strategy(config: &OptimizationConfig) -> TunerResult<Box<dyn SearchStrategy>> {
    match config.strategy.as_str() {
        "random" => Ok(Box::new(RandomSearch::new(config.search_space.clone()))),
        "bayesian" => Ok(Box::new(BayesianSearch::new(
            config.search_space.clone(),
            config.exploration_weight,
            config.direction,
        ))),
        name => Err(OptimizeError::UnknownStrategy {
            name: name.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchSpace;
    use crate::trial::OptimizationState;
    use vt_types::{TrialError, TunerError};

    fn sample_config(strategy: &str) -> OptimizationConfig {
        let space = SearchSpace::new().add_int("restart-int-base", 1, 100);
        OptimizationConfig::new("driver-test".into(), space, strategy)
            .with_max_trials(7)
            .with_concurrency(3)
    }

    /// Scores each configuration by its sampled value, so the incumbent is
    /// checkable without running anything.
    struct ValueObjective;

    #[async_trait]
    impl Objective for ValueObjective {
        async fn evaluate(
            &self,
            _trial_number: usize,
            parameters: &HashMap<String, ParameterValue>,
        ) -> TunerResult<f64> {
            Ok(parameters["restart-int-base"].as_f64().unwrap())
        }
    }

    struct FailingObjective;

    #[async_trait]
    impl Objective for FailingObjective {
        async fn evaluate(
            &self,
            _trial_number: usize,
            _parameters: &HashMap<String, ParameterValue>,
        ) -> TunerResult<f64> {
            Err(TrialError::BinaryNotFound {
                binary: "cvc5".to_string(),
            }
            .into())
        }
    }

    #[tokio::test]
    async fn run_completes_the_trial_budget() {
        let mut optimizer = Optimizer::new(sample_config("random")).unwrap();
        let status = optimizer.run(Arc::new(ValueObjective)).await.unwrap();

        assert_eq!(status.state, OptimizationState::Completed);
        assert_eq!(status.trials_completed, 7);
        assert_eq!(status.trials_failed, 0);
        assert_eq!(status.trials_running, 0);

        let best = status.best_trial.as_ref().unwrap();
        assert!(best.objective >= 1.0 && best.objective <= 100.0);
    }

    #[tokio::test]
    async fn bayesian_run_tracks_the_minimizing_incumbent() {
        let mut optimizer = Optimizer::new(sample_config("bayesian")).unwrap();
        let status = optimizer.run(Arc::new(ValueObjective)).await.unwrap();

        let best = status.best_trial.as_ref().unwrap().objective;
        // Every completed trial scored its own sampled value, so the
        // incumbent must be the smallest of them.
        assert!(best >= 1.0 && best <= 100.0);
        assert_eq!(status.trials_completed, 7);
    }

    #[tokio::test]
    async fn objective_error_aborts_the_run() {
        let mut optimizer = Optimizer::new(sample_config("random")).unwrap();
        let err = optimizer.run(Arc::new(FailingObjective)).await.unwrap_err();

        assert!(matches!(
            err,
            TunerError::Trial(TrialError::BinaryNotFound { .. })
        ));
        assert_eq!(optimizer.status().state, OptimizationState::Failed);
        assert!(optimizer.status().trials_failed >= 1);
        assert!(optimizer.status().error.is_some());
    }

    #[test]
    fn unknown_strategy_is_a_setup_error() {
        let err = Optimizer::new(sample_config("annealing")).unwrap_err();
        assert!(matches!(
            err,
            TunerError::Optimize(OptimizeError::UnknownStrategy { .. })
        ));
    }

    #[test]
    fn empty_search_space_is_a_setup_error() {
        let config = OptimizationConfig::new("empty".into(), SearchSpace::new(), "random");
        let err = Optimizer::new(config).unwrap_err();
        assert!(matches!(
            err,
            TunerError::Optimize(OptimizeError::EmptySearchSpace)
        ));
    }
}
