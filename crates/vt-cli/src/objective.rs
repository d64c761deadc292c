//! Bridges optimizer parameter assignments to timed solver runs.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;
use vt_optimizer::{Objective, ParameterValue};
use vt_solver::{build_args, SolverRunner};
use vt_types::{Catalog, OptionSelection, ParamValue, TunerResult};

/// Scores one parameter configuration by timing a solver subprocess.
///
/// The catalog is read-only and the runner spawns a fresh process per call,
/// so one objective serves all concurrent trials.
pub struct SolverObjective {
    catalog: Catalog,
    runner: SolverRunner,
}

impl SolverObjective {
    pub fn new(catalog: Catalog, runner: SolverRunner) -> Self {
        Self { catalog, runner }
    }

    /// Render a sampled assignment as an option selection, sorted by name so
    /// command lines are reproducible.
    fn selection_for(&self, parameters: &HashMap<String, ParameterValue>) -> OptionSelection {
        let mut names: Vec<&String> = parameters.keys().collect();
        names.sort();
        let mut selection = OptionSelection::new();
        for name in names {
            selection.push(name.clone(), Some(to_param_value(&parameters[name])));
        }
        selection
    }
}

#[async_trait]
impl Objective for SolverObjective {
    async fn evaluate(
        &self,
        trial_number: usize,
        parameters: &HashMap<String, ParameterValue>,
    ) -> TunerResult<f64> {
        let selection = self.selection_for(parameters);
        let built = build_args(&self.catalog, &selection);
        debug!(trial = trial_number, args = ?built.tokens, "running solver trial");
        let outcome = self
            .runner
            .run_trial(&built.tokens, trial_number as u64)
            .await?;
        Ok(outcome.score(self.runner.time_budget()))
    }
}

fn to_param_value(value: &ParameterValue) -> ParamValue {
    match value {
        ParameterValue::Float(v) => ParamValue::Float(*v),
        ParameterValue::Int(v) => ParamValue::Int(*v),
        ParameterValue::Json(serde_json::Value::Bool(b)) => ParamValue::Bool(*b),
        ParameterValue::Json(serde_json::Value::String(s)) => ParamValue::Str(s.clone()),
        ParameterValue::Json(other) => ParamValue::Str(other.to_string()),
    }
}
