//! Search space definitions and parameter sampling strategies.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vt_types::Catalog;

use crate::trial::ObjectiveDirection;

/// Boolean solver parameters worth searching over.
///
/// The full boolean partition of a catalog is far too large to explore, so
/// only this fixed allow-list of performance-relevant flags joins the search
/// space (when present in the catalog).
pub const PERFORMANCE_BOOL_PARAMS: &[&str] = &[
    "produce-models",
    "incremental",
    "strings-exp",
    "use-approx",
    "simp-ite-compress",
    "simplification",
];

/// A single parameter dimension in the search space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
    /// Solver option name (e.g. "restart-int-base").
    pub name: String,
    /// The kind of search range.
    pub range: ParameterRange,
}

/// Describes how a parameter is sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterRange {
    /// Continuous uniform range [low, high].
    Float { low: f64, high: f64 },
    /// Integer range [low, high] inclusive.
    Int { low: i64, high: i64 },
    /// Categorical choices.
    Choice { values: Vec<serde_json::Value> },
}

/// A concrete parameter value produced by a search strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Float(f64),
    Int(i64),
    Json(serde_json::Value),
}

impl ParameterValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Json(_) => None,
        }
    }
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Json(serde_json::Value::String(s)) => write!(f, "{s}"),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

/// The full search space: an ordered list of parameter dimensions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    pub parameters: Vec<ParameterDef>,
}

impl SearchSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_float(mut self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.parameters.push(ParameterDef {
            name: name.into(),
            range: ParameterRange::Float { low, high },
        });
        self
    }

    pub fn add_int(mut self, name: impl Into<String>, low: i64, high: i64) -> Self {
        self.parameters.push(ParameterDef {
            name: name.into(),
            range: ParameterRange::Int { low, high },
        });
        self
    }

    pub fn add_choice(mut self, name: impl Into<String>, values: Vec<serde_json::Value>) -> Self {
        self.parameters.push(ParameterDef {
            name: name.into(),
            range: ParameterRange::Choice { values },
        });
        self
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Derive a search space from a parameter catalog.
    ///
    /// Numeric parameters join only when bounded on both sides (an open range
    /// cannot be sampled), mode parameters join as categorical choices, and
    /// booleans join as true/false choices when allow-listed. String
    /// parameters are never searchable. Dimensions are sorted by name within
    /// each kind so the space is stable across runs.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut space = SearchSpace::new();

        let mut int_names: Vec<&String> = catalog.int_params().keys().collect();
        int_names.sort();
        for name in int_names {
            let param = &catalog.int_params()[name];
            if let (Some(min), Some(max)) = (param.min, param.max) {
                space = space.add_int(name.clone(), min, max);
            }
        }

        let mut float_names: Vec<&String> = catalog.float_params().keys().collect();
        float_names.sort();
        for name in float_names {
            let param = &catalog.float_params()[name];
            if let (Some(min), Some(max)) = (param.min, param.max) {
                space = space.add_float(name.clone(), min, max);
            }
        }

        let mut mode_names: Vec<&String> = catalog.mode_params().keys().collect();
        mode_names.sort();
        for name in mode_names {
            let param = &catalog.mode_params()[name];
            let values = param
                .modes
                .iter()
                .map(|m| serde_json::Value::String(m.clone()))
                .collect();
            space = space.add_choice(name.clone(), values);
        }

        for name in PERFORMANCE_BOOL_PARAMS {
            if catalog.bool_params().contains_key(*name) {
                space = space.add_choice(
                    name.to_string(),
                    vec![serde_json::Value::Bool(true), serde_json::Value::Bool(false)],
                );
            }
        }

        space
    }
}

// ---------------------------------------------------------------------------
// Search strategies
// ---------------------------------------------------------------------------

/// Common trait for all search strategies.
pub trait SearchStrategy: Send + Sync {
    /// Generate the next batch of parameter assignments to evaluate.
    fn suggest(&mut self, count: usize) -> Vec<HashMap<String, ParameterValue>>;

    /// Report completed trial results so adaptive strategies can learn.
    fn report(&mut self, _params: &HashMap<String, ParameterValue>, _objective: f64) {}

    /// Human-readable strategy name.
    fn name(&self) -> &str;
}

// ---- Random search ----

/// Independent random sampling across the search space.
#[derive(Debug, Clone)]
pub struct RandomSearch {
    space: SearchSpace,
}

impl RandomSearch {
    pub fn new(space: SearchSpace) -> Self {
        Self { space }
    }

    fn sample_one(&self) -> HashMap<String, ParameterValue> {
        let mut rng = rand::thread_rng();
        let mut params = HashMap::new();

        for param in &self.space.parameters {
            let value = match &param.range {
                ParameterRange::Float { low, high } => {
                    ParameterValue::Float(rng.gen_range(*low..=*high))
                }
                ParameterRange::Int { low, high } => {
                    ParameterValue::Int(rng.gen_range(*low..=*high))
                }
                ParameterRange::Choice { values } => {
                    let idx = rng.gen_range(0..values.len());
                    ParameterValue::Json(values[idx].clone())
                }
            };
            params.insert(param.name.clone(), value);
        }

        params
    }
}

impl SearchStrategy for RandomSearch {
    fn suggest(&mut self, count: usize) -> Vec<HashMap<String, ParameterValue>> {
        (0..count).map(|_| self.sample_one()).collect()
    }

    fn name(&self) -> &str {
        "random"
    }
}

// ---- Bayesian search ----

/// Bayesian-style optimization using a simple surrogate heuristic.
///
/// Tracks observed (params, objective) pairs and biases future sampling
/// toward the best-known region, mixing in pure exploration at the
/// configured rate. A full surrogate-model backend can be plugged in via the
/// `report` method.
#[derive(Debug, Clone)]
pub struct BayesianSearch {
    space: SearchSpace,
    direction: ObjectiveDirection,
    observations: Vec<(HashMap<String, ParameterValue>, f64)>,
    exploration_weight: f64,
}

impl BayesianSearch {
    pub fn new(space: SearchSpace, exploration_weight: f64, direction: ObjectiveDirection) -> Self {
        Self {
            space,
            direction,
            observations: Vec::new(),
            exploration_weight,
        }
    }

    /// Pure exploration sample (same as random).
    fn explore(&self) -> HashMap<String, ParameterValue> {
        let random = RandomSearch::new(self.space.clone());
        random.sample_one()
    }

    /// Exploitation: perturb the best-known point.
    fn exploit(&self) -> HashMap<String, ParameterValue> {
        let best = match self.direction {
            ObjectiveDirection::Maximize => self
                .observations
                .iter()
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal)),
            ObjectiveDirection::Minimize => self
                .observations
                .iter()
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal)),
        };

        let base = match best {
            Some((params, _)) => params.clone(),
            None => return self.explore(),
        };

        let mut rng = rand::thread_rng();
        let mut perturbed = HashMap::new();

        for param in &self.space.parameters {
            let base_val = base.get(&param.name);
            let value = match (&param.range, base_val) {
                (ParameterRange::Float { low, high }, Some(ParameterValue::Float(v))) => {
                    let range = high - low;
                    let noise = rng.gen_range(-0.1..0.1) * range;
                    ParameterValue::Float((v + noise).clamp(*low, *high))
                }
                (ParameterRange::Int { low, high }, Some(ParameterValue::Int(v))) => {
                    let delta: i64 = rng.gen_range(-2..=2);
                    ParameterValue::Int((v + delta).clamp(*low, *high))
                }
                _ => {
                    // Fall back to random for choices or missing base
                    RandomSearch::new(SearchSpace {
                        parameters: vec![param.clone()],
                    })
                    .sample_one()
                    .remove(&param.name)
                    .unwrap_or(ParameterValue::Int(0))
                }
            };
            perturbed.insert(param.name.clone(), value);
        }

        perturbed
    }
}

impl SearchStrategy for BayesianSearch {
    fn suggest(&mut self, count: usize) -> Vec<HashMap<String, ParameterValue>> {
        let mut rng = rand::thread_rng();
        (0..count)
            .map(|_| {
                if self.observations.is_empty() || rng.gen::<f64>() < self.exploration_weight {
                    self.explore()
                } else {
                    self.exploit()
                }
            })
            .collect()
    }

    fn report(&mut self, params: &HashMap<String, ParameterValue>, objective: f64) {
        self.observations.push((params.clone(), objective));
    }

    fn name(&self) -> &str {
        "bayesian"
    }
}
