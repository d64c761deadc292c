//! Parameter catalog: kinds, descriptors, and value validation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::errors::CatalogError;

/// The five kinds of solver parameters the catalog distinguishes.
///
/// The kind determines which validation and command-line encoding rules
/// apply to a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Boolean,
    BoundedInteger,
    BoundedFloat,
    String,
    Mode,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Boolean => "boolean",
            Self::BoundedInteger => "integer",
            Self::BoundedFloat => "float",
            Self::String => "string",
            Self::Mode => "mode",
        };
        write!(f, "{label}")
    }
}

/// A candidate value for a solver parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

/// Descriptor for a numeric parameter: default plus optional bounds.
///
/// Either bound may be absent independently; an absent bound means the
/// parameter is unconstrained on that side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericParam<T> {
    pub default: T,
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> NumericParam<T> {
    pub fn new(default: T, min: Option<T>, max: Option<T>) -> Self {
        Self { default, min, max }
    }
}

/// Descriptor for an enumerated-string ("mode") parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeParam {
    /// Default mode, when the solver reports one.
    pub default: Option<String>,
    /// The legal mode strings. Never empty.
    pub modes: Vec<String>,
}

impl ModeParam {
    pub fn is_legal(&self, value: &str) -> bool {
        self.modes.iter().any(|m| m == value)
    }
}

/// The classified collection of all known solver parameters.
///
/// Parameters are partitioned by kind; a name appears in exactly one
/// partition. Built once per introspection session and read-only afterwards,
/// so lookups and validation are safe to call concurrently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    bool_params: HashMap<String, bool>,
    int_params: HashMap<String, NumericParam<i64>>,
    float_params: HashMap<String, NumericParam<f64>>,
    string_params: HashMap<String, String>,
    mode_params: HashMap<String, ModeParam>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The kind a parameter was classified under, if known.
    pub fn kind_of(&self, name: &str) -> Option<ParameterKind> {
        if self.bool_params.contains_key(name) {
            Some(ParameterKind::Boolean)
        } else if self.int_params.contains_key(name) {
            Some(ParameterKind::BoundedInteger)
        } else if self.float_params.contains_key(name) {
            Some(ParameterKind::BoundedFloat)
        } else if self.string_params.contains_key(name) {
            Some(ParameterKind::String)
        } else if self.mode_params.contains_key(name) {
            Some(ParameterKind::Mode)
        } else {
            None
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.bool_params.len()
            + self.int_params.len()
            + self.float_params.len()
            + self.string_params.len()
            + self.mode_params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bool_params(&self) -> &HashMap<String, bool> {
        &self.bool_params
    }

    pub fn int_params(&self) -> &HashMap<String, NumericParam<i64>> {
        &self.int_params
    }

    pub fn float_params(&self) -> &HashMap<String, NumericParam<f64>> {
        &self.float_params
    }

    pub fn string_params(&self) -> &HashMap<String, String> {
        &self.string_params
    }

    pub fn mode_params(&self) -> &HashMap<String, ModeParam> {
        &self.mode_params
    }

    /// Register a boolean parameter. Rejects names already present under any
    /// kind.
    pub fn insert_bool(
        &mut self,
        name: impl Into<String>,
        default: bool,
    ) -> Result<(), CatalogError> {
        let name = name.into();
        self.check_unique(&name)?;
        self.bool_params.insert(name, default);
        Ok(())
    }

    pub fn insert_int(
        &mut self,
        name: impl Into<String>,
        param: NumericParam<i64>,
    ) -> Result<(), CatalogError> {
        let name = name.into();
        self.check_unique(&name)?;
        self.int_params.insert(name, param);
        Ok(())
    }

    pub fn insert_float(
        &mut self,
        name: impl Into<String>,
        param: NumericParam<f64>,
    ) -> Result<(), CatalogError> {
        let name = name.into();
        self.check_unique(&name)?;
        self.float_params.insert(name, param);
        Ok(())
    }

    pub fn insert_string(
        &mut self,
        name: impl Into<String>,
        default: impl Into<String>,
    ) -> Result<(), CatalogError> {
        let name = name.into();
        self.check_unique(&name)?;
        self.string_params.insert(name, default.into());
        Ok(())
    }

    /// Register a mode parameter. The mode set must be non-empty and must
    /// contain the default when one is given.
    pub fn insert_mode(
        &mut self,
        name: impl Into<String>,
        param: ModeParam,
    ) -> Result<(), CatalogError> {
        let name = name.into();
        self.check_unique(&name)?;
        if param.modes.is_empty() {
            return Err(CatalogError::EmptyModes { option: name });
        }
        if let Some(default) = &param.default {
            if !param.is_legal(default) {
                return Err(CatalogError::BadDefault {
                    option: name,
                    expected: "a member of the mode set".to_string(),
                });
            }
        }
        self.mode_params.insert(name, param);
        Ok(())
    }

    fn check_unique(&self, name: &str) -> Result<(), CatalogError> {
        if self.contains(name) {
            return Err(CatalogError::DuplicateName {
                option: name.to_string(),
            });
        }
        Ok(())
    }

    /// Check whether `value` is admissible for the parameter `name`.
    ///
    /// Unknown parameters are invalid for every value. An absent value is
    /// valid only for boolean parameters, where it means "set the bare flag".
    pub fn validate(&self, name: &str, value: Option<&ParamValue>) -> bool {
        match self.kind_of(name) {
            None => false,
            Some(ParameterKind::Boolean) => {
                matches!(value, None | Some(ParamValue::Bool(_)))
            }
            Some(ParameterKind::BoundedInteger) => {
                let v = match value {
                    Some(ParamValue::Int(v)) => *v,
                    _ => return false,
                };
                let param = &self.int_params[name];
                within_bounds(v, param.min, param.max)
            }
            Some(ParameterKind::BoundedFloat) => {
                let v = match value {
                    Some(ParamValue::Float(v)) => *v,
                    Some(ParamValue::Int(v)) => *v as f64,
                    _ => return false,
                };
                let param = &self.float_params[name];
                within_bounds(v, param.min, param.max)
            }
            Some(ParameterKind::String) => matches!(value, Some(ParamValue::Str(_))),
            Some(ParameterKind::Mode) => match value {
                Some(ParamValue::Str(v)) => self.mode_params[name].is_legal(v),
                _ => false,
            },
        }
    }
}

fn within_bounds<T: PartialOrd>(value: T, min: Option<T>, max: Option<T>) -> bool {
    if let Some(min) = min {
        if value < min {
            return false;
        }
    }
    if let Some(max) = max {
        if value > max {
            return false;
        }
    }
    true
}
