//! Command-line token construction from an option selection.

use std::fmt;
use tracing::warn;
use vt_types::{Catalog, OptionSelection, ParamValue, ParameterKind};

/// The token sequence for one solver invocation, plus every selection entry
/// that had to be dropped.
///
/// A dropped entry is never silently substituted: the warning list is part of
/// the result and each warning is also logged.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltArgs {
    pub tokens: Vec<String>,
    pub warnings: Vec<SelectionWarning>,
}

impl BuiltArgs {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Why a selection entry was dropped from the token sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionWarning {
    /// The parameter is not in the catalog.
    UnknownParameter { name: String },
    /// The value is inadmissible for the parameter's kind or bounds.
    InvalidValue { name: String, value: String },
    /// A non-boolean parameter was selected without a value.
    MissingValue { name: String, kind: ParameterKind },
}

impl fmt::Display for SelectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownParameter { name } => write!(f, "unknown parameter {name}"),
            Self::InvalidValue { name, value } => {
                write!(f, "invalid value {value} for parameter {name}")
            }
            Self::MissingValue { name, kind } => {
                write!(f, "value required for {kind} parameter {name}")
            }
        }
    }
}

/// Encode a selection as solver command-line tokens.
///
/// Booleans become a bare `--name` flag, emitted only for a true value.
/// Every other kind becomes `--name` followed by the value's canonical
/// string form. Token order follows selection order.
pub fn build_args(catalog: &Catalog, selection: &OptionSelection) -> BuiltArgs {
    let mut tokens = Vec::new();
    let mut warnings = Vec::new();

    for (name, value) in selection.iter() {
        let kind = match catalog.kind_of(name) {
            Some(kind) => kind,
            None => {
                push_warning(
                    &mut warnings,
                    SelectionWarning::UnknownParameter {
                        name: name.to_string(),
                    },
                );
                continue;
            }
        };

        match kind {
            ParameterKind::Boolean => {
                if !catalog.validate(name, value) {
                    push_warning(&mut warnings, invalid_value(name, value));
                    continue;
                }
                if let Some(ParamValue::Bool(true)) = value {
                    tokens.push(format!("--{name}"));
                }
            }
            _ => {
                let value = match value {
                    Some(value) => value,
                    None => {
                        push_warning(
                            &mut warnings,
                            SelectionWarning::MissingValue {
                                name: name.to_string(),
                                kind,
                            },
                        );
                        continue;
                    }
                };
                if !catalog.validate(name, Some(value)) {
                    push_warning(&mut warnings, invalid_value(name, Some(value)));
                    continue;
                }
                tokens.push(format!("--{name}"));
                tokens.push(value.to_string());
            }
        }
    }

    BuiltArgs { tokens, warnings }
}

fn invalid_value(name: &str, value: Option<&ParamValue>) -> SelectionWarning {
    SelectionWarning::InvalidValue {
        name: name.to_string(),
        value: value.map_or_else(|| "<none>".to_string(), |v| v.to_string()),
    }
}

fn push_warning(warnings: &mut Vec<SelectionWarning>, warning: SelectionWarning) {
    warn!("{warning}");
    warnings.push(warning);
}

#[cfg(test)]
mod tests {
    use super::*;
    use vt_types::{ModeParam, NumericParam};

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert_bool("produce-models", false).unwrap();
        catalog
            .insert_int("p1", NumericParam::new(50, Some(0), Some(100)))
            .unwrap();
        catalog
            .insert_mode(
                "bitblast",
                ModeParam {
                    default: Some("lazy".to_string()),
                    modes: vec!["lazy".to_string(), "eager".to_string()],
                },
            )
            .unwrap();
        catalog
    }

    #[test]
    fn bounded_integer_emits_flag_and_value() {
        let catalog = sample_catalog();
        let selection = OptionSelection::new().with_value("p1", 42i64);
        let built = build_args(&catalog, &selection);
        assert_eq!(built.tokens, vec!["--p1", "42"]);
        assert!(built.is_clean());
    }

    #[test]
    fn true_boolean_emits_exactly_one_token() {
        let catalog = sample_catalog();
        let selection = OptionSelection::new().with_value("produce-models", true);
        let built = build_args(&catalog, &selection);
        assert_eq!(built.tokens, vec!["--produce-models"]);
        assert!(built.is_clean());
    }

    #[test]
    fn false_or_absent_boolean_emits_nothing() {
        let catalog = sample_catalog();

        let built = build_args(
            &catalog,
            &OptionSelection::new().with_value("produce-models", false),
        );
        assert!(built.tokens.is_empty());
        assert!(built.is_clean());

        let built = build_args(&catalog, &OptionSelection::new().with_flag("produce-models"));
        assert!(built.tokens.is_empty());
        assert!(built.is_clean());
    }

    #[test]
    fn unknown_parameter_warns_and_emits_nothing() {
        let catalog = sample_catalog();
        let selection = OptionSelection::new().with_value("no-such-option", 1i64);
        let built = build_args(&catalog, &selection);
        assert!(built.tokens.is_empty());
        assert_eq!(
            built.warnings,
            vec![SelectionWarning::UnknownParameter {
                name: "no-such-option".to_string()
            }]
        );
    }

    #[test]
    fn invalid_value_is_dropped_not_substituted() {
        let catalog = sample_catalog();
        let selection = OptionSelection::new()
            .with_value("p1", 999i64)
            .with_value("bitblast", "eager");
        let built = build_args(&catalog, &selection);
        // The out-of-range value produces no tokens at all; the valid entry
        // is unaffected.
        assert_eq!(built.tokens, vec!["--bitblast", "eager"]);
        assert_eq!(
            built.warnings,
            vec![SelectionWarning::InvalidValue {
                name: "p1".to_string(),
                value: "999".to_string()
            }]
        );
    }

    #[test]
    fn missing_value_for_non_boolean_warns() {
        let catalog = sample_catalog();
        let selection = OptionSelection::new().with_flag("p1");
        let built = build_args(&catalog, &selection);
        assert!(built.tokens.is_empty());
        assert_eq!(
            built.warnings,
            vec![SelectionWarning::MissingValue {
                name: "p1".to_string(),
                kind: ParameterKind::BoundedInteger
            }]
        );
    }

    #[test]
    fn token_order_follows_selection_order() {
        let catalog = sample_catalog();
        let selection = OptionSelection::new()
            .with_value("bitblast", "lazy")
            .with_value("produce-models", true)
            .with_value("p1", 7i64);
        let built = build_args(&catalog, &selection);
        assert_eq!(
            built.tokens,
            vec!["--bitblast", "lazy", "--produce-models", "--p1", "7"]
        );
    }
}
