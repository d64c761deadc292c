//! Parameter catalog construction from an option source.

use tracing::{debug, warn};
use vt_types::{Catalog, CatalogError, ModeParam, NumericParam, TunerResult};

use crate::sources::{OptionInfo, OptionSource};

/// The outcome of one catalog build: the classifiable subset of the solver's
/// options, plus the options that were skipped and why.
#[derive(Debug, Clone)]
pub struct CatalogBuild {
    pub catalog: Catalog,
    pub skipped: Vec<SkippedOption>,
}

/// A single option the builder could not classify.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedOption {
    pub name: String,
    pub reason: String,
}

/// Build a catalog by classifying every option the source reports.
///
/// A single bad option never aborts the build: metadata failures,
/// unrecognized type tags, and malformed defaults/bounds are recorded in the
/// skip list and logged, and iteration continues. Only a failure to list the
/// option names at all is an error.
pub fn build_catalog(source: &dyn OptionSource) -> TunerResult<CatalogBuild> {
    let names = source.option_names()?;
    let mut catalog = Catalog::new();
    let mut skipped = Vec::new();

    for name in names {
        let info = match source.option_info(&name) {
            Ok(info) => info,
            Err(err) => {
                warn!(option = %name, source = source.name(), error = %err, "skipping option: metadata unavailable");
                skipped.push(SkippedOption {
                    name,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        if let Err(err) = classify(&mut catalog, &name, &info) {
            match err {
                CatalogError::UnrecognizedType { .. } => {
                    debug!(option = %name, tag = %info.type_tag, "skipping option: unrecognized type tag");
                }
                ref other => {
                    warn!(option = %name, error = %other, "skipping option: bad metadata");
                }
            }
            skipped.push(SkippedOption {
                name,
                reason: err.to_string(),
            });
        }
    }

    debug!(
        source = source.name(),
        classified = catalog.len(),
        skipped = skipped.len(),
        "catalog build complete"
    );
    Ok(CatalogBuild { catalog, skipped })
}

/// Classify one option into the catalog, or explain why it must be omitted.
///
/// Total over all raw metadata: every input either inserts a descriptor or
/// returns a skip reason.
fn classify(catalog: &mut Catalog, name: &str, info: &OptionInfo) -> Result<(), CatalogError> {
    match info.type_tag.as_str() {
        "bool" => {
            let default = required_default(name, info)?
                .as_bool()
                .ok_or_else(|| bad_default(name, "a boolean"))?;
            catalog.insert_bool(name, default)
        }
        "int" => {
            let default = required_default(name, info)?
                .as_i64()
                .ok_or_else(|| bad_default(name, "an integer"))?;
            let min = int_bound(name, "minimum", info.minimum.as_ref())?;
            let max = int_bound(name, "maximum", info.maximum.as_ref())?;
            catalog.insert_int(name, NumericParam::new(default, min, max))
        }
        "float" => {
            let default = required_default(name, info)?
                .as_f64()
                .ok_or_else(|| bad_default(name, "a number"))?;
            let min = float_bound(name, "minimum", info.minimum.as_ref())?;
            let max = float_bound(name, "maximum", info.maximum.as_ref())?;
            catalog.insert_float(name, NumericParam::new(default, min, max))
        }
        "string" => {
            let default = required_default(name, info)?
                .as_str()
                .ok_or_else(|| bad_default(name, "a string"))?;
            catalog.insert_string(name, default)
        }
        "mode" => {
            let default = match &info.default {
                Some(value) => Some(
                    value
                        .as_str()
                        .ok_or_else(|| bad_default(name, "a mode string"))?
                        .to_string(),
                ),
                None => None,
            };
            catalog.insert_mode(
                name,
                ModeParam {
                    default,
                    modes: info.modes.clone(),
                },
            )
        }
        tag => Err(CatalogError::UnrecognizedType {
            option: name.to_string(),
            tag: tag.to_string(),
        }),
    }
}

fn required_default<'a>(
    name: &str,
    info: &'a OptionInfo,
) -> Result<&'a serde_json::Value, CatalogError> {
    info.default.as_ref().ok_or(CatalogError::MissingDefault {
        option: name.to_string(),
    })
}

fn bad_default(name: &str, expected: &str) -> CatalogError {
    CatalogError::BadDefault {
        option: name.to_string(),
        expected: expected.to_string(),
    }
}

fn int_bound(
    name: &str,
    bound: &str,
    value: Option<&serde_json::Value>,
) -> Result<Option<i64>, CatalogError> {
    match value {
        None => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or(CatalogError::BadBound {
            option: name.to_string(),
            bound: bound.to_string(),
        }),
    }
}

fn float_bound(
    name: &str,
    bound: &str,
    value: Option<&serde_json::Value>,
) -> Result<Option<f64>, CatalogError> {
    match value {
        None => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or(CatalogError::BadBound {
            option: name.to_string(),
            bound: bound.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::StaticOptionSource;
    use vt_types::{ParameterKind, TunerError};

    fn sample_source() -> StaticOptionSource {
        StaticOptionSource::new()
            .with_option("produce-models", OptionInfo::boolean(false))
            .with_option("depth", OptionInfo::integer(4, Some(1), Some(10)))
            .with_option("decay", OptionInfo::float(0.95, Some(0.0), Some(1.0)))
            .with_option("filename", OptionInfo::string(""))
            .with_option("bitblast", OptionInfo::mode(Some("lazy"), &["lazy", "eager"]))
    }

    #[test]
    fn recognized_tags_classify_under_matching_kind() {
        let build = build_catalog(&sample_source()).unwrap();
        assert!(build.skipped.is_empty());
        assert_eq!(build.catalog.len(), 5);
        assert_eq!(
            build.catalog.kind_of("produce-models"),
            Some(ParameterKind::Boolean)
        );
        assert_eq!(
            build.catalog.kind_of("depth"),
            Some(ParameterKind::BoundedInteger)
        );
        assert_eq!(
            build.catalog.kind_of("decay"),
            Some(ParameterKind::BoundedFloat)
        );
        assert_eq!(
            build.catalog.kind_of("filename"),
            Some(ParameterKind::String)
        );
        assert_eq!(build.catalog.kind_of("bitblast"), Some(ParameterKind::Mode));

        let depth = &build.catalog.int_params()["depth"];
        assert_eq!(depth.default, 4);
        assert_eq!(depth.min, Some(1));
        assert_eq!(depth.max, Some(10));
    }

    #[test]
    fn one_sided_bounds_are_preserved() {
        let source = StaticOptionSource::new()
            .with_option("limit", OptionInfo::integer(10, Some(0), None));
        let build = build_catalog(&source).unwrap();
        let limit = &build.catalog.int_params()["limit"];
        assert_eq!(limit.min, Some(0));
        assert_eq!(limit.max, None);
    }

    #[test]
    fn unrecognized_tag_is_omitted_without_error() {
        let source = sample_source().with_option(
            "regex-opt",
            OptionInfo {
                type_tag: "regexp".to_string(),
                default: None,
                minimum: None,
                maximum: None,
                modes: Vec::new(),
            },
        );
        let build = build_catalog(&source).unwrap();
        assert_eq!(build.catalog.len(), 5);
        assert!(!build.catalog.contains("regex-opt"));
        assert_eq!(build.skipped.len(), 1);
        assert_eq!(build.skipped[0].name, "regex-opt");
    }

    #[test]
    fn bad_metadata_skips_only_that_option() {
        let source = sample_source()
            .with_option(
                "broken-default",
                OptionInfo {
                    type_tag: "int".to_string(),
                    default: Some(serde_json::Value::String("four".to_string())),
                    minimum: None,
                    maximum: None,
                    modes: Vec::new(),
                },
            )
            .with_option("empty-modes", OptionInfo::mode(None, &[]));

        let build = build_catalog(&source).unwrap();
        assert_eq!(build.catalog.len(), 5);
        assert_eq!(build.skipped.len(), 2);
        let names: Vec<&str> = build.skipped.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["broken-default", "empty-modes"]);
    }

    #[test]
    fn metadata_failure_skips_and_continues() {
        // A source whose info lookup fails for one of its reported names.
        #[derive(Debug)]
        struct FlakySource;

        impl OptionSource for FlakySource {
            fn option_names(&self) -> TunerResult<Vec<String>> {
                Ok(vec!["good".to_string(), "bad".to_string()])
            }

            fn option_info(&self, name: &str) -> TunerResult<OptionInfo> {
                if name == "bad" {
                    Err(CatalogError::MetadataUnavailable {
                        option: name.to_string(),
                        message: "introspection failed".to_string(),
                    }
                    .into())
                } else {
                    Ok(OptionInfo::boolean(true))
                }
            }

            fn name(&self) -> &str {
                "flaky"
            }
        }

        let build = build_catalog(&FlakySource).unwrap();
        assert_eq!(build.catalog.len(), 1);
        assert!(build.catalog.contains("good"));
        assert_eq!(build.skipped.len(), 1);
        assert_eq!(build.skipped[0].name, "bad");
    }

    #[test]
    fn listing_failure_aborts_the_build() {
        #[derive(Debug)]
        struct DeadSource;

        impl OptionSource for DeadSource {
            fn option_names(&self) -> TunerResult<Vec<String>> {
                Err(CatalogError::SourceUnavailable {
                    message: "solver handle lost".to_string(),
                }
                .into())
            }

            fn option_info(&self, _name: &str) -> TunerResult<OptionInfo> {
                unreachable!()
            }

            fn name(&self) -> &str {
                "dead"
            }
        }

        match build_catalog(&DeadSource) {
            Err(TunerError::Catalog(CatalogError::SourceUnavailable { .. })) => (),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn duplicate_name_keeps_first_classification() {
        let source = StaticOptionSource::new()
            .with_option("depth", OptionInfo::integer(4, Some(1), Some(10)))
            .with_option("depth", OptionInfo::integer(4, Some(1), Some(10)));
        let build = build_catalog(&source).unwrap();
        assert_eq!(build.catalog.len(), 1);
        assert_eq!(
            build.catalog.kind_of("depth"),
            Some(ParameterKind::BoundedInteger)
        );
        assert_eq!(build.skipped.len(), 1);
        assert!(build.skipped[0].reason.contains("Duplicate"));
    }
}
