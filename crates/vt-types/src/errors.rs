use thiserror::Error;

/// Main error type for the VeriTune system
#[derive(Error, Debug)]
pub enum TunerError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Trial error: {0}")]
    Trial(#[from] TrialError),

    #[error("Optimization error: {0}")]
    Optimize(#[from] OptimizeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while building the parameter catalog.
///
/// Per-option variants are recovered locally by the builder (the option is
/// skipped); only source-level failures abort a build.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Option source unavailable: {message}")]
    SourceUnavailable { message: String },

    #[error("No metadata for option {option}: {message}")]
    MetadataUnavailable { option: String, message: String },

    #[error("Unrecognized type tag '{tag}' for option {option}")]
    UnrecognizedType { option: String, tag: String },

    #[error("Option {option} has no default value")]
    MissingDefault { option: String },

    #[error("Bad default for option {option}: expected {expected}")]
    BadDefault { option: String, expected: String },

    #[error("Bad {bound} bound for option {option}")]
    BadBound { option: String, bound: String },

    #[error("Mode option {option} reports no legal modes")]
    EmptyModes { option: String },

    #[error("Duplicate option name: {option}")]
    DuplicateName { option: String },
}

/// Errors raised at the solver-invocation boundary.
#[derive(Error, Debug)]
pub enum TrialError {
    #[error("Solver binary not found: {binary}")]
    BinaryNotFound { binary: String },

    #[error("Failed to spawn solver process: {message}")]
    SpawnFailed { message: String },

    #[error("Failed waiting on solver process: {message}")]
    WaitFailed { message: String },

    #[error("Solver exited with status {code:?}: {stderr}")]
    SolverFailed { code: Option<i32>, stderr: String },
}

/// Errors raised by the optimization driver.
#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("Unknown search strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("Search space is empty: no tunable parameters in catalog")]
    EmptySearchSpace,

    #[error("Trial task failed: {message}")]
    TrialTaskFailed { message: String },
}

/// Result type alias for VeriTune operations
pub type TunerResult<T> = Result<T, TunerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CatalogError::UnrecognizedType {
            option: "foo".to_string(),
            tag: "regexp".to_string(),
        };

        assert!(error.to_string().contains("regexp"));
        assert!(error.to_string().contains("foo"));
    }

    #[test]
    fn test_error_conversion() {
        let trial_error = TrialError::BinaryNotFound {
            binary: "cvc5".to_string(),
        };
        let tuner_error: TunerError = trial_error.into();

        match tuner_error {
            TunerError::Trial(_) => (),
            _ => panic!("Expected Trial error"),
        }
    }
}
