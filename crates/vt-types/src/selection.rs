//! Option selections: the ordered set of parameter choices for one solver run.

use serde::{Deserialize, Serialize};

use crate::params::ParamValue;

/// An ordered sequence of `(parameter, optional value)` pairs chosen for a
/// single solver invocation.
///
/// A `None` value means "set the bare flag" and is only meaningful for
/// boolean parameters. Selections are transient: built immediately before a
/// run and discarded after. Order is preserved, never sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionSelection {
    entries: Vec<(String, Option<ParamValue>)>,
}

impl OptionSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bare flag (no value).
    pub fn with_flag(mut self, name: impl Into<String>) -> Self {
        self.entries.push((name.into(), None));
        self
    }

    /// Append a parameter with a value.
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.entries.push((name.into(), Some(value.into())));
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: Option<ParamValue>) {
        self.entries.push((name.into(), value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ParamValue>)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_preserves_supply_order() {
        let selection = OptionSelection::new()
            .with_value("zz-last", 1i64)
            .with_flag("aa-first")
            .with_value("mm-middle", "eager");

        let names: Vec<&str> = selection.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zz-last", "aa-first", "mm-middle"]);
    }

    #[test]
    fn flag_entries_have_no_value() {
        let selection = OptionSelection::new().with_flag("produce-models");
        let (name, value) = selection.iter().next().unwrap();
        assert_eq!(name, "produce-models");
        assert!(value.is_none());
    }
}
