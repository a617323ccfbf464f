//! Parameter sets shared by simulations, controls and trace extraction.
//!
//! A parameter set is a small ordered map from name to value. Values are
//! either a single number (decay rates, thresholds, slider readings) or a
//! list of numbers (forced spike times). Simulation functions read them
//! through the `*_or` accessors so that any key a caller leaves out falls
//! back to the model's documented default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One named parameter value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    List(Vec<f64>),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[f64]> {
        match self {
            Self::Number(_) => None,
            Self::List(values) => Some(values),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(values: Vec<f64>) -> Self {
        Self::List(values)
    }
}

impl From<&[f64]> for ParamValue {
    fn from(values: &[f64]) -> Self {
        Self::List(values.to_vec())
    }
}

/// Ordered parameter mapping.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ParamValue::as_number)
    }

    /// Numeric value for `key`, or `default` when absent or not a number.
    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        self.number(key).unwrap_or(default)
    }

    pub fn list(&self, key: &str) -> Option<&[f64]> {
        self.get(key).and_then(ParamValue::as_list)
    }

    /// List value for `key`, or an empty slice.
    pub fn list_or_empty(&self, key: &str) -> &[f64] {
        self.list(key).unwrap_or(&[])
    }

    /// Copy every entry of `other` over `self`.
    pub fn overlay(&mut self, other: &Params) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value:.3}"),
            Self::List(values) => {
                let joined: Vec<String> = values.iter().map(|v| format!("{v}")).collect();
                write!(f, "[{}]", joined.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_keys() {
        let params = Params::new().with("alpha", 0.9);
        assert_eq!(params.number_or("alpha", 0.98), 0.9);
        assert_eq!(params.number_or("beta", 0.98), 0.98);
        assert!(params.list_or_empty("spike_times").is_empty());
    }

    #[test]
    fn test_wrong_kind_falls_back() {
        let params = Params::new()
            .with("spike_times", 3.0)
            .with("u0", vec![1.0, 2.0]);
        assert!(params.list("spike_times").is_none());
        assert_eq!(params.number_or("u0", 0.5), 0.5);
    }

    #[test]
    fn test_overlay_replaces_entries() {
        let mut base = Params::new().with("a", 20.0).with("b", 0.0);
        let controls = Params::new().with("a", 55.0);
        base.overlay(&controls);
        assert_eq!(base.number("a"), Some(55.0));
        assert_eq!(base.number("b"), Some(0.0));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn test_untagged_json() {
        let params: Params =
            serde_json::from_str(r#"{"w_in": 0.4, "spike_times": [120]}"#).unwrap();
        assert_eq!(params.number("w_in"), Some(0.4));
        assert_eq!(params.list("spike_times"), Some(&[120.0][..]));
    }
}
