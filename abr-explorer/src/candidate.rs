//! Candidate renditions produced by generation and expansion.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::resolution::Resolution;

/// Option-variable assignment carried by a candidate.
///
/// Keeps the order variables were assigned in, which is the order names are
/// rendered in. Equality ignores that order.
#[derive(Debug, Clone, Default)]
pub struct Variables(Vec<(String, String)>);

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `name`, replacing an earlier value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Variables {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(n, v)| other.get(n) == Some(v))
    }
}

impl Eq for Variables {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = Variables::new();
        for (name, value) in iter {
            vars.insert(name, value);
        }
        vars
    }
}

impl Serialize for Variables {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One (resolution, bitrate, variables) combination to transcode and score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub resolution: Resolution,
    /// Target bitrate in bps.
    pub bitrate: u64,
    #[serde(skip_serializing_if = "Variables::is_empty")]
    pub variables: Variables,
}

impl Candidate {
    pub fn new(resolution: Resolution, bitrate: u64) -> Self {
        Self {
            resolution,
            bitrate,
            variables: Variables::new(),
        }
    }

    /// Copy of this candidate with one more variable assigned.
    pub fn with_variable(&self, name: &str, value: &str) -> Self {
        let mut next = self.clone();
        next.variables.insert(name, value);
        next
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {} bps", self.resolution, self.bitrate)?;
        for (name, value) in self.variables.iter() {
            write!(f, " {name}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_equality_ignores_order() {
        let a: Variables = [("preset", "fast"), ("crf", "23")].into_iter().collect();
        let b: Variables = [("crf", "23"), ("preset", "fast")].into_iter().collect();
        assert_eq!(a, b);

        let c: Variables = [("crf", "28"), ("preset", "fast")].into_iter().collect();
        assert_ne!(a, c);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut vars = Variables::new();
        vars.insert("a", "1");
        vars.insert("b", "2");
        vars.insert("a", "3");
        let collected: Vec<_> = vars.iter().collect();
        assert_eq!(collected, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_with_variable_leaves_source_untouched() {
        let base = Candidate::new(Resolution::new(640, 360), 500_000);
        let next = base.with_variable("preset", "slow");
        assert!(base.variables.is_empty());
        assert_eq!(next.variables.get("preset"), Some("slow"));
        assert_eq!(next.to_string(), "640x360 @ 500000 bps preset=slow");
    }
}
