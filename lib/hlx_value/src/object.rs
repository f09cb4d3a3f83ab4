use crate::ValueError;
use crate::Value;

/// An insertion-ordered string-keyed map with unique keys.
///
/// Textual surfaces (LC-T, LC-R) preserve the order entries were
/// constructed in; digest computation re-sorts keys lexicographically
/// (see `hlx_codec_b::digest`), so this type itself makes no ordering
/// promise beyond "whatever the builder passed in".
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    entries: Vec<(String, Value)>,
}

impl Object {
    pub fn new() -> Self {
        Object { entries: Vec::new() }
    }

    /// Builds an `Object` from an ordered list of pairs, rejecting
    /// duplicate keys.
    pub fn from_pairs(pairs: Vec<(String, Value)>) -> Result<Self, ValueError> {
        let mut seen = std::collections::HashSet::with_capacity(pairs.len());
        for (k, _) in &pairs {
            if !seen.insert(k.clone()) {
                return Err(ValueError::DuplicateKey(k.clone()));
            }
        }
        Ok(Object { entries: pairs })
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Result<(), ValueError> {
        let key = key.into();
        if self.entries.iter().any(|(k, _)| *k == key) {
            return Err(ValueError::DuplicateKey(key));
        }
        self.entries.push((key, value));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion (author) order.
    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.entries.iter()
    }

    /// Entries sorted lexicographically by key — the order §4.2 requires
    /// when computing a digest.
    pub fn sorted_entries(&self) -> Vec<&(String, Value)> {
        let mut out: Vec<&(String, Value)> = self.entries.iter().collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}
