//! Immutable pattern → local resource table consulted by the request callback.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::SwapEntry;
use crate::paths::{pattern_key, request_key};

/// Ordered mapping from request pattern to [`SwapEntry`].
///
/// Insertion order is kept for diagnostics and for the filter list handed to the engine.
/// Lookups go through the scheme-less key, so they cost one hash probe per request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SwapTable {
  entries: Vec<SwapEntry>,
  #[serde(skip)]
  by_key: HashMap<String, usize>,
}

impl SwapTable {
  /// Insert an entry unless its pattern is already claimed.
  ///
  /// Returns the entry that already owns the pattern when the insert is refused.
  pub(crate) fn insert(&mut self, entry: SwapEntry) -> Result<(), &SwapEntry> {
    if let Some(&index) = self.by_key.get(&entry.key) {
      return Err(&self.entries[index]);
    }

    self.by_key.insert(entry.key.clone(), self.entries.len());
    self.entries.push(entry);
    Ok(())
  }

  /// Number of entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when nothing is swapped.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Entries in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = &SwapEntry> {
    self.entries.iter()
  }

  /// Patterns in insertion order, as handed to the engine's request filter.
  pub fn patterns(&self) -> Vec<String> {
    self.entries.iter().map(|entry| entry.pattern.clone()).collect()
  }

  /// Entry registered for an exact pattern string.
  pub fn get(&self, pattern: &str) -> Option<&SwapEntry> {
    let key = pattern_key(pattern)?;
    self
      .by_key
      .get(key)
      .map(|&index| &self.entries[index])
      .filter(|entry| entry.pattern == pattern)
  }

  /// Entry that replaces the resource at `url`, if any.
  pub fn lookup(&self, url: &str) -> Option<&SwapEntry> {
    self
      .by_key
      .get(request_key(url))
      .map(|&index| &self.entries[index])
  }
}

impl<'a> IntoIterator for &'a SwapTable {
  type Item = &'a SwapEntry;
  type IntoIter = std::slice::Iter<'a, SwapEntry>;

  fn into_iter(self) -> Self::IntoIter {
    self.entries.iter()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;

  fn entry(key: &str, root: &str) -> SwapEntry {
    SwapEntry {
      pattern: format!("*://{key}*"),
      key: key.to_string(),
      local_resource: format!("swapper:///{root}/{key}"),
      source: PathBuf::from(format!("/{root}/{key}")),
      root: root.to_string(),
    }
  }

  #[test]
  fn refuses_duplicate_patterns_and_keeps_the_first() {
    let mut table = SwapTable::default();
    table.insert(entry("host/x.png", "assets")).unwrap();
    let existing = table.insert(entry("host/x.png", "theme")).unwrap_err();

    assert_eq!(existing.root, "assets");
    assert_eq!(table.len(), 1);
    assert_eq!(table.get("*://host/x.png*").unwrap().root, "assets");
  }

  #[test]
  fn keeps_insertion_order() {
    let mut table = SwapTable::default();
    table.insert(entry("host/z.png", "assets")).unwrap();
    table.insert(entry("host/a.png", "assets")).unwrap();

    assert_eq!(table.patterns(), vec![
      "*://host/z.png*".to_string(),
      "*://host/a.png*".to_string()
    ]);
  }

  #[test]
  fn looks_up_request_urls_ignoring_scheme_and_query() {
    let mut table = SwapTable::default();
    table.insert(entry("host/x.png", "assets")).unwrap();

    assert!(table.lookup("https://host/x.png?v=2").is_some());
    assert!(table.lookup("http://host/x.png#top").is_some());
    assert!(table.lookup("https://host/x.png.bak").is_none());
    assert!(table.lookup("https://host/y.png").is_none());
  }
}
