//! Data structures produced while scanning roots and building the swap table.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::SwapperError;

/// A local directory mirrored onto the remote origin's asset paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRoot {
  /// Short name used in diagnostics (`assets`, `theme`).
  pub label: String,
  /// Directory to walk.
  pub path: PathBuf,
  /// Host prefix placed before the remote host, e.g. `assets.`.
  pub namespace_prefix: String,
  /// Whether [`ScanRoot::namespace_prefix`] is applied to generated patterns.
  pub include_host_prefix: bool,
}

impl ScanRoot {
  /// Root whose files are served from the namespaced asset host.
  pub fn namespaced(label: &str, path: impl Into<PathBuf>, namespace_prefix: &str) -> Self {
    Self {
      label: label.to_string(),
      path: path.into(),
      namespace_prefix: namespace_prefix.to_string(),
      include_host_prefix: true,
    }
  }

  /// Root whose files are served from the bare remote host.
  pub fn bare(label: &str, path: impl Into<PathBuf>) -> Self {
    Self {
      label: label.to_string(),
      path: path.into(),
      namespace_prefix: String::new(),
      include_host_prefix: false,
    }
  }

  /// Host prefix that applies to this root's patterns.
  pub fn effective_prefix(&self) -> &str {
    if self.include_host_prefix {
      &self.namespace_prefix
    } else {
      ""
    }
  }
}

/// One entry discovered by the directory scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
  /// Absolute path of the entry (as reached through the root, symlinks unresolved).
  pub path: PathBuf,
  /// Path relative to the scan root.
  pub relative_path: PathBuf,
  /// `true` for directories, `false` for leaf files.
  pub is_directory: bool,
}

/// Why the scanner skipped an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum SkipReason {
  /// The entry links back to a directory already on the descent path.
  Cycle,
  /// The entry could not be read.
  Io(String),
}

/// An entry the scanner could not include.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPath {
  /// Entry that was skipped.
  pub path: PathBuf,
  /// Why it was skipped.
  pub reason: SkipReason,
}

impl SkippedPath {
  /// Convert a scanner error into a skipped path record.
  pub fn from_error(error: &SwapperError) -> Option<Self> {
    match error {
      SwapperError::CycleDetected { path } => Some(Self {
        path: path.clone(),
        reason: SkipReason::Cycle,
      }),
      SwapperError::EntryUnreadable { path, source } => Some(Self {
        path: path.clone(),
        reason: SkipReason::Io(source.to_string()),
      }),
      _ => None,
    }
  }
}

/// Complete output of scanning one root.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
  /// Root that was scanned.
  pub root: ScanRoot,
  /// Entries in depth-first, name-sorted order.
  pub entries: Vec<ScanEntry>,
  /// Entries that were skipped along the way.
  pub skipped: Vec<SkippedPath>,
}

impl ScanOutcome {
  /// Outcome for a root that contributes nothing.
  pub fn empty(root: ScanRoot) -> Self {
    Self {
      root,
      entries: Vec::new(),
      skipped: Vec::new(),
    }
  }

  /// Leaf files in scan order.
  pub fn files(&self) -> impl Iterator<Item = &ScanEntry> {
    self.entries.iter().filter(|entry| !entry.is_directory)
  }
}

/// Mapping from one request pattern to the local file that replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapEntry {
  /// Wildcard pattern handed to the engine's request filter.
  pub pattern: String,
  /// Scheme-less, wildcard-less form of the pattern used for lookups.
  pub key: String,
  /// Locator the engine resolves to the file bytes.
  pub local_resource: String,
  /// File on disk backing the entry.
  pub source: PathBuf,
  /// Label of the scan root that contributed the entry.
  pub root: String,
}

/// Category of a non-fatal swapper diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
  /// A configured root could not be opened.
  ScanRootUnreadable,
  /// A subtree was skipped because it loops back to an ancestor.
  CycleDetected,
  /// An entry below a root could not be read.
  Io,
  /// A later file mapped to an already claimed pattern.
  PatternCollision,
  /// A file path could not be expressed as a pattern.
  MalformedPattern,
  /// The engine refused the request filter.
  FilterRegistrationRejected,
}

/// Structured record of something that was not swapped, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
  /// Category of the problem.
  pub kind: DiagnosticKind,
  /// Pattern involved, when one could be computed.
  pub pattern: Option<String>,
  /// Path involved, when the problem is tied to a file or directory.
  pub path: Option<PathBuf>,
  /// Human readable explanation.
  pub reason: String,
}

impl Diagnostic {
  /// Build a diagnostic tied to a path.
  pub fn at_path(kind: DiagnosticKind, path: &Path, reason: impl Into<String>) -> Self {
    Self {
      kind,
      pattern: None,
      path: Some(path.to_path_buf()),
      reason: reason.into(),
    }
  }

  /// Attach the pattern involved.
  pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
    self.pattern = Some(pattern.into());
    self
  }

  /// Emit the diagnostic as a structured warning.
  pub fn log(&self) {
    let path = self
      .path
      .as_deref()
      .map(|path| path.display().to_string())
      .unwrap_or_default();
    tracing::warn!(
      kind = ?self.kind,
      pattern = self.pattern.as_deref().unwrap_or(""),
      path = %path,
      reason = %self.reason,
      "resource swap skipped"
    );
  }
}

impl From<&SkippedPath> for Diagnostic {
  fn from(skipped: &SkippedPath) -> Self {
    match &skipped.reason {
      SkipReason::Cycle => Diagnostic::at_path(
        DiagnosticKind::CycleDetected,
        &skipped.path,
        "directory links back to one of its ancestors",
      ),
      SkipReason::Io(message) => {
        Diagnostic::at_path(DiagnosticKind::Io, &skipped.path, message.clone())
      }
    }
  }
}
