//! Turn scan output into a [`SwapTable`], recording everything that was left out.

use crate::error::SwapperError;
use crate::models::{Diagnostic, DiagnosticKind, ScanOutcome, ScanRoot, SwapEntry};
use crate::paths::PathNormalizer;
use crate::table::lookup::SwapTable;
use crate::table::scanning::scan_root;

/// A built table together with the diagnostics gathered while building it.
#[derive(Debug, Clone, Default)]
pub struct TableBuild {
  /// Entries that will be swapped.
  pub table: SwapTable,
  /// Files, directories and roots that will not be swapped.
  pub diagnostics: Vec<Diagnostic>,
}

/// Build a table from completed scans.
///
/// Outcomes are consumed in order and files within an outcome in scan order. The first
/// file to claim a pattern keeps it; later claimants are reported as collisions.
pub fn build_swap_table(outcomes: &[ScanOutcome], normalizer: &PathNormalizer) -> TableBuild {
  let mut build = TableBuild::default();

  for outcome in outcomes {
    build
      .diagnostics
      .extend(outcome.skipped.iter().map(Diagnostic::from));

    for file in outcome.files() {
      let normalized = match normalizer.normalize(&outcome.root, &file.path) {
        Ok(normalized) => normalized,
        Err(SwapperError::MalformedPattern { path, reason }) => {
          build.diagnostics.push(Diagnostic::at_path(
            DiagnosticKind::MalformedPattern,
            &path,
            reason,
          ));
          continue;
        }
        Err(other) => {
          build.diagnostics.push(Diagnostic::at_path(
            DiagnosticKind::MalformedPattern,
            &file.path,
            other.to_string(),
          ));
          continue;
        }
      };

      let entry = SwapEntry {
        pattern: normalized.pattern,
        key: normalized.key,
        local_resource: normalized.local_resource,
        source: file.path.clone(),
        root: outcome.root.label.clone(),
      };

      if let Err(existing) = build.table.insert(entry) {
        let error = SwapperError::PatternCollision {
          pattern: existing.pattern.clone(),
          existing: existing.source.clone(),
          rejected: file.path.clone(),
        };
        let pattern = existing.pattern.clone();
        build.diagnostics.push(
          Diagnostic::at_path(DiagnosticKind::PatternCollision, &file.path, error.to_string())
            .with_pattern(pattern),
        );
      }
    }
  }

  build
}

/// Scan every root in order and build the resulting table.
///
/// Unreadable roots contribute a diagnostic and no entries; the remaining roots are still
/// scanned.
pub fn generate_swap_table(roots: &[ScanRoot], normalizer: &PathNormalizer) -> TableBuild {
  let mut outcomes = Vec::with_capacity(roots.len());
  let mut unreadable = Vec::new();

  for root in roots {
    match scan_root(root) {
      Ok(outcome) => {
        tracing::debug!(
          root = %root.label,
          path = %outcome.root.path.display(),
          entries = outcome.entries.len(),
          skipped = outcome.skipped.len(),
          "scanned swap root"
        );
        outcomes.push(outcome);
      }
      Err(error) => unreadable.push(Diagnostic::at_path(
        DiagnosticKind::ScanRootUnreadable,
        &root.path,
        error.to_string(),
      )),
    }
  }

  let mut build = build_swap_table(&outcomes, normalizer);
  unreadable.append(&mut build.diagnostics);
  build.diagnostics = unreadable;
  build
}
